use crate::date::Date;

/// Predicate tree compiled from a condition string.
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    /// Matches every entry.
    Empty,
    DateCompare {
        op: CompareOp,
        date: Date,
    },
    EventCompare {
        op: CompareOp,
        value: String,
    },
    Logical {
        op: LogicalOp,
        left: Box<Node>,
        right: Box<Node>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareOp {
    Eq,
    Ne,
    Gt,
    Lt,
    Ge,
    Le,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogicalOp {
    And,
    Or,
}

impl Node {
    pub fn logical(op: LogicalOp, left: Node, right: Node) -> Self {
        Node::Logical {
            op,
            left: Box::new(left),
            right: Box::new(right),
        }
    }
}
