use super::ast::{CompareOp, LogicalOp, Node};
use crate::date::Date;

pub fn evaluate(node: &Node, date: &Date, event: &str) -> bool {
    match node {
        Node::Empty => true,
        Node::DateCompare { op, date: reference } => compare_ord(date, reference, *op),
        Node::EventCompare { op, value } => compare_ord(event, value.as_str(), *op),
        Node::Logical { op, left, right } => {
            let lhs = evaluate(left, date, event);
            let rhs = evaluate(right, date, event);
            match op {
                LogicalOp::And => lhs && rhs,
                LogicalOp::Or => lhs || rhs,
            }
        }
    }
}

fn compare_ord<T: Ord + ?Sized>(a: &T, b: &T, op: CompareOp) -> bool {
    match op {
        CompareOp::Eq => a == b,
        CompareOp::Ne => a != b,
        CompareOp::Gt => a > b,
        CompareOp::Lt => a < b,
        CompareOp::Ge => a >= b,
        CompareOp::Le => a <= b,
    }
}
