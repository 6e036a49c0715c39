use super::ast::{CompareOp, LogicalOp, Node};
use crate::date::{Date, DateError};
use thiserror::Error;

const OPERATORS: [(&str, CompareOp); 6] = [
    ("==", CompareOp::Eq),
    ("!=", CompareOp::Ne),
    ("<=", CompareOp::Le),
    (">=", CompareOp::Ge),
    ("<", CompareOp::Lt),
    (">", CompareOp::Gt),
];

pub struct Parser<'a> {
    input: &'a str,
    pos: usize,
}

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("Parse error at position {pos}: {message}")]
    Syntax { message: String, pos: usize },
    #[error("Invalid date literal at position {pos}: {source}")]
    Date {
        pos: usize,
        #[source]
        source: DateError,
    },
}

impl<'a> Parser<'a> {
    pub fn new(input: &'a str) -> Self {
        Self { input, pos: 0 }
    }

    pub fn parse(mut self) -> Result<Node, ParseError> {
        self.skip_whitespace();
        if self.at_end() {
            return Ok(Node::Empty);
        }

        let node = self.parse_or()?;
        self.skip_whitespace();
        if !self.at_end() {
            return Err(self.error("Unexpected input after expression"));
        }
        Ok(node)
    }

    fn parse_or(&mut self) -> Result<Node, ParseError> {
        let mut left = self.parse_and()?;
        loop {
            self.skip_whitespace();
            if !self.match_keyword("OR") {
                break;
            }
            let right = self.parse_and()?;
            left = Node::logical(LogicalOp::Or, left, right);
        }
        Ok(left)
    }

    fn parse_and(&mut self) -> Result<Node, ParseError> {
        let mut left = self.parse_primary()?;
        loop {
            self.skip_whitespace();
            if !self.match_keyword("AND") {
                break;
            }
            let right = self.parse_primary()?;
            left = Node::logical(LogicalOp::And, left, right);
        }
        Ok(left)
    }

    fn parse_primary(&mut self) -> Result<Node, ParseError> {
        self.skip_whitespace();

        if self.match_char('(') {
            let node = self.parse_or()?;
            self.skip_whitespace();
            if !self.match_char(')') {
                return Err(self.error("Expected ')'"));
            }
            return Ok(node);
        }

        let field_pos = self.pos;
        let field = self.parse_identifier()?;
        match field {
            "date" => {
                let op = self.parse_operator()?;
                let date = self.parse_date()?;
                Ok(Node::DateCompare { op, date })
            }
            "event" => {
                let op = self.parse_operator()?;
                let value = self.parse_event_text()?;
                Ok(Node::EventCompare { op, value })
            }
            other => Err(ParseError::Syntax {
                message: format!("Unknown field '{}', expected 'date' or 'event'", other),
                pos: field_pos,
            }),
        }
    }

    fn parse_identifier(&mut self) -> Result<&'a str, ParseError> {
        self.skip_whitespace();
        let start = self.pos;

        while !self.at_end() {
            let c = self.current_char();
            if c.is_alphanumeric() || c == '_' {
                self.advance();
            } else {
                break;
            }
        }

        if self.pos == start {
            return Err(self.error("Expected field name"));
        }

        Ok(&self.input[start..self.pos])
    }

    fn parse_operator(&mut self) -> Result<CompareOp, ParseError> {
        self.skip_whitespace();
        let start = self.pos;

        for (symbol, op) in OPERATORS {
            if self.match_str(symbol) {
                if is_operator_char(self.current_char()) {
                    self.pos = start;
                    break;
                }
                return Ok(op);
            }
        }

        Err(self.error("Expected operator (==, !=, <, <=, >, >=)"))
    }

    fn parse_date(&mut self) -> Result<Date, ParseError> {
        self.skip_whitespace();
        let start = self.pos;

        let text = if self.match_char('"') {
            self.parse_quoted()?
        } else {
            self.take_word().to_string()
        };

        if text.is_empty() {
            return Err(self.error("Expected date"));
        }

        text.parse()
            .map_err(|source| ParseError::Date { pos: start, source })
    }

    fn parse_event_text(&mut self) -> Result<String, ParseError> {
        self.skip_whitespace();

        if self.match_char('"') {
            return self.parse_quoted();
        }

        let start = self.pos;
        let mut end = self.pos;
        loop {
            self.skip_whitespace();
            if self.at_end() || self.current_char() == ')' || self.at_boundary_word() {
                break;
            }
            self.take_word();
            end = self.pos;
        }
        self.pos = end;

        if end == start {
            return Err(self.error("Expected event text"));
        }
        Ok(self.input[start..end].to_string())
    }

    fn parse_quoted(&mut self) -> Result<String, ParseError> {
        let start = self.pos;
        while !self.at_end() && self.current_char() != '"' {
            self.advance();
        }
        let s = self.input[start..self.pos].to_string();
        if !self.match_char('"') {
            return Err(self.error("Unterminated string"));
        }
        Ok(s)
    }

    /// Consumes non-whitespace characters up to a closing parenthesis.
    fn take_word(&mut self) -> &'a str {
        let start = self.pos;
        while !self.at_end() {
            let c = self.current_char();
            if c.is_whitespace() || c == ')' {
                break;
            }
            self.advance();
        }
        &self.input[start..self.pos]
    }

    fn peek_word(&self) -> &'a str {
        let remaining = &self.input[self.pos..];
        let end = remaining
            .find(char::is_whitespace)
            .unwrap_or(remaining.len());
        &remaining[..end]
    }

    // Words that end a bare event text: logical keywords and comparison operators.
    fn at_boundary_word(&self) -> bool {
        let word = self.peek_word();
        word == "AND" || word == "OR" || OPERATORS.iter().any(|(symbol, _)| *symbol == word)
    }

    fn skip_whitespace(&mut self) {
        while !self.at_end() && self.current_char().is_whitespace() {
            self.advance();
        }
    }

    fn at_end(&self) -> bool {
        self.pos >= self.input.len()
    }

    fn current_char(&self) -> char {
        self.input[self.pos..].chars().next().unwrap_or('\0')
    }

    fn advance(&mut self) {
        self.pos += self.current_char().len_utf8();
    }

    fn match_char(&mut self, c: char) -> bool {
        if !self.at_end() && self.current_char() == c {
            self.advance();
            true
        } else {
            false
        }
    }

    fn match_str(&mut self, s: &str) -> bool {
        if self.input[self.pos..].starts_with(s) {
            self.pos += s.len();
            true
        } else {
            false
        }
    }

    // Keywords are case-sensitive and must be a whitespace-delimited word on both sides.
    fn match_keyword(&mut self, kw: &str) -> bool {
        let after_space = self.input[..self.pos].ends_with(char::is_whitespace);
        if after_space && self.peek_word() == kw {
            self.pos += kw.len();
            true
        } else {
            false
        }
    }

    fn error(&self, message: &str) -> ParseError {
        ParseError::Syntax {
            message: message.to_string(),
            pos: self.pos,
        }
    }
}

fn is_operator_char(c: char) -> bool {
    matches!(c, '=' | '!' | '<' | '>')
}

pub fn parse(input: &str) -> Result<Node, ParseError> {
    Parser::new(input).parse()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::evaluate;

    fn d(year: i32, month: u8, day: u8) -> Date {
        Date::new(year, month, day)
    }

    #[test]
    fn test_empty_condition() {
        assert_eq!(parse("").unwrap(), Node::Empty);
        assert_eq!(parse("   \t ").unwrap(), Node::Empty);
    }

    #[test]
    fn test_simple_date() {
        let node = parse("date != 2017-11-18").unwrap();
        assert_eq!(
            node,
            Node::DateCompare {
                op: CompareOp::Ne,
                date: d(2017, 11, 18)
            }
        );
        assert!(evaluate(&node, &d(2017, 1, 1), ""));
        assert!(!evaluate(&node, &d(2017, 11, 18), ""));
    }

    #[test]
    fn test_date_range() {
        let node = parse("date >= 2017-01-01 AND date < 2017-07-01").unwrap();
        assert!(matches!(node, Node::Logical { op: LogicalOp::And, .. }));
        assert!(evaluate(&node, &d(2017, 1, 1), ""));
        assert!(evaluate(&node, &d(2017, 3, 1), ""));
        assert!(evaluate(&node, &d(2017, 6, 30), ""));
        assert!(!evaluate(&node, &d(2017, 7, 1), ""));
        assert!(!evaluate(&node, &d(2016, 12, 31), ""));
    }

    #[test]
    fn test_quoted_event() {
        let node = parse(r#"event == "sport event""#).unwrap();
        assert!(evaluate(&node, &d(2017, 1, 1), "sport event"));
        assert!(!evaluate(&node, &d(2017, 1, 1), "holiday"));
        assert!(!evaluate(&node, &d(2017, 1, 1), "sport event "));
    }

    #[test]
    fn test_event_conjunction() {
        let node = parse(r#"event != "sport event" AND event != "Wednesday""#).unwrap();
        assert!(evaluate(&node, &d(2017, 1, 1), "holiday"));
        assert!(!evaluate(&node, &d(2017, 1, 1), "sport event"));
        assert!(!evaluate(&node, &d(2017, 1, 1), "Wednesday"));
    }

    #[test]
    fn test_keywords_inside_quotes_are_literal() {
        let node = parse(r#"event == "holiday AND date == 2017-11-18""#).unwrap();
        assert!(!evaluate(&node, &d(2017, 11, 18), "holiday"));
        assert!(!evaluate(&node, &d(2017, 11, 18), "work day"));
        assert!(evaluate(&node, &d(1, 1, 1), "holiday AND date == 2017-11-18"));
    }

    #[test]
    fn test_nested_parentheses() {
        let node = parse(r#"((event == "holiday" AND date == 2017-01-01))"#).unwrap();
        assert!(evaluate(&node, &d(2017, 1, 1), "holiday"));
        assert!(!evaluate(&node, &d(2017, 1, 2), "holiday"));
    }

    #[test]
    fn test_parentheses_override_precedence() {
        let node = parse(r#"date > 2017-01-01 AND (event == "holiday" OR date < 2017-07-01)"#).unwrap();
        assert!(!evaluate(&node, &d(2016, 1, 1), "holiday"));
        assert!(evaluate(&node, &d(2017, 1, 2), "holiday"));
        assert!(evaluate(&node, &d(2017, 1, 2), "workday"));
        assert!(!evaluate(&node, &d(2018, 1, 2), "workday"));
    }

    #[test]
    fn test_and_binds_tighter_than_or() {
        let node = parse(r#"date > 2017-01-01 AND event == "holiday" OR date < 2017-07-01"#).unwrap();
        assert!(matches!(node, Node::Logical { op: LogicalOp::Or, .. }));
        assert!(evaluate(&node, &d(2016, 1, 1), "event"));
        assert!(evaluate(&node, &d(2017, 1, 2), "holiday"));
        assert!(evaluate(&node, &d(2017, 1, 2), "workday"));
        assert!(!evaluate(&node, &d(2018, 1, 2), "workday"));
    }

    #[test]
    fn test_left_associative_folding() {
        let node = parse("date == 2017-01-01 OR date == 2017-01-02 OR date == 2017-01-03").unwrap();
        let Node::Logical { op: LogicalOp::Or, left, right } = node else {
            panic!("expected OR at the root");
        };
        assert!(matches!(*left, Node::Logical { op: LogicalOp::Or, .. }));
        assert_eq!(
            *right,
            Node::DateCompare {
                op: CompareOp::Eq,
                date: d(2017, 1, 3)
            }
        );
    }

    #[test]
    fn test_date_looking_event_text() {
        let node = parse(r#"((event == "2017-01-01" OR date > 2016-01-01))"#).unwrap();
        assert!(evaluate(&node, &d(1, 1, 1), "2017-01-01"));
        assert!(!evaluate(&node, &d(2016, 1, 1), "event"));
        assert!(evaluate(&node, &d(2016, 1, 2), "event"));
    }

    #[test]
    fn test_quoted_date_literal() {
        let node = parse(r#"date == "2017-01-01""#).unwrap();
        assert!(evaluate(&node, &d(2017, 1, 1), "new year"));
    }

    #[test]
    fn test_unquoted_event_text() {
        let node = parse("event == sport event AND date > 2017-01-01").unwrap();
        let Node::Logical { left, .. } = node else {
            panic!("expected AND at the root");
        };
        assert_eq!(
            *left,
            Node::EventCompare {
                op: CompareOp::Eq,
                value: "sport event".to_string()
            }
        );
    }

    #[test]
    fn test_unquoted_event_text_stops_at_paren() {
        let node = parse("(event == new   year) OR date == 2017-01-07").unwrap();
        assert!(evaluate(&node, &d(2017, 1, 1), "new   year"));
        assert!(!evaluate(&node, &d(2017, 1, 1), "new year"));
    }

    #[test]
    fn test_unbalanced_parentheses() {
        assert!(matches!(parse("(date == 2017-01-01"), Err(ParseError::Syntax { .. })));
        assert!(matches!(parse("date == 2017-01-01)"), Err(ParseError::Syntax { .. })));
        assert!(matches!(parse("()"), Err(ParseError::Syntax { .. })));
    }

    #[test]
    fn test_unknown_field() {
        let err = parse("time == 2017-01-01").unwrap_err();
        assert!(err.to_string().contains("Unknown field 'time'"));
        assert!(parse("Date == 2017-01-01").is_err());
    }

    #[test]
    fn test_unknown_operator() {
        assert!(parse("date = 2017-01-01").is_err());
        assert!(parse("date === 2017-01-01").is_err());
        assert!(parse("date <> 2017-01-01").is_err());
        assert!(parse("date 2017-01-01").is_err());
    }

    #[test]
    fn test_malformed_date() {
        assert!(matches!(
            parse("date == 2017-13-01"),
            Err(ParseError::Date { source: DateError::MonthOutOfRange(13), .. })
        ));
        assert!(matches!(
            parse("date == tomorrow"),
            Err(ParseError::Date { source: DateError::WrongFormat(_), .. })
        ));
        assert!(matches!(parse("date == "), Err(ParseError::Syntax { .. })));
    }

    #[test]
    fn test_keywords_are_case_sensitive() {
        assert!(parse(r#"event == "a" and event == "b""#).is_err());
        let node = parse("event == a and b").unwrap();
        assert!(evaluate(&node, &d(2017, 1, 1), "a and b"));
    }

    #[test]
    fn test_keyword_needs_leading_whitespace() {
        assert!(parse(r#"event == "a"OR event == "b""#).is_err());
        assert!(parse("(date == 2017-01-01)AND date < 2018-01-01").is_err());
        let node = parse(r#"event == "a" OR event == "b""#).unwrap();
        assert!(matches!(node, Node::Logical { op: LogicalOp::Or, .. }));
    }

    #[test]
    fn test_dangling_keyword() {
        assert!(parse("date == 2017-01-01 AND").is_err());
        assert!(parse("OR date == 2017-01-01").is_err());
    }

    #[test]
    fn test_unterminated_string() {
        assert!(parse(r#"event == "open"#).is_err());
    }

    #[test]
    fn test_missing_event_text() {
        assert!(parse("event ==").is_err());
        assert!(parse("event == AND date == 2017-01-01").is_err());
    }
}
