//! Formula syntax checking for schema fields.
//!
//! Formulas are evaluated elsewhere; the schema model only needs to know
//! whether a formula is well formed and which fields it reads, so that an
//! invalid edit is rejected before it reaches the tree.
//!
//! Grammar, loosest binding first:
//!
//! ```text
//! or      := and ( "||" and )*
//! and     := eq ( "&&" eq )*
//! eq      := cmp ( ("==" | "!=") cmp )*
//! cmp     := add ( ("<" | "<=" | ">" | ">=") add )*
//! add     := mul ( ("+" | "-") mul )*
//! mul     := unary ( ("*" | "/" | "%") unary )*
//! unary   := ("!" | "-") unary | primary
//! primary := number | string | true | false | null
//!          | ident [ "(" args ")" ] | "(" or ")"
//! ```
//!
//! # Example
//!
//! ```
//! use treeaccess::document::formula::parse;
//!
//! let expr = parse("price * quantity + round(tax.rate, 2)").unwrap();
//! assert_eq!(expr.references(), vec!["price", "quantity", "tax.rate"]);
//!
//! let err = parse("price *").unwrap_err();
//! assert_eq!(err.position, 7);
//! ```

use std::fmt;

/// A parsed formula.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Number(f64),
    Text(String),
    Bool(bool),
    Null,
    /// Field reference, possibly dotted (`address.city`).
    Field(String),
    Unary {
        op: &'static str,
        expr: Box<Expr>,
    },
    Binary {
        op: &'static str,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    Call {
        name: String,
        args: Vec<Expr>,
    },
}

impl Expr {
    /// Field paths the formula reads, in order of first appearance.
    pub fn references(&self) -> Vec<String> {
        let mut out = Vec::new();
        self.collect_references(&mut out);
        out
    }

    fn collect_references(&self, out: &mut Vec<String>) {
        match self {
            Expr::Field(path) => {
                if !out.contains(path) {
                    out.push(path.clone());
                }
            }
            Expr::Unary { expr, .. } => expr.collect_references(out),
            Expr::Binary { left, right, .. } => {
                left.collect_references(out);
                right.collect_references(out);
            }
            Expr::Call { args, .. } => {
                for arg in args {
                    arg.collect_references(out);
                }
            }
            _ => {}
        }
    }
}

/// Syntax error with the character offset where it was detected.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message} at position {position}")]
pub struct FormulaError {
    pub position: usize,
    pub message: String,
}

impl FormulaError {
    fn new(position: usize, message: impl Into<String>) -> Self {
        Self {
            position,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Number(f64),
    Str(String),
    Ident(String),
    LParen,
    RParen,
    Comma,
    Op(&'static str),
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Number(n) => write!(f, "{}", n),
            Token::Str(s) => write!(f, "\"{}\"", s),
            Token::Ident(s) => f.write_str(s),
            Token::LParen => f.write_str("("),
            Token::RParen => f.write_str(")"),
            Token::Comma => f.write_str(","),
            Token::Op(op) => f.write_str(op),
        }
    }
}

const OPERATORS: [&str; 15] = [
    "==", "!=", "<=", ">=", "&&", "||", "<", ">", "+", "-", "*", "/", "%", "!", "=",
];

fn tokenize(input: &str) -> Result<(Vec<(usize, Token)>, usize), FormulaError> {
    let chars: Vec<char> = input.chars().collect();
    let mut tokens = Vec::new();
    let mut pos = 0;

    while pos < chars.len() {
        let ch = chars[pos];
        if ch.is_whitespace() {
            pos += 1;
            continue;
        }
        let start = pos;
        match ch {
            '(' => {
                tokens.push((start, Token::LParen));
                pos += 1;
            }
            ')' => {
                tokens.push((start, Token::RParen));
                pos += 1;
            }
            ',' => {
                tokens.push((start, Token::Comma));
                pos += 1;
            }
            '"' | '\'' => {
                let quote = ch;
                pos += 1;
                let mut text = String::new();
                loop {
                    match chars.get(pos) {
                        Some('\\') => {
                            if let Some(escaped) = chars.get(pos + 1) {
                                text.push(*escaped);
                            }
                            pos += 2;
                        }
                        Some(c) if *c == quote => {
                            pos += 1;
                            break;
                        }
                        Some(c) => {
                            text.push(*c);
                            pos += 1;
                        }
                        None => return Err(FormulaError::new(start, "Unterminated string")),
                    }
                }
                tokens.push((start, Token::Str(text)));
            }
            c if c.is_ascii_digit() => {
                while pos < chars.len() && (chars[pos].is_ascii_digit() || chars[pos] == '.') {
                    pos += 1;
                }
                let literal: String = chars[start..pos].iter().collect();
                let value = literal
                    .parse::<f64>()
                    .map_err(|_| FormulaError::new(start, format!("Invalid number '{}'", literal)))?;
                tokens.push((start, Token::Number(value)));
            }
            c if c.is_alphabetic() || c == '_' => {
                while pos < chars.len()
                    && (chars[pos].is_alphanumeric() || chars[pos] == '_' || chars[pos] == '.')
                {
                    pos += 1;
                }
                let ident: String = chars[start..pos].iter().collect();
                if ident.ends_with('.') || ident.contains("..") {
                    return Err(FormulaError::new(start, format!("Invalid field path '{}'", ident)));
                }
                tokens.push((start, Token::Ident(ident)));
            }
            _ => {
                let rest: String = chars[pos..chars.len().min(pos + 2)].iter().collect();
                let op = OPERATORS
                    .iter()
                    .find(|op| rest.starts_with(**op))
                    .ok_or_else(|| FormulaError::new(start, format!("Unexpected character '{}'", ch)))?;
                if *op == "=" {
                    return Err(FormulaError::new(start, "Use '==' for comparison"));
                }
                pos += op.chars().count();
                tokens.push((start, Token::Op(op)));
            }
        }
    }
    Ok((tokens, chars.len()))
}

struct Parser {
    tokens: Vec<(usize, Token)>,
    index: usize,
    end: usize,
}

/// Parses formula text into an expression tree.
pub fn parse(input: &str) -> Result<Expr, FormulaError> {
    let (tokens, end) = tokenize(input)?;
    if tokens.is_empty() {
        return Err(FormulaError::new(0, "Formula is empty"));
    }
    let mut parser = Parser {
        tokens,
        index: 0,
        end,
    };
    let expr = parser.parse_binary(0)?;
    if let Some((pos, token)) = parser.tokens.get(parser.index) {
        return Err(FormulaError::new(*pos, format!("Unexpected '{}'", token)));
    }
    Ok(expr)
}

/// Binary operator levels, loosest first.
const LEVELS: [&[&str]; 6] = [
    &["||"],
    &["&&"],
    &["==", "!="],
    &["<", "<=", ">", ">="],
    &["+", "-"],
    &["*", "/", "%"],
];

impl Parser {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.index).map(|(_, t)| t)
    }

    fn position(&self) -> usize {
        self.tokens
            .get(self.index)
            .map(|(p, _)| *p)
            .unwrap_or(self.end)
    }

    fn advance(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.index).map(|(_, t)| t.clone());
        self.index += 1;
        token
    }

    fn parse_binary(&mut self, level: usize) -> Result<Expr, FormulaError> {
        if level == LEVELS.len() {
            return self.parse_unary();
        }
        let mut left = self.parse_binary(level + 1)?;
        while let Some(Token::Op(op)) = self.peek() {
            let op = *op;
            if !LEVELS[level].contains(&op) {
                break;
            }
            self.advance();
            let right = self.parse_binary(level + 1)?;
            left = Expr::Binary {
                op,
                left: Box::new(left),
                right: Box::new(right),
            };
        }
        Ok(left)
    }

    fn parse_unary(&mut self) -> Result<Expr, FormulaError> {
        if let Some(Token::Op(op)) = self.peek() {
            let op = *op;
            if op == "!" || op == "-" {
                self.advance();
                let expr = self.parse_unary()?;
                return Ok(Expr::Unary {
                    op,
                    expr: Box::new(expr),
                });
            }
        }
        self.parse_primary()
    }

    fn parse_primary(&mut self) -> Result<Expr, FormulaError> {
        let pos = self.position();
        match self.advance() {
            Some(Token::Number(n)) => Ok(Expr::Number(n)),
            Some(Token::Str(s)) => Ok(Expr::Text(s)),
            Some(Token::Ident(name)) => match name.as_str() {
                "true" => Ok(Expr::Bool(true)),
                "false" => Ok(Expr::Bool(false)),
                "null" => Ok(Expr::Null),
                _ if self.peek() == Some(&Token::LParen) => {
                    self.advance();
                    let args = self.parse_args()?;
                    Ok(Expr::Call { name, args })
                }
                _ => Ok(Expr::Field(name)),
            },
            Some(Token::LParen) => {
                let expr = self.parse_binary(0)?;
                self.expect_close()?;
                Ok(expr)
            }
            Some(token) => Err(FormulaError::new(pos, format!("Unexpected '{}'", token))),
            None => Err(FormulaError::new(pos, "Unexpected end of formula")),
        }
    }

    fn parse_args(&mut self) -> Result<Vec<Expr>, FormulaError> {
        let mut args = Vec::new();
        if self.peek() == Some(&Token::RParen) {
            self.advance();
            return Ok(args);
        }
        loop {
            args.push(self.parse_binary(0)?);
            match self.peek() {
                Some(Token::Comma) => {
                    self.advance();
                }
                _ => break,
            }
        }
        self.expect_close()?;
        Ok(args)
    }

    fn expect_close(&mut self) -> Result<(), FormulaError> {
        let pos = self.position();
        match self.advance() {
            Some(Token::RParen) => Ok(()),
            Some(token) => Err(FormulaError::new(pos, format!("Expected ')', found '{}'", token))),
            None => Err(FormulaError::new(pos, "Expected ')'")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_precedence() {
        let expr = parse("a + b * 2").unwrap();
        match expr {
            Expr::Binary { op: "+", right, .. } => {
                assert!(matches!(*right, Expr::Binary { op: "*", .. }));
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_logical_and_comparison() {
        let expr = parse("!(age >= 18) || status == 'vip'").unwrap();
        assert_eq!(expr.references(), vec!["age", "status"]);
    }

    #[test]
    fn test_literals_are_not_references() {
        let expr = parse("true && null == false").unwrap();
        assert!(expr.references().is_empty());
    }

    #[test]
    fn test_nested_calls() {
        let expr = parse("max(a, min(b, 3), c)").unwrap();
        assert_eq!(expr.references(), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_errors_report_position() {
        assert_eq!(parse("").unwrap_err().message, "Formula is empty");
        assert_eq!(parse("(a + b").unwrap_err().position, 6);
        assert_eq!(parse("a b").unwrap_err().position, 2);
        assert_eq!(parse("a = b").unwrap_err().message, "Use '==' for comparison");
        assert_eq!(parse("'open").unwrap_err().message, "Unterminated string");
        assert_eq!(parse("a # b").unwrap_err().position, 2);
    }

    #[test]
    fn test_error_display_includes_position() {
        let err = parse("(a + b").unwrap_err();
        assert_eq!(err.to_string(), format!("{} at position 6", err.message));
        let boxed: Box<dyn std::error::Error> = Box::new(err);
        assert!(boxed.to_string().ends_with("at position 6"));
    }

    #[test]
    fn test_bad_field_path() {
        assert!(parse("address..city").is_err());
        assert!(parse("address.").is_err());
    }
}
