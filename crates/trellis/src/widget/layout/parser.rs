//! Parser for the layout text syntax.
//!
//! ```text
//! pair    := '(' expr ',' expr ')' | '{' expr ',' expr '}'
//! expr    := term (('+' | '-') term)*
//! term    := unary (('*' | '/') unary)*
//! unary   := '-' unary | primary
//! primary := NUMBER '%'? | '(' expr ')' | ('min' | 'max') '(' expr ',' expr ')'
//!          | ('parent' | '&' | NAME) '.' PROPERTY
//! ```

use crate::error::LayoutError;

use super::expr::{BindProperty, BindTarget, Expr, Operator};

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Number(f32),
    Ident(String),
    Percent,
    Dot,
    Ampersand,
    Plus,
    Minus,
    Star,
    Slash,
    Comma,
    LParen,
    RParen,
    LBrace,
    RBrace,
}

impl Token {
    fn describe(&self) -> String {
        match self {
            Self::Number(n) => format!("number {n}"),
            Self::Ident(name) => format!("'{name}'"),
            Self::Percent => "'%'".into(),
            Self::Dot => "'.'".into(),
            Self::Ampersand => "'&'".into(),
            Self::Plus => "'+'".into(),
            Self::Minus => "'-'".into(),
            Self::Star => "'*'".into(),
            Self::Slash => "'/'".into(),
            Self::Comma => "','".into(),
            Self::LParen => "'('".into(),
            Self::RParen => "')'".into(),
            Self::LBrace => "'{'".into(),
            Self::RBrace => "'}'".into(),
        }
    }
}

struct Parser<'a> {
    input: &'a str,
    /// Tokens with their 1-based start column.
    tokens: Vec<(Token, usize)>,
    pos: usize,
}

/// Parse a single layout expression.
pub(crate) fn parse_expr(input: &str) -> Result<Expr, LayoutError> {
    let mut parser = Parser::new(input)?;
    let expr = parser.expr()?;
    parser.expect_end()?;
    Ok(expr)
}

/// Parse a `(x, y)` or `{x, y}` pair.
pub(crate) fn parse_pair(input: &str) -> Result<(Expr, Expr), LayoutError> {
    let mut parser = Parser::new(input)?;
    let close = match parser.next() {
        Some(Token::LParen) => Token::RParen,
        Some(Token::LBrace) => Token::RBrace,
        _ => return Err(parser.error_at(0, "expected '(' or '{' to start a pair")),
    };
    let x = parser.expr()?;
    parser.expect(Token::Comma)?;
    let y = parser.expr()?;
    parser.expect(close)?;
    parser.expect_end()?;
    Ok((x, y))
}

impl<'a> Parser<'a> {
    fn new(input: &'a str) -> Result<Self, LayoutError> {
        let tokens = tokenize(input)?;
        Ok(Self {
            input,
            tokens,
            pos: 0,
        })
    }

    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos).map(|(token, _)| token)
    }

    fn next(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.pos).map(|(token, _)| token.clone());
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    fn column(&self, index: usize) -> usize {
        self.tokens
            .get(index)
            .map(|(_, column)| *column)
            .unwrap_or_else(|| self.input.chars().count() + 1)
    }

    fn error_at(&self, index: usize, message: impl Into<String>) -> LayoutError {
        LayoutError::Parse {
            input: self.input.to_string(),
            column: self.column(index),
            message: message.into(),
        }
    }

    fn error_here(&self, message: impl Into<String>) -> LayoutError {
        self.error_at(self.pos, message)
    }

    fn expect(&mut self, expected: Token) -> Result<(), LayoutError> {
        match self.peek() {
            Some(token) if *token == expected => {
                self.pos += 1;
                Ok(())
            }
            Some(token) => {
                let message = format!("expected {}, found {}", expected.describe(), token.describe());
                Err(self.error_here(message))
            }
            None => Err(self.error_here(format!("expected {}", expected.describe()))),
        }
    }

    fn expect_end(&self) -> Result<(), LayoutError> {
        match self.peek() {
            None => Ok(()),
            Some(token) => Err(self.error_here(format!("unexpected {}", token.describe()))),
        }
    }

    fn expr(&mut self) -> Result<Expr, LayoutError> {
        let mut lhs = self.term()?;
        loop {
            let op = match self.peek() {
                Some(Token::Plus) => Operator::Add,
                Some(Token::Minus) => Operator::Sub,
                _ => return Ok(lhs),
            };
            self.pos += 1;
            let rhs = self.term()?;
            lhs = Expr::binary(op, lhs, rhs);
        }
    }

    fn term(&mut self) -> Result<Expr, LayoutError> {
        let mut lhs = self.unary()?;
        loop {
            let op = match self.peek() {
                Some(Token::Star) => Operator::Mul,
                Some(Token::Slash) => Operator::Div,
                _ => return Ok(lhs),
            };
            self.pos += 1;
            let rhs = self.unary()?;
            lhs = Expr::binary(op, lhs, rhs);
        }
    }

    fn unary(&mut self) -> Result<Expr, LayoutError> {
        if self.peek() == Some(&Token::Minus) {
            self.pos += 1;
            return Ok(match self.unary()? {
                Expr::Value(v) => Expr::Value(-v),
                Expr::Ratio(r) => Expr::Ratio(-r),
                other => Expr::Negate(Box::new(other)),
            });
        }
        self.primary()
    }

    fn primary(&mut self) -> Result<Expr, LayoutError> {
        let start = self.pos;
        match self.next() {
            Some(Token::Number(n)) => {
                if self.peek() == Some(&Token::Percent) {
                    self.pos += 1;
                    Ok(Expr::Ratio(n / 100.0))
                } else {
                    Ok(Expr::Value(n))
                }
            }
            Some(Token::LParen) => {
                let inner = self.expr()?;
                self.expect(Token::RParen)?;
                Ok(inner)
            }
            Some(Token::Ampersand) => self.binding(BindTarget::Parent),
            Some(Token::Ident(name)) => {
                let lower = name.to_ascii_lowercase();
                if (lower == "min" || lower == "max") && self.peek() == Some(&Token::LParen) {
                    self.pos += 1;
                    let lhs = self.expr()?;
                    self.expect(Token::Comma)?;
                    let rhs = self.expr()?;
                    self.expect(Token::RParen)?;
                    let op = if lower == "min" { Operator::Min } else { Operator::Max };
                    return Ok(Expr::binary(op, lhs, rhs));
                }
                let target = if lower == "parent" {
                    BindTarget::Parent
                } else {
                    BindTarget::Named {
                        name,
                        resolved: None,
                    }
                };
                self.binding(target)
            }
            Some(token) => Err(self.error_at(start, format!("unexpected {}", token.describe()))),
            None => Err(self.error_at(start, "unexpected end of layout")),
        }
    }

    fn binding(&mut self, target: BindTarget) -> Result<Expr, LayoutError> {
        self.expect(Token::Dot)?;
        let index = self.pos;
        match self.next() {
            Some(Token::Ident(name)) => match BindProperty::from_name(&name) {
                Some(property) => Ok(Expr::Binding { target, property }),
                None => Err(self.error_at(index, format!("unknown property '{name}'"))),
            },
            _ => Err(self.error_at(index, "expected a property name after '.'")),
        }
    }
}

fn tokenize(input: &str) -> Result<Vec<(Token, usize)>, LayoutError> {
    let chars: Vec<char> = input.chars().collect();
    let mut tokens = Vec::new();
    let mut i = 0;

    let error = |column: usize, message: String| LayoutError::Parse {
        input: input.to_string(),
        column,
        message,
    };

    while i < chars.len() {
        let c = chars[i];
        let column = i + 1;
        if c.is_whitespace() {
            i += 1;
            continue;
        }

        if c.is_ascii_digit() || (c == '.' && chars.get(i + 1).is_some_and(|d| d.is_ascii_digit())) {
            let start = i;
            while i < chars.len() && (chars[i].is_ascii_digit() || chars[i] == '.') {
                i += 1;
            }
            let text: String = chars[start..i].iter().collect();
            let value = text
                .parse::<f32>()
                .map_err(|_| error(column, format!("invalid number '{text}'")))?;
            tokens.push((Token::Number(value), column));
            continue;
        }

        if c.is_alphabetic() || c == '_' {
            let start = i;
            while i < chars.len() && (chars[i].is_alphanumeric() || chars[i] == '_') {
                i += 1;
            }
            tokens.push((Token::Ident(chars[start..i].iter().collect()), column));
            continue;
        }

        let token = match c {
            '%' => Token::Percent,
            '.' => Token::Dot,
            '&' => Token::Ampersand,
            '+' => Token::Plus,
            '-' => Token::Minus,
            '*' => Token::Star,
            '/' => Token::Slash,
            ',' => Token::Comma,
            '(' => Token::LParen,
            ')' => Token::RParen,
            '{' => Token::LBrace,
            '}' => Token::RBrace,
            other => return Err(error(column, format!("unexpected character '{other}'"))),
        };
        tokens.push((token, column));
        i += 1;
    }

    Ok(tokens)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn value(input: &str) -> f32 {
        match parse_expr(input).unwrap() {
            Expr::Value(v) => v,
            other => panic!("expected a constant, got {other:?}"),
        }
    }

    #[test]
    fn test_numbers_and_negation() {
        assert_eq!(value("42"), 42.0);
        assert_eq!(value("-3.5"), -3.5);
        assert_eq!(value(".25"), 0.25);
        assert_eq!(parse_expr("50%").unwrap(), Expr::Ratio(0.5));
        assert_eq!(parse_expr("-10%").unwrap(), Expr::Ratio(-0.1));
    }

    #[test]
    fn test_precedence() {
        let expr = parse_expr("1 + 2 * 3").unwrap();
        match expr {
            Expr::Binary { op: Operator::Add, rhs, .. } => {
                assert!(matches!(*rhs, Expr::Binary { op: Operator::Mul, .. }));
            }
            other => panic!("unexpected tree {other:?}"),
        }
    }

    #[test]
    fn test_bindings() {
        let expr = parse_expr("ok_button.right + 5").unwrap();
        let mut found = Vec::new();
        expr.for_each_binding(&mut |target, property| found.push((target.clone(), property)));
        assert_eq!(
            found,
            vec![(
                BindTarget::Named {
                    name: "ok_button".into(),
                    resolved: None
                },
                BindProperty::Right
            )]
        );

        let parent = parse_expr("&.h").unwrap();
        assert_eq!(
            parent,
            Expr::Binding {
                target: BindTarget::Parent,
                property: BindProperty::Height
            }
        );
    }

    #[test]
    fn test_pairs() {
        let (x, y) = parse_pair("(10, 50%)").unwrap();
        assert_eq!(x, Expr::Value(10.0));
        assert_eq!(y, Expr::Ratio(0.5));

        let (x, _) = parse_pair("{ min(1, 2), 3 }").unwrap();
        assert!(matches!(x, Expr::Binary { op: Operator::Min, .. }));
    }

    #[test]
    fn test_errors_report_column() {
        match parse_expr("10 + * 2") {
            Err(LayoutError::Parse { column, .. }) => assert_eq!(column, 6),
            other => panic!("expected parse error, got {other:?}"),
        }
        match parse_expr("parent.depth") {
            Err(LayoutError::Parse { column, message, .. }) => {
                assert_eq!(column, 8);
                assert!(message.contains("depth"));
            }
            other => panic!("expected parse error, got {other:?}"),
        }
        assert!(parse_expr("10 $").is_err());
        assert!(parse_expr("(1 + 2").is_err());
        assert!(parse_expr("").is_err());
        assert!(parse_pair("10, 20").is_err());
        assert!(parse_pair("(10, 20) 5").is_err());
    }
}
