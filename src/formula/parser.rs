use super::FormulaError;
use super::ast::*;
use super::lexer::{LocatedToken, Token};

/// Parses formula tokens into an expression tree
///
/// Grammar, lowest precedence first:
///
/// ```text
/// equality       := comparison (("==" | "!=") comparison)*
/// comparison     := additive (("<" | "<=" | ">" | ">=") additive)*
/// additive       := multiplicative (("+" | "-") multiplicative)*
/// multiplicative := unary (("*" | "/") unary)*
/// unary          := ("-" | "+") unary | primary
/// primary        := number | string | true | false | identifier | "(" equality ")"
/// ```
///
/// `max_depth` bounds how deeply unary operators and parentheses may nest.
pub fn parse(tokens: Vec<LocatedToken>, max_depth: usize) -> Result<Expr, FormulaError> {
    let mut parser = Parser::new(tokens, max_depth);
    let expr = parser.parse_equality()?;

    match parser.peek() {
        Token::Eof => Ok(expr),
        _ => Err(parser.unexpected()),
    }
}

#[derive(Debug)]
struct Parser {
    tokens: Vec<LocatedToken>,
    current: usize,
    depth: usize,
    max_depth: usize,
}

impl Parser {
    fn new(tokens: Vec<LocatedToken>, max_depth: usize) -> Self {
        Self { tokens, current: 0, depth: 0, max_depth }
    }

    fn parse_equality(&mut self) -> Result<Expr, FormulaError> {
        let mut left = self.parse_comparison()?;

        loop {
            let op = match self.peek() {
                Token::Equal => BinaryOp::Equal,
                Token::NotEqual => BinaryOp::NotEqual,
                _ => break,
            };
            self.advance();
            let right = self.parse_comparison()?;
            left = Expr::Binary { op, left: Box::new(left), right: Box::new(right) };
        }

        Ok(left)
    }

    fn parse_comparison(&mut self) -> Result<Expr, FormulaError> {
        let mut left = self.parse_additive()?;

        loop {
            let op = match self.peek() {
                Token::GreaterThan => BinaryOp::GreaterThan,
                Token::GreaterEqual => BinaryOp::GreaterEqual,
                Token::LessThan => BinaryOp::LessThan,
                Token::LessEqual => BinaryOp::LessEqual,
                _ => break,
            };
            self.advance();
            let right = self.parse_additive()?;
            left = Expr::Binary { op, left: Box::new(left), right: Box::new(right) };
        }

        Ok(left)
    }

    fn parse_additive(&mut self) -> Result<Expr, FormulaError> {
        let mut left = self.parse_multiplicative()?;

        loop {
            let op = match self.peek() {
                Token::Plus => BinaryOp::Add,
                Token::Minus => BinaryOp::Subtract,
                _ => break,
            };
            self.advance();
            let right = self.parse_multiplicative()?;
            left = Expr::Binary { op, left: Box::new(left), right: Box::new(right) };
        }

        Ok(left)
    }

    fn parse_multiplicative(&mut self) -> Result<Expr, FormulaError> {
        let mut left = self.parse_unary()?;

        loop {
            let op = match self.peek() {
                Token::Star => BinaryOp::Multiply,
                Token::Slash => BinaryOp::Divide,
                _ => break,
            };
            self.advance();
            let right = self.parse_unary()?;
            left = Expr::Binary { op, left: Box::new(left), right: Box::new(right) };
        }

        Ok(left)
    }

    fn parse_unary(&mut self) -> Result<Expr, FormulaError> {
        let op = match self.peek() {
            Token::Minus => UnaryOp::Negate,
            Token::Plus => UnaryOp::Plus,
            _ => return self.parse_primary(),
        };
        self.advance();

        self.enter()?;
        let operand = self.parse_unary()?;
        self.leave();

        Ok(Expr::Unary { op, operand: Box::new(operand) })
    }

    fn parse_primary(&mut self) -> Result<Expr, FormulaError> {
        let expr = match self.peek().clone() {
            Token::Number(value) => Expr::Number(value),
            Token::String(value) => Expr::String(value),
            Token::True => Expr::Boolean(true),
            Token::False => Expr::Boolean(false),
            Token::Identifier(name) => Expr::Variable(name),
            Token::LeftParen => {
                self.advance(); // consume '('
                self.enter()?;
                let inner = self.parse_equality()?;
                self.leave();

                if self.peek() != &Token::RightParen {
                    return Err(self.unexpected());
                }
                self.advance(); // consume ')'
                return Ok(inner);
            }
            Token::Eof => return Err(FormulaError::UnexpectedEnd),
            _ => return Err(self.unexpected()),
        };

        self.advance();
        Ok(expr)
    }

    fn enter(&mut self) -> Result<(), FormulaError> {
        self.depth += 1;
        if self.depth > self.max_depth {
            return Err(FormulaError::TooDeep { max_depth: self.max_depth });
        }
        Ok(())
    }

    fn leave(&mut self) {
        self.depth -= 1;
    }

    fn peek(&self) -> &Token {
        self.tokens
            .get(self.current)
            .map(|t| &t.token)
            .unwrap_or(&Token::Eof)
    }

    fn advance(&mut self) {
        if self.current < self.tokens.len() {
            self.current += 1;
        }
    }

    fn unexpected(&self) -> FormulaError {
        match self.tokens.get(self.current) {
            Some(LocatedToken { token: Token::Eof, .. }) | None => FormulaError::UnexpectedEnd,
            Some(located) => FormulaError::UnexpectedToken {
                token: format!("{:?}", located.token),
                offset: located.offset,
            },
        }
    }
}
