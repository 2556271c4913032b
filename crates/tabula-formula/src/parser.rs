//! Formula parser
//!
//! A recursive descent parser for arithmetic formulas with proper operator
//! precedence. Input is the formula text after the leading `=`.

use crate::ast::{BinaryOperator, FormulaExpr, UnaryOperator};
use crate::error::{FormulaError, FormulaResult};
use tabula_core::{CellError, Position};

/// Parse a formula expression into an AST
///
/// # Example
/// ```rust
/// use tabula_formula::parse_formula;
///
/// let ast = parse_formula("1+2").unwrap();
/// let ast = parse_formula("(A1 + B2) / 2").unwrap();
/// assert!(parse_formula("1+").is_err());
/// ```
pub fn parse_formula(expression: &str) -> FormulaResult<FormulaExpr> {
    let mut parser = FormulaParser::new(expression)?;
    let expr = parser.parse_expression()?.expr;

    // Make sure we consumed all input
    if !matches!(parser.current_token(), Token::Eof) {
        return Err(FormulaError::Parse(format!(
            "Unexpected {:?} after expression in '{}'",
            parser.current_token(),
            expression
        )));
    }

    Ok(expr)
}

/// Token types
#[derive(Debug, Clone, PartialEq)]
enum Token {
    Number(f64),
    CellRef(Position),

    Plus,
    Minus,
    Star,
    Slash,

    LeftParen,
    RightParen,

    Eof,
}

/// Parentheses and sign prefixes open at once
const MAX_NESTING: usize = 256;

/// Height of the expression tree, counting every operator and operand level
const MAX_HEIGHT: usize = 1024;

/// Formula parser
struct FormulaParser<'a> {
    input: &'a str,
    pos: usize,
    current_token: Token,
    nesting: usize,
}

impl<'a> FormulaParser<'a> {
    fn new(input: &'a str) -> FormulaResult<Self> {
        let mut parser = Self {
            input,
            pos: 0,
            current_token: Token::Eof,
            nesting: 0,
        };
        parser.advance_token()?;
        Ok(parser)
    }

    // === Token scanning ===

    fn advance_token(&mut self) -> FormulaResult<()> {
        self.current_token = self.scan_token()?;
        Ok(())
    }

    fn scan_token(&mut self) -> FormulaResult<Token> {
        self.skip_whitespace();

        let c = match self.peek_char() {
            Some(c) => c,
            None => return Ok(Token::Eof),
        };

        let single = match c {
            '+' => Some(Token::Plus),
            '-' => Some(Token::Minus),
            '*' => Some(Token::Star),
            '/' => Some(Token::Slash),
            '(' => Some(Token::LeftParen),
            ')' => Some(Token::RightParen),
            _ => None,
        };
        if let Some(token) = single {
            self.advance();
            return Ok(token);
        }

        if c.is_ascii_digit()
            || (c == '.' && self.peek_char_at(1).map_or(false, |c| c.is_ascii_digit()))
        {
            return self.scan_number();
        }

        if c.is_ascii_uppercase() {
            return self.scan_cell_ref();
        }

        if c == '#' {
            return self.scan_error_ref();
        }

        Err(FormulaError::Parse(format!(
            "Unexpected character '{}' at offset {} in '{}'",
            c, self.pos, self.input
        )))
    }

    fn scan_number(&mut self) -> FormulaResult<Token> {
        let start = self.pos;

        // Integer part
        while self.peek_char().map_or(false, |c| c.is_ascii_digit()) {
            self.advance();
        }

        // Decimal part
        if self.peek_char() == Some('.') {
            self.advance();
            while self.peek_char().map_or(false, |c| c.is_ascii_digit()) {
                self.advance();
            }
        }

        // Exponent part
        if self.peek_char().map_or(false, |c| c == 'e' || c == 'E') {
            self.advance();
            if self.peek_char().map_or(false, |c| c == '+' || c == '-') {
                self.advance();
            }
            while self.peek_char().map_or(false, |c| c.is_ascii_digit()) {
                self.advance();
            }
        }

        let num_str = &self.input[start..self.pos];
        match num_str.parse::<f64>() {
            Ok(num) if num.is_finite() => Ok(Token::Number(num)),
            _ => Err(FormulaError::Parse(format!("Invalid number '{}'", num_str))),
        }
    }

    fn scan_cell_ref(&mut self) -> FormulaResult<Token> {
        let start = self.pos;

        while self.peek_char().map_or(false, |c| c.is_ascii_uppercase()) {
            self.advance();
        }
        let digits_start = self.pos;
        while self.peek_char().map_or(false, |c| c.is_ascii_digit()) {
            self.advance();
        }

        let text = &self.input[start..self.pos];
        if self.pos == digits_start || self.peek_char().map_or(false, |c| c.is_alphanumeric()) {
            return Err(FormulaError::Parse(format!(
                "Invalid cell reference starting at '{}'",
                &self.input[start..]
            )));
        }

        // Well-formed references outside the grid evaluate to #REF!
        Ok(Token::CellRef(Position::parse(text).unwrap_or(Position::NONE)))
    }

    fn scan_error_ref(&mut self) -> FormulaResult<Token> {
        let rest = &self.input[self.pos..];
        let code = CellError::Ref.as_str();
        if rest.starts_with(code) {
            self.pos += code.len();
            return Ok(Token::CellRef(Position::NONE));
        }

        Err(FormulaError::Parse(format!(
            "Unexpected error literal at '{}'",
            rest
        )))
    }

    // === Helper methods ===

    fn peek_char(&self) -> Option<char> {
        self.input[self.pos..].chars().next()
    }

    fn peek_char_at(&self, offset: usize) -> Option<char> {
        self.input[self.pos..].chars().nth(offset)
    }

    fn advance(&mut self) {
        if let Some(c) = self.peek_char() {
            self.pos += c.len_utf8();
        }
    }

    fn skip_whitespace(&mut self) {
        while self.peek_char().map_or(false, |c| c.is_whitespace()) {
            self.advance();
        }
    }

    fn current_token(&self) -> &Token {
        &self.current_token
    }

    fn consume(&mut self) -> FormulaResult<Token> {
        let token = std::mem::replace(&mut self.current_token, Token::Eof);
        self.advance_token()?;
        Ok(token)
    }

    fn expect(&mut self, expected: &Token) -> FormulaResult<()> {
        if self.current_token() == expected {
            self.consume()?;
            Ok(())
        } else {
            Err(FormulaError::Parse(format!(
                "Expected {:?}, got {:?}",
                expected,
                self.current_token()
            )))
        }
    }

    // === Expression parsing with precedence ===
    // Precedence (lowest to highest):
    // 1. Addition/Subtraction: +, -
    // 2. Multiplication/Division: *, /
    // 3. Unary: +, -
    // 4. Primary: numbers, references, parentheses
    //
    // Every rule returns the height of the tree it built so the walks over
    // the finished tree stay within MAX_HEIGHT levels.

    fn parse_expression(&mut self) -> FormulaResult<Subtree> {
        self.parse_additive()
    }

    fn parse_additive(&mut self) -> FormulaResult<Subtree> {
        let mut left = self.parse_multiplicative()?;

        loop {
            let op = match self.current_token() {
                Token::Plus => BinaryOperator::Add,
                Token::Minus => BinaryOperator::Subtract,
                _ => break,
            };

            self.consume()?;
            let right = self.parse_multiplicative()?;
            left = self.binary(op, left, right)?;
        }

        Ok(left)
    }

    fn parse_multiplicative(&mut self) -> FormulaResult<Subtree> {
        let mut left = self.parse_unary()?;

        loop {
            let op = match self.current_token() {
                Token::Star => BinaryOperator::Multiply,
                Token::Slash => BinaryOperator::Divide,
                _ => break,
            };

            self.consume()?;
            let right = self.parse_unary()?;
            left = self.binary(op, left, right)?;
        }

        Ok(left)
    }

    fn parse_unary(&mut self) -> FormulaResult<Subtree> {
        let op = match self.current_token() {
            Token::Minus => UnaryOperator::Negate,
            Token::Plus => UnaryOperator::Plus,
            _ => return self.parse_primary(),
        };

        self.consume()?;
        self.enter()?;
        let operand = self.parse_unary()?;
        self.nesting -= 1;

        self.node(
            FormulaExpr::UnaryOp {
                op,
                operand: Box::new(operand.expr),
            },
            operand.height + 1,
        )
    }

    fn parse_primary(&mut self) -> FormulaResult<Subtree> {
        match self.current_token().clone() {
            Token::Number(n) => {
                self.consume()?;
                Ok(Subtree::leaf(FormulaExpr::Number(n)))
            }

            Token::CellRef(pos) => {
                self.consume()?;
                Ok(Subtree::leaf(FormulaExpr::CellRef(pos)))
            }

            Token::LeftParen => {
                self.consume()?;
                self.enter()?;
                let inner = self.parse_expression()?;
                self.expect(&Token::RightParen)?;
                self.nesting -= 1;
                Ok(inner)
            }

            other => Err(FormulaError::Parse(format!(
                "Unexpected token {:?} in '{}'",
                other, self.input
            ))),
        }
    }

    fn binary(
        &self,
        op: BinaryOperator,
        left: Subtree,
        right: Subtree,
    ) -> FormulaResult<Subtree> {
        let height = left.height.max(right.height) + 1;
        self.node(
            FormulaExpr::BinaryOp {
                op,
                left: Box::new(left.expr),
                right: Box::new(right.expr),
            },
            height,
        )
    }

    fn node(&self, expr: FormulaExpr, height: usize) -> FormulaResult<Subtree> {
        if height > MAX_HEIGHT {
            return Err(self.too_deep());
        }
        Ok(Subtree { expr, height })
    }

    /// Open a parenthesis or sign prefix
    fn enter(&mut self) -> FormulaResult<()> {
        self.nesting += 1;
        if self.nesting > MAX_NESTING {
            return Err(self.too_deep());
        }
        Ok(())
    }

    fn too_deep(&self) -> FormulaError {
        let preview: String = self.input.chars().take(32).collect();
        FormulaError::Parse(format!("Expression nested too deeply in '{}...'", preview))
    }
}

/// An expression and the height of its tree
struct Subtree {
    expr: FormulaExpr,
    height: usize,
}

impl Subtree {
    fn leaf(expr: FormulaExpr) -> Self {
        Self { expr, height: 1 }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_parse_number() {
        assert_eq!(parse_formula("42").unwrap(), FormulaExpr::Number(42.0));
        assert_eq!(parse_formula("3.25").unwrap(), FormulaExpr::Number(3.25));
        assert_eq!(parse_formula(".5").unwrap(), FormulaExpr::Number(0.5));
        assert_eq!(parse_formula("1e3").unwrap(), FormulaExpr::Number(1000.0));
        assert_eq!(parse_formula("2E-1").unwrap(), FormulaExpr::Number(0.2));
    }

    #[test]
    fn test_parse_arithmetic_precedence() {
        let ast = parse_formula("1+2*3").unwrap();
        // Should parse as 1+(2*3) due to precedence
        if let FormulaExpr::BinaryOp { op, left, right } = ast {
            assert_eq!(op, BinaryOperator::Add);
            assert_eq!(*left, FormulaExpr::Number(1.0));
            assert!(matches!(
                *right,
                FormulaExpr::BinaryOp {
                    op: BinaryOperator::Multiply,
                    ..
                }
            ));
        } else {
            panic!("Expected BinaryOp");
        }
    }

    #[test]
    fn test_parse_left_associative() {
        let ast = parse_formula("8/4/2").unwrap();
        if let FormulaExpr::BinaryOp { op, left, right } = ast {
            assert_eq!(op, BinaryOperator::Divide);
            assert!(matches!(
                *left,
                FormulaExpr::BinaryOp {
                    op: BinaryOperator::Divide,
                    ..
                }
            ));
            assert_eq!(*right, FormulaExpr::Number(2.0));
        } else {
            panic!("Expected BinaryOp");
        }
    }

    #[test]
    fn test_parse_unary() {
        let ast = parse_formula("-5").unwrap();
        assert_eq!(
            ast,
            FormulaExpr::UnaryOp {
                op: UnaryOperator::Negate,
                operand: Box::new(FormulaExpr::Number(5.0)),
            }
        );

        let ast = parse_formula("+-A1").unwrap();
        assert!(matches!(
            ast,
            FormulaExpr::UnaryOp {
                op: UnaryOperator::Plus,
                ..
            }
        ));
    }

    #[test]
    fn test_parse_cell_reference() {
        assert_eq!(
            parse_formula("B2").unwrap(),
            FormulaExpr::CellRef(Position::new(1, 1))
        );
        assert_eq!(
            parse_formula("  AA10 ").unwrap(),
            FormulaExpr::CellRef(Position::new(9, 26))
        );
    }

    #[test]
    fn test_parse_out_of_grid_reference() {
        assert_eq!(
            parse_formula("ZZZZ1").unwrap(),
            FormulaExpr::CellRef(Position::NONE)
        );
        assert_eq!(
            parse_formula("A99999").unwrap(),
            FormulaExpr::CellRef(Position::NONE)
        );
        assert_eq!(
            parse_formula("#REF!").unwrap(),
            FormulaExpr::CellRef(Position::NONE)
        );
    }

    #[test]
    fn test_parse_parentheses() {
        let ast = parse_formula("(1+2)*3").unwrap();
        if let FormulaExpr::BinaryOp { op, left, right } = ast {
            assert_eq!(op, BinaryOperator::Multiply);
            assert!(matches!(
                *left,
                FormulaExpr::BinaryOp {
                    op: BinaryOperator::Add,
                    ..
                }
            ));
            assert_eq!(*right, FormulaExpr::Number(3.0));
        } else {
            panic!("Expected BinaryOp");
        }
    }

    #[test]
    fn test_parse_errors() {
        for bad in [
            "", " ", "1+", "(1", "1)", "*2", "a1", "A", "A1B", "1 2", "SUM(A1)", "#VALUE!",
            "1e400", "1e", "A1 B1", "$A$1",
        ] {
            assert!(parse_formula(bad).is_err(), "expected error for {:?}", bad);
        }
    }

    #[test]
    fn test_nesting_limit() {
        let parens = |n: usize| format!("{}1{}", "(".repeat(n), ")".repeat(n));
        assert_eq!(parse_formula(&parens(MAX_NESTING)).unwrap(), FormulaExpr::Number(1.0));
        assert!(parse_formula(&parens(MAX_NESTING + 1)).is_err());
        assert!(parse_formula(&parens(100_000)).is_err());

        let signs = |n: usize| format!("{}1", "-".repeat(n));
        assert!(parse_formula(&signs(MAX_NESTING)).is_ok());
        assert!(parse_formula(&signs(100_000)).is_err());
    }

    #[test]
    fn test_long_chain_limit() {
        let chain = |terms: usize| vec!["1"; terms].join("+");
        assert!(parse_formula(&chain(MAX_HEIGHT / 2)).is_ok());

        let err = parse_formula(&chain(100_000)).unwrap_err();
        assert!(err.to_string().contains("nested too deeply"), "{}", err);
        assert!(parse_formula(&vec!["A1"; 100_000].join("*")).is_err());
    }
}
