/*!
 * Arithmetic evaluator for timing expressions.
 *
 * Recursive descent over `+ - * /`, unary signs and parentheses with the
 * usual precedence. Numbers are non-negative decimal integer literals;
 * results are `f64` so `/` behaves like the template language does.
 */

use crate::errors::ExpressionError;

/// Evaluates an arithmetic expression such as `(90 + 30) * 2`
pub fn evaluate(expression: &str) -> Result<f64, ExpressionError> {
    let mut parser = Parser {
        src: expression.as_bytes(),
        pos: 0,
    };
    let value = parser.expr()?;
    parser.skip_whitespace();
    match parser.peek() {
        None => Ok(value),
        Some(_) => Err(parser.unexpected()),
    }
}

struct Parser<'a> {
    src: &'a [u8],
    pos: usize,
}

impl Parser<'_> {
    // expr := term (('+' | '-') term)*
    fn expr(&mut self) -> Result<f64, ExpressionError> {
        let mut value = self.term()?;
        loop {
            self.skip_whitespace();
            match self.peek() {
                Some(b'+') => {
                    self.pos += 1;
                    value += self.term()?;
                }
                Some(b'-') => {
                    self.pos += 1;
                    value -= self.term()?;
                }
                _ => return Ok(value),
            }
        }
    }

    // term := unary (('*' | '/') unary)*
    fn term(&mut self) -> Result<f64, ExpressionError> {
        let mut value = self.unary()?;
        loop {
            self.skip_whitespace();
            match self.peek() {
                Some(b'*') => {
                    self.pos += 1;
                    value *= self.unary()?;
                }
                Some(b'/') => {
                    self.pos += 1;
                    let divisor = self.unary()?;
                    if divisor == 0.0 {
                        return Err(ExpressionError::DivisionByZero);
                    }
                    value /= divisor;
                }
                _ => return Ok(value),
            }
        }
    }

    // unary := ('+' | '-') unary | primary
    fn unary(&mut self) -> Result<f64, ExpressionError> {
        self.skip_whitespace();
        match self.peek() {
            Some(b'+') => {
                self.pos += 1;
                self.unary()
            }
            Some(b'-') => {
                self.pos += 1;
                Ok(-self.unary()?)
            }
            _ => self.primary(),
        }
    }

    // primary := number | '(' expr ')'
    fn primary(&mut self) -> Result<f64, ExpressionError> {
        self.skip_whitespace();
        match self.peek() {
            Some(b'(') => {
                self.pos += 1;
                let value = self.expr()?;
                self.skip_whitespace();
                match self.peek() {
                    Some(b')') => {
                        self.pos += 1;
                        Ok(value)
                    }
                    Some(_) => Err(self.unexpected()),
                    None => Err(ExpressionError::UnexpectedEnd),
                }
            }
            Some(b) if b.is_ascii_digit() => self.number(),
            Some(_) => Err(self.unexpected()),
            None => Err(ExpressionError::UnexpectedEnd),
        }
    }

    fn number(&mut self) -> Result<f64, ExpressionError> {
        let start = self.pos;
        while self.peek().is_some_and(|b| b.is_ascii_digit()) {
            self.pos += 1;
        }
        let literal = String::from_utf8_lossy(&self.src[start..self.pos]);
        literal
            .parse::<f64>()
            .ok()
            .filter(|v| v.is_finite())
            .ok_or_else(|| ExpressionError::InvalidNumber(literal.into_owned()))
    }

    fn skip_whitespace(&mut self) {
        while self.peek().is_some_and(|b| b.is_ascii_whitespace()) {
            self.pos += 1;
        }
    }

    fn peek(&self) -> Option<u8> {
        self.src.get(self.pos).copied()
    }

    fn unexpected(&self) -> ExpressionError {
        let found = std::str::from_utf8(&self.src[self.pos..])
            .ok()
            .and_then(|rest| rest.chars().next())
            .unwrap_or(char::REPLACEMENT_CHARACTER);
        ExpressionError::UnexpectedChar {
            found,
            offset: self.pos,
        }
    }
}
