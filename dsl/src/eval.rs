//! A sandboxed constant-arithmetic evaluator for literal text.
//!
//! Documents may give a numeric literal as arithmetic-looking text such as
//! `"3.0 * 2"`. Those are folded to a constant at load time. The grammar is
//! deliberately tiny: numbers, the four arithmetic operators, unary minus
//! and parentheses. Nothing else evaluates.

use logos::Logos;
use thiserror::Error;

#[derive(Logos, Debug, Clone, Copy, PartialEq)]
#[logos(skip r"[ \t]+")]
enum Token {
    #[regex(r"[0-9]+(\.[0-9]+)?([eE][+-]?[0-9]+)?", |lex| lex.slice().parse::<f64>().ok())]
    Number(f64),

    #[token("+")]
    Plus,
    #[token("-")]
    Minus,
    #[token("*")]
    Star,
    #[token("/")]
    Slash,
    #[token("(")]
    LeftParen,
    #[token(")")]
    RightParen,
}

#[derive(Debug, Error, PartialEq)]
pub enum EvalError {
    #[error("unrecognized input in constant expression")]
    InvalidToken,
    #[error("constant expression ended unexpectedly")]
    UnexpectedEnd,
    #[error("unexpected trailing input in constant expression")]
    TrailingInput,
}

/// Evaluates constant arithmetic text to a number.
///
/// Returns an error when the text contains anything outside the constant
/// grammar. Callers decide whether the resulting number fits the literal
/// kind they are building.
pub fn evaluate(text: &str) -> Result<f64, EvalError> {
    let tokens: Result<Vec<Token>, _> = Token::lexer(text).collect();
    let tokens = tokens.map_err(|_| EvalError::InvalidToken)?;

    let mut parser = Parser { tokens, at: 0 };
    let value = parser.expression()?;
    if parser.at != parser.tokens.len() {
        return Err(EvalError::TrailingInput);
    }
    Ok(value)
}

struct Parser {
    tokens: Vec<Token>,
    at: usize,
}

impl Parser {
    fn peek(&self) -> Option<Token> {
        self.tokens.get(self.at).copied()
    }

    fn advance(&mut self) -> Result<Token, EvalError> {
        let token = self.peek().ok_or(EvalError::UnexpectedEnd)?;
        self.at += 1;
        Ok(token)
    }

    fn expression(&mut self) -> Result<f64, EvalError> {
        let mut value = self.term()?;
        while let Some(token) = self.peek() {
            match token {
                Token::Plus => {
                    self.at += 1;
                    value += self.term()?;
                }
                Token::Minus => {
                    self.at += 1;
                    value -= self.term()?;
                }
                _ => break,
            }
        }
        Ok(value)
    }

    fn term(&mut self) -> Result<f64, EvalError> {
        let mut value = self.factor()?;
        while let Some(token) = self.peek() {
            match token {
                Token::Star => {
                    self.at += 1;
                    value *= self.factor()?;
                }
                Token::Slash => {
                    self.at += 1;
                    value /= self.factor()?;
                }
                _ => break,
            }
        }
        Ok(value)
    }

    fn factor(&mut self) -> Result<f64, EvalError> {
        match self.advance()? {
            Token::Number(value) => Ok(value),
            Token::Minus => Ok(-self.factor()?),
            Token::LeftParen => {
                let value = self.expression()?;
                match self.advance()? {
                    Token::RightParen => Ok(value),
                    _ => Err(EvalError::TrailingInput),
                }
            }
            _ => Err(EvalError::InvalidToken),
        }
    }
}
