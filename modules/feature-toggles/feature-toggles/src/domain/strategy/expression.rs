//! Boolean expressions over other features' enabled states.
//!
//! Grammar, lowest precedence first:
//!
//! ```text
//! expr   := term ( '|' term )*
//! term   := factor ( '&' factor )*
//! factor := '!' factor | '(' expr ')' | UID
//! ```

use std::collections::HashMap;
use std::iter::Peekable;
use std::str::CharIndices;

use async_trait::async_trait;

use super::{FlipStrategy, StrategyParams};
use crate::domain::error::DomainError;
use crate::domain::store::FeatureStore;

const EXPRESSION: &str = "expression";

/// Deepest nesting of parentheses and negations accepted by the parser.
pub const MAX_NESTING: usize = 64;

#[derive(Debug, Clone, PartialEq, Eq)]
enum Token {
    Uid(String),
    Or,
    And,
    Not,
    Open,
    Close,
}

fn tokenize(input: &str) -> Vec<Token> {
    let mut tokens = Vec::new();
    let mut chars: Peekable<CharIndices<'_>> = input.char_indices().peekable();
    while let Some((start, c)) = chars.next() {
        match c {
            '|' => tokens.push(Token::Or),
            '&' => tokens.push(Token::And),
            '!' => tokens.push(Token::Not),
            '(' => tokens.push(Token::Open),
            ')' => tokens.push(Token::Close),
            c if c.is_whitespace() => {}
            _ => {
                let mut end = start + c.len_utf8();
                while let Some(&(i, next)) = chars.peek() {
                    if next.is_whitespace() || "|&!()".contains(next) {
                        break;
                    }
                    end = i + next.len_utf8();
                    chars.next();
                }
                tokens.push(Token::Uid(input[start..end].to_owned()));
            }
        }
    }
    tokens
}

/// A parsed flip expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Expression {
    Uid(String),
    Not(Box<Expression>),
    And(Vec<Expression>),
    Or(Vec<Expression>),
}

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
    depth: usize,
}

impl Parser {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn advance(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.pos).cloned();
        self.pos += 1;
        token
    }

    fn expr(&mut self) -> Result<Expression, String> {
        let mut terms = vec![self.term()?];
        while self.peek() == Some(&Token::Or) {
            self.pos += 1;
            terms.push(self.term()?);
        }
        Ok(if terms.len() == 1 {
            terms.remove(0)
        } else {
            Expression::Or(terms)
        })
    }

    fn term(&mut self) -> Result<Expression, String> {
        let mut factors = vec![self.factor()?];
        while self.peek() == Some(&Token::And) {
            self.pos += 1;
            factors.push(self.factor()?);
        }
        Ok(if factors.len() == 1 {
            factors.remove(0)
        } else {
            Expression::And(factors)
        })
    }

    fn factor(&mut self) -> Result<Expression, String> {
        if self.depth >= MAX_NESTING {
            return Err("nesting too deep".to_owned());
        }
        self.depth += 1;
        let factor = self.nested_factor();
        self.depth -= 1;
        factor
    }

    fn nested_factor(&mut self) -> Result<Expression, String> {
        match self.advance() {
            Some(Token::Not) => Ok(Expression::Not(Box::new(self.factor()?))),
            Some(Token::Open) => {
                let inner = self.expr()?;
                match self.advance() {
                    Some(Token::Close) => Ok(inner),
                    _ => Err("missing closing parenthesis".to_owned()),
                }
            }
            Some(Token::Uid(uid)) => Ok(Expression::Uid(uid)),
            Some(other) => Err(format!("unexpected token {other:?}")),
            None => Err("unexpected end of expression".to_owned()),
        }
    }
}

impl Expression {
    /// # Errors
    ///
    /// A description of the first syntax error.
    pub fn parse(input: &str) -> Result<Self, String> {
        let tokens = tokenize(input);
        if tokens.is_empty() {
            return Err("expression is empty".to_owned());
        }
        let mut parser = Parser {
            tokens,
            pos: 0,
            depth: 0,
        };
        let expression = parser.expr()?;
        if let Some(token) = parser.peek() {
            return Err(format!("unexpected token {token:?}"));
        }
        Ok(expression)
    }

    /// Evaluate with `state` giving the value of each referenced UID.
    #[must_use]
    pub fn evaluate(&self, state: &impl Fn(&str) -> bool) -> bool {
        match self {
            Self::Uid(uid) => state(uid),
            Self::Not(inner) => !inner.evaluate(state),
            Self::And(all) => all.iter().all(|e| e.evaluate(state)),
            Self::Or(any) => any.iter().any(|e| e.evaluate(state)),
        }
    }
}

/// Turns the feature on when `expression` holds over the enabled flags of the features
/// it names. Unknown UIDs read as disabled.
#[derive(Debug, Clone, Copy, Default)]
pub struct ExpressionStrategy;

impl ExpressionStrategy {
    fn expression(params: &StrategyParams) -> Result<Expression, DomainError> {
        Expression::parse(params.required(EXPRESSION)?)
            .map_err(|message| DomainError::invalid_parameter(EXPRESSION, message))
    }
}

#[async_trait]
impl FlipStrategy for ExpressionStrategy {
    fn name(&self) -> &str {
        "Expression"
    }

    fn validate(&self, stored: &StrategyParams) -> Result<(), DomainError> {
        Self::expression(stored).map(|_| ())
    }

    async fn evaluate(
        &self,
        _uid: &str,
        params: &StrategyParams,
        store: &dyn FeatureStore,
    ) -> Result<bool, DomainError> {
        let expression = Self::expression(params)?;
        let states: HashMap<String, bool> = store
            .list_all()
            .await?
            .into_iter()
            .map(|feature| (feature.uid, feature.enabled))
            .collect();
        Ok(expression.evaluate(&|uid| states.get(uid).copied().unwrap_or(false)))
    }
}
