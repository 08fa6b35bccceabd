//! Popularity index expressions to rescore recommendations.
//!
//! An expression is an arithmetic formula over the base co-citation score and the
//! statistics of the recommended article, e.g. `x * log(z / (y + 1))`.
//!
//! | variable | value                                   |
//! |----------|-----------------------------------------|
//! | `x`      | base co-citation score                  |
//! | `y`      | out-link count of the target            |
//! | `z`      | number of articles in the corpus        |
//! | `w`      | word count of the target                |
//! | `h`      | headline count of the target            |
//! | `d`      | average link distance of the target     |
//!
//! Supported are numbers, `+ - * / ^`, unary minus, parentheses and the functions
//! `log` (natural), `log10`, `sqrt`, `abs` and `exp`.

use std::{iter::Peekable, str::CharIndices, str::FromStr};

use displaydoc::Display;
use thiserror::Error;

use crate::cpa::stats::ArticleStats;

/// Syntax errors of expressions, positions are byte offsets.
#[derive(Clone, Debug, Display, Error, PartialEq)]
pub enum Error {
    /// Unexpected character `{found}` at position {position}
    UnexpectedChar { position: usize, found: char },
    /// Unexpected `{found}` at position {position}
    UnexpectedToken { position: usize, found: String },
    /// Unexpected end of the expression
    UnexpectedEnd,
    /// Invalid number `{raw}` at position {position}
    InvalidNumber { position: usize, raw: String },
    /// Unknown variable `{name}` at position {position}
    UnknownVariable { position: usize, name: String },
    /// Unknown function `{name}` at position {position}
    UnknownFunction { position: usize, name: String },
}

/// The values of the variables of an expression.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Variables {
    pub score: f64,
    pub out_links: f64,
    pub article_count: f64,
    pub words: f64,
    pub headlines: f64,
    pub avg_link_distance: f64,
}

impl Variables {
    pub fn new(score: f64, stats: &ArticleStats, article_count: usize) -> Self {
        Self {
            score,
            out_links: stats.out_links as f64,
            article_count: article_count as f64,
            words: stats.words as f64,
            headlines: stats.headlines as f64,
            avg_link_distance: stats.avg_link_distance,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
enum Variable {
    Score,
    OutLinks,
    ArticleCount,
    Words,
    Headlines,
    AvgLinkDistance,
}

impl Variable {
    fn parse(name: &str) -> Option<Self> {
        match name {
            "x" => Some(Self::Score),
            "y" => Some(Self::OutLinks),
            "z" => Some(Self::ArticleCount),
            "w" => Some(Self::Words),
            "h" => Some(Self::Headlines),
            "d" => Some(Self::AvgLinkDistance),
            _ => None,
        }
    }

    fn value(self, variables: &Variables) -> f64 {
        match self {
            Self::Score => variables.score,
            Self::OutLinks => variables.out_links,
            Self::ArticleCount => variables.article_count,
            Self::Words => variables.words,
            Self::Headlines => variables.headlines,
            Self::AvgLinkDistance => variables.avg_link_distance,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
enum Function {
    Log,
    Log10,
    Sqrt,
    Abs,
    Exp,
}

impl Function {
    fn parse(name: &str) -> Option<Self> {
        match name {
            "log" => Some(Self::Log),
            "log10" => Some(Self::Log10),
            "sqrt" => Some(Self::Sqrt),
            "abs" => Some(Self::Abs),
            "exp" => Some(Self::Exp),
            _ => None,
        }
    }

    fn apply(self, value: f64) -> f64 {
        match self {
            Self::Log => value.ln(),
            Self::Log10 => value.log10(),
            Self::Sqrt => value.sqrt(),
            Self::Abs => value.abs(),
            Self::Exp => value.exp(),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
enum Operator {
    Add,
    Sub,
    Mul,
    Div,
    Pow,
}

impl Operator {
    fn apply(self, left: f64, right: f64) -> f64 {
        match self {
            Self::Add => left + right,
            Self::Sub => left - right,
            Self::Mul => left * right,
            Self::Div => left / right,
            Self::Pow => left.powf(right),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
enum Node {
    Number(f64),
    Variable(Variable),
    Neg(Box<Node>),
    Binary(Operator, Box<Node>, Box<Node>),
    Call(Function, Box<Node>),
}

impl Node {
    fn evaluate(&self, variables: &Variables) -> f64 {
        match self {
            Self::Number(value) => *value,
            Self::Variable(variable) => variable.value(variables),
            Self::Neg(node) => -node.evaluate(variables),
            Self::Binary(operator, left, right) => {
                operator.apply(left.evaluate(variables), right.evaluate(variables))
            }
            Self::Call(function, argument) => function.apply(argument.evaluate(variables)),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
enum Token {
    Number(f64),
    Ident(String),
    Operator(Operator),
    Open,
    Close,
}

impl Token {
    fn describe(&self) -> String {
        match self {
            Self::Number(value) => value.to_string(),
            Self::Ident(name) => name.clone(),
            Self::Operator(Operator::Add) => "+".into(),
            Self::Operator(Operator::Sub) => "-".into(),
            Self::Operator(Operator::Mul) => "*".into(),
            Self::Operator(Operator::Div) => "/".into(),
            Self::Operator(Operator::Pow) => "^".into(),
            Self::Open => "(".into(),
            Self::Close => ")".into(),
        }
    }
}

fn tokenize(source: &str) -> Result<Vec<(usize, Token)>, Error> {
    fn take_while(
        source: &str,
        chars: &mut Peekable<CharIndices>,
        start: usize,
        predicate: impl Fn(char) -> bool,
    ) -> String {
        let mut end = start;
        while let Some(&(position, c)) = chars.peek() {
            if !predicate(c) {
                break;
            }
            end = position + c.len_utf8();
            chars.next();
        }
        source[start..end].to_string()
    }

    let mut tokens = Vec::new();
    let mut chars = source.char_indices().peekable();
    while let Some(&(position, c)) = chars.peek() {
        let token = match c {
            c if c.is_whitespace() => {
                chars.next();
                continue;
            }
            c if c.is_ascii_digit() || c == '.' => {
                let raw = take_while(source, &mut chars, position, |c| {
                    c.is_ascii_digit() || c == '.'
                });
                let value = raw
                    .parse()
                    .map_err(|_| Error::InvalidNumber { position, raw })?;
                Token::Number(value)
            }
            c if c.is_ascii_alphabetic() => Token::Ident(take_while(
                source,
                &mut chars,
                position,
                |c| c.is_ascii_alphanumeric() || c == '_',
            )),
            _ => {
                let token = match c {
                    '+' => Token::Operator(Operator::Add),
                    '-' => Token::Operator(Operator::Sub),
                    '*' => Token::Operator(Operator::Mul),
                    '/' => Token::Operator(Operator::Div),
                    '^' => Token::Operator(Operator::Pow),
                    '(' => Token::Open,
                    ')' => Token::Close,
                    found => return Err(Error::UnexpectedChar { position, found }),
                };
                chars.next();
                token
            }
        };
        tokens.push((position, token));
    }

    Ok(tokens)
}

/// Recursive descent over the grammar
///
/// ```text
/// sum     = product (("+" | "-") product)*
/// product = unary (("*" | "/") unary)*
/// unary   = "-" unary | power
/// power   = atom ("^" unary)?
/// atom    = number | variable | function "(" sum ")" | "(" sum ")"
/// ```
struct Parser {
    tokens: Vec<(usize, Token)>,
    next: usize,
}

impl Parser {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.next).map(|(_, token)| token)
    }

    fn advance(&mut self) -> Result<(usize, Token), Error> {
        let token = self.tokens.get(self.next).cloned().ok_or(Error::UnexpectedEnd)?;
        self.next += 1;
        Ok(token)
    }

    fn expect(&mut self, expected: &Token) -> Result<(), Error> {
        match self.advance()? {
            (_, token) if &token == expected => Ok(()),
            (position, token) => Err(Error::UnexpectedToken {
                position,
                found: token.describe(),
            }),
        }
    }

    fn sum(&mut self) -> Result<Node, Error> {
        let mut node = self.product()?;
        while let Some(&Token::Operator(operator @ (Operator::Add | Operator::Sub))) = self.peek() {
            self.next += 1;
            node = Node::Binary(operator, Box::new(node), Box::new(self.product()?));
        }
        Ok(node)
    }

    fn product(&mut self) -> Result<Node, Error> {
        let mut node = self.unary()?;
        while let Some(&Token::Operator(operator @ (Operator::Mul | Operator::Div))) = self.peek() {
            self.next += 1;
            node = Node::Binary(operator, Box::new(node), Box::new(self.unary()?));
        }
        Ok(node)
    }

    fn unary(&mut self) -> Result<Node, Error> {
        if let Some(Token::Operator(Operator::Sub)) = self.peek() {
            self.next += 1;
            return Ok(Node::Neg(Box::new(self.unary()?)));
        }
        self.power()
    }

    fn power(&mut self) -> Result<Node, Error> {
        let base = self.atom()?;
        if let Some(Token::Operator(Operator::Pow)) = self.peek() {
            self.next += 1;
            // right associative, `2 ^ 3 ^ 2 == 2 ^ 9`
            let exponent = self.unary()?;
            return Ok(Node::Binary(Operator::Pow, Box::new(base), Box::new(exponent)));
        }
        Ok(base)
    }

    fn atom(&mut self) -> Result<Node, Error> {
        match self.advance()? {
            (_, Token::Number(value)) => Ok(Node::Number(value)),
            (position, Token::Ident(name)) => {
                if let Some(Token::Open) = self.peek() {
                    let function = Function::parse(&name)
                        .ok_or(Error::UnknownFunction { position, name })?;
                    self.next += 1;
                    let argument = self.sum()?;
                    self.expect(&Token::Close)?;
                    Ok(Node::Call(function, Box::new(argument)))
                } else {
                    Variable::parse(&name)
                        .map(Node::Variable)
                        .ok_or(Error::UnknownVariable { position, name })
                }
            }
            (_, Token::Open) => {
                let node = self.sum()?;
                self.expect(&Token::Close)?;
                Ok(node)
            }
            (position, token) => Err(Error::UnexpectedToken {
                position,
                found: token.describe(),
            }),
        }
    }
}

/// A parsed popularity index expression.
#[derive(Clone, Debug, PartialEq)]
pub struct Expression(Node);

impl Expression {
    /// Parses and validates the expression.
    pub fn parse(source: &str) -> Result<Self, Error> {
        let mut parser = Parser {
            tokens: tokenize(source)?,
            next: 0,
        };
        let node = parser.sum()?;

        match parser.tokens.get(parser.next) {
            None => Ok(Self(node)),
            Some((position, token)) => Err(Error::UnexpectedToken {
                position: *position,
                found: token.describe(),
            }),
        }
    }

    pub fn evaluate(&self, variables: &Variables) -> f64 {
        self.0.evaluate(variables)
    }
}

impl FromStr for Expression {
    type Err = Error;

    fn from_str(source: &str) -> Result<Self, Self::Err> {
        Self::parse(source)
    }
}
