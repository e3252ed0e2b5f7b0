//! Build constraints from Go file headers.
//!
//! A `//go:build` line carries a boolean expression over build tags
//! (`&&`, `||`, `!`, parentheses). Legacy `// +build` lines list
//! space-separated alternatives of comma-separated terms; every such line
//! must hold. When a file has a `//go:build` line its `// +build` lines are
//! not consulted.

use std::iter::Peekable;
use std::str::Chars;

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Constraints {
    go_build: Option<String>,
    plus_build: Vec<String>,
}

impl Constraints {
    /// Records `line` if it is a constraint comment. Returns false otherwise.
    pub fn record(&mut self, line: &str) -> bool {
        if let Some(expr) = line.strip_prefix("//go:build") {
            if self.go_build.is_none() {
                self.go_build = Some(expr.trim().to_string());
            }
            return true;
        }
        if let Some(terms) = line.strip_prefix("// +build") {
            self.plus_build.push(terms.trim().to_string());
            return true;
        }
        false
    }

    pub fn is_empty(&self) -> bool {
        self.go_build.is_none() && self.plus_build.is_empty()
    }

    /// Whether a build with the tags accepted by `tag` includes the file.
    /// A malformed `//go:build` expression never holds.
    pub fn satisfied_by(&self, tag: impl Fn(&str) -> bool) -> bool {
        match &self.go_build {
            Some(expr) => eval_expr(expr, &tag).unwrap_or(false),
            None => self
                .plus_build
                .iter()
                .all(|line| eval_plus_build(line, &tag)),
        }
    }
}

fn eval_plus_build(line: &str, tag: &dyn Fn(&str) -> bool) -> bool {
    line.split_whitespace().any(|option| {
        option.split(',').all(|term| match term.strip_prefix('!') {
            Some(name) => !name.is_empty() && !tag(name),
            None => !term.is_empty() && tag(term),
        })
    })
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Token {
    Tag(String),
    Not,
    And,
    Or,
    Open,
    Close,
}

fn tokenize(expr: &str) -> Option<Vec<Token>> {
    let mut tokens = Vec::new();
    let mut chars: Peekable<Chars<'_>> = expr.chars().peekable();

    while let Some(&ch) = chars.peek() {
        match ch {
            c if c.is_whitespace() => {
                chars.next();
            }
            '!' => {
                chars.next();
                tokens.push(Token::Not);
            }
            '(' => {
                chars.next();
                tokens.push(Token::Open);
            }
            ')' => {
                chars.next();
                tokens.push(Token::Close);
            }
            '&' | '|' => {
                chars.next();
                if chars.next() != Some(ch) {
                    return None;
                }
                tokens.push(if ch == '&' { Token::And } else { Token::Or });
            }
            c if c.is_alphanumeric() || c == '_' || c == '.' => {
                let mut name = String::new();
                while let Some(&c) = chars.peek() {
                    if c.is_alphanumeric() || c == '_' || c == '.' {
                        name.push(c);
                        chars.next();
                    } else {
                        break;
                    }
                }
                tokens.push(Token::Tag(name));
            }
            _ => return None,
        }
    }
    Some(tokens)
}

/// Recursive descent over `or := and ('||' and)*`, `and := unary ('&&' unary)*`,
/// `unary := '!' unary | '(' or ')' | tag`.
struct ExprParser<'a> {
    tokens: &'a [Token],
    pos: usize,
    tag: &'a dyn Fn(&str) -> bool,
}

impl ExprParser<'_> {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn next(&mut self) -> Option<&Token> {
        let token = self.tokens.get(self.pos);
        self.pos += 1;
        token
    }

    fn or(&mut self) -> Option<bool> {
        let mut value = self.and()?;
        while self.peek() == Some(&Token::Or) {
            self.pos += 1;
            let rhs = self.and()?;
            value = value || rhs;
        }
        Some(value)
    }

    fn and(&mut self) -> Option<bool> {
        let mut value = self.unary()?;
        while self.peek() == Some(&Token::And) {
            self.pos += 1;
            let rhs = self.unary()?;
            value = value && rhs;
        }
        Some(value)
    }

    fn unary(&mut self) -> Option<bool> {
        match self.next()?.clone() {
            Token::Not => self.unary().map(|v| !v),
            Token::Open => {
                let value = self.or()?;
                (self.next() == Some(&Token::Close)).then_some(value)
            }
            Token::Tag(name) => Some((self.tag)(&name)),
            _ => None,
        }
    }
}

fn eval_expr(expr: &str, tag: &dyn Fn(&str) -> bool) -> Option<bool> {
    let tokens = tokenize(expr)?;
    let mut parser = ExprParser {
        tokens: &tokens,
        pos: 0,
        tag,
    };
    let value = parser.or()?;
    (parser.pos == tokens.len()).then_some(value)
}
