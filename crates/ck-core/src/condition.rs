//! Boolean filter expressions over list rows.
//!
//! A check gathers candidate items as rows (field name → text value) and
//! uses conditions such as `state = running and name like sql` both to pick
//! which rows are kept (`filter=`) and to flag rows as warning or critical
//! (`warn=`, `crit=`).
//!
//! # Grammar
//!
//! ```text
//! expr    := and (("or" | "||") and)*
//! and     := unary (("and" | "&&") unary)*
//! unary   := ("not" | "!") unary | "(" expr ")" | compare
//! compare := ident op value | ident ["not"] "in" "(" value ("," value)* ")"
//! op      := = | == | != | < | <= | > | >= | like | unlike | not like
//!          | ~ | !~ | regexp
//! ```
//!
//! Values are bare words or single/double quoted strings. A comparison on a
//! field the row does not carry is false, whatever the operator.

use regex::{Regex, RegexBuilder};
use std::collections::BTreeMap;
use std::fmt;
use thiserror::Error;

/// One list row: field name → value.
pub type Row = BTreeMap<String, String>;

/// Errors from parsing a condition expression.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConditionError {
    #[error("empty condition")]
    Empty,

    #[error("unexpected end of condition, expected {expected}")]
    UnexpectedEnd { expected: &'static str },

    #[error("unexpected {found:?} in condition, expected {expected}")]
    UnexpectedToken {
        found: String,
        expected: &'static str,
    },

    #[error("unterminated quote in condition")]
    UnterminatedQuote,

    #[error("invalid regular expression {pattern:?}: {message}")]
    InvalidRegex { pattern: String, message: String },
}

/// Comparison operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    Equal,
    NotEqual,
    Less,
    LessEqual,
    Greater,
    GreaterEqual,
    Like,
    Unlike,
    Regex,
    NotRegex,
}

impl Operator {
    pub fn as_str(self) -> &'static str {
        match self {
            Operator::Equal => "=",
            Operator::NotEqual => "!=",
            Operator::Less => "<",
            Operator::LessEqual => "<=",
            Operator::Greater => ">",
            Operator::GreaterEqual => ">=",
            Operator::Like => "like",
            Operator::Unlike => "unlike",
            Operator::Regex => "~",
            Operator::NotRegex => "!~",
        }
    }
}

/// A parsed condition expression.
#[derive(Debug, Clone)]
pub enum Condition {
    Compare {
        field: String,
        op: Operator,
        value: String,
        pattern: Option<Regex>,
    },
    In {
        field: String,
        values: Vec<String>,
        negated: bool,
    },
    Not(Box<Condition>),
    And(Vec<Condition>),
    Or(Vec<Condition>),
}

impl Condition {
    /// Parse a condition expression.
    pub fn parse(text: &str) -> Result<Self, ConditionError> {
        let tokens = tokenize(text)?;
        if tokens.is_empty() {
            return Err(ConditionError::Empty);
        }
        let mut parser = Parser { tokens, pos: 0 };
        let condition = parser.parse_or()?;
        match parser.peek() {
            None => Ok(condition),
            Some(token) => Err(ConditionError::UnexpectedToken {
                found: token.to_string(),
                expected: "end of condition",
            }),
        }
    }

    /// Evaluate against a row.
    pub fn matches(&self, row: &Row) -> bool {
        match self {
            Condition::Compare {
                field,
                op,
                value,
                pattern,
            } => match row.get(field) {
                Some(actual) => compare(actual, *op, value, pattern.as_ref()),
                None => false,
            },
            Condition::In {
                field,
                values,
                negated,
            } => match row.get(field) {
                Some(actual) => values.iter().any(|v| v == actual) != *negated,
                None => false,
            },
            Condition::Not(inner) => !inner.matches(row),
            Condition::And(parts) => parts.iter().all(|c| c.matches(row)),
            Condition::Or(parts) => parts.iter().any(|c| c.matches(row)),
        }
    }

    /// Every field name the expression refers to.
    pub fn fields(&self) -> Vec<&str> {
        let mut out = Vec::new();
        self.collect_fields(&mut out);
        out.sort_unstable();
        out.dedup();
        out
    }

    fn collect_fields<'a>(&'a self, out: &mut Vec<&'a str>) {
        match self {
            Condition::Compare { field, .. } | Condition::In { field, .. } => out.push(field),
            Condition::Not(inner) => inner.collect_fields(out),
            Condition::And(parts) | Condition::Or(parts) => {
                for part in parts {
                    part.collect_fields(out);
                }
            }
        }
    }

    /// Express the condition as performance-data range text for `field`.
    ///
    /// Only simple shapes have a range equivalent: `x > N` becomes `N:`,
    /// `x < N` becomes `~:N` and `x < A or x > B` becomes `@A:B`. Range
    /// bounds are inclusive, so strict comparisons widen by the bound itself.
    pub fn to_range_text(&self, field: &str) -> Option<String> {
        match self {
            Condition::Compare {
                field: f, op, value, ..
            } if f == field => {
                let bound = parse_number(value)?;
                let bound = ck_convert::num_to_string(bound).ok()?;
                match op {
                    Operator::Greater | Operator::GreaterEqual => Some(format!("{}:", bound)),
                    Operator::Less | Operator::LessEqual => Some(format!("~:{}", bound)),
                    _ => None,
                }
            }
            Condition::Or(parts) if parts.len() == 2 => {
                let low = parts.iter().find_map(|p| p.lower_bound(field))?;
                let high = parts.iter().find_map(|p| p.upper_bound(field))?;
                if low > high {
                    return None;
                }
                Some(format!(
                    "@{}:{}",
                    ck_convert::num_to_string(low).ok()?,
                    ck_convert::num_to_string(high).ok()?
                ))
            }
            _ => None,
        }
    }

    // `x < N` → alert below N.
    fn lower_bound(&self, field: &str) -> Option<f64> {
        match self {
            Condition::Compare {
                field: f,
                op: Operator::Less | Operator::LessEqual,
                value,
                ..
            } if f == field => parse_number(value),
            _ => None,
        }
    }

    // `x > N` → alert above N.
    fn upper_bound(&self, field: &str) -> Option<f64> {
        match self {
            Condition::Compare {
                field: f,
                op: Operator::Greater | Operator::GreaterEqual,
                value,
                ..
            } if f == field => parse_number(value),
            _ => None,
        }
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Condition::Compare {
                field, op, value, ..
            } => write!(f, "{} {} {}", field, op.as_str(), quote(value)),
            Condition::In {
                field,
                values,
                negated,
            } => {
                let list: Vec<String> = values.iter().map(|v| quote(v)).collect();
                let op = if *negated { "not in" } else { "in" };
                write!(f, "{} {} ({})", field, op, list.join(", "))
            }
            Condition::Not(inner) => write!(f, "not ({})", inner),
            Condition::And(parts) => write_joined(f, parts, " and "),
            Condition::Or(parts) => write_joined(f, parts, " or "),
        }
    }
}

fn write_joined(f: &mut fmt::Formatter<'_>, parts: &[Condition], sep: &str) -> fmt::Result {
    for (idx, part) in parts.iter().enumerate() {
        if idx > 0 {
            f.write_str(sep)?;
        }
        match part {
            Condition::And(_) | Condition::Or(_) => write!(f, "({})", part)?,
            _ => write!(f, "{}", part)?,
        }
    }
    Ok(())
}

fn quote(value: &str) -> String {
    let plain = !value.is_empty()
        && value
            .chars()
            .all(|c| !c.is_whitespace() && !"()=!<>~,'\"&|".contains(c));
    if plain {
        value.to_string()
    } else if !value.contains('\'') {
        format!("'{}'", value)
    } else if !value.contains('"') {
        format!("\"{}\"", value)
    } else {
        format!("'{}'", value.replace('\'', "''"))
    }
}

/// Evaluate an optional list of conditions the way filters and thresholds
/// use them: an empty list yields `default_on_empty`, otherwise any match
/// counts.
pub fn match_any(conditions: &[Condition], row: &Row, default_on_empty: bool) -> bool {
    if conditions.is_empty() {
        return default_on_empty;
    }
    conditions.iter().any(|c| c.matches(row))
}

fn compare(actual: &str, op: Operator, expected: &str, pattern: Option<&Regex>) -> bool {
    match op {
        Operator::Equal | Operator::NotEqual => {
            let equal = match (parse_number(actual), parse_number(expected)) {
                (Some(a), Some(b)) => a == b,
                _ => actual == expected,
            };
            equal == (op == Operator::Equal)
        }
        Operator::Less | Operator::LessEqual | Operator::Greater | Operator::GreaterEqual => {
            let (Some(a), Some(b)) = (parse_number(actual), parse_number(expected)) else {
                return false;
            };
            match op {
                Operator::Less => a < b,
                Operator::LessEqual => a <= b,
                Operator::Greater => a > b,
                _ => a >= b,
            }
        }
        Operator::Like => like(actual, expected),
        Operator::Unlike => !like(actual, expected),
        Operator::Regex => pattern.is_some_and(|re| re.is_match(actual)),
        Operator::NotRegex => pattern.is_some_and(|re| !re.is_match(actual)),
    }
}

/// Case-insensitive substring match, with `*` and `?` as wildcards.
fn like(actual: &str, pattern: &str) -> bool {
    let actual = actual.to_lowercase();
    let pattern = pattern.to_lowercase();
    if !pattern.contains(['*', '?']) {
        return actual.contains(&pattern);
    }
    let mut expr = String::from("^");
    for c in pattern.chars() {
        match c {
            '*' => expr.push_str(".*"),
            '?' => expr.push('.'),
            other => expr.push_str(&regex::escape(&other.to_string())),
        }
    }
    expr.push('$');
    Regex::new(&expr).is_ok_and(|re| re.is_match(&actual))
}

/// Parse a number, allowing a trailing unit such as `%` or `MB`.
pub(crate) fn parse_number(text: &str) -> Option<f64> {
    let text = text.trim();
    let split = text
        .char_indices()
        .find(|(_, c)| c.is_alphabetic() || *c == '%')
        .map(|(idx, _)| idx)
        .unwrap_or(text.len());
    let (number, unit) = text.split_at(split);
    if number.is_empty() || !unit.chars().all(|c| c.is_alphabetic() || c == '%') {
        return None;
    }
    number.parse::<f64>().ok().filter(|v| v.is_finite())
}

// ── Tokenizer ───────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Word(String),
    Quoted(String),
    Op(&'static str),
    LParen,
    RParen,
    Comma,
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Word(w) => f.write_str(w),
            Token::Quoted(q) => write!(f, "'{}'", q),
            Token::Op(op) => f.write_str(op),
            Token::LParen => f.write_str("("),
            Token::RParen => f.write_str(")"),
            Token::Comma => f.write_str(","),
        }
    }
}

const OPERATORS: [&str; 12] = [
    "==", "!=", "<=", ">=", "!~", "&&", "||", "=", "<", ">", "~", "!",
];

fn tokenize(text: &str) -> Result<Vec<Token>, ConditionError> {
    let mut tokens = Vec::new();
    let mut rest = text;

    while let Some(c) = rest.chars().next() {
        if c.is_whitespace() {
            rest = &rest[c.len_utf8()..];
            continue;
        }
        match c {
            '(' => tokens.push(Token::LParen),
            ')' => tokens.push(Token::RParen),
            ',' => tokens.push(Token::Comma),
            '\'' | '"' => {
                let (value, after) = read_quoted(&rest[1..], c)?;
                tokens.push(Token::Quoted(value));
                rest = after;
                continue;
            }
            _ => {
                if let Some(op) = OPERATORS.iter().find(|op| rest.starts_with(**op)) {
                    tokens.push(Token::Op(op));
                    rest = &rest[op.len()..];
                    continue;
                }
                let end = rest
                    .find(|ch: char| ch.is_whitespace() || "()=!<>~,&|'\"".contains(ch))
                    .unwrap_or(rest.len())
                    .max(c.len_utf8());
                tokens.push(Token::Word(rest[..end].to_string()));
                rest = &rest[end..];
                continue;
            }
        }
        rest = &rest[1..];
    }

    Ok(tokens)
}

// A doubled quote character inside a quoted value stands for itself.
fn read_quoted(body: &str, quote: char) -> Result<(String, &str), ConditionError> {
    let mut value = String::new();
    let mut chars = body.char_indices().peekable();
    while let Some((idx, c)) = chars.next() {
        if c != quote {
            value.push(c);
            continue;
        }
        if matches!(chars.peek(), Some((_, next)) if *next == quote) {
            value.push(quote);
            chars.next();
            continue;
        }
        return Ok((value, &body[idx + c.len_utf8()..]));
    }
    Err(ConditionError::UnterminatedQuote)
}

// ── Parser ──────────────────────────────────────────────────────────────

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn next(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.pos).cloned();
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    fn peek_keyword(&self, keyword: &str) -> bool {
        matches!(self.peek(), Some(Token::Word(w)) if w.eq_ignore_ascii_case(keyword))
    }

    fn parse_or(&mut self) -> Result<Condition, ConditionError> {
        let mut parts = vec![self.parse_and()?];
        while self.peek_keyword("or") || self.peek() == Some(&Token::Op("||")) {
            self.pos += 1;
            parts.push(self.parse_and()?);
        }
        Ok(if parts.len() == 1 {
            parts.remove(0)
        } else {
            Condition::Or(parts)
        })
    }

    fn parse_and(&mut self) -> Result<Condition, ConditionError> {
        let mut parts = vec![self.parse_unary()?];
        while self.peek_keyword("and") || self.peek() == Some(&Token::Op("&&")) {
            self.pos += 1;
            parts.push(self.parse_unary()?);
        }
        Ok(if parts.len() == 1 {
            parts.remove(0)
        } else {
            Condition::And(parts)
        })
    }

    fn parse_unary(&mut self) -> Result<Condition, ConditionError> {
        if self.peek_keyword("not") || self.peek() == Some(&Token::Op("!")) {
            self.pos += 1;
            return Ok(Condition::Not(Box::new(self.parse_unary()?)));
        }
        if self.peek() == Some(&Token::LParen) {
            self.pos += 1;
            let inner = self.parse_or()?;
            self.expect(Token::RParen, "')'")?;
            return Ok(inner);
        }
        self.parse_compare()
    }

    fn parse_compare(&mut self) -> Result<Condition, ConditionError> {
        let field = match self.next() {
            Some(Token::Word(w)) => w,
            Some(other) => {
                return Err(ConditionError::UnexpectedToken {
                    found: other.to_string(),
                    expected: "attribute name",
                })
            }
            None => {
                return Err(ConditionError::UnexpectedEnd {
                    expected: "attribute name",
                })
            }
        };

        let op = match self.next() {
            Some(Token::Op("=")) | Some(Token::Op("==")) => Operator::Equal,
            Some(Token::Op("!=")) => Operator::NotEqual,
            Some(Token::Op("<")) => Operator::Less,
            Some(Token::Op("<=")) => Operator::LessEqual,
            Some(Token::Op(">")) => Operator::Greater,
            Some(Token::Op(">=")) => Operator::GreaterEqual,
            Some(Token::Op("~")) => Operator::Regex,
            Some(Token::Op("!~")) => Operator::NotRegex,
            Some(Token::Word(w)) => match w.to_ascii_lowercase().as_str() {
                "like" => Operator::Like,
                "unlike" => Operator::Unlike,
                "regexp" => Operator::Regex,
                "in" => return self.parse_in(field, false),
                "not" => {
                    if self.peek_keyword("like") {
                        self.pos += 1;
                        Operator::Unlike
                    } else if self.peek_keyword("in") {
                        self.pos += 1;
                        return self.parse_in(field, true);
                    } else {
                        return Err(self.unexpected("'like' or 'in' after 'not'"));
                    }
                }
                _ => {
                    return Err(ConditionError::UnexpectedToken {
                        found: w,
                        expected: "operator",
                    })
                }
            },
            Some(other) => {
                return Err(ConditionError::UnexpectedToken {
                    found: other.to_string(),
                    expected: "operator",
                })
            }
            None => return Err(ConditionError::UnexpectedEnd { expected: "operator" }),
        };

        let value = self.parse_value()?;
        let pattern = match op {
            Operator::Regex | Operator::NotRegex => Some(compile_pattern(&value)?),
            _ => None,
        };
        Ok(Condition::Compare {
            field,
            op,
            value,
            pattern,
        })
    }

    fn parse_in(&mut self, field: String, negated: bool) -> Result<Condition, ConditionError> {
        self.expect(Token::LParen, "'('")?;
        let mut values = vec![self.parse_value()?];
        while self.peek() == Some(&Token::Comma) {
            self.pos += 1;
            values.push(self.parse_value()?);
        }
        self.expect(Token::RParen, "')'")?;
        Ok(Condition::In {
            field,
            values,
            negated,
        })
    }

    fn parse_value(&mut self) -> Result<String, ConditionError> {
        match self.next() {
            Some(Token::Word(w)) | Some(Token::Quoted(w)) => Ok(w),
            Some(other) => Err(ConditionError::UnexpectedToken {
                found: other.to_string(),
                expected: "value",
            }),
            None => Err(ConditionError::UnexpectedEnd { expected: "value" }),
        }
    }

    fn expect(&mut self, token: Token, expected: &'static str) -> Result<(), ConditionError> {
        match self.next() {
            Some(t) if t == token => Ok(()),
            Some(other) => Err(ConditionError::UnexpectedToken {
                found: other.to_string(),
                expected,
            }),
            None => Err(ConditionError::UnexpectedEnd { expected }),
        }
    }

    fn unexpected(&self, expected: &'static str) -> ConditionError {
        match self.peek() {
            Some(token) => ConditionError::UnexpectedToken {
                found: token.to_string(),
                expected,
            },
            None => ConditionError::UnexpectedEnd { expected },
        }
    }
}

/// Compile a regex value; `/pattern/i` is matched case-insensitively.
fn compile_pattern(value: &str) -> Result<Regex, ConditionError> {
    let (pattern, insensitive) = match value
        .strip_prefix('/')
        .and_then(|v| v.rsplit_once('/'))
    {
        Some((body, "i")) => (body, true),
        Some((body, "")) => (body, false),
        _ => (value, false),
    };
    RegexBuilder::new(pattern)
        .case_insensitive(insensitive)
        .build()
        .map_err(|e| ConditionError::InvalidRegex {
            pattern: value.to_string(),
            message: e.to_string(),
        })
}
