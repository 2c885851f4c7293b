use super::ast::Statement;
use super::{lex, parse, Error, LineNumber};

/// One parsed line of input: the optional line number, the statements, and
/// a normalized copy of the source text kept for `LIST`.
#[derive(Debug, PartialEq)]
pub struct Line {
    number: LineNumber,
    text: String,
    statements: Vec<Statement>,
}

impl Line {
    pub fn parse(source: &str) -> Result<Line, Error> {
        let (number, tokens) = lex::lex(source)?;
        let statements = parse(&tokens)?;
        let (_, rest) = lex::split_line_number(source)?;
        Ok(Line {
            number,
            text: normalize(rest.trim_end()),
            statements,
        })
    }

    pub fn number(&self) -> LineNumber {
        self.number
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn statements(&self) -> &[Statement] {
        &self.statements
    }
}

impl std::fmt::Display for Line {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self.number {
            Some(number) => write!(f, "{} {}", number, self.text),
            None => write!(f, "{}", self.text),
        }
    }
}

/// Uppercase everything outside string literals.
fn normalize(source: &str) -> String {
    let mut out = String::with_capacity(source.len());
    let mut quoted = false;
    for ch in source.chars() {
        if ch == '"' {
            quoted = !quoted;
        }
        if quoted {
            out.push(ch);
        } else {
            out.push(ch.to_ascii_uppercase());
        }
    }
    out
}
