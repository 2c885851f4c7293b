use super::{token::*, Error, LineNumber, MaxValue};
use crate::error;

type Result<T> = std::result::Result<T, Error>;

/// Tokenize one source line. A leading integer is split off as the line
/// number; `None` means direct mode.
pub fn lex(source_line: &str) -> Result<(LineNumber, Vec<Token>)> {
    let (line_number, rest) = split_line_number(source_line)?;
    let mut lexer = BasicLexer {
        chars: rest.chars().peekable(),
    };
    let mut tokens: Vec<Token> = vec![];
    while let Some(token) = lexer.token()? {
        let remark = matches!(token, Token::Word(Word::Rem));
        tokens.push(token);
        if remark {
            let comment: String = lexer.chars.by_ref().collect();
            let comment = comment.trim().to_string();
            if !comment.is_empty() {
                tokens.push(Token::Remark(comment));
            }
            break;
        }
    }
    Ok((line_number, tokens))
}

/// Split an optional leading line number from a source line. An explicit
/// leading zero is consumed and the line treated as direct.
pub fn split_line_number(source_line: &str) -> Result<(LineNumber, &str)> {
    let s = source_line.trim_start_matches(is_basic_whitespace);
    let digits = s.chars().take_while(char::is_ascii_digit).count();
    if digits == 0 {
        return Ok((None, s));
    }
    if digits > 5 {
        return Err(error!(IllegalLineNumber));
    }
    let number = s[..digits].parse::<u32>().unwrap();
    if number > LineNumber::max_value() as u32 {
        return Err(error!(IllegalLineNumber));
    }
    let mut rest = &s[digits..];
    if let Some(stripped) = rest.strip_prefix(' ') {
        rest = stripped;
    }
    if number == 0 {
        Ok((None, rest))
    } else {
        Ok((Some(number as u16), rest))
    }
}

fn is_basic_whitespace(c: char) -> bool {
    c == ' ' || c == '\t'
}

struct BasicLexer<'a> {
    chars: std::iter::Peekable<std::str::Chars<'a>>,
}

impl<'a> BasicLexer<'a> {
    fn token(&mut self) -> Result<Option<Token>> {
        while let Some(&pk) = self.chars.peek() {
            if is_basic_whitespace(pk) {
                self.chars.next();
            } else {
                break;
            }
        }
        let pk = match self.chars.peek() {
            Some(&pk) => pk,
            None => return Ok(None),
        };
        if pk.is_ascii_digit() {
            return Ok(Some(self.number(String::new())));
        }
        if pk.is_ascii_alphabetic() {
            return Ok(Some(self.alphabetic()));
        }
        if pk == '"' {
            return self.string().map(Some);
        }
        self.minutia().map(Some)
    }

    fn number(&mut self, mut s: String) -> Token {
        let mut decimal = s.contains('.');
        while let Some(&pk) = self.chars.peek() {
            if pk.is_ascii_digit() || (pk == '.' && !decimal) {
                if pk == '.' {
                    decimal = true;
                }
                s.push(pk);
                self.chars.next();
            } else {
                break;
            }
        }
        Token::Literal(Literal::Number(s))
    }

    fn string(&mut self) -> Result<Token> {
        let mut s = String::new();
        self.chars.next();
        loop {
            match self.chars.next() {
                Some('"') => return Ok(Token::Literal(Literal::String(s))),
                Some(ch) => s.push(ch),
                None => return Err(error!(SyntaxError)),
            }
        }
    }

    fn alphabetic(&mut self) -> Token {
        let mut s = String::new();
        while let Some(&pk) = self.chars.peek() {
            if pk.is_ascii_alphanumeric() {
                s.push(pk.to_ascii_uppercase());
                self.chars.next();
            } else {
                break;
            }
        }
        if let Some('$') = self.chars.peek() {
            s.push('$');
            self.chars.next();
        }
        match Token::from_word(&s) {
            Some(token) => token,
            None => {
                if s.ends_with('$') {
                    Token::Ident(Ident::String(s))
                } else {
                    Token::Ident(Ident::Plain(s))
                }
            }
        }
    }

    fn minutia(&mut self) -> Result<Token> {
        use Operator::*;
        let ch = self.chars.next().unwrap();
        let token = match ch {
            '+' => Token::Operator(Plus),
            '-' => Token::Operator(Minus),
            '*' => Token::Operator(Multiply),
            '/' => Token::Operator(Divide),
            '^' => Token::Operator(Caret),
            '=' => Token::Operator(Equal),
            '<' => match self.chars.peek() {
                Some('=') => {
                    self.chars.next();
                    Token::Operator(LessEqual)
                }
                Some('>') => {
                    self.chars.next();
                    Token::Operator(NotEqual)
                }
                _ => Token::Operator(Less),
            },
            '>' => match self.chars.peek() {
                Some('=') => {
                    self.chars.next();
                    Token::Operator(GreaterEqual)
                }
                _ => Token::Operator(Greater),
            },
            '(' => Token::LParen,
            ')' => Token::RParen,
            ',' => Token::Comma,
            ':' => Token::Colon,
            ';' => Token::Semicolon,
            '.' => {
                // A dot starts a number only when a digit follows.
                match self.chars.peek() {
                    Some(pk) if pk.is_ascii_digit() => self.number(".".to_string()),
                    _ => Token::Delimiter('.'),
                }
            }
            '&' | '\'' | '[' | ']' | '{' | '}' | '!' | '?' | '#' | '@' | '%' | '$' | '~' | '`'
            | '|' | '\\' => Token::Delimiter(ch),
            _ => return Err(error!(SyntaxError)),
        };
        Ok(token)
    }
}
