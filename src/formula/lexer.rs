use super::FormulaError;

#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    // Structural tokens
    LeftParen,
    RightParen,

    // Arithmetic operators
    Plus,
    Minus,
    Star,
    Slash,

    // Comparison operators
    Equal,        // == or ===
    NotEqual,     // != or !==
    GreaterThan,  // >
    GreaterEqual, // >=
    LessThan,     // <
    LessEqual,    // <=

    // Literals and identifiers
    Number(f64),
    String(String),
    True,
    False,
    Identifier(String),

    Eof,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LocatedToken {
    pub token: Token,
    /// Character offset of the token start
    pub offset: usize,
}

/// Tokenizes formula text
///
/// Only the characters the formula language knows are accepted; anything
/// else (member access, brackets, assignment, semicolons, ...) is rejected
/// here, before a parser ever sees it.
///
/// # Examples
/// ```rust
/// use form_rules::formula::lexer::{tokenize, Token};
///
/// let tokens = tokenize("price * qty").unwrap();
/// assert_eq!(tokens[0].token, Token::Identifier("price".to_string()));
/// assert_eq!(tokens[1].token, Token::Star);
/// ```
pub fn tokenize(input: &str) -> Result<Vec<LocatedToken>, FormulaError> {
    tokenize_with_keys(input, &[])
}

/// Tokenizes formula text, reading bound field keys as identifiers
///
/// Keys that are plain identifiers lex as usual. Any other key (`unit-price`,
/// `line.price`, `2nd_qty`) is recognized as a single identifier where it
/// appears between word boundaries, the longest key winning.
pub fn tokenize_with_keys(input: &str, keys: &[&str]) -> Result<Vec<LocatedToken>, FormulaError> {
    let chars: Vec<char> = input.chars().collect();
    let mut compound_keys: Vec<Vec<char>> = keys
        .iter()
        .filter(|key| !key.is_empty() && !is_plain_identifier(key))
        .map(|key| key.chars().collect())
        .collect();
    compound_keys.sort_by(|a, b| b.len().cmp(&a.len()));

    let mut tokens = Vec::new();
    let mut pos = 0;

    while pos < chars.len() {
        let ch = chars[pos];
        let start = pos;

        if let Some(key) = compound_keys.iter().find(|key| key_matches_at(&chars, pos, key)) {
            pos += key.len();
            tokens.push(LocatedToken { token: Token::Identifier(key.iter().collect()), offset: start });
            continue;
        }

        let token = match ch {
            ' ' | '\t' | '\r' | '\n' => {
                pos += 1;
                continue;
            }

            '(' => {
                pos += 1;
                Token::LeftParen
            }
            ')' => {
                pos += 1;
                Token::RightParen
            }
            '+' => {
                pos += 1;
                Token::Plus
            }
            '-' => {
                pos += 1;
                Token::Minus
            }
            '*' => {
                pos += 1;
                Token::Star
            }
            '/' => {
                pos += 1;
                Token::Slash
            }

            '=' | '!' => {
                if chars.get(pos + 1) != Some(&'=') {
                    return Err(FormulaError::UnexpectedCharacter { ch, offset: pos });
                }
                pos += 2;
                // Accept the three-character spellings as well
                if chars.get(pos) == Some(&'=') {
                    pos += 1;
                }
                if ch == '=' { Token::Equal } else { Token::NotEqual }
            }
            '>' => {
                if chars.get(pos + 1) == Some(&'=') {
                    pos += 2;
                    Token::GreaterEqual
                } else {
                    pos += 1;
                    Token::GreaterThan
                }
            }
            '<' => {
                if chars.get(pos + 1) == Some(&'=') {
                    pos += 2;
                    Token::LessEqual
                } else {
                    pos += 1;
                    Token::LessThan
                }
            }

            '"' | '\'' => {
                let (value, consumed) = parse_string_literal(&chars, pos)?;
                pos += consumed;
                Token::String(value)
            }

            ch if ch.is_ascii_digit() || (ch == '.' && next_is_digit(&chars, pos)) => {
                let (value, consumed) = parse_number(&chars, pos)?;
                pos += consumed;
                Token::Number(value)
            }

            ch if is_identifier_start(ch) => {
                let (token, consumed) = parse_keyword_or_identifier(&chars, pos);
                pos += consumed;
                token
            }

            _ => return Err(FormulaError::UnexpectedCharacter { ch, offset: pos }),
        };

        tokens.push(LocatedToken { token, offset: start });
    }

    tokens.push(LocatedToken { token: Token::Eof, offset: chars.len() });
    Ok(tokens)
}

fn next_is_digit(chars: &[char], pos: usize) -> bool {
    chars.get(pos + 1).map(|c| c.is_ascii_digit()).unwrap_or(false)
}

fn is_plain_identifier(key: &str) -> bool {
    let mut chars = key.chars();
    chars.next().map(is_identifier_start).unwrap_or(false) && chars.all(is_identifier_continue)
}

fn is_word_char(ch: char) -> bool {
    ch.is_ascii_alphanumeric() || ch == '_'
}

/// Word boundary between `chars[pos - 1]` and `chars[pos]`; the ends of the
/// input count as non-word characters
fn is_word_boundary(chars: &[char], pos: usize) -> bool {
    let before = pos.checked_sub(1).and_then(|p| chars.get(p)).map(|c| is_word_char(*c)).unwrap_or(false);
    let after = chars.get(pos).map(|c| is_word_char(*c)).unwrap_or(false);
    before != after
}

fn key_matches_at(chars: &[char], pos: usize, key: &[char]) -> bool {
    let end = pos + key.len();
    end <= chars.len()
        && chars[pos..end] == *key
        && is_word_boundary(chars, pos)
        && is_word_boundary(chars, end)
}

pub(crate) fn is_identifier_start(ch: char) -> bool {
    ch.is_ascii_alphabetic() || ch == '_' || ch == '$'
}

pub(crate) fn is_identifier_continue(ch: char) -> bool {
    ch.is_ascii_alphanumeric() || ch == '_' || ch == '$'
}

fn parse_string_literal(chars: &[char], start: usize) -> Result<(String, usize), FormulaError> {
    let quote_char = chars[start];
    let mut pos = start + 1;
    let mut result = String::new();

    while pos < chars.len() {
        let ch = chars[pos];

        if ch == quote_char {
            return Ok((result, pos - start + 1));
        } else if ch == '\\' && pos + 1 < chars.len() {
            pos += 1;
            match chars[pos] {
                'n' => result.push('\n'),
                't' => result.push('\t'),
                'r' => result.push('\r'),
                other => result.push(other),
            }
        } else {
            result.push(ch);
        }

        pos += 1;
    }

    Err(FormulaError::UnterminatedString { offset: start })
}

fn parse_number(chars: &[char], start: usize) -> Result<(f64, usize), FormulaError> {
    let mut pos = start;
    let mut number_str = String::new();
    let mut has_dot = false;

    while pos < chars.len() {
        let ch = chars[pos];

        if ch.is_ascii_digit() {
            number_str.push(ch);
        } else if ch == '.' && !has_dot {
            has_dot = true;
            number_str.push(ch);
        } else {
            break;
        }

        pos += 1;
    }

    // Optional exponent: e10, E-3, e+2
    if pos < chars.len() && (chars[pos] == 'e' || chars[pos] == 'E') {
        let mut exponent = String::from("e");
        let mut lookahead = pos + 1;
        if lookahead < chars.len() && (chars[lookahead] == '+' || chars[lookahead] == '-') {
            exponent.push(chars[lookahead]);
            lookahead += 1;
        }
        let digits_start = lookahead;
        while lookahead < chars.len() && chars[lookahead].is_ascii_digit() {
            exponent.push(chars[lookahead]);
            lookahead += 1;
        }
        if lookahead == digits_start {
            return Err(FormulaError::InvalidNumber { text: number_str, offset: start });
        }
        number_str.push_str(&exponent);
        pos = lookahead;
    }

    // A number running straight into an identifier ("3px") is malformed
    if pos < chars.len() && is_identifier_start(chars[pos]) {
        return Err(FormulaError::InvalidNumber { text: number_str, offset: start });
    }

    match number_str.parse::<f64>() {
        Ok(value) => Ok((value, pos - start)),
        Err(_) => Err(FormulaError::InvalidNumber { text: number_str, offset: start }),
    }
}

fn parse_keyword_or_identifier(chars: &[char], start: usize) -> (Token, usize) {
    let mut pos = start;
    let mut identifier = String::new();

    while pos < chars.len() && is_identifier_continue(chars[pos]) {
        identifier.push(chars[pos]);
        pos += 1;
    }

    let token = match identifier.as_str() {
        "true" => Token::True,
        "false" => Token::False,
        _ => Token::Identifier(identifier),
    };

    (token, pos - start)
}
