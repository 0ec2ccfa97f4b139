/// Minimal parser for Valve's KeyValues text format ("VDF"), the format of
/// `libraryfolders.vdf` and `appmanifest_*.acf`.
///
/// A document is a single root key followed by a `{}` group; groups hold
/// `"key" "value"` pairs and nested `"key" {}` groups. Tokens may be quoted
/// (with `\"`, `\\`, `\t`, `\n` escapes) or bare; `//` starts a line comment.
/// Entry order and duplicate keys are preserved; the consumers decide what
/// wins.
use std::fmt;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum VdfError {
    #[error("unexpected end of document")]
    UnexpectedEof,

    #[error("unexpected {found} at line {line}")]
    Unexpected { found: Token, line: usize },

    #[error("key \"{key}\" at line {line} has no value")]
    MissingValue { key: String, line: usize },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    Str(String),
    GroupOpen,
    GroupClose,
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Str(s) => write!(f, "\"{s}\""),
            Token::GroupOpen => write!(f, "'{{'"),
            Token::GroupClose => write!(f, "'}}'"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    Str(String),
    Group(Group),
}

/// An ordered list of key/value entries. Lookups are case-insensitive, the
/// way Valve's own reader treats keys.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Group(Vec<(String, Value)>);

impl Group {
    pub fn entries(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(key))
            .map(|(_, v)| v)
    }

    pub fn get_str(&self, key: &str) -> Option<&str> {
        match self.get(key) {
            Some(Value::Str(s)) => Some(s),
            _ => None,
        }
    }

    pub fn get_group(&self, key: &str) -> Option<&Group> {
        match self.get(key) {
            Some(Value::Group(g)) => Some(g),
            _ => None,
        }
    }
}

/// A parsed document: the root key (e.g. `"libraryfolders"`, `"AppState"`)
/// and its group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    pub key: String,
    pub root: Group,
}

pub fn parse(input: &str) -> Result<Document, VdfError> {
    let mut lexer = Lexer::new(input);

    let key = match lexer.next_token()? {
        Some(Token::Str(s)) => s,
        Some(found) => {
            return Err(VdfError::Unexpected {
                found,
                line: lexer.line,
            })
        }
        None => return Err(VdfError::UnexpectedEof),
    };
    match lexer.next_token()? {
        Some(Token::GroupOpen) => {}
        Some(found) => {
            return Err(VdfError::Unexpected {
                found,
                line: lexer.line,
            })
        }
        None => return Err(VdfError::UnexpectedEof),
    }
    let root = parse_group(&mut lexer)?;
    Ok(Document { key, root })
}

/// Parses entries up to and including the group's closing brace.
fn parse_group(lexer: &mut Lexer<'_>) -> Result<Group, VdfError> {
    let mut entries = Vec::new();
    loop {
        let key = match lexer.next_token()? {
            Some(Token::Str(s)) => s,
            Some(Token::GroupClose) => return Ok(Group(entries)),
            Some(found @ Token::GroupOpen) => {
                return Err(VdfError::Unexpected {
                    found,
                    line: lexer.line,
                })
            }
            None => return Err(VdfError::UnexpectedEof),
        };
        let key_line = lexer.line;
        let value = match lexer.next_token()? {
            Some(Token::Str(s)) => Value::Str(s),
            Some(Token::GroupOpen) => Value::Group(parse_group(lexer)?),
            Some(Token::GroupClose) | None => {
                return Err(VdfError::MissingValue {
                    key,
                    line: key_line,
                })
            }
        };
        entries.push((key, value));
    }
}

struct Lexer<'a> {
    chars: std::iter::Peekable<std::str::Chars<'a>>,
    line: usize,
}

impl<'a> Lexer<'a> {
    fn new(input: &'a str) -> Self {
        Self {
            chars: input.chars().peekable(),
            line: 1,
        }
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.chars.next();
        if c == Some('\n') {
            self.line += 1;
        }
        c
    }

    fn next_token(&mut self) -> Result<Option<Token>, VdfError> {
        loop {
            match self.chars.peek() {
                None => return Ok(None),
                Some(c) if c.is_whitespace() => {
                    self.bump();
                }
                Some('/') => {
                    // Only "//" comments exist in the format; a lone slash
                    // would start a bare token.
                    let mut lookahead = self.chars.clone();
                    lookahead.next();
                    if lookahead.peek() == Some(&'/') {
                        while let Some(c) = self.bump() {
                            if c == '\n' {
                                break;
                            }
                        }
                    } else {
                        return self.bare_token().map(Some);
                    }
                }
                Some('{') => {
                    self.bump();
                    return Ok(Some(Token::GroupOpen));
                }
                Some('}') => {
                    self.bump();
                    return Ok(Some(Token::GroupClose));
                }
                Some('"') => {
                    self.bump();
                    return self.quoted_token().map(Some);
                }
                Some(_) => return self.bare_token().map(Some),
            }
        }
    }

    fn quoted_token(&mut self) -> Result<Token, VdfError> {
        let mut out = String::new();
        loop {
            match self.bump() {
                None => return Err(VdfError::UnexpectedEof),
                Some('"') => return Ok(Token::Str(out)),
                Some('\\') => match self.bump() {
                    None => return Err(VdfError::UnexpectedEof),
                    Some('n') => out.push('\n'),
                    Some('t') => out.push('\t'),
                    // Unknown escapes pass the character through, which is
                    // what Valve's reader does with e.g. "\\" and "\"".
                    Some(c) => out.push(c),
                },
                Some(c) => out.push(c),
            }
        }
    }

    fn bare_token(&mut self) -> Result<Token, VdfError> {
        let mut out = String::new();
        while let Some(&c) = self.chars.peek() {
            if c.is_whitespace() || c == '{' || c == '}' || c == '"' {
                break;
            }
            out.push(c);
            self.bump();
        }
        Ok(Token::Str(out))
    }
}
