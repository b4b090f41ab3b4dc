//! Tokenizer for schema expression source.
//!
//! The accepted surface is a single expression written against the `z`
//! builder DSL, so the token set is small: identifiers, string/number
//! literals, punctuation, and the arrow. Offsets are byte positions into the
//! source, used for error messages.

use core::iter::Peekable;
use core::str::CharIndices;

#[derive(Debug, Clone, PartialEq)]
pub enum Tok {
    Ident(String),
    Str(String),
    Num(f64),
    Dot,
    Comma,
    Colon,
    Semi,
    LParen,
    RParen,
    LBracket,
    RBracket,
    LBrace,
    RBrace,
    Arrow,
    Eof,
}

#[derive(Debug, Clone)]
pub struct Token {
    pub tok: Tok,
    pub offset: usize,
}

pub fn tokenize(source: &str) -> Result<Vec<Token>, String> {
    let mut out = Vec::new();
    let mut chars: Peekable<CharIndices> = source.char_indices().peekable();

    while let Some(&(offset, c)) = chars.peek() {
        match c {
            c if c.is_whitespace() => {
                chars.next();
            }
            '/' => {
                chars.next();
                match chars.peek().map(|&(_, c)| c) {
                    Some('/') => {
                        for (_, c) in chars.by_ref() {
                            if c == '\n' {
                                break;
                            }
                        }
                    }
                    Some('*') => {
                        chars.next();
                        let mut prev = '\0';
                        let mut closed = false;
                        for (_, c) in chars.by_ref() {
                            if prev == '*' && c == '/' {
                                closed = true;
                                break;
                            }
                            prev = c;
                        }
                        if !closed {
                            return Err(format!("unterminated comment at offset {offset}"));
                        }
                    }
                    _ => return Err(format!("unexpected `/` at offset {offset}")),
                }
            }
            '\'' | '"' => {
                chars.next();
                let text = lex_string(&mut chars, c, offset)?;
                out.push(Token {
                    tok: Tok::Str(text),
                    offset,
                });
            }
            '0'..='9' => {
                let mut text = String::new();
                while let Some(&(_, c)) = chars.peek() {
                    if c.is_ascii_digit() || c == '.' || c == 'e' || c == 'E' || c == '-' || c == '+'
                    {
                        // Accept sign characters only directly after an exponent.
                        if (c == '-' || c == '+')
                            && !matches!(text.chars().last(), Some('e') | Some('E'))
                        {
                            break;
                        }
                        text.push(c);
                        chars.next();
                    } else {
                        break;
                    }
                }
                let value: f64 = text
                    .parse()
                    .map_err(|_| format!("invalid number `{text}` at offset {offset}"))?;
                out.push(Token {
                    tok: Tok::Num(value),
                    offset,
                });
            }
            c if c.is_alphabetic() || c == '_' || c == '$' => {
                let mut text = String::new();
                while let Some(&(_, c)) = chars.peek() {
                    if c.is_alphanumeric() || c == '_' || c == '$' {
                        text.push(c);
                        chars.next();
                    } else {
                        break;
                    }
                }
                out.push(Token {
                    tok: Tok::Ident(text),
                    offset,
                });
            }
            '=' => {
                chars.next();
                match chars.peek().map(|&(_, c)| c) {
                    Some('>') => {
                        chars.next();
                        out.push(Token {
                            tok: Tok::Arrow,
                            offset,
                        });
                    }
                    _ => return Err(format!("unexpected `=` at offset {offset}")),
                }
            }
            '-' => {
                // Negative number literal.
                chars.next();
                match chars.peek().map(|&(_, c)| c) {
                    Some(c) if c.is_ascii_digit() => {
                        let mut text = String::from("-");
                        while let Some(&(_, c)) = chars.peek() {
                            if c.is_ascii_digit() || c == '.' {
                                text.push(c);
                                chars.next();
                            } else {
                                break;
                            }
                        }
                        let value: f64 = text
                            .parse()
                            .map_err(|_| format!("invalid number `{text}` at offset {offset}"))?;
                        out.push(Token {
                            tok: Tok::Num(value),
                            offset,
                        });
                    }
                    _ => return Err(format!("unexpected `-` at offset {offset}")),
                }
            }
            '.' => {
                chars.next();
                out.push(Token {
                    tok: Tok::Dot,
                    offset,
                });
            }
            ',' => {
                chars.next();
                out.push(Token {
                    tok: Tok::Comma,
                    offset,
                });
            }
            ':' => {
                chars.next();
                out.push(Token {
                    tok: Tok::Colon,
                    offset,
                });
            }
            ';' => {
                chars.next();
                out.push(Token {
                    tok: Tok::Semi,
                    offset,
                });
            }
            '(' => {
                chars.next();
                out.push(Token {
                    tok: Tok::LParen,
                    offset,
                });
            }
            ')' => {
                chars.next();
                out.push(Token {
                    tok: Tok::RParen,
                    offset,
                });
            }
            '[' => {
                chars.next();
                out.push(Token {
                    tok: Tok::LBracket,
                    offset,
                });
            }
            ']' => {
                chars.next();
                out.push(Token {
                    tok: Tok::RBracket,
                    offset,
                });
            }
            '{' => {
                chars.next();
                out.push(Token {
                    tok: Tok::LBrace,
                    offset,
                });
            }
            '}' => {
                chars.next();
                out.push(Token {
                    tok: Tok::RBrace,
                    offset,
                });
            }
            other => {
                return Err(format!(
                    "unexpected character `{other}` at offset {offset}"
                ));
            }
        }
    }

    out.push(Token {
        tok: Tok::Eof,
        offset: source.len(),
    });
    Ok(out)
}

fn lex_string(
    chars: &mut Peekable<CharIndices>,
    quote: char,
    start: usize,
) -> Result<String, String> {
    let mut text = String::new();
    while let Some((_, c)) = chars.next() {
        match c {
            c if c == quote => return Ok(text),
            '\\' => {
                let Some((_, esc)) = chars.next() else {
                    break;
                };
                match esc {
                    'n' => text.push('\n'),
                    't' => text.push('\t'),
                    'r' => text.push('\r'),
                    '\\' => text.push('\\'),
                    '\'' => text.push('\''),
                    '"' => text.push('"'),
                    '`' => text.push('`'),
                    '0' => text.push('\0'),
                    other => {
                        return Err(format!(
                            "unsupported escape `\\{other}` in string at offset {start}"
                        ))
                    }
                }
            }
            '\n' => break,
            other => text.push(other),
        }
    }
    Err(format!("unterminated string at offset {start}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn toks(source: &str) -> Vec<Tok> {
        tokenize(source).unwrap().into_iter().map(|t| t.tok).collect()
    }

    #[test]
    fn basic_chain() {
        assert_eq!(
            toks("z.string()"),
            vec![
                Tok::Ident("z".into()),
                Tok::Dot,
                Tok::Ident("string".into()),
                Tok::LParen,
                Tok::RParen,
                Tok::Eof,
            ]
        );
    }

    #[test]
    fn strings_numbers_and_arrow() {
        assert_eq!(
            toks(r#"'a' "b" 3.5 -2 () => x"#),
            vec![
                Tok::Str("a".into()),
                Tok::Str("b".into()),
                Tok::Num(3.5),
                Tok::Num(-2.0),
                Tok::LParen,
                Tok::RParen,
                Tok::Arrow,
                Tok::Ident("x".into()),
                Tok::Eof,
            ]
        );
    }

    #[test]
    fn comments_are_skipped() {
        assert_eq!(
            toks("z // tail\n.string() /* block */"),
            toks("z.string()")
        );
    }

    #[test]
    fn unterminated_string_is_an_error() {
        assert!(tokenize("z.literal('oops").is_err());
    }

    #[test]
    fn string_escapes() {
        assert_eq!(toks(r#"'a\'b\n'"#), vec![Tok::Str("a'b\n".into()), Tok::Eof]);
    }
}
