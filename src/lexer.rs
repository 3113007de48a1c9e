// Copyright (c) 2018 Fabian Schuiki

//! A lexer for grammar descriptions.
//!
//! A description is a list of rules such as `expr : expr plus term | term ;`.
//! Identifiers match `[A-Za-z](-?[A-Za-z0-9])*`.

use std::fmt;
use std::iter::Peekable;

/// The tokens that may appear in a grammar description.
#[allow(missing_docs)]
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Token {
    Ident(String),
    Colon,
    Pipe,
    Semicolon,
    /// A character that cannot start any token.
    Unknown(char),
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            Token::Ident(ref name) => write!(f, "identifier `{}`", name),
            Token::Colon => write!(f, "`:`"),
            Token::Pipe => write!(f, "`|`"),
            Token::Semicolon => write!(f, "`;`"),
            Token::Unknown(c) => write!(f, "unknown character `{}`", c),
        }
    }
}

/// A lexer for grammar descriptions.
pub struct Lexer<T: Iterator<Item = (usize, char)>> {
    input: Peekable<T>,
}

impl<T: Iterator<Item = (usize, char)>> Lexer<T> {
    /// Create a new lexer.
    pub fn new(input: T) -> Lexer<T> {
        Lexer {
            input: input.peekable(),
        }
    }
}

/// Return the next non-whitespace input character, skipping comments.
fn next_relevant<I: Iterator<Item = (usize, char)>>(
    input: &mut Peekable<I>,
) -> Option<(usize, char)> {
    'outer: while let Some((p, c)) = input.next() {
        if c == '/' {
            match input.peek() {
                Some(&(_, '/')) => {
                    input.next();
                    while let Some((_, c)) = input.next() {
                        if c == '\n' {
                            continue 'outer;
                        }
                    }
                    return None; // end of input reached
                }
                Some(&(_, '*')) => {
                    input.next();
                    while let Some((_, c)) = input.next() {
                        if c != '*' {
                            continue;
                        }
                        if let Some(&(_, '/')) = input.peek() {
                            input.next();
                            continue 'outer;
                        }
                    }
                    return None; // end of input reached
                }
                _ => (),
            }
        }
        if !c.is_whitespace() {
            return Some((p, c));
        }
    }
    None
}

fn is_ident_start(c: char) -> bool {
    c.is_ascii_alphabetic()
}

fn is_ident_continue(c: char) -> bool {
    c.is_ascii_alphanumeric()
}

impl<T: Iterator<Item = (usize, char)> + Clone> Iterator for Lexer<T> {
    type Item = (usize, usize, Token);

    fn next(&mut self) -> Option<(usize, usize, Token)> {
        let (sp, sc) = match next_relevant(&mut self.input) {
            Some(x) => x,
            None => return None,
        };
        let mut sl = sp + sc.len_utf8();
        let tkn = match sc {
            ':' => Token::Colon,
            '|' => Token::Pipe,
            ';' => Token::Semicolon,
            c if is_ident_start(c) => {
                let mut buffer = String::new();
                buffer.push(sc);
                loop {
                    match self.input.peek().cloned() {
                        Some((ep, ec)) if is_ident_continue(ec) => {
                            buffer.push(ec);
                            sl = ep + ec.len_utf8();
                            self.input.next();
                        }
                        Some((_, '-')) => {
                            // A dash only continues the identifier if an
                            // alphanumeric character follows it.
                            let mut ahead = self.input.clone();
                            ahead.next();
                            match ahead.peek().cloned() {
                                Some((ep, ec)) if is_ident_continue(ec) => {
                                    buffer.push('-');
                                    buffer.push(ec);
                                    sl = ep + ec.len_utf8();
                                    self.input.next();
                                    self.input.next();
                                }
                                _ => break,
                            }
                        }
                        _ => break,
                    }
                }
                Token::Ident(buffer)
            }
            c => Token::Unknown(c),
        };
        Some((sp, sl, tkn))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use super::Token::*;

    fn lex<S: AsRef<str>>(input: S) -> Vec<Token> {
        let lex = Lexer::new(input.as_ref().char_indices());
        lex.map(|(_, _, tkn)| tkn).collect()
    }

    #[test]
    fn tokens1() {
        assert_eq!(
            lex("S : E ;"),
            vec![Ident("S".into()), Colon, Ident("E".into()), Semicolon]
        );
    }

    #[test]
    fn tokens2() {
        assert_eq!(
            lex("ident-list:ident-list comma ident|ident;"),
            vec![
                Ident("ident-list".into()),
                Colon,
                Ident("ident-list".into()),
                Ident("comma".into()),
                Ident("ident".into()),
                Pipe,
                Ident("ident".into()),
                Semicolon,
            ]
        );
    }

    #[test]
    fn dangling_dash() {
        assert_eq!(
            lex("a- b--c x2"),
            vec![
                Ident("a".into()),
                Unknown('-'),
                Ident("b".into()),
                Unknown('-'),
                Unknown('-'),
                Ident("c".into()),
                Ident("x2".into()),
            ]
        );
    }

    #[test]
    fn spans() {
        let spans: Vec<(usize, usize)> = Lexer::new("ab : c-d ;".char_indices())
            .map(|(s, e, _)| (s, e))
            .collect();
        assert_eq!(spans, vec![(0, 2), (3, 4), (5, 8), (9, 10)]);
    }

    #[test]
    fn unknown_character() {
        assert_eq!(lex("( 1"), vec![Unknown('('), Unknown('1')]);
    }

    #[test]
    fn comment_single_line() {
        assert_eq!(lex("| // comment\n ; // comment"), vec![Pipe, Semicolon]);
    }

    #[test]
    fn comment_inline() {
        assert_eq!(lex("| /* comment */ ;"), vec![Pipe, Semicolon]);
    }

    #[test]
    fn comment_multiple_lines() {
        assert_eq!(lex("| /* comment \n comment */ ;"), vec![Pipe, Semicolon]);
    }
}
