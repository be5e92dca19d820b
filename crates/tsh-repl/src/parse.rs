//! Line splitting for the REPL.
//!
//! Just enough syntax to build a `CommandDescriptor`: whitespace-separated
//! words, single and double quotes, backslash escapes, `< file`, `> file`,
//! `>> file`, and a trailing `&`. Operators only count outside quotes.

use thiserror::Error;

use tsh_kernel::{CommandDescriptor, Redirects};

/// Errors splitting a command line.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("unterminated {0} quote")]
    UnterminatedQuote(char),

    #[error("expected a file name after `{0}`")]
    MissingTarget(&'static str),

    #[error("`&` is only allowed at the end of a command")]
    MisplacedAmpersand,

    #[error("trailing backslash")]
    TrailingBackslash,

    #[error("missing command")]
    MissingCommand,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Token {
    Word(String),
    In,
    Out,
    Append,
    Background,
}

fn tokenize(line: &str) -> Result<Vec<Token>, ParseError> {
    let mut tokens = Vec::new();
    let mut word = String::new();
    // distinguishes `''` (an empty word) from no word at all
    let mut in_word = false;
    let mut chars = line.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            ' ' | '\t' | '\n' => {
                if in_word {
                    tokens.push(Token::Word(std::mem::take(&mut word)));
                    in_word = false;
                }
            }
            '<' | '>' | '&' => {
                if in_word {
                    tokens.push(Token::Word(std::mem::take(&mut word)));
                    in_word = false;
                }
                let token = match c {
                    '<' => Token::In,
                    '&' => Token::Background,
                    _ if chars.peek() == Some(&'>') => {
                        chars.next();
                        Token::Append
                    }
                    _ => Token::Out,
                };
                tokens.push(token);
            }
            '\'' => {
                in_word = true;
                loop {
                    match chars.next() {
                        Some('\'') => break,
                        Some(ch) => word.push(ch),
                        None => return Err(ParseError::UnterminatedQuote('\'')),
                    }
                }
            }
            '"' => {
                in_word = true;
                loop {
                    match chars.next() {
                        Some('"') => break,
                        Some('\\') if matches!(chars.peek(), Some('"' | '\\')) => {
                            if let Some(escaped) = chars.next() {
                                word.push(escaped);
                            }
                        }
                        Some(ch) => word.push(ch),
                        None => return Err(ParseError::UnterminatedQuote('"')),
                    }
                }
            }
            '\\' => {
                in_word = true;
                match chars.next() {
                    Some(escaped) => word.push(escaped),
                    None => return Err(ParseError::TrailingBackslash),
                }
            }
            _ => {
                in_word = true;
                word.push(c);
            }
        }
    }

    if in_word {
        tokens.push(Token::Word(word));
    }
    Ok(tokens)
}

/// Split one line into a command, or `None` for a blank line.
pub fn split_line(line: &str) -> Result<Option<CommandDescriptor>, ParseError> {
    let tokens = tokenize(line)?;
    let mut argv = Vec::new();
    let mut redirects = Redirects::default();
    let mut background = false;

    let mut iter = tokens.into_iter();
    while let Some(token) = iter.next() {
        if background {
            return Err(ParseError::MisplacedAmpersand);
        }
        match token {
            Token::Word(w) => argv.push(w),
            Token::Background => background = true,
            Token::In => match iter.next() {
                Some(Token::Word(path)) => redirects.stdin = Some(path.into()),
                _ => return Err(ParseError::MissingTarget("<")),
            },
            Token::Out | Token::Append => {
                let append = token == Token::Append;
                match iter.next() {
                    Some(Token::Word(path)) => {
                        redirects.stdout = Some(path.into());
                        redirects.append = append;
                    }
                    _ => return Err(ParseError::MissingTarget(if append { ">>" } else { ">" })),
                }
            }
        }
    }

    if argv.is_empty() {
        return if background || !redirects.is_empty() {
            Err(ParseError::MissingCommand)
        } else {
            Ok(None)
        };
    }

    // a Background token is always last, so it is the line's final `&`
    let mut text = line.trim();
    if background {
        text = text.strip_suffix('&').unwrap_or(text).trim_end();
    }
    let text = text.to_string();
    Ok(Some(
        CommandDescriptor::new(argv)
            .background(background)
            .with_redirects(redirects)
            .with_text(text),
    ))
}
