//! Splits a signature file body into statements ended by `{`, `}` or `;`.
//!
//! Terminators inside parentheses (annotation arguments) or quotes do not count, and `//`
//! comments are dropped.

use crate::SignatureError;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Terminator {
    Open,
    Close,
    Semicolon,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct Statement {
    pub(crate) text: String,
    pub(crate) terminator: Terminator,
    /// Line of the statement's first character.
    pub(crate) line: u32,
}

pub(crate) struct Scanner<'a> {
    text: &'a str,
    pos: usize,
    line: u32,
}

impl<'a> Scanner<'a> {
    pub(crate) fn new(text: &'a str, first_line: u32) -> Self {
        Self {
            text,
            pos: 0,
            line: first_line,
        }
    }

    fn rest(&self) -> &'a str {
        &self.text[self.pos..]
    }

    fn skip_comment(&mut self) {
        let rest = self.rest();
        let end = rest.find('\n').unwrap_or(rest.len());
        self.pos += end;
    }

    fn skip_trivia(&mut self) {
        loop {
            let rest = self.rest();
            let trimmed = rest.trim_start();
            self.line += rest[..rest.len() - trimmed.len()].matches('\n').count() as u32;
            self.pos += rest.len() - trimmed.len();
            if self.rest().starts_with("//") {
                self.skip_comment();
            } else {
                return;
            }
        }
    }

    pub(crate) fn next_statement(&mut self) -> Result<Option<Statement>, SignatureError> {
        self.skip_trivia();
        if self.rest().is_empty() {
            return Ok(None);
        }
        let line = self.line;
        let mut text = String::new();
        let mut parens = 0usize;
        let mut quote: Option<char> = None;
        let mut escaped = false;

        while let Some(ch) = self.rest().chars().next() {
            if ch == '\n' {
                self.line += 1;
            }
            if let Some(q) = quote {
                if escaped {
                    escaped = false;
                } else if ch == '\\' {
                    escaped = true;
                } else if ch == q {
                    quote = None;
                }
                text.push(ch);
                self.pos += ch.len_utf8();
                continue;
            }
            let terminator = match ch {
                '{' if parens == 0 => Some(Terminator::Open),
                '}' if parens == 0 => Some(Terminator::Close),
                ';' if parens == 0 => Some(Terminator::Semicolon),
                _ => None,
            };
            if let Some(terminator) = terminator {
                self.pos += 1;
                return Ok(Some(Statement {
                    text: text.trim().to_string(),
                    terminator,
                    line,
                }));
            }
            match ch {
                '"' | '\'' => quote = Some(ch),
                '(' => parens += 1,
                ')' => parens = parens.saturating_sub(1),
                '/' if self.rest().starts_with("//") => {
                    self.skip_comment();
                    continue;
                }
                _ => {}
            }
            text.push(ch);
            self.pos += ch.len_utf8();
        }

        Err(SignatureError::Syntax {
            line,
            message: "unexpected end of file inside a declaration".to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn statements(text: &str) -> Vec<(String, Terminator, u32)> {
        let mut scanner = Scanner::new(text, 1);
        let mut out = Vec::new();
        while let Some(stmt) = scanner.next_statement().unwrap() {
            out.push((stmt.text, stmt.terminator, stmt.line));
        }
        out
    }

    #[test]
    fn splits_on_terminators_outside_parens_and_quotes() {
        let text = "package a {\n  // note\n  @A(x={1}) public class B {\n    field public String s = \"};\"; // 0x1\n  }\n}\n";
        assert_eq!(
            statements(text),
            vec![
                ("package a".to_string(), Terminator::Open, 1),
                ("@A(x={1}) public class B".to_string(), Terminator::Open, 3),
                (
                    "field public String s = \"};\"".to_string(),
                    Terminator::Semicolon,
                    4
                ),
                (String::new(), Terminator::Close, 5),
                (String::new(), Terminator::Close, 6),
            ]
        );
    }

    #[test]
    fn unterminated_declaration_is_an_error() {
        let mut scanner = Scanner::new("\n\nmethod public void f()", 10);
        let err = scanner.next_statement().unwrap_err();
        assert_eq!(err.line(), 12);
    }
}
