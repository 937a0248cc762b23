//! Tokenizer for the DOT subset written by `terraform graph`

use crate::error::{Error, Result};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenKind {
    /// Bare word, numeral, quoted string or `<...>` HTML string. HTML strings
    /// count as quoted and keep their angle brackets in `text`.
    Id { text: String, quoted: bool, html: bool },
    LBrace,
    RBrace,
    LBracket,
    RBracket,
    Equals,
    Semi,
    Comma,
    Colon,
    /// `->`
    Arrow,
    /// `--`
    Line,
    Eof,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub line: usize,
    pub column: usize,
}

impl Token {
    /// Unquoted identifier equal to `keyword`, compared case-insensitively as DOT does.
    pub fn is_keyword(&self, keyword: &str) -> bool {
        matches!(&self.kind, TokenKind::Id { text, quoted: false, .. } if text.eq_ignore_ascii_case(keyword))
    }
}

pub struct Lexer<'a> {
    chars: std::iter::Peekable<std::str::Chars<'a>>,
    line: usize,
    column: usize,
    at_line_start: bool,
}

fn is_id_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '.' || !c.is_ascii()
}

impl<'a> Lexer<'a> {
    pub fn new(source: &'a str) -> Self {
        Lexer {
            chars: source.chars().peekable(),
            line: 1,
            column: 1,
            at_line_start: true,
        }
    }

    /// Tokenize the whole input. The last token is always `Eof`.
    pub fn tokenize(mut self) -> Result<Vec<Token>> {
        let mut tokens = Vec::new();
        loop {
            let token = self.next_token()?;
            let done = token.kind == TokenKind::Eof;
            tokens.push(token);
            if done {
                return Ok(tokens);
            }
        }
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.chars.next()?;
        if c == '\n' {
            self.line += 1;
            self.column = 1;
            self.at_line_start = true;
        } else {
            self.column += 1;
            if !c.is_whitespace() {
                self.at_line_start = false;
            }
        }
        Some(c)
    }

    fn peek(&mut self) -> Option<char> {
        self.chars.peek().copied()
    }

    fn skip_trivia(&mut self) -> Result<()> {
        loop {
            match self.peek() {
                Some(c) if c.is_whitespace() => {
                    self.bump();
                }
                // C preprocessor style line output, only at the start of a line.
                Some('#') if self.at_line_start => self.skip_line(),
                Some('/') => {
                    let (line, column) = (self.line, self.column);
                    let mut ahead = self.chars.clone();
                    ahead.next();
                    match ahead.peek() {
                        Some('/') => self.skip_line(),
                        Some('*') => {
                            self.bump();
                            self.bump();
                            self.skip_block_comment(line, column)?;
                        }
                        _ => return Ok(()),
                    }
                }
                _ => return Ok(()),
            }
        }
    }

    fn skip_line(&mut self) {
        while let Some(c) = self.peek() {
            if c == '\n' {
                break;
            }
            self.bump();
        }
    }

    fn skip_block_comment(&mut self, line: usize, column: usize) -> Result<()> {
        let mut star = false;
        while let Some(c) = self.bump() {
            if star && c == '/' {
                return Ok(());
            }
            star = c == '*';
        }
        Err(Error::parse(line, column, "unterminated block comment"))
    }

    fn next_token(&mut self) -> Result<Token> {
        self.skip_trivia()?;
        let (line, column) = (self.line, self.column);
        let token = |kind| Token { kind, line, column };

        let Some(c) = self.peek() else {
            return Ok(token(TokenKind::Eof));
        };

        let kind = match c {
            '{' | '}' | '[' | ']' | '=' | ';' | ',' | ':' => {
                self.bump();
                match c {
                    '{' => TokenKind::LBrace,
                    '}' => TokenKind::RBrace,
                    '[' => TokenKind::LBracket,
                    ']' => TokenKind::RBracket,
                    '=' => TokenKind::Equals,
                    ';' => TokenKind::Semi,
                    ',' => TokenKind::Comma,
                    _ => TokenKind::Colon,
                }
            }
            '-' => {
                self.bump();
                match self.peek() {
                    Some('>') => {
                        self.bump();
                        TokenKind::Arrow
                    }
                    Some('-') => {
                        self.bump();
                        TokenKind::Line
                    }
                    Some(d) if d.is_ascii_digit() || d == '.' => {
                        let mut text = String::from('-');
                        text.push_str(&self.bare_word());
                        TokenKind::Id {
                            text,
                            quoted: false,
                            html: false,
                        }
                    }
                    _ => return Err(Error::parse(line, column, "unexpected character '-'")),
                }
            }
            '"' => TokenKind::Id {
                text: self.quoted_string(line, column)?,
                quoted: true,
                html: false,
            },
            '<' => TokenKind::Id {
                text: self.html_string(line, column)?,
                quoted: true,
                html: true,
            },
            c if is_id_char(c) => TokenKind::Id {
                text: self.bare_word(),
                quoted: false,
                html: false,
            },
            other => {
                return Err(Error::parse(
                    line,
                    column,
                    format!("unexpected character '{}'", other),
                ));
            }
        };
        Ok(token(kind))
    }

    fn bare_word(&mut self) -> String {
        let mut text = String::new();
        while let Some(c) = self.peek() {
            if !is_id_char(c) {
                break;
            }
            text.push(c);
            self.bump();
        }
        text
    }

    /// A double-quoted string, with `"a" + "b"` concatenation.
    ///
    /// `\"` and `\\` are unescaped, other backslash sequences are kept as written
    /// and a backslash-newline is a line continuation.
    fn quoted_string(&mut self, line: usize, column: usize) -> Result<String> {
        let mut text = String::new();
        loop {
            self.bump();
            loop {
                match self.bump() {
                    None => return Err(Error::parse(line, column, "unterminated string")),
                    Some('"') => break,
                    Some('\\') => match self.peek() {
                        Some('"') | Some('\\') => {
                            if let Some(escaped) = self.bump() {
                                text.push(escaped);
                            }
                        }
                        Some('\n') => {
                            self.bump();
                        }
                        _ => text.push('\\'),
                    },
                    Some(c) => text.push(c),
                }
            }

            self.skip_trivia()?;
            if self.peek() != Some('+') {
                return Ok(text);
            }
            self.bump();
            self.skip_trivia()?;
            if self.peek() != Some('"') {
                return Err(Error::parse(
                    self.line,
                    self.column,
                    "expected a quoted string after '+'",
                ));
            }
        }
    }

    /// An HTML string `<...>`, returned with its outer angle brackets.
    fn html_string(&mut self, line: usize, column: usize) -> Result<String> {
        let mut text = String::new();
        let mut depth = 0usize;
        while let Some(c) = self.bump() {
            text.push(c);
            match c {
                '<' => depth += 1,
                '>' => {
                    depth -= 1;
                    if depth == 0 {
                        return Ok(text);
                    }
                }
                _ => {}
            }
        }
        Err(Error::parse(line, column, "unterminated HTML string"))
    }
}
