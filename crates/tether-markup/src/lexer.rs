use crate::error::ParseError;

// ── Token ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    /// Any run of characters that is not whitespace or punctuation:
    /// keywords, names, `.Member` targets and values alike.
    Word(String),
    // Punctuation
    LBrace,
    RBrace,
    Comma,
    Eq,
    // Sentinel
    Eof,
}

/// A token plus the 1-based column of its first character.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenWithPos {
    pub token: Token,
    pub col: usize,
}

// ── Lexer ─────────────────────────────────────────────────────────────────

pub struct Lexer<'s> {
    src: &'s str,
    pos: usize,
    col: usize,
}

impl<'s> Lexer<'s> {
    pub fn new(src: &'s str) -> Self {
        Self { src, pos: 0, col: 1 }
    }

    pub fn tokenize(mut self) -> Result<Vec<TokenWithPos>, ParseError> {
        let mut tokens = Vec::new();
        loop {
            let tok = self.next_token()?;
            let eof = tok.token == Token::Eof;
            tokens.push(tok);
            if eof {
                break;
            }
        }
        Ok(tokens)
    }

    fn peek(&self) -> Option<char> {
        self.src[self.pos..].chars().next()
    }

    fn advance(&mut self) -> Option<char> {
        let ch = self.src[self.pos..].chars().next()?;
        self.pos += ch.len_utf8();
        self.col += 1;
        Some(ch)
    }

    fn skip_whitespace(&mut self) {
        while matches!(self.peek(), Some(c) if c.is_whitespace()) {
            self.advance();
        }
    }

    fn next_token(&mut self) -> Result<TokenWithPos, ParseError> {
        self.skip_whitespace();
        let col = self.col;

        let ch = match self.peek() {
            None => return Ok(TokenWithPos { token: Token::Eof, col }),
            Some(c) => c,
        };

        let token = match ch {
            '{' => { self.advance(); Token::LBrace }
            '}' => { self.advance(); Token::RBrace }
            ',' => { self.advance(); Token::Comma }
            '=' => { self.advance(); Token::Eq }
            c if c.is_control() => {
                return Err(ParseError::new(format!("unexpected character {:?}", c), col));
            }
            _ => self.lex_word(),
        };
        Ok(TokenWithPos { token, col })
    }

    fn lex_word(&mut self) -> Token {
        let start = self.pos;
        while matches!(self.peek(), Some(c) if !is_delimiter(c)) {
            self.advance();
        }
        Token::Word(self.src[start..self.pos].to_string())
    }
}

fn is_delimiter(c: char) -> bool {
    c.is_whitespace() || c.is_control() || matches!(c, '{' | '}' | ',' | '=')
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens(src: &str) -> Vec<Token> {
        Lexer::new(src).tokenize().unwrap().into_iter().map(|t| t.token).collect()
    }

    #[test]
    fn punctuation_and_words() {
        assert_eq!(
            tokens("{Binding .Text=Name, Mode=TwoWay}"),
            vec![
                Token::LBrace,
                Token::Word("Binding".into()),
                Token::Word(".Text".into()),
                Token::Eq,
                Token::Word("Name".into()),
                Token::Comma,
                Token::Word("Mode".into()),
                Token::Eq,
                Token::Word("TwoWay".into()),
                Token::RBrace,
                Token::Eof,
            ]
        );
    }

    #[test]
    fn columns_are_one_based() {
        let toks = Lexer::new("  {List  X}").tokenize().unwrap();
        let cols: Vec<usize> = toks.iter().map(|t| t.col).collect();
        assert_eq!(cols, vec![3, 4, 10, 11, 12]);
    }

    #[test]
    fn control_characters_are_rejected() {
        let err = Lexer::new("Title\u{7}").tokenize().unwrap_err();
        assert_eq!(err.col, 6);
    }
}
