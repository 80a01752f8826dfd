use crate::ast::{Assignment, BindingDocument, Clause, ClauseKind, Target};
use crate::error::ParseError;
use crate::lexer::{Lexer, Token, TokenWithPos};
use crate::binding::BindingSpec;

// ── Parser ────────────────────────────────────────────────────────────────

pub struct Parser {
    tokens: Vec<TokenWithPos>,
    pos: usize,
}

impl Parser {
    pub fn new(tokens: Vec<TokenWithPos>) -> Self {
        Self { tokens, pos: 0 }
    }

    fn current_col(&self) -> usize {
        self.tokens
            .get(self.pos)
            .or_else(|| self.tokens.last())
            .map(|t| t.col)
            .unwrap_or(1)
    }

    fn peek(&self) -> &Token {
        self.tokens.get(self.pos).map(|t| &t.token).unwrap_or(&Token::Eof)
    }

    fn advance(&mut self) -> Token {
        let tok = self.tokens.get(self.pos)
            .map(|t| t.token.clone())
            .unwrap_or(Token::Eof);
        if self.pos < self.tokens.len() {
            self.pos += 1;
        }
        tok
    }

    fn err(&self, msg: impl Into<String>) -> ParseError {
        ParseError::new(msg, self.current_col())
    }

    // ── Document ──────────────────────────────────────────────────────────

    /// `binding := assignments clause* | clause+`
    ///
    /// A leading run of bare assignments is an implicit `Binding` clause,
    /// so `Title, Mode=TwoWay` reads the same as `{Binding Title, Mode=TwoWay}`.
    pub fn parse_document(&mut self) -> Result<BindingDocument, ParseError> {
        let mut clauses: Vec<Clause> = Vec::new();

        match self.peek() {
            Token::Eof => return Err(self.err("empty binding string")),
            Token::LBrace => {}
            _ => {
                let col = self.current_col();
                let assignments = self.parse_assignments()?;
                clauses.push(Clause { kind: ClauseKind::Binding, implicit: true, assignments, col });
            }
        }

        loop {
            match self.peek() {
                Token::Eof => break,
                Token::LBrace => {
                    let clause = self.parse_clause()?;
                    if let Some(prev) = clauses.last() {
                        if clause.kind <= prev.kind {
                            let msg = if clause.kind == prev.kind {
                                format!("clause `{}` appears more than once", clause.kind.keyword())
                            } else {
                                format!(
                                    "clause `{}` must come before `{}`",
                                    clause.kind.keyword(),
                                    prev.kind.keyword()
                                )
                            };
                            return Err(ParseError::new(msg, clause.col)
                                .with_token(clause.kind.keyword()));
                        }
                    }
                    clauses.push(clause);
                }
                Token::RBrace => return Err(self.err("unmatched '}'").with_token("}")),
                tok => {
                    let tok = describe(tok);
                    return Err(self.err(format!("expected '{{' to open a clause, got {tok}"))
                        .with_token(tok));
                }
            }
        }

        Ok(BindingDocument { clauses })
    }

    // ── Clause ────────────────────────────────────────────────────────────

    fn parse_clause(&mut self) -> Result<Clause, ParseError> {
        let col = self.current_col();
        self.advance(); // consume `{`

        let kind = match self.advance() {
            Token::Word(w) => match ClauseKind::from_keyword(&w) {
                Some(kind) => kind,
                None => {
                    return Err(ParseError::new(
                        format!("unknown clause `{w}`; expected Binding, List or CommandParameter"),
                        col + 1,
                    )
                    .with_token(w));
                }
            },
            tok => {
                return Err(ParseError::new(
                    format!("expected a clause keyword after '{{', got {}", describe(&tok)),
                    col + 1,
                ));
            }
        };

        if matches!(self.peek(), Token::RBrace | Token::Eof) {
            return Err(self.err(format!("clause `{}` has no assignments", kind.keyword()))
                .with_token(kind.keyword()));
        }

        let assignments = self.parse_assignments()?;

        match self.advance() {
            Token::RBrace => Ok(Clause { kind, implicit: false, assignments, col }),
            _ => Err(ParseError::new(
                format!("unclosed '{{' for clause `{}`", kind.keyword()),
                col,
            )),
        }
    }

    // ── Assignments ───────────────────────────────────────────────────────

    /// Parse assignments up to (not including) the next `{`, `}` or end.
    ///
    /// Assignments are separated by a comma or by whitespace alone; one
    /// trailing comma is allowed.
    fn parse_assignments(&mut self) -> Result<Vec<Assignment>, ParseError> {
        let mut out = Vec::new();
        loop {
            match self.peek() {
                Token::Word(_) => out.push(self.parse_assignment()?),
                Token::Comma => return Err(self.err("empty assignment").with_token(",")),
                Token::Eq => return Err(self.err("assignment is missing a name").with_token("=")),
                _ => break,
            }
            if self.peek() == &Token::Comma {
                self.advance();
                if matches!(self.peek(), Token::Comma) {
                    return Err(self.err("empty assignment").with_token(","));
                }
            }
        }
        Ok(out)
    }

    fn parse_assignment(&mut self) -> Result<Assignment, ParseError> {
        let col = self.current_col();
        let Token::Word(word) = self.advance() else {
            return Err(ParseError::new("expected an assignment", col));
        };

        let member = word.strip_prefix('.').map(str::to_string);

        if self.peek() != &Token::Eq {
            // A lone `.` is a value (the whole model), not a member target.
            return Ok(match member {
                Some(member) if !member.is_empty() => {
                    Assignment { target: Target::ViewMember(member), value: None, col }
                }
                _ => Assignment { target: Target::Bare, value: Some(word), col },
            });
        }

        self.advance(); // consume `=`
        let value = match self.peek() {
            Token::Word(_) => match self.advance() {
                Token::Word(v) => Some(v),
                _ => None,
            },
            Token::Eq => return Err(self.err("unexpected '=' in value").with_token("=")),
            _ => None,
        };

        let target = match member {
            Some(member) if member.is_empty() => {
                return Err(ParseError::new("missing view member name after '.'", col)
                    .with_token(word));
            }
            Some(member) => Target::ViewMember(member),
            None => Target::Named(word),
        };

        Ok(Assignment { target, value, col })
    }
}

fn describe(tok: &Token) -> String {
    match tok {
        Token::Word(w) => format!("`{w}`"),
        Token::LBrace  => "'{'".to_string(),
        Token::RBrace  => "'}'".to_string(),
        Token::Comma   => "','".to_string(),
        Token::Eq      => "'='".to_string(),
        Token::Eof     => "end of input".to_string(),
    }
}

// ── Public parse entry points ─────────────────────────────────────────────

/// Parse a binding string into its syntax tree without interpreting names.
pub fn parse_document(src: &str) -> Result<BindingDocument, ParseError> {
    let tokens = Lexer::new(src).tokenize()?;
    Parser::new(tokens).parse_document()
}

/// Parse a binding string into a [`BindingSpec`].
pub fn parse_str(src: &str) -> Result<BindingSpec, ParseError> {
    let doc = parse_document(src)?;
    BindingSpec::from_document(&doc)
}
