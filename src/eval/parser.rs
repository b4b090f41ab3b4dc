//! Expression AST and recursive-descent parser for schema source text.
//!
//! The grammar is expression-only: method chains, literals, object/array
//! literals, and arrow functions. Constructs that exist in the source
//! language but are never legal in a schema expression (`await`, `class`,
//! `function`, `import`/`export`) still parse into marker nodes so that the
//! validation pass can report every violation at once instead of stopping at
//! the first parse error.

use super::lexer::{Tok, Token};

#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Ident(String),
    StringLit(String),
    NumberLit(f64),
    BoolLit(bool),
    NullLit,
    UndefinedLit,
    ArrayLit(Vec<Expr>),
    ObjectLit(Vec<(String, Expr)>),
    Member {
        object: Box<Expr>,
        property: String,
    },
    Index {
        object: Box<Expr>,
        index: Box<Expr>,
    },
    Call {
        callee: Box<Expr>,
        args: Vec<Expr>,
    },
    /// Arrow function. An expression body is kept as-is; a block body is
    /// reduced to a [`Expr::Block`] of the identifiers it references, so
    /// validation can still check every name it mentions.
    Arrow {
        params: Vec<String>,
        body: Option<Box<Expr>>,
    },
    /// Identifier references inside an arrow function's statement body. The
    /// statements themselves are not modeled; each name carries a flag for
    /// whether it appeared in property position (after a `.`).
    Block(Vec<(String, bool)>),
    Await(Box<Expr>),
    ClassExpr,
    FunctionExpr,
    ImportStmt,
    ExportStmt,
}

impl Expr {
    /// Total node count, used for the evaluator's work ceiling.
    pub fn node_count(&self) -> usize {
        match self {
            Expr::Ident(_)
            | Expr::StringLit(_)
            | Expr::NumberLit(_)
            | Expr::BoolLit(_)
            | Expr::NullLit
            | Expr::UndefinedLit
            | Expr::ClassExpr
            | Expr::FunctionExpr
            | Expr::ImportStmt
            | Expr::ExportStmt => 1,
            Expr::ArrayLit(items) => 1 + items.iter().map(Expr::node_count).sum::<usize>(),
            Expr::ObjectLit(entries) => {
                1 + entries.iter().map(|(_, v)| 1 + v.node_count()).sum::<usize>()
            }
            Expr::Member { object, .. } => 1 + object.node_count(),
            Expr::Index { object, index } => 1 + object.node_count() + index.node_count(),
            Expr::Call { callee, args } => {
                1 + callee.node_count() + args.iter().map(Expr::node_count).sum::<usize>()
            }
            Expr::Arrow { params, body } => {
                1 + params.len() + body.as_ref().map(|b| b.node_count()).unwrap_or(0)
            }
            Expr::Block(idents) => 1 + idents.len(),
            Expr::Await(inner) => 1 + inner.node_count(),
        }
    }
}

pub fn parse_expression(tokens: &[Token]) -> Result<Expr, String> {
    let mut parser = Parser { tokens, pos: 0 };
    let expr = parser.parse_expr()?;
    // Tolerate a trailing semicolon.
    if parser.peek() == &Tok::Semi {
        parser.pos += 1;
    }
    if parser.peek() != &Tok::Eof {
        return Err(format!(
            "expected a single expression; unexpected trailing input at offset {}",
            parser.offset()
        ));
    }
    Ok(expr)
}

struct Parser<'a> {
    tokens: &'a [Token],
    pos: usize,
}

impl<'a> Parser<'a> {
    fn peek(&self) -> &Tok {
        &self.tokens[self.pos.min(self.tokens.len() - 1)].tok
    }

    fn peek_at(&self, ahead: usize) -> &Tok {
        let i = (self.pos + ahead).min(self.tokens.len() - 1);
        &self.tokens[i].tok
    }

    fn offset(&self) -> usize {
        self.tokens[self.pos.min(self.tokens.len() - 1)].offset
    }

    fn next(&mut self) -> Tok {
        let tok = self.peek().clone();
        if self.pos < self.tokens.len() - 1 {
            self.pos += 1;
        }
        tok
    }

    fn expect(&mut self, tok: Tok) -> Result<(), String> {
        if self.peek() == &tok {
            self.pos += 1;
            Ok(())
        } else {
            Err(format!(
                "expected {:?}, found {:?} at offset {}",
                tok,
                self.peek(),
                self.offset()
            ))
        }
    }

    fn parse_expr(&mut self) -> Result<Expr, String> {
        if let Tok::Ident(name) = self.peek() {
            match name.as_str() {
                "await" => {
                    self.next();
                    let inner = self.parse_expr()?;
                    return Ok(Expr::Await(Box::new(inner)));
                }
                "class" => {
                    self.next();
                    self.skip_braced_construct()?;
                    return Ok(Expr::ClassExpr);
                }
                "function" => {
                    self.next();
                    self.skip_braced_construct()?;
                    return Ok(Expr::FunctionExpr);
                }
                "import" => {
                    self.next();
                    self.skip_statement();
                    return Ok(Expr::ImportStmt);
                }
                "export" => {
                    self.next();
                    self.skip_statement();
                    return Ok(Expr::ExportStmt);
                }
                _ => {}
            }
        }

        if let Some(arrow) = self.try_parse_arrow()? {
            return Ok(arrow);
        }

        let primary = self.parse_primary()?;
        self.parse_postfix(primary)
    }

    /// `x => ...`, `() => ...`, `(a, b) => ...`. Returns `None` when the
    /// upcoming tokens are not an arrow function.
    fn try_parse_arrow(&mut self) -> Result<Option<Expr>, String> {
        match self.peek() {
            Tok::Ident(name) if self.peek_at(1) == &Tok::Arrow => {
                let params = vec![name.clone()];
                self.next();
                self.next();
                let body = self.parse_arrow_body()?;
                Ok(Some(Expr::Arrow { params, body }))
            }
            Tok::LParen => {
                // Look ahead for `) =>` at the matching close paren.
                let mut depth = 0usize;
                let mut i = self.pos;
                loop {
                    match self.peek_at(i - self.pos) {
                        Tok::LParen => depth += 1,
                        Tok::RParen => {
                            depth -= 1;
                            if depth == 0 {
                                break;
                            }
                        }
                        Tok::Eof => return Ok(None),
                        _ => {}
                    }
                    i += 1;
                }
                if self.peek_at(i - self.pos + 1) != &Tok::Arrow {
                    return Ok(None);
                }
                self.expect(Tok::LParen)?;
                let mut params = Vec::new();
                while self.peek() != &Tok::RParen {
                    match self.next() {
                        Tok::Ident(name) => params.push(name),
                        other => {
                            return Err(format!(
                                "unsupported arrow parameter {other:?} at offset {}",
                                self.offset()
                            ))
                        }
                    }
                    if self.peek() == &Tok::Comma {
                        self.next();
                    }
                }
                self.expect(Tok::RParen)?;
                self.expect(Tok::Arrow)?;
                let body = self.parse_arrow_body()?;
                Ok(Some(Expr::Arrow { params, body }))
            }
            _ => Ok(None),
        }
    }

    fn parse_arrow_body(&mut self) -> Result<Option<Box<Expr>>, String> {
        if self.peek() == &Tok::LBrace {
            // Statement body: skipped balanced, but the identifiers inside
            // are recorded so validation still sees every name it mentions.
            let idents = self.skip_block_collecting_idents()?;
            Ok(Some(Box::new(Expr::Block(idents))))
        } else {
            let body = self.parse_expr()?;
            Ok(Some(Box::new(body)))
        }
    }

    /// Consume a balanced `{ ... }` statement body, collecting identifier
    /// references along with whether each sits in property position.
    fn skip_block_collecting_idents(&mut self) -> Result<Vec<(String, bool)>, String> {
        self.expect(Tok::LBrace)?;
        let mut depth = 1usize;
        let mut idents = Vec::new();
        let mut after_dot = false;
        loop {
            match self.next() {
                Tok::LBrace => {
                    depth += 1;
                    after_dot = false;
                }
                Tok::RBrace => {
                    depth -= 1;
                    if depth == 0 {
                        return Ok(idents);
                    }
                    after_dot = false;
                }
                Tok::Ident(name) => {
                    idents.push((name, after_dot));
                    after_dot = false;
                }
                Tok::Dot => after_dot = true,
                Tok::Eof => {
                    return Err("unbalanced braces in schema expression".to_string())
                }
                _ => after_dot = false,
            }
        }
    }

    fn parse_primary(&mut self) -> Result<Expr, String> {
        let offset = self.offset();
        match self.next() {
            Tok::Ident(name) => Ok(match name.as_str() {
                "true" => Expr::BoolLit(true),
                "false" => Expr::BoolLit(false),
                "null" => Expr::NullLit,
                "undefined" => Expr::UndefinedLit,
                _ => Expr::Ident(name),
            }),
            Tok::Str(text) => Ok(Expr::StringLit(text)),
            Tok::Num(value) => Ok(Expr::NumberLit(value)),
            Tok::LParen => {
                let inner = self.parse_expr()?;
                self.expect(Tok::RParen)?;
                Ok(inner)
            }
            Tok::LBracket => {
                let mut items = Vec::new();
                while self.peek() != &Tok::RBracket {
                    items.push(self.parse_expr()?);
                    if self.peek() == &Tok::Comma {
                        self.next();
                    } else {
                        break;
                    }
                }
                self.expect(Tok::RBracket)?;
                Ok(Expr::ArrayLit(items))
            }
            Tok::LBrace => {
                let mut entries = Vec::new();
                while self.peek() != &Tok::RBrace {
                    let key = match self.next() {
                        Tok::Ident(name) => name,
                        Tok::Str(text) => text,
                        other => {
                            return Err(format!(
                                "expected object key, found {other:?} at offset {}",
                                self.offset()
                            ))
                        }
                    };
                    self.expect(Tok::Colon)?;
                    let value = self.parse_expr()?;
                    entries.push((key, value));
                    if self.peek() == &Tok::Comma {
                        self.next();
                    } else {
                        break;
                    }
                }
                self.expect(Tok::RBrace)?;
                Ok(Expr::ObjectLit(entries))
            }
            other => Err(format!(
                "unexpected {other:?} at offset {offset}"
            )),
        }
    }

    fn parse_postfix(&mut self, mut expr: Expr) -> Result<Expr, String> {
        loop {
            match self.peek() {
                Tok::Dot => {
                    self.next();
                    let property = match self.next() {
                        Tok::Ident(name) => name,
                        other => {
                            return Err(format!(
                                "expected property name after `.`, found {other:?} at offset {}",
                                self.offset()
                            ))
                        }
                    };
                    expr = Expr::Member {
                        object: Box::new(expr),
                        property,
                    };
                }
                Tok::LParen => {
                    self.next();
                    let mut args = Vec::new();
                    while self.peek() != &Tok::RParen {
                        args.push(self.parse_expr()?);
                        if self.peek() == &Tok::Comma {
                            self.next();
                        } else {
                            break;
                        }
                    }
                    self.expect(Tok::RParen)?;
                    expr = Expr::Call {
                        callee: Box::new(expr),
                        args,
                    };
                }
                Tok::LBracket => {
                    self.next();
                    let index = self.parse_expr()?;
                    self.expect(Tok::RBracket)?;
                    expr = Expr::Index {
                        object: Box::new(expr),
                        index: Box::new(index),
                    };
                }
                _ => return Ok(expr),
            }
        }
    }

    /// Skip a `class`/`function` construct: optional name and parameter list,
    /// then a balanced `{ ... }` body.
    fn skip_braced_construct(&mut self) -> Result<(), String> {
        while !matches!(self.peek(), Tok::LBrace | Tok::Eof) {
            self.next();
        }
        if self.peek() == &Tok::Eof {
            return Err("unterminated class/function construct".to_string());
        }
        self.skip_balanced(Tok::LBrace, Tok::RBrace)
    }

    fn skip_balanced(&mut self, open: Tok, close: Tok) -> Result<(), String> {
        self.expect(open.clone())?;
        let mut depth = 1usize;
        loop {
            match self.next() {
                t if t == open => depth += 1,
                t if t == close => {
                    depth -= 1;
                    if depth == 0 {
                        return Ok(());
                    }
                }
                Tok::Eof => return Err("unbalanced braces in schema expression".to_string()),
                _ => {}
            }
        }
    }

    /// Consume an `import`/`export` statement through its terminator.
    fn skip_statement(&mut self) {
        while !matches!(self.peek(), Tok::Semi | Tok::Eof) {
            self.next();
        }
        if self.peek() == &Tok::Semi {
            self.next();
        }
    }
}
