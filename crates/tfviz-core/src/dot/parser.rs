//! Recursive descent parser turning DOT tokens into a flat [`Graph`]

use super::lexer::{Lexer, Token, TokenKind};
use crate::address::parse_address;
use crate::error::{Error, Result};
use crate::filter::JunkRules;
use crate::graph::Graph;
use crate::model::*;

/// Classify a node from its identifier alone.
pub fn classify(identifier: &str, junk: &JunkRules) -> NodeKind {
    if junk.is_junk(identifier) {
        NodeKind::Junk
    } else if parse_address(resource_address(identifier)).is_module() {
        NodeKind::Module
    } else {
        NodeKind::Resource
    }
}

pub struct Parser<'r> {
    tokens: Vec<Token>,
    pos: usize,
    junk: &'r JunkRules,
    directed: bool,
    graph: Graph,
}

impl<'r> Parser<'r> {
    pub fn new(source: &str, junk: &'r JunkRules) -> Result<Self> {
        Ok(Parser {
            tokens: Lexer::new(source).tokenize()?,
            pos: 0,
            junk,
            directed: true,
            graph: Graph::new(),
        })
    }

    pub fn parse(mut self) -> Result<Graph> {
        if self.peek().is_keyword("strict") {
            self.advance();
        }
        let header = self.advance();
        if header.is_keyword("digraph") {
            self.directed = true;
        } else if header.is_keyword("graph") {
            self.directed = false;
        } else {
            return Err(self.error_at(&header, "expected 'digraph' or 'graph'"));
        }

        if let TokenKind::Id { text, .. } = self.peek().kind.clone() {
            self.graph.name = Some(text);
            self.advance();
        }
        self.expect(TokenKind::LBrace, "'{'")?;
        self.stmt_list()?;
        self.expect(TokenKind::RBrace, "'}'")?;

        let trailing = self.peek();
        if trailing.kind != TokenKind::Eof {
            return Err(self.error_at(trailing, "unexpected content after the closing '}'"));
        }
        Ok(self.graph)
    }

    fn peek(&self) -> &Token {
        // The lexer always terminates the stream with Eof.
        &self.tokens[self.pos.min(self.tokens.len() - 1)]
    }

    fn advance(&mut self) -> Token {
        let token = self.peek().clone();
        if self.pos < self.tokens.len() {
            self.pos += 1;
        }
        token
    }

    fn error_at(&self, token: &Token, message: impl Into<String>) -> Error {
        Error::parse(token.line, token.column, message)
    }

    fn expect(&mut self, kind: TokenKind, what: &str) -> Result<Token> {
        let token = self.advance();
        if token.kind == kind {
            Ok(token)
        } else {
            Err(self.error_at(&token, format!("expected {}, found {}", what, describe(&token))))
        }
    }

    fn expect_id(&mut self, what: &str) -> Result<String> {
        let token = self.advance();
        match token.kind {
            TokenKind::Id { text, .. } => Ok(text),
            _ => Err(self.error_at(&token, format!("expected {}, found {}", what, describe(&token)))),
        }
    }

    /// An attribute value and whether it was written as an HTML string.
    fn expect_value(&mut self) -> Result<(String, bool)> {
        let token = self.advance();
        match token.kind {
            TokenKind::Id { text, html, .. } => Ok((text, html)),
            _ => Err(self.error_at(
                &token,
                format!("expected an attribute value, found {}", describe(&token)),
            )),
        }
    }

    fn skip_separator(&mut self) {
        if matches!(self.peek().kind, TokenKind::Semi | TokenKind::Comma) {
            self.advance();
        }
    }

    fn stmt_list(&mut self) -> Result<()> {
        while !matches!(self.peek().kind, TokenKind::RBrace | TokenKind::Eof) {
            self.stmt()?;
            self.skip_separator();
        }
        Ok(())
    }

    fn stmt(&mut self) -> Result<()> {
        let token = self.peek().clone();

        if token.kind == TokenKind::LBrace || token.is_keyword("subgraph") {
            return self.subgraph();
        }
        if token.is_keyword("graph") || token.is_keyword("node") || token.is_keyword("edge") {
            self.advance();
            let attrs = self.attr_list()?;
            tracing::trace!("Ignoring default attributes {:?}", attrs);
            return Ok(());
        }

        let TokenKind::Id { text: first, .. } = token.kind.clone() else {
            return Err(self.error_at(&token, format!("unexpected {}", describe(&token))));
        };
        self.advance();

        if self.peek().kind == TokenKind::Equals {
            self.advance();
            let value = self.expect_id("an attribute value")?;
            tracing::trace!("Ignoring graph attribute {}={}", first, value);
            return Ok(());
        }

        self.skip_port()?;
        let mut chain = vec![first];
        loop {
            let op = self.peek().clone();
            match op.kind {
                TokenKind::Arrow if !self.directed => {
                    return Err(self.error_at(&op, "'->' used in an undirected graph"));
                }
                TokenKind::Line if self.directed => {
                    return Err(self.error_at(&op, "'--' used in a directed graph"));
                }
                TokenKind::Arrow | TokenKind::Line => {
                    self.advance();
                    let next = self.peek().clone();
                    if next.kind == TokenKind::LBrace || next.is_keyword("subgraph") {
                        return Err(self.error_at(&next, "edges to subgraphs are not supported"));
                    }
                    chain.push(self.expect_id("an edge target")?);
                    self.skip_port()?;
                }
                _ => break,
            }
        }

        let attrs = if self.peek().kind == TokenKind::LBracket {
            self.attr_list()?
        } else {
            Attributes::new()
        };

        if chain.len() == 1 {
            self.declare_node(chain.remove(0), attrs);
        } else {
            for pair in chain.windows(2) {
                let source = self.ensure_node(&pair[0]);
                let target = self.ensure_node(&pair[1]);
                self.graph.add_edge(GraphEdge {
                    source,
                    target,
                    attrs: attrs.clone(),
                });
            }
        }
        Ok(())
    }

    /// Nested blocks are flattened into the enclosing graph.
    fn subgraph(&mut self) -> Result<()> {
        if self.peek().is_keyword("subgraph") {
            self.advance();
            if let TokenKind::Id { text, .. } = &self.peek().kind {
                tracing::trace!("Flattening subgraph {}", text);
                self.advance();
            }
        }
        self.expect(TokenKind::LBrace, "'{'")?;
        self.stmt_list()?;
        self.expect(TokenKind::RBrace, "'}'")?;

        let after = self.peek();
        if matches!(after.kind, TokenKind::Arrow | TokenKind::Line) {
            return Err(self.error_at(after, "edges from subgraphs are not supported"));
        }
        Ok(())
    }

    /// `a:port:compass` endpoints; the port is dropped.
    fn skip_port(&mut self) -> Result<()> {
        while self.peek().kind == TokenKind::Colon {
            self.advance();
            self.expect_id("a port name")?;
        }
        Ok(())
    }

    /// One or more `[a=b, c=d]` groups.
    fn attr_list(&mut self) -> Result<Attributes> {
        let mut attrs = Attributes::new();
        while self.peek().kind == TokenKind::LBracket {
            self.advance();
            loop {
                if self.peek().kind == TokenKind::RBracket {
                    self.advance();
                    break;
                }
                let key = self.expect_id("an attribute name")?;
                if self.peek().kind == TokenKind::Equals {
                    self.advance();
                    match self.expect_value()? {
                        (value, true) => attrs.insert_html(key, value),
                        (value, false) => attrs.insert(key, value),
                    }
                } else {
                    // A bare name means `name=true` in DOT.
                    attrs.insert(key, "true");
                }
                self.skip_separator();
            }
        }
        Ok(attrs)
    }

    fn declare_node(&mut self, name: String, attrs: Attributes) {
        let kind = classify(&name, self.junk);
        let mut node = GraphNode::new(name, kind);
        if let Some(label) = attrs.get("label") {
            node.label = label.to_string();
        }
        node.attrs = attrs;
        if self.graph.find_node(&node.name).is_some() {
            tracing::debug!("Node {} declared more than once, merging attributes", node.name);
        }
        self.graph.add_node(node);
    }

    fn ensure_node(&mut self, name: &str) -> NodeId {
        match self.graph.find_node(name) {
            Some(id) => id,
            None => {
                let kind = classify(name, self.junk);
                self.graph.add_node(GraphNode::new(name, kind))
            }
        }
    }
}

fn describe(token: &Token) -> String {
    match &token.kind {
        TokenKind::Id { text, .. } => format!("'{}'", text),
        TokenKind::LBrace => "'{'".to_string(),
        TokenKind::RBrace => "'}'".to_string(),
        TokenKind::LBracket => "'['".to_string(),
        TokenKind::RBracket => "']'".to_string(),
        TokenKind::Equals => "'='".to_string(),
        TokenKind::Semi => "';'".to_string(),
        TokenKind::Comma => "','".to_string(),
        TokenKind::Colon => "':'".to_string(),
        TokenKind::Arrow => "'->'".to_string(),
        TokenKind::Line => "'--'".to_string(),
        TokenKind::Eof => "end of input".to_string(),
    }
}
