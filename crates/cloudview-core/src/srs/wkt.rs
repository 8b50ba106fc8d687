//! WKT1 node tree: parsing, compact and pretty output
//!
//! Leaf values keep their source text so compact output reproduces numeric
//! literals exactly (`0.0174532925199433` stays as written).

use std::fmt::Write as _;

use crate::error::{Error, Result};

/// One child of a WKT node.
#[derive(Debug, Clone, PartialEq)]
pub enum WktItem {
    /// Quoted string, stored without quotes.
    Text(String),
    /// Number or bare keyword (`EAST`, `NORTH`), stored verbatim.
    Literal(String),
    Node(WktNode),
}

/// A keyword with bracketed children, e.g. `AUTHORITY["EPSG","4326"]`.
#[derive(Debug, Clone, PartialEq)]
pub struct WktNode {
    pub keyword: String,
    pub children: Vec<WktItem>,
}

impl WktNode {
    pub fn parse(input: &str) -> Result<WktNode> {
        let mut parser = Parser {
            bytes: input.as_bytes(),
            pos: 0,
        };
        let node = parser.node()?;
        parser.skip_ws();
        if parser.pos != parser.bytes.len() {
            return Err(parser.error("trailing characters"));
        }
        Ok(node)
    }

    /// First direct child node with the given keyword.
    pub fn child(&self, keyword: &str) -> Option<&WktNode> {
        self.children.iter().find_map(|item| match item {
            WktItem::Node(n) if n.keyword.eq_ignore_ascii_case(keyword) => Some(n),
            _ => None,
        })
    }

    /// `(authority, code)` from a direct `AUTHORITY` child.
    pub fn authority(&self) -> Option<(&str, &str)> {
        let node = self.child("AUTHORITY")?;
        match (node.children.first(), node.children.get(1)) {
            (Some(WktItem::Text(name)), Some(WktItem::Text(code))) => Some((name, code)),
            _ => None,
        }
    }

    /// Single-line WKT with no whitespace between tokens.
    pub fn to_compact(&self) -> String {
        let mut out = String::new();
        self.write_compact(&mut out);
        out
    }

    /// Multi-line WKT: every child that has children of its own starts on
    /// a new line indented four spaces per depth.
    pub fn to_pretty(&self) -> String {
        let mut out = String::new();
        self.write_pretty(&mut out, 1);
        out
    }

    fn has_children(&self) -> bool {
        !self.children.is_empty()
    }

    fn write_compact(&self, out: &mut String) {
        out.push_str(&self.keyword);
        if !self.has_children() {
            return;
        }
        out.push('[');
        for (i, child) in self.children.iter().enumerate() {
            if i > 0 {
                out.push(',');
            }
            match child {
                WktItem::Text(s) => {
                    let _ = write!(out, "\"{}\"", s);
                }
                WktItem::Literal(s) => out.push_str(s),
                WktItem::Node(n) => n.write_compact(out),
            }
        }
        out.push(']');
    }

    fn write_pretty(&self, out: &mut String, depth: usize) {
        out.push_str(&self.keyword);
        if !self.has_children() {
            return;
        }
        out.push('[');
        let last = self.children.len() - 1;
        for (i, child) in self.children.iter().enumerate() {
            match child {
                WktItem::Text(s) => {
                    let _ = write!(out, "\"{}\"", s);
                }
                WktItem::Literal(s) => out.push_str(s),
                WktItem::Node(n) if n.has_children() => {
                    out.push('\n');
                    out.push_str(&" ".repeat(4 * depth));
                    n.write_pretty(out, depth + 1);
                }
                WktItem::Node(n) => n.write_compact(out),
            }
            if i < last {
                out.push(',');
            }
        }
        out.push(']');
    }
}

struct Parser<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl Parser<'_> {
    fn error(&self, message: &str) -> Error {
        Error::SpatialReference(format!("WKT {} at offset {}", message, self.pos))
    }

    fn peek(&self) -> Option<u8> {
        self.bytes.get(self.pos).copied()
    }

    fn skip_ws(&mut self) {
        while matches!(self.peek(), Some(b) if b.is_ascii_whitespace()) {
            self.pos += 1;
        }
    }

    fn expect(&mut self, byte: u8) -> Result<()> {
        self.skip_ws();
        if self.peek() == Some(byte) {
            self.pos += 1;
            Ok(())
        } else {
            Err(self.error(&format!("expected '{}'", byte as char)))
        }
    }

    fn word(&mut self) -> Result<String> {
        self.skip_ws();
        let start = self.pos;
        while matches!(self.peek(), Some(b) if b.is_ascii_alphanumeric() || b"_.+-".contains(&b)) {
            self.pos += 1;
        }
        if start == self.pos {
            return Err(self.error("expected keyword or number"));
        }
        Ok(String::from_utf8_lossy(&self.bytes[start..self.pos]).into_owned())
    }

    fn node(&mut self) -> Result<WktNode> {
        let keyword = self.word()?;
        self.skip_ws();
        let open = match self.peek() {
            Some(b'[') => b']',
            Some(b'(') => b')',
            _ => return Err(self.error("expected '['")),
        };
        self.pos += 1;

        let mut children = Vec::new();
        loop {
            children.push(self.item()?);
            self.skip_ws();
            match self.peek() {
                Some(b',') => self.pos += 1,
                Some(b) if b == open => {
                    self.pos += 1;
                    break;
                }
                _ => return Err(self.error("expected ',' or closing bracket")),
            }
        }
        Ok(WktNode { keyword, children })
    }

    fn item(&mut self) -> Result<WktItem> {
        self.skip_ws();
        match self.peek() {
            Some(b'"') => {
                self.pos += 1;
                let start = self.pos;
                while matches!(self.peek(), Some(b) if b != b'"') {
                    self.pos += 1;
                }
                let text = String::from_utf8_lossy(&self.bytes[start..self.pos]).into_owned();
                self.expect(b'"')?;
                Ok(WktItem::Text(text))
            }
            Some(_) => {
                let save = self.pos;
                let word = self.word()?;
                self.skip_ws();
                if matches!(self.peek(), Some(b'[') | Some(b'(')) {
                    self.pos = save;
                    Ok(WktItem::Node(self.node()?))
                } else {
                    Ok(WktItem::Literal(word))
                }
            }
            None => Err(self.error("unexpected end of input")),
        }
    }
}
