//! CSS subset used by the locator set.
//!
//! Supported: type selectors and `*`, `.class`, `[attr]`, `[attr="v"]`,
//! `:nth-of-type(n)`, descendant and `>` combinators, and a leading `>`
//! anchoring the first compound to the query scope. Like
//! `querySelectorAll`, ancestors named by the selector may lie outside the
//! scope; only the matched element itself must be inside it.

use super::dom::{Document, NodeId};
use crate::result::{RoomingError, RoomingResult};

/// One attribute condition
#[derive(Debug, Clone, PartialEq, Eq)]
struct AttrCondition {
    name: String,
    value: Option<String>,
}

/// Conditions on a single element
#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct Compound {
    tag: Option<String>,
    classes: Vec<String>,
    attrs: Vec<AttrCondition>,
    nth_of_type: Option<usize>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Combinator {
    Descendant,
    Child,
}

/// A parsed selector
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CssSelector {
    scoped: bool,
    compounds: Vec<Compound>,
    /// `combinators[i]` sits between `compounds[i]` and `compounds[i + 1]`
    combinators: Vec<Combinator>,
}

fn syntax_error(source: &str, reason: &str) -> RoomingError {
    RoomingError::Script {
        message: format!("invalid selector {source:?}: {reason}"),
    }
}

fn is_name_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '-' || c == '_'
}

struct Parser<'s> {
    source: &'s str,
    chars: Vec<char>,
    pos: usize,
}

impl<'s> Parser<'s> {
    fn new(source: &'s str) -> Self {
        Self {
            source,
            chars: source.chars().collect(),
            pos: 0,
        }
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn skip_ws(&mut self) -> bool {
        let start = self.pos;
        while self.peek().is_some_and(char::is_whitespace) {
            self.pos += 1;
        }
        self.pos > start
    }

    fn name(&mut self) -> RoomingResult<String> {
        let start = self.pos;
        while self.peek().is_some_and(is_name_char) {
            self.pos += 1;
        }
        if self.pos == start {
            return Err(syntax_error(self.source, "expected a name"));
        }
        Ok(self.chars[start..self.pos].iter().collect())
    }

    fn expect(&mut self, c: char) -> RoomingResult<()> {
        if self.peek() == Some(c) {
            self.pos += 1;
            Ok(())
        } else {
            Err(syntax_error(self.source, &format!("expected '{c}'")))
        }
    }

    fn quoted(&mut self) -> RoomingResult<String> {
        let quote = self
            .peek()
            .filter(|c| *c == '"' || *c == '\'')
            .ok_or_else(|| syntax_error(self.source, "expected a quoted value"))?;
        self.pos += 1;
        let start = self.pos;
        while self.peek().is_some_and(|c| c != quote) {
            self.pos += 1;
        }
        let value = self.chars[start..self.pos].iter().collect();
        self.expect(quote)?;
        Ok(value)
    }

    fn compound(&mut self) -> RoomingResult<Compound> {
        let mut compound = Compound::default();
        let start = self.pos;
        if self.peek() == Some('*') {
            self.pos += 1;
        } else if self.peek().is_some_and(is_name_char) {
            compound.tag = Some(self.name()?.to_ascii_lowercase());
        }
        loop {
            match self.peek() {
                Some('.') => {
                    self.pos += 1;
                    compound.classes.push(self.name()?);
                }
                Some('[') => {
                    self.pos += 1;
                    let name = self.name()?;
                    let value = if self.peek() == Some('=') {
                        self.pos += 1;
                        Some(self.quoted()?)
                    } else {
                        None
                    };
                    self.expect(']')?;
                    compound.attrs.push(AttrCondition { name, value });
                }
                Some(':') => {
                    self.pos += 1;
                    let pseudo = self.name()?;
                    if pseudo != "nth-of-type" {
                        return Err(syntax_error(self.source, "unsupported pseudo-class"));
                    }
                    self.expect('(')?;
                    let digits = self.name()?;
                    let n = digits
                        .parse::<usize>()
                        .ok()
                        .filter(|n| *n > 0)
                        .ok_or_else(|| syntax_error(self.source, "bad nth-of-type index"))?;
                    self.expect(')')?;
                    compound.nth_of_type = Some(n);
                }
                _ => break,
            }
        }
        if self.pos == start {
            return Err(syntax_error(self.source, "expected a compound selector"));
        }
        Ok(compound)
    }

    fn selector(&mut self) -> RoomingResult<CssSelector> {
        self.skip_ws();
        let scoped = self.peek() == Some('>');
        if scoped {
            self.pos += 1;
            self.skip_ws();
        }
        let mut compounds = vec![self.compound()?];
        let mut combinators = Vec::new();
        loop {
            let spaced = self.skip_ws();
            match self.peek() {
                None => break,
                Some('>') => {
                    self.pos += 1;
                    self.skip_ws();
                    combinators.push(Combinator::Child);
                }
                Some(_) if spaced => combinators.push(Combinator::Descendant),
                Some(_) => return Err(syntax_error(self.source, "unexpected character")),
            }
            compounds.push(self.compound()?);
        }
        Ok(CssSelector {
            scoped,
            compounds,
            combinators,
        })
    }
}

/// Parse a selector string
pub fn parse(source: &str) -> RoomingResult<CssSelector> {
    Parser::new(source).selector()
}

impl Compound {
    fn matches(&self, doc: &Document, node: NodeId) -> bool {
        let Some(el) = doc.element(node) else {
            return false;
        };
        if node == Document::ROOT {
            return false;
        }
        if self.tag.as_deref().is_some_and(|t| t != el.tag) {
            return false;
        }
        let class_list = el.attr("class").unwrap_or_default();
        if !self
            .classes
            .iter()
            .all(|c| class_list.split_whitespace().any(|have| have == c))
        {
            return false;
        }
        if !self.attrs.iter().all(|a| match (&a.value, el.attr(&a.name)) {
            (_, None) => false,
            (None, Some(_)) => true,
            (Some(want), Some(have)) => want == have,
        }) {
            return false;
        }
        self.nth_of_type
            .map_or(true, |n| doc.nth_of_type(node) == Some(n))
    }
}

impl CssSelector {
    /// Elements inside `scope` matching the selector, in document order
    pub fn select(&self, doc: &Document, scope: NodeId) -> Vec<NodeId> {
        doc.descendants(scope)
            .into_iter()
            .filter(|n| self.matches_at(doc, *n, self.compounds.len() - 1, scope))
            .collect()
    }

    /// Whether `node` itself matches
    pub fn matches(&self, doc: &Document, node: NodeId, scope: NodeId) -> bool {
        self.matches_at(doc, node, self.compounds.len() - 1, scope)
    }

    fn matches_at(&self, doc: &Document, node: NodeId, index: usize, scope: NodeId) -> bool {
        if !self.compounds[index].matches(doc, node) {
            return false;
        }
        if index == 0 {
            return !self.scoped || doc.parent(node) == Some(scope);
        }
        match self.combinators[index - 1] {
            Combinator::Child => doc
                .parent(node)
                .is_some_and(|p| self.matches_at(doc, p, index - 1, scope)),
            Combinator::Descendant => doc
                .ancestors(node)
                .into_iter()
                .any(|a| self.matches_at(doc, a, index - 1, scope)),
        }
    }
}
