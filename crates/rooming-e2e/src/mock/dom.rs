//! Arena DOM for the in-memory application.
//!
//! Nodes are appended depth-first, so node ids are in document order. A
//! hidden element (and everything under it) reports an empty bounding box,
//! the way an off-screen carousel card does in a real browser.

use super::app::Action;
use super::css;
use crate::locator::{normalize_whitespace, BoundingBox, Locator, Selector, Step, TextMatch};
use crate::result::RoomingResult;
use std::collections::BTreeMap;

/// Index of a node in its document
pub type NodeId = usize;

/// One element
#[derive(Debug, Clone)]
pub struct Element {
    /// Lower-case tag name
    pub tag: String,
    /// Attributes
    pub attrs: BTreeMap<String, String>,
    /// Text placed before the element's children
    pub text: String,
    /// Child nodes
    pub children: Vec<NodeId>,
    /// Parent node
    pub parent: Option<NodeId>,
    /// Not rendered on screen
    pub hidden: bool,
    /// What a click on this element does
    pub action: Option<Action>,
}

impl Element {
    /// Attribute value
    #[must_use]
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs.get(name).map(String::as_str)
    }
}

/// Description of an element to append
#[derive(Debug, Clone)]
pub struct El {
    tag: String,
    attrs: BTreeMap<String, String>,
    text: String,
    hidden: bool,
    action: Option<Action>,
}

impl El {
    /// Element with a tag
    #[must_use]
    pub fn new(tag: &str) -> Self {
        Self {
            tag: tag.to_ascii_lowercase(),
            attrs: BTreeMap::new(),
            text: String::new(),
            hidden: false,
            action: None,
        }
    }

    /// Set an attribute
    #[must_use]
    pub fn attr(mut self, name: &str, value: impl Into<String>) -> Self {
        let _ = self.attrs.insert(name.to_string(), value.into());
        self
    }

    /// Set the leading text
    #[must_use]
    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    /// Mark as not rendered on screen
    #[must_use]
    pub const fn hidden(mut self, hidden: bool) -> Self {
        self.hidden = hidden;
        self
    }

    /// Bind a click action
    #[must_use]
    pub fn on_click(mut self, action: Action) -> Self {
        self.action = Some(action);
        self
    }
}

/// A rendered page
#[derive(Debug, Clone)]
pub struct Document {
    nodes: Vec<Element>,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    /// The document node
    pub const ROOT: NodeId = 0;

    /// Empty document
    #[must_use]
    pub fn new() -> Self {
        Self {
            nodes: vec![Element {
                tag: "#document".to_string(),
                attrs: BTreeMap::new(),
                text: String::new(),
                children: Vec::new(),
                parent: None,
                hidden: false,
                action: None,
            }],
        }
    }

    /// Append `el` as the last child of `parent`
    pub fn append(&mut self, parent: NodeId, el: El) -> NodeId {
        let id = self.nodes.len();
        self.nodes.push(Element {
            tag: el.tag,
            attrs: el.attrs,
            text: el.text,
            children: Vec::new(),
            parent: Some(parent),
            hidden: el.hidden,
            action: el.action,
        });
        if let Some(p) = self.nodes.get_mut(parent) {
            p.children.push(id);
        }
        id
    }

    /// Element by id
    #[must_use]
    pub fn element(&self, id: NodeId) -> Option<&Element> {
        self.nodes.get(id)
    }

    /// Parent of a node
    #[must_use]
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes.get(id).and_then(|e| e.parent)
    }

    /// Parent first, up to and including the document node
    #[must_use]
    pub fn ancestors(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut current = self.parent(id);
        while let Some(p) = current {
            out.push(p);
            current = self.parent(p);
        }
        out
    }

    /// Strict descendants in document order
    #[must_use]
    pub fn descendants(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack: Vec<NodeId> = self
            .element(id)
            .map(|e| e.children.iter().rev().copied().collect())
            .unwrap_or_default();
        while let Some(next) = stack.pop() {
            out.push(next);
            if let Some(e) = self.element(next) {
                stack.extend(e.children.iter().rev());
            }
        }
        out
    }

    /// 1-based position among siblings with the same tag
    #[must_use]
    pub fn nth_of_type(&self, id: NodeId) -> Option<usize> {
        let tag = &self.element(id)?.tag;
        let parent = self.element(self.parent(id)?)?;
        parent
            .children
            .iter()
            .filter(|c| self.element(**c).is_some_and(|e| &e.tag == tag))
            .position(|c| *c == id)
            .map(|i| i + 1)
    }

    /// Concatenated text of the subtree
    #[must_use]
    pub fn text_content(&self, id: NodeId) -> String {
        let mut out = String::new();
        self.collect_text(id, &mut out);
        out
    }

    fn collect_text(&self, id: NodeId, out: &mut String) {
        if let Some(e) = self.element(id) {
            out.push_str(&e.text);
            for c in &e.children {
                self.collect_text(*c, out);
            }
        }
    }

    /// Whether the element or an ancestor is hidden
    #[must_use]
    pub fn is_hidden(&self, id: NodeId) -> bool {
        std::iter::once(id)
            .chain(self.ancestors(id))
            .any(|n| self.element(n).is_some_and(|e| e.hidden))
    }

    /// Synthetic layout box: one row per element, empty when hidden
    #[must_use]
    pub fn bounding_box(&self, id: NodeId) -> BoundingBox {
        if id == Self::ROOT || self.is_hidden(id) {
            return BoundingBox::empty();
        }
        let depth = self.ancestors(id).len();
        #[allow(clippy::cast_precision_loss)]
        let (x, y) = (depth as f32 * 8.0, id as f32 * 20.0);
        BoundingBox::new(x, y, 120.0, 18.0)
    }

    /// ARIA role: the `role` attribute, else the tag's implicit role
    #[must_use]
    pub fn role(&self, id: NodeId) -> Option<&str> {
        let e = self.element(id)?;
        if let Some(role) = e.attr("role") {
            return Some(role);
        }
        match e.tag.as_str() {
            "button" => Some("button"),
            "h1" | "h2" | "h3" | "h4" | "h5" | "h6" => Some("heading"),
            "dialog" => Some("dialog"),
            "li" => Some("listitem"),
            "textarea" => Some("textbox"),
            "input" => match e.attr("type") {
                Some("checkbox") => Some("checkbox"),
                _ => Some("textbox"),
            },
            _ => None,
        }
    }

    /// `aria-label`, else the normalized text
    #[must_use]
    pub fn accessible_name(&self, id: NodeId) -> String {
        self.element(id)
            .and_then(|e| e.attr("aria-label"))
            .map_or_else(
                || normalize_whitespace(&self.text_content(id)),
                normalize_whitespace,
            )
    }

    /// Nearest click action on the element or an ancestor
    #[must_use]
    pub fn action(&self, id: NodeId) -> Option<Action> {
        std::iter::once(id)
            .chain(self.ancestors(id))
            .find_map(|n| self.element(n).and_then(|e| e.action.clone()))
    }

    fn text_matches(&self, id: NodeId, matcher: &TextMatch) -> bool {
        id != Self::ROOT && matcher.matches(&self.text_content(id))
    }

    fn select(&self, scope: NodeId, selector: &Selector) -> RoomingResult<Vec<NodeId>> {
        let descendants = self.descendants(scope);
        Ok(match selector {
            Selector::Css { value } => css::parse(value)?.select(self, scope),
            Selector::Text { matcher } => descendants
                .into_iter()
                .filter(|n| self.text_matches(*n, matcher))
                .filter(|n| {
                    self.element(*n)
                        .is_some_and(|e| !e.children.iter().any(|c| self.text_matches(*c, matcher)))
                })
                .collect(),
            Selector::Role { role, name } => descendants
                .into_iter()
                .filter(|n| self.role(*n) == Some(role.as_str()))
                .filter(|n| {
                    name.as_ref()
                        .map_or(true, |m| m.matches(&self.accessible_name(*n)))
                })
                .collect(),
            Selector::Placeholder { value } => {
                let wanted = value.to_lowercase();
                descendants
                    .into_iter()
                    .filter(|n| {
                        self.element(*n)
                            .and_then(|e| e.attr("placeholder"))
                            .is_some_and(|p| p.to_lowercase().contains(&wanted))
                    })
                    .collect()
            }
        })
    }

    fn has(&self, id: NodeId, selector: &Selector) -> RoomingResult<bool> {
        Ok(!self.select(id, selector)?.is_empty())
    }

    /// Every element the locator resolves to, in document order
    pub fn resolve(&self, locator: &Locator) -> RoomingResult<Vec<NodeId>> {
        let mut current = vec![Self::ROOT];
        for step in locator.steps() {
            current = match step {
                Step::Find { selector } => {
                    let mut found = Vec::new();
                    for scope in &current {
                        found.extend(self.select(*scope, selector)?);
                    }
                    found
                }
                Step::Nth { index } => current.get(*index).copied().into_iter().collect(),
                Step::Parent => current.iter().filter_map(|n| self.parent(*n)).collect(),
                Step::HasText { matcher } => current
                    .into_iter()
                    .filter(|n| self.text_matches(*n, matcher))
                    .collect(),
                Step::Has { selector } => {
                    let mut kept = Vec::new();
                    for n in current {
                        if self.has(n, selector)? {
                            kept.push(n);
                        }
                    }
                    kept
                }
            };
            current.sort_unstable();
            current.dedup();
        }
        Ok(current)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// <main><div><p>Cut-Off Date</p><div><span>Jan</span><span>15</span></div></div>
    /// <button aria-label="Go">x</button><span hidden>Off</span></main>
    fn sample() -> Document {
        let mut doc = Document::new();
        let main = doc.append(Document::ROOT, El::new("main"));
        let block = doc.append(main, El::new("div"));
        let _ = doc.append(block, El::new("p").text("Cut-Off Date"));
        let date = doc.append(block, El::new("div"));
        let _ = doc.append(date, El::new("span").text("Jan"));
        let _ = doc.append(date, El::new("span").text("15"));
        let _ = doc.append(main, El::new("button").attr("aria-label", "Go").text("x"));
        let _ = doc.append(main, El::new("span").text("Off").hidden(true));
        doc
    }

    mod structure_tests {
        use super::*;

        #[test]
        fn test_descendants_in_document_order() {
            let doc = sample();
            assert_eq!(doc.descendants(Document::ROOT), (1..=8).collect::<Vec<_>>());
        }

        #[test]
        fn test_text_content_concatenates() {
            let doc = sample();
            assert_eq!(doc.text_content(2), "Cut-Off DateJan15");
        }

        #[test]
        fn test_nth_of_type_counts_same_tag_only() {
            let doc = sample();
            assert_eq!(doc.nth_of_type(4), Some(1));
            assert_eq!(doc.nth_of_type(6), Some(2));
        }

        #[test]
        fn test_hidden_elements_have_no_area() {
            let doc = sample();
            assert!(!doc.bounding_box(8).has_area());
            assert!(doc.bounding_box(7).has_area());
        }
    }

    mod resolve_tests {
        use super::*;

        #[test]
        fn test_text_selector_picks_innermost() {
            let doc = sample();
            let loc = Locator::root().get_by_text(TextMatch::exact("Jan"));
            assert_eq!(doc.resolve(&loc).unwrap(), vec![5]);
        }

        #[test]
        fn test_parent_then_scoped_pattern() {
            let doc = sample();
            let loc = Locator::root()
                .get_by_text(TextMatch::exact("Cut-Off Date"))
                .parent()
                .get_by_text(TextMatch::pattern(r"^\d{1,2}$"));
            assert_eq!(doc.resolve(&loc).unwrap(), vec![6]);
        }

        #[test]
        fn test_role_uses_aria_label() {
            let doc = sample();
            let loc = Locator::root().get_by_role("button", Some(TextMatch::exact("Go")));
            assert_eq!(doc.resolve(&loc).unwrap(), vec![7]);
        }

        #[test]
        fn test_nth_and_filters() {
            let doc = sample();
            let spans = Locator::new("span");
            assert_eq!(doc.resolve(&spans).unwrap().len(), 3);
            assert_eq!(doc.resolve(&spans.nth(1)).unwrap(), vec![6]);
            assert!(doc.resolve(&spans.nth(9)).unwrap().is_empty());
            let blocks = Locator::new("div").filter_has(Selector::css("p"));
            assert_eq!(doc.resolve(&blocks).unwrap(), vec![2]);
        }

        #[test]
        fn test_scoped_child_selector() {
            let doc = sample();
            let loc = Locator::new("main").locator("> div > div > span");
            assert_eq!(doc.resolve(&loc).unwrap(), vec![5, 6]);
            let per_scope = Locator::new("div").locator("> span");
            assert_eq!(doc.resolve(&per_scope).unwrap(), vec![5, 6]);
        }

        #[test]
        fn test_bad_css_is_a_script_error() {
            let doc = sample();
            let err = doc.resolve(&Locator::new("div:hover")).unwrap_err();
            assert!(matches!(err, crate::result::RoomingError::Script { .. }));
        }
    }
}
