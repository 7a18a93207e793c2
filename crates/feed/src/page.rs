//! Parsed page tree and selector queries.
//!
//! The scraping layer hands over a tree of elements with their class lists
//! and text content. The site generates suffixed class names
//! (`value--OUKql`, `results-event--Me6XJ`), so selectors match on class
//! fragments, the way `[class*="…"]` CSS selectors would.

use serde::{Deserialize, Serialize};

/// One element of a parsed page.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PageNode {
    pub tag: String,
    #[serde(default)]
    pub classes: Vec<String>,
    /// The element's own text, not including children.
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub children: Vec<PageNode>,
}

impl PageNode {
    #[must_use]
    pub fn new(tag: &str) -> Self {
        Self {
            tag: tag.to_string(),
            ..Self::default()
        }
    }

    /// Builder: adds a class.
    #[must_use]
    pub fn with_class(mut self, class: &str) -> Self {
        self.classes.push(class.to_string());
        self
    }

    /// Builder: sets the element's own text.
    #[must_use]
    pub fn with_text(mut self, text: &str) -> Self {
        self.text = text.to_string();
        self
    }

    /// Builder: appends a child.
    #[must_use]
    pub fn with_child(mut self, child: PageNode) -> Self {
        self.children.push(child);
        self
    }

    /// Full text content: own text plus descendants, space-joined, trimmed.
    #[must_use]
    pub fn full_text(&self) -> String {
        let mut parts = Vec::new();
        self.collect_text(&mut parts);
        parts.join(" ").trim().to_string()
    }

    fn collect_text(&self, out: &mut Vec<String>) {
        let own = self.text.trim();
        if !own.is_empty() {
            out.push(own.to_string());
        }
        for child in &self.children {
            child.collect_text(out);
        }
    }

    /// All descendants (not self) matching the selector, in document order.
    #[must_use]
    pub fn select<'a>(&'a self, selector: &Selector) -> Vec<&'a PageNode> {
        let mut found = Vec::new();
        for child in &self.children {
            child.collect_matches(selector, &mut found);
        }
        found
    }

    /// First descendant matching the selector.
    #[must_use]
    pub fn select_first<'a>(&'a self, selector: &Selector) -> Option<&'a PageNode> {
        self.select(selector).into_iter().next()
    }

    fn collect_matches<'a>(&'a self, selector: &Selector, out: &mut Vec<&'a PageNode>) {
        if selector.matches(self) {
            out.push(self);
        }
        for child in &self.children {
            child.collect_matches(selector, out);
        }
    }
}

/// Matches an element by tag and class fragments.
///
/// Every fragment must be contained in at least one of the element's
/// classes; the tag, when set, must match exactly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Selector {
    pub tag: Option<String>,
    pub class_fragments: Vec<String>,
}

impl Selector {
    /// Selector on a single class fragment, any tag.
    #[must_use]
    pub fn class(fragment: &str) -> Self {
        Self {
            tag: None,
            class_fragments: vec![fragment.to_string()],
        }
    }

    /// Selector on tag plus a class fragment.
    #[must_use]
    pub fn tag_class(tag: &str, fragment: &str) -> Self {
        Self {
            tag: Some(tag.to_string()),
            class_fragments: vec![fragment.to_string()],
        }
    }

    /// Adds a further class fragment that must also match.
    #[must_use]
    pub fn and_class(mut self, fragment: &str) -> Self {
        self.class_fragments.push(fragment.to_string());
        self
    }

    /// True when the node satisfies this selector.
    #[must_use]
    pub fn matches(&self, node: &PageNode) -> bool {
        if let Some(tag) = &self.tag {
            if node.tag != *tag {
                return false;
            }
        }
        self.class_fragments
            .iter()
            .all(|fragment| node.classes.iter().any(|class| class.contains(fragment)))
    }
}

/// A descendant chain of selectors, like `div.team-name div.overflowed-text`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Query {
    steps: Vec<Selector>,
}

impl Query {
    #[must_use]
    pub fn one(selector: Selector) -> Self {
        Self {
            steps: vec![selector],
        }
    }

    #[must_use]
    pub fn chain(steps: Vec<Selector>) -> Self {
        Self { steps }
    }

    /// All nodes matched by walking the chain through descendants.
    #[must_use]
    pub fn select<'a>(&self, root: &'a PageNode) -> Vec<&'a PageNode> {
        let mut current: Vec<&PageNode> = vec![root];
        for step in &self.steps {
            let mut next = Vec::new();
            for node in current {
                next.extend(node.select(step));
            }
            current = next;
        }
        current
    }
}

/// Tries queries in priority order; returns the first non-empty text found.
#[must_use]
pub fn first_non_empty_text(root: &PageNode, queries: &[Query]) -> Option<String> {
    for query in queries {
        for node in query.select(root) {
            let text = node.full_text();
            if !text.is_empty() {
                return Some(text);
            }
        }
    }
    None
}
