//! A small owned element tree.
//!
//! Renderers build `ViewNode`s and reconcile them against an explicit
//! container node. The web shell mirrors a container's children into the
//! live document, so every rendering rule can be tested without a page.

use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewNode {
    pub tag: &'static str,
    pub classes: Vec<String>,
    pub attributes: BTreeMap<String, String>,
    pub text: Option<String>,
    pub children: Vec<ViewNode>,
}

impl ViewNode {
    #[must_use]
    pub fn new(tag: &'static str) -> Self {
        Self {
            tag,
            classes: Vec::new(),
            attributes: BTreeMap::new(),
            text: None,
            children: Vec::new(),
        }
    }

    #[must_use]
    pub fn class(mut self, class: impl Into<String>) -> Self {
        let class = class.into();
        if !self.classes.contains(&class) {
            self.classes.push(class);
        }
        self
    }

    #[must_use]
    pub fn attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(name.into(), value.into());
        self
    }

    #[must_use]
    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    #[must_use]
    pub fn child(mut self, child: ViewNode) -> Self {
        self.children.push(child);
        self
    }

    #[must_use]
    pub fn has_class(&self, class: &str) -> bool {
        self.classes.iter().any(|existing| existing == class)
    }

    #[must_use]
    pub fn data(&self, name: &str) -> Option<&str> {
        self.attributes
            .get(&format!("data-{name}"))
            .map(String::as_str)
    }

    pub fn replace_children(&mut self, children: Vec<ViewNode>) {
        self.children = children;
    }

    /// Depth-first search over descendants (not `self`).
    #[must_use]
    pub fn find_all_by_class(&self, class: &str) -> Vec<&ViewNode> {
        let mut found = Vec::new();
        for child in &self.children {
            child.collect_by_class(class, &mut found);
        }
        found
    }

    fn collect_by_class<'a>(&'a self, class: &str, found: &mut Vec<&'a ViewNode>) {
        if self.has_class(class) {
            found.push(self);
        }
        for child in &self.children {
            child.collect_by_class(class, found);
        }
    }

    #[must_use]
    pub fn find_by_class(&self, class: &str) -> Option<&ViewNode> {
        self.find_all_by_class(class).into_iter().next()
    }

    /// Concatenated text of this node and its descendants.
    #[must_use]
    pub fn text_content(&self) -> String {
        let mut out = String::new();
        self.push_text(&mut out);
        out
    }

    fn push_text(&self, out: &mut String) {
        if let Some(text) = &self.text {
            out.push_str(text);
        }
        for child in &self.children {
            child.push_text(out);
        }
    }
}
