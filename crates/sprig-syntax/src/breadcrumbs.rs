//! Named-scope context for diagnostics.
//!
//! Grammars push a [`Breadcrumb`] when they enter a named scope (a config
//! section, an attribute definition) and pop it on the way out. The stack
//! never steers matching; it only prefixes emitted diagnostics with where
//! they happened.

use crate::input::Position;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Breadcrumb {
    /// Kind of scope, e.g. `"config"` or `"ATTLIST"`.
    pub label: &'static str,
    /// Name of the scope instance, copied out of the input.
    pub name: String,
    pub position: Option<Position>,
}

impl Breadcrumb {
    pub fn new(label: &'static str, name: impl Into<String>, position: Option<Position>) -> Self {
        Self {
            label,
            name: name.into(),
            position,
        }
    }

    pub fn render(&self) -> String {
        match self.position {
            Some(Position { line, column }) => format!(
                "Inside {} section for {} on line {line} at char {column}.",
                self.label, self.name
            ),
            None => format!("Inside {} section for {}", self.label, self.name),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct BreadcrumbStack {
    crumbs: Vec<Breadcrumb>,
}

impl BreadcrumbStack {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, crumb: Breadcrumb) {
        self.crumbs.push(crumb);
    }

    pub fn pop(&mut self) -> Option<Breadcrumb> {
        self.crumbs.pop()
    }

    /// Swap the innermost scope for a sibling, or open one if none is open.
    pub fn replace(&mut self, crumb: Breadcrumb) {
        self.crumbs.pop();
        self.crumbs.push(crumb);
    }

    pub fn top(&self) -> Option<&Breadcrumb> {
        self.crumbs.last()
    }

    pub fn depth(&self) -> usize {
        self.crumbs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.crumbs.is_empty()
    }

    /// Drop scopes opened past `depth`. A shallower stack is left alone.
    pub fn truncate(&mut self, depth: usize) {
        self.crumbs.truncate(depth);
    }

    pub fn clear(&mut self) {
        self.crumbs.clear();
    }

    /// Render the innermost `count` scopes, deepest first.
    pub fn output_subset(&self, count: usize) -> Vec<String> {
        self.crumbs
            .iter()
            .rev()
            .take(count)
            .map(Breadcrumb::render)
            .collect()
    }
}
