//! # Rules - The Combinator Algebra
//!
//! A [`Rule`] is an immutable matcher tree. Building one is cheap and
//! cloning one is cheaper: nodes are reference counted, so a grammar can
//! hand the same sub-rule (a name, a quoted literal) to several parents.
//!
//! ```text
//! Rule::literal("<!--")                 exact bytes
//! Rule::set(CharSet::digit())           one byte from a set
//! a.then(b)                             sequence
//! a.or(b)                               ordered choice
//! a.but_not(b)                          a, unless b matches at least as much
//! a.optional() / a.repeat() / a.repeat1()
//! Rule::skip_to(set)                    recovery: consume through a terminator
//! ```
//!
//! Two kinds of annotation hang off a rule:
//!
//! - **Actions** ([`Rule::action`]) are values of the grammar's action type.
//!   They are journaled with the span they matched and only replayed to the
//!   receiver once the root rule has committed.
//! - **Effects** ([`Rule::effect`] and the shorthands below it) drive the
//!   diagnostic and breadcrumb stacks the moment the rule matches.

use std::fmt;
use std::rc::Rc;

use crate::charset::CharSet;
use crate::diagnostics::{Effect, Message};

/// A composable matcher producing actions of type `A`.
pub struct Rule<A>(Rc<Node<A>>);

pub(crate) enum Node<A> {
    Empty,
    Nothing,
    Literal(Box<[u8]>),
    Set(CharSet),
    EndOfInput,
    SkipTo(CharSet),
    Seq(Rule<A>, Rule<A>),
    Choice(Rule<A>, Rule<A>),
    Difference(Rule<A>, Rule<A>),
    Optional(Rule<A>),
    Repeat { rule: Rule<A>, at_least_one: bool },
    Action(Rule<A>, A),
    Effect(Rule<A>, Effect),
}

impl<A> Clone for Rule<A> {
    fn clone(&self) -> Self {
        Rule(Rc::clone(&self.0))
    }
}

impl<A> Rule<A> {
    fn new(node: Node<A>) -> Self {
        Rule(Rc::new(node))
    }

    pub(crate) fn node(&self) -> &Node<A> {
        &self.0
    }

    /// Matches without consuming anything.
    pub fn empty() -> Self {
        Self::new(Node::Empty)
    }

    /// Never matches.
    pub fn nothing() -> Self {
        Self::new(Node::Nothing)
    }

    pub fn literal(bytes: impl AsRef<[u8]>) -> Self {
        Self::new(Node::Literal(bytes.as_ref().into()))
    }

    pub fn byte(b: u8) -> Self {
        Self::set(CharSet::from_bytes(&[b]))
    }

    pub fn set(set: CharSet) -> Self {
        Self::new(Node::Set(set))
    }

    /// One byte that is not in `set`.
    pub fn none_of(set: CharSet) -> Self {
        Self::new(Node::Set(!set))
    }

    pub fn end_of_input() -> Self {
        Self::new(Node::EndOfInput)
    }

    /// Consume everything up to and including the first byte in `terminators`.
    ///
    /// Fails when no terminator lies ahead.
    pub fn skip_to(terminators: CharSet) -> Self {
        Self::new(Node::SkipTo(terminators))
    }

    /// All rules in order.
    pub fn seq(rules: impl IntoIterator<Item = Rule<A>>) -> Self {
        rules
            .into_iter()
            .reduce(Rule::then)
            .unwrap_or_else(Rule::empty)
    }

    /// The first rule that matches.
    pub fn choice(rules: impl IntoIterator<Item = Rule<A>>) -> Self {
        rules
            .into_iter()
            .reduce(Rule::or)
            .unwrap_or_else(Rule::nothing)
    }

    pub fn then(self, next: Rule<A>) -> Self {
        Self::new(Node::Seq(self, next))
    }

    pub fn or(self, alternative: Rule<A>) -> Self {
        Self::new(Node::Choice(self, alternative))
    }

    /// Match `self` unless `excluded` matches at least as many bytes at the
    /// same position. `excluded` is tried silently.
    pub fn but_not(self, excluded: Rule<A>) -> Self {
        Self::new(Node::Difference(self, excluded))
    }

    pub fn optional(self) -> Self {
        Self::new(Node::Optional(self))
    }

    /// Zero or more.
    pub fn repeat(self) -> Self {
        Self::new(Node::Repeat {
            rule: self,
            at_least_one: false,
        })
    }

    /// One or more.
    pub fn repeat1(self) -> Self {
        Self::new(Node::Repeat {
            rule: self,
            at_least_one: true,
        })
    }

    /// Journal `action` with the matched span once the parse commits.
    pub fn action(self, action: A) -> Self {
        Self::new(Node::Action(self, action))
    }

    pub fn effect(self, effect: Effect) -> Self {
        Self::new(Node::Effect(self, effect))
    }

    pub fn push(self, message: Message) -> Self {
        self.effect(Effect::Push(message))
    }

    pub fn prepare(self, message: Message) -> Self {
        self.effect(Effect::Prepare(message))
    }

    pub fn cancel(self) -> Self {
        self.effect(Effect::Cancel)
    }

    pub fn pop(self) -> Self {
        self.effect(Effect::Pop)
    }

    /// Send the message a failed sibling alternative left at this position.
    pub fn pop_abandoned(self) -> Self {
        self.effect(Effect::PopAbandoned)
    }

    pub fn send_now(self, message: Message) -> Self {
        self.effect(Effect::SendNow(message))
    }

    pub fn enter_scope(self, label: &'static str) -> Self {
        self.effect(Effect::EnterScope(label))
    }

    pub fn leave_scope(self) -> Self {
        self.effect(Effect::LeaveScope)
    }

    pub fn replace_scope(self, label: &'static str) -> Self {
        self.effect(Effect::ReplaceScope(label))
    }
}

impl<A: fmt::Debug> fmt::Debug for Rule<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.node() {
            Node::Empty => f.write_str("Empty"),
            Node::Nothing => f.write_str("Nothing"),
            Node::Literal(bytes) => write!(f, "{:?}", String::from_utf8_lossy(bytes)),
            Node::Set(set) => write!(f, "{set:?}"),
            Node::EndOfInput => f.write_str("EndOfInput"),
            Node::SkipTo(set) => write!(f, "SkipTo({set:?})"),
            Node::Seq(a, b) => write!(f, "({a:?} >> {b:?})"),
            Node::Choice(a, b) => write!(f, "({a:?} | {b:?})"),
            Node::Difference(a, b) => write!(f, "({a:?} - {b:?})"),
            Node::Optional(rule) => write!(f, "!{rule:?}"),
            Node::Repeat {
                rule,
                at_least_one: false,
            } => write!(f, "*{rule:?}"),
            Node::Repeat {
                rule,
                at_least_one: true,
            } => write!(f, "+{rule:?}"),
            Node::Action(rule, action) => write!(f, "{rule:?}[{action:?}]"),
            Node::Effect(rule, effect) => write!(f, "{rule:?}[{effect:?}]"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seq_of_nothing_is_empty_and_choice_of_nothing_fails() {
        let seq: Rule<()> = Rule::seq([]);
        let choice: Rule<()> = Rule::choice([]);
        assert!(matches!(seq.node(), Node::Empty));
        assert!(matches!(choice.node(), Node::Nothing));
    }

    #[test]
    fn clones_share_nodes() {
        let rule: Rule<()> = Rule::literal("abc");
        let clone = rule.clone();
        assert!(Rc::ptr_eq(&rule.0, &clone.0));
    }

    #[test]
    fn debug_renders_structure() {
        let rule: Rule<&str> = Rule::literal("<")
            .then(Rule::set(CharSet::digit()).repeat1())
            .action("number")
            .or(Rule::end_of_input());
        assert_eq!(
            format!("{rule:?}"),
            "((\"<\" >> +CharSet[0x30-0x39])[\"number\"] | EndOfInput)"
        );
    }
}
