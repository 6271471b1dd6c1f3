//! # Journal Events
//!
//! While matching, the [`Matcher`](super::Matcher) does not call receivers.
//! It appends events to a journal instead, and throws the tail of the
//! journal away whenever an attempt fails. Only a journal belonging to a
//! committed root match is ever replayed.
//!
//! Events are written in pre-order. An action rule reserves a slot before
//! matching its inner rule, so the events of everything nested inside it
//! follow the slot:
//!
//! ```text
//! Action(AttributeValue)  nested: 3   ← 'b&x;'
//!   Action(Value)         nested: 0   ← b
//!   Action(Reference)     nested: 1   ← &x;
//!     Action(Name)        nested: 0   ← x
//! ```
//!
//! A slot whose inner rule failed is truncated together with everything
//! after it, so a committed journal never contains a
//! [`Placeholder`](Event::Placeholder).

/// A journal entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event<A> {
    /// Reserved for an action whose inner rule is still matching.
    Placeholder,

    /// An action whose inner rule matched `start..end`.
    ///
    /// `nested` counts the events recorded while the inner rule matched.
    /// They immediately follow this one.
    Action {
        action: A,
        start: usize,
        end: usize,
        nested: usize,
    },
}
