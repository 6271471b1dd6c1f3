//! # Replay - Walking a Committed Journal
//!
//! [`Journal`] wraps the events of a committed match and presents them as a
//! tree of [`EventNode`]s. Grammar crates walk that tree to call their
//! receivers: an action's children are the actions matched inside it, so a
//! handler can deliver children first (the order semantic actions would
//! fire in) or route them to a different receiver entirely.

use super::event::Event;
use crate::input::Span;

/// The events of one committed parse.
#[derive(Debug)]
pub struct Journal<'e, 'i, A> {
    source: &'i [u8],
    events: &'e [Event<A>],
}

impl<'e, 'i, A> Journal<'e, 'i, A> {
    pub fn new(source: &'i [u8], events: &'e [Event<A>]) -> Self {
        Self { source, events }
    }

    /// The top-level actions.
    pub fn nodes(&self) -> Nodes<'e, 'i, A> {
        Nodes {
            source: self.source,
            rest: self.events,
        }
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

/// One journaled action and the actions nested in it.
#[derive(Debug)]
pub struct EventNode<'e, 'i, A> {
    action: &'e A,
    span: Span<'i>,
    children: &'e [Event<A>],
}

impl<'e, 'i, A> EventNode<'e, 'i, A> {
    pub fn action(&self) -> &'e A {
        self.action
    }

    pub fn span(&self) -> Span<'i> {
        self.span
    }

    pub fn children(&self) -> Nodes<'e, 'i, A> {
        Nodes {
            source: self.span.source(),
            rest: self.children,
        }
    }

    /// Every action at any depth below this one, in journal order.
    pub fn descendants(&self) -> impl Iterator<Item = EventNode<'e, 'i, A>> + use<'e, 'i, A> {
        let source = self.span.source();
        let children = self.children;
        (0..children.len())
            .filter(move |&i| matches!(children[i], Event::Action { .. }))
            .filter_map(move |i| {
                Nodes {
                    source,
                    rest: &children[i..],
                }
                .next()
            })
    }
}

/// Sibling actions at one level of the journal tree.
#[derive(Debug)]
pub struct Nodes<'e, 'i, A> {
    source: &'i [u8],
    rest: &'e [Event<A>],
}

// Manual impls: the derives would demand `A: Clone`.
impl<A> Clone for Journal<'_, '_, A> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<A> Copy for Journal<'_, '_, A> {}

impl<A> Clone for EventNode<'_, '_, A> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<A> Copy for EventNode<'_, '_, A> {}

impl<A> Clone for Nodes<'_, '_, A> {
    fn clone(&self) -> Self {
        Nodes {
            source: self.source,
            rest: self.rest,
        }
    }
}

impl<'e, 'i, A> Iterator for Nodes<'e, 'i, A> {
    type Item = EventNode<'e, 'i, A>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let (first, tail) = self.rest.split_first()?;
            match first {
                Event::Action {
                    action,
                    start,
                    end,
                    nested,
                } => {
                    let (children, rest) = tail.split_at((*nested).min(tail.len()));
                    self.rest = rest;
                    return Some(EventNode {
                        action,
                        span: Span::new(self.source, *start, *end),
                        children,
                    });
                }
                Event::Placeholder => {
                    log::error!("placeholder left in a committed journal");
                    self.rest = tail;
                }
            }
        }
    }
}
