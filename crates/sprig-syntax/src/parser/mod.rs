//! # Matcher - Backtracking Evaluation of Rules
//!
//! The [`Matcher`] walks a [`Rule`] tree over `source[start..end]`. It is a
//! plain recursive-descent backtracker. Every rule either matches and
//! returns the position after it, or fails and leaves no trace:
//!
//! - journal events recorded by the failed attempt are truncated;
//! - diagnostic entries it pushed move to the abandoned list;
//! - breadcrumbs it opened are closed.
//!
//! That makes ordered choice safe. The second alternative always starts
//! from the same state as the first.
//!
//! ## Transactions
//!
//! [`Matcher::run`] wraps every rule evaluation:
//!
//! ```text
//! mark = (events.len, diagnostic depth, abandoned len, breadcrumb depth)
//! match step(rule) {
//!     matched => forget abandoned entries past mark (the failure was recovered)
//!     failed  => rewind everything to mark
//! }
//! ```
//!
//! Diagnostic effects that already *sent* something (`Pop`, `SendNow`) cannot
//! be unsent. Grammars place them on recovery rules, which only run once the
//! precise attempt has failed. A failed attempt's entries are abandoned
//! together with the position it started at, so a recovery alternative at
//! the same position can still send the message its sibling prepared
//! (`PopAbandoned`).
//!
//! ## Silent lookahead
//!
//! `a.but_not(b)` has to know whether `b` matches without letting `b` touch
//! the journal or the stacks. Lookaheads bump a counter that turns actions and
//! effects into no-ops for the duration.
//!
//! ## Aborts
//!
//! Sending a diagnostic can exhaust the error budget. That surfaces as
//! `Err(Aborted)` from [`Matcher::run`] and unwinds the whole match through
//! `?`. Nothing else in here can fail.

pub mod event;
pub mod replay;

use crate::diagnostics::{Aborted, DiagnosticMark, Diagnostics, Effect};
use crate::input::Span;
use crate::rule::{Node, Rule};
use event::Event;

#[derive(Debug, Clone, Copy)]
struct Mark {
    events: usize,
    diagnostics: DiagnosticMark,
}

/// Evaluates rules over one input range.
pub struct Matcher<'p, 'i, A> {
    source: &'i [u8],
    end: usize,
    events: Vec<Event<A>>,
    diagnostics: Diagnostics<'p>,
    peeking: u32,
}

impl<'p, 'i, A: Clone> Matcher<'p, 'i, A> {
    /// Match over `source[..end]`. `end` is clamped to the buffer.
    pub fn new(source: &'i [u8], end: usize, diagnostics: Diagnostics<'p>) -> Self {
        Self {
            source,
            end: end.min(source.len()),
            events: Vec::new(),
            diagnostics,
            peeking: 0,
        }
    }

    pub fn diagnostics(&self) -> &Diagnostics<'p> {
        &self.diagnostics
    }

    pub fn diagnostics_mut(&mut self) -> &mut Diagnostics<'p> {
        &mut self.diagnostics
    }

    pub fn events(&self) -> &[Event<A>] {
        &self.events
    }

    /// Hand back the journal and the diagnostic state.
    pub fn finish(self) -> (Vec<Event<A>>, Diagnostics<'p>) {
        (self.events, self.diagnostics)
    }

    /// Match `rule` at `pos`, returning the position after the match.
    ///
    /// On `Ok(None)` the journal and stacks are exactly as they were before
    /// the call, apart from entries moved to the abandoned list.
    pub fn run(&mut self, rule: &Rule<A>, pos: usize) -> Result<Option<usize>, Aborted> {
        let mark = self.mark();
        let matched = self.step(rule, pos)?;
        match matched {
            Some(_) => self.diagnostics.settle(mark.diagnostics),
            None => self.rewind(mark, pos),
        }
        Ok(matched)
    }

    fn step(&mut self, rule: &Rule<A>, pos: usize) -> Result<Option<usize>, Aborted> {
        let matched = match rule.node() {
            Node::Empty => Some(pos),
            Node::Nothing => None,
            Node::Literal(bytes) => self
                .remaining(pos)
                .starts_with(bytes)
                .then(|| pos + bytes.len()),
            Node::Set(set) => self
                .remaining(pos)
                .first()
                .filter(|b| set.contains(**b))
                .map(|_| pos + 1),
            Node::EndOfInput => (pos == self.end).then_some(pos),
            Node::SkipTo(terminators) => self
                .remaining(pos)
                .iter()
                .position(|b| terminators.contains(*b))
                .map(|offset| pos + offset + 1),
            Node::Seq(first, second) => match self.run(first, pos)? {
                Some(next) => self.run(second, next)?,
                None => None,
            },
            Node::Choice(left, right) => match self.run(left, pos)? {
                Some(next) => Some(next),
                None => self.run(right, pos)?,
            },
            Node::Difference(keep, excluded) => match self.run(keep, pos)? {
                Some(next) => match self.peek(excluded, pos)? {
                    Some(other) if other >= next => None,
                    _ => Some(next),
                },
                None => None,
            },
            Node::Optional(rule) => Some(self.run(rule, pos)?.unwrap_or(pos)),
            Node::Repeat { rule, at_least_one } => {
                let mut cursor = pos;
                let mut count = 0usize;
                while let Some(next) = self.run(rule, cursor)? {
                    count += 1;
                    if next == cursor {
                        break;
                    }
                    cursor = next;
                }
                (count > 0 || !at_least_one).then_some(cursor)
            }
            Node::Action(rule, action) => self.record(rule, action, pos)?,
            Node::Effect(rule, effect) => match self.run(rule, pos)? {
                Some(next) => {
                    self.apply(effect, pos, next)?;
                    Some(next)
                }
                None => None,
            },
        };
        Ok(matched)
    }

    fn remaining(&self, pos: usize) -> &'i [u8] {
        self.source.get(pos..self.end).unwrap_or_default()
    }

    /// Reserve a journal slot, match, then fill the slot in.
    fn record(&mut self, rule: &Rule<A>, action: &A, pos: usize) -> Result<Option<usize>, Aborted> {
        if self.peeking > 0 {
            return self.run(rule, pos);
        }
        let slot = self.events.len();
        self.events.push(Event::Placeholder);
        let matched = self.run(rule, pos)?;
        if let Some(end) = matched {
            let nested = self.events.len() - slot - 1;
            self.events[slot] = Event::Action {
                action: action.clone(),
                start: pos,
                end,
                nested,
            };
        }
        // A failed slot is truncated by the enclosing `run`.
        Ok(matched)
    }

    fn peek(&mut self, rule: &Rule<A>, pos: usize) -> Result<Option<usize>, Aborted> {
        self.peeking += 1;
        let matched = self.run(rule, pos);
        self.peeking -= 1;
        matched
    }

    fn apply(&mut self, effect: &Effect, start: usize, end: usize) -> Result<(), Aborted> {
        if self.peeking > 0 {
            return Ok(());
        }
        self.diagnostics
            .apply(effect, Span::new(self.source, start, end))
    }

    fn mark(&self) -> Mark {
        Mark {
            events: self.events.len(),
            diagnostics: self.diagnostics.mark(),
        }
    }

    fn rewind(&mut self, mark: Mark, pos: usize) {
        self.events.truncate(mark.events);
        self.diagnostics.rewind(mark.diagnostics, pos);
    }
}
