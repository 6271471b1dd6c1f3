//! # Diagnostics - Speculative Messages Under Backtracking
//!
//! A grammar often knows that something *might* be wrong before it knows
//! whether it is. `"<!--"` has matched, so if no `"-->"` turns up later the
//! comment is unterminated. The diagnostic stack holds such tentative
//! messages:
//!
//! ```text
//! Push(msg)     "<!--" matched; remember what to say if the rest fails
//! Prepare(msg)  more matched; replace the pending message with a sharper one
//! Cancel        the construct completed; forget the pending message
//! Pop           the construct is being skipped; send the pending message
//! PopAbandoned  a sibling alternative failed; send what it left behind
//! SendNow(msg)  certain already; send immediately
//! ```
//!
//! These effects run as soon as the rule carrying them matches. They are not
//! journaled like semantic actions, so the matcher has to keep the stack
//! consistent when it backtracks: entries pushed by an attempt that later
//! fails are moved to an *abandoned* list. If an enclosing rule succeeds
//! anyway the failure was recovered and the abandoned entries are dropped.
//! If the root rule fails they are what the driver reports.
//!
//! ## Recovery pops
//!
//! Recovery rules come in two shapes. When the construct has already pushed
//! its message and only its tail can fail, the live top is its own and `Pop`
//! sends it:
//!
//! ```text
//! comment = "<!--".push(..) (content "-->".cancel() | skip.pop())
//! ```
//!
//! When the recovery is a sibling of alternatives that push for themselves,
//! their entries are already abandoned by the time it runs, and the live top
//! belongs to whoever embedded the construct:
//!
//! ```text
//! value = quoted('...') | quoted("...") | skip.pop_abandoned()
//! ```
//!
//! `PopAbandoned` claims the highest entry that a failed sibling started at
//! the recovery's own position left at or above the current depth, and
//! never touches the live stack. Entries abandoned by nested constructs
//! started elsewhere, so they never satisfy the position check.
//!
//! ## Error budget
//!
//! Every message at [`Level::Minor`] or above counts against the budget.
//! When the count reaches the configured maximum, [`Diagnostics::send`]
//! returns [`Aborted`]. The matcher propagates it with `?` and the driver
//! turns it into [`ParseResult::Aborted`](crate::ParseResult::Aborted).

use std::fmt;

use crate::breadcrumbs::{Breadcrumb, BreadcrumbStack};
use crate::input::{LineIndex, Span};

/// Severity of a diagnostic, least to most severe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub enum Level {
    #[default]
    None,
    Info,
    /// Context about the content that caused a following message.
    Content,
    Warn,
    Minor,
    Major,
    Fatal,
    Except,
}

impl Level {
    pub fn name(self) -> &'static str {
        match self {
            Level::None => "None",
            Level::Info => "Info",
            Level::Content => "Content",
            Level::Warn => "Warn",
            Level::Minor => "Minor",
            Level::Major => "Major",
            Level::Fatal => "Fatal",
            Level::Except => "Except",
        }
    }

    /// Whether a message at this level is charged to the error budget.
    pub fn is_error(self) -> bool {
        self >= Level::Minor
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A diagnostic template attached to a rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Message {
    pub level: Level,
    pub text: &'static str,
    /// Which grammar produced the message.
    pub origin: Option<&'static str>,
}

impl Message {
    pub const fn new(level: Level, text: &'static str) -> Self {
        Self {
            level,
            text,
            origin: None,
        }
    }

    pub const fn minor(text: &'static str) -> Self {
        Self::new(Level::Minor, text)
    }

    pub const fn major(text: &'static str) -> Self {
        Self::new(Level::Major, text)
    }

    pub const fn fatal(text: &'static str) -> Self {
        Self::new(Level::Fatal, text)
    }

    pub const fn with_origin(self, origin: &'static str) -> Self {
        Self {
            origin: Some(origin),
            ..self
        }
    }
}

/// A diagnostic or scope operation performed when a rule matches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Effect {
    Push(Message),
    Prepare(Message),
    Cancel,
    Pop,
    PopAbandoned,
    SendNow(Message),
    /// Open a scope named by the matched text.
    EnterScope(&'static str),
    LeaveScope,
    /// Close the innermost scope and open a sibling named by the matched text.
    ReplaceScope(&'static str),
}

/// Destination for diagnostics, implemented by the caller.
///
/// Returning `false` from any method detaches the sink for the rest of the
/// current parse. Matching carries on; later messages are dropped.
pub trait MessageSink {
    fn give_message(&mut self, level: Level, text: &str) -> bool;

    fn give_message_at_line(&mut self, level: Level, text: &str, line: u32) -> bool {
        let _ = line;
        self.give_message(level, text)
    }

    /// `file` carries the origin tag of the grammar that raised the message.
    fn give_message_in_file(&mut self, level: Level, text: &str, file: &str, line: u32) -> bool {
        let _ = file;
        self.give_message_at_line(level, text, line)
    }
}

/// Raised when the error budget is exhausted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("too many errors found ({errors} at or above minor severity)")]
pub struct Aborted {
    pub errors: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Entry {
    message: Message,
    line: u32,
}

/// An entry moved off the stack by a failed attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Abandoned {
    entry: Entry,
    /// Index the entry had on the stack.
    height: usize,
    /// Input position where the failed attempt started.
    at: usize,
    /// Sent by a `PopAbandoned`; skipped when flushing.
    claimed: bool,
}

/// Pending diagnostics plus those abandoned by failed attempts.
#[derive(Debug, Clone, Default)]
pub struct DiagnosticStack {
    entries: Vec<Entry>,
    abandoned: Vec<Abandoned>,
}

impl DiagnosticStack {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn depth(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty() && self.abandoned.is_empty()
    }

    /// Texts of the pending entries, bottom first.
    pub fn pending(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.entries.iter().map(|entry| entry.message.text)
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.abandoned.clear();
    }

    /// Claim the highest unclaimed entry that a failed sibling attempt
    /// started at `at` left at or above the current depth.
    fn claim_abandoned(&mut self, at: usize) -> Option<Entry> {
        let depth = self.entries.len();
        let (_, found) = self
            .abandoned
            .iter_mut()
            .enumerate()
            .filter(|(_, a)| !a.claimed && a.at == at && a.height >= depth)
            .max_by_key(|(index, a)| (a.height, *index))?;
        found.claimed = true;
        Some(found.entry)
    }
}

/// Snapshot of stack depths taken when a rule starts matching.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct DiagnosticMark {
    depth: usize,
    abandoned: usize,
    crumbs: usize,
}

/// Totals for one parse.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Report {
    /// Messages charged to the error budget.
    pub errors: usize,
    /// Most severe level sent.
    pub highest: Level,
}

/// Diagnostic state for one parse: both stacks, the sink and the budget.
pub struct Diagnostics<'p> {
    stack: &'p mut DiagnosticStack,
    crumbs: &'p mut BreadcrumbStack,
    sink: Option<&'p mut dyn MessageSink>,
    lines: LineIndex,
    max_errors: usize,
    report: Report,
    last: Option<String>,
}

impl<'p> Diagnostics<'p> {
    pub fn new(
        stack: &'p mut DiagnosticStack,
        crumbs: &'p mut BreadcrumbStack,
        sink: &'p mut dyn MessageSink,
        lines: LineIndex,
        max_errors: usize,
    ) -> Self {
        Self {
            stack,
            crumbs,
            sink: Some(sink),
            lines,
            max_errors,
            report: Report::default(),
            last: None,
        }
    }

    pub fn depth(&self) -> usize {
        self.stack.depth()
    }

    pub fn breadcrumbs(&self) -> &BreadcrumbStack {
        self.crumbs
    }

    pub fn report(&self) -> Report {
        self.report
    }

    pub fn is_detached(&self) -> bool {
        self.sink.is_none()
    }

    /// Perform `effect` for a rule that matched `span`.
    pub fn apply(&mut self, effect: &Effect, span: Span<'_>) -> Result<(), Aborted> {
        let line = self.lines.line(span.start());
        match *effect {
            Effect::Push(message) => {
                log::trace!("push {:?} at line {line}", message.text);
                self.stack.entries.push(Entry { message, line });
            }
            Effect::Prepare(message) => {
                debug_assert!(
                    self.stack.depth() > 0,
                    "prepare with no pending diagnostic: {:?}",
                    message.text
                );
                match self.stack.entries.last_mut() {
                    Some(top) => {
                        log::trace!("prepare {:?} at line {line}", message.text);
                        *top = Entry { message, line };
                    }
                    None => log::error!("prepare with no pending diagnostic: {:?}", message.text),
                }
            }
            Effect::Cancel => {
                debug_assert!(
                    self.stack.depth() > 0,
                    "cancel with no pending diagnostic at line {line}"
                );
                if self.stack.entries.pop().is_none() {
                    log::error!("cancel with no pending diagnostic at line {line}");
                }
            }
            Effect::Pop => {
                if let Some(entry) = self.stack.entries.pop() {
                    self.send_entry(entry)?;
                }
            }
            Effect::PopAbandoned => {
                if let Some(entry) = self.stack.claim_abandoned(span.start()) {
                    log::trace!("claiming abandoned {:?}", entry.message.text);
                    self.send_entry(entry)?;
                }
            }
            Effect::SendNow(message) => {
                self.send(message.level, message.text, line, message.origin)?;
            }
            Effect::EnterScope(label) => {
                let crumb = self.breadcrumb(label, span);
                self.crumbs.push(crumb);
            }
            Effect::LeaveScope => {
                if self.crumbs.pop().is_none() {
                    log::error!("leaving a scope that was never entered at line {line}");
                }
            }
            Effect::ReplaceScope(label) => {
                let crumb = self.breadcrumb(label, span);
                self.crumbs.replace(crumb);
            }
        }
        Ok(())
    }

    fn breadcrumb(&self, label: &'static str, span: Span<'_>) -> Breadcrumb {
        Breadcrumb::new(
            label,
            span.text(),
            Some(self.lines.position(span.start())),
        )
    }

    /// Send a message and charge it to the budget.
    ///
    /// Errors are preceded by the innermost breadcrumb, if any, at
    /// [`Level::Content`].
    pub fn send(
        &mut self,
        level: Level,
        text: &str,
        line: u32,
        origin: Option<&str>,
    ) -> Result<(), Aborted> {
        if level.is_error()
            && let Some(context) = self.crumbs.output_subset(1).pop()
        {
            self.deliver(Level::Content, &context, line, None);
        }
        self.deliver(level, text, line, origin);
        self.report.highest = self.report.highest.max(level);
        self.last = Some(text.to_owned());

        if level.is_error() {
            self.report.errors += 1;
            if self.report.errors >= self.max_errors {
                log::debug!("error budget of {} exhausted", self.max_errors);
                return Err(Aborted {
                    errors: self.report.errors,
                });
            }
        }
        Ok(())
    }

    fn send_entry(&mut self, entry: Entry) -> Result<(), Aborted> {
        let Entry { message, line } = entry;
        self.send(message.level, message.text, line, message.origin)
    }

    /// Hand a message to the sink without touching the budget.
    fn deliver(&mut self, level: Level, text: &str, line: u32, origin: Option<&str>) {
        let Some(sink) = self.sink.as_deref_mut() else {
            return;
        };
        let keep = match origin {
            Some(file) => sink.give_message_in_file(level, text, file, line),
            None => sink.give_message_at_line(level, text, line),
        };
        if !keep {
            log::warn!("message sink detached after {:?}", text);
            self.sink = None;
        }
    }

    /// Send the closing pair of messages for an exhausted budget.
    ///
    /// The second message restates the last error unless `restatement`
    /// overrides it. Neither message is charged to the budget.
    pub fn announce_abort(&mut self, restatement: Option<&str>) {
        let last = self.last.take().unwrap_or_default();
        let restatement = restatement.unwrap_or(last.as_str()).to_owned();
        self.deliver(
            Level::Fatal,
            "Too many errors found. Stopping parsing.",
            0,
            None,
        );
        self.deliver(Level::Fatal, &restatement, 0, None);
        self.report.highest = self.report.highest.max(Level::Fatal);
    }

    /// Send everything abandoned by the attempts that led to a root failure.
    pub fn flush_abandoned(&mut self) -> Result<(), Aborted> {
        let abandoned = std::mem::take(&mut self.stack.abandoned);
        for entry in abandoned.into_iter().filter(|a| !a.claimed) {
            self.send_entry(entry.entry)?;
        }
        Ok(())
    }

    /// Empty both stacks, returning how many entries were still pending.
    pub fn drain(&mut self) -> usize {
        let pending = self.stack.depth();
        self.stack.clear();
        self.crumbs.clear();
        pending
    }

    pub(crate) fn mark(&self) -> DiagnosticMark {
        DiagnosticMark {
            depth: self.stack.entries.len(),
            abandoned: self.stack.abandoned.len(),
            crumbs: self.crumbs.depth(),
        }
    }

    /// Undo the stack growth of an attempt that started at `at` and failed.
    pub(crate) fn rewind(&mut self, mark: DiagnosticMark, at: usize) {
        if self.stack.entries.len() > mark.depth {
            let failed: Vec<Abandoned> = self
                .stack
                .entries
                .drain(mark.depth..)
                .enumerate()
                .map(|(offset, entry)| Abandoned {
                    entry,
                    height: mark.depth + offset,
                    at,
                    claimed: false,
                })
                .rev()
                .collect();
            self.stack.abandoned.extend(failed);
        }
        self.crumbs.truncate(mark.crumbs);
    }

    /// Forget failures that an enclosing success recovered from.
    pub(crate) fn settle(&mut self, mark: DiagnosticMark) {
        self.stack.abandoned.truncate(mark.abandoned);
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    /// Sink that records every message as `"Level: text"`.
    #[derive(Default)]
    pub(crate) struct RecordingSink {
        pub messages: Vec<String>,
        pub accept: Option<usize>,
    }

    impl MessageSink for RecordingSink {
        fn give_message(&mut self, level: Level, text: &str) -> bool {
            self.messages.push(format!("{level}: {text}"));
            self.accept.is_none_or(|limit| self.messages.len() < limit)
        }
    }

    fn with_diagnostics<R>(max: usize, f: impl FnOnce(&mut Diagnostics<'_>) -> R) -> (R, Vec<String>) {
        let mut stack = DiagnosticStack::new();
        let mut crumbs = BreadcrumbStack::new();
        let mut sink = RecordingSink::default();
        let result = {
            let mut diagnostics =
                Diagnostics::new(&mut stack, &mut crumbs, &mut sink, LineIndex::new(b"x"), max);
            f(&mut diagnostics)
        };
        (result, sink.messages)
    }

    const SPAN: &[u8] = b"x";

    #[test]
    fn level_ordering_and_names() {
        assert!(Level::Content < Level::Minor);
        assert!(Level::Major.is_error());
        assert!(!Level::Warn.is_error());
        assert_eq!(Level::Except.name(), "Except");
    }

    #[test]
    fn prepare_replaces_pending_message() {
        let ((), messages) = with_diagnostics(100, |d| {
            let span = Span::whole(SPAN);
            d.apply(&Effect::Push(Message::minor("vague")), span).unwrap();
            d.apply(&Effect::Prepare(Message::minor("specific")), span)
                .unwrap();
            d.apply(&Effect::Pop, span).unwrap();
            assert_eq!(d.depth(), 0);
        });
        assert_eq!(messages, vec!["Minor: specific".to_string()]);
    }

    #[test]
    fn cancel_discards_silently() {
        let ((), messages) = with_diagnostics(100, |d| {
            let span = Span::whole(SPAN);
            d.apply(&Effect::Push(Message::major("never sent")), span)
                .unwrap();
            d.apply(&Effect::Cancel, span).unwrap();
            assert_eq!(d.depth(), 0);
        });
        assert!(messages.is_empty());
    }

    #[test]
    fn budget_trips_at_maximum() {
        let (result, messages) = with_diagnostics(4, |d| {
            let span = Span::whole(SPAN);
            let send = Effect::SendNow(Message::minor("bad"));
            for _ in 0..3 {
                d.apply(&send, span)?;
            }
            d.apply(&send, span)
        });
        assert_eq!(result, Err(Aborted { errors: 4 }));
        assert_eq!(messages.len(), 4);
    }

    #[test]
    fn warnings_are_not_charged() {
        let (report, _) = with_diagnostics(4, |d| {
            for _ in 0..10 {
                d.send(Level::Warn, "just a warning", 1, None).unwrap();
            }
            d.report()
        });
        assert_eq!(report.errors, 0);
        assert_eq!(report.highest, Level::Warn);
    }

    #[test]
    fn announce_abort_restates_last_message() {
        let ((), messages) = with_diagnostics(100, |d| {
            d.send(Level::Major, "last problem", 1, None).unwrap();
            d.announce_abort(None);
        });
        assert_eq!(
            messages,
            vec![
                "Major: last problem".to_string(),
                "Fatal: Too many errors found. Stopping parsing.".to_string(),
                "Fatal: last problem".to_string(),
            ]
        );
    }

    #[test]
    fn errors_carry_breadcrumb_context() {
        let source = b"name";
        let ((), messages) = with_diagnostics(100, |d| {
            let span = Span::whole(source);
            d.apply(&Effect::EnterScope("config"), span).unwrap();
            d.send(Level::Minor, "broken", 1, None).unwrap();
            d.send(Level::Info, "no context for info", 1, None).unwrap();
        });
        assert_eq!(
            messages,
            vec![
                "Content: Inside config section for name on line 1 at char 1.".to_string(),
                "Minor: broken".to_string(),
                "Info: no context for info".to_string(),
            ]
        );
    }

    #[test]
    fn sink_detaches_when_it_declines() {
        let mut stack = DiagnosticStack::new();
        let mut crumbs = BreadcrumbStack::new();
        let mut sink = RecordingSink {
            accept: Some(1),
            ..Default::default()
        };
        {
            let mut d = Diagnostics::new(&mut stack, &mut crumbs, &mut sink, LineIndex::new(b""), 100);
            d.send(Level::Minor, "first", 1, None).unwrap();
            assert!(d.is_detached());
            d.send(Level::Minor, "second", 1, None).unwrap();
            assert_eq!(d.report().errors, 2);
        }
        assert_eq!(sink.messages, vec!["Minor: first".to_string()]);
    }

    #[test]
    fn rewind_abandons_and_settle_forgets() {
        let ((), messages) = with_diagnostics(100, |d| {
            let span = Span::whole(SPAN);
            let mark = d.mark();
            d.apply(&Effect::Push(Message::minor("outer")), span).unwrap();
            d.apply(&Effect::Push(Message::minor("inner")), span).unwrap();
            d.rewind(mark, 0);
            assert_eq!(d.depth(), 0);
            d.flush_abandoned().unwrap();

            d.apply(&Effect::Push(Message::minor("recovered")), span)
                .unwrap();
            d.rewind(mark, 0);
            d.settle(mark);
            d.flush_abandoned().unwrap();
        });
        assert_eq!(
            messages,
            vec!["Minor: inner".to_string(), "Minor: outer".to_string()]
        );
    }

    #[test]
    fn pop_abandoned_claims_entry_left_at_its_own_position() {
        let source = b"k='v";
        let ((), messages) = with_diagnostics(100, |d| {
            d.apply(&Effect::Push(Message::minor("parent")), Span::new(source, 0, 1))
                .unwrap();
            let mark = d.mark();
            d.apply(&Effect::Push(Message::minor("sibling")), Span::new(source, 2, 3))
                .unwrap();
            d.rewind(mark, 2);

            d.apply(&Effect::PopAbandoned, Span::new(source, 2, 4)).unwrap();
            assert_eq!(d.depth(), 1);
            d.apply(&Effect::Cancel, Span::new(source, 0, 4)).unwrap();
            d.flush_abandoned().unwrap();
        });
        assert_eq!(messages, vec!["Minor: sibling".to_string()]);
    }

    #[test]
    fn pop_abandoned_ignores_entries_left_elsewhere() {
        let source = b"k='v";
        let ((), messages) = with_diagnostics(100, |d| {
            d.apply(&Effect::Push(Message::minor("parent")), Span::new(source, 0, 1))
                .unwrap();
            let mark = d.mark();
            d.apply(&Effect::Push(Message::minor("nested")), Span::new(source, 2, 3))
                .unwrap();
            d.rewind(mark, 2);

            d.apply(&Effect::PopAbandoned, Span::new(source, 1, 4)).unwrap();
            assert_eq!(d.depth(), 1);
        });
        assert!(messages.is_empty());
    }

    #[test]
    #[should_panic(expected = "cancel with no pending diagnostic")]
    fn cancel_on_empty_stack_is_a_grammar_bug() {
        with_diagnostics(100, |d| {
            let _ = d.apply(&Effect::Cancel, Span::whole(SPAN));
        });
    }

    #[test]
    #[should_panic(expected = "prepare with no pending diagnostic")]
    fn prepare_on_empty_stack_is_a_grammar_bug() {
        with_diagnostics(100, |d| {
            let _ = d.apply(&Effect::Prepare(Message::minor("orphan")), Span::whole(SPAN));
        });
    }
}
