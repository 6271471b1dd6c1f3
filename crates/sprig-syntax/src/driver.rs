//! # Driver - One Parse, Start to Finish
//!
//! [`Driver::parse`] owns everything around a match:
//!
//! 1. validate the requested range;
//! 2. refuse to start if this driver is already parsing;
//! 3. run the root rule through a [`Matcher`];
//! 4. report abandoned diagnostics if the root rule failed, or hand the
//!    committed journal to the grammar's replay function if it matched;
//! 5. classify the outcome and leave both stacks empty.
//!
//! The driver knows nothing about any grammar. It is generic over the
//! action type and takes the replay step as a closure returning whether the
//! replayed content was valid.

use std::cell::RefCell;
use std::fmt;

use crate::breadcrumbs::BreadcrumbStack;
use crate::diagnostics::{DiagnosticStack, Diagnostics, Level, MessageSink, Report};
use crate::input::LineIndex;
use crate::parser::Matcher;
use crate::parser::replay::Journal;
use crate::rule::Rule;

/// Error budget used unless a grammar asks for another.
pub const DEFAULT_MAX_ERRORS: usize = 100;

/// Smallest error budget a driver accepts.
pub const MIN_MAX_ERRORS: usize = 4;

/// Outcome of a parse request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParseResult {
    /// All input was consumed and the content is valid.
    AllValid,
    /// A valid prefix matched; trailing input was not recognized.
    SomeValid,
    /// The input matched but its content failed validation.
    NotValid,
    /// The root rule did not match.
    NotParsed,
    /// No receiver was supplied. The typed API makes this unreachable;
    /// it remains part of the result vocabulary.
    NoReceiver,
    /// The range starts past the end of the buffer.
    NoStart,
    /// The range is empty.
    EmptyData,
    /// The range ends past the end of the buffer.
    NoEnd,
    /// The range ends before it starts.
    EndTooLow,
    /// The error budget was exhausted.
    Aborted,
    /// The driver was already busy with another parse.
    ParsingNow,
    /// A receiver reported an error.
    Receiving,
    /// No message sink was supplied. Unreachable through the typed API.
    NoMessageSink,
    NoFileName,
    CantOpenFile,
    EmptyFile,
    EndOfFile,
}

impl ParseResult {
    pub fn name(self) -> &'static str {
        match self {
            ParseResult::AllValid => "All data was parsed and valid.",
            ParseResult::SomeValid => "Start is valid, but ending part was not recognized.",
            ParseResult::NotValid => "Data was parsed, but is not valid.",
            ParseResult::NotParsed => "Data was not recognized by parsing rules.",
            ParseResult::NoReceiver => "No content receiver provided.",
            ParseResult::NoStart => "Starting place is beyond the data.",
            ParseResult::EmptyData => "No content at starting place.",
            ParseResult::NoEnd => "Ending place is beyond the data.",
            ParseResult::EndTooLow => "Ending place less than starting place.",
            ParseResult::Aborted => "Too many errors found.",
            ParseResult::ParsingNow => "Parser is currently parsing other data.",
            ParseResult::Receiving => "Receiver reported an error.",
            ParseResult::NoMessageSink => "No message sink provided.",
            ParseResult::NoFileName => "No file name provided for parsing.",
            ParseResult::CantOpenFile => "Could not open file.",
            ParseResult::EmptyFile => "File has no contents.",
            ParseResult::EndOfFile => "Reached end of file, but can't parse content.",
        }
    }

    /// AllValid or SomeValid.
    pub fn is_good(self) -> bool {
        matches!(self, ParseResult::AllValid | ParseResult::SomeValid)
    }

    /// Whether matching actually ran, as opposed to a refused request.
    pub fn implies_attempt(self) -> bool {
        matches!(
            self,
            ParseResult::AllValid
                | ParseResult::SomeValid
                | ParseResult::NotValid
                | ParseResult::NotParsed
        )
    }
}

impl fmt::Display for ParseResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Default)]
struct DriverState {
    stack: DiagnosticStack,
    crumbs: BreadcrumbStack,
    last_report: Report,
}

/// Resets the driver's stacks however the parse ends, including a panicking
/// receiver.
struct Session<'d> {
    state: std::cell::RefMut<'d, DriverState>,
}

impl Drop for Session<'_> {
    fn drop(&mut self) {
        self.state.stack.clear();
        self.state.crumbs.clear();
    }
}

/// Runs root rules over caller-supplied ranges.
///
/// Stateful and not reentrant: a parse started from inside a receiver or
/// sink callback of the same driver gets [`ParseResult::ParsingNow`].
#[derive(Debug)]
pub struct Driver {
    state: RefCell<DriverState>,
    max_errors: usize,
    abort_restatement: Option<&'static str>,
}

impl Default for Driver {
    fn default() -> Self {
        Self::new()
    }
}

impl Driver {
    pub fn new() -> Self {
        Self {
            state: RefCell::new(DriverState::default()),
            max_errors: DEFAULT_MAX_ERRORS,
            abort_restatement: None,
        }
    }

    /// Set the error budget. Values below [`MIN_MAX_ERRORS`] are raised to it.
    pub fn with_max_errors(mut self, max_errors: usize) -> Self {
        self.set_max_errors(max_errors);
        self
    }

    /// Replace the restated last message sent after an abort.
    pub fn with_abort_restatement(mut self, text: &'static str) -> Self {
        self.abort_restatement = Some(text);
        self
    }

    pub fn set_max_errors(&mut self, max_errors: usize) {
        self.max_errors = max_errors.max(MIN_MAX_ERRORS);
    }

    pub fn max_errors(&self) -> usize {
        self.max_errors
    }

    pub fn is_parsing(&self) -> bool {
        self.state.try_borrow_mut().is_err()
    }

    /// Pending diagnostic entries. Zero whenever no parse is running.
    pub fn diagnostic_depth(&self) -> usize {
        self.state.try_borrow().map_or(0, |state| state.stack.depth())
    }

    /// Open breadcrumb scopes. Zero whenever no parse is running.
    pub fn breadcrumb_depth(&self) -> usize {
        self.state.try_borrow().map_or(0, |state| state.crumbs.depth())
    }

    /// Error count and highest severity of the last finished parse.
    pub fn last_report(&self) -> Report {
        self.state
            .try_borrow()
            .map_or_else(|_| Report::default(), |state| state.last_report)
    }

    /// Match `rule` over `source[start..end]` and replay the result.
    ///
    /// `replay` runs only when the root rule matched and the budget held. It
    /// returns whether the replayed content was valid.
    pub fn parse<A, F>(
        &self,
        source: &[u8],
        start: usize,
        end: usize,
        rule: &Rule<A>,
        sink: &mut dyn MessageSink,
        replay: F,
    ) -> ParseResult
    where
        A: Clone,
        F: FnOnce(&Journal<'_, '_, A>) -> bool,
    {
        let Ok(state) = self.state.try_borrow_mut() else {
            return ParseResult::ParsingNow;
        };
        if let Some(refused) = check_range(source.len(), start, end) {
            return refused;
        }
        let mut session = Session { state };
        let DriverState {
            stack,
            crumbs,
            last_report,
        } = &mut *session.state;
        stack.clear();
        crumbs.clear();

        log::debug!("parsing {} bytes at {start}..{end}", end - start);
        let diagnostics = Diagnostics::new(
            stack,
            crumbs,
            sink,
            LineIndex::new(&source[..end]),
            self.max_errors,
        );
        let mut matcher = Matcher::new(source, end, diagnostics);

        let (result, report) = match matcher.run(rule, start) {
            Err(aborted) => {
                log::debug!("parse aborted: {aborted}");
                let diagnostics = matcher.diagnostics_mut();
                diagnostics.announce_abort(self.abort_restatement);
                (ParseResult::Aborted, diagnostics.report())
            }
            Ok(None) => {
                let diagnostics = matcher.diagnostics_mut();
                let reported = diagnostics.flush_abandoned().and_then(|()| {
                    diagnostics.send(Level::Fatal, "Unable to finish parsing data.", 0, None)
                });
                let result = match reported {
                    Ok(()) => ParseResult::NotParsed,
                    Err(_) => {
                        diagnostics.announce_abort(self.abort_restatement);
                        ParseResult::Aborted
                    }
                };
                (result, diagnostics.report())
            }
            Ok(Some(stop)) => {
                let (events, mut diagnostics) = matcher.finish();
                let pending = diagnostics.drain();
                if pending > 0 {
                    log::error!("{pending} diagnostics still pending after a committed match");
                    debug_assert_eq!(pending, 0, "unbalanced diagnostic stack");
                }
                let report = diagnostics.report();
                drop(diagnostics);

                let journal = Journal::new(source, &events);
                let valid = replay(&journal);
                (classify(valid, stop == end), report)
            }
        };

        *last_report = report;
        log::debug!("parse finished: {result:?}, {} errors", report.errors);
        result
    }
}

fn check_range(len: usize, start: usize, end: usize) -> Option<ParseResult> {
    if start > len {
        Some(ParseResult::NoStart)
    } else if end > len {
        Some(ParseResult::NoEnd)
    } else if end < start {
        Some(ParseResult::EndTooLow)
    } else if end == start {
        Some(ParseResult::EmptyData)
    } else {
        None
    }
}

fn classify(valid: bool, ate_all: bool) -> ParseResult {
    match (valid, ate_all) {
        (false, _) => ParseResult::NotValid,
        (true, true) => ParseResult::AllValid,
        (true, false) => ParseResult::SomeValid,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::charset::CharSet;
    use crate::diagnostics::Message;
    use crate::diagnostics::tests::RecordingSink;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    fn accept_all(_: &Journal<'_, '_, &'static str>) -> bool {
        true
    }

    fn word() -> Rule<&'static str> {
        Rule::set(CharSet::alpha()).repeat1().action("word")
    }

    #[rstest]
    #[case::start_past_end(5, 5, ParseResult::NoStart)]
    #[case::end_past_end(0, 9, ParseResult::NoEnd)]
    #[case::end_before_start(3, 1, ParseResult::EndTooLow)]
    #[case::empty_range(2, 2, ParseResult::EmptyData)]
    fn refuses_bad_ranges(#[case] start: usize, #[case] end: usize, #[case] expected: ParseResult) {
        let driver = Driver::new();
        let mut sink = RecordingSink::default();
        let result = driver.parse(b"abcd", start, end, &word(), &mut sink, accept_all);
        assert_eq!(result, expected);
        assert!(!result.implies_attempt());
        assert!(sink.messages.is_empty());
    }

    #[rstest]
    #[case::whole("abc", ParseResult::AllValid)]
    #[case::prefix("abc def", ParseResult::SomeValid)]
    #[case::nothing("123", ParseResult::NotParsed)]
    fn classifies_outcomes(#[case] input: &str, #[case] expected: ParseResult) {
        let driver = Driver::new();
        let mut sink = RecordingSink::default();
        let result = driver.parse(input.as_bytes(), 0, input.len(), &word(), &mut sink, accept_all);
        assert_eq!(result, expected);
    }

    #[test]
    fn replay_decides_validity() {
        let driver = Driver::new();
        let mut sink = RecordingSink::default();
        let mut seen = Vec::new();
        let result = driver.parse(b"abc", 0, 3, &word(), &mut sink, |journal| {
            seen.extend(journal.nodes().map(|n| n.span().text().into_owned()));
            false
        });
        assert_eq!(result, ParseResult::NotValid);
        assert_eq!(seen, vec!["abc".to_string()]);
    }

    #[test]
    fn root_failure_reports_abandoned_then_fatal() {
        let rule: Rule<&str> = Rule::literal("<")
            .push(Message::minor("Found '<' but no name."))
            .then(word())
            .then(Rule::literal(">").cancel());
        let driver = Driver::new();
        let mut sink = RecordingSink::default();
        let result = driver.parse(b"<1>", 0, 3, &rule, &mut sink, accept_all);
        assert_eq!(result, ParseResult::NotParsed);
        assert_eq!(
            sink.messages,
            vec![
                "Minor: Found '<' but no name.".to_string(),
                "Fatal: Unable to finish parsing data.".to_string(),
            ]
        );
        assert_eq!(driver.last_report().errors, 2);
        assert_eq!(driver.diagnostic_depth(), 0);
    }

    #[test]
    fn exhausted_budget_aborts_and_restates() {
        let rule: Rule<&str> = Rule::byte(b'x').send_now(Message::minor("Stray x.")).repeat();
        let driver = Driver::new().with_max_errors(1);
        assert_eq!(driver.max_errors(), MIN_MAX_ERRORS);

        let mut sink = RecordingSink::default();
        let input = b"xxxxxxxxxx";
        let result = driver.parse(input, 0, input.len(), &rule, &mut sink, accept_all);
        assert_eq!(result, ParseResult::Aborted);
        assert_eq!(sink.messages.len(), MIN_MAX_ERRORS + 2);
        assert_eq!(
            sink.messages[MIN_MAX_ERRORS..],
            [
                "Fatal: Too many errors found. Stopping parsing.".to_string(),
                "Fatal: Stray x.".to_string(),
            ]
        );
    }

    #[test]
    fn abort_restatement_can_be_overridden() {
        let rule: Rule<&str> = Rule::byte(b'x').send_now(Message::minor("Stray x.")).repeat();
        let driver = Driver::new()
            .with_max_errors(4)
            .with_abort_restatement("Unable to continue.");
        let mut sink = RecordingSink::default();
        driver.parse(b"xxxxx", 0, 5, &rule, &mut sink, accept_all);
        assert_eq!(sink.messages.last().map(String::as_str), Some("Fatal: Unable to continue."));
    }

    #[test]
    fn stacks_are_empty_after_every_parse() {
        let rule: Rule<&str> = Rule::literal("[")
            .enter_scope("section")
            .push(Message::minor("Unclosed section."))
            .then(word())
            .then(Rule::literal("]").cancel().leave_scope());
        let driver = Driver::new();
        for input in ["[abc]", "[abc", "[", "x"] {
            let mut sink = RecordingSink::default();
            driver.parse(input.as_bytes(), 0, input.len(), &rule, &mut sink, accept_all);
            assert_eq!(driver.diagnostic_depth(), 0, "{input}");
            assert_eq!(driver.breadcrumb_depth(), 0, "{input}");
            assert!(!driver.is_parsing());
        }
    }

    struct ReentrantSink<'d> {
        driver: &'d Driver,
        nested: Vec<ParseResult>,
    }

    impl MessageSink for ReentrantSink<'_> {
        fn give_message(&mut self, _level: Level, _text: &str) -> bool {
            let mut inner = RecordingSink::default();
            let result = self
                .driver
                .parse(b"abc", 0, 3, &word(), &mut inner, accept_all);
            self.nested.push(result);
            true
        }
    }

    #[test]
    fn parse_from_a_callback_is_refused() {
        let driver = Driver::new();
        let mut sink = ReentrantSink {
            driver: &driver,
            nested: Vec::new(),
        };
        let result = driver.parse(b"123", 0, 3, &word(), &mut sink, accept_all);
        assert_eq!(result, ParseResult::NotParsed);
        assert_eq!(sink.nested, vec![ParseResult::ParsingNow]);

        let mut sink = RecordingSink::default();
        assert_eq!(
            driver.parse(b"abc", 0, 3, &word(), &mut sink, accept_all),
            ParseResult::AllValid
        );
    }

    #[test]
    fn result_names() {
        assert_eq!(ParseResult::AllValid.to_string(), "All data was parsed and valid.");
        assert!(ParseResult::SomeValid.is_good());
        assert!(!ParseResult::NotValid.is_good());
        assert!(ParseResult::NotParsed.implies_attempt());
    }
}
