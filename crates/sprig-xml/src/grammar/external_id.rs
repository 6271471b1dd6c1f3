//! Public-id literals and external identifiers:
//!
//! ```text
//! SYSTEM 'system-literal'
//! PUBLIC 'public-id' 'system-literal'
//! ```

use std::cell::Cell;

use sprig_syntax::{CharSet, Journal, Rule};

use super::{Delivery, Node, journal_valid, major, minor, node_valid};
use crate::action::{Quote, XmlAction};
use crate::chars::{pubid_char, quote, skip_to_nul, skip_to_quote, spaces};
use crate::receivers::{ExternalIdReceiver, PublicIdReceiver};

pub struct PublicIdGrammar {
    rule: Rule<XmlAction>,
    valid: Cell<bool>,
}

impl PublicIdGrammar {
    pub fn new() -> Self {
        let quoted = |q: Quote| {
            let (opened, unclosed, skipped) = match q {
                Quote::Single => (
                    major("Found starting single quote but no content for public identifier literal."),
                    major("Did not find ending single-quote for public identifier literal."),
                    major("Unable to parse single-quoted public identifier literal - skipping rest of content."),
                ),
                Quote::Double => (
                    major("Found starting double quote but no content for public identifier literal."),
                    major("Did not find ending double-quote for public identifier literal."),
                    major("Unable to parse double-quoted public identifier literal - skipping rest of content."),
                ),
            };
            let literal = Rule::set(pubid_char().minus(CharSet::from_bytes(&[q.byte()])))
                .repeat()
                .action(XmlAction::PublicIdLiteral(q))
                .prepare(unclosed);
            let skip = skip_to_quote(q)
                .action(XmlAction::Invalid)
                .pop()
                .send_now(skipped);
            quote(q)
                .push(opened)
                .then(literal.then(quote(q).cancel()).or(skip))
        };

        Self {
            rule: quoted(Quote::Single).or(quoted(Quote::Double)),
            valid: Cell::new(false),
        }
    }

    pub fn rule(&self) -> &Rule<XmlAction> {
        &self.rule
    }

    pub fn is_valid(&self) -> bool {
        self.valid.get()
    }

    pub(crate) fn replay<R>(
        &self,
        journal: &Journal<'_, '_, XmlAction>,
        receiver: &mut R,
        out: &mut Delivery,
    ) -> bool
    where
        R: PublicIdReceiver + ?Sized,
    {
        for node in journal.nodes() {
            deliver_public_id(&node, receiver, out);
        }
        let valid = journal_valid(journal);
        self.valid.set(valid);
        valid
    }
}

impl Default for PublicIdGrammar {
    fn default() -> Self {
        Self::new()
    }
}

fn deliver_public_id<R>(node: &Node<'_, '_>, receiver: &mut R, out: &mut Delivery) -> bool
where
    R: PublicIdReceiver + ?Sized,
{
    let XmlAction::PublicIdLiteral(q) = *node.action() else {
        return false;
    };
    out.call("set_public_id_literal", || {
        receiver.set_public_id_literal(node.span(), q.is_single())
    });
    true
}

pub struct ExternalIdGrammar {
    rule: Rule<XmlAction>,
    valid: Cell<bool>,
}

impl ExternalIdGrammar {
    /// `public_id` is the shared public-id literal rule.
    pub fn new(public_id: &Rule<XmlAction>) -> Self {
        let system_literal = |q: Quote| {
            let (opened, unclosed, skipped) = match q {
                Quote::Single => (
                    major("Found starting single quote but no content for system literal."),
                    major("Did not find ending single-quote for system literal."),
                    major("Unable to parse single-quoted system literal - skipping rest of content."),
                ),
                Quote::Double => (
                    major("Found starting double quote but no content for system literal."),
                    major("Did not find ending double-quote for system literal."),
                    major("Unable to parse double-quoted system literal - skipping rest of content."),
                ),
            };
            let literal = Rule::none_of(CharSet::from_bytes(&[q.byte()]))
                .repeat()
                .action(XmlAction::SystemLiteral(q))
                .prepare(unclosed);
            let skip = skip_to_quote(q)
                .action(XmlAction::Invalid)
                .pop()
                .send_now(skipped);
            quote(q)
                .push(opened)
                .then(literal.then(quote(q).cancel()).or(skip))
        };

        let separator = spaces().prepare(minor("Expected to find quoted public-id or system literal."));
        let public = Rule::seq([
            Rule::literal("PUBLIC").push(minor("Found start of public literal, but no contents.")),
            separator.clone(),
            public_id
                .clone()
                .prepare(minor("Expected to find white space between public ID and system literals.")),
        ]);
        let system = Rule::literal("SYSTEM").push(minor("Found start of system literal, but no contents."));
        let literal = separator
            .then(system_literal(Quote::Single).or(system_literal(Quote::Double)).cancel());
        let skip = skip_to_nul()
            .action(XmlAction::Invalid)
            .send_now(major("Unable to parse external ID reference."))
            .pop();

        Self {
            rule: public
                .or(system)
                .then(literal.or(skip))
                .action(XmlAction::ExternalId),
            valid: Cell::new(false),
        }
    }

    pub fn rule(&self) -> &Rule<XmlAction> {
        &self.rule
    }

    pub fn is_valid(&self) -> bool {
        self.valid.get()
    }

    pub(crate) fn replay<R>(
        &self,
        journal: &Journal<'_, '_, XmlAction>,
        receiver: &mut R,
        out: &mut Delivery,
    ) -> bool
    where
        R: ExternalIdReceiver + ?Sized,
    {
        for node in journal.nodes() {
            if !matches!(node.action(), XmlAction::ExternalId) {
                continue;
            }
            for child in node.children() {
                if let XmlAction::SystemLiteral(q) = *child.action() {
                    out.call("set_system_literal", || {
                        receiver.set_system_literal(child.span(), q.is_single())
                    });
                } else {
                    deliver_public_id(&child, receiver, out);
                }
            }
            let valid = node_valid(&node);
            out.call("done_external_id", || receiver.done_external_id(valid, node.span()));
        }
        let valid = journal_valid(journal);
        self.valid.set(valid);
        valid
    }
}

#[cfg(test)]
mod tests {
    use super::super::testing::{Recorder, Transcript};
    use crate::XmlParser;
    use insta::assert_snapshot;
    use pretty_assertions::assert_eq;
    use rstest::rstest;
    use sprig_syntax::ParseResult;

    #[rstest]
    #[case::single("'abc'", ParseResult::AllValid)]
    #[case::double("\"abc\"", ParseResult::AllValid)]
    #[case::empty_single("''", ParseResult::AllValid)]
    #[case::empty_double("\"\"", ParseResult::AllValid)]
    #[case::mixed_quotes("\"abc'", ParseResult::NotParsed)]
    #[case::unclosed_double("\"abc ", ParseResult::NotParsed)]
    #[case::unclosed_single("'abc ", ParseResult::NotParsed)]
    #[case::leading_space(" 'abc'", ParseResult::NotParsed)]
    #[case::unopened("abc'", ParseResult::NotParsed)]
    #[case::empty("", ParseResult::EmptyData)]
    fn parses_public_ids(#[case] input: &str, #[case] expected: ParseResult) {
        let parser = XmlParser::new();
        let result = parser.parse_public_id(input.as_bytes(), &mut Recorder::default(), &mut Transcript::default());
        assert_eq!(result, expected);
    }

    #[test]
    fn bad_public_id_character_is_skipped_but_invalid() {
        let parser = XmlParser::new();
        let mut recorder = Recorder::default();
        let mut sink = Transcript::default();
        let result = parser.parse_public_id(b"'a{b'", &mut recorder, &mut sink);
        assert_eq!(result, ParseResult::NotValid);
        assert!(recorder.calls.is_empty());
        assert!(!parser.public_id_grammar().is_valid());
        assert_eq!(
            sink.lines,
            vec![
                "xml:1| Major: Did not find ending single-quote for public identifier literal.",
                "xml:1| Major: Unable to parse single-quoted public identifier literal - skipping rest of content.",
            ]
        );
    }

    #[rstest]
    #[case::system_single("SYSTEM 'abc'", ParseResult::AllValid)]
    #[case::system_tab_double("SYSTEM\t\"abc\"", ParseResult::AllValid)]
    #[case::system_empty("SYSTEM\n\r''", ParseResult::AllValid)]
    #[case::public("PUBLIC 'abc' 'def'", ParseResult::AllValid)]
    #[case::public_tab("PUBLIC\t\"abc\" 'def'", ParseResult::AllValid)]
    #[case::public_wide("PUBLIC  'abc'  'def'", ParseResult::AllValid)]
    #[case::system_mixed("SYSTEM \"abc'", ParseResult::NotParsed)]
    #[case::system_unclosed("SYSTEM 'abc", ParseResult::NotParsed)]
    #[case::system_unopened("SYSTEM abc'", ParseResult::NotParsed)]
    #[case::public_mixed("PUBLIC \"abc' 'def'", ParseResult::NotParsed)]
    #[case::public_unclosed("PUBLIC 'abc 'def'", ParseResult::NotParsed)]
    #[case::system_no_space("SYSTEM'abc'", ParseResult::NotParsed)]
    #[case::system_only("SYSTEM   ", ParseResult::NotParsed)]
    #[case::public_only("PUBLIC 'abc'", ParseResult::NotParsed)]
    #[case::public_then_space("PUBLIC  'abc' ", ParseResult::NotParsed)]
    #[case::empty("", ParseResult::EmptyData)]
    fn parses_external_ids(#[case] input: &str, #[case] expected: ParseResult) {
        let parser = XmlParser::new();
        let result = parser.parse_external_id(input.as_bytes(), &mut Recorder::default(), &mut Transcript::default());
        assert_eq!(result, expected);
    }

    #[test]
    fn snapshot_public_external_id() {
        let parser = XmlParser::new();
        let mut recorder = Recorder::default();
        parser.parse_external_id(b"PUBLIC \"abc\" 'def'", &mut recorder, &mut Transcript::default());
        assert_snapshot!(recorder.log_text(), @r#"
        set_public_id_literal(abc, false)
        set_system_literal(def, true)
        done_external_id(true, PUBLIC "abc" 'def')
        "#);
    }

    #[test]
    fn system_literal_may_hold_any_byte() {
        let parser = XmlParser::new();
        let mut recorder = Recorder::default();
        let result = parser.parse_external_id(b"SYSTEM \"a{b}'\"", &mut recorder, &mut Transcript::default());
        assert_eq!(result, ParseResult::AllValid);
        assert_eq!(recorder.calls[0], "set_system_literal(a{b}', false)");
    }
}
