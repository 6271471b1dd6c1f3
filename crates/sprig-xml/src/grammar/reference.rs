//! References: `&name;`, `&#123;` and `&#x1F;`.
//!
//! The receiver gets the payload only: the entity name, or the digits
//! without their `#` or `#x` prefix.

use std::cell::Cell;

use sprig_syntax::{CharSet, Journal, Rule};

use super::{Delivery, Node, journal_valid, minor};
use crate::action::{RefType, XmlAction};
use crate::chars::{hex_digit, skip_to_nul};
use crate::receivers::ReferenceReceiver;

pub struct ReferenceGrammar {
    rule: Rule<XmlAction>,
    valid: Cell<bool>,
}

impl ReferenceGrammar {
    /// `name` is the shared name token.
    pub fn new(name: &Rule<XmlAction>) -> Self {
        let start = Rule::byte(b'&').push(minor("Found start of reference, but not rest of its content."));

        let hex = Rule::literal("#x")
            .prepare(minor("Found '&#x' for start of hexdigit reference, but no hexdigits."))
            .then(
                Rule::set(hex_digit())
                    .repeat1()
                    .action(XmlAction::Reference(RefType::HexDigits))
                    .prepare(minor("Found numbers for hexdigit reference but no ending semicolon.")),
            );
        let digits = Rule::byte(b'#')
            .prepare(minor("Found '&#' for start of digit reference, but no digits."))
            .then(
                Rule::set(CharSet::digit())
                    .repeat1()
                    .action(XmlAction::Reference(RefType::Digits))
                    .prepare(minor("Found numbers for digits reference but no ending semicolon.")),
            );
        let entity = name
            .clone()
            .action(XmlAction::Reference(RefType::Entity))
            .prepare(minor("Found name for entity reference but no ending semicolon."));

        let reference = Rule::choice([hex, digits, entity]).then(Rule::byte(b';').cancel());
        let skip = skip_to_nul()
            .action(XmlAction::Invalid)
            .pop()
            .send_now(minor("Unable to parse reference - skipping rest of content."));

        Self {
            rule: start.then(reference.or(skip)),
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
        R: ReferenceReceiver + ?Sized,
    {
        for node in journal.nodes() {
            deliver(&node, receiver, out);
        }
        let valid = journal_valid(journal);
        self.valid.set(valid);
        valid
    }
}

/// Send a journaled reference to `receiver`. Returns whether `node` was one.
pub(crate) fn deliver<R>(node: &Node<'_, '_>, receiver: &mut R, out: &mut Delivery) -> bool
where
    R: ReferenceReceiver + ?Sized,
{
    let XmlAction::Reference(ref_type) = *node.action() else {
        return false;
    };
    out.call("set_reference", || receiver.set_reference(ref_type, node.span()));
    true
}

#[cfg(test)]
mod tests {
    use super::super::testing::{Recorder, Transcript};
    use crate::XmlParser;
    use pretty_assertions::assert_eq;
    use rstest::rstest;
    use sprig_syntax::ParseResult;

    #[rstest]
    #[case::entity("&abc;", ParseResult::AllValid)]
    #[case::digits("&#000;", ParseResult::AllValid)]
    #[case::hex_zero("&#x00;", ParseResult::AllValid)]
    #[case::hex_lower("&#xab;", ParseResult::AllValid)]
    #[case::hex_upper("&#xAB;", ParseResult::AllValid)]
    #[case::hex_mixed("&#xF0;", ParseResult::AllValid)]
    #[case::digits_without_hash("&000;", ParseResult::NotParsed)]
    #[case::letters_after_hash("&#abc;", ParseResult::NotParsed)]
    #[case::bad_hex_digit("&#xFz;", ParseResult::NotParsed)]
    #[case::no_payload("&;", ParseResult::NotParsed)]
    #[case::space_before_name("& abc;", ParseResult::NotParsed)]
    #[case::leading_space(" &abc;", ParseResult::NotParsed)]
    #[case::space_before_semicolon("&abc ;", ParseResult::NotParsed)]
    #[case::space_in_name("&ab c;", ParseResult::NotParsed)]
    #[case::no_semicolon("&abc", ParseResult::NotParsed)]
    #[case::space_after_hash("&# 000;", ParseResult::NotParsed)]
    #[case::space_after_digits("&#000 ;", ParseResult::NotParsed)]
    #[case::space_before_hash("& #000;", ParseResult::NotParsed)]
    #[case::empty("", ParseResult::EmptyData)]
    fn parses_references(#[case] input: &str, #[case] expected: ParseResult) {
        let parser = XmlParser::new();
        let result = parser.parse_reference(input.as_bytes(), &mut Recorder::default(), &mut Transcript::default());
        assert_eq!(result, expected);
    }

    #[rstest]
    #[case::entity("&abc;", "set_reference(entity, abc)")]
    #[case::digits("&#042;", "set_reference(digits, 042)")]
    #[case::hex("&#xF0;", "set_reference(hexdigits, F0)")]
    fn payload_excludes_markup(#[case] input: &str, #[case] expected: &str) {
        let parser = XmlParser::new();
        let mut recorder = Recorder::default();
        parser.parse_reference(input.as_bytes(), &mut recorder, &mut Transcript::default());
        assert_eq!(recorder.calls, vec![expected]);
    }

    #[rstest]
    #[case::no_name(b"&1;\0".as_slice(), "Found start of reference, but not rest of its content.")]
    #[case::entity(b"&abc\0".as_slice(), "Found name for entity reference but no ending semicolon.")]
    #[case::digits(b"&#12\0".as_slice(), "Found numbers for digits reference but no ending semicolon.")]
    #[case::hex(b"&#xF0\0".as_slice(), "Found numbers for hexdigit reference but no ending semicolon.")]
    fn malformed_reference_skips_to_nul(#[case] input: &[u8], #[case] pending: &str) {
        let parser = XmlParser::new();
        let mut sink = Transcript::default();
        let mut recorder = Recorder::default();
        let result = parser.parse_reference(input, &mut recorder, &mut sink);
        assert_eq!(result, ParseResult::NotValid);
        assert!(recorder.calls.is_empty());
        assert_eq!(
            sink.lines,
            vec![
                format!("xml:1| Minor: {pending}"),
                "xml:1| Minor: Unable to parse reference - skipping rest of content.".to_owned(),
            ]
        );
        assert_eq!(parser.driver().diagnostic_depth(), 0);
    }

    #[test]
    fn abandoned_attempt_is_reported_before_the_fatal() {
        let parser = XmlParser::new();
        let mut sink = Transcript::default();
        let result = parser.parse_reference(b"&abc", &mut Recorder::default(), &mut sink);
        assert_eq!(result, ParseResult::NotParsed);
        assert_eq!(
            sink.lines,
            vec![
                "xml:1| Minor: Found name for entity reference but no ending semicolon.",
                "0| Fatal: Unable to finish parsing data.",
            ]
        );
    }
}
