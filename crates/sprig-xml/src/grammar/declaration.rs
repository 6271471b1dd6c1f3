//! Encoding declarations and the XML declaration:
//!
//! ```text
//! encoding = 'UTF-8'
//! <?xml version='1.0' encoding='UTF-8' standalone='yes' ?>
//! ```
//!
//! The XML declaration is valid only if its embedded encoding declaration
//! is; both are judged from the journal after the match.

use std::cell::Cell;

use sprig_syntax::{CharSet, Journal, Rule};

use super::{Delivery, Node, journal_valid, major, minor, node_valid};
use crate::action::{Quote, XmlAction};
use crate::chars::{enc_name_rest, equals, quote, skip_to_nul, skip_to_quote, spaces, version_char};
use crate::receivers::{EncodingDeclReceiver, XmlDeclarationReceiver};

pub struct EncodingDeclGrammar {
    rule: Rule<XmlAction>,
    valid: Cell<bool>,
}

impl EncodingDeclGrammar {
    pub fn new() -> Self {
        let enc_name = Rule::set(CharSet::alpha())
            .then(Rule::set(enc_name_rest()).repeat())
            .action(XmlAction::EncName)
            .prepare(major("Did not find ending quote for encoding."));
        let quoted = |q: Quote| {
            let (opened, skipped) = match q {
                Quote::Single => (
                    major("Found starting single quote but no content for encoding."),
                    major("Unable to parse single-quoted encoding - skipping rest of content."),
                ),
                Quote::Double => (
                    major("Found starting double quote but no content for encoding."),
                    major("Unable to parse double-quoted encoding - skipping rest of content."),
                ),
            };
            let skip = skip_to_quote(q)
                .action(XmlAction::Invalid)
                .pop()
                .send_now(skipped);
            quote(q)
                .action(XmlAction::Quote(q))
                .prepare(opened)
                .then(enc_name.clone().then(quote(q).cancel()).or(skip))
        };

        let value = equals()
            .prepare(major("Did not find name for encoding."))
            .then(quoted(Quote::Double).or(quoted(Quote::Single)));
        let skip = skip_to_nul()
            .action(XmlAction::Invalid)
            .send_now(minor("Encoding has invalid format."))
            .pop();

        Self {
            rule: Rule::literal("encoding")
                .push(minor("Did not find equal sign for encoding."))
                .then(value.or(skip))
                .action(XmlAction::EncodingDecl),
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
        R: EncodingDeclReceiver + ?Sized,
    {
        for node in journal.nodes() {
            deliver_encoding(&node, receiver, out);
        }
        let valid = journal_valid(journal);
        self.valid.set(valid);
        valid
    }
}

impl Default for EncodingDeclGrammar {
    fn default() -> Self {
        Self::new()
    }
}

fn deliver_encoding<R>(node: &Node<'_, '_>, receiver: &mut R, out: &mut Delivery) -> bool
where
    R: EncodingDeclReceiver + ?Sized,
{
    if !matches!(node.action(), XmlAction::EncodingDecl) {
        return false;
    }
    let mut single = false;
    for child in node.children() {
        match *child.action() {
            XmlAction::Quote(q) => single = q.is_single(),
            XmlAction::EncName => out.call("set_enc_name", || receiver.set_enc_name(child.span())),
            _ => {}
        }
    }
    let valid = node_valid(node);
    out.call("done_encoding_decl", || {
        receiver.done_encoding_decl(valid, single, node.span())
    });
    true
}

pub struct XmlDeclarationGrammar {
    rule: Rule<XmlAction>,
    valid: Cell<bool>,
}

impl XmlDeclarationGrammar {
    /// `encoding` is the shared encoding declaration rule.
    pub fn new(encoding: &Rule<XmlAction>) -> Self {
        let version_number = Rule::set(version_char()).repeat1();
        let version_quoted = |q: Quote| {
            let (opened, skipped) = match q {
                Quote::Single => (
                    major("Found starting single quote but no content for version number."),
                    major("Unable to parse single-quoted version number - skipping rest of content."),
                ),
                Quote::Double => (
                    major("Found starting double quote but no content for version number."),
                    major("Unable to parse double-quoted version number - skipping rest of content."),
                ),
            };
            let number = version_number
                .clone()
                .action(XmlAction::VersionNumber(q))
                .prepare(major("Expected ending quote after version number in xml declaration."));
            let skip = skip_to_quote(q)
                .action(XmlAction::Invalid)
                .pop()
                .send_now(skipped);
            quote(q)
                .push(opened)
                .then(number.then(quote(q).cancel()).or(skip))
        };
        let version = Rule::seq([
            spaces()
                .then(Rule::literal("version"))
                .prepare(major("Found version keyword but no equal sign in xml declaration.")),
            Rule::byte(b'=').prepare(major(
                "Expected version number in single or double quotes after equal sign in xml declaration.",
            )),
            version_quoted(Quote::Single).or(version_quoted(Quote::Double)),
        ]);

        let standalone_value = |yes: bool, q: Quote| {
            let word = if yes { "yes" } else { "no" };
            let mark = q.byte() as char;
            Rule::literal(format!("{mark}{word}{mark}")).action(XmlAction::Standalone { yes, quote: q })
        };
        let standalone = Rule::seq([
            spaces()
                .then(Rule::literal("standalone"))
                .prepare(major("Found standalone keyword but no equal sign.")),
            Rule::byte(b'=').prepare(major("Found equal sign for standalone declaration but no value.")),
            Rule::choice([
                standalone_value(true, Quote::Single),
                standalone_value(true, Quote::Double),
                standalone_value(false, Quote::Single),
                standalone_value(false, Quote::Double),
            ]),
        ]);

        let body = Rule::seq([
            version,
            spaces().then(encoding.clone()).optional(),
            standalone.optional(),
            spaces().optional(),
            Rule::literal("?>").cancel(),
        ]);
        let skip = skip_to_nul()
            .action(XmlAction::Invalid)
            .send_now(minor("Unable to parse xml declaration."))
            .pop();

        Self {
            rule: Rule::literal("<?xml")
                .push(major("Found start of XML declaration, but no content."))
                .then(body.or(skip))
                .action(XmlAction::XmlDeclaration),
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
        R: XmlDeclarationReceiver + ?Sized,
    {
        for node in journal.nodes() {
            if !matches!(node.action(), XmlAction::XmlDeclaration) {
                continue;
            }
            for child in node.children() {
                match *child.action() {
                    XmlAction::VersionNumber(q) => out.call("set_version_number", || {
                        receiver.set_version_number(q.is_single(), child.span())
                    }),
                    XmlAction::Standalone { yes, quote } => out.call("set_is_standalone", || {
                        receiver.set_is_standalone(yes, quote.is_single())
                    }),
                    _ => {
                        deliver_encoding(&child, receiver, out);
                    }
                }
            }
            let valid = node_valid(&node);
            out.call("done_xml_declaration", || {
                receiver.done_xml_declaration(valid, node.span())
            });
        }
        let valid = journal_valid(journal);
        self.valid.set(valid);
        valid
    }
}
