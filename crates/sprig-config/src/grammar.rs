//! # Config Grammar
//!
//! Line-oriented sections, keys and comments, with every delimiter taken
//! from a [`Policy`]. With the default policy:
//!
//! ```text
//! ; line comment
//! /* block comment */
//! globalkey = value
//! [Section]
//! key = value ; trailing comment
//! bare_key
//! ```
//!
//! ## Rules
//!
//! ```text
//! config      = spacing (line)* end
//! line        = (block_comment | line_comment | section | key_value | bad_line) spacing
//! section     = start_section (section_name end_section | skip_section)
//! key_value   = key (assign value?)? (line_comment | block_comment)?
//! value       = '"' quoted '"' | bare                      quoted values only
//! bad_line    = text+ eol?
//! ```
//!
//! Block comments, names and values are single-line: `text` is the printable
//! ASCII range, so a tab or line break ends them.
//!
//! ## Recovery
//!
//! A malformed section header or block comment is skipped to the end of the
//! line and its pending diagnostic sent. An unterminated quote skips the rest
//! of the value. Any other line that no rule recognizes is skipped with
//! "Could not parse contents." and parsing resumes on the next line. Each
//! recovery leaves an invalid marker in the journal, so the parse reports
//! [`ParseResult::NotValid`](sprig_syntax::ParseResult::NotValid).
//!
//! Each section header replaces the current breadcrumb, so errors inside a
//! section are preceded by "Inside config section for ...".

use std::cell::Cell;

use sprig_syntax::{CharSet, Delivery, EventNode, Journal, Message, Rule, Span};

use crate::policy::Policy;
use crate::receiver::ConfigReceiver;

/// Journaled actions of the config grammar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConfigAction {
    Key,
    Value,
    /// Contents of a double-quoted value, without the quotes.
    QuotedValue,
    UnclosedQuote,
    /// A key with its optional value. Parent of `Key` and the value.
    KeyValue,
    SectionName,
    /// Left by every recovery rule.
    Invalid,
}

/// Breadcrumb label of a section.
pub const SECTION_SCOPE: &str = "config";

const NO_COMMENT_CONTENT: Message = Message::major("Found start of comment, but no comment content.");
const NO_COMMENT_END: Message = Message::major("Found comment, but no end of comment.");
const NO_SECTION_NAME: Message = Message::major("Found start of section, but no section name.");
const NO_SECTION_END: Message = Message::major("Found section name, but no end of section.");
const NO_END_QUOTE: Message = Message::major("Could not find ending quote for value.");
const BAD_CONTENT: Message = Message::major("Could not parse contents.");

type Node<'e, 'i> = EventNode<'e, 'i, ConfigAction>;

fn text() -> Rule<ConfigAction> {
    Rule::set(CharSet::printable())
}

fn blanks() -> Rule<ConfigAction> {
    Rule::set(CharSet::blank()).repeat()
}

fn eol() -> Rule<ConfigAction> {
    Rule::byte(b'\r').optional().then(Rule::byte(b'\n'))
}

fn lit(delimiter: &str) -> Rule<ConfigAction> {
    Rule::literal(delimiter)
}

/// `[A-Za-z_][A-Za-z0-9_]*`
fn alnum_name() -> Rule<ConfigAction> {
    let underscore = CharSet::from_bytes(b"_");
    Rule::set(CharSet::alpha() | underscore).then(Rule::set(CharSet::alnum() | underscore).repeat())
}

pub struct ConfigGrammar {
    rule: Rule<ConfigAction>,
    trim: bool,
    valid: Cell<bool>,
}

impl ConfigGrammar {
    /// Build the rules for `policy`. The policy is expected to be validated.
    pub fn new(policy: &Policy) -> Self {
        let line_comment = lit(&policy.line_comment)
            .then(text().repeat())
            .then(eol().or(Rule::end_of_input()));

        let block_comment = lit(&policy.block_comment_start).push(NO_COMMENT_CONTENT).then(
            blanks()
                .then(
                    text()
                        .but_not(lit(&policy.block_comment_end))
                        .repeat()
                        .prepare(NO_COMMENT_END),
                )
                .then(lit(&policy.block_comment_end).cancel())
                .or(text().repeat().pop().action(ConfigAction::Invalid)),
        );

        let assign = blanks().then(lit(&policy.assign)).then(blanks());

        let bare_value = text()
            .but_not(lit(&policy.block_comment_start).or(lit(&policy.line_comment)))
            .repeat()
            .action(ConfigAction::Value);
        let value = if policy.quoted_values {
            let quote = || Rule::byte(b'"');
            let quoted = Rule::set(CharSet::printable() - CharSet::from_bytes(b"\""))
                .repeat()
                .action(ConfigAction::QuotedValue)
                .then(quote());
            let unclosed = text()
                .repeat()
                .send_now(NO_END_QUOTE)
                .action(ConfigAction::UnclosedQuote);
            quote().then(quoted.or(unclosed)).or(bare_value)
        } else {
            bare_value
        };

        let key = if policy.alnum_names {
            alnum_name()
        } else {
            text()
                .but_not(lit(&policy.section_start).or(assign.clone()))
                .repeat1()
        };
        let key_value = Rule::seq([
            key.action(ConfigAction::Key),
            assign.then(value).optional(),
            line_comment.clone().or(block_comment.clone()).optional(),
        ])
        .action(ConfigAction::KeyValue);

        let name = if policy.alnum_names {
            alnum_name()
        } else {
            text()
                .but_not(lit(&policy.section_end).or(lit(&policy.section_start)))
                .repeat1()
        };
        let start_section = lit(&policy.section_start)
            .then(blanks())
            .push(NO_SECTION_NAME);
        let section_name = name
            .action(ConfigAction::SectionName)
            .replace_scope(SECTION_SCOPE)
            .prepare(NO_SECTION_END);
        let end_section = blanks().then(lit(&policy.section_end)).cancel();
        let skip_section = text()
            .but_not(lit(&policy.section_end))
            .repeat()
            .but_not(eol())
            .then(eol().optional())
            .action(ConfigAction::Invalid)
            .pop();
        let section = start_section.then(section_name.then(end_section).or(skip_section));

        let bad_line = text()
            .repeat1()
            .then(eol().optional())
            .send_now(BAD_CONTENT)
            .action(ConfigAction::Invalid);

        let spacing = Rule::set(CharSet::blank()).or(eol()).repeat();
        let line = Rule::choice([block_comment, line_comment, section, key_value, bad_line])
            .then(spacing.clone());

        Self {
            rule: spacing.then(line.repeat()).then(Rule::end_of_input()),
            trim: policy.trim,
            valid: Cell::new(false),
        }
    }

    pub fn rule(&self) -> &Rule<ConfigAction> {
        &self.rule
    }

    /// Validity of the last parse.
    pub fn is_valid(&self) -> bool {
        self.valid.get()
    }

    /// Deliver a committed journal: sections, keys in file order, then the
    /// closing `parsed_config_file` call.
    pub(crate) fn replay<R>(
        &self,
        journal: &Journal<'_, '_, ConfigAction>,
        receiver: &mut R,
        out: &mut Delivery,
    ) -> bool
    where
        R: ConfigReceiver + ?Sized,
    {
        let mut in_section = false;
        let mut valid = true;
        for node in journal.nodes() {
            valid &= node_valid(&node);
            match node.action() {
                ConfigAction::SectionName => {
                    in_section = true;
                    let name = self.trimmed(node.span());
                    out.call("add_section", || receiver.add_section(name));
                }
                ConfigAction::KeyValue => self.deliver_key_value(&node, in_section, receiver, out),
                _ => {}
            }
        }
        self.valid.set(valid);
        if !out.is_detached() {
            receiver.parsed_config_file(valid);
        }
        valid
    }

    fn deliver_key_value<R>(&self, node: &Node<'_, '_>, in_section: bool, receiver: &mut R, out: &mut Delivery)
    where
        R: ConfigReceiver + ?Sized,
    {
        let mut key = None;
        let mut value = None;
        for child in node.children() {
            match child.action() {
                ConfigAction::Key => key = Some(self.trimmed(child.span())),
                ConfigAction::Value => value = Some(self.trimmed(child.span())),
                ConfigAction::QuotedValue => value = Some(child.span()),
                ConfigAction::UnclosedQuote => return,
                _ => {}
            }
        }
        let Some(key) = key else {
            log::error!("key/value pair without a key at {}..{}", node.span().start(), node.span().end());
            return;
        };
        if in_section {
            out.call("add_section_key", || receiver.add_section_key(key, value));
        } else {
            out.call("add_global_key", || receiver.add_global_key(key, value));
        }
    }

    fn trimmed<'i>(&self, span: Span<'i>) -> Span<'i> {
        if self.trim { span.trim_blanks() } else { span }
    }
}

fn is_defect(node: &Node<'_, '_>) -> bool {
    matches!(
        node.action(),
        ConfigAction::Invalid | ConfigAction::UnclosedQuote
    )
}

/// Whether no recovery was journaled inside `node`.
fn node_valid(node: &Node<'_, '_>) -> bool {
    !is_defect(node) && !node.descendants().any(|n| is_defect(&n))
}
