//! `Name ::= (Letter | '_' | ':') (NameChar)*`
//!
//! Two rules come out of here. [`NameGrammar::rule`] parses a name on its
//! own and skips to the end of the data when there is none.
//! [`NameGrammar::token`] is the bare match that other constructs embed:
//! inside them a missing name just fails the alternative.

use std::cell::Cell;

use sprig_syntax::{Journal, Rule};

use super::{Delivery, Node, journal_valid, minor};
use crate::action::XmlAction;
use crate::chars::{first_name_char, name_char, skip_to_nul};
use crate::receivers::NameReceiver;

pub struct NameGrammar {
    rule: Rule<XmlAction>,
    token: Rule<XmlAction>,
    valid: Cell<bool>,
}

impl NameGrammar {
    pub fn new() -> Self {
        let first = Rule::set(first_name_char()).push(minor("Name has invalid first character."));
        let rest = Rule::set(name_char())
            .repeat()
            .prepare(minor("Could not parse rest of name."));
        let name = first.then(rest).cancel().action(XmlAction::Name);
        let skip = skip_to_nul()
            .action(XmlAction::Invalid)
            .send_now(minor("Name has an invalid character."))
            .pop_abandoned();
        let token = Rule::set(first_name_char())
            .then(Rule::set(name_char()).repeat())
            .action(XmlAction::Name);

        Self {
            rule: name.or(skip),
            token,
            valid: Cell::new(false),
        }
    }

    pub fn rule(&self) -> &Rule<XmlAction> {
        &self.rule
    }

    /// The name without diagnostics or recovery, for embedding.
    pub fn token(&self) -> &Rule<XmlAction> {
        &self.token
    }

    /// Validity of the last top-level parse.
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
        R: NameReceiver + ?Sized,
    {
        for node in journal.nodes() {
            deliver(&node, receiver, out);
        }
        let valid = journal_valid(journal);
        self.valid.set(valid);
        valid
    }
}

impl Default for NameGrammar {
    fn default() -> Self {
        Self::new()
    }
}

/// Send a journaled name to `receiver`. Returns whether `node` was a name.
pub(crate) fn deliver<R>(node: &Node<'_, '_>, receiver: &mut R, out: &mut Delivery) -> bool
where
    R: NameReceiver + ?Sized,
{
    if !matches!(node.action(), XmlAction::Name) {
        return false;
    }
    out.call("set_name", || receiver.set_name(node.span()));
    true
}
