//! Enumerated attribute types: `NOTATION (a | b)` and `(a | b)`.

use std::cell::Cell;

use sprig_syntax::{Journal, Rule};

use super::{Delivery, Node, journal_valid, major, node_valid};
use crate::action::XmlAction;
use crate::chars::{name_char, skip_to_nul, spaces};
use crate::receivers::EnumeratedTypeReceiver;

pub struct EnumeratedTypeGrammar {
    rule: Rule<XmlAction>,
    valid: Cell<bool>,
}

impl EnumeratedTypeGrammar {
    /// `name` is the shared name token.
    pub fn new(name: &Rule<XmlAction>) -> Self {
        let blank = || spaces().optional();
        let delimiter = Rule::seq([blank(), Rule::byte(b'|'), blank()])
            .prepare(major("Did not find name after '|' delimiter."));
        let close = blank().then(Rule::byte(b')')).cancel();

        let notation_name = name
            .clone()
            .action(XmlAction::Notation)
            .prepare(major(
                "Did not find '|' delimiter or ending parenthesis ')' after name in notation.",
            ));
        let notation = Rule::seq([
            Rule::literal("NOTATION").push(major("Did not find starting parenthesis for notation.")),
            Rule::seq([blank(), Rule::byte(b'('), blank()]).prepare(major("Did not find content for notation.")),
            notation_name.clone(),
            delimiter.clone().then(notation_name).repeat(),
            close.clone(),
        ]);

        let token = Rule::set(name_char())
            .repeat1()
            .action(XmlAction::Enumeration)
            .prepare(major(
                "Did not find '|' delimiter or ending parenthesis ')' after name in enumeration.",
            ));
        let enumeration = Rule::seq([
            Rule::byte(b'(')
                .then(blank())
                .push(major("Did not find content for enumeration.")),
            token.clone(),
            delimiter.then(token).repeat(),
            close,
        ]);

        let skip = skip_to_nul()
            .action(XmlAction::Invalid)
            .pop_abandoned()
            .send_now(major("Unable to parse enumerated type - skipping rest of content."));

        Self {
            rule: Rule::choice([notation, enumeration, skip]).action(XmlAction::EnumeratedType),
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
        R: EnumeratedTypeReceiver + ?Sized,
    {
        for node in journal.nodes() {
            deliver(&node, receiver, out);
        }
        let valid = journal_valid(journal);
        self.valid.set(valid);
        valid
    }
}

/// Replay an enumerated type node. Returns whether `node` was one.
pub(crate) fn deliver<R>(node: &Node<'_, '_>, receiver: &mut R, out: &mut Delivery) -> bool
where
    R: EnumeratedTypeReceiver + ?Sized,
{
    if !matches!(node.action(), XmlAction::EnumeratedType) {
        return false;
    }
    for child in node.children() {
        match child.action() {
            XmlAction::Notation => out.call("add_notation", || receiver.add_notation(child.span())),
            XmlAction::Enumeration => {
                out.call("add_enumeration", || receiver.add_enumeration(child.span()))
            }
            _ => {}
        }
    }
    let valid = node_valid(node);
    out.call("done_enumerated_type", || {
        receiver.done_enumerated_type(valid, node.span())
    });
    true
}
