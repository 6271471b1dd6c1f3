//! Parameter-entity references (`%name;`) and entity values, which may hold
//! both general and parameter-entity references.

use std::cell::Cell;

use sprig_syntax::{CharSet, Journal, Rule};

use super::{Delivery, Node, journal_valid, major, minor, node_valid, reference};
use crate::action::{Quote, XmlAction};
use crate::chars::{quote, skip_to_nul};
use crate::receivers::{EntityValueReceiver, PeReferenceReceiver};

pub struct PeReferenceGrammar {
    rule: Rule<XmlAction>,
    valid: Cell<bool>,
}

impl PeReferenceGrammar {
    /// `name` is the shared name token.
    pub fn new(name: &Rule<XmlAction>) -> Self {
        let start = Rule::byte(b'%').push(minor("Found start of PE reference, but no name."));
        let reference = name
            .clone()
            .action(XmlAction::PeReference)
            .prepare(minor("Found name for PE reference, but no ending semicolon."))
            .then(Rule::byte(b';').cancel());
        let skip = skip_to_nul()
            .action(XmlAction::Invalid)
            .send_now(minor("Unable to parse name for PE reference."))
            .pop();

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
        R: PeReferenceReceiver + ?Sized,
    {
        for node in journal.nodes() {
            deliver_pe_reference(&node, receiver, out);
        }
        let valid = journal_valid(journal);
        self.valid.set(valid);
        valid
    }
}

fn deliver_pe_reference<R>(node: &Node<'_, '_>, receiver: &mut R, out: &mut Delivery) -> bool
where
    R: PeReferenceReceiver + ?Sized,
{
    if !matches!(node.action(), XmlAction::PeReference) {
        return false;
    }
    out.call("add_pe_reference", || receiver.add_pe_reference(node.span()));
    true
}

pub struct EntityValueGrammar {
    rule: Rule<XmlAction>,
    valid: Cell<bool>,
}

impl EntityValueGrammar {
    pub fn new(reference: &Rule<XmlAction>, pe_reference: &Rule<XmlAction>) -> Self {
        let quoted = |q: Quote| {
            let (opened, unclosed) = match q {
                Quote::Single => (
                    major("Entity value has starting single-quote but no content."),
                    minor("Entity value has no ending single-quote."),
                ),
                Quote::Double => (
                    minor("Entity value has starting double-quote but no content."),
                    minor("Entity value has no ending double-quote."),
                ),
            };
            let text = Rule::none_of(CharSet::from_bytes(&[b'%', b'&', q.byte()]))
                .repeat1()
                .action(XmlAction::Value);
            let content = Rule::choice([reference.clone(), pe_reference.clone(), text])
                .repeat()
                .prepare(unclosed);
            Rule::seq([quote(q).push(opened), content, quote(q)])
                .cancel()
                .action(XmlAction::EntityValue(q))
        };
        let skip = skip_to_nul()
            .action(XmlAction::Invalid)
            .pop_abandoned()
            .send_now(major("Unable to parse entity value - skipping rest of content."));

        Self {
            rule: Rule::choice([quoted(Quote::Single), quoted(Quote::Double), skip]),
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
        R: EntityValueReceiver + ?Sized,
    {
        for node in journal.nodes() {
            let XmlAction::EntityValue(q) = *node.action() else {
                continue;
            };
            for child in node.children() {
                if matches!(child.action(), XmlAction::Value) {
                    out.call("add_value", || receiver.add_value(child.span()));
                } else if !deliver_pe_reference(&child, receiver, out) {
                    reference::deliver(&child, receiver, out);
                }
            }
            let valid = node_valid(&node);
            out.call("done_entity_value", || {
                receiver.done_entity_value(valid, q.is_single(), node.span())
            });
        }
        let valid = journal_valid(journal);
        self.valid.set(valid);
        valid
    }
}
