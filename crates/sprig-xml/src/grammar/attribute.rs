//! Attribute values (`'b&x;'`) and attributes (`a = 'b'`).

use std::cell::Cell;

use sprig_syntax::{CharSet, Journal, Message, Rule};

use super::{Delivery, Node, journal_valid, major, minor, name, node_valid, reference};
use crate::action::{Quote, XmlAction};
use crate::chars::{equals, quote, skip_to_nul};
use crate::receivers::{AttributeReceiver, AttributeValueReceiver};

pub struct AttributeValueGrammar {
    rule: Rule<XmlAction>,
    valid: Cell<bool>,
}

impl AttributeValueGrammar {
    /// `reference` is the shared reference rule.
    pub fn new(reference: &Rule<XmlAction>) -> Self {
        let single = quoted(
            Quote::Single,
            reference,
            major("Attribute value has starting single-quote but no content."),
            minor("Attribute value has no ending single-quote."),
        );
        let double = quoted(
            Quote::Double,
            reference,
            minor("Attribute value has starting double-quote but no content."),
            minor("Attribute value has no ending double-quote."),
        );
        let skip = skip_to_nul()
            .action(XmlAction::Invalid)
            .pop_abandoned()
            .send_now(major("Unable to parse attribute value - skipping rest of content."));

        Self {
            rule: Rule::choice([single, double, skip]),
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
        R: AttributeValueReceiver + ?Sized,
    {
        for node in journal.nodes() {
            deliver_value(&node, receiver, out);
        }
        let valid = journal_valid(journal);
        self.valid.set(valid);
        valid
    }
}

fn quoted(q: Quote, reference: &Rule<XmlAction>, opened: Message, unclosed: Message) -> Rule<XmlAction> {
    let start = quote(q).push(opened);
    let text = Rule::none_of(CharSet::from_bytes(&[b'%', b'&', q.byte()]))
        .repeat1()
        .action(XmlAction::Value);
    let content = reference.clone().or(text).repeat().prepare(unclosed);
    Rule::seq([start, content, quote(q)])
        .cancel()
        .action(XmlAction::AttributeValue(q))
}

/// Replay an attribute value node: its text and references in order, then
/// the closing call. Returns whether `node` was an attribute value.
pub(crate) fn deliver_value<R>(node: &Node<'_, '_>, receiver: &mut R, out: &mut Delivery) -> bool
where
    R: AttributeValueReceiver + ?Sized,
{
    let XmlAction::AttributeValue(q) = *node.action() else {
        return false;
    };
    for child in node.children() {
        if matches!(child.action(), XmlAction::Value) {
            out.call("add_value", || receiver.add_value(child.span()));
        } else {
            reference::deliver(&child, receiver, out);
        }
    }
    let valid = node_valid(node);
    out.call("done_attribute_value", || {
        receiver.done_attribute_value(valid, q.is_single(), node.span())
    });
    true
}

pub struct AttributeGrammar {
    rule: Rule<XmlAction>,
    valid: Cell<bool>,
}

impl AttributeGrammar {
    /// `name` is the shared name token, `value` the attribute value rule.
    pub fn new(name: &Rule<XmlAction>, value: &Rule<XmlAction>) -> Self {
        let attribute = Rule::seq([
            name.clone().push(minor("Found name but no equal sign for attribute.")),
            equals().prepare(minor("Found equal sign but not value in attribute.")),
            value.clone(),
        ])
        .cancel()
        .action(XmlAction::Attribute);
        let skip = skip_to_nul()
            .action(XmlAction::Invalid)
            .pop_abandoned()
            .send_now(major("Unable to parse attribute - skipping rest of content."));

        Self {
            rule: attribute.or(skip),
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
        R: AttributeReceiver + ?Sized,
    {
        for node in journal.nodes() {
            if !matches!(node.action(), XmlAction::Attribute) {
                continue;
            }
            for child in node.children() {
                if !name::deliver(&child, receiver, out) {
                    deliver_value(&child, receiver, out);
                }
            }
            let valid = node_valid(&node);
            out.call("done_attribute", || receiver.done_attribute(valid, node.span()));
        }
        let valid = journal_valid(journal);
        self.valid.set(valid);
        valid
    }
}
