//! `<!-- ... -->`. Content may hold single dashes but never `--`.

use std::cell::Cell;

use sprig_syntax::{CharSet, Journal, Rule};

use super::{Delivery, journal_valid, minor};
use crate::action::XmlAction;
use crate::chars::{skip_to_nul, whitespace};
use crate::receivers::CommentReceiver;

pub struct CommentGrammar {
    rule: Rule<XmlAction>,
    valid: Cell<bool>,
}

impl CommentGrammar {
    pub fn new() -> Self {
        let start = Rule::literal("<!--").push(minor("Found start of comment, but not end of comment."));
        let ch = Rule::set(CharSet::printable().minus(CharSet::from_bytes(b"-")) | whitespace());
        let content = ch
            .clone()
            .or(Rule::byte(b'-').then(ch))
            .repeat()
            .action(XmlAction::Comment);
        let end = Rule::literal("-->").cancel();
        let skip = skip_to_nul()
            .action(XmlAction::Invalid)
            .send_now(minor("Comment has invalid format."))
            .pop();

        Self {
            rule: start.then(content.then(end).or(skip)),
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
        R: CommentReceiver + ?Sized,
    {
        for node in journal.nodes() {
            if matches!(node.action(), XmlAction::Comment) {
                out.call("set_comment", || receiver.set_comment(node.span()));
            }
        }
        let valid = journal_valid(journal);
        self.valid.set(valid);
        valid
    }
}

impl Default for CommentGrammar {
    fn default() -> Self {
        Self::new()
    }
}
