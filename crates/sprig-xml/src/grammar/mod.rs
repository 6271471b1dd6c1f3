//! # Grammar Modules
//!
//! Each module owns the rule for one construct and the replay step that
//! turns a committed journal into receiver calls:
//!
//! ```text
//! name            Name
//! reference       &name;  &#123;  &#x1F;
//! comment         <!-- ... -->
//! attribute       'value'  and  name = 'value'
//! entity          %name;  and entity values
//! enumerated      NOTATION (a|b)  and  (a|b)
//! external_id     public-id literals, SYSTEM and PUBLIC identifiers
//! declaration     encoding = 'x'  and  <?xml ... ?>
//! att_list        <!ATTLIST ... >
//! ```
//!
//! Modules that embed another construct take its rule at construction, so a
//! shared sub-grammar is built once and reference counted.
//!
//! Validity is computed during replay: a construct is valid unless an
//! [`XmlAction::Invalid`] marker, left by a recovery rule that skipped
//! malformed content, was journaled anywhere below it.

pub mod att_list;
pub mod attribute;
pub mod comment;
pub mod declaration;
pub mod entity;
pub mod enumerated;
pub mod external_id;
pub mod name;
pub mod reference;

#[cfg(test)]
pub(crate) mod testing;

pub(crate) use sprig_syntax::Delivery;
use sprig_syntax::{EventNode, Journal, Message};

use crate::action::XmlAction;

/// Origin tag carried by every XML diagnostic.
pub const ORIGIN: &str = "xml";

pub(crate) type Node<'e, 'i> = EventNode<'e, 'i, XmlAction>;

pub(crate) const fn minor(text: &'static str) -> Message {
    Message::minor(text).with_origin(ORIGIN)
}

pub(crate) const fn major(text: &'static str) -> Message {
    Message::major(text).with_origin(ORIGIN)
}

fn is_invalid(node: &Node<'_, '_>) -> bool {
    matches!(node.action(), XmlAction::Invalid)
}

/// Whether no recovery was journaled inside `node`.
pub(crate) fn node_valid(node: &Node<'_, '_>) -> bool {
    !is_invalid(node) && !node.descendants().any(|n| is_invalid(&n))
}

/// Whether no recovery was journaled anywhere in the parse.
pub(crate) fn journal_valid(journal: &Journal<'_, '_, XmlAction>) -> bool {
    journal.nodes().all(|node| node_valid(&node))
}
