//! # Receivers
//!
//! One capability trait per construct. A grammar only ever calls a receiver
//! after its whole parse has committed, with spans borrowed from the input.
//!
//! Every method returns `true` to keep receiving. Returning `false` detaches
//! the receiver for the rest of that parse. The parse itself carries on and
//! its result is the same as if the receiver had accepted everything.
//!
//! Composite constructs compose capabilities through supertraits:
//!
//! ```text
//! AttributeReceiver      : NameReceiver + AttributeValueReceiver
//! AttributeValueReceiver : ReferenceReceiver
//! EntityValueReceiver    : ReferenceReceiver + PeReferenceReceiver
//! ExternalIdReceiver     : PublicIdReceiver
//! XmlDeclarationReceiver : EncodingDeclReceiver
//! ```
//!
//! [`AttListDeclReceiver`] instead hands out child receivers from factory
//! methods, one per enumerated type or default value it contains.

use sprig_syntax::Span;

use crate::action::{AttType, DefaultDeclType, RefType};

pub trait NameReceiver {
    fn set_name(&mut self, name: Span<'_>) -> bool;
}

pub trait ReferenceReceiver {
    /// `payload` is the entity name, or the digits without `#` or `#x`.
    fn set_reference(&mut self, ref_type: RefType, payload: Span<'_>) -> bool;
}

pub trait CommentReceiver {
    /// `content` excludes `<!--` and `-->`.
    fn set_comment(&mut self, content: Span<'_>) -> bool;
}

pub trait AttributeValueReceiver: ReferenceReceiver {
    fn add_value(&mut self, value: Span<'_>) -> bool;

    /// `span` includes the quotes.
    fn done_attribute_value(&mut self, valid: bool, single_quoted: bool, span: Span<'_>) -> bool;
}

pub trait AttributeReceiver: NameReceiver + AttributeValueReceiver {
    fn done_attribute(&mut self, valid: bool, span: Span<'_>) -> bool;
}

pub trait PeReferenceReceiver {
    fn add_pe_reference(&mut self, name: Span<'_>) -> bool;
}

pub trait EntityValueReceiver: ReferenceReceiver + PeReferenceReceiver {
    fn add_value(&mut self, value: Span<'_>) -> bool;

    fn done_entity_value(&mut self, valid: bool, single_quoted: bool, span: Span<'_>) -> bool;
}

pub trait EnumeratedTypeReceiver {
    fn add_notation(&mut self, name: Span<'_>) -> bool;

    fn add_enumeration(&mut self, token: Span<'_>) -> bool;

    fn done_enumerated_type(&mut self, valid: bool, span: Span<'_>) -> bool;
}

pub trait PublicIdReceiver {
    /// `literal` excludes the quotes.
    fn set_public_id_literal(&mut self, literal: Span<'_>, single_quoted: bool) -> bool;
}

pub trait ExternalIdReceiver: PublicIdReceiver {
    fn set_system_literal(&mut self, literal: Span<'_>, single_quoted: bool) -> bool;

    fn done_external_id(&mut self, valid: bool, span: Span<'_>) -> bool;
}

pub trait EncodingDeclReceiver {
    fn set_enc_name(&mut self, name: Span<'_>) -> bool;

    fn done_encoding_decl(&mut self, valid: bool, single_quoted: bool, span: Span<'_>) -> bool;
}

pub trait XmlDeclarationReceiver: EncodingDeclReceiver {
    fn set_version_number(&mut self, single_quoted: bool, version: Span<'_>) -> bool;

    fn set_is_standalone(&mut self, standalone: bool, single_quoted: bool) -> bool;

    fn done_xml_declaration(&mut self, valid: bool, span: Span<'_>) -> bool;
}

pub trait AttListDeclReceiver {
    /// Name of the element the list belongs to.
    fn set_name(&mut self, name: Span<'_>) -> bool;

    fn set_att_name(&mut self, name: Span<'_>) -> bool;

    fn set_att_type(&mut self, att_type: AttType) -> bool;

    /// Receiver for the enumerated type of the current attribute.
    fn add_enumerated_type(&mut self) -> &mut dyn EnumeratedTypeReceiver;

    fn set_default_decl_type(&mut self, decl_type: DefaultDeclType) -> bool;

    /// Receiver for the default value of the current attribute.
    fn add_attribute_value(&mut self) -> &mut dyn AttributeValueReceiver;

    fn done_att_list_decl(&mut self, valid: bool, span: Span<'_>) -> bool;
}
