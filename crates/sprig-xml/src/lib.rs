//! # sprig-xml
//!
//! Micro-grammars for the small pieces of XML that show up inside
//! declarations: names, references, quoted values, comments, external
//! identifiers, the XML declaration and `<!ATTLIST` declarations.
//!
//! Each construct is parsed by its own call on [`XmlParser`] and delivered to
//! a receiver trait from [`receivers`]. Receivers are only called after the
//! whole construct has matched, so they never see content a failed
//! alternative later threw away.
//!
//! ## Architecture Overview
//!
//! ```text
//! XmlParser::parse_attribute(input, receiver, sink)
//!   │
//!   ├─▶ Driver::parse(AttributeGrammar::rule)     sprig-syntax
//!   │       diagnostics ──▶ sink
//!   │
//!   └─▶ AttributeGrammar::replay(journal)
//!           Name            ──▶ receiver.set_name
//!           AttributeValue  ──▶ receiver.add_value / set_reference
//!                           ──▶ receiver.done_attribute_value
//!           Attribute       ──▶ receiver.done_attribute
//! ```
//!
//! Grammars that embed another construct share its rule. Names are embedded
//! through a bare token without recovery, built once and reused by
//! references, attributes, PE references, notations and attribute lists.
//!
//! ## Module Structure
//!
//! ```text
//! sprig-xml/
//! ├── lib.rs          # This file - XmlParser facade
//! ├── action.rs       # Journaled actions and receiver-facing enums
//! ├── chars.rs        # Character classes and shared small rules
//! ├── receivers.rs    # One receiver trait per construct
//! └── grammar/        # One module per construct
//! ```
//!
//! ## Example
//!
//! ```
//! use sprig_syntax::{Level, MessageSink, ParseResult, Span};
//! use sprig_xml::{NameReceiver, XmlParser};
//!
//! struct Quiet;
//! impl MessageSink for Quiet {
//!     fn give_message(&mut self, _: Level, _: &str) -> bool {
//!         true
//!     }
//! }
//!
//! #[derive(Default)]
//! struct Names(Vec<String>);
//! impl NameReceiver for Names {
//!     fn set_name(&mut self, name: Span<'_>) -> bool {
//!         self.0.push(name.to_string());
//!         true
//!     }
//! }
//!
//! let parser = XmlParser::new();
//! let mut names = Names::default();
//! assert_eq!(parser.parse_name(b"xml:lang", &mut names, &mut Quiet), ParseResult::AllValid);
//! assert_eq!(names.0, ["xml:lang"]);
//! ```

pub mod action;
pub mod chars;
pub mod grammar;
pub mod receivers;

pub use action::{AttType, DefaultDeclType, Quote, RefType, XmlAction};
pub use grammar::ORIGIN;
pub use grammar::att_list::AttListDeclGrammar;
pub use grammar::attribute::{AttributeGrammar, AttributeValueGrammar};
pub use grammar::comment::CommentGrammar;
pub use grammar::declaration::{EncodingDeclGrammar, XmlDeclarationGrammar};
pub use grammar::entity::{EntityValueGrammar, PeReferenceGrammar};
pub use grammar::enumerated::EnumeratedTypeGrammar;
pub use grammar::external_id::{ExternalIdGrammar, PublicIdGrammar};
pub use grammar::name::NameGrammar;
pub use grammar::reference::ReferenceGrammar;
pub use receivers::*;

use sprig_syntax::{Delivery, Driver, Journal, MessageSink, ParseResult, Rule};

/// Parser for every XML construct, sharing one driver.
///
/// The parser is not reentrant: a receiver or sink that calls back into the
/// same parser gets [`ParseResult::ParsingNow`].
pub struct XmlParser {
    driver: Driver,
    name: NameGrammar,
    reference: ReferenceGrammar,
    comment: CommentGrammar,
    attribute_value: AttributeValueGrammar,
    attribute: AttributeGrammar,
    pe_reference: PeReferenceGrammar,
    entity_value: EntityValueGrammar,
    enumerated_type: EnumeratedTypeGrammar,
    public_id: PublicIdGrammar,
    external_id: ExternalIdGrammar,
    encoding_decl: EncodingDeclGrammar,
    xml_declaration: XmlDeclarationGrammar,
    att_list_decl: AttListDeclGrammar,
}

impl XmlParser {
    pub fn new() -> Self {
        let name = NameGrammar::new();
        let reference = ReferenceGrammar::new(name.token());
        let attribute_value = AttributeValueGrammar::new(reference.rule());
        let attribute = AttributeGrammar::new(name.token(), attribute_value.rule());
        let pe_reference = PeReferenceGrammar::new(name.token());
        let entity_value = EntityValueGrammar::new(reference.rule(), pe_reference.rule());
        let enumerated_type = EnumeratedTypeGrammar::new(name.token());
        let public_id = PublicIdGrammar::new();
        let external_id = ExternalIdGrammar::new(public_id.rule());
        let encoding_decl = EncodingDeclGrammar::new();
        let xml_declaration = XmlDeclarationGrammar::new(encoding_decl.rule());
        let att_list_decl =
            AttListDeclGrammar::new(name.token(), enumerated_type.rule(), attribute_value.rule());

        Self {
            driver: Driver::new(),
            name,
            reference,
            comment: CommentGrammar::new(),
            attribute_value,
            attribute,
            pe_reference,
            entity_value,
            enumerated_type,
            public_id,
            external_id,
            encoding_decl,
            xml_declaration,
            att_list_decl,
        }
    }

    /// Error budget for every later parse; raised to the driver's floor.
    pub fn with_max_errors(mut self, max_errors: usize) -> Self {
        self.driver.set_max_errors(max_errors);
        self
    }

    pub fn driver(&self) -> &Driver {
        &self.driver
    }

    fn run<F>(&self, input: &[u8], rule: &Rule<XmlAction>, sink: &mut dyn MessageSink, replay: F) -> ParseResult
    where
        F: FnOnce(&Journal<'_, '_, XmlAction>, &mut Delivery) -> bool,
    {
        let mut out = Delivery::default();
        self.driver
            .parse(input, 0, input.len(), rule, sink, |journal| replay(journal, &mut out))
    }

    pub fn parse_name(&self, input: &[u8], receiver: &mut dyn NameReceiver, sink: &mut dyn MessageSink) -> ParseResult {
        self.run(input, self.name.rule(), sink, |journal, out| {
            self.name.replay(journal, receiver, out)
        })
    }

    pub fn parse_reference(
        &self,
        input: &[u8],
        receiver: &mut dyn ReferenceReceiver,
        sink: &mut dyn MessageSink,
    ) -> ParseResult {
        self.run(input, self.reference.rule(), sink, |journal, out| {
            self.reference.replay(journal, receiver, out)
        })
    }

    pub fn parse_comment(
        &self,
        input: &[u8],
        receiver: &mut dyn CommentReceiver,
        sink: &mut dyn MessageSink,
    ) -> ParseResult {
        self.run(input, self.comment.rule(), sink, |journal, out| {
            self.comment.replay(journal, receiver, out)
        })
    }

    pub fn parse_attribute_value(
        &self,
        input: &[u8],
        receiver: &mut dyn AttributeValueReceiver,
        sink: &mut dyn MessageSink,
    ) -> ParseResult {
        self.run(input, self.attribute_value.rule(), sink, |journal, out| {
            self.attribute_value.replay(journal, receiver, out)
        })
    }

    pub fn parse_attribute(
        &self,
        input: &[u8],
        receiver: &mut dyn AttributeReceiver,
        sink: &mut dyn MessageSink,
    ) -> ParseResult {
        self.run(input, self.attribute.rule(), sink, |journal, out| {
            self.attribute.replay(journal, receiver, out)
        })
    }

    pub fn parse_pe_reference(
        &self,
        input: &[u8],
        receiver: &mut dyn PeReferenceReceiver,
        sink: &mut dyn MessageSink,
    ) -> ParseResult {
        self.run(input, self.pe_reference.rule(), sink, |journal, out| {
            self.pe_reference.replay(journal, receiver, out)
        })
    }

    pub fn parse_entity_value(
        &self,
        input: &[u8],
        receiver: &mut dyn EntityValueReceiver,
        sink: &mut dyn MessageSink,
    ) -> ParseResult {
        self.run(input, self.entity_value.rule(), sink, |journal, out| {
            self.entity_value.replay(journal, receiver, out)
        })
    }

    pub fn parse_enumerated_type(
        &self,
        input: &[u8],
        receiver: &mut dyn EnumeratedTypeReceiver,
        sink: &mut dyn MessageSink,
    ) -> ParseResult {
        self.run(input, self.enumerated_type.rule(), sink, |journal, out| {
            self.enumerated_type.replay(journal, receiver, out)
        })
    }

    pub fn parse_public_id(
        &self,
        input: &[u8],
        receiver: &mut dyn PublicIdReceiver,
        sink: &mut dyn MessageSink,
    ) -> ParseResult {
        self.run(input, self.public_id.rule(), sink, |journal, out| {
            self.public_id.replay(journal, receiver, out)
        })
    }

    pub fn parse_external_id(
        &self,
        input: &[u8],
        receiver: &mut dyn ExternalIdReceiver,
        sink: &mut dyn MessageSink,
    ) -> ParseResult {
        self.run(input, self.external_id.rule(), sink, |journal, out| {
            self.external_id.replay(journal, receiver, out)
        })
    }

    pub fn parse_encoding_decl(
        &self,
        input: &[u8],
        receiver: &mut dyn EncodingDeclReceiver,
        sink: &mut dyn MessageSink,
    ) -> ParseResult {
        self.run(input, self.encoding_decl.rule(), sink, |journal, out| {
            self.encoding_decl.replay(journal, receiver, out)
        })
    }

    pub fn parse_xml_declaration(
        &self,
        input: &[u8],
        receiver: &mut dyn XmlDeclarationReceiver,
        sink: &mut dyn MessageSink,
    ) -> ParseResult {
        self.run(input, self.xml_declaration.rule(), sink, |journal, out| {
            self.xml_declaration.replay(journal, receiver, out)
        })
    }

    pub fn parse_att_list_decl(
        &self,
        input: &[u8],
        receiver: &mut dyn AttListDeclReceiver,
        sink: &mut dyn MessageSink,
    ) -> ParseResult {
        self.run(input, self.att_list_decl.rule(), sink, |journal, out| {
            self.att_list_decl.replay(journal, receiver, out)
        })
    }

    pub fn name_grammar(&self) -> &NameGrammar {
        &self.name
    }

    pub fn reference_grammar(&self) -> &ReferenceGrammar {
        &self.reference
    }

    pub fn comment_grammar(&self) -> &CommentGrammar {
        &self.comment
    }

    pub fn attribute_value_grammar(&self) -> &AttributeValueGrammar {
        &self.attribute_value
    }

    pub fn attribute_grammar(&self) -> &AttributeGrammar {
        &self.attribute
    }

    pub fn pe_reference_grammar(&self) -> &PeReferenceGrammar {
        &self.pe_reference
    }

    pub fn entity_value_grammar(&self) -> &EntityValueGrammar {
        &self.entity_value
    }

    pub fn enumerated_type_grammar(&self) -> &EnumeratedTypeGrammar {
        &self.enumerated_type
    }

    pub fn public_id_grammar(&self) -> &PublicIdGrammar {
        &self.public_id
    }

    pub fn external_id_grammar(&self) -> &ExternalIdGrammar {
        &self.external_id
    }

    pub fn encoding_decl_grammar(&self) -> &EncodingDeclGrammar {
        &self.encoding_decl
    }

    pub fn xml_declaration_grammar(&self) -> &XmlDeclarationGrammar {
        &self.xml_declaration
    }

    pub fn att_list_decl_grammar(&self) -> &AttListDeclGrammar {
        &self.att_list_decl
    }
}

impl Default for XmlParser {
    fn default() -> Self {
        Self::new()
    }
}
