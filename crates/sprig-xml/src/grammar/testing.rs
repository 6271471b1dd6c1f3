//! Recording receivers and sinks shared by the grammar tests.

use sprig_syntax::{Level, MessageSink, Span};

use crate::action::{AttType, DefaultDeclType, RefType};
use crate::receivers::*;

/// Receiver for every construct that logs each call as one line.
///
/// Factory methods of [`AttListDeclReceiver`] hand out the recorder itself,
/// so child calls land in the same log.
#[derive(Debug, Default)]
pub struct Recorder {
    pub calls: Vec<String>,
    /// Refuse the call with this index and every later one.
    pub refuse_from: Option<usize>,
}

impl Recorder {
    pub fn refusing_from(index: usize) -> Self {
        Self {
            calls: Vec::new(),
            refuse_from: Some(index),
        }
    }

    fn log(&mut self, call: String) -> bool {
        let keep = self.refuse_from.is_none_or(|limit| self.calls.len() < limit);
        self.calls.push(call);
        keep
    }

    pub fn log_text(&self) -> String {
        self.calls.join("\n")
    }
}

impl NameReceiver for Recorder {
    fn set_name(&mut self, name: Span<'_>) -> bool {
        self.log(format!("set_name({name})"))
    }
}

impl ReferenceReceiver for Recorder {
    fn set_reference(&mut self, ref_type: RefType, payload: Span<'_>) -> bool {
        self.log(format!("set_reference({ref_type}, {payload})"))
    }
}

impl CommentReceiver for Recorder {
    fn set_comment(&mut self, content: Span<'_>) -> bool {
        self.log(format!("set_comment({content})"))
    }
}

impl AttributeValueReceiver for Recorder {
    fn add_value(&mut self, value: Span<'_>) -> bool {
        self.log(format!("add_value({value})"))
    }

    fn done_attribute_value(&mut self, valid: bool, single_quoted: bool, span: Span<'_>) -> bool {
        self.log(format!("done_attribute_value({valid}, {single_quoted}, {span})"))
    }
}

impl AttributeReceiver for Recorder {
    fn done_attribute(&mut self, valid: bool, span: Span<'_>) -> bool {
        self.log(format!("done_attribute({valid}, {span})"))
    }
}

impl PeReferenceReceiver for Recorder {
    fn add_pe_reference(&mut self, name: Span<'_>) -> bool {
        self.log(format!("add_pe_reference({name})"))
    }
}

impl EntityValueReceiver for Recorder {
    fn add_value(&mut self, value: Span<'_>) -> bool {
        self.log(format!("add_value({value})"))
    }

    fn done_entity_value(&mut self, valid: bool, single_quoted: bool, span: Span<'_>) -> bool {
        self.log(format!("done_entity_value({valid}, {single_quoted}, {span})"))
    }
}

impl EnumeratedTypeReceiver for Recorder {
    fn add_notation(&mut self, name: Span<'_>) -> bool {
        self.log(format!("add_notation({name})"))
    }

    fn add_enumeration(&mut self, token: Span<'_>) -> bool {
        self.log(format!("add_enumeration({token})"))
    }

    fn done_enumerated_type(&mut self, valid: bool, span: Span<'_>) -> bool {
        self.log(format!("done_enumerated_type({valid}, {span})"))
    }
}

impl PublicIdReceiver for Recorder {
    fn set_public_id_literal(&mut self, literal: Span<'_>, single_quoted: bool) -> bool {
        self.log(format!("set_public_id_literal({literal}, {single_quoted})"))
    }
}

impl ExternalIdReceiver for Recorder {
    fn set_system_literal(&mut self, literal: Span<'_>, single_quoted: bool) -> bool {
        self.log(format!("set_system_literal({literal}, {single_quoted})"))
    }

    fn done_external_id(&mut self, valid: bool, span: Span<'_>) -> bool {
        self.log(format!("done_external_id({valid}, {span})"))
    }
}

impl EncodingDeclReceiver for Recorder {
    fn set_enc_name(&mut self, name: Span<'_>) -> bool {
        self.log(format!("set_enc_name({name})"))
    }

    fn done_encoding_decl(&mut self, valid: bool, single_quoted: bool, span: Span<'_>) -> bool {
        self.log(format!("done_encoding_decl({valid}, {single_quoted}, {span})"))
    }
}

impl XmlDeclarationReceiver for Recorder {
    fn set_version_number(&mut self, single_quoted: bool, version: Span<'_>) -> bool {
        self.log(format!("set_version_number({single_quoted}, {version})"))
    }

    fn set_is_standalone(&mut self, standalone: bool, single_quoted: bool) -> bool {
        self.log(format!("set_is_standalone({standalone}, {single_quoted})"))
    }

    fn done_xml_declaration(&mut self, valid: bool, span: Span<'_>) -> bool {
        self.log(format!("done_xml_declaration({valid}, {span})"))
    }
}

impl AttListDeclReceiver for Recorder {
    fn set_name(&mut self, name: Span<'_>) -> bool {
        self.log(format!("set_element_name({name})"))
    }

    fn set_att_name(&mut self, name: Span<'_>) -> bool {
        self.log(format!("set_att_name({name})"))
    }

    fn set_att_type(&mut self, att_type: AttType) -> bool {
        self.log(format!("set_att_type({})", att_type.name()))
    }

    fn add_enumerated_type(&mut self) -> &mut dyn EnumeratedTypeReceiver {
        self.calls.push("add_enumerated_type".to_owned());
        self
    }

    fn set_default_decl_type(&mut self, decl_type: DefaultDeclType) -> bool {
        self.log(format!("set_default_decl_type({})", decl_type.name()))
    }

    fn add_attribute_value(&mut self) -> &mut dyn AttributeValueReceiver {
        self.calls.push("add_attribute_value".to_owned());
        self
    }

    fn done_att_list_decl(&mut self, valid: bool, span: Span<'_>) -> bool {
        self.log(format!("done_att_list_decl({valid}, {span})"))
    }
}

/// Sink that keeps one line per message: `line| Level: text`, prefixed
/// with the origin tag when there is one.
#[derive(Debug, Default)]
pub struct Transcript {
    pub lines: Vec<String>,
}

impl Transcript {
    pub fn text(&self) -> String {
        self.lines.join("\n")
    }
}

impl MessageSink for Transcript {
    fn give_message(&mut self, level: Level, text: &str) -> bool {
        self.lines.push(format!("{level}: {text}"));
        true
    }

    fn give_message_at_line(&mut self, level: Level, text: &str, line: u32) -> bool {
        self.lines.push(format!("{line}| {level}: {text}"));
        true
    }

    fn give_message_in_file(&mut self, level: Level, text: &str, file: &str, line: u32) -> bool {
        self.lines.push(format!("{file}:{line}| {level}: {text}"));
        true
    }
}
