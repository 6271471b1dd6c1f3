//! Sinks and receivers that turn parse output into printable lines.

use sprig_config::ConfigReceiver;
use sprig_syntax::{Level, MessageSink, Span};
use sprig_xml::{
    AttListDeclReceiver, AttType, AttributeReceiver, AttributeValueReceiver, CommentReceiver,
    DefaultDeclType, EncodingDeclReceiver, EntityValueReceiver, EnumeratedTypeReceiver,
    ExternalIdReceiver, NameReceiver, PeReferenceReceiver, PublicIdReceiver, RefType,
    ReferenceReceiver, XmlDeclarationReceiver,
};

/// Collects diagnostics as `label:line: Level: text`.
#[derive(Debug)]
pub struct ConsoleSink {
    label: String,
    pub messages: Vec<String>,
}

impl ConsoleSink {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            messages: Vec::new(),
        }
    }

    fn location(&self, line: u32) -> String {
        if line == 0 {
            self.label.clone()
        } else {
            format!("{}:{line}", self.label)
        }
    }
}

impl MessageSink for ConsoleSink {
    fn give_message(&mut self, level: Level, text: &str) -> bool {
        self.give_message_at_line(level, text, 0)
    }

    fn give_message_at_line(&mut self, level: Level, text: &str, line: u32) -> bool {
        let location = self.location(line);
        self.messages.push(format!("{location}: {level}: {text}"));
        true
    }

    fn give_message_in_file(&mut self, level: Level, text: &str, file: &str, line: u32) -> bool {
        let location = self.location(line);
        self.messages.push(format!("{location}: {level}: {text} [{file}]"));
        true
    }
}

/// Receiver for every grammar that records each delivered item as a line.
#[derive(Debug, Default)]
pub struct EventLog {
    pub events: Vec<String>,
}

impl EventLog {
    fn push(&mut self, event: String) -> bool {
        self.events.push(event);
        true
    }
}

fn assignment(key: Span<'_>, value: Option<Span<'_>>) -> String {
    match value {
        Some(value) => format!("{key} = {:?}", value.text()),
        None => key.to_string(),
    }
}

fn quoting(single_quoted: bool) -> &'static str {
    if single_quoted { "single-quoted" } else { "double-quoted" }
}

fn validity(valid: bool) -> &'static str {
    if valid { "valid" } else { "invalid" }
}

impl ConfigReceiver for EventLog {
    fn add_global_key(&mut self, key: Span<'_>, value: Option<Span<'_>>) -> bool {
        self.push(format!("global {}", assignment(key, value)))
    }

    fn add_section(&mut self, name: Span<'_>) -> bool {
        self.push(format!("section [{name}]"))
    }

    fn add_section_key(&mut self, key: Span<'_>, value: Option<Span<'_>>) -> bool {
        self.push(format!("  key {}", assignment(key, value)))
    }

    fn parsed_config_file(&mut self, valid: bool) {
        self.events.push(format!("end of file ({})", validity(valid)));
    }
}

impl NameReceiver for EventLog {
    fn set_name(&mut self, name: Span<'_>) -> bool {
        self.push(format!("name {name}"))
    }
}

impl ReferenceReceiver for EventLog {
    fn set_reference(&mut self, ref_type: RefType, payload: Span<'_>) -> bool {
        self.push(format!("reference {ref_type} {payload}"))
    }
}

impl CommentReceiver for EventLog {
    fn set_comment(&mut self, content: Span<'_>) -> bool {
        self.push(format!("comment {:?}", content.text()))
    }
}

impl AttributeValueReceiver for EventLog {
    fn add_value(&mut self, value: Span<'_>) -> bool {
        self.push(format!("text {:?}", value.text()))
    }

    fn done_attribute_value(&mut self, valid: bool, single_quoted: bool, span: Span<'_>) -> bool {
        self.push(format!(
            "attribute value {span} ({}, {})",
            quoting(single_quoted),
            validity(valid)
        ))
    }
}

impl AttributeReceiver for EventLog {
    fn done_attribute(&mut self, valid: bool, span: Span<'_>) -> bool {
        self.push(format!("attribute {span} ({})", validity(valid)))
    }
}

impl PeReferenceReceiver for EventLog {
    fn add_pe_reference(&mut self, name: Span<'_>) -> bool {
        self.push(format!("parameter entity {name}"))
    }
}

impl EntityValueReceiver for EventLog {
    fn add_value(&mut self, value: Span<'_>) -> bool {
        self.push(format!("text {:?}", value.text()))
    }

    fn done_entity_value(&mut self, valid: bool, single_quoted: bool, span: Span<'_>) -> bool {
        self.push(format!(
            "entity value {span} ({}, {})",
            quoting(single_quoted),
            validity(valid)
        ))
    }
}

impl EnumeratedTypeReceiver for EventLog {
    fn add_notation(&mut self, name: Span<'_>) -> bool {
        self.push(format!("notation {name}"))
    }

    fn add_enumeration(&mut self, token: Span<'_>) -> bool {
        self.push(format!("enumeration {token}"))
    }

    fn done_enumerated_type(&mut self, valid: bool, span: Span<'_>) -> bool {
        self.push(format!("enumerated type {span} ({})", validity(valid)))
    }
}

impl PublicIdReceiver for EventLog {
    fn set_public_id_literal(&mut self, literal: Span<'_>, single_quoted: bool) -> bool {
        let literal = literal.text();
        self.push(format!("public id {literal:?} ({})", quoting(single_quoted)))
    }
}

impl ExternalIdReceiver for EventLog {
    fn set_system_literal(&mut self, literal: Span<'_>, single_quoted: bool) -> bool {
        let literal = literal.text();
        self.push(format!("system literal {literal:?} ({})", quoting(single_quoted)))
    }

    fn done_external_id(&mut self, valid: bool, span: Span<'_>) -> bool {
        self.push(format!("external id {span} ({})", validity(valid)))
    }
}

impl EncodingDeclReceiver for EventLog {
    fn set_enc_name(&mut self, name: Span<'_>) -> bool {
        self.push(format!("encoding {name}"))
    }

    fn done_encoding_decl(&mut self, valid: bool, single_quoted: bool, span: Span<'_>) -> bool {
        self.push(format!(
            "encoding declaration {span} ({}, {})",
            quoting(single_quoted),
            validity(valid)
        ))
    }
}

impl XmlDeclarationReceiver for EventLog {
    fn set_version_number(&mut self, single_quoted: bool, version: Span<'_>) -> bool {
        self.push(format!("version {version} ({})", quoting(single_quoted)))
    }

    fn set_is_standalone(&mut self, standalone: bool, single_quoted: bool) -> bool {
        self.push(format!("standalone {standalone} ({})", quoting(single_quoted)))
    }

    fn done_xml_declaration(&mut self, valid: bool, span: Span<'_>) -> bool {
        self.push(format!("xml declaration {span} ({})", validity(valid)))
    }
}

impl AttListDeclReceiver for EventLog {
    fn set_name(&mut self, name: Span<'_>) -> bool {
        self.push(format!("attribute list for {name}"))
    }

    fn set_att_name(&mut self, name: Span<'_>) -> bool {
        self.push(format!("  attribute {name}"))
    }

    fn set_att_type(&mut self, att_type: AttType) -> bool {
        self.push(format!("  type {att_type}"))
    }

    fn add_enumerated_type(&mut self) -> &mut dyn EnumeratedTypeReceiver {
        self
    }

    fn set_default_decl_type(&mut self, decl_type: DefaultDeclType) -> bool {
        self.push(format!("  default {decl_type}"))
    }

    fn add_attribute_value(&mut self) -> &mut dyn AttributeValueReceiver {
        self
    }

    fn done_att_list_decl(&mut self, valid: bool, span: Span<'_>) -> bool {
        self.push(format!("attribute list {span} ({})", validity(valid)))
    }
}
