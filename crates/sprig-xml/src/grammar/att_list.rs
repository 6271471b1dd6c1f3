//! `<!ATTLIST element (S name S type S default)* S? >`
//!
//! Each attribute definition runs inside an `attribute` breadcrumb, so
//! errors raised while matching it name the attribute they belong to.
//!
//! Enumerated types and default values are delivered to child receivers
//! obtained from the list receiver's factory methods.

use std::cell::Cell;

use sprig_syntax::{Journal, Rule};

use super::{Delivery, Node, attribute, enumerated, journal_valid, major, node_valid};
use crate::action::{AttType, DefaultDeclType, XmlAction};
use crate::chars::{skip_to_nul, spaces};
use crate::receivers::AttListDeclReceiver;

pub struct AttListDeclGrammar {
    rule: Rule<XmlAction>,
    valid: Cell<bool>,
}

impl AttListDeclGrammar {
    /// Builds on the shared name token and the enumerated type and attribute
    /// value rules.
    pub fn new(
        name: &Rule<XmlAction>,
        enumerated_type: &Rule<XmlAction>,
        attribute_value: &Rule<XmlAction>,
    ) -> Self {
        let att_name = name
            .clone()
            .action(XmlAction::AttName)
            .enter_scope("attribute")
            .prepare(major("Did not find attribute type within declaration."));

        let keyword = Rule::choice(
            AttType::KEYWORDS.map(|t| Rule::literal(t.name()).action(XmlAction::AttType(t))),
        );
        let att_type = keyword
            .or(enumerated_type.clone())
            .prepare(major("Did not find default declaration for attribute declaration."));

        let no_value = |keyword: &str, decl: DefaultDeclType| {
            Rule::literal(keyword).action(XmlAction::DefaultDecl(decl))
        };
        let fixed = Rule::literal("#FIXED")
            .then(spaces())
            .action(XmlAction::DefaultDecl(DefaultDeclType::Fixed))
            .prepare(major("Did not find value for attribute declaration."));
        let just_value = Rule::empty().action(XmlAction::DefaultDecl(DefaultDeclType::JustValue));
        let default_decl = no_value("#REQUIRED", DefaultDeclType::Required)
            .or(no_value("#IMPLIED", DefaultDeclType::Implied))
            .prepare(major("Did not find ending brace for attribute declaration."))
            .or(fixed.or(just_value).then(
                attribute_value
                    .clone()
                    .prepare(major("Did not find ending brace for attribute declaration.")),
            ));

        let definition =
            Rule::seq([spaces(), att_name, spaces(), att_type, spaces(), default_decl]).leave_scope();
        let content = Rule::seq([
            name.clone()
                .prepare(major("Did not find content for attribute declaration.")),
            definition.repeat(),
            spaces().optional().then(Rule::byte(b'>')).cancel(),
        ]);
        let skip = skip_to_nul()
            .send_now(major("Attribute declaration has invalid format."))
            .pop()
            .action(XmlAction::Invalid);

        Self {
            rule: Rule::literal("<!ATTLIST")
                .then(spaces())
                .push(major("Did not find name for attribute declaration."))
                .then(content.or(skip))
                .action(XmlAction::AttListDecl),
            valid: Cell::new(false),
        }
    }

    pub fn rule(&self) -> &Rule<XmlAction> {
        &self.rule
    }

    pub fn is_valid(&self) -> bool {
        self.valid.get()
    }

    pub(crate) fn replay(
        &self,
        journal: &Journal<'_, '_, XmlAction>,
        receiver: &mut dyn AttListDeclReceiver,
        out: &mut Delivery,
    ) -> bool {
        for node in journal.nodes() {
            if matches!(node.action(), XmlAction::AttListDecl) {
                deliver(&node, receiver, out);
            }
        }
        let valid = journal_valid(journal);
        self.valid.set(valid);
        valid
    }
}

fn deliver(node: &Node<'_, '_>, receiver: &mut dyn AttListDeclReceiver, out: &mut Delivery) {
    for child in node.children() {
        match *child.action() {
            XmlAction::Name => out.call("set_name", || receiver.set_name(child.span())),
            XmlAction::AttName => out.call("set_att_name", || receiver.set_att_name(child.span())),
            XmlAction::AttType(att_type) => out.call("set_att_type", || receiver.set_att_type(att_type)),
            XmlAction::EnumeratedType => {
                out.call("set_att_type", || receiver.set_att_type(AttType::Enumerated));
                if !out.is_detached() {
                    let mut child_out = Delivery::default();
                    enumerated::deliver(&child, receiver.add_enumerated_type(), &mut child_out);
                }
            }
            XmlAction::DefaultDecl(decl) => {
                out.call("set_default_decl_type", || receiver.set_default_decl_type(decl))
            }
            XmlAction::AttributeValue(_) => {
                if !out.is_detached() {
                    let mut child_out = Delivery::default();
                    attribute::deliver_value(&child, receiver.add_attribute_value(), &mut child_out);
                }
            }
            _ => {}
        }
    }
    let valid = node_valid(node);
    out.call("done_att_list_decl", || receiver.done_att_list_decl(valid, node.span()));
}

#[cfg(test)]
mod tests {
    use super::super::testing::{Recorder, Transcript};
    use crate::XmlParser;
    use insta::assert_snapshot;
    use pretty_assertions::assert_eq;
    use rstest::rstest;
    use sprig_syntax::ParseResult;

    #[rstest]
    #[case::name_only("<!ATTLIST abc.def >", ParseResult::AllValid)]
    #[case::name_only_tight("<!ATTLIST abc.def>", ParseResult::AllValid)]
    #[case::notation("<!ATTLIST a b NOTATION (a|b) #IMPLIED>", ParseResult::AllValid)]
    #[case::enumeration("<!ATTLIST a b ( a | b | x ) #IMPLIED >", ParseResult::AllValid)]
    #[case::cdata("<!ATTLIST abc def CDATA #REQUIRED>", ParseResult::AllValid)]
    #[case::id("<!ATTLIST abc def ID #REQUIRED>", ParseResult::AllValid)]
    #[case::idref("<!ATTLIST abc def IDREF #REQUIRED>", ParseResult::AllValid)]
    #[case::idrefs("<!ATTLIST abc def IDREFS #REQUIRED>", ParseResult::AllValid)]
    #[case::entity("<!ATTLIST abc def ENTITY #REQUIRED>", ParseResult::AllValid)]
    #[case::entities("<!ATTLIST abc def ENTITIES #REQUIRED>", ParseResult::AllValid)]
    #[case::nmtoken("<!ATTLIST abc def NMTOKEN #REQUIRED>", ParseResult::AllValid)]
    #[case::nmtokens("<!ATTLIST abc def NMTOKENS #REQUIRED>", ParseResult::AllValid)]
    #[case::just_value("<!ATTLIST abc def ID 'b'>", ParseResult::AllValid)]
    #[case::quoted_quote("<!ATTLIST abc def ID \"b 'c\">", ParseResult::AllValid)]
    #[case::fixed("<!ATTLIST abc def ID #FIXED 'b'>", ParseResult::AllValid)]
    #[case::fixed_empty("<!ATTLIST abc def ID #FIXED ''>", ParseResult::AllValid)]
    #[case::fixed_references("<!ATTLIST abc def ID #FIXED '&#000;&#xbc;'>", ParseResult::AllValid)]
    #[case::no_attribute_name("<!ATTLIST a ()>", ParseResult::NotParsed)]
    #[case::no_space_before_default("<!ATTLIST a NOTATION (a|b)#IMPLIED>", ParseResult::NotParsed)]
    #[case::space_after_bang("<! ATTLIST abc def CDATA #IMPLIED>", ParseResult::NotParsed)]
    #[case::lowercase_keyword("<!attlist abc def CDATA #IMPLIED>", ParseResult::NotParsed)]
    #[case::no_space_after_keyword("<!ATTLISTabc def CDATA #IMPLIED>", ParseResult::NotParsed)]
    #[case::unclosed_value("<!ATTLIST abc def ID 'b>", ParseResult::NotParsed)]
    #[case::bad_reference("<!ATTLIST abc def ID #FIXED '&;'>", ParseResult::NotParsed)]
    #[case::unquoted_value("<!ATTLIST abc def ID #FIXED A>", ParseResult::NotParsed)]
    #[case::lone_quote("<!ATTLIST abc def ID #FIXED '>", ParseResult::NotParsed)]
    #[case::empty("", ParseResult::EmptyData)]
    fn parses_att_list_decls(#[case] input: &str, #[case] expected: ParseResult) {
        let parser = XmlParser::new();
        let result =
            parser.parse_att_list_decl(input.as_bytes(), &mut Recorder::default(), &mut Transcript::default());
        assert_eq!(result, expected);
    }

    #[test]
    fn snapshot_definitions() {
        let parser = XmlParser::new();
        let mut recorder = Recorder::default();
        let result = parser.parse_att_list_decl(
            b"<!ATTLIST img src CDATA #REQUIRED kind (a|b) 'a' alt IDREF #FIXED \"x\">",
            &mut recorder,
            &mut Transcript::default(),
        );
        assert_eq!(result, ParseResult::AllValid);
        assert_snapshot!(recorder.log_text(), @r#"
        set_element_name(img)
        set_att_name(src)
        set_att_type(CDATA)
        set_default_decl_type(Required)
        set_att_name(kind)
        set_att_type(Enumerated)
        add_enumerated_type
        add_enumeration(a)
        add_enumeration(b)
        done_enumerated_type(true, (a|b))
        set_default_decl_type(JustValue)
        add_attribute_value
        add_value(a)
        done_attribute_value(true, true, 'a')
        set_att_name(alt)
        set_att_type(IDREF)
        set_default_decl_type(Fixed)
        add_attribute_value
        add_value(x)
        done_attribute_value(true, false, "x")
        done_att_list_decl(true, <!ATTLIST img src CDATA #REQUIRED kind (a|b) 'a' alt IDREF #FIXED "x">)
        "#);
    }

    #[test]
    fn failed_definition_leaves_the_last_prepared_message() {
        let parser = XmlParser::new();
        let mut sink = Transcript::default();
        let result = parser.parse_att_list_decl(
            b"<!ATTLIST abc\n def ID 'b>",
            &mut Recorder::default(),
            &mut sink,
        );
        assert_eq!(result, ParseResult::NotParsed);
        assert_eq!(
            sink.lines,
            vec![
                "xml:2| Major: Did not find default declaration for attribute declaration.",
                "0| Fatal: Unable to finish parsing data.",
            ]
        );
    }

    #[rstest]
    #[case::name_only(
        b"<!ATTLIST a\0".as_slice(),
        &[
            "xml:1| Major: Attribute declaration has invalid format.",
            "xml:1| Major: Did not find content for attribute declaration.",
        ]
    )]
    #[case::attribute_name_only(
        b"<!ATTLIST a b\0".as_slice(),
        &[
            "xml:1| Major: Attribute declaration has invalid format.",
            "xml:1| Major: Did not find attribute type within declaration.",
        ]
    )]
    #[case::trailing_bar(
        b"<!ATTLIST a b (x|\0".as_slice(),
        &[
            "1| Content: Inside attribute section for b on line 1 at char 13.",
            "xml:1| Major: Did not find name after '|' delimiter.",
            "1| Content: Inside attribute section for b on line 1 at char 13.",
            "xml:1| Major: Unable to parse enumerated type - skipping rest of content.",
            "xml:1| Major: Attribute declaration has invalid format.",
            "xml:1| Major: Did not find default declaration for attribute declaration.",
        ]
    )]
    fn malformed_declaration_skips_to_nul(#[case] input: &[u8], #[case] expected: &[&str]) {
        let parser = XmlParser::new();
        let mut sink = Transcript::default();
        let mut recorder = Recorder::default();
        let result = parser.parse_att_list_decl(input, &mut recorder, &mut sink);
        assert_eq!(result, ParseResult::NotValid);
        assert_eq!(sink.lines, expected);
        assert_eq!(recorder.calls.last().map(|c| c.starts_with("done_att_list_decl(false, ")), Some(true));
        assert_eq!(parser.driver().diagnostic_depth(), 0);
        assert_eq!(parser.driver().breadcrumb_depth(), 0);
    }

    #[test]
    fn detached_child_does_not_stop_the_parse() {
        let parser = XmlParser::new();
        // Refused from the first enumeration on. The list receiver is the same
        // recorder, so its next call is refused too.
        let mut recorder = Recorder::refusing_from(3);
        let result = parser.parse_att_list_decl(
            b"<!ATTLIST a b (x|y) #IMPLIED>",
            &mut recorder,
            &mut Transcript::default(),
        );
        assert_eq!(result, ParseResult::AllValid);
        assert_eq!(
            recorder.calls,
            vec![
                "set_element_name(a)",
                "set_att_name(b)",
                "set_att_type(Enumerated)",
                "add_enumerated_type",
                "add_enumeration(x)",
                "set_default_decl_type(Implied)",
            ]
        );
    }
}
