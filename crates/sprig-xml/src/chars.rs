//! Character classes and small shared rules of the XML grammars.
//!
//! Input is matched byte by byte. Bytes `0x80..=0xFF` stand in for the
//! Latin-1 letters the name classes admit.

use sprig_syntax::{CharSet, Rule};

use crate::action::{Quote, XmlAction};

pub fn whitespace() -> CharSet {
    CharSet::from_bytes(b" \t\r\n")
}

pub fn letter() -> CharSet {
    CharSet::parse(b"a-zA-Z\xC0-\xD6\xD8-\xF6\xF8-\xFF")
}

pub fn first_name_char() -> CharSet {
    letter() | CharSet::from_bytes(b"_:")
}

pub fn name_char() -> CharSet {
    letter() | CharSet::digit() | CharSet::from_bytes(b"\xB7.-_:")
}

pub fn hex_digit() -> CharSet {
    CharSet::parse(b"0-9a-fA-F")
}

pub fn pubid_char() -> CharSet {
    CharSet::parse(b"a-zA-Z0-9") | CharSet::from_bytes(b" \r\n'()+,./:=?;!*#@$_%-")
}

pub fn version_char() -> CharSet {
    CharSet::parse(b"a-zA-Z0-9") | CharSet::from_bytes(b"_.:-")
}

pub fn enc_name_rest() -> CharSet {
    CharSet::alnum() | CharSet::from_bytes(b"._-")
}

/// One or more whitespace bytes.
pub fn spaces() -> Rule<XmlAction> {
    Rule::set(whitespace()).repeat1()
}

/// `S? '=' S?`
pub fn equals() -> Rule<XmlAction> {
    spaces()
        .optional()
        .then(Rule::byte(b'='))
        .then(spaces().optional())
}

pub fn quote(quote: Quote) -> Rule<XmlAction> {
    Rule::byte(quote.byte())
}

/// Skip recovery that runs to a NUL terminator.
///
/// A parsed range carries no terminator, so this only matches when the
/// caller's buffer holds a NUL. Malformed input therefore fails to parse
/// instead of being skipped.
pub fn skip_to_nul() -> Rule<XmlAction> {
    Rule::skip_to(CharSet::from_bytes(b"\0"))
}

/// Skip recovery that runs through the closing `quote`.
pub fn skip_to_quote(quote: Quote) -> Rule<XmlAction> {
    Rule::skip_to(CharSet::from_bytes(&[quote.byte()]))
}
