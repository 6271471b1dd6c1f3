//! Actions journaled by the XML grammars, and the small enums receivers see.

use std::fmt;

/// Which quote character delimited a literal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Quote {
    Single,
    Double,
}

impl Quote {
    pub fn byte(self) -> u8 {
        match self {
            Quote::Single => b'\'',
            Quote::Double => b'"',
        }
    }

    pub fn is_single(self) -> bool {
        self == Quote::Single
    }
}

/// The kind of a `&...;` reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RefType {
    /// `&name;`
    Entity,
    /// `&#123;`
    Digits,
    /// `&#x1F;`
    HexDigits,
}

impl RefType {
    pub fn name(self) -> &'static str {
        match self {
            RefType::Entity => "entity",
            RefType::Digits => "digits",
            RefType::HexDigits => "hexdigits",
        }
    }
}

impl fmt::Display for RefType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Attribute type in an `<!ATTLIST` definition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AttType {
    CData,
    Id,
    IdRef,
    IdRefs,
    Entity,
    Entities,
    NmToken,
    NmTokens,
    /// `NOTATION (a|b)` or `(a|b)`, delivered through
    /// [`add_enumerated_type`](crate::AttListDeclReceiver::add_enumerated_type).
    Enumerated,
}

impl AttType {
    /// Keyword types, longest spelling first so a prefix never wins.
    pub(crate) const KEYWORDS: [AttType; 8] = [
        AttType::IdRefs,
        AttType::IdRef,
        AttType::Id,
        AttType::Entities,
        AttType::Entity,
        AttType::NmTokens,
        AttType::NmToken,
        AttType::CData,
    ];

    pub fn name(self) -> &'static str {
        match self {
            AttType::CData => "CDATA",
            AttType::Id => "ID",
            AttType::IdRef => "IDREF",
            AttType::IdRefs => "IDREFS",
            AttType::Entity => "ENTITY",
            AttType::Entities => "ENTITIES",
            AttType::NmToken => "NMTOKEN",
            AttType::NmTokens => "NMTOKENS",
            AttType::Enumerated => "Enumerated",
        }
    }
}

impl fmt::Display for AttType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Default declaration of an attribute definition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DefaultDeclType {
    /// `#REQUIRED`
    Required,
    /// `#IMPLIED`
    Implied,
    /// `#FIXED 'value'`
    Fixed,
    /// `'value'`
    JustValue,
}

impl DefaultDeclType {
    pub fn name(self) -> &'static str {
        match self {
            DefaultDeclType::Required => "Required",
            DefaultDeclType::Implied => "Implied",
            DefaultDeclType::Fixed => "Fixed",
            DefaultDeclType::JustValue => "JustValue",
        }
    }
}

impl fmt::Display for DefaultDeclType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// What a journaled span means.
///
/// Construct-level actions (`AttributeValue`, `ExternalId`, ...) wrap the
/// whole construct; their children are the pieces inside it. `Invalid` marks
/// a recovery rule that skipped malformed content; any construct with an
/// `Invalid` below it is reported as not valid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum XmlAction {
    Name,
    Comment,
    /// Payload of a reference: the entity name or the digits.
    Reference(RefType),
    /// Name inside `%name;`.
    PeReference,
    /// Run of literal characters inside a quoted value.
    Value,
    AttributeValue(Quote),
    Attribute,
    EntityValue(Quote),
    Notation,
    Enumeration,
    EnumeratedType,
    PublicIdLiteral(Quote),
    SystemLiteral(Quote),
    ExternalId,
    Quote(Quote),
    EncName,
    EncodingDecl,
    VersionNumber(Quote),
    Standalone { yes: bool, quote: Quote },
    XmlDeclaration,
    AttName,
    AttType(AttType),
    DefaultDecl(DefaultDeclType),
    AttListDecl,
    Invalid,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keywords_are_longest_first() {
        let names: Vec<_> = AttType::KEYWORDS.iter().map(|t| t.name()).collect();
        for (i, name) in names.iter().enumerate() {
            for later in &names[i + 1..] {
                assert!(!later.starts_with(name), "{name} shadows {later}");
            }
        }
    }

    #[test]
    fn display_names() {
        assert_eq!(RefType::HexDigits.to_string(), "hexdigits");
        assert_eq!(AttType::NmTokens.to_string(), "NMTOKENS");
        assert_eq!(DefaultDeclType::JustValue.to_string(), "JustValue");
    }
}
