use sprig_syntax::Span;

/// Destination for parsed config content.
///
/// Calls arrive in file order once the whole file has matched. Returning
/// `false` detaches the receiver: no further calls are made for that parse,
/// which finishes with the result it would have had anyway.
///
/// `value` is `None` for a key written without an assignment, and
/// `Some` (possibly empty) once the assignment delimiter is present. Quoted
/// values arrive without their quotes.
pub trait ConfigReceiver {
    /// A key that appears before the first section.
    fn add_global_key(&mut self, key: Span<'_>, value: Option<Span<'_>>) -> bool;

    fn add_section(&mut self, name: Span<'_>) -> bool;

    /// A key inside the most recent section.
    fn add_section_key(&mut self, key: Span<'_>, value: Option<Span<'_>>) -> bool;

    /// Sent last, unless the receiver detached.
    fn parsed_config_file(&mut self, valid: bool);
}
