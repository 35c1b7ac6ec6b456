//! Event sink contract.
//!
//! The parser pushes fragments at a caller-supplied handler. Every method has
//! a no-op default, so a consumer implements only what it cares about (a link
//! extractor overrides `element_open` and `attribute` and nothing else).
//!
//! Fragment lifetime: the `&[u8]` arguments point either into the chunk
//! passed to the current parse call or into the parser's internal buffers.
//! They are valid only for the duration of the callback; copy them to keep
//! them. Fragments are raw bytes, not guaranteed UTF-8: the lexer is
//! byte-oriented and passes malformed input through.

use crate::error::ErrorKind;
use crate::position::Position;
use crate::tag::Tag;

/// Callbacks invoked synchronously from inside the parse loop.
///
/// Handlers must not re-enter the parser object they were installed on;
/// parsing a different document on a different parser from a callback is
/// fine.
pub trait EventHandler {
    /// The document has started (first byte of input seen).
    fn document_begin(&mut self) {}

    /// The document has ended ([`finish`](crate::Parser::finish) was called).
    fn document_end(&mut self) {}

    /// An opening tag. Fires as soon as the name is complete, before the
    /// element's attribute events.
    fn element_open(&mut self, _tag: Tag, _name: &[u8]) {}

    /// A closing tag.
    fn element_close(&mut self, _tag: Tag, _name: &[u8]) {}

    /// One attribute of the most recently opened element. A `None` value is
    /// a void attribute (`<input disabled>`).
    fn attribute(&mut self, _key: &[u8], _value: Option<&[u8]>) {}

    /// Comment body, without the `<!--` / `-->` delimiters.
    fn comment(&mut self, _text: &[u8]) {}

    /// One whitespace-delimited word of text outside any markup.
    fn innertext(&mut self, _text: &[u8]) {}

    /// CDATA section body, without the `<![CDATA[` / `]]>` delimiters.
    fn cdata(&mut self, _text: &[u8]) {}

    /// Doctype payload: everything between `<!DOCTYPE` and `>`, including
    /// the leading whitespace.
    fn doctype(&mut self, _text: &[u8]) {}

    /// Body of a `<script>` element, delivered whole when `</script>` is
    /// reached.
    fn script(&mut self, _body: &[u8]) {}

    /// A recoverable parse problem at `at`. The parser continues regardless.
    fn error(&mut self, _kind: ErrorKind, _at: Position) {}
}

/// Handler that ignores every event; the default for a parser built without
/// one.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct NoopHandler;

impl EventHandler for NoopHandler {}
