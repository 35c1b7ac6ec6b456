//! Parser object, action dispatcher and main loop.
//!
//! Per input byte: the lexer table yields the next state, the parser table
//! maps the transition `(current, next)` to up to two action opcodes, and the
//! dispatcher executes them: mutating token state, firing handler callbacks,
//! and occasionally overriding the next lexer state (error recovery, entity
//! resume, script-mode switch). A dispatcher action may also demand that the
//! current byte be read again in the updated state; that re-read is how a
//! dirty entity terminator gets handed back to the state the entity
//! interrupted.
//!
//! Invariants:
//! - Chunk-equivalence: any partition of the input into `parse_chunk` calls
//!   produces the same event sequence, down to one-byte chunks.
//! - Fragments passed to the handler point into the live chunk or into the
//!   parser's own buffers, never elsewhere; they are valid for the duration
//!   of the callback.
//! - All input is consumed; malformed bytes surface as error events and
//!   recovery, never as a panic or a failed return.

use crate::action::{self, Action};
use crate::buffer::Buffer;
use crate::entity::decode_entity;
use crate::error::{ErrorKind, FatalError};
use crate::event::EventHandler;
use crate::lexer::{self, LexerState};
use crate::position::Position;
use crate::tag::{Tag, decode_tag};
use crate::token::{KeySlot, TokenSlot};
use crate::utf8;

/// Reserved parser flags.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u32)]
pub enum Flag {
    /// Reserved: deliver inner text as accumulated runs rather than single
    /// words. Not yet implemented; enabling it changes nothing.
    AccumulateInnertext = 1,
}

/// Set of [`Flag`]s.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Flags(u32);

impl Flags {
    pub const NONE: Flags = Flags(0);

    pub fn contains(self, flag: Flag) -> bool {
        self.0 & flag as u32 != 0
    }

    pub fn insert(&mut self, flag: Flag) {
        self.0 |= flag as u32;
    }

    pub fn remove(&mut self, flag: Flag) {
        self.0 &= !(flag as u32);
    }
}

/// Parser configuration.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Options {
    pub flags: Flags,
}

/// Internal parser state. Kept behind one allocation so `Parser` stays cheap
/// to move; opaque to consumers.
#[derive(Debug)]
struct ParserState {
    last_tag: Option<Tag>,
    last_error: Option<ErrorKind>,
    lexer: LexerState,
    /// One-slot stack: written on entity begin, read on entity end.
    saved_lexer: LexerState,
    token: TokenSlot,
    key: KeySlot,
    key_buf: Buffer,
    doc_begun: bool,
    ended: bool,
}

impl ParserState {
    fn new() -> Self {
        ParserState {
            last_tag: None,
            last_error: None,
            lexer: LexerState::Begin,
            saved_lexer: LexerState::Begin,
            token: TokenSlot::new(),
            key: KeySlot::None,
            key_buf: Buffer::new(),
            doc_begun: false,
            ended: false,
        }
    }
}

/// Streaming HTML5 tokenizer.
///
/// Feed input with [`parse_chunk`](Parser::parse_chunk) (any byte
/// partitioning) and close the document with [`finish`](Parser::finish), or
/// hand the whole input to [`parse`](Parser::parse). Events arrive at the
/// [`EventHandler`] synchronously, in input order.
pub struct Parser<H> {
    handler: H,
    options: Options,
    position: Position,
    state: Box<ParserState>,
}

impl<H: EventHandler> Parser<H> {
    pub fn new(handler: H) -> Self {
        Self::with_options(handler, Options::default())
    }

    pub fn with_options(handler: H, options: Options) -> Self {
        Parser {
            handler,
            options,
            position: Position::BEGIN,
            state: Box::new(ParserState::new()),
        }
    }

    /// Parse a whole document: one chunk, then end-of-document handling.
    pub fn parse(&mut self, input: &[u8]) -> Result<(), FatalError> {
        self.parse_chunk(input)?;
        self.finish()
    }

    /// Bind `chunk` as input and parse it, preserving any in-progress token,
    /// attribute key and entity across the boundary.
    ///
    /// `position.offset` restarts at 0 for each chunk; `row` and `col`
    /// continue.
    pub fn parse_chunk(&mut self, chunk: &[u8]) -> Result<(), FatalError> {
        self.parse_chunk_inner(chunk).inspect_err(|_| self.trap())
    }

    fn parse_chunk_inner(&mut self, chunk: &[u8]) -> Result<(), FatalError> {
        self.position.offset = 0;
        if self.state.token.in_token() {
            // Continuation: the stored prefix is in the token buffer, the
            // live range restarts at the top of the new chunk.
            self.state.token.rebind();
        }

        self.run(chunk)?;

        // The key may still point into the chunk we are about to give back.
        if let KeySlot::Chunk { .. } = self.state.key {
            let key = self
                .state
                .key
                .resolve(&self.state.key_buf, chunk)
                .unwrap_or(b"")
                .to_vec();
            self.state.key_buf.clear();
            self.state.key_buf.append(&key)?;
            self.state.key = KeySlot::Stored;
        }
        if self.state.token.in_token() {
            // Partial token: move it into owned storage.
            self.state.token.flush_partial(chunk)?;
        } else {
            // Completed token that nothing has consumed yet (a CDATA body
            // waiting for its closing bytes).
            self.state.token.stash_completed(chunk)?;
        }
        Ok(())
    }

    /// End the document: resolve a dangling entity, flush a trailing word of
    /// inner text, emit `document_end`, and trap the lexer. Idempotent.
    pub fn finish(&mut self) -> Result<(), FatalError> {
        self.finish_inner().inspect_err(|_| self.trap())
    }

    fn finish_inner(&mut self) -> Result<(), FatalError> {
        if self.state.ended {
            return Ok(());
        }

        // Input ended inside `&...`: treat it as a dirty entity end.
        if self.state.lexer == LexerState::Entity {
            let decoded = {
                let bytes = self.state.token.bytes(b"");
                let name_from = (self.state.token.entity_offset + 1).min(bytes.len());
                decode_entity(&bytes[name_from..])
            };
            match decoded {
                Some(codepoint) => {
                    let mut tmp = [0u8; utf8::MAX_LEN];
                    let n = utf8::encode(codepoint, &mut tmp).unwrap_or(0);
                    self.state.token.splice_entity(&tmp[..n])?;
                }
                None => {
                    self.emit_error(ErrorKind::UnknownEntity);
                    self.state.token.keep_raw_entity(b"")?;
                }
            }
            self.state.lexer = self.state.saved_lexer;
        }

        // A word of inner text cut off by the end of input is still a word.
        if self.state.lexer == LexerState::Innertext && !self.state.token.bytes(b"").is_empty() {
            self.handler.innertext(self.state.token.bytes(b""));
            self.state.token.clear();
        }

        if !self.state.doc_begun {
            self.state.doc_begun = true;
            self.handler.document_begin();
        }
        self.handler.document_end();
        self.state.ended = true;
        self.state.lexer = LexerState::End;
        Ok(())
    }

    /// Tag of the most recently opened or closed element.
    pub fn current_element_tag(&self) -> Option<Tag> {
        self.state.last_tag
    }

    /// Kind of the most recently reported error event.
    pub fn last_error(&self) -> Option<ErrorKind> {
        self.state.last_error
    }

    pub fn position(&self) -> Position {
        self.position
    }

    pub fn options(&self) -> Options {
        self.options
    }

    pub fn set_options(&mut self, options: Options) {
        self.options = options;
    }

    pub fn enable(&mut self, flag: Flag) {
        self.options.flags.insert(flag);
    }

    pub fn disable(&mut self, flag: Flag) {
        self.options.flags.remove(flag);
    }

    /// Replace the event handler; the previous one is returned.
    pub fn set_event_handler(&mut self, handler: H) -> H {
        std::mem::replace(&mut self.handler, handler)
    }

    pub fn handler(&self) -> &H {
        &self.handler
    }

    pub fn handler_mut(&mut self) -> &mut H {
        &mut self.handler
    }

    pub fn into_handler(self) -> H {
        self.handler
    }

    /// Re-initialize for a new document. Reuse without `reset` is not
    /// supported: after `finish` the parser ignores further input.
    pub fn reset(&mut self) {
        *self.state = ParserState::new();
        self.position = Position::BEGIN;
    }

    /// Permanent dead state entered after a fatal error.
    fn trap(&mut self) {
        self.state.lexer = LexerState::End;
        self.state.ended = true;
    }

    fn run(&mut self, input: &[u8]) -> Result<(), FatalError> {
        while self.position.offset < input.len() {
            // Runs of self-transitions carry no actions; skip them whole.
            if let Some(breaks) = lexer::run_break_bytes(self.state.lexer) {
                let rest = &input[self.position.offset..];
                let n = match *breaks {
                    [] => rest.len(),
                    [a] => memchr::memchr(a, rest).unwrap_or(rest.len()),
                    [a, b] => memchr::memchr2(a, b, rest).unwrap_or(rest.len()),
                    _ => 0,
                };
                if n > 0 {
                    self.position.advance_over(&rest[..n]);
                    continue;
                }
            }

            let byte = input[self.position.offset];
            let mut next = lexer::next_state(self.state.lexer, byte);
            #[cfg(any(test, feature = "debug-stats"))]
            {
                if next != self.state.lexer {
                    log::trace!(
                        target: "tagstream.lexer",
                        "{:?} -> {:?} on {:#04x} @{}",
                        self.state.lexer,
                        next,
                        byte,
                        self.position.offset
                    );
                }
            }

            let mut reread = false;
            for act in action::actions(self.state.lexer, next) {
                if act == Action::None {
                    continue;
                }
                if !self.dispatch(input, act, &mut next)? {
                    reread = true;
                    break;
                }
            }
            self.state.lexer = next;
            if !reread {
                self.position.advance(byte);
            }
        }
        Ok(())
    }

    /// Execute one action. Returns `false` when the current byte must be
    /// read again in the (already updated) next state.
    fn dispatch(
        &mut self,
        input: &[u8],
        act: Action,
        next: &mut LexerState,
    ) -> Result<bool, FatalError> {
        let at = self.position.offset;
        match act {
            Action::None | Action::Text => {}

            Action::DocumentBegin => {
                self.state.doc_begun = true;
                self.handler.document_begin();
            }
            Action::DocumentEnd => {
                self.handler.document_end();
            }

            Action::ElementOpen => {
                self.state.token.end(input, at, 0)?;
                let tag = decode_tag(self.state.token.bytes(input));
                self.state.last_tag = Some(tag);
                log::trace!(target: "tagstream.parser", "element open {tag:?}");
                self.handler.element_open(tag, self.state.token.bytes(input));
                self.state.token.clear();
            }
            Action::ElementClose => {
                self.state.token.end(input, at, 0)?;
                let tag = decode_tag(self.state.token.bytes(input));
                self.state.last_tag = Some(tag);
                log::trace!(target: "tagstream.parser", "element close {tag:?}");
                self.handler
                    .element_close(tag, self.state.token.bytes(input));
                self.state.token.clear();
            }

            Action::Attribute => {
                self.state.token.end(input, at, 0)?;
                {
                    let key = self
                        .state
                        .key
                        .resolve(&self.state.key_buf, input)
                        .unwrap_or(b"");
                    let value = self.state.token.bytes(input);
                    self.handler.attribute(key, Some(value));
                }
                self.state.key = KeySlot::None;
                self.state.token.clear();
            }
            Action::AttributeVoid => {
                self.state.token.end(input, at, 0)?;
                match self.state.key.resolve(&self.state.key_buf, input) {
                    Some(key) => self.handler.attribute(key, None),
                    None => self.handler.attribute(self.state.token.bytes(input), None),
                }
                self.state.key = KeySlot::None;
                self.state.token.clear();
            }
            Action::AttributeKey => {
                self.state.token.end(input, at, 0)?;
                if self.state.token.is_stored() {
                    // The value may need the token buffer; give the key its
                    // own copy now.
                    let key = self.state.token.bytes(input).to_vec();
                    self.state.key_buf.clear();
                    self.state.key_buf.append(&key)?;
                    self.state.token.clear();
                    self.state.key = KeySlot::Stored;
                } else {
                    let (start, end) = self.state.token.chunk_range();
                    self.state.key = KeySlot::Chunk { start, end };
                }
            }

            Action::Innertext => {
                self.state.token.end(input, at, 0)?;
                self.handler.innertext(self.state.token.bytes(input));
                self.state.token.clear();
            }
            Action::Comment => {
                // Trailing `--` is already consumed; the leading `-` is part
                // of the token by construction. Trim both.
                self.state.token.end(input, at, -2)?;
                let text = self.state.token.bytes(input);
                if text.len() > 1 {
                    self.handler.comment(&text[1..]);
                }
                self.state.token.clear();
            }
            Action::Cdata => {
                // Bounded earlier, at the `]]` lookahead.
                self.handler.cdata(self.state.token.bytes(input));
                self.state.token.clear();
            }
            Action::Doctype => {
                self.state.token.end(input, at, 0)?;
                self.handler.doctype(self.state.token.bytes(input));
                self.state.token.clear();
            }

            Action::EntityBegin | Action::InnertextEntityBegin => {
                if act == Action::InnertextEntityBegin {
                    self.state.saved_lexer = LexerState::Innertext;
                }
                self.state.token.begin_entity(input, at)?;
                if self.state.lexer == LexerState::AttrEquals {
                    // An entity directly after `=` starts an unquoted value.
                    self.state.saved_lexer = LexerState::AttrValue;
                } else if act != Action::InnertextEntityBegin {
                    self.state.saved_lexer = self.state.lexer;
                }
            }
            Action::Entity => {
                let dirty = *next == LexerState::EntityEndDirty;
                *next = self.state.saved_lexer;
                self.state.token.end(input, at, 0)?;
                let decoded = {
                    let bytes = self.state.token.bytes(input);
                    let name_from = (self.state.token.entity_offset + 1).min(bytes.len());
                    decode_entity(&bytes[name_from..])
                };
                match decoded {
                    Some(codepoint) => {
                        let mut tmp = [0u8; utf8::MAX_LEN];
                        let n = utf8::encode(codepoint, &mut tmp).unwrap_or(0);
                        self.state.token.splice_entity(&tmp[..n])?;
                        // Clean end: the token resumes after the `;`.
                        self.state.token.set_chunk_begin(at + 1);
                    }
                    None => {
                        self.emit_error(ErrorKind::UnknownEntity);
                        self.state.token.keep_raw_entity(input)?;
                        self.state.token.set_chunk_begin(at + 1);
                    }
                }
                if dirty || decoded.is_none() {
                    // The terminator belongs to the interrupted token (or to
                    // whatever follows); re-read it in the restored state.
                    self.state.token.set_chunk_begin(at);
                    return Ok(false);
                }
            }

            Action::Error => {
                self.emit_error(ErrorKind::SyntaxError);
                match self.state.lexer {
                    // Drop the offending byte but keep the surrounding
                    // context alive.
                    LexerState::Elem
                    | LexerState::ElemWs
                    | LexerState::AttrKey
                    | LexerState::AttrWs
                    | LexerState::AttrEquals
                    | LexerState::AttrValue => *next = self.state.lexer,
                    // `<!x`: treat `x...` as a regular element name.
                    LexerState::SpecialElem => {
                        *next = LexerState::Elem;
                        if !self.state.token.in_token() {
                            self.state.token.begin(at);
                        }
                    }
                    _ => {}
                }
            }

            Action::TokenBegin => {
                if !self.state.token.in_token() {
                    self.state.token.begin(at);
                }
            }
            Action::TokenEnd => {
                if self.state.token.in_token() {
                    self.state.token.end(input, at, 0)?;
                }
            }

            Action::ElementEnd => {
                if self.state.last_tag == Some(Tag::Script) {
                    // Script bodies are lexed by a parallel subgraph; the
                    // body token starts right after this `>`.
                    self.state.token.begin(at + 1);
                    self.state.token.script_end_mark = None;
                    *next = LexerState::Script;
                }
            }
            Action::VoidElementEnd => {}

            Action::ScriptEnd => {
                self.state.token.end(input, at, 0)?;
                {
                    let body = self.state.token.bytes(input);
                    let cut = self
                        .state
                        .token
                        .script_end_mark
                        .unwrap_or(body.len())
                        .min(body.len());
                    self.handler.script(&body[..cut]);
                }
                self.handler.element_close(Tag::Script, b"script");
                self.state.token.script_end_mark = None;
                self.state.token.clear();
            }
            Action::ScriptEndMark => {
                self.state.token.script_end_mark = Some(self.state.token.live_len(at));
            }

            Action::ResetLexer => return Ok(false),
            Action::SaveLexerState => self.state.saved_lexer = self.state.lexer,
            Action::RestoreLexerState => *next = self.state.saved_lexer,
            Action::SaveToken => {
                self.state.token.end(input, at, -1)?;
            }
        }
        Ok(true)
    }

    fn emit_error(&mut self, kind: ErrorKind) {
        self.state.last_error = Some(kind);
        log::trace!(target: "tagstream.parser", "{kind:?} at {:?}", self.position);
        self.handler.error(kind, self.position);
    }
}

impl<H: EventHandler + Default> Default for Parser<H> {
    fn default() -> Self {
        Parser::new(H::default())
    }
}
