//! Shared test support: an event-recording sink and chunked-parse drivers.

#![allow(dead_code)]

use tagstream::{ErrorKind, EventHandler, Parser, Position, Tag};

/// One recorded event. Error positions are omitted on purpose: `offset` is
/// chunk-relative, so recording it would make chunked and whole parses
/// trivially unequal.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Event {
    DocumentBegin,
    DocumentEnd,
    Open(Tag, String),
    Close(Tag, String),
    Attribute(String, Option<String>),
    Comment(String),
    Innertext(String),
    Cdata(String),
    Doctype(String),
    Script(String),
    Error(ErrorKind),
}

fn text(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes).into_owned()
}

#[derive(Default)]
pub struct Sink {
    pub events: Vec<Event>,
}

impl EventHandler for Sink {
    fn document_begin(&mut self) {
        self.events.push(Event::DocumentBegin);
    }
    fn document_end(&mut self) {
        self.events.push(Event::DocumentEnd);
    }
    fn element_open(&mut self, tag: Tag, name: &[u8]) {
        self.events.push(Event::Open(tag, text(name)));
    }
    fn element_close(&mut self, tag: Tag, name: &[u8]) {
        self.events.push(Event::Close(tag, text(name)));
    }
    fn attribute(&mut self, key: &[u8], value: Option<&[u8]>) {
        self.events
            .push(Event::Attribute(text(key), value.map(text)));
    }
    fn comment(&mut self, body: &[u8]) {
        self.events.push(Event::Comment(text(body)));
    }
    fn innertext(&mut self, word: &[u8]) {
        self.events.push(Event::Innertext(text(word)));
    }
    fn cdata(&mut self, body: &[u8]) {
        self.events.push(Event::Cdata(text(body)));
    }
    fn doctype(&mut self, decl: &[u8]) {
        self.events.push(Event::Doctype(text(decl)));
    }
    fn script(&mut self, body: &[u8]) {
        self.events.push(Event::Script(text(body)));
    }
    fn error(&mut self, kind: ErrorKind, _at: Position) {
        self.events.push(Event::Error(kind));
    }
}

/// Parse `input` in one call (chunk + finish) and return the events.
pub fn parse_whole(input: &[u8]) -> Vec<Event> {
    let mut parser = Parser::new(Sink::default());
    parser.parse(input).expect("parse must not fail");
    parser.into_handler().events
}

/// Parse `input` split into the given consecutive chunks, then finish.
pub fn parse_chunks(chunks: &[&[u8]]) -> Vec<Event> {
    let mut parser = Parser::new(Sink::default());
    for chunk in chunks {
        parser.parse_chunk(chunk).expect("chunk must not fail");
    }
    parser.finish().expect("finish must not fail");
    parser.into_handler().events
}

/// Parse `input` split at byte `at`, then finish.
pub fn parse_split(input: &[u8], at: usize) -> Vec<Event> {
    parse_chunks(&[&input[..at], &input[at..]])
}

/// Parse `input` one byte at a time, then finish.
pub fn parse_byte_by_byte(input: &[u8]) -> Vec<Event> {
    let mut parser = Parser::new(Sink::default());
    for byte in input {
        parser
            .parse_chunk(std::slice::from_ref(byte))
            .expect("chunk must not fail");
    }
    parser.finish().expect("finish must not fail");
    parser.into_handler().events
}
