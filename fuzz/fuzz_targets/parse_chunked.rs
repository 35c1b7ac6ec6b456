#![no_main]

use libfuzzer_sys::fuzz_target;
use tagstream::{ErrorKind, EventHandler, Parser, Position, Tag};

/// Records events with owned payloads so chunked and whole parses can be
/// compared byte for byte.
#[derive(Default)]
struct Recorder {
    events: Vec<(u8, Vec<u8>)>,
}

impl EventHandler for Recorder {
    fn document_begin(&mut self) {
        self.events.push((0, Vec::new()));
    }
    fn document_end(&mut self) {
        self.events.push((1, Vec::new()));
    }
    fn element_open(&mut self, tag: Tag, name: &[u8]) {
        let mut payload = vec![tag as u8];
        payload.extend_from_slice(name);
        self.events.push((2, payload));
    }
    fn element_close(&mut self, tag: Tag, name: &[u8]) {
        let mut payload = vec![tag as u8];
        payload.extend_from_slice(name);
        self.events.push((3, payload));
    }
    fn attribute(&mut self, key: &[u8], value: Option<&[u8]>) {
        let mut payload = key.to_vec();
        payload.push(0);
        if let Some(value) = value {
            payload.extend_from_slice(value);
        }
        self.events.push((4, payload));
    }
    fn comment(&mut self, text: &[u8]) {
        self.events.push((5, text.to_vec()));
    }
    fn innertext(&mut self, text: &[u8]) {
        self.events.push((6, text.to_vec()));
    }
    fn cdata(&mut self, text: &[u8]) {
        self.events.push((7, text.to_vec()));
    }
    fn doctype(&mut self, text: &[u8]) {
        self.events.push((8, text.to_vec()));
    }
    fn script(&mut self, body: &[u8]) {
        self.events.push((9, body.to_vec()));
    }
    fn error(&mut self, kind: ErrorKind, _at: Position) {
        self.events.push((10, vec![kind as u8]));
    }
}

// First byte picks the chunk size; the rest is the document. The chunked
// event stream must equal the whole-parse event stream.
fuzz_target!(|data: &[u8]| {
    let Some((&step, input)) = data.split_first() else {
        return;
    };
    let step = step as usize % 13 + 1;

    let mut whole = Parser::new(Recorder::default());
    if whole.parse(input).is_err() {
        return;
    }

    let mut chunked = Parser::new(Recorder::default());
    for piece in input.chunks(step) {
        if chunked.parse_chunk(piece).is_err() {
            return;
        }
    }
    if chunked.finish().is_err() {
        return;
    }

    assert_eq!(
        whole.handler().events,
        chunked.handler().events,
        "event stream must be chunk-invariant"
    );
});
