use criterion::{Criterion, black_box, criterion_group, criterion_main};
use tagstream::{EventHandler, Parser};

const BLOCK: &str = "<div class=\"box\" id=x><span>hello &amp; goodbye</span>\
<img src=pic.png alt='a picture'><!-- separator --></div>\n";

fn make_document(blocks: usize) -> Vec<u8> {
    let mut out = Vec::with_capacity(BLOCK.len() * blocks + 64);
    out.extend_from_slice(b"<!DOCTYPE html><html><body>");
    for _ in 0..blocks {
        out.extend_from_slice(BLOCK.as_bytes());
    }
    out.extend_from_slice(b"</body></html>");
    out
}

fn make_script_heavy(bytes: usize) -> Vec<u8> {
    let mut out = b"<script>".to_vec();
    while out.len() < bytes {
        out.extend_from_slice(b"var s = '</scri<pt'; // not a close\n");
    }
    out.extend_from_slice(b"</script>");
    out
}

/// Counts events so the tokenizer work cannot be optimized away.
#[derive(Default)]
struct Counter {
    events: u64,
}

impl EventHandler for Counter {
    fn element_open(&mut self, _: tagstream::Tag, _: &[u8]) {
        self.events += 1;
    }
    fn attribute(&mut self, _: &[u8], _: Option<&[u8]>) {
        self.events += 1;
    }
    fn innertext(&mut self, _: &[u8]) {
        self.events += 1;
    }
    fn script(&mut self, _: &[u8]) {
        self.events += 1;
    }
}

fn parse_counting(input: &[u8], chunk: usize) -> u64 {
    let mut parser = Parser::new(Counter::default());
    for piece in input.chunks(chunk.max(1)) {
        parser.parse_chunk(piece).expect("parse");
    }
    parser.finish().expect("finish");
    parser.into_handler().events
}

fn bench_whole_document(c: &mut Criterion) {
    let input = make_document(2_000);
    c.bench_function("tokenize_whole_document", |b| {
        b.iter(|| black_box(parse_counting(black_box(&input), input.len())));
    });
}

fn bench_small_chunks(c: &mut Criterion) {
    let input = make_document(2_000);
    c.bench_function("tokenize_1k_chunks", |b| {
        b.iter(|| black_box(parse_counting(black_box(&input), 1024)));
    });
}

fn bench_script_adversarial(c: &mut Criterion) {
    let input = make_script_heavy(1 << 20);
    c.bench_function("tokenize_script_heavy", |b| {
        b.iter(|| black_box(parse_counting(black_box(&input), input.len())));
    });
}

criterion_group!(
    benches,
    bench_whole_document,
    bench_small_chunks,
    bench_script_adversarial
);
criterion_main!(benches);
