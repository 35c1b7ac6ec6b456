//! No input may panic the parser or break its invariants. This is the
//! deterministic cousin of the libFuzzer targets in `fuzz/`.

mod common;

use common::{Sink, parse_byte_by_byte, parse_whole};
use tagstream::Parser;

/// Small deterministic generator so the corpus is stable across runs.
struct Lcg(u64);

impl Lcg {
    fn next_byte(&mut self) -> u8 {
        self.0 = self.0.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
        (self.0 >> 33) as u8
    }
}

const PREFIXES: &[&[u8]] = &[
    b"",
    b"<",
    b"<ht",
    b"<html",
    b"<p attr=",
    b"<p attr='",
    b"<!",
    b"<!--",
    b"<!DOCTYPE",
    b"<![CDATA[",
    b"<script>",
    b"<script>\"",
    b"</",
    b"&",
    b"&amp",
    b"&#x",
];

#[test]
fn random_tails_never_panic() {
    let mut rng = Lcg(0x5eed);
    for prefix in PREFIXES {
        for round in 0..8 {
            let mut input = prefix.to_vec();
            for _ in 0..(64 * (round + 1)) {
                input.push(rng.next_byte());
            }
            // Whole, then split into uneven chunks driven by the generator.
            let _ = parse_whole(&input);
            let mut parser = Parser::new(Sink::default());
            let mut rest = input.as_slice();
            while !rest.is_empty() {
                let take = (rng.next_byte() as usize % 7 + 1).min(rest.len());
                parser.parse_chunk(&rest[..take]).expect("chunk parse");
                rest = &rest[take..];
            }
            parser.finish().expect("finish");
        }
    }
}

#[test]
fn random_tails_are_chunk_invariant() {
    let mut rng = Lcg(0xfeedface);
    for prefix in PREFIXES {
        let mut input = prefix.to_vec();
        for _ in 0..96 {
            // Bias toward markup-significant bytes so interesting states are
            // actually reached.
            let b = match rng.next_byte() % 8 {
                0 => b'<',
                1 => b'>',
                2 => b'&',
                3 => b';',
                4 => b'"',
                5 => b' ',
                _ => b'a' + (rng.next_byte() % 26),
            };
            input.push(b);
        }
        assert_eq!(
            parse_byte_by_byte(&input),
            parse_whole(&input),
            "divergence for {:?}",
            String::from_utf8_lossy(&input)
        );
    }
}

#[test]
fn long_runs_exercise_the_skip_paths() {
    // Comment, CDATA and script bodies large enough that the memchr fast
    // paths are the ones doing the work.
    let mut comment = b"<!--".to_vec();
    comment.extend(std::iter::repeat_n(b'x', 100_000));
    comment.extend_from_slice(b"--><p>done</p>");
    let events = parse_whole(&comment);
    assert!(events.len() >= 4);

    let mut cdata = b"<![CDATA[".to_vec();
    cdata.extend(std::iter::repeat_n(b'y', 100_000));
    cdata.extend_from_slice(b"]]>");
    let events = parse_whole(&cdata);
    assert!(
        events
            .iter()
            .any(|e| matches!(e, common::Event::Cdata(s) if s.len() == 100_000))
    );

    let mut script = b"<script>\"".to_vec();
    script.extend(std::iter::repeat_n(b'z', 100_000));
    script.extend_from_slice(b"\"</script>");
    let events = parse_whole(&script);
    assert!(
        events
            .iter()
            .any(|e| matches!(e, common::Event::Script(s) if s.len() == 100_002))
    );
}
