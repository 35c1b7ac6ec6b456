//! Chunk-boundary invariance: any partition of the input must produce the
//! event sequence of a single-shot parse, including one-byte chunks.

mod common;

use common::{parse_byte_by_byte, parse_split, parse_whole};

/// Inputs chosen so that every kind of token state crosses a boundary
/// somewhere: entities mid-name, attribute keys awaiting values, comment and
/// CDATA terminators, script close-tag lookahead, doctype payloads.
const CORPUS: &[&[u8]] = &[
    b"<a href=\"x\">y</a>",
    b"<br/>",
    b"<p a b=1 c='d'>t</p>",
    b"foo &amp; bar",
    b"<!DOCTYPE html><html><body>hi</body></html>",
    b"<script>var s = \"</x>\"; a < b;</script>",
    b"<script>// close</script>tail",
    b"<script>/* multi\nline */ x = 1 < 2;</script>",
    b"<!--hi--><p>x</p>",
    b"<!--a-b--c-->",
    b"<![CDATA[raw<x>]]>",
    b"<![CDATA[a]b]]>",
    b"text &copy; 2024 &unknown; &#169; &#xA9; end",
    b"a&amp b",
    b"<p k=&amp;v>",
    b"<p k=&amp>",
    b"<a href=\"x&amp;y\" title='&lt;T&gt;'>link</a>",
    b"<input disabled><input a b c>",
    b"one two\n three\r\nfour",
    b"<DIV CLASS=\"a\">Mixed</DIV>",
    b"</p junk=1>after",
    b"<p \"='>x",
    b"<custom-x>y</custom-x>",
    b"<!xy>t",
    b"< p >spaced</ p >",
    b"leading text<p>then markup</p>",
    b"&#x1F600; emoji &#65;",
    b"<a href=''>empty</a>",
    b"<script>'</script>'</script>",
];

#[test]
fn every_two_way_split_matches_whole_parse() {
    for input in CORPUS {
        let whole = parse_whole(input);
        for at in 0..=input.len() {
            let split = parse_split(input, at);
            assert_eq!(
                split,
                whole,
                "split at {at} diverges for {:?}",
                String::from_utf8_lossy(input)
            );
        }
    }
}

#[test]
fn byte_by_byte_matches_whole_parse() {
    for input in CORPUS {
        let whole = parse_whole(input);
        let trickled = parse_byte_by_byte(input);
        assert_eq!(
            trickled,
            whole,
            "one-byte chunks diverge for {:?}",
            String::from_utf8_lossy(input)
        );
    }
}

#[test]
fn three_way_splits_match_whole_parse() {
    // Coarser than the exhaustive two-way pass but crosses two boundaries in
    // one run, which exercises buffer reuse across consecutive flushes.
    for input in CORPUS {
        let whole = parse_whole(input);
        let step = (input.len() / 3).max(1);
        for first in (0..input.len()).step_by(step) {
            for second in (first..=input.len()).step_by(step) {
                let events = common::parse_chunks(&[
                    &input[..first],
                    &input[first..second],
                    &input[second..],
                ]);
                assert_eq!(
                    events,
                    whole,
                    "splits at {first}/{second} diverge for {:?}",
                    String::from_utf8_lossy(input)
                );
            }
        }
    }
}

#[test]
fn empty_chunks_are_harmless() {
    for input in CORPUS {
        let whole = parse_whole(input);
        let mid = input.len() / 2;
        let events = common::parse_chunks(&[b"", &input[..mid], b"", &input[mid..], b""]);
        assert_eq!(events, whole);
    }
}

#[test]
fn positions_accumulate_across_chunks() {
    use tagstream::{NoopHandler, Parser};

    let mut parser = Parser::new(NoopHandler);
    parser.parse_chunk(b"ab\ncd").unwrap();
    let pos = parser.position();
    assert_eq!((pos.row, pos.col, pos.offset), (2, 3, 5));

    // Offset restarts per chunk; row and column carry over.
    parser.parse_chunk(b"e\nf").unwrap();
    let pos = parser.position();
    assert_eq!((pos.row, pos.col, pos.offset), (3, 2, 3));
}

#[test]
fn position_counts_every_byte_once() {
    use tagstream::{NoopHandler, Parser};

    let input = b"<p>a\nb</p> <!--\ncomment\n--> <script>\n// x\n</script>\n";
    let mut parser = Parser::new(NoopHandler);
    parser.parse_chunk(input).unwrap();
    let pos = parser.position();
    assert_eq!(pos.offset, input.len());
    let rows = 1 + input.iter().filter(|&&b| b == b'\n').count() as u32;
    assert_eq!(pos.row, rows);
}
