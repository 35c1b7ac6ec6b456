//! Byte-level lexer state machine.
//!
//! The lexer is a pure transition table: `TABLE[state][byte]` gives the next
//! state, one byte at a time. It carries no token state of its own; tokens
//! and events fall out of the *transitions*, which the parser table in
//! [`crate::action`] maps to action opcodes.
//!
//! The table is built once, at first use, from the declarative rule list
//! below. Rules for one state are applied in order, later rules overriding
//! earlier ones, so each state lists its catch-all first, then character
//! classes, then single bytes.
//!
//! The grammar is deliberately looser than the HTML5 spec where real pages
//! are sloppy: tag names may contain digits, `?` and `:`, an unquoted
//! attribute value may contain `=`, and a character reference may end without
//! its `;` (the "dirty" entity states).

use once_cell::sync::Lazy;

/// Lexer states.
///
/// Grouped as: general bookkeeping, element open/close, the `<!` subgraph
/// (doctype, comment, CDATA), attributes, inner text, character references,
/// and the `<script>` subgraph which tracks strings and comments so that a
/// `</script>` inside them does not end the element.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u8)]
pub(crate) enum LexerState {
    Begin = 0,
    End,
    Whitespace,
    Error,

    ElemBegin,
    Elem,
    ElemEnd,
    ElemWs,

    CloseElemBegin,
    CloseElem,
    CloseElemSkip,
    CloseElemEnd,
    CloseElemSelf,

    SpecialElem,

    AttrKey,
    AttrWs,
    AttrEquals,
    AttrSingleQuoteOpen,
    AttrSingleQuoteValue,
    AttrDoubleQuoteOpen,
    AttrDoubleQuoteValue,
    AttrValue,

    Innertext,

    DoctypeD,
    DoctypeO,
    DoctypeC,
    DoctypeT,
    DoctypeY,
    DoctypeP,
    DoctypeE,
    DoctypeDeclaration,

    CommentBegin,
    Comment,
    CommentEndDash1,
    CommentEndDash2,

    CdataLbracket1,
    CdataC,
    CdataD,
    CdataA,
    CdataT,
    CdataA2,
    CdataLbracket2,
    Cdata,
    CdataRbracket1,
    CdataRbracket2,

    Entity,
    EntityEnd,
    EntityEndDirty,

    Script,
    ScriptSingleQuoteString,
    ScriptSingleQuoteStringEscape,
    ScriptDoubleQuoteString,
    ScriptDoubleQuoteStringEscape,
    ScriptCommentBegin,
    ScriptSingleComment,
    ScriptMultiComment,
    ScriptMultiCommentEnd,
    ScriptLt,
    ScriptSolidus,
    ScriptS,
    ScriptC,
    ScriptR,
    ScriptI,
    ScriptP,
    ScriptT,
}

pub(crate) const N_STATES: usize = 65;

/// Input pattern of one transition rule.
#[derive(Clone, Copy)]
enum On {
    /// Every byte.
    Any,
    /// ASCII whitespace: space, `\t`, `\n`, `\v`, `\f`, `\r`.
    Space,
    /// ASCII letters.
    Alpha,
    /// ASCII letters and digits.
    Alnum,
    /// ASCII digits.
    Digit,
    /// One exact byte.
    Byte(u8),
}

impl On {
    fn matches(self, byte: u8) -> bool {
        match self {
            On::Any => true,
            On::Space => matches!(byte, b' ' | b'\t' | b'\n' | 0x0B | 0x0C | b'\r'),
            On::Alpha => byte.is_ascii_alphabetic(),
            On::Alnum => byte.is_ascii_alphanumeric(),
            On::Digit => byte.is_ascii_digit(),
            On::Byte(b) => byte == b,
        }
    }
}

use LexerState::*;
use On::{Alnum, Alpha, Any, Byte, Digit, Space};

/// Transition rules, one `(state, input, next)` triple per line.
///
/// Text before the first element is inner text, and `#`/digits are legal
/// entity bytes, so that numeric character references lex; otherwise this is
/// the grammar of a tolerant real-world tokenizer, not a conforming one.
static RULES: &[(LexerState, On, LexerState)] = &[
    // Document begin.
    (Begin, Any, Innertext),
    (Begin, Space, Whitespace),
    (Begin, Byte(b'<'), ElemBegin),
    (Begin, Byte(b'&'), Entity),
    // Document end: trap state.
    (End, Any, End),
    // Whitespace between words and elements.
    (Whitespace, Any, Innertext),
    (Whitespace, Space, Whitespace),
    (Whitespace, Byte(b'<'), ElemBegin),
    (Whitespace, Byte(b'&'), Entity),
    // Error recovery: swallow until something that can restart the grammar.
    (Error, Any, Error),
    (Error, Byte(b'<'), ElemBegin),
    (Error, Byte(b'>'), Whitespace),
    // `<` seen. Tag-name bytes are permissive: many pages contain malformed
    // names and we prefer lexing them over erroring out.
    (ElemBegin, Any, Error),
    (ElemBegin, Space, ElemBegin),
    (ElemBegin, Alnum, Elem),
    (ElemBegin, Byte(b'?'), Elem),
    (ElemBegin, Byte(b':'), Elem),
    (ElemBegin, Byte(b'!'), SpecialElem),
    (ElemBegin, Byte(b'/'), CloseElemBegin),
    // Inside an opening tag name.
    (Elem, Any, Error),
    (Elem, Space, ElemWs),
    (Elem, Alnum, Elem),
    (Elem, Byte(b'?'), Elem),
    (Elem, Byte(b':'), Elem),
    (Elem, Byte(b'/'), CloseElemSelf),
    (Elem, Byte(b'>'), ElemEnd),
    // Whitespace after the tag name or a previous attribute.
    (ElemWs, Any, AttrKey),
    (ElemWs, Space, ElemWs),
    (ElemWs, Byte(b'/'), CloseElemSelf),
    (ElemWs, Byte(b'>'), ElemEnd),
    (ElemWs, Byte(b'='), Error),
    (ElemWs, Byte(b'\''), Error),
    (ElemWs, Byte(b'"'), Error),
    // Just after `>` of an opening tag.
    (ElemEnd, Any, Innertext),
    (ElemEnd, Space, Whitespace),
    (ElemEnd, Byte(b'<'), ElemBegin),
    (ElemEnd, Byte(b'&'), Entity),
    // `</` seen.
    (CloseElemBegin, Any, Error),
    (CloseElemBegin, Space, CloseElemBegin),
    (CloseElemBegin, Alnum, CloseElem),
    (CloseElemBegin, Byte(b':'), CloseElem),
    (CloseElemBegin, Byte(b'?'), CloseElem),
    // Inside a closing tag name.
    (CloseElem, Any, Error),
    (CloseElem, Space, CloseElemSkip),
    (CloseElem, Alnum, CloseElem),
    (CloseElem, Byte(b':'), CloseElem),
    (CloseElem, Byte(b'?'), CloseElem),
    (CloseElem, Byte(b'>'), CloseElemEnd),
    // After the closing tag name: attributes here are allowed but ignored.
    (CloseElemSkip, Any, CloseElemSkip),
    (CloseElemSkip, Byte(b'>'), CloseElemEnd),
    // Just after `>` of a closing tag.
    (CloseElemEnd, Any, Innertext),
    (CloseElemEnd, Space, Whitespace),
    (CloseElemEnd, Byte(b'<'), ElemBegin),
    (CloseElemEnd, Byte(b'&'), Entity),
    // `/` inside an opening tag: self-closing (void) element.
    (CloseElemSelf, Any, Error),
    (CloseElemSelf, Space, CloseElemSelf),
    (CloseElemSelf, Byte(b'>'), ElemEnd),
    // `<!` seen: doctype, comment or CDATA.
    (SpecialElem, Any, Error),
    (SpecialElem, Byte(b'D'), DoctypeD),
    (SpecialElem, Byte(b'd'), DoctypeD),
    (SpecialElem, Byte(b'['), CdataLbracket1),
    (SpecialElem, Byte(b'-'), CommentBegin),
    // Attribute key.
    (AttrKey, Any, AttrKey),
    (AttrKey, Space, AttrWs),
    (AttrKey, Byte(b'='), AttrEquals),
    (AttrKey, Byte(b'>'), ElemEnd),
    (AttrKey, Byte(b'/'), CloseElemSelf),
    (AttrKey, Byte(b'<'), Error),
    (AttrKey, Byte(b'\''), Error),
    (AttrKey, Byte(b'"'), Error),
    // Whitespace after an attribute key.
    (AttrWs, Any, AttrKey),
    (AttrWs, Space, AttrWs),
    (AttrWs, Byte(b'='), AttrEquals),
    (AttrWs, Byte(b'/'), CloseElemSelf),
    (AttrWs, Byte(b'>'), ElemEnd),
    (AttrWs, Byte(b'<'), Error),
    (AttrWs, Byte(b'\''), Error),
    (AttrWs, Byte(b'"'), Error),
    // `=` after an attribute key.
    (AttrEquals, Any, AttrValue),
    (AttrEquals, Space, AttrEquals),
    (AttrEquals, Byte(b'"'), AttrDoubleQuoteOpen),
    (AttrEquals, Byte(b'\''), AttrSingleQuoteOpen),
    (AttrEquals, Byte(b'>'), ElemEnd),
    (AttrEquals, Byte(b'`'), Error),
    (AttrEquals, Byte(b'<'), Error),
    (AttrEquals, Byte(b'&'), Entity),
    // Unquoted attribute value. `=` inside is tolerated: the mistake is too
    // common in the wild to reject.
    (AttrValue, Any, AttrValue),
    (AttrValue, Space, ElemWs),
    (AttrValue, Byte(b'>'), ElemEnd),
    (AttrValue, Byte(b'"'), Error),
    (AttrValue, Byte(b'`'), Error),
    (AttrValue, Byte(b'<'), Error),
    (AttrValue, Byte(b'&'), Entity),
    // Single-quoted attribute value.
    (AttrSingleQuoteOpen, Any, AttrSingleQuoteValue),
    (AttrSingleQuoteOpen, Byte(b'\''), ElemWs),
    (AttrSingleQuoteOpen, Byte(b'&'), Entity),
    (AttrSingleQuoteValue, Any, AttrSingleQuoteValue),
    (AttrSingleQuoteValue, Byte(b'&'), Entity),
    (AttrSingleQuoteValue, Byte(b'\''), ElemWs),
    // Double-quoted attribute value.
    (AttrDoubleQuoteOpen, Any, AttrDoubleQuoteValue),
    (AttrDoubleQuoteOpen, Byte(b'&'), Entity),
    (AttrDoubleQuoteOpen, Byte(b'"'), ElemWs),
    (AttrDoubleQuoteValue, Any, AttrDoubleQuoteValue),
    (AttrDoubleQuoteValue, Byte(b'&'), Entity),
    (AttrDoubleQuoteValue, Byte(b'"'), ElemWs),
    // Inner text, one whitespace-delimited word at a time.
    (Innertext, Any, Innertext),
    (Innertext, Space, Whitespace),
    (Innertext, Byte(b'<'), ElemBegin),
    (Innertext, Byte(b'&'), Entity),
    // `<!DOCTYPE`, letter by letter, either case.
    (DoctypeD, Any, Error),
    (DoctypeD, Byte(b'o'), DoctypeO),
    (DoctypeD, Byte(b'O'), DoctypeO),
    (DoctypeO, Any, Error),
    (DoctypeO, Byte(b'c'), DoctypeC),
    (DoctypeO, Byte(b'C'), DoctypeC),
    (DoctypeC, Any, Error),
    (DoctypeC, Byte(b't'), DoctypeT),
    (DoctypeC, Byte(b'T'), DoctypeT),
    (DoctypeT, Any, Error),
    (DoctypeT, Byte(b'y'), DoctypeY),
    (DoctypeT, Byte(b'Y'), DoctypeY),
    (DoctypeY, Any, Error),
    (DoctypeY, Byte(b'p'), DoctypeP),
    (DoctypeY, Byte(b'P'), DoctypeP),
    (DoctypeP, Any, Error),
    (DoctypeP, Byte(b'e'), DoctypeE),
    (DoctypeP, Byte(b'E'), DoctypeE),
    (DoctypeE, Any, Error),
    (DoctypeE, Space, DoctypeDeclaration),
    // Doctype payload: opaque to us, handed to the consumer as-is.
    (DoctypeDeclaration, Any, DoctypeDeclaration),
    (DoctypeDeclaration, Byte(b'>'), ElemEnd),
    // `<!-` then `<!--`.
    (CommentBegin, Any, Error),
    (CommentBegin, Byte(b'-'), Comment),
    (Comment, Any, Comment),
    (Comment, Byte(b'-'), CommentEndDash1),
    (CommentEndDash1, Any, Comment),
    (CommentEndDash1, Byte(b'-'), CommentEndDash2),
    (CommentEndDash2, Any, Comment),
    (CommentEndDash2, Byte(b'>'), ElemEnd),
    (CommentEndDash2, Byte(b'-'), CommentEndDash2),
    // `<![CDATA[`, letter by letter (case-sensitive, per the HTML5 spec).
    (CdataLbracket1, Any, Error),
    (CdataLbracket1, Byte(b'C'), CdataC),
    (CdataC, Any, Error),
    (CdataC, Byte(b'D'), CdataD),
    (CdataD, Any, Error),
    (CdataD, Byte(b'A'), CdataA),
    (CdataA, Any, Error),
    (CdataA, Byte(b'T'), CdataT),
    (CdataT, Any, Error),
    (CdataT, Byte(b'A'), CdataA2),
    (CdataA2, Any, Error),
    (CdataA2, Byte(b'['), CdataLbracket2),
    (CdataLbracket2, Any, Cdata),
    (CdataLbracket2, Byte(b']'), CdataRbracket1),
    (Cdata, Any, Cdata),
    (Cdata, Byte(b']'), CdataRbracket1),
    (CdataRbracket1, Any, Cdata),
    (CdataRbracket1, Byte(b']'), CdataRbracket2),
    (CdataRbracket2, Any, Cdata),
    (CdataRbracket2, Byte(b'>'), ElemEnd),
    // Character references. Anything outside the name alphabet ends the
    // reference "dirty" (without its `;`) and the terminator is re-read.
    (Entity, Any, EntityEndDirty),
    (Entity, Alpha, Entity),
    (Entity, Digit, Entity),
    (Entity, Byte(b'#'), Entity),
    (Entity, Byte(b';'), EntityEnd),
    (EntityEnd, Any, EntityEndDirty),
    (EntityEndDirty, Any, EntityEndDirty),
    // Script data. Strings and comments are tracked so `</script>` inside
    // them does not close the element.
    (Script, Any, Script),
    (Script, Byte(b'\''), ScriptSingleQuoteString),
    (Script, Byte(b'"'), ScriptDoubleQuoteString),
    (Script, Byte(b'<'), ScriptLt),
    (Script, Byte(b'/'), ScriptCommentBegin),
    (ScriptSingleQuoteString, Any, ScriptSingleQuoteString),
    (ScriptSingleQuoteString, Byte(b'\\'), ScriptSingleQuoteStringEscape),
    (ScriptSingleQuoteString, Byte(b'\''), Script),
    (ScriptSingleQuoteStringEscape, Any, ScriptSingleQuoteString),
    (ScriptDoubleQuoteString, Any, ScriptDoubleQuoteString),
    (ScriptDoubleQuoteString, Byte(b'\\'), ScriptDoubleQuoteStringEscape),
    (ScriptDoubleQuoteString, Byte(b'"'), Script),
    (ScriptDoubleQuoteStringEscape, Any, ScriptDoubleQuoteString),
    (ScriptCommentBegin, Any, Script),
    (ScriptCommentBegin, Byte(b'/'), ScriptSingleComment),
    (ScriptCommentBegin, Byte(b'*'), ScriptMultiComment),
    (ScriptSingleComment, Any, ScriptSingleComment),
    (ScriptSingleComment, Byte(b'\n'), Script),
    // Seen in wild pages: a `</script>` on a `//` comment line still closes.
    (ScriptSingleComment, Byte(b'<'), ScriptLt),
    (ScriptMultiComment, Any, ScriptMultiComment),
    (ScriptMultiComment, Byte(b'*'), ScriptMultiCommentEnd),
    (ScriptMultiCommentEnd, Any, ScriptMultiComment),
    (ScriptMultiCommentEnd, Byte(b'/'), Script),
    // `</script>` recognizer, whitespace-tolerant and case-insensitive.
    (ScriptLt, Any, Script),
    (ScriptLt, Space, ScriptLt),
    (ScriptLt, Byte(b'/'), ScriptSolidus),
    (ScriptSolidus, Any, Script),
    (ScriptSolidus, Space, ScriptSolidus),
    (ScriptSolidus, Byte(b's'), ScriptS),
    (ScriptSolidus, Byte(b'S'), ScriptS),
    (ScriptS, Any, Script),
    (ScriptS, Byte(b'c'), ScriptC),
    (ScriptS, Byte(b'C'), ScriptC),
    (ScriptC, Any, Script),
    (ScriptC, Byte(b'r'), ScriptR),
    (ScriptC, Byte(b'R'), ScriptR),
    (ScriptR, Any, Script),
    (ScriptR, Byte(b'i'), ScriptI),
    (ScriptR, Byte(b'I'), ScriptI),
    (ScriptI, Any, Script),
    (ScriptI, Byte(b'p'), ScriptP),
    (ScriptI, Byte(b'P'), ScriptP),
    (ScriptP, Any, Script),
    (ScriptP, Byte(b't'), ScriptT),
    (ScriptP, Byte(b'T'), ScriptT),
    (ScriptT, Any, Script),
    (ScriptT, Space, ScriptT),
    (ScriptT, Byte(b'>'), ElemEnd),
];

static TABLE: Lazy<Box<[[LexerState; 256]; N_STATES]>> = Lazy::new(|| {
    let mut table = Box::new([[LexerState::Error; 256]; N_STATES]);
    for &(state, on, next) in RULES {
        let row = &mut table[state as usize];
        for (byte, cell) in row.iter_mut().enumerate() {
            if on.matches(byte as u8) {
                *cell = next;
            }
        }
    }
    table
});

/// Advance the lexer by one byte.
#[inline]
pub(crate) fn next_state(state: LexerState, byte: u8) -> LexerState {
    TABLE[state as usize][byte as usize]
}

/// Bytes that can leave `state`, for states whose self-transitions carry no
/// parser action. The main loop may skip ahead to the next such byte with
/// `memchr` instead of stepping the table. An empty slice means nothing
/// leaves the state (a trap): the rest of the chunk can be consumed at once.
pub(crate) fn run_break_bytes(state: LexerState) -> Option<&'static [u8]> {
    match state {
        End => Some(b""),
        Error => Some(b"<>"),
        CloseElemSkip => Some(b">"),
        DoctypeDeclaration => Some(b">"),
        Comment => Some(b"-"),
        Cdata => Some(b"]"),
        ScriptSingleQuoteString => Some(b"'\\"),
        ScriptDoubleQuoteString => Some(b"\"\\"),
        ScriptSingleComment => Some(b"\n<"),
        ScriptMultiComment => Some(b"*"),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::LexerState::*;
    use super::{N_STATES, next_state, run_break_bytes};

    #[test]
    fn state_count_matches_table() {
        assert_eq!(ScriptT as usize + 1, N_STATES);
    }

    #[test]
    fn document_start_transitions() {
        assert_eq!(next_state(Begin, b'<'), ElemBegin);
        assert_eq!(next_state(Begin, b' '), Whitespace);
        assert_eq!(next_state(Begin, b'x'), Innertext);
        assert_eq!(next_state(Begin, b'&'), Entity);
    }

    #[test]
    fn element_name_is_permissive() {
        assert_eq!(next_state(ElemBegin, b'a'), Elem);
        assert_eq!(next_state(ElemBegin, b'?'), Elem);
        assert_eq!(next_state(Elem, b'1'), Elem);
        assert_eq!(next_state(Elem, b':'), Elem);
        assert_eq!(next_state(Elem, b'@'), Error);
        assert_eq!(next_state(Elem, b'>'), ElemEnd);
        assert_eq!(next_state(Elem, b'/'), CloseElemSelf);
    }

    #[test]
    fn unquoted_value_tolerates_equals() {
        assert_eq!(next_state(AttrValue, b'='), AttrValue);
        assert_eq!(next_state(AttrValue, b'"'), Error);
        assert_eq!(next_state(AttrValue, b' '), ElemWs);
    }

    #[test]
    fn entity_alphabet_includes_numeric_references() {
        assert_eq!(next_state(Entity, b'a'), Entity);
        assert_eq!(next_state(Entity, b'Z'), Entity);
        assert_eq!(next_state(Entity, b'#'), Entity);
        assert_eq!(next_state(Entity, b'9'), Entity);
        assert_eq!(next_state(Entity, b';'), EntityEnd);
        assert_eq!(next_state(Entity, b' '), EntityEndDirty);
        assert_eq!(next_state(Entity, b'<'), EntityEndDirty);
    }

    #[test]
    fn script_close_recognizer_is_case_insensitive() {
        let mut state = Script;
        for &b in b"</ScRiPt" {
            state = next_state(state, b);
        }
        assert_eq!(state, ScriptT);
        assert_eq!(next_state(state, b'>'), ElemEnd);
    }

    #[test]
    fn script_strings_hide_close_tags() {
        let mut state = Script;
        for &b in b"\"</script>\"" {
            state = next_state(state, b);
        }
        assert_eq!(state, Script);
    }

    #[test]
    fn run_break_bytes_agree_with_table() {
        // Every byte outside the break set must be a self-transition, or the
        // fast path would skip over a state change.
        for (state, breaks) in [
            (Error, b"<>".as_slice()),
            (CloseElemSkip, b">"),
            (DoctypeDeclaration, b">"),
            (Comment, b"-"),
            (Cdata, b"]"),
            (ScriptSingleQuoteString, b"'\\"),
            (ScriptDoubleQuoteString, b"\"\\"),
            (ScriptSingleComment, b"\n<"),
            (ScriptMultiComment, b"*"),
            (End, b""),
        ] {
            assert_eq!(run_break_bytes(state), Some(breaks));
            for byte in 0..=255u8 {
                if !breaks.contains(&byte) {
                    assert_eq!(
                        next_state(state, byte),
                        state,
                        "state {state:?} must self-loop on byte {byte:#x}"
                    );
                }
            }
        }
    }
}
