//! Parser state machine, defined on lexer transitions.
//!
//! Where the lexer maps `(state, byte)` to a state, the parser maps a
//! *transition* `(prev_state, next_state)` to up to two ordered action
//! opcodes. The dispatcher in [`crate::parser`] executes them; the second
//! slot covers transitions that complete one construct and start another in
//! the same byte (`<p a b>`: the `b` both ends the void attribute `a` and
//! begins the next key).
//!
//! The table is built once at first use. Later writes override earlier ones,
//! so the build runs from general rules (entering a token-carrying state
//! begins a token, entering `Error` reports a syntax error) to the exact
//! per-transition rules.

use crate::lexer::LexerState::{self, *};
use crate::lexer::N_STATES;
use once_cell::sync::Lazy;

/// Action opcodes, in dispatch order semantics.
///
/// `Text` is a historical no-op companion of `Innertext` and must stay a
/// no-op. `SaveToken`, `SaveLexerState` and `RestoreLexerState` are wired but
/// unused by the grammar, as is `ResetLexer` (the generic re-read request).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u8)]
pub(crate) enum Action {
    None = 0,
    DocumentBegin,
    DocumentEnd,
    ElementOpen,
    ElementClose,
    Attribute,
    AttributeVoid,
    AttributeKey,
    Innertext,
    Text,
    Comment,
    Cdata,
    Doctype,
    EntityBegin,
    InnertextEntityBegin,
    Entity,
    Error,
    TokenBegin,
    TokenEnd,
    ElementEnd,
    VoidElementEnd,
    ScriptEnd,
    /// Record the script-body length at a `<` that may start `</script>`.
    /// The token keeps accumulating; `ScriptEnd` truncates to the last mark,
    /// so a stray `<` in script data costs nothing.
    ScriptEndMark,
    SaveLexerState,
    RestoreLexerState,
    ResetLexer,
    SaveToken,
}

type Cell = [Action; 2];

struct ParserTable {
    cells: Box<[[Cell; N_STATES]; N_STATES]>,
}

impl ParserTable {
    fn build() -> Self {
        let mut t = ParserTable {
            cells: Box::new([[[Action::None; 2]; N_STATES]; N_STATES]),
        };

        // Leaving inner text completes a word; `Text` is the no-op second
        // half of that pair. Exact rules below override the reachable cases.
        for next in 0..N_STATES {
            t.cells[Innertext as usize][next] = [Action::Innertext, Action::Text];
        }
        // Entering `Error` from anywhere else is a syntax error.
        for prev in 0..N_STATES {
            if prev != Error as usize {
                t.cells[prev][Error as usize] = [Action::Error, Action::None];
            }
        }
        // The first transition out of `Begin` opens the document.
        for next in 0..N_STATES {
            if next != Begin as usize {
                t.cells[Begin as usize][next] = [Action::DocumentBegin, Action::None];
            }
        }
        // Entering a token-carrying state from outside begins a token.
        for target in [
            Elem,
            CloseElem,
            AttrKey,
            AttrValue,
            AttrSingleQuoteValue,
            AttrDoubleQuoteValue,
            Innertext,
        ] {
            for prev in 0..N_STATES {
                if prev != target as usize {
                    t.cells[prev][target as usize] = [Action::TokenBegin, Action::None];
                }
            }
        }
        // Entering the entity subgraph begins capturing the reference. From
        // text-bearing context the resume state is forced to inner text.
        for prev in 0..N_STATES {
            if prev != Entity as usize {
                t.cells[prev][Entity as usize] = [Action::EntityBegin, Action::None];
            }
        }
        for prev in [Whitespace, Innertext, ElemEnd, CloseElemEnd] {
            t.cells[prev as usize][Entity as usize] =
                [Action::InnertextEntityBegin, Action::None];
        }
        // `>` of an opening tag completes the element definition (attributes
        // included), except after `/` which is the void variant below.
        for prev in 0..N_STATES {
            if prev != CloseElemSelf as usize {
                t.cells[prev][ElemEnd as usize] = [Action::ElementEnd, Action::None];
            }
        }

        // Exact transition rules.
        t.set(CommentBegin, Comment, [Action::TokenBegin, Action::None]);
        t.set(DoctypeE, DoctypeDeclaration, [Action::TokenBegin, Action::None]);
        t.set(CdataLbracket2, Cdata, [Action::TokenBegin, Action::None]);
        t.set(Cdata, CdataRbracket1, [Action::TokenEnd, Action::None]);

        t.set(AttrKey, AttrWs, [Action::AttributeKey, Action::None]);
        t.set(AttrKey, AttrEquals, [Action::AttributeKey, Action::None]);
        t.set(AttrWs, AttrKey, [Action::AttributeVoid, Action::TokenBegin]);
        t.set(AttrWs, ElemEnd, [Action::AttributeVoid, Action::ElementEnd]);
        t.set(AttrWs, CloseElemSelf, [Action::AttributeVoid, Action::None]);
        t.set(AttrKey, ElemEnd, [Action::AttributeVoid, Action::ElementEnd]);
        t.set(AttrKey, CloseElemSelf, [Action::AttributeVoid, Action::None]);
        t.set(AttrEquals, ElemEnd, [Action::AttributeVoid, Action::ElementEnd]);
        t.set(AttrEquals, CloseElemSelf, [Action::AttributeVoid, Action::None]);

        t.set(AttrValue, ElemWs, [Action::Attribute, Action::None]);
        t.set(AttrValue, ElemEnd, [Action::Attribute, Action::ElementEnd]);
        t.set(AttrValue, CloseElemSelf, [Action::Attribute, Action::None]);
        t.set(AttrSingleQuoteValue, ElemWs, [Action::Attribute, Action::None]);
        t.set(AttrDoubleQuoteValue, ElemWs, [Action::Attribute, Action::None]);
        // Empty quoted values: begin and complete the token on the closing
        // quote.
        t.set(AttrSingleQuoteOpen, ElemWs, [Action::TokenBegin, Action::Attribute]);
        t.set(AttrDoubleQuoteOpen, ElemWs, [Action::TokenBegin, Action::Attribute]);

        t.set(Elem, ElemWs, [Action::ElementOpen, Action::None]);
        t.set(Elem, ElemEnd, [Action::ElementOpen, Action::ElementEnd]);
        t.set(Elem, CloseElemSelf, [Action::ElementOpen, Action::None]);
        t.set(CloseElemSelf, ElemEnd, [Action::VoidElementEnd, Action::None]);

        t.set(CloseElem, CloseElemEnd, [Action::ElementClose, Action::None]);
        t.set(CloseElem, CloseElemSkip, [Action::ElementClose, Action::None]);

        t.set(Innertext, Innertext, [Action::None, Action::None]);
        t.set(Innertext, Whitespace, [Action::Innertext, Action::None]);

        t.set(CommentEndDash2, ElemEnd, [Action::Comment, Action::None]);
        t.set(DoctypeDeclaration, ElemEnd, [Action::Doctype, Action::None]);
        t.set(CdataRbracket2, ElemEnd, [Action::Cdata, Action::None]);

        t.set(Entity, EntityEnd, [Action::Entity, Action::None]);
        t.set(Entity, EntityEndDirty, [Action::Entity, Action::None]);

        t.set(Script, ScriptLt, [Action::ScriptEndMark, Action::None]);
        t.set(ScriptSingleComment, ScriptLt, [Action::ScriptEndMark, Action::None]);
        t.set(ScriptT, ElemEnd, [Action::ScriptEnd, Action::None]);

        // Document begin composed with the entry action of the first state.
        t.set(Begin, Innertext, [Action::DocumentBegin, Action::TokenBegin]);
        t.set(Begin, Whitespace, [Action::DocumentBegin, Action::None]);
        t.set(Begin, ElemBegin, [Action::DocumentBegin, Action::None]);
        t.set(Begin, Entity, [Action::DocumentBegin, Action::InnertextEntityBegin]);

        t
    }

    #[inline]
    fn set(&mut self, prev: LexerState, next: LexerState, cell: Cell) {
        self.cells[prev as usize][next as usize] = cell;
    }
}

static TABLE: Lazy<ParserTable> = Lazy::new(ParserTable::build);

/// Actions for the lexer transition `prev -> next`, in dispatch order.
#[inline]
pub(crate) fn actions(prev: LexerState, next: LexerState) -> [Action; 2] {
    TABLE.cells[prev as usize][next as usize]
}
