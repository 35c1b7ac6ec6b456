//! Tag identification.
//!
//! Element names are mapped to a closed set of tag IDs by a transition table
//! indexed `[state][byte - FIRST_CHAR]` with an extra end-of-input column, in
//! the shape a perfect-hash generator would produce. The table is built once,
//! at first use, from the name list below. Lookup is ASCII case-insensitive;
//! anything not in the list decodes to [`Tag::Unknown`].
//!
//! The lexer is permissive about what may appear in a tag name (letters,
//! digits, `?`, `:`), so the decoder must tolerate arbitrary bytes: anything
//! outside the input range simply fails to `Unknown`.

use once_cell::sync::Lazy;

/// Known HTML tag, or [`Tag::Unknown`] for anything else.
///
/// `Script` affects lexing (the lexer switches into its script subgraph after
/// a `<script>` open tag); `Style` is distinguished for consumers but does
/// not change lexing. The remaining IDs exist for consumer convenience.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Tag {
    Unknown = 0,
    A,
    Abbr,
    Acronym,
    Address,
    Applet,
    Area,
    Article,
    Aside,
    Audio,
    B,
    Base,
    Basefont,
    Bdi,
    Bdo,
    Big,
    Blink,
    Blockquote,
    Body,
    Br,
    Button,
    Canvas,
    Caption,
    Center,
    Cite,
    Code,
    Col,
    Colgroup,
    Content,
    Data,
    Datalist,
    Dd,
    Del,
    Details,
    Dfn,
    Dialog,
    Dir,
    Div,
    Dl,
    Dt,
    Em,
    Embed,
    Fieldset,
    Figcaption,
    Figure,
    Font,
    Footer,
    Form,
    Frame,
    Frameset,
    H1,
    H2,
    H3,
    H4,
    H5,
    H6,
    Head,
    Header,
    Hgroup,
    Hr,
    Html,
    I,
    Iframe,
    Img,
    Input,
    Ins,
    Isindex,
    Kbd,
    Keygen,
    Label,
    Legend,
    Li,
    Link,
    Listing,
    Main,
    Map,
    Mark,
    Marquee,
    Math,
    Menu,
    Menuitem,
    Meta,
    Meter,
    Multicol,
    Nav,
    Nextid,
    Nobr,
    Noembed,
    Noframes,
    Noscript,
    Object,
    Ol,
    Optgroup,
    Option,
    Output,
    P,
    Param,
    Picture,
    Plaintext,
    Portal,
    Pre,
    Progress,
    Q,
    Rb,
    Rp,
    Rt,
    Rtc,
    Ruby,
    S,
    Samp,
    Script,
    Search,
    Section,
    Select,
    Shadow,
    Slot,
    Small,
    Source,
    Spacer,
    Span,
    Strike,
    Strong,
    Style,
    Sub,
    Summary,
    Sup,
    Svg,
    Table,
    Tbody,
    Td,
    Template,
    Textarea,
    Tfoot,
    Th,
    Thead,
    Time,
    Title,
    Tr,
    Track,
    Tt,
    U,
    Ul,
    Var,
    Video,
    Wbr,
    Xmp,
}

impl Tag {
    /// Canonical (lowercase) name of the tag; empty for `Unknown`.
    pub fn name(self) -> &'static str {
        match (self as usize).checked_sub(1) {
            Some(idx) => TAG_NAMES[idx].0,
            None => "",
        }
    }
}

/// Name list in discriminant order (`TAG_NAMES[i]` is the tag with
/// discriminant `i + 1`).
const TAG_NAMES: &[(&str, Tag)] = &[
    ("a", Tag::A),
    ("abbr", Tag::Abbr),
    ("acronym", Tag::Acronym),
    ("address", Tag::Address),
    ("applet", Tag::Applet),
    ("area", Tag::Area),
    ("article", Tag::Article),
    ("aside", Tag::Aside),
    ("audio", Tag::Audio),
    ("b", Tag::B),
    ("base", Tag::Base),
    ("basefont", Tag::Basefont),
    ("bdi", Tag::Bdi),
    ("bdo", Tag::Bdo),
    ("big", Tag::Big),
    ("blink", Tag::Blink),
    ("blockquote", Tag::Blockquote),
    ("body", Tag::Body),
    ("br", Tag::Br),
    ("button", Tag::Button),
    ("canvas", Tag::Canvas),
    ("caption", Tag::Caption),
    ("center", Tag::Center),
    ("cite", Tag::Cite),
    ("code", Tag::Code),
    ("col", Tag::Col),
    ("colgroup", Tag::Colgroup),
    ("content", Tag::Content),
    ("data", Tag::Data),
    ("datalist", Tag::Datalist),
    ("dd", Tag::Dd),
    ("del", Tag::Del),
    ("details", Tag::Details),
    ("dfn", Tag::Dfn),
    ("dialog", Tag::Dialog),
    ("dir", Tag::Dir),
    ("div", Tag::Div),
    ("dl", Tag::Dl),
    ("dt", Tag::Dt),
    ("em", Tag::Em),
    ("embed", Tag::Embed),
    ("fieldset", Tag::Fieldset),
    ("figcaption", Tag::Figcaption),
    ("figure", Tag::Figure),
    ("font", Tag::Font),
    ("footer", Tag::Footer),
    ("form", Tag::Form),
    ("frame", Tag::Frame),
    ("frameset", Tag::Frameset),
    ("h1", Tag::H1),
    ("h2", Tag::H2),
    ("h3", Tag::H3),
    ("h4", Tag::H4),
    ("h5", Tag::H5),
    ("h6", Tag::H6),
    ("head", Tag::Head),
    ("header", Tag::Header),
    ("hgroup", Tag::Hgroup),
    ("hr", Tag::Hr),
    ("html", Tag::Html),
    ("i", Tag::I),
    ("iframe", Tag::Iframe),
    ("img", Tag::Img),
    ("input", Tag::Input),
    ("ins", Tag::Ins),
    ("isindex", Tag::Isindex),
    ("kbd", Tag::Kbd),
    ("keygen", Tag::Keygen),
    ("label", Tag::Label),
    ("legend", Tag::Legend),
    ("li", Tag::Li),
    ("link", Tag::Link),
    ("listing", Tag::Listing),
    ("main", Tag::Main),
    ("map", Tag::Map),
    ("mark", Tag::Mark),
    ("marquee", Tag::Marquee),
    ("math", Tag::Math),
    ("menu", Tag::Menu),
    ("menuitem", Tag::Menuitem),
    ("meta", Tag::Meta),
    ("meter", Tag::Meter),
    ("multicol", Tag::Multicol),
    ("nav", Tag::Nav),
    ("nextid", Tag::Nextid),
    ("nobr", Tag::Nobr),
    ("noembed", Tag::Noembed),
    ("noframes", Tag::Noframes),
    ("noscript", Tag::Noscript),
    ("object", Tag::Object),
    ("ol", Tag::Ol),
    ("optgroup", Tag::Optgroup),
    ("option", Tag::Option),
    ("output", Tag::Output),
    ("p", Tag::P),
    ("param", Tag::Param),
    ("picture", Tag::Picture),
    ("plaintext", Tag::Plaintext),
    ("portal", Tag::Portal),
    ("pre", Tag::Pre),
    ("progress", Tag::Progress),
    ("q", Tag::Q),
    ("rb", Tag::Rb),
    ("rp", Tag::Rp),
    ("rt", Tag::Rt),
    ("rtc", Tag::Rtc),
    ("ruby", Tag::Ruby),
    ("s", Tag::S),
    ("samp", Tag::Samp),
    ("script", Tag::Script),
    ("search", Tag::Search),
    ("section", Tag::Section),
    ("select", Tag::Select),
    ("shadow", Tag::Shadow),
    ("slot", Tag::Slot),
    ("small", Tag::Small),
    ("source", Tag::Source),
    ("spacer", Tag::Spacer),
    ("span", Tag::Span),
    ("strike", Tag::Strike),
    ("strong", Tag::Strong),
    ("style", Tag::Style),
    ("sub", Tag::Sub),
    ("summary", Tag::Summary),
    ("sup", Tag::Sup),
    ("svg", Tag::Svg),
    ("table", Tag::Table),
    ("tbody", Tag::Tbody),
    ("td", Tag::Td),
    ("template", Tag::Template),
    ("textarea", Tag::Textarea),
    ("tfoot", Tag::Tfoot),
    ("th", Tag::Th),
    ("thead", Tag::Thead),
    ("time", Tag::Time),
    ("title", Tag::Title),
    ("tr", Tag::Tr),
    ("track", Tag::Track),
    ("tt", Tag::Tt),
    ("u", Tag::U),
    ("ul", Tag::Ul),
    ("var", Tag::Var),
    ("video", Tag::Video),
    ("wbr", Tag::Wbr),
    ("xmp", Tag::Xmp),
];

/// First byte of the decoder input range (`-`).
const FIRST_CHAR: u8 = b'-';
/// Last byte of the decoder input range (`z`).
const LAST_CHAR: u8 = b'z';
const RANGE: usize = (LAST_CHAR - FIRST_CHAR) as usize + 1;
/// One column per input byte plus the end-of-input column.
const COLS: usize = RANGE + 1;
const EOF_COL: usize = RANGE;
/// Cell value for "no transition".
const DEAD: u16 = u16::MAX;

struct TagFsm {
    cells: Vec<[u16; COLS]>,
}

impl TagFsm {
    fn build() -> Self {
        let mut cells: Vec<[u16; COLS]> = vec![[DEAD; COLS]];
        for &(name, tag) in TAG_NAMES {
            let mut state = 0usize;
            for &byte in name.as_bytes() {
                let col = (byte - FIRST_CHAR) as usize;
                let next = match cells[state][col] {
                    DEAD => {
                        cells.push([DEAD; COLS]);
                        let next = (cells.len() - 1) as u16;
                        cells[state][col] = next;
                        next
                    }
                    next => next,
                };
                if byte.is_ascii_lowercase() {
                    cells[state][(byte.to_ascii_uppercase() - FIRST_CHAR) as usize] = next;
                }
                state = next as usize;
            }
            debug_assert_eq!(
                cells[state][EOF_COL], DEAD,
                "duplicate tag name {name:?}"
            );
            cells[state][EOF_COL] = tag as u16;
        }
        TagFsm { cells }
    }
}

static FSM: Lazy<TagFsm> = Lazy::new(TagFsm::build);

/// Decode a raw element-name fragment to a tag ID.
pub fn decode_tag(name: &[u8]) -> Tag {
    let fsm = &*FSM;
    let mut state = 0usize;
    for &byte in name {
        if !(FIRST_CHAR..=LAST_CHAR).contains(&byte) {
            return Tag::Unknown;
        }
        match fsm.cells[state][(byte - FIRST_CHAR) as usize] {
            DEAD => return Tag::Unknown,
            next => state = next as usize,
        }
    }
    match fsm.cells[state][EOF_COL] {
        DEAD => Tag::Unknown,
        id => TAG_NAMES[id as usize - 1].1,
    }
}
