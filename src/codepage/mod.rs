//! # Codepages
//!
//! Single-byte character tables the printer can be switched between with
//! `ESC t n`, and the per-profile [`CodepageTable`] that says which of them
//! a given printer offers and at which index.
//!
//! ## Byte Layout
//!
//! Every supported page keeps ASCII (0x00-0x7F) in its lower half, so only
//! the upper half differs between pages:
//!
//! ```text
//! 0x00 ─────── 0x7F │ 0x80 ─────────── 0xFF
//!   ASCII (shared)  │  page-specific glyphs
//! ```
//!
//! ## Supported Pages
//!
//! | Page | Notes |
//! |------|-------|
//! | CP437 | US, box drawing |
//! | CP850 | Western Europe |
//! | CP858 | CP850 + euro sign |
//! | CP865 | Nordic |
//! | CP866 | Cyrillic |
//! | CP1252 | Windows Latin 1 |
//! | ISO-8859-15 | Latin 9 |
//! | Katakana | Half-width katakana |
//!
//! Profiles may list encodings without a table here (e.g. `CP932`). They
//! stay in the [`CodepageTable`] for reference but are never selected for
//! text.

mod tables;

use std::fmt;

use tables::NONE;

/// A single-byte codepage this crate can encode text into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Codepage {
    Cp437,
    Cp850,
    Cp858,
    Cp865,
    Cp866,
    Cp1252,
    Iso8859_15,
    Katakana,
}

impl Codepage {
    /// All pages with a table, in a stable order.
    pub const ALL: [Codepage; 8] = [
        Codepage::Cp437,
        Codepage::Cp850,
        Codepage::Cp858,
        Codepage::Cp865,
        Codepage::Cp866,
        Codepage::Cp1252,
        Codepage::Iso8859_15,
        Codepage::Katakana,
    ];

    /// Look up a page by encoding name.
    ///
    /// Matching ignores case, `-`, `_` and spaces, and accepts the `PC` /
    /// `WPC` prefixes printer manuals use (`PC437`, `WPC1252`).
    ///
    /// ```
    /// use escpos_forge::codepage::Codepage;
    ///
    /// assert_eq!(Codepage::from_name("ISO_8859-15"), Some(Codepage::Iso8859_15));
    /// assert_eq!(Codepage::from_name("pc437"), Some(Codepage::Cp437));
    /// assert_eq!(Codepage::from_name("CP932"), None);
    /// ```
    pub fn from_name(name: &str) -> Option<Self> {
        let key = normalize_name(name);
        let key = key
            .strip_prefix("WPC")
            .or_else(|| key.strip_prefix("PC"))
            .map(|rest| format!("CP{rest}"))
            .unwrap_or(key);

        match key.as_str() {
            "CP437" => Some(Self::Cp437),
            "CP850" => Some(Self::Cp850),
            "CP858" => Some(Self::Cp858),
            "CP865" => Some(Self::Cp865),
            "CP866" => Some(Self::Cp866),
            "CP1252" | "WINDOWS1252" => Some(Self::Cp1252),
            "ISO885915" | "LATIN9" => Some(Self::Iso8859_15),
            "KATAKANA" => Some(Self::Katakana),
            _ => None,
        }
    }

    /// Canonical name, as used in capability databases.
    pub fn name(self) -> &'static str {
        match self {
            Self::Cp437 => "CP437",
            Self::Cp850 => "CP850",
            Self::Cp858 => "CP858",
            Self::Cp865 => "CP865",
            Self::Cp866 => "CP866",
            Self::Cp1252 => "CP1252",
            Self::Iso8859_15 => "ISO_8859-15",
            Self::Katakana => "Katakana",
        }
    }

    fn upper_half(self) -> &'static [char; 128] {
        match self {
            Self::Cp437 => &tables::CP437,
            Self::Cp850 => &tables::CP850,
            Self::Cp858 => &tables::CP858,
            Self::Cp865 => &tables::CP865,
            Self::Cp866 => &tables::CP866,
            Self::Cp1252 => &tables::CP1252,
            Self::Iso8859_15 => &tables::ISO_8859_15,
            Self::Katakana => &tables::KATAKANA,
        }
    }

    /// Encode one character, or `None` if this page has no byte for it.
    pub fn encode_char(self, ch: char) -> Option<u8> {
        if ch.is_ascii() {
            return Some(ch as u8);
        }
        self.upper_half()
            .iter()
            .position(|&c| c == ch && c != NONE)
            .map(|idx| 0x80 + idx as u8)
    }

    /// Whether this page can represent `ch`.
    #[inline]
    pub fn can_encode(self, ch: char) -> bool {
        self.encode_char(ch).is_some()
    }

    /// Decode one byte back to its character.
    pub fn decode_byte(self, byte: u8) -> Option<char> {
        if byte < 0x80 {
            return Some(byte as char);
        }
        match self.upper_half()[(byte - 0x80) as usize] {
            NONE => None,
            ch => Some(ch),
        }
    }

    /// Encode a whole string, failing on the first unmappable character.
    pub fn encode(self, s: &str) -> Option<Vec<u8>> {
        s.chars().map(|ch| self.encode_char(ch)).collect()
    }

    /// Decode bytes produced by [`Codepage::encode`].
    pub fn decode(self, bytes: &[u8]) -> Option<String> {
        bytes.iter().map(|&b| self.decode_byte(b)).collect()
    }
}

impl fmt::Display for Codepage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

fn normalize_name(name: &str) -> String {
    name.chars()
        .filter(|c| !matches!(c, '-' | '_' | ' '))
        .flat_map(char::to_uppercase)
        .collect()
}

// ============================================================================
// PROFILE CODEPAGE TABLE
// ============================================================================

/// One `ESC t n` slot of a printer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodepageEntry {
    /// Index sent as `n` in `ESC t n`
    pub id: u8,
    /// Encoding name as declared by the profile
    pub name: String,
    /// Table used to encode text, if this crate has one
    pub codepage: Option<Codepage>,
}

/// The codepages one printer offers, in priority order (ascending id).
///
/// Built once when a profile is resolved; read-only afterwards.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CodepageTable {
    entries: Vec<CodepageEntry>,
}

impl CodepageTable {
    /// Build a table from `(id, name)` pairs. Entries are sorted by id; a
    /// repeated id keeps the last name.
    pub fn new<I, S>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (u8, S)>,
        S: Into<String>,
    {
        let mut entries: Vec<CodepageEntry> = Vec::new();
        for (id, name) in pairs {
            let name = name.into();
            let entry = CodepageEntry {
                id,
                codepage: Codepage::from_name(&name),
                name,
            };
            match entries.iter_mut().find(|e| e.id == id) {
                Some(existing) => *existing = entry,
                None => entries.push(entry),
            }
        }
        entries.sort_by_key(|e| e.id);
        Self { entries }
    }

    /// All entries, lowest id first.
    pub fn entries(&self) -> &[CodepageEntry] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entry declared at `id`.
    pub fn get(&self, id: u8) -> Option<&CodepageEntry> {
        self.entries.iter().find(|e| e.id == id)
    }

    /// First entry (lowest id) whose encoding matches `name`.
    pub fn find_by_name(&self, name: &str) -> Option<&CodepageEntry> {
        let wanted = Codepage::from_name(name);
        let key = normalize_name(name);
        self.entries.iter().find(|e| match wanted {
            Some(cp) => e.codepage == Some(cp),
            None => normalize_name(&e.name) == key,
        })
    }

    /// First entry, in priority order, able to encode `ch`.
    pub fn first_encoding(&self, ch: char) -> Option<&CodepageEntry> {
        self.entries
            .iter()
            .find(|e| e.codepage.is_some_and(|cp| cp.can_encode(ch)))
    }

    /// Whether any entry uses `codepage`.
    pub fn contains(&self, codepage: Codepage) -> bool {
        self.entries.iter().any(|e| e.codepage == Some(codepage))
    }
}

// ============================================================================
// KATAKANA NORMALIZATION
// ============================================================================

const DAKUTEN: char = '\u{FF9E}';
const HANDAKUTEN: char = '\u{FF9F}';

/// Full-width katakana and punctuation with a direct half-width form.
const FULL_TO_HALF: [(char, char); 62] = [
    ('。', '｡'), ('「', '｢'), ('」', '｣'), ('、', '､'), ('・', '･'), ('ー', 'ｰ'),
    ('゛', 'ﾞ'), ('゜', 'ﾟ'),
    ('ァ', 'ｧ'), ('ア', 'ｱ'), ('ィ', 'ｨ'), ('イ', 'ｲ'), ('ゥ', 'ｩ'), ('ウ', 'ｳ'),
    ('ェ', 'ｪ'), ('エ', 'ｴ'), ('ォ', 'ｫ'), ('オ', 'ｵ'),
    ('カ', 'ｶ'), ('キ', 'ｷ'), ('ク', 'ｸ'), ('ケ', 'ｹ'), ('コ', 'ｺ'),
    ('サ', 'ｻ'), ('シ', 'ｼ'), ('ス', 'ｽ'), ('セ', 'ｾ'), ('ソ', 'ｿ'),
    ('タ', 'ﾀ'), ('チ', 'ﾁ'), ('ッ', 'ｯ'), ('ツ', 'ﾂ'), ('テ', 'ﾃ'), ('ト', 'ﾄ'),
    ('ナ', 'ﾅ'), ('ニ', 'ﾆ'), ('ヌ', 'ﾇ'), ('ネ', 'ﾈ'), ('ノ', 'ﾉ'),
    ('ハ', 'ﾊ'), ('ヒ', 'ﾋ'), ('フ', 'ﾌ'), ('ヘ', 'ﾍ'), ('ホ', 'ﾎ'),
    ('マ', 'ﾏ'), ('ミ', 'ﾐ'), ('ム', 'ﾑ'), ('メ', 'ﾒ'), ('モ', 'ﾓ'),
    ('ャ', 'ｬ'), ('ヤ', 'ﾔ'), ('ュ', 'ｭ'), ('ユ', 'ﾕ'), ('ョ', 'ｮ'), ('ヨ', 'ﾖ'),
    ('ラ', 'ﾗ'), ('リ', 'ﾘ'), ('ル', 'ﾙ'), ('レ', 'ﾚ'), ('ロ', 'ﾛ'),
    ('ワ', 'ﾜ'), ('ヲ', 'ｦ'),
];

/// Voiced (dakuten) full-width katakana; the unvoiced form is one code point lower.
const VOICED: [char; 21] = [
    'ガ', 'ギ', 'グ', 'ゲ', 'ゴ', 'ザ', 'ジ', 'ズ', 'ゼ', 'ゾ', 'ダ', 'ヂ', 'ヅ', 'デ', 'ド', 'バ',
    'ビ', 'ブ', 'ベ', 'ボ', 'ヴ',
];

/// Semi-voiced (handakuten) full-width katakana; the plain form is two code points lower.
const SEMI_VOICED: [char; 5] = ['パ', 'ピ', 'プ', 'ペ', 'ポ'];

fn half_width(ch: char) -> Option<char> {
    if ch == 'ン' {
        return Some('ﾝ');
    }
    FULL_TO_HALF.iter().find(|(full, _)| *full == ch).map(|(_, half)| *half)
}

/// Rewrite hiragana and full-width katakana as half-width katakana.
///
/// Voiced kana expand to two characters (base + `ﾞ`/`ﾟ`). Anything else is
/// returned unchanged.
///
/// ```
/// use escpos_forge::codepage::to_half_width_katakana;
///
/// assert_eq!(to_half_width_katakana("カタカナ"), "ｶﾀｶﾅ");
/// assert_eq!(to_half_width_katakana("がっこう"), "ｶﾞｯｺｳ");
/// ```
pub fn to_half_width_katakana(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        // Hiragana block maps onto katakana at +0x60
        let kata = match ch as u32 {
            0x3041..=0x3096 => char::from_u32(ch as u32 + 0x60).unwrap_or(ch),
            _ => ch,
        };
        if let Some(half) = half_width(kata) {
            out.push(half);
        } else if VOICED.contains(&kata) {
            let base = if kata == 'ヴ' { 'ウ' } else { prev_char(kata, 1) };
            match half_width(base) {
                Some(half) => {
                    out.push(half);
                    out.push(DAKUTEN);
                }
                None => out.push(ch),
            }
        } else if SEMI_VOICED.contains(&kata) {
            match half_width(prev_char(kata, 2)) {
                Some(half) => {
                    out.push(half);
                    out.push(HANDAKUTEN);
                }
                None => out.push(ch),
            }
        } else {
            out.push(ch);
        }
    }
    out
}

fn prev_char(ch: char, by: u32) -> char {
    char::from_u32(ch as u32 - by).unwrap_or(ch)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ascii_passthrough() {
        for cp in Codepage::ALL {
            assert_eq!(cp.encode("Hello, world!\n"), Some(b"Hello, world!\n".to_vec()));
        }
    }

    #[test]
    fn test_cp437_matches_known_bytes() {
        // "¿Qué?" → ¿=0xA8, Q=0x51, u=0x75, é=0x82, ?=0x3F
        assert_eq!(
            Codepage::Cp437.encode("¿Qué?"),
            Some(vec![0xA8, 0x51, 0x75, 0x82, 0x3F])
        );
        assert_eq!(Codepage::Cp437.encode("┌──┐"), Some(vec![0xDA, 0xC4, 0xC4, 0xBF]));
        assert_eq!(Codepage::Cp437.encode_char('€'), None);
    }

    #[test]
    fn test_euro_sign_placement() {
        assert_eq!(Codepage::Cp858.encode_char('€'), Some(0xD5));
        assert_eq!(Codepage::Cp850.encode_char('€'), None);
        assert_eq!(Codepage::Cp1252.encode_char('€'), Some(0x80));
        assert_eq!(Codepage::Iso8859_15.encode_char('€'), Some(0xA4));
    }

    #[test]
    fn test_cp1252_holes_are_unmapped() {
        for byte in [0x81, 0x8D, 0x8F, 0x90, 0x9D] {
            assert_eq!(Codepage::Cp1252.decode_byte(byte), None);
        }
    }

    #[test]
    fn test_cyrillic() {
        assert_eq!(Codepage::Cp866.encode("Привет"), Some(vec![0x8F, 0xE0, 0xA8, 0xA2, 0xA5, 0xE2]));
        assert_eq!(Codepage::Cp866.encode_char('é'), None);
    }

    #[test]
    fn test_katakana_page() {
        assert_eq!(Codepage::Katakana.encode("ｶﾀｶﾅ"), Some(vec![0xB6, 0xC0, 0xB6, 0xC5]));
        assert_eq!(Codepage::Katakana.decode_byte(0xE0), None);
    }

    #[test]
    fn test_decode_inverts_encode() {
        let text = "Grüße, Ørsted ½";
        let bytes = Codepage::Cp850.encode(text).unwrap();
        assert_eq!(Codepage::Cp850.decode(&bytes).as_deref(), Some(text));
    }

    #[test]
    fn test_name_normalization() {
        assert_eq!(Codepage::from_name("cp-858"), Some(Codepage::Cp858));
        assert_eq!(Codepage::from_name("WPC1252"), Some(Codepage::Cp1252));
        assert_eq!(Codepage::from_name("katakana"), Some(Codepage::Katakana));
        assert_eq!(Codepage::from_name("Unknown"), None);
        for cp in Codepage::ALL {
            assert_eq!(Codepage::from_name(cp.name()), Some(cp));
        }
    }

    #[test]
    fn test_table_sorted_by_id() {
        let table = CodepageTable::new([(16u8, "CP1252"), (0, "CP437"), (2, "CP850")]);
        let ids: Vec<u8> = table.entries().iter().map(|e| e.id).collect();
        assert_eq!(ids, vec![0, 2, 16]);
    }

    #[test]
    fn test_first_encoding_prefers_lowest_id() {
        let table = CodepageTable::new([(19u8, "CP858"), (16, "CP1252"), (0, "CP437")]);
        assert_eq!(table.first_encoding('a').map(|e| e.id), Some(0));
        assert_eq!(table.first_encoding('é').map(|e| e.id), Some(0));
        assert_eq!(table.first_encoding('€').map(|e| e.id), Some(16));
        assert_eq!(table.first_encoding('Ж'), None);
    }

    #[test]
    fn test_unknown_encodings_never_selected() {
        let table = CodepageTable::new([(0u8, "CP932"), (1, "CP437")]);
        assert_eq!(table.get(0).and_then(|e| e.codepage), None);
        assert_eq!(table.first_encoding('a').map(|e| e.id), Some(1));
        assert_eq!(table.find_by_name("cp932").map(|e| e.id), Some(0));
    }

    #[test]
    fn test_half_width_conversion() {
        assert_eq!(to_half_width_katakana("あいうえお"), "ｱｲｳｴｵ");
        assert_eq!(to_half_width_katakana("パン"), "ﾊﾟﾝ");
        assert_eq!(to_half_width_katakana("ヴ"), "ｳﾞ");
        assert_eq!(to_half_width_katakana("abc"), "abc");
    }
}
