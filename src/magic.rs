//! # Magic Encode
//!
//! Turns arbitrary Unicode text into single-byte runs for the printer,
//! switching codepages (`ESC t n`) whenever the active one cannot
//! represent the next character.
//!
//! ## Selection Rule
//!
//! The scan is greedy, not globally optimal:
//!
//! 1. If the active codepage can encode the character, stay on it.
//! 2. Otherwise take the first codepage in the profile's priority order
//!    (ascending `ESC t` index) that can encode it, and switch.
//! 3. If none can, apply the [`ErrorPolicy`].
//!
//! While no codepage has been selected yet, characters every page shares
//! (ASCII) are held back until a character that decides the page arrives,
//! so a session's first run costs one switch rather than two.
//!
//! When the state is forced to one codepage, step 2 is skipped.
//!
//! ## State
//!
//! [`EncodingState`] belongs to one printer session. The encoder never
//! keeps it: each call takes `&mut EncodingState` and commits the new
//! state only if the call succeeds.
//!
//! ## Example
//!
//! ```
//! use escpos_forge::magic::{EncodingState, MagicEncoder, MagicEncodeConfig};
//! use escpos_forge::profile::CapabilityDatabase;
//!
//! let db = CapabilityDatabase::builtin().unwrap();
//! let encoder = MagicEncoder::new(db.resolve("TM-T88V").unwrap(), MagicEncodeConfig::default());
//! let mut state = EncodingState::default();
//!
//! let bytes = encoder.encode_bytes(&mut state, "Grüße €5").unwrap();
//! assert_eq!(&bytes[..3], &[0x1B, 0x74, 0x00]); // CP437 first
//! ```

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::codepage::{self, Codepage};
use crate::error::{EscposError, Result};
use crate::profile::CapabilityProfile;
use crate::protocol::commands;

// ============================================================================
// STATE AND CONFIGURATION
// ============================================================================

/// Codepage state of one printer session.
///
/// | `current` | `forced` | Meaning |
/// |-----------|----------|---------|
/// | `None` | `false` | Auto, nothing selected yet |
/// | `Some(n)` | `false` | Auto, printer is on page `n` |
/// | `Some(n)` | `true` | Pinned to page `n` |
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EncodingState {
    current: Option<u8>,
    forced: bool,
}

impl EncodingState {
    /// Auto mode with the printer known to be on codepage `id`.
    pub fn with_codepage(id: u8) -> Self {
        Self {
            current: Some(id),
            forced: false,
        }
    }

    /// The `ESC t` index the printer is on, if known.
    pub fn current_codepage(&self) -> Option<u8> {
        self.current
    }

    pub fn is_forced(&self) -> bool {
        self.forced
    }

    /// Forget the selected codepage, e.g. after `ESC @`.
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// What to do with a character no available codepage can encode.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorPolicy {
    /// Fail the whole call with [`EscposError::CodepageNotFound`]
    #[default]
    Fail,
    /// Print this character instead
    Substitute(char),
}

/// Encoder options.
///
/// ```
/// use escpos_forge::magic::{ErrorPolicy, MagicEncodeConfig};
///
/// let config: MagicEncodeConfig =
///     serde_json::from_str(r#"{"error_policy": {"substitute": "?"}}"#).unwrap();
/// assert_eq!(config.error_policy, ErrorPolicy::Substitute('?'));
/// assert!(config.normalize_katakana);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MagicEncodeConfig {
    pub error_policy: ErrorPolicy,
    /// Rewrite hiragana and full-width katakana as half-width katakana
    /// when the profile has a Katakana page
    pub normalize_katakana: bool,
}

impl Default for MagicEncodeConfig {
    fn default() -> Self {
        Self {
            error_policy: ErrorPolicy::Fail,
            normalize_katakana: true,
        }
    }
}

// ============================================================================
// OUTPUT
// ============================================================================

/// One run of text encoded under a single codepage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextSegment {
    /// Codepage to switch to before this run, if a switch is needed
    pub switch: Option<u8>,
    pub bytes: Vec<u8>,
}

/// Flatten segments into the byte stream sent to the printer.
pub fn to_bytes(segments: &[TextSegment]) -> Vec<u8> {
    let mut out = Vec::with_capacity(segments.iter().map(|s| s.bytes.len() + 3).sum());
    for segment in segments {
        if let Some(id) = segment.switch {
            out.extend(commands::select_codepage(id));
        }
        out.extend_from_slice(&segment.bytes);
    }
    out
}

// ============================================================================
// ENCODER
// ============================================================================

/// Codepage-switching text encoder for one printer profile.
#[derive(Debug, Clone)]
pub struct MagicEncoder {
    profile: Arc<CapabilityProfile>,
    config: MagicEncodeConfig,
}

impl MagicEncoder {
    pub fn new(profile: Arc<CapabilityProfile>, config: MagicEncodeConfig) -> Self {
        Self { profile, config }
    }

    pub fn profile(&self) -> &CapabilityProfile {
        &self.profile
    }

    pub fn config(&self) -> &MagicEncodeConfig {
        &self.config
    }

    /// Encode `text` into codepage runs.
    ///
    /// On error `state` is left untouched and nothing is returned.
    pub fn encode(&self, state: &mut EncodingState, text: &str) -> Result<Vec<TextSegment>> {
        let text = self.normalize(text);
        let mut runs = Runs::new(*state);
        // Characters held while no page is selected
        let mut pending: Vec<u8> = Vec::new();

        for ch in text.chars() {
            if runs.current.is_none() && !state.forced && ch.is_ascii() {
                pending.push(ch as u8);
                continue;
            }
            let (id, byte) = self.place(&runs, state.forced, ch)?;
            runs.push(id, &pending);
            pending.clear();
            runs.push(id, &[byte]);
        }

        if !pending.is_empty() {
            let id = self
                .profile
                .codepage_table()
                .entries()
                .iter()
                .find(|e| e.codepage.is_some())
                .map(|e| e.id)
                .ok_or_else(|| EscposError::CodepageNotFound {
                    ch: pending[0] as char,
                })?;
            runs.push(id, &pending);
        }

        *state = EncodingState {
            current: runs.current,
            forced: state.forced,
        };
        Ok(runs.segments)
    }

    /// [`encode`](Self::encode), flattened to bytes.
    pub fn encode_bytes(&self, state: &mut EncodingState, text: &str) -> Result<Vec<u8>> {
        self.encode(state, text).map(|segments| to_bytes(&segments))
    }

    /// Pin the codepage, by name (`"CP858"`) or `ESC t` index (`"19"`).
    ///
    /// Returns the `ESC t n` command, which takes effect immediately.
    pub fn force(&self, state: &mut EncodingState, codepage: &str) -> Result<Vec<u8>> {
        let table = self.profile.codepage_table();
        let entry = match codepage.trim().parse::<u8>() {
            Ok(id) => table.get(id),
            Err(_) => table.find_by_name(codepage),
        }
        .ok_or_else(|| {
            EscposError::CharCode(format!(
                "{} is not a codepage of profile {}",
                codepage,
                self.profile.id()
            ))
        })?;

        if entry.codepage.is_none() {
            return Err(EscposError::CharCode(format!(
                "no encoding table for {}",
                entry.name
            )));
        }

        tracing::debug!(id = entry.id, name = %entry.name, "codepage forced");
        *state = EncodingState {
            current: Some(entry.id),
            forced: true,
        };
        Ok(commands::select_codepage(entry.id))
    }

    /// Return to automatic switching. Emits nothing.
    pub fn set_auto(&self, state: &mut EncodingState) {
        state.forced = false;
    }

    /// Encode `text` in one named codepage, switching to it first if needed.
    ///
    /// Does not change whether the state is forced.
    pub fn encode_with(
        &self,
        state: &mut EncodingState,
        codepage: &str,
        text: &str,
    ) -> Result<Vec<u8>> {
        let entry = self
            .profile
            .codepage_table()
            .find_by_name(codepage)
            .ok_or_else(|| EscposError::CharCode(codepage.to_string()))?;
        let page = entry.codepage.ok_or_else(|| EscposError::CharCode(codepage.to_string()))?;

        let mut out = Vec::with_capacity(text.len() + 3);
        if state.current != Some(entry.id) {
            out.extend(commands::select_codepage(entry.id));
        }
        for ch in self.normalize(text).chars() {
            let byte = match (page.encode_char(ch), self.config.error_policy) {
                (Some(b), _) => b,
                (None, ErrorPolicy::Substitute(r)) => page
                    .encode_char(r)
                    .ok_or(EscposError::CodepageNotFound { ch })?,
                (None, ErrorPolicy::Fail) => return Err(EscposError::CodepageNotFound { ch }),
            };
            out.push(byte);
        }

        state.current = Some(entry.id);
        Ok(out)
    }

    fn normalize<'a>(&self, text: &'a str) -> std::borrow::Cow<'a, str> {
        let has_katakana = self.profile.codepage_table().contains(Codepage::Katakana);
        if self.config.normalize_katakana && has_katakana && !text.is_ascii() {
            std::borrow::Cow::Owned(codepage::to_half_width_katakana(text))
        } else {
            std::borrow::Cow::Borrowed(text)
        }
    }

    /// Find the page and byte for `ch`, applying the error policy.
    fn place(&self, runs: &Runs, forced: bool, ch: char) -> Result<(u8, u8)> {
        if let Some(hit) = self.locate(runs.current, forced, ch) {
            return Ok(hit);
        }
        match self.config.error_policy {
            ErrorPolicy::Fail => Err(EscposError::CodepageNotFound { ch }),
            ErrorPolicy::Substitute(replacement) => {
                tracing::debug!(ch = %ch, replacement = %replacement, "substituting character");
                self.locate(runs.current, forced, replacement)
                    .ok_or(EscposError::CodepageNotFound { ch })
            }
        }
    }

    fn locate(&self, current: Option<u8>, forced: bool, ch: char) -> Option<(u8, u8)> {
        let table = self.profile.codepage_table();

        let on_current = current
            .and_then(|id| table.get(id))
            .and_then(|e| e.codepage.and_then(|cp| cp.encode_char(ch)).map(|b| (e.id, b)));
        if on_current.is_some() || forced {
            return on_current;
        }

        let entry = table.first_encoding(ch)?;
        let byte = entry.codepage.and_then(|cp| cp.encode_char(ch))?;
        tracing::debug!(from = ?current, to = entry.id, name = %entry.name, "codepage switch");
        Some((entry.id, byte))
    }
}

/// Segments under construction.
struct Runs {
    current: Option<u8>,
    segments: Vec<TextSegment>,
}

impl Runs {
    fn new(state: EncodingState) -> Self {
        Self {
            current: state.current,
            segments: Vec::new(),
        }
    }

    fn push(&mut self, id: u8, bytes: &[u8]) {
        if bytes.is_empty() {
            return;
        }
        let switched = self.current != Some(id);
        match self.segments.last_mut() {
            Some(last) if !switched => last.bytes.extend_from_slice(bytes),
            _ => self.segments.push(TextSegment {
                switch: switched.then_some(id),
                bytes: bytes.to_vec(),
            }),
        }
        self.current = Some(id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profile::CapabilityDatabase;
    use pretty_assertions::assert_eq;

    fn encoder_with(pages: &str, config: MagicEncodeConfig) -> MagicEncoder {
        let json = format!(r#"{{"p": {{"codePages": {pages}}}}}"#);
        let db = CapabilityDatabase::from_json_str(&json).unwrap();
        MagicEncoder::new(db.resolve("p").unwrap(), config)
    }

    fn encoder(pages: &str) -> MagicEncoder {
        encoder_with(pages, MagicEncodeConfig::default())
    }

    #[test]
    fn test_switches_at_run_boundary() {
        // CP866 has no é; CP1252 does
        let enc = encoder(r#"{"0": "CP866", "1": "CP1252"}"#);
        let mut state = EncodingState::with_codepage(0);

        let segments = enc.encode(&mut state, "café").unwrap();
        assert_eq!(
            segments,
            vec![
                TextSegment { switch: None, bytes: b"caf".to_vec() },
                TextSegment { switch: Some(1), bytes: vec![0xE9] },
            ]
        );
        assert_eq!(state.current_codepage(), Some(1));
    }

    #[test]
    fn test_stays_on_current_page() {
        let enc = encoder(r#"{"0": "CP437", "16": "CP1252"}"#);
        let mut state = EncodingState::with_codepage(16);

        // é is in both; 16 is active so no switch back to 0
        let bytes = enc.encode_bytes(&mut state, "é and e").unwrap();
        assert_eq!(bytes, b"\xE9 and e".to_vec());
    }

    #[test]
    fn test_first_run_from_unknown_state() {
        let enc = encoder(r#"{"0": "CP437", "17": "CP866"}"#);
        let mut state = EncodingState::default();

        let bytes = enc.encode_bytes(&mut state, "ok Да").unwrap();
        assert_eq!(bytes, b"\x1Bt\x11ok \x84\xA0".to_vec());
    }

    #[test]
    fn test_ascii_only_from_unknown_state() {
        let enc = encoder(r#"{"3": "CP932", "5": "CP865"}"#);
        let mut state = EncodingState::default();

        let bytes = enc.encode_bytes(&mut state, "abc").unwrap();
        assert_eq!(bytes, b"\x1Bt\x05abc".to_vec());
    }

    #[test]
    fn test_lowest_id_wins_ties() {
        let enc = encoder(r#"{"0": "CP866", "2": "CP858", "16": "CP1252"}"#);
        let mut state = EncodingState::with_codepage(0);

        // both 2 and 16 encode ü
        let segments = enc.encode(&mut state, "ü").unwrap();
        assert_eq!(segments[0].switch, Some(2));
    }

    #[test]
    fn test_unencodable_fails_without_touching_state() {
        let enc = encoder(r#"{"0": "CP437"}"#);
        let mut state = EncodingState::with_codepage(0);

        let err = enc.encode(&mut state, "price: 5€").unwrap_err();
        assert!(matches!(err, EscposError::CodepageNotFound { ch: '€' }));
        assert_eq!(state, EncodingState::with_codepage(0));
    }

    #[test]
    fn test_substitution_policy() {
        let config = MagicEncodeConfig {
            error_policy: ErrorPolicy::Substitute('?'),
            ..Default::default()
        };
        let enc = encoder_with(r#"{"0": "CP437"}"#, config);
        let mut state = EncodingState::with_codepage(0);

        assert_eq!(enc.encode_bytes(&mut state, "5€").unwrap(), b"5?".to_vec());
    }

    #[test]
    fn test_forced_page_never_switches() {
        let enc = encoder(r#"{"0": "CP437", "16": "CP1252"}"#);
        let mut state = EncodingState::default();

        assert_eq!(enc.force(&mut state, "CP437").unwrap(), vec![0x1B, 0x74, 0x00]);
        assert!(state.is_forced());

        let err = enc.encode(&mut state, "€").unwrap_err();
        assert!(matches!(err, EscposError::CodepageNotFound { .. }));

        enc.set_auto(&mut state);
        assert!(!state.is_forced());
        let bytes = enc.encode_bytes(&mut state, "€").unwrap();
        assert_eq!(bytes, vec![0x1B, 0x74, 16, 0x80]);
    }

    #[test]
    fn test_force_by_index_and_unknown() {
        let enc = encoder(r#"{"0": "CP437", "1": "CP932"}"#);
        let mut state = EncodingState::default();

        assert_eq!(enc.force(&mut state, "0").unwrap(), vec![0x1B, 0x74, 0x00]);
        assert!(matches!(enc.force(&mut state, "CP1252"), Err(EscposError::CharCode(_))));
        assert!(matches!(enc.force(&mut state, "CP932"), Err(EscposError::CharCode(_))));
        assert_eq!(state.current_codepage(), Some(0));
    }

    #[test]
    fn test_encode_with_specific_page() {
        let enc = encoder(r#"{"0": "CP437", "19": "CP858"}"#);
        let mut state = EncodingState::with_codepage(0);

        let bytes = enc.encode_with(&mut state, "CP858", "€1").unwrap();
        assert_eq!(bytes, vec![0x1B, 0x74, 19, 0xD5, b'1']);
        assert_eq!(state.current_codepage(), Some(19));

        // already on 19: no switch
        let bytes = enc.encode_with(&mut state, "cp858", "x").unwrap();
        assert_eq!(bytes, b"x".to_vec());
    }

    #[test]
    fn test_katakana_normalization() {
        let enc = encoder(r#"{"0": "CP437", "1": "Katakana"}"#);
        let mut state = EncodingState::with_codepage(0);

        let bytes = enc.encode_bytes(&mut state, "カナ").unwrap();
        assert_eq!(bytes, vec![0x1B, 0x74, 0x01, 0xB6, 0xC5]);
    }

    #[test]
    fn test_katakana_left_alone_without_page() {
        let enc = encoder(r#"{"0": "CP437"}"#);
        let mut state = EncodingState::with_codepage(0);
        assert!(enc.encode(&mut state, "カナ").is_err());
    }

    #[test]
    fn test_empty_text() {
        let enc = encoder(r#"{"0": "CP437"}"#);
        let mut state = EncodingState::default();
        assert!(enc.encode(&mut state, "").unwrap().is_empty());
        assert_eq!(state, EncodingState::default());
    }

    #[test]
    fn test_config_defaults_from_empty_json() {
        let config: MagicEncodeConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config, MagicEncodeConfig::default());
    }

    mod property_tests {
        use super::*;
        use proptest::prelude::*;

        const CYRILLIC: &[char] = &['Д', 'а', 'Ж', 'я', 'П', 'р', 'и', 'в', 'е', 'т'];
        const LATIN: &[char] = &['é', 'ü', 'ß', 'ñ', 'Ø', 'à'];

        fn text_from(alphabet: &'static [char]) -> impl Strategy<Value = String> {
            let any_char = prop_oneof![
                prop::sample::select(vec!['a', 'Z', ' ', '1', '.']),
                prop::sample::select(alphabet.to_vec()),
            ];
            (prop::sample::select(alphabet.to_vec()), prop::collection::vec(any_char, 0..30))
                .prop_map(|(first, mut rest)| {
                    rest.insert(rest.len() / 2, first);
                    rest.into_iter().collect::<String>()
                })
        }

        proptest! {
            #[test]
            fn single_page_text_needs_at_most_one_switch(
                text in text_from(CYRILLIC),
                prior in prop::option::of(prop::sample::select(vec![0u8, 17])),
            ) {
                let enc = encoder(r#"{"0": "CP437", "17": "CP866"}"#);
                let mut state = prior.map(EncodingState::with_codepage).unwrap_or_default();

                let segments = enc.encode(&mut state, &text).unwrap();
                let switches = segments.iter().filter(|s| s.switch.is_some()).count();
                prop_assert_eq!(switches, usize::from(prior != Some(17)));

                let bytes: Vec<u8> = segments.iter().flat_map(|s| s.bytes.clone()).collect();
                prop_assert_eq!(Codepage::Cp866.decode(&bytes), Some(text));
            }

            #[test]
            fn two_runs_switch_once_at_boundary(
                first in text_from(CYRILLIC),
                second in text_from(LATIN),
            ) {
                let second: String = second.chars().filter(|c| !c.is_ascii()).collect();
                prop_assume!(!second.is_empty());

                let enc = encoder(r#"{"0": "CP866", "16": "CP1252"}"#);
                let mut state = EncodingState::with_codepage(0);
                let text = format!("{first}{second}");

                let segments = enc.encode(&mut state, &text).unwrap();
                prop_assert_eq!(segments.len(), 2);
                prop_assert_eq!(segments[0].switch, None);
                prop_assert_eq!(segments[1].switch, Some(16));
                prop_assert_eq!(segments[0].bytes.len(), first.chars().count());
            }
        }
    }
}
