//! # Stable Node Identifiers
//!
//! Every node, artboard, and document carries a 26-character identifier that
//! is lexicographically sortable by creation time: a 48-bit millisecond
//! timestamp followed by 80 bits of cryptographic randomness, encoded in
//! Crockford base32 (`0-9 A-H J K M N P-T V-Z`; the ambiguous `I L O U` are
//! excluded).
//!
//! ## Design
//!
//! Sorting identifiers as plain strings sorts them by allocation time, which
//! keeps freshly created nodes clustered in indices and makes identifier
//! ranges meaningful for time-window queries. The random suffix makes
//! collisions across documents vanishingly unlikely (2^80 per millisecond).
//!
//! Within a single millisecond the generator increments the previous value
//! instead of re-rolling, so identifiers allocated back-to-back stay strictly
//! monotonic. This last-value register is the only shared mutable state in
//! the whole engine and lives behind a `Mutex`.
//!
//! ## Example
//!
//! ```rust
//! use easel_schema::NodeId;
//!
//! let a = NodeId::generate();
//! let b = NodeId::generate();
//! assert!(a < b);
//! assert_eq!(a.to_string().len(), 26);
//!
//! let parsed: NodeId = a.to_string().parse().unwrap();
//! assert_eq!(parsed, a);
//! ```

use crate::error::IdError;
use rand::{rngs::OsRng, RngCore};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use std::sync::Mutex;
use std::time::{SystemTime, UNIX_EPOCH};

/// Length of the string form: 10 timestamp characters + 16 random characters.
pub const ID_LEN: usize = 26;

/// Crockford base32 alphabet.
const ALPHABET: &[u8; 32] = b"0123456789ABCDEFGHJKMNPQRSTVWXYZ";

/// Number of random bits in the suffix.
const RANDOM_BITS: u32 = 80;

/// A 26-character, time-sortable, globally unique identifier.
///
/// Internally stored as the decoded 128-bit value (the top 2 bits of the
/// 130-bit string capacity are always zero), so comparison is a single
/// integer compare and `Ord` agrees with the lexicographic order of the
/// string form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(u128);

/// Last allocated value, used to keep same-millisecond allocations monotonic.
static LAST_ID: Mutex<u128> = Mutex::new(0);

impl NodeId {
    /// Allocate a fresh identifier from the wall clock and `OsRng`.
    ///
    /// If the clock has not advanced past the previous allocation (same
    /// millisecond, or a backwards step), the previous value is incremented
    /// instead, so consecutive identifiers from one process are always
    /// strictly increasing.
    pub fn generate() -> Self {
        let ms = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or(0);

        let mut random = [0u8; 10];
        OsRng.fill_bytes(&mut random);
        let mut suffix: u128 = 0;
        for byte in random {
            suffix = (suffix << 8) | u128::from(byte);
        }
        let fresh = (u128::from(ms) << RANDOM_BITS) | suffix;

        let mut last = LAST_ID.lock().expect("id generator lock poisoned");
        let value = if (fresh >> RANDOM_BITS) > (*last >> RANDOM_BITS) {
            fresh
        } else {
            *last + 1
        };
        *last = value;
        Self(value)
    }

    /// Parse the 26-character string form.
    ///
    /// Decoding is case-insensitive per Crockford's rules, but the canonical
    /// rendering is always uppercase. Length and alphabet are enforced.
    ///
    /// # Errors
    ///
    /// Returns [`IdError::InvalidLength`] or [`IdError::InvalidChar`].
    pub fn parse(input: &str) -> Result<Self, IdError> {
        if input.len() != ID_LEN {
            return Err(IdError::InvalidLength { length: input.len() });
        }
        let mut value: u128 = 0;
        for (index, ch) in input.chars().enumerate() {
            let bits = decode_char(ch).ok_or(IdError::InvalidChar { ch, index })?;
            value = (value << 5) | u128::from(bits);
        }
        Ok(Self(value))
    }

    /// Millisecond timestamp embedded in the identifier.
    #[must_use]
    pub fn timestamp_ms(&self) -> u64 {
        (self.0 >> RANDOM_BITS) as u64
    }

    /// Whether the embedded timestamp falls inside `[start_ms, end_ms]`.
    #[must_use]
    pub fn in_time_range(&self, start_ms: u64, end_ms: u64) -> bool {
        let ts = self.timestamp_ms();
        ts >= start_ms && ts <= end_ms
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut buf = [0u8; ID_LEN];
        let mut value = self.0;
        for slot in buf.iter_mut().rev() {
            *slot = ALPHABET[(value & 0x1f) as usize];
            value >>= 5;
        }
        // Alphabet bytes are ASCII.
        f.write_str(std::str::from_utf8(&buf).expect("base32 output is ASCII"))
    }
}

impl FromStr for NodeId {
    type Err = IdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Serialize for NodeId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for NodeId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::parse(&s).map_err(serde::de::Error::custom)
    }
}

/// Decode one Crockford base32 character to its 5-bit value.
///
/// The excluded letters `I L O U` are rejected outright; identifiers are
/// produced by this crate, so there is no legacy input to be lenient about.
fn decode_char(ch: char) -> Option<u8> {
    let upper = ch.to_ascii_uppercase();
    match upper {
        '0'..='9' => Some(upper as u8 - b'0'),
        'A'..='H' => Some(upper as u8 - b'A' + 10),
        'J' | 'K' => Some(upper as u8 - b'J' + 18),
        'M' | 'N' => Some(upper as u8 - b'M' + 20),
        'P'..='T' => Some(upper as u8 - b'P' + 22),
        'V'..='Z' => Some(upper as u8 - b'V' + 27),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generated_ids_have_fixed_length() {
        let id = NodeId::generate();
        assert_eq!(id.to_string().len(), ID_LEN);
    }

    #[test]
    fn test_generated_ids_are_unique_and_monotonic() {
        let mut previous = NodeId::generate();
        for _ in 0..1000 {
            let next = NodeId::generate();
            assert!(next > previous, "ids must be strictly increasing");
            previous = next;
        }
    }

    #[test]
    fn test_roundtrip_through_string() {
        let id = NodeId::generate();
        let parsed = NodeId::parse(&id.to_string()).unwrap();
        assert_eq!(parsed, id);
    }

    #[test]
    fn test_parse_is_case_insensitive() {
        let id = NodeId::generate();
        let lower = id.to_string().to_lowercase();
        assert_eq!(NodeId::parse(&lower).unwrap(), id);
    }

    #[test]
    fn test_parse_rejects_bad_length() {
        assert!(matches!(
            NodeId::parse("TOOSHORT"),
            Err(IdError::InvalidLength { length: 8 })
        ));
    }

    #[test]
    fn test_parse_rejects_excluded_letters() {
        // 'U' is never valid in Crockford base32.
        let bad = "0123456789ABCDEFGHJKMNPQRU";
        assert!(matches!(
            NodeId::parse(bad),
            Err(IdError::InvalidChar { ch: 'U', .. })
        ));
    }

    #[test]
    fn test_timestamp_extraction() {
        let before = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap()
            .as_millis() as u64;
        let id = NodeId::generate();
        let after = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap()
            .as_millis() as u64;

        assert!(id.timestamp_ms() >= before);
        assert!(id.timestamp_ms() <= after + 1);
        assert!(id.in_time_range(before, after + 1));
        assert!(!id.in_time_range(0, before.saturating_sub(10_000)));
    }

    #[test]
    fn test_string_order_matches_value_order() {
        let a = NodeId::generate();
        let b = NodeId::generate();
        assert_eq!(a < b, a.to_string() < b.to_string());
    }

    #[test]
    fn test_serde_as_string() {
        let id = NodeId::generate();
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, format!("\"{id}\""));
        let back: NodeId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, id);
    }
}
