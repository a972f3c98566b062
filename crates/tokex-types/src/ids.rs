//! Identifiers used throughout tokex.
//!
//! Tokens and accounts share one identity type, [`Address`]: an opaque
//! 20-byte value rendered as `0x`-prefixed lowercase hex. Orders are
//! numbered with a plain monotonically increasing [`OrderId`].

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use sha2::{Digest, Sha256};

use crate::ExchangeError;

// ---------------------------------------------------------------------------
// Address
// ---------------------------------------------------------------------------

/// Account-like identity of a user, a token, the fee account or the ledger itself.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd, Default)]
pub struct Address(pub [u8; 20]);

impl Address {
    /// The reserved all-zero address. Never a valid transfer recipient.
    pub const ZERO: Self = Self([0u8; 20]);

    /// Byte length of an address.
    pub const LEN: usize = 20;

    #[must_use]
    pub fn from_bytes(bytes: [u8; 20]) -> Self {
        Self(bytes)
    }

    /// Deterministic address derived from a human label.
    ///
    /// The same label always yields the same address, so scenarios and
    /// replays can name their participants ("user1", "mETH", ...).
    #[must_use]
    pub fn from_label(label: &str) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(b"tokex:address:v1:");
        hasher.update(label.as_bytes());
        let hash = hasher.finalize();
        let mut bytes = [0u8; 20];
        bytes.copy_from_slice(&hash[12..32]);
        Self(bytes)
    }

    #[must_use]
    pub fn as_bytes(&self) -> &[u8; 20] {
        &self.0
    }

    #[must_use]
    pub fn is_zero(&self) -> bool {
        *self == Self::ZERO
    }

    /// First four bytes as hex, for compact log fields.
    #[must_use]
    pub fn short(&self) -> String {
        hex::encode(&self.0[..4])
    }
}

/// Test helpers.
#[cfg(any(test, feature = "test-helpers"))]
impl Address {
    pub fn random() -> Self {
        Self(rand::random::<[u8; 20]>())
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Address({self})")
    }
}

impl FromStr for Address {
    type Err = ExchangeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let digits = s.strip_prefix("0x").unwrap_or(s);
        let raw = hex::decode(digits).map_err(|e| ExchangeError::InvalidAddress {
            input: s.to_string(),
            reason: e.to_string(),
        })?;
        let bytes: [u8; 20] = raw.try_into().map_err(|raw: Vec<u8>| {
            ExchangeError::InvalidAddress {
                input: s.to_string(),
                reason: format!("expected {} bytes, got {}", Self::LEN, raw.len()),
            }
        })?;
        Ok(Self(bytes))
    }
}

impl Serialize for Address {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Address {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

// ---------------------------------------------------------------------------
// OrderId
// ---------------------------------------------------------------------------

/// Order identifier. Assigned from 1 upwards by the order book, never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OrderId(pub u64);

impl OrderId {
    #[must_use]
    pub fn next(self) -> Self {
        Self(self.0 + 1)
    }

    #[must_use]
    pub fn value(self) -> u64 {
        self.0
    }
}

impl fmt::Display for OrderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for OrderId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_label_is_deterministic() {
        assert_eq!(Address::from_label("user1"), Address::from_label("user1"));
        assert_ne!(Address::from_label("user1"), Address::from_label("user2"));
        assert!(!Address::from_label("user1").is_zero());
    }

    #[test]
    fn display_parse_roundtrip() {
        let addr = Address::from_label("mETH");
        let s = addr.to_string();
        assert!(s.starts_with("0x"));
        assert_eq!(s.len(), 42);
        assert_eq!(s.parse::<Address>().unwrap(), addr);
    }

    #[test]
    fn parse_without_prefix() {
        let addr: Address = "0000000000000000000000000000000000000001".parse().unwrap();
        assert_eq!(addr.0[19], 1);
    }

    #[test]
    fn parse_rejects_bad_input() {
        let err = "0x1234".parse::<Address>().unwrap_err();
        assert!(matches!(err, ExchangeError::InvalidAddress { .. }));
        let err = "0xzz00000000000000000000000000000000000000"
            .parse::<Address>()
            .unwrap_err();
        assert!(matches!(err, ExchangeError::InvalidAddress { .. }));
    }

    #[test]
    fn zero_address() {
        assert!(Address::ZERO.is_zero());
        assert_eq!(
            Address::ZERO.to_string(),
            "0x0000000000000000000000000000000000000000"
        );
    }

    #[test]
    fn serde_uses_hex_string() {
        let addr = Address::from_label("Dapp");
        let json = serde_json::to_string(&addr).unwrap();
        assert_eq!(json, format!("\"{addr}\""));
        let back: Address = serde_json::from_str(&json).unwrap();
        assert_eq!(addr, back);
    }

    #[test]
    fn random_addresses_differ() {
        assert_ne!(Address::random(), Address::random());
    }

    #[test]
    fn order_id_next() {
        assert_eq!(OrderId(5).next(), OrderId(6));
        assert_eq!(serde_json::to_string(&OrderId(7)).unwrap(), "7");
    }
}
