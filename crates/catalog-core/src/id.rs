//! Document identifiers.
//!
//! An [`ObjectId`] is 12 bytes rendered as 24 hex characters:
//!
//! | Bytes | Content |
//! |-------|---------|
//! | 0..4  | Unix seconds, big-endian |
//! | 4..9  | Random value fixed for the lifetime of the process |
//! | 9..12 | Counter, big-endian, seeded randomly |
//!
//! Only strings of exactly that shape pass [`is_valid_identifier`], so a
//! malformed path segment is rejected before it can reach the store.

use std::{
  fmt,
  str::FromStr,
  sync::{
    OnceLock,
    atomic::{AtomicU32, Ordering},
  },
};

use chrono::{DateTime, Utc};
use rand_core::{OsRng, RngCore};
use serde::{Deserialize, Deserializer, Serialize, Serializer, de};
use thiserror::Error;

/// Length of the hex rendering.
pub const HEX_LEN: usize = 24;

const COUNTER_MASK: u32 = 0x00ff_ffff;

static PROCESS_UNIQUE: OnceLock<[u8; 5]> = OnceLock::new();
static COUNTER_SEED: OnceLock<u32> = OnceLock::new();
static COUNTER: AtomicU32 = AtomicU32::new(0);

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("identifier must be {HEX_LEN} hex characters, got {0:?}")]
pub struct ParseIdError(pub String);

/// A store-generated document identifier.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ObjectId([u8; 12]);

impl ObjectId {
  /// Generate a fresh identifier stamped with the current time.
  pub fn new() -> Self { Self::at(Utc::now()) }

  /// Generate an identifier whose timestamp prefix is `at`.
  pub fn at(at: DateTime<Utc>) -> Self {
    let process = PROCESS_UNIQUE.get_or_init(|| {
      let mut bytes = [0u8; 5];
      OsRng.fill_bytes(&mut bytes);
      bytes
    });
    let seed = *COUNTER_SEED.get_or_init(|| OsRng.next_u32());
    let count = seed.wrapping_add(COUNTER.fetch_add(1, Ordering::Relaxed)) & COUNTER_MASK;

    let mut bytes = [0u8; 12];
    bytes[0..4].copy_from_slice(&(at.timestamp() as u32).to_be_bytes());
    bytes[4..9].copy_from_slice(process);
    bytes[9..12].copy_from_slice(&count.to_be_bytes()[1..]);
    Self(bytes)
  }

  pub const fn from_bytes(bytes: [u8; 12]) -> Self { Self(bytes) }

  pub const fn as_bytes(&self) -> &[u8; 12] { &self.0 }

  /// The creation second encoded in the first four bytes.
  pub fn timestamp(&self) -> DateTime<Utc> {
    let secs = u32::from_be_bytes([self.0[0], self.0[1], self.0[2], self.0[3]]);
    DateTime::from_timestamp(i64::from(secs), 0).unwrap_or_default()
  }
}

impl Default for ObjectId {
  fn default() -> Self { Self::new() }
}

/// `true` iff `raw` is exactly the format produced by [`ObjectId::new`].
pub fn is_valid_identifier(raw: &str) -> bool { raw.parse::<ObjectId>().is_ok() }

impl FromStr for ObjectId {
  type Err = ParseIdError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    if s.len() != HEX_LEN {
      return Err(ParseIdError(s.to_owned()));
    }
    let mut bytes = [0u8; 12];
    hex::decode_to_slice(s, &mut bytes).map_err(|_| ParseIdError(s.to_owned()))?;
    Ok(Self(bytes))
  }
}

impl fmt::Display for ObjectId {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(&hex::encode(self.0))
  }
}

impl fmt::Debug for ObjectId {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "ObjectId({self})")
  }
}

impl Serialize for ObjectId {
  fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.collect_str(self)
  }
}

impl<'de> Deserialize<'de> for ObjectId {
  fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
    let s = String::deserialize(deserializer)?;
    s.parse().map_err(de::Error::custom)
  }
}
