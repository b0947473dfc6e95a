use crate::errors::{ErrorKind, StoreError, StoreResult};
use chrono::{DateTime, TimeZone, Utc};
use once_cell::sync::Lazy;
use rand::rngs::OsRng;
use rand::{Rng, RngCore};
use std::cmp::Ordering;
use std::fmt::{Debug, Display};
use std::sync::atomic::{AtomicU32, Ordering as AtomicOrdering};

/// The number of raw bytes in an identifier.
pub const OBJECT_ID_LENGTH: usize = 12;

static MALFORMED_ID_ERROR: Lazy<StoreError> = Lazy::new(|| {
    StoreError::new(
        "Argument passed in must be a single String of 12 bytes or a string of 24 hex characters",
        ErrorKind::Validation,
    )
});

// Per-process random identity, drawn once. Together with the counter this
// keeps ids unique across processes without coordination.
static PROCESS_RANDOM: Lazy<[u8; 5]> = Lazy::new(|| {
    let mut bytes = [0u8; 5];
    OsRng.fill_bytes(&mut bytes);
    bytes
});

static COUNTER: Lazy<AtomicU32> = Lazy::new(|| AtomicU32::new(OsRng.gen()));

/// A unique identifier for documents in karmadb.
///
/// Each document in a collection is uniquely identified by an `ObjectId`
/// stored in its `_id` field. The identifier is 12 bytes: a 4-byte big-endian
/// seconds timestamp, 5 bytes of per-process random identity, and a 3-byte
/// big-endian counter initialized to a random value. It round-trips to and
/// from a 24-character hexadecimal string.
///
/// # Decoding
///
/// Externally supplied string identifiers enter the system through
/// [`ObjectId::decode`], which validates the input *before any datastore
/// operation is issued*. Malformed input fails with
/// [`ErrorKind::Validation`] and a fixed message; no collection handle is
/// touched on that path.
///
/// ```rust,ignore
/// let id = ObjectId::decode("507f1f77bcf86cd799439011")?;
/// assert_eq!(id.to_hex(), "507f1f77bcf86cd799439011");
/// ```
#[derive(PartialEq, Eq, Hash, Clone, Copy)]
pub struct ObjectId {
    bytes: [u8; OBJECT_ID_LENGTH],
}

impl ObjectId {
    /// Generates a new unique `ObjectId` from the current time, the process
    /// random identity, and the next counter value.
    pub fn new() -> Self {
        let timestamp = Utc::now().timestamp() as u32;
        let counter = COUNTER.fetch_add(1, AtomicOrdering::Relaxed);

        let mut bytes = [0u8; OBJECT_ID_LENGTH];
        bytes[0..4].copy_from_slice(&timestamp.to_be_bytes());
        bytes[4..9].copy_from_slice(&*PROCESS_RANDOM);
        // low three counter bytes, big-endian
        bytes[9..12].copy_from_slice(&counter.to_be_bytes()[1..4]);

        ObjectId { bytes }
    }

    /// Decodes an externally supplied string identifier.
    ///
    /// The input must be a 24-character hexadecimal string. Any other input
    /// fails with [`ErrorKind::Validation`] carrying the fixed message
    /// `"Argument passed in must be a single String of 12 bytes or a string
    /// of 24 hex characters"`. No side effects, no I/O.
    pub fn decode(raw: &str) -> StoreResult<ObjectId> {
        if raw.len() != OBJECT_ID_LENGTH * 2 || !raw.bytes().all(|b| b.is_ascii_hexdigit()) {
            log::error!("Rejected malformed identifier: {:?}", raw);
            return Err(MALFORMED_ID_ERROR.clone());
        }

        let mut bytes = [0u8; OBJECT_ID_LENGTH];
        for (i, chunk) in bytes.iter_mut().enumerate() {
            // the string is validated ASCII hex, so this cannot fail
            *chunk = u8::from_str_radix(&raw[i * 2..i * 2 + 2], 16)
                .map_err(|_| MALFORMED_ID_ERROR.clone())?;
        }

        Ok(ObjectId { bytes })
    }

    /// Creates an `ObjectId` from its 12-byte binary equivalent.
    pub fn from_bytes(bytes: [u8; OBJECT_ID_LENGTH]) -> Self {
        ObjectId { bytes }
    }

    /// Returns the raw 12 bytes of this identifier.
    pub fn bytes(&self) -> &[u8; OBJECT_ID_LENGTH] {
        &self.bytes
    }

    /// Renders this identifier as its canonical 24-character lowercase
    /// hexadecimal form.
    pub fn to_hex(&self) -> String {
        let mut hex = String::with_capacity(OBJECT_ID_LENGTH * 2);
        for byte in &self.bytes {
            hex.push_str(&format!("{:02x}", byte));
        }
        hex
    }

    /// Returns the creation instant embedded in the identifier.
    pub fn timestamp(&self) -> DateTime<Utc> {
        let seconds = u32::from_be_bytes([
            self.bytes[0],
            self.bytes[1],
            self.bytes[2],
            self.bytes[3],
        ]);
        Utc.timestamp_opt(seconds as i64, 0)
            .single()
            .unwrap_or(DateTime::<Utc>::MIN_UTC)
    }
}

impl Default for ObjectId {
    fn default() -> Self {
        ObjectId::new()
    }
}

impl PartialOrd for ObjectId {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for ObjectId {
    fn cmp(&self, other: &Self) -> Ordering {
        self.bytes.cmp(&other.bytes)
    }
}

impl Display for ObjectId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl Debug for ObjectId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "ObjectId(\"{}\")", self.to_hex())
    }
}

#[cfg(feature = "serde")]
impl serde::Serialize for ObjectId {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

#[cfg(feature = "serde")]
impl<'de> serde::Deserialize<'de> for ObjectId {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<ObjectId, D::Error> {
        let raw = String::deserialize(deserializer)?;
        ObjectId::decode(&raw).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ErrorKind;

    #[test]
    fn test_new_id_round_trips() {
        let id = ObjectId::new();
        let hex = id.to_hex();
        assert_eq!(hex.len(), 24);
        assert_eq!(ObjectId::decode(&hex).unwrap(), id);
    }

    #[test]
    fn test_decode_known_id() {
        let id = ObjectId::decode("507f1f77bcf86cd799439011").unwrap();
        assert_eq!(id.to_hex(), "507f1f77bcf86cd799439011");
        assert_eq!(
            id.bytes()[..4],
            [0x50, 0x7f, 0x1f, 0x77],
        );
    }

    #[test]
    fn test_decode_accepts_uppercase_hex() {
        let id = ObjectId::decode("507F1F77BCF86CD799439011").unwrap();
        assert_eq!(id.to_hex(), "507f1f77bcf86cd799439011");
    }

    #[test]
    fn test_decode_rejects_malformed_input() {
        for raw in [
            "",
            "wrong ObjectID",
            "507f1f77bcf86cd79943901",    // 23 chars
            "507f1f77bcf86cd7994390111",  // 25 chars
            "507f1f77bcf86cd79943901g",   // non-hex char
            "zzzzzzzzzzzzzzzzzzzzzzzz",
        ] {
            let err = ObjectId::decode(raw).unwrap_err();
            assert_eq!(err.kind(), &ErrorKind::Validation);
            assert_eq!(
                err.message(),
                "Argument passed in must be a single String of 12 bytes or a string of 24 hex characters"
            );
        }
    }

    #[test]
    fn test_from_bytes_matches_hex_form() {
        let id = ObjectId::decode("507f1f77bcf86cd799439011").unwrap();
        let copy = ObjectId::from_bytes(*id.bytes());
        assert_eq!(id, copy);
    }

    #[test]
    fn test_timestamp_extraction() {
        // 0x507f1f77 = 2012-10-17T21:13:27Z
        let id = ObjectId::decode("507f1f77bcf86cd799439011").unwrap();
        assert_eq!(id.timestamp().timestamp(), 0x507f1f77);
    }

    #[test]
    fn test_display_and_debug() {
        let id = ObjectId::decode("507f1f77bcf86cd799439011").unwrap();
        assert_eq!(format!("{}", id), "507f1f77bcf86cd799439011");
        assert_eq!(format!("{:?}", id), "ObjectId(\"507f1f77bcf86cd799439011\")");
    }

    #[test]
    fn test_ordering_follows_bytes() {
        let lo = ObjectId::decode("507f1f77bcf86cd799439011").unwrap();
        let hi = ObjectId::decode("507f1f77bcf86cd799439012").unwrap();
        assert!(lo < hi);
    }

    #[test]
    fn test_uniqueness() {
        let mut ids: Vec<ObjectId> = (0..100).map(|_| ObjectId::new()).collect();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), 100);
    }

    #[test]
    fn test_multithreaded_generation_stays_unique() {
        use std::collections::HashSet;
        use std::sync::Arc;
        use std::thread;

        let set = Arc::new(parking_lot::Mutex::new(HashSet::new()));
        let mut handles = vec![];

        for _ in 0..8 {
            let set = set.clone();
            handles.push(thread::spawn(move || {
                for _ in 0..100 {
                    let id = ObjectId::new();
                    assert!(set.lock().insert(id));
                }
            }));
        }

        for handle in handles {
            handle.join().unwrap();
        }
    }
}
