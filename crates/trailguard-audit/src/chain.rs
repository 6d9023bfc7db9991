//! Hash-chain primitives: the record hash and the pending-record builder.
//!
//! Every field that contributes to a record's hash is listed explicitly so
//! nothing is accidentally omitted.  Each field is length-prefixed, which
//! makes it impossible for field contents to be mistaken for a boundary
//! between fields.
//!
//! Hash input layout (bytes, in order):
//!   1. domain tag `trailguard/v1`
//!   2. action as UTF-8
//!   3. canonical JSON of details
//!   4. actor_id: presence byte, then UTF-8 if present
//!   5. timestamp as RFC 3339 UTC with nanoseconds
//!   6. prev_hash: presence byte, then UTF-8 (64 hex chars) if present
//!
//! Length prefixes are 8-byte little-endian `u64`.

use chrono::{DateTime, SecondsFormat, Utc};
use serde_json::Value;
use sha2::{Digest, Sha256};

use trailguard_contracts::record::{AuditRecord, PendingRecord};

use crate::canonical::canonical_json;

/// Version tag mixed into every hash.  Changing the layout above requires a
/// new tag.
pub const HASH_DOMAIN: &str = "trailguard/v1";

/// Render `timestamp` exactly as it is fed into the hash.
pub fn hash_timestamp(timestamp: &DateTime<Utc>) -> String {
    timestamp.to_rfc3339_opts(SecondsFormat::Nanos, true)
}

fn update_field(hasher: &mut Sha256, bytes: &[u8]) {
    hasher.update((bytes.len() as u64).to_le_bytes());
    hasher.update(bytes);
}

fn update_optional(hasher: &mut Sha256, value: Option<&str>) {
    match value {
        Some(v) => {
            hasher.update([1u8]);
            update_field(hasher, v.as_bytes());
        }
        None => hasher.update([0u8]),
    }
}

/// Compute the SHA-256 hash of one record's fields.
///
/// Returns a lowercase 64-character hex string.
pub fn hash_fields(
    action: &str,
    details: &Value,
    actor_id: Option<&str>,
    timestamp: &DateTime<Utc>,
    prev_hash: Option<&str>,
) -> String {
    let details_json = canonical_json(details);

    let mut hasher = Sha256::new();
    update_field(&mut hasher, HASH_DOMAIN.as_bytes());
    update_field(&mut hasher, action.as_bytes());
    update_field(&mut hasher, details_json.as_bytes());
    update_optional(&mut hasher, actor_id);
    update_field(&mut hasher, hash_timestamp(timestamp).as_bytes());
    update_optional(&mut hasher, prev_hash);

    hex::encode(hasher.finalize())
}

/// Recompute the hash of a stored record from its own fields.
pub fn hash_record(record: &AuditRecord) -> String {
    hash_fields(
        &record.action,
        &record.details,
        record.actor_id.as_deref(),
        &record.timestamp,
        record.prev_hash.as_deref(),
    )
}

/// Build the next record of the chain on top of `tail`.
///
/// The timestamp is `now`, clamped so it never precedes the tail's
/// timestamp; ordering by timestamp therefore always agrees with insertion
/// order.
pub fn link_pending(
    action: &str,
    details: Value,
    actor_id: Option<&str>,
    now: DateTime<Utc>,
    tail: Option<&AuditRecord>,
) -> PendingRecord {
    let timestamp = match tail {
        Some(t) if t.timestamp > now => t.timestamp,
        _ => now,
    };
    let prev_hash = tail.map(|t| t.hash.clone());
    let hash = hash_fields(action, &details, actor_id, &timestamp, prev_hash.as_deref());

    PendingRecord {
        action: action.to_string(),
        details,
        actor_id: actor_id.map(str::to_string),
        timestamp,
        hash,
        prev_hash,
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, TimeZone, Utc};
    use serde_json::json;

    use trailguard_contracts::record::RecordId;

    use super::*;

    fn ts() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 8, 9, 30, 0).unwrap()
    }

    #[test]
    fn hash_is_64_lowercase_hex() {
        let hash = hash_fields("LOGIN", &json!({}), None, &ts(), None);
        assert_eq!(hash.len(), 64);
        assert!(hash.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
    }

    #[test]
    fn hash_is_deterministic() {
        let a = hash_fields("LOGIN", &json!({ "ip": "1.2.3.4" }), Some("u1"), &ts(), None);
        let b = hash_fields("LOGIN", &json!({ "ip": "1.2.3.4" }), Some("u1"), &ts(), None);
        assert_eq!(a, b);
    }

    #[test]
    fn every_field_changes_the_hash() {
        let base = hash_fields("LOGIN", &json!({ "ip": "1" }), Some("u1"), &ts(), Some("p"));
        let variants = [
            hash_fields("LOGOUT", &json!({ "ip": "1" }), Some("u1"), &ts(), Some("p")),
            hash_fields("LOGIN", &json!({ "ip": "2" }), Some("u1"), &ts(), Some("p")),
            hash_fields("LOGIN", &json!({ "ip": "1" }), Some("u2"), &ts(), Some("p")),
            hash_fields("LOGIN", &json!({ "ip": "1" }), None, &ts(), Some("p")),
            hash_fields(
                "LOGIN",
                &json!({ "ip": "1" }),
                Some("u1"),
                &(ts() + Duration::nanoseconds(1)),
                Some("p"),
            ),
            hash_fields("LOGIN", &json!({ "ip": "1" }), Some("u1"), &ts(), Some("q")),
            hash_fields("LOGIN", &json!({ "ip": "1" }), Some("u1"), &ts(), None),
        ];
        for variant in variants {
            assert_ne!(base, variant);
        }
    }

    #[test]
    fn delimiter_in_field_cannot_shift_boundaries() {
        // With plain "a|b" + "|" + "c" concatenation these two would collide.
        let left = hash_fields("A|B", &json!("C"), None, &ts(), None);
        let right = hash_fields("A", &json!("B|C"), None, &ts(), None);
        assert_ne!(left, right);
    }

    #[test]
    fn absent_actor_differs_from_empty_actor() {
        let absent = hash_fields("X", &json!(null), None, &ts(), None);
        let empty = hash_fields("X", &json!(null), Some(""), &ts(), None);
        assert_ne!(absent, empty);
    }

    #[test]
    fn hash_record_matches_pending_hash() {
        let pending = link_pending("LOGIN", json!({ "ip": "1.2.3.4" }), Some("u"), ts(), None);
        let record = pending.clone().into_record(RecordId::new());
        assert_eq!(hash_record(&record), pending.hash);
    }

    #[test]
    fn link_pending_links_to_tail() {
        let first = link_pending("A", json!(1), None, ts(), None).into_record(RecordId::new());
        assert_eq!(first.prev_hash, None);

        let second = link_pending("B", json!(2), None, ts(), Some(&first));
        assert_eq!(second.prev_hash.as_deref(), Some(first.hash.as_str()));
    }

    #[test]
    fn link_pending_clamps_clock_skew() {
        let first = link_pending("A", json!(1), None, ts(), None).into_record(RecordId::new());
        let earlier = ts() - Duration::seconds(5);
        let second = link_pending("B", json!(2), None, earlier, Some(&first));
        assert_eq!(second.timestamp, first.timestamp);
    }

    #[test]
    fn hash_timestamp_keeps_nanoseconds() {
        let t = ts() + Duration::nanoseconds(123_456_789);
        assert_eq!(hash_timestamp(&t), "2024-03-08T09:30:00.123456789Z");
    }
}
