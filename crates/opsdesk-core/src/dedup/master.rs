//! Master selection: which group member survives the merge.

use crate::error::{OpsdeskError, Result};
use crate::models::{CompanyRecord, CustomerRecord};

/// Records the selector can rank: an id plus a creation stamp.
pub trait RecordStamp {
    fn record_id(&self) -> &str;
    fn created_epoch_millis(&self) -> i64;
}

impl RecordStamp for CustomerRecord {
    fn record_id(&self) -> &str {
        &self.id
    }

    fn created_epoch_millis(&self) -> i64 {
        CustomerRecord::created_epoch_millis(self)
    }
}

impl RecordStamp for CompanyRecord {
    fn record_id(&self) -> &str {
        &self.id
    }

    fn created_epoch_millis(&self) -> i64 {
        CompanyRecord::created_epoch_millis(self)
    }
}

/// Pick the surviving record. An explicit id must name a fetched group
/// member; otherwise the earliest-created record wins, with ties broken by
/// ascending id so repeated runs agree.
pub fn select_master<'r, R: RecordStamp>(
    group: &'r [R],
    explicit_id: Option<&str>,
) -> Result<&'r R> {
    if let Some(id) = explicit_id {
        return group
            .iter()
            .find(|record| record.record_id() == id)
            .ok_or_else(|| OpsdeskError::MasterNotFound(id.to_string()));
    }

    group
        .iter()
        .min_by_key(|record| (record.created_epoch_millis(), record.record_id().to_string()))
        .ok_or_else(|| OpsdeskError::Validation("cannot select a master from an empty group".into()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Timestamp;
    use serde_json::json;

    fn customer_created_at(id: &str, created_at: Option<i64>) -> CustomerRecord {
        let mut record = CustomerRecord::new(id, id);
        record.created_at = created_at.map(|secs| Timestamp::from_epoch_seconds(secs, 0));
        record
    }

    #[test]
    fn test_earliest_created_wins() {
        let group = vec![
            customer_created_at("late", Some(2_000)),
            customer_created_at("early", Some(1_000)),
        ];
        assert_eq!(select_master(&group, None).unwrap().id, "early");
    }

    #[test]
    fn test_missing_timestamp_counts_as_oldest() {
        let group = vec![
            customer_created_at("stamped", Some(1_000)),
            customer_created_at("unstamped", None),
        ];
        assert_eq!(select_master(&group, None).unwrap().id, "unstamped");
    }

    #[test]
    fn test_structured_and_epoch_timestamps_compare() {
        let structured: CustomerRecord = serde_json::from_value(json!({
            "id": "structured",
            "createdAt": {"_seconds": 500, "_nanoseconds": 0}
        }))
        .unwrap();
        let epoch: CustomerRecord =
            serde_json::from_value(json!({"id": "epoch", "createdAt": 1_000})).unwrap();

        let group = vec![epoch, structured];
        assert_eq!(select_master(&group, None).unwrap().id, "structured");
    }

    #[test]
    fn test_ties_break_by_id_stably() {
        let group = vec![
            customer_created_at("b", Some(1_000)),
            customer_created_at("a", Some(1_000)),
        ];
        for _ in 0..3 {
            assert_eq!(select_master(&group, None).unwrap().id, "a");
        }
    }

    #[test]
    fn test_explicit_master_must_be_in_group() {
        let group = vec![
            customer_created_at("a", Some(1_000)),
            customer_created_at("b", Some(2_000)),
        ];

        assert_eq!(select_master(&group, Some("b")).unwrap().id, "b");
        assert!(matches!(
            select_master(&group, Some("ghost")),
            Err(OpsdeskError::MasterNotFound(_))
        ));
    }
}
