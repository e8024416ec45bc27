//! Duplicate-candidate detection over one entity collection.
//!
//! Grouping is seed-based, not transitive closure: each ungrouped record in
//! collection order becomes a seed and pulls in every still-ungrouped record
//! that matches the seed's own normalized email or phone. A record that
//! matches a member of a group but not its seed stays out. Known
//! approximation, kept deliberately — upgrading to union-find clustering
//! would change which records get merged together.

use serde::{Deserialize, Serialize};

use crate::models::{CompanyRecord, CustomerRecord};

use super::normalize::{normalize_email, normalize_phone};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchType {
    Email,
    Phone,
}

impl std::fmt::Display for MatchType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MatchType::Email => write!(f, "email"),
            MatchType::Phone => write!(f, "phone"),
        }
    }
}

/// One detected duplicate cluster. `member_ids` lists the seed first, then
/// its matches in collection order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DuplicateGroup {
    pub match_type: MatchType,
    pub match_value: String,
    pub member_ids: Vec<String>,
}

impl DuplicateGroup {
    /// Stable identifier used to report per-group failures in bulk mode.
    pub fn key(&self) -> String {
        format!("{}:{}", self.match_type, self.match_value)
    }
}

/// Normalized comparison keys for one record.
#[derive(Debug, Clone)]
pub struct MatchKeys {
    pub id: String,
    pub email: String,
    pub phone: String,
}

/// Anything the matcher can scan: exposes an id plus raw email/phone.
pub trait Matchable {
    fn match_keys(&self) -> MatchKeys;
}

impl Matchable for CustomerRecord {
    fn match_keys(&self) -> MatchKeys {
        MatchKeys {
            id: self.id.clone(),
            email: normalize_email(&self.email),
            phone: normalize_phone(&self.phone),
        }
    }
}

impl Matchable for CompanyRecord {
    fn match_keys(&self) -> MatchKeys {
        MatchKeys {
            id: self.id.clone(),
            email: normalize_email(&self.email),
            phone: normalize_phone(&self.phone),
        }
    }
}

/// Partition the collection into duplicate groups. O(n²); acceptable for one
/// organization's admin dataset.
pub fn find_duplicate_groups<R: Matchable>(records: &[R]) -> Vec<DuplicateGroup> {
    let keys: Vec<MatchKeys> = records.iter().map(Matchable::match_keys).collect();
    let mut grouped = vec![false; keys.len()];
    let mut groups = Vec::new();

    for seed in 0..keys.len() {
        if grouped[seed] {
            continue;
        }
        let seed_email = keys[seed].email.clone();
        let seed_phone = keys[seed].phone.clone();
        if seed_email.is_empty() && seed_phone.is_empty() {
            continue;
        }

        let mut members = vec![seed];
        for other in 0..keys.len() {
            if other == seed || grouped[other] {
                continue;
            }
            let email_hit = !seed_email.is_empty() && keys[other].email == seed_email;
            let phone_hit = !seed_phone.is_empty() && keys[other].phone == seed_phone;
            if email_hit || phone_hit {
                members.push(other);
            }
        }

        if members.len() < 2 {
            continue;
        }
        for &member in &members {
            grouped[member] = true;
        }

        let (match_type, match_value) = if seed_email.is_empty() {
            (MatchType::Phone, seed_phone)
        } else {
            (MatchType::Email, seed_email)
        };

        groups.push(DuplicateGroup {
            match_type,
            match_value,
            member_ids: members.into_iter().map(|i| keys[i].id.clone()).collect(),
        });
    }

    groups
}

#[cfg(test)]
mod tests {
    use super::*;

    fn customer(id: &str, email: &str, phone: &str) -> CustomerRecord {
        let mut record = CustomerRecord::new(id, id);
        record.email = email.to_string();
        record.phone = phone.to_string();
        record
    }

    #[test]
    fn test_groups_by_normalized_email() {
        let records = vec![
            customer("a", "ali@x.com", ""),
            customer("b", " ALI@X.com ", ""),
            customer("c", "other@y.com", ""),
        ];

        let groups = find_duplicate_groups(&records);
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].match_type, MatchType::Email);
        assert_eq!(groups[0].match_value, "ali@x.com");
        assert_eq!(groups[0].member_ids, vec!["a", "b"]);
    }

    #[test]
    fn test_groups_by_phone_when_seed_email_empty() {
        let records = vec![
            customer("a", "", "0555 111 22 33"),
            customer("b", "", "+90 555 111 22 33"),
        ];

        let groups = find_duplicate_groups(&records);
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].match_type, MatchType::Phone);
        assert_eq!(groups[0].match_value, "5551112233");
    }

    #[test]
    fn test_email_wins_as_match_type_when_seed_has_both() {
        let records = vec![
            customer("a", "ali@x.com", "0555 111 22 33"),
            customer("b", "", "0555 111 22 33"),
        ];

        let groups = find_duplicate_groups(&records);
        assert_eq!(groups.len(), 1);
        // Matched via phone, but the seed's email names the group.
        assert_eq!(groups[0].match_type, MatchType::Email);
        assert_eq!(groups[0].member_ids, vec!["a", "b"]);
    }

    #[test]
    fn test_records_with_no_keys_are_skipped() {
        let records = vec![customer("a", "", ""), customer("b", "", "")];
        assert!(find_duplicate_groups(&records).is_empty());
    }

    #[test]
    fn test_matching_is_not_transitive() {
        // A↔B share a phone; B↔C share an email A knows nothing about.
        // Seed A claims B, so C is left ungrouped: C matches a member of the
        // group but not its seed.
        let records = vec![
            customer("a", "a@x.com", "0555 111 22 33"),
            customer("b", "b@y.com", "0555 111 22 33"),
            customer("c", "b@y.com", ""),
        ];

        let groups = find_duplicate_groups(&records);
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].member_ids, vec!["a", "b"]);
    }

    #[test]
    fn test_already_grouped_record_excludes_later_email_twin() {
        // S claims Z by phone first; X shares Z's email but arrives after Z
        // is grouped, so X ends up in no group at all.
        let records = vec![
            customer("s", "", "0555 111 22 33"),
            customer("z", "z@x.com", "555 111 22 33"),
            customer("x", "z@x.com", ""),
        ];

        let groups = find_duplicate_groups(&records);
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].member_ids, vec!["s", "z"]);
        assert!(!groups[0].member_ids.contains(&"x".to_string()));
    }

    #[test]
    fn test_detection_is_deterministic_across_runs() {
        let records = vec![
            customer("a", "x@x.com", ""),
            customer("b", "x@x.com", ""),
            customer("c", "", "0111 222 33 44"),
            customer("d", "", "111 222 33 44"),
        ];

        let first = find_duplicate_groups(&records);
        let second = find_duplicate_groups(&records);
        assert_eq!(first, second);
        assert_eq!(first.len(), 2);
    }
}
