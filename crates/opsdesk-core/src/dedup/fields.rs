//! Field merging: combine the master and its duplicates into the surviving
//! attribute set. Scalars follow non-empty-wins precedence (master first,
//! then duplicates in group fetch order); aggregate counters are summed;
//! company notes are concatenated as lists.

use serde_json::Value;

use crate::models::{CompanyRecord, CustomerRecord, Timestamp, to_note_list};

/// Master's value if non-empty, else the first non-empty duplicate value,
/// else empty.
fn prefer_non_empty<'v>(master: &'v str, duplicates: &[&'v str]) -> String {
    if !master.is_empty() {
        return master.to_string();
    }
    duplicates
        .iter()
        .find(|value| !value.is_empty())
        .map(|value| value.to_string())
        .unwrap_or_default()
}

/// Compute the merged customer document. Duplicates must be in group fetch
/// order; their order decides which value fills an empty master field.
pub fn merge_customer_fields(
    master: &CustomerRecord,
    duplicates: &[&CustomerRecord],
    operator: &str,
    merged_at: Timestamp,
) -> CustomerRecord {
    let mut merged = master.clone();

    let pick = |field: fn(&CustomerRecord) -> &str| {
        let values: Vec<&str> = duplicates.iter().map(|d| field(*d)).collect();
        prefer_non_empty(field(master), &values)
    };

    merged.name = pick(|r| &r.name);
    merged.email = pick(|r| &r.email);
    merged.phone = pick(|r| &r.phone);

    merged.company_info.name = pick(|r| &r.company_info.name);
    merged.company_info.position = pick(|r| &r.company_info.position);
    merged.company_info.website = pick(|r| &r.company_info.website);
    merged.company_info.address = pick(|r| &r.company_info.address);
    merged.company_info.city = pick(|r| &r.company_info.city);
    merged.company_info.country = pick(|r| &r.company_info.country);

    merged.tax_info.office = pick(|r| &r.tax_info.office);
    merged.tax_info.number = pick(|r| &r.tax_info.number);

    for duplicate in duplicates {
        merged.stats.total_conversations += duplicate.stats.total_conversations;
        merged.stats.total_cases += duplicate.stats.total_cases;
        merged.stats.cases_won += duplicate.stats.cases_won;
        merged.stats.cases_lost += duplicate.stats.cases_lost;
        merged.stats.cases_open += duplicate.stats.cases_open;
        merged.stats.total_value += duplicate.stats.total_value;
    }

    merged
        .merged_ids
        .extend(duplicates.iter().map(|d| d.id.clone()));
    merged.merged_at = Some(merged_at);
    merged.merged_by = Some(operator.to_string());

    merged
}

/// Compute the merged company document.
pub fn merge_company_fields(
    master: &CompanyRecord,
    duplicates: &[&CompanyRecord],
    operator: &str,
    merged_at: Timestamp,
) -> CompanyRecord {
    let mut merged = master.clone();

    let pick = |field: fn(&CompanyRecord) -> &str| {
        let values: Vec<&str> = duplicates.iter().map(|d| field(*d)).collect();
        prefer_non_empty(field(master), &values)
    };

    merged.name = pick(|r| &r.name);
    merged.email = pick(|r| &r.email);
    merged.phone = pick(|r| &r.phone);
    merged.contact_person = pick(|r| &r.contact_person);
    merged.contact_email = pick(|r| &r.contact_email);
    merged.contact_phone = pick(|r| &r.contact_phone);
    merged.address = pick(|r| &r.address);
    merged.website = pick(|r| &r.website);
    merged.tax_office = pick(|r| &r.tax_office);
    merged.tax_number = pick(|r| &r.tax_number);

    for duplicate in duplicates {
        merged.total_projects += duplicate.total_projects;
        merged.total_revenue += duplicate.total_revenue;
    }

    merged.notes = merge_notes(master, duplicates);

    merged
        .merged_ids
        .extend(duplicates.iter().map(|d| d.id.clone()));
    merged.merged_at = Some(merged_at);
    merged.merged_by = Some(operator.to_string());

    merged
}

/// Master's notes first, then each duplicate's in group order, every side
/// coerced to a list. One level only, no dedup of identical note text.
fn merge_notes(master: &CompanyRecord, duplicates: &[&CompanyRecord]) -> Option<Value> {
    let mut notes = to_note_list(master.notes.as_ref());
    for duplicate in duplicates {
        notes.extend(to_note_list(duplicate.notes.as_ref()));
    }

    if notes.is_empty() {
        None
    } else {
        Some(Value::Array(notes))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_customer_scalars_prefer_master_then_first_duplicate() {
        let mut master = CustomerRecord::new("m", "");
        master.email = "master@x.com".to_string();
        master.company_info.city = String::new();

        let mut dup_one = CustomerRecord::new("d1", "Dup One");
        dup_one.email = "dup1@x.com".to_string();
        dup_one.company_info.city = "Izmir".to_string();

        let mut dup_two = CustomerRecord::new("d2", "Dup Two");
        dup_two.company_info.city = "Ankara".to_string();

        let merged = merge_customer_fields(&master, &[&dup_one, &dup_two], "op_1", Timestamp::now());
        assert_eq!(merged.email, "master@x.com");
        assert_eq!(merged.name, "Dup One");
        assert_eq!(merged.company_info.city, "Izmir");
    }

    #[test]
    fn test_customer_stats_are_summed() {
        let mut master = CustomerRecord::new("m", "M");
        master.stats.total_conversations = 2;
        master.stats.cases_won = 1;
        master.stats.total_value = 100.0;

        let mut dup = CustomerRecord::new("d", "D");
        dup.stats.total_conversations = 3;
        dup.stats.cases_won = 2;
        dup.stats.cases_open = 4;
        dup.stats.total_value = 50.5;

        let merged = merge_customer_fields(&master, &[&dup], "op_1", Timestamp::now());
        assert_eq!(merged.stats.total_conversations, 5);
        assert_eq!(merged.stats.cases_won, 3);
        assert_eq!(merged.stats.cases_open, 4);
        assert!((merged.stats.total_value - 150.5).abs() < f64::EPSILON);
    }

    #[test]
    fn test_customer_merge_records_bookkeeping() {
        let master = CustomerRecord::new("m", "M");
        let dup_one = CustomerRecord::new("d1", "D1");
        let dup_two = CustomerRecord::new("d2", "D2");

        let merged =
            merge_customer_fields(&master, &[&dup_one, &dup_two], "operator-7", Timestamp::now());
        assert_eq!(merged.merged_ids, vec!["d1", "d2"]);
        assert_eq!(merged.merged_by.as_deref(), Some("operator-7"));
        assert!(merged.merged_at.is_some());
    }

    #[test]
    fn test_empty_master_phone_takes_duplicate_phone() {
        // Scenario from the acceptance checklist: A older with email only,
        // B newer with a phone.
        let mut a = CustomerRecord::new("a", "Ali");
        a.email = "ali@x.com".to_string();

        let mut b = CustomerRecord::new("b", "Ali");
        b.email = "ALI@X.com ".to_string();
        b.phone = "0555 111 22 33".to_string();

        let merged = merge_customer_fields(&a, &[&b], "op", Timestamp::now());
        assert_eq!(merged.email, "ali@x.com");
        assert_eq!(merged.phone, "0555 111 22 33");
    }

    #[test]
    fn test_company_aggregates_and_scalars() {
        let mut master = CompanyRecord::new("m", "Acme");
        master.total_projects = 2;
        master.total_revenue = 10_000.0;
        master.website = String::new();

        let mut dup = CompanyRecord::new("d", "Acme Ltd");
        dup.total_projects = 3;
        dup.total_revenue = 5_000.0;
        dup.website = "acme.example".to_string();

        let merged = merge_company_fields(&master, &[&dup], "op", Timestamp::now());
        assert_eq!(merged.name, "Acme");
        assert_eq!(merged.website, "acme.example");
        assert_eq!(merged.total_projects, 5);
        assert!((merged.total_revenue - 15_000.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_company_notes_concatenate_master_first_without_dedup() {
        let mut master = CompanyRecord::new("m", "Acme");
        master.notes = Some(json!("call friday"));

        let mut dup_one = CompanyRecord::new("d1", "Acme");
        dup_one.notes = Some(json!(["call friday", "owes invoice"]));

        let dup_two = CompanyRecord::new("d2", "Acme");

        let merged = merge_company_fields(&master, &[&dup_one, &dup_two], "op", Timestamp::now());
        let notes = merged.notes.unwrap();
        let items = notes.as_array().unwrap();
        assert_eq!(
            items,
            &vec![json!("call friday"), json!("call friday"), json!("owes invoice")]
        );
    }

    #[test]
    fn test_company_without_any_notes_stays_noteless() {
        let master = CompanyRecord::new("m", "Acme");
        let dup = CompanyRecord::new("d", "Acme");

        let merged = merge_company_fields(&master, &[&dup], "op", Timestamp::now());
        assert!(merged.notes.is_none());
    }
}
