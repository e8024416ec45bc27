//! Duplicate detection and merge engine for customer and company records.

pub mod bulk;
pub mod fields;
pub mod lock;
pub mod master;
pub mod matcher;
pub mod merge;
pub mod normalize;
pub mod plan;

pub use bulk::{
    BulkMergeReport, EntityMergeReport, GroupFailure, detect_companies, detect_customers,
    merge_all, merge_detected_groups,
};
pub use lock::{MergeLease, MergeLock, NoopMergeLock};
pub use master::select_master;
pub use matcher::{DuplicateGroup, MatchType, Matchable, find_duplicate_groups};
pub use merge::{merge_company_group, merge_customer_group, merge_group};
pub use normalize::{normalize_email, normalize_phone, normalize_text};
pub use plan::{MergeOutcome, MergePlan, master_link_wins};
