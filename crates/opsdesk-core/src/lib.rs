pub mod config;
pub mod dedup;
pub mod error;
pub mod models;
pub mod storage;

pub use config::{AppConfig, CoreConfig, ServerConfig};
pub use error::{OpsdeskError, Result};
pub use models::*;

pub use storage::batch::{BatchOp, Collection, WriteBatch};
pub use storage::database::Database;
pub use storage::repositories::{
    AuditRepository, CompanyRepository, CustomerRepository, DependentRepository, LinkRepository,
    Repository,
};

pub use dedup::{
    BulkMergeReport, DuplicateGroup, EntityMergeReport, MatchType, MergeLock, MergeOutcome,
    NoopMergeLock,
};
