//! Staged write batches.
//!
//! Every write a merge performs — dependent-record updates, link
//! updates/deletes, the master rewrite, duplicate deletions, the audit row —
//! is staged as an op here and committed in one SQLite transaction by
//! [`crate::storage::database::Database::commit`]. Either all ops land or
//! none do.

use serde::Serialize;
use serde_json::Value;

use crate::error::Result;

/// The document collections the console stores.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Collection {
    Customers,
    Companies,
    Links,
    Conversations,
    Cases,
    Activities,
    Proformas,
    Contracts,
    IntegrationRecords,
    PricingCalculations,
    MergeAudit,
}

impl Collection {
    pub const ALL: [Collection; 11] = [
        Collection::Customers,
        Collection::Companies,
        Collection::Links,
        Collection::Conversations,
        Collection::Cases,
        Collection::Activities,
        Collection::Proformas,
        Collection::Contracts,
        Collection::IntegrationRecords,
        Collection::PricingCalculations,
        Collection::MergeAudit,
    ];

    pub fn table(&self) -> &'static str {
        match self {
            Collection::Customers => "customers",
            Collection::Companies => "companies",
            Collection::Links => "links",
            Collection::Conversations => "conversations",
            Collection::Cases => "cases",
            Collection::Activities => "activities",
            Collection::Proformas => "proformas",
            Collection::Contracts => "contracts",
            Collection::IntegrationRecords => "integration_records",
            Collection::PricingCalculations => "pricing_calculations",
            Collection::MergeAudit => "merge_audit",
        }
    }
}

#[derive(Debug, Clone)]
pub enum BatchOp {
    Put {
        collection: Collection,
        id: String,
        doc: Value,
    },
    Delete {
        collection: Collection,
        id: String,
    },
}

/// An ordered buffer of put/delete ops. Building the batch performs no I/O;
/// nothing touches the store until the batch is committed.
#[derive(Debug, Default)]
pub struct WriteBatch {
    ops: Vec<BatchOp>,
}

impl WriteBatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn put<T: Serialize>(&mut self, collection: Collection, id: &str, record: &T) -> Result<()> {
        let doc = serde_json::to_value(record)?;
        self.ops.push(BatchOp::Put {
            collection,
            id: id.to_string(),
            doc,
        });
        Ok(())
    }

    pub fn delete(&mut self, collection: Collection, id: &str) {
        self.ops.push(BatchOp::Delete {
            collection,
            id: id.to_string(),
        });
    }

    pub fn ops(&self) -> &[BatchOp] {
        &self.ops
    }

    pub fn len(&self) -> usize {
        self.ops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }
}
