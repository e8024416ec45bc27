use crate::error::Result;
use crate::models::MergeAudit;
use crate::storage::batch::Collection;
use crate::storage::database::Database;

use super::fetch_all;

/// Read access to the merge audit trail. Audit rows are only ever written
/// through the merge batch, so this repository has no save path.
pub struct AuditRepository<'a> {
    db: &'a Database,
}

impl<'a> AuditRepository<'a> {
    pub fn new(db: &'a Database) -> Self {
        Self { db }
    }

    pub fn list_all(&self) -> Result<Vec<MergeAudit>> {
        fetch_all(self.db, Collection::MergeAudit)
    }

    pub fn count(&self) -> Result<usize> {
        self.db.count(Collection::MergeAudit)
    }
}
