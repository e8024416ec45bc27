mod audit;
mod coerce;
mod company;
mod customer;
mod dependents;
mod link;

pub use audit::*;
pub use coerce::*;
pub use company::*;
pub use customer::*;
pub use dependents::*;
pub use link::*;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::OpsdeskError;

/// The two mergeable entity collections. Merges never cross kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    Customer,
    Company,
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntityKind::Customer => write!(f, "customer"),
            EntityKind::Company => write!(f, "company"),
        }
    }
}

impl FromStr for EntityKind {
    type Err = OpsdeskError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "customer" => Ok(EntityKind::Customer),
            "company" => Ok(EntityKind::Company),
            other => Err(OpsdeskError::UnknownEntityType(other.to_string())),
        }
    }
}
