use serde::{Deserialize, Serialize};

/// Company metadata from its profile page
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Company {
    pub name: String,
    pub slug: String,
    /// Count reported upstream; advisory, the page cap may hide some of them
    pub total_complaints: u64,
}

/// One row of a company search
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompanySummary {
    pub name: String,
    pub slug: String,
}
