//! Integration item model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One object surfaced from a connected integration (e.g. a CRM contact)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IntegrationItem {
    pub id: Option<String>,
    #[serde(rename = "type")]
    pub item_type: String,
    pub name: String,
    pub creation_time: Option<DateTime<Utc>>,
    pub last_modified_time: Option<DateTime<Utc>>,
    pub directory: bool,
    pub parent_id: Option<String>,
    pub url: Option<String>,
}
