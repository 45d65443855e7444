use serde::{Deserialize, Serialize};

/// An attachment uploaded together with an abstract.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct AbstractFile {
    pub id: i64,
    pub abstract_id: i64,
    pub filename: String,
    pub content_type: String,
    pub size: i64,
    #[serde(skip_serializing)]
    pub storage_file_id: String, // Name of the blob inside the storage directory
    pub created_dt: String,
}
