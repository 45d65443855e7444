use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Track {
    pub id: i64,
    pub event_id: i64,
    pub title: String,
}
