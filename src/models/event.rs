use serde::{Deserialize, Serialize};

pub const DEFAULT_RATING_SCALE_MAX: i64 = 5;

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Event {
    pub id: i64,
    pub title: String,
    pub is_protected: bool, // Only managers and granted users may see a protected event
    pub settings: ReviewSettings,
}

/// Per-event abstract reviewing settings.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ReviewSettings {
    /// Ratings are integers from 0 up to and including this value.
    pub rating_scale_max: i64,
    /// Whether track conveners may judge abstracts in their tracks.
    pub allow_convener_judgment: bool,
}

impl Default for ReviewSettings {
    fn default() -> Self {
        Self {
            rating_scale_max: DEFAULT_RATING_SCALE_MAX,
            allow_convener_judgment: false,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ReviewQuestion {
    pub id: i64,
    pub event_id: i64,
    pub text: String,
    pub position: i64,
}

impl ReviewQuestion {
    /// Name of the form field holding the answer to this question.
    pub fn field_name(&self) -> String {
        format!("question_{}", self.id)
    }
}
