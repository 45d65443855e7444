use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum AbstractState {
    Submitted,
    Withdrawn,
    Accepted,
    Rejected,
    Merged,
    Duplicate,
}

impl AbstractState {
    pub fn as_str(&self) -> &'static str {
        match self {
            AbstractState::Submitted => "submitted",
            AbstractState::Withdrawn => "withdrawn",
            AbstractState::Accepted => "accepted",
            AbstractState::Rejected => "rejected",
            AbstractState::Merged => "merged",
            AbstractState::Duplicate => "duplicate",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "submitted" => Some(AbstractState::Submitted),
            "withdrawn" => Some(AbstractState::Withdrawn),
            "accepted" => Some(AbstractState::Accepted),
            "rejected" => Some(AbstractState::Rejected),
            "merged" => Some(AbstractState::Merged),
            "duplicate" => Some(AbstractState::Duplicate),
            _ => None,
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            AbstractState::Submitted => "Submitted",
            AbstractState::Withdrawn => "Withdrawn",
            AbstractState::Accepted => "Accepted",
            AbstractState::Rejected => "Rejected",
            AbstractState::Merged => "Merged",
            AbstractState::Duplicate => "Duplicate",
        }
    }

    /// Whether another abstract may be merged into, or marked as a duplicate of, one in this state.
    pub fn can_be_target(&self) -> bool {
        !matches!(
            self,
            AbstractState::Withdrawn | AbstractState::Merged | AbstractState::Duplicate
        )
    }
}

/// The decision taken when judging an abstract.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Judgment {
    Accept,
    Reject,
    Merge,
    MarkAsDuplicate,
}

impl Judgment {
    pub const ALL: [Judgment; 4] = [
        Judgment::Accept,
        Judgment::Reject,
        Judgment::Merge,
        Judgment::MarkAsDuplicate,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Judgment::Accept => "accept",
            Judgment::Reject => "reject",
            Judgment::Merge => "merge",
            Judgment::MarkAsDuplicate => "mark_as_duplicate",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        Judgment::ALL.into_iter().find(|j| j.as_str() == value)
    }

    pub fn title(&self) -> &'static str {
        match self {
            Judgment::Accept => "Accept",
            Judgment::Reject => "Reject",
            Judgment::Merge => "Merge",
            Judgment::MarkAsDuplicate => "Mark as duplicate",
        }
    }

    /// State an abstract ends up in after this judgment.
    pub fn resulting_state(&self) -> AbstractState {
        match self {
            Judgment::Accept => AbstractState::Accepted,
            Judgment::Reject => AbstractState::Rejected,
            Judgment::Merge => AbstractState::Merged,
            Judgment::MarkAsDuplicate => AbstractState::Duplicate,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Abstract {
    pub id: i64,
    pub event_id: i64,
    pub friendly_id: i64, // Sequential number within the event
    pub title: String,
    pub description: String,
    pub submitter_id: i64,
    pub state: AbstractState,
    pub submitted_dt: String,
    pub judge_id: Option<i64>,
    pub judgment_dt: Option<String>,
    pub judgment_comment: String,
    pub accepted_track_id: Option<i64>,
    pub merged_into_id: Option<i64>,
    pub duplicate_of_id: Option<i64>,
}

/// Minimal view of another abstract in the same event, used to validate merge and duplicate targets.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct AbstractSummary {
    pub id: i64,
    pub friendly_id: i64,
    pub title: String,
    pub state: AbstractState,
}
