// src/models/review.rs
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ProposedAction {
    Accept,
    Reject,
    Merge,
    MarkAsDuplicate,
}

impl ProposedAction {
    pub const ALL: [ProposedAction; 4] = [
        ProposedAction::Accept,
        ProposedAction::Reject,
        ProposedAction::Merge,
        ProposedAction::MarkAsDuplicate,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ProposedAction::Accept => "accept",
            ProposedAction::Reject => "reject",
            ProposedAction::Merge => "merge",
            ProposedAction::MarkAsDuplicate => "mark_as_duplicate",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        ProposedAction::ALL.into_iter().find(|a| a.as_str() == value)
    }

    pub fn title(&self) -> &'static str {
        match self {
            ProposedAction::Accept => "Accept",
            ProposedAction::Reject => "Reject",
            ProposedAction::Merge => "Merge",
            ProposedAction::MarkAsDuplicate => "Mark as duplicate",
        }
    }

    /// Merge and duplicate proposals point at another abstract.
    pub fn needs_related_abstract(&self) -> bool {
        matches!(self, ProposedAction::Merge | ProposedAction::MarkAsDuplicate)
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct AbstractReviewRating {
    pub id: Option<i64>, // None until persisted
    pub question_id: i64,
    pub value: i64,
}

/// One user's review of an abstract for one track.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct AbstractReview {
    pub id: Option<i64>, // None until persisted
    pub abstract_id: i64,
    pub track_id: i64,
    pub user_id: i64,
    pub user_name: String,
    pub proposed_action: ProposedAction,
    pub proposed_related_abstract_id: Option<i64>,
    pub comment: String,
    pub created_dt: String,
    pub modified_dt: Option<String>,
    pub ratings: Vec<AbstractReviewRating>,
}

impl AbstractReview {
    pub fn get_rating(&self, question_id: i64) -> Option<&AbstractReviewRating> {
        self.ratings.iter().find(|r| r.question_id == question_id)
    }

    /// Sets the answer to a question, reusing the existing rating for it or appending a new one.
    pub fn set_rating(&mut self, question_id: i64, value: i64) {
        match self.ratings.iter_mut().find(|r| r.question_id == question_id) {
            Some(rating) => rating.value = value,
            None => self.ratings.push(AbstractReviewRating {
                id: None,
                question_id,
                value,
            }),
        }
    }
}
