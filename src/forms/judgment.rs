use crate::forms::{FormData, FormState};
use crate::models::abstracts::{Abstract, AbstractState, AbstractSummary, Judgment};
use crate::models::track::Track;

pub const FIELD_JUDGMENT: &str = "judgment";
pub const FIELD_ACCEPTED_TRACK: &str = "accepted_track";
pub const FIELD_MERGED_INTO: &str = "merged_into";
pub const FIELD_DUPLICATE_OF: &str = "duplicate_of";
pub const FIELD_JUDGMENT_COMMENT: &str = "judgment_comment";
pub const FIELD_SEND_NOTIFICATIONS: &str = "send_notifications";

const FIELDS: [&str; 6] = [
    FIELD_JUDGMENT,
    FIELD_ACCEPTED_TRACK,
    FIELD_MERGED_INTO,
    FIELD_DUPLICATE_OF,
    FIELD_JUDGMENT_COMMENT,
    FIELD_SEND_NOTIFICATIONS,
];

/// The accept/reject/merge decision form of an abstract.
#[derive(Debug, Clone, PartialEq)]
pub struct JudgmentForm {
    pub abstract_id: i64,
    pub abstract_state: AbstractState,
    /// Tracks of the event an accepted abstract may be assigned to.
    pub tracks: Vec<Track>,
    /// Other abstracts of the event that can be merge or duplicate targets.
    pub candidates: Vec<AbstractSummary>,
    pub state: FormState,
}

/// Judgment-specific part of the cleaned form data.
#[derive(Debug, Clone, PartialEq)]
pub struct JudgmentData {
    pub judgment: Judgment,
    pub accepted_track_id: Option<i64>,
    pub merged_into_id: Option<i64>,
    pub duplicate_of_id: Option<i64>,
    pub send_notifications: bool,
}

/// Part of the cleaned form data that is stored directly on the abstract.
#[derive(Debug, Clone, PartialEq)]
pub struct AbstractData {
    pub judgment_comment: String,
}

impl JudgmentForm {
    pub fn new(abstract_: &Abstract, tracks: Vec<Track>, candidates: Vec<AbstractSummary>) -> Self {
        let candidates = candidates
            .into_iter()
            .filter(|c| c.id != abstract_.id && c.state.can_be_target())
            .collect();
        Self {
            abstract_id: abstract_.id,
            abstract_state: abstract_.state,
            tracks,
            candidates,
            state: FormState::default(),
        }
    }

    fn target(&mut self, field: &str) -> Option<i64> {
        let Some(id) = self.state.optional_id(field) else {
            if self.state.error(field).is_none() {
                self.state.add_error(field, "This field is required.");
            }
            return None;
        };
        if id == self.abstract_id {
            self.state.add_error(field, "An abstract cannot be merged with itself.");
            return None;
        }
        if !self.candidates.iter().any(|c| c.id == id) {
            self.state.add_error(field, "Not a valid choice");
            return None;
        }
        Some(id)
    }

    /// Validates the submitted data and splits it into judgment and abstract data.
    pub fn validate(&mut self, data: &FormData) -> Option<(JudgmentData, AbstractData)> {
        self.state.load(data, FIELDS.map(String::from));

        if self.abstract_state != AbstractState::Submitted {
            self.state
                .add_error(FIELD_JUDGMENT, "This abstract has already been judged.");
            return None;
        }

        let judgment = match self.state.value(FIELD_JUDGMENT) {
            "" => {
                self.state.add_error(FIELD_JUDGMENT, "This field is required.");
                None
            }
            raw => {
                let judgment = Judgment::parse(raw);
                if judgment.is_none() {
                    self.state.add_error(FIELD_JUDGMENT, "Not a valid choice");
                }
                judgment
            }
        };

        let mut accepted_track_id = None;
        let mut merged_into_id = None;
        let mut duplicate_of_id = None;
        match judgment {
            Some(Judgment::Accept) => {
                accepted_track_id = self.state.optional_id(FIELD_ACCEPTED_TRACK);
                if let Some(track_id) = accepted_track_id {
                    if !self.tracks.iter().any(|t| t.id == track_id) {
                        self.state.add_error(FIELD_ACCEPTED_TRACK, "Not a valid choice");
                    }
                }
            }
            Some(Judgment::Merge) => merged_into_id = self.target(FIELD_MERGED_INTO),
            Some(Judgment::MarkAsDuplicate) => duplicate_of_id = self.target(FIELD_DUPLICATE_OF),
            Some(Judgment::Reject) | None => {}
        }

        if !self.state.is_valid() {
            return None;
        }
        let judgment_data = JudgmentData {
            judgment: judgment?,
            accepted_track_id,
            merged_into_id,
            duplicate_of_id,
            send_notifications: data.flag(&self.state.field_name(FIELD_SEND_NOTIFICATIONS)),
        };
        let abstract_data = AbstractData {
            judgment_comment: self.state.value(FIELD_JUDGMENT_COMMENT).to_string(),
        };
        Some((judgment_data, abstract_data))
    }
}
