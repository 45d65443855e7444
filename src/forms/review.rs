use crate::forms::{FormData, FormState};
use crate::models::abstracts::{Abstract, AbstractSummary};
use crate::models::event::{ReviewQuestion, ReviewSettings};
use crate::models::review::{AbstractReview, ProposedAction};

pub const FIELD_PROPOSED_ACTION: &str = "proposed_action";
pub const FIELD_RELATED_ABSTRACT: &str = "proposed_related_abstract";
pub const FIELD_COMMENT: &str = "comment";

/// Review form for one track of an abstract.
///
/// Field names carry the `track-{id}` prefix so several forms can live on the
/// same page.
#[derive(Debug, Clone, PartialEq)]
pub struct ReviewForm {
    pub track_id: i64,
    pub questions: Vec<ReviewQuestion>,
    pub rating_scale_max: i64,
    pub state: FormState,
}

/// Cleaned data of a valid review form.
#[derive(Debug, Clone, PartialEq)]
pub struct ReviewFormData {
    pub answers: Vec<(i64, i64)>, // (question id, rating)
    pub proposed_action: ProposedAction,
    pub proposed_related_abstract_id: Option<i64>,
    pub comment: String,
}

impl ReviewFormData {
    /// Copies the form data onto a review, reusing its ratings by question id.
    pub fn populate_obj(&self, review: &mut AbstractReview) {
        review.proposed_action = self.proposed_action;
        review.proposed_related_abstract_id = self.proposed_related_abstract_id;
        review.comment = self.comment.clone();
        for &(question_id, value) in &self.answers {
            review.set_rating(question_id, value);
        }
    }
}

/// Creates an empty review form for the event's questions.
pub fn make_review_form(
    settings: &ReviewSettings,
    questions: &[ReviewQuestion],
    track_id: i64,
) -> ReviewForm {
    ReviewForm {
        track_id,
        questions: questions.to_vec(),
        rating_scale_max: settings.rating_scale_max,
        state: FormState::with_prefix(format!("track-{}", track_id)),
    }
}

/// Creates a review form prefilled with the user's existing review, if any.
pub fn build_review_form(
    settings: &ReviewSettings,
    questions: &[ReviewQuestion],
    track_id: i64,
    review: Option<&AbstractReview>,
) -> ReviewForm {
    let mut form = make_review_form(settings, questions, track_id);
    if let Some(review) = review {
        form.state.set(FIELD_PROPOSED_ACTION, review.proposed_action.as_str());
        form.state.set(
            FIELD_RELATED_ABSTRACT,
            review
                .proposed_related_abstract_id
                .map(|id| id.to_string())
                .unwrap_or_default(),
        );
        form.state.set(FIELD_COMMENT, review.comment.clone());
        for rating in &review.ratings {
            form.state.set(&format!("question_{}", rating.question_id), rating.value.to_string());
        }
    }
    form
}

impl ReviewForm {
    fn field_names(&self) -> Vec<String> {
        self.questions
            .iter()
            .map(ReviewQuestion::field_name)
            .chain([FIELD_PROPOSED_ACTION, FIELD_RELATED_ABSTRACT, FIELD_COMMENT].map(String::from))
            .collect()
    }

    /// Validates submitted data, keeping it in the form for re-rendering.
    ///
    /// `candidates` are the other abstracts of the event a merge or duplicate
    /// proposal may point at.
    pub fn validate(
        &mut self,
        data: &FormData,
        abstract_: &Abstract,
        candidates: &[AbstractSummary],
    ) -> Option<ReviewFormData> {
        let names = self.field_names();
        self.state.load(data, names);

        let mut answers = Vec::with_capacity(self.questions.len());
        for question in &self.questions {
            let name = question.field_name();
            let raw = self.state.value(&name).to_string();
            match raw.parse::<i64>() {
                Ok(value) if (0..=self.rating_scale_max).contains(&value) => {
                    answers.push((question.id, value))
                }
                Ok(_) => self.state.add_error(
                    &name,
                    format!("Number must be between 0 and {}.", self.rating_scale_max),
                ),
                Err(_) if raw.is_empty() => self.state.add_error(&name, "This field is required."),
                Err(_) => self.state.add_error(&name, "Not a valid integer value"),
            }
        }

        let proposed_action = match self.state.value(FIELD_PROPOSED_ACTION) {
            "" => {
                self.state.add_error(FIELD_PROPOSED_ACTION, "This field is required.");
                None
            }
            raw => {
                let action = ProposedAction::parse(raw);
                if action.is_none() {
                    self.state.add_error(FIELD_PROPOSED_ACTION, "Not a valid choice");
                }
                action
            }
        };

        let proposed_related_abstract_id = match proposed_action {
            Some(action) if action.needs_related_abstract() => match self.state.optional_id(FIELD_RELATED_ABSTRACT) {
                None => {
                    if self.state.error(FIELD_RELATED_ABSTRACT).is_none() {
                        self.state.add_error(FIELD_RELATED_ABSTRACT, "This field is required.");
                    }
                    None
                }
                Some(id) if id == abstract_.id => {
                    self.state
                        .add_error(FIELD_RELATED_ABSTRACT, "An abstract cannot be related to itself.");
                    None
                }
                Some(id) if !candidates.iter().any(|c| c.id == id && c.state.can_be_target()) => {
                    self.state.add_error(FIELD_RELATED_ABSTRACT, "Not a valid choice");
                    None
                }
                Some(id) => Some(id),
            },
            _ => None,
        };

        let comment = self.state.value(FIELD_COMMENT).to_string();
        if !self.state.is_valid() {
            return None;
        }
        Some(ReviewFormData {
            answers,
            proposed_action: proposed_action?,
            proposed_related_abstract_id,
            comment,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::abstracts::AbstractState;
    use crate::models::review::AbstractReviewRating;

    fn questions() -> Vec<ReviewQuestion> {
        vec![
            ReviewQuestion { id: 1, event_id: 1, text: "Relevance".into(), position: 1 },
            ReviewQuestion { id: 2, event_id: 1, text: "Clarity".into(), position: 2 },
        ]
    }

    fn abstract_() -> Abstract {
        Abstract {
            id: 10,
            event_id: 1,
            friendly_id: 1,
            title: "Neutrinos".into(),
            description: String::new(),
            submitter_id: 1,
            state: AbstractState::Submitted,
            submitted_dt: String::new(),
            judge_id: None,
            judgment_dt: None,
            judgment_comment: String::new(),
            accepted_track_id: None,
            merged_into_id: None,
            duplicate_of_id: None,
        }
    }

    fn candidates() -> Vec<AbstractSummary> {
        vec![AbstractSummary {
            id: 11,
            friendly_id: 2,
            title: "Neutrinos again".into(),
            state: AbstractState::Submitted,
        }]
    }

    #[test]
    fn test_valid_submission() {
        let mut form = make_review_form(&ReviewSettings::default(), &questions(), 4);
        let data: FormData = [
            ("track-4-question_1", "3"),
            ("track-4-question_2", "5"),
            ("track-4-proposed_action", "accept"),
            ("track-4-comment", "Solid work"),
        ]
        .into_iter()
        .collect();
        let cleaned = form.validate(&data, &abstract_(), &candidates()).unwrap();
        assert_eq!(cleaned.answers, vec![(1, 3), (2, 5)]);
        assert_eq!(cleaned.proposed_action, ProposedAction::Accept);
        assert_eq!(cleaned.comment, "Solid work");
    }

    #[test]
    fn test_unprefixed_fields_are_ignored() {
        let mut form = make_review_form(&ReviewSettings::default(), &questions(), 4);
        let data: FormData = [("question_1", "3"), ("proposed_action", "accept")]
            .into_iter()
            .collect();
        assert!(form.validate(&data, &abstract_(), &candidates()).is_none());
        assert!(form.state.error("question_1").is_some());
        assert!(form.state.error(FIELD_PROPOSED_ACTION).is_some());
    }

    #[test]
    fn test_rating_outside_scale() {
        let settings = ReviewSettings { rating_scale_max: 3, ..Default::default() };
        let mut form = make_review_form(&settings, &questions(), 4);
        let data: FormData = [
            ("track-4-question_1", "4"),
            ("track-4-question_2", "-1"),
            ("track-4-proposed_action", "reject"),
        ]
        .into_iter()
        .collect();
        assert!(form.validate(&data, &abstract_(), &candidates()).is_none());
        assert_eq!(form.state.error("question_1"), Some("Number must be between 0 and 3."));
        assert!(form.state.error("question_2").is_some());
        assert_eq!(form.state.value("question_1"), "4");
    }

    #[test]
    fn test_merge_needs_valid_related_abstract() {
        let mut form = make_review_form(&ReviewSettings::default(), &questions(), 4);
        let mut data: FormData = [
            ("track-4-question_1", "1"),
            ("track-4-question_2", "1"),
            ("track-4-proposed_action", "merge"),
        ]
        .into_iter()
        .collect();
        assert!(form.validate(&data, &abstract_(), &candidates()).is_none());
        assert_eq!(form.state.error(FIELD_RELATED_ABSTRACT), Some("This field is required."));

        data.0.insert("track-4-proposed_related_abstract".into(), "10".into());
        assert!(form.validate(&data, &abstract_(), &candidates()).is_none());

        data.0.insert("track-4-proposed_related_abstract".into(), "11".into());
        let cleaned = form.validate(&data, &abstract_(), &candidates()).unwrap();
        assert_eq!(cleaned.proposed_related_abstract_id, Some(11));
    }

    #[test]
    fn test_related_abstract_must_be_a_valid_target() {
        let mut form = make_review_form(&ReviewSettings::default(), &questions(), 4);
        let mut candidates = candidates();
        candidates.push(AbstractSummary {
            id: 12,
            friendly_id: 3,
            title: "Withdrawn neutrinos".into(),
            state: AbstractState::Withdrawn,
        });
        let data: FormData = [
            ("track-4-question_1", "1"),
            ("track-4-question_2", "1"),
            ("track-4-proposed_action", "mark_as_duplicate"),
            ("track-4-proposed_related_abstract", "12"),
        ]
        .into_iter()
        .collect();
        assert!(form.validate(&data, &abstract_(), &candidates).is_none());
        assert_eq!(form.state.error(FIELD_RELATED_ABSTRACT), Some("Not a valid choice"));
    }

    #[test]
    fn test_related_abstract_ignored_for_accept() {
        let mut form = make_review_form(&ReviewSettings::default(), &questions(), 4);
        let data: FormData = [
            ("track-4-question_1", "2"),
            ("track-4-question_2", "2"),
            ("track-4-proposed_action", "accept"),
            ("track-4-proposed_related_abstract", "left over"),
        ]
        .into_iter()
        .collect();
        let cleaned = form.validate(&data, &abstract_(), &candidates()).unwrap();
        assert_eq!(cleaned.proposed_related_abstract_id, None);
        assert!(form.state.is_valid());
    }

    #[test]
    fn test_defaults_from_existing_review() {
        let review = AbstractReview {
            id: Some(1),
            abstract_id: 10,
            track_id: 4,
            user_id: 2,
            user_name: "Grace".into(),
            proposed_action: ProposedAction::Reject,
            proposed_related_abstract_id: None,
            comment: "Out of scope".into(),
            created_dt: String::new(),
            modified_dt: None,
            ratings: vec![AbstractReviewRating { id: Some(3), question_id: 2, value: 1 }],
        };
        let form = build_review_form(&ReviewSettings::default(), &questions(), 4, Some(&review));
        assert_eq!(form.state.value(FIELD_PROPOSED_ACTION), "reject");
        assert_eq!(form.state.value(FIELD_COMMENT), "Out of scope");
        assert_eq!(form.state.value("question_2"), "1");
        assert_eq!(form.state.value("question_1"), "");
    }

    #[test]
    fn test_populate_obj_appends_missing_ratings() {
        let mut review = AbstractReview {
            id: Some(1),
            abstract_id: 10,
            track_id: 4,
            user_id: 2,
            user_name: "Grace".into(),
            proposed_action: ProposedAction::Reject,
            proposed_related_abstract_id: None,
            comment: String::new(),
            created_dt: String::new(),
            modified_dt: None,
            ratings: vec![AbstractReviewRating { id: Some(3), question_id: 2, value: 1 }],
        };
        let data = ReviewFormData {
            answers: vec![(1, 4), (2, 5)],
            proposed_action: ProposedAction::Accept,
            proposed_related_abstract_id: None,
            comment: "Changed my mind".into(),
        };
        data.populate_obj(&mut review);
        assert_eq!(review.proposed_action, ProposedAction::Accept);
        assert_eq!(review.ratings.len(), 2);
        assert_eq!(review.get_rating(2).map(|r| (r.id, r.value)), Some((Some(3), 5)));
        assert_eq!(review.get_rating(1).map(|r| (r.id, r.value)), Some((None, 4)));
    }
}
