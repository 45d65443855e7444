//! Access rules for events, abstracts and tracks.
//!
//! Everything here works on an already loaded [`AbstractContext`], so the
//! rules can be checked without touching the database.
use std::collections::HashSet;

use crate::models::abstracts::{Abstract, AbstractState};
use crate::models::event::Event;
use crate::models::track::Track;
use crate::models::user::User;

/// What the session user is allowed to do within one event.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EventRoles {
    pub is_manager: bool,
    pub has_access: bool,
    pub reviewer_of: HashSet<i64>,
    pub convener_of: HashSet<i64>,
}

/// An abstract together with everything needed to decide who may see, review or judge it.
#[derive(Debug, Clone)]
pub struct AbstractContext {
    pub event: Event,
    pub abstract_: Abstract,
    pub reviewed_tracks: Vec<Track>,
    pub user: Option<User>,
    pub roles: EventRoles,
}

impl AbstractContext {
    pub fn user_id(&self) -> Option<i64> {
        self.user.as_ref().map(|u| u.id)
    }

    pub fn is_manager(&self) -> bool {
        self.user.is_some() && self.roles.is_manager
    }

    pub fn can_access_event(&self) -> bool {
        !self.event.is_protected || self.is_manager() || (self.user.is_some() && self.roles.has_access)
    }

    pub fn is_user_reviewer(&self, track: &Track) -> bool {
        self.user.is_some() && self.roles.reviewer_of.contains(&track.id)
    }

    pub fn is_reviewed_for(&self, track_id: i64) -> bool {
        self.reviewed_tracks.iter().any(|t| t.id == track_id)
    }

    /// Reviewed tracks the session user may submit reviews for.
    pub fn reviewable_tracks(&self) -> Vec<&Track> {
        self.reviewed_tracks
            .iter()
            .filter(|t| self.is_user_reviewer(t))
            .collect()
    }

    pub fn can_convene(&self) -> bool {
        self.user.is_some()
            && self
                .reviewed_tracks
                .iter()
                .any(|t| self.roles.convener_of.contains(&t.id))
    }

    pub fn can_review(&self) -> bool {
        self.abstract_.state == AbstractState::Submitted && !self.reviewable_tracks().is_empty()
    }

    pub fn can_judge(&self) -> bool {
        self.is_manager() || (self.event.settings.allow_convener_judgment && self.can_convene())
    }

    pub fn can_access(&self) -> bool {
        let Some(user) = &self.user else {
            return false;
        };
        user.id == self.abstract_.submitter_id
            || self.is_manager()
            || self.can_judge()
            || self.can_convene()
            || !self.reviewable_tracks().is_empty()
    }

    /// Whether the list of submitted reviews is shown on the abstract page.
    pub fn can_see_reviews(&self) -> bool {
        self.can_judge() || self.can_convene()
    }
}
