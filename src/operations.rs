//! State-changing operations on abstracts: reviews, judgments, attachments and the event log.
use std::path::{Path, PathBuf};

use leptos::logging::{log, warn};
use serde::Serialize;
use serde_json::json;

use crate::db::Database;
use crate::error::AppError;
use crate::forms::judgment::{AbstractData, JudgmentData};
use crate::forms::review::ReviewFormData;
use crate::models::abstracts::{Abstract, Judgment};
use crate::models::file::AbstractFile;
use crate::models::log::{LogEntry, LogKind, NewLogEntry, REALM_REVIEWING};
use crate::models::review::AbstractReview;
use crate::models::track::Track;
use crate::models::user::User;

const LOG_MODULE: &str = "Abstracts";
pub const LOG_PAGE_SIZE: i64 = 15;

/// Finds the review `user_id` wrote for `track_id`, if any.
///
/// A user has at most one review per abstract and track; finding more is an
/// integrity error.
pub async fn get_user_review_for_track(
    db: &Database,
    user_id: i64,
    abstract_id: i64,
    track_id: i64,
) -> Result<Option<AbstractReview>, AppError> {
    let mut results: Vec<AbstractReview> = db
        .get_track_reviews(abstract_id, track_id)
        .await?
        .into_iter()
        .filter(|review| review.user_id == user_id)
        .collect();
    if results.len() > 1 {
        return Err(AppError::Integrity(format!(
            "user {} has {} reviews of abstract {} for track {}",
            user_id,
            results.len(),
            abstract_id,
            track_id
        )));
    }
    Ok(results.pop())
}

/// Creates the user's review for a track, or updates the existing one in place.
pub async fn submit_review(
    db: &Database,
    abstract_: &Abstract,
    track: &Track,
    user: &User,
    existing: Option<AbstractReview>,
    data: &ReviewFormData,
) -> Result<AbstractReview, AppError> {
    let is_update = existing.is_some();
    let mut review = existing.unwrap_or_else(|| AbstractReview {
        id: None,
        abstract_id: abstract_.id,
        track_id: track.id,
        user_id: user.id,
        user_name: user.full_name.clone(),
        proposed_action: data.proposed_action,
        proposed_related_abstract_id: None,
        comment: String::new(),
        created_dt: chrono::Utc::now().to_rfc3339(),
        modified_dt: None,
        ratings: Vec::new(),
    });
    data.populate_obj(&mut review);
    db.save_review(&mut review).await?;

    let summary = if is_update {
        format!("Review of abstract #{} for track {} updated", abstract_.friendly_id, track.title)
    } else {
        format!("Abstract #{} reviewed for track {}", abstract_.friendly_id, track.title)
    };
    log!("[REVIEW] {} by user {}", summary, user.id);
    db.insert_log_entry(&NewLogEntry {
        event_id: abstract_.event_id,
        realm: REALM_REVIEWING,
        kind: if is_update { LogKind::Change } else { LogKind::Positive },
        module: LOG_MODULE,
        summary,
        user_id: Some(user.id),
        data: json!({
            "Proposed action": data.proposed_action.title(),
            "Ratings": data.answers.len(),
        }),
    })
    .await?;
    Ok(review)
}

/// Records a judgment on an abstract.
pub async fn judge_abstract(
    db: &Database,
    abstract_: &mut Abstract,
    abstract_data: AbstractData,
    judgment_data: JudgmentData,
    judge: &User,
) -> Result<(), AppError> {
    let judgment = judgment_data.judgment;
    abstract_.state = judgment.resulting_state();
    abstract_.judge_id = Some(judge.id);
    abstract_.judgment_dt = Some(chrono::Utc::now().to_rfc3339());
    abstract_.judgment_comment = abstract_data.judgment_comment;
    abstract_.accepted_track_id = judgment_data.accepted_track_id;
    abstract_.merged_into_id = judgment_data.merged_into_id;
    abstract_.duplicate_of_id = judgment_data.duplicate_of_id;
    db.update_abstract_judgment(abstract_).await?;

    let summary = match judgment {
        Judgment::Accept => format!("Abstract #{} accepted", abstract_.friendly_id),
        Judgment::Reject => format!("Abstract #{} rejected", abstract_.friendly_id),
        Judgment::Merge => format!("Abstract #{} merged", abstract_.friendly_id),
        Judgment::MarkAsDuplicate => format!("Abstract #{} marked as duplicate", abstract_.friendly_id),
    };
    let kind = match judgment {
        Judgment::Accept => LogKind::Positive,
        Judgment::Reject => LogKind::Negative,
        Judgment::Merge | Judgment::MarkAsDuplicate => LogKind::Change,
    };
    if judgment_data.send_notifications {
        log!("[JUDGE] Notifications requested for abstract {}", abstract_.id);
    }
    log!("[JUDGE] {} by user {}", summary, judge.id);
    db.insert_log_entry(&NewLogEntry {
        event_id: abstract_.event_id,
        realm: REALM_REVIEWING,
        kind,
        module: LOG_MODULE,
        summary,
        user_id: Some(judge.id),
        data: json!({
            "Judgment": judgment.title(),
            "Accepted track": judgment_data.accepted_track_id,
            "Merged into": judgment_data.merged_into_id,
            "Duplicate of": judgment_data.duplicate_of_id,
            "Notifications": judgment_data.send_notifications,
        }),
    })
    .await?;
    Ok(())
}

/// Location of an attachment's content inside the storage directory.
pub fn abstract_file_path(storage_dir: &Path, file: &AbstractFile) -> PathBuf {
    storage_dir.join(&file.storage_file_id)
}

/// Stores an attachment's content and records it.
pub async fn store_abstract_file(
    db: &Database,
    storage_dir: &Path,
    abstract_id: i64,
    filename: &str,
    content_type: &str,
    content: &[u8],
) -> Result<AbstractFile, AppError> {
    let storage_file_id = uuid::Uuid::new_v4().to_string();
    let path = storage_dir.join(&storage_file_id);
    tokio::fs::create_dir_all(storage_dir).await?;
    tokio::fs::write(&path, content).await?;
    let file = match db
        .insert_abstract_file(
            abstract_id,
            filename,
            content_type,
            content.len() as i64,
            &storage_file_id,
        )
        .await
    {
        Ok(file) => file,
        Err(e) => {
            if let Err(remove_err) = tokio::fs::remove_file(&path).await {
                warn!("[FILES] Could not remove orphaned {}: {}", path.display(), remove_err);
            }
            return Err(e.into());
        }
    };
    log!("[FILES] Stored {} ({} bytes) for abstract {}", filename, content.len(), abstract_id);
    Ok(file)
}

#[derive(Debug, Serialize)]
pub struct LogPage {
    pub entries: Vec<LogEntry>,
    #[serde(rename = "currentPage")]
    pub current_page: i64,
    pub pages: i64,
}

/// One page of an event's log; `page` is 1-based and clamped to the available pages.
pub async fn get_log_page(db: &Database, event_id: i64, page: i64) -> Result<LogPage, AppError> {
    let total = db.count_log_entries(event_id).await?;
    let pages = ((total + LOG_PAGE_SIZE - 1) / LOG_PAGE_SIZE).max(1);
    let current_page = page.clamp(1, pages);
    let entries = db
        .get_log_entries(event_id, LOG_PAGE_SIZE, (current_page - 1) * LOG_PAGE_SIZE)
        .await?;
    Ok(LogPage {
        entries,
        current_page,
        pages,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::abstracts::AbstractState;
    use crate::models::review::ProposedAction;

    struct Fixture {
        db: Database,
        user: User,
        track: Track,
        abstract_: Abstract,
        question_ids: Vec<i64>,
    }

    async fn fixture() -> Fixture {
        let db = Database::new(":memory:").unwrap();
        db.create_schema().await.unwrap();
        let user = db.insert_user("Ada Lovelace", "ada@example.com").await.unwrap();
        let event = db.insert_event("Conf", false).await.unwrap();
        let track = db.insert_track(event.id, "Engines").await.unwrap();
        let q1 = db.insert_review_question(event.id, "Relevance", 1).await.unwrap();
        let q2 = db.insert_review_question(event.id, "Clarity", 2).await.unwrap();
        let abstract_ = db
            .insert_abstract(event.id, user.id, "Analytical engine", "", &[track.id])
            .await
            .unwrap();
        Fixture {
            db,
            user,
            track,
            abstract_,
            question_ids: vec![q1.id, q2.id],
        }
    }

    fn form_data(q: &[i64], values: [i64; 2], action: ProposedAction) -> ReviewFormData {
        ReviewFormData {
            answers: vec![(q[0], values[0]), (q[1], values[1])],
            proposed_action: action,
            proposed_related_abstract_id: None,
            comment: "ok".into(),
        }
    }

    #[tokio::test]
    async fn test_submit_then_resubmit_review() {
        let f = fixture().await;
        let data = form_data(&f.question_ids, [1, 2], ProposedAction::Accept);
        let first = submit_review(&f.db, &f.abstract_, &f.track, &f.user, None, &data)
            .await
            .unwrap();
        assert_eq!(first.ratings.len(), 2);

        let existing = get_user_review_for_track(&f.db, f.user.id, f.abstract_.id, f.track.id)
            .await
            .unwrap();
        assert_eq!(existing.as_ref().map(|r| r.id), Some(first.id));

        let data = form_data(&f.question_ids, [4, 5], ProposedAction::Reject);
        let second = submit_review(&f.db, &f.abstract_, &f.track, &f.user, existing, &data)
            .await
            .unwrap();
        assert_eq!(second.id, first.id);
        assert_eq!(
            second.ratings.iter().map(|r| r.id).collect::<Vec<_>>(),
            first.ratings.iter().map(|r| r.id).collect::<Vec<_>>()
        );

        let reviews = f.db.get_abstract_reviews(f.abstract_.id).await.unwrap();
        assert_eq!(reviews.len(), 1);
        assert_eq!(reviews[0].proposed_action, ProposedAction::Reject);
        assert_eq!(f.db.count_log_entries(f.abstract_.event_id).await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_duplicate_reviews_are_an_integrity_error() {
        let f = fixture().await;
        let data = form_data(&f.question_ids, [1, 2], ProposedAction::Accept);
        submit_review(&f.db, &f.abstract_, &f.track, &f.user, None, &data).await.unwrap();
        submit_review(&f.db, &f.abstract_, &f.track, &f.user, None, &data).await.unwrap();

        let result = get_user_review_for_track(&f.db, f.user.id, f.abstract_.id, f.track.id).await;
        assert!(matches!(result, Err(AppError::Integrity(_))));
    }

    #[tokio::test]
    async fn test_judge_abstract_accept() {
        let f = fixture().await;
        let mut abstract_ = f.abstract_.clone();
        judge_abstract(
            &f.db,
            &mut abstract_,
            AbstractData { judgment_comment: "Welcome".into() },
            JudgmentData {
                judgment: Judgment::Accept,
                accepted_track_id: Some(f.track.id),
                merged_into_id: None,
                duplicate_of_id: None,
                send_notifications: true,
            },
            &f.user,
        )
        .await
        .unwrap();

        let stored = f.db.get_abstract(abstract_.id).await.unwrap().unwrap();
        assert_eq!(stored.state, AbstractState::Accepted);
        assert_eq!(stored.judge_id, Some(f.user.id));
        assert_eq!(stored.accepted_track_id, Some(f.track.id));
        assert_eq!(stored.judgment_comment, "Welcome");
        assert!(stored.judgment_dt.is_some());

        let page = get_log_page(&f.db, stored.event_id, 1).await.unwrap();
        assert_eq!(page.entries[0].summary, "Abstract #1 accepted");
        assert_eq!(page.entries[0].kind, LogKind::Positive);
    }

    #[tokio::test]
    async fn test_log_page_is_clamped() {
        let f = fixture().await;
        let page = get_log_page(&f.db, f.abstract_.event_id, 7).await.unwrap();
        assert_eq!((page.current_page, page.pages), (1, 1));
        assert!(page.entries.is_empty());
    }

    #[tokio::test]
    async fn test_store_abstract_file() {
        let f = fixture().await;
        let dir = tempfile::tempdir().unwrap();
        let file = store_abstract_file(&f.db, dir.path(), f.abstract_.id, "poster.pdf", "application/pdf", b"%PDF-")
            .await
            .unwrap();
        assert_eq!(file.size, 5);
        let content = std::fs::read(abstract_file_path(dir.path(), &file)).unwrap();
        assert_eq!(content, b"%PDF-");
        assert_eq!(f.db.get_abstract_files(f.abstract_.id).await.unwrap(), vec![file]);
    }

    #[tokio::test]
    async fn test_failed_store_leaves_no_blob() {
        let f = fixture().await;
        let dir = tempfile::tempdir().unwrap();
        let err = store_abstract_file(&f.db, dir.path(), 9999, "poster.pdf", "application/pdf", b"%PDF-")
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Database(_)));
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }
}
