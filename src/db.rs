#[cfg(feature = "ssr")]
mod db_impl {
    use crate::models::abstracts::{Abstract, AbstractState, AbstractSummary};
    use crate::models::event::{Event, ReviewQuestion, ReviewSettings};
    use crate::models::file::AbstractFile;
    use crate::models::log::{LogEntry, LogKind, NewLogEntry};
    use crate::models::review::{AbstractReview, AbstractReviewRating, ProposedAction};
    use crate::models::track::Track;
    use crate::models::user::User;
    use crate::permissions::EventRoles;
    use leptos::logging::log;
    use rusqlite::types::Type;
    use rusqlite::{params, Connection, Error, OptionalExtension, Row};
    use std::collections::{HashMap, HashSet};
    use std::sync::Arc;
    use tokio::sync::Mutex;

    #[cfg(test)]
    mod tests {
        use super::*;
        use crate::models::log::REALM_REVIEWING;

        // Helper function to create test database
        async fn create_test_db() -> Database {
            log!("[TEST] Creating in-memory test database");
            let db = Database::new(":memory:").unwrap();
            db.create_schema().await.unwrap();
            db
        }

        fn new_review(abstract_id: i64, track_id: i64, user_id: i64) -> AbstractReview {
            AbstractReview {
                id: None,
                abstract_id,
                track_id,
                user_id,
                user_name: String::new(),
                proposed_action: ProposedAction::Accept,
                proposed_related_abstract_id: None,
                comment: "Looks good".into(),
                created_dt: chrono::Utc::now().to_rfc3339(),
                modified_dt: None,
                ratings: Vec::new(),
            }
        }

        #[tokio::test]
        async fn test_schema_creation() {
            let db = create_test_db().await;
            let conn = db.conn.lock().await;
            let mut stmt = conn
                .prepare("SELECT name FROM sqlite_master WHERE type='table'")
                .unwrap();
            let tables: Vec<String> = stmt
                .query_map([], |row| row.get(0))
                .unwrap()
                .collect::<Result<_, _>>()
                .unwrap();

            for table in [
                "users",
                "events",
                "tracks",
                "abstracts",
                "abstract_reviews",
                "abstract_review_ratings",
                "abstract_files",
                "event_log_entries",
            ] {
                assert!(tables.contains(&table.to_string()), "missing table {}", table);
            }
        }

        #[tokio::test]
        async fn test_schema_creation_is_idempotent() {
            let db = create_test_db().await;
            db.create_schema().await.unwrap();
        }

        #[tokio::test]
        async fn test_friendly_ids_are_per_event() {
            let db = create_test_db().await;
            let user = db.insert_user("Ada Lovelace", "ada@example.com").await.unwrap();
            let first = db.insert_event("Conf A", false).await.unwrap();
            let second = db.insert_event("Conf B", false).await.unwrap();

            let a1 = db.insert_abstract(first.id, user.id, "One", "", &[]).await.unwrap();
            let a2 = db.insert_abstract(first.id, user.id, "Two", "", &[]).await.unwrap();
            let b1 = db.insert_abstract(second.id, user.id, "Three", "", &[]).await.unwrap();

            assert_eq!((a1.friendly_id, a2.friendly_id, b1.friendly_id), (1, 2, 1));
            assert_eq!(a1.state, AbstractState::Submitted);
            let summaries = db.get_event_abstracts(first.id).await.unwrap();
            assert_eq!(summaries.len(), 2);
        }

        #[tokio::test]
        async fn test_event_roles() {
            let db = create_test_db().await;
            let user = db.insert_user("Grace Hopper", "grace@example.com").await.unwrap();
            let event = db.insert_event("Conf", true).await.unwrap();
            let other_event = db.insert_event("Other", false).await.unwrap();
            let track = db.insert_track(event.id, "Compilers").await.unwrap();
            let foreign = db.insert_track(other_event.id, "Foreign").await.unwrap();

            db.add_track_reviewer(track.id, user.id).await.unwrap();
            db.add_track_reviewer(foreign.id, user.id).await.unwrap();
            db.add_track_convener(track.id, user.id).await.unwrap();
            db.grant_event_access(event.id, user.id).await.unwrap();

            let roles = db.get_event_roles(event.id, user.id).await.unwrap();
            assert!(!roles.is_manager);
            assert!(roles.has_access);
            assert_eq!(roles.reviewer_of.len(), 1);
            assert!(roles.reviewer_of.contains(&track.id));
            assert!(roles.convener_of.contains(&track.id));

            db.add_event_manager(event.id, user.id).await.unwrap();
            db.add_event_manager(event.id, user.id).await.unwrap();
            assert!(db.get_event_roles(event.id, user.id).await.unwrap().is_manager);
        }

        #[tokio::test]
        async fn test_review_lifecycle() {
            let db = create_test_db().await;
            let user = db.insert_user("Ada Lovelace", "ada@example.com").await.unwrap();
            let event = db.insert_event("Conf", false).await.unwrap();
            let track = db.insert_track(event.id, "Engines").await.unwrap();
            let q1 = db.insert_review_question(event.id, "Relevance", 1).await.unwrap();
            let q2 = db.insert_review_question(event.id, "Clarity", 2).await.unwrap();
            let abstract_ = db
                .insert_abstract(event.id, user.id, "Analytical engine", "", &[track.id])
                .await
                .unwrap();

            // Creation
            let mut review = new_review(abstract_.id, track.id, user.id);
            review.set_rating(q1.id, 3);
            db.save_review(&mut review).await.unwrap();
            assert!(review.id.is_some());
            let first_rating_id = review.ratings[0].id;
            assert!(first_rating_id.is_some());

            // Update reuses the rating row and appends the missing one
            let mut stored = db.get_track_reviews(abstract_.id, track.id).await.unwrap();
            assert_eq!(stored.len(), 1);
            let mut review = stored.remove(0);
            assert_eq!(review.user_name, "Ada Lovelace");
            review.set_rating(q1.id, 5);
            review.set_rating(q2.id, 1);
            review.comment = "Even better".into();
            db.save_review(&mut review).await.unwrap();

            let reviews = db.get_abstract_reviews(abstract_.id).await.unwrap();
            assert_eq!(reviews.len(), 1);
            let review = &reviews[0];
            assert_eq!(review.comment, "Even better");
            assert!(review.modified_dt.is_some());
            assert_eq!(review.ratings.len(), 2);
            assert_eq!(review.get_rating(q1.id).map(|r| (r.id, r.value)), Some((first_rating_id, 5)));
            assert_eq!(review.get_rating(q2.id).map(|r| r.value), Some(1));
        }

        #[tokio::test]
        async fn test_judgment_update() {
            let db = create_test_db().await;
            let user = db.insert_user("Ada Lovelace", "ada@example.com").await.unwrap();
            let event = db.insert_event("Conf", false).await.unwrap();
            let track = db.insert_track(event.id, "Engines").await.unwrap();
            let mut abstract_ = db
                .insert_abstract(event.id, user.id, "Analytical engine", "", &[track.id])
                .await
                .unwrap();

            abstract_.state = AbstractState::Accepted;
            abstract_.judge_id = Some(user.id);
            abstract_.accepted_track_id = Some(track.id);
            abstract_.judgment_comment = "Great".into();
            db.update_abstract_judgment(&abstract_).await.unwrap();

            let stored = db.get_abstract(abstract_.id).await.unwrap().unwrap();
            assert_eq!(stored, abstract_);
            assert_eq!(db.get_reviewed_tracks(abstract_.id).await.unwrap(), vec![track]);
        }

        #[tokio::test]
        async fn test_log_entries_paging() {
            let db = create_test_db().await;
            let user = db.insert_user("Ada Lovelace", "ada@example.com").await.unwrap();
            let event = db.insert_event("Conf", false).await.unwrap();
            for i in 0..3 {
                db.insert_log_entry(&NewLogEntry {
                    event_id: event.id,
                    realm: REALM_REVIEWING,
                    kind: LogKind::Change,
                    module: "Abstracts",
                    summary: format!("Entry {}", i),
                    user_id: Some(user.id),
                    data: serde_json::json!({ "n": i }),
                })
                .await
                .unwrap();
            }
            assert_eq!(db.count_log_entries(event.id).await.unwrap(), 3);
            let page = db.get_log_entries(event.id, 2, 0).await.unwrap();
            assert_eq!(page.len(), 2);
            assert_eq!(page[0].summary, "Entry 2");
            assert_eq!(page[0].user_name.as_deref(), Some("Ada Lovelace"));
            assert_eq!(page[0].data["n"], 2);
            let rest = db.get_log_entries(event.id, 2, 2).await.unwrap();
            assert_eq!(rest.len(), 1);
            assert_eq!(rest[0].kind, LogKind::Change);
        }

        #[tokio::test]
        async fn test_corrupt_log_data_is_an_error() {
            let db = create_test_db().await;
            let event = db.insert_event("Conf", false).await.unwrap();
            {
                let conn = db.conn.lock().await;
                conn.execute(
                    "INSERT INTO event_log_entries (event_id, realm, kind, module, summary, user_id, logged_dt, data)
                     VALUES (?1, 'reviewing', 'other', 'Abstracts', 'Broken', NULL, '2026-01-01T00:00:00Z', '{not json')",
                    [event.id],
                )
                .unwrap();
            }
            let err = db.get_log_entries(event.id, 15, 0).await.unwrap_err();
            assert!(matches!(err, Error::FromSqlConversionFailure(9, _, _)));
        }
    }

    fn conversion_error(column: usize, message: String) -> Error {
        Error::FromSqlConversionFailure(column, Type::Text, message.into())
    }

    fn row_to_abstract(row: &Row<'_>) -> Result<Abstract, Error> {
        let state: String = row.get(6)?;
        Ok(Abstract {
            id: row.get(0)?,
            event_id: row.get(1)?,
            friendly_id: row.get(2)?,
            title: row.get(3)?,
            description: row.get(4)?,
            submitter_id: row.get(5)?,
            state: AbstractState::parse(&state)
                .ok_or_else(|| conversion_error(6, format!("unknown abstract state '{}'", state)))?,
            submitted_dt: row.get(7)?,
            judge_id: row.get(8)?,
            judgment_dt: row.get(9)?,
            judgment_comment: row.get(10)?,
            accepted_track_id: row.get(11)?,
            merged_into_id: row.get(12)?,
            duplicate_of_id: row.get(13)?,
        })
    }

    const ABSTRACT_COLUMNS: &str = "id, event_id, friendly_id, title, description, submitter_id, state, \
        submitted_dt, judge_id, judgment_dt, judgment_comment, accepted_track_id, merged_into_id, \
        duplicate_of_id";

    fn row_to_track(row: &Row<'_>) -> Result<Track, Error> {
        Ok(Track {
            id: row.get(0)?,
            event_id: row.get(1)?,
            title: row.get(2)?,
        })
    }

    fn row_to_file(row: &Row<'_>) -> Result<AbstractFile, Error> {
        Ok(AbstractFile {
            id: row.get(0)?,
            abstract_id: row.get(1)?,
            filename: row.get(2)?,
            content_type: row.get(3)?,
            size: row.get(4)?,
            storage_file_id: row.get(5)?,
            created_dt: row.get(6)?,
        })
    }

    const FILE_COLUMNS: &str =
        "id, abstract_id, filename, content_type, size, storage_file_id, created_dt";

    // Define a struct to represent a database connection
    #[derive(Debug, Clone)]
    pub struct Database {
        conn: Arc<Mutex<Connection>>,
    }

    impl Database {
        // Create a new database connection
        pub fn new(db_path: &str) -> Result<Self, Error> {
            let conn = Connection::open(db_path)?;
            conn.execute_batch("PRAGMA foreign_keys = ON;")?;
            log!("[DB] Database connection established at: {}", db_path);
            Ok(Database {
                conn: Arc::new(Mutex::new(conn)),
            })
        }

        // Create the database schema
        pub async fn create_schema(&self) -> Result<(), Error> {
            let conn = self.conn.lock().await;

            // 1. Users and events
            conn.execute_batch(
                "CREATE TABLE IF NOT EXISTS users (
                    id INTEGER PRIMARY KEY,
                    full_name TEXT NOT NULL,
                    email TEXT NOT NULL UNIQUE,
                    csrf_token TEXT NOT NULL
                );
                CREATE TABLE IF NOT EXISTS events (
                    id INTEGER PRIMARY KEY,
                    title TEXT NOT NULL,
                    is_protected INTEGER NOT NULL DEFAULT 0,
                    rating_scale_max INTEGER NOT NULL DEFAULT 5,
                    allow_convener_judgment INTEGER NOT NULL DEFAULT 0
                );
                CREATE TABLE IF NOT EXISTS event_managers (
                    event_id INTEGER NOT NULL,
                    user_id INTEGER NOT NULL,
                    PRIMARY KEY (event_id, user_id),
                    FOREIGN KEY (event_id) REFERENCES events(id) ON DELETE CASCADE,
                    FOREIGN KEY (user_id) REFERENCES users(id) ON DELETE CASCADE
                );
                CREATE TABLE IF NOT EXISTS event_access (
                    event_id INTEGER NOT NULL,
                    user_id INTEGER NOT NULL,
                    PRIMARY KEY (event_id, user_id),
                    FOREIGN KEY (event_id) REFERENCES events(id) ON DELETE CASCADE,
                    FOREIGN KEY (user_id) REFERENCES users(id) ON DELETE CASCADE
                );",
            )
            .map_err(|e| {
                log!("[DB] Failed creating user/event tables: {}", e);
                e
            })?;

            // 2. Tracks and review questions
            conn.execute_batch(
                "CREATE TABLE IF NOT EXISTS tracks (
                    id INTEGER PRIMARY KEY,
                    event_id INTEGER NOT NULL,
                    title TEXT NOT NULL,
                    FOREIGN KEY (event_id) REFERENCES events(id) ON DELETE CASCADE
                );
                CREATE TABLE IF NOT EXISTS track_reviewers (
                    track_id INTEGER NOT NULL,
                    user_id INTEGER NOT NULL,
                    PRIMARY KEY (track_id, user_id),
                    FOREIGN KEY (track_id) REFERENCES tracks(id) ON DELETE CASCADE,
                    FOREIGN KEY (user_id) REFERENCES users(id) ON DELETE CASCADE
                );
                CREATE TABLE IF NOT EXISTS track_conveners (
                    track_id INTEGER NOT NULL,
                    user_id INTEGER NOT NULL,
                    PRIMARY KEY (track_id, user_id),
                    FOREIGN KEY (track_id) REFERENCES tracks(id) ON DELETE CASCADE,
                    FOREIGN KEY (user_id) REFERENCES users(id) ON DELETE CASCADE
                );
                CREATE TABLE IF NOT EXISTS review_questions (
                    id INTEGER PRIMARY KEY,
                    event_id INTEGER NOT NULL,
                    text TEXT NOT NULL,
                    position INTEGER NOT NULL DEFAULT 0,
                    FOREIGN KEY (event_id) REFERENCES events(id) ON DELETE CASCADE
                );",
            )
            .map_err(|e| {
                log!("[DB] Failed creating track tables: {}", e);
                e
            })?;

            // 3. Abstracts and their files
            conn.execute_batch(
                "CREATE TABLE IF NOT EXISTS abstracts (
                    id INTEGER PRIMARY KEY,
                    event_id INTEGER NOT NULL,
                    friendly_id INTEGER NOT NULL,
                    title TEXT NOT NULL,
                    description TEXT NOT NULL DEFAULT '',
                    submitter_id INTEGER NOT NULL,
                    state TEXT NOT NULL DEFAULT 'submitted',
                    submitted_dt TEXT NOT NULL,
                    judge_id INTEGER,
                    judgment_dt TEXT,
                    judgment_comment TEXT NOT NULL DEFAULT '',
                    accepted_track_id INTEGER,
                    merged_into_id INTEGER,
                    duplicate_of_id INTEGER,
                    UNIQUE (event_id, friendly_id),
                    FOREIGN KEY (event_id) REFERENCES events(id) ON DELETE CASCADE,
                    FOREIGN KEY (submitter_id) REFERENCES users(id),
                    FOREIGN KEY (judge_id) REFERENCES users(id),
                    FOREIGN KEY (accepted_track_id) REFERENCES tracks(id) ON DELETE SET NULL,
                    FOREIGN KEY (merged_into_id) REFERENCES abstracts(id) ON DELETE SET NULL,
                    FOREIGN KEY (duplicate_of_id) REFERENCES abstracts(id) ON DELETE SET NULL
                );
                CREATE TABLE IF NOT EXISTS abstract_reviewed_tracks (
                    abstract_id INTEGER NOT NULL,
                    track_id INTEGER NOT NULL,
                    PRIMARY KEY (abstract_id, track_id),
                    FOREIGN KEY (abstract_id) REFERENCES abstracts(id) ON DELETE CASCADE,
                    FOREIGN KEY (track_id) REFERENCES tracks(id) ON DELETE CASCADE
                );
                CREATE TABLE IF NOT EXISTS abstract_files (
                    id INTEGER PRIMARY KEY,
                    abstract_id INTEGER NOT NULL,
                    filename TEXT NOT NULL,
                    content_type TEXT NOT NULL,
                    size INTEGER NOT NULL,
                    storage_file_id TEXT NOT NULL UNIQUE,
                    created_dt TEXT NOT NULL,
                    FOREIGN KEY (abstract_id) REFERENCES abstracts(id) ON DELETE CASCADE
                );",
            )
            .map_err(|e| {
                log!("[DB] Failed creating abstract tables: {}", e);
                e
            })?;

            // 4. Reviews. One review per (user, abstract, track) is checked by the
            // review lookup, not by a constraint.
            conn.execute_batch(
                "CREATE TABLE IF NOT EXISTS abstract_reviews (
                    id INTEGER PRIMARY KEY,
                    abstract_id INTEGER NOT NULL,
                    track_id INTEGER NOT NULL,
                    user_id INTEGER NOT NULL,
                    proposed_action TEXT NOT NULL,
                    proposed_related_abstract_id INTEGER,
                    comment TEXT NOT NULL DEFAULT '',
                    created_dt TEXT NOT NULL,
                    modified_dt TEXT,
                    FOREIGN KEY (abstract_id) REFERENCES abstracts(id) ON DELETE CASCADE,
                    FOREIGN KEY (track_id) REFERENCES tracks(id) ON DELETE CASCADE,
                    FOREIGN KEY (user_id) REFERENCES users(id) ON DELETE CASCADE
                );
                CREATE TABLE IF NOT EXISTS abstract_review_ratings (
                    id INTEGER PRIMARY KEY,
                    review_id INTEGER NOT NULL,
                    question_id INTEGER NOT NULL,
                    value INTEGER NOT NULL,
                    UNIQUE (review_id, question_id),
                    FOREIGN KEY (review_id) REFERENCES abstract_reviews(id) ON DELETE CASCADE,
                    FOREIGN KEY (question_id) REFERENCES review_questions(id) ON DELETE CASCADE
                );",
            )
            .map_err(|e| {
                log!("[DB] Failed creating review tables: {}", e);
                e
            })?;

            // 5. Event log
            conn.execute_batch(
                "CREATE TABLE IF NOT EXISTS event_log_entries (
                    id INTEGER PRIMARY KEY,
                    event_id INTEGER NOT NULL,
                    realm TEXT NOT NULL,
                    kind TEXT NOT NULL,
                    module TEXT NOT NULL,
                    summary TEXT NOT NULL,
                    user_id INTEGER,
                    logged_dt TEXT NOT NULL,
                    data TEXT NOT NULL DEFAULT '{}',
                    FOREIGN KEY (event_id) REFERENCES events(id) ON DELETE CASCADE,
                    FOREIGN KEY (user_id) REFERENCES users(id) ON DELETE SET NULL
                );",
            )
            .map_err(|e| {
                log!("[DB] Failed creating event log table: {}", e);
                e
            })?;
            Ok(())
        }

        pub async fn insert_user(&self, full_name: &str, email: &str) -> Result<User, Error> {
            let conn = self.conn.lock().await;
            let csrf_token = uuid::Uuid::new_v4().to_string();
            conn.execute(
                "INSERT INTO users (full_name, email, csrf_token) VALUES (?1, ?2, ?3)",
                params![full_name, email, csrf_token],
            )?;
            let id = conn.last_insert_rowid();
            log!("[DB] User created: {} ({})", id, email);
            Ok(User {
                id,
                full_name: full_name.to_string(),
                email: email.to_string(),
                csrf_token,
            })
        }

        pub async fn get_user(&self, user_id: i64) -> Result<Option<User>, Error> {
            let conn = self.conn.lock().await;
            conn.query_row(
                "SELECT id, full_name, email, csrf_token FROM users WHERE id = ?",
                [user_id],
                |row| {
                    Ok(User {
                        id: row.get(0)?,
                        full_name: row.get(1)?,
                        email: row.get(2)?,
                        csrf_token: row.get(3)?,
                    })
                },
            )
            .optional()
        }

        pub async fn insert_event(&self, title: &str, is_protected: bool) -> Result<Event, Error> {
            let conn = self.conn.lock().await;
            conn.execute(
                "INSERT INTO events (title, is_protected) VALUES (?1, ?2)",
                params![title, is_protected],
            )?;
            let id = conn.last_insert_rowid();
            log!("[DB] Event created: {}", id);
            Ok(Event {
                id,
                title: title.to_string(),
                is_protected,
                settings: ReviewSettings::default(),
            })
        }

        pub async fn get_event(&self, event_id: i64) -> Result<Option<Event>, Error> {
            let conn = self.conn.lock().await;
            conn.query_row(
                "SELECT id, title, is_protected, rating_scale_max, allow_convener_judgment
                 FROM events WHERE id = ?",
                [event_id],
                |row| {
                    Ok(Event {
                        id: row.get(0)?,
                        title: row.get(1)?,
                        is_protected: row.get(2)?,
                        settings: ReviewSettings {
                            rating_scale_max: row.get(3)?,
                            allow_convener_judgment: row.get(4)?,
                        },
                    })
                },
            )
            .optional()
        }

        pub async fn update_review_settings(
            &self,
            event_id: i64,
            settings: &ReviewSettings,
        ) -> Result<(), Error> {
            let conn = self.conn.lock().await;
            conn.execute(
                "UPDATE events SET rating_scale_max = ?1, allow_convener_judgment = ?2 WHERE id = ?3",
                params![settings.rating_scale_max, settings.allow_convener_judgment, event_id],
            )?;
            Ok(())
        }

        pub async fn add_event_manager(&self, event_id: i64, user_id: i64) -> Result<(), Error> {
            let conn = self.conn.lock().await;
            conn.execute(
                "INSERT OR IGNORE INTO event_managers (event_id, user_id) VALUES (?1, ?2)",
                [event_id, user_id],
            )?;
            Ok(())
        }

        pub async fn grant_event_access(&self, event_id: i64, user_id: i64) -> Result<(), Error> {
            let conn = self.conn.lock().await;
            conn.execute(
                "INSERT OR IGNORE INTO event_access (event_id, user_id) VALUES (?1, ?2)",
                [event_id, user_id],
            )?;
            Ok(())
        }

        // Collect everything a user may do within an event
        pub async fn get_event_roles(&self, event_id: i64, user_id: i64) -> Result<EventRoles, Error> {
            let conn = self.conn.lock().await;
            let is_manager: bool = conn.query_row(
                "SELECT EXISTS(SELECT 1 FROM event_managers WHERE event_id = ?1 AND user_id = ?2)",
                [event_id, user_id],
                |row| row.get(0),
            )?;
            let has_access: bool = conn.query_row(
                "SELECT EXISTS(SELECT 1 FROM event_access WHERE event_id = ?1 AND user_id = ?2)",
                [event_id, user_id],
                |row| row.get(0),
            )?;

            let track_ids = |table: &str| -> Result<HashSet<i64>, Error> {
                let mut stmt = conn.prepare(&format!(
                    "SELECT r.track_id FROM {} r
                     JOIN tracks t ON t.id = r.track_id
                     WHERE t.event_id = ?1 AND r.user_id = ?2",
                    table
                ))?;
                let ids = stmt.query_map([event_id, user_id], |row| row.get::<_, i64>(0))?;
                ids.collect()
            };

            Ok(EventRoles {
                is_manager,
                has_access,
                reviewer_of: track_ids("track_reviewers")?,
                convener_of: track_ids("track_conveners")?,
            })
        }

        pub async fn insert_track(&self, event_id: i64, title: &str) -> Result<Track, Error> {
            let conn = self.conn.lock().await;
            conn.execute(
                "INSERT INTO tracks (event_id, title) VALUES (?1, ?2)",
                params![event_id, title],
            )?;
            Ok(Track {
                id: conn.last_insert_rowid(),
                event_id,
                title: title.to_string(),
            })
        }

        pub async fn get_track(&self, track_id: i64) -> Result<Option<Track>, Error> {
            let conn = self.conn.lock().await;
            conn.query_row(
                "SELECT id, event_id, title FROM tracks WHERE id = ?",
                [track_id],
                row_to_track,
            )
            .optional()
        }

        pub async fn get_event_tracks(&self, event_id: i64) -> Result<Vec<Track>, Error> {
            let conn = self.conn.lock().await;
            let mut stmt =
                conn.prepare("SELECT id, event_id, title FROM tracks WHERE event_id = ? ORDER BY title, id")?;
            let tracks = stmt.query_map([event_id], row_to_track)?;
            tracks.collect()
        }

        pub async fn add_track_reviewer(&self, track_id: i64, user_id: i64) -> Result<(), Error> {
            let conn = self.conn.lock().await;
            conn.execute(
                "INSERT OR IGNORE INTO track_reviewers (track_id, user_id) VALUES (?1, ?2)",
                [track_id, user_id],
            )?;
            Ok(())
        }

        pub async fn add_track_convener(&self, track_id: i64, user_id: i64) -> Result<(), Error> {
            let conn = self.conn.lock().await;
            conn.execute(
                "INSERT OR IGNORE INTO track_conveners (track_id, user_id) VALUES (?1, ?2)",
                [track_id, user_id],
            )?;
            Ok(())
        }

        pub async fn insert_review_question(
            &self,
            event_id: i64,
            text: &str,
            position: i64,
        ) -> Result<ReviewQuestion, Error> {
            let conn = self.conn.lock().await;
            conn.execute(
                "INSERT INTO review_questions (event_id, text, position) VALUES (?1, ?2, ?3)",
                params![event_id, text, position],
            )?;
            Ok(ReviewQuestion {
                id: conn.last_insert_rowid(),
                event_id,
                text: text.to_string(),
                position,
            })
        }

        pub async fn get_review_questions(&self, event_id: i64) -> Result<Vec<ReviewQuestion>, Error> {
            let conn = self.conn.lock().await;
            let mut stmt = conn.prepare(
                "SELECT id, event_id, text, position FROM review_questions
                 WHERE event_id = ? ORDER BY position, id",
            )?;
            let questions = stmt.query_map([event_id], |row| {
                Ok(ReviewQuestion {
                    id: row.get(0)?,
                    event_id: row.get(1)?,
                    text: row.get(2)?,
                    position: row.get(3)?,
                })
            })?;
            questions.collect()
        }

        // Insert a new abstract with the next friendly id of its event
        pub async fn insert_abstract(
            &self,
            event_id: i64,
            submitter_id: i64,
            title: &str,
            description: &str,
            track_ids: &[i64],
        ) -> Result<Abstract, Error> {
            let mut conn = self.conn.lock().await;
            let tx = conn.transaction()?;

            let friendly_id: i64 = tx.query_row(
                "SELECT COALESCE(MAX(friendly_id), 0) + 1 FROM abstracts WHERE event_id = ?",
                [event_id],
                |row| row.get(0),
            )?;
            let submitted_dt = chrono::Utc::now().to_rfc3339();
            tx.execute(
                "INSERT INTO abstracts (event_id, friendly_id, title, description, submitter_id, state, submitted_dt)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                params![
                    event_id,
                    friendly_id,
                    title,
                    description,
                    submitter_id,
                    AbstractState::Submitted.as_str(),
                    submitted_dt
                ],
            )?;
            let id = tx.last_insert_rowid();
            for track_id in track_ids {
                tx.execute(
                    "INSERT OR IGNORE INTO abstract_reviewed_tracks (abstract_id, track_id) VALUES (?1, ?2)",
                    [id, *track_id],
                )?;
            }
            tx.commit()?;
            log!("[DB] Abstract #{} created in event {} (ID: {})", friendly_id, event_id, id);

            Ok(Abstract {
                id,
                event_id,
                friendly_id,
                title: title.to_string(),
                description: description.to_string(),
                submitter_id,
                state: AbstractState::Submitted,
                submitted_dt,
                judge_id: None,
                judgment_dt: None,
                judgment_comment: String::new(),
                accepted_track_id: None,
                merged_into_id: None,
                duplicate_of_id: None,
            })
        }

        pub async fn get_abstract(&self, abstract_id: i64) -> Result<Option<Abstract>, Error> {
            let conn = self.conn.lock().await;
            conn.query_row(
                &format!("SELECT {} FROM abstracts WHERE id = ?", ABSTRACT_COLUMNS),
                [abstract_id],
                row_to_abstract,
            )
            .optional()
        }

        pub async fn get_event_abstracts(&self, event_id: i64) -> Result<Vec<AbstractSummary>, Error> {
            let conn = self.conn.lock().await;
            let mut stmt = conn.prepare(&format!(
                "SELECT {} FROM abstracts WHERE event_id = ? ORDER BY friendly_id",
                ABSTRACT_COLUMNS
            ))?;
            let abstracts = stmt.query_map([event_id], |row| {
                let a = row_to_abstract(row)?;
                Ok(AbstractSummary {
                    id: a.id,
                    friendly_id: a.friendly_id,
                    title: a.title,
                    state: a.state,
                })
            })?;
            abstracts.collect()
        }

        pub async fn get_reviewed_tracks(&self, abstract_id: i64) -> Result<Vec<Track>, Error> {
            let conn = self.conn.lock().await;
            let mut stmt = conn.prepare(
                "SELECT t.id, t.event_id, t.title FROM tracks t
                 JOIN abstract_reviewed_tracks art ON art.track_id = t.id
                 WHERE art.abstract_id = ?
                 ORDER BY t.title, t.id",
            )?;
            let tracks = stmt.query_map([abstract_id], row_to_track)?;
            tracks.collect()
        }

        // Persist the judgment fields of an abstract
        pub async fn update_abstract_judgment(&self, abstract_: &Abstract) -> Result<(), Error> {
            let conn = self.conn.lock().await;
            conn.execute(
                "UPDATE abstracts SET state = ?1, judge_id = ?2, judgment_dt = ?3, judgment_comment = ?4,
                    accepted_track_id = ?5, merged_into_id = ?6, duplicate_of_id = ?7
                 WHERE id = ?8",
                params![
                    abstract_.state.as_str(),
                    abstract_.judge_id,
                    abstract_.judgment_dt,
                    abstract_.judgment_comment,
                    abstract_.accepted_track_id,
                    abstract_.merged_into_id,
                    abstract_.duplicate_of_id,
                    abstract_.id
                ],
            )?;
            log!("[DB] Abstract {} judged: {}", abstract_.id, abstract_.state.as_str());
            Ok(())
        }

        fn query_reviews(
            conn: &Connection,
            condition: &str,
            args: &[i64],
        ) -> Result<Vec<AbstractReview>, Error> {
            let mut stmt = conn.prepare(&format!(
                "SELECT r.id, r.abstract_id, r.track_id, r.user_id, u.full_name, r.proposed_action,
                        r.proposed_related_abstract_id, r.comment, r.created_dt, r.modified_dt
                 FROM abstract_reviews r
                 JOIN users u ON u.id = r.user_id
                 WHERE {}
                 ORDER BY r.created_dt, r.id",
                condition
            ))?;
            let rows = stmt.query_map(rusqlite::params_from_iter(args.iter()), |row| {
                let action: String = row.get(5)?;
                Ok(AbstractReview {
                    id: row.get(0)?,
                    abstract_id: row.get(1)?,
                    track_id: row.get(2)?,
                    user_id: row.get(3)?,
                    user_name: row.get(4)?,
                    proposed_action: ProposedAction::parse(&action).ok_or_else(|| {
                        conversion_error(5, format!("unknown proposed action '{}'", action))
                    })?,
                    proposed_related_abstract_id: row.get(6)?,
                    comment: row.get(7)?,
                    created_dt: row.get(8)?,
                    modified_dt: row.get(9)?,
                    ratings: Vec::new(),
                })
            })?;
            let mut reviews = rows.collect::<Result<Vec<_>, _>>()?;

            let mut ratings_stmt = conn.prepare(
                "SELECT rr.id, rr.question_id, rr.value FROM abstract_review_ratings rr
                 JOIN review_questions q ON q.id = rr.question_id
                 WHERE rr.review_id = ?
                 ORDER BY q.position, q.id",
            )?;
            for review in reviews.iter_mut() {
                let ratings = ratings_stmt.query_map([review.id], |row| {
                    Ok(AbstractReviewRating {
                        id: row.get(0)?,
                        question_id: row.get(1)?,
                        value: row.get(2)?,
                    })
                })?;
                review.ratings = ratings.collect::<Result<_, _>>()?;
            }
            Ok(reviews)
        }

        pub async fn get_abstract_reviews(&self, abstract_id: i64) -> Result<Vec<AbstractReview>, Error> {
            let conn = self.conn.lock().await;
            Self::query_reviews(&conn, "r.abstract_id = ?1", &[abstract_id])
        }

        pub async fn get_track_reviews(
            &self,
            abstract_id: i64,
            track_id: i64,
        ) -> Result<Vec<AbstractReview>, Error> {
            let conn = self.conn.lock().await;
            Self::query_reviews(&conn, "r.abstract_id = ?1 AND r.track_id = ?2", &[abstract_id, track_id])
        }

        // Insert or update a review and its ratings in one transaction
        pub async fn save_review(&self, review: &mut AbstractReview) -> Result<(), Error> {
            let mut conn = self.conn.lock().await;
            let tx = conn.transaction()?;

            if review.id.is_some() {
                review.modified_dt = Some(chrono::Utc::now().to_rfc3339());
            }
            let review_id = match review.id {
                Some(id) => {
                    tx.execute(
                        "UPDATE abstract_reviews SET proposed_action = ?1, proposed_related_abstract_id = ?2,
                            comment = ?3, modified_dt = ?4
                         WHERE id = ?5",
                        params![
                            review.proposed_action.as_str(),
                            review.proposed_related_abstract_id,
                            review.comment,
                            review.modified_dt,
                            id
                        ],
                    )?;
                    id
                }
                None => {
                    tx.execute(
                        "INSERT INTO abstract_reviews (abstract_id, track_id, user_id, proposed_action,
                            proposed_related_abstract_id, comment, created_dt)
                         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                        params![
                            review.abstract_id,
                            review.track_id,
                            review.user_id,
                            review.proposed_action.as_str(),
                            review.proposed_related_abstract_id,
                            review.comment,
                            review.created_dt
                        ],
                    )?;
                    tx.last_insert_rowid()
                }
            };

            for rating in review.ratings.iter_mut() {
                match rating.id {
                    Some(id) => {
                        tx.execute(
                            "UPDATE abstract_review_ratings SET value = ?1 WHERE id = ?2",
                            [rating.value, id],
                        )?;
                    }
                    None => {
                        tx.execute(
                            "INSERT INTO abstract_review_ratings (review_id, question_id, value)
                             VALUES (?1, ?2, ?3)",
                            [review_id, rating.question_id, rating.value],
                        )?;
                        rating.id = Some(tx.last_insert_rowid());
                    }
                }
            }
            tx.commit()?;
            review.id = Some(review_id);
            log!("[DB] Review {} saved with {} ratings", review_id, review.ratings.len());
            Ok(())
        }

        pub async fn insert_abstract_file(
            &self,
            abstract_id: i64,
            filename: &str,
            content_type: &str,
            size: i64,
            storage_file_id: &str,
        ) -> Result<AbstractFile, Error> {
            let conn = self.conn.lock().await;
            let created_dt = chrono::Utc::now().to_rfc3339();
            conn.execute(
                "INSERT INTO abstract_files (abstract_id, filename, content_type, size, storage_file_id, created_dt)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                params![abstract_id, filename, content_type, size, storage_file_id, created_dt],
            )?;
            Ok(AbstractFile {
                id: conn.last_insert_rowid(),
                abstract_id,
                filename: filename.to_string(),
                content_type: content_type.to_string(),
                size,
                storage_file_id: storage_file_id.to_string(),
                created_dt,
            })
        }

        pub async fn get_abstract_file(&self, file_id: i64) -> Result<Option<AbstractFile>, Error> {
            let conn = self.conn.lock().await;
            conn.query_row(
                &format!("SELECT {} FROM abstract_files WHERE id = ?", FILE_COLUMNS),
                [file_id],
                row_to_file,
            )
            .optional()
        }

        pub async fn get_abstract_files(&self, abstract_id: i64) -> Result<Vec<AbstractFile>, Error> {
            let conn = self.conn.lock().await;
            let mut stmt = conn.prepare(&format!(
                "SELECT {} FROM abstract_files WHERE abstract_id = ? ORDER BY filename, id",
                FILE_COLUMNS
            ))?;
            let files = stmt.query_map([abstract_id], row_to_file)?;
            files.collect()
        }

        pub async fn insert_log_entry(&self, entry: &NewLogEntry) -> Result<i64, Error> {
            let conn = self.conn.lock().await;
            conn.execute(
                "INSERT INTO event_log_entries (event_id, realm, kind, module, summary, user_id, logged_dt, data)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
                params![
                    entry.event_id,
                    entry.realm,
                    entry.kind.as_str(),
                    entry.module,
                    entry.summary,
                    entry.user_id,
                    chrono::Utc::now().to_rfc3339(),
                    entry.data.to_string()
                ],
            )?;
            Ok(conn.last_insert_rowid())
        }

        pub async fn count_log_entries(&self, event_id: i64) -> Result<i64, Error> {
            let conn = self.conn.lock().await;
            conn.query_row(
                "SELECT COUNT(*) FROM event_log_entries WHERE event_id = ?",
                [event_id],
                |row| row.get(0),
            )
        }

        // Newest entries first
        pub async fn get_log_entries(
            &self,
            event_id: i64,
            limit: i64,
            offset: i64,
        ) -> Result<Vec<LogEntry>, Error> {
            let conn = self.conn.lock().await;
            let mut stmt = conn.prepare(
                "SELECT e.id, e.event_id, e.realm, e.kind, e.module, e.summary, e.user_id, u.full_name,
                        e.logged_dt, e.data
                 FROM event_log_entries e
                 LEFT JOIN users u ON u.id = e.user_id
                 WHERE e.event_id = ?1
                 ORDER BY e.logged_dt DESC, e.id DESC
                 LIMIT ?2 OFFSET ?3",
            )?;
            let entries = stmt.query_map([event_id, limit, offset], |row| {
                let kind: String = row.get(3)?;
                let data: String = row.get(9)?;
                Ok(LogEntry {
                    id: row.get(0)?,
                    event_id: row.get(1)?,
                    realm: row.get(2)?,
                    kind: LogKind::parse(&kind),
                    module: row.get(4)?,
                    summary: row.get(5)?,
                    user_id: row.get(6)?,
                    user_name: row.get(7)?,
                    logged_dt: row.get(8)?,
                    data: serde_json::from_str(&data).map_err(|e| {
                        log!("[DB] Corrupt data in log entry: {}", e);
                        conversion_error(9, format!("invalid log entry data: {}", e))
                    })?,
                })
            })?;
            entries.collect()
        }

        // function to log database state
        pub async fn debug_dump(&self) -> Result<(), Error> {
            let conn = self.conn.lock().await;
            let mut stmt = conn.prepare(
                "SELECT 'events', COUNT(*) FROM events
                 UNION ALL SELECT 'abstracts', COUNT(*) FROM abstracts
                 UNION ALL SELECT 'reviews', COUNT(*) FROM abstract_reviews
                 UNION ALL SELECT 'ratings', COUNT(*) FROM abstract_review_ratings",
            )?;
            let counts = stmt
                .query_map([], |row| Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)?)))?
                .collect::<Result<HashMap<_, _>, _>>()?;
            log!("[DATABASE DEBUG] {:?}", counts);
            Ok(())
        }
    }
}

#[cfg(feature = "ssr")]
pub use db_impl::Database;
