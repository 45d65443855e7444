use confabstracts::config::AppConfig;
use confabstracts::db::Database;
use confabstracts::models::abstracts::Abstract;
use confabstracts::models::event::{Event, ReviewQuestion};
use confabstracts::models::track::Track;
use confabstracts::models::user::User;
use tempfile::TempDir;

/// An event with two tracks, one abstract reviewed in both, and a user per role.
pub struct Fixture {
    pub db: Database,
    pub config: AppConfig,
    pub storage: TempDir,
    pub event: Event,
    pub astro: Track,
    pub optics: Track,
    pub question: ReviewQuestion,
    pub submitter: User,
    pub reviewer: User,
    pub optics_reviewer: User,
    pub manager: User,
    pub outsider: User,
    pub abstract_: Abstract,
    pub other: Abstract,
}

pub async fn setup_fixture() -> Fixture {
    let storage = tempfile::tempdir().unwrap();
    let db = Database::new(":memory:").unwrap();
    db.create_schema().await.unwrap();

    let event = db.insert_event("Physics 2026", false).await.unwrap();
    let astro = db.insert_track(event.id, "Astro").await.unwrap();
    let optics = db.insert_track(event.id, "Optics").await.unwrap();
    let question = db.insert_review_question(event.id, "Relevance", 1).await.unwrap();

    let submitter = db.insert_user("Sam Submitter", "sam@example.com").await.unwrap();
    let reviewer = db.insert_user("Rae Reviewer", "rae@example.com").await.unwrap();
    let optics_reviewer = db.insert_user("Oli Optics", "oli@example.com").await.unwrap();
    let manager = db.insert_user("Max Manager", "max@example.com").await.unwrap();
    let outsider = db.insert_user("Oz Outsider", "oz@example.com").await.unwrap();

    db.add_track_reviewer(astro.id, reviewer.id).await.unwrap();
    db.add_track_reviewer(optics.id, optics_reviewer.id).await.unwrap();
    db.add_event_manager(event.id, manager.id).await.unwrap();

    let abstract_ = db
        .insert_abstract(event.id, submitter.id, "Black holes", "Dark and heavy.", &[astro.id])
        .await
        .unwrap();
    let other = db
        .insert_abstract(event.id, submitter.id, "Lensing", "Bent light.", &[astro.id, optics.id])
        .await
        .unwrap();

    let config = AppConfig {
        db_path: ":memory:".to_string(),
        site_addr: "127.0.0.1:3004".parse().unwrap(),
        storage_dir: storage.path().to_path_buf(),
    };

    Fixture {
        db,
        config,
        storage,
        event,
        astro,
        optics,
        question,
        submitter,
        reviewer,
        optics_reviewer,
        manager,
        outsider,
        abstract_,
        other,
    }
}

impl Fixture {
    pub fn abstract_url(&self, abstract_: &Abstract) -> String {
        format!("/event/{}/abstracts/{}/", self.event.id, abstract_.id)
    }
}
