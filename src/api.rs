//! HTTP handlers for displaying, reviewing and judging abstracts.
//!
//! Every handler runs the same steps: resolve the URL parameters
//! (`*_params`), check permissions (`check_*`), verify the CSRF token on
//! POST, then render HTML, return JSON or stream a file.
use actix_files::NamedFile;
use actix_web::http::header::{ContentDisposition, DispositionParam, DispositionType};
use actix_web::{web, HttpRequest, HttpResponse};
use leptos::logging::log;
use serde::{Deserialize, Serialize};

use crate::components::abstract_page::{
    render_abstract_page, AbstractPageData, DecisionBoxData, ReviewBoxData, ReviewsData,
};
use crate::components::decision_box::{render_decision_box, DecisionSummary};
use crate::components::review_box::render_review_box;
use crate::config::AppConfig;
use crate::db::Database;
use crate::error::AppError;
use crate::forms::judgment::JudgmentForm;
use crate::forms::review::build_review_form;
use crate::forms::FormData;
use crate::models::abstracts::{Abstract, AbstractState};
use crate::models::file::AbstractFile;
use crate::models::review::AbstractReview;
use crate::models::track::Track;
use crate::operations;
use crate::pdf::AbstractToPdf;
use crate::permissions::{AbstractContext, EventRoles};
use crate::utils::fs::secure_filename;
use crate::utils::session::{check_csrf, csrf_token, current_user};

#[derive(Debug, Deserialize)]
pub struct EventPath {
    pub event_id: i64,
}

#[derive(Debug, Deserialize)]
pub struct AbstractPath {
    pub event_id: i64,
    pub abstract_id: i64,
}

#[derive(Debug, Deserialize)]
pub struct FilePath {
    pub event_id: i64,
    pub abstract_id: i64,
    pub file_id: i64,
}

#[derive(Debug, Deserialize)]
pub struct TrackPath {
    pub event_id: i64,
    pub abstract_id: i64,
    pub track_id: i64,
}

#[derive(Debug, Deserialize)]
pub struct LogQuery {
    pub page: Option<i64>,
}

/// JSON body returned by the review and judgment boxes.
#[derive(Debug, Serialize, Deserialize)]
pub struct BoxResponse {
    pub success: bool,
    pub html: String,
}

fn jsonify_box(html: String) -> HttpResponse {
    HttpResponse::Ok().json(BoxResponse { success: true, html })
}

pub fn abstract_url(event_id: i64, abstract_id: i64) -> String {
    format!("/event/{}/abstracts/{}/", event_id, abstract_id)
}

pub fn attachment_url(event_id: i64, file: &AbstractFile) -> String {
    format!("{}attachments/{}", abstract_url(event_id, file.abstract_id), file.id)
}

pub fn judge_url(event_id: i64, abstract_id: i64) -> String {
    format!("{}judge", abstract_url(event_id, abstract_id))
}

pub fn review_url(event_id: i64, abstract_id: i64, track_id: i64) -> String {
    format!("{}reviews/{}", abstract_url(event_id, abstract_id), track_id)
}

/// Loads the event and abstract named in the URL along with the session user's roles.
async fn abstract_params(
    req: &HttpRequest,
    db: &Database,
    event_id: i64,
    abstract_id: i64,
) -> Result<AbstractContext, AppError> {
    let event = db
        .get_event(event_id)
        .await?
        .ok_or_else(|| AppError::not_found("event", event_id))?;
    let abstract_ = db
        .get_abstract(abstract_id)
        .await?
        .filter(|a| a.event_id == event.id)
        .ok_or_else(|| AppError::not_found("abstract", abstract_id))?;
    let user = current_user(req, db).await?;
    let roles = match &user {
        Some(user) => db.get_event_roles(event.id, user.id).await?,
        None => EventRoles::default(),
    };
    let reviewed_tracks = db.get_reviewed_tracks(abstract_.id).await?;
    Ok(AbstractContext {
        event,
        abstract_,
        reviewed_tracks,
        user,
        roles,
    })
}

/// Event display protection followed by abstract protection.
fn check_abstract_protection(ctx: &AbstractContext) -> Result<(), AppError> {
    if !ctx.can_access_event() {
        return Err(AppError::Forbidden("you may not access this event"));
    }
    if !ctx.can_access() {
        return Err(AppError::Forbidden("you may not access this abstract"));
    }
    Ok(())
}

fn check_management(ctx: &AbstractContext) -> Result<(), AppError> {
    check_abstract_protection(ctx)?;
    if !ctx.is_manager() {
        return Err(AppError::Forbidden("you may not manage this event"));
    }
    Ok(())
}

async fn decision_summary(db: &Database, abstract_: &Abstract) -> Result<Option<DecisionSummary>, AppError> {
    if abstract_.state == AbstractState::Submitted {
        return Ok(None);
    }
    let judge_name = match abstract_.judge_id {
        Some(judge_id) => db.get_user(judge_id).await?.map(|u| u.full_name),
        None => None,
    };
    let target = |prefix: &str, target: Option<Abstract>| {
        target.map(|t| format!("{} #{}: {}", prefix, t.friendly_id, t.title))
    };
    let detail = match abstract_.state {
        AbstractState::Accepted => match abstract_.accepted_track_id {
            Some(track_id) => db
                .get_track(track_id)
                .await?
                .map(|t| format!("Accepted for track {}", t.title)),
            None => None,
        },
        AbstractState::Merged => match abstract_.merged_into_id {
            Some(id) => target("Merged into", db.get_abstract(id).await?),
            None => None,
        },
        AbstractState::Duplicate => match abstract_.duplicate_of_id {
            Some(id) => target("Duplicate of", db.get_abstract(id).await?),
            None => None,
        },
        _ => None,
    };
    Ok(Some(DecisionSummary {
        state_title: abstract_.state.title().to_string(),
        judge_name,
        judgment_dt: abstract_.judgment_dt.clone(),
        comment: abstract_.judgment_comment.clone(),
        detail,
    }))
}

async fn build_decision_box(db: &Database, ctx: &AbstractContext) -> Result<DecisionBoxData, AppError> {
    let tracks = db.get_event_tracks(ctx.event.id).await?;
    let candidates = db.get_event_abstracts(ctx.event.id).await?;
    Ok(DecisionBoxData {
        form: JudgmentForm::new(&ctx.abstract_, tracks, candidates),
        summary: decision_summary(db, &ctx.abstract_).await?,
        can_judge: ctx.can_judge(),
        action_url: judge_url(ctx.event.id, ctx.abstract_.id),
    })
}

fn render_decision(decision: DecisionBoxData, ctx: &AbstractContext) -> String {
    render_decision_box(
        decision.form,
        decision.summary,
        decision.can_judge,
        decision.action_url,
        csrf_token(ctx.user.as_ref()),
    )
}

async fn user_review(
    db: &Database,
    ctx: &AbstractContext,
    track_id: i64,
) -> Result<Option<AbstractReview>, AppError> {
    match ctx.user_id() {
        Some(user_id) => {
            operations::get_user_review_for_track(db, user_id, ctx.abstract_.id, track_id).await
        }
        None => Ok(None),
    }
}

async fn abstract_page(db: &Database, ctx: &AbstractContext, management: bool) -> Result<HttpResponse, AppError> {
    let event = &ctx.event;
    let abstract_ = &ctx.abstract_;
    let questions = db.get_review_questions(event.id).await?;

    let mut review_boxes = Vec::new();
    for track in ctx.reviewable_tracks() {
        let review = user_review(db, ctx, track.id).await?;
        review_boxes.push(ReviewBoxData {
            form: build_review_form(&event.settings, &questions, track.id, review.as_ref()),
            track: track.clone(),
            action_url: review_url(event.id, abstract_.id, track.id),
        });
    }

    let reviews = if management || ctx.can_see_reviews() {
        Some(ReviewsData {
            reviews: db.get_abstract_reviews(abstract_.id).await?,
            questions,
        })
    } else {
        None
    };

    let files = db
        .get_abstract_files(abstract_.id)
        .await?
        .into_iter()
        .map(|file| {
            let url = attachment_url(event.id, &file);
            (file, url)
        })
        .collect();
    let submitter_name = db
        .get_user(abstract_.submitter_id)
        .await?
        .map(|u| u.full_name)
        .unwrap_or_else(|| "Unknown".to_string());

    let page = AbstractPageData {
        event_title: event.title.clone(),
        abstract_: abstract_.clone(),
        submitter_name,
        tracks: ctx.reviewed_tracks.clone(),
        files,
        pdf_url: format!("{}abstract.pdf", abstract_url(event.id, abstract_.id)),
        review_boxes,
        decision: build_decision_box(db, ctx).await?,
        reviews,
        management,
        csrf_token: csrf_token(ctx.user.as_ref()),
    };
    Ok(HttpResponse::Ok()
        .content_type("text/html; charset=utf-8")
        .body(render_abstract_page(page)))
}

pub async fn display_abstract(
    req: HttpRequest,
    db: web::Data<Database>,
    path: web::Path<AbstractPath>,
) -> Result<HttpResponse, AppError> {
    log!("[API] Display abstract {} of event {}", path.abstract_id, path.event_id);
    let ctx = abstract_params(&req, &db, path.event_id, path.abstract_id).await?;
    check_abstract_protection(&ctx)?;
    abstract_page(&db, &ctx, false).await
}

pub async fn manage_abstract(
    req: HttpRequest,
    db: web::Data<Database>,
    path: web::Path<AbstractPath>,
) -> Result<HttpResponse, AppError> {
    log!("[API] Manage abstract {} of event {}", path.abstract_id, path.event_id);
    let ctx = abstract_params(&req, &db, path.event_id, path.abstract_id).await?;
    check_management(&ctx)?;
    abstract_page(&db, &ctx, true).await
}

pub async fn export_abstract_pdf(
    req: HttpRequest,
    db: web::Data<Database>,
    path: web::Path<AbstractPath>,
) -> Result<HttpResponse, AppError> {
    let ctx = abstract_params(&req, &db, path.event_id, path.abstract_id).await?;
    check_abstract_protection(&ctx)?;

    let pdf = AbstractToPdf::new(&ctx.event.title, &ctx.abstract_, &ctx.reviewed_tracks).generate();
    let file_name = secure_filename(
        &format!("abstract-{}.pdf", ctx.abstract_.friendly_id),
        "abstract.pdf",
    );
    log!("[API] Exporting abstract {} as {} ({} bytes)", ctx.abstract_.id, file_name, pdf.len());
    Ok(HttpResponse::Ok()
        .content_type("application/pdf")
        .insert_header(ContentDisposition {
            disposition: DispositionType::Attachment,
            parameters: vec![DispositionParam::Filename(file_name)],
        })
        .body(pdf))
}

pub async fn download_attachment(
    req: HttpRequest,
    db: web::Data<Database>,
    config: web::Data<AppConfig>,
    path: web::Path<FilePath>,
) -> Result<HttpResponse, AppError> {
    let ctx = abstract_params(&req, &db, path.event_id, path.abstract_id).await?;
    let file = db
        .get_abstract_file(path.file_id)
        .await?
        .filter(|f| f.abstract_id == ctx.abstract_.id)
        .ok_or_else(|| AppError::not_found("file", path.file_id))?;
    check_abstract_protection(&ctx)?;

    log!("[API] Sending attachment {} ({})", file.id, file.filename);
    let content_type: mime::Mime = file
        .content_type
        .parse()
        .unwrap_or(mime::APPLICATION_OCTET_STREAM);
    let named = NamedFile::open_async(operations::abstract_file_path(&config.storage_dir, &file))
        .await?
        .set_content_type(content_type)
        .set_content_disposition(ContentDisposition {
            disposition: DispositionType::Attachment,
            parameters: vec![DispositionParam::Filename(secure_filename(&file.filename, "attachment"))],
        });
    Ok(named.into_response(&req))
}

pub async fn judgment_box(
    req: HttpRequest,
    db: web::Data<Database>,
    path: web::Path<AbstractPath>,
) -> Result<HttpResponse, AppError> {
    let ctx = abstract_params(&req, &db, path.event_id, path.abstract_id).await?;
    check_abstract_protection(&ctx)?;
    let decision = build_decision_box(&db, &ctx).await?;
    Ok(jsonify_box(render_decision(decision, &ctx)))
}

pub async fn judge_abstract(
    req: HttpRequest,
    db: web::Data<Database>,
    path: web::Path<AbstractPath>,
    data: web::Form<FormData>,
) -> Result<HttpResponse, AppError> {
    let mut ctx = abstract_params(&req, &db, path.event_id, path.abstract_id).await?;
    check_abstract_protection(&ctx)?;
    if !ctx.can_judge() {
        return Err(AppError::Forbidden("you may not judge this abstract"));
    }
    check_csrf(ctx.user.as_ref(), &data)?;
    let Some(judge) = ctx.user.clone() else {
        return Err(AppError::Forbidden("you may not judge this abstract"));
    };

    let mut decision = build_decision_box(&db, &ctx).await?;
    match decision.form.validate(&data) {
        Some((judgment_data, abstract_data)) => {
            log!(
                "[API] User {} judges abstract {}: {}",
                judge.id,
                ctx.abstract_.id,
                judgment_data.judgment.as_str()
            );
            operations::judge_abstract(&db, &mut ctx.abstract_, abstract_data, judgment_data, &judge)
                .await?;
            decision = build_decision_box(&db, &ctx).await?;
        }
        None => log!("[API] Invalid judgment for abstract {}: {:?}", ctx.abstract_.id, decision.form.state.errors),
    }
    Ok(jsonify_box(render_decision(decision, &ctx)))
}

/// Parameters of the per-track review handlers: the context, the track and the user's existing review.
async fn review_params(
    req: &HttpRequest,
    db: &Database,
    path: &TrackPath,
) -> Result<(AbstractContext, Track, Option<AbstractReview>), AppError> {
    let ctx = abstract_params(req, db, path.event_id, path.abstract_id).await?;
    let track = db
        .get_track(path.track_id)
        .await?
        .filter(|t| t.event_id == ctx.event.id && ctx.is_reviewed_for(t.id))
        .ok_or_else(|| AppError::not_found("track", path.track_id))?;
    let review = user_review(db, &ctx, track.id).await?;
    Ok((ctx, track, review))
}

fn check_review_protection(ctx: &AbstractContext, track: &Track) -> Result<(), AppError> {
    if !ctx.can_review() || !ctx.is_user_reviewer(track) {
        return Err(AppError::Forbidden("you may not review this abstract"));
    }
    check_abstract_protection(ctx)
}

pub async fn review_box(
    req: HttpRequest,
    db: web::Data<Database>,
    path: web::Path<TrackPath>,
) -> Result<HttpResponse, AppError> {
    let (ctx, track, review) = review_params(&req, &db, &path).await?;
    check_review_protection(&ctx, &track)?;

    let questions = db.get_review_questions(ctx.event.id).await?;
    let form = build_review_form(&ctx.event.settings, &questions, track.id, review.as_ref());
    let action_url = review_url(ctx.event.id, ctx.abstract_.id, track.id);
    Ok(jsonify_box(render_review_box(form, track, action_url, csrf_token(ctx.user.as_ref()))))
}

pub async fn review_abstract_for_track(
    req: HttpRequest,
    db: web::Data<Database>,
    path: web::Path<TrackPath>,
    data: web::Form<FormData>,
) -> Result<HttpResponse, AppError> {
    let (ctx, track, review) = review_params(&req, &db, &path).await?;
    check_review_protection(&ctx, &track)?;
    check_csrf(ctx.user.as_ref(), &data)?;
    let Some(user) = ctx.user.as_ref() else {
        return Err(AppError::Forbidden("you may not review this abstract"));
    };

    let questions = db.get_review_questions(ctx.event.id).await?;
    let candidates = db.get_event_abstracts(ctx.event.id).await?;
    let mut form = build_review_form(&ctx.event.settings, &questions, track.id, review.as_ref());
    match form.validate(&data, &ctx.abstract_, &candidates) {
        Some(cleaned) => {
            let saved =
                operations::submit_review(&db, &ctx.abstract_, &track, user, review, &cleaned).await?;
            log!("[API] Review {:?} saved for abstract {}", saved.id, ctx.abstract_.id);
        }
        None => log!("[API] Invalid review for abstract {}: {:?}", ctx.abstract_.id, form.state.errors),
    }

    let action_url = review_url(ctx.event.id, ctx.abstract_.id, track.id);
    Ok(jsonify_box(render_review_box(form, track, action_url, csrf_token(ctx.user.as_ref()))))
}

pub async fn event_log(
    req: HttpRequest,
    db: web::Data<Database>,
    path: web::Path<EventPath>,
    query: web::Query<LogQuery>,
) -> Result<HttpResponse, AppError> {
    let event = db
        .get_event(path.event_id)
        .await?
        .ok_or_else(|| AppError::not_found("event", path.event_id))?;
    let Some(user) = current_user(&req, &db).await? else {
        return Err(AppError::Forbidden("you may not manage this event"));
    };
    if !db.get_event_roles(event.id, user.id).await?.is_manager {
        return Err(AppError::Forbidden("you may not manage this event"));
    }
    let page = operations::get_log_page(&db, event.id, query.page.unwrap_or(1)).await?;
    Ok(HttpResponse::Ok().json(page))
}

/// Registers the abstract routes.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/event/{event_id}")
            .route("/abstracts/{abstract_id}/", web::get().to(display_abstract))
            .route("/abstracts/{abstract_id}/abstract.pdf", web::get().to(export_abstract_pdf))
            .route(
                "/abstracts/{abstract_id}/attachments/{file_id}",
                web::get().to(download_attachment),
            )
            .route("/abstracts/{abstract_id}/judge", web::get().to(judgment_box))
            .route("/abstracts/{abstract_id}/judge", web::post().to(judge_abstract))
            .route("/abstracts/{abstract_id}/reviews/{track_id}", web::get().to(review_box))
            .route(
                "/abstracts/{abstract_id}/reviews/{track_id}",
                web::post().to(review_abstract_for_track),
            )
            .route("/manage/abstracts/{abstract_id}/", web::get().to(manage_abstract))
            .route("/manage/logs", web::get().to(event_log)),
    );
}
