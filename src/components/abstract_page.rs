//! Full page of a single abstract, used by both the display and management handlers.
use leptos::*;

use crate::components::decision_box::{DecisionBox, DecisionSummary};
use crate::components::review_box::ReviewBox;
use crate::components::reviews_list::ReviewsList;
use crate::forms::judgment::JudgmentForm;
use crate::forms::review::ReviewForm;
use crate::models::abstracts::Abstract;
use crate::models::event::ReviewQuestion;
use crate::models::file::AbstractFile;
use crate::models::review::AbstractReview;
use crate::models::track::Track;

#[derive(Debug, Clone)]
pub struct ReviewBoxData {
    pub form: ReviewForm,
    pub track: Track,
    pub action_url: String,
}

#[derive(Debug, Clone)]
pub struct DecisionBoxData {
    pub form: JudgmentForm,
    pub summary: Option<DecisionSummary>,
    pub can_judge: bool,
    pub action_url: String,
}

#[derive(Debug, Clone)]
pub struct ReviewsData {
    pub reviews: Vec<AbstractReview>,
    pub questions: Vec<ReviewQuestion>,
}

#[derive(Debug, Clone)]
pub struct AbstractPageData {
    pub event_title: String,
    pub abstract_: Abstract,
    pub submitter_name: String,
    pub tracks: Vec<Track>,
    pub files: Vec<(AbstractFile, String)>, // file and its download url
    pub pdf_url: String,
    pub review_boxes: Vec<ReviewBoxData>,
    pub decision: DecisionBoxData,
    pub reviews: Option<ReviewsData>,
    pub management: bool,
    pub csrf_token: String,
}

#[component]
pub fn AbstractPage(page: AbstractPageData) -> impl IntoView {
    let abstract_ = page.abstract_;
    let heading = format!("Abstract #{}: {}", abstract_.friendly_id, abstract_.title);
    let track_names = page
        .tracks
        .iter()
        .map(|t| t.title.clone())
        .collect::<Vec<_>>()
        .join(", ");

    let files = page
        .files
        .into_iter()
        .map(|(file, url)| view! { <li><a href=url>{file.filename}</a></li> })
        .collect::<Vec<_>>();

    let csrf_token = page.csrf_token;
    let review_boxes = page
        .review_boxes
        .into_iter()
        .map(|data| {
            view! {
                <ReviewBox
                    form=data.form
                    track=data.track
                    action_url=data.action_url
                    csrf_token={csrf_token.clone()}
                />
            }
        })
        .collect::<Vec<_>>();

    let tracks = page.tracks;
    let reviews = page.reviews.map(|data| {
        view! { <ReviewsList reviews=data.reviews tracks=tracks questions=data.questions/> }
    });

    let decision = page.decision;
    let body_class = if page.management { "abstract-page management" } else { "abstract-page" };

    view! {
        <html lang="en">
            <head>
                <meta charset="utf-8"/>
                <title>{heading.clone()}</title>
            </head>
            <body class=body_class>
                <p class="event-title">{page.event_title}</p>
                <h1>{heading}</h1>
                <p class="abstract-state">{abstract_.state.title()}</p>
                <p class="abstract-submitter">{format!("Submitted by {}", page.submitter_name)}</p>
                <p class="abstract-tracks">{format!("Tracks: {}", track_names)}</p>
                <div class="abstract-description">{abstract_.description}</div>
                <ul class="abstract-files">{files}</ul>
                <a class="abstract-pdf" href={page.pdf_url}>"PDF"</a>
                <div class="review-forms">{review_boxes}</div>
                <DecisionBox
                    form=decision.form
                    summary=decision.summary
                    can_judge=decision.can_judge
                    action_url=decision.action_url
                    csrf_token=csrf_token
                />
                {reviews}
            </body>
        </html>
    }
}

#[cfg(feature = "ssr")]
pub fn render_abstract_page(page: AbstractPageData) -> String {
    let html = leptos::ssr::render_to_string(move || view! { <AbstractPage page=page/> });
    format!("<!DOCTYPE html>{}", html)
}
