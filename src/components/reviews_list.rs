use leptos::*;

use crate::models::event::ReviewQuestion;
use crate::models::review::AbstractReview;
use crate::models::track::Track;

/// Submitted reviews of an abstract, grouped by track.
#[component]
pub fn ReviewsList(
    reviews: Vec<AbstractReview>,
    tracks: Vec<Track>,
    questions: Vec<ReviewQuestion>,
) -> impl IntoView {
    let groups = tracks
        .into_iter()
        .map(|track| {
            let items = reviews
                .iter()
                .filter(|review| review.track_id == track.id)
                .map(|review| {
                    let ratings = questions
                        .iter()
                        .map(|q| {
                            let value = review
                                .get_rating(q.id)
                                .map(|r| r.value.to_string())
                                .unwrap_or_else(|| "-".to_string());
                            view! { <li class="rating">{format!("{}: {}", q.text, value)}</li> }
                        })
                        .collect::<Vec<_>>();
                    view! {
                        <li class="review">
                            <span class="reviewer">{review.user_name.clone()}</span>
                            <span class="proposed-action">{review.proposed_action.title()}</span>
                            <ul>{ratings}</ul>
                            <p class="review-comment">{review.comment.clone()}</p>
                        </li>
                    }
                })
                .collect::<Vec<_>>();
            let empty = items.is_empty();
            view! {
                <div class="track-reviews">
                    <h4>{track.title}</h4>
                    {empty.then(|| view! { <p>"No reviews yet."</p> })}
                    <ul>{items}</ul>
                </div>
            }
        })
        .collect::<Vec<_>>();

    view! {
        <div class="reviews-list">
            <h3>{ "Reviews" }</h3>
            {groups}
        </div>
    }
}
