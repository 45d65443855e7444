use leptos::*;

use crate::forms::review::{ReviewForm, FIELD_COMMENT, FIELD_PROPOSED_ACTION, FIELD_RELATED_ABSTRACT};
use crate::models::review::ProposedAction;
use crate::models::track::Track;

#[component]
fn FieldError(error: Option<String>) -> impl IntoView {
    error.map(|e| view! { <span class="field-error">{e}</span> })
}

/// Review form of one track, as shown on the abstract page and returned by the review handler.
#[component]
pub fn ReviewBox(
    form: ReviewForm,
    track: Track,
    action_url: String,
    csrf_token: String,
) -> impl IntoView {
    let state = form.state;
    let scale = form.rating_scale_max;

    let questions = form
        .questions
        .iter()
        .map(|question| {
            let field = question.field_name();
            let current = state.value(&field).to_string();
            let options = (0..=scale)
                .map(|value| {
                    let value = value.to_string();
                    let selected = value == current;
                    view! { <option value={value.clone()} selected=selected>{value}</option> }
                })
                .collect::<Vec<_>>();
            view! {
                <div class="review-question">
                    <span class="question-text">{question.text.clone()}</span>
                    <select name={state.field_name(&field)}>
                        <option value="">"-"</option>
                        {options}
                    </select>
                    <FieldError error={state.error(&field).map(str::to_string)}/>
                </div>
            }
        })
        .collect::<Vec<_>>();

    let current_action = state.value(FIELD_PROPOSED_ACTION).to_string();
    let actions = ProposedAction::ALL
        .iter()
        .map(|action| {
            view! {
                <option value={action.as_str()} selected={action.as_str() == current_action}>
                    {action.title()}
                </option>
            }
        })
        .collect::<Vec<_>>();

    view! {
        <div class="review-box" data-track-id={track.id.to_string()}>
            <h3>{format!("Review for track {}", track.title)}</h3>
            <form method="post" action=action_url>
                <input type="hidden" name="csrf_token" value=csrf_token/>
                {questions}
                <div class="review-action">
                    <select name={state.field_name(FIELD_PROPOSED_ACTION)}>
                        <option value="">"-"</option>
                        {actions}
                    </select>
                    <FieldError error={state.error(FIELD_PROPOSED_ACTION).map(str::to_string)}/>
                </div>
                <div class="review-related">
                    <input
                        type="text"
                        name={state.field_name(FIELD_RELATED_ABSTRACT)}
                        placeholder="Related abstract"
                        value={state.value(FIELD_RELATED_ABSTRACT).to_string()}
                    />
                    <FieldError error={state.error(FIELD_RELATED_ABSTRACT).map(str::to_string)}/>
                </div>
                <textarea name={state.field_name(FIELD_COMMENT)} placeholder="Comment">
                    {state.value(FIELD_COMMENT).to_string()}
                </textarea>
                <button type="submit">{ "Submit Review" }</button>
            </form>
        </div>
    }
}

#[cfg(feature = "ssr")]
pub fn render_review_box(form: ReviewForm, track: Track, action_url: String, csrf_token: String) -> String {
    leptos::ssr::render_to_string(move || {
        view! { <ReviewBox form=form track=track action_url=action_url csrf_token=csrf_token/> }
    })
    .to_string()
}
