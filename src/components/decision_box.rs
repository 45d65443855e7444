use leptos::*;

use crate::forms::judgment::{
    JudgmentForm, FIELD_ACCEPTED_TRACK, FIELD_DUPLICATE_OF, FIELD_JUDGMENT,
    FIELD_JUDGMENT_COMMENT, FIELD_MERGED_INTO, FIELD_SEND_NOTIFICATIONS,
};
use crate::models::abstracts::Judgment;

/// The recorded decision of an already judged abstract.
#[derive(Debug, Clone, PartialEq)]
pub struct DecisionSummary {
    pub state_title: String,
    pub judge_name: Option<String>,
    pub judgment_dt: Option<String>,
    pub comment: String,
    /// Accepted track, merge target or original of a duplicate.
    pub detail: Option<String>,
}

#[component]
fn ChoiceSelect(
    name: String,
    current: String,
    choices: Vec<(String, String)>,
    error: Option<String>,
) -> impl IntoView {
    let options = choices
        .into_iter()
        .map(|(value, label)| {
            let selected = value == current;
            view! { <option value=value selected=selected>{label}</option> }
        })
        .collect::<Vec<_>>();
    view! {
        <select name=name>
            <option value="">"-"</option>
            {options}
        </select>
        {error.map(|e| view! { <span class="field-error">{e}</span> })}
    }
}

/// Judgment form or recorded decision of an abstract.
#[component]
pub fn DecisionBox(
    form: JudgmentForm,
    summary: Option<DecisionSummary>,
    can_judge: bool,
    action_url: String,
    csrf_token: String,
) -> impl IntoView {
    if let Some(summary) = summary {
        return view! {
            <div class="decision-box judged">
                <h3>{format!("Decision: {}", summary.state_title)}</h3>
                {summary.detail.map(|d| view! { <p class="decision-detail">{d}</p> })}
                {summary.judge_name.map(|name| view! { <p class="decision-judge">{format!("Judged by {}", name)}</p> })}
                {summary.judgment_dt.map(|dt| view! { <p class="decision-date">{dt}</p> })}
                <p class="decision-comment">{summary.comment}</p>
            </div>
        }
        .into_view();
    }

    if !can_judge {
        return view! {
            <div class="decision-box pending">
                <p>"This abstract has not been judged yet."</p>
            </div>
        }
        .into_view();
    }

    let state = form.state;
    let judgments = Judgment::ALL
        .iter()
        .map(|j| (j.as_str().to_string(), j.title().to_string()))
        .collect::<Vec<_>>();
    let tracks = form
        .tracks
        .iter()
        .map(|t| (t.id.to_string(), t.title.clone()))
        .collect::<Vec<_>>();
    let targets = form
        .candidates
        .iter()
        .map(|c| (c.id.to_string(), format!("#{}: {}", c.friendly_id, c.title)))
        .collect::<Vec<_>>();

    let select = |field: &str, choices: Vec<(String, String)>| {
        view! {
            <div class={format!("judgment-{}", field)}>
                <ChoiceSelect
                    name={state.field_name(field)}
                    current={state.value(field).to_string()}
                    choices=choices
                    error={state.error(field).map(str::to_string)}
                />
            </div>
        }
    };

    view! {
        <div class="decision-box">
            <h3>"Judge abstract"</h3>
            <form method="post" action=action_url>
                <input type="hidden" name="csrf_token" value=csrf_token/>
                {select(FIELD_JUDGMENT, judgments)}
                {select(FIELD_ACCEPTED_TRACK, tracks)}
                {select(FIELD_MERGED_INTO, targets.clone())}
                {select(FIELD_DUPLICATE_OF, targets)}
                <textarea name={state.field_name(FIELD_JUDGMENT_COMMENT)} placeholder="Comment">
                    {state.value(FIELD_JUDGMENT_COMMENT).to_string()}
                </textarea>
                <input
                    type="checkbox"
                    name={state.field_name(FIELD_SEND_NOTIFICATIONS)}
                    value="y"
                    checked={!state.value(FIELD_SEND_NOTIFICATIONS).is_empty()}
                />
                <button type="submit">"Judge"</button>
            </form>
        </div>
    }
    .into_view()
}

#[cfg(feature = "ssr")]
pub fn render_decision_box(
    form: JudgmentForm,
    summary: Option<DecisionSummary>,
    can_judge: bool,
    action_url: String,
    csrf_token: String,
) -> String {
    leptos::ssr::render_to_string(move || {
        view! {
            <DecisionBox
                form=form
                summary=summary
                can_judge=can_judge
                action_url=action_url
                csrf_token=csrf_token
            />
        }
    })
    .to_string()
}
