use shared::display::{ClassificationBadge, format_timestamp, status_badge};
use shared::history::RECENT_SCANS;
use shared::{Route, Statistics, UploadRecord, UploadStatus};
use wasm_bindgen_futures::spawn_local;
use yew::prelude::*;

use crate::components::layout::render_stat_card;
use crate::components::link::Link;
use crate::components::utils::{render_error_message, render_spinner};
use crate::context::use_app;

#[function_component(DashboardPage)]
pub fn dashboard_page() -> Html {
    let app = use_app();
    let stats = use_state(|| None::<Statistics>);
    let recent = use_state(Vec::<UploadRecord>::new);
    let loading = use_state(|| true);
    let error = use_state(|| None::<String>);

    {
        let api = app.api.clone();
        let stats = stats.clone();
        let recent = recent.clone();
        let loading = loading.clone();
        let error = error.clone();
        use_effect_with((), move |_| {
            spawn_local(async move {
                let (loaded_stats, loaded_recent) =
                    futures::join!(api.statistics(), api.history(1, RECENT_SCANS));
                match loaded_stats {
                    Ok(loaded) => stats.set(Some(loaded)),
                    Err(e) => {
                        log::error!("Failed to load statistics: {}", e);
                        error.set(Some(e.to_string()));
                    }
                }
                match loaded_recent {
                    Ok(page) => recent.set(page.items),
                    Err(e) => {
                        log::error!("Failed to load recent scans: {}", e);
                        error.set(Some(e.to_string()));
                    }
                }
                loading.set(false);
            });
        });
    }

    let dismiss_error = {
        let error = error.clone();
        Callback::from(move |_: MouseEvent| error.set(None))
    };

    let greeting = app
        .user
        .as_ref()
        .map(|user| format!("Welcome back, {}", user.display_name()))
        .unwrap_or_else(|| "Welcome back".to_string());
    let counts = (*stats).unwrap_or_default();

    html! {
        <section class="page dashboard-page">
            <header class="page-header">
                <h1>{ greeting }</h1>
                <p class="subtitle">{"Overview of your spine X-ray analyses"}</p>
            </header>
            { render_error_message(error.as_deref(), dismiss_error) }

            <div class="stat-grid">
                { render_stat_card("fa-solid fa-x-ray", "Total Scans", counts.total_uploads, "tone-neutral") }
                { render_stat_card("fa-solid fa-circle-check", "Normal", counts.normal_count, "tone-normal") }
                { render_stat_card("fa-solid fa-triangle-exclamation", "Abnormal", counts.abnormal_count, "tone-danger") }
                { render_stat_card("fa-solid fa-hourglass-half", "Pending", counts.pending_count, "tone-warning") }
            </div>

            <div class="card">
                <div class="card-header">
                    <h2>{"Recent Scans"}</h2>
                    <Link to={Route::History} classes="card-link">{"View all"}</Link>
                </div>
                if *loading {
                    { render_spinner("Loading recent scans...") }
                } else if recent.is_empty() {
                    <div class="empty-state">
                        <p>{"No scans yet."}</p>
                        <Link to={Route::Upload} classes="analyze-btn">{"Upload your first X-ray"}</Link>
                    </div>
                } else {
                    <ul class="recent-list">
                        { for recent.iter().map(render_recent) }
                    </ul>
                }
            </div>
        </section>
    }
}

fn render_recent(record: &UploadRecord) -> Html {
    let (status_label, status_class) = status_badge(record.status);
    let badge = record
        .overall_classification
        .as_deref()
        .and_then(ClassificationBadge::from_classification);
    let summary = html! {
        <>
            <div>
                <p class="file-name">{ record.file_name.clone() }</p>
                <p class="meta">{ format_timestamp(&record.uploaded_at) }</p>
            </div>
            {
                match badge {
                    Some(badge) => html! { <span class={badge.css_class()}>{ badge.label().to_string() }</span> },
                    None => html! { <span class={status_class}>{ status_label }</span> },
                }
            }
        </>
    };

    html! {
        <li key={record.upload_id.to_string()} class="recent-item">
            if record.status == UploadStatus::Done {
                <Link to={Route::Result { upload_id: record.upload_id.clone() }} classes="recent-link">
                    { summary }
                </Link>
            } else {
                { summary }
            }
        </li>
    }
}
