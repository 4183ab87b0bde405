use shared::{HealthStatus, Route};
use wasm_bindgen_futures::spawn_local;
use yew::prelude::*;

use crate::components::link::Link;
use crate::context::use_app;

#[derive(Debug, Clone, PartialEq)]
enum Backend {
    Checking,
    Up(HealthStatus),
    Down,
}

#[function_component(HomePage)]
pub fn home_page() -> Html {
    let app = use_app();
    let backend = use_state(|| Backend::Checking);

    {
        let api = app.api.clone();
        let backend = backend.clone();
        use_effect_with((), move |_| {
            spawn_local(async move {
                match api.health().await {
                    Ok(health) => backend.set(Backend::Up(health)),
                    Err(e) => {
                        log::warn!("Health check failed: {}", e);
                        backend.set(Backend::Down);
                    }
                }
            });
        });
    }

    let (status_class, status_text) = match &*backend {
        Backend::Checking => ("status-dot", "Checking service status...".to_string()),
        Backend::Up(health) if health.is_healthy() => ("status-dot online", "Analysis service online".to_string()),
        Backend::Up(health) => ("status-dot degraded", format!("Service status: {}", health.status)),
        Backend::Down => ("status-dot offline", "Analysis service unreachable".to_string()),
    };

    let primary = if app.user.is_some() {
        html! { <Link to={Route::Dashboard} classes="analyze-btn">{"Go to Dashboard"}</Link> }
    } else {
        html! {
            <>
                <Link to={Route::Login} classes="analyze-btn">{"Sign In"}</Link>
                <Link to={Route::Register} classes="analyze-btn secondary">{"Create Account"}</Link>
            </>
        }
    };

    html! {
        <div class="landing">
            <header class="app-header">
                <h1><i class="fa-solid fa-bone"></i>{" SpineVision AI"}</h1>
                <p class="subtitle">{"AI-assisted screening of spine X-rays for clinicians"}</p>
            </header>
            <div class="button-container">{ primary }</div>
            <ul class="feature-list">
                <li><i class="fa-solid fa-cloud-arrow-up"></i>{" Upload PNG, JPG or DICOM scans"}</li>
                <li><i class="fa-solid fa-microscope"></i>{" Per-finding probabilities with attention heatmaps"}</li>
                <li><i class="fa-solid fa-file-pdf"></i>{" Downloadable PDF reports"}</li>
            </ul>
            <p class="service-status"><span class={status_class}></span>{ status_text }</p>
        </div>
    }
}
