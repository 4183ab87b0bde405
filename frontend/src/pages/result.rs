use shared::{AnalysisResult, ClientError, FetchOutcome, Route, UploadId};
use wasm_bindgen_futures::spawn_local;
use yew::prelude::*;

use crate::components::link::Link;
use crate::components::results::render_results;
use crate::components::utils::{render_error_message, render_spinner};
use crate::context::use_app;

#[derive(Properties, PartialEq)]
pub struct ResultProps {
    pub upload_id: UploadId,
    /// Result already fetched by the processing view, if any.
    #[prop_or_default]
    pub initial: Option<AnalysisResult>,
}

#[derive(Debug, Clone, PartialEq)]
enum ResultState {
    Loading,
    Loaded(AnalysisResult),
    Pending,
    AnalysisFailed,
    Error(String),
}

#[function_component(ResultPage)]
pub fn result_page(props: &ResultProps) -> Html {
    let app = use_app();
    let state = use_state(|| match &props.initial {
        Some(result) => ResultState::Loaded(result.clone()),
        None => ResultState::Loading,
    });
    let downloading = use_state(|| false);
    let download_error = use_state(|| None::<String>);

    {
        let state = state.clone();
        let api = app.api.clone();
        let needs_fetch = props.initial.is_none();
        use_effect_with(props.upload_id.clone(), move |upload_id| {
            if needs_fetch {
                let upload_id = upload_id.clone();
                spawn_local(async move {
                    let next = match api.fetch_result(&upload_id).await {
                        FetchOutcome::Ready(result) => ResultState::Loaded(result),
                        FetchOutcome::NotYetAvailable => ResultState::Pending,
                        FetchOutcome::Failed(ClientError::AnalysisFailed) => ResultState::AnalysisFailed,
                        FetchOutcome::Failed(ClientError::Unauthorized) => return,
                        FetchOutcome::Failed(e) => {
                            log::error!("Failed to load result {}: {}", upload_id, e);
                            ResultState::Error(e.to_string())
                        }
                    };
                    state.set(next);
                });
            }
        });
    }

    let on_download = {
        let api = app.api.clone();
        let upload_id = props.upload_id.clone();
        let downloading = downloading.clone();
        let download_error = download_error.clone();
        Callback::from(move |_: MouseEvent| {
            if *downloading {
                return;
            }
            downloading.set(true);
            download_error.set(None);
            let api = api.clone();
            let upload_id = upload_id.clone();
            let downloading = downloading.clone();
            let download_error = download_error.clone();
            spawn_local(async move {
                if let Err(e) = api.download_report(&upload_id).await {
                    log::error!("❌ Report download failed: {}", e);
                    download_error.set(Some(e.to_string()));
                }
                downloading.set(false);
            });
        })
    };

    let dismiss_download_error = {
        let download_error = download_error.clone();
        Callback::from(move |_: MouseEvent| download_error.set(None))
    };

    let body = match &*state {
        ResultState::Loading => render_spinner("Loading analysis..."),
        ResultState::Loaded(result) => html! {
            <>
                { render_error_message(download_error.as_deref(), dismiss_download_error) }
                { render_results(result, app.api.heatmap_url(result)) }
                <div class="button-container">
                    <button class="analyze-btn secondary" onclick={on_download} disabled={*downloading}>
                        if *downloading {
                            <i class="fa-solid fa-spinner fa-spin"></i>{" Preparing PDF..."}
                        } else {
                            <i class="fa-solid fa-file-pdf"></i>{" Download PDF"}
                        }
                    </button>
                    <Link to={Route::Upload} classes="analyze-btn">
                        <i class="fa-solid fa-plus"></i>{" New Scan"}
                    </Link>
                </div>
            </>
        },
        ResultState::Pending => html! {
            <div class="notice">
                <p>{"This scan is still being analyzed."}</p>
                <Link to={Route::Processing { upload_id: props.upload_id.clone() }} classes="analyze-btn">
                    {"Track Progress"}
                </Link>
            </div>
        },
        ResultState::AnalysisFailed => html! {
            <div class="error-message">
                <i class="fa-solid fa-circle-exclamation"></i>
                <p>{"The analysis of this scan failed. Please upload it again."}</p>
                <Link to={Route::Upload} classes="analyze-btn">{"Upload Again"}</Link>
            </div>
        },
        ResultState::Error(message) => html! {
            <div class="error-message">
                <i class="fa-solid fa-circle-exclamation"></i>
                <p>{ message.clone() }</p>
                <Link to={Route::History} classes="analyze-btn secondary">{"Back to History"}</Link>
            </div>
        },
    };

    html! {
        <section class="page result-page">
            <header class="page-header">
                <h1>{"Analysis Result"}</h1>
                <p class="subtitle">{ format!("Upload {}", props.upload_id) }</p>
            </header>
            { body }
        </section>
    }
}
