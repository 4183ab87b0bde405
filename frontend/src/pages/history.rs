use std::rc::Rc;

use shared::display::{ClassificationBadge, format_timestamp, optional_percent, status_badge};
use shared::history::{HistoryList, clamp_page};
use shared::{Route, UploadId, UploadRecord, UploadStatus};
use wasm_bindgen_futures::spawn_local;
use yew::prelude::*;

use crate::components::link::Link;
use crate::components::utils::{confirm, render_error_message, render_spinner};
use crate::context::use_app;

#[derive(Debug, Default, PartialEq)]
struct HistoryView {
    list: HistoryList,
    loading: bool,
}

enum HistoryAction {
    Loading,
    Loaded(HistoryList),
    Failed,
    Removed(UploadId),
}

impl Reducible for HistoryView {
    type Action = HistoryAction;

    fn reduce(self: Rc<Self>, action: Self::Action) -> Rc<Self> {
        let mut list = self.list.clone();
        let loading = match action {
            HistoryAction::Loading => true,
            HistoryAction::Loaded(loaded) => {
                list = loaded;
                false
            }
            HistoryAction::Failed => false,
            HistoryAction::Removed(upload_id) => {
                list.remove(&upload_id);
                self.loading
            }
        };
        Rc::new(Self { list, loading })
    }
}

#[function_component(HistoryPage)]
pub fn history_page() -> Html {
    let app = use_app();
    let page = use_state(|| 1u32);
    let view = use_reducer(HistoryView::default);
    let error = use_state(|| None::<String>);

    {
        let api = app.api.clone();
        let view = view.dispatcher();
        let error = error.clone();
        use_effect_with(*page, move |page| {
            let page = *page;
            view.dispatch(HistoryAction::Loading);
            spawn_local(async move {
                let page_size = api.config().history_page_size;
                match api.history(page, page_size).await {
                    Ok(loaded) => view.dispatch(HistoryAction::Loaded(HistoryList::from_page(loaded))),
                    Err(e) => {
                        log::error!("Failed to load history page {}: {}", page, e);
                        error.set(Some(e.to_string()));
                        view.dispatch(HistoryAction::Failed);
                    }
                }
            });
        });
    }

    let on_delete = {
        let api = app.api.clone();
        let view = view.dispatcher();
        let error = error.clone();
        Callback::from(move |upload_id: UploadId| {
            if !confirm("Delete this scan and its analysis? This cannot be undone.") {
                return;
            }
            let api = api.clone();
            let view = view.clone();
            let error = error.clone();
            spawn_local(async move {
                match api.delete_upload(&upload_id).await {
                    Ok(()) => {
                        log::info!("Deleted upload {}", upload_id);
                        view.dispatch(HistoryAction::Removed(upload_id));
                    }
                    Err(e) => {
                        log::error!("❌ Failed to delete {}: {}", upload_id, e);
                        error.set(Some(e.to_string()));
                    }
                }
            });
        })
    };

    let go_to = {
        let page = page.clone();
        let total_pages = view.list.total_pages();
        move |target: u32| {
            let page = page.clone();
            Callback::from(move |_: MouseEvent| page.set(clamp_page(target, total_pages)))
        }
    };

    let dismiss_error = {
        let error = error.clone();
        Callback::from(move |_: MouseEvent| error.set(None))
    };

    let list = &view.list;
    let body = if view.loading {
        render_spinner("Loading history...")
    } else if list.is_empty() {
        html! {
            <div class="empty-state">
                <i class="fa-solid fa-folder-open fa-2x"></i>
                <p>{"No scans yet."}</p>
                <Link to={Route::Upload} classes="analyze-btn">{"Upload your first X-ray"}</Link>
            </div>
        }
    } else {
        html! {
            <>
                <table class="history-table">
                    <thead>
                        <tr>
                            <th>{"File"}</th>
                            <th>{"Uploaded"}</th>
                            <th>{"Status"}</th>
                            <th>{"Classification"}</th>
                            <th>{"Confidence"}</th>
                            <th></th>
                        </tr>
                    </thead>
                    <tbody>
                        { for list.items().iter().map(|record| render_row(record, &on_delete)) }
                    </tbody>
                </table>
                <div class="pagination">
                    <button class="page-btn" disabled={!list.has_previous()} onclick={go_to(list.page().saturating_sub(1))}>
                        <i class="fa-solid fa-chevron-left"></i>
                    </button>
                    <span>{ format!("Page {} of {}", list.page(), list.total_pages()) }</span>
                    <button class="page-btn" disabled={!list.has_next()} onclick={go_to(list.page() + 1)}>
                        <i class="fa-solid fa-chevron-right"></i>
                    </button>
                </div>
            </>
        }
    };

    html! {
        <section class="page history-page">
            <header class="page-header">
                <h1>{"Scan History"}</h1>
            </header>
            { render_error_message(error.as_deref(), dismiss_error) }
            { body }
        </section>
    }
}

fn render_row(record: &UploadRecord, on_delete: &Callback<UploadId>) -> Html {
    let (status_label, status_class) = status_badge(record.status);
    let badge = record
        .overall_classification
        .as_deref()
        .and_then(ClassificationBadge::from_classification);
    let delete = {
        let upload_id = record.upload_id.clone();
        on_delete.reform(move |_: MouseEvent| upload_id.clone())
    };

    html! {
        <tr key={record.upload_id.to_string()}>
            <td class="file-name">{ record.file_name.clone() }</td>
            <td>{ format_timestamp(&record.uploaded_at) }</td>
            <td><span class={status_class}>{ status_label }</span></td>
            <td>
                {
                    match badge {
                        Some(badge) => html! { <span class={badge.css_class()}>{ badge.label().to_string() }</span> },
                        None => html! { "-" },
                    }
                }
            </td>
            <td>{ optional_percent(record.confidence_score) }</td>
            <td class="row-actions">
                if record.status == UploadStatus::Done {
                    <Link to={Route::Result { upload_id: record.upload_id.clone() }} classes="icon-btn">
                        <i class="fa-solid fa-eye"></i>
                    </Link>
                }
                <button class="icon-btn danger" title="Delete" onclick={delete}>
                    <i class="fa-solid fa-trash"></i>
                </button>
            </td>
        </tr>
    }
}
