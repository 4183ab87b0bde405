use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

use futures::future::{AbortHandle, Abortable};
use gloo_timers::callback::{Interval, Timeout};
use gloo_timers::future::TimeoutFuture;
use shared::polling::{
    COMPLETE_DELAY_MS, PROGRESS_MAX_STEP, PROGRESS_TICK_MS, poll_until_ready,
};
use shared::{CosmeticProgress, PollError, Poller, Route, UploadId};
use wasm_bindgen_futures::spawn_local;
use yew::prelude::*;

use crate::components::link::Link;
use crate::components::utils::render_progress_bar;
use crate::context::use_app;

#[derive(Properties, PartialEq)]
pub struct ProcessingProps {
    pub upload_id: UploadId,
}

#[derive(Debug, Default, PartialEq)]
struct ProgressView(CosmeticProgress);

enum ProgressAction {
    Tick(f64),
    Complete,
}

impl Reducible for ProgressView {
    type Action = ProgressAction;

    fn reduce(self: Rc<Self>, action: Self::Action) -> Rc<Self> {
        let mut next = self.0;
        match action {
            ProgressAction::Tick(step) => next.tick(step),
            ProgressAction::Complete => next.complete(),
        }
        if next == self.0 { self } else { Rc::new(Self(next)) }
    }
}

fn stage_label(percent: u8) -> &'static str {
    match percent {
        0..=29 => "Preprocessing image...",
        30..=59 => "Running spine analysis...",
        60..=89 => "Generating heatmap...",
        90..=99 => "Finalizing report...",
        _ => "Analysis complete",
    }
}

fn sleep(delay: Duration) -> TimeoutFuture {
    TimeoutFuture::new(u32::try_from(delay.as_millis()).unwrap_or(u32::MAX))
}

/// Waits for the analysis of one upload, then hands the result to the result view.
#[function_component(ProcessingPage)]
pub fn processing_page(props: &ProcessingProps) -> Html {
    let app = use_app();
    let progress = use_reducer(ProgressView::default);
    let error = use_state(|| None::<PollError>);

    {
        let progress = progress.dispatcher();
        let error = error.setter();
        let api = app.api.clone();
        let show_result = app.show_result.clone();

        use_effect_with(props.upload_id.clone(), move |upload_id| {
            let upload_id = upload_id.clone();
            error.set(None);

            let ticker = {
                let progress = progress.clone();
                Interval::new(PROGRESS_TICK_MS, move || {
                    progress.dispatch(ProgressAction::Tick(js_sys::Math::random() * PROGRESS_MAX_STEP));
                })
            };
            let ticker = Rc::new(RefCell::new(Some(ticker)));
            let navigation = Rc::new(RefCell::new(None::<Timeout>));
            let (abort_handle, abort_registration) = AbortHandle::new_pair();

            let poll = {
                let ticker = Rc::clone(&ticker);
                let navigation = Rc::clone(&navigation);
                async move {
                    log::info!("Polling for the result of {}", upload_id);
                    let mut poller = Poller::new(api.config().poll_policy.clone());
                    let fetch = |attempt: u32| {
                        let api = api.clone();
                        let upload_id = upload_id.clone();
                        async move {
                            log::debug!("Result poll #{} for {}", attempt, upload_id);
                            api.fetch_result(&upload_id).await
                        }
                    };
                    let outcome = poll_until_ready(&mut poller, fetch, sleep).await;
                    ticker.borrow_mut().take();

                    match outcome {
                        Ok(result) => {
                            progress.dispatch(ProgressAction::Complete);
                            if poller.mark_displayed() {
                                let timeout = Timeout::new(COMPLETE_DELAY_MS, move || {
                                    show_result.emit((upload_id, result));
                                });
                                *navigation.borrow_mut() = Some(timeout);
                            }
                        }
                        Err(e) => {
                            log::error!("❌ Analysis of {} did not complete: {}", upload_id, e);
                            error.set(Some(e));
                        }
                    }
                }
            };
            spawn_local(async move {
                let _ = Abortable::new(poll, abort_registration).await;
            });

            move || {
                ticker.borrow_mut().take();
                abort_handle.abort();
                if let Some(timeout) = navigation.borrow_mut().take() {
                    timeout.cancel();
                }
            }
        });
    }

    let percent = progress.0.percent();

    html! {
        <section class="page processing-page">
            <header class="page-header">
                <h1>{"Analyzing Scan"}</h1>
                <p class="subtitle">{ format!("Upload {}", props.upload_id) }</p>
            </header>
            {
                match &*error {
                    Some(e) => html! {
                        <div class="error-message" role="alert">
                            <i class="fa-solid fa-circle-exclamation"></i>
                            <p>{ e.to_string() }</p>
                            <div class="button-container">
                                <Link to={Route::History} classes="analyze-btn secondary">{"View History"}</Link>
                                <Link to={Route::Upload} classes="analyze-btn">{"Upload Another"}</Link>
                            </div>
                        </div>
                    },
                    None => html! {
                        <div class="processing-card">
                            <i class="fa-solid fa-spinner fa-spin fa-2x"></i>
                            { render_progress_bar(percent, stage_label(percent)) }
                            <p class="hint">{"This usually takes less than a minute."}</p>
                        </div>
                    },
                }
            }
        </section>
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reducer_keeps_progress_monotonic() {
        let view = Rc::new(ProgressView::default());
        let view = view.reduce(ProgressAction::Tick(8.0));
        assert_eq!(view.0.percent(), 8);
        let view = view.reduce(ProgressAction::Tick(-3.0));
        assert_eq!(view.0.percent(), 8);
        let view = view.reduce(ProgressAction::Complete);
        assert_eq!(view.0.percent(), 100);
        assert!(view.0.is_complete());
    }

    #[test]
    fn test_stage_labels() {
        assert_eq!(stage_label(0), "Preprocessing image...");
        assert_eq!(stage_label(90), "Finalizing report...");
        assert_eq!(stage_label(100), "Analysis complete");
    }
}
