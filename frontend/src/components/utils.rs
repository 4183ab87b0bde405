use std::cell::RefCell;
use std::rc::Rc;

use gloo_file::File as GlooFile;
use gloo_timers::callback::Timeout;
use web_sys::FileList;
use yew::prelude::*;

// Debounce function to limit button events
pub fn debounce<F>(duration: u32, callback: F) -> Callback<MouseEvent>
where
    F: Fn() + Clone + 'static,
{
    let timeout = Rc::new(RefCell::new(None::<Timeout>));

    Callback::from(move |_| {
        let mut timeout_ref = timeout.borrow_mut();

        if let Some(old_timeout) = timeout_ref.take() {
            old_timeout.cancel();
        }

        let inner_callback = callback.clone();
        *timeout_ref = Some(Timeout::new(duration, move || inner_callback()));
    })
}

pub fn first_file(file_list: &FileList) -> Option<GlooFile> {
    file_list.item(0).map(GlooFile::from)
}

/// Browser confirmation dialog. Treated as "no" when the dialog cannot be shown.
pub fn confirm(message: &str) -> bool {
    web_sys::window()
        .and_then(|window| window.confirm_with_message(message).ok())
        .unwrap_or(false)
}

pub fn render_error_message(error: Option<&str>, on_dismiss: Callback<MouseEvent>) -> Html {
    let Some(error_msg) = error else {
        return html! {};
    };
    html! {
        <div class="error-message" role="alert">
            <i class="fa-solid fa-circle-exclamation"></i>
            <p>{ error_msg.to_string() }</p>
            <button class="dismiss-btn" title="Dismiss" onclick={on_dismiss}>
                <i class="fa-solid fa-times"></i>
            </button>
        </div>
    }
}

pub fn render_progress_bar(percent: u8, label: &str) -> Html {
    html! {
        <div class="progress">
            <div class="progress-header">
                <span>{ label.to_string() }</span>
                <span class="progress-value">{ format!("{}%", percent) }</span>
            </div>
            <div class="meter">
                <div class="meter-fill" style={format!("width: {}%", percent.min(100))}></div>
            </div>
        </div>
    }
}

pub fn render_spinner(label: &str) -> Html {
    html! {
        <div class="loading">
            <i class="fa-solid fa-spinner fa-spin"></i>
            <span>{ label.to_string() }</span>
        </div>
    }
}
