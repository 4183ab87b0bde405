use shared::{ClientError, Route};
use wasm_bindgen_futures::spawn_local;
use web_sys::HtmlInputElement;
use yew::prelude::*;

use crate::components::link::Link;
use crate::components::utils::render_error_message;
use crate::context::use_app;

pub(crate) fn input_value(e: InputEvent) -> String {
    e.target_unchecked_into::<HtmlInputElement>().value()
}

fn login_error_message(error: ClientError) -> String {
    match error {
        ClientError::Unauthorized => "Invalid email or password".to_string(),
        other => other.to_string(),
    }
}

#[function_component(LoginPage)]
pub fn login_page() -> Html {
    let app = use_app();
    let email = use_state(String::new);
    let password = use_state(String::new);
    let submitting = use_state(|| false);
    let error = use_state(|| None::<String>);

    let on_email = {
        let email = email.clone();
        Callback::from(move |e: InputEvent| email.set(input_value(e)))
    };
    let on_password = {
        let password = password.clone();
        Callback::from(move |e: InputEvent| password.set(input_value(e)))
    };

    let on_submit = {
        let api = app.api.clone();
        let email = email.clone();
        let password = password.clone();
        let submitting = submitting.clone();
        let error = error.clone();
        Callback::from(move |e: SubmitEvent| {
            e.prevent_default();
            if *submitting {
                return;
            }
            submitting.set(true);
            error.set(None);

            let api = api.clone();
            let email = (*email).clone();
            let password = (*password).clone();
            let submitting = submitting.clone();
            let error = error.clone();
            spawn_local(async move {
                // On success the session event moves the shell to the dashboard.
                if let Err(e) = api.login(&email, &password).await {
                    log::warn!("Sign in failed: {}", e);
                    error.set(Some(login_error_message(e)));
                }
                submitting.set(false);
            });
        })
    };

    let dismiss_error = {
        let error = error.clone();
        Callback::from(move |_: MouseEvent| error.set(None))
    };

    html! {
        <div class="auth-page">
            <form class="auth-card" onsubmit={on_submit}>
                <Link to={Route::Home} classes="brand">
                    <i class="fa-solid fa-bone"></i>
                    <span>{"SpineVision AI"}</span>
                </Link>
                <h1>{"Sign in"}</h1>
                { render_error_message(error.as_deref(), dismiss_error) }

                <label for="email">{"Email"}</label>
                <input id="email" type="email" required=true autocomplete="username"
                    value={(*email).clone()} oninput={on_email} />

                <label for="password">{"Password"}</label>
                <input id="password" type="password" required=true autocomplete="current-password"
                    value={(*password).clone()} oninput={on_password} />

                <button class="analyze-btn" type="submit" disabled={*submitting}>
                    if *submitting {
                        <i class="fa-solid fa-spinner fa-spin"></i>{" Signing in..."}
                    } else {
                        {"Sign In"}
                    }
                </button>
                <p class="auth-switch">
                    {"No account yet? "}
                    <Link to={Route::Register}>{"Create one"}</Link>
                </p>
            </form>
        </div>
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_login_error_messages() {
        assert_eq!(login_error_message(ClientError::Unauthorized), "Invalid email or password");
        let rejected = ClientError::BackendRejected {
            status: 401,
            message: "Incorrect email or password".into(),
        };
        assert_eq!(login_error_message(rejected), "Incorrect email or password");
    }
}
