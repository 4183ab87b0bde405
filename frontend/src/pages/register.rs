use shared::upload::{MIN_PASSWORD_LEN, validate_registration};
use shared::{RegisterRequest, Route};
use wasm_bindgen_futures::spawn_local;
use yew::prelude::*;

use super::login::input_value;
use crate::components::link::Link;
use crate::components::utils::render_error_message;
use crate::context::use_app;

#[derive(Debug, Clone, Default, PartialEq)]
struct RegisterForm {
    full_name: String,
    email: String,
    password: String,
    confirm: String,
}

#[function_component(RegisterPage)]
pub fn register_page() -> Html {
    let app = use_app();
    let form = use_state(RegisterForm::default);
    let submitting = use_state(|| false);
    let error = use_state(|| None::<String>);

    let field = |update: fn(&mut RegisterForm, String)| {
        let form = form.clone();
        Callback::from(move |e: InputEvent| {
            let mut next = (*form).clone();
            update(&mut next, input_value(e));
            form.set(next);
        })
    };

    let on_submit = {
        let api = app.api.clone();
        let navigate = app.navigate.clone();
        let form = form.clone();
        let submitting = submitting.clone();
        let error = error.clone();
        Callback::from(move |e: SubmitEvent| {
            e.prevent_default();
            if *submitting {
                return;
            }
            if let Err(e) = validate_registration(&form.email, &form.password, &form.confirm) {
                error.set(Some(e.to_string()));
                return;
            }
            submitting.set(true);
            error.set(None);

            let request = RegisterRequest {
                email: form.email.trim().to_string(),
                password: form.password.clone(),
                full_name: form.full_name.trim().to_string(),
            };
            let api = api.clone();
            let navigate = navigate.clone();
            let submitting = submitting.clone();
            let error = error.clone();
            spawn_local(async move {
                match api.register(&request).await {
                    Ok(user) => {
                        log::info!("✅ Registered {}", user.email);
                        navigate.emit(Route::Login);
                    }
                    Err(e) => {
                        log::warn!("Registration failed: {}", e);
                        error.set(Some(e.to_string()));
                        submitting.set(false);
                    }
                }
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
                <h1>{"Create account"}</h1>
                { render_error_message(error.as_deref(), dismiss_error) }

                <label for="full-name">{"Full name"}</label>
                <input id="full-name" type="text" required=true value={form.full_name.clone()}
                    oninput={field(|form, value| form.full_name = value)} />

                <label for="email">{"Email"}</label>
                <input id="email" type="email" required=true autocomplete="username" value={form.email.clone()}
                    oninput={field(|form, value| form.email = value)} />

                <label for="password">{"Password"}</label>
                <input id="password" type="password" required=true autocomplete="new-password"
                    placeholder={format!("At least {} characters", MIN_PASSWORD_LEN)}
                    value={form.password.clone()}
                    oninput={field(|form, value| form.password = value)} />

                <label for="confirm">{"Confirm password"}</label>
                <input id="confirm" type="password" required=true autocomplete="new-password" value={form.confirm.clone()}
                    oninput={field(|form, value| form.confirm = value)} />

                <button class="analyze-btn" type="submit" disabled={*submitting}>
                    if *submitting {
                        <i class="fa-solid fa-spinner fa-spin"></i>{" Creating account..."}
                    } else {
                        {"Create Account"}
                    }
                </button>
                <p class="auth-switch">
                    {"Already registered? "}
                    <Link to={Route::Login}>{"Sign in"}</Link>
                </p>
            </form>
        </div>
    }
}
