use shared::Route;
use yew::prelude::*;

use super::link::Link;
use crate::context::use_app;

#[function_component(Navbar)]
pub fn navbar() -> Html {
    let app = use_app();
    let menu_open = use_state(|| false);

    let toggle_menu = {
        let menu_open = menu_open.clone();
        Callback::from(move |_: MouseEvent| menu_open.set(!*menu_open))
    };

    let sign_out = {
        let api = app.api.clone();
        let menu_open = menu_open.clone();
        Callback::from(move |_: MouseEvent| {
            menu_open.set(false);
            api.logout();
        })
    };

    let close_menu = {
        let menu_open = menu_open.clone();
        Callback::from(move |_: MouseEvent| menu_open.set(false))
    };

    let (initial, name, role) = match &app.user {
        Some(user) => (
            user.initial().to_string(),
            user.display_name().to_string(),
            user.role.label(),
        ),
        None => ("U".to_string(), "User".to_string(), ""),
    };

    html! {
        <header class="navbar">
            <Link to={Route::Dashboard} classes="brand">
                <i class="fa-solid fa-bone"></i>
                <span>{"SpineVision AI"}</span>
            </Link>

            <div class="navbar-actions">
                <Link to={Route::Upload} classes="analyze-btn">
                    <i class="fa-solid fa-plus"></i>{" New Scan"}
                </Link>

                <div class="user-menu">
                    <button class="user-button" onclick={toggle_menu}>
                        <span class="avatar">{ initial }</span>
                        <span class="user-name">{ name }</span>
                        <i class="fa-solid fa-chevron-down"></i>
                    </button>
                    if *menu_open {
                        <div class="dropdown" onclick={close_menu}>
                            <p class="dropdown-role">{ role }</p>
                            <Link to={Route::Dashboard} classes="dropdown-item">
                                <i class="fa-solid fa-gauge"></i>{" Dashboard"}
                            </Link>
                            <Link to={Route::History} classes="dropdown-item">
                                <i class="fa-solid fa-clock-rotate-left"></i>{" History"}
                            </Link>
                            <button class="dropdown-item danger" onclick={sign_out}>
                                <i class="fa-solid fa-right-from-bracket"></i>{" Sign Out"}
                            </button>
                        </div>
                    }
                </div>
            </div>
        </header>
    }
}
