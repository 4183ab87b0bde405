use shared::Route;
use yew::prelude::*;

use crate::components::link::Link;

#[function_component(NotFoundPage)]
pub fn not_found_page() -> Html {
    html! {
        <div class="landing">
            <h1>{"404"}</h1>
            <p class="subtitle">{"The page you are looking for does not exist."}</p>
            <Link to={Route::Home} classes="analyze-btn">{"Back to Home"}</Link>
        </div>
    }
}
