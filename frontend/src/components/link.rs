use shared::Route;
use yew::prelude::*;

use crate::context::use_app;

#[derive(Properties, PartialEq)]
pub struct LinkProps {
    pub to: Route,
    #[prop_or_default]
    pub classes: Classes,
    #[prop_or_default]
    pub children: Html,
}

/// In-app anchor: keeps a real `href` but routes through the shell instead of reloading.
#[function_component(Link)]
pub fn link(props: &LinkProps) -> Html {
    let app = use_app();
    let onclick = {
        let to = props.to.clone();
        let navigate = app.navigate.clone();
        Callback::from(move |e: MouseEvent| {
            e.prevent_default();
            navigate.emit(to.clone());
        })
    };

    html! {
        <a href={props.to.to_path()} class={props.classes.clone()} {onclick}>
            { props.children.clone() }
        </a>
    }
}
