use yew::prelude::*;

use super::navbar::Navbar;
use super::sidebar::Sidebar;

#[derive(Properties, PartialEq)]
pub struct LayoutProps {
    #[prop_or_default]
    pub children: Html,
}

/// Shell around every signed-in view.
#[function_component(Layout)]
pub fn layout(props: &LayoutProps) -> Html {
    html! {
        <div class="container">
            <Navbar />
            <div class="app-body">
                <Sidebar />
                <main class="main-content">
                    { props.children.clone() }
                </main>
            </div>
            <footer class="app-footer">
                <p>{"SpineVision AI | For clinical decision support only"}</p>
            </footer>
        </div>
    }
}

pub fn render_stat_card(icon: &str, label: &str, value: u32, tone: &str) -> Html {
    html! {
        <div class={classes!("stat-card", tone.to_string())}>
            <i class={icon.to_string()}></i>
            <div>
                <p class="stat-value">{ value }</p>
                <p class="stat-label">{ label.to_string() }</p>
            </div>
        </div>
    }
}
