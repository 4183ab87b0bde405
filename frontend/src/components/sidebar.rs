use shared::Route;
use yew::prelude::*;

use super::link::Link;
use crate::context::use_app;

fn is_active(current: &Route, item: &Route) -> bool {
    match (current, item) {
        // The processing and result views belong to the upload flow.
        (Route::Processing { .. } | Route::Result { .. }, Route::Upload) => true,
        _ => current == item,
    }
}

#[function_component(Sidebar)]
pub fn sidebar() -> Html {
    let app = use_app();

    let mut items = vec![
        (Route::Dashboard, "fa-solid fa-gauge", "Dashboard"),
        (Route::Upload, "fa-solid fa-cloud-arrow-up", "Upload Scan"),
        (Route::History, "fa-solid fa-clock-rotate-left", "History"),
    ];
    if app.is_admin() {
        items.push((Route::Admin, "fa-solid fa-shield-halved", "Admin"));
    }

    html! {
        <nav class="sidebar">
            { for items.into_iter().map(|(route, icon, label)| {
                let active = is_active(&app.route, &route);
                html! {
                    <Link to={route} classes={classes!("sidebar-item", active.then_some("active"))}>
                        <i class={icon}></i>
                        <span>{ label }</span>
                    </Link>
                }
            })}
        </nav>
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_upload_flow_highlights_upload() {
        let processing = Route::Processing {
            upload_id: "abc123".into(),
        };
        assert!(is_active(&processing, &Route::Upload));
        assert!(!is_active(&processing, &Route::History));
        assert!(is_active(&Route::History, &Route::History));
    }
}
