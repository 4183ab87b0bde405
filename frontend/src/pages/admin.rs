use std::future::Future;
use std::pin::Pin;
use std::rc::Rc;

use shared::display::{ClassificationBadge, format_timestamp, status_badge};
use shared::{
    ActivityItem, AdminScan, AdminStats, AdminUser, ClientError, Role, WeeklyAnalytics,
};
use wasm_bindgen_futures::spawn_local;
use web_sys::HtmlSelectElement;
use yew::prelude::*;

use crate::api::ApiClient;
use crate::components::layout::render_stat_card;
use crate::components::utils::{confirm, render_error_message, render_spinner};
use crate::context::use_app;

const ADMIN_LIST_LIMIT: u32 = 50;

type UserAction = Pin<Box<dyn Future<Output = Result<(), ClientError>>>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum AdminTab {
    Overview,
    Users,
    Scans,
    Activity,
}

impl AdminTab {
    const ALL: [AdminTab; 4] = [
        AdminTab::Overview,
        AdminTab::Users,
        AdminTab::Scans,
        AdminTab::Activity,
    ];

    fn label(self) -> &'static str {
        match self {
            AdminTab::Overview => "Overview",
            AdminTab::Users => "Users",
            AdminTab::Scans => "Scans",
            AdminTab::Activity => "Activity",
        }
    }
}

/// Loads `load` into `target` whenever `deps` changes, reporting failures to `error`.
#[hook]
fn use_admin_data<T, D, F, Fut>(deps: D, load: F) -> (UseStateHandle<Option<T>>, UseStateHandle<Option<String>>)
where
    T: 'static,
    D: PartialEq + 'static,
    F: FnOnce() -> Fut + 'static,
    Fut: Future<Output = Result<T, ClientError>> + 'static,
{
    let target = use_state(|| None::<T>);
    let error = use_state(|| None::<String>);
    {
        let target = target.clone();
        let error = error.clone();
        use_effect_with(deps, move |_| {
            spawn_local(async move {
                match load().await {
                    Ok(value) => target.set(Some(value)),
                    Err(e) => {
                        log::error!("Admin request failed: {}", e);
                        error.set(Some(e.to_string()));
                    }
                }
            });
        });
    }
    (target, error)
}

fn dismiss(error: &UseStateHandle<Option<String>>) -> Callback<MouseEvent> {
    let error = error.clone();
    Callback::from(move |_: MouseEvent| error.set(None))
}

#[function_component(AdminPage)]
pub fn admin_page() -> Html {
    let tab = use_state(|| AdminTab::Overview);

    let content = match *tab {
        AdminTab::Overview => html! { <AdminOverview /> },
        AdminTab::Users => html! { <AdminUsers /> },
        AdminTab::Scans => html! { <AdminScans /> },
        AdminTab::Activity => html! { <AdminActivity /> },
    };

    html! {
        <section class="page admin-page">
            <header class="page-header">
                <h1>{"Administration"}</h1>
            </header>
            <div class="tabs">
                { for AdminTab::ALL.into_iter().map(|item| {
                    let onclick = {
                        let tab = tab.clone();
                        Callback::from(move |_: MouseEvent| tab.set(item))
                    };
                    html! {
                        <button class={classes!("tab", (*tab == item).then_some("active"))} {onclick}>
                            { item.label() }
                        </button>
                    }
                })}
            </div>
            { content }
        </section>
    }
}

#[function_component(AdminOverview)]
fn admin_overview() -> Html {
    let app = use_app();
    let (stats, stats_error) = {
        let api = app.api.clone();
        use_admin_data((), move || async move { api.admin_stats().await })
    };
    let (weekly, weekly_error) = {
        let api = app.api.clone();
        use_admin_data((), move || async move { api.weekly_analytics().await })
    };

    html! {
        <>
            { render_error_message(stats_error.as_deref(), dismiss(&stats_error)) }
            { render_error_message(weekly_error.as_deref(), dismiss(&weekly_error)) }
            {
                match &*stats {
                    Some(stats) => render_admin_stats(stats),
                    None => render_spinner("Loading statistics..."),
                }
            }
            if let Some(weekly) = &*weekly {
                { render_weekly(weekly) }
            }
        </>
    }
}

fn render_admin_stats(stats: &AdminStats) -> Html {
    html! {
        <div class="stat-grid">
            { render_stat_card("fa-solid fa-users", "Total Users", stats.total_users, "tone-neutral") }
            { render_stat_card("fa-solid fa-user-check", "Active Users", stats.active_users, "tone-normal") }
            { render_stat_card("fa-solid fa-x-ray", "Total Scans", stats.total_scans, "tone-neutral") }
            { render_stat_card("fa-solid fa-calendar-day", "Today", stats.today_scans, "tone-neutral") }
            { render_stat_card("fa-solid fa-hourglass-half", "Pending", stats.pending_scans, "tone-warning") }
            { render_stat_card("fa-solid fa-check-double", "Completed", stats.completed_scans, "tone-normal") }
            { render_stat_card("fa-solid fa-circle-check", "Normal", stats.normal_count, "tone-normal") }
            { render_stat_card("fa-solid fa-triangle-exclamation", "Abnormal", stats.abnormal_count, "tone-danger") }
        </div>
    }
}

fn render_weekly(weekly: &WeeklyAnalytics) -> Html {
    let peak = weekly.peak().max(1) as f64;
    let height = |scans: u32| format!("height: {:.1}%", (scans as f64 / peak * 100.0).clamp(0.0, 100.0));
    html! {
        <div class="card">
            <div class="card-header"><h2>{"Scans this week"}</h2></div>
            <div class="weekly-chart">
                { for weekly.weekly_data.iter().map(|point| html! {
                    <div class="weekly-bar" key={point.date.clone()} title={format!("{}: {} scans", point.date, point.scans)}>
                        <span class="weekly-count">{ point.scans }</span>
                        <div class="weekly-fill" style={height(point.scans)}></div>
                        <span class="weekly-day">{ point.day.clone() }</span>
                    </div>
                })}
            </div>
        </div>
    }
}

#[function_component(AdminUsers)]
fn admin_users() -> Html {
    let app = use_app();
    let reload = use_state(|| 0u32);
    let action_error = use_state(|| None::<String>);
    let (users, load_error) = {
        let api = app.api.clone();
        use_admin_data(*reload, move || async move { api.admin_users().await })
    };

    // Runs one user action, then refreshes the list.
    let run = {
        let reload = reload.clone();
        let action_error = action_error.clone();
        move |action: UserAction| {
            let reload = reload.clone();
            let action_error = action_error.clone();
            spawn_local(async move {
                match action.await {
                    Ok(()) => reload.set(*reload + 1),
                    Err(e) => {
                        log::error!("❌ User action failed: {}", e);
                        action_error.set(Some(e.to_string()));
                    }
                }
            });
        }
    };

    let own_id = app.user.as_ref().map(|user| user.id.clone());
    let body = match &*users {
        None => render_spinner("Loading users..."),
        Some(users) if users.is_empty() => html! { <p class="empty-state">{"No users found."}</p> },
        Some(users) => html! {
            <table class="admin-table">
                <thead>
                    <tr>
                        <th>{"Name"}</th>
                        <th>{"Email"}</th>
                        <th>{"Role"}</th>
                        <th>{"Scans"}</th>
                        <th>{"Joined"}</th>
                        <th>{"Status"}</th>
                        <th></th>
                    </tr>
                </thead>
                <tbody>
                    { for users.iter().map(|user| {
                        let is_self = own_id.as_deref() == Some(user.id.as_str());
                        render_user_row(user, is_self, &app.api, run.clone())
                    })}
                </tbody>
            </table>
        },
    };

    html! {
        <>
            { render_error_message(load_error.as_deref(), dismiss(&load_error)) }
            { render_error_message(action_error.as_deref(), dismiss(&action_error)) }
            { body }
        </>
    }
}

fn render_user_row(
    user: &AdminUser,
    is_self: bool,
    api: &Rc<ApiClient>,
    run: impl Fn(UserAction) + Clone + 'static,
) -> Html {
    let on_toggle = {
        let api = api.clone();
        let user_id = user.id.clone();
        let run = run.clone();
        Callback::from(move |_: MouseEvent| {
            let api = api.clone();
            let user_id = user_id.clone();
            run(Box::pin(async move {
                let active = api.toggle_user_status(&user_id).await?;
                log::info!("User {} is now {}", user_id, if active { "active" } else { "inactive" });
                Ok::<(), ClientError>(())
            }));
        })
    };

    let on_role = {
        let api = api.clone();
        let user_id = user.id.clone();
        let current = user.role;
        let run = run.clone();
        Callback::from(move |e: Event| {
            let select: HtmlSelectElement = e.target_unchecked_into();
            let Ok(role) = select.value().parse::<Role>() else {
                return;
            };
            if role == current {
                return;
            }
            let api = api.clone();
            let user_id = user_id.clone();
            run(Box::pin(async move { api.update_user_role(&user_id, role).await }));
        })
    };

    let on_delete = {
        let api = api.clone();
        let user_id = user.id.clone();
        let email = user.email.clone();
        Callback::from(move |_: MouseEvent| {
            if !confirm(&format!("Delete {} and all of their scans?", email)) {
                return;
            }
            let api = api.clone();
            let user_id = user_id.clone();
            run(Box::pin(async move { api.delete_user(&user_id).await }));
        })
    };

    let active = user.active();
    html! {
        <tr key={user.id.clone()}>
            <td>{ user.full_name.clone().unwrap_or_else(|| "-".to_string()) }</td>
            <td>{ user.email.clone() }</td>
            <td>
                <select onchange={on_role} disabled={is_self}>
                    { for [Role::Doctor, Role::Admin].into_iter().map(|role| html! {
                        <option value={role.as_ref().to_string()} selected={role == user.role}>{ role.label() }</option>
                    })}
                </select>
            </td>
            <td>{ user.scan_count }</td>
            <td>{ format_timestamp(&user.created_at) }</td>
            <td>
                <span class={if active { "badge badge-success" } else { "badge badge-danger" }}>
                    { if active { "Active" } else { "Inactive" } }
                </span>
            </td>
            <td class="row-actions">
                <button class="icon-btn" title={if active { "Deactivate" } else { "Activate" }}
                    onclick={on_toggle} disabled={is_self}>
                    <i class={if active { "fa-solid fa-user-slash" } else { "fa-solid fa-user-check" }}></i>
                </button>
                <button class="icon-btn danger" title="Delete" onclick={on_delete} disabled={is_self}>
                    <i class="fa-solid fa-trash"></i>
                </button>
            </td>
        </tr>
    }
}

#[function_component(AdminScans)]
fn admin_scans() -> Html {
    let app = use_app();
    let (scans, error) = {
        let api = app.api.clone();
        use_admin_data((), move || async move { api.admin_scans(ADMIN_LIST_LIMIT).await })
    };

    let body = match &*scans {
        None => render_spinner("Loading scans..."),
        Some(scans) if scans.is_empty() => html! { <p class="empty-state">{"No scans yet."}</p> },
        Some(scans) => html! {
            <table class="admin-table">
                <thead>
                    <tr>
                        <th>{"File"}</th>
                        <th>{"User"}</th>
                        <th>{"Status"}</th>
                        <th>{"Classification"}</th>
                        <th>{"Uploaded"}</th>
                    </tr>
                </thead>
                <tbody>{ for scans.iter().map(render_scan_row) }</tbody>
            </table>
        },
    };

    html! {
        <>
            { render_error_message(error.as_deref(), dismiss(&error)) }
            { body }
        </>
    }
}

fn render_scan_row(scan: &AdminScan) -> Html {
    let (status_label, status_class) = status_badge(scan.status);
    let badge = scan
        .classification
        .as_deref()
        .and_then(ClassificationBadge::from_classification);
    html! {
        <tr key={scan.id.clone()}>
            <td class="file-name">{ scan.file_name.clone() }</td>
            <td>{ scan.user_name.clone().unwrap_or_else(|| scan.user_email.clone()) }</td>
            <td><span class={status_class}>{ status_label }</span></td>
            <td>
                {
                    match badge {
                        Some(badge) => html! { <span class={badge.css_class()}>{ badge.label().to_string() }</span> },
                        None => html! { "-" },
                    }
                }
            </td>
            <td>{ format_timestamp(&scan.created_at) }</td>
        </tr>
    }
}

#[function_component(AdminActivity)]
fn admin_activity() -> Html {
    let app = use_app();
    let (activity, error) = {
        let api = app.api.clone();
        use_admin_data((), move || async move { api.admin_activity(ADMIN_LIST_LIMIT).await })
    };

    let body = match &*activity {
        None => render_spinner("Loading activity..."),
        Some(items) if items.is_empty() => html! { <p class="empty-state">{"No recent activity."}</p> },
        Some(items) => html! {
            <ul class="activity-list">{ for items.iter().map(render_activity) }</ul>
        },
    };

    html! {
        <>
            { render_error_message(error.as_deref(), dismiss(&error)) }
            { body }
        </>
    }
}

fn activity_icon(kind: &str) -> &'static str {
    match kind {
        "upload" => "fa-solid fa-cloud-arrow-up",
        "analysis" | "result" => "fa-solid fa-microscope",
        "user" | "register" => "fa-solid fa-user-plus",
        _ => "fa-solid fa-circle-info",
    }
}

fn render_activity(item: &ActivityItem) -> Html {
    html! {
        <li key={item.id.clone()} class="activity-item">
            <i class={activity_icon(&item.kind)}></i>
            <div>
                <p>{ item.action.clone() }</p>
                <p class="meta">{ format!("{} · {}", item.user, format_timestamp(&item.time)) }</p>
            </div>
        </li>
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_activity_icons() {
        assert_eq!(activity_icon("upload"), "fa-solid fa-cloud-arrow-up");
        assert_eq!(activity_icon("analysis"), "fa-solid fa-microscope");
        assert_eq!(activity_icon("something-else"), "fa-solid fa-circle-info");
    }

    #[test]
    fn test_tab_labels() {
        let labels: Vec<&str> = AdminTab::ALL.iter().map(|tab| tab.label()).collect();
        assert_eq!(labels, ["Overview", "Users", "Scans", "Activity"]);
    }
}
