mod api;
mod components;
mod config;
mod context;
mod pages;
mod storage;

use std::rc::Rc;

use gloo_events::EventListener;
use shared::session::SubscriptionId;
use shared::{AnalysisResult, Route, SessionContext, SessionEvent, UploadId, User};
use wasm_bindgen::JsValue;
use wasm_bindgen_futures::spawn_local;
use yew::prelude::*;

use api::ApiClient;
use components::layout::Layout;
use config::AppConfig;
use context::AppContext;
use pages::{
    AdminPage, DashboardPage, HistoryPage, HomePage, LoginPage, NotFoundPage, ProcessingPage,
    RegisterPage, ResultPage, UploadPage,
};
use storage::BrowserStorage;

pub enum Msg {
    Navigate(Route),
    PopState,
    Session(SessionEvent),
    ShowResult(UploadId, AnalysisResult),
}

#[derive(Properties, PartialEq)]
pub struct AppProps {
    pub config: Rc<AppConfig>,
}

struct App {
    api: Rc<ApiClient>,
    route: Route,
    user: Option<User>,
    last_result: Option<(UploadId, AnalysisResult)>,
    navigate: Callback<Route>,
    show_result: Callback<(UploadId, AnalysisResult)>,
    subscription: SubscriptionId,
    popstate_listener: Option<EventListener>,
}

fn current_path() -> String {
    web_sys::window()
        .and_then(|window| window.location().pathname().ok())
        .unwrap_or_else(|| "/".to_string())
}

fn write_history(route: &Route, replace: bool) {
    let Some(history) = web_sys::window().and_then(|window| window.history().ok()) else {
        log::error!("History API unavailable");
        return;
    };
    let path = route.to_path();
    let written = if replace {
        history.replace_state_with_url(&JsValue::NULL, "", Some(&path))
    } else {
        history.push_state_with_url(&JsValue::NULL, "", Some(&path))
    };
    if let Err(e) = written {
        log::error!("Failed to update history for {}: {:?}", path, e);
    }
}

impl Component for App {
    type Message = Msg;
    type Properties = AppProps;

    fn create(ctx: &Context<Self>) -> Self {
        let session = Rc::new(SessionContext::new(BrowserStorage));
        let api = Rc::new(ApiClient::new(Rc::clone(&ctx.props().config), Rc::clone(&session)));

        let subscription = {
            let link = ctx.link().clone();
            session.subscribe(move |event| link.send_message(Msg::Session(event.clone())))
        };

        let popstate_listener = web_sys::window().map(|window| {
            let link = ctx.link().clone();
            EventListener::new(&window, "popstate", move |_| link.send_message(Msg::PopState))
        });

        let user = session.user();
        let requested = Route::from_path(&current_path());
        let route = requested.clone().guard(user.as_ref());
        if route != requested {
            write_history(&route, true);
        }

        if session.is_authenticated() {
            let api = Rc::clone(&api);
            spawn_local(async move {
                if let Err(e) = api.current_user().await {
                    log::warn!("Could not refresh the signed-in user: {}", e);
                }
            });
        }

        Self {
            api,
            route,
            user,
            last_result: None,
            navigate: ctx.link().callback(Msg::Navigate),
            show_result: ctx
                .link()
                .callback(|(upload_id, result)| Msg::ShowResult(upload_id, result)),
            subscription,
            popstate_listener,
        }
    }

    fn update(&mut self, _ctx: &Context<Self>, msg: Self::Message) -> bool {
        match msg {
            Msg::Navigate(route) => self.handle_navigate(route, false),
            Msg::PopState => {
                let requested = Route::from_path(&current_path());
                self.handle_navigate(requested, true)
            }
            Msg::Session(event) => self.handle_session_event(event),
            Msg::ShowResult(upload_id, result) => {
                let route = Route::Result {
                    upload_id: upload_id.clone(),
                };
                self.last_result = Some((upload_id, result));
                self.handle_navigate(route, false);
                true
            }
        }
    }

    fn view(&self, _ctx: &Context<Self>) -> Html {
        let context = AppContext {
            api: Rc::clone(&self.api),
            user: self.user.clone(),
            route: self.route.clone(),
            navigate: self.navigate.clone(),
            show_result: self.show_result.clone(),
        };

        html! {
            <ContextProvider<AppContext> {context}>
                { self.render_route() }
            </ContextProvider<AppContext>>
        }
    }

    fn destroy(&mut self, _ctx: &Context<Self>) {
        self.api.session().unsubscribe(self.subscription);
        self.popstate_listener.take();
    }
}

impl App {
    /// Applies the route guard, then records the move in browser history.
    ///
    /// `from_history` is set for back/forward navigation, where the browser
    /// already moved; a guard redirect then replaces the entry instead.
    fn handle_navigate(&mut self, requested: Route, from_history: bool) -> bool {
        let target = requested.clone().guard(self.user.as_ref());
        if from_history {
            if target != requested {
                write_history(&target, true);
            }
        } else if target.to_path() != current_path() {
            write_history(&target, false);
        }

        if target == self.route {
            return false;
        }
        log::debug!("Navigating to {}", target.to_path());
        self.route = target;
        true
    }

    fn handle_session_event(&mut self, event: SessionEvent) -> bool {
        self.user = self.api.session().user();
        if let SessionEvent::SignedOut(reason) = &event {
            log::info!("Signed out ({:?})", reason);
            self.last_result = None;
        }
        let next = Route::after_session_event(&event).unwrap_or_else(|| self.route.clone());
        self.handle_navigate(next, false);
        true
    }

    fn render_route(&self) -> Html {
        match &self.route {
            Route::Home => html! { <HomePage /> },
            Route::Login => html! { <LoginPage /> },
            Route::Register => html! { <RegisterPage /> },
            Route::NotFound => html! { <NotFoundPage /> },
            Route::Dashboard => html! { <Layout><DashboardPage /></Layout> },
            Route::Upload => html! { <Layout><UploadPage /></Layout> },
            Route::Processing { upload_id } => html! {
                <Layout>
                    <ProcessingPage key={upload_id.to_string()} upload_id={upload_id.clone()} />
                </Layout>
            },
            Route::Result { upload_id } => {
                let initial = self
                    .last_result
                    .as_ref()
                    .filter(|(id, _)| id == upload_id)
                    .map(|(_, result)| result.clone());
                html! {
                    <Layout>
                        <ResultPage key={upload_id.to_string()} upload_id={upload_id.clone()} {initial} />
                    </Layout>
                }
            }
            Route::History => html! { <Layout><HistoryPage /></Layout> },
            Route::Admin => html! { <Layout><AdminPage /></Layout> },
        }
    }
}

fn main() {
    let config = AppConfig::from_env();
    wasm_logger::init(wasm_logger::Config::new(config.log_level));
    log::info!("SpineVision starting against {}", config.api_base_url);
    yew::Renderer::<App>::with_props(AppProps {
        config: Rc::new(config),
    })
    .render();
}
