use std::rc::Rc;

use shared::{AnalysisResult, Route, UploadId, User};
use yew::prelude::*;

use crate::api::ApiClient;

/// Everything a page needs from the shell: the client, who is signed in,
/// and how to move between views.
#[derive(Clone)]
pub struct AppContext {
    pub api: Rc<ApiClient>,
    pub user: Option<User>,
    pub route: Route,
    pub navigate: Callback<Route>,
    /// Hands a freshly polled result to the result view without refetching it.
    pub show_result: Callback<(UploadId, AnalysisResult)>,
}

impl PartialEq for AppContext {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.api, &other.api)
            && self.user == other.user
            && self.route == other.route
            && self.navigate == other.navigate
            && self.show_result == other.show_result
    }
}

impl AppContext {
    pub fn is_admin(&self) -> bool {
        self.user.as_ref().is_some_and(User::is_admin)
    }
}

#[hook]
pub fn use_app() -> AppContext {
    use_context::<AppContext>().expect("AppContext is provided by App")
}
