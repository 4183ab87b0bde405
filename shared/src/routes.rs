use crate::models::{UploadAck, UploadId, User};
use crate::session::{SessionEvent, SignOutReason};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    Home,
    Login,
    Register,
    Dashboard,
    Upload,
    Processing { upload_id: UploadId },
    Result { upload_id: UploadId },
    History,
    Admin,
    NotFound,
}

impl Route {
    pub fn from_path(path: &str) -> Self {
        let path = path.split(['?', '#']).next().unwrap_or_default();
        let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
        match segments.as_slice() {
            [] => Route::Home,
            ["login"] => Route::Login,
            ["register"] => Route::Register,
            ["dashboard"] => Route::Dashboard,
            ["upload"] => Route::Upload,
            ["processing", id] => Route::Processing {
                upload_id: UploadId::from(*id),
            },
            ["result", id] => Route::Result {
                upload_id: UploadId::from(*id),
            },
            ["history"] => Route::History,
            ["admin"] => Route::Admin,
            _ => Route::NotFound,
        }
    }

    pub fn to_path(&self) -> String {
        match self {
            Route::Home => "/".to_string(),
            Route::Login => "/login".to_string(),
            Route::Register => "/register".to_string(),
            Route::Dashboard => "/dashboard".to_string(),
            Route::Upload => "/upload".to_string(),
            Route::Processing { upload_id } => format!("/processing/{}", upload_id),
            Route::Result { upload_id } => format!("/result/{}", upload_id),
            Route::History => "/history".to_string(),
            Route::Admin => "/admin".to_string(),
            Route::NotFound => "/404".to_string(),
        }
    }

    pub fn requires_auth(&self) -> bool {
        matches!(
            self,
            Route::Dashboard
                | Route::Upload
                | Route::Processing { .. }
                | Route::Result { .. }
                | Route::History
                | Route::Admin
        )
    }

    /// Applies the client-side guards. The backend still authorizes every call.
    pub fn guard(self, user: Option<&User>) -> Route {
        match (self, user) {
            (route, None) if route.requires_auth() => Route::Login,
            (Route::Admin, Some(user)) if !user.is_admin() => Route::Dashboard,
            (Route::Login | Route::Register, Some(_)) => Route::Dashboard,
            (route, _) => route,
        }
    }

    /// An accepted upload is polled under exactly the id the backend issued.
    pub fn after_upload(ack: &UploadAck) -> Route {
        Route::Processing {
            upload_id: ack.upload_id.clone(),
        }
    }

    /// Where the shell goes in reaction to a session change, if anywhere.
    pub fn after_session_event(event: &SessionEvent) -> Option<Route> {
        match event {
            SessionEvent::SignedIn(_) => Some(Route::Dashboard),
            SessionEvent::SignedOut(SignOutReason::Unauthorized | SignOutReason::UserRequested) => {
                Some(Route::Login)
            }
            SessionEvent::UserUpdated(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Role;
    use crate::session::tests::doctor;

    #[test]
    fn test_paths_roundtrip() {
        let routes = [
            Route::Home,
            Route::Login,
            Route::Register,
            Route::Dashboard,
            Route::Upload,
            Route::Processing {
                upload_id: "abc123".into(),
            },
            Route::Result {
                upload_id: "abc123".into(),
            },
            Route::History,
            Route::Admin,
        ];
        for route in routes {
            assert_eq!(Route::from_path(&route.to_path()), route);
        }
    }

    #[test]
    fn test_upload_ack_leads_to_processing() {
        let ack: UploadAck = serde_json::from_str(r#"{"upload_id":"abc123"}"#).unwrap();
        let route = Route::after_upload(&ack);
        assert_eq!(
            route,
            Route::Processing {
                upload_id: UploadId::from("abc123")
            }
        );
        assert_eq!(route.to_path(), "/processing/abc123");
    }

    #[test]
    fn test_parsing_edge_cases() {
        assert_eq!(Route::from_path("/history/"), Route::History);
        assert_eq!(Route::from_path("/upload?from=nav"), Route::Upload);
        assert_eq!(Route::from_path("/result"), Route::NotFound);
        assert_eq!(Route::from_path("/nope"), Route::NotFound);
        assert_eq!(
            Route::from_path("/processing/abc123"),
            Route::Processing {
                upload_id: UploadId::from("abc123")
            }
        );
    }

    #[test]
    fn test_guard_redirects_anonymous_users() {
        assert_eq!(Route::History.guard(None), Route::Login);
        assert_eq!(Route::Home.guard(None), Route::Home);
        assert_eq!(Route::Register.guard(None), Route::Register);
    }

    #[test]
    fn test_guard_admin_route() {
        let doctor = doctor();
        let mut admin = doctor.clone();
        admin.role = Role::Admin;
        assert_eq!(Route::Admin.guard(Some(&doctor)), Route::Dashboard);
        assert_eq!(Route::Admin.guard(Some(&admin)), Route::Admin);
        assert_eq!(Route::Login.guard(Some(&doctor)), Route::Dashboard);
    }

    #[test]
    fn test_logout_leads_to_login() {
        assert_eq!(
            Route::after_session_event(&SessionEvent::SignedOut(SignOutReason::Unauthorized)),
            Some(Route::Login)
        );
        assert_eq!(
            Route::after_session_event(&SessionEvent::UserUpdated(doctor())),
            None
        );
    }
}
