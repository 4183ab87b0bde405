use std::cell::RefCell;
use std::rc::Rc;

use futures::channel::oneshot;
use gloo_events::EventListener;
use gloo_file::{Blob, File as GlooFile, ObjectUrl};
use gloo_net::http::{Request, RequestBuilder, Response};
use gloo_timers::callback::Timeout;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use shared::polling::classify_result_response;
use shared::upload::UploadProgress;
use shared::{
    ActivityItem, AdminScan, AdminStats, AdminUser, AnalysisResult, ClientError, FetchOutcome,
    HealthStatus, HistoryPage, LoginResponse, RegisterRequest, Role, Session, SessionContext,
    SignOutReason, Statistics, UploadAck, UploadId, User, WeeklyAnalytics,
};
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{FormData, HtmlAnchorElement, ProgressEvent, UrlSearchParams, XmlHttpRequest};

use crate::config::AppConfig;
use crate::storage::BrowserStorage;

pub type SessionHandle = Rc<SessionContext<BrowserStorage>>;

const DOWNLOAD_URL_TTL_MS: u32 = 10_000;

fn transport(e: gloo_net::Error) -> ClientError {
    ClientError::Transport(e.to_string())
}

fn js_error(value: JsValue) -> ClientError {
    ClientError::Transport(
        value
            .as_string()
            .unwrap_or_else(|| format!("{:?}", value)),
    )
}

fn decode(e: gloo_net::Error) -> ClientError {
    ClientError::Decode(e.to_string())
}

#[derive(Debug, Deserialize)]
struct UserStatusChange {
    is_active: String,
}

/// REST client for the SpineVision backend.
///
/// Every request goes through [`ApiClient::authorize`] and [`ApiClient::send`]:
/// the bearer token is attached when one is held, and a 401 on an
/// authenticated request tears the session down (the app shell is
/// subscribed and switches to the login view).
pub struct ApiClient {
    config: Rc<AppConfig>,
    session: SessionHandle,
}

impl ApiClient {
    pub fn new(config: Rc<AppConfig>, session: SessionHandle) -> Self {
        Self { config, session }
    }

    pub fn session(&self) -> &SessionHandle {
        &self.session
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    fn authorize(&self, builder: RequestBuilder) -> RequestBuilder {
        match self.session.bearer() {
            Some(bearer) => builder.header("Authorization", &bearer),
            None => builder,
        }
    }

    fn get(&self, path: &str) -> RequestBuilder {
        self.authorize(Request::get(&self.config.endpoint(path)))
    }

    async fn send(&self, request: Request) -> Result<Response, ClientError> {
        let method = request.method();
        let url = request.url();
        let response = request.send().await.map_err(transport)?;
        if response.ok() {
            return Ok(response);
        }

        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        log::warn!("{:?} {} failed with status {}", method, url, status);
        Err(self.session.reject(status, &body))
    }

    async fn get_json<T: DeserializeOwned>(&self, builder: RequestBuilder) -> Result<T, ClientError> {
        let request = builder.build().map_err(transport)?;
        let response = self.send(request).await?;
        response.json::<T>().await.map_err(decode)
    }

    // Authentication

    pub async fn register(&self, request: &RegisterRequest) -> Result<User, ClientError> {
        let request = Request::post(&self.config.endpoint("/auth/register"))
            .json(request)
            .map_err(transport)?;
        let response = self.send(request).await?;
        response.json::<User>().await.map_err(decode)
    }

    /// Exchanges credentials for a token and stores the resulting session.
    pub async fn login(&self, email: &str, password: &str) -> Result<User, ClientError> {
        let form = UrlSearchParams::new().map_err(js_error)?;
        form.append("username", email.trim());
        form.append("password", password);

        let request = Request::post(&self.config.endpoint("/auth/login"))
            .header("Content-Type", "application/x-www-form-urlencoded")
            .body(form)
            .map_err(transport)?;
        let response = self.send(request).await?;
        let login = response.json::<LoginResponse>().await.map_err(decode)?;

        let user = login.user.clone();
        log::info!("✅ Signed in as {}", user.email);
        self.session.set(Session::from(login));
        Ok(user)
    }

    pub fn logout(&self) {
        self.session.clear(SignOutReason::UserRequested);
    }

    pub async fn current_user(&self) -> Result<User, ClientError> {
        let user: User = self.get_json(self.get("/auth/me")).await?;
        self.session.update_user(user.clone());
        Ok(user)
    }

    // Upload

    /// Sends the file as multipart form data, reporting real upload progress.
    ///
    /// `fetch` cannot observe request-body progress, so this goes through
    /// `XMLHttpRequest` and its `upload.onprogress` events.
    pub async fn upload_xray(
        &self,
        file: &GlooFile,
        on_progress: impl Fn(u8) + 'static,
    ) -> Result<UploadAck, ClientError> {
        let form = FormData::new().map_err(js_error)?;
        let blob: &web_sys::Blob = file.as_ref();
        form.append_with_blob_and_filename("file", blob, &file.name())
            .map_err(js_error)?;

        let xhr = XmlHttpRequest::new().map_err(js_error)?;
        xhr.open_with_async("POST", &self.config.endpoint("/upload"), true)
            .map_err(js_error)?;
        if let Some(bearer) = self.session.bearer() {
            xhr.set_request_header("Authorization", &bearer)
                .map_err(js_error)?;
        }

        let upload_target = xhr.upload().map_err(js_error)?;
        let mut progress = UploadProgress::default();
        let _progress_listener = EventListener::new(&upload_target, "progress", move |event| {
            let Some(event) = event.dyn_ref::<ProgressEvent>() else {
                return;
            };
            if !event.length_computable() {
                return;
            }
            if let Some(percent) = progress.update(event.loaded(), event.total()) {
                on_progress(percent);
            }
        });

        let (done_tx, done_rx) = oneshot::channel::<()>();
        let done_tx = RefCell::new(Some(done_tx));
        let _done_listener = EventListener::new(&xhr, "loadend", move |_| {
            if let Some(tx) = done_tx.borrow_mut().take() {
                let _ = tx.send(());
            }
        });

        log::info!("Uploading {} ({} bytes)", file.name(), file.size());
        xhr.send_with_opt_form_data(Some(&form)).map_err(js_error)?;
        done_rx
            .await
            .map_err(|_| ClientError::Transport("upload was interrupted".into()))?;

        let status = xhr.status().map_err(js_error)?;
        let body = xhr.response_text().map_err(js_error)?.unwrap_or_default();
        match status {
            0 => Err(ClientError::Transport("could not reach the server".into())),
            200..=299 => {
                serde_json::from_str::<UploadAck>(&body).map_err(|e| ClientError::Decode(e.to_string()))
            }
            _ => Err(self.session.reject(status, &body)),
        }
    }

    pub async fn upload_status(&self, upload_id: &UploadId) -> Result<UploadAck, ClientError> {
        self.get_json(self.get(&format!("/upload/{}", upload_id))).await
    }

    // Results

    /// One poll of `GET /result/{id}`, classified for the poll loop.
    pub async fn fetch_result(&self, upload_id: &UploadId) -> FetchOutcome<AnalysisResult> {
        let request = match self.get(&format!("/result/{}", upload_id)).build() {
            Ok(request) => request,
            Err(e) => return FetchOutcome::Failed(transport(e)),
        };
        let response = match request.send().await {
            Ok(response) => response,
            Err(e) => return FetchOutcome::Failed(transport(e)),
        };

        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        if status == 401 {
            return FetchOutcome::Failed(self.session.reject(status, &body));
        }
        let outcome = classify_result_response(status, &body);
        if !outcome.is_not_ready() {
            return outcome;
        }

        // "Still processing" is also what a failed analysis looks like here.
        match self.upload_status(upload_id).await {
            Ok(ack) => outcome.settle(ack.status),
            Err(e) => {
                log::debug!("Status check for {} failed: {}", upload_id, e);
                outcome
            }
        }
    }

    /// Fetches the PDF report and hands it to the browser as a download.
    pub async fn download_report(&self, upload_id: &UploadId) -> Result<(), ClientError> {
        let request = self
            .get(&format!("/result/{}/report", upload_id))
            .build()
            .map_err(transport)?;
        let response = self.send(request).await?;
        let bytes = response.binary().await.map_err(transport)?;

        let blob = Blob::new_with_options(bytes.as_slice(), Some("application/pdf"));
        let url = ObjectUrl::from(blob);
        save_as(&url, &format!("SPINEVISION_Report_{}.pdf", upload_id))?;

        // Dropping the ObjectUrl revokes it; give the browser time to start the download.
        Timeout::new(DOWNLOAD_URL_TTL_MS, move || drop(url)).forget();
        Ok(())
    }

    pub fn heatmap_url(&self, result: &AnalysisResult) -> Option<String> {
        result
            .heatmap_url
            .as_deref()
            .filter(|url| !url.is_empty())
            .map(|url| self.config.asset_url(url))
    }

    // History

    pub async fn history(&self, page: u32, page_size: u32) -> Result<HistoryPage, ClientError> {
        let builder = self.get("/history").query([
            ("page", page.to_string()),
            ("page_size", page_size.to_string()),
        ]);
        self.get_json(builder).await
    }

    pub async fn statistics(&self) -> Result<Statistics, ClientError> {
        self.get_json(self.get("/history/statistics")).await
    }

    pub async fn delete_upload(&self, upload_id: &UploadId) -> Result<(), ClientError> {
        let request = self
            .authorize(Request::delete(&self.config.endpoint(&format!("/history/{}", upload_id))))
            .build()
            .map_err(transport)?;
        let response = self.send(request).await?;

        // A missing upload is reported as 200 with an `error` field.
        let ack: serde_json::Value = response.json().await.map_err(decode)?;
        match ack.get("error").and_then(|e| e.as_str()) {
            Some(message) => Err(ClientError::BackendRejected {
                status: 404,
                message: message.to_string(),
            }),
            None => Ok(()),
        }
    }

    // Admin

    pub async fn admin_stats(&self) -> Result<AdminStats, ClientError> {
        self.get_json(self.get("/admin/stats")).await
    }

    pub async fn admin_users(&self) -> Result<Vec<AdminUser>, ClientError> {
        self.get_json(self.get("/admin/users")).await
    }

    pub async fn admin_scans(&self, limit: u32) -> Result<Vec<AdminScan>, ClientError> {
        self.get_json(self.get("/admin/scans").query([("limit", limit.to_string())]))
            .await
    }

    pub async fn admin_activity(&self, limit: u32) -> Result<Vec<ActivityItem>, ClientError> {
        self.get_json(self.get("/admin/activity").query([("limit", limit.to_string())]))
            .await
    }

    pub async fn weekly_analytics(&self) -> Result<WeeklyAnalytics, ClientError> {
        self.get_json(self.get("/admin/analytics/weekly")).await
    }

    /// Flips a user's active flag; returns the new state.
    pub async fn toggle_user_status(&self, user_id: &str) -> Result<bool, ClientError> {
        let builder = self.authorize(Request::patch(
            &self.config.endpoint(&format!("/admin/users/{}/status", user_id)),
        ));
        let change: UserStatusChange = self.get_json(builder).await?;
        Ok(change.is_active.eq_ignore_ascii_case("true"))
    }

    pub async fn update_user_role(&self, user_id: &str, role: Role) -> Result<(), ClientError> {
        let builder = self
            .authorize(Request::patch(
                &self.config.endpoint(&format!("/admin/users/{}/role", user_id)),
            ))
            .query([("role", role.as_ref())]);
        let request = builder.build().map_err(transport)?;
        self.send(request).await.map(|_| ())
    }

    pub async fn delete_user(&self, user_id: &str) -> Result<(), ClientError> {
        let request = self
            .authorize(Request::delete(
                &self.config.endpoint(&format!("/admin/users/{}", user_id)),
            ))
            .build()
            .map_err(transport)?;
        self.send(request).await.map(|_| ())
    }

    pub async fn health(&self) -> Result<HealthStatus, ClientError> {
        self.get_json(Request::get(&self.config.endpoint("/health"))).await
    }
}

fn save_as(url: &str, file_name: &str) -> Result<(), ClientError> {
    let document = web_sys::window()
        .and_then(|window| window.document())
        .ok_or_else(|| ClientError::Transport("no document available".into()))?;
    let anchor: HtmlAnchorElement = document
        .create_element("a")
        .map_err(js_error)?
        .dyn_into()
        .map_err(|_| ClientError::Transport("could not create download link".into()))?;
    anchor.set_href(url);
    anchor.set_download(file_name);

    // Detached anchors are ignored by some browsers.
    let body = document
        .body()
        .ok_or_else(|| ClientError::Transport("no document body available".into()))?;
    body.append_child(&anchor).map_err(js_error)?;
    anchor.click();
    anchor.remove();
    Ok(())
}
