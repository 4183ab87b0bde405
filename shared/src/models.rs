use derive_more::{Display, From};
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, EnumString};

use crate::error::ClientError;

/// Server-issued identifier of an upload record.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Display, From)]
#[serde(transparent)]
pub struct UploadId(String);

impl UploadId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for UploadId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, AsRefStr, EnumString)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Role {
    #[default]
    Doctor,
    Admin,
}

impl Role {
    pub fn label(self) -> &'static str {
        match self {
            Role::Doctor => "Doctor",
            Role::Admin => "Admin",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub email: String,
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default)]
    pub role: Role,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_active: Option<String>,
}

impl User {
    pub fn display_name(&self) -> &str {
        self.full_name
            .as_deref()
            .filter(|name| !name.trim().is_empty())
            .unwrap_or("User")
    }

    pub fn initial(&self) -> char {
        self.full_name
            .as_deref()
            .and_then(|name| name.trim().chars().next())
            .map(|c| c.to_ascii_uppercase())
            .unwrap_or('U')
    }

    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct LoginResponse {
    pub access_token: String,
    #[serde(default)]
    pub token_type: Option<String>,
    #[serde(default)]
    pub expires_in: Option<u64>,
    pub user: User,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub full_name: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, AsRefStr, EnumString)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum UploadStatus {
    Uploaded,
    Processing,
    Done,
    Failed,
}

impl UploadStatus {
    pub fn is_pending(self) -> bool {
        matches!(self, UploadStatus::Uploaded | UploadStatus::Processing)
    }
}

/// Acknowledgement returned by `POST /upload` and `GET /upload/{id}`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct UploadAck {
    pub upload_id: UploadId,
    #[serde(default)]
    pub file_name: Option<String>,
    #[serde(default)]
    pub status: Option<UploadStatus>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UploadRecord {
    pub upload_id: UploadId,
    pub file_name: String,
    pub uploaded_at: String,
    pub status: UploadStatus,
    #[serde(default)]
    pub overall_classification: Option<String>,
    #[serde(default)]
    pub confidence_score: Option<f64>,
    #[serde(default)]
    pub heatmap_url: Option<String>,
    #[serde(default)]
    pub report_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    pub label: String,
    pub probability: f64,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub upload_id: Option<UploadId>,
    #[serde(default)]
    pub model_version: Option<String>,
    pub overall_classification: String,
    #[serde(default)]
    pub confidence_score: Option<f64>,
    #[serde(default)]
    pub predictions: Vec<Prediction>,
    #[serde(default)]
    pub heatmap_url: Option<String>,
    #[serde(default)]
    pub report_url: Option<String>,
    #[serde(default)]
    pub processed_at: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct UploadInfo {
    #[serde(default)]
    pub file_name: Option<String>,
    #[serde(default)]
    pub uploaded_at: Option<String>,
    pub status: UploadStatus,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ResultEnvelope {
    pub result: AnalysisResult,
    #[serde(default)]
    pub upload_info: Option<UploadInfo>,
}

/// `GET /result/{id}` answers with an envelope; older deployments return the bare result.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum ResultPayload {
    Envelope(ResultEnvelope),
    Bare(AnalysisResult),
}

impl ResultPayload {
    /// The result, if the upload it belongs to has finished processing.
    ///
    /// An upload the backend marked as failed will never produce a result.
    pub fn into_ready(self) -> Result<Option<AnalysisResult>, ClientError> {
        match self {
            ResultPayload::Envelope(ResultEnvelope {
                upload_info: Some(info),
                ..
            }) if info.status == UploadStatus::Failed => Err(ClientError::AnalysisFailed),
            ResultPayload::Envelope(ResultEnvelope {
                result,
                upload_info: Some(info),
            }) if info.status != UploadStatus::Done => {
                log::debug!(
                    "Result for {:?} present but upload is {}",
                    result.upload_id,
                    info.status.as_ref()
                );
                Ok(None)
            }
            ResultPayload::Envelope(envelope) => Ok(Some(envelope.result)),
            ResultPayload::Bare(result) => Ok(Some(result)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct HistoryPage {
    #[serde(default)]
    pub items: Vec<UploadRecord>,
    #[serde(default)]
    pub total: u32,
    #[serde(default = "first_page")]
    pub page: u32,
    #[serde(default)]
    pub page_size: u32,
    #[serde(default = "first_page")]
    pub total_pages: u32,
}

fn first_page() -> u32 {
    1
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
pub struct Statistics {
    pub total_uploads: u32,
    pub normal_count: u32,
    pub abnormal_count: u32,
    pub pending_count: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
pub struct AdminStats {
    pub total_users: u32,
    pub active_users: u32,
    pub total_scans: u32,
    pub today_scans: u32,
    pub pending_scans: u32,
    pub completed_scans: u32,
    pub normal_count: u32,
    pub abnormal_count: u32,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct AdminUser {
    pub id: String,
    pub email: String,
    #[serde(default)]
    pub full_name: Option<String>,
    pub role: Role,
    pub is_active: String,
    pub created_at: String,
    #[serde(default)]
    pub scan_count: u32,
    #[serde(default)]
    pub last_active: Option<String>,
}

impl AdminUser {
    pub fn active(&self) -> bool {
        self.is_active.eq_ignore_ascii_case("true")
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct AdminScan {
    pub id: String,
    pub user_email: String,
    #[serde(default)]
    pub user_name: Option<String>,
    pub file_name: String,
    pub status: UploadStatus,
    #[serde(default)]
    pub classification: Option<String>,
    pub created_at: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ActivityItem {
    pub id: String,
    pub action: String,
    pub user: String,
    pub time: String,
    #[serde(rename = "type")]
    pub kind: String,
}

/// `GET /health`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct HealthStatus {
    pub status: String,
    #[serde(default)]
    pub database: Option<String>,
    #[serde(default)]
    pub ml_service: Option<String>,
}

impl HealthStatus {
    pub fn is_healthy(&self) -> bool {
        matches!(self.status.as_str(), "healthy" | "running" | "ok")
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct WeeklyPoint {
    pub date: String,
    pub day: String,
    pub scans: u32,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct WeeklyAnalytics {
    pub weekly_data: Vec<WeeklyPoint>,
}

impl WeeklyAnalytics {
    pub fn peak(&self) -> u32 {
        self.weekly_data.iter().map(|p| p.scans).max().unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_roundtrips_through_storage_format() {
        let raw = r#"{"id":"u1","email":"a@b.c","full_name":"dr who","role":"admin","created_at":"2026-01-01T00:00:00","is_active":"true"}"#;
        let user: User = serde_json::from_str(raw).unwrap();
        assert!(user.is_admin());
        assert_eq!(user.initial(), 'D');
        assert_eq!(user.display_name(), "dr who");

        let stored = serde_json::to_string(&user).unwrap();
        let back: User = serde_json::from_str(&stored).unwrap();
        assert_eq!(back, user);
    }

    #[test]
    fn test_user_without_name_falls_back() {
        let user: User = serde_json::from_str(r#"{"id":"u1","email":"a@b.c","role":"doctor"}"#).unwrap();
        assert_eq!(user.display_name(), "User");
        assert_eq!(user.initial(), 'U');
        assert!(!user.is_admin());
    }

    #[test]
    fn test_envelope_with_done_status_is_ready() {
        let raw = r#"{
            "result": {
                "id": "r1", "upload_id": "abc123", "model_version": "v2",
                "overall_classification": "Normal", "confidence_score": 0.91,
                "predictions": [{"label": "Disc Herniation", "probability": 0.12}],
                "heatmap_url": "/files/h.png", "report_url": null,
                "processed_at": "2026-01-01T10:00:00"
            },
            "upload_info": {"file_name": "spine.png", "uploaded_at": "2026-01-01T09:59:00", "status": "done"}
        }"#;
        let payload: ResultPayload = serde_json::from_str(raw).unwrap();
        let result = payload.into_ready().unwrap().unwrap();
        assert_eq!(result.upload_id, Some(UploadId::from("abc123")));
        assert_eq!(result.predictions.len(), 1);
        assert_eq!(result.predictions[0].description, None);
    }

    #[test]
    fn test_envelope_still_processing_is_not_ready() {
        let raw = r#"{
            "result": {"overall_classification": "", "predictions": []},
            "upload_info": {"status": "processing"}
        }"#;
        let payload: ResultPayload = serde_json::from_str(raw).unwrap();
        assert_eq!(payload.into_ready(), Ok(None));
    }

    #[test]
    fn test_envelope_with_failed_status_is_terminal() {
        let raw = r#"{
            "result": {"overall_classification": "", "predictions": []},
            "upload_info": {"status": "failed"}
        }"#;
        let payload: ResultPayload = serde_json::from_str(raw).unwrap();
        assert_eq!(payload.into_ready(), Err(ClientError::AnalysisFailed));
    }

    #[test]
    fn test_bare_result_is_accepted() {
        let raw = r#"{"overall_classification": "High Risk", "confidence_score": 0.8, "predictions": []}"#;
        let payload: ResultPayload = serde_json::from_str(raw).unwrap();
        assert!(matches!(payload, ResultPayload::Bare(_)));
        assert_eq!(payload.into_ready().unwrap().unwrap().overall_classification, "High Risk");
    }

    #[test]
    fn test_history_page_defaults() {
        let page: HistoryPage = serde_json::from_str(r#"{"items": []}"#).unwrap();
        assert_eq!(page.total_pages, 1);
        assert_eq!(page.page, 1);
    }

    #[test]
    fn test_activity_type_field() {
        let item: ActivityItem = serde_json::from_str(
            r#"{"id":"1","action":"Uploaded a.png","user":"Dr A","time":"2026-01-01T00:00:00","type":"upload"}"#,
        )
        .unwrap();
        assert_eq!(item.kind, "upload");
    }

    #[test]
    fn test_role_parses_from_wire_name() {
        assert_eq!("admin".parse::<Role>().unwrap(), Role::Admin);
        assert_eq!(Role::Doctor.as_ref(), "doctor");
    }
}
