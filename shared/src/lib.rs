pub mod display;
pub mod error;
pub mod history;
pub mod models;
pub mod polling;
pub mod routes;
pub mod session;
pub mod upload;

pub use error::{ClientError, PollError, ValidationError};
pub use models::{
    ActivityItem, AdminScan, AdminStats, AdminUser, AnalysisResult, HealthStatus, HistoryPage, LoginResponse,
    Prediction, RegisterRequest, ResultEnvelope, Role, Statistics, UploadAck, UploadId,
    UploadRecord, UploadStatus, User, WeeklyAnalytics, WeeklyPoint,
};
pub use polling::{CosmeticProgress, FetchOutcome, PollPolicy, PollState, Poller};
pub use routes::Route;
pub use session::{Session, SessionContext, SessionEvent, SessionStorage, SignOutReason};
