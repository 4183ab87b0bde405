pub mod admin;
pub mod dashboard;
pub mod history;
pub mod home;
pub mod login;
pub mod not_found;
pub mod processing;
pub mod register;
pub mod result;
pub mod upload;

pub use admin::AdminPage;
pub use dashboard::DashboardPage;
pub use history::HistoryPage;
pub use home::HomePage;
pub use login::LoginPage;
pub use not_found::NotFoundPage;
pub use processing::ProcessingPage;
pub use register::RegisterPage;
pub use result::ResultPage;
pub use upload::UploadPage;
