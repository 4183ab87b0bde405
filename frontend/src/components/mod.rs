pub mod layout;
pub mod link;
pub mod navbar;
pub mod results;
pub mod sidebar;
pub mod upload_section;
pub mod utils;
