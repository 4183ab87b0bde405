use gloo_storage::{LocalStorage, Storage};
use shared::session::{Session, SessionStorage, TOKEN_KEY, USER_KEY};
use shared::User;

/// Keeps the session in `localStorage` so it survives reloads.
#[derive(Debug, Default, Clone, Copy)]
pub struct BrowserStorage;

impl SessionStorage for BrowserStorage {
    fn load(&self) -> Option<Session> {
        let token = LocalStorage::get::<String>(TOKEN_KEY).ok()?;
        match LocalStorage::get::<User>(USER_KEY) {
            Ok(user) => Some(Session { token, user }),
            Err(e) => {
                log::warn!("Discarding stored token without a readable user: {:?}", e);
                self.erase();
                None
            }
        }
    }

    fn store(&self, session: &Session) {
        if let Err(e) = LocalStorage::set(TOKEN_KEY, &session.token) {
            log::error!("Failed to persist token: {:?}", e);
        }
        if let Err(e) = LocalStorage::set(USER_KEY, &session.user) {
            log::error!("Failed to persist user: {:?}", e);
        }
    }

    fn erase(&self) {
        LocalStorage::delete(TOKEN_KEY);
        LocalStorage::delete(USER_KEY);
    }
}
