use std::cell::{Cell, RefCell};
use std::rc::Rc;

use crate::error::ClientError;
use crate::models::{LoginResponse, User};

pub const TOKEN_KEY: &str = "token";
pub const USER_KEY: &str = "user";

#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    pub token: String,
    pub user: User,
}

impl From<LoginResponse> for Session {
    fn from(response: LoginResponse) -> Self {
        Self {
            token: response.access_token,
            user: response.user,
        }
    }
}

/// Where the session survives page reloads (browser local storage in the app).
pub trait SessionStorage {
    fn load(&self) -> Option<Session>;
    fn store(&self, session: &Session);
    fn erase(&self);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignOutReason {
    UserRequested,
    Unauthorized,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    SignedIn(User),
    UserUpdated(User),
    SignedOut(SignOutReason),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Listener = Rc<dyn Fn(&SessionEvent)>;

/// Single owner of the token + user pair.
///
/// Components read through `get`/`token`, login and logout write through
/// `set`/`clear`, and anything that must react to a logout subscribes.
pub struct SessionContext<S: SessionStorage> {
    storage: S,
    current: RefCell<Option<Session>>,
    listeners: RefCell<Vec<(SubscriptionId, Listener)>>,
    next_id: Cell<u64>,
}

impl<S: SessionStorage> SessionContext<S> {
    pub fn new(storage: S) -> Self {
        let current = storage.load();
        if let Some(session) = &current {
            log::info!("Restored session for {}", session.user.email);
        }
        Self {
            storage,
            current: RefCell::new(current),
            listeners: RefCell::new(Vec::new()),
            next_id: Cell::new(0),
        }
    }

    pub fn get(&self) -> Option<Session> {
        self.current.borrow().clone()
    }

    pub fn user(&self) -> Option<User> {
        self.current.borrow().as_ref().map(|s| s.user.clone())
    }

    pub fn token(&self) -> Option<String> {
        self.current.borrow().as_ref().map(|s| s.token.clone())
    }

    pub fn is_authenticated(&self) -> bool {
        self.current.borrow().is_some()
    }

    pub fn is_admin(&self) -> bool {
        self.current
            .borrow()
            .as_ref()
            .is_some_and(|s| s.user.is_admin())
    }

    /// Value for the `Authorization` header, if a token is held.
    pub fn bearer(&self) -> Option<String> {
        self.token().map(|token| format!("Bearer {}", token))
    }

    pub fn set(&self, session: Session) {
        self.storage.store(&session);
        let user = session.user.clone();
        *self.current.borrow_mut() = Some(session);
        self.notify(&SessionEvent::SignedIn(user));
    }

    /// Replaces the stored profile after a fresh `/auth/me`, keeping the token.
    pub fn update_user(&self, user: User) {
        let updated = {
            let mut current = self.current.borrow_mut();
            match current.as_mut() {
                Some(session) if session.user != user => {
                    session.user = user.clone();
                    self.storage.store(session);
                    true
                }
                _ => false,
            }
        };
        if updated {
            self.notify(&SessionEvent::UserUpdated(user));
        }
    }

    /// Drops the session everywhere. Idempotent: listeners hear about it once.
    pub fn clear(&self, reason: SignOutReason) {
        self.storage.erase();
        let had_session = self.current.borrow_mut().take().is_some();
        if had_session {
            log::info!("Session cleared ({:?})", reason);
            self.notify(&SessionEvent::SignedOut(reason));
        }
    }

    /// Classifies a failed response; a 401 while holding a token ends the session.
    ///
    /// A 401 on an anonymous request (wrong password on the login form) has
    /// nothing to tear down, so the backend's message is passed through.
    pub fn reject(&self, status: u16, body: &str) -> ClientError {
        if status == 401 {
            if self.is_authenticated() {
                self.clear(SignOutReason::Unauthorized);
                return ClientError::Unauthorized;
            }
            return match crate::error::extract_detail(body) {
                Some(message) => ClientError::BackendRejected { status, message },
                None => ClientError::Unauthorized,
            };
        }
        ClientError::from_response(status, body)
    }

    pub fn subscribe(&self, listener: impl Fn(&SessionEvent) + 'static) -> SubscriptionId {
        let id = SubscriptionId(self.next_id.get());
        self.next_id.set(id.0 + 1);
        self.listeners.borrow_mut().push((id, Rc::new(listener)));
        id
    }

    pub fn unsubscribe(&self, id: SubscriptionId) {
        self.listeners.borrow_mut().retain(|(other, _)| *other != id);
    }

    fn notify(&self, event: &SessionEvent) {
        // Snapshot so a listener may (un)subscribe while being called.
        let listeners: Vec<Listener> = self
            .listeners
            .borrow()
            .iter()
            .map(|(_, listener)| Rc::clone(listener))
            .collect();
        for listener in listeners {
            listener(event);
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::models::Role;

    #[derive(Default, Clone)]
    pub(crate) struct MemoryStorage {
        pub slot: Rc<RefCell<Option<Session>>>,
    }

    impl SessionStorage for MemoryStorage {
        fn load(&self) -> Option<Session> {
            self.slot.borrow().clone()
        }

        fn store(&self, session: &Session) {
            *self.slot.borrow_mut() = Some(session.clone());
        }

        fn erase(&self) {
            self.slot.borrow_mut().take();
        }
    }

    pub(crate) fn doctor() -> User {
        User {
            id: "u-1".into(),
            email: "house@clinic.org".into(),
            full_name: Some("Gregory House".into()),
            role: Role::Doctor,
            created_at: None,
            is_active: Some("true".into()),
        }
    }

    fn session() -> Session {
        Session {
            token: "jwt-abc".into(),
            user: doctor(),
        }
    }

    #[test]
    fn test_restores_persisted_session() {
        let storage = MemoryStorage::default();
        storage.store(&session());
        let ctx = SessionContext::new(storage);
        assert!(ctx.is_authenticated());
        assert_eq!(ctx.bearer().as_deref(), Some("Bearer jwt-abc"));
    }

    #[test]
    fn test_set_persists_and_notifies() {
        let storage = MemoryStorage::default();
        let ctx = SessionContext::new(storage.clone());
        let events = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&events);
        ctx.subscribe(move |event| sink.borrow_mut().push(event.clone()));

        ctx.set(session());

        assert_eq!(storage.load(), Some(session()));
        assert_eq!(events.borrow().as_slice(), &[SessionEvent::SignedIn(doctor())]);
    }

    #[test]
    fn test_no_token_means_no_header() {
        let ctx = SessionContext::new(MemoryStorage::default());
        assert_eq!(ctx.bearer(), None);
        assert!(!ctx.is_admin());
    }

    #[test]
    fn test_unauthorized_response_empties_storage() {
        let storage = MemoryStorage::default();
        storage.store(&session());
        let ctx = SessionContext::new(storage.clone());
        let events = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&events);
        ctx.subscribe(move |event| sink.borrow_mut().push(event.clone()));

        let err = ctx.reject(401, r#"{"detail":"Could not validate credentials"}"#);

        assert_eq!(err, ClientError::Unauthorized);
        assert!(!ctx.is_authenticated());
        assert_eq!(storage.load(), None);
        assert_eq!(
            events.borrow().as_slice(),
            &[SessionEvent::SignedOut(SignOutReason::Unauthorized)]
        );
    }

    #[test]
    fn test_second_unauthorized_does_not_notify_again() {
        let storage = MemoryStorage::default();
        storage.store(&session());
        let ctx = SessionContext::new(storage);
        let count = Rc::new(Cell::new(0));
        let seen = Rc::clone(&count);
        ctx.subscribe(move |_| seen.set(seen.get() + 1));

        ctx.reject(401, "");
        ctx.clear(SignOutReason::Unauthorized);
        assert_eq!(count.get(), 1);
    }

    #[test]
    fn test_anonymous_unauthorized_keeps_backend_message() {
        let ctx = SessionContext::new(MemoryStorage::default());
        let err = ctx.reject(401, r#"{"detail":"Incorrect email or password"}"#);
        assert_eq!(err.to_string(), "Incorrect email or password");
    }

    #[test]
    fn test_other_statuses_leave_session_alone() {
        let storage = MemoryStorage::default();
        storage.store(&session());
        let ctx = SessionContext::new(storage);
        let err = ctx.reject(403, r#"{"detail":"Admin access required"}"#);
        assert_eq!(err.to_string(), "Admin access required");
        assert!(ctx.is_authenticated());
    }

    #[test]
    fn test_unsubscribe_and_update_user() {
        let storage = MemoryStorage::default();
        storage.store(&session());
        let ctx = SessionContext::new(storage.clone());
        let count = Rc::new(Cell::new(0));
        let seen = Rc::clone(&count);
        let id = ctx.subscribe(move |_| seen.set(seen.get() + 1));

        let mut renamed = doctor();
        renamed.full_name = Some("G. House".into());
        ctx.update_user(renamed.clone());
        ctx.update_user(renamed.clone());
        assert_eq!(count.get(), 1);
        assert_eq!(storage.load().unwrap().user, renamed);

        ctx.unsubscribe(id);
        ctx.clear(SignOutReason::UserRequested);
        assert_eq!(count.get(), 1);
    }
}
