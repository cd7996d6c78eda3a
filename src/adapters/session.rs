use crate::domain::model::User;
use std::sync::{Arc, RwLock};

#[derive(Debug, Clone)]
struct AuthState {
    token: String,
    user: User,
}

/// 登入狀態；複製後共用同一份狀態，由呼叫端注入到 `ApiClient`
#[derive(Debug, Clone, Default)]
pub struct Session {
    inner: Arc<RwLock<Option<AuthState>>>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    /// 以既有 token 建立已登入的 session
    pub fn signed_in(token: impl Into<String>, user: User) -> Self {
        let session = Self::new();
        session.establish(token, user);
        session
    }

    pub fn establish(&self, token: impl Into<String>, user: User) {
        let state = AuthState {
            token: token.into(),
            user,
        };
        match self.inner.write() {
            Ok(mut guard) => *guard = Some(state),
            Err(poisoned) => *poisoned.into_inner() = Some(state),
        }
    }

    pub fn clear(&self) {
        match self.inner.write() {
            Ok(mut guard) => *guard = None,
            Err(poisoned) => *poisoned.into_inner() = None,
        }
    }

    pub fn token(&self) -> Option<String> {
        self.read(|state| state.token.clone())
    }

    pub fn user(&self) -> Option<User> {
        self.read(|state| state.user.clone())
    }

    pub fn is_authenticated(&self) -> bool {
        self.read(|state| !state.token.is_empty() && !state.user.id.is_empty())
            .unwrap_or(false)
    }

    fn read<T>(&self, f: impl FnOnce(&AuthState) -> T) -> Option<T> {
        let guard = match self.inner.read() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        guard.as_ref().map(f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user() -> User {
        User {
            id: "u1".to_string(),
            name: "Asha".to_string(),
            email: "asha@shop.example".to_string(),
            avatar: String::new(),
        }
    }

    #[test]
    fn test_new_session_is_signed_out() {
        let session = Session::new();
        assert!(!session.is_authenticated());
        assert!(session.token().is_none());
        assert!(session.user().is_none());
    }

    #[test]
    fn test_lifecycle_is_shared_between_clones() {
        let session = Session::new();
        let handle = session.clone();

        session.establish("tok-1", user());
        assert!(handle.is_authenticated());
        assert_eq!(handle.token().as_deref(), Some("tok-1"));

        handle.clear();
        assert!(!session.is_authenticated());
    }

    #[test]
    fn test_empty_token_is_not_authenticated() {
        let session = Session::signed_in("", user());
        assert!(!session.is_authenticated());
    }
}
