//! Session precondition for all network-initiating operations.
//!
//! The auth flow itself (sign-in, token refresh) lives outside this crate;
//! callers hand in the user id they resolved. Operations that reach the
//! network or write user-owned rows take `&Session`, so an unauthenticated
//! caller fails before any remote activity begins.

use thiserror::Error;
use uuid::Uuid;

#[derive(Error, Debug)]
pub enum AuthError {
    #[error("User not authenticated")]
    NotAuthenticated,
}

/// Proof of an authenticated user.
#[derive(Debug, Clone)]
pub struct Session {
    user_id: Uuid,
}

impl Session {
    /// Turn a resolved user id into a session, or fail the precondition.
    pub fn authenticate(user: Option<Uuid>) -> Result<Self, AuthError> {
        match user {
            Some(user_id) => Ok(Self { user_id }),
            None => Err(AuthError::NotAuthenticated),
        }
    }

    pub fn user_id(&self) -> Uuid {
        self.user_id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn authenticate_with_user() {
        let id = Uuid::new_v4();
        let session = Session::authenticate(Some(id)).unwrap();
        assert_eq!(session.user_id(), id);
    }

    #[test]
    fn authenticate_without_user_fails() {
        assert!(matches!(
            Session::authenticate(None),
            Err(AuthError::NotAuthenticated)
        ));
    }
}
