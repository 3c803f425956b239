//! Session management for authenticated API calls.
//!
//! This module provides the [`Session`] type, the authenticated handle that
//! every client borrows to make requests on behalf of a shop.

use crate::config::ShopDomain;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// An authenticated session for Shopify Admin API calls.
///
/// Sessions hold the shop domain and access token needed to make API
/// requests. How the token was obtained (private app token, OAuth, etc.) is
/// outside the scope of this crate; the session is immutable once created.
///
/// # Thread Safety
///
/// `Session` is `Send + Sync`, making it safe to share across async tasks.
///
/// # Example
///
/// ```rust
/// use shopify_bulk::{Session, ShopDomain};
///
/// let session = Session::new(
///     "session-id".to_string(),
///     ShopDomain::new("my-store").unwrap(),
///     "access-token".to_string(),
///     None, // no expiration
/// );
///
/// assert!(session.is_active());
///
/// // Sessions can be serialized for storage
/// let json = serde_json::to_string(&session).unwrap();
/// ```
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Session {
    /// Unique identifier for this session.
    pub id: String,

    /// The shop this session is for.
    pub shop: ShopDomain,

    /// The access token for API authentication.
    pub access_token: String,

    /// When this session expires, if applicable.
    pub expires: Option<DateTime<Utc>>,
}

impl Session {
    /// Creates a new session with the specified parameters.
    #[must_use]
    pub const fn new(
        id: String,
        shop: ShopDomain,
        access_token: String,
        expires: Option<DateTime<Utc>>,
    ) -> Self {
        Self {
            id,
            shop,
            access_token,
            expires,
        }
    }

    /// Returns `true` if this session has expired.
    ///
    /// Sessions without an expiration time are considered never expired.
    #[must_use]
    pub fn expired(&self) -> bool {
        self.expires.is_some_and(|expires| Utc::now() > expires)
    }

    /// Returns `true` if this session is active (not expired and has an
    /// access token).
    #[must_use]
    pub fn is_active(&self) -> bool {
        !self.access_token.is_empty() && !self.expired()
    }
}

// Verify Session is Send + Sync at compile time
const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<Session>();
};

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn session_with_expiry(expires: Option<DateTime<Utc>>) -> Session {
        Session::new(
            "id".to_string(),
            ShopDomain::new("shop").unwrap(),
            "token".to_string(),
            expires,
        )
    }

    #[test]
    fn test_session_without_expiry_never_expires() {
        let session = session_with_expiry(None);
        assert!(!session.expired());
        assert!(session.is_active());
    }

    #[test]
    fn test_session_expired_in_the_past() {
        let session = session_with_expiry(Some(Utc::now() - Duration::hours(1)));
        assert!(session.expired());
        assert!(!session.is_active());
    }

    #[test]
    fn test_session_expiring_in_the_future_is_active() {
        let session = session_with_expiry(Some(Utc::now() + Duration::hours(1)));
        assert!(!session.expired());
        assert!(session.is_active());
    }

    #[test]
    fn test_session_without_token_is_inactive() {
        let session = Session::new(
            "id".to_string(),
            ShopDomain::new("shop").unwrap(),
            String::new(),
            None,
        );
        assert!(!session.is_active());
    }

    #[test]
    fn test_session_serialization_round_trip() {
        let session = session_with_expiry(None);
        let json = serde_json::to_string(&session).unwrap();
        let restored: Session = serde_json::from_str(&json).unwrap();

        assert_eq!(restored.id, session.id);
        assert_eq!(restored.shop, session.shop);
        assert_eq!(restored.access_token, session.access_token);
    }
}
