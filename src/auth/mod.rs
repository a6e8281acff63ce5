//! Session authentication and permission checks.
//!
//! Sessions are owned by the external auth service; this module only asks it
//! who a bearer token belongs to. Authorization is an injected predicate over
//! `(subject, permission)` so role rules can change without touching handlers.

pub mod middleware;
pub mod session;

use std::fmt;
use std::sync::Arc;

use crate::error::{AppError, Result};

pub use middleware::require_session;
pub use session::{HttpSessionVerifier, SessionVerifier, StaticSessionVerifier};

/// Authenticated dashboard user
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Subject {
    pub user_id: String,
    pub email: Option<String>,
    pub role: Option<String>,
}

/// Permission strings checked by handlers
pub mod permissions {
    pub const CLIENTS_READ: &str = "clients:read";
    pub const CLIENTS_WRITE: &str = "clients:write";

    pub const SERVICES_READ: &str = "services:read";
    pub const SERVICES_WRITE: &str = "services:write";

    pub const BOOKINGS_READ: &str = "bookings:read";
    pub const BOOKINGS_WRITE: &str = "bookings:write";

    pub const PAYMENTS_READ: &str = "payments:read";
    pub const PAYMENTS_WRITE: &str = "payments:write";

    pub const COUPONS_READ: &str = "coupons:read";
    pub const COUPONS_WRITE: &str = "coupons:write";
    pub const COUPONS_VALIDATE: &str = "coupons:validate";

    pub const DASHBOARD_READ: &str = "dashboard:read";
}

type Predicate = dyn Fn(&Subject, &str) -> bool + Send + Sync;

/// Permission check shared by all handlers
#[derive(Clone)]
pub struct Authorizer {
    predicate: Arc<Predicate>,
}

impl Authorizer {
    pub fn new<F>(predicate: F) -> Self
    where
        F: Fn(&Subject, &str) -> bool + Send + Sync + 'static,
    {
        Self {
            predicate: Arc::new(predicate),
        }
    }

    /// Any authenticated subject may do anything
    pub fn allow_authenticated() -> Self {
        Self::new(|_, _| true)
    }

    pub fn is_allowed(&self, subject: &Subject, permission: &str) -> bool {
        (self.predicate)(subject, permission)
    }

    pub fn require(&self, subject: &Subject, permission: &str) -> Result<()> {
        if self.is_allowed(subject, permission) {
            Ok(())
        } else {
            tracing::warn!(
                "Permission {} denied for user {}",
                permission,
                subject.user_id
            );
            Err(AppError::Forbidden)
        }
    }
}

impl Default for Authorizer {
    fn default() -> Self {
        Self::allow_authenticated()
    }
}

impl fmt::Debug for Authorizer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Authorizer").finish_non_exhaustive()
    }
}
