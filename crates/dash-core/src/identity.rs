use serde::{Deserialize, Serialize};

/// Who the current access token says we are.
///
/// Derived from an unverified token payload. Good for display and scheduling,
/// never for authorization decisions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionIdentity {
    /// Subject id (`id` or `sub` claim).
    pub subject_id: String,
    /// Expiry as epoch seconds (`exp` claim).
    pub expires_at: i64,
}
