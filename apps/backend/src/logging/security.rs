use tracing::warn;

use crate::logging::pii::Redacted;
use crate::trace_ctx;

/// Log a failed login. `reason` stays server-side; clients see one message.
pub fn login_failed(reason: &str, email: &str) {
    let trace_id = trace_ctx::trace_id();

    warn!(
        event = "SECURITY_LOGIN_FAILED",
        %trace_id,
        email = %Redacted(email),
        reason,
        "Authentication failure"
    );
}

/// Log a bearer token the auth guard refused.
pub fn token_rejected(reason: &str) {
    let trace_id = trace_ctx::trace_id();

    warn!(
        event = "SECURITY_TOKEN_REJECTED",
        %trace_id,
        reason,
        "Bearer token rejected"
    );
}

/// Log a mutation attempt on a record the caller does not own.
pub fn ownership_denied(user_id: &str, resource_id: &str, action: &str) {
    let trace_id = trace_ctx::trace_id();

    warn!(
        event = "SECURITY_OWNERSHIP_DENIED",
        %trace_id,
        user_id,
        resource_id,
        action,
        "Mutation of foreign record denied"
    );
}
