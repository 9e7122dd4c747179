//! Message constants for acknowledgements and log output of the client
//!
//! Centralized so that tests and log processing can match on them.

pub const EMPTY_RESPONSE: &str = "Hub response carried no content";
pub const TIMED_OUT_AFTER: &str = "Request timed out after";
pub const REQUEST_CANCELLED: &str = "Request was cancelled";
pub const TRANSPORT_PANICKED: &str = "Transport panicked while sending the request";
pub const AUTHORIZED_WITHOUT_SESSION: &str = "Authorized without a session id";

/// Prefix of the additional info for non-2xx responses without content
pub const HTTP_STATUS_PREFIX: &str = "HTTP";

pub mod log {
    pub const PUSH_SKIPPED: &str = "Push skipped, no records left after filtering";
    pub const PUSH_COMPLETED: &str = "Push acknowledged";
    pub const PUSH_REJECTED: &str = "Push not acknowledged";
    pub const STATUS_DIFF_EMPTY: &str = "Status diff is empty, nothing to upload";
    pub const AUTHORIZE_START_COMPLETED: &str = "Authorize start resolved";
    pub const AUTHORIZE_STOP_COMPLETED: &str = "Authorize stop resolved";
    pub const CDR_FORWARDED: &str = "Charge detail record forwarded";
    pub const CDR_NOT_FORWARDED: &str = "Charge detail record not forwarded";
    pub const TRANSPORT_FAILED: &str = "Transport failed";
    pub const OBSERVER_FAILED: &str = "Observer hook failed";
    pub const OBSERVER_PANICKED: &str = "Observer hook panicked";
}
