//! Domain types of the OICP roaming core
//!
//! Everything in here is pure: identifiers, records and the status diff
//! engine compute from their arguments only and are safe to share between
//! concurrent requests.

pub mod acknowledgement;
pub mod action;
pub mod cdr;
pub mod country;
pub mod evse;
pub mod identifiers;
pub mod location;
pub mod session;
pub mod status;
pub mod status_diff;
pub mod types;

pub use acknowledgement::*;
pub use action::*;
pub use cdr::*;
pub use country::*;
pub use evse::*;
pub use identifiers::*;
pub use location::*;
pub use session::*;
pub use status::*;
pub use status_diff::*;
pub use types::*;
