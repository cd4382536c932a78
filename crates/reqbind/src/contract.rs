//! Contract violations.
//!
//! A contract violation is a defect in the calling code: an invalid record
//! schema, a required path parameter the router never supplies, a template
//! missing a placeholder. These are never turned into HTTP errors. They are
//! logged and then raised as a panic with a recognizable prefix.

use std::fmt;

/// Prefix carried by every contract-violation panic message.
pub const VIOLATION_PREFIX: &str = "reqbind contract violation";

#[cold]
#[track_caller]
pub(crate) fn violation(message: impl fmt::Display) -> ! {
    let message = message.to_string();
    tracing::error!(%message, "binding contract violated");
    panic!("{VIOLATION_PREFIX}: {message}");
}
