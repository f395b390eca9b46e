//! API-compatible types.
//!
//! The types in this module are serialised in an API-friendly way, e.g.:
//!
//! - IDs are serialised as hex strings.
//! - Datetimes are serialised as timestamps.
//! - Field names are camelCase.
//! - Voter identities are never included, only counts.

pub mod question;
pub mod request;
pub mod status;
