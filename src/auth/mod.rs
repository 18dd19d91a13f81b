//! Authentication: Token persistence with a bounded lifetime.
//!
//! The core never interprets the token; it reads it at connection start,
//! attaches it to the request, and overwrites it when the user supplies a
//! new one after a rejection.

mod store;

pub use store::{CredentialStore, StoreError, CREDENTIAL_COOKIE, CREDENTIAL_TTL_SECS};
