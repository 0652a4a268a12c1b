//! Clients for the managed backend services. Both are consumed through
//! documented request/response contracts; nothing behind them is
//! reimplemented here.

/// Document create/read/query over named collections.
pub mod documents;
/// Credential verification and account creation.
pub mod identity;

pub use documents::{DocumentClient, DocumentRef, DocumentStore, Query, StoredDocument};
pub use identity::{Identity, IdentityClient, IdentityService};
