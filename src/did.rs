//! # DID Web
//!
//! The `did:web` method uses a web domain's reputation to confer trust. This
//! module derives the service's identifier from its base address, builds its
//! DID document and resolves DID URLs to verification keys.
//!
//! See:
//!
//! - <https://w3c-ccg.github.io/did-method-web>
//! - <https://w3c.github.io/did-resolution>

mod document;
mod resolve;
mod url;

pub use self::document::*;
pub use self::resolve::{DidResolver, Resolver, dereference};
pub use self::url::{DID_WEB_PREFIX, DidUrl, default_did, did_web_url, parse_url};
