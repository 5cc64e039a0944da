//! # Credibil VC
//!
//! Self-issued verifiable credentials bound to a `did:web` identifier.
//!
//! A service owns a single RSA key pair ([`KeyManager`]) and is identified by
//! the `did:web` DID derived from its public base address ([`DidResolver`]).
//! The [`CredentialEngine`] issues credentials signed over their canonical
//! JSON form ([`canonicalize`]) and verifies presented credentials by
//! resolving the key their proof references.
//!
//! ```rust,no_run
//! use credibil_vc::{Config, CredentialEngine, IssueRequest, MemoryStore, PresentedCredential};
//! use serde_json::json;
//!
//! # async fn run() -> credibil_vc::Result<()> {
//! let engine = CredentialEngine::from_config(&Config::from_env(), MemoryStore::new())?;
//!
//! let credential = engine.issue(IssueRequest::new("Test", json!({"name": "John"}))).await?;
//! let presented = PresentedCredential::try_from(&credential)?;
//! assert!(engine.verify(&presented).await.is_valid());
//! # Ok(())
//! # }
//! ```

pub mod canonical;
pub mod config;
pub mod credential;
pub mod did;
pub mod error;
pub mod key;
pub mod store;

pub use self::canonical::{canonicalize, to_canonical_string};
pub use self::config::Config;
pub use self::credential::{
    Credential, CredentialEngine, IssueRequest, PresentedCredential, PresentedProof, Proof,
    ProofPurpose, ProofType, Rejection, Verification,
};
pub use self::did::{DidResolver, Document, Resolver, VerificationMethod};
pub use self::error::Error;
pub use self::key::KeyManager;
pub use self::store::{MemoryStore, Store};

/// Result type used throughout the crate.
pub type Result<T, E = Error> = std::result::Result<T, E>;
