//! # DID Resolver
//!
//! Resolution of `did:web` DIDs to DID documents and of DID URLs to the
//! verification methods they reference.
//!
//! The service can only vouch for its own identifier: a DID naming this
//! service resolves to the document derived from the live key pair, any
//! other `did:web` DID is reported as unsupported. Documents are never
//! fetched over the network.

use std::future::Future;
use std::str::FromStr;
use std::sync::Arc;

use crate::did::{DidUrl, Document, VerificationMethod, default_did};
use crate::error::{Context, Err};
use crate::key::KeyManager;
use crate::Result;

/// [`Resolver`] resolves a DID to its DID document.
///
/// Resolution is asynchronous so implementations that fetch documents from
/// their published location can be substituted for [`DidResolver`].
pub trait Resolver: Send + Sync {
    /// Resolve `did` to a DID document.
    ///
    /// # Errors
    ///
    /// Returns `not_found` if `did` is not a `did:web` DID, `not_supported`
    /// if the resolver cannot vouch for it.
    fn resolve(&self, did: &str) -> impl Future<Output = Result<Document>> + Send;
}

/// Dereference a DID URL of the form `<did>#<fragment>` to a verification
/// method.
///
/// The URL is split at its first `#`, the DID is resolved and the
/// document's verification methods are scanned for the id
/// `<did>#<fragment>`.
///
/// # Errors
///
/// Returns `not_found` if the URL is malformed, has no fragment, or names a
/// method the document does not contain. Resolution errors are passed
/// through.
pub async fn dereference(did_url: &str, resolver: &impl Resolver) -> Result<VerificationMethod> {
    let Ok(url) = DidUrl::from_str(did_url) else {
        return Err(Err::NotFound).context(format!("{did_url} is not a valid did:web DID URL"));
    };
    let Some(fragment) = &url.fragment else {
        return Err(Err::NotFound).context(format!(
            "{did_url} does not reference a verification method"
        ));
    };

    let did = url.did();
    let doc = resolver.resolve(&did).await?;
    let Some(vm) = doc.verification_method(&format!("{did}#{fragment}")) else {
        return Err(Err::NotFound).context(format!(
            "verification method {did_url} not found in document"
        ));
    };
    Ok(vm.clone())
}

/// Resolver for the service's own `did:web` identifier.
#[derive(Clone, Debug)]
pub struct DidResolver {
    did: String,
    domain: String,
    path: Vec<String>,
    keys: Arc<KeyManager>,
}

impl DidResolver {
    /// Create a resolver for the service published at `base_url`.
    ///
    /// # Errors
    ///
    /// Returns an `invalid_config` error if `base_url` is not a URL with a
    /// host.
    pub fn new(base_url: &str, keys: Arc<KeyManager>) -> Result<Self> {
        let did = default_did(base_url)?;
        let url = DidUrl::from_str(&did)?;

        Ok(Self {
            domain: url.domain()?.to_lowercase(),
            path: url.path()?,
            did,
            keys,
        })
    }

    /// The service's DID. Fixed for the lifetime of the resolver.
    #[must_use]
    pub fn self_did(&self) -> &str {
        &self.did
    }

    /// The DID URL of the service's signing key, `<did>#key-1`.
    #[must_use]
    pub fn self_verification_method(&self) -> String {
        format!("{}#{}", self.did, super::KEY_FRAGMENT)
    }

    /// The service's DID document, built from the current public key.
    ///
    /// # Errors
    ///
    /// Returns a `key_not_initialized` error if the key pair has not been
    /// initialized.
    pub fn self_did_document(&self) -> Result<Document> {
        Ok(Document::new(&self.did, self.keys.public_key_pem()?))
    }

    /// Whether `url` names this service. Components are compared decoded;
    /// the domain without regard to case.
    fn is_self(&self, url: &DidUrl) -> Result<bool> {
        Ok(url.domain()?.to_lowercase() == self.domain && url.path()? == self.path)
    }

    /// Dereference `did_url` to a verification method. See [`dereference`].
    ///
    /// # Errors
    ///
    /// Returns `not_found` or `not_supported` as described for
    /// [`dereference`] and [`Resolver::resolve`].
    pub async fn verification_method(&self, did_url: &str) -> Result<VerificationMethod> {
        dereference(did_url, self).await
    }
}

impl Resolver for DidResolver {
    async fn resolve(&self, did: &str) -> Result<Document> {
        let Ok(url) = DidUrl::from_str(did) else {
            return Err(Err::NotFound).context(format!("{did} is not a valid did:web DID"));
        };
        let Ok(is_self) = self.is_self(&url) else {
            return Err(Err::NotFound).context(format!("{did} is not a valid did:web DID"));
        };
        if !is_self {
            let did = url.did();
            return Err(Err::NotSupported).context(format!("resolution of {did} is not supported"));
        }
        self.self_did_document()
    }
}
