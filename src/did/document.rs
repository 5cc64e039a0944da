//! # DID Document
//!
//! The DID document published for the service's `did:web` identifier. It is
//! derived from the identifier and the live public key on demand and never
//! stored, so it cannot drift from the key actually used for signing.

use serde::{Deserialize, Serialize};

/// Contexts of a DID document carrying an RSA 2018 verification key.
pub const CONTEXT: [&str; 2] =
    ["https://www.w3.org/ns/did/v1", "https://w3id.org/security/suites/rsa-2018/v1"];

/// Fragment identifying the service's (only) verification method.
pub const KEY_FRAGMENT: &str = "key-1";

/// Verification method type for PEM encoded RSA public keys.
pub const VERIFICATION_KEY_TYPE: &str = "RsaVerificationKey2018";

/// DID Document
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    /// The context of the DID document.
    #[serde(rename = "@context")]
    pub context: Vec<String>,

    /// The DID the document describes.
    pub id: String,

    /// Verification methods, in order. The service publishes exactly one.
    pub verification_method: Vec<VerificationMethod>,
}

impl Document {
    /// Build the document for `did` publishing `public_key_pem` as its
    /// `#key-1` verification method.
    #[must_use]
    pub fn new(did: impl Into<String>, public_key_pem: impl Into<String>) -> Self {
        let did = did.into();
        let method = VerificationMethod {
            id: format!("{did}#{KEY_FRAGMENT}"),
            type_: VERIFICATION_KEY_TYPE.to_string(),
            controller: did.clone(),
            public_key_pem: public_key_pem.into(),
        };

        Self {
            context: CONTEXT.iter().map(ToString::to_string).collect(),
            id: did,
            verification_method: vec![method],
        }
    }

    /// Retrieve a verification method by its ID.
    #[must_use]
    pub fn verification_method(&self, id: &str) -> Option<&VerificationMethod> {
        self.verification_method.iter().find(|vm| vm.id == id)
    }
}

/// A public key entry of a DID document.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct VerificationMethod {
    /// DID URL identifying the verification method (`<did>#<fragment>`).
    pub id: String,

    /// Verification method type.
    #[serde(rename = "type")]
    pub type_: String,

    /// The DID of the controller of the verification method.
    pub controller: String,

    /// SPKI PEM encoded public key.
    pub public_key_pem: String,
}

impl VerificationMethod {
    /// Infer the DID from the key ID.
    #[must_use]
    pub fn did(&self) -> String {
        self.id.split('#').next().unwrap_or_default().to_string()
    }
}
