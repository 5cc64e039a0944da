//! # Credentials
//!
//! Self-issued credentials: a typed set of claims signed by the service's
//! key and carrying a proof that names the `did:web` verification method
//! able to check the signature.
//!
//! The signature covers the canonical JSON form of exactly five fields, `id`,
//! `type`, `claims`, `issuer` and `issuedAt`. The proof is never part of the
//! signed payload.

mod issue;
mod verify;

use std::fmt::{self, Display, Formatter};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::canonical::to_canonical_string;
use crate::config::Config;
use crate::did::DidResolver;
use crate::key::KeyManager;
use crate::store::Store;
use crate::Result;

pub use self::issue::IssueRequest;
pub use self::verify::{Rejection, Verification};

/// Issuer of every credential produced by this crate.
pub const ISSUER: &str = "self";

/// A signed, self-issued credential.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Credential {
    /// Unique identifier assigned at issuance.
    pub id: String,

    /// Caller supplied credential type.
    #[serde(rename = "type")]
    pub type_: String,

    /// Claim name to value.
    pub claims: Map<String, Value>,

    /// Always [`ISSUER`].
    pub issuer: String,

    /// Time of issuance, millisecond precision.
    pub issued_at: DateTime<Utc>,

    /// Signature envelope.
    pub proof: Proof,
}

/// The signature envelope of a credential.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Proof {
    /// Signature scheme.
    #[serde(rename = "type")]
    pub type_: ProofType,

    /// Time the proof was created. Equal to the credential's `issuedAt`.
    pub created: DateTime<Utc>,

    /// Why the proof was created.
    pub proof_purpose: ProofPurpose,

    /// DID URL of the key that verifies the signature.
    pub verification_method: String,

    /// Base64 encoded signature over the canonical payload.
    pub signature_value: String,
}

/// The type of cryptographic proof attached to a credential.
#[derive(Clone, Copy, Debug, Deserialize, Serialize, PartialEq, Eq)]
pub enum ProofType {
    /// RSA PKCS#1 v1.5 SHA-256 signature over canonical JSON.
    RsaSignature2018,
}

impl Display for ProofType {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::RsaSignature2018 => write!(f, "RsaSignature2018"),
        }
    }
}

/// The purpose of a cryptographic proof.
#[derive(Clone, Copy, Debug, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum ProofPurpose {
    /// The issuer asserts the credential claims are true.
    AssertionMethod,
}

impl Display for ProofPurpose {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::AssertionMethod => write!(f, "assertionMethod"),
        }
    }
}

/// A credential as presented for verification.
///
/// Any field may be missing or of the wrong type, so every field is
/// optional and untyped. Fields other than those listed are ignored.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PresentedCredential {
    /// Credential id.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<Value>,

    /// Credential type.
    #[serde(rename = "type")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub type_: Option<Value>,

    /// Claims.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub claims: Option<Value>,

    /// Issuer.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub issuer: Option<Value>,

    /// Issuance time.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub issued_at: Option<Value>,

    /// Proof.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub proof: Option<PresentedProof>,
}

/// The proof of a presented credential.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PresentedProof {
    /// Signature scheme.
    #[serde(rename = "type")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub type_: Option<Value>,

    /// Creation time.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created: Option<Value>,

    /// Proof purpose.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub proof_purpose: Option<Value>,

    /// DID URL of the verification key.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub verification_method: Option<Value>,

    /// Base64 encoded signature.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub signature_value: Option<Value>,
}

impl PresentedCredential {
    /// The id, when it is a non-empty string.
    #[must_use]
    pub fn id(&self) -> Option<&str> {
        text(self.id.as_ref())
    }

    /// The canonical form of the signed payload. Missing fields are
    /// omitted.
    ///
    /// # Errors
    ///
    /// Returns an error if the payload cannot be serialized.
    pub fn payload(&self) -> Result<String> {
        let payload = Payload {
            id: self.id.as_ref(),
            type_: self.type_.as_ref(),
            claims: self.claims.as_ref(),
            issuer: self.issuer.as_ref(),
            issued_at: self.issued_at.as_ref(),
        };
        to_canonical_string(&payload)
    }
}

impl PresentedProof {
    /// The verification method, when it is a non-empty string.
    #[must_use]
    pub fn verification_method(&self) -> Option<&str> {
        text(self.verification_method.as_ref())
    }

    /// The signature, when it is a non-empty string.
    #[must_use]
    pub fn signature_value(&self) -> Option<&str> {
        text(self.signature_value.as_ref())
    }
}

impl Credential {
    /// The canonical form of the signed payload.
    ///
    /// # Errors
    ///
    /// Returns an error if the credential cannot be serialized.
    pub fn payload(&self) -> Result<String> {
        PresentedCredential::try_from(self)?.payload()
    }
}

impl TryFrom<&Credential> for PresentedCredential {
    type Error = crate::Error;

    fn try_from(credential: &Credential) -> Result<Self> {
        Ok(serde_json::from_value(serde_json::to_value(credential)?)?)
    }
}

fn text(value: Option<&Value>) -> Option<&str> {
    value.and_then(Value::as_str).filter(|s| !s.is_empty())
}

/// The five signed fields of a credential.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct Payload<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    id: Option<&'a Value>,
    #[serde(rename = "type")]
    #[serde(skip_serializing_if = "Option::is_none")]
    type_: Option<&'a Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    claims: Option<&'a Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    issuer: Option<&'a Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    issued_at: Option<&'a Value>,
}

/// Issues and verifies credentials.
///
/// The engine shares the key pair with the DID resolver and records issued
/// credentials in a [`Store`].
#[derive(Debug)]
pub struct CredentialEngine<S: Store> {
    keys: Arc<KeyManager>,
    resolver: Arc<DidResolver>,
    store: S,
}

impl<S: Store> CredentialEngine<S> {
    /// Create an engine from its collaborators. `keys` must be initialized
    /// before credentials are issued.
    pub const fn new(keys: Arc<KeyManager>, resolver: Arc<DidResolver>, store: S) -> Self {
        Self { keys, resolver, store }
    }

    /// Build an engine from configuration: initializes the key pair from
    /// the configured key directory and derives the DID from the base URL.
    ///
    /// # Errors
    ///
    /// Returns an error if the base URL is invalid or a key pair cannot be
    /// generated.
    pub fn from_config(config: &Config, store: S) -> Result<Self> {
        let keys = Arc::new(KeyManager::load_or_generate(config.key_dir.clone())?);
        let resolver = Arc::new(DidResolver::new(&config.base_url, Arc::clone(&keys))?);
        Ok(Self::new(keys, resolver, store))
    }

    /// The DID resolver used to name and find the signing key.
    pub fn resolver(&self) -> &DidResolver {
        &self.resolver
    }

    /// The key manager holding the signing key.
    pub fn keys(&self) -> &KeyManager {
        &self.keys
    }

    /// All stored credentials.
    ///
    /// # Errors
    ///
    /// Returns store errors.
    pub async fn list(&self) -> Result<Vec<Credential>> {
        self.store.list().await
    }

    /// A stored credential by id.
    ///
    /// # Errors
    ///
    /// Returns store errors.
    pub async fn find(&self, id: &str) -> Result<Option<Credential>> {
        self.store.get(id).await
    }

    /// Remove a stored credential. Returns `false` if no credential had the
    /// id.
    ///
    /// # Errors
    ///
    /// Returns store errors.
    pub async fn remove(&self, id: &str) -> Result<bool> {
        self.store.delete(id).await
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn payload_excludes_proof() {
        let presented: PresentedCredential = serde_json::from_value(json!({
            "proof": {"signatureValue": "abc", "verificationMethod": "did:web:x#key-1"},
            "issuedAt": "2024-01-01T00:00:00.000Z",
            "issuer": "self",
            "claims": {"name": "John", "age": 30},
            "type": "Test",
            "id": "1234",
            "extra": true
        }))
        .expect("should deserialize");

        assert_eq!(
            presented.payload().expect("should canonicalize"),
            r#"{"claims":{"age":30,"name":"John"},"id":"1234","issuedAt":"2024-01-01T00:00:00.000Z","issuer":"self","type":"Test"}"#
        );
    }

    #[test]
    fn payload_omits_missing_fields() {
        let presented = PresentedCredential {
            id: Some(json!("1234")),
            ..PresentedCredential::default()
        };
        assert_eq!(presented.payload().expect("should canonicalize"), r#"{"id":"1234"}"#);
    }

    #[test]
    fn text_fields() {
        let presented: PresentedCredential = serde_json::from_value(json!({
            "id": "",
            "proof": {"signatureValue": 42, "verificationMethod": "did:web:x#key-1"}
        }))
        .expect("should deserialize");

        assert_eq!(presented.id(), None);
        let proof = presented.proof.expect("should have proof");
        assert_eq!(proof.signature_value(), None);
        assert_eq!(proof.verification_method(), Some("did:web:x#key-1"));
    }

    #[test]
    fn proof_names() {
        assert_eq!(ProofType::RsaSignature2018.to_string(), "RsaSignature2018");
        assert_eq!(ProofPurpose::AssertionMethod.to_string(), "assertionMethod");
        assert_eq!(
            serde_json::to_value(ProofPurpose::AssertionMethod).expect("should serialize"),
            json!("assertionMethod")
        );
        assert_eq!(
            serde_json::to_value(ProofType::RsaSignature2018).expect("should serialize"),
            json!("RsaSignature2018")
        );
    }
}
