//! Credential verification.
//!
//! Verification never fails: every outcome, including internal errors, is
//! reported as a [`Verification`].

use std::fmt::{self, Display, Formatter};

use serde::{Serialize, Serializer};
use serde_json::{Value, json};

use crate::credential::{CredentialEngine, PresentedCredential};
use crate::error::Err;
use crate::key::KeyManager;
use crate::store::Store;
use crate::Result;

/// Outcome of verifying a credential.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Verification {
    /// The credential was issued by the key its proof names and is
    /// unchanged.
    Valid,

    /// The credential cannot be trusted.
    Invalid(Rejection),
}

impl Verification {
    /// Whether the credential is valid.
    #[must_use]
    pub const fn is_valid(&self) -> bool {
        matches!(self, Self::Valid)
    }

    /// Why the credential was rejected, if it was.
    #[must_use]
    pub const fn rejection(&self) -> Option<&Rejection> {
        match self {
            Self::Valid => None,
            Self::Invalid(rejection) => Some(rejection),
        }
    }

    /// Render as `{"valid": true}` or `{"valid": false, "error": <reason>}`.
    #[must_use]
    pub fn to_json(&self) -> Value {
        match self {
            Self::Valid => json!({"valid": true}),
            Self::Invalid(rejection) => json!({"valid": false, "error": rejection.to_string()}),
        }
    }
}

impl Serialize for Verification {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_json().serialize(serializer)
    }
}

/// Reason a credential was rejected.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Rejection {
    /// `id`, `proof` or `proof.signatureValue` is missing.
    MissingFields,

    /// `proof.verificationMethod` is missing.
    MissingVerificationMethod,

    /// The verification method could not be resolved.
    Resolution,

    /// The signature does not match the payload and resolved key.
    InvalidSignature,

    /// The payload differs from the locally stored credential with the same
    /// id.
    Tampered,

    /// Verification could not be completed.
    Internal(String),
}

impl Display for Rejection {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingFields => write!(f, "credential missing required fields"),
            Self::MissingVerificationMethod => {
                write!(f, "credential missing verificationMethod in proof")
            }
            Self::Resolution => {
                write!(f, "failed to resolve DID or verification method not found")
            }
            Self::InvalidSignature => write!(f, "invalid signature"),
            Self::Tampered => write!(f, "credential has been tampered with"),
            Self::Internal(detail) => write!(f, "verification failed: {detail}"),
        }
    }
}

impl<S: Store> CredentialEngine<S> {
    /// Verify a presented credential.
    ///
    /// Checks, in order: required fields, the verification method reference,
    /// resolution of the referenced key, the signature over the rebuilt
    /// payload and, when a credential with the same id is stored locally,
    /// that the payloads match.
    pub async fn verify(&self, credential: &PresentedCredential) -> Verification {
        let verification = match self.check(credential).await {
            Ok(verification) => verification,
            Err(e) => Verification::Invalid(Rejection::Internal(e.to_string())),
        };

        let id = credential.id().unwrap_or("<none>");
        match &verification {
            Verification::Valid => tracing::debug!("credential {id} is valid"),
            Verification::Invalid(rejection) => {
                tracing::debug!("credential {id} rejected: {rejection}");
            }
        }
        verification
    }

    async fn check(&self, credential: &PresentedCredential) -> Result<Verification> {
        let (Some(id), Some(proof)) = (credential.id(), &credential.proof) else {
            return Ok(Verification::Invalid(Rejection::MissingFields));
        };
        let Some(signature) = proof.signature_value() else {
            return Ok(Verification::Invalid(Rejection::MissingFields));
        };
        let Some(method) = proof.verification_method() else {
            return Ok(Verification::Invalid(Rejection::MissingVerificationMethod));
        };

        let vm = match self.resolver.verification_method(method).await {
            Ok(vm) => vm,
            Err(e) if e.is(Err::NotFound) || e.is(Err::NotSupported) => {
                tracing::debug!("cannot resolve {method}: {e}");
                return Ok(Verification::Invalid(Rejection::Resolution));
            }
            Err(e) => return Err(e),
        };

        let payload = credential.payload()?;
        if !KeyManager::verify(&payload, signature, &vm.public_key_pem) {
            return Ok(Verification::Invalid(Rejection::InvalidSignature));
        }

        if let Some(stored) = self.store.get(id).await? {
            if stored.payload()? != payload {
                return Ok(Verification::Invalid(Rejection::Tampered));
            }
        }

        Ok(Verification::Valid)
    }
}
