//! Credential issuance.

use chrono::{SubsecRound, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

use crate::credential::{Credential, CredentialEngine, ISSUER, Proof, ProofPurpose, ProofType};
use crate::error::Err;
use crate::store::Store;
use crate::{tracerr, Result};

/// Request to issue a credential.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
pub struct IssueRequest {
    /// Credential type. Must not be blank.
    #[serde(rename = "type")]
    #[serde(default)]
    pub type_: String,

    /// Claims. Must be a JSON object.
    #[serde(default)]
    pub claims: Value,
}

impl IssueRequest {
    /// Create a request for a credential of `type_` asserting `claims`.
    #[must_use]
    pub fn new(type_: impl Into<String>, claims: Value) -> Self {
        Self {
            type_: type_.into(),
            claims,
        }
    }

    /// Check the request, returning its type and claims.
    ///
    /// # Errors
    ///
    /// Returns an `invalid_input` error if the type is blank or the claims
    /// are not a JSON object.
    pub fn validate(self) -> Result<(String, Map<String, Value>)> {
        if self.type_.trim().is_empty() {
            tracerr!(Err::InvalidInput, "type must not be empty");
        }
        let Value::Object(claims) = self.claims else {
            tracerr!(Err::InvalidInput, "claims must be an object");
        };
        Ok((self.type_, claims))
    }
}

impl<S: Store> CredentialEngine<S> {
    /// Issue a credential.
    ///
    /// The credential is signed over its canonical payload, given a proof
    /// referencing the service's `#key-1` verification method, stored and
    /// returned.
    ///
    /// # Errors
    ///
    /// Returns an `invalid_input` error for an invalid request, a
    /// `key_not_initialized` error if the key pair has not been initialized,
    /// and any error from the store.
    pub async fn issue(&self, request: IssueRequest) -> Result<Credential> {
        let (type_, claims) = request.validate()?;
        let issued_at = Utc::now().trunc_subsecs(3);

        let mut credential = Credential {
            id: Uuid::new_v4().to_string(),
            type_,
            claims,
            issuer: ISSUER.to_string(),
            issued_at,
            proof: Proof {
                type_: ProofType::RsaSignature2018,
                created: issued_at,
                proof_purpose: ProofPurpose::AssertionMethod,
                verification_method: self.resolver.self_verification_method(),
                signature_value: String::new(),
            },
        };
        credential.proof.signature_value = self.keys.sign(&credential.payload()?)?;

        self.store.put(credential.clone()).await?;
        tracing::debug!("issued credential {}", credential.id);

        Ok(credential)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn validate_request() {
        let (type_, claims) = IssueRequest::new("Test", json!({"name": "John"}))
            .validate()
            .expect("should validate");
        assert_eq!(type_, "Test");
        assert_eq!(claims.get("name"), Some(&json!("John")));
    }

    #[test]
    fn blank_type() {
        let err = IssueRequest::new("  ", json!({})).validate().expect_err("should fail");
        assert!(err.is(Err::InvalidInput));
    }

    #[test]
    fn claims_must_be_object() {
        for claims in [json!(null), json!("John"), json!(["John"]), json!(30)] {
            let err = IssueRequest::new("Test", claims).validate().expect_err("should fail");
            assert!(err.is(Err::InvalidInput));
        }
    }

    #[test]
    fn missing_fields_deserialize_to_invalid() {
        let request: IssueRequest =
            serde_json::from_value(json!({"claims": {}})).expect("should deserialize");
        assert!(request.validate().is_err());
    }
}
