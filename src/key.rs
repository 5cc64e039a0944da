//! # Key Management
//!
//! The [`KeyManager`] owns the single RSA key pair a service signs
//! credentials with. The pair is loaded from a key directory when one is
//! present there, otherwise generated and written back so that a restart
//! yields the same key and therefore the same DID document.
//!
//! Signatures are RSA PKCS#1 v1.5 over SHA-256 (`RSA-SHA256`), encoded as
//! standard padded base64. PKCS#1 v1.5 signing is deterministic: the same key
//! and payload always produce the same signature.

mod files;

use std::fmt::{self, Debug, Formatter};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, OnceLock, PoisonError};

use base64ct::{Base64, Encoding};
use rsa::pkcs1::DecodeRsaPublicKey;
use rsa::pkcs1v15::{Signature, SigningKey, VerifyingKey};
use rsa::pkcs8::{DecodePrivateKey, DecodePublicKey, EncodePrivateKey, EncodePublicKey, LineEnding};
use rsa::signature::{SignatureEncoding, Signer, Verifier};
use rsa::{RsaPrivateKey, RsaPublicKey};
use sha2::Sha256;

use crate::error::Err;
use crate::{tracerr, Result};

/// Modulus size, in bits, of generated keys.
pub const KEY_BITS: usize = 2048;

/// Owner of the service's signing key pair.
///
/// A manager starts uninitialized. [`KeyManager::initialize`] adopts a key
/// pair exactly once; all later reads are lock-free, so a shared manager can
/// sign and export concurrently once initialization has completed.
pub struct KeyManager {
    key_dir: Option<PathBuf>,
    pair: OnceLock<KeyPair>,
    init: Mutex<()>,
}

struct KeyPair {
    signing_key: SigningKey<Sha256>,
    public_key_pem: String,
    persistent: bool,
}

impl KeyPair {
    fn generate() -> Result<(Self, String)> {
        let private_key = RsaPrivateKey::new(&mut rand::thread_rng(), KEY_BITS)?;
        let private_pem = private_key.to_pkcs8_pem(LineEnding::LF)?;
        let public_key_pem = RsaPublicKey::from(&private_key).to_public_key_pem(LineEnding::LF)?;

        let pair = Self {
            signing_key: SigningKey::new(private_key),
            public_key_pem,
            persistent: false,
        };
        Ok((pair, private_pem.to_string()))
    }

    fn from_pem(private_pem: &str, public_pem: &str) -> Result<Self> {
        let private_key = RsaPrivateKey::from_pkcs8_pem(private_pem)?;
        if RsaPublicKey::from_public_key_pem(public_pem)? != RsaPublicKey::from(&private_key) {
            tracerr!(Err::InvalidKey, "public key does not belong to the private key");
        }

        Ok(Self {
            signing_key: SigningKey::new(private_key),
            public_key_pem: public_pem.to_string(),
            persistent: false,
        })
    }
}

impl KeyManager {
    /// Create an uninitialized manager that keeps its key pair in
    /// `key_dir`.
    #[must_use]
    pub fn new(key_dir: impl Into<PathBuf>) -> Self {
        Self {
            key_dir: Some(key_dir.into()),
            pair: OnceLock::new(),
            init: Mutex::new(()),
        }
    }

    /// Create and initialize a manager backed by `key_dir`.
    ///
    /// # Errors
    ///
    /// See [`KeyManager::initialize`].
    pub fn load_or_generate(key_dir: impl Into<PathBuf>) -> Result<Self> {
        let manager = Self::new(key_dir);
        manager.initialize()?;
        Ok(manager)
    }

    /// Create a manager holding a freshly generated key pair that is never
    /// written to disk.
    ///
    /// # Errors
    ///
    /// Returns an error if key generation fails.
    pub fn ephemeral() -> Result<Self> {
        let manager = Self {
            key_dir: None,
            pair: OnceLock::new(),
            init: Mutex::new(()),
        };
        manager.initialize()?;
        Ok(manager)
    }

    /// Create a manager from PEM encoded key material: a PKCS#8 private key
    /// and an SPKI public key. Nothing is written to disk.
    ///
    /// # Errors
    ///
    /// Returns an `invalid_key` error if either key cannot be parsed.
    pub fn from_pem(private_pem: &str, public_pem: &str) -> Result<Self> {
        let manager = Self {
            key_dir: None,
            pair: OnceLock::new(),
            init: Mutex::new(()),
        };
        let _ = manager.pair.set(KeyPair::from_pem(private_pem, public_pem)?);
        Ok(manager)
    }

    /// Adopt a key pair.
    ///
    /// Loads `private.pem` and `public.pem` from the key directory when both
    /// exist and parse. Otherwise generates a new pair and persists it, the
    /// private key readable by the owner only. When the pair cannot be
    /// persisted the manager continues with the in-memory pair and logs a
    /// warning: signatures will not survive a restart.
    ///
    /// Calling `initialize` on an initialized manager does nothing.
    ///
    /// # Errors
    ///
    /// Returns an error if a new key pair cannot be generated.
    pub fn initialize(&self) -> Result<()> {
        if self.pair.get().is_some() {
            return Ok(());
        }

        // load, generate and save as one step: the adopted pair is the pair
        // on disk
        let _guard = self.init.lock().unwrap_or_else(PoisonError::into_inner);
        if self.pair.get().is_some() {
            return Ok(());
        }

        let pair = self.acquire()?;
        let _ = self.pair.set(pair);
        Ok(())
    }

    fn acquire(&self) -> Result<KeyPair> {
        let Some(key_dir) = &self.key_dir else {
            let (pair, _) = KeyPair::generate()?;
            tracing::debug!("generated ephemeral key pair");
            return Ok(pair);
        };

        if let Some((private_pem, public_pem)) = files::load(key_dir) {
            match KeyPair::from_pem(&private_pem, &public_pem) {
                Ok(mut pair) => {
                    pair.persistent = true;
                    tracing::info!("loaded key pair from {}", key_dir.display());
                    return Ok(pair);
                }
                Err(e) => {
                    tracing::warn!("ignoring unreadable key pair in {}: {e}", key_dir.display());
                }
            }
        }

        tracing::info!("generating new key pair");
        let (mut pair, private_pem) = KeyPair::generate()?;
        match files::save(key_dir, &private_pem, &pair.public_key_pem) {
            Ok(()) => {
                pair.persistent = true;
                tracing::info!("new key pair saved to {}", key_dir.display());
            }
            Err(e) => {
                tracing::warn!("using in-memory key pair (not persisted): {e}");
            }
        }
        Ok(pair)
    }

    /// Whether a key pair has been adopted.
    #[must_use]
    pub fn is_initialized(&self) -> bool {
        self.pair.get().is_some()
    }

    /// Whether the active key pair is backed by files in the key directory.
    #[must_use]
    pub fn is_persistent(&self) -> bool {
        self.pair.get().is_some_and(|p| p.persistent)
    }

    /// The directory the key pair is kept in, if any.
    #[must_use]
    pub fn key_dir(&self) -> Option<&Path> {
        self.key_dir.as_deref()
    }

    /// Sign the UTF-8 bytes of `payload` with RSA-SHA256, returning the
    /// base64 encoded signature.
    ///
    /// # Errors
    ///
    /// Returns a `key_not_initialized` error when called before the key pair
    /// has been initialized. This is an initialization-order defect in the
    /// host and must not be recovered from.
    pub fn sign(&self, payload: &str) -> Result<String> {
        let pair = self.pair()?;
        let signature = pair.signing_key.sign(payload.as_bytes());
        Ok(Base64::encode_string(&signature.to_bytes()))
    }

    /// Verify a base64 encoded RSA-SHA256 `signature` over `payload` using
    /// the PEM encoded public key.
    ///
    /// Any failure, including malformed base64 or key text, yields `false`.
    #[must_use]
    pub fn verify(payload: &str, signature: &str, public_key_pem: &str) -> bool {
        let Ok(bytes) = Base64::decode_vec(signature.trim()) else {
            return false;
        };
        let Ok(signature) = Signature::try_from(bytes.as_slice()) else {
            return false;
        };
        let public_key = RsaPublicKey::from_public_key_pem(public_key_pem)
            .or_else(|_| RsaPublicKey::from_pkcs1_pem(public_key_pem));
        let Ok(public_key) = public_key else {
            return false;
        };

        VerifyingKey::<Sha256>::new(public_key).verify(payload.as_bytes(), &signature).is_ok()
    }

    /// The public key as SPKI PEM. When the pair was loaded from disk this is
    /// the file content, unchanged.
    ///
    /// # Errors
    ///
    /// Returns a `key_not_initialized` error when called before the key pair
    /// has been initialized.
    pub fn public_key_pem(&self) -> Result<String> {
        Ok(self.pair()?.public_key_pem.clone())
    }

    fn pair(&self) -> Result<&KeyPair> {
        let Some(pair) = self.pair.get() else {
            tracerr!(Err::KeyNotInitialized, "key pair not initialized");
        };
        Ok(pair)
    }
}

impl Debug for KeyManager {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyManager")
            .field("key_dir", &self.key_dir)
            .field("initialized", &self.is_initialized())
            .field("persistent", &self.is_persistent())
            .finish_non_exhaustive()
    }
}
