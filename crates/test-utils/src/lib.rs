//! Test fixtures
//!
//! RSA key generation is slow, so each test binary generates its key pairs
//! once and shares them between tests.

use std::sync::{LazyLock, Once};

use rsa::pkcs8::{EncodePrivateKey, EncodePublicKey, LineEnding};
use rsa::{RsaPrivateKey, RsaPublicKey};
use tracing_subscriber::EnvFilter;

static KEY_PAIR: LazyLock<(String, String)> = LazyLock::new(generate);
static OTHER_KEY_PAIR: LazyLock<(String, String)> = LazyLock::new(generate);
static TRACING: Once = Once::new();

/// PEM encoded `(PKCS#8 private key, SPKI public key)` shared by tests.
#[must_use]
pub fn key_pair() -> (&'static str, &'static str) {
    (&KEY_PAIR.0, &KEY_PAIR.1)
}

/// A second, unrelated key pair for tests that need a foreign signer.
#[must_use]
pub fn other_key_pair() -> (&'static str, &'static str) {
    (&OTHER_KEY_PAIR.0, &OTHER_KEY_PAIR.1)
}

/// Route `tracing` output through the test harness. Honours `RUST_LOG`.
pub fn init_tracing() {
    TRACING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}

fn generate() -> (String, String) {
    let private_key =
        RsaPrivateKey::new(&mut rand::thread_rng(), 2048).expect("should generate key");
    let private_pem = private_key.to_pkcs8_pem(LineEnding::LF).expect("should encode private key");
    let public_pem = RsaPublicKey::from(&private_key)
        .to_public_key_pem(LineEnding::LF)
        .expect("should encode public key");
    (private_pem.to_string(), public_pem)
}
