//! Tests for the service's DID and the DID document published for it.

use std::sync::Arc;

use credibil_vc::did::did_web_url;
use credibil_vc::error::Err;
use credibil_vc::{DidResolver, KeyManager, Resolver};
use insta::assert_json_snapshot as assert_snapshot;

fn resolver(base_url: &str) -> DidResolver {
    test_utils::init_tracing();

    let (private_pem, public_pem) = test_utils::key_pair();
    let keys = KeyManager::from_pem(private_pem, public_pem).expect("should load keys");
    DidResolver::new(base_url, Arc::new(keys)).expect("should create resolver")
}

#[test]
fn published_document() {
    let resolver = resolver("http://localhost:3000");
    let doc = resolver.self_did_document().expect("should build document");

    assert_eq!(doc.verification_method[0].public_key_pem, test_utils::key_pair().1);
    assert_snapshot!(doc, {
        ".verificationMethod[].publicKeyPem" => "[publicKeyPem]"
    }, @r#"
    {
      "@context": [
        "https://www.w3.org/ns/did/v1",
        "https://w3id.org/security/suites/rsa-2018/v1"
      ],
      "id": "did:web:localhost%3A3000",
      "verificationMethod": [
        {
          "id": "did:web:localhost%3A3000#key-1",
          "type": "RsaVerificationKey2018",
          "controller": "did:web:localhost%3A3000",
          "publicKeyPem": "[publicKeyPem]"
        }
      ]
    }
    "#);
}

#[test]
fn did_from_base_url() {
    let cases = [
        ("http://localhost:3000", "did:web:localhost%3A3000"),
        ("https://example.com", "did:web:example.com"),
        ("https://example.com:443/", "did:web:example.com"),
        ("https://example.com:8443", "did:web:example.com%3A8443"),
        ("https://example.com/issuers/acme", "did:web:example.com:issuers:acme"),
    ];

    for (base_url, did) in cases {
        assert_eq!(resolver(base_url).self_did(), did, "{base_url}");
    }
}

#[test]
fn document_location() {
    let cases = [
        ("did:web:localhost%3A3000", "http://localhost:3000/.well-known/did.json"),
        ("did:web:example.com", "https://example.com/.well-known/did.json"),
        ("did:web:example.com:issuers:acme", "https://example.com/issuers/acme/did.json"),
        ("did:web:localhost%3A3000#key-1", "http://localhost:3000/.well-known/did.json"),
    ];

    for (did, location) in cases {
        assert_eq!(did_web_url(did).expect("should convert"), location, "{did}");
    }
}

// The document is derived from the live key, so a resolver sharing the key
// manager publishes whatever key the manager holds.
#[tokio::test]
async fn document_tracks_key() {
    let keys = Arc::new(KeyManager::ephemeral().expect("should generate"));
    let resolver =
        DidResolver::new("http://localhost:3000", Arc::clone(&keys)).expect("should create");

    let doc = resolver.resolve(resolver.self_did()).await.expect("should resolve");
    assert_eq!(doc.verification_method[0].public_key_pem, keys.public_key_pem().expect("key"));
}

#[tokio::test]
async fn dereference_self_method() {
    let resolver = resolver("http://localhost:3000");

    let vm = resolver
        .verification_method("did:web:localhost%3A3000#key-1")
        .await
        .expect("should dereference");
    assert_eq!(vm.controller, "did:web:localhost%3A3000");
    assert_eq!(vm.did(), resolver.self_did());

    let err = resolver
        .verification_method("did:web:example.com#key-1")
        .await
        .expect_err("should fail");
    assert!(err.is(Err::NotSupported));

    let err = resolver
        .verification_method("did:web:localhost%3A3000")
        .await
        .expect_err("should fail");
    assert!(err.is(Err::NotFound));
}
