//! Tests for the credential codec and secret providers.

use argosync_core::secret::{self, Credentials, EncryptedCredentials, SecretError, SecretProvider};
use base64::Engine;
use pretty_assertions::assert_eq;

const KEY: &str = "chiave di prova";

#[test]
fn test_round_trip_across_block_boundaries() {
    for len in [0, 1, 15, 16, 17, 31, 32, 33, 63, 64, 65, 200] {
        let plaintext: String = "x".repeat(len);
        let blob = secret::encrypt(KEY, &plaintext);
        assert_eq!(secret::decrypt(KEY, &blob).unwrap(), plaintext, "length {}", len);
    }
}

#[test]
fn test_round_trip_unicode() {
    let plaintext = "Perché è già così";
    let blob = secret::encrypt("ключ", plaintext);
    assert_eq!(secret::decrypt("ключ", &blob).unwrap(), plaintext);
}

#[test]
fn test_blob_layout() {
    let blob = secret::encrypt(KEY, "docente");
    let raw = base64::engine::general_purpose::STANDARD.decode(&blob).unwrap();
    // 16-byte IV and one 32-byte padded body.
    assert_eq!(raw.len(), 16 + 32);

    let raw = base64::engine::general_purpose::STANDARD
        .decode(secret::encrypt(KEY, &"y".repeat(32)))
        .unwrap();
    assert_eq!(raw.len(), 16 + 64);
}

#[test]
fn test_fresh_iv_per_encryption() {
    let a = secret::encrypt(KEY, "docente");
    let b = secret::encrypt(KEY, "docente");
    assert_ne!(a, b);
    assert_eq!(secret::decrypt(KEY, &a).unwrap(), secret::decrypt(KEY, &b).unwrap());
}

#[test]
fn test_wrong_key_does_not_recover_plaintext() {
    let blob = secret::encrypt(KEY, "password123");
    assert_ne!(secret::decrypt("altra chiave", &blob).ok(), Some("password123".to_string()));
}

#[test]
fn test_decrypt_rejects_bad_input() {
    assert!(matches!(secret::decrypt(KEY, "not base64!!"), Err(SecretError::Encoding(_))));
    let short = base64::engine::general_purpose::STANDARD.encode([0u8; 20]);
    assert!(matches!(secret::decrypt(KEY, &short), Err(SecretError::Malformed(_))));
}

#[test]
fn test_encrypted_provider_decrypts_both_fields() {
    let provider = EncryptedCredentials {
        passphrase: KEY.to_string(),
        username: secret::encrypt(KEY, "docente"),
        password: secret::encrypt(KEY, "segreta"),
    };
    let credentials = provider.credentials().unwrap();
    assert_eq!(
        credentials,
        Credentials {
            username: "docente".to_string(),
            password: "segreta".to_string(),
        }
    );
}

#[test]
fn test_encrypted_provider_requires_values() {
    let provider = EncryptedCredentials::default();
    assert!(matches!(provider.credentials(), Err(SecretError::Missing(_))));
}

#[test]
fn test_debug_output_hides_password() {
    let credentials = Credentials {
        username: "docente".to_string(),
        password: "segreta".to_string(),
    };
    let shown = format!("{:?}", credentials);
    assert!(shown.contains("docente"));
    assert!(!shown.contains("segreta"));
}
