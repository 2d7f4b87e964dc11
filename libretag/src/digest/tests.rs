use super::*;
use std::str::FromStr;

#[test]
fn test_digest_from_valid_string_succeeds() {
    let valid_digest_str =
        "sha256:7173b809ca12ec5dee4506cd86be934c4596dd234ee82c0662eac04a8c2c71dc";
    let digest = Digest::from_str(valid_digest_str);
    assert!(digest.is_ok());
}

#[test]
fn test_digest_from_invalid_string_fails() {
    let digest = Digest::from_str("sha256:invalid-digest");
    assert!(matches!(digest.unwrap_err(), RetagError::Validation { .. }));
}

#[test]
fn test_digest_display_trait() {
    let digest_str = "sha256:7173b809ca12ec5dee4506cd86be934c4596dd234ee82c0662eac04a8c2c71dc";
    let digest = Digest::from_str(digest_str).unwrap();
    assert_eq!(digest.to_string(), digest_str);
}

#[test]
fn test_sha256_of_known_content() {
    // sha256("hello")
    let digest = Digest::sha256_of(b"hello").unwrap();
    assert_eq!(
        digest.to_string(),
        "sha256:2cf24dba5fb0a30e26e83b2ac5b9e29e1b161e5c1fa7425e73043362938b9824"
    );
    assert_eq!(
        digest.hex(),
        "2cf24dba5fb0a30e26e83b2ac5b9e29e1b161e5c1fa7425e73043362938b9824"
    );
}
