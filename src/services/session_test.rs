use super::*;

// =============================================================================
// bytes_to_hex
// =============================================================================

#[test]
fn bytes_to_hex_empty() {
    assert_eq!(bytes_to_hex(&[]), "");
}

#[test]
fn bytes_to_hex_leading_zero() {
    assert_eq!(bytes_to_hex(&[0x0a]), "0a");
}

#[test]
fn bytes_to_hex_multi_byte() {
    assert_eq!(bytes_to_hex(&[0xde, 0xad, 0xbe, 0xef]), "deadbeef");
}

// =============================================================================
// generate_token
// =============================================================================

#[test]
fn generate_token_is_64_hex_chars() {
    let token = generate_token();
    assert_eq!(token.len(), 64);
    assert!(token.chars().all(|c| c.is_ascii_hexdigit()));
}

#[test]
fn generate_token_two_calls_differ() {
    assert_ne!(generate_token(), generate_token());
}

// =============================================================================
// resolve_role
// =============================================================================

#[test]
fn stored_admin_claim_is_honored() {
    assert_eq!(resolve_role("admin", None, &[]), Role::Admin);
}

#[test]
fn stored_member_stays_member() {
    assert_eq!(resolve_role("member", Some("ana@aleen.ai"), &[]), Role::Member);
}

#[test]
fn allowlisted_email_is_promoted() {
    let admins = vec!["ana@aleen.ai".to_owned()];
    assert_eq!(resolve_role("member", Some(" Ana@Aleen.AI "), &admins), Role::Admin);
}

#[test]
fn missing_email_is_not_promoted() {
    let admins = vec!["ana@aleen.ai".to_owned()];
    assert_eq!(resolve_role("member", None, &admins), Role::Member);
}
