use super::*;

#[test]
fn normalize_name_collapses_whitespace() {
    assert_eq!(normalize_name("  Ana   Maria\tSilva "), Some("Ana Maria Silva".to_owned()));
}

#[test]
fn normalize_name_rejects_blank() {
    assert_eq!(normalize_name(""), None);
    assert_eq!(normalize_name(" \n\t "), None);
}

#[test]
fn normalize_name_truncates_long_names() {
    let long = "a".repeat(MAX_NAME_LEN + 10);
    assert_eq!(normalize_name(&long).unwrap().chars().count(), MAX_NAME_LEN);
}
