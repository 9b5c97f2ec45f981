use fhub_kernel::SAFE_ALPHABET;
use fhub_kernel::safe_nanoid;

#[test]
fn generates_expected_length_and_charset() {
    let id = safe_nanoid!();
    assert_eq!(id.len(), 12);

    for ch in id.chars() {
        assert!(SAFE_ALPHABET.contains(&ch), "unexpected character in nanoid: {ch}");
    }
}

#[test]
fn custom_length() {
    let id = safe_nanoid!(20);
    assert_eq!(id.len(), 20);
}

#[test]
fn record_ids_are_table_prefixed() {
    let id = fhub_kernel::record_id!("package");
    let (table, key) = id.split_once(':').unwrap();
    assert_eq!(table, "package");
    assert_eq!(key.len(), 12);
}
