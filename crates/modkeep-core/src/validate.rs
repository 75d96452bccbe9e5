// SPDX-FileCopyrightText: 2026 Modkeep Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Pure, stateless validation of plugin binaries.
//!
//! [`validate`] certifies that a byte blob is a well-formed WebAssembly
//! container before anything downstream trusts it: the magic signature is
//! checked first, and only then is the SHA-256 content checksum computed.
//! The function performs no I/O and is deterministic for identical bytes.

use sha2::{Digest, Sha256};

use crate::types::ValidationResult;

/// The four leading bytes every WebAssembly module container starts with
/// (`\0asm`).
pub const WASM_MAGIC: [u8; 4] = [0x00, 0x61, 0x73, 0x6d];

/// Binaries above this size get a non-fatal warning attached.
pub const SIZE_WARNING_THRESHOLD: usize = 10 * 1024 * 1024;

/// Validates a plugin binary.
///
/// Rejects any byte sequence whose first four bytes differ from
/// [`WASM_MAGIC`] without doing further work. For well-formed containers the
/// checksum is always computed, regardless of size; an oversized binary only
/// produces a warning, never a rejection.
pub fn validate(bytes: &[u8]) -> ValidationResult {
    if bytes.len() < WASM_MAGIC.len() || bytes[..WASM_MAGIC.len()] != WASM_MAGIC {
        return ValidationResult {
            is_valid: false,
            error: Some("missing WebAssembly magic signature".to_string()),
            checksum: None,
            warnings: Vec::new(),
        };
    }

    let mut warnings = Vec::new();
    if bytes.len() > SIZE_WARNING_THRESHOLD {
        warnings.push(format!(
            "plugin is unusually large ({} bytes, threshold {})",
            bytes.len(),
            SIZE_WARNING_THRESHOLD
        ));
    }

    ValidationResult {
        is_valid: true,
        error: None,
        checksum: Some(checksum(bytes)),
        warnings,
    }
}

/// SHA-256 hex digest of the given bytes.
pub fn checksum(bytes: &[u8]) -> String {
    hex::encode(Sha256::digest(bytes))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    /// A minimal well-formed container: magic + version header.
    const MINIMAL_WASM: [u8; 8] = [0x00, 0x61, 0x73, 0x6d, 0x01, 0x00, 0x00, 0x00];

    #[test]
    fn validate_accepts_minimal_module() {
        let result = validate(&MINIMAL_WASM);
        assert!(result.is_valid);
        assert!(result.error.is_none());
        assert!(result.warnings.is_empty());
        // SHA-256 hex digests are 64 characters.
        assert_eq!(result.checksum.unwrap().len(), 64);
    }

    #[test]
    fn validate_rejects_wrong_magic() {
        let result = validate(b"\x7fELF\x02\x01\x01\x00");
        assert!(!result.is_valid);
        assert!(result.error.unwrap().contains("magic"));
        assert!(result.checksum.is_none());
    }

    #[test]
    fn validate_rejects_truncated_input() {
        assert!(!validate(&[]).is_valid);
        assert!(!validate(&[0x00, 0x61]).is_valid);
        // Exactly the magic with nothing after it still passes the container
        // check; structural validity is the runtime compiler's job.
        assert!(validate(&WASM_MAGIC).is_valid);
    }

    #[test]
    fn validate_is_deterministic() {
        let a = validate(&MINIMAL_WASM);
        let b = validate(&MINIMAL_WASM);
        assert_eq!(a.checksum, b.checksum);
    }

    #[test]
    fn validate_warns_on_oversized_binary_without_invalidating() {
        let mut bytes = vec![0u8; SIZE_WARNING_THRESHOLD + 1];
        bytes[..4].copy_from_slice(&WASM_MAGIC);
        let result = validate(&bytes);
        assert!(result.is_valid);
        assert_eq!(result.warnings.len(), 1);
        assert!(result.warnings[0].contains("unusually large"));
        assert!(result.checksum.is_some());
    }

    proptest! {
        #[test]
        fn validate_checksum_is_stable_for_identical_bytes(tail in proptest::collection::vec(any::<u8>(), 0..256)) {
            let mut bytes = WASM_MAGIC.to_vec();
            bytes.extend_from_slice(&tail);
            prop_assert_eq!(validate(&bytes).checksum, validate(&bytes).checksum);
        }

        #[test]
        fn validate_rejects_any_non_magic_prefix(prefix in proptest::collection::vec(any::<u8>(), 4..64)) {
            prop_assume!(prefix[..4] != WASM_MAGIC);
            let result = validate(&prefix);
            prop_assert!(!result.is_valid);
            prop_assert!(result.checksum.is_none());
        }
    }
}
