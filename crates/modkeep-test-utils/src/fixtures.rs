// SPDX-FileCopyrightText: 2026 Modkeep Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! WAT-authored module fixtures and metadata builders.

use std::collections::BTreeMap;

use modkeep_core::types::{PluginMetadata, VersionInfo};
use modkeep_core::{validate, PluginId};

/// A module exporting `add(i32, i32) -> i32` and a linear memory.
pub fn add_module() -> Vec<u8> {
    wat::parse_str(
        r#"(module
            (func (export "add") (param i32 i32) (result i32)
                (i32.add (local.get 0) (local.get 1))
            )
            (memory (export "memory") 1)
        )"#,
    )
    .expect("fixture WAT must assemble")
}

/// A module whose `explode` export traps unconditionally.
pub fn trapping_module() -> Vec<u8> {
    wat::parse_str(
        r#"(module
            (func (export "explode")
                unreachable
            )
            (memory (export "memory") 1)
        )"#,
    )
    .expect("fixture WAT must assemble")
}

/// A module with `init` and `cleanup` hooks that record their invocations in
/// an exported global.
pub fn hooked_module() -> Vec<u8> {
    wat::parse_str(
        r#"(module
            (global $calls (export "calls") (mut i32) (i32.const 0))
            (func (export "init")
                (global.set $calls (i32.add (global.get $calls) (i32.const 1)))
            )
            (func (export "cleanup")
                (global.set $calls (i32.add (global.get $calls) (i32.const 10)))
            )
            (memory (export "memory") 1)
        )"#,
    )
    .expect("fixture WAT must assemble")
}

/// A module whose `cleanup` hook traps.
pub fn failing_cleanup_module() -> Vec<u8> {
    wat::parse_str(
        r#"(module
            (func (export "cleanup")
                unreachable
            )
        )"#,
    )
    .expect("fixture WAT must assemble")
}

/// A module exporting `__wbindgen_start` that flips an exported global,
/// proving the start export ran exactly once at load.
pub fn start_export_module() -> Vec<u8> {
    wat::parse_str(
        r#"(module
            (global $started (export "started") (mut i32) (i32.const 0))
            (func (export "__wbindgen_start")
                (global.set $started (i32.const 1))
            )
        )"#,
    )
    .expect("fixture WAT must assemble")
}

/// A module importing the host's `env.memory` with a two-page minimum and
/// reporting the memory's size in pages.
pub fn memory_importing_module() -> Vec<u8> {
    wat::parse_str(
        r#"(module
            (import "env" "memory" (memory 2))
            (func (export "pages") (result i32)
                memory.size
            )
        )"#,
    )
    .expect("fixture WAT must assemble")
}

/// Bytes with a valid magic signature but a structurally invalid body.
pub fn garbage_after_magic() -> Vec<u8> {
    let mut bytes = vec![0x00, 0x61, 0x73, 0x6d, 0x01, 0x00, 0x00, 0x00];
    bytes.extend_from_slice(b"this is not a wasm section");
    bytes
}

/// Builds metadata for a plugin whose versions map to the given binaries,
/// with real checksums so the install pipeline's integrity checks pass.
pub fn metadata_for(id: &PluginId, description: &str, versions: &[(&str, &[u8])]) -> PluginMetadata {
    let mut map = BTreeMap::new();
    let mut latest: Option<&str> = None;
    for (version, bytes) in versions {
        map.insert(
            version.to_string(),
            VersionInfo {
                url: format!(
                    "https://github.com/{id}/releases/download/{version}/plugin.wasm"
                ),
                checksum: validate::checksum(bytes),
                size: bytes.len() as u64,
            },
        );
        latest = Some(version);
    }
    PluginMetadata {
        name: id.to_string(),
        description: description.to_string(),
        author: "Test Author".to_string(),
        latest_version: latest.unwrap_or("0.0.0").to_string(),
        versions: map,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixtures_assemble_and_carry_magic() {
        for bytes in [
            add_module(),
            trapping_module(),
            hooked_module(),
            failing_cleanup_module(),
            start_export_module(),
            memory_importing_module(),
        ] {
            assert!(validate::validate(&bytes).is_valid);
        }
    }

    #[test]
    fn metadata_for_uses_last_version_as_latest() {
        let id = PluginId::parse("acme/widgets").unwrap();
        let bytes = add_module();
        let metadata = metadata_for(&id, "test", &[("0.1.0", &bytes), ("1.0.0", &bytes)]);
        assert_eq!(metadata.latest_version, "1.0.0");
        metadata.validate().unwrap();
        assert_eq!(
            metadata.versions["1.0.0"].checksum,
            validate::checksum(&bytes)
        );
    }
}
