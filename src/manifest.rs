//! Version updates for `package.json` manifests and `package-lock.json`.
//!
//! Documents are re-serialized with object keys in their original order,
//! 4-space indentation and a trailing newline, matching what npm writes, so
//! the only diff a reviewer sees is the changed `version` field.
use log::*;
use serde::Serialize;
use serde_json::{Value, json, ser::PrettyFormatter};

use crate::error::{ReleaseError, Result};

const INDENT: &[u8] = b"    ";

/// Set the top-level `version` of a manifest document.
pub fn set_manifest_version(raw: &str, version: &str) -> Result<String> {
    let mut doc: Value = serde_json::from_str(raw)?;

    let root = doc.as_object_mut().ok_or_else(|| {
        ReleaseError::validation("manifest document is not a JSON object")
    })?;

    root.insert("version".into(), json!(version));

    to_json_string(&doc)
}

/// Set `packages["<package_key>"].version` of a lock document.
pub fn set_lock_version(
    raw: &str,
    package_key: &str,
    version: &str,
) -> Result<String> {
    let mut doc: Value = serde_json::from_str(raw)?;

    let entry = doc
        .get_mut("packages")
        .and_then(|packages| packages.get_mut(package_key))
        .ok_or_else(|| ReleaseError::MissingProjectEntry {
            key: package_key.to_string(),
        })?;

    let entry = entry.as_object_mut().ok_or_else(|| {
        ReleaseError::validation(format!(
            "lock entry '{package_key}' is not a JSON object"
        ))
    })?;

    debug!(
        "lock entry {package_key}: {:?} -> {version}",
        entry.get("version")
    );

    entry.insert("version".into(), json!(version));

    to_json_string(&doc)
}

/// Current `version` of a manifest document.
pub fn manifest_version(raw: &str) -> Result<String> {
    let doc: Value = serde_json::from_str(raw)?;

    doc.get("version")
        .and_then(Value::as_str)
        .map(String::from)
        .ok_or_else(|| {
            ReleaseError::validation("manifest has no string version field")
        })
}

fn to_json_string(doc: &Value) -> Result<String> {
    let mut buf = Vec::new();
    let formatter = PrettyFormatter::with_indent(INDENT);
    let mut serializer =
        serde_json::Serializer::with_formatter(&mut buf, formatter);
    doc.serialize(&mut serializer)?;

    let mut out = String::from_utf8(buf)
        .map_err(|err| ReleaseError::Other(color_eyre::Report::from(err)))?;
    out.push('\n');

    Ok(out)
}
