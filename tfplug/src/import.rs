//! Import helpers for simplifying resource import implementations

use crate::types::Diagnostic;

/// Splits a `/`-separated import id into exactly `parts.len()` non-empty parts.
///
/// Example: parts `["owner", "name"]` accepts "octocat/hello" and rejects
/// "octocat", "octocat/" and "octocat/hello/extra".
pub fn parse_import_id(id: &str, parts: &[&str]) -> Result<Vec<String>, Diagnostic> {
    let pieces: Vec<&str> = id.split('/').collect();

    if id.is_empty() || pieces.len() != parts.len() || pieces.iter().any(|p| p.is_empty()) {
        return Err(Diagnostic::error(
            "Unexpected Import Identifier",
            format!("Expected format: {}. Got: {}", parts.join("/"), id),
        ));
    }

    Ok(pieces.into_iter().map(str::to_string).collect())
}
