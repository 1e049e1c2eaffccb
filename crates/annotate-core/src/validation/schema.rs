//! JSON Schema validation for `json` fields.
//!
//! Schemas are compiled with `jsonschema`. Compilation happens once when a
//! signature is built (to reject broken schemas early) and again on each
//! submission; schemas are small and submissions are human-paced.

/// Compile a JSON Schema, reporting why it fails to compile.
pub(crate) fn compile_schema(schema: &serde_json::Value) -> Result<jsonschema::Validator, String> {
    jsonschema::options()
        .build(schema)
        .map_err(|e| e.to_string())
}

/// Validate a value against a schema.
///
/// Returns the first violation as a human-readable message.
pub(crate) fn check_against_schema(
    schema: &serde_json::Value,
    value: &serde_json::Value,
) -> Result<(), String> {
    let validator = compile_schema(schema)?;

    let first = validator.iter_errors(value).next().map(|e| {
        let path = e.instance_path.to_string();
        if path.is_empty() {
            e.to_string()
        } else {
            format!("{} at {}", e, path)
        }
    });

    match first {
        Some(message) => Err(message),
        None => Ok(()),
    }
}
