//! JSON arguments.

use std::io::Read;

use serde_json::Value;

/// Parse a JSON argument, reading stdin when it is `-`.
pub fn parse_json_arg(arg: &str) -> Result<Value, String> {
    if arg == "-" {
        return read_json_from_source("-");
    }
    serde_json::from_str(arg).map_err(|e| format!("Invalid JSON: {}", e))
}

/// Read a JSON value from a file or stdin.
///
/// If `source` is "-", reads from stdin.
pub fn read_json_from_source(source: &str) -> Result<Value, String> {
    let content = if source == "-" {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .map_err(|e| format!("Failed to read stdin: {}", e))?;
        buf
    } else {
        std::fs::read_to_string(source)
            .map_err(|e| format!("Failed to read '{}': {}", source, e))?
    };

    serde_json::from_str(&content).map_err(|e| format!("Invalid JSON in '{}': {}", source, e))
}
