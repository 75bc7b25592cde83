//! Bindings from data files and `--set` arguments.

use std::path::Path;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use placard::{bindings_from_json, Bindings, SharedProvider, Text};
use serde_json::Value;

/// Parses a `NAME=VALUE` argument.
pub fn parse_binding(arg: &str) -> Result<(String, String), String> {
    match arg.split_once('=') {
        Some((name, value)) if !name.trim().is_empty() => {
            Ok((name.trim().to_string(), value.to_string()))
        }
        _ => Err(format!("expected NAME=VALUE, got {arg:?}")),
    }
}

/// Reads a JSON or YAML document, chosen by extension.
pub fn read_data(path: &Path) -> Result<Value> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read data file {}", path.display()))?;

    let value: Value = match path.extension().and_then(|ext| ext.to_str()) {
        Some("yaml" | "yml") => serde_yaml::from_str(&text)
            .with_context(|| format!("invalid YAML in {}", path.display()))?,
        _ => serde_json::from_str(&text)
            .with_context(|| format!("invalid JSON in {}", path.display()))?,
    };

    if !value.is_object() {
        bail!("data file {} must contain an object at the top level", path.display());
    }
    Ok(value)
}

/// Builds the render bindings: the data file first, then `--set` pairs on top.
pub fn build_bindings(data: Option<&Path>, overrides: &[(String, String)]) -> Result<Bindings> {
    let mut bindings = match data {
        Some(path) => bindings_from_json(read_data(path)?),
        None => Bindings::new(),
    };
    for (name, value) in overrides {
        let provider: SharedProvider = Arc::new(Text::new(value.clone()));
        bindings.insert(name.clone(), provider);
    }
    tracing::debug!(count = bindings.len(), "bindings ready");
    Ok(bindings)
}
