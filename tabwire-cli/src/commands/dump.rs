use std::path::Path;

use anyhow::Context;
use tabwire::schema::to_json;

use crate::commands::common::{load_buffer, load_schema};

/// Print the buffer as pretty JSON. The output is JSON with or without `--json`.
pub fn run(path: &Path, schema: &Path) -> anyhow::Result<()> {
    let file = load_buffer(path)?;
    let schema = load_schema(schema)?;

    let value = to_json(&schema, file.data())
        .with_context(|| format!("failed to render buffer: {}", path.display()))?;
    println!("{}", serde_json::to_string_pretty(&value)?);
    Ok(())
}
