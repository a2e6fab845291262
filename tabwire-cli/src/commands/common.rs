use std::path::Path;

use anyhow::Context;
use tabwire::{File, Schema};

/// Memory-map a serialized buffer.
pub fn load_buffer(path: &Path) -> anyhow::Result<File> {
    File::from_file(path).with_context(|| format!("failed to load buffer: {}", path.display()))
}

/// Load and resolve layout metadata.
pub fn load_schema(path: &Path) -> anyhow::Result<Schema> {
    Schema::from_file(path)
        .with_context(|| format!("failed to load layout metadata: {}", path.display()))
}

/// Render a file identifier for display, escaping non-printable bytes.
pub fn format_identifier(ident: &[u8]) -> String {
    ident
        .iter()
        .map(|&b| {
            if b.is_ascii_graphic() || b == b' ' {
                char::from(b).to_string()
            } else {
                format!("\\x{b:02x}")
            }
        })
        .collect()
}
