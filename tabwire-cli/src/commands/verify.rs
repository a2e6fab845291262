use std::path::Path;

use anyhow::bail;
use serde::Serialize;
use tabwire::{
    schema::verify_with_schema, verify_root_with_identifier, verify_root_with_opts,
    wire::FILE_IDENTIFIER_LENGTH, Table, VerifierConfig,
};

use crate::{
    app::GlobalOptions,
    commands::common::{load_buffer, load_schema},
    output::print_output,
};

/// Verification settings collected from the command line.
pub struct VerifyOptions<'a> {
    pub schema: Option<&'a Path>,
    pub identifier: Option<&'a str>,
    pub max_depth: Option<usize>,
    pub max_tables: Option<usize>,
    pub strict: bool,
    pub relaxed: bool,
}

impl VerifyOptions<'_> {
    fn config(&self) -> VerifierConfig {
        let mut config = if self.strict {
            VerifierConfig::strict()
        } else if self.relaxed {
            VerifierConfig::relaxed()
        } else {
            VerifierConfig::default()
        };
        if let Some(max_depth) = self.max_depth {
            config.max_depth = max_depth;
        }
        if let Some(max_tables) = self.max_tables {
            config.max_tables = max_tables;
        }
        config
    }
}

#[derive(Debug, Serialize)]
pub struct VerifyResult {
    pub path: String,
    pub mode: String,
    pub valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub field_path: Vec<String>,
}

pub fn run(path: &Path, options: &VerifyOptions<'_>, opts: &GlobalOptions) -> anyhow::Result<()> {
    if let Some(ident) = options.identifier {
        if ident.len() != FILE_IDENTIFIER_LENGTH {
            bail!("file identifier must be {FILE_IDENTIFIER_LENGTH} bytes long: {ident:?}");
        }
    }

    let file = load_buffer(path)?;
    let config = options.config();

    let (mode, outcome) = match options.schema {
        Some(schema_path) => {
            let mut schema = load_schema(schema_path)?;
            if let Some(ident) = options.identifier {
                schema.file_identifier = Some(ident.to_string());
            }
            let mode = format!("layout {}", schema_path.display());
            (mode, verify_with_schema(&schema, file.data(), &config))
        }
        None => {
            let outcome = match options.identifier {
                Some(ident) => verify_root_with_identifier::<Table>(&config, file.data(), ident),
                None => verify_root_with_opts::<Table>(&config, file.data()),
            };
            ("structural".to_string(), outcome)
        }
    };

    let result = VerifyResult {
        path: path.display().to_string(),
        mode,
        valid: outcome.is_ok(),
        field_path: outcome
            .as_ref()
            .err()
            .map(|e| e.field_path().into_iter().map(str::to_string).collect())
            .unwrap_or_default(),
        error_message: outcome.err().map(|e| e.root_cause().to_string()),
    };

    print_output(&result, opts, |r| {
        let status = if r.valid { "PASS" } else { "FAIL" };
        println!("{status}  {path}  ({mode})", path = r.path, mode = r.mode);
        if let Some(err) = &r.error_message {
            println!("  Error: {err}");
        }
        if !r.field_path.is_empty() {
            println!("  Field: {}", r.field_path.join("."));
        }
    })?;

    if !result.valid {
        std::process::exit(1);
    }
    Ok(())
}
