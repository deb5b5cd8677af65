//! Shared CLI utilities for the strata-wordpiece binary.

use std::io::Read;
use std::path::Path;

use crate::error::TokenizerError;

/// Initialize tracing/logging to stderr.
///
/// If `disable` is true, no output is produced.
/// Otherwise respects `RUST_LOG` env var, defaulting to WARN.
pub fn init_logging(disable: bool) {
    use tracing_subscriber::EnvFilter;

    if disable {
        return;
    }

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Read input text from one of: prompt string, file path, or stdin.
pub fn read_input(
    prompt: Option<&str>,
    file: Option<&Path>,
    use_stdin: bool,
) -> Result<String, TokenizerError> {
    if let Some(text) = prompt {
        return Ok(text.to_string());
    }

    if let Some(path) = file {
        return Ok(std::fs::read_to_string(path)?);
    }

    if use_stdin {
        let mut buf = String::new();
        std::io::stdin().read_to_string(&mut buf)?;
        return Ok(buf);
    }

    Err(TokenizerError::InvalidArgument(
        "No input provided. Use --prompt, --file, or --stdin".to_string(),
    ))
}
