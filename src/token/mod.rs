//! API token provider
//!
//! Resolves the Papertrail API token from, in order:
//! 1. the `PAPERTRAIL_API_TOKEN` environment variable
//! 2. `~/.papertrail.yml` (format: `token: MYTOKEN`)
//!
//! A missing token is a distinct error variant so the caller can print
//! the tailored how-to-obtain-a-token message instead of a generic one.

use std::env;
use std::path::{Path, PathBuf};

use serde::Deserialize;

/// Environment variable checked first
pub const TOKEN_ENV_VAR: &str = "PAPERTRAIL_API_TOKEN";

/// Token file name under the home directory
pub const TOKEN_FILE_NAME: &str = ".papertrail.yml";

/// Errors from resolving the API token
#[derive(Debug, thiserror::Error)]
pub enum TokenError {
    /// Neither the environment variable nor the token file provided one
    #[error("no Papertrail API token found")]
    NotFound,

    #[error("failed to read token file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse token file: {0}")]
    Parse(#[from] serde_yaml::Error),
}

#[derive(Debug, Deserialize)]
struct TokenFile {
    #[serde(default)]
    token: Option<String>,
}

/// Resolve the API token from the environment or the default token file
pub fn read_token() -> Result<String, TokenError> {
    if let Ok(token) = env::var(TOKEN_ENV_VAR) {
        if !token.is_empty() {
            return Ok(token);
        }
    }

    let path = default_token_path().ok_or(TokenError::NotFound)?;
    if !path.exists() {
        return Err(TokenError::NotFound);
    }
    read_token_file(&path)
}

/// Default token file location (`~/.papertrail.yml`)
pub fn default_token_path() -> Option<PathBuf> {
    env::var("HOME")
        .ok()
        .filter(|home| !home.is_empty())
        .map(|home| PathBuf::from(home).join(TOKEN_FILE_NAME))
}

/// Read and parse a specific token file
pub fn read_token_file(path: &Path) -> Result<String, TokenError> {
    let content = std::fs::read_to_string(path)?;
    parse_token_file(&content)
}

fn parse_token_file(content: &str) -> Result<String, TokenError> {
    let file: TokenFile = serde_yaml::from_str(content)?;
    match file.token {
        Some(token) if !token.is_empty() => Ok(token),
        _ => Err(TokenError::NotFound),
    }
}
