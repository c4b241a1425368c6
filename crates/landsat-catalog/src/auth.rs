//! Credential loading.
//!
//! Credentials come from a two-line settings file (line 1 username,
//! line 2 password, blank lines ignored) or interactively from stdin
//! when the settings argument is `-`.

use std::io::{BufRead, Write};
use std::path::Path;

use crate::error::{CatalogError, Result};

/// EarthExplorer account credentials.
#[derive(Debug, Clone)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    /// Load from a settings file.
    pub fn from_settings_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = std::fs::File::open(path.as_ref()).map_err(CatalogError::CredentialsIo)?;
        Self::from_reader(std::io::BufReader::new(file))
    }

    /// Parse the two-line settings format from any reader.
    pub fn from_reader<R: BufRead>(reader: R) -> Result<Self> {
        let lines: Vec<String> = reader
            .lines()
            .collect::<std::io::Result<Vec<_>>>()
            .map_err(CatalogError::CredentialsIo)?
            .into_iter()
            .map(|line| line.trim().to_string())
            .filter(|line| !line.is_empty())
            .collect();

        if lines.len() < 2 {
            return Err(CatalogError::Settings(
                "expected username on line 1 and password on line 2".to_string(),
            ));
        }

        Ok(Self {
            username: lines[0].clone(),
            password: lines[1].clone(),
        })
    }

    /// Prompt for credentials on stdin.
    pub fn prompt_stdin() -> Result<Self> {
        let stdin = std::io::stdin();
        let mut line = String::new();

        eprint!("Insert username: ");
        std::io::stderr().flush().map_err(CatalogError::CredentialsIo)?;
        stdin
            .lock()
            .read_line(&mut line)
            .map_err(CatalogError::CredentialsIo)?;
        let username = line.trim().to_string();

        eprint!("Insert password: ");
        std::io::stderr().flush().map_err(CatalogError::CredentialsIo)?;
        line.clear();
        stdin
            .lock()
            .read_line(&mut line)
            .map_err(CatalogError::CredentialsIo)?;
        let password = line.trim().to_string();

        if username.is_empty() || password.is_empty() {
            return Err(CatalogError::MissingCredentials);
        }

        Ok(Self { username, password })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_two_line_settings() {
        let creds = Credentials::from_reader(Cursor::new("alice\nhunter2\n")).unwrap();
        assert_eq!(creds.username, "alice");
        assert_eq!(creds.password, "hunter2");
    }

    #[test]
    fn test_blank_lines_ignored() {
        let creds = Credentials::from_reader(Cursor::new("\nalice\n\nhunter2\n\n")).unwrap();
        assert_eq!(creds.username, "alice");
        assert_eq!(creds.password, "hunter2");
    }

    #[test]
    fn test_one_line_file_rejected() {
        let err = Credentials::from_reader(Cursor::new("alice\n")).unwrap_err();
        assert!(matches!(err, CatalogError::Settings(_)));
    }

    #[test]
    fn test_whitespace_trimmed() {
        let creds = Credentials::from_reader(Cursor::new("  alice  \n  hunter2  \n")).unwrap();
        assert_eq!(creds.username, "alice");
        assert_eq!(creds.password, "hunter2");
    }
}
