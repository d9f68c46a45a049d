//! rbparse_config: options that shape a parse.
//!
//! Options are plain data so they can be loaded from a JSON file, passed on
//! the command line, or built in code.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Options for one parse.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ParseOptions {
    /// Path recorded by `__FILE__`.
    pub filepath: String,
    /// Number of the first source line.
    pub line: i64,
    /// Local variable names of enclosing scopes, outermost first. Each list
    /// becomes a scope the parse can see, as when evaluating code inside a
    /// running method.
    pub scopes: Vec<Vec<String>>,
    /// Mark string literals frozen, as the magic comment does.
    pub frozen_string_literal: bool,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            filepath: String::new(),
            line: 1,
            scopes: Vec::new(),
            frozen_string_literal: false,
        }
    }
}

impl ParseOptions {
    pub fn with_filepath(mut self, filepath: impl Into<String>) -> Self {
        self.filepath = filepath.into();
        self
    }

    pub fn with_line(mut self, line: i64) -> Self {
        self.line = line;
        self
    }

    pub fn with_scope<I, S>(mut self, locals: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.scopes.push(locals.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_frozen_string_literal(mut self, frozen: bool) -> Self {
        self.frozen_string_literal = frozen;
        self
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read options file {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid options in {path}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Parse options from JSON text. Missing fields take their defaults.
pub fn parse_options(content: &str) -> Result<ParseOptions, serde_json::Error> {
    serde_json::from_str(content)
}

/// Read options from a JSON file.
pub fn load_options(path: impl AsRef<Path>) -> Result<ParseOptions, ConfigError> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_options(&content).map_err(|source| ConfigError::Json {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let options = ParseOptions::default();
        assert_eq!(options.line, 1);
        assert!(options.filepath.is_empty());
        assert!(options.scopes.is_empty());
        assert!(!options.frozen_string_literal);
    }

    #[test]
    fn test_parse_camel_case() {
        let options = parse_options(
            r#"{"filepath": "lib/a.rb", "line": 10, "scopes": [["a", "b"]], "frozenStringLiteral": true}"#,
        )
        .unwrap();
        assert_eq!(options.filepath, "lib/a.rb");
        assert_eq!(options.line, 10);
        assert_eq!(options.scopes, vec![vec!["a".to_string(), "b".to_string()]]);
        assert!(options.frozen_string_literal);
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let options = parse_options(r#"{"filepath": "x.rb"}"#).unwrap();
        assert_eq!(options.line, 1);
        assert_eq!(options, ParseOptions::default().with_filepath("x.rb"));
    }

    #[test]
    fn test_load_options_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"line": 3}}"#).unwrap();
        let options = load_options(file.path()).unwrap();
        assert_eq!(options.line, 3);
    }

    #[test]
    fn test_load_options_errors() {
        let missing = load_options("/nonexistent/options.json");
        assert!(matches!(missing, Err(ConfigError::Io { .. })));

        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "not json").unwrap();
        assert!(matches!(load_options(file.path()), Err(ConfigError::Json { .. })));
    }
}
