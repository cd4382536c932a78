//! Binding policy.
//!
//! [`BinderConfig`] decides which body types a binder accepts and how
//! strictly JSON bodies are matched against records. It can be built in
//! code, or loaded from TOML or JSON with environment overrides on top.
//!
//! # Example
//!
//! ```rust
//! use reqbind::BinderConfig;
//!
//! let config = BinderConfig::from_toml_str(r#"
//!     allow_multipart = false
//!     disallow_unknown_fields = true
//!     allow_unknown_fields_header = "X-Allow-Unknown"
//! "#).unwrap();
//!
//! assert!(config.allow_json);
//! assert!(!config.allow_multipart);
//! ```

use http::HeaderName;
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::codec::parse_bool;

/// One mebibyte.
pub const MB: usize = 1 << 20;

/// Default in-memory budget for multipart form values.
pub const DEFAULT_MAX_MULTIPART_MEMORY: usize = 32 * MB;

/// Default form key that may carry a JSON body.
pub const DEFAULT_JSON_BODY_FALLBACK_PARAM: &str = "_body";

/// Policy applied by a [`Binder`](crate::Binder).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BinderConfig {
    /// Accept `application/json` bodies
    pub allow_json: bool,
    /// Accept `application/x-www-form-urlencoded` bodies
    pub allow_form: bool,
    /// Accept `multipart/form-data` bodies
    pub allow_multipart: bool,
    /// Form key whose value is decoded as a JSON body when the request
    /// body is not JSON
    pub json_body_fallback_param: Option<String>,
    /// Byte budget for buffered multipart values
    pub max_multipart_memory: usize,
    /// Reject JSON object keys that match no field
    pub disallow_unknown_fields: bool,
    /// Header that lifts `disallow_unknown_fields` for one request when set
    /// to a true boolean
    pub allow_unknown_fields_header: Option<String>,
}

impl Default for BinderConfig {
    fn default() -> Self {
        Self {
            allow_json: true,
            allow_form: true,
            allow_multipart: true,
            json_body_fallback_param: Some(DEFAULT_JSON_BODY_FALLBACK_PARAM.to_owned()),
            max_multipart_memory: DEFAULT_MAX_MULTIPART_MEMORY,
            disallow_unknown_fields: false,
            allow_unknown_fields_header: None,
        }
    }
}

impl BinderConfig {
    /// Default policy with unknown JSON fields rejected.
    pub fn strict() -> Self {
        Self::default().into_strict()
    }

    /// Rejects unknown JSON fields, with no per-request override.
    pub fn into_strict(mut self) -> Self {
        self.disallow_unknown_fields = true;
        self.allow_unknown_fields_header = None;
        self
    }

    /// Sets whether JSON bodies are accepted.
    pub fn with_json(mut self, allow: bool) -> Self {
        self.allow_json = allow;
        self
    }

    /// Sets whether URL-encoded bodies are accepted.
    pub fn with_form(mut self, allow: bool) -> Self {
        self.allow_form = allow;
        self
    }

    /// Sets whether multipart bodies are accepted.
    pub fn with_multipart(mut self, allow: bool) -> Self {
        self.allow_multipart = allow;
        self
    }

    /// Sets the fallback JSON form key; `None` disables the fallback.
    pub fn with_json_body_fallback_param(mut self, param: Option<&str>) -> Self {
        self.json_body_fallback_param = param.map(str::to_owned);
        self
    }

    /// Sets the multipart byte budget.
    pub fn with_max_multipart_memory(mut self, bytes: usize) -> Self {
        self.max_multipart_memory = bytes;
        self
    }

    /// Sets whether unknown JSON keys are rejected.
    pub fn with_disallow_unknown_fields(mut self, disallow: bool) -> Self {
        self.disallow_unknown_fields = disallow;
        self
    }

    /// Sets the per-request override header for unknown JSON keys.
    pub fn with_allow_unknown_fields_header(mut self, header: Option<&str>) -> Self {
        self.allow_unknown_fields_header = header.map(str::to_owned);
        self
    }

    /// Checks values that serde cannot.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_multipart_memory == 0 {
            return Err(ConfigError::invalid_value(
                "max_multipart_memory",
                "must be greater than zero",
            ));
        }
        if let Some(param) = &self.json_body_fallback_param {
            if param.is_empty() {
                return Err(ConfigError::invalid_value(
                    "json_body_fallback_param",
                    "must not be empty; omit it to disable the fallback",
                ));
            }
        }
        if let Some(header) = &self.allow_unknown_fields_header {
            if HeaderName::from_bytes(header.as_bytes()).is_err() {
                return Err(ConfigError::invalid_value(
                    "allow_unknown_fields_header",
                    format!("{header:?} is not a valid header name"),
                ));
            }
        }
        Ok(())
    }

    /// Parses and validates a TOML document.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Parses and validates a JSON document.
    pub fn from_json_str(content: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Loads and validates a `.toml` or `.json` file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(ConfigError::file_not_found(path));
        }
        let content = fs::read_to_string(path).map_err(|e| ConfigError::read_error(path, e))?;

        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_lowercase);
        match extension.as_deref() {
            Some("toml") => Self::from_toml_str(&content),
            Some("json") => Self::from_json_str(&content),
            _ => Err(ConfigError::UnsupportedFormat {
                path: path.to_path_buf(),
            }),
        }
    }

    /// Applies `<PREFIX>__<FIELD>` environment variables, then validates.
    ///
    /// Field names are upper-case (`REQBIND__ALLOW_JSON=false`). An empty
    /// value clears an optional field.
    pub fn with_env_prefix(self, prefix: &str) -> Result<Self, ConfigError> {
        self.with_vars(prefix, env::vars())
    }

    fn with_vars(
        mut self,
        prefix: &str,
        vars: impl IntoIterator<Item = (String, String)>,
    ) -> Result<Self, ConfigError> {
        for (key, value) in vars {
            let Some(field) = key
                .strip_prefix(prefix)
                .and_then(|rest| rest.strip_prefix("__"))
            else {
                continue;
            };
            self.apply_var(&key, field, &value)?;
        }
        self.validate()?;
        Ok(self)
    }

    fn apply_var(&mut self, key: &str, field: &str, value: &str) -> Result<(), ConfigError> {
        let flag = || parse_bool(value).map_err(|_| ConfigError::env_parse_error(key, "expected boolean"));
        let text = || (!value.is_empty()).then(|| value.to_owned());
        match field {
            "ALLOW_JSON" => self.allow_json = flag()?,
            "ALLOW_FORM" => self.allow_form = flag()?,
            "ALLOW_MULTIPART" => self.allow_multipart = flag()?,
            "DISALLOW_UNKNOWN_FIELDS" => self.disallow_unknown_fields = flag()?,
            "JSON_BODY_FALLBACK_PARAM" => self.json_body_fallback_param = text(),
            "ALLOW_UNKNOWN_FIELDS_HEADER" => self.allow_unknown_fields_header = text(),
            "MAX_MULTIPART_MEMORY" => {
                self.max_multipart_memory = value
                    .parse()
                    .map_err(|_| ConfigError::env_parse_error(key, "expected integer"))?;
            }
            _ => return Err(ConfigError::env_parse_error(key, "unknown configuration field")),
        }
        Ok(())
    }
}

/// Errors raised while loading a [`BinderConfig`].
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Configuration file not found.
    #[error("configuration file not found: {path}")]
    FileNotFound {
        /// Path to the missing file.
        path: PathBuf,
    },

    /// Failed to read configuration file.
    #[error("failed to read configuration file: {path}")]
    ReadError {
        /// Path to the file.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },

    /// File extension is neither `.toml` nor `.json`.
    #[error("unsupported configuration file format: {path}")]
    UnsupportedFormat {
        /// Path to the file.
        path: PathBuf,
    },

    /// TOML parsing error.
    #[error("failed to parse TOML configuration: {0}")]
    TomlError(#[from] toml::de::Error),

    /// JSON parsing error.
    #[error("failed to parse JSON configuration: {0}")]
    JsonError(#[from] serde_json::Error),

    /// Invalid configuration value.
    #[error("invalid configuration value for {field}: {reason}")]
    InvalidValue {
        /// The field with the invalid value.
        field: String,
        /// Explanation of why the value is invalid.
        reason: String,
    },

    /// Environment variable parsing error.
    #[error("failed to parse environment variable {var}: {reason}")]
    EnvParseError {
        /// The environment variable name.
        var: String,
        /// Explanation of the parsing error.
        reason: String,
    },
}

impl ConfigError {
    /// Creates a file not found error.
    pub fn file_not_found(path: impl Into<PathBuf>) -> Self {
        Self::FileNotFound { path: path.into() }
    }

    /// Creates a read error.
    pub fn read_error(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::ReadError {
            path: path.into(),
            source,
        }
    }

    /// Creates an invalid value error.
    pub fn invalid_value(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidValue {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// Creates an environment variable parse error.
    pub fn env_parse_error(var: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::EnvParseError {
            var: var.into(),
            reason: reason.into(),
        }
    }
}
