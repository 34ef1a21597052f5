//! Optional JSON configuration file. Command-line flags override it.
//!
//! ```json
//! {
//!   "use_json_tags": true,
//!   "require": "validate=required",
//!   "scalars": { "int64": { "name": "Int64", "opaque": true } }
//! }
//! ```
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use serde::de::DeserializeOwned;
use thiserror::Error;

use crate::render::{RenderOptions, RequireTag, RequireTagFormatError};
use crate::scalars::{ScalarError, ScalarMapping, ScalarTable};

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub use_json_tags: bool,
    pub custom_tag: Option<String>,
    pub ignore_value: Option<String>,
    /// `key=value`
    pub require: Option<String>,
    /// basic kind name → scalar
    pub scalars: BTreeMap<String, ScalarMapping>,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config at {path}: {message}")]
    Parse { path: String, message: String },
    #[error(transparent)]
    Require(#[from] RequireTagFormatError),
    #[error(transparent)]
    Scalar(#[from] ScalarError),
}

impl Config {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let src = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        tracing::debug!(config = %path.display(), "loaded");
        Self::from_json(&src)
    }

    pub fn from_json(src: &str) -> Result<Self, ConfigError> {
        from_str_with_path(src)
    }

    pub fn render_options(&self) -> Result<RenderOptions, ConfigError> {
        let require = self.require.as_deref().map(str::parse::<RequireTag>).transpose()?;
        Ok(RenderOptions {
            use_json_tags: self.use_json_tags,
            custom_tag: self.custom_tag.clone(),
            ignore_value: self.ignore_value.clone(),
            require,
        })
    }

    pub fn scalar_table(&self) -> Result<ScalarTable, ConfigError> {
        Ok(ScalarTable::with_overrides(&self.scalars)?)
    }
}

/// Deserialize with JSON-path context in error messages.
fn from_str_with_path<T: DeserializeOwned>(src: &str) -> Result<T, ConfigError> {
    let de = &mut serde_json::Deserializer::from_str(src);
    serde_path_to_error::deserialize::<_, T>(de).map_err(|err| ConfigError::Parse {
        path: err.path().to_string(),
        message: err.into_inner().to_string(),
    })
}

// ------------------------------- Tests ------------------------------------ //
