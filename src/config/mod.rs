pub mod oci;
pub mod prompt;

use crate::cli::Args;
use std::path::{ Path, PathBuf };
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use url::Url;

use self::oci::OciProfile;
use self::prompt::PromptConfig;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("OCI_COMPARTMENT_ID is not set")]
    MissingCompartment,

    #[error("OCI config file not found at '{0}'")]
    FileNotFound(String),

    #[error("failed to read '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("profile [{profile}] not found in '{path}'")]
    ProfileNotFound {
        path: String,
        profile: String,
    },

    #[error("profile [{profile}] in '{path}' is missing required key '{key}'")]
    MissingKey {
        path: String,
        profile: String,
        key: String,
    },

    #[error("malformed OCI config '{path}': {source}")]
    Malformed {
        path: String,
        #[source]
        source: ::config::ConfigError,
    },

    #[error("invalid service endpoint '{endpoint}': {source}")]
    Endpoint {
        endpoint: String,
        #[source]
        source: url::ParseError,
    },

    #[error("failed to parse prompts file '{path}': {source}")]
    Prompts {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Process-wide settings, resolved once at startup and shared read-only.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub oci_config_file: PathBuf,
    pub oci_profile: String,
    pub compartment_id: String,
    pub service_endpoint: Url,
    pub text_model_id: String,
    pub vision_model_id: String,
    pub frontend_origin: String,
    pub connect_timeout: Duration,
    pub read_timeout: Duration,
    pub max_upload_bytes: usize,
    pub prompts: Arc<PromptConfig>,
}

impl AppConfig {
    pub fn from_args(args: &Args) -> Result<Self, ConfigError> {
        let compartment_id = args.oci_compartment_id
            .as_deref()
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .ok_or(ConfigError::MissingCompartment)?
            .to_string();

        let service_endpoint = Url::parse(&args.oci_service_endpoint).map_err(|source| {
            ConfigError::Endpoint {
                endpoint: args.oci_service_endpoint.clone(),
                source,
            }
        })?;

        let prompts = match &args.prompts_path {
            Some(path) if !path.trim().is_empty() => prompt::load_prompts(path)?,
            _ => Arc::new(PromptConfig::default()),
        };

        Ok(Self {
            oci_config_file: expand_home(&args.oci_config_file),
            oci_profile: args.oci_config_profile.clone(),
            compartment_id,
            service_endpoint,
            text_model_id: args.oci_model_id.clone(),
            vision_model_id: args.oci_vision_model_id.clone(),
            frontend_origin: args.frontend_origin.clone(),
            connect_timeout: Duration::from_secs(args.connect_timeout_secs),
            read_timeout: Duration::from_secs(args.read_timeout_secs),
            max_upload_bytes: args.max_upload_bytes,
            prompts,
        })
    }

    /// Reads the configured credential profile from disk.
    pub fn load_profile(&self) -> Result<OciProfile, ConfigError> {
        oci::load_profile(&self.oci_config_file, &self.oci_profile)
    }
}

/// Expands a leading `~` to the user's home directory.
pub fn expand_home(path: &str) -> PathBuf {
    let rest = match path.strip_prefix('~') {
        Some(rest) if rest.is_empty() || rest.starts_with('/') || rest.starts_with('\\') => rest,
        _ => return PathBuf::from(path),
    };
    let home = std::env::var_os("HOME").or_else(|| std::env::var_os("USERPROFILE"));
    match home {
        Some(home) => {
            let mut expanded = PathBuf::from(home);
            let trimmed = rest.trim_start_matches(['/', '\\']);
            if !trimmed.is_empty() {
                expanded.push(trimmed);
            }
            expanded
        }
        None => PathBuf::from(path),
    }
}

pub(crate) fn display_path(path: &Path) -> String {
    path.display().to_string()
}
