use super::{ display_path, expand_home, ConfigError };
use ::config::{ Config, File, FileFormat };
use log::debug;
use std::collections::HashMap;
use std::fs;
use std::path::{ Path, PathBuf };

const DEFAULT_SECTION: &str = "DEFAULT";

/// API signing credentials for one profile of an OCI config file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OciProfile {
    pub name: String,
    pub user: String,
    pub fingerprint: String,
    pub tenancy: String,
    pub region: Option<String>,
    pub key_file: PathBuf,
    pub pass_phrase: Option<String>,
}

impl OciProfile {
    /// Key identifier used in the `keyId` field of request signatures.
    pub fn key_id(&self) -> String {
        format!("{}/{}/{}", self.tenancy, self.user, self.fingerprint)
    }
}

pub fn load_profile(path: &Path, profile: &str) -> Result<OciProfile, ConfigError> {
    let path_display = display_path(path);
    if !path.exists() {
        return Err(ConfigError::FileNotFound(path_display));
    }
    let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path_display.clone(),
        source,
    })?;
    debug!("Loaded OCI config from {}", path_display);
    parse_profile(&content, &path_display, profile)
}

type Sections = HashMap<String, HashMap<String, String>>;

pub fn parse_profile(content: &str, path: &str, profile: &str) -> Result<OciProfile, ConfigError> {
    let sections = parse_sections(content, path)?;

    let defaults = section(&sections, DEFAULT_SECTION);
    let selected = section(&sections, profile);
    if selected.is_none() && !profile.eq_ignore_ascii_case(DEFAULT_SECTION) {
        return Err(ConfigError::ProfileNotFound {
            path: path.to_string(),
            profile: profile.to_string(),
        });
    }

    let lookup = |key: &str| -> Option<String> {
        selected
            .and_then(|s| entry(s, key))
            .or_else(|| defaults.and_then(|s| entry(s, key)))
            .filter(|v| !v.is_empty())
            .map(str::to_owned)
    };
    let required = |key: &str| -> Result<String, ConfigError> {
        lookup(key).ok_or_else(|| ConfigError::MissingKey {
            path: path.to_string(),
            profile: profile.to_string(),
            key: key.to_string(),
        })
    };

    Ok(OciProfile {
        name: profile.to_string(),
        user: required("user")?,
        fingerprint: required("fingerprint")?,
        tenancy: required("tenancy")?,
        key_file: expand_home(&required("key_file")?),
        region: lookup("region"),
        pass_phrase: lookup("pass_phrase"),
    })
}

/// Every key must live under a `[PROFILE]` header; anything else is malformed.
fn parse_sections(content: &str, path: &str) -> Result<Sections, ConfigError> {
    let malformed = |source| ConfigError::Malformed {
        path: path.to_string(),
        source,
    };
    Config::builder()
        .add_source(File::from_str(content, FileFormat::Ini))
        .build()
        .map_err(malformed)?
        .try_deserialize::<Sections>()
        .map_err(malformed)
}

// Section and key names are matched case-insensitively.
fn section<'a>(sections: &'a Sections, name: &str) -> Option<&'a HashMap<String, String>> {
    sections
        .iter()
        .find(|(k, _)| k.eq_ignore_ascii_case(name))
        .map(|(_, v)| v)
}

fn entry<'a>(section: &'a HashMap<String, String>, key: &str) -> Option<&'a str> {
    section
        .iter()
        .find(|(k, _)| k.eq_ignore_ascii_case(key))
        .map(|(_, v)| v.as_str())
}
