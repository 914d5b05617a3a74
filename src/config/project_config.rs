use compio::fs;
use hashlink::LinkedHashMap;
use saphyr::{LoadableYamlNode, Scalar, Yaml};
use snafu::prelude::*;
use std::{
    borrow::Cow,
    io::ErrorKind,
    path::{Path, PathBuf},
};
use tracing::{debug, info};

const CONFIG_FILE_NAME: &str = "dirscribe.yaml";
const DEFAULT_STRUCTURE_FILE: &str = "directory-structure.json";
const DEFAULT_ROOTS: [&str; 3] = ["frontend", "backend", "shared"];

fn get_config_file_path(root: &Path) -> PathBuf {
    root.join(CONFIG_FILE_NAME)
}

fn key(name: &'static str) -> Yaml<'static> {
    Yaml::Value(Scalar::String(Cow::Borrowed(name)))
}

/// Project level settings read from `dirscribe.yaml`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectConfig {
    /// Location of the structure document, relative to the project root.
    pub structure_file: PathBuf,
    /// Top-level folders of a freshly initialized document.
    pub roots: Vec<String>,
    pub normalize_folder_names: bool,
}

impl Default for ProjectConfig {
    fn default() -> Self {
        Self {
            structure_file: PathBuf::from(DEFAULT_STRUCTURE_FILE),
            roots: DEFAULT_ROOTS.iter().map(|root| root.to_string()).collect(),
            normalize_folder_names: true,
        }
    }
}

impl ProjectConfig {
    /// Reads `dirscribe.yaml` from `root`, falling back to defaults when the
    /// file does not exist.
    pub async fn read(root: &Path) -> Result<Self, ConfigError> {
        Self::from_path(get_config_file_path(root)).await
    }

    pub async fn from_path(path: PathBuf) -> Result<Self, ConfigError> {
        debug!("Opening config file: {}", path.display());
        let bytes = match fs::read(&path).await {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == ErrorKind::NotFound => {
                info!("No config file found at {}, using defaults", path.display());
                return Ok(Self::default());
            }
            Err(err) => {
                return Err(err).context(ReadSnafu {
                    file_path: path.display().to_string(),
                });
            }
        };
        debug!("Successfully read config file: {} bytes", bytes.len());

        let contents = String::from_utf8(bytes).context(EncodingSnafu {
            file_path: path.display().to_string(),
        })?;
        contents.as_str().try_into()
    }

    /// Absolute location of the structure document for a project at `root`.
    pub fn structure_path(&self, root: &Path) -> PathBuf {
        root.join(&self.structure_file)
    }

    fn parse_roots(top_level: &LinkedHashMap<Yaml, Yaml>) -> Result<Vec<String>, ConfigError> {
        let Some(roots) = top_level.get(&key("roots")) else {
            return Ok(Self::default().roots);
        };
        let roots = roots
            .as_sequence()
            .ok_or(ConfigError::RootsNotSequence)?
            .iter()
            .filter_map(|item| {
                let root = item.as_str().map(str::to_string);
                if root.is_none() {
                    debug!("Skipping non-string root entry: {:?}", item);
                }
                root
            })
            .collect();
        Ok(roots)
    }
}

impl TryFrom<&str> for ProjectConfig {
    type Error = ConfigError;

    fn try_from(contents: &str) -> Result<Self, Self::Error> {
        let contents_vec = Yaml::load_from_str(contents)
            .map_err(|e| ConfigError::ParseError { source: e })?;
        let Some(contents) = contents_vec.first() else {
            // An empty file configures nothing.
            return Ok(Self::default());
        };

        let top_level = contents
            .as_mapping()
            .ok_or(ConfigError::TopLevelNotMap)?;

        let defaults = Self::default();
        let structure_file = match top_level.get(&key("structure")) {
            Some(value) => value
                .as_str()
                .map(PathBuf::from)
                .ok_or(ConfigError::MalformedConfig)?,
            None => defaults.structure_file,
        };
        let normalize_folder_names = match top_level.get(&key("normalize_folder_names")) {
            Some(value) => value.as_bool().ok_or(ConfigError::MalformedConfig)?,
            None => defaults.normalize_folder_names,
        };
        let roots = Self::parse_roots(top_level)?;

        Ok(ProjectConfig {
            structure_file,
            roots,
            normalize_folder_names,
        })
    }
}

#[derive(Debug, Snafu)]
pub enum ConfigError {
    #[snafu(display("Failed to read the config file: {}", file_path))]
    ReadError {
        file_path: String,
        source: std::io::Error,
    },
    #[snafu(display("Config file {} is not valid UTF-8", file_path))]
    EncodingError {
        file_path: String,
        source: std::string::FromUtf8Error,
    },
    #[snafu(display("Failed to parse the config file"))]
    ParseError { source: saphyr::ScanError },
    #[snafu(display("Improperly formatted config file"))]
    MalformedConfig,
    #[snafu(display("Top level of config should be a map"))]
    TopLevelNotMap,
    #[snafu(display("Roots section should be a list"))]
    RootsNotSequence,
}
