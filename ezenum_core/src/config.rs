use crate::error::{EzenumError, Result};
use serde::{Deserialize, Serialize};
use std::{
    env, fs,
    path::{Path, PathBuf},
};
use tracing::{debug, info, trace, warn};

/// Name of the configuration file searched for in the working directory
/// and its ancestors.
pub const CONFIG_FILE_NAME: &str = "ezenum.toml";

/// Marker token that opts a type into generation.
pub const DEFAULT_MARKER: &str = "EZENUM";

/// Appended to the source file's base name (without `.go`).
pub const DEFAULT_GENERATED_SUFFIX: &str = "_ezenum_gen.go";

/// Commented configuration written by `ezenum init`.
pub const DEFAULT_CONFIG_TEMPLATE: &str = r#"# ezenum configuration

[general]
# Directory scanned for .go files, relative to this file.
# ${VAR} and ${VAR:-default} are expanded from the environment.
root = "."
# Token that opts a type into generation when it appears in the type's comment.
marker = "EZENUM"

[scan]
# Directory names skipped while walking (e.g. ["vendor", ".git"]).
exclude = []
# How an untyped constant with an integer literal value is attributed:
#   "group" - to the type of the preceding typed constant in the same const (...) block
#   "file"  - to every marked type in the file
literal_inference = "group"
# Process files in parallel.
parallel = false

[output]
# Generated file name is <source name without .go><suffix>.
suffix = "_ezenum_gen.go"
"#;

/// How constants without a type annotation but with an integer literal value
/// are attributed to marked types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LiteralInference {
    /// The type of the nearest preceding explicitly typed spec in the same
    /// `const (...)` group.
    #[default]
    Group,
    /// Every marked type declared in the file.
    File,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct GeneralConfig {
    /// Directory to scan
    #[serde(default = "default_root")]
    pub root: String,
    /// Marker token looked for in type comments
    #[serde(default = "default_marker")]
    pub marker: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            root: default_root(),
            marker: default_marker(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct ScanConfig {
    /// Directory names that are not descended into
    #[serde(default)]
    pub exclude: Vec<String>,
    #[serde(default)]
    pub literal_inference: LiteralInference,
    /// Process files on the rayon thread pool
    #[serde(default)]
    pub parallel: bool,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct OutputConfig {
    /// Suffix of generated files
    #[serde(default = "default_suffix")]
    pub suffix: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            suffix: default_suffix(),
        }
    }
}

fn default_root() -> String {
    ".".to_string()
}

fn default_marker() -> String {
    DEFAULT_MARKER.to_string()
}

fn default_suffix() -> String {
    DEFAULT_GENERATED_SUFFIX.to_string()
}

/// Configuration for a generation run.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct EzenumConfig {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub scan: ScanConfig,
    #[serde(default)]
    pub output: OutputConfig,
    /// Directory of the file this configuration was read from. Relative
    /// roots are resolved against it.
    #[serde(skip)]
    pub base_dir: Option<PathBuf>,
}

impl EzenumConfig {
    /// Loads configuration from `explicit` when given, otherwise searches
    /// for `ezenum.toml` from the current directory upward. Without a file
    /// the defaults apply.
    pub fn load(explicit: Option<&Path>) -> Result<EzenumConfig> {
        if let Some(path) = explicit {
            info!("Loading ezenum configuration from {:?}", path);
            return Self::from_toml_path(path);
        }

        let current_dir = env::current_dir()?;
        match Self::find_config_file(&current_dir) {
            Some(path) => {
                info!("Found configuration file at: {:?}", path);
                Self::from_toml_path(&path)
            }
            None => {
                debug!("No {} found, using defaults", CONFIG_FILE_NAME);
                Ok(Self::default())
            }
        }
    }

    /// Loads configuration from a specific file.
    pub fn from_toml_path(path: impl AsRef<Path>) -> Result<EzenumConfig> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|source| EzenumError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        debug!("Configuration file size: {} bytes", contents.len());

        Self::parse_toml(&contents, path)
    }

    /// Searches for `ezenum.toml` starting from `start` and traversing up to
    /// the root.
    pub fn find_config_file(start: &Path) -> Option<PathBuf> {
        debug!("Starting config file search from: {:?}", start);
        start.ancestors().find_map(|dir| {
            let candidate = dir.join(CONFIG_FILE_NAME);
            trace!("Checking for config at: {:?}", candidate);
            candidate.is_file().then_some(candidate)
        })
    }

    fn parse_toml(contents: &str, path: &Path) -> Result<EzenumConfig> {
        let mut config: EzenumConfig = toml::from_str(contents)?;
        config.general.root = Self::substitute_env_vars(&config.general.root)?;
        config.base_dir = path.parent().map(Path::to_path_buf);
        config.validate()?;

        debug!(
            "Configuration: root={}, marker={}, suffix={}, inference={:?}, parallel={}",
            config.general.root,
            config.general.marker,
            config.output.suffix,
            config.scan.literal_inference,
            config.scan.parallel
        );
        Ok(config)
    }

    /// Checks values that would make generation misbehave.
    pub fn validate(&self) -> Result<()> {
        if self.general.marker.trim().is_empty() {
            return Err(EzenumError::config("general.marker must not be empty"));
        }
        let suffix = &self.output.suffix;
        if !suffix.ends_with(crate::golang::GO_SOURCE_SUFFIX) || suffix == crate::golang::GO_SOURCE_SUFFIX
        {
            return Err(EzenumError::config(format!(
                "output.suffix must end with .go and add something before it, got {suffix:?}"
            )));
        }
        if suffix.contains(['/', '\\']) {
            return Err(EzenumError::config(format!(
                "output.suffix must not contain path separators, got {suffix:?}"
            )));
        }
        Ok(())
    }

    /// The directory to scan, resolved against the configuration file's directory.
    pub fn root_path(&self) -> PathBuf {
        let root = PathBuf::from(&self.general.root);
        match &self.base_dir {
            Some(base) if root.is_relative() => base.join(root),
            _ => root,
        }
    }

    /// Substitute environment variables in config strings.
    /// Supports `${VAR_NAME:-default}` syntax.
    fn substitute_env_vars(value: &str) -> Result<String> {
        trace!("Substituting environment variables in: {}", value);
        let re = regex::Regex::new(r"\$\{([^}:]+)(?::-([^}]*))?\}")?;
        let mut result = value.to_string();

        for cap in re.captures_iter(value) {
            let var_name = &cap[1];
            let replacement = match (env::var(var_name), cap.get(2)) {
                (Ok(val), _) => val,
                (Err(_), Some(default)) => {
                    warn!(
                        "Environment variable {} not set, using default: {}",
                        var_name,
                        default.as_str()
                    );
                    default.as_str().to_string()
                }
                (Err(_), None) => return Err(EzenumError::EnvVarNotSet(var_name.to_string())),
            };
            result = result.replace(&cap[0], &replacement);
        }

        Ok(result)
    }

    /// Creates a builder for programmatic configuration.
    pub fn builder() -> EzenumConfigBuilder {
        EzenumConfigBuilder::new()
    }
}

/// Builder for creating EzenumConfig programmatically.
#[derive(Debug, Clone, Default)]
pub struct EzenumConfigBuilder {
    config: EzenumConfig,
}

impl EzenumConfigBuilder {
    pub fn new() -> Self {
        Self {
            config: EzenumConfig::default(),
        }
    }

    /// Starts from an already loaded configuration.
    pub fn from_config(config: EzenumConfig) -> Self {
        Self { config }
    }

    /// Sets the directory to scan. Relative paths are taken as they are,
    /// not against the configuration file.
    pub fn root(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.general.root = path.into().to_string_lossy().into_owned();
        self.config.base_dir = None;
        self
    }

    pub fn marker(mut self, marker: impl Into<String>) -> Self {
        self.config.general.marker = marker.into();
        self
    }

    pub fn suffix(mut self, suffix: impl Into<String>) -> Self {
        self.config.output.suffix = suffix.into();
        self
    }

    /// Adds a directory name to skip.
    pub fn exclude(mut self, dir_name: impl Into<String>) -> Self {
        self.config.scan.exclude.push(dir_name.into());
        self
    }

    pub fn literal_inference(mut self, inference: LiteralInference) -> Self {
        self.config.scan.literal_inference = inference;
        self
    }

    pub fn parallel(mut self, parallel: bool) -> Self {
        self.config.scan.parallel = parallel;
        self
    }

    pub fn build(self) -> EzenumConfig {
        self.config
    }
}
