use std::path::{Path, PathBuf};

use config::{Config, ConfigError, Environment, File, FileFormat};
use serde::Deserialize;

pub const CONFIG_FILE: &str = "ptxdoc.toml";
const ENV_PREFIX: &str = "PTXDOC";

/// Run settings: built-in defaults, then `ptxdoc.toml`, then `PTXDOC_*`
/// environment variables. Command-line flags override all three.
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub document: PathBuf,
    pub output_dir: PathBuf,
    #[serde(default)]
    pub roster_file: Option<PathBuf>,
    pub jobs: usize,
}

impl Settings {
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(Path::new(CONFIG_FILE))
    }

    pub fn load_from(file: &Path) -> Result<Self, ConfigError> {
        Config::builder()
            .set_default("document", "doc.html")?
            .set_default("output_dir", "docs/instructions")?
            .set_default("jobs", 0)?
            .add_source(File::new(&file.to_string_lossy(), FileFormat::Toml).required(false))
            .add_source(Environment::with_prefix(ENV_PREFIX).try_parsing(true))
            .build()?
            .try_deserialize()
    }
}
