use anyhow::{Context, Result};
use log::info;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// File name of the YAML config inside the data directory
pub const CONFIG_FILE_NAME: &str = "shelter_config.yaml";

/// Longest reminder horizon accepted, about a century
pub const MAX_HORIZON_DAYS: i64 = 36_500;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Database file name, relative to the data directory unless absolute
    pub database_file: String,

    /// How many days ahead health reminders look
    pub reminder_horizon_days: i64,

    /// Reminders due within this many days are flagged as soon
    pub soon_threshold_days: i64,

    /// Where exports go when no explicit output path is given
    pub export_directory: Option<PathBuf>,

    pub pdf: PdfConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PdfConfig {
    /// Command or path of the wkhtmltopdf binary
    pub wkhtmltopdf_path: String,

    /// Directory holding the TTF files for the built-in renderer
    pub fonts_dir: PathBuf,

    /// Family prefix, e.g. `LiberationSans` for `LiberationSans-Regular.ttf`
    pub font_family: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            database_file: "shelter.db".to_string(),
            reminder_horizon_days: 30,
            soon_threshold_days: 7,
            export_directory: None,
            pdf: PdfConfig::default(),
        }
    }
}

impl Default for PdfConfig {
    fn default() -> Self {
        Self {
            wkhtmltopdf_path: "wkhtmltopdf".to_string(),
            fonts_dir: PathBuf::from("/usr/share/fonts/truetype/liberation"),
            font_family: "LiberationSans".to_string(),
        }
    }
}

impl AppConfig {
    /// Default data directory: `<platform data dir>/Shelter Records`
    pub fn default_data_dir() -> PathBuf {
        dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("Shelter Records")
    }

    /// Load the config from `data_dir`, writing the defaults on first run
    pub fn load_or_create(data_dir: &Path) -> Result<Self> {
        let path = data_dir.join(CONFIG_FILE_NAME);

        if path.exists() {
            info!("Loading config from: {}", path.display());
            return Self::load_from_path(&path);
        }

        info!("No config file found, writing defaults to {}", path.display());
        let config = Self::default();
        config.save_to_path(&path)?;
        Ok(config)
    }

    pub fn load_from_path(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Self = serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        config.validate()?;
        Ok(config)
    }

    pub fn save_to_path(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let yaml_content = serde_yaml::to_string(self)?;

        // Atomic write using temp file
        let temp_path = path.with_extension("tmp");
        fs::write(&temp_path, yaml_content)?;
        fs::rename(&temp_path, path)?;

        info!("Config saved to: {}", path.display());
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if self.database_file.trim().is_empty() {
            anyhow::bail!("database_file cannot be empty");
        }
        if !(0..=MAX_HORIZON_DAYS).contains(&self.reminder_horizon_days) {
            anyhow::bail!("reminder_horizon_days must be between 0 and {}", MAX_HORIZON_DAYS);
        }
        if self.soon_threshold_days < 0 {
            anyhow::bail!("soon_threshold_days must be >= 0");
        }
        Ok(())
    }

    /// Absolute path of the database file
    pub fn database_path(&self, data_dir: &Path) -> PathBuf {
        let file = Path::new(&self.database_file);
        if file.is_absolute() {
            file.to_path_buf()
        } else {
            data_dir.join(file)
        }
    }

    /// Directory for exports without an explicit path
    pub fn export_dir(&self, data_dir: &Path) -> PathBuf {
        self.export_directory
            .clone()
            .unwrap_or_else(|| data_dir.join("exports"))
    }
}
