use crate::error::ConfigurationError;
use crate::util;
use serde::{Deserialize, Serialize};
use std::env;
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

fn default_mongodb_uri() -> String {
    env::var("MONGODB_URI").unwrap_or("mongodb://localhost:27017".to_string())
}

fn default_mongodb_db() -> String {
    env::var("MONGODB_DB_NAME").unwrap_or("tuition_center".to_string())
}

fn default_port() -> u16 {
    env::var("PORT")
        .ok()
        .and_then(|it| it.parse().ok())
        .unwrap_or(5000)
}

fn default_token_validity_hours() -> i64 {
    24 * 7
}

fn default_password_cost() -> u32 {
    10
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(skip)]
    file_path: PathBuf,

    #[serde(default = "default_mongodb_uri")]
    pub mongodb_uri: String,
    #[serde(default = "default_mongodb_db")]
    pub mongodb_db: String,

    #[serde(default = "default_port")]
    pub port: u16,

    /// How long issued auth tokens stay valid.
    #[serde(default = "default_token_validity_hours")]
    pub token_validity_hours: i64,
    /// bcrypt cost used for password hashes.
    #[serde(default = "default_password_cost")]
    pub password_cost: u32,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            file_path: config_dir().join("settings.yml"),
            mongodb_uri: default_mongodb_uri(),
            mongodb_db: default_mongodb_db(),
            port: default_port(),
            token_validity_hours: default_token_validity_hours(),
            password_cost: default_password_cost(),
        }
    }
}

#[inline]
fn config_dir() -> PathBuf {
    PathBuf::from(env::var("CONFIG_DIR").unwrap_or("./config".to_string()))
}

impl Config {
    pub fn load() -> Result<Config, ConfigurationError> {
        let config_file = util::find_first_subpath(
            config_dir(),
            &["settings.yml", "settings.yaml"],
            Path::exists,
        )
        .ok_or_else(|| ConfigurationError::NotFound(config_dir()))?;

        let file = File::open(&config_file)?;
        let mut config: Config = serde_yaml::from_reader(BufReader::new(file))?;
        config.file_path = config_file;

        Ok(config)
    }

    pub fn save(&self) -> Result<(), ConfigurationError> {
        if let Some(parent) = self.file_path.parent() {
            fs::create_dir_all(parent)?;
        }
        let file = File::create(&self.file_path)?;
        let mut out = BufWriter::new(file);
        serde_yaml::to_writer(&mut out, self)?;
        out.flush()?;
        Ok(())
    }

    pub fn token_validity(&self) -> chrono::Duration {
        chrono::Duration::hours(self.token_validity_hours.max(1))
    }

    /// bcrypt only accepts costs in `4..=31`.
    pub fn password_cost(&self) -> u32 {
        self.password_cost.clamp(4, 31)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_fields_take_defaults() {
        let config: Config = serde_yaml::from_str("mongodb_db: other").expect("valid yaml");

        assert_eq!(config.mongodb_db, "other");
        assert_eq!(config.token_validity_hours, 168);
        assert_eq!(config.password_cost, 10);
    }

    #[test]
    fn password_cost_is_clamped() {
        let mut config = Config::default();
        config.password_cost = 2;
        assert_eq!(config.password_cost(), 4);
        config.password_cost = 40;
        assert_eq!(config.password_cost(), 31);
    }
}
