// src/config/options.rs
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use super::consts::*;
use crate::error::{Error, Result};

#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct AppOptions {
    pub net: NetOptions,
    pub pacing: PacingOptions,
    pub store: StoreOptions,
    pub data: DataOptions,
}

impl AppOptions {
    /// Read options from a TOML file. Missing keys fall back to defaults.
    pub fn from_toml_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
            .map_err(|e| Error::Config(format!("{}: {e}", path.display())))
    }

    pub fn from_toml_str(text: &str) -> Result<Self> {
        toml::from_str(text).map_err(|e| Error::Config(e.to_string()))
    }

    /// Explicit path must exist; otherwise try `pedigree_scrape.toml` in the
    /// working directory, then defaults.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        match explicit {
            Some(p) => Self::from_toml_file(p),
            None => {
                let p = Path::new(CONFIG_FILE);
                if p.exists() { Self::from_toml_file(p) } else { Ok(Self::default()) }
            }
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct NetOptions {
    pub race_host: String,
    pub db_host: String,
    pub user_agent: String,
    pub charset: String,
    pub timeout_secs: u64,
}

impl Default for NetOptions {
    fn default() -> Self {
        Self {
            race_host: s(RACE_HOST),
            db_host: s(DB_HOST),
            user_agent: s(USER_AGENT),
            charset: s(DEFAULT_CHARSET),
            timeout_secs: REQUEST_TIMEOUT_SECS,
        }
    }
}

impl NetOptions {
    pub fn race_card_url(&self, race_id: &str) -> String {
        format!("{}{}", self.race_host, RACE_CARD_PATH.replace("{id}", race_id))
    }

    pub fn pedigree_url(&self, profile_id: &str) -> String {
        format!("{}{}", self.db_host, PEDIGREE_PATH.replace("{id}", profile_id))
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct PacingOptions {
    /// Minimum gap between two requests to the site.
    pub entrant_ms: u64,
    /// Minimum gap between the end of one live race and the next roster request.
    pub race_ms: u64,
}

impl Default for PacingOptions {
    fn default() -> Self {
        Self { entrant_ms: ENTRANT_PAUSE_MS, race_ms: RACE_PAUSE_MS }
    }
}

impl PacingOptions {
    /// No pauses at all; for offline runs and tests.
    pub fn none() -> Self {
        Self { entrant_ms: 0, race_ms: 0 }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct StoreOptions {
    pub dir: PathBuf,
    pub cache_file: String,
    pub log_file: String,
    /// Serve cached rows when present.
    pub use_cache: bool,
}

impl Default for StoreOptions {
    fn default() -> Self {
        Self {
            dir: PathBuf::from(STORE_DIR),
            cache_file: s(CACHE_FILE),
            log_file: s(LOG_FILE),
            use_cache: true,
        }
    }
}

impl StoreOptions {
    pub fn cache_path(&self) -> PathBuf { self.dir.join(&self.cache_file) }
    pub fn log_path(&self) -> PathBuf { self.dir.join(&self.log_file) }
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct DataOptions {
    pub schedule: PathBuf,
    pub bloodlines: PathBuf,
    /// Reject pedigrees whose cell layout disagrees with the label order.
    pub strict_layout: bool,
}

impl Default for DataOptions {
    fn default() -> Self {
        Self {
            schedule: PathBuf::from(SCHEDULE_FILE),
            bloodlines: PathBuf::from(BLOODLINES_FILE),
            strict_layout: false,
        }
    }
}

fn s(v: &str) -> String { v.to_string() }

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_toml_keeps_defaults() {
        let opts = AppOptions::from_toml_str(
            r#"
            [pacing]
            entrant_ms = 500

            [data]
            strict_layout = true
            "#,
        ).unwrap();
        assert_eq!(opts.pacing.entrant_ms, 500);
        assert_eq!(opts.pacing.race_ms, RACE_PAUSE_MS);
        assert!(opts.data.strict_layout);
        assert_eq!(opts.net, NetOptions::default());
    }

    #[test]
    fn bad_toml_is_config_error() {
        let err = AppOptions::from_toml_str("[pacing]\nentrant_ms = \"fast\"").unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn urls_from_templates() {
        let net = NetOptions::default();
        assert_eq!(
            net.race_card_url("202505020811"),
            "https://race.netkeiba.com/race/shutuba.html?race_id=202505020811"
        );
        assert_eq!(net.pedigree_url("2019105219"), "https://db.netkeiba.com/horse/ped/2019105219/");
    }
}
