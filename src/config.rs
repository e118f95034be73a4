use std::{
    fs,
    path::{Path, PathBuf},
    time::Duration,
};

use serde::{Deserialize, Serialize};

use crate::{
    error::{Error, Result},
    link::SchemeMatch,
    scan::{AfterVisit, SessionOptions},
};

/// Settings loaded from `~/.config/plainqr/config.toml`. Every key is
/// optional.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// "exact" accepts only http and https, "prefix" any scheme starting with http.
    pub scheme_match: SchemeMatch,
    /// "resume" keeps scanning after a link is opened, "stop" ends the session.
    pub after_visit: AfterVisit,
    /// Browser command for opening links; empty uses the platform default.
    pub browser: String,
    /// Decisions closer together than this are ignored.
    pub decision_cooldown_ms: u64,
    /// Ring the terminal bell when a link is presented.
    pub bell: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            scheme_match: SchemeMatch::Exact,
            after_visit: AfterVisit::Resume,
            browser: String::new(),
            decision_cooldown_ms: 200,
            bell: true,
        }
    }
}

impl Config {
    pub fn session_options(&self) -> SessionOptions {
        SessionOptions {
            scheme_match: self.scheme_match,
            decision_cooldown: Duration::from_millis(self.decision_cooldown_ms),
            after_visit: self.after_visit,
            once: false,
        }
    }

    pub fn browser(&self) -> Option<String> {
        Some(self.browser.clone()).filter(|b| !b.trim().is_empty())
    }
}

pub fn config_path() -> Result<PathBuf> {
    let dir = dirs::config_dir().ok_or(Error::NoBaseDir("config"))?;
    Ok(dir.join("plainqr").join("config.toml"))
}

pub fn parse(text: &str, path: &Path) -> Result<Config> {
    toml::from_str(text).map_err(|source| Error::ConfigInvalid { path: path.to_path_buf(), source })
}

/// Loads an explicitly requested config file, which has to exist.
pub fn load(path: &Path) -> Result<Config> {
    if !path.exists() {
        return Err(Error::ConfigNotFound { path: path.to_path_buf() });
    }
    parse(&fs::read_to_string(path)?, path)
}

/// Loads configuration from disk, writing a default file if none exists.
pub fn load_or_init(path: &Path) -> Result<Config> {
    if !path.exists() {
        let cfg = Config::default();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, toml::to_string_pretty(&cfg)?)?;
        tracing::info!("Created default config at {}", path.display());
        return Ok(cfg);
    }
    load(path)
}
