use crate::error::{ForkfetchError, Result};
use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

/// GraphQL connections accept `first` between 1 and 100.
const MAX_PAGE_SIZE: u32 = 100;

#[derive(Clone, Serialize, Deserialize)]
pub struct Config {
    pub github_token: Option<String>,
    pub jobs: usize,
    pub dry_run: bool,
    pub classroom: bool,
    pub base_dir: PathBuf,
    pub page_size: u32,
    pub write_mrconfig: bool,
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("github_token", &self.github_token.as_ref().map(|_| "[REDACTED]"))
            .field("jobs", &self.jobs)
            .field("dry_run", &self.dry_run)
            .field("classroom", &self.classroom)
            .field("base_dir", &self.base_dir)
            .field("page_size", &self.page_size)
            .field("write_mrconfig", &self.write_mrconfig)
            .finish()
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            github_token: None,
            jobs: 8,
            dry_run: false,
            classroom: false,
            base_dir: PathBuf::from("."),
            page_size: 20,
            write_mrconfig: true,
        }
    }
}

/// Values given on the command line. `None`/`false` leaves the layered value alone.
#[derive(Debug, Default, Clone)]
pub struct Overrides {
    pub jobs: Option<usize>,
    pub dry_run: bool,
    pub classroom: bool,
    pub base_dir: Option<PathBuf>,
    pub no_mrconfig: bool,
}

impl Config {
    pub fn load(overrides: Overrides) -> Result<Self> {
        let config_file = config_dir().join("forkfetch").join("config.toml");
        Self::load_from(&config_file, overrides)
    }

    fn load_from(config_file: &Path, overrides: Overrides) -> Result<Self> {
        let mut figment = Figment::from(Serialized::defaults(Config::default()));

        if config_file.exists() {
            figment = figment.merge(Toml::file(config_file));
        }

        figment = figment.merge(Env::prefixed("FORKFETCH_")).merge(
            Env::raw()
                .only(&["GITHUB_TOKEN"])
                .map(|_| "github_token".into()),
        );

        if let Some(jobs) = overrides.jobs {
            figment = figment.merge(Serialized::default("jobs", jobs));
        }
        if overrides.dry_run {
            figment = figment.merge(Serialized::default("dry_run", true));
        }
        if overrides.classroom {
            figment = figment.merge(Serialized::default("classroom", true));
        }
        if let Some(dir) = overrides.base_dir {
            figment = figment.merge(Serialized::default("base_dir", dir));
        }
        if overrides.no_mrconfig {
            figment = figment.merge(Serialized::default("write_mrconfig", false));
        }

        figment
            .extract()
            .map_err(|e| ForkfetchError::Config(e.to_string()))
    }

    pub fn require_token(&self) -> Result<&str> {
        match self.github_token.as_deref() {
            Some(token) if !token.is_empty() => Ok(token),
            _ => Err(ForkfetchError::MissingToken),
        }
    }

    /// A zero-capacity admission gate would never admit anything.
    pub fn effective_jobs(&self) -> usize {
        if self.jobs == 0 {
            tracing::warn!("jobs must be at least 1, using 1");
            1
        } else {
            self.jobs
        }
    }

    pub fn effective_page_size(&self) -> u32 {
        self.page_size.clamp(1, MAX_PAGE_SIZE)
    }
}

pub fn config_dir() -> PathBuf {
    std::env::var("XDG_CONFIG_HOME")
        .ok()
        .map(PathBuf::from)
        .or_else(|| {
            std::env::var("HOME")
                .ok()
                .map(|h| PathBuf::from(h).join(".config"))
        })
        .unwrap_or_else(|| PathBuf::from("."))
}
