use std::env;
use std::path::PathBuf;

use anyhow::{Context, Result, bail};

use crate::encoder::OutputFormat;
use crate::filters::DEFAULT_MAX_HOURS;

pub const DEFAULT_WEBAPP_URL: &str = "https://app.productive.io";
pub const DEFAULT_ITEMS_PER_PAGE: u32 = 50;
pub const MAX_ITEMS_PER_PAGE: u32 = 200;

/// Process-wide settings, read once at startup
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Organization slug used in web app links, e.g. `27956-lineout`
    pub organization: String,
    pub webapp_url: String,
    pub output_format: OutputFormat,
    pub items_per_page: u32,
    pub max_hours: u32,
    /// Directory of captured payloads served by the fixture fetcher
    pub fixtures: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            organization: String::new(),
            webapp_url: DEFAULT_WEBAPP_URL.to_string(),
            output_format: OutputFormat::default(),
            items_per_page: DEFAULT_ITEMS_PER_PAGE,
            max_hours: DEFAULT_MAX_HOURS,
            fixtures: None,
        }
    }
}

impl Config {
    /// Read settings from the process environment
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Read settings through `lookup`, which maps a variable name to its value
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let read = |name: &str| lookup(name).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let organization = read("PRODUCTIVE_ORGANIZATION")
            .context("PRODUCTIVE_ORGANIZATION environment variable not set")?;

        let mut config = Config { organization, ..Config::default() };

        if let Some(url) = read("PRODUCTIVE_WEBAPP_URL") {
            config.webapp_url = url;
        }
        if let Some(format) = read("OUTPUT_FORMAT") {
            config.output_format = format
                .parse()
                .map_err(anyhow::Error::msg)
                .context("Invalid OUTPUT_FORMAT")?;
        }
        if let Some(size) = read("PRODUCTIVE_ITEMS_PER_PAGE") {
            config.items_per_page = size
                .parse()
                .with_context(|| format!("Invalid PRODUCTIVE_ITEMS_PER_PAGE: {}", size))?;
        }
        if let Some(hours) = read("PRODUCTIVE_MAX_HOURS") {
            config.max_hours = hours
                .parse()
                .with_context(|| format!("Invalid PRODUCTIVE_MAX_HOURS: {}", hours))?;
        }
        config.fixtures = read("PRODUCTIVE_FIXTURES").map(PathBuf::from);

        config.validate()?;
        Ok(config)
    }

    /// Reject settings that would produce broken links or requests
    pub fn validate(&self) -> Result<()> {
        if self.organization.trim().is_empty() {
            bail!("Organization must not be empty");
        }
        if !self.webapp_url.starts_with("http://") && !self.webapp_url.starts_with("https://") {
            bail!("Web app URL must start with http:// or https://, got '{}'", self.webapp_url);
        }
        if self.items_per_page == 0 || self.items_per_page > MAX_ITEMS_PER_PAGE {
            bail!(
                "Items per page must be between 1 and {}, got {}",
                MAX_ITEMS_PER_PAGE,
                self.items_per_page
            );
        }
        if self.max_hours == 0 {
            bail!("Maximum window must be at least one hour");
        }
        Ok(())
    }
}
