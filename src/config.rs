//! CLI configuration parsed from environment variables.
//!
//! Flags given on the command line override these values; see
//! [`CliConfig::with_overrides`].

use tracing::level_filters::LevelFilter;

use topology::options::{DEFAULT_FONT, DEFAULT_GRAPH_NAME};
use topology::{RankDir, RenderOptions};

pub const DEFAULT_LOG_LEVEL: LevelFilter = LevelFilter::INFO;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("config parse error: {0}")]
    Parse(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CliConfig {
    pub graph_name: String,
    pub rankdir: RankDir,
    pub font: String,
    pub include_ports: bool,
    pub log_level: LevelFilter,
}

/// Command-line values that take precedence over the environment.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub graph_name: Option<String>,
    pub rankdir: Option<RankDir>,
    pub font: Option<String>,
    pub no_ports: bool,
    pub verbose: u8,
}

impl CliConfig {
    /// Build typed CLI config from environment variables.
    ///
    /// Optional:
    /// - `TOPODOT_GRAPH_NAME`: name after `digraph` (default `topology`)
    /// - `TOPODOT_RANKDIR`: `TB` (default), `LR`, `BT` or `RL`
    /// - `TOPODOT_FONT`: font for graph, nodes and edges (default `Helvetica`)
    /// - `TOPODOT_LOG_LEVEL`: `off`, `error`, `warn`, `info` (default), `debug`, `trace`
    pub fn from_env() -> Result<Self, ConfigError> {
        let graph_name = env_non_empty("TOPODOT_GRAPH_NAME").unwrap_or_else(|| DEFAULT_GRAPH_NAME.to_string());
        let rankdir = parse_rankdir(env_non_empty("TOPODOT_RANKDIR").as_deref())?;
        let font = env_non_empty("TOPODOT_FONT").unwrap_or_else(|| DEFAULT_FONT.to_string());
        let log_level = parse_log_level(env_non_empty("TOPODOT_LOG_LEVEL").as_deref())?;

        Ok(Self { graph_name, rankdir, font, include_ports: true, log_level })
    }

    #[must_use]
    pub fn with_overrides(mut self, overrides: Overrides) -> Self {
        if let Some(graph_name) = overrides.graph_name {
            self.graph_name = graph_name;
        }
        if let Some(rankdir) = overrides.rankdir {
            self.rankdir = rankdir;
        }
        if let Some(font) = overrides.font {
            self.font = font;
        }
        if overrides.no_ports {
            self.include_ports = false;
        }
        self.log_level = match overrides.verbose {
            0 => self.log_level,
            1 => LevelFilter::DEBUG,
            _ => LevelFilter::TRACE,
        };
        self
    }

    #[must_use]
    pub fn render_options(&self) -> RenderOptions {
        RenderOptions {
            graph_name: self.graph_name.clone(),
            rankdir: self.rankdir,
            font: self.font.clone(),
            include_ports: self.include_ports,
        }
    }
}

fn env_non_empty(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn parse_rankdir(raw: Option<&str>) -> Result<RankDir, ConfigError> {
    raw.map_or(Ok(RankDir::default()), |raw| {
        raw.parse().map_err(|e| ConfigError::Parse(format!("TOPODOT_RANKDIR: {e}")))
    })
}

fn parse_log_level(raw: Option<&str>) -> Result<LevelFilter, ConfigError> {
    raw.map_or(Ok(DEFAULT_LOG_LEVEL), |raw| {
        raw.trim()
            .parse()
            .map_err(|_| ConfigError::Parse(format!("unknown TOPODOT_LOG_LEVEL: {raw}")))
    })
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
