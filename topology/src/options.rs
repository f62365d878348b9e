//! Rendering options shared by every builder and the serializer.

use std::fmt;
use std::str::FromStr;

pub const DEFAULT_GRAPH_NAME: &str = "topology";
pub const DEFAULT_FONT: &str = "Helvetica";

/// Graphviz `rankdir`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RankDir {
    #[default]
    TopBottom,
    LeftRight,
    BottomTop,
    RightLeft,
}

impl RankDir {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::TopBottom => "TB",
            Self::LeftRight => "LR",
            Self::BottomTop => "BT",
            Self::RightLeft => "RL",
        }
    }
}

impl fmt::Display for RankDir {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown rankdir '{0}' (expected TB, LR, BT or RL)")]
pub struct ParseRankDirError(pub String);

impl FromStr for RankDir {
    type Err = ParseRankDirError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "TB" => Ok(Self::TopBottom),
            "LR" => Ok(Self::LeftRight),
            "BT" => Ok(Self::BottomTop),
            "RL" => Ok(Self::RightLeft),
            _ => Err(ParseRankDirError(s.to_owned())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderOptions {
    /// Name after `digraph`; sanitized like any other id.
    pub graph_name: String,
    pub rankdir: RankDir,
    pub font: String,
    /// Emit port nodes for devices and servers.
    pub include_ports: bool,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            graph_name: DEFAULT_GRAPH_NAME.to_owned(),
            rankdir: RankDir::default(),
            font: DEFAULT_FONT.to_owned(),
            include_ports: true,
        }
    }
}
