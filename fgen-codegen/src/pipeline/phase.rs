//! Stages a file goes through in the pipeline.

use serde::Serialize;

/// The stage of the pipeline a diagnostic comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    /// Turning source text into a tree.
    Parse,
    /// Looking for `generate` directives.
    Scan,
    /// Running generators over a file.
    Generate,
    /// Formatting and writing artifacts.
    Emit,
}

impl Phase {
    pub fn as_str(&self) -> &'static str {
        match self {
            Phase::Parse => "parse",
            Phase::Scan => "scan",
            Phase::Generate => "generate",
            Phase::Emit => "emit",
        }
    }
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
