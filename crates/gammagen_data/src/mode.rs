use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Per-event generation strategy. Exactly one is active at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum GenerationMode {
    /// Both Co-60 lines per event.
    #[default]
    FixedPair,
    /// One randomly chosen Co-60 line per event.
    SingleLine,
    /// Capture cascade from an external de-excitation model.
    ExternalCascade,
    /// Pre-computed cascades read from a dataset file.
    FileCascade,
}

impl GenerationMode {
    pub const ALL: [GenerationMode; 4] = [
        GenerationMode::FixedPair,
        GenerationMode::SingleLine,
        GenerationMode::ExternalCascade,
        GenerationMode::FileCascade,
    ];

    /// Human readable description used in log lines.
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            GenerationMode::FixedPair => "Co-60 cascade",
            GenerationMode::SingleLine => "single gamma",
            GenerationMode::ExternalCascade => "CASCADE neutron capture",
            GenerationMode::FileCascade => "RAINIER cascade",
        }
    }

    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            GenerationMode::FixedPair => "fixed-pair",
            GenerationMode::SingleLine => "single-line",
            GenerationMode::ExternalCascade => "external-cascade",
            GenerationMode::FileCascade => "file-cascade",
        }
    }
}

impl fmt::Display for GenerationMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseModeError(pub String);

impl fmt::Display for ParseModeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "unknown generation mode '{}' (expected fixed-pair, single-line, external-cascade or file-cascade)",
            self.0
        )
    }
}

impl std::error::Error for ParseModeError {}

impl FromStr for GenerationMode {
    type Err = ParseModeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "fixed-pair" | "coin" | "co60" => Ok(GenerationMode::FixedPair),
            "single-line" | "single" => Ok(GenerationMode::SingleLine),
            "external-cascade" | "cascade" => Ok(GenerationMode::ExternalCascade),
            "file-cascade" | "rainier" => Ok(GenerationMode::FileCascade),
            other => Err(ParseModeError(other.to_string())),
        }
    }
}
