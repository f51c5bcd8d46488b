use std::str::FromStr;

use crate::error::Error;

/// The supported output formats for a finished transcript.
///
/// Why this exists:
/// - We want a single, strongly-typed representation of output formats
///   across the CLI and library code.
/// - Using an enum avoids stringly-typed conditionals and keeps format
///   selection explicit and discoverable.
///
/// Integration notes:
/// - `ValueEnum` (under the `cli` feature) allows this enum to be used
///   directly as a CLI flag with `clap`.
/// - Each variant maps to a concrete renderer module.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
pub enum OutputType {
    /// The full concatenated text, no timestamps.
    #[default]
    Text,

    /// A numbered SRT subtitle track.
    Subtitle,

    /// A self-describing JSON record: language, text, and every segment.
    Structured,
}

impl OutputType {
    /// File extension conventionally used for this format.
    pub fn extension(&self) -> &'static str {
        match self {
            OutputType::Text => "txt",
            OutputType::Subtitle => "srt",
            OutputType::Structured => "json",
        }
    }
}

impl FromStr for OutputType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "text" | "txt" => Ok(OutputType::Text),
            "subtitle" | "srt" => Ok(OutputType::Subtitle),
            "structured" | "json" => Ok(OutputType::Structured),
            other => Err(Error::UnsupportedFormat(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_canonical_names_and_extensions() -> crate::Result<()> {
        assert_eq!("text".parse::<OutputType>()?, OutputType::Text);
        assert_eq!("SRT".parse::<OutputType>()?, OutputType::Subtitle);
        assert_eq!("structured".parse::<OutputType>()?, OutputType::Structured);
        assert_eq!(OutputType::Subtitle.extension(), "srt");
        Ok(())
    }

    #[test]
    fn unknown_format_is_unsupported() {
        let err = "yaml".parse::<OutputType>().unwrap_err();
        assert!(matches!(err, Error::UnsupportedFormat(ref s) if s == "yaml"));
    }
}
