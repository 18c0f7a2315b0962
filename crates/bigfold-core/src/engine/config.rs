use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

pub const DEFAULT_SEGMENT_LENGTH: usize = 1400;
pub const DEFAULT_OVERLAP_LENGTH: usize = 200;
pub const DEFAULT_ALIGN_SPAN: usize = 5;
pub const DEFAULT_LINE_WIDTH: usize = 80;
pub const DEFAULT_CHAIN_ID: char = 'A';

#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum ConfigError {
    #[error("Missing required parameter: {0}")]
    MissingParameter(&'static str),
    #[error("Invalid value for '{parameter}': {reason}")]
    InvalidValue {
        parameter: &'static str,
        reason: String,
    },
}

/// What the assembler does with a fragment that has no residues left after
/// its overlap is trimmed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ShortFragmentPolicy {
    /// Record the problem and continue with the next fragment.
    #[default]
    Skip,
    /// Record the problem and stop; the model built so far is kept.
    Halt,
}

impl fmt::Display for ShortFragmentPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShortFragmentPolicy::Skip => write!(f, "skip"),
            ShortFragmentPolicy::Halt => write!(f, "halt"),
        }
    }
}

impl FromStr for ShortFragmentPolicy {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "skip" => Ok(ShortFragmentPolicy::Skip),
            "halt" => Ok(ShortFragmentPolicy::Halt),
            other => Err(ConfigError::InvalidValue {
                parameter: "short_fragment_policy",
                reason: format!("expected 'skip' or 'halt', got '{}'", other),
            }),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SegmentationConfig {
    pub segment_length: usize,
    pub overlap_length: usize,
    /// Residues per line in written chunk files.
    pub line_width: usize,
}

impl Default for SegmentationConfig {
    fn default() -> Self {
        Self {
            segment_length: DEFAULT_SEGMENT_LENGTH,
            overlap_length: DEFAULT_OVERLAP_LENGTH,
            line_width: DEFAULT_LINE_WIDTH,
        }
    }
}

#[derive(Default)]
pub struct SegmentationConfigBuilder {
    segment_length: Option<usize>,
    overlap_length: Option<usize>,
    line_width: Option<usize>,
}

impl SegmentationConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn segment_length(mut self, length: usize) -> Self {
        self.segment_length = Some(length);
        self
    }
    pub fn overlap_length(mut self, length: usize) -> Self {
        self.overlap_length = Some(length);
        self
    }
    pub fn line_width(mut self, width: usize) -> Self {
        self.line_width = Some(width);
        self
    }

    pub fn build(self) -> Result<SegmentationConfig, ConfigError> {
        let segment_length = self
            .segment_length
            .ok_or(ConfigError::MissingParameter("segment_length"))?;
        let overlap_length = self
            .overlap_length
            .ok_or(ConfigError::MissingParameter("overlap_length"))?;
        let line_width = self
            .line_width
            .ok_or(ConfigError::MissingParameter("line_width"))?;

        if segment_length == 0 {
            return Err(ConfigError::InvalidValue {
                parameter: "segment_length",
                reason: "must be positive".into(),
            });
        }
        if overlap_length >= segment_length {
            return Err(ConfigError::InvalidValue {
                parameter: "overlap_length",
                reason: format!(
                    "must be smaller than segment_length ({} >= {})",
                    overlap_length, segment_length
                ),
            });
        }
        if line_width == 0 {
            return Err(ConfigError::InvalidValue {
                parameter: "line_width",
                reason: "must be positive".into(),
            });
        }

        Ok(SegmentationConfig {
            segment_length,
            overlap_length,
            line_width,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssemblyConfig {
    /// Residues each fragment shares with its predecessor.
    pub overlap_length: usize,
    /// Number of trailing residues used as the alignment anchor.
    pub align_span: usize,
    /// Join consecutive fragments with a peptide bond into one chain.
    pub combine: bool,
    /// Chain identifier of the assembled model.
    pub chain_id: char,
    pub short_fragment_policy: ShortFragmentPolicy,
}

impl Default for AssemblyConfig {
    fn default() -> Self {
        Self {
            overlap_length: DEFAULT_OVERLAP_LENGTH,
            align_span: DEFAULT_ALIGN_SPAN,
            combine: true,
            chain_id: DEFAULT_CHAIN_ID,
            short_fragment_policy: ShortFragmentPolicy::default(),
        }
    }
}

#[derive(Default)]
pub struct AssemblyConfigBuilder {
    overlap_length: Option<usize>,
    align_span: Option<usize>,
    combine: Option<bool>,
    chain_id: Option<char>,
    short_fragment_policy: Option<ShortFragmentPolicy>,
}

impl AssemblyConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn overlap_length(mut self, length: usize) -> Self {
        self.overlap_length = Some(length);
        self
    }
    pub fn align_span(mut self, span: usize) -> Self {
        self.align_span = Some(span);
        self
    }
    pub fn combine(mut self, combine: bool) -> Self {
        self.combine = Some(combine);
        self
    }
    pub fn chain_id(mut self, id: char) -> Self {
        self.chain_id = Some(id);
        self
    }
    pub fn short_fragment_policy(mut self, policy: ShortFragmentPolicy) -> Self {
        self.short_fragment_policy = Some(policy);
        self
    }

    pub fn build(self) -> Result<AssemblyConfig, ConfigError> {
        let overlap_length = self
            .overlap_length
            .ok_or(ConfigError::MissingParameter("overlap_length"))?;
        let align_span = self
            .align_span
            .ok_or(ConfigError::MissingParameter("align_span"))?;
        let combine = self
            .combine
            .ok_or(ConfigError::MissingParameter("combine"))?;
        let chain_id = self.chain_id.unwrap_or(DEFAULT_CHAIN_ID);
        let short_fragment_policy = self.short_fragment_policy.unwrap_or_default();

        if align_span == 0 {
            return Err(ConfigError::InvalidValue {
                parameter: "align_span",
                reason: "must be positive".into(),
            });
        }
        if !chain_id.is_ascii_alphanumeric() {
            return Err(ConfigError::InvalidValue {
                parameter: "chain_id",
                reason: format!("'{}' is not an ASCII letter or digit", chain_id),
            });
        }

        Ok(AssemblyConfig {
            overlap_length,
            align_span,
            combine,
            chain_id,
            short_fragment_policy,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn segmentation_builder_accepts_defaults() {
        let config = SegmentationConfigBuilder::new()
            .segment_length(DEFAULT_SEGMENT_LENGTH)
            .overlap_length(DEFAULT_OVERLAP_LENGTH)
            .line_width(DEFAULT_LINE_WIDTH)
            .build()
            .unwrap();
        assert_eq!(config, SegmentationConfig::default());
    }

    #[test]
    fn segmentation_builder_reports_missing_parameters() {
        let result = SegmentationConfigBuilder::new().segment_length(10).build();
        assert_eq!(result, Err(ConfigError::MissingParameter("overlap_length")));
    }

    #[test]
    fn overlap_must_be_smaller_than_segment() {
        let result = SegmentationConfigBuilder::new()
            .segment_length(200)
            .overlap_length(200)
            .line_width(80)
            .build();
        assert!(matches!(
            result,
            Err(ConfigError::InvalidValue {
                parameter: "overlap_length",
                ..
            })
        ));
    }

    #[test]
    fn zero_lengths_are_rejected() {
        let zero_segment = SegmentationConfigBuilder::new()
            .segment_length(0)
            .overlap_length(0)
            .line_width(80)
            .build();
        assert!(matches!(
            zero_segment,
            Err(ConfigError::InvalidValue {
                parameter: "segment_length",
                ..
            })
        ));

        let zero_width = SegmentationConfigBuilder::new()
            .segment_length(10)
            .overlap_length(2)
            .line_width(0)
            .build();
        assert!(matches!(
            zero_width,
            Err(ConfigError::InvalidValue {
                parameter: "line_width",
                ..
            })
        ));
    }

    #[test]
    fn assembly_builder_fills_optional_fields() {
        let config = AssemblyConfigBuilder::new()
            .overlap_length(200)
            .align_span(5)
            .combine(true)
            .build()
            .unwrap();
        assert_eq!(config, AssemblyConfig::default());
    }

    #[test]
    fn assembly_builder_validates_span_and_chain() {
        let base = || {
            AssemblyConfigBuilder::new()
                .overlap_length(200)
                .combine(true)
        };
        assert!(matches!(
            base().align_span(0).build(),
            Err(ConfigError::InvalidValue {
                parameter: "align_span",
                ..
            })
        ));
        assert!(matches!(
            base().align_span(5).chain_id('#').build(),
            Err(ConfigError::InvalidValue {
                parameter: "chain_id",
                ..
            })
        ));
        assert_eq!(
            base().build(),
            Err(ConfigError::MissingParameter("align_span"))
        );
    }

    #[test]
    fn short_fragment_policy_parses_and_displays() {
        assert_eq!("Skip".parse::<ShortFragmentPolicy>(), Ok(ShortFragmentPolicy::Skip));
        assert_eq!(" halt ".parse::<ShortFragmentPolicy>(), Ok(ShortFragmentPolicy::Halt));
        assert!("ignore".parse::<ShortFragmentPolicy>().is_err());
        assert_eq!(ShortFragmentPolicy::Halt.to_string(), "halt");
    }
}
