use crate::error::{CliError, Result};
use bigfold::engine::config::ShortFragmentPolicy;
use serde::Deserialize;
use std::path::Path;
use tracing::debug;

/// Optional settings read from a TOML file. Every key may be omitted.
#[derive(Deserialize, Debug, Default, Clone)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    pub segmentation: Option<FileSegmentationConfig>,
    pub assembly: Option<FileAssemblyConfig>,
}

#[derive(Deserialize, Debug, Default, Clone)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
pub struct FileSegmentationConfig {
    pub segment_length: Option<usize>,
    pub overlap_length: Option<usize>,
    pub line_width: Option<usize>,
}

#[derive(Deserialize, Debug, Default, Clone)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
pub struct FileAssemblyConfig {
    /// Falls back to `segmentation.overlap-length` when absent.
    pub overlap_length: Option<usize>,
    pub align_span: Option<usize>,
    pub combine: Option<bool>,
    pub chain_id: Option<char>,
    pub short_fragment_policy: Option<ShortFragmentPolicy>,
}

impl FileConfig {
    pub fn from_file(path: &Path) -> Result<Self> {
        debug!("Reading configuration file {:?}", path);
        let content = std::fs::read_to_string(path).map_err(|e| CliError::FileParsing {
            path: path.to_path_buf(),
            source: e.into(),
        })?;
        Self::from_toml_str(&content).map_err(|e| CliError::FileParsing {
            path: path.to_path_buf(),
            source: e.into(),
        })
    }

    pub fn from_toml_str(content: &str) -> std::result::Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::from_file(path),
            None => Ok(Self::default()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn parses_both_sections_with_kebab_case_keys() {
        let config = FileConfig::from_toml_str(
            r#"
[segmentation]
segment-length = 1000
overlap-length = 150

[assembly]
align-span = 8
combine = false
chain-id = "B"
short-fragment-policy = "halt"
"#,
        )
        .unwrap();

        let segmentation = config.segmentation.unwrap();
        assert_eq!(segmentation.segment_length, Some(1000));
        assert_eq!(segmentation.overlap_length, Some(150));
        assert_eq!(segmentation.line_width, None);

        let assembly = config.assembly.unwrap();
        assert_eq!(assembly.overlap_length, None);
        assert_eq!(assembly.align_span, Some(8));
        assert_eq!(assembly.combine, Some(false));
        assert_eq!(assembly.chain_id, Some('B'));
        assert_eq!(assembly.short_fragment_policy, Some(ShortFragmentPolicy::Halt));
    }

    #[test]
    fn unknown_keys_are_rejected() {
        assert!(FileConfig::from_toml_str("[assembly]\nalign_span = 3\n").is_err());
        assert!(FileConfig::from_toml_str("[placement]\n").is_err());
    }

    #[test]
    fn unreadable_or_malformed_file_reports_its_path() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "[segmentation\nsegment-length = 3").unwrap();

        let err = FileConfig::from_file(file.path()).unwrap_err();
        match err {
            CliError::FileParsing { path, .. } => assert_eq!(path, file.path()),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn missing_path_yields_empty_config() {
        let config = FileConfig::load(None).unwrap();
        assert!(config.segmentation.is_none());
        assert!(config.assembly.is_none());
    }
}
