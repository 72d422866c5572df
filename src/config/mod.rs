pub mod subsystems;

use serde::{Serialize, Deserialize};
use std::path::Path;
use std::fs;
use crate::error::Result;
use log::{warn, trace};

pub trait FromIni {
    fn from_ini_section(&mut self, section_name: &str, key: &str, value: &str) -> Option<Result<()>>;
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct JidoConfig {
    pub clustering: subsystems::ClusteringConfig,
    pub resolver: subsystems::ResolverConfig,
    pub styling: subsystems::StylingConfig,
    pub output: subsystems::OutputConfig,
}

impl JidoConfig {
    pub fn validate(&self) -> Result<()> {
        self.clustering.validate()?;
        self.resolver.validate()?;
        self.styling.validate()?;
        self.output.validate()?;
        Ok(())
    }

    pub fn from_ini<P: AsRef<Path>>(path: P) -> Result<Self> {
        trace!("Loading configuration from: {:?}", path.as_ref());
        let content = fs::read_to_string(&path)?;
        Self::from_ini_str(&content)
    }

    pub fn from_ini_str(content: &str) -> Result<Self> {
        let mut config = Self::default();
        let mut current_section = String::new();

        for (line_num, line) in content.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') || line.starts_with(';') {
                continue;
            }

            if line.starts_with('[') && line.ends_with(']') {
                current_section = line[1..line.len() - 1].trim().to_string();
                trace!("  Line {}: Found section: [{}]", line_num + 1, current_section);
                continue;
            }

            if let Some((key, value)) = line.split_once('=') {
                let key = key.trim();
                let value = value.trim();

                // Delegate to appropriate subsystem config
                let handled = match current_section.as_str() {
                    "clustering" => config.clustering.from_ini_section(&current_section, key, value),
                    "styling" => config.styling.from_ini_section(&current_section, key, value),
                    "output" => config.output.from_ini_section(&current_section, key, value),
                    s if s == "resolver" || s.starts_with("resolver.") => {
                        config.resolver.from_ini_section(&current_section, key, value)
                    }
                    _ => None,
                };

                match handled {
                    Some(Err(e)) => warn!("Error processing config key {}={}: {}", key, value, e),
                    Some(Ok(())) => {}
                    None => warn!(
                        "Unrecognized config key: {}={} in section [{}]",
                        key, value, current_section
                    ),
                }
            } else {
                warn!("Ignoring malformed config line {}: {}", line_num + 1, line);
            }
        }

        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults_are_valid() {
        assert!(JidoConfig::default().validate().is_ok());
    }

    #[test]
    fn loads_sections_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "# map clustering").unwrap();
        writeln!(file, "[clustering]").unwrap();
        writeln!(file, "far_zoom_threshold = 7").unwrap();
        writeln!(file, "parallel_districts = true").unwrap();
        writeln!(file, "[resolver]").unwrap();
        writeln!(file, "default_district = \"마포구\"").unwrap();
        writeln!(file, "[resolver.districts]").unwrap();
        writeln!(file, "분당구 = 37.3827, 127.1189").unwrap();
        writeln!(file, "[styling]").unwrap();
        writeln!(file, "affordable_max = 30000").unwrap();
        writeln!(file, "[output]").unwrap();
        writeln!(file, "format = jsonl").unwrap();
        file.flush().unwrap();

        let config = JidoConfig::from_ini(file.path()).unwrap();
        assert_eq!(config.clustering.far_zoom_threshold, 7);
        assert!(config.clustering.parallel_districts);
        assert_eq!(config.resolver.default_district, "마포구");
        assert_eq!(config.resolver.districts.get("분당구"), Some(&(37.3827, 127.1189)));
        assert_eq!(config.styling.affordable_max, 30000.0);
        assert_eq!(config.output.format, subsystems::OutputFormat::Jsonl);
    }

    #[test]
    fn invalid_values_keep_defaults() {
        let config = JidoConfig::from_ini_str("[clustering]\nfar_distance_km = abc\nunknown = 1\n").unwrap();
        assert_eq!(config.clustering.far_distance_km, 0.02);
    }

    #[test]
    fn inconsistent_configuration_is_rejected() {
        let result = JidoConfig::from_ini_str("[styling]\naffordable_max = 500000\n");
        assert!(matches!(result, Err(crate::Error::Config(_))));
    }

    #[test]
    fn missing_file_is_io_error() {
        let result = JidoConfig::from_ini("/nonexistent/jido.ini");
        assert!(matches!(result, Err(crate::Error::Io(_))));
    }
}
