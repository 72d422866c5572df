// src/config/subsystems/output.rs

use std::path::PathBuf;
use log::LevelFilter;
use serde::{Serialize, Deserialize};
use crate::error::{Error, Result};
use crate::config::FromIni;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    Json,
    Jsonl,
}

impl OutputFormat {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim_matches('"').to_lowercase().as_str() {
            "json" => Some(Self::Json),
            "jsonl" | "ndjson" => Some(Self::Jsonl),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    pub log_level: String,
    pub log_dir: PathBuf,
    pub format: OutputFormat,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_dir: PathBuf::from("logs"),
            format: OutputFormat::Json,
        }
    }
}

pub fn parse_log_level(level: &str) -> Option<LevelFilter> {
    match level.trim().to_lowercase().as_str() {
        "error" => Some(LevelFilter::Error),
        "warn" => Some(LevelFilter::Warn),
        "info" => Some(LevelFilter::Info),
        "debug" => Some(LevelFilter::Debug),
        "trace" => Some(LevelFilter::Trace),
        "none" | "off" => Some(LevelFilter::Off),
        _ => None,
    }
}

impl OutputConfig {
    pub fn get_log_level(&self) -> LevelFilter {
        parse_log_level(&self.log_level).unwrap_or(LevelFilter::Info)
    }

    pub fn validate(&self) -> Result<()> {
        if parse_log_level(&self.log_level).is_none() {
            return Err(Error::Config(format!("Invalid log_level: {}", self.log_level)));
        }
        Ok(())
    }
}

impl FromIni for OutputConfig {
    fn from_ini_section(&mut self, section_name: &str, key: &str, value: &str) -> Option<Result<()>> {
        if section_name != "output" {
            return None;
        }

        let value = value.trim_matches('"');
        match key {
            "log_level" => {
                if parse_log_level(value).is_none() {
                    return Some(Err(Error::Config(format!("Invalid log_level: {}", value))));
                }
                self.log_level = value.to_lowercase();
                Some(Ok(()))
            },
            "log_dir" => {
                self.log_dir = PathBuf::from(value);
                Some(Ok(()))
            },
            "format" => match OutputFormat::from_str(value) {
                Some(format) => {
                    self.format = format;
                    Some(Ok(()))
                },
                None => Some(Err(Error::Config(
                    format!("Invalid output format (json or jsonl): {}", value)
                ))),
            },
            _ => None,
        }
    }
}
