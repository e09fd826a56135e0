use std::time::Duration;

use serde::Deserialize;

use crate::args::parsers::parse_duration_with_unit;
use crate::error::ValidationError;

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigFile {
    #[serde(alias = "domain")]
    pub domains: Option<Vec<String>>,
    pub duration: Option<DurationValue>,
    pub output_dir: Option<String>,
    pub workers: Option<usize>,
    pub timeout: Option<DurationValue>,
    pub connect_timeout: Option<DurationValue>,
    pub monitor_interval: Option<DurationValue>,
    pub headers: Option<Vec<String>>,
    pub user_agent: Option<String>,
    pub redirect: Option<u32>,
    pub insecure: Option<bool>,
    pub fail_on_4xx: Option<bool>,
    pub fail_statuses: Option<Vec<u16>>,
    pub export_json: Option<String>,
    pub no_color: Option<bool>,
    pub no_banner: Option<bool>,
    pub verbose: Option<bool>,
}

/// Either a bare number or a string with an optional unit suffix.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum DurationValue {
    Number(u64),
    Text(String),
}

impl DurationValue {
    /// Converts to a `Duration`; `bare_unit` applies to numbers and
    /// unit-less text alike.
    pub(crate) fn to_duration(&self, bare_unit: &str) -> Result<Duration, ValidationError> {
        match self {
            DurationValue::Number(value) => parse_duration_with_unit(&value.to_string(), bare_unit),
            DurationValue::Text(text) => parse_duration_with_unit(text, bare_unit),
        }
    }
}
