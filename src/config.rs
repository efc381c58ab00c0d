use std::env;
use std::str::FromStr;

use rusoto_core::Region;

use crate::error::AnnotatorError;

#[derive(Debug, Clone)]
pub struct Config {
    pub attributes: Vec<String>,
    pub add_tags: bool,
    pub delete_sensors: bool,
    pub region: Region,
    pub secure_workload: SecureWorkloadConfig,
}

#[derive(Debug, Clone)]
pub struct SecureWorkloadConfig {
    pub url: String,
    pub api_key: String,
    pub api_secret: String,
    pub tenant: String,
}

impl Config {
    pub fn from_env() -> Result<Config, AnnotatorError> {
        Ok(Config {
            attributes: parse_attributes(&env::var("ATTRIBUTES_LIST").unwrap_or_default()),
            add_tags: parse_flag("ADD_TAGS", env::var("ADD_TAGS").ok().as_deref())?,
            delete_sensors: parse_flag(
                "DELETE_SENSORS",
                env::var("DELETE_SENSORS").ok().as_deref(),
            )?,
            region: parse_region(&required("WORKSPACE_REGION")?)?,
            secure_workload: SecureWorkloadConfig {
                url: required("SECURE_WORKLOAD_URL")?,
                api_key: required("SECURE_WORKLOAD_API_KEY")?,
                api_secret: required("SECURE_WORKLOAD_API_SECRET")?,
                tenant: required("SECURE_WORKLOAD_TENANT")?,
            },
        })
    }
}

fn required(name: &'static str) -> Result<String, AnnotatorError> {
    env::var(name).map_err(|_| AnnotatorError::MissingEnvVar(name))
}

/// Unset means false; anything other than "true"/"false" is rejected rather
/// than silently treated as false.
fn parse_flag(name: &'static str, value: Option<&str>) -> Result<bool, AnnotatorError> {
    match value {
        None => Ok(false),
        Some(raw) => match raw.to_ascii_lowercase().as_str() {
            "true" => Ok(true),
            "false" => Ok(false),
            _ => Err(AnnotatorError::InvalidFlag {
                name,
                value: raw.to_string(),
            }),
        },
    }
}

fn parse_attributes(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|attribute| !attribute.is_empty())
        .map(String::from)
        .collect()
}

fn parse_region(name: &str) -> Result<Region, AnnotatorError> {
    Region::from_str(name).map_err(|_| AnnotatorError::InvalidRegion(name.to_string()))
}
