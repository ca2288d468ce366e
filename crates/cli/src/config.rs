//! Runtime configuration
//!
//! Loaded from a JSON object. Unknown keys are ignored; missing,
//! ill-typed or empty values silently keep their defaults.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use anyhow::{bail, Context, Result};
use serde_json::Value as Json;
use tracing::debug;

/// Axis names used in every point file.
pub const AXIS_NAMES: [&str; 2] = ["x", "y"];

/// Value field name used in every point file.
pub const VALUE_NAME: &str = "value";

/// Config file path used when the prompt gets an empty line.
pub const DEFAULT_CONFIG_FN: &str = "config.json";

#[derive(Debug, Clone)]
pub struct Config {
    pub output_fn: String,
    pub known_points_fn: String,
    pub unknown_points_fn: String,
    pub num_neighbors: usize,
    pub reverse_search: bool,
    pub idw_power: f64,
    pub json_indent: i64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            output_fn: "output.json".to_string(),
            known_points_fn: "known_points.json".to_string(),
            unknown_points_fn: "unknown_points.json".to_string(),
            num_neighbors: 100,
            reverse_search: false,
            idw_power: 2.0,
            json_indent: 4,
        }
    }
}

impl Config {
    /// Read configuration from a JSON file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file =
            File::open(path).with_context(|| format!("cannot open config file {path:?}"))?;
        let data: Json = serde_json::from_reader(BufReader::new(file))
            .with_context(|| format!("cannot parse config file {path:?}"))?;

        let Some(object) = data.as_object().filter(|object| !object.is_empty()) else {
            bail!("config file {path:?} is not a JSON object");
        };

        let mut config = Self::default();

        for (field, key) in [
            (&mut config.output_fn, "output_fn"),
            (&mut config.known_points_fn, "known_points_fn"),
            (&mut config.unknown_points_fn, "unknown_points_fn"),
        ] {
            if let Some(value) = object.get(key).and_then(Json::as_str) {
                if !value.is_empty() {
                    *field = value.to_string();
                }
            }
        }

        if let Some(value) = object.get("num_neighbors").and_then(Json::as_u64) {
            if value > 0 {
                config.num_neighbors = value as usize;
            }
        }

        if let Some(value) = object.get("reverse_search").and_then(Json::as_bool) {
            config.reverse_search = value;
        }

        // only a fractional number overrides the power, matching the
        // strict typing of the other fields
        if let Some(value) = object.get("idw_power").filter(|v| v.is_f64()).and_then(Json::as_f64) {
            config.idw_power = value;
        }

        if let Some(value) = object.get("json_indent").and_then(Json::as_i64) {
            config.json_indent = value;
        }

        debug!(?config, "configuration loaded");

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn config_from(contents: &str) -> Result<Config> {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        file.write_all(contents.as_bytes()).expect("write");
        Config::from_file(file.path())
    }

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.output_fn, "output.json");
        assert_eq!(config.num_neighbors, 100);
        assert!(!config.reverse_search);
        assert_eq!(config.idw_power, 2.0);
        assert_eq!(config.json_indent, 4);
    }

    #[test]
    fn test_partial_override_keeps_other_defaults() {
        let config = config_from(r#"{ "reverse_search": true, "num_neighbors": 7 }"#).unwrap();
        assert!(config.reverse_search);
        assert_eq!(config.num_neighbors, 7);
        assert_eq!(config.idw_power, 2.0);
        assert_eq!(config.known_points_fn, "known_points.json");
    }

    #[test]
    fn test_full_override() {
        let config = config_from(
            r#"{
                "output_fn": "out.json",
                "known_points_fn": "k.json",
                "unknown_points_fn": "u.json",
                "num_neighbors": 4,
                "reverse_search": true,
                "idw_power": 3.5,
                "json_indent": 2
            }"#,
        )
        .unwrap();

        assert_eq!(config.output_fn, "out.json");
        assert_eq!(config.known_points_fn, "k.json");
        assert_eq!(config.unknown_points_fn, "u.json");
        assert_eq!(config.num_neighbors, 4);
        assert!(config.reverse_search);
        assert_eq!(config.idw_power, 3.5);
        assert_eq!(config.json_indent, 2);
    }

    #[test]
    fn test_type_mismatches_keep_defaults() {
        let config = config_from(
            r#"{
                "output_fn": 5,
                "num_neighbors": "ten",
                "reverse_search": "yes",
                "idw_power": 3,
                "json_indent": 2.5
            }"#,
        )
        .unwrap();

        assert_eq!(config.output_fn, "output.json");
        assert_eq!(config.num_neighbors, 100);
        assert!(!config.reverse_search);
        assert_eq!(config.idw_power, 2.0);
        assert_eq!(config.json_indent, 4);
    }

    #[test]
    fn test_zero_and_empty_values_keep_defaults() {
        let config = config_from(r#"{ "num_neighbors": 0, "output_fn": "" }"#).unwrap();
        assert_eq!(config.num_neighbors, 100);
        assert_eq!(config.output_fn, "output.json");
    }

    #[test]
    fn test_unknown_keys_are_ignored() {
        let config = config_from(r#"{ "num_neighbors": 3, "surprise": [1, 2] }"#).unwrap();
        assert_eq!(config.num_neighbors, 3);
    }

    #[test]
    fn test_empty_or_malformed_file_fails() {
        assert!(config_from("{}").is_err());
        assert!(config_from("[1, 2]").is_err());
        assert!(config_from("not json").is_err());
    }
}
