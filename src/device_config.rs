//! Loads the device channel-configuration JSON, whose `channel_list`
//! supplies the default per-channel intensity vector used when a scene
//! does not carry its own.

use serde::Deserialize;
use serde_json::Value;
use std::{fmt, fs, path::Path};

/// Things that can go wrong while loading a device config file.
#[derive(Debug)]
pub enum DeviceConfigError {
    /// The file could not be read.
    Io(std::io::Error),
    /// The file was not valid JSON.
    Json(serde_json::Error),
}

impl fmt::Display for DeviceConfigError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            DeviceConfigError::Io(error) => write!(f, "io error: {}", error),
            DeviceConfigError::Json(error) => write!(f, "json error: {}", error),
        }
    }
}

impl std::error::Error for DeviceConfigError {}

#[derive(Debug, Deserialize)]
struct DeviceConfig {
    #[serde(default)]
    channel_list: Vec<ConfigChannel>,
}

#[derive(Debug, Deserialize)]
struct ConfigChannel {
    #[serde(default)]
    value: Option<Value>,
}

/// Coerces a loosely-typed channel `value` field (number, numeric
/// string, null, or absent) to an intensity byte.
pub(crate) fn channel_byte(value: Option<&Value>) -> u8 {
    match value {
        Some(Value::Number(n)) => n.as_f64().unwrap_or(0.0).clamp(0.0, 255.0) as u8,
        Some(Value::String(s)) => s
            .trim()
            .parse::<f64>()
            .map_or(0, |v| v.clamp(0.0, 255.0) as u8),
        _ => 0,
    }
}

/// Reads the default channel-intensity vector from a device config JSON.
pub fn load_default_channels(path: impl AsRef<Path>) -> Result<Vec<u8>, DeviceConfigError> {
    let text = fs::read_to_string(path).map_err(DeviceConfigError::Io)?;
    let config: DeviceConfig =
        serde_json::from_str(text.trim_start_matches('\u{feff}')).map_err(DeviceConfigError::Json)?;
    Ok(config
        .channel_list
        .iter()
        .map(|c| channel_byte(c.value.as_ref()))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn reads_channel_values_in_order() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"name": "DQF6_LS01", "channel_list": [
                {{"name": "CH1", "value": 255}},
                {{"name": "CH2", "value": 0}},
                {{"name": "CH3"}},
                {{"name": "CH4", "value": null}},
                {{"name": "CH5", "value": "42"}},
                {{"name": "CH6", "value": 300}}
            ]}}"#
        )
        .unwrap();

        let channels = load_default_channels(file.path()).unwrap();
        assert_eq!(channels, vec![255, 0, 0, 0, 42, 255]);
    }

    #[test]
    fn missing_channel_list_yields_empty_vector() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"name": "DQF6_LS01"}}"#).unwrap();
        assert_eq!(load_default_channels(file.path()).unwrap(), Vec::<u8>::new());
    }

    #[test]
    fn unreadable_file_is_an_io_error() {
        let result = load_default_channels("/nonexistent/device.json");
        assert!(matches!(result, Err(DeviceConfigError::Io(_))));
    }
}
