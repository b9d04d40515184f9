//! Ingestion of the two authoring JSON shapes into canonical [`Scene`]s.
//!
//! Two document layouts are accepted: the editor's `.seq` export, which
//! keeps its scenes under `sceneList` with camelCase field names, and the
//! hand-authored "simple" layout with a `scenes` array. The two use
//! different key names for the same fields, so each scene field resolves
//! through its aliases; missing optional fields fall back to documented
//! defaults (duration 5000 ms, play mode 0, white).
//!
//! Shape detection is explicit: [`parse_document`] returns a
//! [`SequenceDocument`] tagged with which layout matched, and a document
//! matching neither is a fatal [`ImportError::UnknownShape`].

use log::debug;
use serde::Deserialize;
use serde_json::Value;
use std::fmt;

use crate::device_config::channel_byte;
use crate::scene::{Pattern, Point, Scene, COLOR_WHITE};

/// Things that can go wrong while reading an authoring document.
#[derive(Debug)]
pub enum ImportError {
    /// The text was not valid JSON.
    Json(serde_json::Error),
    /// The JSON held neither a `sceneList` nor a `scenes` array.
    UnknownShape,
}

impl fmt::Display for ImportError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ImportError::Json(error) => write!(f, "json error: {}", error),
            ImportError::UnknownShape => {
                write!(f, "input JSON must contain either sceneList[] or scenes[]")
            }
        }
    }
}

impl std::error::Error for ImportError {}

impl From<serde_json::Error> for ImportError {
    fn from(error: serde_json::Error) -> Self {
        ImportError::Json(error)
    }
}

fn default_time() -> f64 {
    5000.0
}

fn default_close() -> bool {
    true
}

fn default_weight() -> u16 {
    1
}

fn default_device_type() -> String {
    "DQF6_LS01".to_string()
}

fn default_color_string() -> String {
    "#FFFFFF".to_string()
}

/// Parses a `#RRGGBB` string into a 24-bit RGB value, falling back to
/// white for anything malformed.
pub fn parse_color(s: &str) -> u32 {
    let s = s.trim();
    let hex = match s.strip_prefix('#') {
        Some(hex) if hex.len() == 6 => hex,
        _ => return COLOR_WHITE,
    };
    u32::from_str_radix(hex, 16).unwrap_or(COLOR_WHITE)
}

/// One `channelList` entry of the app shape; only `value` matters.
#[derive(Debug, Deserialize)]
struct ChannelEntry {
    #[serde(default)]
    value: Option<Value>,
}

#[derive(Debug, Deserialize)]
struct AppPoint {
    #[serde(default)]
    x: Option<f64>,
    #[serde(default)]
    y: Option<f64>,
    #[serde(default)]
    color: Option<String>,
    #[serde(default)]
    start: Option<bool>,
}

#[derive(Debug, Deserialize)]
struct AppPattern {
    #[serde(default)]
    points: Vec<AppPoint>,
    #[serde(default = "default_close")]
    close: bool,
}

/// One scene record of the app `.seq` shape.
#[derive(Debug, Deserialize)]
pub struct AppScene {
    #[serde(rename = "time", alias = "time_ms", default = "default_time")]
    time_ms: f64,
    #[serde(rename = "playModeValue", alias = "play_mode", default)]
    play_mode: u32,
    #[serde(rename = "channelList", default)]
    channel_list: Vec<ChannelEntry>,
    #[serde(rename = "patternList", default)]
    pattern_list: Vec<AppPattern>,
}

/// Top level of the app `.seq` shape.
#[derive(Debug, Deserialize)]
pub struct AppDocument {
    #[serde(rename = "sceneList")]
    scene_list: Vec<AppScene>,
    #[serde(default = "default_weight")]
    weight: u16,
    #[serde(rename = "type", default = "default_device_type")]
    device_type: String,
}

/// A simple-shape point source: either an `[x, y]` pair or a keyed
/// record. Anything else is skipped.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawPoint {
    Keyed(KeyedPoint),
    Pair(Vec<f64>),
    Other(Value),
}

#[derive(Debug, Deserialize)]
struct KeyedPoint {
    #[serde(default)]
    x: Option<f64>,
    #[serde(default)]
    y: Option<f64>,
    #[serde(default)]
    start: Option<bool>,
    #[serde(default)]
    color: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SimplePattern {
    #[serde(default = "default_color_string")]
    color: String,
    #[serde(default = "default_close")]
    close: bool,
    #[serde(default)]
    points: Vec<RawPoint>,
}

/// One scene record of the simple shape.
#[derive(Debug, Deserialize)]
pub struct SimpleScene {
    #[serde(rename = "time_ms", alias = "time", default = "default_time")]
    time_ms: f64,
    #[serde(alias = "playModeValue", default)]
    play_mode: u32,
    #[serde(default)]
    channels: Option<Vec<f64>>,
    #[serde(default)]
    patterns: Vec<SimplePattern>,
}

/// Top level of the simple shape.
#[derive(Debug, Deserialize)]
pub struct SimpleDocument {
    scenes: Vec<SimpleScene>,
    #[serde(default = "default_weight")]
    weight: u16,
    #[serde(default = "default_device_type")]
    device_type: String,
}

/// A parsed authoring document, tagged with which of the two known
/// shapes matched.
#[derive(Debug)]
pub enum SequenceDocument {
    /// The editor's `.seq` export (`sceneList`).
    App(AppDocument),
    /// The hand-authored layout (`scenes`).
    Simple(SimpleDocument),
}

/// Detects which shape `text` holds and parses it. A document with
/// neither known scene array is rejected.
pub fn parse_document(text: &str) -> Result<SequenceDocument, ImportError> {
    // Editors on Windows like to prepend a BOM.
    let value: Value = serde_json::from_str(text.trim_start_matches('\u{feff}'))?;
    match &value {
        Value::Object(map) if map.get("sceneList").map_or(false, Value::is_array) => {
            Ok(SequenceDocument::App(serde_json::from_value(value)?))
        }
        Value::Object(map) if map.get("scenes").map_or(false, Value::is_array) => {
            Ok(SequenceDocument::Simple(serde_json::from_value(value)?))
        }
        _ => Err(ImportError::UnknownShape),
    }
}

impl SequenceDocument {
    /// Document-level weight, defaulting to 1.
    pub fn weight(&self) -> u16 {
        match self {
            SequenceDocument::App(doc) => doc.weight,
            SequenceDocument::Simple(doc) => doc.weight,
        }
    }

    /// Document-level device tag.
    pub fn device_type(&self) -> &str {
        match self {
            SequenceDocument::App(doc) => &doc.device_type,
            SequenceDocument::Simple(doc) => &doc.device_type,
        }
    }

    /// Produces the canonical scene list, filling missing channel values
    /// from `default_channels`.
    pub fn into_scenes(self, default_channels: &[u8]) -> Vec<Scene> {
        match self {
            SequenceDocument::App(doc) => doc
                .scene_list
                .into_iter()
                .map(|s| s.into_scene(default_channels))
                .collect(),
            SequenceDocument::Simple(doc) => doc
                .scenes
                .into_iter()
                .map(|s| s.into_scene(default_channels))
                .collect(),
        }
    }
}

impl AppScene {
    fn into_scene(self, default_channels: &[u8]) -> Scene {
        let channel_values = if self.channel_list.is_empty() {
            default_channels.to_vec()
        } else {
            self.channel_list
                .iter()
                .map(|c| channel_byte(c.value.as_ref()))
                .collect()
        };

        let mut patterns = Vec::new();
        for pat in self.pattern_list {
            let points: Vec<Point> = pat
                .points
                .iter()
                .enumerate()
                .map(|(idx, p)| Point {
                    x: p.x.unwrap_or(0.0),
                    y: p.y.unwrap_or(0.0),
                    color: p.color.as_deref().map_or(COLOR_WHITE, parse_color),
                    start: p.start.unwrap_or(idx == 0),
                })
                .collect();
            if !points.is_empty() {
                patterns.push(Pattern {
                    points,
                    close: pat.close,
                });
            }
        }

        Scene {
            time_ms: self.time_ms as u32,
            play_mode: self.play_mode as u8,
            patterns,
            channel_values,
        }
    }
}

impl SimpleScene {
    fn into_scene(self, default_channels: &[u8]) -> Scene {
        let channel_values = match &self.channels {
            Some(values) if !values.is_empty() => {
                let mut chan: Vec<u8> =
                    values.iter().map(|v| v.clamp(0.0, 255.0) as u8).collect();
                // A short list keeps the remaining defaults.
                if chan.len() < default_channels.len() {
                    chan.extend_from_slice(&default_channels[chan.len()..]);
                }
                chan
            }
            _ => default_channels.to_vec(),
        };

        let mut patterns = Vec::new();
        for pat in self.patterns {
            let mut color = parse_color(&pat.color);
            let mut points = Vec::new();
            for (idx, raw) in pat.points.iter().enumerate() {
                match raw {
                    RawPoint::Keyed(p) => {
                        // A per-point color override sticks for the rest
                        // of the pattern.
                        if let Some(c) = &p.color {
                            color = parse_color(c);
                        }
                        points.push(Point {
                            x: p.x.unwrap_or(0.0),
                            y: p.y.unwrap_or(0.0),
                            color,
                            start: p.start.unwrap_or(idx == 0),
                        });
                    }
                    RawPoint::Pair(pair) if pair.len() >= 2 => {
                        points.push(Point {
                            x: pair[0],
                            y: pair[1],
                            color,
                            start: idx == 0,
                        });
                    }
                    RawPoint::Other(source) => {
                        debug!("skipping point source without an x/y pair: {}", source);
                    }
                    _ => {}
                }
            }
            if !points.is_empty() {
                patterns.push(Pattern {
                    points,
                    close: pat.close,
                });
            }
        }

        Scene {
            time_ms: self.time_ms as u32,
            play_mode: self.play_mode as u8,
            patterns,
            channel_values,
        }
    }
}
