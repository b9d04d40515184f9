//! Assembles a full show into the TF1 binary container the projector
//! firmware consumes. The layout, front to back:
//!
//! - a fixed 48-byte header: filler, the 4-byte device tag, the offset
//!   of the scene-record table, the scene-record stride
//!   (`channel_count + 3`), and the scene/blob/weight counters;
//! - an offset table of `u32` little-endian prefix sums, letting the
//!   firmware seek to pattern blob `i` without scanning;
//! - one scene record per scene: duration in 10 ms units, play mode,
//!   and the channel intensity bytes;
//! - the deduplicated pattern blobs, concatenated in first-seen order;
//! - a trailer naming the show for the device display.
//!
//! Scenes with byte-identical encoded geometry share one blob; the
//! geometry encoder's determinism is what makes byte equality a sound
//! dedup key.

use log::debug;
use std::fmt;

use crate::geometry::encode_patterns;
use crate::scene::{BuildOptions, Scene};

/// Display name used when the authored one cannot be rendered by the
/// device's ASCII-only screen.
const FALLBACK_NAME: &str = "MyPro";

/// Things that can go wrong while building a payload.
#[derive(Debug)]
pub enum Tf1Error {
    /// The scene list was empty.
    NoScenes,
    /// Two scenes carried channel vectors of different lengths.
    ChannelCountMismatch {
        /// Channel count of the first scene.
        expected: usize,
        /// Channel count of the offending scene.
        found: usize,
        /// Zero-based index of the offending scene.
        scene: usize,
    },
}

impl fmt::Display for Tf1Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Tf1Error::NoScenes => write!(f, "at least one scene is required"),
            Tf1Error::ChannelCountMismatch {
                expected,
                found,
                scene,
            } => write!(
                f,
                "scene {} has {} channel values, expected {}",
                scene, found, expected
            ),
        }
    }
}

impl std::error::Error for Tf1Error {}

fn contains_cjk(value: &str) -> bool {
    value.chars().any(|c| ('\u{4e00}'..='\u{9fff}').contains(&c))
}

/// Builds the complete TF1 payload for `scenes`.
pub fn build_tf1_payload(scenes: &[Scene], opts: &BuildOptions) -> Result<Vec<u8>, Tf1Error> {
    if scenes.is_empty() {
        return Err(Tf1Error::NoScenes);
    }

    let channel_count = scenes[0].channel_values.len();
    for (i, scene) in scenes.iter().enumerate() {
        if scene.channel_values.len() != channel_count {
            return Err(Tf1Error::ChannelCountMismatch {
                expected: channel_count,
                found: scene.channel_values.len(),
                scene: i,
            });
        }
    }

    // Encode every scene once, deduplicating blobs in first-seen order.
    let mut unique_blobs: Vec<Vec<u8>> = Vec::new();
    let mut blob_index_per_scene: Vec<usize> = Vec::with_capacity(scenes.len());
    for scene in scenes {
        let blob = encode_patterns(&scene.patterns, opts.canvas_width, opts.canvas_height);
        let index = match unique_blobs.iter().position(|b| *b == blob) {
            Some(index) => index,
            None => {
                unique_blobs.push(blob);
                unique_blobs.len() - 1
            }
        };
        blob_index_per_scene.push(index);
    }
    debug!(
        "{} scenes deduplicated into {} pattern blobs",
        scenes.len(),
        unique_blobs.len()
    );

    let mut payload = vec![0xFF; 12];

    // Device tag, at most 4 ASCII bytes, 0xFF-padded to offset 16.
    let tag: Vec<u8> = opts.device_type.bytes().take(4).collect();
    payload.extend_from_slice(&tag);
    payload.resize(16, 0xFF);
    payload.extend_from_slice(&[48, 0, 0, 0]);

    let scene_table_start = 48 + 4 * unique_blobs.len() + 4;
    payload.extend_from_slice(&(scene_table_start as u32).to_le_bytes());
    payload.extend_from_slice(&[0, 0, (channel_count + 3) as u8, 0]);
    payload.extend_from_slice(&(scenes.len() as u16).to_le_bytes());
    payload.extend_from_slice(&(unique_blobs.len() as u16).to_le_bytes());
    payload.extend_from_slice(&opts.weight.to_le_bytes());
    payload.extend_from_slice(&[0; 14]);
    debug_assert_eq!(payload.len(), 48);

    // Offset table: the scene-block end, then one cumulative end offset
    // per blob.
    let scene_block_end = scene_table_start + (channel_count + 3) * scenes.len();
    payload.extend_from_slice(&(scene_block_end as u32).to_le_bytes());
    let mut blob_end = scene_block_end;
    for blob in &unique_blobs {
        blob_end += blob.len();
        payload.extend_from_slice(&(blob_end as u32).to_le_bytes());
    }

    // Scene records.
    let last = scenes.len() - 1;
    for (i, scene) in scenes.iter().enumerate() {
        let duration_10ms = (scene.time_ms / 10) as u16;
        // Play mode 0 on the last scene terminates any loop instruction.
        let play_mode = if i == last { 0 } else { scene.play_mode };
        payload.extend_from_slice(&duration_10ms.to_le_bytes());
        payload.push(play_mode);
        payload.extend_from_slice(&scene.channel_values);
        // The app protocol reserves CH4 as the pattern selector.
        if channel_count > 3 {
            let ch4 = payload.len() - channel_count + 3;
            payload[ch4] = blob_index_per_scene[i] as u8;
        }
    }

    for blob in &unique_blobs {
        payload.extend_from_slice(blob);
    }

    // Trailer: the display name, or an ASCII stand-in the device screen
    // can actually render.
    payload.push(0);
    payload.extend_from_slice(b"display:");
    let name = if contains_cjk(&opts.tf1_name) {
        FALLBACK_NAME
    } else {
        opts.tf1_name.as_str()
    };
    payload.extend_from_slice(name.as_bytes());

    Ok(payload)
}
