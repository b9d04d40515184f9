//! Canonical in-memory model for a TF1 show: scenes of vector patterns
//! plus per-channel output intensities. These are plain value records;
//! the encoder and payload builder only ever read them.

/// One vertex of a pattern, in canvas units.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    /// Horizontal position, 0 at the left edge of the canvas.
    pub x: f64,
    /// Vertical position, 0 at the top edge (screen coordinates).
    pub y: f64,
    /// 24-bit RGB color of the segment arriving at the *next* vertex.
    pub color: u32,
    /// Marks the first vertex of a pen-lift sub-path.
    pub start: bool,
}

/// White, the color every missing or malformed color source falls back to.
pub const COLOR_WHITE: u32 = 0xFF_FF_FF;

impl Point {
    /// A point at `(x, y)` drawn in white, not starting a sub-path.
    pub fn new(x: f64, y: f64) -> Self {
        Point {
            x,
            y,
            color: COLOR_WHITE,
            start: false,
        }
    }

    /// Same as [`Point::new`] but beginning a new sub-path.
    pub fn start(x: f64, y: f64) -> Self {
        Point {
            start: true,
            ..Point::new(x, y)
        }
    }
}

/// One drawable shape: an ordered run of points, possibly containing
/// several pen-lift sub-paths (each introduced by a [`Point::start`]
/// vertex). When `close` is set, every sub-path is connected back to its
/// own start point after its last vertex.
#[derive(Debug, Clone, PartialEq)]
pub struct Pattern {
    /// Vertices in document order.
    pub points: Vec<Point>,
    /// Whether each sub-path is closed back to its start.
    pub close: bool,
}

/// One timed frame of the show.
#[derive(Debug, Clone, PartialEq)]
pub struct Scene {
    /// Display duration in milliseconds.
    pub time_ms: u32,
    /// Device-defined play-mode selector.
    pub play_mode: u8,
    /// Patterns drawn while this scene is up.
    pub patterns: Vec<Pattern>,
    /// Output intensity per physical channel, 0..=255. Must be the same
    /// length for every scene fed into one payload build.
    pub channel_values: Vec<u8>,
}

/// Device- and show-level knobs for the payload builder.
#[derive(Debug, Clone)]
pub struct BuildOptions {
    /// Display label written into the payload trailer.
    pub tf1_name: String,
    /// Device-defined weight field of the header.
    pub weight: u16,
    /// Device tag; only the first 4 ASCII bytes land in the header.
    pub device_type: String,
    /// Canvas width in canvas units.
    pub canvas_width: u32,
    /// Canvas height in canvas units.
    pub canvas_height: u32,
}

impl Default for BuildOptions {
    fn default() -> Self {
        BuildOptions {
            tf1_name: "AUTO1".to_string(),
            weight: 1,
            device_type: "DQF6_LS01".to_string(),
            canvas_width: 360,
            canvas_height: 360,
        }
    }
}
