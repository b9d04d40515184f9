//! Encodes a scene's patterns into the fixed-width polar byte stream the
//! projector firmware walks at playback time. Each vertex becomes two
//! little-endian 16-bit words:
//!
//! - word 1: a 3-bit dominant-primary color code (bits 15..13) plus a
//!   13-bit radius from the canvas center, scaled to 0..4095.
//! - word 2: a 6-bit turn hint (bits 15..10) plus the vertex bearing on a
//!   1024-tick circle (bits 9..0).
//!
//! Closed sub-paths get one extra synthetic vertex re-encoding their
//! start point, so the beam returns home without a pen lift.
//!
//! The encoding is a pure function of its inputs; identical patterns on
//! the same canvas always produce byte-identical output. The payload
//! builder relies on that to deduplicate blobs.

use std::f64::consts::PI;

use crate::scene::{Pattern, Point};

/// Ticks in one full turn of the firmware's angle units.
const ANGLE_TICKS: f64 = 1024.0;

/// Full-scale value of the 13-bit radius field.
const RADIUS_SCALE: f64 = 4095.0;

fn center_of(canvas_width: u32, canvas_height: u32) -> (f64, f64) {
    (canvas_width as f64 / 2.0, canvas_height as f64 / 2.0)
}

/// Bearing of `p` seen from the canvas center, in 1024ths of a turn.
/// Screen coordinates: Y grows downward, so "above center" is north.
/// Axis-aligned points use exact constants so quantization can never
/// push them off-axis.
fn point_angle(center: (f64, f64), p: &Point) -> u16 {
    let (cx, cy) = center;
    if cx == p.x && cy == p.y {
        return 0;
    }
    if cx == p.x {
        return if cy > p.y { 256 } else { 768 };
    }
    if cy == p.y {
        return if cx < p.x { 0 } else { 512 };
    }

    let dx = (cx - p.x).abs();
    let dy = (cy - p.y).abs();
    let a = (dy / dx).atan();
    let ticks = if cx < p.x && cy > p.y {
        a / PI / 2.0 * ANGLE_TICKS
    } else if cx > p.x && cy > p.y {
        (PI - a) / PI / 2.0 * ANGLE_TICKS
    } else if cx > p.x && cy < p.y {
        (PI + a) / PI / 2.0 * ANGLE_TICKS
    } else {
        (2.0 * PI - a) / PI / 2.0 * ANGLE_TICKS
    };
    ticks.round() as u16
}

/// Quantized angle between the incoming and outgoing segments at `cur`,
/// reflected into [0, pi] and scaled to 0..=63, pre-shifted into the top
/// bits of the second word.
fn turn_bits(prev: &Point, cur: &Point, next: &Point) -> u16 {
    let a1 = (cur.y - prev.y).atan2(prev.x - cur.x);
    let a2 = (cur.y - next.y).atan2(next.x - cur.x);
    let mut d = (a2 - a1).abs();
    if d > PI {
        d = 2.0 * PI - d;
    }
    ((d / PI * 63.0).round() as u16) << 10
}

/// Coarse "which primaries are dominant" code for the LED driver: one
/// bit per primary exceeding half of the brightest channel.
fn color_bits(color: u32) -> u16 {
    let r = ((color >> 16) & 0xFF) as f64;
    let g = ((color >> 8) & 0xFF) as f64;
    let b = (color & 0xFF) as f64;
    let threshold = r.max(g).max(b) / 2.0;
    let mut out = 0;
    if b > threshold {
        out |= 1 << 15;
    }
    if g > threshold {
        out |= 1 << 14;
    }
    if r > threshold {
        out |= 1 << 13;
    }
    out
}

/// Encodes one vertex as its two little-endian words. Color is taken
/// from `prev` because it belongs to the incoming segment; start points
/// have no incoming segment and carry no color bits.
#[allow(clippy::too_many_arguments)]
fn encode_step(
    is_start: bool,
    prev: Option<&Point>,
    cur: &Point,
    next: Option<&Point>,
    center: (f64, f64),
    canvas_width: u32,
    canvas_height: u32,
    out: &mut Vec<u8>,
) {
    let mut first_word: u16 = 0;
    if !is_start {
        if let Some(prev) = prev {
            first_word |= color_bits(prev.color);
        }
    }

    let dx = (cur.x - center.0).abs() / (canvas_width as f64 - 1.0) * RADIUS_SCALE;
    let dy = (cur.y - center.1).abs() / (canvas_height as f64 - 1.0) * RADIUS_SCALE;
    // The 0.98 factor keeps rounding out of the color bits. Radii are
    // assumed to fit in 13 bits after it; no clamp, matching the device
    // protocol as deployed.
    let radius = ((dx * dx + dy * dy).sqrt() * 0.98).round() as u16;
    first_word = first_word.wrapping_add(radius);
    out.extend_from_slice(&first_word.to_le_bytes());

    let mut second_word: u16 = 0;
    if !is_start {
        if let (Some(prev), Some(next)) = (prev, next) {
            // A turn spanning a pen lift has no meaning.
            if !next.start {
                second_word |= turn_bits(prev, cur, next);
            }
        }
    }
    // Quantization can round a hair-off-axis bearing up to a full 1024
    // ticks; together with a near-straight turn hint the sum exceeds 16
    // bits, so wrap like the first word does.
    second_word = second_word.wrapping_add(point_angle(center, cur));
    out.extend_from_slice(&second_word.to_le_bytes());
}

/// Start vertex of the sub-path that `points[idx]` belongs to.
fn sub_path_start(points: &[Point], idx: usize) -> Option<&Point> {
    points[..=idx].iter().rev().find(|p| p.start)
}

/// Encodes `patterns` into the raw vertex byte stream, 4 bytes per
/// vertex in document order, appending one synthetic closing vertex per
/// sub-path of every pattern whose `close` flag is set.
pub fn encode_patterns(patterns: &[Pattern], canvas_width: u32, canvas_height: u32) -> Vec<u8> {
    let center = center_of(canvas_width, canvas_height);
    let mut out = Vec::new();
    for pattern in patterns {
        let pts = &pattern.points;
        for (i, cur) in pts.iter().enumerate() {
            let prev = if i > 0 { Some(&pts[i - 1]) } else { None };
            let next = pts.get(i + 1);
            encode_step(
                cur.start,
                prev,
                cur,
                next,
                center,
                canvas_width,
                canvas_height,
                &mut out,
            );
            let ends_sub_path = match next {
                Some(n) => n.start,
                None => true,
            };
            if pattern.close && ends_sub_path {
                if let Some(start_point) = sub_path_start(pts, i) {
                    encode_step(
                        false,
                        Some(cur),
                        start_point,
                        next,
                        center,
                        canvas_width,
                        canvas_height,
                        &mut out,
                    );
                }
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::COLOR_WHITE;

    fn pattern(points: Vec<Point>, close: bool) -> Pattern {
        Pattern { points, close }
    }

    fn word(bytes: &[u8], idx: usize) -> u16 {
        u16::from_le_bytes([bytes[2 * idx], bytes[2 * idx + 1]])
    }

    #[test]
    fn axis_aligned_angles_use_exact_constants() {
        let center = (180.0, 180.0);
        assert_eq!(point_angle(center, &Point::new(300.0, 180.0)), 0);
        assert_eq!(point_angle(center, &Point::new(180.0, 60.0)), 256);
        assert_eq!(point_angle(center, &Point::new(60.0, 180.0)), 512);
        assert_eq!(point_angle(center, &Point::new(180.0, 300.0)), 768);
        assert_eq!(point_angle(center, &Point::new(180.0, 180.0)), 0);
    }

    #[test]
    fn diagonal_angles_land_in_the_right_quadrant() {
        let center = (180.0, 180.0);
        // 45 degrees into each quadrant, counting counterclockwise from
        // east in screen coordinates.
        assert_eq!(point_angle(center, &Point::new(280.0, 80.0)), 128);
        assert_eq!(point_angle(center, &Point::new(80.0, 80.0)), 384);
        assert_eq!(point_angle(center, &Point::new(80.0, 280.0)), 640);
        assert_eq!(point_angle(center, &Point::new(280.0, 280.0)), 896);
    }

    #[test]
    fn straight_line_has_maximum_turn_hint() {
        // Collinear points: incoming and outgoing directions differ by
        // pi after the encoder's axis flip, giving the full 63 code.
        let a = Point::new(100.0, 180.0);
        let b = Point::new(180.0, 180.0);
        let c = Point::new(260.0, 180.0);
        assert_eq!(turn_bits(&a, &b, &c), 63 << 10);
    }

    #[test]
    fn hairpin_turn_has_zero_hint() {
        let a = Point::new(100.0, 180.0);
        let b = Point::new(180.0, 180.0);
        assert_eq!(turn_bits(&a, &b, &a), 0);
    }

    #[test]
    fn color_bits_mark_dominant_primaries() {
        assert_eq!(color_bits(0xFF_00_00), 1 << 13);
        assert_eq!(color_bits(0x00_FF_00), 1 << 14);
        assert_eq!(color_bits(0x00_00_FF), 1 << 15);
        assert_eq!(color_bits(COLOR_WHITE), 0b111 << 13);
        // 0x40 is below half of 0xFF, so red rides alone.
        assert_eq!(color_bits(0xFF_40_40), 1 << 13);
    }

    #[test]
    fn start_vertex_carries_no_color_bits() {
        let pats = vec![pattern(
            vec![
                Point {
                    color: 0xFF_00_00,
                    ..Point::start(100.0, 100.0)
                },
                Point {
                    color: 0xFF_00_00,
                    ..Point::new(200.0, 100.0)
                },
            ],
            false,
        )];
        let bytes = encode_patterns(&pats, 360, 360);
        assert_eq!(bytes.len(), 8);
        assert_eq!(word(&bytes, 0) >> 13, 0);
        assert_eq!(word(&bytes, 2) >> 13, 0b001);
    }

    #[test]
    fn closed_triangle_encodes_four_vertices() {
        let pats = vec![pattern(
            vec![
                Point::start(100.0, 100.0),
                Point::new(260.0, 100.0),
                Point::new(180.0, 240.0),
            ],
            true,
        )];
        let bytes = encode_patterns(&pats, 360, 360);
        // 3 authored vertices plus the synthetic closing one.
        assert_eq!(bytes.len(), 4 * 4);
    }

    #[test]
    fn open_polyline_has_no_closing_vertex() {
        let pats = vec![pattern(
            vec![
                Point::start(100.0, 100.0),
                Point::new(260.0, 100.0),
                Point::new(180.0, 240.0),
            ],
            false,
        )];
        assert_eq!(encode_patterns(&pats, 360, 360).len(), 3 * 4);
    }

    #[test]
    fn each_sub_path_closes_to_its_own_start() {
        let pats = vec![pattern(
            vec![
                Point::start(100.0, 100.0),
                Point::new(260.0, 100.0),
                Point::new(180.0, 240.0),
                Point::start(40.0, 40.0),
                Point::new(80.0, 40.0),
                Point::new(60.0, 80.0),
            ],
            true,
        )];
        let bytes = encode_patterns(&pats, 360, 360);
        // Two triangles, each gaining one closing vertex.
        assert_eq!(bytes.len(), 8 * 4);

        // The closing vertex of the first triangle re-encodes its start
        // point, so its angle matches vertex 0's.
        let angle = |idx: usize| word(&bytes, 2 * idx + 1) & 0x3FF;
        assert_eq!(angle(3), angle(0));
        assert_eq!(angle(7), angle(4));
    }

    #[test]
    fn near_axis_bearing_with_straight_turn_wraps_the_second_word() {
        let center = (180.0, 180.0);
        // Just below the east axis: the bearing quantizes up to a full
        // 1024 ticks instead of 0.
        assert_eq!(point_angle(center, &Point::new(359.0, 180.4)), 1024);

        // A near-straight run through that vertex adds the maximum turn
        // hint (63 << 10), pushing the word past 16 bits.
        let pats = vec![pattern(
            vec![
                Point::start(0.0, 180.0),
                Point::new(359.0, 180.4),
                Point::new(360.0, 180.4012),
            ],
            false,
        )];
        let bytes = encode_patterns(&pats, 360, 360);
        assert_eq!(bytes.len(), 3 * 4);
        // (63 << 10) + 1024 wraps to 0.
        assert_eq!(word(&bytes, 3), 0);
    }

    #[test]
    fn encoding_is_deterministic() {
        let pats = vec![pattern(
            vec![
                Point::start(12.5, 301.0),
                Point::new(359.0, 0.0),
                Point::new(77.7, 123.4),
            ],
            true,
        )];
        assert_eq!(
            encode_patterns(&pats, 360, 360),
            encode_patterns(&pats, 360, 360)
        );
    }

    #[test]
    fn center_point_has_zero_radius() {
        let pats = vec![pattern(vec![Point::start(180.0, 180.0)], false)];
        let bytes = encode_patterns(&pats, 360, 360);
        assert_eq!(word(&bytes, 0), 0);
        assert_eq!(word(&bytes, 1), 0);
    }

    #[test]
    fn corner_point_reaches_near_full_scale_radius() {
        let pats = vec![pattern(vec![Point::start(0.0, 0.0)], false)];
        let bytes = encode_patterns(&pats, 360, 360);
        let radius = word(&bytes, 0) & 0x1FFF;
        // sqrt(2) * 2047.5-ish, scaled by 0.98.
        let expected = ((180.0 / 359.0) * 4095.0 * std::f64::consts::SQRT_2 * 0.98).round() as u16;
        assert_eq!(radius, expected);
    }
}
