//! Optional point-reduction pre-pass run before encoding: Douglas-Peucker
//! with a tolerance in canvas units. Dense editor strokes routinely carry
//! far more vertices than the projector can usefully draw; thinning them
//! keeps payloads small and the beam fast.
//!
//! The pass is value-preserving apart from dropped vertices: sub-path
//! boundaries, start flags, colors, and `close` flags all survive, and a
//! non-positive tolerance returns the input untouched.

use crate::scene::{Pattern, Point, Scene};

/// Perpendicular distance from `p` to the line through `a` and `b`, or
/// the distance to `a` when the segment is degenerate.
fn perpendicular_distance(p: &Point, a: &Point, b: &Point) -> f64 {
    let dx = b.x - a.x;
    let dy = b.y - a.y;
    let len = (dx * dx + dy * dy).sqrt();
    if len == 0.0 {
        return ((p.x - a.x).powi(2) + (p.y - a.y).powi(2)).sqrt();
    }
    ((p.x - a.x) * dy - (p.y - a.y) * dx).abs() / len
}

/// Marks the points of one sub-path to keep, recursively splitting at
/// the vertex farthest from the current chord. Endpoints always stay.
fn mark_kept(points: &[Point], epsilon: f64, keep: &mut [bool]) {
    debug_assert_eq!(points.len(), keep.len());
    if points.len() < 3 {
        return;
    }
    let first = 0;
    let last = points.len() - 1;
    let mut max_dist = 0.0;
    let mut max_idx = first;
    for (i, p) in points.iter().enumerate().take(last).skip(first + 1) {
        let d = perpendicular_distance(p, &points[first], &points[last]);
        if d > max_dist {
            max_dist = d;
            max_idx = i;
        }
    }
    if max_dist > epsilon {
        mark_kept(&points[..=max_idx], epsilon, &mut keep[..=max_idx]);
        mark_kept(&points[max_idx..], epsilon, &mut keep[max_idx..]);
    } else {
        for flag in keep[first + 1..last].iter_mut() {
            *flag = false;
        }
    }
}

fn simplify_sub_path(points: &[Point], epsilon: f64) -> Vec<Point> {
    let mut keep = vec![true; points.len()];
    mark_kept(points, epsilon, &mut keep);
    points
        .iter()
        .zip(keep)
        .filter_map(|(p, k)| k.then_some(*p))
        .collect()
}

/// Simplifies one pattern, running Douglas-Peucker independently on each
/// pen-lift sub-path.
pub fn simplify_pattern(pattern: &Pattern, epsilon: f64) -> Pattern {
    let mut points = Vec::with_capacity(pattern.points.len());
    let mut sub_path_start = 0;
    for i in 1..=pattern.points.len() {
        let at_boundary = i == pattern.points.len() || pattern.points[i].start;
        if at_boundary {
            points.extend(simplify_sub_path(&pattern.points[sub_path_start..i], epsilon));
            sub_path_start = i;
        }
    }
    Pattern {
        points,
        close: pattern.close,
    }
}

/// Applies [`simplify_pattern`] across all scenes. `epsilon <= 0`
/// disables the pass.
pub fn simplify_scenes(scenes: Vec<Scene>, epsilon: f64) -> Vec<Scene> {
    if epsilon <= 0.0 {
        return scenes;
    }
    scenes
        .into_iter()
        .map(|scene| Scene {
            patterns: scene
                .patterns
                .iter()
                .map(|p| simplify_pattern(p, epsilon))
                .collect(),
            ..scene
        })
        .collect()
}
