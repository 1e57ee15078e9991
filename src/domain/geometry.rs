/// 2D geometry: points, curves, and the stroke-vs-outline shape matcher.
///
/// Shape matching pipeline:
///   1. Resample both curves to `MATCH_POINTS` equidistant points; against
///      a closed outline the stroke is closed too, so both are rings
///   2. Normalise: centroid to origin, unit RMS radius
///   3. Dynamic time warping, mean matched distance
///   4. Closed outlines: best over every start offset, both directions
///
/// Translation and scale are factored out, so a stroke drawn a little off
/// the displayed guide still matches its shape.

use std::f64::consts::PI;

#[derive(Clone, Copy, PartialEq, Debug, Default)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Point { x, y }
    }

    pub fn distance(self, other: Point) -> f64 {
        ((self.x - other.x).powi(2) + (self.y - other.y).powi(2)).sqrt()
    }

    pub fn lerp(self, other: Point, t: f64) -> Point {
        Point::new(
            self.x + (other.x - self.x) * t,
            self.y + (other.y - self.y) * t,
        )
    }
}

/// Number of points both curves are resampled to before comparison.
pub const MATCH_POINTS: usize = 64;

/// Mean normalised distance at which similarity reaches zero.
pub const MATCH_TOLERANCE: f64 = 0.6;

// ── Curves ──

pub fn cubic_bezier(p0: Point, p1: Point, p2: Point, p3: Point, t: f64) -> Point {
    let u = 1.0 - t;
    let a = u * u * u;
    let b = 3.0 * u * u * t;
    let c = 3.0 * u * t * t;
    let d = t * t * t;
    Point::new(
        a * p0.x + b * p1.x + c * p2.x + d * p3.x,
        a * p0.y + b * p1.y + c * p2.y + d * p3.y,
    )
}

/// Sample a cubic Bézier into `steps + 1` points (both ends included).
pub fn sample_bezier(p0: Point, p1: Point, p2: Point, p3: Point, steps: usize) -> Vec<Point> {
    let steps = steps.max(1);
    (0..=steps)
        .map(|i| cubic_bezier(p0, p1, p2, p3, i as f64 / steps as f64))
        .collect()
}

/// Point on a circle, angle in radians.
pub fn on_circle(center: Point, radius: f64, angle: f64) -> Point {
    Point::new(center.x + angle.cos() * radius, center.y + angle.sin() * radius)
}

pub fn full_turn() -> f64 {
    2.0 * PI
}

pub fn path_length(path: &[Point]) -> f64 {
    path.windows(2).map(|w| w[0].distance(w[1])).sum()
}

// ── Resampling / normalisation ──

/// Resample a polyline to `n` points spaced evenly along its arc length.
/// Degenerate inputs (fewer than two points, zero length) are returned
/// as `n` copies of the first point, or empty if there is none.
pub fn resample(path: &[Point], n: usize) -> Vec<Point> {
    let Some(&first) = path.first() else { return vec![] };
    if n == 0 {
        return vec![];
    }
    let total = path_length(path);
    if path.len() < 2 || total < 1e-9 || n == 1 {
        return vec![first; n];
    }

    let mut cumulative = Vec::with_capacity(path.len());
    cumulative.push(0.0);
    for w in path.windows(2) {
        let last = cumulative[cumulative.len() - 1];
        cumulative.push(last + w[0].distance(w[1]));
    }

    let mut out = Vec::with_capacity(n);
    let mut seg = 1;
    for i in 0..n {
        let target = total * i as f64 / (n - 1) as f64;
        while seg < path.len() - 1 && cumulative[seg] < target {
            seg += 1;
        }
        let span = (cumulative[seg] - cumulative[seg - 1]).max(1e-9);
        let t = ((target - cumulative[seg - 1]) / span).clamp(0.0, 1.0);
        out.push(path[seg - 1].lerp(path[seg], t));
    }
    out
}

/// Resample a closed outline: the closing segment back to the start is
/// included and the duplicate end point is dropped.
pub fn resample_closed(outline: &[Point], n: usize) -> Vec<Point> {
    let Some(&first) = outline.first() else { return vec![] };
    let mut ring = outline.to_vec();
    ring.push(first);
    let mut out = resample(&ring, n + 1);
    out.pop();
    out
}

/// Move the centroid to the origin and scale to unit RMS radius.
/// Returns `None` for a curve with no spatial extent.
pub fn normalize(path: &[Point]) -> Option<Vec<Point>> {
    if path.is_empty() {
        return None;
    }
    let n = path.len() as f64;
    let cx = path.iter().map(|p| p.x).sum::<f64>() / n;
    let cy = path.iter().map(|p| p.y).sum::<f64>() / n;
    let rms = (path.iter()
        .map(|p| (p.x - cx).powi(2) + (p.y - cy).powi(2))
        .sum::<f64>() / n)
        .sqrt();
    if rms < 1e-9 {
        return None;
    }
    Some(path.iter().map(|p| Point::new((p.x - cx) / rms, (p.y - cy) / rms)).collect())
}

// ── Dynamic time warping ──

/// Classic O(n·m) DTW with Euclidean point cost. Returns the accumulated
/// cost divided by the longer sequence length.
pub fn dtw_mean_distance(a: &[Point], b: &[Point]) -> f64 {
    if a.is_empty() || b.is_empty() {
        return f64::INFINITY;
    }
    let m = b.len();
    let mut prev = vec![f64::INFINITY; m + 1];
    let mut curr = vec![f64::INFINITY; m + 1];
    prev[0] = 0.0;

    for pa in a {
        curr[0] = f64::INFINITY;
        for (j, pb) in b.iter().enumerate() {
            let cost = pa.distance(*pb);
            let best = prev[j].min(prev[j + 1]).min(curr[j]);
            curr[j + 1] = cost + best;
        }
        std::mem::swap(&mut prev, &mut curr);
    }
    prev[m] / a.len().max(m) as f64
}

// ── Shape distance ──

/// Mean normalised distance between a free-hand stroke and a target
/// outline; `INFINITY` when either has no usable extent.
/// `closed` outlines may be traced from any start point in either direction.
pub fn shape_distance(stroke: &[Point], outline: &[Point], closed: bool) -> f64 {
    if stroke.len() < 2 || outline.len() < 2 {
        return f64::INFINITY;
    }
    let (drawn, target) = if closed {
        (resample_closed(stroke, MATCH_POINTS), resample_closed(outline, MATCH_POINTS))
    } else {
        (resample(stroke, MATCH_POINTS), resample(outline, MATCH_POINTS))
    };
    let (Some(drawn), Some(target)) = (normalize(&drawn), normalize(&target)) else {
        return f64::INFINITY;
    };

    let mut reversed = target.clone();
    reversed.reverse();

    let mut best = f64::INFINITY;
    for candidate in [&target, &reversed] {
        if closed {
            for shift in 0..candidate.len() {
                let rotated: Vec<Point> = candidate[shift..].iter()
                    .chain(candidate[..shift].iter())
                    .copied()
                    .collect();
                best = best.min(dtw_mean_distance(&drawn, &rotated));
            }
        } else {
            best = best.min(dtw_mean_distance(&drawn, candidate));
        }
    }
    best
}

/// Map a shape distance onto `0.0..=1.0`: 1 for a perfect fit, 0 at
/// `MATCH_TOLERANCE` and beyond.
pub fn similarity(distance: f64) -> f64 {
    (1.0 - distance / MATCH_TOLERANCE).clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn circle(center: Point, r: f64, n: usize) -> Vec<Point> {
        (0..n).map(|i| on_circle(center, r, full_turn() * i as f64 / n as f64)).collect()
    }

    #[test]
    fn resample_spacing_is_even() {
        let line = vec![Point::new(0.0, 0.0), Point::new(3.0, 0.0), Point::new(3.0, 3.0)];
        let r = resample(&line, 7);
        assert_eq!(r.len(), 7);
        assert_eq!(r[0], Point::new(0.0, 0.0));
        assert!((r[6].x - 3.0).abs() < 1e-9 && (r[6].y - 3.0).abs() < 1e-9);
        for w in r.windows(2) {
            assert!((w[0].distance(w[1]) - 1.0).abs() < 1e-9);
        }
    }

    #[test]
    fn resample_degenerate_inputs() {
        assert!(resample(&[], 5).is_empty());
        let p = Point::new(2.0, 2.0);
        assert_eq!(resample(&[p], 3), vec![p; 3]);
        assert_eq!(resample(&[p, p], 2), vec![p; 2]);
    }

    #[test]
    fn resample_closed_includes_closing_edge() {
        let square = vec![
            Point::new(0.0, 0.0), Point::new(1.0, 0.0),
            Point::new(1.0, 1.0), Point::new(0.0, 1.0),
        ];
        let r = resample_closed(&square, 8);
        assert_eq!(r.len(), 8);
        // Perimeter 4 over 8 points: every step is half a unit.
        for w in r.windows(2) {
            assert!((w[0].distance(w[1]) - 0.5).abs() < 1e-9);
        }
        assert!((r[7].distance(r[0]) - 0.5).abs() < 1e-9);
    }

    #[test]
    fn normalize_removes_position_and_scale() {
        let a = normalize(&circle(Point::new(0.0, 0.0), 1.0, 16)).unwrap();
        let b = normalize(&circle(Point::new(200.0, -50.0), 75.0, 16)).unwrap();
        for (p, q) in a.iter().zip(&b) {
            assert!(p.distance(*q) < 1e-9);
        }
        assert!(normalize(&[Point::new(1.0, 1.0); 4]).is_none());
    }

    #[test]
    fn dtw_of_identical_sequences_is_zero() {
        let c = circle(Point::default(), 1.0, 12);
        assert!(dtw_mean_distance(&c, &c) < 1e-12);
    }

    #[test]
    fn dtw_tolerates_uneven_speed() {
        let even: Vec<Point> = (0..10).map(|i| Point::new(i as f64, 0.0)).collect();
        let mut slow_start = vec![Point::new(0.0, 0.0); 4];
        slow_start.extend(even.iter().copied());
        assert!(dtw_mean_distance(&slow_start, &even) < 1e-12);
    }

    #[test]
    fn closed_stroke_from_any_start_matches_exactly() {
        let outline = circle(Point::new(200.0, 350.0), 120.0, 64);
        let mut stroke: Vec<Point> = outline[10..].iter().chain(&outline[..10]).copied().collect();
        stroke.reverse();
        assert!(shape_distance(&stroke, &outline, true) < 1e-6);
        assert!(similarity(shape_distance(&outline, &outline, true)) > 0.999);
    }

    #[test]
    fn faithful_trace_matches() {
        let outline = circle(Point::new(100.0, 100.0), 120.0, 64);
        // Start a quarter turn in, go the other way round, wobble a bit.
        let stroke: Vec<Point> = (0..80)
            .map(|i| {
                let a = PI / 2.0 - full_turn() * i as f64 / 79.0;
                let wobble = if i % 2 == 0 { 3.0 } else { -3.0 };
                on_circle(Point::new(104.0, 98.0), 118.0 + wobble, a)
            })
            .collect();
        let s = similarity(shape_distance(&stroke, &outline, true));
        assert!(s > 0.7, "similarity {s}");
    }

    #[test]
    fn straight_line_does_not_match_circle() {
        let outline = circle(Point::new(0.0, 0.0), 100.0, 64);
        let stroke: Vec<Point> = (0..40).map(|i| Point::new(-100.0 + 5.0 * i as f64, 0.0)).collect();
        let s = similarity(shape_distance(&stroke, &outline, true));
        assert!(s < 0.5, "similarity {s}");
    }

    #[test]
    fn too_short_stroke_scores_zero() {
        let outline = circle(Point::default(), 50.0, 16);
        assert_eq!(shape_distance(&[Point::new(1.0, 1.0)], &outline, true), f64::INFINITY);
        assert_eq!(similarity(shape_distance(&[Point::new(1.0, 1.0); 5], &outline, true)), 0.0);
    }

    #[test]
    fn bezier_endpoints() {
        let p0 = Point::new(0.0, 0.0);
        let p3 = Point::new(10.0, 5.0);
        let pts = sample_bezier(p0, Point::new(2.0, 8.0), Point::new(8.0, 8.0), p3, 10);
        assert_eq!(pts.len(), 11);
        assert_eq!(pts[0], p0);
        assert!(pts[10].distance(p3) < 1e-9);
    }
}
