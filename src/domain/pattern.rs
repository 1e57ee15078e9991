/// Draw activity: target shapes.
///
/// Each shape family has a closed-form generator producing a dense
/// outline (what the stroke is compared against) and a handful of guide
/// points (what the renderer highlights). Selection is uniform.

use rand::Rng;

use super::geometry::{full_turn, on_circle, sample_bezier, shape_distance, similarity, Point};

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum ShapeKind {
    Circle,
    Heart,
    Infinity,
    Star,
    Spiral,
}

pub const ALL_SHAPES: [ShapeKind; 5] = [
    ShapeKind::Circle,
    ShapeKind::Heart,
    ShapeKind::Infinity,
    ShapeKind::Star,
    ShapeKind::Spiral,
];

/// Outline radius in arena units. Large enough that a trace quantised to
/// terminal cells on an 80×24 screen still reads as its shape.
pub const PATTERN_SIZE: f64 = 150.0;

const BEZIER_STEPS: usize = 24;
const CIRCLE_STEPS: usize = 64;
const SPIRAL_STEPS: usize = 100;
const SPIRAL_TURNS: f64 = 3.0;
const STAR_TIPS: usize = 5;
const STAR_INNER_RATIO: f64 = 0.4;

#[derive(Clone, Debug)]
pub struct Pattern {
    pub id: u64,
    pub kind: ShapeKind,
    pub outline: Vec<Point>,
    pub guides: Vec<Point>,
    /// Closed outlines join their last point back to the first.
    pub closed: bool,
}

impl ShapeKind {
    pub fn name(self) -> &'static str {
        match self {
            ShapeKind::Circle => "cercle",
            ShapeKind::Heart => "cœur",
            ShapeKind::Infinity => "infini",
            ShapeKind::Star => "étoile",
            ShapeKind::Spiral => "spirale",
        }
    }

    pub fn is_closed(self) -> bool {
        !matches!(self, ShapeKind::Spiral)
    }
}

impl Pattern {
    /// How well a stroke traces this pattern, in `0.0..=1.0`.
    ///
    /// A stroke that fits another shape family better is marked down by
    /// the squared ratio of the two distances, so a circle drawn over the
    /// heart does not pass for the heart.
    pub fn trace_similarity(&self, stroke: &[Point]) -> f64 {
        let own = shape_distance(stroke, &self.outline, self.closed);
        if !own.is_finite() {
            return 0.0;
        }
        let rival = ALL_SHAPES.iter()
            .filter(|&&kind| kind != self.kind)
            .map(|&kind| {
                let other = build_pattern(kind, 0, Point::default(), PATTERN_SIZE);
                shape_distance(stroke, &other.outline, other.closed)
            })
            .fold(f64::INFINITY, f64::min);

        let fit = similarity(own);
        if rival < own { fit * (rival / own).powi(2) } else { fit }
    }
}

/// Pick a shape family uniformly and build it around `center`.
pub fn random_pattern<R: Rng + ?Sized>(rng: &mut R, id: u64, center: Point, size: f64) -> Pattern {
    let kind = ALL_SHAPES[rng.random_range(0..ALL_SHAPES.len())];
    build_pattern(kind, id, center, size)
}

pub fn build_pattern(kind: ShapeKind, id: u64, center: Point, size: f64) -> Pattern {
    let (outline, guides) = match kind {
        ShapeKind::Circle => (circle_outline(center, size), circle_guides(center, size, 8)),
        ShapeKind::Heart => (heart_outline(center, size), heart_guides(center, size)),
        ShapeKind::Infinity => (infinity_outline(center, size), infinity_guides(center, size)),
        ShapeKind::Star => (star_outline(center, size), star_guides(center, size)),
        ShapeKind::Spiral => (spiral_outline(center, size), spiral_guides(center, size)),
    };
    Pattern { id, kind, outline, guides, closed: kind.is_closed() }
}

// ── Circle ──

fn circle_outline(c: Point, r: f64) -> Vec<Point> {
    (0..CIRCLE_STEPS)
        .map(|i| on_circle(c, r, full_turn() * i as f64 / CIRCLE_STEPS as f64))
        .collect()
}

fn circle_guides(c: Point, r: f64, count: usize) -> Vec<Point> {
    (0..count)
        .map(|i| on_circle(c, r, full_turn() * i as f64 / count as f64))
        .collect()
}

// ── Heart: two cubic Béziers meeting at the bottom tip ──

/// Heart coordinates are laid out on a ±40 grid; scaled so the top sits
/// `size` above the centre like the other families.
const HEART_UNIT: f64 = 40.0;

fn heart_outline(c: Point, size: f64) -> Vec<Point> {
    let s = size / HEART_UNIT;
    let p = |dx: f64, dy: f64| Point::new(c.x + dx * s, c.y + dy * s);
    let tip = p(0.0, 30.0);
    let top = p(0.0, -40.0);

    let mut pts = sample_bezier(tip, p(-40.0, -10.0), p(-40.0, -40.0), top, BEZIER_STEPS);
    let right = sample_bezier(top, p(40.0, -40.0), p(40.0, -10.0), tip, BEZIER_STEPS);
    pts.extend(right.into_iter().skip(1));
    pts.pop(); // closing point == tip
    pts
}

fn heart_guides(c: Point, size: f64) -> Vec<Point> {
    let s = size / HEART_UNIT;
    vec![
        Point::new(c.x, c.y + 30.0 * s),
        Point::new(c.x - 30.0 * s, c.y - 20.0 * s),
        Point::new(c.x, c.y - 40.0 * s),
        Point::new(c.x + 30.0 * s, c.y - 20.0 * s),
    ]
}

// ── Infinity: four cubic Béziers through the centre ──

fn infinity_outline(c: Point, size: f64) -> Vec<Point> {
    let w = size;
    let h = size / 2.0;
    let p = |dx: f64, dy: f64| Point::new(c.x + dx, c.y + dy);
    let segments = [
        [p(-w, 0.0), p(-w, -h), p(-w / 2.0, -h), p(0.0, 0.0)],
        [p(0.0, 0.0), p(w / 2.0, h), p(w, h), p(w, 0.0)],
        [p(w, 0.0), p(w, -h), p(w / 2.0, -h), p(0.0, 0.0)],
        [p(0.0, 0.0), p(-w / 2.0, h), p(-w, h), p(-w, 0.0)],
    ];
    let mut pts = Vec::new();
    for seg in segments {
        let sampled = sample_bezier(seg[0], seg[1], seg[2], seg[3], BEZIER_STEPS);
        let skip = if pts.is_empty() { 0 } else { 1 };
        pts.extend(sampled.into_iter().skip(skip));
    }
    pts.pop();
    pts
}

fn infinity_guides(c: Point, size: f64) -> Vec<Point> {
    vec![
        Point::new(c.x - size, c.y),
        Point::new(c.x - size / 2.0, c.y - size / 2.0),
        Point::new(c.x, c.y),
        Point::new(c.x + size / 2.0, c.y + size / 2.0),
        Point::new(c.x + size, c.y),
    ]
}

// ── Star: alternating outer / inner vertices, tip up ──

fn star_outline(c: Point, size: f64) -> Vec<Point> {
    let inner = size * STAR_INNER_RATIO;
    let vertices: Vec<Point> = (0..STAR_TIPS * 2)
        .map(|i| {
            let r = if i % 2 == 0 { size } else { inner };
            let angle = i as f64 * full_turn() / (2 * STAR_TIPS) as f64 - full_turn() / 4.0;
            on_circle(c, r, angle)
        })
        .collect();

    // Densify edges so resampling sees the corners.
    let mut pts = Vec::with_capacity(vertices.len() * 8);
    for i in 0..vertices.len() {
        let a = vertices[i];
        let b = vertices[(i + 1) % vertices.len()];
        for k in 0..8 {
            pts.push(a.lerp(b, k as f64 / 8.0));
        }
    }
    pts
}

fn star_guides(c: Point, size: f64) -> Vec<Point> {
    (0..STAR_TIPS)
        .map(|i| on_circle(c, size, i as f64 * full_turn() / STAR_TIPS as f64 - full_turn() / 4.0))
        .collect()
}

// ── Spiral: radius grows linearly over three turns; open ──

fn spiral_point(c: Point, size: f64, t: f64) -> Point {
    on_circle(c, t * size, t * SPIRAL_TURNS * full_turn())
}

fn spiral_outline(c: Point, size: f64) -> Vec<Point> {
    (0..=SPIRAL_STEPS)
        .map(|i| spiral_point(c, size, i as f64 / SPIRAL_STEPS as f64))
        .collect()
}

fn spiral_guides(c: Point, size: f64) -> Vec<Point> {
    (0..8).map(|i| spiral_point(c, size, i as f64 / 8.0)).collect()
}
