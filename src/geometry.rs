use serde::{Deserialize, Serialize};

/// Tolerance for coordinate comparisons. Canvas coordinates are in scene units, so
/// anything below this is treated as the same position.
pub const EPSILON: f32 = 1e-4;

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn approx_eq(self, other: Point) -> bool {
        (self.x - other.x).abs() <= EPSILON && (self.y - other.y).abs() <= EPSILON
    }

    pub fn distance(self, other: Point) -> f32 {
        let dx = other.x - self.x;
        let dy = other.y - self.y;
        (dx * dx + dy * dy).sqrt()
    }

    pub fn offset(self, dx: f32, dy: f32) -> Point {
        Point::new(self.x + dx, self.y + dy)
    }

    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

impl From<(f32, f32)> for Point {
    fn from((x, y): (f32, f32)) -> Self {
        Point::new(x, y)
    }
}

/// Axis-aligned bounding box of a placed component.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x_min: f32,
    pub y_min: f32,
    pub x_max: f32,
    pub y_max: f32,
}

impl Rect {
    pub const fn new(x_min: f32, y_min: f32, x_max: f32, y_max: f32) -> Self {
        Self {
            x_min,
            y_min,
            x_max,
            y_max,
        }
    }

    pub fn from_origin_size(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self::new(x, y, x + width, y + height)
    }

    pub fn width(&self) -> f32 {
        self.x_max - self.x_min
    }

    pub fn height(&self) -> f32 {
        self.y_max - self.y_min
    }

    pub fn origin(&self) -> Point {
        Point::new(self.x_min, self.y_min)
    }

    pub fn center(&self) -> Point {
        Point::new(
            (self.x_min + self.x_max) / 2.0,
            (self.y_min + self.y_max) / 2.0,
        )
    }

    pub fn translate(&self, dx: f32, dy: f32) -> Rect {
        Rect::new(
            self.x_min + dx,
            self.y_min + dy,
            self.x_max + dx,
            self.y_max + dy,
        )
    }

    /// Zero-area, inverted or non-finite rectangles cannot act as obstacles.
    pub fn is_valid(&self) -> bool {
        self.x_min.is_finite()
            && self.y_min.is_finite()
            && self.x_max.is_finite()
            && self.y_max.is_finite()
            && self.width() > EPSILON
            && self.height() > EPSILON
    }

    pub fn contains_strict(&self, p: Point) -> bool {
        p.x > self.x_min + EPSILON
            && p.x < self.x_max - EPSILON
            && p.y > self.y_min + EPSILON
            && p.y < self.y_max - EPSILON
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Orientation {
    Horizontal,
    Vertical,
}

impl Orientation {
    pub fn perpendicular(self) -> Orientation {
        match self {
            Orientation::Horizontal => Orientation::Vertical,
            Orientation::Vertical => Orientation::Horizontal,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    pub a: Point,
    pub b: Point,
}

impl Segment {
    pub const fn new(a: Point, b: Point) -> Self {
        Self { a, b }
    }

    pub fn is_horizontal(&self) -> bool {
        (self.a.y - self.b.y).abs() <= EPSILON && (self.a.x - self.b.x).abs() > EPSILON
    }

    pub fn is_vertical(&self) -> bool {
        (self.a.x - self.b.x).abs() <= EPSILON && (self.a.y - self.b.y).abs() > EPSILON
    }

    /// `None` for zero-length and diagonal segments.
    pub fn orientation(&self) -> Option<Orientation> {
        if self.is_horizontal() {
            Some(Orientation::Horizontal)
        } else if self.is_vertical() {
            Some(Orientation::Vertical)
        } else {
            None
        }
    }

    pub fn length(&self) -> f32 {
        self.a.distance(self.b)
    }

    pub fn is_degenerate(&self) -> bool {
        self.a.approx_eq(self.b)
    }

    /// Absolute angle to the horizontal axis folded into [0, 90] degrees.
    pub fn angle_to_horizontal(&self) -> f32 {
        let dx = (self.b.x - self.a.x).abs();
        let dy = (self.b.y - self.a.y).abs();
        if dx <= EPSILON && dy <= EPSILON {
            return 0.0;
        }
        dy.atan2(dx).to_degrees()
    }

    /// On-segment test. The off-axis tolerance is fixed, not scaled by length.
    pub fn contains_point(&self, p: Point) -> bool {
        let within = |v: f32, from: f32, to: f32| {
            v >= from.min(to) - EPSILON && v <= from.max(to) + EPSILON
        };
        match self.orientation() {
            Some(Orientation::Horizontal) => {
                (p.y - self.a.y).abs() <= EPSILON && within(p.x, self.a.x, self.b.x)
            }
            Some(Orientation::Vertical) => {
                (p.x - self.a.x).abs() <= EPSILON && within(p.y, self.a.y, self.b.y)
            }
            None => {
                let len = self.length();
                if len <= EPSILON {
                    return self.a.approx_eq(p);
                }
                let (ux, uy) = ((self.b.x - self.a.x) / len, (self.b.y - self.a.y) / len);
                let (px, py) = (p.x - self.a.x, p.y - self.a.y);
                let along = px * ux + py * uy;
                (px * uy - py * ux).abs() <= EPSILON && within(along, 0.0, len)
            }
        }
    }
}

/// Drops duplicate points and interior points that continue a straight run, so
/// consecutive output segments always turn.
pub fn compress_path(points: &[Point]) -> Vec<Point> {
    let mut out: Vec<Point> = Vec::with_capacity(points.len());
    for &curr in points {
        if let Some(&last) = out.last() {
            if last.approx_eq(curr) {
                continue;
            }
        }
        if out.len() >= 2 {
            let prev = out[out.len() - 2];
            let mid = out[out.len() - 1];
            let dx1 = mid.x - prev.x;
            let dy1 = mid.y - prev.y;
            let dx2 = curr.x - mid.x;
            let dy2 = curr.y - mid.y;
            let cross = dx1 * dy2 - dy1 * dx2;
            let same_direction = dx1 * dx2 + dy1 * dy2 > 0.0;
            if cross.abs() <= EPSILON && same_direction {
                out.pop();
            }
        }
        out.push(curr);
    }
    out
}

pub fn points_to_segments(points: &[Point]) -> Vec<Segment> {
    points
        .windows(2)
        .map(|pair| Segment::new(pair[0], pair[1]))
        .collect()
}

/// Inverse of [`points_to_segments`] for a continuous chain.
pub fn segments_to_points(segments: &[Segment]) -> Vec<Point> {
    let mut points = Vec::with_capacity(segments.len() + 1);
    if let Some(first) = segments.first() {
        points.push(first.a);
    }
    for segment in segments {
        points.push(segment.b);
    }
    points
}

pub fn is_continuous(segments: &[Segment]) -> bool {
    segments.windows(2).all(|pair| pair[0].b.approx_eq(pair[1].a))
}

pub fn path_length(segments: &[Segment]) -> f32 {
    segments.iter().map(Segment::length).sum()
}

pub fn path_bend_count(segments: &[Segment]) -> usize {
    segments
        .windows(2)
        .filter(|pair| {
            let dx1 = pair[0].b.x - pair[0].a.x;
            let dy1 = pair[0].b.y - pair[0].a.y;
            let dx2 = pair[1].b.x - pair[1].a.x;
            let dy2 = pair[1].b.y - pair[1].a.y;
            (dx1 * dy2 - dy1 * dx2).abs() > EPSILON
        })
        .count()
}
