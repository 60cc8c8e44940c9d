use crate::geometry::{Point, Segment, compress_path, points_to_segments};

/// Right-angle route from `start` to `end` through the midpoint of the dominant
/// axis. Horizontal-first wins ties.
pub fn plan(start: Point, end: Point) -> Vec<Segment> {
    if start.approx_eq(end) {
        return Vec::new();
    }
    let dx = end.x - start.x;
    let dy = end.y - start.y;

    let points = if dx.abs() >= dy.abs() {
        let mid_x = start.x + dx / 2.0;
        [
            start,
            Point::new(mid_x, start.y),
            Point::new(mid_x, end.y),
            end,
        ]
    } else {
        let mid_y = start.y + dy / 2.0;
        [
            start,
            Point::new(start.x, mid_y),
            Point::new(end.x, mid_y),
            end,
        ]
    };
    points_to_segments(&compress_path(&points))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{Orientation, is_continuous};

    fn orientations(segments: &[Segment]) -> Vec<Option<Orientation>> {
        segments.iter().map(Segment::orientation).collect()
    }

    #[test]
    fn degenerate_wire_is_empty() {
        assert!(plan(Point::new(3.0, 4.0), Point::new(3.0, 4.0)).is_empty());
    }

    #[test]
    fn equal_y_is_single_horizontal() {
        let segments = plan(Point::new(0.0, 10.0), Point::new(-80.0, 10.0));
        assert_eq!(segments.len(), 1);
        assert_eq!(segments[0].orientation(), Some(Orientation::Horizontal));
        assert_eq!(segments[0].a, Point::new(0.0, 10.0));
        assert_eq!(segments[0].b, Point::new(-80.0, 10.0));
    }

    #[test]
    fn equal_x_is_single_vertical() {
        let segments = plan(Point::new(5.0, 0.0), Point::new(5.0, 40.0));
        assert_eq!(segments.len(), 1);
        assert_eq!(segments[0].orientation(), Some(Orientation::Vertical));
    }

    #[test]
    fn wide_displacement_goes_horizontal_first() {
        let start = Point::new(0.0, 0.0);
        let end = Point::new(100.0, 100.0);
        let segments = plan(start, end);
        assert_eq!(
            segments,
            vec![
                Segment::new(start, Point::new(50.0, 0.0)),
                Segment::new(Point::new(50.0, 0.0), Point::new(50.0, 100.0)),
                Segment::new(Point::new(50.0, 100.0), end),
            ]
        );
    }

    #[test]
    fn tall_displacement_goes_vertical_first() {
        let start = Point::new(10.0, 100.0);
        let end = Point::new(100.0, 0.0);
        let segments = plan(start, end);
        assert_eq!(segments.len(), 3);
        assert_eq!(
            orientations(&segments),
            vec![
                Some(Orientation::Vertical),
                Some(Orientation::Horizontal),
                Some(Orientation::Vertical)
            ]
        );
        assert_eq!(segments[1].a, Point::new(10.0, 50.0));
        assert_eq!(segments[1].b, Point::new(100.0, 50.0));
    }

    #[test]
    fn paths_are_continuous_and_anchored() {
        let cases = [
            (Point::new(-20.0, 7.5), Point::new(33.0, -90.0)),
            (Point::new(0.0, 0.0), Point::new(1.0, 300.0)),
            (Point::new(250.0, 40.0), Point::new(10.0, 60.0)),
        ];
        for (start, end) in cases {
            let segments = plan(start, end);
            assert!(is_continuous(&segments));
            assert_eq!(segments.first().map(|s| s.a), Some(start));
            assert_eq!(segments.last().map(|s| s.b), Some(end));
            assert!(segments.iter().all(|s| s.orientation().is_some()));
        }
    }
}
