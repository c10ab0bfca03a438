use nalgebra::{Point2, Rotation2, Vector2};
use std::f64::consts::{PI, TAU};

/// Signed area of the polygon through `points` (shoelace formula).
///
/// In screen coordinates (Y pointing down) a positive area means the points run clockwise
/// as seen on screen.
pub fn signed_area(points: &[Point2<f64>]) -> f64 {
    if points.len() < 3 {
        return 0.0;
    }
    let twice_area: f64 = points
        .iter()
        .zip(points.iter().cycle().skip(1))
        .map(|(p, q)| p.x * q.y - q.x * p.y)
        .sum();
    twice_area / 2.0
}

/// Angle of a vector in radians, in `(-PI, PI]`, measured from +X toward +Y.
pub fn angle_of(v: &Vector2<f64>) -> f64 {
    v.y.atan2(v.x)
}

pub fn unit_at(angle: f64) -> Vector2<f64> {
    Vector2::new(angle.cos(), angle.sin())
}

/// Wraps an angle into `[0, TAU)`.
pub fn normalize_angle(angle: f64) -> f64 {
    let wrapped = angle.rem_euclid(TAU);
    if wrapped >= TAU { 0.0 } else { wrapped }
}

pub fn rotate(v: &Vector2<f64>, angle: f64) -> Vector2<f64> {
    Rotation2::new(angle) * v
}

/// Axis-aligned bounding box as `(min, max)`, or `None` for an empty input.
pub fn bounding_box<'a>(
    points: impl IntoIterator<Item = &'a Point2<f64>>,
) -> Option<(Point2<f64>, Point2<f64>)> {
    points.into_iter().fold(None, |acc, p| match acc {
        None => Some((*p, *p)),
        Some((min, max)) => Some((
            Point2::new(min.x.min(p.x), min.y.min(p.y)),
            Point2::new(max.x.max(p.x), max.y.max(p.y)),
        )),
    })
}

pub fn bounding_box_center<'a>(
    points: impl IntoIterator<Item = &'a Point2<f64>>,
) -> Option<Point2<f64>> {
    bounding_box(points).map(|(min, max)| nalgebra::center(&min, &max))
}

/// Arithmetic mean of `points`, or `None` for an empty input.
pub fn centroid<'a>(points: impl IntoIterator<Item = &'a Point2<f64>>) -> Option<Point2<f64>> {
    let (sum, count) = points
        .into_iter()
        .fold((Vector2::zeros(), 0usize), |(sum, count), p| (sum + p.coords, count + 1));
    (count > 0).then(|| Point2::from(sum / count as f64))
}

/// Vertices of a regular polygon with the given side length.
///
/// The first vertex sits at `start_angle` as seen from `center`; successive vertices advance
/// by `TAU / n` in the direction given by `clockwise` (screen sense).
pub fn regular_polygon(
    center: &Point2<f64>,
    sides: usize,
    side_length: f64,
    start_angle: f64,
    clockwise: bool,
) -> Vec<Point2<f64>> {
    if sides < 3 {
        return Vec::new();
    }
    let radius = circumradius(sides, side_length);
    let step = (if clockwise { TAU } else { -TAU }) / sides as f64;
    (0..sides)
        .map(|k| center + unit_at(start_angle + step * k as f64) * radius)
        .collect()
}

pub fn circumradius(sides: usize, side_length: f64) -> f64 {
    side_length / (2.0 * (PI / sides as f64).sin())
}

pub fn apothem(sides: usize, side_length: f64) -> f64 {
    side_length / (2.0 * (PI / sides as f64).tan())
}

pub fn lerp(from: &Point2<f64>, to: &Point2<f64>, t: f64) -> Point2<f64> {
    from + (to - from) * t
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn signed_area_is_positive_for_screen_clockwise_points() {
        // Up, right, left on screen (Y down) runs clockwise.
        let points = [
            Point2::new(0.0, -10.0),
            Point2::new(10.0, 0.0),
            Point2::new(-10.0, 0.0),
        ];
        assert!(approx(signed_area(&points), 100.0));

        let reversed = [points[0], points[2], points[1]];
        assert!(approx(signed_area(&reversed), -100.0));
    }

    #[test]
    fn signed_area_of_degenerate_inputs_is_zero() {
        assert_eq!(signed_area(&[Point2::origin(), Point2::new(1.0, 1.0)]), 0.0);
        let collinear = [
            Point2::new(0.0, 0.0),
            Point2::new(1.0, 1.0),
            Point2::new(2.0, 2.0),
        ];
        assert!(approx(signed_area(&collinear), 0.0));
    }

    #[test]
    fn normalize_angle_wraps_into_one_turn() {
        assert!(approx(normalize_angle(-PI / 2.0), 1.5 * PI));
        assert!(approx(normalize_angle(TAU + 0.25), 0.25));
        assert!(approx(normalize_angle(0.0), 0.0));
    }

    #[test]
    fn rotate_and_unit_at_agree() {
        let v = rotate(&Vector2::new(1.0, 0.0), PI / 2.0);
        let u = unit_at(PI / 2.0);
        assert!(approx(v.x, u.x) && approx(v.y, u.y));
        assert!(approx(angle_of(&u), PI / 2.0));
    }

    #[test]
    fn bounding_box_and_center() {
        let points = [
            Point2::new(1.0, 5.0),
            Point2::new(-3.0, 2.0),
            Point2::new(4.0, -1.0),
        ];
        let (min, max) = bounding_box(&points).unwrap();
        assert_eq!(min, Point2::new(-3.0, -1.0));
        assert_eq!(max, Point2::new(4.0, 5.0));
        assert_eq!(bounding_box_center(&points), Some(Point2::new(0.5, 2.0)));
        assert!(bounding_box(&Vec::<Point2<f64>>::new()).is_none());
    }

    #[test]
    fn centroid_is_the_mean_point() {
        let points = [
            Point2::new(0.0, 0.0),
            Point2::new(6.0, 0.0),
            Point2::new(0.0, 3.0),
        ];
        assert_eq!(centroid(&points), Some(Point2::new(2.0, 1.0)));
        assert!(centroid(&Vec::<Point2<f64>>::new()).is_none());
    }

    #[test]
    fn regular_polygon_has_equal_sides() {
        let hexagon = regular_polygon(&Point2::new(10.0, 10.0), 6, 40.0, -PI / 2.0, true);
        assert_eq!(hexagon.len(), 6);
        for i in 0..6 {
            let d = (hexagon[(i + 1) % 6] - hexagon[i]).norm();
            assert!(approx(d, 40.0));
        }
        assert!(approx(circumradius(6, 40.0), 40.0));
        assert!(regular_polygon(&Point2::origin(), 2, 1.0, 0.0, true).is_empty());
    }

    #[test]
    fn lerp_interpolates_linearly() {
        let p = lerp(&Point2::new(0.0, 0.0), &Point2::new(10.0, -4.0), 0.25);
        assert_eq!(p, Point2::new(2.5, -1.0));
    }
}
