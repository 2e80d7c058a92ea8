use crate::data::{LineSegment, Point, Vector};
use crate::transformation::Transform;
use crate::{Error, EPS};

/// Intersection point of two 2D segments, if they cross.
///
/// The crossing of the carrier lines is accepted when it lies inside both
/// segments' coordinate ranges, each extended by `epsilon`. Parallel
/// segments never intersect, overlapping collinear ones included.
pub fn segment_intersection(
  s1: &LineSegment<2>,
  s2: &LineSegment<2>,
  epsilon: f64,
) -> Option<Point<2>> {
  let (x1, y1) = (s1.src.x_coord(), s1.src.y_coord());
  let (x2, y2) = (s1.dst.x_coord(), s1.dst.y_coord());
  let (x3, y3) = (s2.src.x_coord(), s2.src.y_coord());
  let (x4, y4) = (s2.dst.x_coord(), s2.dst.y_coord());

  let denominator = (x1 - x2) * (y3 - y4) - (y1 - y2) * (x3 - x4);
  if denominator == 0.0 {
    return None;
  }

  let denominator_inv = 1.0 / denominator;
  let first_factor = x1 * y2 - y1 * x2;
  let second_factor = x3 * y4 - y3 * x4;
  let x = (first_factor * (x3 - x4) - (x1 - x2) * second_factor) * denominator_inv;
  let y = (first_factor * (y3 - y4) - (y1 - y2) * second_factor) * denominator_inv;

  if x + epsilon >= x1.min(x2).max(x3.min(x4))
    && x - epsilon <= x1.max(x2).min(x3.max(x4))
    && y + epsilon >= y1.min(y2).max(y3.min(y4))
    && y - epsilon <= y1.max(y2).min(y3.max(y4))
  {
    Some(Point::new([x, y]))
  } else {
    None
  }
}

/// Signed distance from `origin` to the crossing of the ray at `angle`
/// (counter-clockwise from +x) with the segment `a`–`b`.
///
/// Fails with `NoIntersection` when both endpoints lie strictly on the same
/// side of the ray line, beyond `epsilon`. A segment radial to the ray
/// (both endpoints within `EPS` of it) yields the nearer endpoint.
pub fn point_to_segment_distance(
  origin: &Point<2>,
  a: &Point<2>,
  b: &Point<2>,
  angle: f64,
  epsilon: f64,
) -> Result<f64, Error> {
  let transform =
    Transform::rotate(-angle) * Transform::translate(-Vector::from(*origin));
  let s1 = &transform * a;
  let s2 = &transform * b;

  if (s1.y_coord() > epsilon && s2.y_coord() > epsilon)
    || (s1.y_coord() < -epsilon && s2.y_coord() < -epsilon)
  {
    return Err(Error::NoIntersection(format!(
      "ray at {} rad from {:?} misses segment {:?}-{:?}",
      angle, origin, a, b
    )));
  }

  if s1.y_coord().abs() < EPS && s2.y_coord().abs() < EPS {
    // The segment lies along the ray.
    return Ok(s1.x_coord().min(s2.x_coord()));
  }

  let (w1, w2);
  if s1.y_coord() > 0.0 && s2.y_coord() > 0.0 {
    // Both ends above the ray line, within tolerance of it. Weight the one
    // closer to the line.
    if s1.y_coord() > s2.y_coord() {
      w1 = 0.0;
      w2 = 1.0;
    } else {
      w1 = 1.0;
      w2 = 0.0;
    }
  } else if s1.y_coord() < 0.0 && s2.y_coord() < 0.0 {
    if s1.y_coord() > s2.y_coord() {
      w1 = 1.0;
      w2 = 0.0;
    } else {
      w1 = 0.0;
      w2 = 1.0;
    }
  } else {
    let inv_segment_height = 1.0 / (s1.y_coord() - s2.y_coord()).abs();
    w1 = s2.y_coord().abs() * inv_segment_height;
    w2 = s1.y_coord().abs() * inv_segment_height;
  }

  Ok(w1 * s1.x_coord() + w2 * s2.x_coord())
}

/// Crossing of a 3D segment with the horizontal plane `z = plane_height`.
///
/// The crossing exists when the endpoints differ in their side of the
/// plane; an endpoint exactly on the plane paired with one off it counts as
/// a crossing at that endpoint, while two endpoints on the plane do not.
pub fn segment_horizontal_plane_intersection(
  segment: &LineSegment<3>,
  plane_height: f64,
) -> Option<Point<3>> {
  let z1 = segment.src.z_coord();
  let z2 = segment.dst.z_coord();
  if ((z1 > plane_height) ^ (z2 > plane_height)) || ((z1 < plane_height) ^ (z2 < plane_height)) {
    let zdiff_inv = 1.0 / (z1 - z2).abs();
    let first_proximity = (z1 - plane_height).abs() * zdiff_inv;
    let second_proximity = (z2 - plane_height).abs() * zdiff_inv;
    debug_assert!((first_proximity + second_proximity - 1.0).abs() < EPS);

    Some(Point::new([
      segment.src.x_coord() * second_proximity + segment.dst.x_coord() * first_proximity,
      segment.src.y_coord() * second_proximity + segment.dst.y_coord() * first_proximity,
      plane_height,
    ]))
  } else {
    None
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use claims::{assert_err, assert_ok, assert_some};
  use proptest::prelude::*;
  use test_strategy::proptest;

  fn seg2(a: [f64; 2], b: [f64; 2]) -> LineSegment<2> {
    LineSegment::new(Point::new(a), Point::new(b))
  }

  #[test]
  fn crossing_segments() {
    let ip = assert_some!(segment_intersection(
      &seg2([-1.0, 0.0], [1.0, 0.0]),
      &seg2([0.0, -1.0], [0.0, 1.0]),
      EPS
    ));
    assert!(ip.approx_eq(&Point::new([0.0, 0.0]), 1e-12));
  }

  #[test]
  fn parallel_segments_never_intersect() {
    assert_eq!(
      segment_intersection(&seg2([0.0, 0.0], [1.0, 0.0]), &seg2([0.0, 1.0], [1.0, 1.0]), EPS),
      None
    );
    // Collinear overlap is still "parallel".
    assert_eq!(
      segment_intersection(&seg2([0.0, 0.0], [2.0, 0.0]), &seg2([1.0, 0.0], [3.0, 0.0]), EPS),
      None
    );
  }

  #[test]
  fn disjoint_segments() {
    assert_eq!(
      segment_intersection(&seg2([0.0, 0.0], [1.0, 0.0]), &seg2([2.0, -1.0], [2.0, 1.0]), EPS),
      None
    );
  }

  #[proptest]
  fn intersection_is_symmetric(
    #[strategy(-100.0..100.0f64)] ax: f64,
    #[strategy(-100.0..100.0f64)] ay: f64,
    #[strategy(-100.0..100.0f64)] bx: f64,
    #[strategy(-100.0..100.0f64)] by: f64,
    #[strategy(-100.0..100.0f64)] cx: f64,
    #[strategy(-100.0..100.0f64)] cy: f64,
    #[strategy(-100.0..100.0f64)] dx: f64,
    #[strategy(-100.0..100.0f64)] dy: f64,
  ) {
    let s1 = seg2([ax, ay], [bx, by]);
    let s2 = seg2([cx, cy], [dx, dy]);
    match (
      segment_intersection(&s1, &s2, EPS),
      segment_intersection(&s2, &s1, EPS),
    ) {
      (Some(p), Some(q)) => prop_assert!(p.approx_eq(&q, 1e-6)),
      (None, None) => {}
      other => prop_assert!(false, "asymmetric outcome {:?}", other),
    }
  }

  #[test]
  fn ray_distance_straddling_segment() {
    let d = assert_ok!(point_to_segment_distance(
      &Point::new([0.0, 0.0]),
      &Point::new([2.0, -1.0]),
      &Point::new([2.0, 1.0]),
      0.0,
      EPS
    ));
    assert!((d - 2.0).abs() < 1e-12);
  }

  #[test]
  fn ray_distance_misses_offset_segment() {
    assert_err!(point_to_segment_distance(
      &Point::new([0.0, 0.0]),
      &Point::new([2.0, 1.0]),
      &Point::new([3.0, 2.0]),
      0.0,
      EPS
    ));
  }

  #[test]
  fn ray_distance_radial_segment() {
    let d = assert_ok!(point_to_segment_distance(
      &Point::new([0.0, 0.0]),
      &Point::new([3.0, 0.0]),
      &Point::new([5.0, 0.0]),
      0.0,
      EPS
    ));
    assert!((d - 3.0).abs() < 1e-12);
  }

  #[test]
  fn plane_crossing() {
    let seg = LineSegment::new(Point::new([0.0, 0.0, 0.0]), Point::new([2.0, 2.0, 4.0]));
    let ip = assert_some!(segment_horizontal_plane_intersection(&seg, 1.0));
    assert!(ip.approx_eq(&Point::new([0.5, 0.5, 1.0]), 1e-12));
  }

  #[test]
  fn plane_touching_endpoint_counts_once() {
    let up = LineSegment::new(Point::new([0.0, 0.0, 1.0]), Point::new([0.0, 0.0, 3.0]));
    let through = LineSegment::new(Point::new([0.0, 0.0, 1.0]), Point::new([0.0, 0.0, -1.0]));
    let flat = LineSegment::new(Point::new([0.0, 0.0, 1.0]), Point::new([1.0, 0.0, 1.0]));
    assert_eq!(segment_horizontal_plane_intersection(&up, 0.0), None);
    assert_some!(segment_horizontal_plane_intersection(&through, 1.0));
    assert_eq!(segment_horizontal_plane_intersection(&flat, 1.0), None);
  }
}
