use std::slice::Iter;

use crate::intersection::segment_intersection;
use crate::{Error, EPS};

use super::{BoundingBox, LineSegment, Point};

/// A simple polygon with vertices in clockwise order.
///
/// Two vertices are allowed: such a degenerate "edge polygon" behaves as a
/// double-sided wall. The clockwise order matters for the orientation test
/// applied when a query segment touches a vertex.
#[derive(Debug, Clone, PartialEq)]
pub struct Polygon {
  points: Vec<Point<2>>,
  bounding_box: BoundingBox,
}

impl Polygon {
  pub fn new(points: Vec<Point<2>>) -> Result<Polygon, Error> {
    if points.len() < 2 {
      return Err(Error::InvalidInput(
        "polygons must consist of at least 2 points".to_string(),
      ));
    }
    let mut bounding_box = BoundingBox::from_point(&points[0]);
    for p in &points[1..] {
      bounding_box.include(p);
    }
    Ok(Polygon {
      points,
      bounding_box,
    })
  }

  /// Number of vertices; always at least 2.
  pub fn len(&self) -> usize {
    self.points.len()
  }

  pub fn point_at(&self, index: usize) -> &Point<2> {
    &self.points[index]
  }

  pub fn iter(&self) -> Iter<'_, Point<2>> {
    self.points.iter()
  }

  pub fn bounding_box(&self) -> &BoundingBox {
    &self.bounding_box
  }

  /// Point-in-polygon by ray-cast parity. The ray runs from `point` to one
  /// unit left of the bounding box, so it can only leave the polygon
  /// through its sides.
  pub fn is_inside(&self, point: &Point<2>) -> bool {
    if !self.bounding_box.contains(point) {
      return false;
    }
    let ray = LineSegment::new(
      *point,
      Point::new([self.bounding_box.min_x() - 1.0, point.y_coord()]),
    );
    self.count_intersections(&ray).0 % 2 == 1
  }

  /// The boundary crossing nearest to `segment.src`, if the segment hits
  /// the polygon at all.
  pub fn intersect_segment(&self, segment: &LineSegment<2>) -> Option<Point<2>> {
    let (count, nearest) = self.count_intersections(segment);
    if count > 0 {
      nearest
    } else {
      None
    }
  }

  /// Number of boundary crossings, plus the crossing nearest to the
  /// segment source. A crossing landing exactly on a vertex is counted
  /// once: it only registers when the previous side reported the same
  /// point.
  fn count_intersections(&self, segment: &LineSegment<2>) -> (usize, Option<Point<2>>) {
    let n = self.points.len();
    let mut previous = self.side_intersection(segment, &self.points[n - 1], &self.points[0]);

    let mut count = 0;
    let mut nearest: Option<Point<2>> = None;
    for i in 0..n {
      let j = (i + 1) % n;
      match self.side_intersection(segment, &self.points[i], &self.points[j]) {
        Some(candidate) => {
          let mut crosses = !candidate.approx_eq(&self.points[i], EPS)
            && !candidate.approx_eq(&self.points[j], EPS);
          if !crosses {
            if let Some(prev) = &previous {
              crosses = candidate.approx_eq(prev, EPS);
            }
          }
          if crosses {
            let closer = match &nearest {
              Some(current) => {
                segment.src.distance_to(&candidate) < segment.src.distance_to(current)
              }
              None => true,
            };
            if closer {
              nearest = Some(candidate);
            }
            count += 1;
          }
          previous = Some(candidate);
        }
        None => previous = None,
      }
    }
    (count, nearest)
  }

  /// Intersection of the query segment with one polygon side. A crossing
  /// that coincides with a query endpoint only counts when the other query
  /// endpoint lies on the inner side of the polygon side, which keeps rays
  /// that graze a vertex from the outside from registering.
  fn side_intersection(
    &self,
    segment: &LineSegment<2>,
    side_src: &Point<2>,
    side_dst: &Point<2>,
  ) -> Option<Point<2>> {
    let candidate =
      segment_intersection(segment, &LineSegment::new(*side_src, *side_dst), EPS)?;
    if !segment.src.approx_eq(&candidate, EPS) && !segment.dst.approx_eq(&candidate, EPS) {
      return Some(candidate);
    }
    let other = if segment.src.approx_eq(&candidate, EPS) {
      &segment.dst
    } else {
      &segment.src
    };
    if (side_dst.x_coord() - side_src.x_coord()) * (other.y_coord() - side_src.y_coord())
      < (side_dst.y_coord() - side_src.y_coord()) * (other.x_coord() - side_src.x_coord())
    {
      return Some(candidate);
    }
    None
  }
}
