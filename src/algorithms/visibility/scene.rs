use std::collections::HashMap;

use crate::data::{Point, Polygon};
use crate::Error;

/// The indexed form of a 2D slice: deduplicated points, segments as point
/// index pairs, polygons as segment index lists. Everything downstream
/// (the point sorter, the envelope solver, the self-occlusion table) works
/// on these indices instead of coordinates.
#[derive(Debug, Clone, Default)]
pub struct Scene {
  pub points: Vec<Point<2>>,
  pub segments: Vec<(usize, usize)>,
  pub polygons: Vec<Vec<usize>>,
}

impl Scene {
  /// Index a list of polygon obstacles, then the extra free points
  /// (typically the query origin and target). Polygons sharing corners
  /// share point indices.
  pub fn from_polygons(polygons: &[Polygon], free_points: &[Point<2>]) -> Scene {
    let mut scene = Scene::default();
    let mut added: HashMap<Point<2>, usize> = HashMap::new();

    for poly in polygons {
      let mut segment_indices = Vec::with_capacity(poly.len());
      let mut first_point = 0;
      let mut prev_point = 0;
      for (nth, p) in poly.iter().enumerate() {
        let current = add_if_absent(&mut scene.points, &mut added, *p);
        if nth == 0 {
          first_point = current;
        } else {
          segment_indices.push(scene.push_segment(prev_point, current));
        }
        prev_point = current;
      }
      segment_indices.push(scene.push_segment(prev_point, first_point));
      scene.polygons.push(segment_indices);
    }

    for p in free_points {
      add_if_absent(&mut scene.points, &mut added, *p);
    }
    scene
  }

  fn push_segment(&mut self, a: usize, b: usize) -> usize {
    self.segments.push((a, b));
    self.segments.len() - 1
  }

  /// Internal consistency: segments point at real points, polygons at real
  /// segments, and consecutive polygon segments share an endpoint.
  pub fn validate(&self) -> Result<(), Error> {
    for &(a, b) in &self.segments {
      if a >= self.points.len() || b >= self.points.len() {
        return Err(Error::GraphCorruption(
          "scene segment references missing point".to_string(),
        ));
      }
    }
    for poly in &self.polygons {
      if poly.iter().any(|&si| si >= self.segments.len()) {
        return Err(Error::GraphCorruption(
          "scene polygon references missing segment".to_string(),
        ));
      }
      for window in poly.windows(2) {
        let (a, b) = (self.segments[window[0]], self.segments[window[1]]);
        if a.0 != b.0 && a.0 != b.1 && a.1 != b.0 && a.1 != b.1 {
          return Err(Error::GraphCorruption(
            "consecutive polygon segments share no endpoint".to_string(),
          ));
        }
      }
    }
    Ok(())
  }
}

/// Index of `point` in `points`, inserting it if new.
pub(crate) fn add_if_absent(
  points: &mut Vec<Point<2>>,
  added: &mut HashMap<Point<2>, usize>,
  point: Point<2>,
) -> usize {
  if let Some(&index) = added.get(&point) {
    return index;
  }
  let index = points.len();
  added.insert(point, index);
  points.push(point);
  index
}

#[cfg(test)]
mod tests {
  use super::*;
  use claims::assert_ok;

  #[test]
  fn shared_corners_are_deduplicated() {
    let left = assert_ok!(Polygon::new(vec![
      Point::new([0.0, 0.0]),
      Point::new([0.0, 1.0]),
      Point::new([1.0, 1.0]),
      Point::new([1.0, 0.0]),
    ]));
    let right = assert_ok!(Polygon::new(vec![
      Point::new([1.0, 0.0]),
      Point::new([1.0, 1.0]),
      Point::new([2.0, 1.0]),
      Point::new([2.0, 0.0]),
    ]));
    let scene = Scene::from_polygons(&[left, right], &[Point::new([5.0, 5.0])]);
    assert_eq!(scene.points.len(), 7);
    assert_eq!(scene.segments.len(), 8);
    assert_eq!(scene.polygons.len(), 2);
    assert_ok!(scene.validate());
  }

  #[test]
  fn two_point_polygon_becomes_double_wall() {
    let wall = assert_ok!(Polygon::new(vec![
      Point::new([0.0, 0.0]),
      Point::new([1.0, 0.0]),
    ]));
    let scene = Scene::from_polygons(&[wall], &[]);
    assert_eq!(scene.points.len(), 2);
    assert_eq!(scene.segments, vec![(0, 1), (1, 0)]);
    assert_eq!(scene.polygons, vec![vec![0, 1]]);
    assert_ok!(scene.validate());
  }

  #[test]
  fn free_point_matching_a_corner_is_reused() {
    let square = assert_ok!(Polygon::new(vec![
      Point::new([0.0, 0.0]),
      Point::new([0.0, 1.0]),
      Point::new([1.0, 1.0]),
      Point::new([1.0, 0.0]),
    ]));
    let scene = Scene::from_polygons(&[square], &[Point::new([0.0, 0.0])]);
    assert_eq!(scene.points.len(), 4);
  }
}
