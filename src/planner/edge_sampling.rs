use std::cell::RefCell;
use std::collections::HashMap;

use crate::algorithms::astar::{self, SearchGraph};
use crate::cache::Cache;
use crate::data::{LineSegment, ObstacleSet, Point};
use crate::Error;

use super::Path;

/// Maximum spacing between auxiliary sample points along prism edges.
const MAXIMUM_POINT_SEPARATION: f64 = 1.0;

/// Brute-force 3D planner: sample every vertical and roof edge of every
/// prism, then let A* probe lines of sight lazily. Probes are memoized in
/// the bounded cache, so repeated expansions stay cheap while a collision
/// only ever costs a recomputation.
pub(crate) fn find_path(
  obstacles: &ObstacleSet,
  origin: &Point<3>,
  target: &Point<3>,
) -> Result<Path<3>, Error> {
  let graph = SampledGraph::new(obstacles.clone(), *origin, *target);
  astar::find_path(&graph, origin, target)
}

struct SampledGraph {
  obstacles: ObstacleSet,
  points: Vec<Point<3>>,
  indices: HashMap<Point<3>, usize>,
  cache: RefCell<Cache<(usize, usize), bool>>,
}

impl SampledGraph {
  fn new(obstacles: ObstacleSet, origin: Point<3>, target: Point<3>) -> SampledGraph {
    let mut graph = SampledGraph {
      obstacles: ObstacleSet::default(),
      points: Vec::new(),
      indices: HashMap::new(),
      cache: RefCell::new(Cache::with_capacity(0)),
    };
    graph.insert_point(origin);
    graph.insert_point(target);

    for obs in &obstacles {
      let shape = obs.shape();
      for i in 0..shape.len() {
        let current = shape.point_at(i);
        let next = shape.point_at((i + 1) % shape.len());

        // Up the vertical edge of this corner.
        let mut height = 0.0;
        while height < obs.height() {
          graph.insert_point(current.to_3d(height));
          height += MAXIMUM_POINT_SEPARATION;
        }

        // Along the roof edge toward the next corner.
        let to_next = *next - *current;
        let span = to_next.norm();
        let direction = to_next.normalize();
        let mut traversed = 0.0;
        while traversed < span {
          graph.insert_point((*current + direction * traversed).to_3d(obs.height()));
          traversed += MAXIMUM_POINT_SEPARATION;
        }
      }
    }

    graph.obstacles = obstacles;
    graph.cache = RefCell::new(Cache::with_capacity(10 * graph.points.len()));
    graph
  }

  /// Obstacles may share corners, so sample points can collide; the
  /// existing vertex is reused.
  fn insert_point(&mut self, point: Point<3>) {
    if self.indices.contains_key(&point) {
      return;
    }
    self.indices.insert(point, self.points.len());
    self.points.push(point);
  }

  fn probe(&self, a: usize, b: usize) -> bool {
    let key = (a.min(b), a.max(b));
    if let Some(&visible) = self.cache.borrow().get(&key) {
      return visible;
    }
    let segment = LineSegment::new(self.points[a], self.points[b]);
    let visible = self.obstacles.intersect_segment(&segment).is_none();
    self.cache.borrow_mut().insert(key, visible);
    visible
  }
}

impl SearchGraph<3> for SampledGraph {
  fn len(&self) -> usize {
    self.points.len()
  }

  fn point(&self, index: usize) -> &Point<3> {
    &self.points[index]
  }

  fn index_of(&self, point: &Point<3>) -> Result<usize, Error> {
    self.indices.get(point).copied().ok_or_else(|| {
      Error::GraphCorruption(format!("point {:?} not found in sampled graph", point))
    })
  }

  fn edge(&self, a: usize, b: usize) -> Option<f64> {
    if self.probe(a, b) {
      Some(self.points[a].distance_to(&self.points[b]))
    } else {
      None
    }
  }

  fn neighbors(&self, index: usize) -> Vec<usize> {
    (0..self.points.len())
      .filter(|&i| i != index && self.probe(index, i))
      .collect()
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::data::{Obstacle, Polygon};
  use claims::assert_ok;

  #[test]
  fn samples_cover_edges_at_unit_spacing() {
    let shape = assert_ok!(Polygon::new(vec![
      Point::new([0.0, 0.0]),
      Point::new([0.0, 2.0]),
      Point::new([3.0, 2.0]),
      Point::new([3.0, 0.0]),
    ]));
    let obstacles = ObstacleSet::new(vec![assert_ok!(Obstacle::new(shape, 2.0))]);
    let graph = SampledGraph::new(
      obstacles,
      Point::new([-1.0, -1.0, 0.0]),
      Point::new([5.0, 5.0, 0.0]),
    );

    // Vertical samples at z = 0 and 1 on every corner, roof samples each
    // unit along the 2+3+2+3 perimeter.
    assert!(graph.indices.contains_key(&Point::new([0.0, 0.0, 0.0])));
    assert!(graph.indices.contains_key(&Point::new([0.0, 0.0, 1.0])));
    assert!(graph.indices.contains_key(&Point::new([0.0, 0.0, 2.0])));
    assert!(graph.indices.contains_key(&Point::new([0.0, 1.0, 2.0])));
    assert!(graph.indices.contains_key(&Point::new([2.0, 2.0, 2.0])));
    // 2 query points + 4 corners x 2 heights + 10 roof samples.
    assert_eq!(graph.len(), 20);
  }

  #[test]
  fn probes_are_cached() {
    let shape = assert_ok!(Polygon::new(vec![
      Point::new([0.0, 0.0]),
      Point::new([0.0, 1.0]),
      Point::new([1.0, 1.0]),
      Point::new([1.0, 0.0]),
    ]));
    let obstacles = ObstacleSet::new(vec![assert_ok!(Obstacle::new(shape, 1.0))]);
    let graph = SampledGraph::new(
      obstacles,
      Point::new([-1.0, 0.3, 0.0]),
      Point::new([2.0, 0.3, 0.0]),
    );
    // The blocked origin-target probe answers the same from the cache.
    assert!(!graph.probe(0, 1));
    assert!(!graph.probe(0, 1));
    assert!(graph.edge(0, 1).is_none());
  }
}
