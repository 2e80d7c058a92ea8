use std::collections::HashMap;

use crate::algorithms::astar::SearchGraph;
use crate::data::Point;
use crate::Error;

/// Mutual-visibility record over a set of points: a symmetric sparse
/// distance table keyed by `(min, max)` index pairs, plus a point
/// registry for lookups by coordinates.
///
/// The 2D builder fixes its point set up front; the 3D builder keeps
/// inserting slope points while lifting, so insertion stays incremental.
#[derive(Debug, Clone)]
pub struct VisibilityGraph<const N: usize> {
  points: Vec<Point<N>>,
  indices: HashMap<Point<N>, usize>,
  table: Vec<HashMap<usize, f64>>,
}

impl<const N: usize> VisibilityGraph<N> {
  pub fn new(points: Vec<Point<N>>) -> VisibilityGraph<N> {
    let mut graph = VisibilityGraph {
      points: Vec::new(),
      indices: HashMap::new(),
      table: Vec::new(),
    };
    for p in points {
      graph.add_point(p);
    }
    graph
  }

  /// Register a new vertex. Inserting a point twice is a programming
  /// error.
  pub fn add_point(&mut self, point: Point<N>) -> usize {
    debug_assert!(!self.indices.contains_key(&point), "duplicate point");
    let index = self.points.len();
    self.indices.insert(point, index);
    self.points.push(point);
    self.table.push(HashMap::new());
    index
  }

  pub fn has_point(&self, point: &Point<N>) -> bool {
    self.indices.contains_key(point)
  }

  pub fn index_of(&self, point: &Point<N>) -> Result<usize, Error> {
    self.indices.get(point).copied().ok_or_else(|| {
      Error::GraphCorruption(format!("point {:?} not found in visibility graph", point))
    })
  }

  pub fn point(&self, index: usize) -> &Point<N> {
    &self.points[index]
  }

  pub fn len(&self) -> usize {
    self.points.len()
  }

  pub fn is_empty(&self) -> bool {
    self.points.is_empty()
  }

  /// Mark two vertices as mutually visible at the given distance.
  pub fn add_visibility(&mut self, a: usize, b: usize, distance: f64) {
    if a == b {
      return;
    }
    let (min, max) = (a.min(b), a.max(b));
    self.table[min].insert(max, distance);
  }

  /// Mark two points as mutually visible at their Euclidean distance.
  pub fn add_visibility_between(&mut self, p: &Point<N>, q: &Point<N>) -> Result<(), Error> {
    let a = self.index_of(p)?;
    let b = self.index_of(q)?;
    self.add_visibility(a, b, p.distance_to(q));
    Ok(())
  }

  /// Distance between two mutually visible vertices; `None` when they do
  /// not see each other. A vertex trivially sees itself.
  pub fn check_visibility(&self, a: usize, b: usize) -> Option<f64> {
    if a == b {
      return Some(0.0);
    }
    let (min, max) = (a.min(b), a.max(b));
    self.table[min].get(&max).copied()
  }

  /// All vertices visible from `index`, ascending.
  pub fn adjacents(&self, index: usize) -> Vec<usize> {
    let mut result = Vec::new();
    for (i, row) in self.table.iter().enumerate().take(index) {
      if row.contains_key(&index) {
        result.push(i);
      }
    }
    let mut larger: Vec<usize> = self.table[index].keys().copied().collect();
    larger.sort_unstable();
    result.extend(larger);
    result
  }
}

impl<const N: usize> SearchGraph<N> for VisibilityGraph<N> {
  fn len(&self) -> usize {
    VisibilityGraph::len(self)
  }

  fn point(&self, index: usize) -> &Point<N> {
    VisibilityGraph::point(self, index)
  }

  fn index_of(&self, point: &Point<N>) -> Result<usize, Error> {
    VisibilityGraph::index_of(self, point)
  }

  fn edge(&self, a: usize, b: usize) -> Option<f64> {
    self.check_visibility(a, b)
  }

  fn neighbors(&self, index: usize) -> Vec<usize> {
    self.adjacents(index)
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use claims::assert_ok;

  #[test]
  fn symmetric_lookup() {
    let mut graph = VisibilityGraph::new(vec![
      Point::new([0.0, 0.0]),
      Point::new([3.0, 4.0]),
      Point::new([9.0, 9.0]),
    ]);
    assert_ok!(graph.add_visibility_between(&Point::new([0.0, 0.0]), &Point::new([3.0, 4.0])));
    assert_eq!(graph.check_visibility(0, 1), Some(5.0));
    assert_eq!(graph.check_visibility(1, 0), Some(5.0));
    assert_eq!(graph.check_visibility(0, 2), None);
    assert_eq!(graph.check_visibility(2, 2), Some(0.0));
  }

  #[test]
  fn adjacents_are_sorted_both_sides() {
    let mut graph = VisibilityGraph::new(vec![
      Point::new([0.0, 0.0]),
      Point::new([1.0, 0.0]),
      Point::new([2.0, 0.0]),
      Point::new([3.0, 0.0]),
    ]);
    graph.add_visibility(1, 0, 1.0);
    graph.add_visibility(1, 3, 2.0);
    graph.add_visibility(1, 2, 1.0);
    assert_eq!(graph.adjacents(1), vec![0, 2, 3]);
    assert_eq!(graph.adjacents(0), vec![1]);
  }
}
