use log::debug;
use std::ops::Deref;

use crate::data::{ObstacleSet, Point};
use crate::{Error, ResultExt};

mod baseline;
mod edge_sampling;
pub mod planar;
mod plane_cut;
mod visibility_graph;

/// An ordered polyline. Paths returned by the planners start at the query
/// origin, end at the query target and never repeat consecutive vertices.
#[derive(Debug, Clone, PartialEq)]
pub struct Path<const N: usize> {
  points: Vec<Point<N>>,
}

impl<const N: usize> Path<N> {
  pub fn length(&self) -> f64 {
    self
      .points
      .windows(2)
      .map(|pair| pair[0].distance_to(&pair[1]))
      .sum()
  }

  pub(crate) fn push(&mut self, point: Point<N>) {
    self.points.push(point)
  }

  pub fn into_points(self) -> Vec<Point<N>> {
    self.points
  }
}

impl<const N: usize> From<Vec<Point<N>>> for Path<N> {
  fn from(points: Vec<Point<N>>) -> Path<N> {
    Path { points }
  }
}

impl<const N: usize> Deref for Path<N> {
  type Target = [Point<N>];
  fn deref(&self) -> &[Point<N>] {
    &self.points
  }
}

impl<'a, const N: usize> IntoIterator for &'a Path<N> {
  type Item = &'a Point<N>;
  type IntoIter = std::slice::Iter<'a, Point<N>>;
  fn into_iter(self) -> Self::IntoIter {
    self.points.iter()
  }
}

/// The planner variants exposed by the crate. All of them answer the same
/// query: an approximately shortest obstacle-free polyline from `origin`
/// to `target`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Planner {
  /// Layered 2D visibility slices lifted into a 3D visibility graph.
  VisibilityGraph3d,
  /// 2D solves on rotated cuts through the origin-target axis.
  PlaneCut,
  /// Iterative restriction to the obstacles piercing the line of sight.
  BaselineFilter,
  /// Densely sampled prism edges with lazily probed visibility; slow but
  /// simple, useful as a ground-truth oracle.
  EdgeSampling,
}

impl Planner {
  pub fn find_path(
    &self,
    obstacles: &ObstacleSet,
    origin: &Point<3>,
    target: &Point<3>,
  ) -> Result<Path<3>, Error> {
    debug!(
      "{:?} planner: from {:?} to {:?} with {} obstacles",
      self,
      origin,
      target,
      obstacles.len()
    );
    let result = match self {
      Planner::VisibilityGraph3d => visibility_graph::find_path(obstacles, origin, target)
        .context("visibility-graph planner failed"),
      Planner::PlaneCut => {
        plane_cut::find_path(obstacles, origin, target).context("plane-cut planner failed")
      }
      Planner::BaselineFilter => {
        baseline::find_path(obstacles, origin, target).context("baseline planner failed")
      }
      Planner::EdgeSampling => edge_sampling::find_path(obstacles, origin, target)
        .context("edge-sampling planner failed"),
    };
    if let Ok(path) = &result {
      debug!("{:?} planner: found path {:?}", self, path);
    }
    result
  }
}
