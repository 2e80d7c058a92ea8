//! Approximate shortest paths for aerial vehicles over a city of prismatic
//! obstacles: vertical extrusions of simple 2D polygons.
//!
//! The crate builds visibility graphs (2D graphs per horizontal slice,
//! lifted into a 3D graph with dynamically inserted slope points) and runs
//! A* over them. Three more planners (plane cuts, baseline filtering and
//! dense edge sampling) are layered on the same machinery.
//!
//! ```rust
//! use aeropath::data::{Obstacle, ObstacleSet, Point, Polygon};
//! use aeropath::planner::Planner;
//!
//! let tower = Obstacle::new(
//!   Polygon::new(vec![
//!     Point::new([0.0, 0.0]),
//!     Point::new([0.0, 1.0]),
//!     Point::new([1.0, 1.0]),
//!     Point::new([1.0, 0.0]),
//!   ])?,
//!   1.0,
//! )?;
//! let obstacles = ObstacleSet::new(vec![tower]);
//! let path = Planner::VisibilityGraph3d.find_path(
//!   &obstacles,
//!   &Point::new([-1.0, 0.3, 0.0]),
//!   &Point::new([2.0, 0.3, 0.0]),
//! )?;
//! assert_eq!(path.len(), 4);
//! # Ok::<(), aeropath::Error>(())
//! ```

use thiserror::Error as ThisError;

pub mod algorithms;
mod cache;
pub mod data;
mod intersection;
mod matrix;
pub mod planner;
mod transformation;

pub use intersection::{
  point_to_segment_distance, segment_horizontal_plane_intersection, segment_intersection,
};
pub use planner::{Path, Planner};
pub use transformation::Transform;

/// Default tolerance for algebraic comparisons. Call sites that need a
/// looser or stricter bound pass their own value.
pub const EPS: f64 = 1e-12;

#[derive(Debug, ThisError)]
pub enum Error {
  #[error("invalid input: {0}")]
  InvalidInput(String),
  #[error("no intersection: {0}")]
  NoIntersection(String),
  #[error("degenerate geometry: {0}")]
  GeometryDegenerate(String),
  #[error("no path exists between the given points")]
  NoPathFound,
  #[error("baseline planner stopped making progress")]
  BaselineStuck,
  #[error("planar graph corrupted: {0}")]
  GraphCorruption(String),
  #[error("no cut plane produced a valid path")]
  PlanFailedAllCuts,
  /// A propagation frame wrapping a lower-level error.
  #[error("{context}")]
  Context {
    context: String,
    #[source]
    source: Box<Error>,
  },
}

impl Error {
  /// Wrap this error with another frame of context.
  pub fn context(self, context: impl Into<String>) -> Error {
    Error::Context {
      context: context.into(),
      source: Box::new(self),
    }
  }

  /// The error kind at the bottom of the context chain.
  pub fn root(&self) -> &Error {
    match self {
      Error::Context { source, .. } => source.root(),
      other => other,
    }
  }
}

pub(crate) trait ResultExt<T> {
  fn context(self, context: &str) -> Result<T, Error>;
}

impl<T> ResultExt<T> for Result<T, Error> {
  fn context(self, context: &str) -> Result<T, Error> {
    self.map_err(|e| e.context(context))
  }
}
