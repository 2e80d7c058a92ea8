use crate::algorithms::astar;
use crate::algorithms::visibility::visibility_graph_3d;
use crate::data::{ObstacleSet, Point};
use crate::Error;

use super::Path;

/// The primary planner: build the layered 3D visibility graph for the
/// whole scene and search it.
pub(crate) fn find_path(
  obstacles: &ObstacleSet,
  origin: &Point<3>,
  target: &Point<3>,
) -> Result<Path<3>, Error> {
  let graph = visibility_graph_3d(obstacles, origin, target)?;
  astar::find_path(&graph, origin, target)
}
