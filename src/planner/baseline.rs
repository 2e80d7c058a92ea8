use log::trace;

use crate::algorithms::astar;
use crate::algorithms::visibility::visibility_graph_3d;
use crate::data::{LineSegment, ObstacleSet, Point};
use crate::{Error, EPS};

use super::Path;

/// Hard cap on planning rounds; progress checks normally fire long before
/// this, but numeric ping-pong between two lookahead targets must not hang
/// the query.
const MAX_ROUNDS: usize = 1024;

/// Plan by repeatedly narrowing attention to the obstacles piercing the
/// current line of sight: solve that local scene, advance one waypoint,
/// look again. Cheap when the scene is mostly open.
pub(crate) fn find_path(
  obstacles: &ObstacleSet,
  origin: &Point<3>,
  target: &Point<3>,
) -> Result<Path<3>, Error> {
  let mut result = Path::from(vec![*origin]);
  let mut partial_origin = *origin;
  let mut partial_target = *target;

  let mut rounds = 0;
  while result.last() != Some(target) {
    rounds += 1;
    if rounds > MAX_ROUNDS {
      return Err(Error::BaselineStuck);
    }

    let (reached, intermediate) = advance(obstacles, &partial_origin, &partial_target)?;
    if reached {
      // The local problem was solved in one hop; commit the waypoint and
      // aim for the real target again.
      if result.last() == Some(&intermediate) {
        return Err(Error::BaselineStuck);
      }
      result.push(intermediate);
      partial_origin = intermediate;
      partial_target = *target;
    } else {
      // Still blocked: shorten the lookahead to the first waypoint of the
      // local solution.
      if intermediate == partial_target || intermediate == partial_origin {
        return Err(Error::BaselineStuck);
      }
      partial_target = intermediate;
    }
  }

  Ok(result)
}

/// One planning round. Returns whether the filtered scene is crossed in a
/// single hop, plus the next waypoint toward `target`.
fn advance(
  obstacles: &ObstacleSet,
  origin: &Point<3>,
  target: &Point<3>,
) -> Result<(bool, Point<3>), Error> {
  debug_assert!(origin != target);

  let sight = LineSegment::new(*origin, *target);
  let filtered: ObstacleSet = obstacles
    .iter()
    .filter(|obs| obs.intersect_segment(&sight).is_some())
    .cloned()
    .collect();
  trace!(
    "baseline round from {:?} to {:?}: {} piercing obstacles",
    origin,
    target,
    filtered.len()
  );

  if filtered.is_empty() {
    return Ok((true, *target));
  }

  let graph = visibility_graph_3d(&filtered, origin, target)?;
  let mut local = astar::find_path(&graph, origin, target)?.into_points();
  debug_assert!(local.len() > 1);

  // Waypoints coinciding with the endpoints carry no information.
  if local.len() > 2 && local[0].approx_eq(&local[1], EPS) {
    local.remove(0);
  }
  if local.len() > 2 && local[local.len() - 1].approx_eq(&local[local.len() - 2], EPS) {
    local.pop();
  }

  Ok((local.len() == 2, local[1]))
}
