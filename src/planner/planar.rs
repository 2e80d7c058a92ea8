use log::debug;

use crate::algorithms::astar;
use crate::algorithms::visibility::{PointSorter, Scene, SliceVisibility};
use crate::data::{Point, Polygon};
use crate::{Error, ResultExt};

use super::Path;

/// Shortest path in the plane around polygonal obstacles, through a full
/// 2D visibility graph. The plane-cut planner runs this once per cut; it
/// is also usable on its own for flat scenes.
pub fn find_path(
  obstacles: &[Polygon],
  origin: &Point<2>,
  target: &Point<2>,
) -> Result<Path<2>, Error> {
  debug!(
    "planar path from {:?} to {:?} around {} polygons",
    origin,
    target,
    obstacles.len()
  );

  let scene = Scene::from_polygons(obstacles, &[*origin, *target]);
  let result = (|| {
    let sorter = PointSorter::new(&scene.points)?;
    let slice = SliceVisibility::build(&scene, &sorter)?;
    astar::find_path(slice.graph(), origin, target)
  })()
  .context("error computing planar path");

  if let Ok(path) = &result {
    debug!("planar path found: {:?}", path);
  }
  result
}

#[cfg(test)]
mod tests {
  use super::*;
  use claims::assert_ok;

  #[test]
  fn detours_around_a_square() {
    let square = assert_ok!(Polygon::new(vec![
      Point::new([0.0, 0.0]),
      Point::new([0.0, 1.0]),
      Point::new([1.0, 1.0]),
      Point::new([1.0, 0.0]),
    ]));
    let path = assert_ok!(find_path(
      &[square],
      &Point::new([-1.0, 0.3]),
      &Point::new([2.0, 0.3]),
    ));
    assert_eq!(path.len(), 4);
    assert!(path[1].approx_eq(&Point::new([0.0, 0.0]), 1e-9));
    assert!(path[2].approx_eq(&Point::new([1.0, 0.0]), 1e-9));
  }

  #[test]
  fn straight_shot_when_clear() {
    let square = assert_ok!(Polygon::new(vec![
      Point::new([0.0, 0.0]),
      Point::new([0.0, 1.0]),
      Point::new([1.0, 1.0]),
      Point::new([1.0, 0.0]),
    ]));
    let path = assert_ok!(find_path(
      &[square],
      &Point::new([-1.0, 2.0]),
      &Point::new([2.0, 2.0]),
    ));
    assert_eq!(path.len(), 2);
  }

  #[test]
  fn origin_on_a_corner_still_routes() {
    let square = assert_ok!(Polygon::new(vec![
      Point::new([0.0, 0.0]),
      Point::new([0.0, 1.0]),
      Point::new([1.0, 1.0]),
      Point::new([1.0, 0.0]),
    ]));
    let path = assert_ok!(find_path(
      &[square],
      &Point::new([1.0, 1.0]),
      &Point::new([-1.0, -1.0]),
    ));
    assert!(path.len() >= 2);
    assert!(path[0].approx_eq(&Point::new([1.0, 1.0]), 1e-9));
    assert!(path[path.len() - 1].approx_eq(&Point::new([-1.0, -1.0]), 1e-9));
  }
}
