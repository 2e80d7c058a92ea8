use log::trace;

use crate::data::{LineSegment, Obstacle, ObstacleSet, Point, Polygon};
use crate::intersection::segment_intersection;
use crate::Error;

use super::graph::VisibilityGraph;
use super::graph_2d::SliceVisibility;
use super::point_sorter::PointSorter;
use super::scene::Scene;

/// More distinct obstacle heights than this collapse to an even ladder
/// below the tallest one.
const MAXIMUM_HEIGHTS: usize = 10;

/// Tolerance for intersecting a blocked line of sight with its occluder
/// when placing slope points.
const SLOPE_INTERSECTION_EPSILON: f64 = 1e-4;

/// Build the 3D visibility graph for a scene: 2D visibility is solved once
/// per layer height (using only the obstacles tall enough to reach it) and
/// the slices are stitched vertically, with slope points inserted where a
/// line of sight must climb over an occluder.
pub fn visibility_graph_3d(
  obstacles: &ObstacleSet,
  origin: &Point<3>,
  target: &Point<3>,
) -> Result<VisibilityGraph<3>, Error> {
  let (scene, heights, sorted) = extract_obstacle_data(obstacles, origin, target);
  let categories = compute_categories(&heights, origin, target);
  trace!("layer heights: {:?}", categories);

  let slices = compute_level_slices(&scene, &sorted, &categories)?;

  lift(&slices, &scene, &categories, origin, target)
}

/// Index the obstacle shapes (tallest first) plus the projected query
/// points into one shared scene.
fn extract_obstacle_data(
  obstacles: &ObstacleSet,
  origin: &Point<3>,
  target: &Point<3>,
) -> (Scene, Vec<f64>, Vec<Obstacle>) {
  let mut sorted: Vec<Obstacle> = obstacles.iter().cloned().collect();
  sorted.sort_by(|a, b| b.height().total_cmp(&a.height()));

  let shapes: Vec<Polygon> = sorted.iter().map(|obs| obs.shape().clone()).collect();
  let heights: Vec<f64> = sorted.iter().map(|obs| obs.height()).collect();
  let scene = Scene::from_polygons(&shapes, &[origin.to_2d(), target.to_2d()]);
  (scene, heights, sorted)
}

/// The layer heights: distinct obstacle heights descending (clamped to the
/// ladder when there are too many), the ground, and the query endpoint
/// heights if they are new.
fn compute_categories(heights: &[f64], origin: &Point<3>, target: &Point<3>) -> Vec<f64> {
  let mut categories = Vec::new();
  if heights.len() > MAXIMUM_HEIGHTS {
    let max_height = heights[0];
    for i in (1..=MAXIMUM_HEIGHTS).rev() {
      categories.push(max_height * i as f64 / MAXIMUM_HEIGHTS as f64);
    }
  } else {
    for &height in heights {
      if categories.last().map_or(true, |&last| last > height) {
        categories.push(height);
      }
    }
  }

  categories.push(0.0);

  insert_category(&mut categories, origin.z_coord());
  insert_category(&mut categories, target.z_coord());
  categories
}

/// Insert a height into the descending category list unless it is already
/// there. Heights below ground are not layers.
fn insert_category(categories: &mut Vec<f64>, height: f64) {
  let index = categories.partition_point(|&c| c > height);
  if index < categories.len() && categories[index] < height {
    categories.insert(index, height);
  }
}

/// One slice per layer, each over the obstacles strictly taller than the
/// layer. The obstacle list is sorted by height, so every layer extends
/// the previous layer's polygon and segment windows.
fn compute_level_slices(
  scene: &Scene,
  sorted_obstacles: &[Obstacle],
  categories: &[f64],
) -> Result<Vec<SliceVisibility>, Error> {
  let sorter = PointSorter::new(&scene.points)?;

  let mut slices = Vec::with_capacity(categories.len());
  let mut polygons_until = 0;
  let mut segments_until = 0;

  for &category in categories {
    while polygons_until < sorted_obstacles.len()
      && sorted_obstacles[polygons_until].height() > category
    {
      if let Some(&max_segment) = scene.polygons[polygons_until].iter().max() {
        segments_until = segments_until.max(max_segment + 1);
      }
      polygons_until += 1;
    }

    trace!(
      "slice at height {}: {} polygons",
      category,
      polygons_until
    );
    let level_scene = Scene {
      points: scene.points.clone(),
      segments: scene.segments[..segments_until].to_vec(),
      polygons: scene.polygons[..polygons_until].to_vec(),
    };
    slices.push(SliceVisibility::build(&level_scene, &sorter)?);
  }
  Ok(slices)
}

/// Stitch the slices into a 3D graph: every scene point exists at every
/// layer, vertical neighbors connect, and cross-layer sight lines connect
/// wherever the lower slice allows it.
fn lift(
  slices: &[SliceVisibility],
  scene: &Scene,
  categories: &[f64],
  origin: &Point<3>,
  target: &Point<3>,
) -> Result<VisibilityGraph<3>, Error> {
  let mut result = VisibilityGraph::new(Vec::new());

  for (i, &category) in categories.iter().enumerate() {
    for point in &scene.points {
      result.add_point(point.to_3d(category));
      if i > 0 {
        result
          .add_visibility_between(&point.to_3d(category), &point.to_3d(categories[i - 1]))?;
      }
    }
  }

  if !result.has_point(origin) {
    result.add_point(*origin);
  }
  if !result.has_point(target) {
    result.add_point(*target);
  }

  for pi1 in 1..scene.points.len() {
    for pi2 in 0..pi1 {
      let mut last1: Option<Point<3>> = None;
      let mut last2: Option<Point<3>> = None;

      for (i, slice) in slices.iter().enumerate() {
        if slice.check_visibility(pi1, pi2).is_some() {
          // Visible on this layer: connect across to every layer at or
          // above it, both ways.
          for j in 0..=i {
            result.add_visibility_between(
              &scene.points[pi1].to_3d(categories[i]),
              &scene.points[pi2].to_3d(categories[j]),
            )?;
            result.add_visibility_between(
              &scene.points[pi1].to_3d(categories[j]),
              &scene.points[pi2].to_3d(categories[i]),
            )?;
          }
        } else {
          let connect_slopes = last1.is_none() && last2.is_none();

          compute_slope(pi1, pi2, scene, categories, slice, i, &mut last1, &mut result)?;
          compute_slope(pi2, pi1, scene, categories, slice, i, &mut last2, &mut result)?;

          // Slope points born on the same layer from both directions form
          // a crossing over the top of the obstacle.
          if connect_slopes {
            if let (Some(a), Some(b)) = (&last1, &last2) {
              result.add_visibility_between(a, b)?;
            }
          }
        }
      }
    }
  }

  Ok(result)
}

/// The waypoint needed to get from `p1` toward `p2` at this layer: the
/// blocked line of sight is intersected with its occluder and the crossing
/// lifted to the layer above the occluder. Consecutive slope points of the
/// same pair chain together.
#[allow(clippy::too_many_arguments)]
fn compute_slope(
  p1: usize,
  p2: usize,
  scene: &Scene,
  categories: &[f64],
  slice: &SliceVisibility,
  level: usize,
  last_intersection: &mut Option<Point<3>>,
  result: &mut VisibilityGraph<3>,
) -> Result<(), Error> {
  let Some(si) = slice.check_occluder(p1, p2) else {
    return Ok(());
  };
  // The top layer has no obstacles, so an occluder implies a layer above.
  debug_assert!(level > 0);

  let sight = LineSegment::new(scene.points[p1], scene.points[p2]);
  let (a, b) = scene.segments[si];
  let wall = LineSegment::new(scene.points[a], scene.points[b]);
  let crossing = segment_intersection(&sight, &wall, SLOPE_INTERSECTION_EPSILON)
    .ok_or_else(|| {
      Error::NoIntersection(format!(
        "line of sight {:?} does not meet its occluder {:?}",
        sight, wall
      ))
    })?;

  let fresh = match last_intersection {
    None => true,
    Some(last) => crossing != last.to_2d(),
  };
  if fresh {
    let slope_point = crossing.to_3d(categories[level - 1]);
    if !result.has_point(&slope_point) {
      result.add_point(slope_point);
    }
    if let Some(last) = last_intersection {
      result.add_visibility_between(&slope_point, last)?;
    }
    *last_intersection = Some(slope_point);

    // Higher copies of the source point all see the new slope point.
    for j in 0..level {
      result.add_visibility_between(&scene.points[p1].to_3d(categories[j]), &slope_point)?;
    }
  }

  if let Some(last) = last_intersection {
    result.add_visibility_between(&scene.points[p1].to_3d(categories[level]), last)?;
  }
  Ok(())
}

#[cfg(test)]
mod tests {
  use super::*;
  use claims::assert_ok;

  fn point3(x: f64, y: f64, z: f64) -> Point<3> {
    Point::new([x, y, z])
  }

  #[test]
  fn categories_from_distinct_heights() {
    assert_eq!(
      compute_categories(&[2.0, 1.0], &point3(0.0, 0.0, 0.0), &point3(1.0, 0.0, 0.0)),
      vec![2.0, 1.0, 0.0]
    );
  }

  #[test]
  fn categories_deduplicate() {
    assert_eq!(
      compute_categories(
        &[3.0, 3.0, 1.0],
        &point3(0.0, 0.0, 0.0),
        &point3(1.0, 0.0, 0.0)
      ),
      vec![3.0, 1.0, 0.0]
    );
  }

  #[test]
  fn categories_include_query_heights() {
    assert_eq!(
      compute_categories(&[3.0, 1.0], &point3(0.0, 0.0, 1.5), &point3(1.0, 0.0, 5.0)),
      vec![5.0, 3.0, 1.5, 1.0, 0.0]
    );
    // Heights below ground never become layers.
    assert_eq!(
      compute_categories(&[2.0], &point3(0.0, 0.0, -1.0), &point3(1.0, 0.0, 0.0)),
      vec![2.0, 0.0]
    );
  }

  #[test]
  fn too_many_heights_collapse_to_ladder() {
    let heights: Vec<f64> = (1..=12).rev().map(|h| h as f64).collect();
    let categories = compute_categories(
      &heights,
      &point3(0.0, 0.0, 0.0),
      &point3(1.0, 0.0, 0.0),
    );
    assert_eq!(categories.len(), MAXIMUM_HEIGHTS + 1);
    assert_eq!(categories[0], 12.0);
    assert_eq!(categories[MAXIMUM_HEIGHTS - 1], 1.2);
    assert_eq!(categories[MAXIMUM_HEIGHTS], 0.0);
  }

  #[test]
  fn single_obstacle_graph_connects_over_the_top() {
    let shape = assert_ok!(Polygon::new(vec![
      Point::new([0.0, 0.0]),
      Point::new([0.0, 1.0]),
      Point::new([1.0, 1.0]),
      Point::new([1.0, 0.0]),
    ]));
    let obstacles = ObstacleSet::new(vec![assert_ok!(Obstacle::new(shape, 1.0))]);
    let origin = point3(-1.0, 0.3, 0.0);
    let target = point3(2.0, 0.3, 0.0);
    let graph = assert_ok!(visibility_graph_3d(&obstacles, &origin, &target));

    // Every corner exists at both layers, the queries at ground level.
    assert!(graph.has_point(&point3(0.0, 0.0, 0.0)));
    assert!(graph.has_point(&point3(0.0, 0.0, 1.0)));
    assert!(graph.has_point(&origin));
    assert!(graph.has_point(&target));

    // Corners connect vertically.
    let low = assert_ok!(graph.index_of(&point3(0.0, 0.0, 0.0)));
    let high = assert_ok!(graph.index_of(&point3(0.0, 0.0, 1.0)));
    assert_eq!(graph.check_visibility(low, high), Some(1.0));

    // The queries do not see each other at ground level but both see the
    // near corners.
    let origin_index = assert_ok!(graph.index_of(&origin));
    let target_index = assert_ok!(graph.index_of(&target));
    assert_eq!(graph.check_visibility(origin_index, target_index), None);
    let near = assert_ok!(graph.index_of(&point3(0.0, 0.0, 0.0)));
    let far = assert_ok!(graph.index_of(&point3(1.0, 0.0, 0.0)));
    assert!(graph.check_visibility(origin_index, near).is_some());
    assert!(graph.check_visibility(target_index, far).is_some());
  }
}
