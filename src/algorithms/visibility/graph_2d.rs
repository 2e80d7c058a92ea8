use claims::debug_assert_ok;
use log::trace;
use std::collections::{HashMap, HashSet};
use std::f64::consts::{FRAC_PI_2, PI};

use crate::data::Point;
use crate::{Error, EPS};

use super::graph::VisibilityGraph;
use super::point_sorter::PointSorter;
use super::scene::{add_if_absent, Scene};
use super::self_occlusion::SelfOcclusion;
use super::solver::{solve_visibility, SegmentRank};

const TWO_PI: f64 = 2.0 * PI;

/// The visibility relation of one horizontal slice: the symmetric distance
/// table over the scene points, plus, for each ordered pair that cannot
/// see each other, the segment that blocks the view first. The occluder
/// table is directional because the first hit depends on which end you
/// look from.
pub struct SliceVisibility {
  graph: VisibilityGraph<2>,
  occluders: Vec<HashMap<usize, usize>>,
}

impl SliceVisibility {
  /// Run the envelope sweep once per pivot and collect the results. The
  /// sorter must have been built over exactly the scene's points.
  pub fn build(scene: &Scene, sorter: &PointSorter) -> Result<SliceVisibility, Error> {
    debug_assert_ok!(scene.validate());
    assert_eq!(scene.points.len(), sorter.len());

    let mut slice = SliceVisibility {
      graph: VisibilityGraph::new(scene.points.clone()),
      occluders: vec![HashMap::new(); scene.points.len()],
    };
    let self_occlusion = SelfOcclusion::new(scene)?;

    for pivot in 0..scene.points.len() {
      let sorted = sorter.sorted_around(pivot)?;
      let (fixed, fixed_sorted, segment_equivalence) = split_segments(scene, &sorted, pivot);
      let (ranks, unsorted_ranks, angles) =
        compute_rank(&fixed.points, &fixed_sorted, pivot, EPS)?;
      let segment_ranks = generate_segment_ranks(&fixed.segments, &unsorted_ranks, &angles);
      let visibility = solve_visibility(
        &fixed.points,
        &fixed.segments,
        &angles,
        pivot,
        &fixed_sorted,
        &ranks,
        &segment_ranks,
      )?;

      for target in 0..scene.points.len() {
        if let Some(si) = self_occlusion.occluding_segment(pivot, target, scene) {
          slice.occluders[pivot].insert(target, si);
        } else if visibility[target].visible {
          let d = scene.points[pivot].distance_to(&scene.points[target]);
          slice.graph.add_visibility(pivot, target, d);
        } else if let Some(si) = visibility[target].occluder {
          slice.occluders[pivot].insert(target, segment_equivalence[si]);
        }
      }
    }

    Ok(slice)
  }

  pub fn graph(&self) -> &VisibilityGraph<2> {
    &self.graph
  }

  pub fn check_visibility(&self, a: usize, b: usize) -> Option<f64> {
    self.graph.check_visibility(a, b)
  }

  /// The segment that first blocks the view from `origin` to `target`.
  pub fn check_occluder(&self, origin: usize, target: usize) -> Option<usize> {
    self.occluders[origin].get(&target).copied()
  }
}

/// Angle of `end` around `origin`, counter-clockwise from the +y axis,
/// in [0, 2*pi).
fn compute_angle(origin: &Point<2>, end: &Point<2>, epsilon: f64) -> f64 {
  let mut result = origin.angle_to(end) - FRAC_PI_2;
  if result < -epsilon {
    result += TWO_PI;
  }
  result
}

/// Split every segment crossing the +y ray from the pivot, so each
/// post-split segment spans a single angular interval. Split points land
/// at both ends of the sorted order; `segment_equivalence` maps each
/// post-split segment back to the original it came from.
fn split_segments(
  scene: &Scene,
  sorted_points: &[usize],
  origin: usize,
) -> (Scene, Vec<usize>, Vec<usize>) {
  let origin_point = scene.points[origin];

  let mut fixed_points = scene.points.clone();
  let mut fixed_segments = scene.segments.clone();
  let mut fixed_polygons = Vec::new();

  let mut added: HashMap<Point<2>, usize> = HashMap::new();
  for (i, p) in fixed_points.iter().enumerate() {
    added.insert(*p, i);
  }

  let mut segment_equivalence: Vec<usize> = (0..fixed_segments.len()).collect();

  for polygon in &scene.polygons {
    let mut fixed_polygon = Vec::new();
    for &si in polygon {
      fixed_polygon.push(si);

      let (a, b) = scene.segments[si];
      let p1 = &scene.points[a];
      let p2 = &scene.points[b];
      let ox = origin_point.x_coord();

      // Half-open span check keeps a segment chain from registering the
      // same crossing twice at a shared vertex.
      if (p1.x_coord() <= ox && ox < p2.x_coord())
        || (p2.x_coord() <= ox && ox < p1.x_coord())
      {
        let dist1 = (p1.x_coord() - ox).abs();
        let dist2 = (p2.x_coord() - ox).abs();
        let intersection_y =
          p2.y_coord() + (p1.y_coord() - p2.y_coord()) * dist2 / (dist1 + dist2);

        if intersection_y > origin_point.y_coord() {
          let crossing = Point::new([ox, intersection_y]);
          let crossing_index = add_if_absent(&mut fixed_points, &mut added, crossing);

          let tail = (crossing_index, fixed_segments[si].1);
          fixed_segments[si].1 = crossing_index;
          fixed_segments.push(tail);
          segment_equivalence.push(si);
          fixed_polygon.push(fixed_segments.len() - 1);
        }
      }
    }
    fixed_polygons.push(fixed_polygon);
  }

  // Split points sit exactly on the sweep start ray: once at the front of
  // the order (angle 0) and once at the back (angle 2*pi).
  let mut fixed_sorted = Vec::new();
  for i in scene.points.len()..fixed_points.len() {
    fixed_sorted.push(i);
  }
  fixed_sorted.extend_from_slice(sorted_points);
  for i in scene.points.len()..fixed_points.len() {
    fixed_sorted.push(i);
  }

  let fixed = Scene {
    points: fixed_points,
    segments: fixed_segments,
    polygons: fixed_polygons,
  };
  trace!(
    "pivot {}: {} split points added",
    origin,
    fixed.points.len() - scene.points.len()
  );
  (fixed, fixed_sorted, segment_equivalence)
}

/// Assign each sorted point its rank; points within `epsilon` of the same
/// angle share one. Returns the rank per sorted position, the rank per
/// point index, and the distinct slot-boundary angles.
fn compute_rank(
  points: &[Point<2>],
  sorted_points: &[usize],
  origin: usize,
  epsilon: f64,
) -> Result<(Vec<usize>, Vec<usize>, Vec<f64>), Error> {
  let origin_point = &points[origin];

  let mut ranks = Vec::with_capacity(sorted_points.len());
  let mut unsorted_ranks = vec![0usize; points.len()];
  let mut angles = Vec::new();

  let mut last_angle: f64 = 0.0;
  let mut current_rank: usize = 0;
  let mut zero_points: HashSet<usize> = HashSet::new();

  angles.push(last_angle);

  for &p in sorted_points {
    let mut current_angle = compute_angle(origin_point, &points[p], epsilon);

    if current_angle.abs() <= epsilon {
      if last_angle > epsilon {
        current_angle = TWO_PI;
      } else if zero_points.contains(&p) {
        // Split points appear twice; the second sighting is the wrapped
        // end of the sweep.
        current_angle = TWO_PI;
      } else {
        zero_points.insert(p);
      }
    }

    if current_angle + epsilon < last_angle {
      return Err(Error::GraphCorruption(format!(
        "points are not sorted around pivot {}: angle {} rad after {} rad",
        origin, current_angle, last_angle
      )));
    }

    if current_angle > last_angle + epsilon {
      current_rank += 1;
      ranks.push(current_rank);
      angles.push(current_angle);
    } else {
      ranks.push(current_rank);
    }
    last_angle = current_angle;
    if current_angle != TWO_PI {
      unsorted_ranks[p] = current_rank;
    }
  }

  if last_angle < TWO_PI {
    angles.push(TWO_PI);
  }

  Ok((ranks, unsorted_ranks, angles))
}

/// Rank interval of every post-split segment. A segment whose endpoint
/// sits on the start ray but whose body lies in the upper-left quadrant
/// belongs at the wrapped end of the sweep, not the start.
fn generate_segment_ranks(
  segments: &[(usize, usize)],
  unsorted_ranks: &[usize],
  angles: &[f64],
) -> Vec<SegmentRank> {
  let max_k = angles.len() - 1;
  segments
    .iter()
    .map(|&(a, b)| {
      let mut rank1 = unsorted_ranks[a];
      let mut rank2 = unsorted_ranks[b];
      if rank1 == 0 && angles[rank2] > PI {
        rank1 = max_k;
      } else if rank2 == 0 && angles[rank1] > PI {
        rank2 = max_k;
      }
      SegmentRank {
        min: rank1.min(rank2),
        max: rank1.max(rank2),
      }
    })
    .collect()
}

#[cfg(test)]
mod tests {
  use super::*;
  use claims::{assert_ok, assert_some};

  fn build(scene: &Scene) -> SliceVisibility {
    let sorter = assert_ok!(PointSorter::new(&scene.points));
    assert_ok!(SliceVisibility::build(scene, &sorter))
  }

  #[test]
  fn cross_shaped_scene() {
    // Four points in a diamond with one wall between the left and right
    // ones: everything sees everything except the two wall-separated
    // points.
    let scene = Scene {
      points: vec![
        Point::new([-1.0, 0.0]),
        Point::new([0.0, 1.0]),
        Point::new([0.0, -1.0]),
        Point::new([1.0, 0.0]),
      ],
      segments: vec![(0, 3)],
      polygons: vec![vec![0]],
    };
    let slice = build(&scene);

    assert_some!(slice.check_visibility(0, 1));
    assert_some!(slice.check_visibility(0, 2));
    assert_some!(slice.check_visibility(0, 3));
    assert_some!(slice.check_visibility(1, 3));
    assert_some!(slice.check_visibility(2, 3));
    assert_eq!(slice.check_visibility(1, 2), None);
    assert_eq!(slice.check_visibility(2, 1), None);
    // The wall is the occluder, seen from both sides.
    assert_eq!(slice.check_occluder(1, 2), Some(0));
    assert_eq!(slice.check_occluder(2, 1), Some(0));
  }

  #[test]
  fn single_point_scene() {
    let scene = Scene {
      points: vec![Point::new([0.0, 0.0])],
      segments: vec![],
      polygons: vec![],
    };
    let slice = build(&scene);
    assert_eq!(slice.check_visibility(0, 0), Some(0.0));
  }

  #[test]
  fn square_blocks_diagonal() {
    use crate::data::Polygon;
    let square = assert_ok!(Polygon::new(vec![
      Point::new([0.0, 0.0]),
      Point::new([0.0, 1.0]),
      Point::new([1.0, 1.0]),
      Point::new([1.0, 0.0]),
    ]));
    let scene = Scene::from_polygons(
      &[square],
      &[Point::new([-1.0, 0.5]), Point::new([2.0, 0.5])],
    );
    let slice = build(&scene);
    let left = 4;
    let right = 5;

    // The square separates the two probes.
    assert_eq!(slice.check_visibility(left, right), None);
    assert_some!(slice.check_occluder(left, right));
    // Each probe sees the two corners facing it.
    assert_some!(slice.check_visibility(left, 0));
    assert_some!(slice.check_visibility(left, 1));
    assert_some!(slice.check_visibility(right, 2));
    assert_some!(slice.check_visibility(right, 3));
    // Corners across the interior do not see each other.
    assert_eq!(slice.check_visibility(0, 2), None);
    assert_eq!(slice.check_visibility(1, 3), None);
    // Adjacent corners do.
    assert_some!(slice.check_visibility(0, 1));
    assert_some!(slice.check_visibility(2, 3));
  }

  #[test]
  fn rank_bookkeeping_on_axis_points() {
    // A point exactly on the +y ray gets rank 0 at the front and the
    // wrapped angle at the back never pollutes its stored rank.
    let points = vec![
      Point::new([0.0, 0.0]),
      Point::new([0.0, 2.0]),
      Point::new([1.0, 0.0]),
    ];
    let sorter = assert_ok!(PointSorter::new(&points));
    let sorted = assert_ok!(sorter.sorted_around(0));
    let (ranks, unsorted_ranks, angles) = assert_ok!(compute_rank(&points, &sorted, 0, EPS));
    assert_eq!(ranks.len(), 2);
    assert_eq!(unsorted_ranks[1], 0);
    assert!(angles.first() == Some(&0.0));
    assert!(angles.last() == Some(&TWO_PI));
  }
}
