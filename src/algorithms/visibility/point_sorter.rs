use log::trace;

use crate::data::{Point, Vector};
use crate::transformation::Transform;
use crate::{Error, EPS};

use super::planar_graph::{Line, PlanarGraph};

/// Angular sort of a point set around any of its members, answered through
/// the dual-line arrangement: sorting points around `p` is listing the
/// lines crossed by the dual of `p`, left to right.
pub struct PointSorter {
  /// The input points, untouched.
  points: Vec<Point<2>>,
  /// The same points after degeneracy removal; these back the arrangement.
  rotated: Vec<Point<2>>,
  graph: PlanarGraph,
}

impl PointSorter {
  pub fn new(points: &[Point<2>]) -> Result<PointSorter, Error> {
    let rotated = remove_extrinsic_degeneracy(points.to_vec(), EPS);
    let mut graph = PlanarGraph::new(EPS);
    for p in &rotated {
      // Dual of (x, y) is the line y' = -x * x' + y.
      graph.add_line(Line::new(-p.x_coord(), p.y_coord()))?;
    }
    Ok(PointSorter {
      points: points.to_vec(),
      rotated,
      graph,
    })
  }

  pub fn len(&self) -> usize {
    self.points.len()
  }

  pub fn is_empty(&self) -> bool {
    self.points.is_empty()
  }

  /// Indices of all other points in counter-clockwise order around the
  /// pivot, starting from the ray along the positive y axis.
  pub fn sorted_around(&self, pivot: usize) -> Result<Vec<usize>, Error> {
    let line_order = self.graph.sorted_lines(pivot)?;

    // Split by which side of the pivot's vertical each point falls on, in
    // the rotated frame the arrangement was built in.
    let pivot_x = self.rotated[pivot].x_coord();
    let mut left_side: std::collections::VecDeque<usize> = std::collections::VecDeque::new();
    let mut right_side: Vec<usize> = Vec::new();
    for line_index in line_order {
      if self.rotated[line_index].x_coord() > pivot_x {
        right_side.push(line_index);
      } else {
        left_side.push_back(line_index);
      }
    }

    // The rotation can push points just past the +y axis onto the other
    // half; migrate that prefix back, judged on the original coordinates.
    while let Some(&front) = left_side.front() {
      if self.points[front].x_coord() > self.points[pivot].x_coord() {
        left_side.pop_front();
        right_side.push(front);
      } else {
        break;
      }
    }

    let mut result: Vec<usize> = left_side.into_iter().collect();
    result.extend(right_side);
    trace!("sorted around {}: {:?}", pivot, result);
    Ok(result)
  }
}

/// Rotate the point set so that all x coordinates become pairwise distinct
/// (two points sharing an x coordinate would make their dual lines cross
/// the reference line at the same spot).
fn remove_extrinsic_degeneracy(points: Vec<Point<2>>, epsilon: f64) -> Vec<Point<2>> {
  if points.len() <= 1 {
    return points;
  }

  let mut xs: Vec<f64> = points.iter().map(|p| p.x_coord()).collect();
  xs.sort_by(f64::total_cmp);

  let mut degenerate = false;
  let mut min_x_difference = xs[xs.len() - 1] - xs[0];
  for pair in xs.windows(2) {
    let difference = pair[1] - pair[0];
    if difference > epsilon {
      if difference < min_x_difference {
        min_x_difference = difference;
      }
    } else {
      degenerate = true;
    }
  }
  if !degenerate {
    return points;
  }

  let max_y_difference = {
    let mut min_y = f64::INFINITY;
    let mut max_y = f64::NEG_INFINITY;
    for p in &points {
      min_y = min_y.min(p.y_coord());
      max_y = max_y.max(p.y_coord());
    }
    max_y - min_y
  };

  // Small enough to keep the x order of non-degenerate pairs, large enough
  // to separate the degenerate ones.
  let angle = max_y_difference.atan2(min_x_difference);
  let rotation = Transform::rotate(angle / 2.0);
  trace!("rotating points {} rad to remove degeneracy", angle / 2.0);
  points.iter().map(|p| &rotation * p).collect()
}
