use log::{trace, warn};
use std::f64::consts::PI;

use crate::data::{LineSegment, Obstacle, ObstacleSet, Point, Polygon, Vector};
use crate::intersection::segment_horizontal_plane_intersection;
use crate::transformation::Transform;
use crate::{Error, EPS};

use super::{planar, Path};

/// How many rotations of the cut plane around the origin-target axis are
/// tried.
const CUT_COUNT: usize = 4;

/// Rotate the scene so the origin-target axis is horizontal, cut every
/// prism by the plane through that axis, solve the cut in 2D, and lift the
/// best result back. Each of the `CUT_COUNT` plane orientations is allowed
/// to fail on its own; only all of them failing fails the query.
pub(crate) fn find_path(
  obstacles: &ObstacleSet,
  origin: &Point<3>,
  target: &Point<3>,
) -> Result<Path<3>, Error> {
  if origin == target {
    return Ok(Path::from(vec![*origin]));
  }

  let global_transform = transformation_matrix(origin, target)?;

  let mut best: Option<Path<3>> = None;
  for k in 0..CUT_COUNT {
    let rotation_angle = PI * k as f64 / CUT_COUNT as f64;
    let attempt = cut_and_solve(obstacles, origin, target, &global_transform, rotation_angle);
    match attempt {
      Ok(lifted) => {
        // A lift that dips underground between its endpoints is useless.
        let valid = lifted[1..lifted.len() - 1]
          .iter()
          .all(|p| p.z_coord() > EPS);
        if valid && best.as_ref().map_or(true, |b| lifted.length() < b.length()) {
          best = Some(lifted);
        }
      }
      Err(e) => warn!("cut plane {} of {} failed: {}", k, CUT_COUNT, e),
    }
  }

  best.ok_or(Error::PlanFailedAllCuts)
}

fn cut_and_solve(
  obstacles: &ObstacleSet,
  origin: &Point<3>,
  target: &Point<3>,
  global_transform: &Transform<3>,
  rotation_angle: f64,
) -> Result<Path<3>, Error> {
  let rotation = Transform::rotate_around(rotation_angle, Vector([1.0, 0.0, 0.0]))?;
  let transform = &rotation * global_transform;
  let inverse = transform.inverse();

  let cut_polygons = cut_obstacles(&transform, obstacles)?;
  let origin_2d = (&transform * origin).to_2d();
  let target_2d = (&transform * target).to_2d();

  let flat = planar::find_path(&cut_polygons, &origin_2d, &target_2d)?;

  let lifted: Vec<Point<3>> = flat.iter().map(|p| &inverse * &p.to_3d(0.0)).collect();
  Ok(Path::from(lifted))
}

/// The rigid transform sending `origin` to the coordinate origin and
/// `target` onto the positive x axis.
fn transformation_matrix(origin: &Point<3>, target: &Point<3>) -> Result<Transform<3>, Error> {
  let translation = Transform::translate(-Vector::from(*origin));
  let mut moved = &translation * target;

  let z_rotation = moved.y_coord().atan2(moved.x_coord());
  let around_z = Transform::rotate_around(z_rotation, Vector([0.0, 0.0, -1.0]))?;
  moved = &around_z * &moved;
  debug_assert!(moved.y_coord().abs() < 1e-6);

  let y_rotation = moved.z_coord().atan2(moved.x_coord());
  let around_y = Transform::rotate_around(y_rotation, Vector([0.0, 1.0, 0.0]))?;
  moved = &around_y * &moved;
  debug_assert!(moved.z_coord().abs() < 1e-6);

  Ok(&around_y * &(&around_z * &translation))
}

fn cut_obstacles(
  transform: &Transform<3>,
  obstacles: &ObstacleSet,
) -> Result<Vec<Polygon>, Error> {
  let mut result = Vec::new();
  for obs in obstacles {
    if let Some(polygon) = cut_obstacle(transform, obs)? {
      result.push(polygon);
    }
  }
  Ok(result)
}

/// Where each prism vertex pair sits relative to the cut plane.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Position {
  Over,
  Middle,
  Under,
}

/// Emission order of a simultaneous roof-and-base crossing; ties alternate
/// to keep the cut polygon from self-crossing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Order {
  TopBottom,
  BottomTop,
  Undefined,
}

/// Cut one transformed prism by the plane z = 0. Walks the vertex pairs
/// (roof point, base point) around the shape; every change of side emits
/// the crossings of the roof and base edges, and pairs straddling the
/// plane emit the crossing of their vertical edge.
fn cut_obstacle(transform: &Transform<3>, obstacle: &Obstacle) -> Result<Option<Polygon>, Error> {
  let top: Vec<Point<3>> = obstacle
    .shape()
    .iter()
    .map(|p| transform * &p.to_3d(obstacle.height()))
    .collect();
  let bottom: Vec<Point<3>> = obstacle
    .shape()
    .iter()
    .map(|p| transform * &p.to_3d(0.0))
    .collect();

  let classify = |roof: &Point<3>, base: &Point<3>| {
    if roof.z_coord() > 0.0 && base.z_coord() > 0.0 {
      Position::Over
    } else if roof.z_coord() <= 0.0 && base.z_coord() <= 0.0 {
      Position::Under
    } else {
      Position::Middle
    }
  };
  let plane_crossing = |seg: LineSegment<3>| {
    segment_horizontal_plane_intersection(&seg, 0.0).ok_or_else(|| {
      Error::NoIntersection(format!("prism edge {:?} does not reach the cut plane", seg))
    })
  };

  let count = top.len();
  let mut points: Vec<Point<2>> = Vec::new();
  let mut last_top = top[count - 1];
  let mut last_bottom = bottom[count - 1];
  let mut last_position = classify(&last_top, &last_bottom);
  let mut last_order = Order::Undefined;

  for i in 0..count {
    let current_top = top[i];
    let current_bottom = bottom[i];
    let current_position = classify(&current_top, &current_bottom);

    if current_position != last_position {
      let mut intersection_top = None;
      let mut intersection_bottom = None;
      if (current_top.z_coord() <= 0.0) ^ (last_top.z_coord() <= 0.0) {
        intersection_top = Some(plane_crossing(LineSegment::new(last_top, current_top))?);
      }
      if (current_bottom.z_coord() <= 0.0) ^ (last_bottom.z_coord() <= 0.0) {
        intersection_bottom =
          Some(plane_crossing(LineSegment::new(last_bottom, current_bottom))?);
      }

      match (intersection_top, intersection_bottom) {
        (Some(t), None) => points.push(t.to_2d()),
        (None, Some(b)) => points.push(b.to_2d()),
        (Some(t), Some(b)) => {
          let dist_top = t.distance_to(&last_top);
          let dist_bottom = b.distance_to(&last_bottom);
          let order = if dist_top < dist_bottom {
            Order::TopBottom
          } else if dist_top > dist_bottom {
            Order::BottomTop
          } else if last_order == Order::BottomTop {
            Order::TopBottom
          } else {
            Order::BottomTop
          };
          match order {
            Order::TopBottom => {
              points.push(t.to_2d());
              points.push(b.to_2d());
            }
            _ => {
              points.push(b.to_2d());
              points.push(t.to_2d());
            }
          }
          last_order = order;
        }
        (None, None) => {
          return Err(Error::GeometryDegenerate(
            "side change without a roof or base crossing".to_string(),
          ))
        }
      }
    }

    if current_position == Position::Middle {
      let crossing = plane_crossing(LineSegment::new(current_bottom, current_top))?;
      points.push(crossing.to_2d());
    }

    last_top = current_top;
    last_bottom = current_bottom;
    last_position = current_position;
  }

  if points.is_empty() {
    return Ok(None);
  }
  trace!("cut polygon: {:?}", points);
  Ok(Some(Polygon::new(points)?))
}
