use crate::Error;

use super::scene::Scene;

/// Angular cone at one polygon corner, pointing into the polygon interior.
/// Looking at the polygon from its corner, `right` is the angle to the
/// next point counter-clockwise and `left` to the next point clockwise;
/// rays strictly between them dive into the polygon.
#[derive(Debug, Clone, Copy)]
struct OcclusionAngles {
  right: f64,
  left: f64,
  occluding_segment: usize,
}

/// Precomputed interior cones for every polygon corner. Targets falling
/// inside a cone of the query pivot are occluded by the near incident
/// edge, whatever the envelope sweep said; this settles rays that graze
/// along a polygon from one of its own corners.
pub struct SelfOcclusion {
  cones: Vec<Vec<OcclusionAngles>>,
}

impl SelfOcclusion {
  pub fn new(scene: &Scene) -> Result<SelfOcclusion, Error> {
    let mut cones: Vec<Vec<OcclusionAngles>> = vec![Vec::new(); scene.points.len()];

    for polygon in &scene.polygons {
      for position in 0..polygon.len() {
        let current = scene.segments[polygon[position]];
        let next = scene.segments[polygon[(position + 1) % polygon.len()]];

        // The two segments share their central point one of four ways.
        let (central, right, left) = if current.0 == next.0 {
          (current.0, current.1, next.1)
        } else if current.0 == next.1 {
          (current.0, current.1, next.0)
        } else if current.1 == next.0 {
          (current.1, current.0, next.1)
        } else if current.1 == next.1 {
          (current.1, current.0, next.0)
        } else {
          return Err(Error::GraphCorruption(
            "consecutive polygon segments share no common point".to_string(),
          ));
        };

        let central_point = &scene.points[central];
        cones[central].push(OcclusionAngles {
          right: central_point.angle_to(&scene.points[right]),
          left: central_point.angle_to(&scene.points[left]),
          occluding_segment: polygon[position],
        });
      }
    }

    Ok(SelfOcclusion { cones })
  }

  /// The segment occluding `target` from `origin` when the ray between
  /// them enters a polygon incident to `origin`.
  pub fn occluding_segment(&self, origin: usize, target: usize, scene: &Scene) -> Option<usize> {
    if origin == target || self.cones[origin].is_empty() {
      return None;
    }
    let angle = scene.points[origin].angle_to(&scene.points[target]);
    for cone in &self.cones[origin] {
      if cone.right <= cone.left {
        if cone.right < angle && angle < cone.left {
          return Some(cone.occluding_segment);
        }
      } else {
        // The cone wraps through the angle cut at pi.
        if cone.right < angle || angle < cone.left {
          return Some(cone.occluding_segment);
        }
      }
    }
    None
  }
}
