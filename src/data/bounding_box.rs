use crate::Error;

use super::Point;

/// Axis-aligned rectangle used to cheaply discard points and polygons.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
  min_x: f64,
  min_y: f64,
  max_x: f64,
  max_y: f64,
}

impl BoundingBox {
  pub fn new(min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> Result<BoundingBox, Error> {
    if min_x > max_x || min_y > max_y {
      return Err(Error::InvalidInput(
        "minimum and maximum bounding box coordinates are inverted".to_string(),
      ));
    }
    Ok(BoundingBox {
      min_x,
      min_y,
      max_x,
      max_y,
    })
  }

  /// The degenerate box holding a single point.
  pub fn from_point(point: &Point<2>) -> BoundingBox {
    BoundingBox {
      min_x: point.x_coord(),
      min_y: point.y_coord(),
      max_x: point.x_coord(),
      max_y: point.y_coord(),
    }
  }

  pub fn contains(&self, point: &Point<2>) -> bool {
    point.x_coord() >= self.min_x
      && point.x_coord() <= self.max_x
      && point.y_coord() >= self.min_y
      && point.y_coord() <= self.max_y
  }

  /// True when the interiors of the boxes overlap. Boxes sharing only a
  /// border do not intersect.
  pub fn intersects(&self, other: &BoundingBox) -> bool {
    other.max_x > self.min_x
      && other.min_x < self.max_x
      && other.max_y > self.min_y
      && other.min_y < self.max_y
  }

  /// Grow the box so it covers `point`.
  pub fn include(&mut self, point: &Point<2>) {
    self.min_x = self.min_x.min(point.x_coord());
    self.min_y = self.min_y.min(point.y_coord());
    self.max_x = self.max_x.max(point.x_coord());
    self.max_y = self.max_y.max(point.y_coord());
  }

  pub fn min_x(&self) -> f64 {
    self.min_x
  }

  pub fn min_y(&self) -> f64 {
    self.min_y
  }

  pub fn max_x(&self) -> f64 {
    self.max_x
  }

  pub fn max_y(&self) -> f64 {
    self.max_y
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use claims::assert_err;

  #[test]
  fn inverted_bounds_are_rejected() {
    assert_err!(BoundingBox::new(1.0, 0.0, 0.0, 2.0));
    assert_err!(BoundingBox::new(0.0, 2.0, 1.0, 0.0));
  }

  #[test]
  fn include_grows() {
    let mut bbox = BoundingBox::from_point(&Point::new([1.0, 1.0]));
    bbox.include(&Point::new([-1.0, 3.0]));
    assert!(bbox.contains(&Point::new([0.0, 2.0])));
    assert!(!bbox.contains(&Point::new([0.0, 3.5])));
  }

  #[test]
  fn border_touch_is_not_intersection() {
    let a = BoundingBox::new(0.0, 0.0, 1.0, 1.0).unwrap();
    let b = BoundingBox::new(1.0, 0.0, 2.0, 1.0).unwrap();
    let c = BoundingBox::new(0.5, 0.5, 2.0, 2.0).unwrap();
    assert!(!a.intersects(&b));
    assert!(a.intersects(&c));
  }
}
