use array_init::array_init;
use ordered_float::OrderedFloat;
use std::hash::{Hash, Hasher};
use std::ops::{Add, Sub};

use super::Vector;

/// A point in N-dimensional space. Coordinates are plain f64; equality and
/// hashing are exact (up to zero/NaN canonicalization), while
/// [`approx_eq`](Point::approx_eq) compares with an explicit tolerance.
#[derive(Debug, Clone, Copy)]
pub struct Point<const N: usize = 2> {
  pub array: [f64; N],
}

impl<const N: usize> Point<N> {
  pub const fn new(array: [f64; N]) -> Point<N> {
    Point { array }
  }

  pub fn distance_to(&self, other: &Point<N>) -> f64 {
    self
      .array
      .iter()
      .zip(other.array.iter())
      .map(|(a, b)| (a - b) * (a - b))
      .sum::<f64>()
      .sqrt()
  }

  /// True when the L1 distance between the points is below `epsilon`.
  pub fn approx_eq(&self, other: &Point<N>, epsilon: f64) -> bool {
    self
      .array
      .iter()
      .zip(other.array.iter())
      .map(|(a, b)| (a - b).abs())
      .sum::<f64>()
      < epsilon
  }

  pub fn map<F>(&self, f: F) -> Point<N>
  where
    F: Fn(f64) -> f64,
  {
    Point {
      array: array_init(|i| f(self.array[i])),
    }
  }

  pub fn as_vec(&self) -> Vector<N> {
    Vector(self.array)
  }
}

impl<const N: usize> PartialEq for Point<N> {
  fn eq(&self, other: &Self) -> bool {
    self
      .array
      .iter()
      .zip(other.array.iter())
      .all(|(a, b)| OrderedFloat(*a) == OrderedFloat(*b))
  }
}

impl<const N: usize> Eq for Point<N> {}

impl<const N: usize> Hash for Point<N> {
  fn hash<H: Hasher>(&self, state: &mut H) {
    for c in self.array.iter() {
      OrderedFloat(*c).hash(state);
    }
  }
}

impl From<(f64, f64)> for Point<2> {
  fn from(point: (f64, f64)) -> Point<2> {
    Point {
      array: [point.0, point.1],
    }
  }
}

impl<const N: usize> From<Vector<N>> for Point<N> {
  fn from(vector: Vector<N>) -> Point<N> {
    Point { array: vector.0 }
  }
}

impl<const N: usize> Sub for Point<N> {
  type Output = Vector<N>;
  fn sub(self, other: Point<N>) -> Vector<N> {
    Vector(array_init(|i| self.array[i] - other.array[i]))
  }
}

impl<const N: usize> Add<Vector<N>> for Point<N> {
  type Output = Point<N>;
  fn add(self, offset: Vector<N>) -> Point<N> {
    Point {
      array: array_init(|i| self.array[i] + offset.0[i]),
    }
  }
}

// Methods on two-dimensional points.
impl Point<2> {
  pub fn x_coord(&self) -> f64 {
    self.array[0]
  }

  pub fn y_coord(&self) -> f64 {
    self.array[1]
  }

  /// Angle of the ray from this point to `other`, in `[-pi, pi]`.
  pub fn angle_to(&self, other: &Point<2>) -> f64 {
    (other.y_coord() - self.y_coord()).atan2(other.x_coord() - self.x_coord())
  }

  /// Lift into 3D at height `z`.
  pub fn to_3d(&self, z: f64) -> Point<3> {
    Point::new([self.array[0], self.array[1], z])
  }
}

// Methods on three-dimensional points.
impl Point<3> {
  pub fn x_coord(&self) -> f64 {
    self.array[0]
  }

  pub fn y_coord(&self) -> f64 {
    self.array[1]
  }

  pub fn z_coord(&self) -> f64 {
    self.array[2]
  }

  /// Drop the z coordinate.
  pub fn to_2d(&self) -> Point<2> {
    Point::new([self.array[0], self.array[1]])
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use proptest::prelude::*;
  use std::collections::HashMap;
  use test_strategy::proptest;

  #[test]
  fn distances() {
    let a = Point::new([0.0, 3.0]);
    let b = Point::new([4.0, 0.0]);
    assert_eq!(a.distance_to(&b), 5.0);
    assert_eq!(a.distance_to(&a), 0.0);
  }

  #[test]
  fn angles() {
    let origin = Point::new([1.0, 1.0]);
    assert_eq!(origin.angle_to(&Point::new([2.0, 1.0])), 0.0);
    assert_eq!(
      origin.angle_to(&Point::new([1.0, 2.0])),
      std::f64::consts::FRAC_PI_2
    );
  }

  #[test]
  fn zero_signs_collapse_in_maps() {
    let mut map = HashMap::new();
    map.insert(Point::new([0.0, 1.0]), 1);
    assert_eq!(map.get(&Point::new([-0.0, 1.0])), Some(&1));
  }

  #[proptest]
  fn round_trip_projection(
    #[strategy(-1e3..1e3f64)] x: f64,
    #[strategy(-1e3..1e3f64)] y: f64,
    #[strategy(-1e3..1e3f64)] z: f64,
  ) {
    let p = Point::new([x, y, z]);
    prop_assert_eq!(p.to_2d().to_3d(p.z_coord()), p);
  }

  #[proptest]
  fn approx_eq_is_reflexive(
    #[strategy(-1e3..1e3f64)] x: f64,
    #[strategy(-1e3..1e3f64)] y: f64,
  ) {
    let p = Point::new([x, y]);
    prop_assert!(p.approx_eq(&p, crate::EPS));
  }
}
