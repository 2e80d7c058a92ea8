use array_init::array_init;
use std::ops::Mul;

use crate::data::{Point, Vector};
use crate::matrix::Matrix;
use crate::{Error, EPS};

/// A homogeneous affine transform in N dimensions, stored as an
/// (N+1)×(N+1) matrix. Everything the crate builds is a product of
/// rotations and translations, which keeps the homogeneous component at 1
/// and makes [`inverse`](Transform::inverse) exact.
#[derive(Clone, Debug)]
pub struct Transform<const N: usize>(Matrix<f64>);

impl<const N: usize> Transform<N> {
  fn new(m: Matrix<f64>) -> Transform<N> {
    assert_eq!(m.nrows(), N + 1);
    assert_eq!(m.ncols(), N + 1);
    Transform(m)
  }

  pub fn identity() -> Transform<N> {
    Transform::new(Matrix::identity(N + 1))
  }

  pub fn translate(vec: Vector<N>) -> Transform<N> {
    let mut m = Matrix::identity(N + 1);
    for i in 0..N {
      m[(i, N)] = vec[i];
    }
    Transform::new(m)
  }

  /// The inverse of a rigid transform: transposed rotation block and
  /// back-rotated, negated translation.
  pub fn inverse(&self) -> Transform<N> {
    let mut m = Matrix::new(N + 1, N + 1);
    for r in 0..N {
      for c in 0..N {
        m[(r, c)] = self.0[(c, r)];
      }
    }
    for r in 0..N {
      let mut back = 0.0;
      for c in 0..N {
        back += self.0[(c, r)] * self.0[(c, N)];
      }
      m[(r, N)] = -back;
    }
    m[(N, N)] = 1.0;
    Transform::new(m)
  }
}

impl Transform<2> {
  /// Counter-clockwise rotation around the origin.
  pub fn rotate(angle: f64) -> Transform<2> {
    let sine = angle.sin();
    let cosine = angle.cos();
    let mut m = Matrix::identity(3);
    m[(0, 0)] = cosine;
    m[(0, 1)] = -sine;
    m[(1, 0)] = sine;
    m[(1, 1)] = cosine;
    Transform::new(m)
  }
}

impl Transform<3> {
  /// Rotation of `angle` radians around a unit `axis` through the origin.
  pub fn rotate_around(angle: f64, axis: Vector<3>) -> Result<Transform<3>, Error> {
    if (axis.norm() - 1.0).abs() >= EPS {
      return Err(Error::GeometryDegenerate(format!(
        "rotation axis {:?} is not a unit vector",
        axis
      )));
    }
    let s = angle.sin();
    let c = angle.cos();
    let (ux, uy, uz) = (axis[0], axis[1], axis[2]);

    let mut m = Matrix::identity(4);
    m[(0, 0)] = c + ux * ux * (1.0 - c);
    m[(0, 1)] = ux * uy * (1.0 - c) - uz * s;
    m[(0, 2)] = ux * uz * (1.0 - c) + uy * s;
    m[(1, 0)] = uy * ux * (1.0 - c) + uz * s;
    m[(1, 1)] = c + uy * uy * (1.0 - c);
    m[(1, 2)] = uy * uz * (1.0 - c) - ux * s;
    m[(2, 0)] = uz * ux * (1.0 - c) - uy * s;
    m[(2, 1)] = uz * uy * (1.0 - c) + ux * s;
    m[(2, 2)] = c + uz * uz * (1.0 - c);
    Ok(Transform::new(m))
  }
}

impl<const N: usize> Mul<&Transform<N>> for &Transform<N> {
  type Output = Transform<N>;
  fn mul(self, other: &Transform<N>) -> Transform<N> {
    Transform::new(&self.0 * &other.0)
  }
}

impl<const N: usize> Mul for Transform<N> {
  type Output = Transform<N>;
  fn mul(self, other: Transform<N>) -> Transform<N> {
    &self * &other
  }
}

impl<const N: usize> Mul<&Point<N>> for &Transform<N> {
  type Output = Point<N>;
  fn mul(self, other: &Point<N>) -> Point<N> {
    let mut col = Matrix::new(N + 1, 1);
    for i in 0..N {
      col[(i, 0)] = other.array[i];
    }
    col[(N, 0)] = 1.0;
    let ret = &self.0 * &col;
    let normalizer = ret[(N, 0)];
    // A vanishing homogeneous component cannot come out of an affine
    // product; it is a programming error rather than an input failure.
    assert!(normalizer != 0.0, "cannot homogenize transformed point");
    Point {
      array: array_init(|i| ret[(i, 0)] / normalizer),
    }
  }
}

impl<const N: usize> Mul<Point<N>> for &Transform<N> {
  type Output = Point<N>;
  fn mul(self, other: Point<N>) -> Point<N> {
    self * &other
  }
}
