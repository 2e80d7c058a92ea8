mod bounding_box;
mod line_segment;
mod obstacle;
mod point;
mod polygon;
mod vector;

pub use bounding_box::BoundingBox;
pub use line_segment::LineSegment;
pub use obstacle::{Obstacle, ObstacleSet};
pub use point::Point;
pub use polygon::Polygon;
pub use vector::Vector;
