//! Visibility-graph construction.
//!
//! The 2D half works one horizontal slice at a time: points are sorted
//! angularly around each pivot through a dual-line arrangement, and a
//! rotational sweep over a "shortest as long as" envelope decides which
//! points the pivot sees and which segment blocks the rest. The 3D half
//! stacks those slices at the distinct obstacle heights and grafts in
//! slope points where a line of sight has to climb over an occluder.

mod envelope;
mod graph;
mod graph_2d;
mod graph_3d;
mod planar_graph;
mod point_sorter;
mod scene;
mod self_occlusion;
mod solver;

pub use graph::VisibilityGraph;
pub use graph_2d::SliceVisibility;
pub use graph_3d::visibility_graph_3d;
pub use planar_graph::{Line, LineIntersection, PlanarGraph};
pub use point_sorter::PointSorter;
pub use scene::Scene;
