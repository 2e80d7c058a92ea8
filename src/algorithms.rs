pub mod astar;
pub mod lca;
pub mod visibility;

pub use astar::SearchGraph;
pub use lca::LeastCommonAncestor;
pub use visibility::VisibilityGraph;
