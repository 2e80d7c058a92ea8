use log::{debug, trace};
use ordered_float::OrderedFloat;
use priority_queue::PriorityQueue;
use std::cmp::Reverse;
use std::collections::{HashMap, HashSet};

use crate::data::Point;
use crate::planner::Path;
use crate::Error;

/// A graph whose vertices are points and whose edges carry Euclidean
/// lengths. Implementations may answer edge probes lazily.
pub trait SearchGraph<const N: usize> {
  fn len(&self) -> usize;

  fn is_empty(&self) -> bool {
    self.len() == 0
  }

  fn point(&self, index: usize) -> &Point<N>;

  fn index_of(&self, point: &Point<N>) -> Result<usize, Error>;

  /// The length of the edge between two vertices, or `None` when they are
  /// not connected.
  fn edge(&self, a: usize, b: usize) -> Option<f64>;

  /// Indices of every vertex connected to `index`.
  fn neighbors(&self, index: usize) -> Vec<usize>;
}

/// A* with the straight-line distance to the target as heuristic. The
/// heuristic never overestimates, so the first time the target is popped
/// the path is optimal over the graph.
pub fn find_path<const N: usize, G: SearchGraph<N>>(
  graph: &G,
  origin: &Point<N>,
  target: &Point<N>,
) -> Result<Path<N>, Error> {
  let origin_index = graph.index_of(origin)?;
  let target_index = graph.index_of(target)?;
  let target_point = *graph.point(target_index);

  let mut frontier: PriorityQueue<usize, Reverse<OrderedFloat<f64>>> = PriorityQueue::new();
  let mut accumulated: HashMap<usize, f64> = HashMap::new();
  let mut explored: HashSet<usize> = HashSet::new();
  let mut parents: Vec<usize> = (0..graph.len()).collect();

  accumulated.insert(origin_index, 0.0);
  frontier.push(
    origin_index,
    Reverse(OrderedFloat(origin.distance_to(&target_point))),
  );

  while let Some((node, _)) = frontier.pop() {
    if node == target_index {
      let mut reverse_result = Vec::new();
      let mut current = target_index;
      while current != parents[current] {
        reverse_result.push(*graph.point(current));
        current = parents[current];
      }
      reverse_result.push(*graph.point(origin_index));
      reverse_result.reverse();
      debug!(
        "path found: cost {}, {} vertices",
        accumulated[&node],
        reverse_result.len()
      );
      return Ok(Path::from(reverse_result));
    }

    explored.insert(node);
    let node_cost = accumulated[&node];

    for p in graph.neighbors(node) {
      if explored.contains(&p) {
        continue;
      }
      let Some(edge) = graph.edge(node, p) else {
        continue;
      };
      let tentative = node_cost + edge;
      if tentative < accumulated.get(&p).copied().unwrap_or(f64::INFINITY) {
        accumulated.insert(p, tentative);
        let estimated = Reverse(OrderedFloat(
          tentative + graph.point(p).distance_to(&target_point),
        ));
        // A higher Reverse priority is a lower estimated cost, so this is
        // the decrease-key operation.
        if frontier.change_priority(&p, estimated).is_none() {
          frontier.push(p, estimated);
        }
        parents[p] = node;
        trace!("relaxed vertex {} to cost {}", p, tentative);
      }
    }
  }

  Err(Error::NoPathFound)
}
