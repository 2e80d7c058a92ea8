use std::collections::HashSet;
use std::f64::consts::{FRAC_PI_2, PI};

use crate::data::Point;
use crate::Error;

///////////////////////////////////////////////////////////////////////////////
// Line

/// A non-vertical line `y = slope * x + intercept`. Arrangement lines are
/// duals of input points, so after degeneracy removal no two share a slope.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Line {
  pub slope: f64,
  pub intercept: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LineIntersection {
  Crossing(Point<2>),
  Parallel,
  Coincident,
}

impl Line {
  pub fn new(slope: f64, intercept: f64) -> Line {
    Line { slope, intercept }
  }

  pub fn eval(&self, x: f64) -> f64 {
    x * self.slope + self.intercept
  }

  pub fn intersection(&self, other: &Line) -> LineIntersection {
    if self.slope == other.slope {
      if self.intercept == other.intercept {
        LineIntersection::Coincident
      } else {
        LineIntersection::Parallel
      }
    } else {
      let x = -(self.intercept - other.intercept) / (self.slope - other.slope);
      let y = self.eval(x);
      LineIntersection::Crossing(Point::new([x, y]))
    }
  }
}

///////////////////////////////////////////////////////////////////////////////
// PlanarGraph

#[derive(Debug, Clone, Copy)]
struct EdgeInfo {
  /// Origin vertex.
  tail: usize,
  /// Terminus vertex.
  head: usize,
  /// The adjacent edge counter-clockwise around the tail vertex.
  prev: usize,
  /// The adjacent edge counter-clockwise around the head vertex.
  next: usize,
  /// The line this edge is a piece of.
  line: usize,
}

#[derive(Debug, Clone)]
struct VertexInfo {
  position: Point<2>,
  /// One of the edges incident to this vertex.
  header: usize,
}

/// The arrangement of a set of lines, built incrementally. Vertex 0 is the
/// shared vertex at infinity: every unbounded edge ends there, and each
/// line forms a simple left-to-right path between its two ends at vertex 0.
#[derive(Debug, Clone)]
pub struct PlanarGraph {
  edges: Vec<EdgeInfo>,
  vertices: Vec<VertexInfo>,
  lines: Vec<Line>,
  epsilon: f64,
}

impl PlanarGraph {
  pub fn new(epsilon: f64) -> PlanarGraph {
    PlanarGraph {
      edges: Vec::new(),
      // The vertex at infinity carries a dummy position.
      vertices: vec![VertexInfo {
        position: Point::new([0.0, 0.0]),
        header: 0,
      }],
      lines: Vec::new(),
      epsilon,
    }
  }

  pub fn line(&self, line_index: usize) -> &Line {
    &self.lines[line_index]
  }

  pub fn line_count(&self) -> usize {
    self.lines.len()
  }

  /// Insert a line, splitting crossed edges and adding the new line's
  /// edges so the graph stays a planar arrangement.
  pub fn add_line(&mut self, new_line: Line) -> Result<(), Error> {
    let line_index = self.lines.len();
    self.lines.push(new_line);

    if self.edges.is_empty() {
      // First line: one unbounded edge looping through infinity.
      let edge_index = 0;
      self.edges.push(EdgeInfo {
        tail: 0,
        head: 0,
        prev: edge_index,
        next: edge_index,
        line: line_index,
      });
      return Ok(());
    }

    // Find where the new line crosses the first line; its edges partition
    // the plane by x.
    let mut intersection_vertex = None;
    for edge_index in self.edges_of_line(0)? {
      if let Some(crossing) = self.edge_line_intersection(edge_index, line_index) {
        intersection_vertex = Some(self.split_edge(edge_index, crossing));
        break;
      }
    }
    let intersection_vertex = intersection_vertex.ok_or_else(|| {
      Error::GraphCorruption(format!(
        "line {:?} does not cross the reference line",
        new_line
      ))
    })?;

    // Walk outward along the new line from both halves of the first line.
    let header = self.vertices[intersection_vertex].header;
    let mut current = header;
    loop {
      if self.edges[current].line == 0 {
        self.follow_line(current, intersection_vertex, line_index)?;
      }
      current = self.next_edge(current, intersection_vertex);
      if current == header {
        break;
      }
    }
    Ok(())
  }

  /// Walk from `vertex_index` along faces, splitting every edge crossed by
  /// the new line and chaining new edges between the crossings, until the
  /// walk leaves through the correct end at infinity.
  fn follow_line(
    &mut self,
    mut edge_index: usize,
    mut vertex_index: usize,
    line_index: usize,
  ) -> Result<(), Error> {
    // Does this walk run toward +infinity or -infinity?
    let is_up = (self.edges[edge_index].head == vertex_index
      && self.lines[line_index].slope > self.lines[0].slope)
      || (self.edges[edge_index].tail == vertex_index
        && self.lines[line_index].slope < self.lines[0].slope);

    // Floating-point trouble could make this walk cycle; cap it.
    let max_iterations = self.edges.len() * 2;
    let mut iterations = 0;

    let mut last_line_vertex = vertex_index;
    loop {
      let mut intersection_found = false;

      if let Some(crossing) = self.edge_line_intersection(edge_index, line_index) {
        let intersection_index = self.split_edge(edge_index, crossing);

        if intersection_index != vertex_index {
          intersection_found = true;
        }

        // The split may have left `edge_index` as the half not touching
        // the walk vertex; step to the half that does.
        if self.edges[edge_index].head != vertex_index
          && self.edges[edge_index].tail != vertex_index
        {
          edge_index = self.next_edge(edge_index, intersection_index);
        }

        if intersection_found {
          // New edge joining the last two crossings, tail always left.
          if is_up {
            self.add_edge(last_line_vertex, intersection_index, line_index)?;
          } else {
            self.add_edge(intersection_index, last_line_vertex, line_index)?;
          }
          last_line_vertex = intersection_index;
          edge_index = self.next_edge(edge_index, vertex_index);
        }
      }

      if !intersection_found {
        // No crossing here: continue along the boundary of this face.
        let current = self.edges[edge_index];
        if current.head == vertex_index {
          edge_index = self.next_edge(edge_index, current.tail);
          vertex_index = current.tail;
        } else {
          edge_index = self.next_edge(edge_index, current.head);
          vertex_index = current.head;
        }
      }

      if iterations > max_iterations {
        return Err(Error::GraphCorruption(
          "arrangement walk exceeded the iteration cap".to_string(),
        ));
      }
      iterations += 1;

      if vertex_index == 0 && is_up != self.upper_side(edge_index, vertex_index, line_index) {
        break;
      }
    }

    // Close the walk off at infinity.
    if is_up {
      self.add_edge(last_line_vertex, 0, line_index)?;
    } else {
      self.add_edge(0, last_line_vertex, line_index)?;
    }
    Ok(())
  }

  /// Whether the far side of `edge_index` at `vertex_index` lies above the
  /// given line. At the vertex at infinity the slopes decide.
  fn upper_side(&self, edge_index: usize, vertex_index: usize, line_index: usize) -> bool {
    debug_assert!(
      self.edges[edge_index].tail == vertex_index || self.edges[edge_index].head == vertex_index
    );
    let line = &self.lines[line_index];
    if vertex_index == 0 {
      let edge_line = &self.lines[self.edges[edge_index].line];
      if self.edges[edge_index].tail == 0 {
        edge_line.slope < line.slope
      } else {
        edge_line.slope > line.slope
      }
    } else {
      let vertex = &self.vertices[vertex_index].position;
      line.eval(vertex.x_coord()) > vertex.y_coord()
    }
  }

  /// Crossing of an edge with a line, when it lies within the edge. The
  /// edge's endpoints at infinity impose no bound on their side.
  fn edge_line_intersection(&self, edge_index: usize, line_index: usize) -> Option<Point<2>> {
    let edge = &self.edges[edge_index];
    let crossing = match self.lines[edge.line].intersection(&self.lines[line_index]) {
      LineIntersection::Crossing(p) => p,
      // Distinct dual slopes make these unreachable; treat them as a miss.
      LineIntersection::Parallel | LineIntersection::Coincident => return None,
    };
    let x = crossing.x_coord();
    if (edge.tail == 0 || x >= self.vertices[edge.tail].position.x_coord())
      && (edge.head == 0 || x <= self.vertices[edge.head].position.x_coord())
    {
      return Some(crossing);
    }
    // Tolerate crossings that fall just past an endpoint.
    if (edge.head > 0
      && crossing.distance_to(&self.vertices[edge.head].position) < self.epsilon)
      || (edge.tail > 0
        && crossing.distance_to(&self.vertices[edge.tail].position) < self.epsilon)
    {
      return Some(crossing);
    }
    None
  }

  /// Split an edge at `position`. When the position coincides with one of
  /// the edge's endpoints no split happens; the index of the vertex at the
  /// position is returned either way.
  fn split_edge(&mut self, edge_index: usize, position: Point<2>) -> usize {
    let edge = self.edges[edge_index];

    if edge.head > 0 && position.distance_to(&self.vertices[edge.head].position) < self.epsilon {
      return edge.head;
    }
    if edge.tail > 0 && position.distance_to(&self.vertices[edge.tail].position) < self.epsilon {
      return edge.tail;
    }

    let vertex_index = self.vertices.len();
    let new_edge_index = self.edges.len();

    // The right half becomes a new edge; the left half reuses the old one.
    let mut new_edge = edge;
    new_edge.tail = vertex_index;
    new_edge.prev = edge_index;

    self.edges[edge_index].head = vertex_index;
    self.edges[edge_index].next = new_edge_index;

    self.edges.push(new_edge);
    self.update_edge_references(new_edge_index, edge_index);

    self.vertices.push(VertexInfo {
      position,
      header: new_edge_index,
    });

    vertex_index
  }

  /// Add an edge between two existing vertices, inserting it into the
  /// cyclic orders around both.
  fn add_edge(&mut self, tail: usize, head: usize, line_index: usize) -> Result<(), Error> {
    if tail == head {
      return Ok(());
    }
    let new_edge_index = self.edges.len();
    self.edges.push(EdgeInfo {
      tail,
      head,
      prev: new_edge_index,
      next: new_edge_index,
      line: line_index,
    });
    self.update_edges(new_edge_index, tail)?;
    self.update_edges(new_edge_index, head)?;
    Ok(())
  }

  /// Splice `new_edge_index` into the counter-clockwise edge order around
  /// `vertex_index`, keyed by the angle each edge leaves the vertex at.
  fn update_edges(&mut self, new_edge_index: usize, vertex_index: usize) -> Result<(), Error> {
    let first_edge = self.vertices[vertex_index].header;
    let mut current_edge = first_edge;
    let mut current_alpha = self.alpha(current_edge, vertex_index);
    let new_alpha = self.alpha(new_edge_index, vertex_index);

    loop {
      let next_edge = self.next_edge(current_edge, vertex_index);
      let next_alpha = self.alpha(next_edge, vertex_index);

      let fits = if current_alpha <= next_alpha {
        current_alpha < new_alpha && new_alpha <= next_alpha
      } else {
        current_alpha < new_alpha || new_alpha <= next_alpha
      };
      if fits {
        if self.edges[new_edge_index].tail == vertex_index {
          self.edges[new_edge_index].prev = next_edge;
        } else {
          self.edges[new_edge_index].next = next_edge;
        }
        if self.edges[current_edge].tail == vertex_index {
          self.edges[current_edge].prev = new_edge_index;
        } else {
          self.edges[current_edge].next = new_edge_index;
        }
        return Ok(());
      }

      current_edge = next_edge;
      current_alpha = next_alpha;
      if current_edge == first_edge {
        return Err(Error::GraphCorruption(
          "failed to splice a new edge into a vertex cycle".to_string(),
        ));
      }
    }
  }

  /// The next edge counter-clockwise around `vertex_index`.
  fn next_edge(&self, edge_index: usize, vertex_index: usize) -> usize {
    let edge = &self.edges[edge_index];
    debug_assert!(edge.head == vertex_index || edge.tail == vertex_index);
    if edge.head == vertex_index {
      edge.next
    } else {
      edge.prev
    }
  }

  /// Angle in [-pi, pi] at which an edge leaves one of its vertices. The
  /// vertex at infinity orients its unbounded rays by slope instead.
  fn alpha(&self, edge_index: usize, vertex_index: usize) -> f64 {
    let edge = &self.edges[edge_index];
    debug_assert!(edge.head == vertex_index || edge.tail == vertex_index);
    let slope_angle = self.lines[edge.line].slope.atan();
    if vertex_index > 0 {
      if edge.tail == vertex_index {
        slope_angle
      } else if slope_angle < 0.0 {
        slope_angle + PI
      } else {
        slope_angle - PI
      }
    } else if edge.tail == vertex_index {
      FRAC_PI_2 - slope_angle
    } else {
      -FRAC_PI_2 - slope_angle
    }
  }

  /// After a split, exactly one edge at the new edge's head still links to
  /// the old edge; repoint it.
  fn update_edge_references(&mut self, edge_index: usize, old_edge_index: usize) {
    let head = self.edges[edge_index].head;
    let mut current = edge_index;
    loop {
      let next = self.next_edge(current, head);
      if next == old_edge_index && current != edge_index {
        debug_assert!(self.edges[current].head == head || self.edges[current].tail == head);
        if self.edges[current].head == head {
          self.edges[current].next = edge_index;
        } else {
          self.edges[current].prev = edge_index;
        }
        return;
      }
      current = next;
      if current == edge_index {
        return;
      }
    }
  }

  /// The edges making up a line, left to right.
  pub fn edges_of_line(&self, line_index: usize) -> Result<Vec<usize>, Error> {
    debug_assert!(line_index < self.lines.len());
    let mut result = Vec::new();
    let mut vertex_index = 0;
    loop {
      let mut edge_index = self.vertices[vertex_index].header;
      let mut scanned = 0;
      while self.edges[edge_index].line != line_index
        || self.edges[edge_index].tail != vertex_index
      {
        edge_index = self.next_edge(edge_index, vertex_index);
        scanned += 1;
        if scanned > self.edges.len() * 2 {
          return Err(Error::GraphCorruption(
            "vertex cycle does not contain the expected line".to_string(),
          ));
        }
      }
      result.push(edge_index);
      vertex_index = self.edges[edge_index].head;
      if vertex_index == 0 {
        break;
      }
    }
    Ok(result)
  }

  /// All other lines in the order the given line crosses them, left to
  /// right. In the dual this is the angular order of the other points
  /// around the line's point.
  pub fn sorted_lines(&self, line_index: usize) -> Result<Vec<usize>, Error> {
    let mut result = Vec::new();
    let mut added: HashSet<usize> = HashSet::new();

    let edge_list = self.edges_of_line(line_index)?;
    for pair in edge_list.windows(2) {
      let mut edge_index = pair[0];
      let final_edge_index = pair[1];
      let vertex_index = self.edges[edge_index].head;

      let mut scanned = 0;
      while edge_index != final_edge_index {
        let current_line = self.edges[edge_index].line;
        if current_line != line_index {
          added.insert(current_line);
          result.push(current_line);
        }
        edge_index = self.next_edge(edge_index, vertex_index);
        scanned += 1;
        if scanned > self.edges.len() * 2 {
          return Err(Error::GraphCorruption(
            "crossing scan did not reach the next edge of the line".to_string(),
          ));
        }
      }
    }

    if result.len() != self.lines.len() - 1 {
      return Err(Error::GraphCorruption(format!(
        "expected {} crossed lines, found {} ({:?})",
        self.lines.len() - 1,
        result.len(),
        result
      )));
    }
    if added.len() != self.lines.len() - 1 {
      return Err(Error::GraphCorruption(format!(
        "crossed line list contains repeated entries ({:?})",
        result
      )));
    }

    Ok(result)
  }
}
