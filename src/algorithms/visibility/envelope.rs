///////////////////////////////////////////////////////////////////////////////
// SegmentData

/// One envelope entry: a segment index and the rank at which the segment
/// leaves the sweep.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SegmentData {
  pub segment: usize,
  pub rank: usize,
}

///////////////////////////////////////////////////////////////////////////////
// Envelope

#[derive(Debug, Clone, Copy)]
struct Node {
  data: SegmentData,
  prev: Option<usize>,
  next: Option<usize>,
}

/// The segments currently under the sweep ray, ordered by the rank of
/// their far endpoint. The head is the nearest segment.
///
/// Ranks present at any one time all lie on a single root path of the
/// implicit binary tree (the sweep collapses each segment to its ancestor
/// rank first), so the number of trailing zeros of `rank + 1` identifies
/// an entry uniquely. A bitmask over those classes answers
/// [`shortest_as_long_as`](Envelope::shortest_as_long_as) in O(1).
pub struct Envelope {
  nodes: Vec<Node>,
  free: Vec<usize>,
  /// First list node; `None` when the envelope is empty.
  head: Option<usize>,
  /// Last list node.
  tail: Option<usize>,
  /// class -> node index.
  by_class: Vec<Option<usize>>,
  /// Bit per class.
  present: u64,
}

fn rank_class(rank: usize) -> usize {
  (rank + 1).trailing_zeros() as usize
}

impl Envelope {
  /// An empty envelope for ranks `0..rank_count`.
  pub fn new(rank_count: usize) -> Envelope {
    let classes = rank_count.next_power_of_two().trailing_zeros() as usize + 1;
    Envelope {
      nodes: Vec::new(),
      free: Vec::new(),
      head: None,
      tail: None,
      by_class: vec![None; classes + 1],
      present: 0,
    }
  }

  pub fn is_empty(&self) -> bool {
    self.head.is_none()
  }

  pub fn head(&self) -> Option<SegmentData> {
    self.head.map(|n| self.nodes[n].data)
  }

  pub fn last(&self) -> Option<usize> {
    self.tail
  }

  pub fn data(&self, node: usize) -> SegmentData {
    self.nodes[node].data
  }

  pub fn pred(&self, node: usize) -> Option<usize> {
    self.nodes[node].prev
  }

  /// The entry of least rank whose rank is at least `rank`, if any.
  pub fn shortest_as_long_as(&self, rank: usize) -> Option<usize> {
    let mask = !((1u64 << rank_class(rank)) - 1) & self.present;
    if mask == 0 {
      return None;
    }
    self.by_class[mask.trailing_zeros() as usize]
  }

  /// Insert right after `prev`, or at the head when `prev` is `None`. The
  /// caller keeps the list sorted by rank; at most one entry per rank
  /// class may exist.
  pub fn insert_after(&mut self, prev: Option<usize>, data: SegmentData) {
    let class = rank_class(data.rank);
    debug_assert!(self.present & (1 << class) == 0);

    let next = match prev {
      Some(p) => self.nodes[p].next,
      None => self.head,
    };
    let node = Node { data, prev, next };
    let index = match self.free.pop() {
      Some(slot) => {
        self.nodes[slot] = node;
        slot
      }
      None => {
        self.nodes.push(node);
        self.nodes.len() - 1
      }
    };

    match prev {
      Some(p) => self.nodes[p].next = Some(index),
      None => self.head = Some(index),
    }
    match next {
      Some(n) => self.nodes[n].prev = Some(index),
      None => self.tail = Some(index),
    }

    self.present |= 1 << class;
    self.by_class[class] = Some(index);
  }

  pub fn erase(&mut self, node: usize) {
    let Node { data, prev, next } = self.nodes[node];
    let class = rank_class(data.rank);
    debug_assert!(self.present & (1 << class) != 0);

    match prev {
      Some(p) => self.nodes[p].next = next,
      None => self.head = next,
    }
    match next {
      Some(n) => self.nodes[n].prev = prev,
      None => self.tail = prev,
    }

    self.present &= !(1 << class);
    self.by_class[class] = None;
    self.free.push(node);
  }

  pub fn erase_head(&mut self) {
    if let Some(h) = self.head {
      self.erase(h);
    }
  }
}
