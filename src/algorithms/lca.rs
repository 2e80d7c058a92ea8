/// Constant-time least-common-ancestor queries over the implicit binary
/// tree on 1..=N in which node `v` is the parent of `2v` and `2v+1`.
///
/// The envelope sweep uses this to collapse each segment's rank interval
/// to the single rank at which the segment can first surface.
pub struct LeastCommonAncestor {
  least_significant_one: Vec<usize>,
  most_significant_one: Vec<usize>,
  mask: Vec<usize>,
}

impl LeastCommonAncestor {
  /// Linear-time table construction for queries on 1..=`tree_size`.
  pub fn new(tree_size: usize) -> LeastCommonAncestor {
    let mut least_significant_one = vec![0; tree_size];
    let mut most_significant_one = vec![0; tree_size];
    let mut mask = Vec::new();

    let mut exponential: usize = 1;
    let mut power: usize = 0;
    while exponential <= tree_size {
      let next_exponential = exponential << 1;

      let mut i = exponential;
      while i <= tree_size && i < next_exponential {
        most_significant_one[i - 1] = power;
        i += 1;
      }

      let mut i = exponential;
      while i <= tree_size {
        least_significant_one[i - 1] = power;
        i += next_exponential;
      }

      mask.push(exponential - 1);

      exponential = next_exponential;
      power += 1;
    }
    mask.push(exponential - 1);

    LeastCommonAncestor {
      least_significant_one,
      most_significant_one,
      mask,
    }
  }

  /// The least common ancestor of `x` and `y`, requiring `x <= y`.
  pub fn compute(&self, x: usize, y: usize) -> usize {
    let x_lso = self.least_significant_one[x - 1];
    let y_lso = self.least_significant_one[y - 1];

    // Leftmost bit in which x and y differ.
    let most_significant_index = (x ^ y).min(self.most_significant_one.len());
    let diff_xy = self.most_significant_one[most_significant_index.saturating_sub(1)];

    let n_of_bits = diff_xy.max(x_lso).max(y_lso);

    let mut result = if n_of_bits == y_lso {
      !self.mask[n_of_bits + 1] & y
    } else {
      !self.mask[n_of_bits + 1] & x
    };
    result |= self.mask[n_of_bits + 1] & !self.mask[n_of_bits];

    debug_assert!(x <= result);
    debug_assert!(result <= y);

    result
  }
}
