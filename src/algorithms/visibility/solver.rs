use log::{trace, warn};
use std::collections::HashSet;
use std::f64::consts::FRAC_PI_2;

use crate::algorithms::lca::LeastCommonAncestor;
use crate::data::Point;
use crate::intersection::point_to_segment_distance;
use crate::{Error, EPS};

use super::envelope::{Envelope, SegmentData};

/// Tolerance for the ray-to-segment distance probes. Looser than `EPS`:
/// the probed rays pass exactly through segment endpoints and accumulate
/// rounding from the angle bookkeeping.
const DISTANCE_EPSILON: f64 = 2e-3;

/// Ranks of a segment's two endpoints, sorted.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SegmentRank {
  pub min: usize,
  pub max: usize,
}

/// What one pivot knows about one point after the sweep.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointVisibility {
  pub visible: bool,
  pub occluder: Option<usize>,
}

/// For each angular slot, the segment the pivot sees there.
type VisibleSegments = Vec<Option<usize>>;

/// Distance from the pivot to a segment along the ray of the given sweep
/// angle (sweep angles are measured from the +y axis).
fn distance(
  origin: usize,
  target: usize,
  angle: f64,
  points: &[Point<2>],
  segments: &[(usize, usize)],
) -> Result<f64, Error> {
  let (a, b) = segments[target];
  point_to_segment_distance(
    &points[origin],
    &points[a],
    &points[b],
    angle + FRAC_PI_2,
    DISTANCE_EPSILON,
  )
}

/// Which of two segments is nearer to the pivot over the ranks where both
/// are under the sweep. Ties across a longer overlap are retested at its
/// far end; a tie that survives resolves to the first segment, so the
/// outcome is deterministic.
fn nearest_segment(
  origin: usize,
  segment1: usize,
  segment2: usize,
  points: &[Point<2>],
  segments: &[(usize, usize)],
  angles: &[f64],
  segment_ranks: &[SegmentRank],
) -> Result<usize, Error> {
  if segment1 == segment2 {
    return Ok(segment1);
  }

  let rank1 = segment_ranks[segment1];
  let rank2 = segment_ranks[segment2];
  let min_rank = rank1.min.max(rank2.min);
  let max_rank = rank1.max.min(rank2.max);
  if min_rank > max_rank {
    return Err(Error::GeometryDegenerate(format!(
      "segments {} and {} share no sweep ranks",
      segment1, segment2
    )));
  }

  let dist1 = distance(origin, segment1, angles[min_rank], points, segments)?;
  let dist2 = distance(origin, segment2, angles[min_rank], points, segments)?;
  if dist1 + EPS < dist2 {
    return Ok(segment1);
  }
  if dist1 > dist2 + EPS {
    return Ok(segment2);
  }

  if min_rank == max_rank {
    // The segments only share a point; even a residual difference picks
    // the nearer one.
    if dist1 < dist2 {
      return Ok(segment1);
    }
    return Ok(segment2);
  }

  // Connected by a point and overlapping further: the far end of the
  // overlap separates them.
  let dist1 = distance(origin, segment1, angles[max_rank], points, segments)?;
  let dist2 = distance(origin, segment2, angles[max_rank], points, segments)?;
  if dist1 + EPS < dist2 {
    return Ok(segment1);
  }
  if dist1 > dist2 + EPS {
    return Ok(segment2);
  }
  warn!(
    "segments {} and {} are equidistant over their overlap; keeping {}",
    segment1, segment2, segment1
  );
  Ok(segment1)
}

/// `nearest_segment` lifted over absent candidates.
fn nearest_segment_option(
  origin: usize,
  segment1: Option<usize>,
  segment2: Option<usize>,
  points: &[Point<2>],
  segments: &[(usize, usize)],
  angles: &[f64],
  segment_ranks: &[SegmentRank],
) -> Result<Option<usize>, Error> {
  match (segment1, segment2) {
    (None, other) => Ok(other),
    (other, None) => Ok(other),
    (Some(s1), Some(s2)) => Ok(Some(nearest_segment(
      origin,
      s1,
      s2,
      points,
      segments,
      angles,
      segment_ranks,
    )?)),
  }
}

/// For every rank, the segments that enter or leave the sweep there.
/// Segments incident to the pivot never occlude anything and stay out.
fn rank_to_segments(
  segments: &[(usize, usize)],
  origin: usize,
  segment_ranks: &[SegmentRank],
  rank_count: usize,
) -> Vec<Vec<usize>> {
  let mut result = vec![Vec::new(); rank_count];
  for (i, &(a, b)) in segments.iter().enumerate() {
    if a != origin && b != origin {
      result[segment_ranks[i].min].push(i);
      result[segment_ranks[i].max].push(i);
    }
  }
  result
}

/// One directional sweep over all ranks. `segment_ranks` must already be
/// collapsed so every segment surfaces at a unique rank class, and
/// `actual_rank` maps sweep positions back to stored ranks.
fn generate_envelope(
  points: &[Point<2>],
  segments: &[(usize, usize)],
  angles: &[f64],
  origin: usize,
  rank_segments: &[Vec<usize>],
  segment_ranks: &[SegmentRank],
  actual_rank: &[usize],
) -> Result<VisibleSegments, Error> {
  let mut visible_segments: VisibleSegments = vec![None; angles.len() - 1];
  let mut env = Envelope::new(angles.len());

  for cur_k in 0..angles.len() {
    // The envelope head was the visible segment in the slot just passed.
    if cur_k > 0 {
      if let Some(head) = env.head() {
        visible_segments[cur_k - 1] = Some(head.segment);
      }
    }

    for &current_segment in &rank_segments[cur_k] {
      let sr = segment_ranks[current_segment];
      // Zero-length sweeps never occlude.
      if sr.min >= sr.max {
        continue;
      }

      if cur_k == sr.min {
        let new = SegmentData {
          segment: current_segment,
          rank: actual_rank[sr.max],
        };
        let longer = env.shortest_as_long_as(new.rank);

        let mut nearest = new.segment;
        if let Some(l) = longer {
          nearest = nearest_segment(
            origin,
            new.segment,
            env.data(l).segment,
            points,
            segments,
            angles,
            segment_ranks,
          )?;
        }

        // Only a segment nearer than everything at least as long enters
        // the envelope.
        if nearest == new.segment {
          let prev = match longer {
            Some(l) => env.pred(l),
            None => env.last(),
          };
          if let Some(l) = longer {
            if new.rank == env.data(l).rank {
              env.erase(l);
            }
          }
          env.insert_after(prev, new);

          // Shorter entries now hidden behind the new segment go away.
          if let Some(mut p) = prev {
            let mut nearest = nearest_segment(
              origin,
              new.segment,
              env.data(p).segment,
              points,
              segments,
              angles,
              segment_ranks,
            )?;
            while nearest == new.segment {
              let aux = env.pred(p);
              env.erase(p);
              match aux {
                Some(a) => {
                  p = a;
                  nearest = nearest_segment(
                    origin,
                    new.segment,
                    env.data(a).segment,
                    points,
                    segments,
                    angles,
                    segment_ranks,
                  )?;
                }
                None => break,
              }
            }
          }
        }
      } else {
        // The segment's sweep ends here; if it survived this long it sits
        // at the head.
        if env.head().map(|h| h.segment) == Some(current_segment) {
          env.erase_head();
        }
      }
    }
  }

  Ok(visible_segments)
}

fn generate_left_envelope(
  points: &[Point<2>],
  segments: &[(usize, usize)],
  angles: &[f64],
  origin: usize,
  segment_ranks: &[SegmentRank],
  lca: &LeastCommonAncestor,
) -> Result<VisibleSegments, Error> {
  let actual_rank: Vec<usize> = (0..angles.len()).collect();
  let left_ranks: Vec<SegmentRank> = segment_ranks
    .iter()
    .map(|sr| SegmentRank {
      min: sr.min,
      max: lca.compute(sr.min + 1, sr.max + 1) - 1,
    })
    .collect();
  let rank_segments = rank_to_segments(segments, origin, &left_ranks, angles.len());
  generate_envelope(
    points,
    segments,
    angles,
    origin,
    &rank_segments,
    &left_ranks,
    &actual_rank,
  )
}

fn generate_right_envelope(
  points: &[Point<2>],
  segments: &[(usize, usize)],
  angles: &[f64],
  origin: usize,
  segment_ranks: &[SegmentRank],
  lca: &LeastCommonAncestor,
) -> Result<VisibleSegments, Error> {
  let max_rank = angles.len() - 1;
  let reversed_angles: Vec<f64> = angles.iter().rev().copied().collect();
  let actual_rank: Vec<usize> = (0..angles.len()).map(|i| max_rank - i).collect();
  let right_ranks: Vec<SegmentRank> = segment_ranks
    .iter()
    .map(|sr| SegmentRank {
      min: max_rank - sr.max,
      max: max_rank - (lca.compute(sr.min + 1, sr.max + 1) - 1),
    })
    .collect();
  let rank_segments = rank_to_segments(segments, origin, &right_ranks, angles.len());
  let mut visible_segments = generate_envelope(
    points,
    segments,
    &reversed_angles,
    origin,
    &rank_segments,
    &right_ranks,
    &actual_rank,
  )?;
  visible_segments.reverse();
  Ok(visible_segments)
}

fn merge_visible_segments(
  points: &[Point<2>],
  segments: &[(usize, usize)],
  angles: &[f64],
  origin: usize,
  left: &VisibleSegments,
  right: &VisibleSegments,
  segment_ranks: &[SegmentRank],
) -> Result<VisibleSegments, Error> {
  let mut merged = Vec::with_capacity(left.len());
  for i in 0..left.len() {
    merged.push(nearest_segment_option(
      origin,
      left[i],
      right[i],
      points,
      segments,
      angles,
      segment_ranks,
    )?);
  }
  Ok(merged)
}

/// Fill per-point visibility from the per-slot visible segments: a point
/// is visible when it is nearer than the segment covering its rank, or
/// when it is an endpoint of that segment; otherwise the covering segment
/// is its occluder.
fn compute_visible_points(
  points: &[Point<2>],
  segments: &[(usize, usize)],
  origin: usize,
  sorted_points: &[usize],
  ranks: &[usize],
  angles: &[f64],
  visible_segments: &VisibleSegments,
) -> Result<Vec<PointVisibility>, Error> {
  let mut visible = vec![
    PointVisibility {
      visible: false,
      occluder: None,
    };
    points.len()
  ];
  visible[origin].visible = true;

  let origin_point = &points[origin];
  let mut i = 0;
  for rank in 0..angles.len() - 1 {
    // The nearest segment at this rank comes from the slot on either side.
    let mut segment_distance = f64::MAX;
    let mut segment: Option<usize> = None;

    let slots = visible_segments.len();
    let prev_segment = visible_segments[(rank + slots - 1) % slots];
    if let Some(ps) = prev_segment {
      segment_distance = distance(origin, ps, angles[rank], points, segments)?;
      segment = Some(ps);
    }
    let next_segment = visible_segments[rank];
    if let Some(ns) = next_segment {
      if prev_segment != Some(ns) {
        let next_distance = distance(origin, ns, angles[rank], points, segments)?;
        if next_distance < segment_distance {
          segment_distance = next_distance;
          segment = Some(ns);
        }
      }
    }

    if i < ranks.len() && ranks[i] == rank {
      // Points with equal coordinates share a rank, so the nearest point
      // of the rank need not be unique.
      let mut nearest_points: HashSet<usize> = HashSet::new();
      let first_point = sorted_points[i];
      nearest_points.insert(first_point);
      let mut nearest_point_distance = origin_point.distance_to(&points[first_point]);
      if nearest_point_distance >= segment_distance {
        visible[first_point].occluder = segment;
      }
      i += 1;

      while i < ranks.len() && ranks[i] == rank {
        let current_point = sorted_points[i];
        let current_point_distance = origin_point.distance_to(&points[current_point]);
        if nearest_point_distance > current_point_distance {
          nearest_points.clear();
          nearest_points.insert(current_point);
          nearest_point_distance = current_point_distance;
        } else if nearest_point_distance == current_point_distance {
          nearest_points.insert(current_point);
        }
        if current_point_distance >= segment_distance {
          visible[current_point].occluder = segment;
        }
        i += 1;
      }

      let endpoint_of_cover = segment.is_some_and(|s| {
        nearest_points.contains(&segments[s].0) || nearest_points.contains(&segments[s].1)
      });
      if nearest_point_distance < segment_distance || endpoint_of_cover {
        for nearest in nearest_points {
          visible[nearest].visible = true;
        }
      }
    }
  }

  Ok(visible)
}

/// The per-pivot visibility problem: given the angular slots and rank
/// bookkeeping prepared by the slice builder, sweep the envelope left and
/// right, merge, and read off per-point visibility.
pub fn solve_visibility(
  points: &[Point<2>],
  segments: &[(usize, usize)],
  angles: &[f64],
  origin: usize,
  sorted_points: &[usize],
  ranks: &[usize],
  segment_ranks: &[SegmentRank],
) -> Result<Vec<PointVisibility>, Error> {
  let lca = LeastCommonAncestor::new(angles.len());

  let left = generate_left_envelope(points, segments, angles, origin, segment_ranks, &lca)?;
  let right = generate_right_envelope(points, segments, angles, origin, segment_ranks, &lca)?;
  let merged = merge_visible_segments(points, segments, angles, origin, &left, &right, segment_ranks)?;
  trace!("pivot {}: visible segments {:?}", origin, merged);

  compute_visible_points(
    points,
    segments,
    origin,
    sorted_points,
    ranks,
    angles,
    &merged,
  )
}
