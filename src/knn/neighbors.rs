use std::collections::BinaryHeap;

use crate::error::Result;
use crate::io::InnerId;
use crate::knn::NeighborScore;
use crate::similarity::{check_index, Mode, SimilarityProvider};

/// The `k` indices most similar to `subject` under `mode`, most similar first.
///
/// Equal similarities are ordered by ascending index. The subject itself is never
/// returned, and fewer than `k` neighbors are returned when fewer others exist.
pub fn neighbors<S: SimilarityProvider + ?Sized>(
    provider: &S,
    mode: Mode,
    subject: InnerId,
    k: usize,
) -> Result<Vec<NeighborScore>> {
    let candidates = provider.candidates(mode)?;
    check_index(&candidates, subject, mode)?;

    if k == 0 {
        return Ok(Vec::new());
    }

    // Bounded heap whose top is the weakest neighbor kept so far.
    let mut closest_neighbors: BinaryHeap<NeighborScore> =
        BinaryHeap::with_capacity(k.min(candidates.len()));
    for other in candidates.filter(|other| *other != subject) {
        let scored = NeighborScore::new(other, provider.similarity(subject, other, mode)?);
        if closest_neighbors.len() < k {
            closest_neighbors.push(scored);
        } else if let Some(mut bottom) = closest_neighbors.peek_mut() {
            if scored < *bottom {
                *bottom = scored;
            }
        }
    }

    Ok(closest_neighbors.into_sorted_vec())
}
