//! Partitioning normalized assets into album-sized batches.

use crate::types::{Batch, NormalizedAsset};

/// Split `assets` into ordered batches of `album_size`, the last holding
/// the remainder.
///
/// Order within and across batches is discovery order; nothing is merged
/// or reordered.
pub fn into_batches(assets: Vec<NormalizedAsset>, album_size: usize) -> Vec<Batch> {
    debug_assert!(album_size >= 1);

    let mut batches = Vec::with_capacity(assets.len().div_ceil(album_size.max(1)));
    let mut chunk: Vec<NormalizedAsset> = Vec::with_capacity(album_size);

    for asset in assets {
        chunk.push(asset);
        if chunk.len() == album_size {
            batches.push(Batch {
                index: batches.len(),
                assets: std::mem::replace(&mut chunk, Vec::with_capacity(album_size)),
            });
        }
    }
    if !chunk.is_empty() {
        batches.push(Batch {
            index: batches.len(),
            assets: chunk,
        });
    }

    batches
}
