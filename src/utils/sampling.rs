//! Uniform row sub-sampling used to shrink background and foreground
//! matrices before expensive explanation computations.

use rand::prelude::*;
use rand::rngs::StdRng;
use rand::SeedableRng;

/// Draw `count` distinct indices uniformly at random from `0..total`,
/// returned in ascending order so sampled rows keep their time ordering.
///
/// When `count >= total` every index is returned. A seed makes the draw
/// reproducible; without one, entropy from the OS is used.
pub fn sample_indices(total: usize, count: usize, seed: Option<u64>) -> Vec<usize> {
    if count >= total {
        return (0..total).collect();
    }
    let mut rng: StdRng = match seed {
        Some(s) => StdRng::seed_from_u64(s),
        None => StdRng::from_entropy(),
    };
    let mut indices: Vec<usize> = (0..total).collect();
    indices.shuffle(&mut rng);
    indices.truncate(count);
    indices.sort_unstable();
    indices
}
