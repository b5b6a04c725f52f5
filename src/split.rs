use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

use crate::utils::{validate_test_size, PipelineError};
use crate::Result;

/// Row indices assigned to each side of a train/test split
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SplitIndices {
    pub train: Vec<usize>,
    pub test: Vec<usize>,
}

/// Shuffle `0..n_samples` with a seeded generator and cut it into test and train parts
///
/// # Arguments
/// * `n_samples` - Number of rows to split
/// * `test_size` - Fraction of rows held out, strictly inside (0, 1)
/// * `seed` - Seed for the shuffle; equal inputs always give equal splits
///
/// # Returns
/// * `Ok(SplitIndices)` - `ceil(test_size * n)` test rows, the rest train rows
/// * `Err(PipelineError)` - If either side would end up empty
pub fn train_test_split(n_samples: usize, test_size: f64, seed: u64) -> Result<SplitIndices> {
    validate_test_size(test_size)?;

    let n_test = (test_size * n_samples as f64).ceil() as usize;
    let n_train = n_samples.saturating_sub(n_test);

    if n_test == 0 || n_train == 0 {
        return Err(PipelineError::ValidationError(format!(
            "with n_samples={} and test_size={}, the resulting train set would be empty",
            n_samples, test_size
        )));
    }

    let mut permutation: Vec<usize> = (0..n_samples).collect();
    let mut rng = StdRng::seed_from_u64(seed);
    permutation.shuffle(&mut rng);

    let train = permutation.split_off(n_test);
    Ok(SplitIndices {
        train,
        test: permutation,
    })
}
