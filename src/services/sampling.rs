use rand::{seq::SliceRandom, Rng};

/// Draws a uniform random sample of `amount` items from the best-ranked part of `ranked`
///
/// `ranked` must already be sorted best-first. Only the first `pool_size` items
/// are eligible; the sample is taken without replacement and its order is random.
pub fn sample_from_pool<T, R>(
    mut ranked: Vec<T>,
    pool_size: usize,
    amount: usize,
    rng: &mut R,
) -> Vec<T>
where
    R: Rng + ?Sized,
{
    ranked.truncate(pool_size);
    ranked.shuffle(rng);
    ranked.truncate(amount);
    ranked
}
