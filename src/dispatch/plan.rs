use rand::Rng;
use rand::seq::SliceRandom;
use std::num::NonZeroUsize;
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchPlan<M> {
    pub index: usize,
    /// Delay from dispatch start; batch `k` fires at `k * cooldown`.
    pub offset: Duration,
    pub members: Vec<M>,
}

/// Shuffles `members` and cuts them into evenly spaced batches of at most
/// `batch_size`. The shuffle is redone on every call.
pub fn plan_batches<M, R>(
    mut members: Vec<M>,
    batch_size: NonZeroUsize,
    cooldown: Duration,
    rng: &mut R,
) -> Vec<BatchPlan<M>>
where
    R: Rng + ?Sized,
{
    members.shuffle(rng);

    let mut batches = Vec::with_capacity(members.len().div_ceil(batch_size.get()));
    let mut members = members.into_iter().peekable();
    let mut index = 0usize;
    while members.peek().is_some() {
        let batch: Vec<M> = members.by_ref().take(batch_size.get()).collect();
        let factor = u32::try_from(index).unwrap_or(u32::MAX);
        batches.push(BatchPlan {
            index,
            offset: cooldown.saturating_mul(factor),
            members: batch,
        });
        index += 1;
    }
    batches
}
