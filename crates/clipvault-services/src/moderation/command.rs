//! Optimistic edit command.
//!
//! Moderation edits are shown immediately and confirmed against the record
//! store afterwards: capture the prior value, apply the optimistic one, then
//! either commit or put the prior value back when the persist step fails.

/// A single apply-await-revert edit over one slot.
#[must_use = "an optimistic edit must be committed or reverted"]
pub struct OptimisticEdit<T: Clone> {
    prior: T,
}

impl<T: Clone> OptimisticEdit<T> {
    /// Replace `slot` with `next`, remembering the prior value.
    pub fn apply(slot: &mut T, next: T) -> Self {
        OptimisticEdit {
            prior: std::mem::replace(slot, next),
        }
    }

    /// The persist step confirmed; the optimistic value stands.
    pub fn commit(self) {}

    /// The persist step failed; restore the prior value.
    pub fn revert(self, slot: &mut T) {
        *slot = self.prior;
    }

    pub fn prior(&self) -> &T {
        &self.prior
    }
}
