//! Bonus stacking shared by every effective-stat computation.
//!
//! Application order: `Flat → %Inc → More → Less → Clamp`.

/// A single modifier applied to a stat value.
///
/// - **Flat**: additive, applied first (e.g. +1 Combat from a stim)
/// - **Increased**: percentage increases, summed then multiplied
/// - **More**: multiplier, stored as percentage (50 = ×1.5)
/// - **Less**: reduction, stored as percentage (10 = ×0.9)
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Bonus {
    Flat(i32),
    Increased(i32),
    More(i32),
    Less(i32),
}

impl Bonus {
    pub fn flat(value: i32) -> Self {
        Bonus::Flat(value)
    }

    pub fn increased(percent: i32) -> Self {
        Bonus::Increased(percent)
    }

    pub fn more(percent: i32) -> Self {
        Bonus::More(percent)
    }

    pub fn less(percent: i32) -> Self {
        Bonus::Less(percent)
    }
}

/// A collection of bonuses applied in a fixed order.
///
/// The result does not depend on insertion order: flat and increased values
/// are summed, and multipliers are applied in sorted order.
///
/// # Example
/// ```
/// # use battle_core::stats::{Bonus, BonusStack};
/// let mut stack = BonusStack::new();
/// stack.add(Bonus::flat(2));
/// stack.add(Bonus::more(50));
///
/// // (4 + 2) × 1.5 = 9
/// assert_eq!(stack.apply(4, 0, 10), 9);
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BonusStack {
    bonuses: Vec<Bonus>,
}

impl BonusStack {
    pub fn new() -> Self {
        Self {
            bonuses: Vec::new(),
        }
    }

    pub fn add(&mut self, bonus: Bonus) {
        self.bonuses.push(bonus);
    }

    pub fn extend(&mut self, bonuses: impl IntoIterator<Item = Bonus>) {
        self.bonuses.extend(bonuses);
    }

    /// Applies all bonuses to `base` and clamps the result to `[min, max]`.
    pub fn apply(&self, base: i32, min: i32, max: i32) -> i32 {
        let flat_sum: i32 = self
            .bonuses
            .iter()
            .filter_map(|b| match b {
                Bonus::Flat(v) => Some(*v),
                _ => None,
            })
            .sum();

        let inc_sum: i32 = self
            .bonuses
            .iter()
            .filter_map(|b| match b {
                Bonus::Increased(p) => Some(*p),
                _ => None,
            })
            .sum();

        let after_inc = if inc_sum == 0 {
            base + flat_sum
        } else {
            ((base + flat_sum) * (100 + inc_sum)) / 100
        };

        let mut more: Vec<i32> = self
            .bonuses
            .iter()
            .filter_map(|b| match b {
                Bonus::More(p) => Some(*p),
                _ => None,
            })
            .collect();
        more.sort_unstable();
        let after_more = more
            .into_iter()
            .fold(after_inc, |acc, percent| (acc * (100 + percent)) / 100);

        let mut less: Vec<i32> = self
            .bonuses
            .iter()
            .filter_map(|b| match b {
                Bonus::Less(p) => Some(*p),
                _ => None,
            })
            .collect();
        less.sort_unstable();
        let after_less = less
            .into_iter()
            .fold(after_more, |acc, percent| (acc * (100 - percent)) / 100);

        after_less.clamp(min, max)
    }

    pub fn is_empty(&self) -> bool {
        self.bonuses.is_empty()
    }

    pub fn len(&self) -> usize {
        self.bonuses.len()
    }
}
