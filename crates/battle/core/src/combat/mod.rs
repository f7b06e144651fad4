//! Dice resolution for shooting and brawling.
//!
//! The functions here assume the request has been validated; they roll,
//! mutate the participants involved and append log entries.
mod brawl;
mod damage;
mod hit;

pub use brawl::{BrawlResult, BrawlRoll, best_brawl_weapon, brawl_roll, resolve_brawl};
pub use damage::{HitOutcome, armor_save, resolve_damage};
pub use hit::{ShotRoll, hit_target_number, roll_to_hit};
