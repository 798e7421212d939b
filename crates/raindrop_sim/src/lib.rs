//! Raindrop simulation for raindrop_fx
//!
//! Drops appear on the glass, sit still while small, and slide down once
//! they are heavy enough. Overlapping drops merge. Drops that leave the
//! viewport or wear down to nothing are removed.

pub mod raindrop;
pub mod simulator;

pub use raindrop::{DropKey, Raindrop};
pub use simulator::RaindropSimulator;
