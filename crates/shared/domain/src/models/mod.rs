//! Persisted entities of the forwarding workflow.

mod account;
mod address;
mod audit;
mod consolidation;
mod package;
mod payment;
mod rate;
mod settings;
mod shipment;

pub use account::*;
pub use address::*;
pub use audit::*;
pub use consolidation::*;
pub use package::*;
pub use payment::*;
pub use rate::*;
pub use settings::*;
pub use shipment::*;

use crate::constants::MONEY_SCALE;
use rust_decimal::{Decimal, RoundingStrategy};

/// Rounds an output amount to display precision (2 dp, midpoint away from zero).
#[must_use]
pub fn round_money(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(MONEY_SCALE, RoundingStrategy::MidpointAwayFromZero)
}
