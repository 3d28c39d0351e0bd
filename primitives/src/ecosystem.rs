//! Ecosystem Constants for the Reactive Treasury Rebalancer
//!
//! This module centralizes the system-level constants shared by the monitoring ledger
//! (price monitor) and every destination ledger (treasury vault): pallet IDs and the
//! fixed-point / basis-point parameters both sides must agree on.

/// Balance type alias for consistency across ecosystem
pub type Balance = u128;

/// Pallet identifiers for deriving pallet-owned accounts.
///
/// The price monitor's derived account is the principal that destination ledgers
/// authorize as their reactive trigger.
pub mod pallet_ids {
  /// Price Monitor pallet ID (threshold detection and dispatch)
  pub const PRICE_MONITOR_PALLET_ID: &[u8; 8] = b"pricemon";
}

/// Ecosystem parameters shared by both ledgers.
pub mod params {
  /// Basis-point denominator (100%).
  pub const BPS_DENOMINATOR: u32 = 10_000;

  /// Largest admissible threshold or allocation, in basis points.
  pub const MAX_BPS: u32 = BPS_DENOMINATOR;

  /// Decimal places carried by every reported price.
  pub const PRICE_DECIMALS: u32 = 8;

  /// One whole unit of price in fixed-point representation (10^8).
  pub const PRICE_SCALE: i128 = 100_000_000;

  /// Default blocks between two successful rebalances (~5 minutes at 6s/block).
  ///
  /// Runtimes may override this through configuration and governance may change
  /// it afterwards; it must stay strictly positive.
  pub const DEFAULT_COOLDOWN_BLOCKS: u32 = 50;

  /// Default per-destination resource budget attached to dispatched commands.
  pub const DEFAULT_DISPATCH_RESOURCE_BUDGET: u64 = 500_000;
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn monitor_account_is_module_prefixed() {
    assert!(pallet_ids::PRICE_MONITOR_PALLET_ID.is_ascii());
  }

  #[test]
  fn price_scale_matches_decimals() {
    assert_eq!(params::PRICE_SCALE, 10i128.pow(params::PRICE_DECIMALS));
  }

  #[test]
  fn cooldown_default_is_positive() {
    assert!(params::DEFAULT_COOLDOWN_BLOCKS > 0);
  }
}
