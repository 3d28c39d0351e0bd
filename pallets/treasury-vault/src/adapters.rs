//! Valuation adapter for the asset ledger.
//!
//! Balances of different tokens are only comparable once expressed in a common unit.
//! The runtime supplies the conversion; the `()` implementation treats every unit of
//! every token as one unit of value.

use primitives::{Balance, TokenRef};

pub trait AssetValuation {
  /// Value of `amount` units of `token` in the portfolio's common unit.
  fn value_of(token: &TokenRef, amount: Balance) -> u128;

  /// Units of `token` worth `value`, rounded down.
  fn units_for(token: &TokenRef, value: u128) -> Balance;
}

impl AssetValuation for () {
  fn value_of(_token: &TokenRef, amount: Balance) -> u128 {
    amount
  }

  fn units_for(_token: &TokenRef, value: u128) -> Balance {
    value
  }
}
