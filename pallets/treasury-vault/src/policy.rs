//! Rebalance policies.
//!
//! A policy sees the ledger as a list of valued holdings and proposes value
//! transfers between assets. The engine converts the transfers into token units,
//! applies them and rejects the whole plan unless every asset ends at least as close
//! to its target allocation as it started ([`converges`]).

use alloc::vec::Vec;
use primitives::{AssetId, params::BPS_DENOMINATOR};
use sp_arithmetic::{Rounding, helpers_128bit::multiply_by_rational_with_rounding};

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Holding {
  pub asset_id: AssetId,
  /// Balance valued in the portfolio's common unit
  pub value: u128,
  /// Value that must stay in the asset (its minimum funding amount)
  pub floor: u128,
  pub target_bps: u32,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Adjustment {
  pub from: AssetId,
  pub to: AssetId,
  /// Value moved, in the portfolio's common unit
  pub value: u128,
}

pub trait RebalancePolicy {
  fn plan(holdings: &[Holding]) -> Vec<Adjustment>;
}

/// Leaves the ledger untouched.
impl RebalancePolicy for () {
  fn plan(_holdings: &[Holding]) -> Vec<Adjustment> {
    Vec::new()
  }
}

/// Repeatedly moves value from the most overweight asset to the most underweight
/// one. Each step moves at most the donor's excess above target (and above its
/// floor) and at most the recipient's deficit, so no asset ever crosses its target.
pub struct GreedyConvergence;

impl RebalancePolicy for GreedyConvergence {
  fn plan(holdings: &[Holding]) -> Vec<Adjustment> {
    let total = total_value(holdings);
    if total == 0 {
      return Vec::new();
    }
    let targets: Vec<u128> = holdings
      .iter()
      .map(|h| share_of(total, h.target_bps))
      .collect();
    let mut values: Vec<u128> = holdings.iter().map(|h| h.value).collect();
    let mut plan = Vec::new();

    for _ in 0..holdings.len() {
      let donor = (0..holdings.len())
        .map(|i| {
          let excess = values[i].saturating_sub(targets[i]);
          let spendable = values[i].saturating_sub(holdings[i].floor);
          (i, excess.min(spendable))
        })
        .filter(|(_, available)| *available > 0)
        .max_by_key(|(_, available)| *available);
      let recipient = (0..holdings.len())
        .map(|i| (i, targets[i].saturating_sub(values[i])))
        .filter(|(_, deficit)| *deficit > 0)
        .max_by_key(|(_, deficit)| *deficit);

      let (Some((from, available)), Some((to, deficit))) = (donor, recipient) else {
        break;
      };
      let value = available.min(deficit);
      values[from] -= value;
      values[to] += value;
      plan.push(Adjustment {
        from: holdings[from].asset_id,
        to: holdings[to].asset_id,
        value,
      });
    }
    plan
  }
}

pub fn total_value(holdings: &[Holding]) -> u128 {
  holdings
    .iter()
    .fold(0u128, |acc, h| acc.saturating_add(h.value))
}

fn share_of(total: u128, bps: u32) -> u128 {
  multiply_by_rational_with_rounding(
    total,
    bps as u128,
    BPS_DENOMINATOR as u128,
    Rounding::Down,
  )
  .unwrap_or(total)
}

/// `value * 10_000 / total`, rounded down; 0 for an empty portfolio.
pub fn allocation_bps(value: u128, total: u128) -> u32 {
  if total == 0 {
    return 0;
  }
  multiply_by_rational_with_rounding(
    value,
    BPS_DENOMINATOR as u128,
    total,
    Rounding::Down,
  )
  .map(|bps| u32::try_from(bps).unwrap_or(u32::MAX))
  .unwrap_or(u32::MAX)
}

/// Every asset's distance to target is no larger after than before.
///
/// Both snapshots are weighted against the total before the rebalance, so value
/// lost to unit rounding does not move the allocation of assets the plan left alone.
/// `before` and `after` must list the same assets in the same order.
pub fn converges(before: &[Holding], after: &[Holding]) -> bool {
  if before.len() != after.len() {
    return false;
  }
  let total = total_value(before);
  before.iter().zip(after).all(|(b, a)| {
    b.asset_id == a.asset_id && {
      let distance_before = allocation_bps(b.value, total).abs_diff(b.target_bps);
      let distance_after = allocation_bps(a.value, total).abs_diff(a.target_bps);
      distance_after <= distance_before
    }
  })
}
