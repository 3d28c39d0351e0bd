//! Per-feed threshold detection.
//!
//! A feed without a reference price is in bootstrap: its first observation is
//! recorded and never reported as a breach. Every later observation is compared
//! with the previous one and is a breach when the move reaches the threshold.

use primitives::{Price, change_bps};

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Observation {
  /// First observation for the feed.
  Bootstrap,
  /// Move below the threshold.
  Within { change_bps: u32 },
  /// Move at or above the threshold.
  Breach {
    old_price: Price,
    new_price: Price,
    change_bps: u32,
  },
}

impl Observation {
  pub fn is_breach(&self) -> bool {
    matches!(self, Observation::Breach { .. })
  }
}

pub fn evaluate(last_price: Option<Price>, price: Price, threshold_bps: u32) -> Observation {
  let Some(old_price) = last_price else {
    return Observation::Bootstrap;
  };
  let change_bps = change_bps(old_price, price);
  if change_bps >= threshold_bps {
    Observation::Breach {
      old_price,
      new_price: price,
      change_bps,
    }
  } else {
    Observation::Within { change_bps }
  }
}
