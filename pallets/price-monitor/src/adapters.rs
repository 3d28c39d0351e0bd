//! Transport adapter for cross-ledger dispatch.
//!
//! The monitor never holds a handle to a treasury. It keeps `(scope, reference)`
//! pairs and hands each queued command to a runtime-supplied transport, which
//! resolves the pair to a destination and delivers the message.

use frame::prelude::*;
use primitives::{FeedId, Price, ScopeId};

/// Rebalance instruction delivered to one treasury.
#[derive(
  Clone, Copy, Debug, Decode, DecodeWithMemTracking, Encode, Eq, PartialEq, TypeInfo, MaxEncodedLen,
)]
pub struct RebalanceCommand {
  pub feed_id: FeedId,
  pub trigger_price: Price,
  pub change_bps: u32,
}

pub trait DispatchTransport<DestinationRef> {
  /// Deliver `command` to the treasury at `destination` on ledger `scope_id`.
  ///
  /// An error only reports that this delivery failed. It is never retried and
  /// never affects other deliveries.
  fn send(
    scope_id: ScopeId,
    destination: &DestinationRef,
    resource_budget: u64,
    command: &RebalanceCommand,
  ) -> Result<(), DispatchError>;
}

impl<DestinationRef> DispatchTransport<DestinationRef> for () {
  fn send(
    _scope_id: ScopeId,
    _destination: &DestinationRef,
    _resource_budget: u64,
    _command: &RebalanceCommand,
  ) -> Result<(), DispatchError> {
    Err(DispatchError::Other("transport not configured"))
  }
}
