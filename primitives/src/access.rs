//! Role-based access policy shared by the monitor and treasury ledgers.
//!
//! Every permission decision goes through [`AccessPolicy::require`], which looks up the
//! role an [`Operation`] needs in a single table ([`Operation::required_role`]). Callers
//! hold a [`RoleSet`]; anything not explicitly granted is denied.

use codec::{Decode, DecodeWithMemTracking, Encode, MaxEncodedLen};
use scale_info::TypeInfo;
use serde::{Deserialize, Serialize};

#[derive(
  Clone,
  Copy,
  Debug,
  Decode,
  DecodeWithMemTracking,
  Encode,
  Eq,
  MaxEncodedLen,
  Ord,
  PartialEq,
  PartialOrd,
  TypeInfo,
  Serialize,
  Deserialize,
)]
pub enum Role {
  /// Monitor-side registration authority
  Owner,
  /// Asset and allocation management, unpause, role grants
  Governance,
  /// May only execute rebalances
  ReactiveTrigger,
  /// May only pause
  Emergency,
}

impl Role {
  pub const ALL: [Role; 4] = [
    Role::Owner,
    Role::Governance,
    Role::ReactiveTrigger,
    Role::Emergency,
  ];

  const fn bit(self) -> u8 {
    match self {
      Role::Owner => 0b0001,
      Role::Governance => 0b0010,
      Role::ReactiveTrigger => 0b0100,
      Role::Emergency => 0b1000,
    }
  }
}

/// Set of roles held by one principal, stored as a bitmask.
#[derive(
  Clone,
  Copy,
  Debug,
  Decode,
  DecodeWithMemTracking,
  Default,
  Encode,
  Eq,
  MaxEncodedLen,
  PartialEq,
  TypeInfo,
)]
pub struct RoleSet(u8);

impl RoleSet {
  pub const fn empty() -> Self {
    RoleSet(0)
  }

  pub const fn of(role: Role) -> Self {
    RoleSet(role.bit())
  }

  pub fn contains(&self, role: Role) -> bool {
    self.0 & role.bit() != 0
  }

  /// Adds `role`, returning `false` if it was already present.
  pub fn insert(&mut self, role: Role) -> bool {
    let had = self.contains(role);
    self.0 |= role.bit();
    !had
  }

  /// Removes `role`, returning `false` if it was not present.
  pub fn remove(&mut self, role: Role) -> bool {
    let had = self.contains(role);
    self.0 &= !role.bit();
    had
  }

  pub fn is_empty(&self) -> bool {
    self.0 == 0
  }

  pub fn with(mut self, role: Role) -> Self {
    self.insert(role);
    self
  }
}

impl FromIterator<Role> for RoleSet {
  fn from_iter<I: IntoIterator<Item = Role>>(iter: I) -> Self {
    iter.into_iter().fold(RoleSet::empty(), RoleSet::with)
  }
}

/// Every permission-checked operation across both ledgers.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Operation {
  RegisterFeed,
  RegisterTreasury,
  SetTreasuryActive,
  TransferOwnership,
  AddAsset,
  UpdateAllocation,
  SetCooldownPeriod,
  GrantRole,
  RevokeRole,
  GrantReactiveTrigger,
  Unpause,
  Pause,
  ExecuteRebalance,
}

impl Operation {
  /// The authorization matrix.
  pub const fn required_role(self) -> Role {
    match self {
      Operation::RegisterFeed
      | Operation::RegisterTreasury
      | Operation::SetTreasuryActive
      | Operation::TransferOwnership => Role::Owner,
      Operation::AddAsset
      | Operation::UpdateAllocation
      | Operation::SetCooldownPeriod
      | Operation::GrantRole
      | Operation::RevokeRole
      | Operation::GrantReactiveTrigger
      | Operation::Unpause => Role::Governance,
      Operation::Pause => Role::Emergency,
      Operation::ExecuteRebalance => Role::ReactiveTrigger,
    }
  }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct AccessDenied {
  pub operation: Operation,
  pub required: Role,
}

pub struct AccessPolicy;

impl AccessPolicy {
  pub fn require(held: RoleSet, operation: Operation) -> Result<(), AccessDenied> {
    let required = operation.required_role();
    if held.contains(required) {
      Ok(())
    } else {
      Err(AccessDenied {
        operation,
        required,
      })
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  const ALL_OPS: [Operation; 13] = [
    Operation::RegisterFeed,
    Operation::RegisterTreasury,
    Operation::SetTreasuryActive,
    Operation::TransferOwnership,
    Operation::AddAsset,
    Operation::UpdateAllocation,
    Operation::SetCooldownPeriod,
    Operation::GrantRole,
    Operation::RevokeRole,
    Operation::GrantReactiveTrigger,
    Operation::Unpause,
    Operation::Pause,
    Operation::ExecuteRebalance,
  ];

  #[test]
  fn empty_set_is_denied_everything() {
    for op in ALL_OPS {
      assert!(AccessPolicy::require(RoleSet::empty(), op).is_err());
    }
  }

  #[test]
  fn each_role_unlocks_only_its_operations() {
    for role in Role::ALL {
      let held = RoleSet::of(role);
      for op in ALL_OPS {
        assert_eq!(
          AccessPolicy::require(held, op).is_ok(),
          op.required_role() == role,
          "{role:?} vs {op:?}"
        );
      }
    }
  }

  #[test]
  fn governance_cannot_pause_and_emergency_cannot_unpause() {
    let governance = RoleSet::of(Role::Governance);
    let emergency = RoleSet::of(Role::Emergency);
    assert_eq!(
      AccessPolicy::require(governance, Operation::Pause),
      Err(AccessDenied {
        operation: Operation::Pause,
        required: Role::Emergency
      })
    );
    assert!(AccessPolicy::require(emergency, Operation::Unpause).is_err());
  }

  #[test]
  fn role_set_insert_and_remove() {
    let mut set = RoleSet::empty();
    assert!(set.insert(Role::Governance));
    assert!(!set.insert(Role::Governance));
    assert!(set.insert(Role::Emergency));
    assert!(set.contains(Role::Governance) && set.contains(Role::Emergency));
    assert!(!set.contains(Role::Owner));
    assert!(set.remove(Role::Governance));
    assert!(!set.remove(Role::Governance));
    assert_eq!(set, RoleSet::of(Role::Emergency));
  }

  #[test]
  fn role_set_collects_from_iterator() {
    let set: RoleSet = [Role::Owner, Role::ReactiveTrigger].into_iter().collect();
    assert!(set.contains(Role::Owner));
    assert!(set.contains(Role::ReactiveTrigger));
    assert!(!set.contains(Role::Governance));
  }
}
