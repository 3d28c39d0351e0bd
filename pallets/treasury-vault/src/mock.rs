use crate as pallet_treasury_vault;
use crate::{Adjustment, AssetValuation, GreedyConvergence, Holding, RebalancePolicy};
use frame::prelude::*;
use polkadot_sdk::{
  frame_support::{
    construct_runtime,
    traits::{ConstU32, ConstU64},
  },
  sp_runtime::{
    BuildStorage,
    traits::{BlakeTwo256, IdentityLookup},
  },
};
use primitives::{AssetId, Balance, Role, TokenRef};

use alloc::{collections::BTreeMap, vec, vec::Vec};
use core::cell::RefCell;

type Block = polkadot_sdk::frame_system::mocking::MockBlock<Test>;
pub type AccountId = u64;

pub const GOVERNOR: AccountId = 1;
pub const GUARDIAN: AccountId = 2;
pub const REACTIVE: AccountId = 3;
pub const OUTSIDER: AccountId = 4;

pub const ETH: AssetId = 1;
pub const USDC: AssetId = 2;
pub const USDC_TOKEN: TokenRef = TokenRef::Fungible(2);
pub const DAI: AssetId = 3;
pub const DAI_TOKEN: TokenRef = TokenRef::Fungible(3);

/// Six-decimal units
pub const UNIT: Balance = 1_000_000;
pub const ETH_USD: u128 = 1_800;
pub const COOLDOWN: u64 = 10;

construct_runtime!(
  pub enum Test {
    System: polkadot_sdk::frame_system,
    TreasuryVault: pallet_treasury_vault,
  }
);

impl polkadot_sdk::frame_system::Config for Test {
  type BaseCallFilter = polkadot_sdk::frame_support::traits::Everything;
  type BlockWeights = ();
  type BlockLength = ();
  type DbWeight = ();
  type RuntimeOrigin = RuntimeOrigin;
  type RuntimeCall = RuntimeCall;
  type Nonce = u64;
  type Hash = polkadot_sdk::sp_core::H256;
  type Hashing = BlakeTwo256;
  type AccountId = AccountId;
  type Lookup = IdentityLookup<Self::AccountId>;
  type Block = Block;
  type RuntimeEvent = RuntimeEvent;
  type BlockHashCount = ConstU64<250>;
  type Version = ();
  type PalletInfo = PalletInfo;
  type AccountData = ();
  type OnNewAccount = ();
  type OnKilledAccount = ();
  type SystemWeightInfo = ();
  type SS58Prefix = ();
  type OnSetCode = ();
  type MaxConsumers = ConstU32<16>;
  type RuntimeTask = ();
  type ExtensionsWeightInfo = ();
  type SingleBlockMigrations = ();
  type MultiBlockMigrator = ();
  type PreInherents = ();
  type PostInherents = ();
  type PostTransactions = ();
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum PolicyMode {
  Greedy,
  /// Debits more than the donor holds
  Overdraw,
  /// Pushes the first asset's whole value into the second
  Diverge,
  /// Names an asset the ledger does not know
  UnknownAsset,
}

thread_local! {
  static PRICES: RefCell<BTreeMap<TokenRef, u128>> = RefCell::new(BTreeMap::new());
  static POLICY_MODE: RefCell<PolicyMode> = const { RefCell::new(PolicyMode::Greedy) };
}

pub fn set_price(token: TokenRef, price: u128) {
  PRICES.with(|p| p.borrow_mut().insert(token, price));
}

pub fn set_policy_mode(mode: PolicyMode) {
  POLICY_MODE.with(|m| *m.borrow_mut() = mode);
}

fn price_of(token: &TokenRef) -> u128 {
  PRICES.with(|p| p.borrow().get(token).copied().unwrap_or(1))
}

/// Native is priced at `ETH_USD` per unit, everything else at 1 unless overridden.
pub struct MockValuation;
impl AssetValuation for MockValuation {
  fn value_of(token: &TokenRef, amount: Balance) -> u128 {
    amount.saturating_mul(price_of(token))
  }

  fn units_for(token: &TokenRef, value: u128) -> Balance {
    value.checked_div(price_of(token)).unwrap_or(0)
  }
}

pub struct MockPolicy;
impl RebalancePolicy for MockPolicy {
  fn plan(holdings: &[Holding]) -> Vec<Adjustment> {
    match POLICY_MODE.with(|m| *m.borrow()) {
      PolicyMode::Greedy => GreedyConvergence::plan(holdings),
      PolicyMode::Overdraw => vec![Adjustment {
        from: holdings[1].asset_id,
        to: holdings[0].asset_id,
        value: holdings[1].value + 1,
      }],
      PolicyMode::Diverge => vec![Adjustment {
        from: holdings[0].asset_id,
        to: holdings[1].asset_id,
        value: holdings[0].value,
      }],
      PolicyMode::UnknownAsset => vec![Adjustment {
        from: holdings[0].asset_id,
        to: 999,
        value: 1,
      }],
    }
  }
}

impl pallet_treasury_vault::Config for Test {
  type Valuation = MockValuation;
  type Policy = MockPolicy;
  type DefaultCooldownPeriod = ConstU64<COOLDOWN>;
  type MaxAssets = ConstU32<8>;
  type WeightInfo = ();
}

pub fn new_test_ext() -> polkadot_sdk::sp_io::TestExternalities {
  let mut t = polkadot_sdk::frame_system::GenesisConfig::<Test>::default()
    .build_storage()
    .unwrap();

  pallet_treasury_vault::GenesisConfig::<Test> {
    role_grants: vec![
      (GOVERNOR, Role::Governance),
      (GUARDIAN, Role::Emergency),
      (REACTIVE, Role::ReactiveTrigger),
    ],
    cooldown_period: None,
  }
  .assimilate_storage(&mut t)
  .unwrap();

  let mut ext = polkadot_sdk::sp_io::TestExternalities::new(t);
  ext.execute_with(|| {
    PRICES.with(|p| p.borrow_mut().clear());
    set_price(TokenRef::Native, ETH_USD);
    set_policy_mode(PolicyMode::Greedy);
    System::set_block_number(1);
  });
  ext
}
