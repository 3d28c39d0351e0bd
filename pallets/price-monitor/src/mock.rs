use crate as pallet_price_monitor;
use crate::{DispatchTransport, RebalanceCommand};
use frame::prelude::*;
use polkadot_sdk::{
  frame_support::{
    PalletId, construct_runtime,
    traits::{ConstU32, ConstU64, Get},
  },
  frame_system::EnsureSigned,
  sp_runtime::{
    BuildStorage,
    traits::{BlakeTwo256, IdentityLookup},
  },
};
use primitives::{
  Balance, Role, ScopeId, TokenRef,
  pallet_ids::PRICE_MONITOR_PALLET_ID,
};

use alloc::{collections::BTreeSet, vec, vec::Vec};
use core::cell::RefCell;

type Block = polkadot_sdk::frame_system::mocking::MockBlock<Test>;
pub type AccountId = u64;
pub type Address = [u8; 20];

pub const OWNER: AccountId = 1;
pub const GOVERNOR: AccountId = 2;
pub const GUARDIAN: AccountId = 3;
pub const REPORTER: AccountId = 4;
pub const OUTSIDER: AccountId = 5;

/// Scope whose treasury is the `TreasuryVault` instance of this runtime
pub const LOCAL_SCOPE: ScopeId = 1;
pub const ARBITRUM_SCOPE: ScopeId = 42_161;
pub const BASE_SCOPE: ScopeId = 8_453;
pub const SEPOLIA_SCOPE: ScopeId = 11_155_111;

pub const ETH_USD_AGGREGATOR: Address = [0x69; 20];
pub const BTC_USD_AGGREGATOR: Address = [0x1b; 20];
pub const LOCAL_TREASURY: Address = [0x11; 20];
pub const REMOTE_TREASURY: Address = [0x22; 20];

pub const ETH_VALUE: u128 = 1_800;
pub const COOLDOWN: u64 = 10;

construct_runtime!(
  pub enum Test {
    System: polkadot_sdk::frame_system,
    PriceMonitor: pallet_price_monitor,
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

pub struct MonitorPalletId;
impl Get<PalletId> for MonitorPalletId {
  fn get() -> PalletId {
    PalletId(*PRICE_MONITOR_PALLET_ID)
  }
}

thread_local! {
  static OUTBOX: RefCell<Vec<(ScopeId, Address, u64, RebalanceCommand)>> = const { RefCell::new(Vec::new()) };
  static UNREACHABLE: RefCell<BTreeSet<ScopeId>> = const { RefCell::new(BTreeSet::new()) };
}

/// Accepts every command onto an outbox unless its scope is marked unreachable.
/// Destination ledgers consume the outbox on their own schedule.
pub struct MockTransport;
impl DispatchTransport<Address> for MockTransport {
  fn send(
    scope_id: ScopeId,
    destination: &Address,
    resource_budget: u64,
    command: &RebalanceCommand,
  ) -> Result<(), DispatchError> {
    if UNREACHABLE.with(|u| u.borrow().contains(&scope_id)) {
      return Err(DispatchError::Other("destination unreachable"));
    }
    OUTBOX.with(|o| {
      o.borrow_mut()
        .push((scope_id, *destination, resource_budget, *command))
    });
    Ok(())
  }
}

pub fn set_unreachable(scope_id: ScopeId) {
  UNREACHABLE.with(|u| u.borrow_mut().insert(scope_id));
}

pub fn take_outbox() -> Vec<(ScopeId, Address, u64, RebalanceCommand)> {
  OUTBOX.with(|o| core::mem::take(&mut *o.borrow_mut()))
}

/// Plays the destination ledger: every command addressed to the local treasury is
/// executed with the monitor's principal. Results stay on the destination side.
pub fn relay_to_local_treasury() -> Vec<DispatchResult> {
  take_outbox()
    .into_iter()
    .filter(|(scope_id, destination, _, _)| {
      *scope_id == LOCAL_SCOPE && *destination == LOCAL_TREASURY
    })
    .map(|(_, _, _, command)| {
      TreasuryVault::execute_rebalance(
        RuntimeOrigin::signed(PriceMonitor::account_id()),
        command.feed_id,
        command.trigger_price,
        command.change_bps,
      )
    })
    .collect()
}

#[cfg(feature = "runtime-benchmarks")]
pub struct MockBenchmarkHelper;
#[cfg(feature = "runtime-benchmarks")]
impl crate::BenchmarkHelper<Address, Address> for MockBenchmarkHelper {
  fn origin_ref(index: u32) -> Address {
    let mut address = [0xA0; 20];
    address[..4].copy_from_slice(&index.to_le_bytes());
    address
  }

  fn destination_ref(index: u32) -> Address {
    let mut address = [0xD0; 20];
    address[..4].copy_from_slice(&index.to_le_bytes());
    address
  }
}

impl pallet_price_monitor::Config for Test {
  type OriginRef = Address;
  type DestinationRef = Address;
  type ReporterOrigin = EnsureSigned<AccountId>;
  type Transport = MockTransport;
  type PalletId = MonitorPalletId;
  type MaxTreasuries = ConstU32<8>;
  type MaxQueuedDispatches = ConstU32<6>;
  type MaxDispatchesPerBlock = ConstU32<2>;
  type WeightInfo = ();
  #[cfg(feature = "runtime-benchmarks")]
  type BenchmarkHelper = MockBenchmarkHelper;
}

/// Native is worth `ETH_VALUE` per unit, every other token 1.
pub struct MockValuation;
impl pallet_treasury_vault::AssetValuation for MockValuation {
  fn value_of(token: &TokenRef, amount: Balance) -> u128 {
    match token {
      TokenRef::Native => amount.saturating_mul(ETH_VALUE),
      _ => amount,
    }
  }

  fn units_for(token: &TokenRef, value: u128) -> Balance {
    match token {
      TokenRef::Native => value / ETH_VALUE,
      _ => value,
    }
  }
}

impl pallet_treasury_vault::Config for Test {
  type Valuation = MockValuation;
  type Policy = pallet_treasury_vault::GreedyConvergence;
  type DefaultCooldownPeriod = ConstU64<COOLDOWN>;
  type MaxAssets = ConstU32<8>;
  type WeightInfo = ();
}

pub fn new_test_ext() -> polkadot_sdk::sp_io::TestExternalities {
  let mut t = polkadot_sdk::frame_system::GenesisConfig::<Test>::default()
    .build_storage()
    .unwrap();

  pallet_price_monitor::GenesisConfig::<Test> { owner: Some(OWNER) }
    .assimilate_storage(&mut t)
    .unwrap();

  pallet_treasury_vault::GenesisConfig::<Test> {
    role_grants: vec![
      (GOVERNOR, Role::Governance),
      (GUARDIAN, Role::Emergency),
      (PriceMonitor::account_id(), Role::ReactiveTrigger),
    ],
    cooldown_period: None,
  }
  .assimilate_storage(&mut t)
  .unwrap();

  let mut ext = polkadot_sdk::sp_io::TestExternalities::new(t);
  ext.execute_with(|| {
    OUTBOX.with(|o| o.borrow_mut().clear());
    UNREACHABLE.with(|u| u.borrow_mut().clear());
    System::set_block_number(1);
  });
  ext
}
