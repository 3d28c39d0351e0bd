use crate::*;
use polkadot_sdk::frame_benchmarking::v2::*;
use polkadot_sdk::frame_system::RawOrigin;
use primitives::{Role, TokenRef, params::DEFAULT_COOLDOWN_BLOCKS};

fn grant<T: Config>(who: &T::AccountId, role: Role) {
  Roles::<T>::mutate(who, |roles| {
    roles.insert(role);
  });
}

/// Fills the ledger with `n` funded assets, the first one holding everything.
fn seed_assets<T: Config>(n: u32) {
  let governor: T::AccountId = account("governor", 0, 0);
  grant::<T>(&governor, Role::Governance);
  let target = 10_000 / n;
  for id in 0..n {
    Pallet::<T>::add_asset(
      RawOrigin::Signed(governor.clone()).into(),
      id,
      TokenRef::Fungible(id),
      target,
      0,
    )
    .expect("asset setup failed");
  }
  Pallet::<T>::fund_asset(RawOrigin::Signed(governor).into(), 0, 1_000_000_000_000)
    .expect("funding failed");
}

#[benchmarks]
mod benches {
  use super::*;

  #[benchmark]
  fn add_asset() {
    let caller: T::AccountId = whitelisted_caller();
    grant::<T>(&caller, Role::Governance);

    #[extrinsic_call]
    add_asset(RawOrigin::Signed(caller), 1, TokenRef::Native, 5_000, 1_000);

    assert!(Assets::<T>::contains_key(1));
  }

  #[benchmark]
  fn update_allocation() {
    seed_assets::<T>(2);
    let caller: T::AccountId = whitelisted_caller();
    grant::<T>(&caller, Role::Governance);

    #[extrinsic_call]
    update_allocation(RawOrigin::Signed(caller), 0, 7_000);
  }

  #[benchmark]
  fn fund_asset() {
    seed_assets::<T>(2);
    let caller: T::AccountId = whitelisted_caller();

    #[extrinsic_call]
    fund_asset(RawOrigin::Signed(caller), 1, 1_000);
  }

  #[benchmark]
  fn execute_rebalance(a: Linear<2, 32>) {
    let a = a.min(T::MaxAssets::get()).max(2);
    seed_assets::<T>(a);
    let caller: T::AccountId = whitelisted_caller();
    grant::<T>(&caller, Role::ReactiveTrigger);

    #[extrinsic_call]
    execute_rebalance(RawOrigin::Signed(caller), [1u8; 32], 180_000_000_000, 1_200);

    assert_eq!(RebalanceCount::<T>::get(), 1);
  }

  #[benchmark]
  fn pause() {
    let caller: T::AccountId = whitelisted_caller();
    grant::<T>(&caller, Role::Emergency);

    #[extrinsic_call]
    pause(RawOrigin::Signed(caller));

    assert!(Pallet::<T>::is_paused());
  }

  #[benchmark]
  fn unpause() {
    let caller: T::AccountId = whitelisted_caller();
    grant::<T>(&caller, Role::Emergency);
    grant::<T>(&caller, Role::Governance);
    Pallet::<T>::pause(RawOrigin::Signed(caller.clone()).into()).expect("pause failed");

    #[extrinsic_call]
    unpause(RawOrigin::Signed(caller));

    assert!(!Pallet::<T>::is_paused());
  }

  #[benchmark]
  fn grant_role() {
    let caller: T::AccountId = whitelisted_caller();
    grant::<T>(&caller, Role::Governance);
    let who: T::AccountId = account("who", 0, 0);

    #[extrinsic_call]
    grant_role(RawOrigin::Signed(caller), who.clone(), Role::Emergency);

    assert!(Pallet::<T>::has_role(&who, Role::Emergency));
  }

  #[benchmark]
  fn revoke_role() {
    let caller: T::AccountId = whitelisted_caller();
    grant::<T>(&caller, Role::Governance);
    let who: T::AccountId = account("who", 0, 0);
    grant::<T>(&who, Role::Emergency);

    #[extrinsic_call]
    revoke_role(RawOrigin::Signed(caller), who.clone(), Role::Emergency);

    assert!(!Pallet::<T>::has_role(&who, Role::Emergency));
  }

  #[benchmark]
  fn set_cooldown_period() {
    let caller: T::AccountId = whitelisted_caller();
    grant::<T>(&caller, Role::Governance);

    #[extrinsic_call]
    set_cooldown_period(RawOrigin::Signed(caller), DEFAULT_COOLDOWN_BLOCKS.into());
  }

  #[cfg(test)]
  use crate::mock::{Test, new_test_ext};
  #[cfg(test)]
  impl_benchmark_test_suite!(Pallet, new_test_ext(), Test);
}
