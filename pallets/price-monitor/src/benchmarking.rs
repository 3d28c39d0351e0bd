use crate::*;
use polkadot_sdk::frame_support::traits::{EnsureOrigin, Hooks};
use polkadot_sdk::frame_benchmarking::v2::*;
use polkadot_sdk::frame_system::RawOrigin;
use primitives::{
  FeedId, PriceReport, Role, RoleSet, ScopeId, encode_answer_updated,
  params::{DEFAULT_DISPATCH_RESOURCE_BUDGET as BUDGET, PRICE_SCALE},
};

const FEED: FeedId = [1u8; 32];
const ORIGIN_SCOPE: ScopeId = 42_161;
const THRESHOLD_BPS: u32 = 1_000;

fn owner<T: Config>() -> T::AccountId {
  let owner: T::AccountId = whitelisted_caller();
  Roles::<T>::insert(&owner, RoleSet::of(Role::Owner));
  owner
}

fn seed_feed<T: Config>(owner: &T::AccountId) -> T::OriginRef {
  let origin_ref = T::BenchmarkHelper::origin_ref(0);
  Pallet::<T>::register_feed(
    RawOrigin::Signed(owner.clone()).into(),
    FEED,
    origin_ref,
    ORIGIN_SCOPE,
    THRESHOLD_BPS,
  )
  .expect("feed setup failed");
  Pallet::<T>::apply_observation(FEED, 2_000 * PRICE_SCALE, 1, None, None)
    .expect("bootstrap observation failed");
  origin_ref
}

fn seed_treasuries<T: Config>(owner: &T::AccountId, n: u32) {
  for index in 0..n {
    Pallet::<T>::register_treasury(
      RawOrigin::Signed(owner.clone()).into(),
      index as ScopeId + 1,
      T::BenchmarkHelper::destination_ref(index),
      BUDGET,
    )
    .expect("treasury setup failed");
  }
}

/// `AnswerUpdated` payload for round 2 at a price 15% above the bootstrap.
fn breaching_payload() -> RawPayload {
  let raw = encode_answer_updated(&PriceReport {
    round_id: 2,
    price: 2_300 * PRICE_SCALE,
    started_at: 2,
    updated_at: 2,
  })
  .expect("payload encoding failed");
  RawPayload::truncate_from(raw)
}

#[benchmarks]
mod benches {
  use super::*;

  #[benchmark]
  fn register_feed() {
    let caller = owner::<T>();
    let origin_ref = T::BenchmarkHelper::origin_ref(0);

    #[extrinsic_call]
    register_feed(
      RawOrigin::Signed(caller),
      FEED,
      origin_ref,
      ORIGIN_SCOPE,
      THRESHOLD_BPS,
    );

    assert!(Feeds::<T>::contains_key(FEED));
  }

  #[benchmark]
  fn register_treasury() {
    let caller = owner::<T>();
    seed_treasuries::<T>(&caller, T::MaxTreasuries::get().saturating_sub(1));
    let treasury_ref = T::BenchmarkHelper::destination_ref(u32::MAX);

    #[extrinsic_call]
    register_treasury(RawOrigin::Signed(caller), 0, treasury_ref, BUDGET);

    assert!(Treasuries::<T>::contains_key(0));
  }

  #[benchmark]
  fn set_treasury_active() {
    let caller = owner::<T>();
    seed_treasuries::<T>(&caller, 1);

    #[extrinsic_call]
    set_treasury_active(RawOrigin::Signed(caller), 1, false);

    assert!(!Treasuries::<T>::get(1).map(|t| t.active).unwrap_or(true));
  }

  #[benchmark]
  fn observe(t: Linear<0, { T::MaxTreasuries::get() }>) -> Result<(), BenchmarkError> {
    let reporter =
      T::ReporterOrigin::try_successful_origin().map_err(|_| BenchmarkError::Weightless)?;
    let caller = owner::<T>();
    let origin_ref = seed_feed::<T>(&caller);
    seed_treasuries::<T>(&caller, t);
    let payload = breaching_payload();

    #[extrinsic_call]
    _(
      reporter as T::RuntimeOrigin,
      ORIGIN_SCOPE,
      origin_ref,
      primitives::ANSWER_UPDATED_TOPIC,
      payload,
      1,
    );

    assert_eq!(
      Feeds::<T>::get(FEED).and_then(|f| f.last_price),
      Some(2_300 * PRICE_SCALE)
    );
    Ok(())
  }

  #[benchmark]
  fn report_price(t: Linear<0, { T::MaxTreasuries::get() }>) -> Result<(), BenchmarkError> {
    let reporter =
      T::ReporterOrigin::try_successful_origin().map_err(|_| BenchmarkError::Weightless)?;
    let caller = owner::<T>();
    seed_feed::<T>(&caller);
    seed_treasuries::<T>(&caller, t);

    #[extrinsic_call]
    _(reporter as T::RuntimeOrigin, FEED, 2_300 * PRICE_SCALE, 2);

    assert_eq!(
      Pallet::<T>::pending_dispatches().len() as u32,
      t.min(T::MaxQueuedDispatches::get())
    );
    Ok(())
  }

  #[benchmark]
  fn transfer_ownership() {
    let caller = owner::<T>();
    let new_owner: T::AccountId = account("new_owner", 0, 0);

    #[extrinsic_call]
    transfer_ownership(RawOrigin::Signed(caller), new_owner.clone());

    assert!(Pallet::<T>::has_role(&new_owner, Role::Owner));
  }

  #[benchmark]
  fn deliver_dispatch() {
    let caller = owner::<T>();
    seed_feed::<T>(&caller);
    seed_treasuries::<T>(&caller, 1);
    Pallet::<T>::apply_observation(FEED, 2_300 * PRICE_SCALE, 2, None, None)
      .expect("breach failed");
    let now = polkadot_sdk::frame_system::Pallet::<T>::block_number();

    #[block]
    {
      Pallet::<T>::on_initialize(now);
    }

    assert!(Pallet::<T>::pending_dispatches().is_empty());
  }

  #[cfg(test)]
  use crate::mock::{Test, new_test_ext};
  #[cfg(test)]
  impl_benchmark_test_suite!(Pallet, new_test_ext(), Test);
}
