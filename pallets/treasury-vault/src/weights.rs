#![cfg_attr(rustfmt, rustfmt_skip)]
#![allow(unused_parens)]
#![allow(unused_imports)]
#![allow(missing_docs)]

use polkadot_sdk::frame_support::{traits::Get, weights::{Weight, constants::RocksDbWeight}};
use core::marker::PhantomData;

pub trait WeightInfo {
	fn add_asset() -> Weight;
	fn update_allocation() -> Weight;
	fn fund_asset() -> Weight;
	fn execute_rebalance(a: u32, ) -> Weight;
	fn pause() -> Weight;
	fn unpause() -> Weight;
	fn grant_role() -> Weight;
	fn revoke_role() -> Weight;
	fn set_cooldown_period() -> Weight;
}

pub struct SubstrateWeight<T>(PhantomData<T>);
impl<T: polkadot_sdk::frame_system::Config> WeightInfo for SubstrateWeight<T> {
	fn add_asset() -> Weight {
		Weight::from_parts(24_000_000, 3500)
			.saturating_add(T::DbWeight::get().reads(3))
			.saturating_add(T::DbWeight::get().writes(2))
	}
	fn update_allocation() -> Weight {
		Weight::from_parts(18_000_000, 3000)
			.saturating_add(T::DbWeight::get().reads(2))
			.saturating_add(T::DbWeight::get().writes(1))
	}
	fn fund_asset() -> Weight {
		Weight::from_parts(19_000_000, 3000)
			.saturating_add(T::DbWeight::get().reads(2))
			.saturating_add(T::DbWeight::get().writes(1))
	}
	/// The range of component `a` is `[2, 32]`.
	fn execute_rebalance(a: u32, ) -> Weight {
		Weight::from_parts(30_000_000, 4000)
			.saturating_add(Weight::from_parts(4_200_000, 1600).saturating_mul(a.into()))
			.saturating_add(T::DbWeight::get().reads(5))
			.saturating_add(T::DbWeight::get().reads((1_u64).saturating_mul(a.into())))
			.saturating_add(T::DbWeight::get().writes(3))
			.saturating_add(T::DbWeight::get().writes((1_u64).saturating_mul(a.into())))
	}
	fn pause() -> Weight {
		Weight::from_parts(15_000_000, 2000)
			.saturating_add(T::DbWeight::get().reads(2))
			.saturating_add(T::DbWeight::get().writes(1))
	}
	fn unpause() -> Weight {
		Weight::from_parts(15_000_000, 2000)
			.saturating_add(T::DbWeight::get().reads(2))
			.saturating_add(T::DbWeight::get().writes(1))
	}
	fn grant_role() -> Weight {
		Weight::from_parts(14_000_000, 2600)
			.saturating_add(T::DbWeight::get().reads(2))
			.saturating_add(T::DbWeight::get().writes(1))
	}
	fn revoke_role() -> Weight {
		Weight::from_parts(14_000_000, 2600)
			.saturating_add(T::DbWeight::get().reads(2))
			.saturating_add(T::DbWeight::get().writes(1))
	}
	fn set_cooldown_period() -> Weight {
		Weight::from_parts(12_000_000, 1500)
			.saturating_add(T::DbWeight::get().reads(2))
			.saturating_add(T::DbWeight::get().writes(1))
	}
}

impl WeightInfo for () {
	fn add_asset() -> Weight {
		Weight::from_parts(24_000_000, 3500)
	}
	fn update_allocation() -> Weight {
		Weight::from_parts(18_000_000, 3000)
	}
	fn fund_asset() -> Weight {
		Weight::from_parts(19_000_000, 3000)
	}
	fn execute_rebalance(a: u32, ) -> Weight {
		Weight::from_parts(30_000_000, 4000)
			.saturating_add(Weight::from_parts(4_200_000, 1600).saturating_mul(a.into()))
	}
	fn pause() -> Weight {
		Weight::from_parts(15_000_000, 2000)
	}
	fn unpause() -> Weight {
		Weight::from_parts(15_000_000, 2000)
	}
	fn grant_role() -> Weight {
		Weight::from_parts(14_000_000, 2600)
	}
	fn revoke_role() -> Weight {
		Weight::from_parts(14_000_000, 2600)
	}
	fn set_cooldown_period() -> Weight {
		Weight::from_parts(12_000_000, 1500)
	}
}
