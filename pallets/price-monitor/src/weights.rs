#![cfg_attr(rustfmt, rustfmt_skip)]
#![allow(unused_parens)]
#![allow(unused_imports)]
#![allow(missing_docs)]

use polkadot_sdk::frame_support::{traits::Get, weights::{Weight, constants::RocksDbWeight}};
use core::marker::PhantomData;

pub trait WeightInfo {
	fn register_feed() -> Weight;
	fn register_treasury() -> Weight;
	fn set_treasury_active() -> Weight;
	fn observe(t: u32, ) -> Weight;
	fn report_price(t: u32, ) -> Weight;
	fn transfer_ownership() -> Weight;
	fn deliver_dispatch() -> Weight;
}

pub struct SubstrateWeight<T>(PhantomData<T>);
impl<T: polkadot_sdk::frame_system::Config> WeightInfo for SubstrateWeight<T> {
	fn register_feed() -> Weight {
		Weight::from_parts(28_000_000, 3600)
			.saturating_add(T::DbWeight::get().reads(3))
			.saturating_add(T::DbWeight::get().writes(3))
	}
	fn register_treasury() -> Weight {
		Weight::from_parts(26_000_000, 3600)
			.saturating_add(T::DbWeight::get().reads(3))
			.saturating_add(T::DbWeight::get().writes(2))
	}
	fn set_treasury_active() -> Weight {
		Weight::from_parts(18_000_000, 3000)
			.saturating_add(T::DbWeight::get().reads(2))
			.saturating_add(T::DbWeight::get().writes(1))
	}
	/// The range of component `t` is `[1, 16]`.
	fn observe(t: u32, ) -> Weight {
		Weight::from_parts(34_000_000, 4200)
			.saturating_add(Weight::from_parts(6_500_000, 0).saturating_mul(t.into()))
			.saturating_add(T::DbWeight::get().reads(4))
			.saturating_add(T::DbWeight::get().reads((1_u64).saturating_mul(t.into())))
			.saturating_add(T::DbWeight::get().writes(2))
	}
	/// The range of component `t` is `[1, 16]`.
	fn report_price(t: u32, ) -> Weight {
		Weight::from_parts(24_000_000, 4000)
			.saturating_add(Weight::from_parts(6_500_000, 0).saturating_mul(t.into()))
			.saturating_add(T::DbWeight::get().reads(3))
			.saturating_add(T::DbWeight::get().reads((1_u64).saturating_mul(t.into())))
			.saturating_add(T::DbWeight::get().writes(2))
	}
	fn transfer_ownership() -> Weight {
		Weight::from_parts(16_000_000, 2600)
			.saturating_add(T::DbWeight::get().reads(2))
			.saturating_add(T::DbWeight::get().writes(2))
	}
	fn deliver_dispatch() -> Weight {
		Weight::from_parts(40_000_000, 5000)
			.saturating_add(T::DbWeight::get().reads(4))
			.saturating_add(T::DbWeight::get().writes(4))
	}
}

impl WeightInfo for () {
	fn register_feed() -> Weight {
		Weight::from_parts(28_000_000, 3600)
	}
	fn register_treasury() -> Weight {
		Weight::from_parts(26_000_000, 3600)
	}
	fn set_treasury_active() -> Weight {
		Weight::from_parts(18_000_000, 3000)
	}
	fn observe(t: u32, ) -> Weight {
		Weight::from_parts(34_000_000, 4200)
			.saturating_add(Weight::from_parts(6_500_000, 0).saturating_mul(t.into()))
	}
	fn report_price(t: u32, ) -> Weight {
		Weight::from_parts(24_000_000, 4000)
			.saturating_add(Weight::from_parts(6_500_000, 0).saturating_mul(t.into()))
	}
	fn transfer_ownership() -> Weight {
		Weight::from_parts(16_000_000, 2600)
	}
	fn deliver_dispatch() -> Weight {
		Weight::from_parts(40_000_000, 5000)
	}
}
