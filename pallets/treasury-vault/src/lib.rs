//! Treasury Vault Pallet
//!
//! Destination-side treasury: a multi-asset ledger with per-asset target allocations,
//! a cooldown-gated rebalance engine driven by the reactive trigger, and an emergency
//! pause. All permission checks go through [`primitives::AccessPolicy`].

#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

pub use pallet::*;

pub mod adapters;
pub use adapters::AssetValuation;

pub mod policy;
pub use policy::{Adjustment, GreedyConvergence, Holding, RebalancePolicy};

pub mod weights;
pub use weights::WeightInfo;

#[cfg(test)]
mod mock;

#[cfg(feature = "runtime-benchmarks")]
mod benchmarking;

#[frame::pallet]
pub mod pallet {
  use super::{AssetValuation, RebalancePolicy, policy, weights::WeightInfo};
  use alloc::vec::Vec;
  use frame::deps::sp_runtime::traits::Zero;
  use frame::prelude::*;
  use primitives::{
    AccessPolicy, AssetId, Balance, FeedId, Operation, Price, Role, RoleSet, TokenRef,
    params::MAX_BPS,
  };

  /// Log target for this pallet.
  const LOG_TARGET: &str = "runtime::treasury-vault";

  #[derive(
    Clone, Debug, Decode, DecodeWithMemTracking, Encode, Eq, PartialEq, TypeInfo, MaxEncodedLen,
  )]
  pub struct AssetInfo {
    pub token_ref: TokenRef,
    pub balance: Balance,
    pub target_bps: u32,
    pub min_funding_amount: Balance,
  }

  #[derive(
    Clone, Debug, Decode, DecodeWithMemTracking, Encode, Eq, PartialEq, TypeInfo, MaxEncodedLen,
  )]
  pub struct RebalanceRecord<BlockNumber> {
    pub sequence: u64,
    pub feed_id: FeedId,
    pub trigger_price: Price,
    pub change_bps: u32,
    pub at: BlockNumber,
  }

  #[derive(
    Clone, Debug, Decode, DecodeWithMemTracking, Encode, Eq, PartialEq, TypeInfo, MaxEncodedLen,
  )]
  pub struct PauseState<AccountId, BlockNumber> {
    pub paused: bool,
    pub last_actor: Option<AccountId>,
    pub last_changed_at: BlockNumber,
  }

  #[pallet::config]
  pub trait Config: frame_system::Config<RuntimeEvent: From<Event<Self>>> {
    /// Prices asset balances in a common unit
    type Valuation: AssetValuation;

    /// Decides the transfers of a rebalance
    type Policy: RebalancePolicy;

    /// Cooldown used until governance sets one
    #[pallet::constant]
    type DefaultCooldownPeriod: Get<BlockNumberFor<Self>>;

    #[pallet::constant]
    type MaxAssets: Get<u32>;

    type WeightInfo: WeightInfo;
  }

  pub type RebalanceRecordOf<T> = RebalanceRecord<BlockNumberFor<T>>;
  pub type PauseStateOf<T> =
    PauseState<<T as frame_system::Config>::AccountId, BlockNumberFor<T>>;

  #[pallet::pallet]
  pub struct Pallet<T>(_);

  #[pallet::storage]
  #[pallet::getter(fn roles)]
  pub type Roles<T: Config> = StorageMap<_, Blake2_128Concat, T::AccountId, RoleSet, ValueQuery>;

  #[pallet::storage]
  #[pallet::getter(fn pause_state)]
  pub type PauseStatus<T: Config> = StorageValue<_, PauseStateOf<T>, OptionQuery>;

  #[pallet::storage]
  #[pallet::getter(fn assets)]
  pub type Assets<T: Config> = StorageMap<_, Blake2_128Concat, AssetId, AssetInfo, OptionQuery>;

  /// Asset ids in insertion order.
  #[pallet::storage]
  #[pallet::getter(fn asset_ids)]
  pub type AssetIds<T: Config> = StorageValue<_, BoundedVec<AssetId, T::MaxAssets>, ValueQuery>;

  #[pallet::storage]
  #[pallet::getter(fn cooldown_period)]
  pub type CooldownPeriod<T: Config> =
    StorageValue<_, BlockNumberFor<T>, ValueQuery, T::DefaultCooldownPeriod>;

  /// Block of the last successful rebalance; `None` before the first one.
  #[pallet::storage]
  #[pallet::getter(fn last_rebalance_at)]
  pub type LastRebalanceAt<T: Config> = StorageValue<_, BlockNumberFor<T>, OptionQuery>;

  #[pallet::storage]
  #[pallet::getter(fn rebalance_count)]
  pub type RebalanceCount<T> = StorageValue<_, u64, ValueQuery>;

  #[pallet::storage]
  #[pallet::getter(fn rebalance_record)]
  pub type RebalanceHistory<T: Config> =
    StorageMap<_, Blake2_128Concat, u64, RebalanceRecordOf<T>, OptionQuery>;

  #[pallet::genesis_config]
  #[derive(frame::prelude::DefaultNoBound)]
  pub struct GenesisConfig<T: Config> {
    /// Initial role grants, typically the deploying principal as Governance
    pub role_grants: Vec<(T::AccountId, Role)>,
    /// Overrides `DefaultCooldownPeriod`
    pub cooldown_period: Option<BlockNumberFor<T>>,
  }

  #[pallet::genesis_build]
  impl<T: Config> BuildGenesisConfig for GenesisConfig<T> {
    fn build(&self) {
      for (who, role) in &self.role_grants {
        Roles::<T>::mutate(who, |roles| {
          roles.insert(*role);
        });
      }
      if let Some(period) = self.cooldown_period {
        assert!(!period.is_zero(), "cooldown period must be positive");
        CooldownPeriod::<T>::put(period);
      }
    }
  }

  #[pallet::event]
  #[pallet::generate_deposit(pub(super) fn deposit_event)]
  pub enum Event<T: Config> {
    AssetAdded {
      asset_id: AssetId,
      token_ref: TokenRef,
      target_bps: u32,
    },
    AllocationUpdated {
      asset_id: AssetId,
      old_bps: u32,
      new_bps: u32,
    },
    /// External funds were credited to an asset.
    AssetFunded {
      asset_id: AssetId,
      from: T::AccountId,
      amount: Balance,
      new_balance: Balance,
    },
    RoleGranted {
      who: T::AccountId,
      role: Role,
    },
    RoleRevoked {
      who: T::AccountId,
      role: Role,
    },
    EmergencyPaused {
      actor: T::AccountId,
      at: BlockNumberFor<T>,
    },
    Unpaused {
      actor: T::AccountId,
      at: BlockNumberFor<T>,
    },
    CooldownPeriodUpdated {
      old: BlockNumberFor<T>,
      new: BlockNumberFor<T>,
    },
    /// One balance adjustment of a rebalance; `amount` is debited from `from_asset`.
    /// A rebalance that moves nothing emits one with both asset ids and `amount` 0.
    RebalanceExecuted {
      feed_id: FeedId,
      from_asset: AssetId,
      to_asset: AssetId,
      amount: Balance,
      trigger_price: Price,
    },
    /// A rebalance completed and was appended to the history.
    RebalanceRecorded {
      sequence: u64,
      feed_id: FeedId,
      change_bps: u32,
      adjustments: u32,
    },
  }

  #[pallet::error]
  pub enum Error<T> {
    /// The caller does not hold the role the operation requires.
    Unauthorized,
    /// An asset with this id already exists.
    DuplicateEntry,
    /// Unknown asset, or revoking a role that is not held.
    NotFound,
    /// Allocation above 10_000 bps, zero amount or zero cooldown.
    InvalidParameter,
    /// The treasury is paused.
    Paused,
    /// The cooldown since the last rebalance has not elapsed.
    CooldownActive,
    /// `MaxAssets` reached.
    TooManyAssets,
    /// The rebalance policy overdrew a balance, referenced an unknown asset or
    /// moved an asset away from its target.
    PolicyViolation,
    /// Arithmetic overflow.
    Overflow,
  }

  #[pallet::call]
  impl<T: Config> Pallet<T> {
    #[pallet::call_index(0)]
    #[pallet::weight(T::WeightInfo::add_asset())]
    pub fn add_asset(
      origin: OriginFor<T>,
      asset_id: AssetId,
      token_ref: TokenRef,
      target_bps: u32,
      min_funding_amount: Balance,
    ) -> DispatchResult {
      Self::authorize(origin, Operation::AddAsset)?;
      ensure!(target_bps <= MAX_BPS, Error::<T>::InvalidParameter);
      ensure!(
        !Assets::<T>::contains_key(asset_id),
        Error::<T>::DuplicateEntry
      );
      AssetIds::<T>::try_mutate(|ids| ids.try_push(asset_id))
        .map_err(|_| Error::<T>::TooManyAssets)?;
      Assets::<T>::insert(
        asset_id,
        AssetInfo {
          token_ref,
          balance: 0,
          target_bps,
          min_funding_amount,
        },
      );
      Self::deposit_event(Event::AssetAdded {
        asset_id,
        token_ref,
        target_bps,
      });
      Ok(())
    }

    #[pallet::call_index(1)]
    #[pallet::weight(T::WeightInfo::update_allocation())]
    pub fn update_allocation(
      origin: OriginFor<T>,
      asset_id: AssetId,
      new_target_bps: u32,
    ) -> DispatchResult {
      Self::authorize(origin, Operation::UpdateAllocation)?;
      ensure!(new_target_bps <= MAX_BPS, Error::<T>::InvalidParameter);
      let old_bps = Assets::<T>::try_mutate(asset_id, |maybe| -> Result<u32, DispatchError> {
        let asset = maybe.as_mut().ok_or(Error::<T>::NotFound)?;
        Ok(core::mem::replace(&mut asset.target_bps, new_target_bps))
      })?;
      Self::deposit_event(Event::AllocationUpdated {
        asset_id,
        old_bps,
        new_bps: new_target_bps,
      });
      Ok(())
    }

    /// Credit externally received funds to an asset.
    #[pallet::call_index(2)]
    #[pallet::weight(T::WeightInfo::fund_asset())]
    pub fn fund_asset(origin: OriginFor<T>, asset_id: AssetId, amount: Balance) -> DispatchResult {
      let who = ensure_signed(origin)?;
      ensure!(!Self::is_paused(), Error::<T>::Paused);
      ensure!(amount > 0, Error::<T>::InvalidParameter);
      let new_balance =
        Assets::<T>::try_mutate(asset_id, |maybe| -> Result<Balance, DispatchError> {
          let asset = maybe.as_mut().ok_or(Error::<T>::NotFound)?;
          asset.balance = asset
            .balance
            .checked_add(amount)
            .ok_or(Error::<T>::Overflow)?;
          Ok(asset.balance)
        })?;
      Self::deposit_event(Event::AssetFunded {
        asset_id,
        from: who,
        amount,
        new_balance,
      });
      Ok(())
    }

    /// Rebalance toward target allocations in response to a price breach.
    ///
    /// Checks, in order: reactive-trigger role, pause, cooldown. The policy's plan is
    /// applied in full or not at all.
    #[pallet::call_index(3)]
    #[pallet::weight(T::WeightInfo::execute_rebalance(T::MaxAssets::get()))]
    pub fn execute_rebalance(
      origin: OriginFor<T>,
      feed_id: FeedId,
      trigger_price: Price,
      change_bps: u32,
    ) -> DispatchResult {
      let who = Self::authorize(origin, Operation::ExecuteRebalance)?;
      ensure!(!Self::is_paused(), Error::<T>::Paused);
      let now = frame_system::Pallet::<T>::block_number();
      if let Some(last) = LastRebalanceAt::<T>::get() {
        ensure!(
          now.saturating_sub(last) >= CooldownPeriod::<T>::get(),
          Error::<T>::CooldownActive
        );
      }

      let mut ledger = Self::ledger();
      let before = Self::holdings(&ledger);
      let plan = T::Policy::plan(&before);
      let mut moves = Vec::with_capacity(plan.len());
      for adjustment in &plan {
        if let Some(applied) = Self::apply_adjustment(&mut ledger, adjustment)? {
          moves.push(applied);
        }
      }
      let after = Self::holdings(&ledger);
      if !policy::converges(&before, &after) {
        log::warn!(
          target: LOG_TARGET,
          "Rejected diverging plan for feed {:?}: {:?}",
          feed_id,
          plan
        );
        return Err(Error::<T>::PolicyViolation.into());
      }

      for (asset_id, info) in &ledger {
        Assets::<T>::insert(asset_id, info);
      }
      let sequence = RebalanceCount::<T>::mutate(|count| {
        *count = count.saturating_add(1);
        *count
      });
      RebalanceHistory::<T>::insert(
        sequence,
        RebalanceRecord {
          sequence,
          feed_id,
          trigger_price,
          change_bps,
          at: now,
        },
      );
      LastRebalanceAt::<T>::put(now);

      log::debug!(
        target: LOG_TARGET,
        "Rebalance #{:?} by {:?} for feed {:?}: {} adjustment(s)",
        sequence,
        who,
        feed_id,
        moves.len()
      );
      if moves.is_empty() {
        Self::deposit_event(Event::RebalanceExecuted {
          feed_id,
          from_asset: 0,
          to_asset: 0,
          amount: 0,
          trigger_price,
        });
      }
      for (from_asset, to_asset, amount) in &moves {
        Self::deposit_event(Event::RebalanceExecuted {
          feed_id,
          from_asset: *from_asset,
          to_asset: *to_asset,
          amount: *amount,
          trigger_price,
        });
      }
      Self::deposit_event(Event::RebalanceRecorded {
        sequence,
        feed_id,
        change_bps,
        adjustments: moves.len() as u32,
      });
      Ok(())
    }

    /// Pause the treasury. Repeating it while paused is not an error.
    #[pallet::call_index(4)]
    #[pallet::weight(T::WeightInfo::pause())]
    pub fn pause(origin: OriginFor<T>) -> DispatchResult {
      let who = Self::authorize(origin, Operation::Pause)?;
      let now = frame_system::Pallet::<T>::block_number();
      if !Self::is_paused() {
        PauseStatus::<T>::put(PauseState {
          paused: true,
          last_actor: Some(who.clone()),
          last_changed_at: now,
        });
      }
      Self::deposit_event(Event::EmergencyPaused {
        actor: who,
        at: now,
      });
      Ok(())
    }

    #[pallet::call_index(5)]
    #[pallet::weight(T::WeightInfo::unpause())]
    pub fn unpause(origin: OriginFor<T>) -> DispatchResult {
      let who = Self::authorize(origin, Operation::Unpause)?;
      if !Self::is_paused() {
        return Ok(());
      }
      let now = frame_system::Pallet::<T>::block_number();
      PauseStatus::<T>::put(PauseState {
        paused: false,
        last_actor: Some(who.clone()),
        last_changed_at: now,
      });
      Self::deposit_event(Event::Unpaused {
        actor: who,
        at: now,
      });
      Ok(())
    }

    /// Authorize `who` (usually the monitor's dispatching principal) to execute rebalances.
    #[pallet::call_index(6)]
    #[pallet::weight(T::WeightInfo::grant_role())]
    pub fn grant_reactive_trigger(origin: OriginFor<T>, who: T::AccountId) -> DispatchResult {
      Self::authorize(origin, Operation::GrantReactiveTrigger)?;
      Self::do_grant(who, Role::ReactiveTrigger);
      Ok(())
    }

    #[pallet::call_index(7)]
    #[pallet::weight(T::WeightInfo::grant_role())]
    pub fn grant_role(origin: OriginFor<T>, who: T::AccountId, role: Role) -> DispatchResult {
      Self::authorize(origin, Operation::GrantRole)?;
      Self::do_grant(who, role);
      Ok(())
    }

    #[pallet::call_index(8)]
    #[pallet::weight(T::WeightInfo::revoke_role())]
    pub fn revoke_role(origin: OriginFor<T>, who: T::AccountId, role: Role) -> DispatchResult {
      Self::authorize(origin, Operation::RevokeRole)?;
      Roles::<T>::try_mutate_exists(&who, |maybe| -> DispatchResult {
        let roles = maybe.as_mut().ok_or(Error::<T>::NotFound)?;
        ensure!(roles.remove(role), Error::<T>::NotFound);
        if roles.is_empty() {
          *maybe = None;
        }
        Ok(())
      })?;
      Self::deposit_event(Event::RoleRevoked { who, role });
      Ok(())
    }

    #[pallet::call_index(9)]
    #[pallet::weight(T::WeightInfo::set_cooldown_period())]
    pub fn set_cooldown_period(origin: OriginFor<T>, blocks: BlockNumberFor<T>) -> DispatchResult {
      Self::authorize(origin, Operation::SetCooldownPeriod)?;
      ensure!(!blocks.is_zero(), Error::<T>::InvalidParameter);
      let old = CooldownPeriod::<T>::get();
      CooldownPeriod::<T>::put(blocks);
      Self::deposit_event(Event::CooldownPeriodUpdated { old, new: blocks });
      Ok(())
    }
  }

  impl<T: Config> Pallet<T> {
    pub fn is_paused() -> bool {
      PauseStatus::<T>::get().is_some_and(|state| state.paused)
    }

    pub fn has_role(who: &T::AccountId, role: Role) -> bool {
      Roles::<T>::get(who).contains(role)
    }

    /// `(total_value, last_rebalance_at, rebalance_count)`; the block is zero before
    /// the first rebalance.
    pub fn portfolio_state() -> (u128, BlockNumberFor<T>, u64) {
      let total = policy::total_value(&Self::holdings(&Self::ledger()));
      (
        total,
        LastRebalanceAt::<T>::get().unwrap_or_else(Zero::zero),
        RebalanceCount::<T>::get(),
      )
    }

    /// `(token_ref, balance, target_bps, current_bps)`.
    pub fn asset_allocation(asset_id: AssetId) -> Option<(TokenRef, Balance, u32, u32)> {
      let asset = Assets::<T>::get(asset_id)?;
      let current = Self::current_allocation_bps(asset_id)?;
      Some((asset.token_ref, asset.balance, asset.target_bps, current))
    }

    /// Share of the portfolio value held in `asset_id`; derived on every call.
    pub fn current_allocation_bps(asset_id: AssetId) -> Option<u32> {
      let holdings = Self::holdings(&Self::ledger());
      let total = policy::total_value(&holdings);
      holdings
        .iter()
        .find(|h| h.asset_id == asset_id)
        .map(|h| policy::allocation_bps(h.value, total))
    }

    fn authorize(
      origin: OriginFor<T>,
      operation: Operation,
    ) -> Result<T::AccountId, DispatchError> {
      let who = ensure_signed(origin)?;
      AccessPolicy::require(Roles::<T>::get(&who), operation).map_err(|denied| {
        log::debug!(
          target: LOG_TARGET,
          "{:?} denied for {:?}: requires {:?}",
          denied.operation,
          who,
          denied.required
        );
        Error::<T>::Unauthorized
      })?;
      Ok(who)
    }

    fn do_grant(who: T::AccountId, role: Role) {
      let added = Roles::<T>::mutate(&who, |roles| roles.insert(role));
      if added {
        Self::deposit_event(Event::RoleGranted { who, role });
      }
    }

    fn ledger() -> Vec<(AssetId, AssetInfo)> {
      AssetIds::<T>::get()
        .into_iter()
        .filter_map(|id| Assets::<T>::get(id).map(|info| (id, info)))
        .collect()
    }

    fn holdings(ledger: &[(AssetId, AssetInfo)]) -> Vec<policy::Holding> {
      ledger
        .iter()
        .map(|(asset_id, info)| policy::Holding {
          asset_id: *asset_id,
          value: T::Valuation::value_of(&info.token_ref, info.balance),
          floor: T::Valuation::value_of(&info.token_ref, info.min_funding_amount),
          target_bps: info.target_bps,
        })
        .collect()
    }

    /// Applies one value transfer to the in-memory ledger, returning
    /// `(from, to, units debited)`.
    ///
    /// The credit is priced from the value actually debited. A step whose debit or
    /// credit rounds to zero units is skipped and leaves the ledger untouched.
    fn apply_adjustment(
      ledger: &mut [(AssetId, AssetInfo)],
      adjustment: &policy::Adjustment,
    ) -> Result<Option<(AssetId, AssetId, Balance)>, DispatchError> {
      ensure!(adjustment.from != adjustment.to, Error::<T>::PolicyViolation);
      let position = |id: AssetId| ledger.iter().position(|(asset_id, _)| *asset_id == id);
      let from = position(adjustment.from).ok_or(Error::<T>::PolicyViolation)?;
      let to = position(adjustment.to).ok_or(Error::<T>::PolicyViolation)?;

      let debit = T::Valuation::units_for(&ledger[from].1.token_ref, adjustment.value);
      let moved = T::Valuation::value_of(&ledger[from].1.token_ref, debit);
      let credit = T::Valuation::units_for(&ledger[to].1.token_ref, moved);
      if debit == 0 || credit == 0 {
        log::debug!(
          target: LOG_TARGET,
          "Skipping dust adjustment {:?} -> {:?} of value {}",
          adjustment.from,
          adjustment.to,
          adjustment.value
        );
        return Ok(None);
      }
      ledger[from].1.balance = ledger[from]
        .1
        .balance
        .checked_sub(debit)
        .ok_or(Error::<T>::PolicyViolation)?;
      ledger[to].1.balance = ledger[to]
        .1
        .balance
        .checked_add(credit)
        .ok_or(Error::<T>::Overflow)?;
      Ok(Some((adjustment.from, adjustment.to, debit)))
    }
  }
}
