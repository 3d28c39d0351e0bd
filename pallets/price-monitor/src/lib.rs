//! Price Monitor Pallet
//!
//! Reactive monitoring side of the treasury rebalancer. Tracks registered price feeds,
//! detects threshold breaches on every accepted observation and fans each breach out
//! to all active registered treasuries through a bounded dispatch queue.
//!
//! Delivery is fire-and-forget: queued commands are handed to the runtime's
//! [`DispatchTransport`] in `on_initialize`, one storage layer per command, and the
//! outcome is only surfaced as an event. A failed delivery is never retried and never
//! rolls back the feed update that caused it.

#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

pub use pallet::*;

pub mod adapters;
pub use adapters::{DispatchTransport, RebalanceCommand};

pub mod detector;

pub mod weights;
pub use weights::WeightInfo;

#[cfg(test)]
mod mock;

#[cfg(feature = "runtime-benchmarks")]
mod benchmarking;

/// Helper for benchmarking
#[cfg(feature = "runtime-benchmarks")]
pub trait BenchmarkHelper<OriginRef, DestinationRef> {
  /// A non-default origin reference unique for `index`
  fn origin_ref(index: u32) -> OriginRef;
  /// A non-default destination reference unique for `index`
  fn destination_ref(index: u32) -> DestinationRef;
}

/// Upper bound on the raw inbound event payload.
pub const MAX_RAW_PAYLOAD_LEN: u32 = 1024;

#[frame::pallet]
pub mod pallet {
  use super::{
    DispatchTransport, MAX_RAW_PAYLOAD_LEN, RebalanceCommand,
    detector::{self, Observation},
    weights::WeightInfo,
  };
  use alloc::vec::Vec;
  use frame::deps::{
    frame_support::{PalletId, storage::with_storage_layer, traits::EnsureOrigin},
    sp_runtime::traits::AccountIdConversion,
  };
  use frame::prelude::*;
  use primitives::{
    ANSWER_UPDATED_TOPIC, AccessPolicy, FeedId, Operation, Price, Role, RoleSet, ScopeId,
    decode_answer_updated, params::MAX_BPS,
  };

  /// Log target for this pallet.
  const LOG_TARGET: &str = "runtime::price-monitor";

  pub type RawPayload = BoundedVec<u8, ConstU32<MAX_RAW_PAYLOAD_LEN>>;

  #[derive(
    Clone, Debug, Decode, DecodeWithMemTracking, Encode, Eq, PartialEq, TypeInfo, MaxEncodedLen,
  )]
  pub struct PriceFeed<OriginRef> {
    pub origin_ref: OriginRef,
    pub origin_scope: ScopeId,
    pub threshold_bps: u32,
    /// `None` until the first observation
    pub last_price: Option<Price>,
    pub last_observed_at: u64,
    /// Round id of the last ingested aggregator payload, 0 for direct reports
    pub last_round: u128,
  }

  #[derive(
    Clone, Debug, Decode, DecodeWithMemTracking, Encode, Eq, PartialEq, TypeInfo, MaxEncodedLen,
  )]
  pub struct TreasuryInfo<DestinationRef> {
    pub treasury_ref: DestinationRef,
    pub resource_budget: u64,
    pub active: bool,
  }

  #[derive(
    Clone, Debug, Decode, DecodeWithMemTracking, Encode, Eq, PartialEq, TypeInfo, MaxEncodedLen,
  )]
  pub struct PendingDispatch<DestinationRef, BlockNumber> {
    pub scope_id: ScopeId,
    pub treasury_ref: DestinationRef,
    pub resource_budget: u64,
    pub command: RebalanceCommand,
    pub queued_at: BlockNumber,
  }

  #[pallet::config]
  pub trait Config: frame_system::Config<RuntimeEvent: From<Event<Self>>> {
    /// Reference to a price source on its origin ledger (e.g. an aggregator address).
    /// `Default` is treated as the null reference.
    type OriginRef: Parameter + Member + Default + Copy + MaxEncodedLen;

    /// Reference to a treasury on its destination ledger.
    /// `Default` is treated as the null reference.
    type DestinationRef: Parameter + Member + Default + Copy + MaxEncodedLen;

    /// Origin allowed to submit observations
    type ReporterOrigin: EnsureOrigin<Self::RuntimeOrigin>;

    /// Delivers queued rebalance commands to destination ledgers
    type Transport: DispatchTransport<Self::DestinationRef>;

    /// The pallet ID, used to derive the dispatching principal
    #[pallet::constant]
    type PalletId: Get<PalletId>;

    #[pallet::constant]
    type MaxTreasuries: Get<u32>;

    #[pallet::constant]
    type MaxQueuedDispatches: Get<u32>;

    /// Commands handed to the transport per block
    #[pallet::constant]
    type MaxDispatchesPerBlock: Get<u32>;

    type WeightInfo: WeightInfo;

    #[cfg(feature = "runtime-benchmarks")]
    type BenchmarkHelper: crate::BenchmarkHelper<Self::OriginRef, Self::DestinationRef>;
  }

  pub type PriceFeedOf<T> = PriceFeed<<T as Config>::OriginRef>;
  pub type TreasuryInfoOf<T> = TreasuryInfo<<T as Config>::DestinationRef>;
  pub type PendingDispatchOf<T> =
    PendingDispatch<<T as Config>::DestinationRef, BlockNumberFor<T>>;

  #[pallet::pallet]
  pub struct Pallet<T>(_);

  #[pallet::storage]
  #[pallet::getter(fn roles)]
  pub type Roles<T: Config> = StorageMap<_, Blake2_128Concat, T::AccountId, RoleSet, ValueQuery>;

  #[pallet::storage]
  #[pallet::getter(fn feeds)]
  pub type Feeds<T: Config> = StorageMap<_, Blake2_128Concat, FeedId, PriceFeedOf<T>, OptionQuery>;

  /// Origin binding used to route raw inbound events to their feed.
  #[pallet::storage]
  pub type FeedIndex<T: Config> =
    StorageDoubleMap<_, Blake2_128Concat, ScopeId, Blake2_128Concat, T::OriginRef, FeedId, OptionQuery>;

  #[pallet::storage]
  #[pallet::getter(fn feed_count)]
  pub type FeedCount<T> = StorageValue<_, u32, ValueQuery>;

  #[pallet::storage]
  #[pallet::getter(fn treasuries)]
  pub type Treasuries<T: Config> =
    StorageMap<_, Blake2_128Concat, ScopeId, TreasuryInfoOf<T>, OptionQuery>;

  /// Registered scopes in registration order.
  #[pallet::storage]
  #[pallet::getter(fn treasury_scopes)]
  pub type TreasuryScopes<T: Config> =
    StorageValue<_, BoundedVec<ScopeId, T::MaxTreasuries>, ValueQuery>;

  #[pallet::storage]
  #[pallet::getter(fn pending_dispatches)]
  pub type DispatchQueue<T: Config> =
    StorageValue<_, BoundedVec<PendingDispatchOf<T>, T::MaxQueuedDispatches>, ValueQuery>;

  #[pallet::genesis_config]
  #[derive(frame::prelude::DefaultNoBound)]
  pub struct GenesisConfig<T: Config> {
    /// Principal bootstrapped with the Owner role
    pub owner: Option<T::AccountId>,
  }

  #[pallet::genesis_build]
  impl<T: Config> BuildGenesisConfig for GenesisConfig<T> {
    fn build(&self) {
      if let Some(owner) = &self.owner {
        Roles::<T>::insert(owner, RoleSet::of(Role::Owner));
      }
    }
  }

  #[pallet::hooks]
  impl<T: Config> Hooks<BlockNumberFor<T>> for Pallet<T> {
    fn on_initialize(_now: BlockNumberFor<T>) -> Weight {
      let queue = DispatchQueue::<T>::get();
      if queue.is_empty() {
        return T::DbWeight::get().reads(1);
      }
      let mut batch = queue.into_inner();
      let take = (T::MaxDispatchesPerBlock::get() as usize).min(batch.len());
      let rest = batch.split_off(take);
      if rest.is_empty() {
        DispatchQueue::<T>::kill();
      } else {
        DispatchQueue::<T>::put(BoundedVec::truncate_from(rest));
      }
      for pending in &batch {
        Self::deliver(pending);
      }
      T::DbWeight::get()
        .reads_writes(1, 1)
        .saturating_add(T::WeightInfo::deliver_dispatch().saturating_mul(take as u64))
    }
  }

  #[pallet::event]
  #[pallet::generate_deposit(pub(super) fn deposit_event)]
  pub enum Event<T: Config> {
    /// A feed was registered and its origin subscribed.
    Subscribed {
      feed_id: FeedId,
      origin_scope: ScopeId,
      origin_ref: T::OriginRef,
      threshold_bps: u32,
    },
    TreasuryRegistered {
      scope_id: ScopeId,
      treasury_ref: T::DestinationRef,
      resource_budget: u64,
    },
    TreasuryStatusChanged {
      scope_id: ScopeId,
      active: bool,
    },
    OwnershipTransferred {
      from: T::AccountId,
      to: T::AccountId,
    },
    /// An observation was accepted and the feed updated.
    PriceObserved {
      feed_id: FeedId,
      price: Price,
      observed_at: u64,
      /// Origin ledger block of the ingested event, if any
      source_block: Option<u64>,
    },
    PriceThresholdBreached {
      feed_id: FeedId,
      old_price: Price,
      new_price: Price,
      change_bps: u32,
      observed_at: u64,
    },
    /// A rebalance command was queued for a treasury.
    RebalanceTriggered {
      scope_id: ScopeId,
      treasury_ref: T::DestinationRef,
      feed_id: FeedId,
      price: Price,
    },
    /// The dispatch queue was full; this treasury is not notified of the breach.
    DispatchDropped {
      scope_id: ScopeId,
      feed_id: FeedId,
    },
    DispatchDelivered {
      scope_id: ScopeId,
      feed_id: FeedId,
    },
    DispatchFailed {
      scope_id: ScopeId,
      feed_id: FeedId,
      error: DispatchError,
    },
  }

  #[pallet::error]
  pub enum Error<T> {
    /// The caller does not hold the role the operation requires.
    Unauthorized,
    /// A feed, origin binding or treasury with this id already exists.
    DuplicateEntry,
    /// Unknown feed, origin binding or treasury.
    NotFound,
    /// Threshold above 10_000 bps, null reference or zero resource budget.
    InvalidParameter,
    /// The raw payload could not be decoded into a price report.
    MalformedPayload,
    /// The inbound event topic is not a price update.
    UnsupportedTopic,
    /// `MaxTreasuries` reached.
    TooManyTreasuries,
  }

  #[pallet::call]
  impl<T: Config> Pallet<T> {
    /// Register a price feed bound to `origin_ref` on ledger `origin_scope`.
    ///
    /// The feed starts in bootstrap: its first observation never breaches.
    #[pallet::call_index(0)]
    #[pallet::weight(T::WeightInfo::register_feed())]
    pub fn register_feed(
      origin: OriginFor<T>,
      feed_id: FeedId,
      origin_ref: T::OriginRef,
      origin_scope: ScopeId,
      threshold_bps: u32,
    ) -> DispatchResult {
      Self::authorize(origin, Operation::RegisterFeed)?;
      ensure!(threshold_bps <= MAX_BPS, Error::<T>::InvalidParameter);
      ensure!(
        origin_ref != T::OriginRef::default(),
        Error::<T>::InvalidParameter
      );
      ensure!(
        !Feeds::<T>::contains_key(feed_id),
        Error::<T>::DuplicateEntry
      );
      ensure!(
        !FeedIndex::<T>::contains_key(origin_scope, origin_ref),
        Error::<T>::DuplicateEntry
      );

      Feeds::<T>::insert(
        feed_id,
        PriceFeed {
          origin_ref,
          origin_scope,
          threshold_bps,
          last_price: None,
          last_observed_at: 0,
          last_round: 0,
        },
      );
      FeedIndex::<T>::insert(origin_scope, origin_ref, feed_id);
      FeedCount::<T>::mutate(|count| *count = count.saturating_add(1));

      Self::deposit_event(Event::Subscribed {
        feed_id,
        origin_scope,
        origin_ref,
        threshold_bps,
      });
      Ok(())
    }

    /// Register the treasury living on destination ledger `scope_id`. It starts active.
    #[pallet::call_index(1)]
    #[pallet::weight(T::WeightInfo::register_treasury())]
    pub fn register_treasury(
      origin: OriginFor<T>,
      scope_id: ScopeId,
      treasury_ref: T::DestinationRef,
      resource_budget: u64,
    ) -> DispatchResult {
      Self::authorize(origin, Operation::RegisterTreasury)?;
      ensure!(
        treasury_ref != T::DestinationRef::default(),
        Error::<T>::InvalidParameter
      );
      ensure!(resource_budget > 0, Error::<T>::InvalidParameter);
      ensure!(
        !Treasuries::<T>::contains_key(scope_id),
        Error::<T>::DuplicateEntry
      );

      TreasuryScopes::<T>::try_mutate(|scopes| scopes.try_push(scope_id))
        .map_err(|_| Error::<T>::TooManyTreasuries)?;
      Treasuries::<T>::insert(
        scope_id,
        TreasuryInfo {
          treasury_ref,
          resource_budget,
          active: true,
        },
      );

      Self::deposit_event(Event::TreasuryRegistered {
        scope_id,
        treasury_ref,
        resource_budget,
      });
      Ok(())
    }

    #[pallet::call_index(2)]
    #[pallet::weight(T::WeightInfo::set_treasury_active())]
    pub fn set_treasury_active(
      origin: OriginFor<T>,
      scope_id: ScopeId,
      active: bool,
    ) -> DispatchResult {
      Self::authorize(origin, Operation::SetTreasuryActive)?;
      Treasuries::<T>::try_mutate(scope_id, |maybe| -> DispatchResult {
        let treasury = maybe.as_mut().ok_or(Error::<T>::NotFound)?;
        treasury.active = active;
        Ok(())
      })?;
      Self::deposit_event(Event::TreasuryStatusChanged { scope_id, active });
      Ok(())
    }

    /// Ingest a raw inbound event from an origin ledger.
    ///
    /// Only `AnswerUpdated` events are accepted; the payload is decoded into a price
    /// report and the bound feed is observed with the report's `updatedAt` timestamp.
    #[pallet::call_index(3)]
    #[pallet::weight(T::WeightInfo::observe(T::MaxTreasuries::get()))]
    pub fn observe(
      origin: OriginFor<T>,
      origin_scope: ScopeId,
      origin_ref: T::OriginRef,
      topic: [u8; 32],
      raw_payload: RawPayload,
      observed_at_block: u64,
    ) -> DispatchResult {
      T::ReporterOrigin::ensure_origin(origin)?;
      ensure!(topic == ANSWER_UPDATED_TOPIC, Error::<T>::UnsupportedTopic);
      let report = decode_answer_updated(&raw_payload).map_err(|err| {
        log::debug!(
          target: LOG_TARGET,
          "Rejected payload from scope {:?}: {:?}",
          origin_scope,
          err
        );
        Error::<T>::MalformedPayload
      })?;
      let feed_id =
        FeedIndex::<T>::get(origin_scope, origin_ref).ok_or(Error::<T>::NotFound)?;
      Self::apply_observation(
        feed_id,
        report.price,
        report.updated_at,
        Some(report.round_id),
        Some(observed_at_block),
      )
    }

    /// Observe `price` for a feed directly.
    #[pallet::call_index(4)]
    #[pallet::weight(T::WeightInfo::report_price(T::MaxTreasuries::get()))]
    pub fn report_price(
      origin: OriginFor<T>,
      feed_id: FeedId,
      price: Price,
      observed_at: u64,
    ) -> DispatchResult {
      T::ReporterOrigin::ensure_origin(origin)?;
      Self::apply_observation(feed_id, price, observed_at, None, None)
    }

    #[pallet::call_index(5)]
    #[pallet::weight(T::WeightInfo::transfer_ownership())]
    pub fn transfer_ownership(origin: OriginFor<T>, new_owner: T::AccountId) -> DispatchResult {
      let who = Self::authorize(origin, Operation::TransferOwnership)?;
      if who == new_owner {
        return Ok(());
      }
      Roles::<T>::mutate_exists(&who, |maybe| {
        if let Some(roles) = maybe {
          roles.remove(Role::Owner);
          if roles.is_empty() {
            *maybe = None;
          }
        }
      });
      Roles::<T>::mutate(&new_owner, |roles| {
        roles.insert(Role::Owner);
      });
      Self::deposit_event(Event::OwnershipTransferred {
        from: who,
        to: new_owner,
      });
      Ok(())
    }
  }

  impl<T: Config> Pallet<T> {
    /// Principal the transport presents to destination ledgers.
    pub fn account_id() -> T::AccountId {
      T::PalletId::get().into_account_truncating()
    }

    pub fn has_role(who: &T::AccountId, role: Role) -> bool {
      Roles::<T>::get(who).contains(role)
    }

    pub fn get_feed(feed_id: &FeedId) -> Option<PriceFeedOf<T>> {
      Feeds::<T>::get(feed_id)
    }

    pub fn feed_for_origin(origin_scope: ScopeId, origin_ref: &T::OriginRef) -> Option<FeedId> {
      FeedIndex::<T>::get(origin_scope, origin_ref)
    }

    pub fn treasury_count() -> u32 {
      TreasuryScopes::<T>::decode_len().unwrap_or(0) as u32
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

    /// Updates the feed and, on a breach, queues one command per active treasury.
    ///
    /// The feed update stands regardless of what happens to the queued commands.
    pub(crate) fn apply_observation(
      feed_id: FeedId,
      price: Price,
      observed_at: u64,
      round: Option<u128>,
      source_block: Option<u64>,
    ) -> DispatchResult {
      let observation = Feeds::<T>::try_mutate(
        feed_id,
        |maybe| -> Result<Observation, DispatchError> {
          let feed = maybe.as_mut().ok_or(Error::<T>::NotFound)?;
          let observation = detector::evaluate(feed.last_price, price, feed.threshold_bps);
          feed.last_price = Some(price);
          feed.last_observed_at = observed_at;
          if let Some(round) = round {
            feed.last_round = round;
          }
          Ok(observation)
        },
      )?;

      log::debug!(
        target: LOG_TARGET,
        "Feed {:?} observed {:?} at {:?}: {:?}",
        feed_id,
        price,
        observed_at,
        observation
      );
      Self::deposit_event(Event::PriceObserved {
        feed_id,
        price,
        observed_at,
        source_block,
      });

      if let Observation::Breach {
        old_price,
        new_price,
        change_bps,
      } = observation
      {
        Self::deposit_event(Event::PriceThresholdBreached {
          feed_id,
          old_price,
          new_price,
          change_bps,
          observed_at,
        });
        Self::queue_breach(RebalanceCommand {
          feed_id,
          trigger_price: new_price,
          change_bps,
        });
      }
      Ok(())
    }

    /// Every active treasury gets its own queue entry, regardless of scope.
    fn queue_breach(command: RebalanceCommand) {
      let now = frame_system::Pallet::<T>::block_number();
      let mut queue = DispatchQueue::<T>::get();
      let active: Vec<(ScopeId, TreasuryInfoOf<T>)> = TreasuryScopes::<T>::get()
        .into_iter()
        .filter_map(|scope_id| Treasuries::<T>::get(scope_id).map(|info| (scope_id, info)))
        .filter(|(_, info)| info.active)
        .collect();

      for (scope_id, info) in active {
        let pending = PendingDispatch {
          scope_id,
          treasury_ref: info.treasury_ref,
          resource_budget: info.resource_budget,
          command,
          queued_at: now,
        };
        if queue.try_push(pending).is_err() {
          log::warn!(
            target: LOG_TARGET,
            "Dispatch queue full, dropping command for scope {:?}",
            scope_id
          );
          Self::deposit_event(Event::DispatchDropped {
            scope_id,
            feed_id: command.feed_id,
          });
          continue;
        }
        Self::deposit_event(Event::RebalanceTriggered {
          scope_id,
          treasury_ref: info.treasury_ref,
          feed_id: command.feed_id,
          price: command.trigger_price,
        });
      }
      DispatchQueue::<T>::put(queue);
    }

    /// Hands one command to the transport inside its own storage layer so that a
    /// failing delivery leaves no trace besides the failure event.
    fn deliver(pending: &PendingDispatchOf<T>) {
      let feed_id = pending.command.feed_id;
      let scope_id = pending.scope_id;
      let result = with_storage_layer(|| {
        T::Transport::send(
          scope_id,
          &pending.treasury_ref,
          pending.resource_budget,
          &pending.command,
        )
      });
      match result {
        Ok(()) => Self::deposit_event(Event::DispatchDelivered { scope_id, feed_id }),
        Err(error) => {
          log::warn!(
            target: LOG_TARGET,
            "Dispatch to scope {:?} failed: {:?}",
            scope_id,
            error
          );
          Self::deposit_event(Event::DispatchFailed {
            scope_id,
            feed_id,
            error,
          });
        }
      }
    }
  }
}
