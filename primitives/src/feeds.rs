//! Price feed primitives: identifiers, the inbound price payload codec and the
//! basis-point change metric used by threshold detection.

use alloc::{vec, vec::Vec};
use alloy_primitives::{I256, U256, aliases::U80};
use alloy_sol_types::{
  SolType,
  sol_data::{Int, Uint},
};
use codec::{Decode, DecodeWithMemTracking, Encode, MaxEncodedLen};
use hex_literal::hex;
use scale_info::TypeInfo;
use sp_arithmetic::{Rounding, helpers_128bit::multiply_by_rational_with_rounding};

use crate::ecosystem::params::BPS_DENOMINATOR;

/// Stable 32-byte feed identifier (e.g. the hash of `"ETH_USD"`).
pub type FeedId = [u8; 32];

/// Identifier of an origin or destination ledger (chain id).
pub type ScopeId = u64;

/// Signed price in 8-decimal fixed point.
pub type Price = i128;

/// Topic of the aggregator `AnswerUpdated(int256,uint256,uint256)` log.
pub const ANSWER_UPDATED_TOPIC: [u8; 32] =
  hex!("0559884fd3a460db3073b7fc896cc77986f16e378210ded43186175bf646fc5f");

const SELECTOR_LEN: usize = 4;
const WORD_LEN: usize = 32;

/// Minimum length of an `AnswerUpdated` payload: selector plus four words.
pub const ANSWER_UPDATED_PAYLOAD_LEN: usize = SELECTOR_LEN + 4 * WORD_LEN;

/// `(uint80 roundId, int256 answer, uint256 startedAt, uint256 updatedAt)`
type AnswerUpdatedData = (Uint<80>, Int<256>, Uint<256>, Uint<256>);

/// Decoded round data carried by an `AnswerUpdated` payload.
#[derive(
  Clone,
  Copy,
  Debug,
  Decode,
  DecodeWithMemTracking,
  Encode,
  Eq,
  MaxEncodedLen,
  PartialEq,
  TypeInfo,
)]
pub struct PriceReport {
  pub round_id: u128,
  pub price: Price,
  pub started_at: u64,
  pub updated_at: u64,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum PayloadError {
  /// Fewer bytes than selector plus four ABI words.
  TooShort,
  /// A word does not fit the integer type it is decoded into.
  OutOfRange,
}

fn ensure_round_id_fits(round_id: u128) -> Result<(), PayloadError> {
  if round_id >> 80 == 0 {
    Ok(())
  } else {
    Err(PayloadError::OutOfRange)
  }
}

/// Decodes `selector ++ abi.encode(uint80 roundId, int256 answer, uint256 startedAt,
/// uint256 updatedAt)`. Trailing bytes are ignored.
pub fn decode_answer_updated(raw: &[u8]) -> Result<PriceReport, PayloadError> {
  let words = raw
    .get(SELECTOR_LEN..ANSWER_UPDATED_PAYLOAD_LEN)
    .ok_or(PayloadError::TooShort)?;
  // validation rejects dirty high bits in the uint80 word, which decodes to a u128
  let (round_id, answer, started_at, updated_at) =
    AnswerUpdatedData::abi_decode_validate(words).map_err(|_| PayloadError::OutOfRange)?;
  let round_id: u128 = round_id.to::<u128>();
  ensure_round_id_fits(round_id)?;
  Ok(PriceReport {
    round_id,
    price: i128::try_from(answer).map_err(|_| PayloadError::OutOfRange)?,
    started_at: u64::try_from(started_at).map_err(|_| PayloadError::OutOfRange)?,
    updated_at: u64::try_from(updated_at).map_err(|_| PayloadError::OutOfRange)?,
  })
}

/// Encodes a report in the `AnswerUpdated` payload layout with a zero selector.
pub fn encode_answer_updated(report: &PriceReport) -> Result<Vec<u8>, PayloadError> {
  ensure_round_id_fits(report.round_id)?;
  let data = (
    U80::from(report.round_id),
    I256::try_from(report.price).map_err(|_| PayloadError::OutOfRange)?,
    U256::from(report.started_at),
    U256::from(report.updated_at),
  );
  let mut raw = vec![0u8; SELECTOR_LEN];
  raw.extend_from_slice(&AnswerUpdatedData::abi_encode(&data));
  Ok(raw)
}

/// `floor(10_000 * |new - old| / |old|)`, saturating at `u32::MAX`.
///
/// A move away from a zero reference price saturates, an unchanged zero is 0.
pub fn change_bps(old: Price, new: Price) -> u32 {
  let delta = new.abs_diff(old);
  let reference = old.unsigned_abs();
  if delta == 0 {
    return 0;
  }
  if reference == 0 {
    return u32::MAX;
  }
  multiply_by_rational_with_rounding(delta, BPS_DENOMINATOR as u128, reference, Rounding::Down)
    .map(|bps| u32::try_from(bps).unwrap_or(u32::MAX))
    .unwrap_or(u32::MAX)
}
