use codec::{Decode, DecodeWithMemTracking, Encode, MaxEncodedLen};
use scale_info::TypeInfo;
use serde::{Deserialize, Serialize};

/// Identifier of an asset inside one treasury's ledger.
pub type AssetId = u32;

/// Reference to the token an asset entry is backed by.
///
/// - `Native`: the destination ledger's native currency.
/// - `Fungible(u32)`: a fungible token managed on the destination ledger.
/// - `External([u8; 20])`: a token contract address on a foreign ledger.
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
  Ord,
  PartialEq,
  PartialOrd,
  TypeInfo,
  Serialize,
  Deserialize,
)]
pub enum TokenRef {
  #[default]
  Native,
  Fungible(u32),
  External([u8; 20]),
}

impl TokenRef {
  pub fn is_native(&self) -> bool {
    match self {
      TokenRef::Native => true,
      // The zero address conventionally denotes the native currency.
      TokenRef::External(address) => address.iter().all(|b| *b == 0),
      TokenRef::Fungible(_) => false,
    }
  }
}

impl From<u32> for TokenRef {
  fn from(token_id: u32) -> Self {
    TokenRef::Fungible(token_id)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn zero_address_is_native() {
    assert!(TokenRef::Native.is_native());
    assert!(TokenRef::External([0u8; 20]).is_native());
    assert!(!TokenRef::External([7u8; 20]).is_native());
    assert!(!TokenRef::Fungible(1).is_native());
  }

  #[test]
  fn numeric_ids_map_to_fungible() {
    assert_eq!(TokenRef::from(42u32), TokenRef::Fungible(42));
  }
}
