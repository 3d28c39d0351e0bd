#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

pub mod access;
pub mod ecosystem;
pub mod feeds;
pub mod tokens;

pub use access::*;
pub use ecosystem::*;
pub use feeds::*;
pub use tokens::*;
