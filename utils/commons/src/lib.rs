//! Shared types for the auction platform contracts.
#![cfg_attr(not(feature = "std"), no_std)]

pub use crate::{authority::*, errors::*, types::*};
use concordium_std::*;

mod authority;
mod errors;
mod types;
