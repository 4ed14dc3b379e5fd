//! Sequential, time-boxed url auctions: each winning bid escrows funds and
//! sets the displayed target url; settlement pays the platform beneficiary.
#![cfg_attr(not(feature = "std"), no_std)]

pub mod contract;
pub mod events;
pub mod external;
pub mod state;
