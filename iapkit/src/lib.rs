//! Distribution crate for the Swift package. Re-exports [`iapkit_core`].

pub use iapkit_core::*;
