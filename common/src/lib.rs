//! # addrkit-common
//!
//! Family-independent building blocks shared by the address algebra:
//! bit arithmetic over single segment values, the error taxonomy and
//! the batch-operation configuration.

pub mod bits;
pub mod config;
pub mod error;
pub mod family;
