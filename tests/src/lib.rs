//! # addrkit integration tests
//!
//! Cross-module scenarios and randomised property checks over the public
//! surface of `addrkit-core`.

mod algebra;
