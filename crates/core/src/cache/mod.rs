//! Cache synchronization: raw wire types, normalization and the refresh
//! state machine.

pub mod normalize;
pub mod raw;
pub mod refresh;
