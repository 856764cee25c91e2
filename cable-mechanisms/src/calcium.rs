//! Intracellular calcium handling.

mod pool;

pub use pool::{AttachError, CalciumGlobals, CalciumPool, CalciumPoolConfig, FARADAY};
