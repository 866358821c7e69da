//! Benchmark support crate for polytwin.
//!
//! Provides seeded fixtures and parameter labels for the Criterion
//! benchmarks covering model fitting, batch prediction and sweeps.

pub mod fixtures;
pub mod params;
