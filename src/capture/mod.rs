//! Sensor capture: a worker that sweeps the probes and a scheduler that runs
//! it on the configured cadence.

pub mod scheduler;
pub mod worker;
