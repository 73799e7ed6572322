//! Provisioning of sample grading courses.
//!
//! The [`domain`] module holds the run orchestrator and the ports it drives;
//! [`outbound`] supplies file and process backed adapters; [`config`] loads
//! run settings. Roster synthesis itself lives in the `sample_roster` crate.

pub mod config;
pub mod domain;
pub mod outbound;
#[cfg(any(test, feature = "test-support"))]
pub mod test_support;
