#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Configuration loading and frame orchestration behind the `gridcaster` binary.

mod config;
mod simulation;

pub use self::config::GameConfig;
pub use self::simulation::Simulation;
