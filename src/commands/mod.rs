pub mod analyze;
pub mod heuristics;
#[cfg(feature = "server")]
pub mod serve;
pub mod utils;

#[cfg(test)]
#[path = "../commands_test.rs"]
mod commands_test;
