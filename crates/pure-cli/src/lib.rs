//! `pure-check`: loads JSON models, compiles them with `pure-solver` and
//! reports diagnostics.

pub mod args;
pub mod driver;
pub mod model;
pub mod report;
pub mod tracing_config;
