use clap::{Parser, ValueEnum};
use std::path::PathBuf;

/// CLI arguments for `pure-check`.
#[derive(Parser, Debug)]
#[command(
    name = "pure-check",
    version,
    about = "Type-check Pure models: generic inference, overloads and lambdas"
)]
pub struct CliArgs {
    /// Diagnostic output format.
    #[arg(long, value_enum, default_value_t = OutputFormat::Text, ignore_case = true)]
    pub format: OutputFormat,

    /// Also print the inferred return type of every compiled function.
    #[arg(long = "print-types", alias = "printTypes")]
    pub print_types: bool,

    /// JSON model files; each holds one source unit or a list of them.
    #[arg(required = true, value_name = "MODEL.json")]
    pub models: Vec<PathBuf>,
}

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

#[cfg(test)]
#[path = "../tests/args_tests.rs"]
mod tests;
