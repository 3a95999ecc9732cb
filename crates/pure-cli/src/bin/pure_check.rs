use anyhow::Result;
use clap::Parser;

use pure_cli::args::CliArgs;
use pure_cli::report::Reporter;
use pure_cli::{driver, tracing_config};

/// Exit status when any unit failed to compile.
const EXIT_COMPILE_ERRORS: i32 = 1;

fn main() -> Result<()> {
    // Zero cost unless PURE_LOG or RUST_LOG is set.
    tracing_config::init_tracing();

    let args = CliArgs::parse();
    let outcome = driver::check_models(&args.models)?;
    print!("{}", Reporter::new(args.format, args.print_types).render(&outcome));

    if outcome.has_errors() {
        std::process::exit(EXIT_COMPILE_ERRORS);
    }
    Ok(())
}
