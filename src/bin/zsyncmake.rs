//! Thin entry point: parses arguments, initializes logging, and delegates
//! to [`cli::generator::run`].

use clap::Parser;
use cli::GeneratorArgs;
use logging::Verbosity;

fn main() {
    let args = GeneratorArgs::parse();
    logging::init(Verbosity::from_flags(false, args.verbose));
    std::process::exit(cli::generator::run(args).code());
}
