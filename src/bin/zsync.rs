//! Thin entry point: parses arguments, initializes logging, and delegates
//! to [`cli::client::run`].

use clap::Parser;
use cli::ClientArgs;
use logging::Verbosity;

fn main() {
    let args = ClientArgs::parse();
    logging::init(Verbosity::from_flags(args.quiet, args.verbose));
    std::process::exit(cli::client::run(args).code());
}
