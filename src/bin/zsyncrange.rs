//! Thin entry point: parses arguments and delegates to
//! [`cli::planner::run`]. No logging is initialized since the planner's
//! only output is the JSON plan on stdout.

use clap::Parser;
use cli::PlannerArgs;

fn main() {
    let args = PlannerArgs::parse();
    std::process::exit(cli::planner::run(args).code());
}
