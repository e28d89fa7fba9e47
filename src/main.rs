use std::env;

use deaddrop::cli;

fn main() {
    let args: Vec<String> = env::args().collect();
    std::process::exit(cli::run_with_args(&args));
}
