use std::env;
use std::process::ExitCode;

use villager_odds::cli;

fn main() -> ExitCode {
    let args: Vec<String> = env::args().collect();
    match cli::run_with_args(&args) {
        0 => ExitCode::SUCCESS,
        code => ExitCode::from(u8::try_from(code).unwrap_or(1)),
    }
}
