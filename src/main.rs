use clap::Parser;
use log::error;
use snafu::ErrorCompat;
use std::path::Path;

mod args;
mod etl;

fn main() {
    let args = args::Args::parse();

    let level = if args.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    match etl::run(Path::new(&args.raw), Path::new(&args.out)) {
        Ok(()) => {}
        Err(e) => {
            error!("{}", e);
            if let Some(bt) = ErrorCompat::backtrace(&e) {
                error!("{}", bt);
            }
            std::process::exit(1);
        }
    }
}
