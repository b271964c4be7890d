use clap::Parser;
use log::info;

use shelter_records::backend::io::cli::{self, Cli};

#[tokio::main]
async fn main() {
    let args = Cli::parse();

    let default_level = if args.quiet { "warn" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level)).init();
    info!("🚀 Starting Shelter Records");

    if let Err(e) = cli::run(args).await {
        std::process::exit(cli::report_error(&e));
    }
}
