// src/main.rs

use devbin::{cli, logging};

#[tokio::main]
async fn main() {
    let args = cli::parse();
    let log_level = args.log_level;
    if let Err(err) = logging::init_logging(log_level) {
        eprintln!("devbin: cannot initialise logging: {err}");
    }
    if let Err(err) = devbin::run(args).await {
        eprintln!("devbin error: {err}");
        std::process::exit(err.exit_code());
    }
}
