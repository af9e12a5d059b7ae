//! Binary entrypoint: runs the autograd walkthrough and prints each step.

use log::error;
use scalargrad::{config, demo};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cfg = config::from_env()?;
    cfg.validate()?;

    let stdout = std::io::stdout();
    if let Err(e) = demo::run(&cfg, &mut stdout.lock()) {
        error!("walkthrough failed: {e}");
        return Err(e.into());
    }
    Ok(())
}
