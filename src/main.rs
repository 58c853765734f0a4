use clap::Parser;

use subprefs_lib::bootstrap::init_tracing_subscriber;
use subprefs_lib::cli::{run, Cli};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing_subscriber()?;

    let output = run(cli).await?;
    println!("{output}");
    Ok(())
}
