//! firetop CLI entry point.

use firetop_lib::cli::{self, Cli};
use firetop_lib::core::Result;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse_args();
    cli::execute(cli).await
}
