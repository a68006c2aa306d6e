mod claims;

use color_eyre::Report;
use structopt::StructOpt;
use tracing_subscriber::EnvFilter;

#[derive(StructOpt)]
#[structopt(rename_all = "kebab-case")]
enum Cli {
    /// Build and export the per-group claim set.
    Claims(claims::Claims),
}

impl Cli {
    fn exec(self) -> Result<(), Report> {
        match self {
            Cli::Claims(claims) => claims.exec(),
        }
    }
}

fn main() -> Result<(), Report> {
    color_eyre::install()?;
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    Cli::from_args().exec()
}
