use std::path::PathBuf;

use claim_toolbox::claims::{ClaimBuilder, PointsEncoding, Strictness};
use claim_toolbox::SnapshotSource;
use color_eyre::Report;
use snapshot_client::{Config, SnapshotClient};
use structopt::StructOpt;

#[derive(StructOpt)]
#[structopt(rename_all = "kebab-case")]
pub enum Claims {
    Build(BuildClaims),
}

impl Claims {
    pub fn exec(self) -> Result<(), Report> {
        match self {
            Claims::Build(build) => build.exec(),
        }
    }
}

#[derive(StructOpt)]
#[structopt(rename_all = "kebab-case")]
pub struct BuildClaims {
    /// Voting space (namespace) to build claims for.
    #[structopt(long)]
    space: String,

    /// GraphQL endpoint of the voting hub.
    #[structopt(long)]
    endpoint: Option<String>,

    /// Ignore proposals created before this unix timestamp (seconds).
    #[structopt(long, default_value = "0")]
    created_after: i64,

    /// Points encoding policy frozen for this claim epoch
    /// (scaled-floor | truncate). Changing it invalidates previously
    /// issued proofs.
    #[structopt(long, default_value = "scaled-floor")]
    points_encoding: PointsEncoding,

    /// Abort the whole run on the first failing group instead of
    /// skipping it.
    #[structopt(long)]
    strict: bool,

    /// Write the JSON artifact here instead of stdout.
    #[structopt(long)]
    output: Option<PathBuf>,
}

impl BuildClaims {
    pub fn exec(self) -> Result<(), Report> {
        let mut config = Config::new(self.space, self.created_after);
        if let Some(endpoint) = self.endpoint {
            config = config.with_endpoint(endpoint);
        }

        let source = SnapshotSource::new(SnapshotClient::new(config));
        let strictness = if self.strict {
            Strictness::Strict
        } else {
            Strictness::Lenient
        };

        let claim_set = ClaimBuilder::new(source, self.points_encoding)
            .with_strictness(strictness)
            .build()?;

        let json = serde_json::to_string_pretty(&claim_set)?;
        match self.output {
            Some(path) => std::fs::write(path, json)?,
            None => println!("{json}"),
        }

        Ok(())
    }
}
