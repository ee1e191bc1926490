use anyhow::Result;
use clap::Args;
use curio_api::{ApiConfig, QueryClient};

#[derive(Args)]
pub struct BrowseArgs {
    /// Facet to seed the browse screen with (Title, Person, Culture,
    /// Technique, Medium)
    #[arg(long, default_value = "Title")]
    field: String,

    /// Search value for the seed lookup; without it the screen starts empty
    #[arg(long)]
    value: Option<String>,
}

pub fn execute(args: BrowseArgs) -> Result<()> {
    let config = ApiConfig::load()?;
    let client = QueryClient::new(config)?;

    let seed = args
        .value
        .filter(|v| !v.trim().is_empty())
        .map(|v| (args.field, v));

    curio_api::tui::run(Box::new(client), seed)
}
