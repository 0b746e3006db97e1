use clap::Subcommand;

use super::open_engine;

#[derive(Subcommand)]
pub enum StatsAction {
    /// Today's overview: completions, rates, streaks
    Overview,
}

pub fn run(action: StatsAction) -> Result<(), Box<dyn std::error::Error>> {
    let engine = open_engine()?;

    match action {
        StatsAction::Overview => {
            let overview = engine.overview();
            println!("{}", serde_json::to_string_pretty(&overview)?);
        }
    }
    Ok(())
}
