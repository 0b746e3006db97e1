use clap::Subcommand;
use habitforge_core::{AchievementId, CATALOG};
use serde::Serialize;

use super::open_engine;

#[derive(Subcommand)]
pub enum AchievementsAction {
    /// List all achievements with progress
    List,
    /// Show one achievement
    Show {
        /// Achievement id (e.g. "century_club")
        id: AchievementId,
    },
}

#[derive(Serialize)]
struct AchievementView {
    id: AchievementId,
    name: &'static str,
    description: &'static str,
    rarity: &'static str,
    xp_reward: i64,
    progress: u32,
    max_progress: u32,
    percentage: f64,
    unlocked: bool,
}

pub fn run(action: AchievementsAction) -> Result<(), Box<dyn std::error::Error>> {
    let engine = open_engine()?;

    let view = |id: AchievementId| -> Option<AchievementView> {
        let def = CATALOG.iter().find(|d| d.id == id)?;
        let progress = engine.profile().achievement_progress(id)?;
        Some(AchievementView {
            id,
            name: def.name,
            description: def.description,
            rarity: def.rarity.label(),
            xp_reward: def.rarity.xp_reward(),
            progress: progress.progress,
            max_progress: progress.max_progress,
            percentage: progress.percentage,
            unlocked: progress.unlocked,
        })
    };

    match action {
        AchievementsAction::List => {
            let views: Vec<_> = AchievementId::ALL.into_iter().filter_map(view).collect();
            println!("{}", serde_json::to_string_pretty(&views)?);
        }
        AchievementsAction::Show { id } => match view(id) {
            Some(v) => println!("{}", serde_json::to_string_pretty(&v)?),
            None => eprintln!("no achievement with id {id}"),
        },
    }
    Ok(())
}
