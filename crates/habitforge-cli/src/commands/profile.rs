use clap::Subcommand;
use habitforge_core::AchievementId;
use serde::Serialize;

use super::open_engine;

#[derive(Subcommand)]
pub enum ProfileAction {
    /// Show level, XP, and streak
    Show,
    /// Grant or deduct XP
    AddXp {
        /// XP delta (negative values deduct)
        #[arg(allow_hyphen_values = true)]
        amount: i64,
    },
    /// Record a daily check-in
    CheckIn,
    /// Unlock an achievement directly
    Unlock {
        /// Achievement id (e.g. "first_step")
        id: AchievementId,
    },
    /// Add progress toward an achievement
    Progress {
        /// Achievement id
        id: AchievementId,
        /// Progress delta
        #[arg(allow_hyphen_values = true)]
        delta: i64,
    },
    /// Reset the profile to first-launch defaults
    Reset,
}

#[derive(Serialize)]
struct ProfileView<'a> {
    level: u32,
    current_xp: i64,
    next_level_xp: i64,
    title: &'a str,
    streak: u32,
    xp_today: i64,
    total_completions: u64,
    early_bird_count: u32,
}

pub fn run(action: ProfileAction) -> Result<(), Box<dyn std::error::Error>> {
    let mut engine = open_engine()?;

    match action {
        ProfileAction::Show => {
            let profile = engine.profile();
            let view = ProfileView {
                level: profile.level,
                current_xp: profile.current_xp,
                next_level_xp: profile.next_level_xp(),
                title: &profile.current_title,
                streak: profile.streak,
                xp_today: profile.xp_today,
                total_completions: profile.total_completions,
                early_bird_count: profile.early_bird_count,
            };
            println!("{}", serde_json::to_string_pretty(&view)?);
        }
        ProfileAction::AddXp { amount } => {
            let applied = engine.add_xp(amount)?;
            let profile = engine.profile();
            println!(
                "level {} ({}/{} XP){}",
                applied.level,
                profile.current_xp,
                profile.next_level_xp(),
                if applied.leveled_up {
                    " -- level up!"
                } else if applied.leveled_down {
                    " -- level lost"
                } else {
                    ""
                }
            );
        }
        ProfileAction::CheckIn => {
            engine.check_in()?;
            println!("streak: {} days", engine.profile().streak);
        }
        ProfileAction::Unlock { id } => {
            engine.unlock_achievement(id)?;
        }
        ProfileAction::Progress { id, delta } => {
            engine.update_progress(id, delta)?;
        }
        ProfileAction::Reset => {
            engine.reset()?;
            println!("profile reset");
        }
    }
    Ok(())
}
