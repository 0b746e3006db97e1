use chrono::NaiveDate;
use clap::Subcommand;

use super::open_engine;

#[derive(Subcommand)]
pub enum HabitAction {
    /// Add a new habit
    Add {
        /// Display name (early-morning names count toward Early Bird)
        name: String,
        /// Icon name
        #[arg(long, default_value = "star")]
        icon: String,
        /// Display color
        #[arg(long, default_value = "#10b981")]
        color: String,
        /// Target streak length in days
        #[arg(long, default_value_t = 30)]
        target_days: u32,
    },
    /// List tracked habits
    List,
    /// Toggle completion for a habit
    Toggle {
        /// Habit id
        id: String,
        /// Day to toggle (defaults to today; past days don't grant XP)
        #[arg(long)]
        date: Option<NaiveDate>,
    },
    /// Remove habits by id
    Remove {
        /// Habit ids
        ids: Vec<String>,
    },
}

pub fn run(action: HabitAction) -> Result<(), Box<dyn std::error::Error>> {
    let mut engine = open_engine()?;

    match action {
        HabitAction::Add {
            name,
            icon,
            color,
            target_days,
        } => {
            let entry = engine.add_habit(&name, &icon, &color, target_days)?;
            println!("{}", serde_json::to_string_pretty(&entry)?);
        }
        HabitAction::List => {
            println!("{}", serde_json::to_string_pretty(engine.tracker().habits())?);
        }
        HabitAction::Toggle { id, date } => {
            let outcome = match date {
                Some(date) => engine.toggle_habit_on(&id, date)?,
                None => engine.toggle_habit(&id)?,
            };
            match outcome {
                Some(outcome) => {
                    println!(
                        "{} -> {} (streak {})",
                        outcome.name,
                        if outcome.completed { "done" } else { "open" },
                        outcome.streak
                    );
                    for event in engine.drain_events() {
                        tracing::debug!(?event, "engine event");
                    }
                    if let Some(unlock) = engine.current_unlock() {
                        println!(
                            "Achievement unlocked: {} (+{} XP)",
                            unlock.name, unlock.xp_reward
                        );
                    }
                }
                None => eprintln!("no habit with id {id}"),
            }
        }
        HabitAction::Remove { ids } => {
            engine.remove_habits(&ids)?;
            println!("removed");
        }
    }
    Ok(())
}
