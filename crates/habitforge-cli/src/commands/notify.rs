use clap::Subcommand;

use super::open_engine;

#[derive(Subcommand)]
pub enum NotifyAction {
    /// Show the unlock currently queued for display
    Current,
    /// Dismiss the displayed unlock and promote the next one
    Dismiss,
}

pub fn run(action: NotifyAction) -> Result<(), Box<dyn std::error::Error>> {
    let mut engine = open_engine()?;

    match action {
        NotifyAction::Current => match engine.current_unlock() {
            Some(unlock) => println!("{}", serde_json::to_string_pretty(unlock)?),
            None => println!("nothing to display"),
        },
        NotifyAction::Dismiss => {
            engine.dismiss_unlock();
            match engine.current_unlock() {
                Some(next) => println!("next: {}", next.name),
                None => println!("queue empty"),
            }
        }
    }
    Ok(())
}
