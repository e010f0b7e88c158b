use clap::Subcommand;
use notchfocus_core::ProgressStore;

#[derive(Subcommand)]
pub enum StatsAction {
    /// Today's focus minutes, completed sessions, and streak
    Today,
    /// Daily history, newest first
    History {
        #[arg(long, default_value_t = 14)]
        days: usize,
    },
}

pub fn run(action: StatsAction) -> Result<(), Box<dyn std::error::Error>> {
    let store = ProgressStore::open()?;

    match action {
        StatsAction::Today => {
            println!("{}", serde_json::to_string_pretty(store.daily_stats())?);
        }
        StatsAction::History { days } => {
            let mut records = store.records()?;
            records.truncate(days);
            println!("{}", serde_json::to_string_pretty(&records)?);
        }
    }
    Ok(())
}
