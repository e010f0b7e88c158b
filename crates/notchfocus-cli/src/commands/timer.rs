use clap::{Subcommand, ValueEnum};
use notchfocus_core::{
    Database, Event, FocusSession, PersistedSession, Preset, ProgressStore, SettingsStore,
};

const SESSION_KEY: &str = "focus_session";

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum PresetArg {
    Short,
    Long,
}

impl From<PresetArg> for Preset {
    fn from(arg: PresetArg) -> Self {
        match arg {
            PresetArg::Short => Preset::Short,
            PresetArg::Long => Preset::Long,
        }
    }
}

#[derive(Subcommand)]
pub enum TimerAction {
    /// Start a fresh session run
    Start {
        #[arg(long, value_enum, default_value = "short")]
        preset: PresetArg,
    },
    /// Pause the running interval
    Pause,
    /// Resume a paused interval
    Resume,
    /// Reset to idle
    Reset,
    /// Advance from a completed interval into the next one
    Next,
    /// Advance the session clock by N seconds
    Tick {
        #[arg(long, default_value_t = 1)]
        seconds: u32,
    },
    /// Print the current state as JSON
    Status,
    /// Run the 1 Hz tick loop, printing events as they fire
    Watch,
}

fn load_session(db: &Database) -> Result<FocusSession, Box<dyn std::error::Error>> {
    let settings = SettingsStore::load_or_default();
    let progress = ProgressStore::open()?;
    let services = crate::feedback::collaborators();
    let session = match db.kv_get(SESSION_KEY)? {
        Some(json) => match serde_json::from_str::<PersistedSession>(&json) {
            Ok(persisted) => FocusSession::restore(persisted, settings, progress, services),
            Err(_) => FocusSession::new(settings, progress, services),
        },
        None => FocusSession::new(settings, progress, services),
    };
    Ok(session)
}

fn save_session(db: &Database, session: &FocusSession) -> Result<(), Box<dyn std::error::Error>> {
    let json = serde_json::to_string(&session.persisted())?;
    db.kv_set(SESSION_KEY, &json)?;
    Ok(())
}

/// Print the command's event, or the current snapshot when the call was
/// a no-op from the current state.
fn print_outcome(
    event: Option<Event>,
    session: &FocusSession,
) -> Result<(), Box<dyn std::error::Error>> {
    match event {
        Some(event) => println!("{}", serde_json::to_string_pretty(&event)?),
        None => println!("{}", serde_json::to_string_pretty(&session.snapshot())?),
    }
    Ok(())
}

pub fn run(action: TimerAction) -> Result<(), Box<dyn std::error::Error>> {
    let db = Database::open()?;
    let mut session = load_session(&db)?;

    match action {
        TimerAction::Start { preset } => {
            print_outcome(session.start_session(preset.into()), &session)?;
        }
        TimerAction::Pause => {
            print_outcome(session.pause_session(), &session)?;
        }
        TimerAction::Resume => {
            print_outcome(session.resume_session(), &session)?;
        }
        TimerAction::Reset => {
            print_outcome(session.reset_session(), &session)?;
        }
        TimerAction::Next => {
            print_outcome(session.start_next_session(), &session)?;
        }
        TimerAction::Tick { seconds } => {
            for _ in 0..seconds {
                if let Some(event) = session.tick() {
                    println!("{}", serde_json::to_string(&event)?);
                }
            }
            println!("{}", serde_json::to_string_pretty(&session.snapshot())?);
        }
        TimerAction::Status => {
            println!("{}", serde_json::to_string_pretty(&session.snapshot())?);
        }
        TimerAction::Watch => {
            println!("{}", serde_json::to_string_pretty(&session.snapshot())?);
            let runtime = tokio::runtime::Builder::new_current_thread()
                .enable_time()
                .build()?;
            runtime.block_on(async {
                let mut interval = tokio::time::interval(std::time::Duration::from_secs(1));
                interval.tick().await; // first tick completes immediately
                loop {
                    interval.tick().await;
                    if let Some(event) = session.tick() {
                        match serde_json::to_string(&event) {
                            Ok(json) => println!("{json}"),
                            Err(e) => eprintln!("error: {e}"),
                        }
                    }
                    if let Err(e) = save_session(&db, &session) {
                        eprintln!("error: {e}");
                    }
                }
            });
        }
    }

    save_session(&db, &session)?;
    Ok(())
}
