use clap::Subcommand;
use notchfocus_core::SettingsStore;

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Get a settings value
    Get {
        /// Dot-separated key (e.g. "timers.short_work_min")
        key: String,
    },
    /// Set a settings value (numeric values are clamped into range)
    Set {
        /// Dot-separated key
        key: String,
        /// New value
        value: String,
    },
    /// List all settings values
    List,
    /// Reset settings to defaults
    Reset,
}

pub fn run(action: ConfigAction) -> Result<(), Box<dyn std::error::Error>> {
    match action {
        ConfigAction::Get { key } => {
            let store = SettingsStore::load_or_default();
            match store.get_by_key(&key) {
                Some(value) => println!("{value}"),
                None => {
                    eprintln!("unknown key: {key}");
                    std::process::exit(1);
                }
            }
        }
        ConfigAction::Set { key, value } => {
            let mut store = SettingsStore::load_or_default();
            store.set_by_key(&key, &value)?;
            println!("ok");
        }
        ConfigAction::List => {
            let store = SettingsStore::load_or_default();
            println!("{}", serde_json::to_string_pretty(store.snapshot())?);
        }
        ConfigAction::Reset => {
            let mut store = SettingsStore::load_or_default();
            store.reset_to_default();
            println!("settings reset to defaults");
        }
    }
    Ok(())
}
