use clap::Subcommand;
use notchfocus_core::update::{mark_prompted, should_prompt};
use notchfocus_core::{Database, UpdateChecker};

#[derive(Subcommand)]
pub enum UpdateAction {
    /// Poll the release endpoint for a newer version
    Check,
}

pub fn run(action: UpdateAction) -> Result<(), Box<dyn std::error::Error>> {
    match action {
        UpdateAction::Check => {
            let runtime = tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()?;
            let checker = UpdateChecker::new();
            let current = env!("CARGO_PKG_VERSION");

            match runtime.block_on(checker.check(current))? {
                Some(release) => {
                    let db = Database::open()?;
                    let now = chrono::Utc::now();
                    if should_prompt(&db, &release, now)? {
                        mark_prompted(&db, &release, now)?;
                        println!("{}", serde_json::to_string_pretty(&release)?);
                    } else {
                        println!(
                            "update {} available (already prompted recently)",
                            release.version
                        );
                    }
                }
                None => println!("up to date"),
            }
        }
    }
    Ok(())
}
