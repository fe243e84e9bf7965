use anyhow::Result;
use clap::{Parser, Subcommand};

use change_audit::audit::{ActorResolver, AnonymousActor, CommitHook, FixedActor, SystemClock};
use change_audit::cli::{
    handle_audit_command, handle_book_command, handle_car_command, handle_config_command,
    AuditCommands, BookCommands, CarCommands, ConfigCommands,
};
use change_audit::config::{AuditPaths, Settings};
use change_audit::logging::{init_logging, LogLevel};
use change_audit::models::default_registry;
use change_audit::storage::Store;
use change_audit::AuditResult;

#[derive(Parser)]
#[command(
    name = "change-audit",
    version,
    about = "Catalogue with a field-level audit trail of every change",
    long_about = "change-audit keeps a small book and car catalogue and records every \
                  create, update and delete of an auditable entity as an immutable \
                  audit entry, committed atomically with the change itself. Sensitive \
                  values are masked in the recorded diffs."
)]
struct Cli {
    /// Identity recorded as "changed by" (default: settings default_actor, else Anonymous)
    #[arg(long, global = true, env = "CHANGE_AUDIT_ACTOR")]
    actor: Option<String>,

    /// Log level override (trace, debug, info, warn, error)
    #[arg(long, global = true)]
    log_level: Option<LogLevel>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Book management commands
    #[command(subcommand)]
    Book(BookCommands),

    /// Car management commands
    #[command(subcommand)]
    Car(CarCommands),

    /// Audit log commands
    #[command(subcommand)]
    Audit(AuditCommands),

    /// Show or change settings
    #[command(subcommand)]
    Config(ConfigCommands),
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let paths = AuditPaths::new()?;
    let mut settings = Settings::load_or_create(&paths)?;

    let mut log_settings = settings.log.clone();
    if let Some(level) = cli.log_level {
        log_settings.level = level;
    }
    init_logging(&log_settings)?;

    let actor = cli.actor;
    match cli.command {
        Commands::Config(cmd) => handle_config_command(&paths, &mut settings, cmd)?,
        Commands::Book(cmd) => with_store(&paths, &settings, actor, |store, hook| {
            handle_book_command(store, hook, cmd)
        })?,
        Commands::Car(cmd) => with_store(&paths, &settings, actor, |store, hook| {
            handle_car_command(store, hook, cmd)
        })?,
        Commands::Audit(cmd) => {
            with_store(&paths, &settings, actor, |store, _| handle_audit_command(store, cmd))?
        }
    }

    Ok(())
}

/// Open the store and build the commit hook for one command
fn with_store<F>(paths: &AuditPaths, settings: &Settings, actor: Option<String>, run: F) -> Result<()>
where
    F: FnOnce(&Store, &CommitHook<'_>) -> AuditResult<()>,
{
    let registry = default_registry(settings)?;
    let store = Store::open(paths)?;

    let actor: Box<dyn ActorResolver> = match actor.or_else(|| settings.default_actor.clone()) {
        Some(actor) => Box::new(FixedActor::new(actor)),
        None => Box::new(AnonymousActor),
    };
    let hook = CommitHook::new(&registry, actor.as_ref(), &SystemClock);

    run(&store, &hook)?;
    Ok(())
}
