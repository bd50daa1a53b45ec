mod commands;
mod output;
mod storage;

#[cfg(test)]
mod commands_test;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use nyoworks_core::NyoError;
use nyoworks_core::ProjectClient;
use nyoworks_core::types::{LeaseConfig, NewDecision, OwnershipMode};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "nyoworks",
    about = "NYOWORKS: project management and task leasing for multi-agent development",
    version
)]
struct Cli {
    /// Project root containing .nyoworks/
    #[arg(long, global = true, default_value = ".", env = "NYOWORKS_PROJECT_DIR")]
    project_dir: PathBuf,

    /// Storage backend: "json" or "sqlite:<path>"
    #[arg(long, global = true, default_value = "json", env = "NYOWORKS_STORAGE")]
    storage: String,

    /// Who may release a lease: "permissive" (anyone) or "strict" (holder only)
    #[arg(long, global = true, default_value = "permissive", env = "NYOWORKS_OWNERSHIP")]
    ownership: OwnershipMode,

    /// Allow claiming ids that are not in the task catalog
    #[arg(long, global = true, env = "NYOWORKS_ALLOW_UNKNOWN_TASKS")]
    allow_unknown_tasks: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a new project in the project directory
    Init {
        /// Project name
        name: String,
        /// Short project code (defaults to the name, uppercased)
        #[arg(long)]
        code: Option<String>,
    },

    /// Show project status
    Status,

    /// Show or change the workflow phase
    Phase {
        /// Set phase
        #[arg(long)]
        set: Option<String>,
    },

    /// Manage tasks and task locks
    #[command(subcommand)]
    Task(TaskCommand),

    /// Manage features
    #[command(subcommand)]
    Feature(FeatureCommand),

    /// Bible documentation
    #[command(subcommand)]
    Bible(BibleCommand),

    /// Manage decisions
    #[command(subcommand)]
    Decision(DecisionCommand),

    /// Print version information
    Version,
}

#[derive(Subcommand)]
enum TaskCommand {
    /// List tasks
    List {
        /// Filter by status
        #[arg(long)]
        status: Option<String>,
        /// Filter by feature
        #[arg(long)]
        feature: Option<String>,
    },
    /// Create task
    Create {
        /// Task title
        title: String,
        #[arg(long)]
        description: Option<String>,
        /// Associated feature
        #[arg(long)]
        feature: Option<String>,
        /// Priority level: low, medium, high, critical
        #[arg(long)]
        priority: Option<String>,
    },
    /// Show one task with its lock
    Show { id: String },
    /// Change a task's status
    SetStatus {
        id: String,
        /// pending, in_progress or completed
        status: String,
    },
    /// Claim a task for 30 minutes
    Claim {
        id: String,
        /// Agent role
        #[arg(long)]
        role: Option<String>,
    },
    /// Release a claimed task
    Release {
        id: String,
        /// Agent role (required in strict ownership mode)
        #[arg(long)]
        role: Option<String>,
    },
    /// Show task locks
    Locks {
        /// Hide expired locks
        #[arg(long)]
        live: bool,
    },
    /// Force unlock a task
    Unlock { id: String },
    /// Remove expired locks
    Prune,
}

#[derive(Subcommand)]
enum FeatureCommand {
    /// List features
    List {
        /// Show only enabled
        #[arg(long)]
        enabled: bool,
    },
    /// Enable feature
    Enable { id: String },
    /// Disable feature
    Disable { id: String },
    /// Show feature info
    Info { id: String },
}

#[derive(Subcommand)]
enum BibleCommand {
    /// Show Bible status
    Status,
    /// Check Bible consistency
    Check,
}

#[derive(Subcommand)]
enum DecisionCommand {
    /// List decisions
    List,
    /// Add decision
    Add {
        id: String,
        title: String,
        description: String,
        rationale: String,
    },
}

/// Logs go to stderr so stdout carries only command output.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> ExitCode {
    init_tracing();

    let cli = Cli::parse();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => report(&err),
    }
}

/// Print a failed command's error and pick the exit status.
fn report(err: &anyhow::Error) -> ExitCode {
    if err
        .downcast_ref::<NyoError>()
        .is_some_and(NyoError::is_storage_failure)
    {
        tracing::error!(error = %err, "Storage failure, command aborted");
    }
    output::error(format!("{:#}", err));
    ExitCode::FAILURE
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let project_dir = cli.project_dir;

    let client = || -> anyhow::Result<commands::Client> {
        let backend = storage::open_backend(&cli.storage, &project_dir)?;
        Ok(ProjectClient::new(
            backend,
            LeaseConfig {
                ownership: cli.ownership,
                require_known_task: !cli.allow_unknown_tasks,
            },
        ))
    };

    match cli.command {
        Commands::Init { name, code } => commands::init(&client()?, &name, code.as_deref()),
        Commands::Status => commands::status(&client()?),
        Commands::Phase { set } => commands::phase(&client()?, set.as_deref()),
        Commands::Task(command) => {
            let client = client()?;
            match command {
                TaskCommand::List { status, feature } => {
                    commands::task_list(&client, status.as_deref(), feature)
                }
                TaskCommand::Create {
                    title,
                    description,
                    feature,
                    priority,
                } => commands::task_create(&client, title, description, feature, priority.as_deref()),
                TaskCommand::Show { id } => commands::task_show(&client, &id),
                TaskCommand::SetStatus { id, status } => {
                    commands::task_set_status(&client, &id, &status)
                }
                TaskCommand::Claim { id, role } => commands::task_claim(&client, &id, role.as_deref()),
                TaskCommand::Release { id, role } => {
                    commands::task_release(&client, &id, role.as_deref())
                }
                TaskCommand::Locks { live } => commands::task_locks(&client, live),
                TaskCommand::Unlock { id } => commands::task_unlock(&client, &id),
                TaskCommand::Prune => commands::task_prune(&client),
            }
        }
        Commands::Feature(command) => match command {
            FeatureCommand::List { enabled } => commands::feature_list(&client()?, enabled),
            FeatureCommand::Enable { id } => commands::feature_enable(&client()?, &id),
            FeatureCommand::Disable { id } => commands::feature_disable(&client()?, &id),
            FeatureCommand::Info { id } => commands::feature_info(&project_dir, &id),
        },
        Commands::Bible(command) => match command {
            BibleCommand::Status => commands::bible_status(&project_dir),
            BibleCommand::Check => commands::bible_check(&project_dir),
        },
        Commands::Decision(command) => match command {
            DecisionCommand::List => commands::decision_list(&client()?),
            DecisionCommand::Add {
                id,
                title,
                description,
                rationale,
            } => commands::decision_add(
                &client()?,
                NewDecision {
                    id,
                    title,
                    description,
                    rationale,
                },
            ),
        },
        Commands::Version => {
            println!("nyoworks {}", env!("CARGO_PKG_VERSION"));
            println!("Project management and task leasing for multi-agent development");
            Ok(())
        }
    }
}
