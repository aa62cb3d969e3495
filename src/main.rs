use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use repos_maven::commands::validators;
use repos_maven::github::{GhCli, RepositoryEntry};
use repos_maven::pipeline::RepositorySource;
use repos_maven::pom::SelectionMode;
use repos_maven::utils::{ConsoleLogger, parse_repository_list};
use repos_maven::{commands::*, config::Config, constants};
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "repos-maven")]
#[command(about = "Aggregate Maven projects from many GitHub repositories into one build")]
#[command(version)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, global = true, default_value_t = constants::config::DEFAULT_CONFIG_FILE.to_string())]
    config: String,

    /// Show informational progress on stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

/// Options shared by commands that work on a local workspace
#[derive(Args)]
struct WorkspaceArgs {
    /// Workspace root holding <owner>/<name> clones
    #[arg(short, long, default_value = ".")]
    root: PathBuf,

    /// Execute operations in parallel
    #[arg(short, long)]
    parallel: bool,

    /// Maximum operations in flight when running in parallel
    #[arg(long)]
    batch_size: Option<usize>,
}

/// Where a repository list comes from when one is not piped
#[derive(Args)]
struct ListInputArgs {
    /// Read the repository list from a file instead of stdin
    #[arg(short, long)]
    input: Option<String>,

    /// GitHub owner to list when no list is given
    #[arg(long)]
    owner: Option<String>,

    /// Only repositories with this topic when listing
    #[arg(long)]
    topic: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// List an owner's repositories as JSON
    List {
        /// GitHub user or organization
        #[arg(long)]
        owner: Option<String>,

        /// Only repositories carrying this topic
        #[arg(long)]
        topic: Option<String>,

        /// Maximum number of repositories
        #[arg(long)]
        limit: Option<usize>,
    },

    /// Clone listed repositories into <root>/<owner>/<name>
    Clone {
        #[command(flatten)]
        workspace: WorkspaceArgs,

        #[command(flatten)]
        list: ListInputArgs,
    },

    /// Run `mvn validate` in each listed repository
    Validate {
        #[command(flatten)]
        workspace: WorkspaceArgs,

        #[command(flatten)]
        list: ListInputArgs,
    },

    /// Add a GitHub topic to every valid repository in a list
    Tag {
        /// Topic to add
        topic: String,

        /// Read the repository list from a file instead of stdin
        #[arg(short, long)]
        input: Option<String>,

        /// Execute operations in parallel
        #[arg(short, long)]
        parallel: bool,
    },

    /// Synthesize the aggregator POM and align module dependency versions
    Aggregate {
        #[command(flatten)]
        workspace: WorkspaceArgs,

        /// Read the repository list from a file instead of stdin
        #[arg(short, long)]
        input: Option<String>,

        /// Scan the root even when a list is piped
        #[arg(long)]
        scan: bool,

        /// Which packaging types contribute managed dependencies
        #[arg(short, long, value_enum)]
        mode: Option<SelectionMode>,

        /// Skip rewriting module POMs
        #[arg(long)]
        no_rewrite: bool,

        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Align module dependency versions with an existing aggregator POM
    Rewrite {
        #[command(flatten)]
        workspace: WorkspaceArgs,

        /// Hand POMs that cannot be edited structurally to versions:use-dep-version
        #[arg(long)]
        external_fallback: bool,

        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },
}

fn read_list_file(path: &str) -> Result<Vec<RepositoryEntry>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read repository list {}", path))?;
    parse_repository_list(&content)
}

/// The repository list from `--input`, a pipe, or `gh repo list`
async fn input_entries(list: ListInputArgs, config: &Config) -> Result<Vec<RepositoryEntry>> {
    if let Some(path) = &list.input {
        return read_list_file(path);
    }
    if let Some(entries) = read_piped_list()? {
        return Ok(entries);
    }

    let owner = validators::require_owner(list.owner, config.github.owner.as_deref())?;
    let topic = list.topic.or_else(|| config.github.topic.clone());
    GhCli::default()
        .list_repositories(&owner, topic.as_deref(), config.github.limit)
        .await
}

fn build_context(
    mut config: Config,
    workspace: WorkspaceArgs,
    logger: Arc<ConsoleLogger>,
) -> Result<CommandContext> {
    validators::validate_batch_size(workspace.batch_size)?;
    if workspace.parallel {
        config.aggregation.parallel = true;
    }
    if workspace.batch_size.is_some() {
        config.aggregation.batch_size = workspace.batch_size;
    }

    // Maven is started in each repository's directory
    let root = std::path::absolute(&workspace.root)
        .with_context(|| format!("Invalid root {}", workspace.root.display()))?;

    Ok(CommandContext {
        parallel: config.aggregation.parallel,
        config,
        root,
        logger,
    })
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let logger = Arc::new(ConsoleLogger::new(cli.verbose));

    let Some(command) = cli.command else {
        // No command provided, print help
        anyhow::bail!("No command provided. Use --help for usage information.");
    };
    let mut config = Config::load_or_default(&cli.config)?;

    match command {
        Commands::List {
            owner,
            topic,
            limit,
        } => {
            let owner = validators::require_owner(owner, config.github.owner.as_deref())?;
            let topic = topic.or_else(|| config.github.topic.clone());
            let limit = limit.unwrap_or(config.github.limit);

            let context = build_context(
                config,
                WorkspaceArgs {
                    root: PathBuf::from("."),
                    parallel: false,
                    batch_size: None,
                },
                logger,
            )?;
            ListCommand {
                owner,
                topic,
                limit,
                gh: GhCli::default(),
            }
            .execute(&context)
            .await?;
        }
        Commands::Clone { workspace, list } => {
            let entries = input_entries(list, &config).await?;
            let context = build_context(config, workspace, logger)?;
            CloneCommand {
                entries,
                gh: GhCli::default(),
            }
            .execute(&context)
            .await?;
        }
        Commands::Validate { workspace, list } => {
            let entries = input_entries(list, &config).await?;
            let maven = config.maven_tool();
            let context = build_context(config, workspace, logger)?;
            ValidateCommand { entries, maven }.execute(&context).await?;
        }
        Commands::Tag {
            topic,
            input,
            parallel,
        } => {
            validators::validate_topic(&topic)?;
            let entries = match &input {
                Some(path) => read_list_file(path)?,
                None => read_piped_list()?.unwrap_or_default(),
            };
            let context = build_context(
                config,
                WorkspaceArgs {
                    root: PathBuf::from("."),
                    parallel,
                    batch_size: None,
                },
                logger,
            )?;
            TagCommand {
                entries,
                topic,
                gh: GhCli::default(),
            }
            .execute(&context)
            .await?;
        }
        Commands::Aggregate {
            workspace,
            input,
            scan,
            mode,
            no_rewrite,
            json,
        } => {
            validators::validate_source_args(scan, &input)?;
            if let Some(mode) = mode {
                config.aggregation.mode = mode;
            }
            if no_rewrite {
                config.rewrite.enabled = false;
            }

            let source = match (&input, scan) {
                (Some(path), _) => RepositorySource::Entries(read_list_file(path)?),
                (None, true) => RepositorySource::Scan,
                (None, false) => match read_piped_list()? {
                    Some(entries) => RepositorySource::Entries(entries),
                    None => RepositorySource::Scan,
                },
            };
            let context = build_context(config, workspace, logger)?;
            AggregateCommand { source, json }.execute(&context).await?;
        }
        Commands::Rewrite {
            workspace,
            external_fallback,
            json,
        } => {
            if external_fallback {
                config.rewrite.external_fallback = true;
            }
            let context = build_context(config, workspace, logger)?;
            RewriteCommand { json }.execute(&context).await?;
        }
    }

    Ok(())
}
