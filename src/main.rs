use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use repo_tree::app::{LoggingProxy, TreeController};
use repo_tree::config::ViewerConfig;
use repo_tree::core::GithubContentProvider;
use tracing_subscriber::EnvFilter;

/// Browse a GitHub repository as a lazily loaded tree.
#[derive(Parser, Debug)]
#[command(name = "repo-tree", version, about)]
struct Cli {
    /// Read and write the configuration in this directory instead of the
    /// platform default
    #[arg(long, global = true)]
    config_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the tree of a repository
    Tree {
        /// Repository owner (defaults to the configured owner)
        owner: Option<String>,
        /// Repository name (defaults to the configured repository)
        repo: Option<String>,
        /// Expand this directory and its ancestors; may be repeated
        #[arg(long = "expand", value_name = "PATH")]
        expand: Vec<String>,
        /// Prefix printed before directory names
        #[arg(long)]
        marker: Option<String>,
        /// Print the visible rows as JSON instead of an indented listing
        #[arg(long)]
        json: bool,
    },
    /// List the repositories the access token can see
    Repos,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = ViewerConfig::load(cli.config_dir.as_deref())?;
    let provider = build_provider(&config)?;

    match cli.command {
        Command::Tree {
            owner,
            repo,
            expand,
            marker,
            json,
        } => {
            let owner = owner.unwrap_or_else(|| config.default_owner.clone());
            let repo = repo.unwrap_or_else(|| config.default_repo.clone());

            let mut options = config.serialize_options();
            if let Some(marker) = marker {
                options.directory_marker = marker;
            }

            let controller =
                TreeController::new(Arc::new(provider), LoggingProxy).with_serialize_options(options);
            controller.load_root(&owner, &repo).await?;
            for path in &expand {
                if !controller.reveal(path).await? {
                    tracing::warn!("Could not fully expand '{}'", path);
                }
            }

            if json {
                println!("{}", serde_json::to_string_pretty(&controller.view())?);
            } else {
                print!("{}", controller.serialize());
            }
        }
        Command::Repos => {
            let repositories = provider
                .list_repositories()
                .await
                .context("Failed to list repositories")?;
            for repository in repositories {
                let visibility = if repository.private { "private" } else { "public" };
                println!(
                    "{}/{}\t{}\t{}",
                    repository.owner,
                    repository.name,
                    visibility,
                    repository.description.as_deref().unwrap_or("")
                );
            }
        }
    }

    Ok(())
}

fn build_provider(config: &ViewerConfig) -> Result<GithubContentProvider> {
    let token = config.access_token();
    if token.is_none() {
        tracing::info!(
            "{} is not set; using unauthenticated requests",
            config.token_env_var
        );
    }
    GithubContentProvider::new(
        &config.api_base_url,
        token,
        &config.user_agent,
        config.request_timeout(),
    )
}
