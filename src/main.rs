use std::path::PathBuf;

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use covdelta::cli;
use covdelta::github;
use covdelta::ingest::Sources;
use covdelta::model::{DeltaGlyphs, ReportOptions};

/// covdelta: LCOV coverage delta reports as pull request comments.
///
/// Options fall back to the environment variables GitHub Actions sets for
/// action inputs, so the binary can run as an action step unchanged.
#[derive(Parser)]
#[command(name = "covdelta", version, about)]
struct Cli {
    #[command(flatten)]
    inputs: Inputs,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct Inputs {
    /// Current-branch LCOV file.
    #[arg(
        long,
        global = true,
        env = "INPUT_LCOV-FILE",
        default_value = "./coverage/lcov.info"
    )]
    lcov_file: PathBuf,

    /// Base-branch LCOV file. Without it no delta is shown.
    #[arg(long, global = true, env = "INPUT_LCOV-BASE")]
    lcov_base: Option<PathBuf>,

    /// Label shown in the summary row and used in the comment marker.
    #[arg(long, global = true, env = "INPUT_APP-NAME")]
    app_name: Option<String>,

    /// Monorepo root; each package's lcov.info / lcov-base.info is found
    /// below it.
    #[arg(long, global = true, env = "INPUT_MONOREPO-BASE-PATH")]
    monorepo_base_path: Option<PathBuf>,

    /// Absolute prefix stripped from paths recorded in the LCOV files.
    #[arg(long, global = true, env = "GITHUB_WORKSPACE", default_value = "")]
    workspace: String,

    /// Always drop per-line links.
    #[arg(long, global = true)]
    condense: bool,

    /// Emoji used in the delta cell.
    #[arg(long, global = true, value_enum, default_value_t = DeltaGlyphs::Check)]
    glyphs: DeltaGlyphs,
}

impl Inputs {
    fn sources(&self) -> Sources {
        Sources {
            lcov_file: self.lcov_file.clone(),
            lcov_base: self.lcov_base.clone().filter(|p| !p.as_os_str().is_empty()),
            monorepo_root: self
                .monorepo_base_path
                .clone()
                .filter(|p| !p.as_os_str().is_empty()),
        }
    }

    fn base_path(&self) -> String {
        self.monorepo_base_path
            .as_ref()
            .map(|p| p.to_string_lossy().into_owned())
            .unwrap_or_default()
    }

    fn app_name(&self) -> Option<String> {
        self.app_name.clone().filter(|a| !a.is_empty())
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Print the comment body to stdout.
    Render {
        /// Repository as owner/repo.
        #[arg(long, env = "GITHUB_REPOSITORY")]
        repository: String,

        /// Head commit SHA used in file links.
        #[arg(long, env = "GITHUB_SHA")]
        commit: String,

        /// Branch the pull request merges into.
        #[arg(long, env = "GITHUB_BASE_REF", default_value = "main")]
        base: String,

        /// Branch the pull request comes from.
        #[arg(long, env = "GITHUB_HEAD_REF", default_value = "")]
        head: String,
    },

    /// Post or update the coverage comment on the current pull request.
    Comment {
        /// Token used for the GitHub API (falls back to GITHUB_TOKEN).
        #[arg(long, env = "INPUT_GITHUB-TOKEN", hide_env_values = true)]
        github_token: Option<String>,
    },
}

fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let inputs = &cli.inputs;
    let sources = inputs.sources();

    let output = match cli.command {
        Commands::Render {
            repository,
            commit,
            base,
            head,
        } => {
            let options = ReportOptions {
                repository,
                commit,
                workspace: github::workspace_prefix(&inputs.workspace),
                base_path: inputs.base_path(),
                head,
                base,
                app_name: inputs.app_name(),
                condense: inputs.condense,
                glyphs: inputs.glyphs,
            };
            cli::cmd_render(&sources, &options)?
        }
        Commands::Comment { github_token } => {
            let ctx = github::Context::from_env(github_token)?;
            let options = ctx.report_options(
                &inputs.workspace,
                &inputs.base_path(),
                inputs.app_name(),
                inputs.condense,
                inputs.glyphs,
            );
            cli::cmd_comment(&sources, &ctx, &options)?
        }
    };

    print!("{output}");
    Ok(())
}
