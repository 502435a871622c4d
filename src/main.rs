use anyhow::Result;
use clap::Parser;
use coopdx_launcher::commands::{self, Config, InstallArgs, Options};
use std::path::PathBuf;

/// coopdx-launcher - sm64coopdx version manager
///
/// Download sm64coopdx builds from GitHub releases, keep several of them
/// side by side, and launch the one you want.
///
/// Examples:
///   coopdx-launcher releases                      # Show published builds
///   coopdx-launcher install --asset <FILE.zip>    # Install from the newest release
///   coopdx-launcher launch sm64coopdx_v1.0.4_OpenGL
#[derive(Parser, Debug)]
#[command(author, version = env!("LAUNCHER_VERSION"), about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Versions root directory (also via COOPDX_ROOT)
    #[arg(
        long = "root",
        short = 'r',
        env = "COOPDX_ROOT",
        value_name = "PATH",
        global = true
    )]
    pub root: Option<PathBuf>,

    /// GitHub API URL (also via COOPDX_API_URL; defaults to https://api.github.com)
    #[arg(long = "api-url", value_name = "URL", global = true)]
    pub api_url: Option<String>,

    /// Repository publishing the builds (also via COOPDX_REPO)
    #[arg(long = "repo", value_name = "OWNER/REPO", global = true)]
    pub repo: Option<String>,

    /// Request timeout in seconds
    #[arg(
        long = "timeout",
        value_name = "SECONDS",
        global = true,
        value_parser = clap::value_parser!(u64).range(1..)
    )]
    pub timeout: Option<u64>,
}

#[derive(clap::Subcommand, Debug)]
enum Commands {
    /// List published releases and their assets
    Releases {
        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// Print the latest release notes
    Changelog,

    /// Download and install a release asset
    Install(InstallCmd),

    /// List installed versions
    List {
        /// Include directories that are missing the game executable
        #[arg(long, short = 'a')]
        all: bool,

        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// Rename an installed version
    Rename {
        #[arg(value_name = "OLD")]
        old: String,
        #[arg(value_name = "NEW")]
        new: String,
    },

    /// Delete an installed version
    Delete {
        #[arg(value_name = "NAME")]
        name: String,

        /// Skip the confirmation prompt
        #[arg(long, short = 'y')]
        yes: bool,
    },

    /// Start an installed version
    Launch {
        #[arg(value_name = "NAME")]
        name: String,
    },

    /// Open a version folder in the file manager
    Open {
        #[arg(value_name = "NAME")]
        name: String,
    },
}

#[derive(clap::Args, Debug)]
struct InstallCmd {
    /// Release name or tag (defaults to the newest release)
    #[arg(value_name = "RELEASE")]
    release: Option<String>,

    /// Asset file to install, required when the release has several
    #[arg(long, short = 'a', value_name = "FILE")]
    asset: Option<String>,

    /// Folder name for the installed version (defaults to the asset name)
    #[arg(long, short = 'n', value_name = "NAME")]
    name: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let cli = Cli::parse();

    let options = Options {
        root: cli.root,
        api_url: cli.api_url,
        repo: cli.repo,
        timeout: cli.timeout,
    };
    let config = Config::new(coopdx_launcher::runtime::RealRuntime, options)?;

    match cli.command {
        Commands::Releases { json } => commands::releases(config, json).await?,
        Commands::Changelog => commands::changelog(config).await?,
        Commands::Install(cmd) => {
            let args = InstallArgs {
                release: cmd.release,
                asset: cmd.asset,
                name: cmd.name,
            };
            commands::install(config, args).await?
        }
        Commands::List { all, json } => commands::list(config, all, json)?,
        Commands::Rename { old, new } => commands::rename(config, &old, &new)?,
        Commands::Delete { name, yes } => commands::delete(config, &name, yes)?,
        Commands::Launch { name } => commands::launch(config, &name)?,
        Commands::Open { name } => commands::open(config, &name)?,
    }
    Ok(())
}
