mod books;
mod download;
mod terminal;

use books::Books;
use clap::ArgAction;
use download::Download;

#[derive(Debug, clap::Parser)]
#[command(
    name = "bible-vault",
    about = "Downloads an entire bible as interlinked markdown files"
)]
pub struct Cli {
    /// Verbosity (--verbose, repeat for more)
    #[arg(long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

impl Cli {
    pub fn run(self) -> anyhow::Result<()> {
        Self::setup_logging(self.verbose);
        self.command.run()
    }

    fn setup_logging(verbosity: u8) {
        use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

        let level = match verbosity {
            0 => tracing::Level::WARN,
            1 => tracing::Level::INFO,
            2 => tracing::Level::DEBUG,
            _ => tracing::Level::TRACE,
        };

        let filter = tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into());

        let fmt_layer = tracing_subscriber::fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(false)
            .with_thread_names(false)
            .with_line_number(false);

        tracing_subscriber::registry()
            .with(filter)
            .with(fmt_layer)
            .init();
    }
}

#[derive(Debug, clap::Subcommand)]
pub enum Command {
    /// Download every chapter of a version into the vault
    ///
    /// Chapters that already exist on disk are skipped, so an interrupted
    /// download can be resumed by running the same command again.
    Download(Download),

    /// List the books and chapter counts that will be downloaded
    Books(Books),
}

impl Command {
    fn run(self) -> anyhow::Result<()> {
        match self {
            Self::Download(command) => command.run()?,
            Self::Books(command) => command.run()?,
        }
        Ok(())
    }
}
