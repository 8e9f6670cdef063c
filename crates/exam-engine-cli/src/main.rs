//! exam-engine CLI: the user-facing command-line interface.

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "exam-engine", version, about = "Timed exam sessions and scoring")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Take an exam, driven by a script of session events
    Take {
        /// Path to the exam .toml file
        #[arg(long)]
        exam: PathBuf,

        /// Path to the .toml event script
        #[arg(long)]
        script: PathBuf,

        /// Output directory (default: records_dir from config)
        #[arg(long)]
        output: Option<PathBuf>,

        /// Output format: json, html, all
        #[arg(long, default_value = "json")]
        format: String,

        /// Replay against a live countdown instead of the scripted clock
        #[arg(long)]
        live: bool,

        /// Also archive the record to the configured sync store
        #[arg(long)]
        archive: bool,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Validate exam TOML files
    Validate {
        /// Path to exam file or directory
        #[arg(long)]
        exam: PathBuf,
    },

    /// Turn a PDF into an exam file
    Extract {
        /// Path to the PDF document
        #[arg(long)]
        pdf: PathBuf,

        /// Exam title
        #[arg(long)]
        title: String,

        /// Exam description
        #[arg(long, default_value = "")]
        description: String,

        /// Time limit in minutes
        #[arg(long, default_value = "30")]
        time_limit_mins: u64,

        /// Where to write the exam .toml
        #[arg(long)]
        output: PathBuf,
    },

    /// Push, pull, or list revisions in the configured sync store
    Sync {
        #[command(subcommand)]
        action: SyncAction,

        /// Config file path
        #[arg(long, global = true)]
        config: Option<PathBuf>,
    },

    /// Show attempt statistics per exam
    Stats {
        /// Directory of archived attempt records
        #[arg(long)]
        records: PathBuf,

        /// Directory of exam definitions
        #[arg(long)]
        exams: PathBuf,

        /// Only show exams whose title or description contains this term
        #[arg(long)]
        search: Option<String>,

        /// Output format: text, markdown
        #[arg(long, default_value = "text")]
        format: String,
    },

    /// Create starter config and example exam
    Init,
}

#[derive(Subcommand)]
enum SyncAction {
    /// Store an exam definition as a new revision
    Push {
        /// Path to the exam .toml file
        #[arg(long)]
        exam: PathBuf,

        /// Revision message
        #[arg(long, short)]
        message: Option<String>,
    },

    /// Fetch the latest definition of an exam
    Pull {
        /// Exam title
        #[arg(long)]
        title: String,

        /// Where to write the exam .toml
        #[arg(long)]
        output: PathBuf,
    },

    /// List stored revisions
    History,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("exam_engine=info".parse().unwrap()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Take {
            exam,
            script,
            output,
            format,
            live,
            archive,
            config,
        } => commands::take::execute(exam, script, output, format, live, archive, config).await,
        Commands::Validate { exam } => commands::validate::execute(exam),
        Commands::Extract {
            pdf,
            title,
            description,
            time_limit_mins,
            output,
        } => commands::extract::execute(pdf, title, description, time_limit_mins, output).await,
        Commands::Sync { action, config } => match action {
            SyncAction::Push { exam, message } => {
                commands::sync::push(exam, message, config).await
            }
            SyncAction::Pull { title, output } => commands::sync::pull(title, output, config).await,
            SyncAction::History => commands::sync::history(config).await,
        },
        Commands::Stats {
            records,
            exams,
            search,
            format,
        } => commands::stats::execute(records, exams, search, format),
        Commands::Init => commands::init::execute(),
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}
