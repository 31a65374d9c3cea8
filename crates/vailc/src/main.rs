//! vailc - the Vail-to-editor-script compiler.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use vail_analyze::Policy;
use vail_emit::Format;
use vailc::BuildOptions;

#[derive(Parser, Debug)]
#[command(name = "vailc")]
#[command(about = "Compile Vail sources to editor script")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Transpile the given files, or every source file under the current
    /// directory if none are given
    Build {
        paths: Vec<PathBuf>,

        /// Output format: vim, sexp, or pretty
        #[arg(long, default_value = "vim")]
        emit: Format,

        /// Disable an analyzer rule by name (repeatable)
        #[arg(long = "disable", value_name = "RULE")]
        disable: Vec<String>,
    },
}

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "vailc=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    match cli.command {
        Command::Build {
            paths,
            emit,
            disable,
        } => {
            let mut policy = Policy::all();
            if emit == Format::Pretty {
                // The canonical printer reproduces the source as written;
                // rewrites would make formatting non-idempotent.
                policy
                    .set(vail_analyze::analyze::policy::CONVERT_UNDERSCORE, false)
                    .expect("known rule");
            }
            for rule in &disable {
                if let Err(err) = policy.set(rule, false) {
                    eprintln!("{err}");
                    std::process::exit(2);
                }
            }

            let errors = vailc::build(BuildOptions {
                paths,
                format: emit,
                policy,
            })
            .await;
            if !errors.is_empty() {
                for line in &errors {
                    eprintln!("{line}");
                }
                std::process::exit(1);
            }
        }
    }
}
