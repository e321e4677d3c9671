use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing::info;

use doc_quiz::{client, logging, server, Config, Quiz};

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// TOML config file (defaults to ./doc-quiz.toml when present)
    #[arg(short, long, global = true, env = "DOC_QUIZ_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the HTTP API server
    Serve {
        /// Address to listen on
        #[arg(short, long)]
        bind: Option<SocketAddr>,

        /// Program that runs the generation script
        #[arg(long)]
        generator: Option<String>,

        /// Generation script passed to the program
        #[arg(long)]
        script: Option<PathBuf>,
    },
    /// Open the terminal client
    Client {
        /// Base URL of the API server
        #[arg(short, long)]
        api_url: Option<String>,
    },
    /// Play a question file offline
    Play {
        /// JSON file to load the questions from
        #[arg(short, long)]
        questions: PathBuf,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let mut config = Config::load(args.config.as_deref()).context("Failed to load config")?;

    match args.command {
        Command::Serve {
            bind,
            generator,
            script,
        } => {
            if let Some(bind) = bind {
                config.server.bind = bind;
            }
            if let Some(generator) = generator {
                config.generator.program = generator;
            }
            if let Some(script) = script {
                config.generator.script = Some(script);
            }

            logging::init_stderr(logging::DEFAULT_FILTER);
            server::run(config).await?;
        }
        Command::Client { api_url } => {
            if let Some(api_url) = api_url {
                config.client.api_url = api_url;
            }

            logging::init_file(&config.client.log_file, logging::DEFAULT_FILTER)
                .with_context(|| format!("Failed to open log file {}", config.client.log_file.display()))?;
            client::run(&config.client).await?;
        }
        Command::Play { questions } => {
            logging::init_file(&config.client.log_file, logging::DEFAULT_FILTER)
                .with_context(|| format!("Failed to open log file {}", config.client.log_file.display()))?;

            let quiz = Quiz::from_json(&questions)
                .with_context(|| format!("Failed to load questions from {}", questions.display()))?;
            info!(count = quiz.questions().len(), "loaded questions");
            quiz.run().await?;
        }
    }

    Ok(())
}
