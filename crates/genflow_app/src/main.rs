//! Genflow command-line driver.

mod config;
mod logging;
mod render;
mod session;

use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context};
use clap::{Parser, Subcommand, ValueEnum};
use genflow_core::pipeline::ReconciliationChoice;
use genflow_core::{ComparisonView, GenerationJob, InfluenceLevel, Platform, SubjectKey};
use genflow_engine::{Channel, NegotiatedService, Negotiator, ReqwestChannel};
use genflow_logging::{genflow_info, genflow_warn};

use crate::config::{mask_token, AppConfig, DEFAULT_CONFIG_FILE, TOKEN_VAR};
use crate::logging::LogDestination;
use crate::session::Session;

#[derive(Parser)]
#[command(author, version, about = "Genflow - content generation pipeline driver")]
struct Cli {
    /// RON configuration file
    #[arg(long, default_value = DEFAULT_CONFIG_FILE)]
    config: PathBuf,
    /// Log at debug level; logs also go to the terminal unless --log says otherwise
    #[arg(short, long)]
    verbose: bool,
    /// Where log lines go
    #[arg(long, value_enum)]
    log: Option<LogDestination>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Generate a post, check it for AI phrasing and humanize it if needed
    Generate {
        #[arg(long)]
        topic: String,
        /// Target keyword; repeat for several
        #[arg(long = "keyword")]
        keywords: Vec<String>,
        /// reddit, quora, medium, linkedin, facebook, instagram or github
        #[arg(long)]
        platform: Platform,
        /// subtle, moderate or strong
        #[arg(long, default_value = "moderate")]
        influence: InfluenceLevel,
        #[arg(long)]
        brand_voice: Option<String>,
        /// Image reference; required for instagram
        #[arg(long)]
        image: Option<String>,
        /// Settle the comparison without asking
        #[arg(long, value_enum)]
        auto_keep: Option<KeepChoice>,
    },
    /// Start a video for a subject's report and wait for it
    Video {
        #[arg(long)]
        subject: String,
        /// JSON report to render; `{}` when omitted
        #[arg(long)]
        report: Option<PathBuf>,
    },
    /// Run a scoring computation and show its progress
    Score {
        #[arg(long)]
        subject: String,
        #[arg(long, default_value = "{}")]
        params: String,
    },
    /// Show the configured token and probe both channels
    Check,
}

impl Cli {
    fn log_destination(&self) -> LogDestination {
        match (self.log, self.verbose) {
            (Some(destination), _) => destination,
            (None, true) => LogDestination::Both,
            (None, false) => LogDestination::File,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum KeepChoice {
    Original,
    Humanized,
}

impl From<KeepChoice> for ReconciliationChoice {
    fn from(choice: KeepChoice) -> Self {
        match choice {
            KeepChoice::Original => ReconciliationChoice::Original,
            KeepChoice::Humanized => ReconciliationChoice::Humanized,
        }
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let _ = dotenvy::dotenv();
    logging::initialize(cli.log_destination(), cli.verbose);

    let mut config = AppConfig::load(&cli.config)?;
    config.apply_env(|name| std::env::var(name).ok());
    config.validate()?;

    match cli.command {
        Command::Check => run_check(&config),
        Command::Generate {
            topic,
            keywords,
            platform,
            influence,
            brand_voice,
            image,
            auto_keep,
        } => {
            let mut job = GenerationJob::new(topic, keywords, platform);
            job.influence_level = influence;
            job.brand_voice_id = brand_voice;
            job.image_ref = image;
            let mut session = open_session(&config)?;
            let output = session.run_generation(job, |comparison| match auto_keep {
                Some(choice) => choice.into(),
                None => prompt_choice(comparison),
            })?;
            println!("\n{output}");
            Ok(())
        }
        Command::Video { subject, report } => {
            let report = match report {
                Some(path) => std::fs::read_to_string(&path)
                    .with_context(|| format!("reading report {path:?}"))?,
                None => "{}".to_string(),
            };
            let mut session = open_session(&config)?;
            let url = session.run_video(SubjectKey::new(subject), report)?;
            println!("{url}");
            Ok(())
        }
        Command::Score { subject, params } => {
            let mut session = open_session(&config)?;
            session.run_score(SubjectKey::new(subject), params)
        }
    }
}

fn negotiator(config: &AppConfig) -> anyhow::Result<Negotiator> {
    let settings = config.channel_settings();
    let token = config.api_token.as_deref();
    let primary = ReqwestChannel::rpc(&config.rpc_base_url, token, &settings)
        .context("configuring the rpc channel")?;
    let fallback = match &config.http_base_url {
        Some(url) => Some(Box::new(
            ReqwestChannel::http(url, token, &settings).context("configuring the http channel")?,
        ) as Box<dyn Channel>),
        None => None,
    };
    Ok(Negotiator::new(Box::new(primary), fallback))
}

fn open_session(config: &AppConfig) -> anyhow::Result<Session> {
    if config.api_token.is_none() {
        genflow_warn!("{} is not set; calls go out unauthenticated", TOKEN_VAR);
    }
    let service = NegotiatedService::new(negotiator(config)?);
    genflow_info!(
        "Session against {} (fallback {})",
        config.rpc_base_url,
        config.http_base_url.as_deref().unwrap_or("none")
    );
    Ok(Session::new(config.settings(), Arc::new(service)))
}

fn run_check(config: &AppConfig) -> anyhow::Result<()> {
    match &config.api_token {
        Some(token) => println!("token: {}", mask_token(token)),
        None => println!("token: not configured (set {TOKEN_VAR})"),
    }

    let negotiator = negotiator(config)?;
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("starting the probe runtime")?;

    let mut channels = vec![(negotiator.primary(), config.rpc_base_url.as_str())];
    match (negotiator.fallback(), config.http_base_url.as_deref()) {
        (Some(channel), Some(url)) => channels.push((channel, url)),
        _ => println!("http: no fallback configured"),
    }

    let mut reachable = 0;
    for (channel, url) in channels {
        match runtime.block_on(channel.probe()) {
            Ok(()) => {
                reachable += 1;
                println!("{}: {url} ok", channel.label());
            }
            Err(err) => println!("{}: {url} unreachable ({err})", channel.label()),
        }
    }
    if reachable == 0 {
        bail!("no channel is reachable");
    }
    Ok(())
}

fn prompt_choice(comparison: &ComparisonView) -> ReconciliationChoice {
    println!("\n--- original ---\n{}", comparison.original);
    println!(
        "\n--- humanized ({} phrases removed) ---\n{}\n",
        comparison.phrases_removed_count, comparison.humanized
    );
    let stdin = io::stdin();
    loop {
        print!("Keep [o]riginal or [h]umanized? ");
        let _ = io::stdout().flush();
        let mut answer = String::new();
        match stdin.lock().read_line(&mut answer) {
            // End of input keeps what was generated.
            Ok(0) | Err(_) => return ReconciliationChoice::Original,
            Ok(_) => {}
        }
        match answer.trim().to_ascii_lowercase().as_str() {
            "o" | "original" => return ReconciliationChoice::Original,
            "h" | "humanized" => return ReconciliationChoice::Humanized,
            _ => continue,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("genflow").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn log_destination_follows_flags() {
        assert_eq!(parse(&["check"]).log_destination(), LogDestination::File);
        assert_eq!(parse(&["-v", "check"]).log_destination(), LogDestination::Both);
        assert_eq!(
            parse(&["--log", "terminal", "check"]).log_destination(),
            LogDestination::Terminal
        );
        assert_eq!(
            parse(&["-v", "--log", "file", "check"]).log_destination(),
            LogDestination::File
        );
    }
}
