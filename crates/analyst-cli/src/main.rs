//! Command-line interface for company analyses
//!
//! # Usage
//!
//! ```bash
//! # Point at the analysis server (defaults to http://localhost:8000)
//! export ANALYST_API_BASE="http://localhost:8000"
//!
//! # Submit a report, follow its progress and show the results
//! analyst submit Initech ./initech-10k.pdf --peer Acme --peer Globex --chat
//!
//! # Pick up an existing job
//! analyst watch 3f2a77
//! analyst results 3f2a77 --format markdown
//! analyst ask 3f2a77 "What drives the margin decline?"
//! ```

mod console;

use analyst_client::{
    ClientConfig, Formatter, FormatterFactory, HttpClient, JobId, JobPoller, Navigation,
    OutputFormat, PollPolicy, QueryChannel, ReportType, ResultRenderer, Step,
    StepProgressTracker, SubmitRequest, load_results,
};
use analyst_utils::{AppConfig, ConfigError, init_tracing, init_tracing_with};
use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use console::ConsoleSink;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

#[derive(Parser, Debug)]
#[command(name = "analyst")]
#[command(about = "Submit company reports for analysis and explore the results", long_about = None)]
struct Args {
    /// Analysis server base URL (overrides ANALYST_API_BASE)
    #[arg(long, global = true)]
    api_base: Option<String>,

    /// Output style: terminal or markdown
    #[arg(long, global = true, default_value = "terminal")]
    format: OutputFormat,

    /// Delay between status checks, in milliseconds
    #[arg(long, global = true, value_name = "MS")]
    poll_interval: Option<u64>,

    /// Stop following a job after this many failed status checks in a row
    #[arg(long, global = true, value_name = "N")]
    max_failures: Option<u32>,

    /// Order the server runs its steps in, when it differs from the default
    #[arg(long, global = true, value_enum, value_delimiter = ',', value_name = "STEPS")]
    step_order: Vec<StepArg>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Upload a report and follow the analysis to its results
    Submit {
        /// Company to analyze
        company: String,

        /// Path to the report document (PDF, TXT or HTML)
        report: PathBuf,

        /// Peer company to compare against (up to three)
        #[arg(long = "peer", value_name = "COMPANY")]
        peers: Vec<String>,

        /// Kind of report
        #[arg(long, value_enum, default_value_t = ReportKind::Annual)]
        report_type: ReportKind,

        /// Print the job id and exit instead of following progress
        #[arg(long)]
        no_follow: bool,

        /// Continue with follow-up questions once results are shown
        #[arg(long)]
        chat: bool,
    },

    /// Follow a running job until it finishes
    Watch { job_id: String },

    /// Show the results of a completed job
    Results { job_id: String },

    /// Ask a single question about a completed job
    Ask { job_id: String, question: String },

    /// Ask questions about a completed job interactively
    Chat { job_id: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum ReportKind {
    Annual,
    Quarterly,
}

impl From<ReportKind> for ReportType {
    fn from(kind: ReportKind) -> Self {
        match kind {
            ReportKind::Annual => ReportType::Annual,
            ReportKind::Quarterly => ReportType::Quarterly,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum StepArg {
    News,
    Fundamentals,
    Peers,
    Signal,
}

impl From<StepArg> for Step {
    fn from(step: StepArg) -> Self {
        match step {
            StepArg::News => Step::News,
            StepArg::Fundamentals => Step::Fundamentals,
            StepArg::Peers => Step::Peers,
            StepArg::Signal => Step::Signal,
        }
    }
}

impl Args {
    fn client_config(&self) -> anyhow::Result<ClientConfig> {
        let mut policy = match self.max_failures {
            Some(max) => PollPolicy::bounded(max, 2.0),
            None => PollPolicy::default(),
        };
        if let Some(ms) = self.poll_interval {
            policy.interval = Duration::from_millis(ms);
        }

        let mut builder = ClientConfig::builder().with_env_api_base().poll_policy(policy);
        if let Some(api_base) = &self.api_base {
            builder = builder.api_base(api_base);
        }
        Ok(builder.build()?)
    }

    fn tracker(&self) -> StepProgressTracker {
        if self.step_order.is_empty() {
            StepProgressTracker::new()
        } else {
            let order = self.step_order.iter().copied().map(Step::from).collect();
            StepProgressTracker::with_order(order)
        }
    }
}

struct App {
    client: Arc<HttpClient>,
    config: ClientConfig,
    tracker: StepProgressTracker,
    formatter: Box<dyn Formatter>,
}

impl App {
    /// Follow a job and report where the flow goes next
    async fn watch(&self, job_id: JobId, company_hint: Option<&str>) -> Navigation {
        let mut poller =
            JobPoller::new(self.client.clone(), job_id, self.config.poll_policy.clone())
                .with_tracker(self.tracker.clone());
        if let Some(company) = company_hint {
            poller = poller.with_company_hint(company);
        }

        let mut sink = ConsoleSink::new(self.formatter.as_ref());
        let next = poller.run(&mut sink).await;
        info!("Next view: {next}");
        next
    }

    async fn show_results(&self, job_id: &JobId) -> anyhow::Result<()> {
        let result = load_results(self.client.as_ref(), job_id).await?;
        let view = ResultRenderer::new().render(&result);
        println!("{}", self.formatter.format_results(&view));
        Ok(())
    }

    fn channel(&self, job_id: JobId) -> QueryChannel {
        QueryChannel::new(self.client.clone(), job_id)
    }

    async fn submit(
        &self,
        request: SubmitRequest,
        follow: bool,
        chat: bool,
    ) -> anyhow::Result<()> {
        let job_id = self.client.submit(&request).await?;
        println!("Submitted job {job_id}");
        if !follow {
            return Ok(());
        }

        match self.watch(job_id, Some(request.company_name.as_str())).await {
            Navigation::Results(job_id) => {
                self.show_results(&job_id).await?;
                if chat {
                    console::chat(&mut self.channel(job_id), self.formatter.as_ref()).await?;
                }
                Ok(())
            }
            other => anyhow::bail!("Analysis did not complete; start again from {other}"),
        }
    }
}

fn parse_job_id(raw: &str) -> anyhow::Result<JobId> {
    JobId::parse(raw)
        .with_context(|| format!("No job id given; start from {}", Navigation::Submission))
}

/// Fall back to defaults when the environment holds a bad value
fn resolve_app_config(
    loaded: Result<AppConfig, ConfigError>,
) -> (AppConfig, Option<ConfigError>) {
    let (app_config, error) = match loaded {
        Ok(app_config) => (app_config, None),
        Err(e) => (AppConfig::default(), Some(e)),
    };
    (app_config.with_app_name("analyst-cli"), error)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let (app_config, env_error) = resolve_app_config(AppConfig::from_env());
    match env_error {
        None => init_tracing_with(&app_config),
        Some(e) => {
            init_tracing();
            warn!("Ignoring environment configuration: {e}");
        }
    }

    let config = args.client_config()?;
    let client = Arc::new(HttpClient::new(&config)?);

    info!(
        api_base = %client.base_url(),
        environment = %app_config.environment,
        production = app_config.is_production(),
        "Starting analyst-cli"
    );

    let app = App {
        client,
        config,
        tracker: args.tracker(),
        formatter: FormatterFactory::create(args.format),
    };

    match args.command {
        Command::Submit {
            company,
            report,
            peers,
            report_type,
            no_follow,
            chat,
        } => {
            let request = peers
                .into_iter()
                .fold(SubmitRequest::new(company, report), |request, peer| {
                    request.add_peer(peer)
                })
                .with_report_type(report_type.into());
            app.submit(request, !no_follow, chat).await
        }
        Command::Watch { job_id } => match app.watch(parse_job_id(&job_id)?, None).await {
            Navigation::Results(job_id) => app.show_results(&job_id).await,
            other => anyhow::bail!("Analysis did not complete; start again from {other}"),
        },
        Command::Results { job_id } => app.show_results(&parse_job_id(&job_id)?).await,
        Command::Ask { job_id, question } => {
            let mut channel = app.channel(parse_job_id(&job_id)?);
            console::ask_once(&mut channel, app.formatter.as_ref(), &question).await;
            Ok(())
        }
        Command::Chat { job_id } => {
            let mut channel = app.channel(parse_job_id(&job_id)?);
            console::chat(&mut channel, app.formatter.as_ref()).await
        }
    }
}
