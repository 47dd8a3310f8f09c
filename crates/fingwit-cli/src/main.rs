//! Fingwit - fingerprint login helper
//!
//! Decides whether fingerprint authentication applies to the current
//! invocation and, when it does, drives one verification session against
//! fprintd. The process exit code carries the authentication result.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::{debug, info, warn};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use fingwit_cli::config::FingwitConfig;
use fingwit_cli::context::snapshot_context;
use fingwit_cli::host::{exit_code_for_outcome, pam_code, DeferCode, StderrConversation};
use fingwit_core::{
    CapabilityProbes, Classifier, SessionContext, SessionOutcome, SessionPolicy, SessionProbes,
    Verdict,
};
use fingwit_verify::{list_devices, run_session, FprintdBackend, FprintdProbes, HostProbes};

#[derive(Parser)]
#[command(name = "fingwit")]
#[command(about = "Fingerprint login decision and verification helper", long_about = None)]
#[command(version)]
struct Cli {
    /// Path to the configuration file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose diagnostics
    #[arg(long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Authenticate a user; the exit code carries the result
    Authenticate {
        /// Identity to verify
        username: String,

        /// Requesting service name (falls back to PAM_SERVICE)
        #[arg(short, long)]
        service: Option<String>,

        /// Verification attempts before giving up
        #[arg(long)]
        max_tries: Option<u32>,

        /// Per-attempt timeout in seconds
        #[arg(long)]
        timeout: Option<u64>,

        /// Result code when verification is skipped or unavailable
        #[arg(long, value_enum)]
        defer_code: Option<DeferCode>,
    },

    /// Print the facts the classifier would see, and its verdict
    Inspect {
        /// Identity to inspect (defaults to the invoking user)
        username: Option<String>,

        /// Requesting service name (falls back to PAM_SERVICE)
        #[arg(short, long)]
        service: Option<String>,
    },

    /// List the fingerprint devices fprintd reports
    Devices,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config_path = FingwitConfig::resolve_path(cli.config.clone());
    let mut config = match FingwitConfig::load_or_default(&config_path) {
        Ok(config) => config,
        Err(err) => {
            eprintln!("fingwit: unusable config {}: {}", config_path.display(), err);
            FingwitConfig::default()
        }
    };
    config.debug = config.debug || cli.debug;

    init_logging(config.debug);

    let code = match cli.command {
        Commands::Authenticate {
            username,
            service,
            max_tries,
            timeout,
            defer_code,
        } => handle_authenticate(&config, username, service, max_tries, timeout, defer_code).await,
        Commands::Inspect { username, service } => {
            match handle_inspect(&config, username, service).await {
                Ok(()) => 0,
                Err(err) => {
                    eprintln!("fingwit: {err:#}");
                    1
                }
            }
        }
        Commands::Devices => match handle_devices().await {
            Ok(()) => 0,
            Err(err) => {
                eprintln!("fingwit: {err:#}");
                1
            }
        },
    };

    std::process::exit(code);
}

/// Initialize tracing to stderr; stdout stays clean for command output
fn init_logging(debug: bool) {
    let directives = if debug {
        "fingwit=debug,fingwit_core=debug,fingwit_verify=debug,fingwit_cli=debug"
    } else {
        "fingwit=info,fingwit_core=info,fingwit_verify=info,fingwit_cli=info"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| directives.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

/// Run the authenticate flow; every failure folds into a result code
async fn handle_authenticate(
    config: &FingwitConfig,
    username: String,
    service: Option<String>,
    max_tries: Option<u32>,
    timeout: Option<u64>,
    defer_code: Option<DeferCode>,
) -> i32 {
    let defer = defer_code.unwrap_or(config.defer_code);

    let policy = match SessionPolicy::new(
        max_tries.unwrap_or(config.max_tries),
        Duration::from_secs(timeout.unwrap_or(config.timeout_secs)),
        config.debug,
    ) {
        Ok(policy) => policy,
        Err(err) => {
            warn!(error = %err, "rejecting invocation policy");
            return defer.exit_code();
        }
    };

    let ctx = match snapshot_context(&username, service) {
        Ok(ctx) => ctx,
        Err(err) => {
            warn!(error = %err, "no usable target identity");
            return pam_code::USER_UNKNOWN;
        }
    };

    debug!(
        username = ctx.username(),
        service = ?ctx.service(),
        parent = ?ctx.parent_process(),
        remote = ctx.remote_indicators(),
        interactive = ctx.interactive_stdin(),
        "captured invocation context"
    );

    let classifier = Classifier::new(config.classifier.clone());
    let verdict = classifier
        .decide(&ctx, &HostProbes::new(), &FprintdProbes)
        .await;

    let reason = match verdict {
        Verdict::Proceed => {
            info!(username = ctx.username(), "proceeding with fingerprint verification");
            return verify(&ctx, &policy, defer).await;
        }
        Verdict::Skip(reason) => reason,
    };

    info!(username = ctx.username(), %reason, "skipping fingerprint verification");
    defer.exit_code()
}

/// Drive one verification session and map its outcome
async fn verify(ctx: &SessionContext, policy: &SessionPolicy, defer: DeferCode) -> i32 {
    let conv = StderrConversation;

    let backend = match FprintdBackend::connect().await {
        Ok(backend) => backend,
        Err(err) => {
            warn!(error = %err, "cannot reach fprintd");
            return exit_code_for_outcome(&SessionOutcome::DeviceUnavailable, defer);
        }
    };

    let outcome = run_session(&backend, &conv, ctx.username(), policy).await;
    info!(username = ctx.username(), %outcome, "verification session concluded");
    exit_code_for_outcome(&outcome, defer)
}

/// Print every fact the classifier consults, then the verdict
async fn handle_inspect(
    config: &FingwitConfig,
    username: Option<String>,
    service: Option<String>,
) -> Result<()> {
    let username = match username {
        Some(username) => username,
        None => current_username()?,
    };

    let ctx = snapshot_context(&username, service)?;
    let host = HostProbes::new();
    let fprintd = FprintdProbes;

    println!("Invocation context:");
    println!("  Username:           {}", ctx.username());
    println!("  Service:            {}", ctx.service().unwrap_or("(none)"));
    println!("  Parent process:     {}", ctx.parent_process().unwrap_or("(unknown)"));
    println!("  Remote indicators:  {}", ctx.remote_indicators());
    println!("  Interactive stdin:  {}", ctx.interactive_stdin());

    println!("Host facts:");
    println!(
        "  Active session:     {}",
        describe_fact(host.active_session_for(ctx.username()).await)
    );
    println!(
        "  Encrypted home:     {}",
        describe_fact(host.encrypted_home(ctx.username()).await)
    );
    println!(
        "  Service ready:      {}",
        describe_fact(fprintd.service_ready().await)
    );
    println!(
        "  Enrolled prints:    {}",
        describe_fact(fprintd.enrollment_present(ctx.username()).await)
    );

    let classifier = Classifier::new(config.classifier.clone());
    match classifier.decide(&ctx, &host, &fprintd).await {
        Verdict::Proceed => println!("Verdict: proceed with fingerprint verification"),
        Verdict::Skip(reason) => println!("Verdict: skip ({reason})"),
    }

    Ok(())
}

/// Render a probed fact, keeping probe failures visible
fn describe_fact(fact: fingwit_core::Result<bool>) -> String {
    match fact {
        Ok(value) => value.to_string(),
        Err(err) => format!("unknown ({err})"),
    }
}

/// Resolve the invoking user from the environment
fn current_username() -> Result<String> {
    std::env::var("USER")
        .or_else(|_| std::env::var("LOGNAME"))
        .map_err(|_| anyhow::anyhow!("no username given and USER is unset"))
}

/// Print the devices fprintd reports
async fn handle_devices() -> Result<()> {
    let devices = list_devices().await?;
    if devices.is_empty() {
        println!("No fingerprint devices present");
        return Ok(());
    }

    println!("Fingerprint devices:");
    for device in devices {
        println!("  {} (scan type: {})", device.name, device.scan_type);
    }
    Ok(())
}
