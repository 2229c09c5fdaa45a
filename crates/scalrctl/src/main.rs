use anyhow::Result;
use clap::{CommandFactory, Parser};
use clap_complete::{generate, shells};
use scalr_core::{Config, Context};
use std::time::Duration;
use tracing::{debug, error, info, trace};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod cli;
mod commands;
mod connection;
mod error;
mod output;

use cli::{Cli, Commands};
use connection::ConnectionManager;
use error::ScalrCtlError;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing based on verbosity level
    init_tracing(cli.verbose);

    // Load configuration from specified path or default location
    let loaded = if let Some(config_file) = &cli.config_file {
        let path = std::path::PathBuf::from(config_file);
        debug!("Loading config from explicit path: {:?}", path);
        Config::load_from_path(&path).map(|config| (config, Some(path)))
    } else {
        debug!("Loading config from default location");
        Config::load().map(|config| (config, None))
    };
    let (config, config_path) = match loaded {
        Ok(loaded) => loaded,
        Err(e) => exit_with(ScalrCtlError::from(e)),
    };
    let conn_mgr = ConnectionManager::with_config_path(config, config_path);

    if let Err(e) = execute_command(&cli, &conn_mgr).await {
        exit_with(e);
    }

    Ok(())
}

fn exit_with(e: ScalrCtlError) -> ! {
    if let Some(step) = e.failed_step() {
        error!(step, "Workflow stopped at failed step");
    }
    e.print_diagnostic();
    std::process::exit(1);
}

fn init_tracing(verbose: u8) {
    // Check for RUST_LOG env var first, then fall back to verbosity flag
    let filter = if std::env::var("RUST_LOG").is_ok() {
        tracing_subscriber::EnvFilter::from_default_env()
    } else {
        let level = match verbose {
            0 => "scalrctl=warn,scalr_core=warn",
            1 => "scalrctl=info,scalr_core=info",
            2 => "scalrctl=debug,scalr_core=debug",
            _ => "scalrctl=trace,scalr_core=trace",
        };
        tracing_subscriber::EnvFilter::new(level)
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(true)
                .with_thread_ids(false)
                .with_thread_names(false)
                .compact(),
        )
        .init();

    debug!("Tracing initialized with verbosity level: {}", verbose);
}

/// Execution context for remote calls: the --timeout deadline, cancelled on Ctrl-C
fn command_context(timeout: Option<u64>) -> Context {
    let ctx = match timeout {
        Some(secs) => Context::background().with_timeout(Duration::from_secs(secs)),
        None => Context::background(),
    };

    let on_interrupt = ctx.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Interrupted, cancelling in-flight request");
            on_interrupt.cancel();
        }
    });
    ctx
}

async fn execute_command(cli: &Cli, conn_mgr: &ConnectionManager) -> Result<(), ScalrCtlError> {
    trace!("Executing command: {:?}", cli.command);
    info!("Command: {}", format_command(&cli.command));

    let start = std::time::Instant::now();
    let result = match &cli.command {
        Commands::Version => {
            debug!("Showing version information");
            if cli.output.is_structured() {
                let output_data = serde_json::json!({
                    "version": env!("CARGO_PKG_VERSION"),
                    "name": env!("CARGO_PKG_NAME"),
                });
                output::print_output(&output_data, cli.output.resolve(output::OutputFormat::Json))?;
            } else {
                println!("scalrctl {}", env!("CARGO_PKG_VERSION"));
            }
            Ok(())
        }
        Commands::Completions { shell } => {
            debug!("Generating completions for {:?}", shell);
            generate_completions(*shell);
            Ok(())
        }
        Commands::Profile(profile_cmd) => {
            debug!("Executing profile command");
            commands::profile::handle_profile_command(profile_cmd, conn_mgr, cli.output)
        }
        Commands::List(args) => {
            // Bad filter combinations are reported before any profile is needed
            commands::list::ListRequest::from_args(args)?;
            let client = conn_mgr.create_client(cli.profile.as_deref())?;
            let ctx = command_context(cli.timeout);
            commands::list::handle_list_command(&client, &ctx, args, cli.output).await
        }
        Commands::Example(example_cmd) => {
            let client = conn_mgr.create_client(cli.profile.as_deref())?;
            let ctx = command_context(cli.timeout);
            commands::example::handle_example_command(&client, &ctx, example_cmd, cli.output)
                .await
        }
    };

    let duration = start.elapsed();
    match &result {
        Ok(_) => info!("Command completed successfully in {:?}", duration),
        Err(e) => error!("Command failed after {:?}: {}", duration, e),
    }

    result
}

/// Generate shell completions
fn generate_completions(shell: cli::Shell) {
    let mut cmd = cli::Cli::command();
    let name = cmd.get_name().to_string();

    match shell {
        cli::Shell::Bash => generate(shells::Bash, &mut cmd, name, &mut std::io::stdout()),
        cli::Shell::Zsh => generate(shells::Zsh, &mut cmd, name, &mut std::io::stdout()),
        cli::Shell::Fish => generate(shells::Fish, &mut cmd, name, &mut std::io::stdout()),
        cli::Shell::PowerShell => {
            generate(shells::PowerShell, &mut cmd, name, &mut std::io::stdout())
        }
        cli::Shell::Elvish => generate(shells::Elvish, &mut cmd, name, &mut std::io::stdout()),
    }
}

/// Format command for human-readable logging (without sensitive data)
fn format_command(command: &Commands) -> String {
    match command {
        Commands::Version => "version".to_string(),
        Commands::Completions { shell } => format!("completions {:?}", shell),
        Commands::Profile(cmd) => {
            use cli::ProfileCommands::*;
            match cmd {
                List => "profile list".to_string(),
                Path => "profile path".to_string(),
                Show { name } => format!("profile show {}", name),
                Set { name, .. } => format!("profile set {} [token redacted]", name),
                Remove { name } => format!("profile remove {}", name),
                Default { name } => format!("profile default {}", name),
            }
        }
        Commands::List(args) => format!("list {}", args.resource.collection()),
        Commands::Example(cmd) => format!("example {:?}", cmd),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_command_redacts_token() {
        let cli = Cli::try_parse_from([
            "scalrctl",
            "profile",
            "set",
            "work",
            "--token",
            "super-secret",
        ])
        .unwrap();
        let formatted = format_command(&cli.command);
        assert_eq!(formatted, "profile set work [token redacted]");
        assert!(!formatted.contains("super-secret"));
    }

    #[test]
    fn format_command_names_collection() {
        let cli = Cli::try_parse_from(["scalrctl", "list", "account-users"]).unwrap();
        assert_eq!(format_command(&cli.command), "list account-users");
    }
}
