//! Parade CLI - derived views for an issue and agent dashboard.

use clap::Parser;
use parade::cli::{Cli, Commands, ConfigCommands};
use parade::commands::{self, CommandResult};
use parade::config::{ConfigOverrides, OutputFormat, ResolvedConfig, resolve_config};
use std::process;
use tracing_subscriber::EnvFilter;

/// Environment variable holding the log filter directive.
const LOG_ENV: &str = "PARADE_LOG";

fn main() {
    let cli = Cli::parse();
    init_logging(cli.log_json);

    let overrides = overrides_from(&cli);
    let mut human = cli.human_readable;

    let result = match resolve_config(&overrides) {
        Ok(config) => {
            human = config.human();
            tracing::debug!(issues = %config.issues().display(), user = config.user(), "resolved config");
            run_command(cli.command, &config, human)
        }
        Err(e) => Err(e),
    };

    if let Err(e) = result {
        if human {
            eprintln!("Error: {}", e);
        } else {
            eprintln!("{}", serde_json::json!({ "error": e.to_string() }));
        }
        process::exit(1);
    }
}

/// Logs go to stderr so stdout stays parseable.
fn init_logging(json: bool) {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    let _ = if json {
        builder.json().try_init()
    } else {
        builder.try_init()
    };
}

fn overrides_from(cli: &Cli) -> ConfigOverrides {
    let mut overrides = ConfigOverrides {
        blocking_types: cli.blocking_types.clone(),
        user: cli.user.clone(),
        output_format: cli.human_readable.then_some(OutputFormat::Human),
        issues: cli.issues.clone(),
        ..Default::default()
    };
    if let Some(Commands::Focus {
        ready_cap,
        blocked_cap,
    }) = &cli.command
    {
        overrides.focus_ready_cap = ready_cap.map(usize::from);
        overrides.focus_blocked_cap = blocked_cap.map(usize::from);
    }
    overrides
}

fn run_command(command: Option<Commands>, config: &ResolvedConfig, human: bool) -> Result<(), parade::Error> {
    match command.unwrap_or(Commands::Parade) {
        Commands::Parade => output(&commands::parade(config)?, human),

        Commands::Focus { .. } => output(&commands::focus(config, config.focus_caps())?, human),

        Commands::Deps { id } => output(&commands::deps(config, &id)?, human),

        Commands::Dag { file } => output(&commands::dag(&file)?, human),

        Commands::Problems { agents_file } => output(&commands::problems(&agents_file)?, human),

        Commands::Velocity { runtime } => {
            let result = commands::velocity(
                config,
                runtime.agents.as_deref(),
                runtime.costs.as_deref(),
                runtime.now,
            )?;
            output(&result, human);
        }

        Commands::Changes { state } => output(&commands::changes(config, &state)?, human),

        Commands::Summary { runtime, dag } => {
            let result = commands::summary(
                config,
                runtime.agents.as_deref(),
                runtime.costs.as_deref(),
                dag.as_deref(),
                runtime.now,
            )?;
            output(&result, human);
        }

        Commands::Config { command } => match command {
            ConfigCommands::Show => output(&commands::config_show(config)?, human),
            ConfigCommands::Path => output(&commands::config_path_info()?, human),
        },
    }

    Ok(())
}

/// Print output in JSON or human-readable format.
fn output<T: CommandResult>(result: &T, human: bool) {
    if human {
        println!("{}", result.to_human());
    } else {
        println!("{}", result.to_json());
    }
}
