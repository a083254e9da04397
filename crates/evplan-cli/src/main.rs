mod config;
mod plan_cmds;
mod serve_cmd;
#[cfg(test)]
mod test_util;
mod tui;

use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand};

use evplan_core::FormInput;
use evplan_store::Gender;

use config::EvplanConfig;

#[derive(Parser)]
#[command(
    name = "evplan",
    version,
    about = "Turn a short form into an AI-generated event plan"
)]
struct Cli {
    /// API key for the generative endpoint (overrides EVPLAN_API_KEY env var)
    #[arg(long, global = true)]
    api_key: Option<String>,

    /// Directory holding saved plans (overrides EVPLAN_DATA_DIR env var)
    #[arg(long, global = true)]
    data_dir: Option<String>,

    /// Keep plans in memory only; nothing is read from or written to disk
    #[arg(long, global = true)]
    ephemeral: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Write an evplan config file (stores --api-key when given)
    Init {
        /// Overwrite existing config file
        #[arg(long)]
        force: bool,
    },
    /// Generate a new event plan and save it
    New {
        /// Name of the person the event is for
        #[arg(long)]
        name: String,
        /// Their age
        #[arg(long)]
        age: String,
        /// Any, Male, Female, or Non-binary
        #[arg(long, default_value = "Any")]
        gender: Gender,
        /// Kind of event, e.g. "Birthday"
        #[arg(long = "event")]
        event_type: String,
    },
    /// List all saved plans, newest first
    List,
    /// Show one plan
    Show {
        /// Plan ID
        id: i64,
        /// Show every list item instead of the first three
        #[arg(long)]
        expanded: bool,
    },
    /// Delete a plan (succeeds even if the ID is unknown)
    Delete {
        /// Plan ID
        id: i64,
    },
    /// Launch interactive TUI dashboard
    Dashboard,
    /// Serve the JSON HTTP API
    Serve {
        /// Address to bind
        #[arg(long, default_value = "127.0.0.1")]
        bind: String,
        /// Port to listen on
        #[arg(long, default_value_t = 5000)]
        port: u16,
    },
    /// Print shell completions
    Completions {
        /// Shell to generate completions for
        shell: clap_complete::Shell,
    },
}

/// Execute the `evplan init` command: write config file.
fn cmd_init(api_key: Option<&str>, force: bool) -> Result<()> {
    let path = config::config_path();

    if path.exists() && !force {
        anyhow::bail!(
            "config file already exists at {}\nUse --force to overwrite.",
            path.display()
        );
    }

    let cfg = config::ConfigFile {
        api: config::ApiSection {
            key: api_key.map(str::to_owned),
            ..Default::default()
        },
        ..Default::default()
    };
    config::save_config(&cfg)?;

    println!("Config written to {}", path.display());
    match api_key {
        Some(key) => println!("  api.key = {}", mask_key(key)),
        None => {
            println!("  api.key is not set");
            println!();
            println!("Add one with `evplan init --api-key <KEY> --force` or set EVPLAN_API_KEY.");
        }
    }

    Ok(())
}

/// Show only the ends of a key.
fn mask_key(key: &str) -> String {
    let chars: Vec<char> = key.chars().collect();
    if chars.len() <= 8 {
        return "*".repeat(chars.len());
    }
    let head: String = chars[..4].iter().collect();
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{head}...{tail}")
}

fn init_tracing(command: &Commands) {
    // The dashboard owns the terminal, so it only logs when asked to.
    let default = match command {
        Commands::Dashboard => "off",
        _ => "info",
    };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default)),
        )
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(&cli.command);

    let api_key = cli.api_key.as_deref();
    let data_dir = cli.data_dir.as_deref();

    match cli.command {
        Commands::Init { force } => {
            cmd_init(api_key, force)?;
        }
        Commands::New {
            name,
            age,
            gender,
            event_type,
        } => {
            let resolved = EvplanConfig::resolve(api_key, data_dir)?;
            let mut list = plan_cmds::open_list(&resolved, cli.ephemeral);
            let input = FormInput::new(name, age, gender, event_type);
            plan_cmds::cmd_new(&resolved, &mut list, input).await?;
        }
        Commands::List => {
            let resolved = EvplanConfig::resolve(api_key, data_dir)?;
            let list = plan_cmds::open_list(&resolved, cli.ephemeral);
            plan_cmds::cmd_list(&list);
        }
        Commands::Show { id, expanded } => {
            let resolved = EvplanConfig::resolve(api_key, data_dir)?;
            let list = plan_cmds::open_list(&resolved, cli.ephemeral);
            plan_cmds::cmd_show(&list, id, expanded)?;
        }
        Commands::Delete { id } => {
            let resolved = EvplanConfig::resolve(api_key, data_dir)?;
            let mut list = plan_cmds::open_list(&resolved, cli.ephemeral);
            plan_cmds::cmd_delete(&mut list, id)?;
        }
        Commands::Dashboard => {
            let resolved = EvplanConfig::resolve(api_key, data_dir)?;
            let list = plan_cmds::open_list(&resolved, cli.ephemeral);
            let pipeline =
                plan_cmds::build_pipeline(&resolved, &list).map_err(|e| format!("{e:#}"));
            tui::run_dashboard(list, pipeline).await?;
        }
        Commands::Serve { bind, port } => {
            let resolved = EvplanConfig::resolve(api_key, data_dir)?;
            let list = plan_cmds::open_list(&resolved, cli.ephemeral);
            let pipeline = plan_cmds::build_pipeline(&resolved, &list)?;
            serve_cmd::run_serve(list, pipeline, &bind, port).await?;
        }
        Commands::Completions { shell } => {
            let mut cmd = Cli::command();
            clap_complete::generate(shell, &mut cmd, "evplan", &mut std::io::stdout());
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn gender_flag_parses_case_insensitively() {
        let cli = Cli::try_parse_from([
            "evplan", "new", "--name", "Sam", "--age", "12", "--gender", "non-binary", "--event",
            "Graduation",
        ])
        .unwrap();
        match cli.command {
            Commands::New { gender, .. } => assert_eq!(gender, Gender::NonBinary),
            _ => panic!("expected new command"),
        }
    }

    #[test]
    fn gender_defaults_to_any() {
        let cli = Cli::try_parse_from([
            "evplan", "new", "--name", "Sam", "--age", "12", "--event", "Party",
        ])
        .unwrap();
        match cli.command {
            Commands::New { gender, .. } => assert_eq!(gender, Gender::Any),
            _ => panic!("expected new command"),
        }
    }

    #[test]
    fn unknown_gender_is_rejected() {
        assert!(
            Cli::try_parse_from([
                "evplan", "new", "--name", "Sam", "--age", "1", "--gender", "robot", "--event", "x",
            ])
            .is_err()
        );
    }

    #[test]
    fn global_flags_work_after_subcommand() {
        let cli = Cli::try_parse_from(["evplan", "list", "--data-dir", "/tmp/x", "--ephemeral"])
            .unwrap();
        assert_eq!(cli.data_dir.as_deref(), Some("/tmp/x"));
        assert!(cli.ephemeral);
    }

    #[test]
    fn mask_key_hides_middle() {
        assert_eq!(mask_key("abcdefghijkl"), "abcd...ijkl");
        assert_eq!(mask_key("short"), "*****");
    }
}
