use clap::{Arg, ArgAction, ArgMatches, Command};
use log::{error, info, LevelFilter};
use std::path::PathBuf;
use std::process;

use admin_bootstrap::admin::{run_interactive_login, run_interactive_setup, FlowError};
use admin_bootstrap::api::{self, ApiResponse};
use admin_bootstrap::utils::logging::initialize_logging;
use admin_bootstrap::{AppConfig, CredentialStore, SetupState};

fn build_cli() -> Command {
    let username_arg = Arg::new("username")
        .long("username")
        .short('u')
        .help("Administrator username (prompted for when omitted)")
        .value_name("NAME");

    Command::new("admin-bootstrap")
        .about("Create and check the single administrator account")
        .subcommand_required(true)
        .arg(
            Arg::new("data-dir")
                .long("data-dir")
                .global(true)
                .help("Directory holding the credential file")
                .value_name("DIR")
                .value_parser(clap::value_parser!(PathBuf)),
        )
        .arg(
            Arg::new("users-file")
                .long("users-file")
                .global(true)
                .help("Name of the credential file inside the data directory")
                .value_name("FILE"),
        )
        .arg(
            Arg::new("rounds")
                .long("rounds")
                .global(true)
                .help("PBKDF2 rounds used when hashing a new password")
                .value_name("N")
                .value_parser(clap::value_parser!(u32).range(1..)),
        )
        .arg(
            Arg::new("log-file")
                .long("log-file")
                .global(true)
                .help("Append logs to this file instead of stderr")
                .value_name("PATH")
                .value_parser(clap::value_parser!(PathBuf)),
        )
        .arg(
            Arg::new("json")
                .long("json")
                .global(true)
                .help("Print the JSON response body instead of a message")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("verbose")
                .long("verbose")
                .short('v')
                .global(true)
                .help("Increase log verbosity (-v debug, -vv trace)")
                .action(ArgAction::Count),
        )
        .subcommand(Command::new("status").about("Show whether the administrator exists"))
        .subcommand(
            Command::new("setup")
                .about("Create the administrator account (only once)")
                .arg(username_arg.clone()),
        )
        .subcommand(
            Command::new("login")
                .about("Check the administrator credentials")
                .arg(username_arg),
        )
}

/// Command-line flags take precedence over the environment
fn apply_overrides(config: &mut AppConfig, matches: &ArgMatches) {
    if let Some(dir) = matches.get_one::<PathBuf>("data-dir") {
        config.data_dir = dir.clone();
    }
    if let Some(file) = matches.get_one::<String>("users-file") {
        config.users_file = file.clone();
    }
    if let Some(rounds) = matches.get_one::<u32>("rounds") {
        config.hash_rounds = *rounds;
    }
    if let Some(path) = matches.get_one::<PathBuf>("log-file") {
        config.log_file = Some(path.clone());
    }
    match matches.get_count("verbose") {
        0 => {}
        1 => config.log_level = LevelFilter::Debug,
        _ => config.log_level = LevelFilter::Trace,
    }
}

/// Report a response either as JSON or as a plain message
fn report(response: &ApiResponse, json: bool) -> bool {
    if json {
        println!("{}", response.body);
    } else if let Some(message) = response.body.get("message").and_then(|m| m.as_str()) {
        if response.is_success() {
            println!("{}", message);
        } else {
            eprintln!("Error: {}", message);
        }
    }
    response.is_success()
}

fn status_line(state: SetupState) -> &'static str {
    match state {
        SetupState::SetupComplete => "Setup complete: the administrator account exists.",
        SetupState::Uninitialized => "Setup pending: no administrator account yet.",
    }
}

fn flow_response(result: Result<String, FlowError>, success_status: u16, message: &str) -> ApiResponse {
    match result {
        Ok(_) => ApiResponse::success(success_status, message),
        Err(FlowError::Auth(e)) => e.into(),
        Err(FlowError::Input(e)) => {
            error!("Failed to read input: {}", e);
            ApiResponse::error(400, format!("Failed to read input: {}", e))
        }
    }
}

fn main() {
    let matches = build_cli().get_matches();

    let mut config = match AppConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            process::exit(1);
        }
    };
    apply_overrides(&mut config, &matches);
    if let Err(e) = config.validate() {
        eprintln!("Configuration error: {}", e);
        process::exit(1);
    }

    if let Err(e) = initialize_logging(config.log_level, config.log_file.as_deref()) {
        eprintln!("Warning: failed to initialize logging: {}", e);
    }

    let users_path = config.users_path();
    let store = CredentialStore::open(&users_path, config.hash_rounds);
    info!(
        "Using credential store at {} ({} rounds for new hashes)",
        users_path.display(),
        store.hash_rounds()
    );
    let json = matches.get_flag("json");

    let succeeded = match matches.subcommand() {
        Some(("status", _)) => {
            if json {
                report(&api::check_setup(&store), true)
            } else {
                println!("{}", status_line(store.state()));
                true
            }
        }
        Some(("setup", sub_matches)) => {
            let username = sub_matches.get_one::<String>("username").map(String::as_str);
            let result = run_interactive_setup(&store, username);
            report(
                &flow_response(result, 201, api::handlers::SETUP_CREATED_MESSAGE),
                json,
            )
        }
        Some(("login", sub_matches)) => {
            let username = sub_matches.get_one::<String>("username").map(String::as_str);
            let result = run_interactive_login(&store, username);
            report(
                &flow_response(result, 200, api::handlers::LOGIN_OK_MESSAGE),
                json,
            )
        }
        _ => {
            error!("Unknown command");
            false
        }
    };

    if !succeeded {
        process::exit(1);
    }
}
