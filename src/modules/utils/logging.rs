use env_logger::{Builder, Env, Target, WriteStyle};
use log::{info, warn, LevelFilter};
use std::fs::OpenOptions;
use std::path::Path;

/// Initialize the logging system, writing to stderr or appending to `log_file`.
///
/// `RUST_LOG` takes precedence over `level` when it is set.
pub fn initialize_logging(
    level: LevelFilter,
    log_file: Option<&Path>,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut builder = Builder::new();
    builder
        .filter_level(level)
        .parse_env(Env::default())
        .format_timestamp_secs()
        .format_module_path(true)
        .write_style(WriteStyle::Auto);

    if let Some(path) = log_file {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        builder.target(Target::Pipe(Box::new(file)));
    }

    builder.try_init()?;

    info!("Logging system initialized");
    Ok(())
}

/// Mask all but the edges of an identifier before it reaches the logs
fn format_sensitive(text: &str) -> String {
    let chars: Vec<char> = text.chars().collect();
    if chars.len() <= 4 {
        return "*".repeat(chars.len());
    }
    let head: String = chars[..2].iter().collect();
    let tail: String = chars[chars.len() - 2..].iter().collect();
    format!("{}***{}", head, tail)
}

/// Log a setup or login outcome. Never pass passwords or hashes in `details`.
pub fn log_credential_event(event_type: &str, username: &str, success: bool, details: Option<&str>) {
    let timestamp = chrono::Local::now().format("%Y-%m-%d %H:%M:%S").to_string();
    if success {
        info!(
            "Credential event: type={}, user={}, success=true, timestamp={}, details={:?}",
            event_type,
            format_sensitive(username),
            timestamp,
            details
        );
    } else {
        warn!(
            "Credential event: type={}, user={}, success=false, timestamp={}, details={:?}",
            event_type,
            format_sensitive(username),
            timestamp,
            details
        );
    }
}
