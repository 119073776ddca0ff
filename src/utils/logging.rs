use std::fs::{self, OpenOptions};
use std::path::Path;
use std::sync::Mutex;

use tracing_subscriber::EnvFilter;

/// Installs the global subscriber. `RUST_LOG` wins over the defaults; with
/// `--debug` this crate logs at debug level. A log file receives the output
/// instead of stderr, its directory created if needed.
pub fn init_logging(debug: bool, log_file: Option<&str>) -> std::io::Result<()> {
    let default_filter = if debug { "warn,vault_cli=debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false);

    let installed = match log_file.filter(|p| !p.is_empty()) {
        Some(path) => {
            let path = shellexpand::tilde(path).to_string();
            if let Some(parent) = Path::new(&path).parent() {
                fs::create_dir_all(parent)?;
            }
            let file = OpenOptions::new().create(true).append(true).open(&path)?;
            builder
                .with_ansi(false)
                .with_writer(Mutex::new(file))
                .try_init()
        }
        None => builder.with_writer(std::io::stderr).try_init(),
    };

    if let Err(e) = installed {
        eprintln!("Failed to initialise logging: {}", e);
    }
    Ok(())
}
