use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use serde::Serialize;
use splitload_core::UploadSettings;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

const DEFAULT_LOG_FILE: &str = "splitload.log";

/// The log file keeps this tool's debug events, everything else at info.
const FILE_LOG_DIRECTIVES: &str = "info,splitload=debug";

/// Upload every file under a directory to S3 or Google Cloud Storage,
/// choosing the destination by file extension.
#[derive(Parser, Debug)]
#[command(name = "splitload", version)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "config.ini")]
    pub config: PathBuf,

    /// Directory to upload files from (defaults to the current directory)
    #[arg(short, long)]
    pub directory: Option<PathBuf>,

    /// Maximum number of concurrent uploads (overrides [upload] concurrency)
    #[arg(long)]
    pub concurrency: Option<usize>,

    /// Per-file upload timeout in seconds (overrides [upload] timeout_secs)
    #[arg(long)]
    pub timeout_secs: Option<u64>,

    /// Print all outcomes as JSON on stdout
    #[arg(long)]
    pub json: bool,

    /// Exit with a non-zero status if any upload failed
    #[arg(long)]
    pub strict: bool,

    /// File that every run appends its debug-level log to
    #[arg(long, default_value = DEFAULT_LOG_FILE)]
    pub log_file: PathBuf,

    /// Log to the console only
    #[arg(long, conflicts_with = "log_file")]
    pub no_log_file: bool,
}

impl Cli {
    /// Directory to walk: `--directory` or the current working directory.
    pub fn directory(&self) -> anyhow::Result<PathBuf> {
        match &self.directory {
            Some(dir) => Ok(dir.clone()),
            None => std::env::current_dir().context("Failed to resolve current directory"),
        }
    }

    pub fn log_file(&self) -> Option<&Path> {
        (!self.no_log_file).then_some(self.log_file.as_path())
    }

    /// Merge command-line overrides over the configured settings.
    pub fn upload_settings(&self, configured: &UploadSettings) -> anyhow::Result<UploadSettings> {
        let concurrency = self.concurrency.unwrap_or(configured.concurrency);
        if concurrency == 0 {
            anyhow::bail!("--concurrency must be at least 1");
        }
        if self.timeout_secs == Some(0) {
            anyhow::bail!("--timeout-secs must be at least 1");
        }

        Ok(UploadSettings {
            concurrency,
            timeout: self
                .timeout_secs
                .map(Duration::from_secs)
                .or(configured.timeout),
        })
    }
}

pub fn print_json(value: &impl Serialize) -> anyhow::Result<()> {
    let out = serde_json::to_string_pretty(value).context("Serialize outcomes")?;
    println!("{}", out);
    Ok(())
}

/// Initialize tracing for the CLI binary.
///
/// Console output honours `RUST_LOG` (default `info`). When `log_file` is set,
/// events are also appended to that file at debug level; keep the returned
/// guard alive until exit so buffered lines are flushed.
pub fn init_tracing(log_file: Option<&Path>) -> anyhow::Result<Option<WorkerGuard>> {
    let console = tracing_subscriber::fmt::layer().with_filter(
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
    );

    let (file, guard) = match log_file {
        Some(path) => {
            let (writer, guard) = tracing_appender::non_blocking(file_appender(path)?);
            let layer = tracing_subscriber::fmt::layer()
                .with_ansi(false)
                .with_writer(writer)
                .with_filter(EnvFilter::new(FILE_LOG_DIRECTIVES));
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(console)
        .with(file)
        .try_init()
        .context("Failed to install tracing subscriber")?;
    Ok(guard)
}

/// Non-rotating appender writing to exactly `path`.
fn file_appender(path: &Path) -> anyhow::Result<RollingFileAppender> {
    let file_name = path
        .file_name()
        .with_context(|| format!("Log file path {} has no file name", path.display()))?;
    let directory = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    RollingFileAppender::builder()
        .rotation(Rotation::NEVER)
        .filename_prefix(file_name.to_string_lossy())
        .build(directory)
        .with_context(|| format!("Failed to open log file {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn command_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn defaults_match_reference_behaviour() {
        let cli = Cli::try_parse_from(["splitload"]).unwrap();
        assert_eq!(cli.config, PathBuf::from("config.ini"));
        assert!(cli.directory.is_none());
        assert!(!cli.json);
        assert!(!cli.strict);
        assert_eq!(cli.log_file(), Some(Path::new("splitload.log")));
        assert_eq!(cli.directory().unwrap(), std::env::current_dir().unwrap());
    }

    #[test]
    fn short_flags_are_accepted() {
        let cli = Cli::try_parse_from(["splitload", "-c", "prod.ini", "-d", "/srv/outbox"]).unwrap();
        assert_eq!(cli.config, PathBuf::from("prod.ini"));
        assert_eq!(cli.directory().unwrap(), PathBuf::from("/srv/outbox"));
    }

    #[test]
    fn flags_override_configured_settings() {
        let configured = UploadSettings {
            concurrency: 2,
            timeout: Some(Duration::from_secs(60)),
        };

        let cli = Cli::try_parse_from(["splitload"]).unwrap();
        assert_eq!(cli.upload_settings(&configured).unwrap(), configured);

        let cli =
            Cli::try_parse_from(["splitload", "--concurrency", "8", "--timeout-secs", "5"]).unwrap();
        let merged = cli.upload_settings(&configured).unwrap();
        assert_eq!(merged.concurrency, 8);
        assert_eq!(merged.timeout, Some(Duration::from_secs(5)));
    }

    #[test]
    fn zero_concurrency_is_rejected() {
        let cli = Cli::try_parse_from(["splitload", "--concurrency", "0"]).unwrap();
        assert!(cli.upload_settings(&UploadSettings::default()).is_err());
    }

    #[test]
    fn zero_timeout_is_rejected() {
        let cli = Cli::try_parse_from(["splitload", "--timeout-secs", "0"]).unwrap();
        let configured = UploadSettings {
            concurrency: 1,
            timeout: Some(Duration::from_secs(30)),
        };
        assert!(cli.upload_settings(&configured).is_err());
    }

    #[test]
    fn log_file_can_be_moved_or_disabled() {
        let cli = Cli::try_parse_from(["splitload", "--log-file", "/var/log/splitload.log"]).unwrap();
        assert_eq!(cli.log_file(), Some(Path::new("/var/log/splitload.log")));

        let cli = Cli::try_parse_from(["splitload", "--no-log-file"]).unwrap();
        assert_eq!(cli.log_file(), None);
    }

    #[test]
    fn file_appender_writes_to_exact_path() {
        use std::io::Write;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("uploads.log");
        let mut appender = file_appender(&path).unwrap();
        appender.write_all(b"Successfully uploaded a.txt\n").unwrap();
        appender.flush().unwrap();

        let written = std::fs::read_to_string(&path).unwrap();
        assert_eq!(written, "Successfully uploaded a.txt\n");
    }

    #[test]
    fn log_path_without_file_name_is_rejected() {
        assert!(file_appender(Path::new("/")).is_err());
    }
}
