//! iniconf: command-line access to typed INI settings.
//!
//! Reads and writes the same files an application using the `iniconf`
//! library would, so settings can be inspected and changed from a shell.
//!
//! # Usage
//!
//! ```text
//! iniconf [OPTIONS] <COMMAND>
//!
//! Commands:
//!   get    Print one value
//!   set    Store one value and save
//!   dump   Print every entry in file order
//!   reset  Rewrite the primary file from the defaults file
//!   count  Count program starts per day and in total
//!
//! Options:
//!   --dir <DIR>                    Directory of both files [default: .]
//!   --name <NAME>                  Primary file base name
//!   --default-name <NAME>          Defaults file base name
//!   --ext <EXT>                    File extension without the dot
//!   --options <FILE>               TOML options file
//! ```
//!
//! # Environment variable overrides
//!
//! | Variable                | Description                   |
//! |-------------------------|-------------------------------|
//! | `INICONF_DIR`           | Directory of both files       |
//! | `INICONF_NAME`          | Primary file base name        |
//! | `INICONF_DEFAULT_NAME`  | Defaults file base name       |
//! | `INICONF_EXT`           | File extension                |
//! | `INICONF_OPTIONS`       | TOML options file             |
//!
//! Log output goes to stderr; the level is taken from `RUST_LOG`.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use chrono::Local;
use clap::{Parser, Subcommand, ValueEnum};
use iniconf::application::config::Config;
use iniconf::infrastructure::clock::SystemClock;
use iniconf::infrastructure::scheduler::tokio_task::TokioScheduler;
use iniconf::infrastructure::storage::fs::FsIo;
use iniconf::infrastructure::storage::options::{load_options, ConfigOptions};
use iniconf_core::Scalar;
use tracing::info;
use tracing_subscriber::EnvFilter;

const COUNTER_SECTION: &str = "system";
const COUNTER_DAY_KEY: &str = "todayString";
const COUNTER_TODAY_KEY: &str = "startCounterToday";
const COUNTER_TOTAL_KEY: &str = "startCounterTotal";

// ── CLI argument definitions ──────────────────────────────────────────────────

/// Typed INI settings with layered defaults.
#[derive(Debug, Parser)]
#[command(
    name = "iniconf",
    about = "Read and write typed INI settings with layered defaults",
    version
)]
struct Cli {
    /// Directory holding the primary and defaults files.
    #[arg(long, env = "INICONF_DIR")]
    dir: Option<PathBuf>,

    /// Base name of the primary file.
    #[arg(long, env = "INICONF_NAME")]
    name: Option<String>,

    /// Base name of the defaults file.
    #[arg(long, env = "INICONF_DEFAULT_NAME")]
    default_name: Option<String>,

    /// File extension, without the dot.
    #[arg(long, env = "INICONF_EXT")]
    ext: Option<String>,

    /// TOML options file.  Command-line flags override its `[files]` table.
    #[arg(long, env = "INICONF_OPTIONS")]
    options: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Print one value, or the default if it does not exist.
    Get {
        section: String,
        key: String,
        /// Decode the stored text as this type.
        #[arg(long, value_enum, default_value_t = Kind::Text)]
        kind: Kind,
        /// Printed when the entry does not exist.
        #[arg(long)]
        default: Option<String>,
    },
    /// Store one value and save the primary file.
    Set {
        section: String,
        key: String,
        value: String,
        /// Parse `value` as this type before storing it.
        #[arg(long, value_enum, default_value_t = Kind::Text)]
        kind: Kind,
        /// Fractional digits for `--kind f64`.
        #[arg(long)]
        precision: Option<u32>,
    },
    /// Print every entry in file order.
    Dump,
    /// Discard all settings and start over from the defaults file.
    Reset,
    /// Count program starts, today and in total, with autosave on.
    Count,
}

/// Native type a value is decoded as or encoded from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Kind {
    Text,
    I32,
    U32,
    I64,
    U64,
    F64,
    Bool,
}

impl Cli {
    /// Builds the options from the optional TOML file and the flags.
    fn config_options(&self) -> anyhow::Result<ConfigOptions> {
        let mut options = match &self.options {
            Some(path) => load_options(path)
                .with_context(|| format!("failed to load options from {}", path.display()))?,
            None => ConfigOptions::default(),
        };
        if let Some(dir) = &self.dir {
            options.files.dir = dir.clone();
        }
        if let Some(name) = &self.name {
            options.files.name = name.clone();
        }
        if let Some(name) = &self.default_name {
            options.files.default_name = name.clone();
        }
        if let Some(ext) = &self.ext {
            options.files.extension = ext.clone();
        }
        Ok(options)
    }
}

// ── Commands ──────────────────────────────────────────────────────────────────

fn parse_scalar(text: &str, kind: Kind, precision: Option<u32>) -> anyhow::Result<Scalar> {
    let scalar = match kind {
        Kind::Text => Scalar::from(text),
        Kind::I32 => Scalar::from(text.parse::<i32>().with_context(|| format!("'{text}' is not an i32"))?),
        Kind::U32 => Scalar::from(text.parse::<u32>().with_context(|| format!("'{text}' is not a u32"))?),
        Kind::I64 => Scalar::from(text.parse::<i64>().with_context(|| format!("'{text}' is not an i64"))?),
        Kind::U64 => Scalar::from(text.parse::<u64>().with_context(|| format!("'{text}' is not a u64"))?),
        Kind::F64 => {
            let value = text
                .parse::<f64>()
                .with_context(|| format!("'{text}' is not a number"))?;
            match precision {
                Some(p) => Scalar::double(value, p),
                None => Scalar::from(value),
            }
        }
        Kind::Bool => Scalar::from(
            text.parse::<bool>()
                .with_context(|| format!("'{text}' is not true or false"))?,
        ),
    };
    Ok(scalar)
}

fn get(config: &Config, section: &str, key: &str, kind: Kind, default: Option<String>) -> String {
    let Some(value) = config.get_value(section, key) else {
        return default.unwrap_or_default();
    };
    match kind {
        Kind::Text => value.as_string(),
        Kind::I32 => value.as_i32().to_string(),
        Kind::U32 => value.as_u32().to_string(),
        Kind::I64 => value.as_i64().to_string(),
        Kind::U64 => value.as_u64().to_string(),
        Kind::F64 => value.as_f64().to_string(),
        Kind::Bool => value.as_bool().to_string(),
    }
}

fn dump(config: &Config) {
    let mut current: Option<String> = None;
    for (section, key, value) in config.entries() {
        if current.as_deref() != Some(section.as_str()) {
            println!("[{section}]");
            current = Some(section);
        }
        println!("{key}={}", value.raw_text());
    }
}

/// Bumps the start counters.  Returns `(today, total)`.
fn count_start(config: &Config, today: &str) -> (u32, u32) {
    let total = config
        .get_u32(COUNTER_SECTION, COUNTER_TOTAL_KEY, 0)
        .saturating_add(1);
    let today_count = if config.get_string(COUNTER_SECTION, COUNTER_DAY_KEY, "") == today {
        config
            .get_u32(COUNTER_SECTION, COUNTER_TODAY_KEY, 0)
            .saturating_add(1)
    } else {
        1
    };

    config.set_value(COUNTER_SECTION, COUNTER_DAY_KEY, today);
    config.set_value(COUNTER_SECTION, COUNTER_TODAY_KEY, today_count);
    config.set_value(COUNTER_SECTION, COUNTER_TOTAL_KEY, total);
    (today_count, total)
}

// ── Entry point ───────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // ── Logging setup ─────────────────────────────────────────────────────────
    //
    // Logs go to stderr so `get` and `dump` output can be piped.
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let options = cli.config_options()?;

    let scheduler = TokioScheduler::current().context("failed to attach autosave to runtime")?;
    let config = Config::new(
        options,
        Arc::new(FsIo::new()),
        Arc::new(scheduler),
        Arc::new(SystemClock),
    )
    .context("invalid configuration options")?;

    info!("using {}", config.primary_path().display());
    config
        .read()
        .with_context(|| format!("failed to read {}", config.primary_path().display()))?;

    match cli.command {
        Command::Get {
            section,
            key,
            kind,
            default,
        } => println!("{}", get(&config, &section, &key, kind, default)),
        Command::Set {
            section,
            key,
            value,
            kind,
            precision,
        } => {
            config.set_value(&section, &key, parse_scalar(&value, kind, precision)?);
            config.save().context("failed to save")?;
        }
        Command::Dump => dump(&config),
        Command::Reset => config.reset().context("failed to reset")?,
        Command::Count => {
            config.set_autosave(true).context("failed to enable autosave")?;
            let today = Local::now().format("%Y%m%d").to_string();
            let (today_count, total) = count_start(&config, &today);
            println!("started {today_count} time(s) today, {total} in total");
            // Dropping the config below stops autosave and flushes the counters.
        }
    }

    Ok(())
}
