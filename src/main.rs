// Module-specific lints configuration
#![allow(clippy::uninlined_format_args)]

use anyhow::{Context, Result};
use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::{generate, Shell};
use log::{info, warn, Level, LevelFilter, Log, Metadata, Record, SetLoggerError};
use std::io::Write;
use std::path::{Path, PathBuf};

use codeconv::app_config::{self, AiProvider, Config};
use codeconv::app_controller::Controller;
use codeconv::conversion::ConversionType;

/// CLI Wrapper for AiProvider to implement ValueEnum
#[derive(Debug, Clone, ValueEnum)]
enum CliProvider {
    Ollama,
    OpenAI,
    Anthropic,
    LMStudio,
}

impl From<CliProvider> for AiProvider {
    fn from(cli_provider: CliProvider) -> Self {
        match cli_provider {
            CliProvider::Ollama => AiProvider::Ollama,
            CliProvider::OpenAI => AiProvider::OpenAI,
            CliProvider::Anthropic => AiProvider::Anthropic,
            CliProvider::LMStudio => AiProvider::LMStudio,
        }
    }
}

/// CLI Wrapper for LogLevel to implement ValueEnum
#[derive(Debug, Clone, ValueEnum)]
enum CliLogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<CliLogLevel> for app_config::LogLevel {
    fn from(cli_level: CliLogLevel) -> Self {
        match cli_level {
            CliLogLevel::Error => app_config::LogLevel::Error,
            CliLogLevel::Warn => app_config::LogLevel::Warn,
            CliLogLevel::Info => app_config::LogLevel::Info,
            CliLogLevel::Debug => app_config::LogLevel::Debug,
            CliLogLevel::Trace => app_config::LogLevel::Trace,
        }
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the web interface
    Serve {
        /// Address to bind, overrides the config
        #[arg(long)]
        host: Option<String>,

        /// Port to listen on, overrides the config
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Convert a project directory
    Convert {
        /// Project directory to convert
        #[arg(value_name = "SOURCE_DIR")]
        source_dir: PathBuf,

        /// Directory receiving the converted project
        #[arg(value_name = "TARGET_DIR")]
        target_dir: PathBuf,

        /// Conversion type, e.g. c_to_python
        #[arg(short = 't', long = "type", default_value = "c_to_python")]
        conversion_type: String,

        /// Use the rule engine only
        #[arg(long)]
        no_ai: bool,

        /// AI provider to use
        #[arg(long, value_enum)]
        provider: Option<CliProvider>,

        /// Model for every file, bypassing the routing table
        #[arg(short, long)]
        model: Option<String>,
    },

    /// Delete stored conversions and their files
    Cleanup {
        /// Remove sessions created more than this many days ago
        #[arg(long, default_value_t = 7)]
        older_than_days: i64,
    },

    /// Generate shell completions for codeconv
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// codeconv - source project converter
///
/// Converts C, Python, Java, JavaScript and TypeScript projects between
/// languages with an AI model, falling back to textual conversion rules.
#[derive(Parser, Debug)]
#[command(name = "codeconv")]
#[command(version)]
#[command(about = "Convert source projects between programming languages")]
#[command(long_about = "codeconv converts source projects between programming languages with an AI model,
falling back to textual conversion rules when no model is available.

EXAMPLES:
    codeconv serve                                   # Web interface on 127.0.0.1:5000
    codeconv serve --port 8080                       # Web interface on another port
    codeconv convert ./c_project ./out --type c_to_python
    codeconv convert ./app ./out -t python_to_java --no-ai
    codeconv cleanup --older-than-days 30            # Delete old conversions
    codeconv completions bash > codeconv.bash        # Generate bash completions

CONFIGURATION:
    Configuration is stored in conf.json by default. You can specify a different
    config file with --config. If the config file doesn't exist, a default one
    will be created automatically.

CONVERSION TYPES:
    c_to_python, python_to_javascript, python_to_java, java_to_python,
    javascript_to_python, typescript_to_python, java_to_javascript,
    javascript_to_java")]
struct CommandLineOptions {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file path
    #[arg(short, long, global = true, default_value = "conf.json")]
    config: String,

    /// Set logging level
    #[arg(short, long, global = true, value_enum)]
    log_level: Option<CliLogLevel>,
}

// @struct: Custom logger implementation
struct CustomLogger {
    level: LevelFilter,
}

impl CustomLogger {
    // @creates: New logger with specified level
    fn new(level: LevelFilter) -> Self {
        CustomLogger { level }
    }

    // @initializes: Global logger
    fn init(level: LevelFilter) -> Result<(), SetLoggerError> {
        let logger = Box::new(CustomLogger::new(level));
        log::set_boxed_logger(logger)?;
        log::set_max_level(level);
        Ok(())
    }

    // @returns: Emoji and ANSI color for a log level
    fn style_for_level(level: Level) -> (&'static str, &'static str) {
        match level {
            Level::Error => ("❌ ", "1;31"),
            Level::Warn => ("🚧 ", "1;33"),
            Level::Info => (" ", "1;32"),
            Level::Debug => ("🔍 ", "1;36"),
            Level::Trace => ("📋 ", "1;35"),
        }
    }
}

impl Log for CustomLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            let now = chrono::Local::now().format("%H:%M:%S.%3f");
            let (emoji, color) = Self::style_for_level(record.level());

            let mut stderr = std::io::stderr();
            let _ = writeln!(stderr, "\x1B[{}m{} {} {}\x1B[0m", color, now, emoji, record.args());
        }
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Trace is the ceiling; the effective level is set once the config is loaded
    CustomLogger::init(LevelFilter::Trace)?;
    log::set_max_level(LevelFilter::Info);

    let cli = CommandLineOptions::parse();

    if let Commands::Completions { shell } = cli.command {
        let mut cmd = CommandLineOptions::command();
        generate(shell, &mut cmd, "codeconv", &mut std::io::stdout());
        return Ok(());
    }

    if let Some(level) = &cli.log_level {
        let level: app_config::LogLevel = level.clone().into();
        log::set_max_level(level.to_level_filter());
    }

    let mut config = load_or_create_config(&cli.config)?;

    if let Some(level) = &cli.log_level {
        config.log_level = level.clone().into();
    } else {
        log::set_max_level(config.log_level.to_level_filter());
    }

    match cli.command {
        Commands::Serve { host, port } => {
            if let Some(host) = host {
                config.server.host = host;
            }
            if let Some(port) = port {
                config.server.port = port;
            }

            let controller = Controller::with_config(config)?;
            controller.serve().await
        }
        Commands::Convert {
            source_dir,
            target_dir,
            conversion_type,
            no_ai,
            provider,
            model,
        } => {
            let conversion_type: ConversionType = conversion_type.parse()?;
            if let Some(provider) = provider {
                config.ai.provider = provider.into();
            }
            if no_ai {
                // Hosted providers need no key when the rules do all the work
                config.ai.enabled = false;
            }

            let controller = Controller::with_config(config)?;
            let report = controller
                .convert(source_dir, target_dir, conversion_type, !no_ai, model)
                .await?;

            if report.error_count() > 0 {
                warn!("{} file(s) could not be converted", report.error_count());
            }
            Ok(())
        }
        Commands::Cleanup { older_than_days } => {
            let controller = Controller::with_config(config)?;
            let removed = controller.cleanup(older_than_days).await?;
            info!("Removed {} conversion session(s)", removed);
            Ok(())
        }
        Commands::Completions { .. } => Ok(()),
    }
}

/// Load the configuration file, writing the defaults when it does not exist
fn load_or_create_config(config_path: &str) -> Result<Config> {
    if Path::new(config_path).exists() {
        Config::from_file(config_path)
            .with_context(|| format!("Failed to load config file: {}", config_path))
    } else {
        warn!("Config file not found at '{}', creating default config.", config_path);
        let config = Config::default();
        config
            .save(config_path)
            .with_context(|| format!("Failed to write default config to file: {}", config_path))?;
        Ok(config)
    }
}
