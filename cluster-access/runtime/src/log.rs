use anyhow::{anyhow, Context, Error, Result};
use tracing_subscriber::{fmt, EnvFilter};

/// How log lines are written to stderr.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum LogFormat {
    #[default]
    Plain,
    Json,
}

// === impl LogFormat ===

impl LogFormat {
    /// Installs the global subscriber, filtering events with the given `EnvFilter` directives.
    pub fn try_init(self, filter: &str) -> Result<()> {
        let filter = EnvFilter::try_new(filter).context("invalid log filter")?;
        let logs = fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr);
        match self {
            Self::Plain => logs.try_init(),
            Self::Json => logs.json().try_init(),
        }
        .map_err(|error| anyhow!("failed to initialize logging: {error}"))
    }
}

impl std::str::FromStr for LogFormat {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "plain" => Ok(Self::Plain),
            "json" => Ok(Self::Json),
            s => Err(anyhow!("invalid log format: {:?}", s)),
        }
    }
}

impl std::fmt::Display for LogFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Plain => "plain".fmt(f),
            Self::Json => "json".fmt(f),
        }
    }
}
