use crate::settings::Log;
use anyhow::{Result, anyhow};
use tracing::debug;
use tracing_subscriber::{
    EnvFilter, Registry, fmt, layer::SubscriberExt, reload, util::SubscriberInitExt,
};

pub struct LogConfig {
    pub filter: String,
}

impl From<&Log> for LogConfig {
    fn from(log: &Log) -> Self {
        LogConfig {
            filter: log.filter.clone(),
        }
    }
}

pub struct Logger {
    reload_handle: reload::Handle<EnvFilter, Registry>,
}

impl Logger {
    /// Install the global subscriber at `info` until settings are known.
    /// A subscriber installed earlier (e.g. by a test harness) is kept.
    pub fn new_bootstrap() -> Self {
        let filter = EnvFilter::new("info");
        let (filter, reload_handle) = reload::Layer::new(filter);

        if let Err(e) = tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer())
            .try_init()
        {
            debug!("keeping the existing global subscriber: {}", e);
        }

        Self { reload_handle }
    }

    pub fn reload_from_config(&self, config: &LogConfig) -> Result<()> {
        let filter = EnvFilter::try_new(&config.filter).map_err(|e| anyhow!(e))?;
        self.reload_handle.reload(filter).map_err(|e| anyhow!(e))?;
        Ok(())
    }
}
