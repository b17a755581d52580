use crate::error::{Error, Result};

/// Dispatcher configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Number of worker threads. `None` means one per host core.
    pub num_workers: Option<usize>,
    /// Bound on tasks waiting to start. Submits beyond it are rejected.
    pub queue_capacity: usize,
    /// Bound on completed results awaiting `drain`. Workers block when full.
    pub cache_capacity: usize,
    /// Pin each worker to a core (Linux only, ignored elsewhere).
    pub pin_workers: bool,
    /// Worker thread stack size in bytes.
    pub stack_size: Option<usize>,
    /// Prefix for worker thread names.
    pub thread_name_prefix: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            num_workers: None,
            queue_capacity: 256,
            cache_capacity: 64,
            pin_workers: false,
            stack_size: Some(2 * 1024 * 1024),
            thread_name_prefix: "ferry-worker".to_string(),
        }
    }
}

impl Config {
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::new()
    }

    pub fn validate(&self) -> Result<()> {
        if let Some(n) = self.num_workers {
            if n == 0 {
                return Err(Error::config("num_workers must be > 0"));
            }
            if n > 1024 {
                return Err(Error::config("num_workers too large (max 1024)"));
            }
        }

        if self.queue_capacity == 0 {
            return Err(Error::config("queue_capacity must be > 0"));
        }

        if self.cache_capacity == 0 {
            return Err(Error::config("cache_capacity must be > 0"));
        }

        Ok(())
    }

    /// Effective worker count: configured value, or one per host core.
    pub fn worker_threads(&self) -> usize {
        self.num_workers.unwrap_or_else(num_cpus::get).max(1)
    }
}

/// Builder for [`Config`].
#[derive(Debug, Default)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    pub fn new() -> Self {
        Self {
            config: Config::default(),
        }
    }

    pub fn num_workers(mut self, n: usize) -> Self {
        self.config.num_workers = Some(n);
        self
    }

    pub fn queue_capacity(mut self, cap: usize) -> Self {
        self.config.queue_capacity = cap;
        self
    }

    pub fn cache_capacity(mut self, cap: usize) -> Self {
        self.config.cache_capacity = cap;
        self
    }

    pub fn pin_workers(mut self, pin: bool) -> Self {
        self.config.pin_workers = pin;
        self
    }

    pub fn stack_size(mut self, size: usize) -> Self {
        self.config.stack_size = Some(size);
        self
    }

    pub fn thread_name_prefix<S: Into<String>>(mut self, prefix: S) -> Self {
        self.config.thread_name_prefix = prefix.into();
        self
    }

    pub fn build(self) -> Result<Config> {
        self.config.validate()?;
        Ok(self.config)
    }
}
