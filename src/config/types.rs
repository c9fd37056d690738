use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Root configuration container.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub runtime: RuntimeConfig,
    #[serde(default)]
    pub toast: ToastConfig,
}

/// Diagnostic output settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// `EnvFilter` directive used when `RUST_LOG` is unset (default: "info").
    #[serde(default = "default_log_filter")]
    pub filter: String,
    /// Print the event target (module path) (default: true).
    #[serde(default = "default_true")]
    pub with_target: bool,
}

/// Container runtime settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuntimeConfig {
    /// Actions buffered before the first state subscriber (default: 64).
    /// The oldest action is dropped once the buffer is full.
    #[serde(default = "default_max_pending_actions")]
    pub max_pending_actions: usize,
    /// Emit a trace event per dispatch and reduction (default: false).
    #[serde(default)]
    pub trace_mutations: bool,
}

/// Defaults for toasts built with [`Toast::text`](crate::toast::Toast::text).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToastConfig {
    /// Auto-close delay in milliseconds (default: 2000).
    #[serde(default = "default_display_time_ms")]
    pub display_time_ms: u64,
    /// Keep earlier toasts on screen when a new one shows (default: false).
    #[serde(default)]
    pub allow_overlap: bool,
    /// Drag distance in points past which releasing a pan closes the toast
    /// (default: 15.0).
    #[serde(default = "default_swipe_threshold")]
    pub swipe_threshold: f64,
}

impl ToastConfig {
    pub fn display_time(&self) -> Duration {
        Duration::from_millis(self.display_time_ms)
    }
}

fn default_log_filter() -> String {
    "info".to_string()
}

fn default_true() -> bool {
    true
}

fn default_max_pending_actions() -> usize {
    64
}

fn default_display_time_ms() -> u64 {
    2000
}

fn default_swipe_threshold() -> f64 {
    15.0
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: default_log_filter(),
            with_target: true,
        }
    }
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            max_pending_actions: default_max_pending_actions(),
            trace_mutations: false,
        }
    }
}

impl Default for ToastConfig {
    fn default() -> Self {
        Self {
            display_time_ms: default_display_time_ms(),
            allow_overlap: false,
            swipe_threshold: default_swipe_threshold(),
        }
    }
}
