//! poqt observability: tracing subscriber setup shared by every poqt host.
//!
//! - `EnvFilter` from config, `POQT_LOG` or `RUST_LOG` (default `info`)
//! - console `fmt` layer
//! - optional OTLP span export when an endpoint is configured
//! - optional line sink (e.g. `poqt watch` appending to a log file)
//!
//! ```no_run
//! use poqt_observability::{init, ObservabilityConfig};
//!
//! let config = ObservabilityConfig::new("poqt").with_log_level("debug");
//! init(config)?;
//! tracing::info!("started");
//! # Ok::<(), poqt_observability::ObservabilityError>(())
//! ```

pub mod config;
pub mod error;
pub mod sink_layer;
pub mod spans;
pub mod telemetry;

pub use config::{LogSink, ObservabilityConfig};
pub use error::ObservabilityError;
pub use telemetry::{init, init_from_env, shutdown};
pub use spans::record_error;
