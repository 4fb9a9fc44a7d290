//! # Engine configuration.
//!
//! Provides [`EngineConfig`], the settings shared by the controller, the
//! runtime factory and the module sequencer.
//!
//! ## Sentinel values
//! - `init_timeout = 0s` → no watchdog
//! - `bus_capacity = 0` → clamped to 1
//! - `group_id = -1` → no shared script group

use std::time::Duration;

use crate::capabilities::BundleSource;

/// Configuration for one engine instance.
///
/// ## Field semantics
/// - `debug_mode`: development pipeline on (remote core bundle, render tree survives reload)
/// - `init_timeout`: watchdog for each init/restart attempt (`0s` = disabled)
/// - `bus_capacity`: event bus ring buffer size (min 1; clamped by Bus)
/// - `affinity_thread_name`: name of the default notification thread
/// - `core_bundle`: core script handed to the bridge (release mode)
/// - `preload_bundle`: bundle run against the preload root after each successful init
/// - `dev_server_host` / `debug_bundle_name`: debug-mode core bundle location
/// - `group_id`: bridge group for shared script contexts (`-1` = none)
///
/// ## Notes
/// All fields are public for flexibility. Prefer the helper accessors to avoid
/// sprinkling sentinel checks across the codebase.
#[derive(Clone, Debug)]
pub struct EngineConfig {
    /// Development mode.
    ///
    /// - core bundle is fetched from the dev server,
    /// - module loads skip bundle execution,
    /// - `reload()` carries the render tree into the next context.
    pub debug_mode: bool,

    /// Watchdog duration for one initialization attempt.
    ///
    /// - `Duration::ZERO` = no watchdog
    /// - `> 0` = attempt settles as `Timeout` if the bridge has not answered
    pub init_timeout: Duration,

    /// Capacity of the event bus broadcast channel ring buffer.
    pub bus_capacity: usize,

    /// Thread name used by the default affinity executor.
    pub affinity_thread_name: String,

    /// Core script bundle (ignored in debug mode).
    pub core_bundle: Option<BundleSource>,

    /// Bundle run against the preload root after every successful initialization.
    pub preload_bundle: Option<BundleSource>,

    /// Development server host, e.g. `localhost:38989`.
    pub dev_server_host: String,

    /// Bundle name served by the development server.
    pub debug_bundle_name: String,

    /// Bridge group id (`-1` = none).
    pub group_id: i32,
}

impl EngineConfig {
    /// Returns the watchdog duration as an `Option`.
    ///
    /// - `None` → no watchdog
    /// - `Some(d)` → attempt times out after `d`
    #[inline]
    pub fn init_timeout(&self) -> Option<Duration> {
        if self.init_timeout == Duration::ZERO {
            None
        } else {
            Some(self.init_timeout)
        }
    }

    /// Returns a bus capacity clamped to a minimum of 1.
    #[inline]
    pub fn bus_capacity_clamped(&self) -> usize {
        self.bus_capacity.max(1)
    }

    /// Returns the group id as an `Option`.
    #[inline]
    pub fn group(&self) -> Option<i32> {
        if self.group_id < 0 {
            None
        } else {
            Some(self.group_id)
        }
    }

    /// Core bundle the bridge should execute.
    ///
    /// In debug mode the bundle is served by the development server; otherwise
    /// the configured [`EngineConfig::core_bundle`] is used.
    pub fn effective_core_bundle(&self) -> Option<BundleSource> {
        if self.debug_mode {
            let url = format!(
                "http://{}/{}",
                self.dev_server_host.trim_end_matches('/'),
                self.debug_bundle_name.trim_start_matches('/')
            );
            Some(BundleSource::Remote(url))
        } else {
            self.core_bundle.clone()
        }
    }
}

impl Default for EngineConfig {
    /// Default configuration:
    ///
    /// - `debug_mode = false`
    /// - `init_timeout = 10s`
    /// - `bus_capacity = 1024`
    /// - `affinity_thread_name = "engine-affinity"`
    /// - no core/preload bundle
    /// - `dev_server_host = "localhost:38989"`, `debug_bundle_name = "index.bundle"`
    /// - `group_id = -1`
    fn default() -> Self {
        Self {
            debug_mode: false,
            init_timeout: Duration::from_secs(10),
            bus_capacity: 1024,
            affinity_thread_name: "engine-affinity".to_string(),
            core_bundle: None,
            preload_bundle: None,
            dev_server_host: "localhost:38989".to_string(),
            debug_bundle_name: "index.bundle".to_string(),
            group_id: -1,
        }
    }
}
