//! # Module load requests.
//!
//! A [`ModuleLoadRequest`] describes one application component to mount on a
//! host surface. Requests are validated before any surface or bridge work:
//!
//! - a host context is required,
//! - outside debug mode a non-empty bundle source is required (an explicit
//!   loader always qualifies),
//! - the resolved source path is published to the script side as the
//!   `sourcePath` instance parameter.

use serde_json::{Map, Value};

use crate::capabilities::{BundleSource, HostContext};
use crate::error::EngineError;

/// Parameters passed to the script-side instance.
pub type InstanceParams = Map<String, Value>;

/// Instance parameter carrying the bundle path.
pub const SOURCE_PATH_PARAM: &str = "sourcePath";

/// Immutable description of a module to load.
#[derive(Clone, Debug)]
pub struct ModuleLoadRequest {
    host: Option<HostContext>,
    component_name: String,
    source: Option<BundleSource>,
    params: InstanceParams,
}

impl ModuleLoadRequest {
    /// Creates a request for `component_name` with no host, source or params.
    pub fn new(component_name: impl Into<String>) -> Self {
        Self {
            host: None,
            component_name: component_name.into(),
            source: None,
            params: InstanceParams::new(),
        }
    }

    /// Sets the host that will own the render surface.
    pub fn with_host(mut self, host: HostContext) -> Self {
        self.host = Some(host);
        self
    }

    /// Sets the bundle to execute before instantiating the component.
    pub fn with_source(mut self, source: BundleSource) -> Self {
        self.source = Some(source);
        self
    }

    /// Sets the instance parameters.
    pub fn with_params(mut self, params: InstanceParams) -> Self {
        self.params = params;
        self
    }

    pub fn host(&self) -> Option<&HostContext> {
        self.host.as_ref()
    }

    pub fn component_name(&self) -> &str {
        &self.component_name
    }

    pub fn source(&self) -> Option<&BundleSource> {
        self.source.as_ref()
    }

    pub fn params(&self) -> &InstanceParams {
        &self.params
    }

    /// Checks the request against the engine mode.
    pub fn validate(&self, debug_mode: bool) -> Result<(), EngineError> {
        if self.host.is_none() {
            return Err(EngineError::invalid_argument("host context is required"));
        }
        if debug_mode {
            return Ok(());
        }
        match &self.source {
            None => Err(EngineError::invalid_argument("bundle source is required")),
            Some(src) if src.is_empty() => {
                Err(EngineError::invalid_argument("bundle source path is empty"))
            }
            Some(_) => Ok(()),
        }
    }

    /// Consumes the request into its parts, publishing `sourcePath` into the params.
    pub(crate) fn into_parts(self) -> (Option<HostContext>, String, Option<BundleSource>, InstanceParams) {
        let mut params = self.params;
        if let Some(src) = &self.source {
            params.insert(SOURCE_PATH_PARAM.to_string(), Value::String(src.path().into_owned()));
        }
        (self.host, self.component_name, self.source, params)
    }
}
