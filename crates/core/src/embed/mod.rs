//! Embedding the dashboard into arbitrary host pages
//!
//! The DOM is reached only through the traits in [`host`] and [`bootstrap`],
//! so the mounting rules can be exercised without a browser. The WASM front
//! end provides the web-sys implementations.

pub mod bootstrap;
pub mod config;
pub mod host;
pub mod styles;

#[cfg(test)]
pub(crate) mod fakes;

pub use bootstrap::{Bootstrapper, HostDocument, ScanReport, INITIALIZED_ATTR, MARKER_ATTR};
pub use config::{EmbedConfig, Tab, Theme};
pub use host::{
    ContentRenderer, HostElement, IsolationBoundary, MountedWidget, PageChrome, RenderComplete,
    RenderHandle, StyleNode, WidgetHost, CONTAINER_ID, HOST_CLASS, PORTAL_OVERRIDE_CSS, PORTAL_REAPPLY_DELAY,
};
pub use styles::{fallback_css, transform_for_isolation, CssSource, StyleProvisioner};
