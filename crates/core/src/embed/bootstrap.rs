//! Finding marker elements and mounting a widget on each exactly once

use super::config::EmbedConfig;
use super::host::{ContentRenderer, HostElement, IsolationBoundary, MountedWidget, PageChrome, WidgetHost};
use futures::task::LocalSpawn;
use std::cell::RefCell;

/// Attribute that marks an element as a widget host
pub const MARKER_ATTR: &str = "data-benchmark-dashboard";

/// Set on a marker element once a widget is mounted on it
pub const INITIALIZED_ATTR: &str = "data-react-initialized";

/// Source of marker elements
pub trait HostDocument {
    type Element: HostElement;

    /// Every element carrying `attribute`, in document order
    fn find_marked(&self, attribute: &str) -> Vec<Self::Element>;
}

/// Outcome of one scan
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScanReport {
    pub mounted: usize,
    pub skipped: usize,
    pub failed: usize,
}

type Widget<D, R, P> =
    MountedWidget<<<D as HostDocument>::Element as HostElement>::Boundary, <R as ContentRenderer>::Handle, P>;

/// Scans a document for markers and mounts a widget on each new one.
///
/// Safe to call any number of times: initialized markers are skipped.
/// Mounted widgets are kept for the life of the bootstrapper.
pub struct Bootstrapper<D, P, R, S>
where
    D: HostDocument,
    P: PageChrome + 'static,
    R: ContentRenderer,
{
    document: D,
    host: WidgetHost<P, R, S>,
    widgets: RefCell<Vec<Widget<D, R, P>>>,
}

impl<D, P, R, S> Bootstrapper<D, P, R, S>
where
    D: HostDocument,
    <D::Element as HostElement>::Boundary: IsolationBoundary<Node = R::Node>,
    P: PageChrome + 'static,
    R: ContentRenderer,
    S: LocalSpawn,
{
    pub fn new(document: D, host: WidgetHost<P, R, S>) -> Self {
        Self {
            document,
            host,
            widgets: RefCell::new(Vec::new()),
        }
    }

    pub fn widget_count(&self) -> usize {
        self.widgets.borrow().len()
    }

    /// Mount every marker that is not yet initialized.
    ///
    /// A marker that fails to mount is logged and left unflagged; the other
    /// markers are still processed.
    pub fn scan_and_init(&self) -> ScanReport {
        let mut report = ScanReport::default();

        for element in self.document.find_marked(MARKER_ATTR) {
            if element.attribute(INITIALIZED_ATTR).as_deref() == Some("true") {
                report.skipped += 1;
                continue;
            }

            let config = EmbedConfig::from_attributes(|name| element.attribute(name));
            match self.host.mount(&element, &config) {
                Ok(widget) => {
                    if let Err(e) = element.set_attribute(INITIALIZED_ATTR, "true") {
                        tracing::warn!(error = %e, "failed to flag initialized dashboard");
                    }
                    self.widgets.borrow_mut().push(widget);
                    report.mounted += 1;
                }
                Err(e) => {
                    tracing::error!(error = %e, "failed to initialize benchmark dashboard");
                    report.failed += 1;
                }
            }
        }

        if report.mounted > 0 || report.failed > 0 {
            tracing::info!(
                mounted = report.mounted,
                skipped = report.skipped,
                failed = report.failed,
                "benchmark dashboard scan complete"
            );
        }
        report
    }
}
