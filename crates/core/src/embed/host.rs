//! Mounting a widget into an isolation boundary on a host element

use super::config::{EmbedConfig, Theme};
use super::styles::{fallback_css, StyleProvisioner};
use crate::catalog::BenchmarkCatalog;
use crate::error::Result;
use crate::selection::SelectionState;
use futures::task::{LocalSpawn, LocalSpawnExt};
use std::cell::Cell;
use std::rc::Rc;
use std::time::Duration;

/// Class carried by every boundary host; the theme tokens key on it
pub const HOST_CLASS: &str = "benchmark-dashboard";

/// Id of the content container inside the boundary
pub const CONTAINER_ID: &str = "shadow-root";

/// Delay before portal overrides are applied a second time
pub const PORTAL_REAPPLY_DELAY: Duration = Duration::from_millis(100);

/// Page-level rules that keep floating content rendered outside the boundary on top
pub const PORTAL_OVERRIDE_CSS: &str = r#"
[data-radix-popper-content-wrapper] {
  z-index: 9999 !important;
}
.relative.z-50 {
  z-index: 9999 !important;
}
"#;

/// An element that can carry a widget
pub trait HostElement {
    type Boundary: IsolationBoundary;

    fn attribute(&self, name: &str) -> Option<String>;
    fn set_attribute(&self, name: &str, value: &str) -> Result<()>;

    /// Attach an isolation boundary. Fails if the element already has one.
    fn attach_boundary(&self) -> Result<Self::Boundary>;
}

/// A rendering subtree closed to the surrounding page's styles
pub trait IsolationBoundary {
    /// Handle to a node inside the boundary
    type Node;
    type Style: StyleNode + Clone + 'static;

    /// Mark the boundary root with the theme
    fn set_theme(&self, theme: Theme);

    fn create_container(&self, id: &str, class: Option<&str>) -> Result<Self::Node>;

    /// Insert an empty style node directly before `container`
    fn inject_style(&self, container: &Self::Node) -> Result<Self::Style>;

    /// Remove everything the boundary holds
    fn dispose(&self);
}

pub trait StyleNode {
    fn set_css(&self, css: &str);
}

/// Page-wide side effects outside any boundary
pub trait PageChrome {
    /// Toggle the `dark` class on the document root
    fn set_root_dark(&self, dark: bool);

    /// Install or refresh the portal override rules. Must be idempotent.
    fn install_portal_overrides(&self, css: &str);

    fn remove_portal_overrides(&self);

    /// Run `task` once after `delay`
    fn schedule(&self, delay: Duration, task: Box<dyn FnOnce()>);
}

/// Invoked by a renderer once its content is on screen
pub type RenderComplete = Rc<dyn Fn()>;

/// Rendered content that can follow a theme switch after mounting
pub trait RenderHandle {
    fn set_theme(&self, _theme: Theme) {}
}

impl RenderHandle for () {}

/// Mounts the presentation layer into a container
pub trait ContentRenderer {
    type Node;
    /// Keeps the rendered content alive
    type Handle: RenderHandle;

    fn render(
        &self,
        container: &Self::Node,
        selection: SelectionState,
        config: &EmbedConfig,
        on_complete: RenderComplete,
    ) -> Result<Self::Handle>;
}

/// Reference count of mounted widgets needing the portal overrides
struct PortalOverrides<P: PageChrome> {
    page: Rc<P>,
    users: Rc<Cell<usize>>,
}

impl<P: PageChrome> Clone for PortalOverrides<P> {
    fn clone(&self) -> Self {
        Self {
            page: Rc::clone(&self.page),
            users: Rc::clone(&self.users),
        }
    }
}

impl<P: PageChrome + 'static> PortalOverrides<P> {
    fn acquire(&self) {
        let users = self.users.get();
        self.users.set(users + 1);
        if users == 0 {
            self.page.install_portal_overrides(PORTAL_OVERRIDE_CSS);
        }

        let page = Rc::clone(&self.page);
        let users = Rc::clone(&self.users);
        self.page.schedule(
            PORTAL_REAPPLY_DELAY,
            Box::new(move || {
                if users.get() > 0 {
                    page.install_portal_overrides(PORTAL_OVERRIDE_CSS);
                }
            }),
        );
    }

    fn reapply(&self) {
        if self.users.get() > 0 {
            self.page.install_portal_overrides(PORTAL_OVERRIDE_CSS);
        }
    }

    fn release(&self) {
        let users = self.users.get().saturating_sub(1);
        self.users.set(users);
        if users == 0 {
            self.page.remove_portal_overrides();
        }
    }
}

/// Mounts widgets for one page.
///
/// Shares the stylesheet provisioner, the catalog and the portal override
/// count between the widgets it mounts; each widget gets its own selection.
pub struct WidgetHost<P: PageChrome, R, S> {
    provisioner: Rc<StyleProvisioner>,
    catalog: Rc<BenchmarkCatalog>,
    default_versions: Vec<String>,
    portals: PortalOverrides<P>,
    renderer: R,
    spawner: S,
}

impl<P, R, S> WidgetHost<P, R, S>
where
    P: PageChrome + 'static,
    R: ContentRenderer,
    S: LocalSpawn,
{
    pub fn new(
        provisioner: Rc<StyleProvisioner>,
        catalog: Rc<BenchmarkCatalog>,
        page: Rc<P>,
        renderer: R,
        spawner: S,
    ) -> Self {
        Self {
            provisioner,
            catalog,
            default_versions: Vec::new(),
            portals: PortalOverrides {
                page,
                users: Rc::new(Cell::new(0)),
            },
            renderer,
            spawner,
        }
    }

    /// Versions tried, in order, when a widget requests none or an unknown one
    pub fn with_default_versions(mut self, versions: Vec<String>) -> Self {
        self.default_versions = versions;
        self
    }

    /// Widgets currently holding the portal overrides
    pub fn mounted_count(&self) -> usize {
        self.portals.users.get()
    }

    /// Mount a widget on `host`.
    ///
    /// The style node is inserted before the container and filled once the
    /// stylesheet resolves; rendering does not wait for it. Anything set up
    /// before a failing step is torn down again.
    pub fn mount<E>(&self, host: &E, config: &EmbedConfig) -> Result<MountedWidget<E::Boundary, R::Handle, P>>
    where
        E: HostElement,
        E::Boundary: IsolationBoundary<Node = R::Node>,
    {
        let boundary = host.attach_boundary()?;
        boundary.set_theme(config.theme);

        let (container, style) = match boundary
            .create_container(CONTAINER_ID, config.container_class.as_deref())
            .and_then(|container| boundary.inject_style(&container).map(|style| (container, style)))
        {
            Ok(nodes) => nodes,
            Err(e) => {
                boundary.dispose();
                return Err(e);
            }
        };

        self.portals.acquire();

        let mut widget = MountedWidget {
            boundary,
            container,
            style: style.clone(),
            handle: None,
            theme: Cell::new(config.theme),
            portals: self.portals.clone(),
        };

        match self.provisioner.cached() {
            Some(css) => style.set_css(&css),
            None => {
                let css = self.provisioner.isolation_css();
                let fill = style.clone();
                if let Err(e) = self.spawner.spawn_local(async move {
                    fill.set_css(&css.await);
                }) {
                    tracing::warn!(error = %e, "could not spawn stylesheet fill, using fallback");
                    style.set_css(&fallback_css());
                }
            }
        }

        let selection = SelectionState::new(
            Rc::clone(&self.catalog),
            config.version.as_deref(),
            &self.default_versions,
        );
        tracing::debug!(
            version = selection.selected_version().unwrap_or("<none>"),
            theme = ?config.theme,
            "mounting benchmark dashboard"
        );
        let portals = self.portals.clone();
        let on_complete: RenderComplete = Rc::new(move || portals.reapply());
        widget.handle = Some(self.renderer.render(&widget.container, selection, config, on_complete)?);

        // Page-wide, so only touched once the widget is actually on screen
        self.portals.page.set_root_dark(config.theme.is_dark());
        Ok(widget)
    }
}

/// A widget mounted on a host element.
///
/// Dropping it disposes the boundary and releases the portal overrides.
pub struct MountedWidget<B: IsolationBoundary, H, P: PageChrome + 'static> {
    boundary: B,
    container: B::Node,
    style: B::Style,
    handle: Option<H>,
    theme: Cell<Theme>,
    portals: PortalOverrides<P>,
}

impl<B: IsolationBoundary, H: RenderHandle, P: PageChrome + 'static> MountedWidget<B, H, P> {
    pub fn theme(&self) -> Theme {
        self.theme.get()
    }

    /// Switch theme on the boundary, the rendered content and the page root
    pub fn set_theme(&self, theme: Theme) {
        self.theme.set(theme);
        self.boundary.set_theme(theme);
        if let Some(handle) = &self.handle {
            handle.set_theme(theme);
        }
        self.portals.page.set_root_dark(theme.is_dark());
    }

    /// Same as the hook handed to the renderer
    pub fn render_complete(&self) {
        self.portals.reapply();
    }

    pub fn container(&self) -> &B::Node {
        &self.container
    }

    pub fn style(&self) -> &B::Style {
        &self.style
    }

    pub fn handle(&self) -> Option<&H> {
        self.handle.as_ref()
    }
}

impl<B: IsolationBoundary, H, P: PageChrome + 'static> Drop for MountedWidget<B, H, P> {
    fn drop(&mut self) {
        self.handle = None;
        self.boundary.dispose();
        self.portals.release();
    }
}
