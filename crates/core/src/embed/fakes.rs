//! In-memory implementations of the embedding traits for tests

use super::bootstrap::HostDocument;
use super::config::{EmbedConfig, Theme};
use super::host::{
    ContentRenderer, HostElement, IsolationBoundary, PageChrome, RenderComplete, RenderHandle, StyleNode,
};
use super::styles::CssSource;
use crate::error::{Error, Result};
use crate::selection::SelectionState;
use futures::future::{self, FutureExt, LocalBoxFuture};
use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;
use std::rc::Rc;
use std::time::Duration;

pub struct FakeCssSource {
    css: std::result::Result<Option<String>, String>,
    loads: Rc<Cell<usize>>,
}

impl FakeCssSource {
    pub fn ok(css: &str) -> Self {
        Self {
            css: Ok(Some(css.to_string())),
            loads: Rc::default(),
        }
    }

    pub fn missing() -> Self {
        Self {
            css: Ok(None),
            loads: Rc::default(),
        }
    }

    pub fn failing() -> Self {
        Self {
            css: Err("bundle unreadable".to_string()),
            loads: Rc::default(),
        }
    }

    pub fn loads(&self) -> Rc<Cell<usize>> {
        Rc::clone(&self.loads)
    }
}

impl CssSource for FakeCssSource {
    fn load(&self) -> LocalBoxFuture<'static, Result<Option<String>>> {
        self.loads.set(self.loads.get() + 1);
        let result = self.css.clone().map_err(Error::Embed);
        future::ready(result).boxed_local()
    }
}

#[derive(Clone, Default)]
pub struct FakeStyle {
    css: Rc<RefCell<Option<String>>>,
}

impl FakeStyle {
    pub fn css(&self) -> Option<String> {
        self.css.borrow().clone()
    }
}

impl StyleNode for FakeStyle {
    fn set_css(&self, css: &str) {
        *self.css.borrow_mut() = Some(css.to_string());
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct FakeContainer {
    pub id: String,
    pub class: Option<String>,
}

#[derive(Default)]
struct BoundaryState {
    /// Child labels in insertion order
    children: Vec<String>,
    theme: Option<Theme>,
    disposed: bool,
}

#[derive(Clone, Default)]
pub struct FakeBoundary {
    state: Rc<RefCell<BoundaryState>>,
}

impl FakeBoundary {
    pub fn layout(&self) -> Vec<String> {
        self.state.borrow().children.clone()
    }

    pub fn theme(&self) -> Option<Theme> {
        self.state.borrow().theme
    }

    pub fn is_disposed(&self) -> bool {
        self.state.borrow().disposed
    }
}

impl IsolationBoundary for FakeBoundary {
    type Node = FakeContainer;
    type Style = FakeStyle;

    fn set_theme(&self, theme: Theme) {
        self.state.borrow_mut().theme = Some(theme);
    }

    fn create_container(&self, id: &str, class: Option<&str>) -> Result<FakeContainer> {
        self.state.borrow_mut().children.push(format!("container#{}", id));
        Ok(FakeContainer {
            id: id.to_string(),
            class: class.map(str::to_string),
        })
    }

    fn inject_style(&self, container: &FakeContainer) -> Result<FakeStyle> {
        let mut state = self.state.borrow_mut();
        let label = format!("container#{}", container.id);
        let index = state
            .children
            .iter()
            .position(|c| *c == label)
            .ok_or_else(|| Error::Embed("container not in boundary".to_string()))?;
        state.children.insert(index, "style".to_string());
        Ok(FakeStyle::default())
    }

    fn dispose(&self) {
        let mut state = self.state.borrow_mut();
        state.children.clear();
        state.disposed = true;
    }
}

#[derive(Clone, Default)]
pub struct FakeElement {
    attributes: Rc<RefCell<BTreeMap<String, String>>>,
    boundary: Rc<RefCell<Option<FakeBoundary>>>,
}

impl FakeElement {
    pub fn new(attributes: &[(&str, &str)]) -> Self {
        let element = Self::default();
        element.attributes.borrow_mut().extend(
            attributes
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string())),
        );
        element
    }

    pub fn boundary(&self) -> Option<FakeBoundary> {
        self.boundary.borrow().clone()
    }
}

impl HostElement for FakeElement {
    type Boundary = FakeBoundary;

    fn attribute(&self, name: &str) -> Option<String> {
        self.attributes.borrow().get(name).cloned()
    }

    fn set_attribute(&self, name: &str, value: &str) -> Result<()> {
        self.attributes
            .borrow_mut()
            .insert(name.to_string(), value.to_string());
        Ok(())
    }

    fn attach_boundary(&self) -> Result<FakeBoundary> {
        let mut slot = self.boundary.borrow_mut();
        if slot.is_some() {
            return Err(Error::Embed("element already has a boundary".to_string()));
        }
        let boundary = FakeBoundary::default();
        *slot = Some(boundary.clone());
        Ok(boundary)
    }
}

#[derive(Clone, Default)]
pub struct FakeDocument {
    elements: Rc<RefCell<Vec<FakeElement>>>,
}

impl FakeDocument {
    pub fn new(elements: Vec<FakeElement>) -> Self {
        Self {
            elements: Rc::new(RefCell::new(elements)),
        }
    }

    pub fn push(&self, element: FakeElement) {
        self.elements.borrow_mut().push(element);
    }
}

impl HostDocument for FakeDocument {
    type Element = FakeElement;

    fn find_marked(&self, attribute: &str) -> Vec<FakeElement> {
        self.elements
            .borrow()
            .iter()
            .filter(|e| e.attribute(attribute).is_some())
            .cloned()
            .collect()
    }
}

#[derive(Default)]
pub struct FakePage {
    dark: Cell<bool>,
    overrides: RefCell<Option<String>>,
    installs: Cell<usize>,
    scheduled: RefCell<Vec<(Duration, Box<dyn FnOnce()>)>>,
}

impl FakePage {
    pub fn root_dark(&self) -> bool {
        self.dark.get()
    }

    pub fn overrides_installed(&self) -> bool {
        self.overrides.borrow().is_some()
    }

    pub fn installs(&self) -> usize {
        self.installs.get()
    }

    pub fn scheduled_delays(&self) -> Vec<Duration> {
        self.scheduled.borrow().iter().map(|(d, _)| *d).collect()
    }

    /// Fire every pending timer
    pub fn run_scheduled(&self) {
        let tasks = std::mem::take(&mut *self.scheduled.borrow_mut());
        for (_, task) in tasks {
            task();
        }
    }
}

impl PageChrome for FakePage {
    fn set_root_dark(&self, dark: bool) {
        self.dark.set(dark);
    }

    fn install_portal_overrides(&self, css: &str) {
        self.installs.set(self.installs.get() + 1);
        *self.overrides.borrow_mut() = Some(css.to_string());
    }

    fn remove_portal_overrides(&self) {
        *self.overrides.borrow_mut() = None;
    }

    fn schedule(&self, delay: Duration, task: Box<dyn FnOnce()>) {
        self.scheduled.borrow_mut().push((delay, task));
    }
}

/// Renders nothing; the handle is the selected version
#[derive(Default)]
pub struct FakeRenderer {
    fail: bool,
    complete: bool,
}

impl FakeRenderer {
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    /// Fires the completion hook during render
    pub fn completing() -> Self {
        Self {
            complete: true,
            ..Self::default()
        }
    }
}

/// What a [`FakeRenderer`] rendered
pub struct FakeRendered {
    pub version: String,
    theme: Cell<Theme>,
}

impl FakeRendered {
    pub fn theme(&self) -> Theme {
        self.theme.get()
    }
}

impl RenderHandle for FakeRendered {
    fn set_theme(&self, theme: Theme) {
        self.theme.set(theme);
    }
}

impl ContentRenderer for FakeRenderer {
    type Node = FakeContainer;
    type Handle = FakeRendered;

    fn render(
        &self,
        _container: &FakeContainer,
        selection: SelectionState,
        config: &EmbedConfig,
        on_complete: RenderComplete,
    ) -> Result<FakeRendered> {
        if self.fail {
            return Err(Error::Embed("render failed".to_string()));
        }
        if self.complete {
            on_complete();
        }
        Ok(FakeRendered {
            version: selection.selected_version().unwrap_or_default().to_string(),
            theme: Cell::new(config.theme),
        })
    }
}
