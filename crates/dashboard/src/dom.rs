//! Browser implementations of the embedding traits
//!
//! Each widget lives in a closed shadow root attached to its marker element.
//! Page-level side effects (root dark class, portal overrides, timers) go
//! through [`WebPage`].

use futures::future::{self, FutureExt, LocalBoxFuture, LocalFutureObj};
use futures::task::{LocalSpawn, SpawnError};
use gateway_bench_core::embed::{
    CssSource, HostDocument, HostElement, IsolationBoundary, PageChrome, StyleNode, Theme,
    HOST_CLASS,
};
use gateway_bench_core::{Error, Result};
use std::cell::RefCell;
use std::time::Duration;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{Document, Element, HtmlStyleElement, ShadowRoot, ShadowRootInit, ShadowRootMode};

/// Global a build step may set to the compiled stylesheet
pub const BUNDLED_CSS_GLOBAL: &str = "__BENCHMARK_CSS__";

/// Id of the page-level style element holding the portal overrides
const PORTAL_STYLE_ID: &str = "benchmark-dashboard-portal-overrides";

const DARK_CLASS: &str = "dark";

fn js_error(context: &str, value: JsValue) -> Error {
    Error::Embed(format!("{}: {:?}", context, value))
}

pub fn window_document() -> Result<Document> {
    web_sys::window()
        .and_then(|w| w.document())
        .ok_or_else(|| Error::Embed("no document available".to_string()))
}

fn create_style(document: &Document) -> Result<HtmlStyleElement> {
    document
        .create_element("style")
        .map_err(|e| js_error("create style element", e))?
        .dyn_into::<HtmlStyleElement>()
        .map_err(|_| Error::Embed("style element has unexpected type".to_string()))
}

/// The live page document
pub struct WebDocument {
    document: Document,
}

impl WebDocument {
    pub fn new(document: Document) -> Self {
        Self { document }
    }
}

impl HostDocument for WebDocument {
    type Element = WebElement;

    fn find_marked(&self, attribute: &str) -> Vec<WebElement> {
        let list = match self.document.query_selector_all(&format!("[{}]", attribute)) {
            Ok(list) => list,
            Err(e) => {
                tracing::error!(error = ?e, attribute, "marker query failed");
                return Vec::new();
            }
        };

        (0..list.length())
            .filter_map(|i| list.get(i))
            .filter_map(|node| node.dyn_into::<Element>().ok())
            .map(|element| WebElement { element })
            .collect()
    }
}

/// A marker element in the page
pub struct WebElement {
    element: Element,
}

impl HostElement for WebElement {
    type Boundary = ShadowBoundary;

    fn attribute(&self, name: &str) -> Option<String> {
        self.element.get_attribute(name)
    }

    fn set_attribute(&self, name: &str, value: &str) -> Result<()> {
        self.element
            .set_attribute(name, value)
            .map_err(|e| js_error("set attribute", e))
    }

    fn attach_boundary(&self) -> Result<ShadowBoundary> {
        let init = ShadowRootInit::new(ShadowRootMode::Closed);
        let root = self
            .element
            .attach_shadow(&init)
            .map_err(|e| js_error("attach shadow root", e))?;
        self.element
            .class_list()
            .add_1(HOST_CLASS)
            .map_err(|e| js_error("add host class", e))?;

        Ok(ShadowBoundary {
            host: self.element.clone(),
            root,
        })
    }
}

/// Closed shadow root of one widget; the theme class sits on its host
pub struct ShadowBoundary {
    host: Element,
    root: ShadowRoot,
}

impl ShadowBoundary {
    fn document(&self) -> Result<Document> {
        self.host
            .owner_document()
            .ok_or_else(|| Error::Embed("host element is detached".to_string()))
    }
}

impl IsolationBoundary for ShadowBoundary {
    type Node = Element;
    type Style = WebStyle;

    fn set_theme(&self, theme: Theme) {
        if let Err(e) = self.host.class_list().toggle_with_force(DARK_CLASS, theme.is_dark()) {
            tracing::warn!(error = ?e, "failed to set boundary theme");
        }
    }

    fn create_container(&self, id: &str, class: Option<&str>) -> Result<Element> {
        let container = self
            .document()?
            .create_element("div")
            .map_err(|e| js_error("create container", e))?;
        container.set_id(id);
        if let Some(class) = class {
            container.set_class_name(class);
        }
        self.root
            .append_child(&container)
            .map_err(|e| js_error("append container", e))?;
        Ok(container)
    }

    fn inject_style(&self, container: &Element) -> Result<WebStyle> {
        let style = create_style(&self.document()?)?;
        self.root
            .insert_before(&style, Some(container))
            .map_err(|e| js_error("insert style", e))?;
        Ok(WebStyle { element: style })
    }

    fn dispose(&self) {
        while let Some(child) = self.root.first_child() {
            if let Err(e) = self.root.remove_child(&child) {
                tracing::warn!(error = ?e, "failed to clear shadow root");
                break;
            }
        }
        if let Err(e) = self.host.class_list().remove_2(HOST_CLASS, DARK_CLASS) {
            tracing::warn!(error = ?e, "failed to clear host classes");
        }
    }
}

#[derive(Clone)]
pub struct WebStyle {
    element: HtmlStyleElement,
}

impl StyleNode for WebStyle {
    fn set_css(&self, css: &str) {
        self.element.set_text_content(Some(css));
    }
}

/// Page-wide chrome shared by all widgets
pub struct WebPage {
    document: Document,
    portal_style: RefCell<Option<HtmlStyleElement>>,
}

impl WebPage {
    pub fn new(document: Document) -> Self {
        Self {
            document,
            portal_style: RefCell::new(None),
        }
    }

    fn portal_style(&self) -> Result<HtmlStyleElement> {
        if let Some(style) = self.portal_style.borrow().as_ref() {
            return Ok(style.clone());
        }
        let style = create_style(&self.document)?;
        style.set_id(PORTAL_STYLE_ID);
        *self.portal_style.borrow_mut() = Some(style.clone());
        Ok(style)
    }
}

impl PageChrome for WebPage {
    fn set_root_dark(&self, dark: bool) {
        let Some(root) = self.document.document_element() else {
            return;
        };
        if let Err(e) = root.class_list().toggle_with_force(DARK_CLASS, dark) {
            tracing::warn!(error = ?e, "failed to toggle page dark class");
        }
    }

    fn install_portal_overrides(&self, css: &str) {
        let Some(head) = self.document.head() else {
            tracing::warn!("page has no head, portal overrides skipped");
            return;
        };
        match self.portal_style() {
            Ok(style) => {
                style.set_text_content(Some(css));
                // Appending again moves the rules after anything inserted since
                if let Err(e) = head.append_child(&style) {
                    tracing::warn!(error = ?e, "failed to install portal overrides");
                }
            }
            Err(e) => tracing::warn!(error = %e, "failed to create portal overrides"),
        }
    }

    fn remove_portal_overrides(&self) {
        if let Some(style) = self.portal_style.borrow_mut().take() {
            style.remove();
        }
    }

    fn schedule(&self, delay: Duration, task: Box<dyn FnOnce()>) {
        let Some(window) = web_sys::window() else {
            return;
        };
        let callback = Closure::once_into_js(move || task());
        let millis = i32::try_from(delay.as_millis()).unwrap_or(i32::MAX);
        if let Err(e) = window
            .set_timeout_with_callback_and_timeout_and_arguments_0(callback.unchecked_ref(), millis)
        {
            tracing::warn!(error = ?e, "failed to schedule timer");
        }
    }
}

/// Runs futures on the browser microtask queue
#[derive(Clone, Copy, Default)]
pub struct BrowserSpawner;

impl LocalSpawn for BrowserSpawner {
    fn spawn_local_obj(&self, future: LocalFutureObj<'static, ()>) -> std::result::Result<(), SpawnError> {
        wasm_bindgen_futures::spawn_local(future);
        Ok(())
    }
}

/// Reads the stylesheet a build step attached to `window`
pub struct WindowCssSource;

impl CssSource for WindowCssSource {
    fn load(&self) -> LocalBoxFuture<'static, Result<Option<String>>> {
        let css = web_sys::window()
            .ok_or_else(|| Error::Embed("no window available".to_string()))
            .and_then(|window| {
                js_sys::Reflect::get(&window, &JsValue::from_str(BUNDLED_CSS_GLOBAL))
                    .map_err(|e| js_error("read bundled stylesheet", e))
            })
            .map(|value| value.as_string().filter(|css| !css.trim().is_empty()));
        future::ready(css).boxed_local()
    }
}
