//! Embeddable benchmark dashboard for gateway releases
//!
//! Compiles to WebAssembly. Every element carrying `data-benchmark-dashboard`
//! gets its own widget inside a closed shadow root; `data-*` attributes on the
//! element configure it.
//!
//! The page is scanned on `DOMContentLoaded` and again on `load`. Pages that
//! add markers later call `window.initBenchmarkDashboards()`.

use dioxus::prelude::VirtualDom;
use futures::channel::mpsc::{self, UnboundedSender};
use gateway_bench_core::embed::{
    Bootstrapper, ContentRenderer, EmbedConfig, RenderComplete, RenderHandle, StyleProvisioner, Theme,
    WidgetHost,
};
use gateway_bench_core::{BenchmarkCatalog, SelectionState};
use std::cell::RefCell;
use std::rc::Rc;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;

mod dom;
mod styles;
mod widget;

use dom::{BrowserSpawner, WebDocument, WebPage, WindowCssSource};
use widget::{Widget, WidgetProps};

/// Global entry point for pages that assemble markers after load
const INIT_GLOBAL: &str = "initBenchmarkDashboards";

/// Version shown when a marker requests none or an unknown one
const DEFAULT_VERSIONS: [&str; 1] = ["1.6.1"];

type PageBootstrapper = Bootstrapper<WebDocument, WebPage, DioxusRenderer, BrowserSpawner>;

/// Forwards theme switches into a running widget
struct ThemeSwitch(UnboundedSender<Theme>);

impl RenderHandle for ThemeSwitch {
    fn set_theme(&self, theme: Theme) {
        if self.0.unbounded_send(theme).is_err() {
            tracing::warn!(?theme, "widget stopped before theme switch");
        }
    }
}

/// Launches a Dioxus virtual DOM into the widget container
struct DioxusRenderer;

impl ContentRenderer for DioxusRenderer {
    type Node = web_sys::Element;
    type Handle = ThemeSwitch;

    fn render(
        &self,
        container: &web_sys::Element,
        selection: SelectionState,
        config: &EmbedConfig,
        on_complete: RenderComplete,
    ) -> gateway_bench_core::Result<ThemeSwitch> {
        let (sender, receiver) = mpsc::unbounded();
        let props = WidgetProps {
            selection,
            config: config.clone(),
            on_complete,
            themes: Rc::new(RefCell::new(Some(receiver))),
        };
        let vdom = VirtualDom::new_with_props(Widget, props);
        let web_config = dioxus_web::Config::new().rootelement(container.clone());
        // Each widget drives its own virtual DOM for the life of the page
        wasm_bindgen_futures::spawn_local(async move {
            dioxus_web::run(vdom, web_config).await;
        });
        Ok(ThemeSwitch(sender))
    }
}

fn build_bootstrapper() -> gateway_bench_core::Result<PageBootstrapper> {
    let document = dom::window_document()?;
    let catalog = Rc::new(BenchmarkCatalog::bundled()?);
    tracing::info!(snapshots = catalog.len(), "benchmark catalog loaded");

    let host = WidgetHost::new(
        StyleProvisioner::new(WindowCssSource),
        catalog,
        Rc::new(WebPage::new(document.clone())),
        DioxusRenderer,
        BrowserSpawner,
    )
    .with_default_versions(DEFAULT_VERSIONS.iter().map(|v| v.to_string()).collect());

    Ok(Bootstrapper::new(WebDocument::new(document), host))
}

/// Expose the scan on `window` and run it at both page lifecycle points
fn install(bootstrapper: Rc<PageBootstrapper>) -> Result<(), JsValue> {
    let window = web_sys::window().ok_or_else(|| JsValue::from_str("no window"))?;
    let document = window
        .document()
        .ok_or_else(|| JsValue::from_str("no document"))?;

    let scan = {
        let bootstrapper = Rc::clone(&bootstrapper);
        Closure::<dyn Fn()>::new(move || {
            bootstrapper.scan_and_init();
        })
    };
    js_sys::Reflect::set(&window, &JsValue::from_str(INIT_GLOBAL), scan.as_ref())?;
    document.add_event_listener_with_callback("DOMContentLoaded", scan.as_ref().unchecked_ref())?;
    window.add_event_listener_with_callback("load", scan.as_ref().unchecked_ref())?;
    // Lives as long as the page
    scan.forget();

    // The module may load after DOMContentLoaded has already fired
    if document.ready_state() != "loading" {
        bootstrapper.scan_and_init();
    }
    Ok(())
}

fn main() {
    tracing_wasm::set_as_global_default();

    let bootstrapper = match build_bootstrapper() {
        Ok(bootstrapper) => Rc::new(bootstrapper),
        Err(e) => {
            tracing::error!(error = %e, "benchmark dashboard unavailable");
            return;
        }
    };

    if let Err(e) = install(bootstrapper) {
        tracing::error!(error = ?e, "failed to install benchmark dashboard entry points");
    }
}
