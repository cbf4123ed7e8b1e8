//! Stylesheet for the isolation boundary, resolved once per page
//!
//! The bundled stylesheet targets a normal document, so `:root`, `body` and
//! `.dark` rules are rewritten onto the boundary host before use. When no
//! bundled stylesheet is available, or rewriting fails, a hand-written
//! fallback is used instead.

use crate::error::Result;
use futures::future::{self, FutureExt, LocalBoxFuture, Shared};
use regex::Regex;
use std::cell::RefCell;
use std::rc::{Rc, Weak};

/// Where the bundled stylesheet comes from
pub trait CssSource {
    /// The bundled stylesheet, `None` when the build did not attach one
    fn load(&self) -> LocalBoxFuture<'static, Result<Option<String>>>;
}

/// Host rules that cut inheritance from the surrounding page
const BOUNDARY_RESET_CSS: &str = r#"
:host {
  all: initial;
  display: block;
  font-family: system-ui, -apple-system, BlinkMacSystemFont, "Segoe UI", Roboto, "Helvetica Neue", Arial, sans-serif;
  line-height: 1.5;
  -webkit-font-smoothing: antialiased;
  -moz-osx-font-smoothing: grayscale;
  color: hsl(var(--foreground));
  background: hsl(var(--background));
}

* {
  box-sizing: border-box;
}

#shadow-root {
  width: 100%;
  min-height: 100%;
  position: relative;
}

:host([hidden]) {
  display: none;
}
"#;

const THEME_TOKENS_CSS: &str = r#"
:host(.benchmark-dashboard) {
  --background: 0 0% 100%;
  --foreground: 222.2 84% 4.9%;
  --card: 0 0% 100%;
  --card-foreground: 222.2 84% 4.9%;
  --primary: 222.2 47.4% 11.2%;
  --primary-foreground: 210 40% 98%;
  --secondary: 210 40% 96.1%;
  --muted: 210 40% 96.1%;
  --muted-foreground: 215.4 16.3% 46.9%;
  --accent: 210 40% 96.1%;
  --destructive: 0 84.2% 60.2%;
  --border: 214.3 31.8% 91.4%;
  --ring: 222.2 84% 4.9%;
  --radius: 0.5rem;
}

:host(.benchmark-dashboard.dark) {
  --background: 222.2 84% 4.9%;
  --foreground: 210 40% 98%;
  --card: 222.2 84% 4.9%;
  --card-foreground: 210 40% 98%;
  --primary: 210 40% 98%;
  --primary-foreground: 222.2 47.4% 11.2%;
  --secondary: 217.2 32.6% 17.5%;
  --muted: 217.2 32.6% 17.5%;
  --muted-foreground: 215 20.2% 65.1%;
  --accent: 217.2 32.6% 17.5%;
  --destructive: 0 62.8% 30.6%;
  --border: 217.2 32.6% 17.5%;
  --ring: 212.7 26.8% 83.9%;
}
"#;

/// Layout primitives the widget markup relies on
const STRUCTURAL_CSS: &str = r#"
*, ::before, ::after {
  border-width: 0;
  border-style: solid;
  border-color: hsl(var(--border));
}

.flex { display: flex !important; }
.grid { display: grid !important; }
.hidden { display: none !important; }
.w-full { width: 100% !important; }
.items-center { align-items: center !important; }
.justify-between { justify-content: space-between !important; }
.gap-2 { gap: 0.5rem !important; }
.gap-4 { gap: 1rem !important; }
.grid-cols-2 { grid-template-columns: repeat(2, minmax(0, 1fr)) !important; }
.grid-cols-3 { grid-template-columns: repeat(3, minmax(0, 1fr)) !important; }
.p-4 { padding: 1rem !important; }
.mb-4 { margin-bottom: 1rem !important; }
.rounded-lg { border-radius: var(--radius) !important; }
.border { border-width: 1px !important; }
.relative { position: relative !important; }
.overflow-auto { overflow: auto !important; }
.text-sm { font-size: 0.875rem !important; line-height: 1.25rem !important; }
.font-semibold { font-weight: 600 !important; }
.bg-card { background-color: hsl(var(--card)) !important; color: hsl(var(--card-foreground)) !important; }
.text-muted { color: hsl(var(--muted-foreground)) !important; }

[data-state="active"] {
  background: linear-gradient(to right, #9333ea, #4f46e5) !important;
  color: white !important;
  border-bottom: 2px solid #9333ea !important;
}

table { border-collapse: collapse; width: 100%; }
th, td { padding: 0.5rem 0.75rem; text-align: left; border-bottom: 1px solid hsl(var(--border)); }

@media (max-width: 640px) {
  .grid-cols-2, .grid-cols-3 { grid-template-columns: repeat(1, minmax(0, 1fr)) !important; }
}
"#;

/// Reset rules placed ahead of every stylesheet inside the boundary
pub fn boundary_reset_css() -> &'static str {
    BOUNDARY_RESET_CSS
}

/// Minimal stylesheet used when the bundled one is unavailable
pub fn fallback_css() -> String {
    format!("{}\n{}\n{}", BOUNDARY_RESET_CSS, THEME_TOKENS_CSS, STRUCTURAL_CSS)
}

/// Move document-level selectors onto the boundary host.
///
/// `:root` and `body` become `:host`; `.dark`, `body.dark` and the
/// `.dark, body.dark` pair become `:host(.dark)`.
pub fn transform_for_isolation(css: &str) -> Result<String> {
    let rules = [
        (r":root\s*\{([^}]*)\}", ":host {$1}"),
        (r"\.dark\s*,\s*body\.dark\s*\{([^}]*)\}", ":host(.dark) {$1}"),
        (r"body\.dark\s*\{([^}]*)\}", ":host(.dark) {$1}"),
        (r"(^|[\s,}])\.dark\s*\{([^}]*)\}", "$1:host(.dark) {$2}"),
        (r"(^|[\s,}])body\s*\{([^}]*)\}", "$1:host {$2}"),
    ];

    let mut out = css.to_string();
    for (pattern, replacement) in rules {
        let re = Regex::new(pattern)?;
        out = re.replace_all(&out, replacement).into_owned();
    }
    Ok(out)
}

async fn resolve(load: LocalBoxFuture<'static, Result<Option<String>>>) -> String {
    match load.await {
        Ok(Some(css)) if !css.trim().is_empty() => match transform_for_isolation(&css) {
            Ok(transformed) => format!("{}\n{}", BOUNDARY_RESET_CSS, transformed),
            Err(e) => {
                tracing::warn!(error = %e, "failed to rewrite bundled CSS, using fallback");
                fallback_css()
            }
        },
        Ok(_) => {
            tracing::debug!("no bundled CSS attached, using fallback");
            fallback_css()
        }
        Err(e) => {
            tracing::warn!(error = %e, "failed to load bundled CSS, using fallback");
            fallback_css()
        }
    }
}

type SharedCss = Shared<LocalBoxFuture<'static, Rc<str>>>;

enum CssState {
    NotRequested,
    Pending(SharedCss),
    Cached(Rc<str>),
}

/// Page-wide provider of the isolation stylesheet.
///
/// Constructed once and shared by every widget host on the page. The first
/// request starts the load; requests made before it resolves await the same
/// in-flight future. Once resolved the stylesheet is cached for the life of
/// the provisioner.
pub struct StyleProvisioner {
    source: Box<dyn CssSource>,
    state: RefCell<CssState>,
}

impl StyleProvisioner {
    pub fn new(source: impl CssSource + 'static) -> Rc<Self> {
        Rc::new(Self {
            source: Box::new(source),
            state: RefCell::new(CssState::NotRequested),
        })
    }

    /// The isolation stylesheet. Never fails and is never empty.
    pub fn isolation_css(self: &Rc<Self>) -> LocalBoxFuture<'static, Rc<str>> {
        let mut state = self.state.borrow_mut();
        match &*state {
            CssState::Cached(css) => future::ready(Rc::clone(css)).boxed_local(),
            CssState::Pending(shared) => shared.clone().boxed_local(),
            CssState::NotRequested => {
                let load = self.source.load();
                let provisioner: Weak<Self> = Rc::downgrade(self);
                let shared = async move {
                    let css: Rc<str> = resolve(load).await.into();
                    if let Some(provisioner) = provisioner.upgrade() {
                        *provisioner.state.borrow_mut() = CssState::Cached(Rc::clone(&css));
                    }
                    css
                }
                .boxed_local()
                .shared();

                *state = CssState::Pending(shared.clone());
                shared.boxed_local()
            }
        }
    }

    /// The stylesheet if it has already resolved
    pub fn cached(&self) -> Option<Rc<str>> {
        match &*self.state.borrow() {
            CssState::Cached(css) => Some(Rc::clone(css)),
            _ => None,
        }
    }

    pub fn is_pending(&self) -> bool {
        matches!(&*self.state.borrow(), CssState::Pending(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::embed::fakes::FakeCssSource;
    use futures::executor::block_on;
    use futures::future::join;

    #[test]
    fn test_transform_root_and_dark_rules() {
        let css = ":root { --a: 1; }\n.dark, body.dark { --a: 2; }\nbody { margin: 0; }\n.dark { --b: 3; }\n.card { color: red; }";
        let out = transform_for_isolation(css).unwrap();

        assert!(out.contains(":host { --a: 1; }"));
        assert!(out.contains(":host(.dark) { --a: 2; }"));
        assert!(out.contains(":host(.dark) { --b: 3; }"));
        assert!(out.contains(":host { margin: 0; }"));
        assert!(out.contains(".card { color: red; }"));
        assert!(!out.contains(":root"));
        assert!(!out.contains("body"));
    }

    #[test]
    fn test_transform_leaves_similar_selectors() {
        let css = ".darker { color: black; }\n.tbody { color: blue; }";
        assert_eq!(transform_for_isolation(css).unwrap(), css);
    }

    #[test]
    fn test_fallback_is_never_empty() {
        let css = fallback_css();
        assert!(css.contains("all: initial"));
        assert!(css.contains(":host(.benchmark-dashboard.dark)"));
        assert!(css.contains(".flex"));
    }

    #[test]
    fn test_bundled_css_is_transformed_and_reset() {
        let provisioner = StyleProvisioner::new(FakeCssSource::ok(":root { --x: 1; }"));
        let css = block_on(provisioner.isolation_css());

        assert!(css.starts_with(BOUNDARY_RESET_CSS));
        assert!(css.contains(":host { --x: 1; }"));
        assert!(provisioner.cached().is_some());
    }

    #[test]
    fn test_failing_source_falls_back() {
        let provisioner = StyleProvisioner::new(FakeCssSource::failing());
        let css = block_on(provisioner.isolation_css());

        assert_eq!(&*css, fallback_css());
        assert!(css.contains("box-sizing: border-box"));
    }

    #[test]
    fn test_missing_bundle_falls_back() {
        let provisioner = StyleProvisioner::new(FakeCssSource::missing());
        assert_eq!(&*block_on(provisioner.isolation_css()), fallback_css());
    }

    #[test]
    fn test_concurrent_callers_share_one_load() {
        let source = FakeCssSource::ok(".dark { --y: 2; }");
        let loads = source.loads();
        let provisioner = StyleProvisioner::new(source);

        let first = provisioner.isolation_css();
        let second = provisioner.isolation_css();
        assert!(provisioner.is_pending());

        let (a, b) = block_on(join(first, second));
        assert_eq!(a, b);
        assert_eq!(loads.get(), 1);

        let third = block_on(provisioner.isolation_css());
        assert_eq!(third, a);
        assert_eq!(loads.get(), 1);
        assert!(!provisioner.is_pending());
    }
}
