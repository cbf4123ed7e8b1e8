//! Widget configuration read from the marker element's `data-*` attributes

use serde::Serialize;
use std::fmt;

pub const ATTR_VERSION: &str = "data-version";
pub const ATTR_THEME: &str = "data-theme";
pub const ATTR_TABS: &str = "data-tabs";
pub const ATTR_SHOW_HEADER: &str = "data-show-header";
pub const ATTR_SHOW_VERSION_SELECTOR: &str = "data-show-version-selector";
pub const ATTR_SHOW_SUMMARY_CARDS: &str = "data-show-summary-cards";
pub const ATTR_CONTAINER_CLASS: &str = "data-container-class";

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    pub fn is_dark(self) -> bool {
        self == Theme::Dark
    }

    /// `dark` selects the dark theme, anything else is light
    pub fn from_attribute(value: Option<&str>) -> Self {
        match value.map(str::trim) {
            Some("dark") => Theme::Dark,
            _ => Theme::Light,
        }
    }
}

/// Analysis views a widget can offer
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Tab {
    Overview,
    Latency,
    Resources,
}

impl Tab {
    /// Canonical order
    pub const ALL: [Tab; 3] = [Tab::Overview, Tab::Latency, Tab::Resources];

    pub fn as_str(self) -> &'static str {
        match self {
            Tab::Overview => "overview",
            Tab::Latency => "latency",
            Tab::Resources => "resources",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Tab::Overview => "Overview",
            Tab::Latency => "Latency",
            Tab::Resources => "Resources",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Tab::ALL.into_iter().find(|tab| tab.as_str() == name)
    }
}

impl fmt::Display for Tab {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Typed configuration of one embedded widget
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct EmbedConfig {
    /// Requested initial version
    pub version: Option<String>,
    pub theme: Theme,
    /// Offered views, never empty, without duplicates
    pub tabs: Vec<Tab>,
    pub show_header: bool,
    pub show_version_selector: bool,
    pub show_summary_cards: bool,
    /// Extra class for the outer wrapper
    pub container_class: Option<String>,
}

impl Default for EmbedConfig {
    fn default() -> Self {
        Self {
            version: None,
            theme: Theme::Light,
            tabs: Tab::ALL.to_vec(),
            show_header: false,
            show_version_selector: true,
            show_summary_cards: true,
            container_class: None,
        }
    }
}

impl EmbedConfig {
    /// Build a config from an attribute lookup
    pub fn from_attributes<F>(attribute: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let non_empty = |name: &str| {
            attribute(name)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        Self {
            version: non_empty(ATTR_VERSION),
            theme: Theme::from_attribute(attribute(ATTR_THEME).as_deref()),
            tabs: parse_tabs(attribute(ATTR_TABS).as_deref()),
            show_header: parse_toggle(attribute(ATTR_SHOW_HEADER).as_deref(), defaults.show_header),
            show_version_selector: parse_toggle(
                attribute(ATTR_SHOW_VERSION_SELECTOR).as_deref(),
                defaults.show_version_selector,
            ),
            show_summary_cards: parse_toggle(
                attribute(ATTR_SHOW_SUMMARY_CARDS).as_deref(),
                defaults.show_summary_cards,
            ),
            container_class: non_empty(ATTR_CONTAINER_CLASS),
        }
    }

    pub fn shows(&self, tab: Tab) -> bool {
        self.tabs.contains(&tab)
    }
}

/// Comma-separated tab names. Unknown names and repeats are dropped; nothing left means every tab.
fn parse_tabs(value: Option<&str>) -> Vec<Tab> {
    let mut tabs = Vec::new();
    for tab in value
        .unwrap_or_default()
        .split(',')
        .filter_map(|name| Tab::from_name(name.trim()))
    {
        if !tabs.contains(&tab) {
            tabs.push(tab);
        }
    }

    if tabs.is_empty() {
        tracing::trace!(?value, "no usable tabs, offering all");
        return Tab::ALL.to_vec();
    }
    tabs
}

/// `"true"` enables, any other present value disables, absence keeps the default
fn parse_toggle(value: Option<&str>, default: bool) -> bool {
    match value {
        Some(v) => v.trim() == "true",
        None => default,
    }
}
