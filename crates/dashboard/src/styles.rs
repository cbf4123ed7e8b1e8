//! Inline styles for the widget
//!
//! The isolation stylesheet supplies reset rules and color tokens; these add
//! the theme-dependent details on top.

// ============================================================================
// Theme-aware style generators
// ============================================================================

/// Outer widget wrapper
pub fn widget_style(dark: bool) -> String {
    let (bg, fg) = if dark {
        ("#0d1117", "#c9d1d9")
    } else {
        ("#ffffff", "#1a1a1a")
    };
    format!(
        "display: flex; \
         flex-direction: column; \
         gap: 1rem; \
         font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', 'Noto Sans', Helvetica, Arial, sans-serif; \
         font-size: 14px; \
         background: {bg}; \
         color: {fg}; \
         line-height: 1.5; \
         padding: 1rem;"
    )
}

pub fn header_style(dark: bool) -> String {
    let (bg, border) = if dark {
        ("#161b22", "#30363d")
    } else {
        ("#f6f8fa", "#d0d7de")
    };
    format!(
        "display: flex; \
         justify-content: space-between; \
         align-items: center; \
         padding: 0.75rem 1rem; \
         background: {bg}; \
         border: 1px solid {border}; \
         border-radius: 8px;"
    )
}

pub fn title_style(_dark: bool) -> &'static str {
    "font-size: 1.1rem; \
     font-weight: 600; \
     margin: 0;"
}

/// Version dropdown
pub fn select_style(dark: bool) -> String {
    let (bg, fg, border) = if dark {
        ("#0d1117", "#c9d1d9", "#30363d")
    } else {
        ("#ffffff", "#1a1a1a", "#d0d7de")
    };
    format!(
        "padding: 0.35rem 0.75rem; \
         background: {bg}; \
         color: {fg}; \
         border: 1px solid {border}; \
         border-radius: 6px; \
         font-family: inherit; \
         font-size: 0.85rem; \
         cursor: pointer;"
    )
}

pub fn badge_style(dark: bool) -> String {
    let (bg, fg) = if dark {
        ("#30363d", "#8b949e")
    } else {
        ("#e1e4e8", "#57606a")
    };
    format!(
        "background: {bg}; \
         color: {fg}; \
         padding: 0.1rem 0.4rem; \
         border-radius: 4px; \
         font-size: 0.7rem; \
         font-weight: 500; \
         margin-left: 0.5rem;"
    )
}

/// Summary card grid
pub fn card_grid_style(_dark: bool) -> &'static str {
    "display: grid; \
     grid-template-columns: repeat(auto-fit, minmax(160px, 1fr)); \
     gap: 0.75rem;"
}

pub fn card_style(dark: bool) -> String {
    let (bg, border) = if dark {
        ("#161b22", "#30363d")
    } else {
        ("#ffffff", "#d0d7de")
    };
    format!(
        "background: {bg}; \
         border: 1px solid {border}; \
         border-radius: 8px; \
         padding: 0.75rem 1rem;"
    )
}

pub fn card_label_style(dark: bool) -> String {
    let fg = if dark { "#8b949e" } else { "#57606a" };
    format!(
        "font-size: 0.75rem; \
         color: {fg}; \
         text-transform: uppercase; \
         letter-spacing: 0.5px;"
    )
}

pub fn card_value_style(_dark: bool) -> &'static str {
    "font-size: 1.4rem; \
     font-weight: 600;"
}

pub fn tab_bar_style(dark: bool) -> String {
    let border = if dark { "#30363d" } else { "#d0d7de" };
    format!(
        "display: flex; \
         gap: 0.25rem; \
         border-bottom: 1px solid {border};"
    )
}

pub fn tab_style(dark: bool, active: bool) -> String {
    let (bg, fg) = match (dark, active) {
        (_, true) => ("#3b82f6", "#ffffff"),
        (true, false) => ("transparent", "#8b949e"),
        (false, false) => ("transparent", "#57606a"),
    };
    format!(
        "background: {bg}; \
         color: {fg}; \
         border: none; \
         padding: 0.45rem 0.9rem; \
         border-radius: 6px 6px 0 0; \
         font-family: inherit; \
         font-size: 0.85rem; \
         font-weight: 500; \
         cursor: pointer;"
    )
}

/// Section card holding a table or chart
pub fn section_style(dark: bool) -> String {
    let (bg, border) = if dark {
        ("#161b22", "#30363d")
    } else {
        ("#ffffff", "#d0d7de")
    };
    format!(
        "background: {bg}; \
         border: 1px solid {border}; \
         border-radius: 8px; \
         overflow: auto;"
    )
}

pub fn section_header_style(dark: bool) -> String {
    let (bg, border) = if dark {
        ("#21262d", "#30363d")
    } else {
        ("#f6f8fa", "#d0d7de")
    };
    format!(
        "padding: 0.6rem 1rem; \
         font-weight: 600; \
         background: {bg}; \
         border-bottom: 1px solid {border};"
    )
}

pub fn table_header_style(dark: bool) -> String {
    let fg = if dark { "#6e7681" } else { "#6e7681" };
    format!(
        "padding: 0.5rem 0.75rem; \
         font-size: 0.75rem; \
         color: {fg}; \
         font-weight: 500; \
         text-align: left; \
         text-transform: uppercase; \
         letter-spacing: 0.5px;"
    )
}

pub fn table_cell_style(dark: bool) -> String {
    let border = if dark { "#21262d" } else { "#eaeef2" };
    format!(
        "padding: 0.5rem 0.75rem; \
         font-size: 0.85rem; \
         border-top: 1px solid {border}; \
         font-variant-numeric: tabular-nums;"
    )
}

pub fn muted_style(dark: bool) -> String {
    let fg = if dark { "#6e7681" } else { "#6e7681" };
    format!("color: {fg};")
}

pub fn empty_style(_dark: bool) -> &'static str {
    "padding: 2rem; \
     text-align: center; \
     opacity: 0.7;"
}

pub fn code_style(dark: bool) -> String {
    let (bg, fg) = if dark {
        ("#21262d", "#79c0ff")
    } else {
        ("#f6f8fa", "#0550ae")
    };
    format!(
        "background: {bg}; \
         color: {fg}; \
         padding: 0.2rem 0.5rem; \
         border-radius: 4px; \
         font-size: 0.85rem; \
         font-family: 'SF Mono', 'Fira Code', monospace;"
    )
}

/// SVG grid line color
pub fn grid_color(dark: bool) -> &'static str {
    if dark { "#21262d" } else { "#eaeef2" }
}

/// SVG axis label color
pub fn axis_color(dark: bool) -> &'static str {
    if dark { "#6e7681" } else { "#6e7681" }
}

/// Bar colors, one per phase
pub const PHASE_COLORS: [&str; 2] = [
    "#58a6ff", // scaling up
    "#a371f7", // scaling down
];
