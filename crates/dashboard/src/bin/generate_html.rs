//! Binary to generate a demo host page from Rust
//!
//! Run with: cargo run --bin generate_html
//!
//! The page carries several embedding markers with different `data-*`
//! configurations, surrounded by host styles the widgets must not inherit.

use std::fs;
use std::path::Path;

/// One embedding marker on the demo page
struct DemoMarker {
    heading: &'static str,
    attributes: &'static [(&'static str, &'static str)],
}

const MARKERS: &[DemoMarker] = &[
    DemoMarker {
        heading: "Defaults",
        attributes: &[],
    },
    DemoMarker {
        heading: "Dark theme with header, pinned to 1.5.0",
        attributes: &[
            ("data-theme", "dark"),
            ("data-version", "1.5.0"),
            ("data-show-header", "true"),
        ],
    },
    DemoMarker {
        heading: "Latency only, no selector or cards",
        attributes: &[
            ("data-tabs", "latency"),
            ("data-show-version-selector", "false"),
            ("data-show-summary-cards", "false"),
        ],
    },
    DemoMarker {
        heading: "Unknown version falls back",
        attributes: &[
            ("data-version", "0.0.1"),
            ("data-tabs", "resources, overview, bogus"),
            ("data-container-class", "demo-wide"),
        ],
    },
];

fn main() {
    let html = generate_index_html();

    let dist_path = Path::new("dist");
    fs::create_dir_all(dist_path).ok();

    let index_path = dist_path.join("index.html");
    fs::write(&index_path, &html).expect("Failed to write index.html");

    println!("✅ Generated: {}", index_path.display());
}

fn render_marker(marker: &DemoMarker) -> String {
    let attributes: String = marker
        .attributes
        .iter()
        .map(|(name, value)| format!(" {}=\"{}\"", name, value))
        .collect();
    format!(
        "    <section>\n      <h2>{}</h2>\n      <div data-benchmark-dashboard{}></div>\n    </section>\n",
        marker.heading, attributes
    )
}

fn generate_index_html() -> String {
    let markers: String = MARKERS.iter().map(render_marker).collect();
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>gateway-bench embedding demo</title>
    <style>
{styles}
    </style>
</head>
<body>
  <main>
{markers}    <section>
      <h2>Added after load</h2>
      <button id="add-marker">Add dashboard</button>
      <div id="late"></div>
    </section>
  </main>
    <script type="module">
        import init from './gateway_bench_dashboard.js';
        init().then(() => {{
            document.getElementById('add-marker').addEventListener('click', () => {{
                const marker = document.createElement('div');
                marker.setAttribute('data-benchmark-dashboard', '');
                document.getElementById('late').appendChild(marker);
                window.initBenchmarkDashboards();
            }});
        }});
    </script>
</body>
</html>"#,
        styles = get_styles(),
        markers = markers,
    )
}

/// Deliberately loud host styles; none of them should reach a widget
fn get_styles() -> &'static str {
    r#"        * { margin: 0; padding: 0; box-sizing: border-box; }
        body { font-family: Georgia, serif; font-size: 18px; color: #7c2d12; background: #fff7ed; }
        table, td, th { border: 3px dashed #ea580c; }
        main { max-width: 1100px; margin: 0 auto; padding: 2rem; }
        section { margin-bottom: 2.5rem; }
        h2 { margin-bottom: 0.75rem; }
        .demo-wide { max-width: none; }"#
}
