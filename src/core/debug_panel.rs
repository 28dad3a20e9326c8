//! HTML diagnostics appended to responses in debug mode.
use std::fmt::Write;

use serde_json::Value;

use crate::ports::controller::HandlerError;

const PANEL_ID: &str = "switchyard-debug-panel";
const RULE: &str = r#"<hr style="border-color:#666"/>"#;

/// Everything the panel shows for one request.
pub struct PanelContext<'a> {
    pub error: Option<&'a HandlerError>,
    pub timings: &'a Value,
    pub modules: &'a [(String, String)],
    pub views: &'a [String],
    pub config: &'a Value,
    pub controller: &'a str,
    pub action: &'a str,
    pub session: &'a Value,
}

/// The error's message followed by its `source()` chain.
pub fn error_trace(error: &dyn std::error::Error) -> String {
    let mut trace = error.to_string();
    let mut source = error.source();
    let mut depth = 0;
    while let Some(cause) = source {
        let _ = write!(trace, "\n    {depth}: {cause}");
        depth += 1;
        source = cause.source();
    }
    trace
}

pub fn render(ctx: &PanelContext<'_>) -> String {
    let mut text = String::new();

    if let Some(error) = ctx.error {
        let _ = write!(
            text,
            r#"<pre style="color:#C00; display:inline;">{}</pre>{RULE}"#,
            escape_html(&error_trace(error))
        );
    }

    text.push_str(&escape_html(&ctx.timings.to_string()));
    text.push_str(RULE);

    text.push_str(&table(ctx.modules, "Loaded modules"));
    text.push_str(RULE);
    text.push_str(&list(ctx.views, "Views"));
    text.push_str(RULE);

    let _ = write!(
        text,
        r#"<details><summary>Config Values</summary><pre style="color:#777; display:inline; height: 5rem; overflow-y:scroll">{}</pre></details>{RULE}"#,
        escape_html(&pretty(ctx.config))
    );
    let _ = write!(
        text,
        r#"<details><summary>Controller:Action</summary><pre style="color:#777; display:inline;">{} : {}</pre></details>{RULE}"#,
        escape_html(ctx.controller),
        escape_html(ctx.action)
    );
    let _ = write!(
        text,
        r#"<details><summary>Session</summary><pre style="color:#777; display:inline;">{}</pre></details>{RULE}"#,
        escape_html(&pretty(ctx.session))
    );

    format!(
        r#"<div id="{PANEL_ID}" style="background-color: #000; color: #AAA; font-family: monospace; font-size: 12px; padding: 1em; position: relative; z-index: 9999;"><small>{}</small>{text}</div>"#,
        chrono::Utc::now().to_rfc3339()
    )
}

fn table(rows: &[(String, String)], title: &str) -> String {
    let mut text = format!(r#"<details><summary>{title}</summary><table style="color:#AAA">"#);
    for (key, value) in rows {
        let _ = write!(
            text,
            "<tr><td>{}</td><td>:</td><td>{}</td></tr>",
            escape_html(key),
            escape_html(value)
        );
    }
    text.push_str("</table></details>");
    text
}

fn list(items: &[String], title: &str) -> String {
    let mut text = format!(r#"<details><summary>{title}</summary><ul style="color:#AAA">"#);
    for item in items {
        let _ = write!(text, "<li>{}</li>", escape_html(item));
    }
    text.push_str("</ul></details>");
    text
}

fn pretty(value: &Value) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
}

pub fn escape_html(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn context<'a>(
        error: Option<&'a HandlerError>,
        timings: &'a Value,
        config: &'a Value,
    ) -> PanelContext<'a> {
        PanelContext {
            error,
            timings,
            modules: &[],
            views: &[],
            config,
            controller: "controller/Home",
            action: "index",
            session: config,
        }
    }

    #[test]
    fn test_error_trace_walks_sources() {
        let io = std::io::Error::other("disk gone");
        let error = HandlerError::Other(Box::new(io));
        assert_eq!(error_trace(&error), "disk gone");

        let report = eyre::eyre!("disk gone").wrap_err("loading book");
        let error = HandlerError::from(report);
        assert_eq!(error_trace(&error), "loading book\n    0: disk gone");
    }

    #[test]
    fn test_panel_contains_sections() {
        let timings = json!([{"label": "start", "ms": 0.0}]);
        let config = json!({"system": {"debug": true}});
        let panel = render(&context(None, &timings, &config));

        assert!(panel.starts_with(r#"<div id="switchyard-debug-panel""#));
        assert!(panel.contains("Controller:Action"));
        assert!(panel.contains("controller/Home : index"));
        assert!(panel.contains("&quot;debug&quot;: true"));
        assert!(!panel.contains("color:#C00"));
    }

    #[test]
    fn test_panel_escapes_error_trace() {
        let error = HandlerError::Execution("<script>boom</script>".to_string());
        let timings = json!([]);
        let panel = render(&context(Some(&error), &timings, &Value::Null));
        assert!(panel.contains("&lt;script&gt;boom&lt;/script&gt;"));
    }
}
