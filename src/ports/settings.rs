use serde_json::Value;

/// Read access to application settings during dispatch.
pub trait SettingsProvider: Send + Sync + 'static {
    /// Whether the instrumented execution strategy should be used.
    fn debug_enabled(&self) -> bool;

    /// Full settings dump for the debug panel.
    fn snapshot(&self) -> Value;
}
