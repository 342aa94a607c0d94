use draft_kit::Notice;

pub const NOTICE_EVENT: &str = "notice";

pub trait EventSink: Send + Sync + 'static {
    fn emit_json(&self, event: &str, payload: serde_json::Value);
}

pub struct NoopSink;

impl EventSink for NoopSink {
    fn emit_json(&self, _event: &str, _payload: serde_json::Value) {}
}

/// Forwards a controller notice to the UI, tagged with the form it came from.
pub fn publish_notice(sink: &dyn EventSink, form: &str, notice: Option<&Notice>) {
    let Some(notice) = notice else {
        return;
    };
    sink.emit_json(
        NOTICE_EVENT,
        serde_json::json!({
            "form": form,
            "level": notice.level,
            "message": notice.message,
        }),
    );
}

#[cfg(feature = "tauri-app")]
pub struct TauriSink {
    app: tauri::AppHandle,
}

#[cfg(feature = "tauri-app")]
impl TauriSink {
    pub fn new(app: tauri::AppHandle) -> Self {
        Self { app }
    }
}

#[cfg(feature = "tauri-app")]
impl EventSink for TauriSink {
    fn emit_json(&self, event: &str, payload: serde_json::Value) {
        use tauri::Manager;
        let _ = self.app.emit_all(event, payload);
    }
}
