//! Lifecycle of the embedded document editor.
//!
//! ```text
//! Idle -> ScriptLoading -> ScriptLoaded -> ConfigFetching
//!      -> EditorConstructing -> DocumentReady
//! ```
//!
//! Any state may end in `Error`. The bridge owns at most one editor instance
//! per mount point and always destroys the previous one before constructing.

use std::time::{Duration, Instant};

use serde_json::{Value, json};

use crate::domain::document::DocumentKind;

/// Invoices reload the page when the editor does not come up in time.
pub const INVOICE_WATCHDOG: Duration = Duration::from_secs(10);

/// Browser side effects needed by the bridge.
pub trait EditorHost {
    /// Whether the editor API object is already defined on the page.
    fn api_present(&self) -> bool;
    fn script_tag_present(&self, src: &str) -> bool;
    fn inject_script(&mut self, src: &str);
    /// Listens for load and error events of an existing script tag.
    fn attach_script_listeners(&mut self, src: &str);
    fn fetch_config(&mut self, url: &str);
    fn destroy_editor(&mut self, mount_id: &str) -> Result<(), String>;
    fn construct_editor(&mut self, mount_id: &str, config: &Value) -> Result<(), String>;
    fn reload_page(&mut self);
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditorState {
    Idle,
    ScriptLoading,
    ScriptLoaded,
    ConfigFetching,
    EditorConstructing,
    DocumentReady,
    Error(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditorOptions {
    pub script_url: String,
    pub config_url: String,
    pub mount_id: String,
    pub watchdog: Option<Duration>,
}

impl EditorOptions {
    /// Options for editing document `kind`/`id` served by this application.
    pub fn for_document(kind: DocumentKind, id: i32, script_url: impl Into<String>) -> Self {
        Self {
            script_url: script_url.into(),
            config_url: format!("/api/v1/editor/{kind}/{id}/config"),
            mount_id: format!("{kind}-editor-{id}"),
            watchdog: (kind == DocumentKind::Invoice).then_some(INVOICE_WATCHDOG),
        }
    }
}

pub struct EditorBridge<H: EditorHost> {
    host: H,
    options: EditorOptions,
    state: EditorState,
    deadline: Option<Instant>,
    instance: bool,
}

impl<H: EditorHost> EditorBridge<H> {
    pub fn new(host: H, options: EditorOptions) -> Self {
        Self {
            host,
            options,
            state: EditorState::Idle,
            deadline: None,
            instance: false,
        }
    }

    pub fn state(&self) -> &EditorState {
        &self.state
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn mount(&mut self, now: Instant) {
        if self.state != EditorState::Idle {
            return;
        }
        self.deadline = self.options.watchdog.map(|timeout| now + timeout);

        if self.host.api_present() {
            self.request_config();
        } else if self.host.script_tag_present(&self.options.script_url) {
            self.host.attach_script_listeners(&self.options.script_url);
            self.state = EditorState::ScriptLoading;
        } else {
            self.host.inject_script(&self.options.script_url);
            self.state = EditorState::ScriptLoading;
        }
    }

    fn request_config(&mut self) {
        self.state = EditorState::ConfigFetching;
        self.host.fetch_config(&self.options.config_url);
    }

    fn fail(&mut self, message: String) {
        log::error!("Document editor failed: {message}");
        self.deadline = None;
        self.state = EditorState::Error(message);
    }

    pub fn script_loaded(&mut self) {
        if self.state != EditorState::ScriptLoading {
            return;
        }
        self.state = EditorState::ScriptLoaded;
        self.request_config();
    }

    pub fn script_failed(&mut self) {
        if self.state != EditorState::ScriptLoading {
            return;
        }
        let message = format!(
            "Failed to load the document editor. Make sure the document service is running at {}.",
            self.options.script_url
        );
        self.fail(message);
    }

    pub fn config_loaded(&mut self, mut config: Value) {
        if self.state != EditorState::ConfigFetching {
            return;
        }
        prepare_config(&mut config);

        self.destroy_instance();
        self.state = EditorState::EditorConstructing;
        match self.host.construct_editor(&self.options.mount_id, &config) {
            Ok(()) => self.instance = true,
            Err(message) => self.fail(message),
        }
    }

    pub fn config_failed(&mut self, message: impl Into<String>) {
        if self.state != EditorState::ConfigFetching {
            return;
        }
        self.fail(message.into());
    }

    pub fn document_ready(&mut self) {
        if self.state != EditorState::EditorConstructing {
            return;
        }
        self.deadline = None;
        self.state = EditorState::DocumentReady;
    }

    /// `onError` raised by the running editor.
    pub fn editor_error(&mut self, message: impl Into<String>) {
        if matches!(self.state, EditorState::Idle | EditorState::Error(_)) {
            return;
        }
        self.fail(message.into());
    }

    /// Reloads the page once the watchdog deadline passes.
    pub fn tick(&mut self, now: Instant) {
        let Some(deadline) = self.deadline else {
            return;
        };
        if now >= deadline && self.state != EditorState::DocumentReady {
            log::warn!("Document editor did not load in time, reloading");
            self.deadline = None;
            self.host.reload_page();
        }
    }

    pub fn unmount(&mut self) {
        self.deadline = None;
        self.destroy_instance();
        self.state = EditorState::Idle;
    }

    fn destroy_instance(&mut self) {
        if !self.instance {
            return;
        }
        self.instance = false;
        if let Err(message) = self.host.destroy_editor(&self.options.mount_id) {
            log::warn!("Failed to destroy the document editor: {message}");
        }
    }
}

/// Forces edit mode on the desktop layout and registers the event hooks the
/// host forwards to the bridge.
fn prepare_config(config: &mut Value) {
    if !config.is_object() {
        *config = json!({});
    }
    config["type"] = json!("desktop");
    if !config["editorConfig"].is_object() {
        config["editorConfig"] = json!({});
    }
    config["editorConfig"]["mode"] = json!("edit");
    config["events"] = json!({
        "onDocumentReady": "document_ready",
        "onError": "editor_error",
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct FakeHost {
        api: bool,
        tag: bool,
        injected: usize,
        listeners: usize,
        fetched: Vec<String>,
        constructed: Vec<Value>,
        destroyed: usize,
        fail_destroy: bool,
        reloads: usize,
    }

    impl EditorHost for FakeHost {
        fn api_present(&self) -> bool {
            self.api
        }

        fn script_tag_present(&self, _src: &str) -> bool {
            self.tag
        }

        fn inject_script(&mut self, _src: &str) {
            self.injected += 1;
        }

        fn attach_script_listeners(&mut self, _src: &str) {
            self.listeners += 1;
        }

        fn fetch_config(&mut self, url: &str) {
            self.fetched.push(url.to_string());
        }

        fn destroy_editor(&mut self, _mount_id: &str) -> Result<(), String> {
            self.destroyed += 1;
            if self.fail_destroy {
                Err("already gone".into())
            } else {
                Ok(())
            }
        }

        fn construct_editor(&mut self, _mount_id: &str, config: &Value) -> Result<(), String> {
            self.constructed.push(config.clone());
            Ok(())
        }

        fn reload_page(&mut self) {
            self.reloads += 1;
        }
    }

    fn bridge(host: FakeHost, kind: DocumentKind) -> EditorBridge<FakeHost> {
        EditorBridge::new(
            host,
            EditorOptions::for_document(kind, 5, "http://docs/api.js"),
        )
    }

    #[test]
    fn present_api_skips_the_script() {
        let mut editor = bridge(
            FakeHost {
                api: true,
                ..FakeHost::default()
            },
            DocumentKind::Template,
        );
        editor.mount(Instant::now());

        assert_eq!(editor.state(), &EditorState::ConfigFetching);
        assert_eq!(editor.host().injected, 0);
        assert_eq!(editor.host().fetched, vec!["/api/v1/editor/template/5/config"]);
    }

    #[test]
    fn existing_script_tag_is_reused() {
        let mut editor = bridge(
            FakeHost {
                tag: true,
                ..FakeHost::default()
            },
            DocumentKind::Template,
        );
        editor.mount(Instant::now());

        assert_eq!(editor.state(), &EditorState::ScriptLoading);
        assert_eq!(editor.host().injected, 0);
        assert_eq!(editor.host().listeners, 1);
    }

    #[test]
    fn full_lifecycle_forces_edit_mode() {
        let mut editor = bridge(FakeHost::default(), DocumentKind::Quotation);
        editor.mount(Instant::now());
        assert_eq!(editor.host().injected, 1);

        editor.script_loaded();
        editor.config_loaded(json!({"editorConfig": {"mode": "view"}, "type": "mobile"}));
        assert_eq!(editor.state(), &EditorState::EditorConstructing);
        editor.document_ready();
        assert_eq!(editor.state(), &EditorState::DocumentReady);

        let config = &editor.host().constructed[0];
        assert_eq!(config["editorConfig"]["mode"], "edit");
        assert_eq!(config["type"], "desktop");
        assert!(config["events"]["onError"].is_string());
    }

    #[test]
    fn script_failure_names_the_document_service() {
        let mut editor = bridge(FakeHost::default(), DocumentKind::Template);
        editor.mount(Instant::now());
        editor.script_failed();

        match editor.state() {
            EditorState::Error(message) => assert!(message.contains("http://docs/api.js")),
            other => panic!("unexpected state: {other:?}"),
        }
    }

    #[test]
    fn invoice_watchdog_reloads_once() {
        let start = Instant::now();
        let mut editor = bridge(
            FakeHost {
                api: true,
                ..FakeHost::default()
            },
            DocumentKind::Invoice,
        );
        editor.mount(start);
        editor.tick(start + Duration::from_secs(9));
        assert_eq!(editor.host().reloads, 0);

        editor.tick(start + Duration::from_secs(10));
        editor.tick(start + Duration::from_secs(20));
        assert_eq!(editor.host().reloads, 1);
    }

    #[test]
    fn templates_have_no_watchdog() {
        let start = Instant::now();
        let mut editor = bridge(
            FakeHost {
                api: true,
                ..FakeHost::default()
            },
            DocumentKind::Template,
        );
        editor.mount(start);
        editor.tick(start + Duration::from_secs(60));
        assert_eq!(editor.host().reloads, 0);
    }

    #[test]
    fn unmount_swallows_destroy_errors() {
        let mut editor = bridge(
            FakeHost {
                api: true,
                fail_destroy: true,
                ..FakeHost::default()
            },
            DocumentKind::Template,
        );
        editor.mount(Instant::now());
        editor.config_loaded(json!({}));
        editor.unmount();

        assert_eq!(editor.state(), &EditorState::Idle);
        assert_eq!(editor.host().destroyed, 1);
    }

    #[test]
    fn editor_built_from_a_present_api_is_destroyed_on_unmount() {
        let mut editor = bridge(
            FakeHost {
                api: true,
                ..FakeHost::default()
            },
            DocumentKind::Invoice,
        );
        editor.mount(Instant::now());
        editor.config_loaded(json!({}));
        editor.document_ready();
        editor.unmount();

        assert_eq!(editor.host().injected, 0);
        assert_eq!(editor.host().destroyed, 1);
        assert_eq!(editor.state(), &EditorState::Idle);
    }

    #[test]
    fn unexpected_events_are_ignored() {
        let mut editor = bridge(FakeHost::default(), DocumentKind::Template);
        editor.document_ready();
        editor.config_loaded(json!({}));
        assert_eq!(editor.state(), &EditorState::Idle);
        assert!(editor.host().constructed.is_empty());
    }
}
