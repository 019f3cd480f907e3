//! WASM bindings for story-spinner: drives the browser page.
//!
//! The page forwards button clicks as method calls, then polls
//! `take_events` for what to redraw. Session state lives in
//! `localStorage`.

use wasm_bindgen::prelude::*;

use story_spinner::core::controller::{
    Command, Controller, CopyTarget, EventQueue, MemoryClipboard, SpinnerError,
};
use story_spinner::core::persistence::{StorageError, StoragePort};
use story_spinner::core::tables::CategoryTables;
use story_spinner::schema::category::Category;

// ---------------------------------------------------------------------------
// localStorage-backed storage port
// ---------------------------------------------------------------------------
struct LocalStorage;

fn browser_storage() -> Result<web_sys::Storage, StorageError> {
    web_sys::window()
        .and_then(|w| w.local_storage().ok())
        .flatten()
        .ok_or_else(|| StorageError::Unavailable("localStorage is not available".to_string()))
}

fn js_failure(e: JsValue) -> StorageError {
    StorageError::Unavailable(format!("{:?}", e))
}

impl StoragePort for LocalStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        browser_storage()?.get_item(key).map_err(js_failure)
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        browser_storage()?.set_item(key, value).map_err(js_failure)
    }
}

// ---------------------------------------------------------------------------
// JSON helper types for the page
// ---------------------------------------------------------------------------
#[derive(serde::Serialize)]
#[serde(rename_all = "camelCase")]
struct LayoutInfo {
    index: usize,
    name: String,
    slot_count: usize,
    selected: bool,
}

fn parse_category(s: &str) -> Result<Category, JsError> {
    Category::parse(s).ok_or_else(|| JsError::new(&format!("Unknown category: {s}")))
}

fn to_js(e: SpinnerError) -> JsError {
    JsError::new(&e.to_string())
}

#[wasm_bindgen(start)]
pub fn start() {
    console_error_panic_hook::set_once();
    // A second init (hot reload) fails harmlessly.
    let _ = console_log::init_with_level(log::Level::Info);
}

// ---------------------------------------------------------------------------
// SpinnerApp: the main exported struct
// ---------------------------------------------------------------------------
#[wasm_bindgen]
pub struct SpinnerApp {
    controller: Controller,
    events: EventQueue,
    clipboard: MemoryClipboard,
}

#[wasm_bindgen]
impl SpinnerApp {
    /// Restore the saved session from `localStorage`. Tables are loaded
    /// separately with `load_tables`.
    #[wasm_bindgen(constructor)]
    pub fn new() -> Result<SpinnerApp, JsError> {
        Self::build(None)
    }

    /// Like `new`, with a fixed random seed.
    pub fn with_seed(seed: u64) -> Result<SpinnerApp, JsError> {
        Self::build(Some(seed))
    }

    fn build(seed: Option<u64>) -> Result<SpinnerApp, JsError> {
        let events = EventQueue::new();
        let clipboard = MemoryClipboard::new();
        let mut builder = Controller::builder()
            .storage(LocalStorage)
            .renderer(events.clone())
            .clipboard(clipboard.clone());
        if let Some(seed) = seed {
            builder = builder.seed(seed);
        }
        let controller = builder.build().map_err(to_js)?;
        Ok(SpinnerApp {
            controller,
            events,
            clipboard,
        })
    }

    /// Install the three table documents (JSON text). On failure the page
    /// receives a notice event and generation stays disabled.
    pub fn load_tables(
        &mut self,
        characters: &str,
        stories: &str,
        music: &str,
    ) -> Result<(), JsError> {
        match CategoryTables::parse_json(characters, stories, music) {
            Ok(tables) => {
                self.controller.install_tables(tables);
                Ok(())
            }
            Err(e) => {
                self.controller.load_failed(&e);
                Err(JsError::new(&format!("Table load error: {e}")))
            }
        }
    }

    pub fn is_ready(&self) -> bool {
        self.controller.is_ready()
    }

    pub fn generate(&mut self, category: &str) -> Result<(), JsError> {
        let category = parse_category(category)?;
        self.controller
            .dispatch(Command::Generate(category))
            .map_err(to_js)
    }

    pub fn toggle_lock(&mut self, category: &str, field: &str) -> Result<(), JsError> {
        let category = parse_category(category)?;
        self.controller
            .dispatch(Command::ToggleLock {
                category,
                field: field.to_string(),
            })
            .map_err(to_js)
    }

    /// Export text for a category or `"tarot"`. Returns the text for the
    /// page to place on the system clipboard, or nothing when there is
    /// nothing to copy.
    pub fn copy(&mut self, target: &str) -> Result<Option<String>, JsError> {
        let target = if target.eq_ignore_ascii_case("tarot") {
            CopyTarget::Tarot
        } else {
            CopyTarget::Record(parse_category(target)?)
        };
        self.controller
            .dispatch(Command::Copy(target))
            .map_err(to_js)?;
        Ok(self.clipboard.take())
    }

    pub fn switch_tab(&mut self, tab: &str) -> Result<(), JsError> {
        self.controller
            .dispatch(Command::SwitchTab(tab.to_string()))
            .map_err(to_js)
    }

    pub fn select_layout(&mut self, index: usize) -> Result<(), JsError> {
        self.controller
            .dispatch(Command::SelectTarotLayout(index))
            .map_err(to_js)
    }

    pub fn draw_tarot(&mut self) -> Result<(), JsError> {
        self.controller.dispatch(Command::DrawTarot).map_err(to_js)
    }

    /// Tarot layouts as a JSON array, with the selected one flagged.
    pub fn layouts(&self) -> Result<String, JsError> {
        let selected = self.controller.state().tarot_layout_index;
        let layouts: Vec<LayoutInfo> = self
            .controller
            .tables()
            .map(|tables| tables.tarot_layouts())
            .unwrap_or_default()
            .into_iter()
            .enumerate()
            .map(|(index, layout)| LayoutInfo {
                index,
                name: layout.name,
                slot_count: layout.slots.len(),
                selected: index == selected,
            })
            .collect();
        serde_json::to_string(&layouts).map_err(|e| JsError::new(&e.to_string()))
    }

    /// The active tab saved with the session.
    pub fn active_tab(&self) -> String {
        self.controller.active_tab().to_string()
    }

    /// Pending render events as a JSON array, oldest first.
    pub fn take_events(&self) -> Result<String, JsError> {
        serde_json::to_string(&self.events.drain()).map_err(|e| JsError::new(&e.to_string()))
    }

    /// Re-queue render events for the whole session.
    pub fn render_all(&mut self) {
        self.controller.render_all();
    }
}
