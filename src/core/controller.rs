/// The controller: owns the session, turns UI commands into engine calls,
/// saves after every change and tells the renderer what to show.

use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::Serialize;
use std::cell::RefCell;
use std::path::{Path, PathBuf};
use std::rc::Rc;
use thiserror::Error;

use crate::core::export::{format_record, format_tarot};
use crate::core::fields::display_sections;
use crate::core::generate::regenerate;
use crate::core::locks::LockSet;
use crate::core::persistence::{
    MemoryStorage, PersistedState, PersistenceStore, StoragePort, DEFAULT_STORAGE_KEY,
};
use crate::core::tables::{CategoryTables, TableError};
use crate::core::tarot::{draw_from_tables, TarotError};
use crate::schema::category::Category;
use crate::schema::record::GeneratedRecord;
use crate::schema::tarot::TarotResult;

#[derive(Debug, Error)]
pub enum SpinnerError {
    #[error("data not loaded yet, please wait")]
    DataNotReady,
    #[error("failed to load category tables: {0}")]
    TableLoad(#[from] TableError),
    #[error("tarot error: {0}")]
    Tarot(#[from] TarotError),
    #[error("failed to copy to clipboard: {0}")]
    Clipboard(#[from] ClipboardError),
}

#[derive(Debug, Error)]
#[error("{0}")]
pub struct ClipboardError(pub String);

/// What a copy command exports.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CopyTarget {
    Record(Category),
    Tarot,
}

/// A user action, as emitted by whatever front end drives the controller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Generate(Category),
    ToggleLock { category: Category, field: String },
    Copy(CopyTarget),
    SwitchTab(String),
    SelectTarotLayout(usize),
    DrawTarot,
}

/// The presentation side. Receives whole records; it decides layout.
pub trait Renderer {
    fn render_record(&mut self, category: Category, record: &GeneratedRecord, locks: &LockSet);
    fn render_tarot(&mut self, result: Option<&TarotResult>);
    fn tab_changed(&mut self, _tab: &str) {}
    /// A message the user should see (errors, confirmations).
    fn notify(&mut self, message: &str);
}

/// Discards everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullRenderer;

impl Renderer for NullRenderer {
    fn render_record(&mut self, _: Category, _: &GeneratedRecord, _: &LockSet) {}
    fn render_tarot(&mut self, _: Option<&TarotResult>) {}
    fn notify(&mut self, _: &str) {}
}

/// A displayed field with its lock state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RenderedField {
    pub section: Option<String>,
    pub name: String,
    pub value: String,
    pub locked: bool,
}

/// Render calls flattened into data, for front ends that poll.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum RenderEvent {
    Record {
        category: Category,
        fields: Vec<RenderedField>,
    },
    Tarot {
        result: Option<TarotResult>,
    },
    Tab {
        tab: String,
    },
    Notice {
        message: String,
    },
}

/// Present fields of `record` in display order, tagged with their section
/// and lock state.
pub fn rendered_fields(
    category: Category,
    record: &GeneratedRecord,
    locks: &LockSet,
) -> Vec<RenderedField> {
    let mut fields = Vec::new();
    for section in display_sections(category) {
        for name in section.fields {
            if let Some(value) = record.get(name) {
                fields.push(RenderedField {
                    section: section.title.map(str::to_string),
                    name: name.to_string(),
                    value: value.to_string(),
                    locked: locks.contains(name),
                });
            }
        }
    }
    fields
}

/// Collects [`RenderEvent`]s. Clones share one queue.
#[derive(Debug, Clone, Default)]
pub struct EventQueue {
    events: Rc<RefCell<Vec<RenderEvent>>>,
}

impl EventQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Take every queued event, oldest first.
    pub fn drain(&self) -> Vec<RenderEvent> {
        std::mem::take(&mut *self.events.borrow_mut())
    }

    fn push(&self, event: RenderEvent) {
        self.events.borrow_mut().push(event);
    }
}

impl Renderer for EventQueue {
    fn render_record(&mut self, category: Category, record: &GeneratedRecord, locks: &LockSet) {
        self.push(RenderEvent::Record {
            category,
            fields: rendered_fields(category, record, locks),
        });
    }

    fn render_tarot(&mut self, result: Option<&TarotResult>) {
        self.push(RenderEvent::Tarot {
            result: result.cloned(),
        });
    }

    fn tab_changed(&mut self, tab: &str) {
        self.push(RenderEvent::Tab {
            tab: tab.to_string(),
        });
    }

    fn notify(&mut self, message: &str) {
        self.push(RenderEvent::Notice {
            message: message.to_string(),
        });
    }
}

pub trait Clipboard {
    fn write_text(&mut self, text: &str) -> Result<(), ClipboardError>;
}

/// Keeps the last copied text. Clones share the same contents.
#[derive(Debug, Clone, Default)]
pub struct MemoryClipboard {
    contents: Rc<RefCell<Option<String>>>,
}

impl MemoryClipboard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contents(&self) -> Option<String> {
        self.contents.borrow().clone()
    }

    pub fn take(&self) -> Option<String> {
        self.contents.borrow_mut().take()
    }
}

impl Clipboard for MemoryClipboard {
    fn write_text(&mut self, text: &str) -> Result<(), ClipboardError> {
        *self.contents.borrow_mut() = Some(text.to_string());
        Ok(())
    }
}

/// The session controller. Built via `Controller::builder()`.
pub struct Controller {
    state: PersistedState,
    tables: Option<CategoryTables>,
    store: PersistenceStore<Box<dyn StoragePort>>,
    renderer: Box<dyn Renderer>,
    clipboard: Box<dyn Clipboard>,
    rng: StdRng,
}

/// Builder for constructing a `Controller`.
pub struct ControllerBuilder {
    seed: Option<u64>,
    tables_dir: Option<PathBuf>,
    storage_key: String,
    /// Directly provided tables (skips the directory loader).
    tables: Option<CategoryTables>,
    storage: Option<Box<dyn StoragePort>>,
    renderer: Option<Box<dyn Renderer>>,
    clipboard: Option<Box<dyn Clipboard>>,
}

impl Controller {
    pub fn builder() -> ControllerBuilder {
        ControllerBuilder {
            seed: None,
            tables_dir: None,
            storage_key: DEFAULT_STORAGE_KEY.to_string(),
            tables: None,
            storage: None,
            renderer: None,
            clipboard: None,
        }
    }

    /// Run one command. Failures are reported to the renderer as a notice
    /// and returned; state is left as it was before the command.
    pub fn dispatch(&mut self, command: Command) -> Result<(), SpinnerError> {
        log::debug!("Dispatching {:?}", command);
        let result = match command {
            Command::Generate(category) => self.generate(category),
            Command::ToggleLock { category, field } => {
                self.toggle_lock(category, &field);
                Ok(())
            }
            Command::Copy(target) => self.copy(target),
            Command::SwitchTab(tab) => {
                self.switch_tab(&tab);
                Ok(())
            }
            Command::SelectTarotLayout(index) => self.select_tarot_layout(index),
            Command::DrawTarot => self.draw_tarot(),
        };
        if let Err(ref e) = result {
            log::warn!("Command failed: {}", e);
            self.renderer.notify(&e.to_string());
        }
        result
    }

    /// Accept the loaded tables. Generation is refused until this happens.
    pub fn install_tables(&mut self, tables: CategoryTables) {
        log::info!(
            "Category tables ready ({} tarot layouts, {} cards)",
            tables.tarot_layouts().len(),
            tables.tarot_deck().len()
        );
        self.tables = Some(tables);
    }

    /// Report a failed bulk load. The controller stays not-ready.
    pub fn load_failed(&mut self, error: &TableError) {
        log::error!("Error loading category tables: {}", error);
        self.renderer.notify(&format!(
            "Failed to load category tables ({}). Please ensure the table files are in place.",
            error
        ));
    }

    pub fn is_ready(&self) -> bool {
        self.tables.is_some()
    }

    pub fn tables(&self) -> Option<&CategoryTables> {
        self.tables.as_ref()
    }

    pub fn state(&self) -> &PersistedState {
        &self.state
    }

    pub fn record(&self, category: Category) -> &GeneratedRecord {
        self.state.generated.record(category)
    }

    pub fn locks(&self, category: Category) -> &LockSet {
        self.state.locked.locks(category)
    }

    pub fn tarot(&self) -> Option<&TarotResult> {
        self.state.generated.tarot.as_ref()
    }

    pub fn active_tab(&self) -> &str {
        &self.state.active_tab
    }

    /// Text the copy command would export, if there is anything to copy.
    pub fn export_text(&self, target: CopyTarget) -> Option<String> {
        let text = match target {
            CopyTarget::Record(category) => format_record(category, self.record(category)),
            CopyTarget::Tarot => format_tarot(self.tarot()?),
        };
        if text.is_empty() {
            None
        } else {
            Some(text)
        }
    }

    /// Push the whole session to the renderer.
    pub fn render_all(&mut self) {
        self.renderer.tab_changed(&self.state.active_tab);
        for category in Category::ALL {
            self.render_category(category);
        }
        self.renderer.render_tarot(self.state.generated.tarot.as_ref());
    }

    fn generate(&mut self, category: Category) -> Result<(), SpinnerError> {
        let tables = self.tables.as_ref().ok_or(SpinnerError::DataNotReady)?;
        let record = regenerate(
            category,
            self.state.generated.record(category),
            self.state.locked.locks(category),
            tables,
            &mut self.rng,
        );
        *self.state.generated.record_mut(category) = record;
        self.persist();
        self.render_category(category);
        Ok(())
    }

    fn toggle_lock(&mut self, category: Category, field: &str) {
        let locked = self.state.locked.locks_mut(category).toggle(field);
        log::debug!(
            "{} '{}' in {}",
            if locked { "Locked" } else { "Unlocked" },
            field,
            category
        );
        self.persist();
        self.render_category(category);
    }

    fn copy(&mut self, target: CopyTarget) -> Result<(), SpinnerError> {
        let Some(text) = self.export_text(target) else {
            log::debug!("Nothing to copy for {:?}", target);
            return Ok(());
        };
        self.clipboard.write_text(&text)?;
        self.renderer.notify("Copied to clipboard!");
        Ok(())
    }

    fn switch_tab(&mut self, tab: &str) {
        self.state.active_tab = tab.to_string();
        self.persist();
        self.renderer.tab_changed(tab);
    }

    fn select_tarot_layout(&mut self, index: usize) -> Result<(), SpinnerError> {
        if let Some(tables) = &self.tables {
            let available = tables.tarot_layouts().len();
            if index >= available {
                return Err(TarotError::UnknownLayout { index, available }.into());
            }
        }
        self.state.tarot_layout_index = index;
        self.persist();
        Ok(())
    }

    fn draw_tarot(&mut self) -> Result<(), SpinnerError> {
        let tables = self.tables.as_ref().ok_or(SpinnerError::DataNotReady)?;
        let result = draw_from_tables(tables, self.state.tarot_layout_index, &mut self.rng)?;
        self.state.generated.tarot = Some(result);
        self.persist();
        self.renderer
            .render_tarot(self.state.generated.tarot.as_ref());
        Ok(())
    }

    fn render_category(&mut self, category: Category) {
        self.renderer.render_record(
            category,
            self.state.generated.record(category),
            self.state.locked.locks(category),
        );
    }

    // Save failures are logged; the in-memory state stays authoritative.
    fn persist(&mut self) {
        if let Err(e) = self.store.save(&self.state) {
            log::error!("Failed to save session state: {}", e);
        }
    }
}

impl ControllerBuilder {
    /// Seed the random source. Without a seed, OS entropy is used.
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Load tables from a directory when building.
    pub fn tables_dir(mut self, path: &str) -> Self {
        self.tables_dir = Some(PathBuf::from(path));
        self
    }

    /// Provide tables directly (for testing without files).
    pub fn with_tables(mut self, tables: CategoryTables) -> Self {
        self.tables = Some(tables);
        self
    }

    pub fn storage(mut self, storage: impl StoragePort + 'static) -> Self {
        self.storage = Some(Box::new(storage));
        self
    }

    pub fn storage_key(mut self, key: &str) -> Self {
        self.storage_key = key.to_string();
        self
    }

    pub fn renderer(mut self, renderer: impl Renderer + 'static) -> Self {
        self.renderer = Some(Box::new(renderer));
        self
    }

    pub fn clipboard(mut self, clipboard: impl Clipboard + 'static) -> Self {
        self.clipboard = Some(Box::new(clipboard));
        self
    }

    /// Restore the saved session (or start empty), render it, and return
    /// the controller. Tables given via `with_tables` win over
    /// `tables_dir`; with neither, the controller starts not-ready.
    pub fn build(self) -> Result<Controller, SpinnerError> {
        let tables = match (self.tables, self.tables_dir) {
            (Some(tables), _) => Some(tables),
            (None, Some(dir)) => Some(CategoryTables::load_from_dir(Path::new(&dir))?),
            (None, None) => None,
        };

        let storage = self
            .storage
            .unwrap_or_else(|| Box::new(MemoryStorage::new()));
        let store = PersistenceStore::with_key(storage, &self.storage_key);
        let state = store.restore().unwrap_or_default();

        let rng = match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        let mut controller = Controller {
            state,
            tables,
            store,
            renderer: self.renderer.unwrap_or_else(|| Box::new(NullRenderer)),
            clipboard: self
                .clipboard
                .unwrap_or_else(|| Box::new(MemoryClipboard::new())),
            rng,
        };
        controller.render_all();
        Ok(controller)
    }
}
