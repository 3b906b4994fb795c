//! Durable operator-side storage for the single `active_timer` slot.

use crate::errors::AppResult;
use crate::models::TimerSession;
use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::rc::Rc;

pub const ACTIVE_TIMER_KEY: &str = "active_timer";

/// One slot, holding at most one session.
pub trait TimerStorage {
    fn load(&self) -> AppResult<Option<TimerSession>>;
    fn save(&self, session: &TimerSession) -> AppResult<()>;
    /// Empty the slot, discarding it even when it cannot be read.
    /// Returns whether anything was there.
    fn clear(&self) -> AppResult<bool>;
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct StateDocument {
    #[serde(rename = "active_timer", default)]
    active_timer: Option<TimerSession>,
}

/// JSON file on disk: `{"active_timer": {...}}`.
/// Every process pointed at the same path shares the slot.
#[derive(Debug, Clone)]
pub struct FileTimerStorage {
    path: PathBuf,
}

impl FileTimerStorage {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    fn read_doc(&self) -> AppResult<StateDocument> {
        if !self.path.exists() {
            return Ok(StateDocument::default());
        }
        let content = fs::read_to_string(&self.path)?;
        if content.trim().is_empty() {
            return Ok(StateDocument::default());
        }
        Ok(serde_json::from_str(&content)?)
    }

    /// Write through a sibling temp file then rename, so readers never see
    /// a half-written document.
    fn write_doc(&self, doc: &StateDocument) -> AppResult<()> {
        if let Some(dir) = self.path.parent()
            && !dir.as_os_str().is_empty()
        {
            fs::create_dir_all(dir)?;
        }
        let tmp = self.path.with_extension("json.tmp");
        {
            let mut file = fs::File::create(&tmp)?;
            file.write_all(serde_json::to_string_pretty(doc)?.as_bytes())?;
            file.sync_all()?;
        }
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

impl TimerStorage for FileTimerStorage {
    fn load(&self) -> AppResult<Option<TimerSession>> {
        Ok(self.read_doc()?.active_timer)
    }

    fn save(&self, session: &TimerSession) -> AppResult<()> {
        let mut doc = self.read_doc()?;
        doc.active_timer = Some(session.clone());
        self.write_doc(&doc)
    }

    fn clear(&self) -> AppResult<bool> {
        if !self.path.exists() {
            return Ok(false);
        }
        match self.read_doc() {
            Ok(mut doc) => {
                let had = doc.active_timer.take().is_some();
                if had {
                    self.write_doc(&doc)?;
                }
                Ok(had)
            }
            // Unreadable: replace the whole document without parsing it.
            Err(_) => {
                self.write_doc(&StateDocument::default())?;
                Ok(true)
            }
        }
    }
}

/// In-process slot. Clones share it, like two tabs of one operator session.
#[derive(Debug, Clone, Default)]
pub struct MemoryTimerStorage {
    slot: Rc<RefCell<Option<TimerSession>>>,
}

impl MemoryTimerStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl TimerStorage for MemoryTimerStorage {
    fn load(&self) -> AppResult<Option<TimerSession>> {
        Ok(self.slot.borrow().clone())
    }

    fn save(&self, session: &TimerSession) -> AppResult<()> {
        *self.slot.borrow_mut() = Some(session.clone());
        Ok(())
    }

    fn clear(&self) -> AppResult<bool> {
        Ok(self.slot.borrow_mut().take().is_some())
    }
}
