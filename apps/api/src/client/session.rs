//! Editor session state shared between the UI loop and background tasks.

use serde::{Deserialize, Serialize};
use tokio::sync::watch;
use uuid::Uuid;

/// A single observable value. Every `set`/`update` wakes subscribers.
#[derive(Debug)]
pub struct StateCell<T> {
    tx: watch::Sender<T>,
}

impl<T: Clone> StateCell<T> {
    pub fn new(initial: T) -> Self {
        let (tx, _rx) = watch::channel(initial);
        Self { tx }
    }

    pub fn get(&self) -> T {
        self.tx.borrow().clone()
    }

    /// Replaces the value, returning the previous one.
    pub fn set(&self, value: T) -> T {
        self.tx.send_replace(value)
    }

    pub fn update(&self, f: impl FnOnce(&mut T)) {
        self.tx.send_modify(f);
    }

    pub fn subscribe(&self) -> watch::Receiver<T> {
        self.tx.subscribe()
    }
}

impl<T: Clone + Default> Default for StateCell<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", content = "message", rename_all = "snake_case")]
pub enum SaveStatus {
    #[default]
    Idle,
    Saving,
    Saved,
    Error(String),
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    pub fn toggled(self) -> Self {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }
}

#[derive(Debug, Default)]
pub struct EditorSession {
    pub active_resume: StateCell<Option<Uuid>>,
    pub save_status: StateCell<SaveStatus>,
    pub theme: StateCell<Theme>,
    /// Last key accepted by the credential modal.
    pub api_key: StateCell<Option<String>>,
}

impl EditorSession {
    pub fn new(api_key: Option<String>) -> Self {
        let session = Self::default();
        session.api_key.set(api_key);
        session
    }

    /// Switching resumes resets the save indicator.
    pub fn open_resume(&self, resume_id: Uuid) {
        if self.active_resume.set(Some(resume_id)) != Some(resume_id) {
            self.save_status.set(SaveStatus::Idle);
        }
    }

    pub fn toggle_theme(&self) -> Theme {
        self.theme.update(|t| *t = t.toggled());
        self.theme.get()
    }
}
