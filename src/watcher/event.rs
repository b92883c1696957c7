//! Raw filesystem events as seen by the coordinator.

use std::path::PathBuf;

use notify::EventKind;
use notify::event::{CreateKind, ModifyKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FsEventKind {
    Created,
    Modified,
}

/// A single create/modify notification for one path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FsEvent {
    pub path: PathBuf,
    pub kind: FsEventKind,
    pub is_dir: bool,
}

impl FsEvent {
    pub fn created(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            kind: FsEventKind::Created,
            is_dir: false,
        }
    }

    pub fn modified(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            kind: FsEventKind::Modified,
            is_dir: false,
        }
    }

    pub fn directory(path: impl Into<PathBuf>, kind: FsEventKind) -> Self {
        Self {
            path: path.into(),
            kind,
            is_dir: true,
        }
    }

    /// Translate a notify event into zero or more create/modify events.
    ///
    /// Access, remove and unclassified events are dropped. Renames surface
    /// as modifications of the destination path.
    pub fn from_notify(event: notify::Event) -> Vec<FsEvent> {
        let (kind, known_dir) = match event.kind {
            EventKind::Create(CreateKind::Folder) => (FsEventKind::Created, Some(true)),
            EventKind::Create(CreateKind::File) => (FsEventKind::Created, Some(false)),
            EventKind::Create(_) => (FsEventKind::Created, None),
            EventKind::Modify(ModifyKind::Metadata(_)) => return Vec::new(),
            EventKind::Modify(_) => (FsEventKind::Modified, None),
            _ => return Vec::new(),
        };

        event
            .paths
            .into_iter()
            .map(|path| {
                let is_dir = known_dir.unwrap_or_else(|| path.is_dir());
                FsEvent { path, kind, is_dir }
            })
            .collect()
    }
}
