//! vsfs - Open-file table
//!
//! A fixed 128-slot table, one per directory entry; the slot index doubles
//! as the fd returned by `open`. Slots hold a mode, not a pointer into the
//! directory cache, so a moved or re-read `Directory` never invalidates a
//! live handle (see SPEC_FULL.md's "pointer-via-entry" resolution).

use crate::layout::MAX_FILES;

/// The mode a file was opened in. `MODE_READ`/`MODE_APPEND` in spec.md §6.2.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpenMode {
    Read,
    Append,
}

#[derive(Debug, Clone, Copy)]
struct Slot {
    free: bool,
    mode: OpenMode,
}

/// The process-wide (here: `Filesystem`-wide) table of active file handles.
pub struct OpenFileTable {
    slots: [Slot; MAX_FILES],
}

impl OpenFileTable {
    pub fn new() -> Self {
        Self {
            slots: [Slot {
                free: true,
                mode: OpenMode::Read,
            }; MAX_FILES],
        }
    }

    /// `Some(mode)` if `fd` is a valid, currently open slot.
    pub fn mode_of(&self, fd: usize) -> Option<OpenMode> {
        self.slots
            .get(fd)
            .filter(|slot| !slot.free)
            .map(|slot| slot.mode)
    }

    pub fn is_open(&self, fd: usize) -> bool {
        self.slots.get(fd).map(|s| !s.free).unwrap_or(false)
    }

    /// Marks `fd` in-use with `mode`. Caller is responsible for checking
    /// `fd < MAX_FILES` and any same-mode/different-mode rules first.
    pub fn open(&mut self, fd: usize, mode: OpenMode) {
        self.slots[fd] = Slot { free: false, mode };
    }

    /// Frees `fd` if it is within range and currently open.
    pub fn close(&mut self, fd: usize) -> bool {
        match self.slots.get_mut(fd) {
            Some(slot) if !slot.free => {
                slot.free = true;
                true
            }
            _ => false,
        }
    }
}
