//! # Remote Folder Browser
//!
//! Tracks the current folder, the listing on screen, and an explicit stack
//! of the folders we descended from. The stack plus the current folder id
//! always reconstruct the path taken from the store root.
//!
//! Fetching is split in two so no state is borrowed across the network
//! call: navigation methods return a [`ListingRequest`], and the result
//! comes back through [`FolderBrowser::apply_listing`].
//!
//! ```text
//! descend(Docs) ──► ListingRequest{ticket: 3, folder: Docs}
//!                         │
//!              (FileStore::list_files)
//!                         ▼
//! apply_listing(3, Ok([...]))  ──► listing replaced
//! apply_listing(2, ...)        ──► superseded, dropped
//! ```

use log::{debug, info, warn};

use crate::api::{ApiError, FileEntry};
use crate::core::error::SessionError;

/// Where we were before one descent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavigationFrame {
    /// Folder we left; `None` is the store root.
    pub parent_id: Option<String>,
    /// Name of the folder we descended into.
    pub display_name: String,
}

/// A listing fetch the caller must perform and report back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListingRequest {
    pub ticket: u64,
    pub folder_id: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListingOutcome {
    /// The listing was replaced; it may legitimately be empty.
    Loaded { entries: usize },
    /// A newer request was issued after this one; the result was dropped.
    Superseded,
}

#[derive(Debug, Default)]
pub struct FolderBrowser {
    current: Option<String>,
    stack: Vec<NavigationFrame>,
    listing: Vec<FileEntry>,
    /// Folder the listing on screen belongs to.
    listing_folder: Option<String>,
    last_ticket: u64,
    outstanding: Option<u64>,
    loaded: bool,
    last_error: Option<String>,
}

impl FolderBrowser {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts a fetch of `folder_id`'s children. Navigation state is not
    /// touched; `descend`, `back` and `refresh` decide which folder to open.
    pub fn open(&mut self, folder_id: Option<String>) -> ListingRequest {
        self.last_ticket += 1;
        self.outstanding = Some(self.last_ticket);
        debug!("Open folder {:?} (ticket {})", folder_id, self.last_ticket);
        ListingRequest {
            ticket: self.last_ticket,
            folder_id,
        }
    }

    /// Rejected with `Busy` while a fetch is outstanding, and with
    /// `InvalidOperation` when the listing on screen belongs to another folder
    /// (a failed descent left it behind), since `entry` was picked from it.
    pub fn descend(&mut self, entry: &FileEntry) -> Result<ListingRequest, SessionError> {
        if !entry.is_folder() {
            return Err(SessionError::InvalidOperation("only folders can be opened"));
        }
        self.ensure_idle()?;
        if self.loaded && self.listing_folder != self.current {
            return Err(SessionError::InvalidOperation(
                "listing is out of date, refresh first",
            ));
        }
        self.stack.push(NavigationFrame {
            parent_id: self.current.take(),
            display_name: entry.name.clone(),
        });
        self.current = Some(entry.id.clone());
        info!("Descend into {} (depth {})", entry.id, self.stack.len());
        Ok(self.open(self.current.clone()))
    }

    /// Returns `Ok(None)` (and does nothing) at the store root.
    pub fn back(&mut self) -> Result<Option<ListingRequest>, SessionError> {
        self.ensure_idle()?;
        let Some(frame) = self.stack.pop() else {
            return Ok(None);
        };
        self.current = frame.parent_id;
        info!("Back to {:?} (depth {})", self.current, self.stack.len());
        Ok(Some(self.open(self.current.clone())))
    }

    fn ensure_idle(&self) -> Result<(), SessionError> {
        if self.is_loading() {
            debug!("Navigation refused, ticket {:?} outstanding", self.outstanding);
            return Err(SessionError::Busy);
        }
        Ok(())
    }

    pub fn refresh(&mut self) -> ListingRequest {
        self.open(self.current.clone())
    }

    /// Jumps straight to the store root, dropping the whole stack.
    pub fn home(&mut self) -> ListingRequest {
        self.stack.clear();
        self.current = None;
        self.open(None)
    }

    /// Installs the result of a fetch started by `open`.
    ///
    /// On failure the previous listing stays on screen and the error is kept
    /// in [`last_error`](Self::last_error) until the next successful load.
    pub fn apply_listing(
        &mut self,
        ticket: u64,
        result: Result<Vec<FileEntry>, ApiError>,
    ) -> Result<ListingOutcome, SessionError> {
        if self.outstanding != Some(ticket) {
            debug!(
                "Dropping superseded listing (ticket {}, outstanding {:?})",
                ticket, self.outstanding
            );
            return Ok(ListingOutcome::Superseded);
        }
        self.outstanding = None;

        match result {
            Ok(entries) => {
                let count = entries.len();
                self.listing = entries;
                self.listing_folder = self.current.clone();
                self.loaded = true;
                self.last_error = None;
                Ok(ListingOutcome::Loaded { entries: count })
            }
            Err(err) => {
                warn!("Listing failed for {:?}: {}", self.current, err);
                let err = SessionError::from(err);
                if let SessionError::FetchFailure(msg) = &err {
                    self.last_error = Some(msg.clone());
                }
                Err(err)
            }
        }
    }

    /// Back to the root with nothing loaded. Tickets keep counting so late
    /// results from before the reset are still recognised as stale.
    pub fn reset(&mut self) {
        self.current = None;
        self.stack.clear();
        self.listing.clear();
        self.listing_folder = None;
        self.outstanding = None;
        self.loaded = false;
        self.last_error = None;
    }

    pub fn current_folder(&self) -> Option<&str> {
        self.current.as_deref()
    }

    pub fn listing(&self) -> &[FileEntry] {
        &self.listing
    }

    pub fn stack(&self) -> &[NavigationFrame] {
        &self.stack
    }

    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    /// Names of the folders descended into, root first.
    pub fn breadcrumb(&self) -> Vec<&str> {
        self.stack.iter().map(|f| f.display_name.as_str()).collect()
    }

    pub fn is_loading(&self) -> bool {
        self.outstanding.is_some()
    }

    /// True once any listing has loaded since creation or the last reset.
    pub fn has_loaded(&self) -> bool {
        self.loaded
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }
}
