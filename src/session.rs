//! Ownership of the volumes an application currently works with.

use crate::error::Result;
use crate::object::{LoadedVolume, ReaderOptions};
use std::path::Path;

/// Holds the current volume and an optional overlay, loaded with a shared
/// set of reader options.
///
/// A failed load leaves the held volumes untouched.
///
/// # Example
///
/// ```no_run
/// use niivolume::{ReaderOptions, Session};
///
/// let mut session = Session::new(ReaderOptions::new());
/// session.load("anatomy.nii", |_| ())?;
/// session.load_overlay("activation.nii", |_| ())?;
/// assert!(session.current().is_some());
/// # Ok::<(), niivolume::NiftiError>(())
/// ```
#[derive(Debug, Default)]
pub struct Session {
    options: ReaderOptions,
    current: Option<LoadedVolume>,
    overlay: Option<LoadedVolume>,
}

impl Session {
    /// Create an empty session.
    pub fn new(options: ReaderOptions) -> Self {
        Session {
            options,
            current: None,
            overlay: None,
        }
    }

    /// The options used for every load.
    pub fn options(&self) -> &ReaderOptions {
        &self.options
    }

    /// Replace the options used for later loads.
    pub fn set_options(&mut self, options: ReaderOptions) {
        self.options = options;
    }

    /// Load the volume at `path` and make it the current volume.
    pub fn load<P, F>(&mut self, path: P, progress: F) -> Result<&LoadedVolume>
    where
        P: AsRef<Path>,
        F: FnMut(f32),
    {
        let loaded = self.options.read_file(path, progress)?;
        Ok(&*self.current.insert(loaded))
    }

    /// Load the volume at `path` as the overlay.
    pub fn load_overlay<P, F>(&mut self, path: P, progress: F) -> Result<&LoadedVolume>
    where
        P: AsRef<Path>,
        F: FnMut(f32),
    {
        let loaded = self.options.read_file(path, progress)?;
        Ok(&*self.overlay.insert(loaded))
    }

    /// The current volume, if any.
    pub fn current(&self) -> Option<&LoadedVolume> {
        self.current.as_ref()
    }

    /// The overlay volume, if any.
    pub fn overlay(&self) -> Option<&LoadedVolume> {
        self.overlay.as_ref()
    }

    /// Release the current volume.
    pub fn take_current(&mut self) -> Option<LoadedVolume> {
        self.current.take()
    }

    /// Release the overlay volume.
    pub fn take_overlay(&mut self) -> Option<LoadedVolume> {
        self.overlay.take()
    }
}
