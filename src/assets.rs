//! Background loading of glTF documents into scene-graph fragments.
//!
//! A load runs on its own short-lived thread and does file I/O and parsing
//! only, never GPU work; the result comes back through a oneshot channel
//! the frame loop polls at frame boundaries. Once begun, a load either
//! completes or fails; there is no retry, cancellation, or timeout.

mod gltf_import;

use std::{
    path::{Path, PathBuf},
    thread,
};

use futures::channel::oneshot;

use crate::{animation::AnimationClip, graphics::mesh::Skin, scene::Node};

/// Everything a glTF document contributes to the scene.
#[derive(Debug)]
pub struct LoadedModel {
    /// Root of the loaded scene-graph fragment.
    pub root: Node,
    /// Skeleton for the document's skinned meshes, if it has one.
    pub skin: Option<Skin>,
    /// Animation clips found in the document. May be empty;
    /// that is not an error, the model is simply static.
    pub clips: Vec<AnimationClip>,
}

/// An error that occurred loading a model.
#[derive(thiserror::Error, Debug)]
pub enum LoadError {
    #[error("failed to read or parse glTF document")]
    Gltf(#[from] gltf::Error),
    #[error("load thread terminated before completing")]
    Canceled,
}

/// A model load in flight. Poll once per frame with [`poll`][Self::poll].
pub struct PendingLoad {
    path: PathBuf,
    rx: oneshot::Receiver<Result<LoadedModel, LoadError>>,
}

impl PendingLoad {
    /// Check for completion without blocking.
    /// Returns None while the load is still running.
    pub fn poll(&mut self) -> Option<Result<LoadedModel, LoadError>> {
        match self.rx.try_recv() {
            Ok(Some(result)) => Some(result),
            Ok(None) => None,
            Err(oneshot::Canceled) => Some(Err(LoadError::Canceled)),
        }
    }

    /// The path the load was started for, for log messages.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// A load fed from a hand-held channel instead of a load thread,
    /// so tests can resolve it however they like.
    #[cfg(test)]
    pub(crate) fn from_channel(
        path: impl Into<PathBuf>,
        rx: oneshot::Receiver<Result<LoadedModel, LoadError>>,
    ) -> Self {
        Self {
            path: path.into(),
            rx,
        }
    }
}

/// Start loading the glTF document at `path`,
/// along with the buffer and image files it references next to it.
pub fn begin_load(path: impl Into<PathBuf>) -> PendingLoad {
    let path = path.into();
    let (tx, rx) = oneshot::channel();
    let load_path = path.clone();
    thread::spawn(move || {
        // the receiver may be gone if the app shut down mid-load;
        // nothing to deliver the result to in that case
        let _ = tx.send(load_sync(&load_path));
    });
    PendingLoad { path, rx }
}

fn load_sync(path: &Path) -> Result<LoadedModel, LoadError> {
    let (doc, buffers, _images) = gltf::import(path)?;
    let buffers: Vec<&[u8]> = buffers.iter().map(|data| data.0.as_slice()).collect();
    Ok(gltf_import::load_model(&doc, &buffers))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_reports_an_error_through_the_channel() {
        let mut pending = begin_load("definitely/not/a/real/model.gltf");
        // the load thread fails fast on the missing file; wait for its answer
        let result = loop {
            if let Some(result) = pending.poll() {
                break result;
            }
            thread::yield_now();
        };
        assert!(matches!(result, Err(LoadError::Gltf(_))));
    }
}
