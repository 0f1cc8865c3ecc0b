use crate::assets::io::AssetSource;
use crate::assets::loaders::GltfLoader;
use crate::assets::prefab::Prefab;
use crate::errors::{Result, ViewerError};

#[cfg(not(target_arch = "wasm32"))]
use std::sync::OnceLock;
#[cfg(not(target_arch = "wasm32"))]
use tokio::runtime::Runtime;

#[cfg(not(target_arch = "wasm32"))]
fn asset_runtime() -> Result<&'static Runtime> {
    static RUNTIME: OnceLock<Option<Runtime>> = OnceLock::new();
    RUNTIME
        .get_or_init(|| {
            tokio::runtime::Builder::new_multi_thread()
                .thread_name("asset-loader")
                .enable_all()
                .build()
                .map_err(|e| log::error!("Failed to create asset loader runtime: {e}"))
                .ok()
        })
        .as_ref()
        .ok_or_else(|| ViewerError::Io(std::io::Error::other("asset loader runtime unavailable")))
}

/// A load running in the background.
///
/// Poll it once per frame; it yields its result exactly once.
pub struct PendingLoad<T> {
    rx: flume::Receiver<Result<T>>,
    finished: bool,
}

impl<T> PendingLoad<T> {
    fn channel() -> (flume::Sender<Result<T>>, Self) {
        let (tx, rx) = flume::bounded(1);
        (tx, Self { rx, finished: false })
    }

    /// A load that has already completed with `result`.
    #[must_use]
    pub fn ready(result: Result<T>) -> Self {
        let (tx, pending) = Self::channel();
        // The receiver is alive in `pending`, so this cannot fail
        let _ = tx.send(result);
        pending
    }

    /// Returns the result once it is available, `None` while loading and
    /// after the result has been taken.
    pub fn poll(&mut self) -> Option<Result<T>> {
        if self.finished {
            return None;
        }
        match self.rx.try_recv() {
            Ok(result) => {
                self.finished = true;
                Some(result)
            }
            Err(flume::TryRecvError::Empty) => None,
            Err(flume::TryRecvError::Disconnected) => {
                self.finished = true;
                Some(Err(ViewerError::LoadCancelled))
            }
        }
    }

    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.finished
    }
}

/// Entry point for loading model files.
#[derive(Debug, Clone, Copy, Default)]
pub struct AssetServer;

#[allow(clippy::unused_self)]
impl AssetServer {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts loading a glTF/GLB model from a path or URL in the background.
    ///
    /// Native builds run the load on the asset runtime's worker threads; on
    /// the web it runs as a local future on the browser's event loop.
    pub fn load_gltf(&self, source: &str) -> PendingLoad<Prefab> {
        let source = match AssetSource::parse(source) {
            Ok(source) => source,
            Err(e) => return PendingLoad::ready(Err(e)),
        };

        log::info!("Loading model from {source}");
        let (tx, pending) = PendingLoad::channel();

        let task = async move {
            let result = GltfLoader::load(&source).await;
            if tx.send(result).is_err() {
                log::debug!("Model load of {source} finished after its receiver was dropped");
            }
        };

        #[cfg(not(target_arch = "wasm32"))]
        {
            match asset_runtime() {
                Ok(runtime) => {
                    runtime.spawn(task);
                }
                Err(e) => return PendingLoad::ready(Err(e)),
            }
        }
        #[cfg(target_arch = "wasm32")]
        {
            wasm_bindgen_futures::spawn_local(task);
        }

        pending
    }

    /// Loads a model on the calling thread.
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load_gltf_blocking(&self, source: &str) -> Result<Prefab> {
        let source = AssetSource::parse(source)?;
        asset_runtime()?.block_on(GltfLoader::load(&source))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ready_load_yields_once() {
        let mut pending = PendingLoad::ready(Ok(7_u32));
        assert!(!pending.is_finished());
        assert_eq!(pending.poll().map(Result::ok), Some(Some(7)));
        assert!(pending.is_finished());
        assert!(pending.poll().is_none());
    }

    #[test]
    fn dropped_sender_reports_cancellation() {
        let (tx, mut pending) = PendingLoad::<u32>::channel();
        drop(tx);
        assert!(matches!(pending.poll(), Some(Err(ViewerError::LoadCancelled))));
    }

    #[test]
    fn empty_channel_is_still_loading() {
        let (_tx, mut pending) = PendingLoad::<u32>::channel();
        assert!(pending.poll().is_none());
        assert!(!pending.is_finished());
    }
}
