//! Interface to the external per-file resource store.

/// Source of per-file resource records.
///
/// The engine consumes only the `Information` record: the original input
/// path followed by the compile arguments the file was last indexed with.
pub trait ResourceProvider: Send + Sync {
    /// `[original_input, arg0, arg1, …]` for `file`, or `None` when no
    /// record exists.
    fn information(&self, file: &[u8]) -> Option<Vec<Vec<u8>>>;
}

/// Provider with no records.
///
/// Engines built without a resource store reject every reindex request.
#[derive(Debug, Default)]
pub struct NoResources;

impl ResourceProvider for NoResources {
    fn information(&self, _file: &[u8]) -> Option<Vec<Vec<u8>>> {
        None
    }
}
