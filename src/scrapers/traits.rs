use anyhow::Result;

/// Source of rendered page markup.
///
/// This is the seam between the pipeline stages and the browser session;
/// tests substitute an in-memory map of canned documents.
pub trait PageSource {
    /// Navigate to `url` and return the rendered document. When `marker` is
    /// given, the implementation waits (bounded) for that selector to appear
    /// before snapshotting; a marker that never shows up is not an error.
    fn page(&mut self, url: &str, marker: Option<&str>) -> Result<String>;
}
