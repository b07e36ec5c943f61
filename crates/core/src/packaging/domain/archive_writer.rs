/// Domain interface for assembling the output bundle.
///
/// `finalize` consumes the writer's buffered state and returns the
/// bundle summary bytes; a writer is single-use.
pub trait ArchiveWriter: Send {
    fn add_entry(&mut self, name: &str, bytes: &[u8]) -> Result<(), Box<dyn std::error::Error>>;

    fn finalize(&mut self) -> Result<Vec<u8>, Box<dyn std::error::Error>>;

    /// Extension of whatever `finalize` produces.
    fn extension(&self) -> &'static str;
}

/// Domain interface for handing the finished bundle to the user:
/// a download, a directory, an upload target.
pub trait DeliverySink: Send {
    fn deliver(&mut self, filename: &str, bytes: &[u8]) -> Result<(), Box<dyn std::error::Error>>;
}
