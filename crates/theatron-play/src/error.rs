#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum PlayError {
    /// No media source is attached; the UI shows the "no playable video"
    /// state instead of failing.
    #[error("no media source attached")]
    NoSource,
}
