#![forbid(unsafe_code)]

use theatron_core::ContentId;

/// Events published by episode continuity.
#[derive(Clone, Debug)]
#[non_exhaustive]
pub enum ContinuityEvent {
    /// The active episode changed; `url_param` is the shareable `ep=` value.
    EpisodeSelected {
        episode: ContentId,
        url_param: String,
    },
    /// A selection targeted the already-current episode; no re-attach.
    SelectionUnchanged { episode: ContentId },
}
