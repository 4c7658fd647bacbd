use theatron_core::ContentId;
use theatron_events::{ContinuityEvent, EventBus};
use url::Url;

use crate::{episode::EpisodeRef, error::ContinuityError, series::SeriesIndex, ContinuityResult};

/// Outcome of a selection request.
#[derive(Clone, Debug, PartialEq)]
pub enum Selection {
    /// The active episode changed; the caller should (re)attach playback.
    Changed,
    /// The requested episode was already active; playback is untouched.
    Unchanged,
}

/// Tracks the active episode inside a series and keeps the shareable
/// `ep=` URL parameter in sync.
pub struct EpisodeSelector {
    index: SeriesIndex,
    current: usize,
    bus: EventBus,
}

impl EpisodeSelector {
    /// Create a selector with the episode at `initial` active. The initial
    /// index comes from [`SeriesIndex::resolve_initial`].
    pub fn new(index: SeriesIndex, initial: usize, bus: EventBus) -> Self {
        let current = initial.min(index.len().saturating_sub(1));
        let selector = Self {
            index,
            current,
            bus,
        };
        selector.publish_selected();
        selector
    }

    #[must_use]
    pub fn current(&self) -> &EpisodeRef {
        // Index is validated in the constructor and every mutation.
        &self.index.episodes()[self.current]
    }

    #[must_use]
    pub fn series(&self) -> &SeriesIndex {
        &self.index
    }

    /// Value of the `ep=` query parameter for the active episode.
    #[must_use]
    pub fn url_param(&self) -> String {
        format!("ep={}", self.current().id)
    }

    /// Copy of `base` with the `ep` query parameter reflecting the active
    /// episode, replacing any previous value.
    #[must_use]
    pub fn share_url(&self, base: &Url) -> Url {
        let mut url = base.clone();
        let others: Vec<(String, String)> = url
            .query_pairs()
            .filter(|(k, _)| k != "ep")
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect();
        {
            let mut pairs = url.query_pairs_mut();
            pairs.clear();
            for (k, v) in &others {
                pairs.append_pair(k, v);
            }
            pairs.append_pair("ep", self.current().id.as_str());
        }
        url
    }

    /// Activate the episode with `id`.
    ///
    /// Selecting the already-current episode reports
    /// [`Selection::Unchanged`] so callers never reset playback for it.
    pub fn select(&mut self, id: &ContentId) -> ContinuityResult<Selection> {
        let target = self
            .index
            .position_of(id)
            .ok_or_else(|| ContinuityError::UnknownEpisode(id.clone()))?;

        if target == self.current {
            self.bus.publish(ContinuityEvent::SelectionUnchanged {
                episode: id.clone(),
            });
            return Ok(Selection::Unchanged);
        }

        self.current = target;
        self.publish_selected();
        Ok(Selection::Changed)
    }

    /// Advance one ordinal position. `None` at the last episode.
    pub fn select_next(&mut self) -> Option<&EpisodeRef> {
        if self.current + 1 >= self.index.len() {
            return None;
        }
        self.current += 1;
        self.publish_selected();
        Some(self.current())
    }

    /// Step back one ordinal position. `None` at the first episode.
    pub fn select_previous(&mut self) -> Option<&EpisodeRef> {
        if self.current == 0 {
            return None;
        }
        self.current -= 1;
        self.publish_selected();
        Some(self.current())
    }

    fn publish_selected(&self) {
        self.bus.publish(ContinuityEvent::EpisodeSelected {
            episode: self.current().id.clone(),
            url_param: self.url_param(),
        });
    }
}
