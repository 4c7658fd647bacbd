use theatron_core::{watched_fraction, ContentId, WATCHED_FRACTION};
use theatron_storage::ProgressStore;
use tracing::warn;

use crate::{episode::EpisodeRef, error::ContinuityError, ContinuityResult};

/// Ordinal-sorted view of one series.
#[derive(Clone, Debug)]
pub struct SeriesIndex {
    episodes: Vec<EpisodeRef>,
}

impl SeriesIndex {
    /// Build an index from an unordered episode list.
    pub fn new(mut episodes: Vec<EpisodeRef>) -> ContinuityResult<Self> {
        if episodes.is_empty() {
            return Err(ContinuityError::EmptySeries);
        }
        episodes.sort_by_key(|e| e.ordinal);
        Ok(Self { episodes })
    }

    pub fn episodes(&self) -> &[EpisodeRef] {
        &self.episodes
    }

    pub fn len(&self) -> usize {
        self.episodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.episodes.is_empty()
    }

    pub fn position_of(&self, id: &ContentId) -> Option<usize> {
        self.episodes.iter().position(|e| &e.id == id)
    }

    pub fn get(&self, index: usize) -> Option<&EpisodeRef> {
        self.episodes.get(index)
    }

    /// Resolve the episode to start with.
    ///
    /// Precedence: the URL-supplied episode when it belongs to the series,
    /// then the first episode not yet watched to the 90% threshold, then
    /// the first episode outright. A URL episode deliberately wins over
    /// progress state so shared links always land where they point.
    pub fn resolve_initial(
        &self,
        url_episode: Option<&ContentId>,
        store: &dyn ProgressStore,
    ) -> usize {
        if let Some(id) = url_episode {
            if let Some(index) = self.position_of(id) {
                return index;
            }
            warn!(episode = %id, "url episode not in series, falling back");
        }

        self.episodes
            .iter()
            .position(|episode| !Self::is_watched(episode, store))
            .unwrap_or(0)
    }

    fn is_watched(episode: &EpisodeRef, store: &dyn ProgressStore) -> bool {
        let progress = match store.load(&episode.id) {
            Ok(progress) => progress,
            Err(e) => {
                warn!(error = %e, episode = %episode.id, "progress load failed");
                None
            }
        };
        match progress {
            Some(position) => watched_fraction(position, episode.duration) >= WATCHED_FRACTION,
            None => false,
        }
    }
}
