use std::{sync::Arc, time::Duration};

use serde::Deserialize;
use theatron_core::{ContentId, SeriesId};
use theatron_net::Net;
use url::Url;

use crate::{episode::EpisodeRef, error::ContinuityError, ContinuityResult};

/// Response of `GET /content/:id`.
///
/// Carries the episode's own media metadata and, for series content, the
/// full ordered episode listing so continuity can build its index from a
/// single fetch.
#[derive(Clone, Debug, Deserialize)]
pub struct ContentMeta {
    pub id: ContentId,
    pub series_id: Option<SeriesId>,
    pub ordinal: Option<u32>,
    pub duration_seconds: f64,
    pub media_url: Url,
    pub title: String,
    #[serde(default)]
    pub series_episodes: Vec<SeriesEpisodeMeta>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct SeriesEpisodeMeta {
    pub id: ContentId,
    pub ordinal: u32,
    pub duration_seconds: f64,
    pub media_url: Url,
}

impl ContentMeta {
    /// Episode refs for the whole series, or just this content when it is
    /// standalone.
    pub fn episode_refs(&self) -> ContinuityResult<Vec<EpisodeRef>> {
        let series_id = self
            .series_id
            .clone()
            .unwrap_or_else(|| SeriesId::new(self.id.as_str()));

        if self.series_episodes.is_empty() {
            return Ok(vec![EpisodeRef {
                id: self.id.clone(),
                series_id,
                ordinal: self.ordinal.unwrap_or(1),
                duration: duration_from_secs(self.duration_seconds)?,
                media_url: self.media_url.clone(),
            }]);
        }

        self.series_episodes
            .iter()
            .map(|e| {
                Ok(EpisodeRef {
                    id: e.id.clone(),
                    series_id: series_id.clone(),
                    ordinal: e.ordinal,
                    duration: duration_from_secs(e.duration_seconds)?,
                    media_url: e.media_url.clone(),
                })
            })
            .collect()
    }
}

fn duration_from_secs(secs: f64) -> ContinuityResult<Duration> {
    if !secs.is_finite() || secs < 0.0 {
        return Err(ContinuityError::Malformed(format!(
            "bad duration: {secs}"
        )));
    }
    Ok(Duration::from_secs_f64(secs))
}

/// Fetches content metadata from the backend.
pub struct MetadataClient {
    net: Arc<dyn Net>,
    base: Url,
}

impl MetadataClient {
    pub fn new(net: Arc<dyn Net>, base: Url) -> Self {
        Self { net, base }
    }

    /// `GET /content/:id`.
    pub async fn fetch_content(&self, id: &ContentId) -> ContinuityResult<ContentMeta> {
        let url = self
            .base
            .join(&format!("content/{id}"))
            .map_err(|e| ContinuityError::Malformed(e.to_string()))?;

        let body = self.net.get_json(url, None).await?;
        serde_json::from_value(body).map_err(|e| ContinuityError::Malformed(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use unimock::{matching, MockFn, Unimock};

    use super::*;
    use theatron_net::NetMock;

    fn meta_body() -> serde_json::Value {
        json!({
            "id": "e2",
            "series_id": "series-1",
            "ordinal": 2,
            "duration_seconds": 1200.0,
            "media_url": "https://cdn.example.com/e2.mp4",
            "title": "Second",
            "series_episodes": [
                {"id": "e1", "ordinal": 1, "duration_seconds": 1100.0,
                 "media_url": "https://cdn.example.com/e1.mp4"},
                {"id": "e2", "ordinal": 2, "duration_seconds": 1200.0,
                 "media_url": "https://cdn.example.com/e2.mp4"}
            ]
        })
    }

    #[tokio::test]
    async fn fetch_content_parses_metadata() {
        let mock = Unimock::new(
            NetMock::get_json
                .some_call(matching!(_, _))
                .answers(&|_, url, _| {
                    assert_eq!(url.path(), "/content/e2");
                    Ok(meta_body())
                }),
        );
        let client = MetadataClient::new(
            Arc::new(mock),
            Url::parse("https://api.example.com/").unwrap(),
        );

        let meta = client.fetch_content(&ContentId::new("e2")).await.unwrap();
        assert_eq!(meta.title, "Second");
        assert_eq!(meta.series_episodes.len(), 2);

        let refs = meta.episode_refs().unwrap();
        assert_eq!(refs.len(), 2);
        assert_eq!(refs[0].id.as_str(), "e1");
        assert_eq!(refs[0].duration, Duration::from_secs(1100));
    }

    #[tokio::test]
    async fn standalone_content_yields_single_ref() {
        let body = json!({
            "id": "movie-1",
            "series_id": null,
            "ordinal": null,
            "duration_seconds": 5400.0,
            "media_url": "https://cdn.example.com/movie-1.mp4",
            "title": "A Movie"
        });
        let mock = Unimock::new(
            NetMock::get_json
                .some_call(matching!(_, _))
                .returns(Ok(body)),
        );
        let client = MetadataClient::new(
            Arc::new(mock),
            Url::parse("https://api.example.com/").unwrap(),
        );

        let meta = client
            .fetch_content(&ContentId::new("movie-1"))
            .await
            .unwrap();
        let refs = meta.episode_refs().unwrap();
        assert_eq!(refs.len(), 1);
        assert_eq!(refs[0].ordinal, 1);
    }

    #[test]
    fn negative_duration_is_malformed() {
        let meta = ContentMeta {
            id: ContentId::new("x"),
            series_id: None,
            ordinal: None,
            duration_seconds: -1.0,
            media_url: Url::parse("https://cdn.example.com/x.mp4").unwrap(),
            title: "X".into(),
            series_episodes: vec![],
        };
        assert!(matches!(
            meta.episode_refs(),
            Err(ContinuityError::Malformed(_))
        ));
    }
}
