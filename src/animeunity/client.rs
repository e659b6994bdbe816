use reqwest::header::{HeaderValue, ACCEPT, ACCEPT_LANGUAGE};
use reqwest::Client;
use tracing::debug;
use url::Url;

use super::types::{ArchivePage, AuEpisode, AuShow, EpisodePage};
use super::{ArchiveOrder, ArchiveQuery};
use crate::config::SourceConfig;
use crate::embedded::element_attribute;
use crate::error::{Error, Result};
use crate::http;

#[derive(Debug, Clone)]
pub struct AnimeUnityClient {
    client: Client,
    base_url: Url,
}

impl AnimeUnityClient {
    pub fn new(config: &SourceConfig) -> Result<Self> {
        Ok(Self {
            client: http::build_client("AnimeUnity")?,
            base_url: config.base_url.clone(),
        })
    }

    pub(crate) async fn search_by_title(&self, query: &str) -> Result<Vec<AuShow>> {
        let mut url = http::endpoint(&self.base_url, "archivio")?;
        url.query_pairs_mut().append_pair("title", query);

        let html = http::get_text(&self.client, url.clone()).await?;
        let records = required_attribute(&html, "archivio", "records", &url)?;
        http::decode_json(&url, &records)
    }

    pub(crate) async fn fetch_show_page(&self, id: u64) -> Result<AuShow> {
        let url = http::endpoint(&self.base_url, &format!("anime/{}", id))?;
        let html = http::get_text(&self.client, url.clone()).await?;

        let anime = required_attribute(&html, "video-player", "anime", &url)?;
        let mut show: AuShow = http::decode_json(&url, &anime)?;
        show.episodes_count = element_attribute(&html, "video-player", "episodes_count")
            .and_then(|raw| raw.trim().parse().ok());
        debug!(
            show_id = show.id,
            episodes = ?show.episodes_count,
            "Parsed AnimeUnity show page"
        );
        Ok(show)
    }

    pub(crate) async fn fetch_episode_range(
        &self,
        show_id: u64,
        start: u64,
        limit: u64,
    ) -> Result<Vec<AuEpisode>> {
        if limit == 0 {
            return Ok(Vec::new());
        }
        let end = start + limit - 1;
        let mut url = http::endpoint(&self.base_url, &format!("info_api/{}/1", show_id))?;
        url.query_pairs_mut()
            .append_pair("start_range", &start.to_string())
            .append_pair("end_range", &end.to_string());

        let request = self
            .client
            .get(url.clone())
            .header(ACCEPT, HeaderValue::from_static("application/json"))
            .header(ACCEPT_LANGUAGE, HeaderValue::from_static("it-IT"));
        let text = http::send(request, &url).await?;
        let page: EpisodePage = http::decode_json(&url, &text)?;
        Ok(page.episodes.unwrap_or_default())
    }

    pub(crate) async fn fetch_embed(&self, media_id: u64) -> Result<Url> {
        let url = http::endpoint(&self.base_url, &format!("embed-url/{}", media_id))?;
        let request = self
            .client
            .get(url.clone())
            .header(ACCEPT, HeaderValue::from_static("text/plain"));
        let text = http::send(request, &url).await?;
        let trimmed = text.trim();
        Url::parse(trimmed).map_err(|e| {
            Error::MalformedResponse(format!(
                "{} -> embed URL '{}' is not a URL: {}",
                url, trimmed, e
            ))
        })
    }

    pub(crate) async fn fetch_archive_page(
        &self,
        page: u32,
        query: &ArchiveQuery,
    ) -> Result<Vec<AuShow>> {
        let mut url = http::endpoint(&self.base_url, "top-anime")?;
        {
            let mut pairs = url.query_pairs_mut();
            if page > 1 {
                pairs.append_pair("page", &page.to_string());
            }
            match query.order {
                Some(ArchiveOrder::Popularity) => {
                    pairs.append_pair("popular", "true");
                }
                Some(ArchiveOrder::MostViewed) => {
                    pairs.append_pair("order", "most_viewed");
                }
                None => {}
            }
            if let Some(kind) = &query.kind {
                pairs.append_pair("type", kind);
            }
        }
        // `query_pairs_mut` leaves a dangling `?` when nothing was appended.
        if url.query() == Some("") {
            url.set_query(None);
        }

        let html = http::get_text(&self.client, url.clone()).await?;
        let animes = required_attribute(&html, "top-anime", "animes", &url)?;
        let archive: ArchivePage = http::decode_json(&url, &animes)?;
        Ok(archive.data)
    }
}

fn required_attribute(html: &str, element: &str, attribute: &str, url: &Url) -> Result<String> {
    element_attribute(html, element, attribute).ok_or_else(|| {
        Error::MalformedResponse(format!(
            "{} -> no <{} {}> payload in page",
            url, element, attribute
        ))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;

    fn client_for(server: &MockServer) -> AnimeUnityClient {
        let config = SourceConfig::parse(&server.base_url()).unwrap();
        AnimeUnityClient::new(&config).unwrap()
    }

    #[tokio::test]
    async fn show_page_reads_anime_and_episode_count() {
        let server = MockServer::start_async().await;
        let page = r#"<html><body><video-player anime="{&quot;id&quot;:2791,&quot;slug&quot;:&quot;jujutsu-kaisen&quot;,&quot;type&quot;:&quot;TV&quot;,&quot;title_eng&quot;:&quot;Jujutsu Kaisen&quot;,&quot;mal_id&quot;:40748}" episodes_count="24"></video-player></body></html>"#;
        let mock = server
            .mock_async(|when, then| {
                when.method(GET).path("/anime/2791");
                then.status(200).body(page);
            })
            .await;

        let show = client_for(&server).fetch_show_page(2791).await.unwrap();
        mock.assert_async().await;
        assert_eq!(show.id, 2791);
        assert_eq!(show.slug, "jujutsu-kaisen");
        assert_eq!(show.mal_id, Some(40748));
        assert_eq!(show.episodes_count, Some(24));
    }

    #[tokio::test]
    async fn show_page_without_payload_is_malformed() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/anime/1");
                then.status(200).body("<html><body>maintenance</body></html>");
            })
            .await;

        let err = client_for(&server).fetch_show_page(1).await.unwrap_err();
        assert!(matches!(err, Error::MalformedResponse(_)));
    }

    #[tokio::test]
    async fn search_sends_title_and_parses_records() {
        let server = MockServer::start_async().await;
        let page = r#"<archivio records="[{&quot;id&quot;:4821,&quot;slug&quot;:&quot;nana&quot;,&quot;title_eng&quot;:&quot;Nana&quot;,&quot;type&quot;:&quot;TV&quot;,&quot;date&quot;:&quot;2006&quot;}]" ></archivio>"#;
        let mock = server
            .mock_async(|when, then| {
                when.method(GET).path("/archivio").query_param("title", "nana");
                then.status(200).body(page);
            })
            .await;

        let shows = client_for(&server).search_by_title("nana").await.unwrap();
        mock.assert_async().await;
        assert_eq!(shows.len(), 1);
        assert_eq!(shows[0].slug, "nana");
    }

    #[tokio::test]
    async fn episode_range_sends_window_and_headers() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(GET)
                    .path("/info_api/4821/1")
                    .query_param("start_range", "101")
                    .query_param("end_range", "200")
                    .header("accept", "application/json")
                    .header("accept-language", "it-IT");
                then.status(200)
                    .json_body(serde_json::json!({
                        "episodes": [{ "id": 9001, "number": "101" }]
                    }));
            })
            .await;

        let eps = client_for(&server)
            .fetch_episode_range(4821, 101, 100)
            .await
            .unwrap();
        mock.assert_async().await;
        assert_eq!(eps.len(), 1);
        assert_eq!(eps[0].id, 9001);
    }

    #[tokio::test]
    async fn episode_range_missing_list_is_empty() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/info_api/7/1");
                then.status(200).json_body(serde_json::json!({}));
            })
            .await;

        let eps = client_for(&server).fetch_episode_range(7, 1, 1).await.unwrap();
        assert!(eps.is_empty());
    }

    #[tokio::test]
    async fn embed_url_is_trimmed_and_validated() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET)
                    .path("/embed-url/9001")
                    .header("accept", "text/plain");
                then.status(200)
                    .body("https://vixcloud.co/embed/123?token=abc\n");
            })
            .await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/embed-url/9002");
                then.status(200).body("not a url");
            })
            .await;

        let client = client_for(&server);
        let url = client.fetch_embed(9001).await.unwrap();
        assert_eq!(url.as_str(), "https://vixcloud.co/embed/123?token=abc");
        let err = client.fetch_embed(9002).await.unwrap_err();
        assert!(matches!(err, Error::MalformedResponse(_)));
    }

    #[tokio::test]
    async fn archive_first_page_omits_page_param() {
        let server = MockServer::start_async().await;
        let page = r#"<top-anime animes="{&quot;data&quot;:[{&quot;id&quot;:1,&quot;slug&quot;:&quot;a&quot;,&quot;dub&quot;:1}]}"></top-anime>"#;
        let first = server
            .mock_async(|when, then| {
                when.method(GET)
                    .path("/top-anime")
                    .query_param("order", "most_viewed")
                    .query_param_missing("page");
                then.status(200).body(page);
            })
            .await;
        let second = server
            .mock_async(|when, then| {
                when.method(GET)
                    .path("/top-anime")
                    .query_param("page", "2")
                    .query_param("type", "Movie")
                    .query_param("popular", "true");
                then.status(200).body(page);
            })
            .await;

        let client = client_for(&server);
        let shows = client
            .fetch_archive_page(
                1,
                &ArchiveQuery {
                    order: Some(ArchiveOrder::MostViewed),
                    kind: None,
                },
            )
            .await
            .unwrap();
        assert!(shows[0].is_dubbed());
        client
            .fetch_archive_page(
                2,
                &ArchiveQuery {
                    order: Some(ArchiveOrder::Popularity),
                    kind: Some("Movie".to_string()),
                },
            )
            .await
            .unwrap();
        first.assert_async().await;
        second.assert_async().await;
    }
}
