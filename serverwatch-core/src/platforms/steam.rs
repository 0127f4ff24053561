use async_trait::async_trait;
use tracing::debug;
use url::Url;

use serverwatch_common::models::{ServerListResponse, StatusRecord};

use crate::config::BotConfig;
use crate::http::{DefaultHttpClient, HttpClient};
use crate::platforms::StatusSource;
use crate::Error;

/// Client for `IGameServersService/GetServerList`, filtered down to one address.
pub struct SteamStatusClient<H: HttpClient = DefaultHttpClient> {
    http: H,
    url: String,
}

impl SteamStatusClient<DefaultHttpClient> {
    pub fn from_config(config: &BotConfig) -> Result<Self, Error> {
        Self::new(
            DefaultHttpClient::new(),
            &config.steam_api_url,
            &config.steam_api_key,
            &config.server_address,
            config.server_port,
        )
    }
}

impl<H: HttpClient> SteamStatusClient<H> {
    pub fn new(
        http: H,
        base_url: &str,
        api_key: &str,
        address: &str,
        port: u16,
    ) -> Result<Self, Error> {
        let url = build_server_list_url(base_url, api_key, address, port)?;
        Ok(Self { http, url })
    }
}

/// Builds `{base}?key=...&filter=addr\{address}:{port}` with the query encoded.
pub fn build_server_list_url(
    base_url: &str,
    api_key: &str,
    address: &str,
    port: u16,
) -> Result<String, Error> {
    let filter = format!("addr\\{address}:{port}");
    let url = Url::parse_with_params(base_url, &[("key", api_key), ("filter", filter.as_str())])
        .map_err(|e| Error::Parse(format!("Invalid status API URL '{base_url}': {e}")))?;
    Ok(url.into())
}

#[async_trait]
impl<H: HttpClient> StatusSource for SteamStatusClient<H> {
    async fn fetch_status(&self) -> Result<Option<StatusRecord>, Error> {
        let body = self.http.get(self.url.clone()).await?;
        let parsed: ServerListResponse = serde_json::from_str(&body)?;
        let first = parsed.into_first();
        debug!("(SteamStatusClient) fetched status => found={}", first.is_some());
        Ok(first)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::MockHttpClient;
    use mockall::predicate::function;

    const BASE: &str = "https://api.example.test/IGameServersService/GetServerList/v1/";

    fn client_with(mock: MockHttpClient) -> SteamStatusClient<MockHttpClient> {
        SteamStatusClient::new(mock, BASE, "secret", "1.2.3.4", 27015).unwrap()
    }

    #[test]
    fn url_encodes_filter() {
        let url = build_server_list_url(BASE, "secret", "1.2.3.4", 27015).unwrap();
        assert!(url.starts_with(BASE));
        assert!(url.contains("key=secret"));
        // `\` and `:` are percent-encoded inside the query value
        assert!(url.contains("filter=addr%5C1.2.3.4%3A27015"));
    }

    #[test]
    fn bad_base_url_is_rejected() {
        assert!(matches!(
            build_server_list_url("not a url", "k", "1.2.3.4", 1),
            Err(Error::Parse(_))
        ));
    }

    #[tokio::test]
    async fn first_server_is_returned() {
        let mut mock = MockHttpClient::new();
        mock.expect_get()
            .with(function(|url: &String| url.contains("filter=")))
            .times(1)
            .returning(|_| {
                Ok(r#"{"response":{"servers":[{"addr":"1.2.3.4:27015","name":"Test Server","players":5,"max_players":10,"secure":true}]}}"#.to_string())
            });

        let record = client_with(mock).fetch_status().await.unwrap().unwrap();
        assert_eq!(record.name, "Test Server");
        assert_eq!(record.players, 5);
    }

    #[tokio::test]
    async fn empty_list_is_not_found() {
        let mut mock = MockHttpClient::new();
        mock.expect_get()
            .returning(|_| Ok(r#"{"response":{"servers":[]}}"#.to_string()));

        assert_eq!(client_with(mock).fetch_status().await.unwrap(), None);
    }

    #[tokio::test]
    async fn malformed_body_is_an_error() {
        let mut mock = MockHttpClient::new();
        mock.expect_get().returning(|_| Ok("<html>rate limited</html>".to_string()));

        assert!(matches!(client_with(mock).fetch_status().await, Err(Error::Json(_))));
    }

    #[tokio::test]
    async fn unreachable_api_keeps_key_out_of_payload() {
        use crate::services::render;
        use serverwatch_common::models::{ColorTag, StatusReport};

        let client = SteamStatusClient::new(
            DefaultHttpClient::new(),
            "http://127.0.0.1:1/IGameServersService/GetServerList/v1/",
            "ABCDEF0123456789ABCDEF0123456789",
            "1.2.3.4",
            27015,
        )
        .unwrap();

        let report = StatusReport::from(client.fetch_status().await);
        let StatusReport::FetchError(diagnostic) = &report else {
            panic!("expected a fetch error, got {report:?}");
        };
        assert!(!diagnostic.contains("ABCDEF0123456789"));

        let payload = render(&report);
        assert_eq!(payload.color_tag, ColorTag::Error);
        assert!(!payload.description().contains("ABCDEF0123456789"));
        assert!(!payload.description().contains("key="));
    }

    #[tokio::test]
    async fn transport_error_is_propagated() {
        let mut mock = MockHttpClient::new();
        mock.expect_get()
            .returning(|_| Err(Error::Platform("connection reset".into())));

        assert!(matches!(client_with(mock).fetch_status().await, Err(Error::Platform(_))));
    }
}
