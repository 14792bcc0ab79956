// Async HTTP client for the users/profiles REST API.
//
// Owns URL construction, request dispatch, envelope unwrapping and error
// body parsing. Endpoint methods live in `users.rs` as inherent methods.

use reqwest::Method;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;
use url::Url;

use crate::Error;
use crate::transport::TransportConfig;
use crate::types::{Envelope, ErrorResponse};

/// Placeholder body type for requests that send nothing.
pub(crate) const NO_BODY: Option<&()> = None;

/// Async client for the users/profiles API.
///
/// Every call makes exactly one round trip; there is no retry layer.
/// Response bodies are unwrapped from `{data}`, `{user}` or bare shapes.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: Url,
}

impl ApiClient {
    // ── Constructors ─────────────────────────────────────────────────

    /// Build a client for `base_url` using the given transport settings.
    pub fn new(base_url: &str, transport: &TransportConfig) -> Result<Self, Error> {
        let http = transport.build_client()?;
        Self::from_reqwest(base_url, http)
    }

    /// Wrap an existing `reqwest::Client`.
    pub fn from_reqwest(base_url: &str, http: reqwest::Client) -> Result<Self, Error> {
        let base_url = Self::normalize_base_url(base_url)?;
        Ok(Self { http, base_url })
    }

    /// Parse the base URL and force a trailing slash so segments append
    /// below any path prefix (`http://host/api` -> `http://host/api/users`).
    fn normalize_base_url(raw: &str) -> Result<Url, Error> {
        let mut url = Url::parse(raw)?;
        if url.cannot_be_a_base() {
            return Err(Error::InvalidUrl(url::ParseError::RelativeUrlWithCannotBeABaseBase));
        }
        let path = url.path().trim_end_matches('/').to_owned();
        url.set_path(&format!("{path}/"));
        Ok(url)
    }

    /// The normalized base URL.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    // ── URL builder ──────────────────────────────────────────────────

    /// Append path segments to the base URL, percent-encoding each one.
    fn url(&self, segments: &[&str]) -> Result<Url, Error> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| Error::InvalidUrl(url::ParseError::RelativeUrlWithCannotBeABaseBase))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    // ── Generic request ──────────────────────────────────────────────

    /// Issue one request and decode the (possibly enveloped) JSON body.
    pub async fn request<T, B>(
        &self,
        method: Method,
        segments: &[&str],
        query: &[(&str, String)],
        body: Option<&B>,
    ) -> Result<T, Error>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized + Sync,
    {
        let resp = self.send(method, segments, query, body).await?;
        self.handle_response(resp).await
    }

    /// Issue one request whose success response carries no payload.
    pub async fn request_empty<B>(
        &self,
        method: Method,
        segments: &[&str],
        query: &[(&str, String)],
        body: Option<&B>,
    ) -> Result<(), Error>
    where
        B: Serialize + ?Sized + Sync,
    {
        let resp = self.send(method, segments, query, body).await?;
        self.handle_empty(resp).await
    }

    async fn send<B>(
        &self,
        method: Method,
        segments: &[&str],
        query: &[(&str, String)],
        body: Option<&B>,
    ) -> Result<reqwest::Response, Error>
    where
        B: Serialize + ?Sized + Sync,
    {
        let url = self.url(segments)?;
        if query.is_empty() {
            debug!("{method} {url}");
        } else {
            debug!("{method} {url} params={query:?}");
        }

        let mut builder = self.http.request(method, url);
        if !query.is_empty() {
            builder = builder.query(query);
        }
        if let Some(body) = body {
            builder = builder.json(body);
        }
        Ok(builder.send().await?)
    }

    // ── HTTP verbs ───────────────────────────────────────────────────

    pub(crate) async fn get<T: DeserializeOwned>(&self, segments: &[&str]) -> Result<T, Error> {
        self.request(Method::GET, segments, &[], NO_BODY).await
    }

    pub(crate) async fn get_with_params<T: DeserializeOwned>(
        &self,
        segments: &[&str],
        params: &[(&str, String)],
    ) -> Result<T, Error> {
        self.request(Method::GET, segments, params, NO_BODY).await
    }

    pub(crate) async fn post<T: DeserializeOwned, B: Serialize + Sync>(
        &self,
        segments: &[&str],
        body: &B,
    ) -> Result<T, Error> {
        self.request(Method::POST, segments, &[], Some(body)).await
    }

    pub(crate) async fn patch<T: DeserializeOwned, B: Serialize + Sync>(
        &self,
        segments: &[&str],
        body: &B,
    ) -> Result<T, Error> {
        self.request(Method::PATCH, segments, &[], Some(body)).await
    }

    pub(crate) async fn patch_no_response<B: Serialize + Sync>(
        &self,
        segments: &[&str],
        body: &B,
    ) -> Result<(), Error> {
        self.request_empty(Method::PATCH, segments, &[], Some(body))
            .await
    }

    pub(crate) async fn delete(&self, segments: &[&str]) -> Result<(), Error> {
        self.request_empty(Method::DELETE, segments, &[], NO_BODY)
            .await
    }

    // ── Response handling ────────────────────────────────────────────

    async fn handle_response<T: DeserializeOwned>(
        &self,
        resp: reqwest::Response,
    ) -> Result<T, Error> {
        let status = resp.status();
        if status.is_success() {
            let body = resp.text().await?;
            serde_json::from_str::<Envelope<T>>(&body)
                .map(Envelope::into_inner)
                .map_err(|e| {
                    let preview = body.chars().take(200).collect::<String>();
                    Error::Deserialization {
                        message: format!("{e} (body preview: {preview:?})"),
                        body,
                    }
                })
        } else {
            Err(self.parse_error(status, resp).await)
        }
    }

    async fn handle_empty(&self, resp: reqwest::Response) -> Result<(), Error> {
        let status = resp.status();
        if status.is_success() {
            Ok(())
        } else {
            Err(self.parse_error(status, resp).await)
        }
    }

    async fn parse_error(&self, status: reqwest::StatusCode, resp: reqwest::Response) -> Error {
        let raw = resp.text().await.unwrap_or_default();

        let message = match serde_json::from_str::<ErrorResponse>(&raw) {
            Ok(ErrorResponse {
                message: Some(message),
            }) => message.into_text(),
            _ if raw.is_empty() => status.to_string(),
            _ => raw,
        };

        Error::Status {
            status: status.as_u16(),
            message,
        }
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;

    fn client(base: &str) -> ApiClient {
        ApiClient::from_reqwest(base, reqwest::Client::new()).unwrap()
    }

    #[test]
    fn base_url_gets_trailing_slash() {
        assert_eq!(client("http://localhost:3333").base_url().as_str(), "http://localhost:3333/");
        assert_eq!(client("http://host/api").base_url().as_str(), "http://host/api/");
        assert_eq!(client("http://host/api/").base_url().as_str(), "http://host/api/");
    }

    #[test]
    fn segments_are_appended_below_prefix() {
        let url = client("http://host/api").url(&["users", "42", "status"]).unwrap();
        assert_eq!(url.as_str(), "http://host/api/users/42/status");
    }

    #[test]
    fn segments_are_percent_encoded() {
        let url = client("http://host").url(&["users", "a/b c"]).unwrap();
        assert_eq!(url.as_str(), "http://host/users/a%2Fb%20c");
    }

    #[test]
    fn invalid_base_url_is_rejected() {
        assert!(matches!(
            ApiClient::from_reqwest("not a url", reqwest::Client::new()),
            Err(Error::InvalidUrl(_))
        ));
        assert!(ApiClient::from_reqwest("mailto:admin@example.com", reqwest::Client::new()).is_err());
    }
}
