//! HTTP remote for a REST-router style backend.
//!
//! Collections live at `{base}{collection}/`, records at
//! `{base}{collection}/{id}/`.

use async_trait::async_trait;
use reqwest::{Client, Response};
use serde_json::Value;
use url::Url;

use super::{Collection, RecordId, Remote};
use crate::config::Config;
use crate::error::{NotelyError, Result};

pub struct HttpRemote {
    client: Client,
    base_url: Url,
}

impl HttpRemote {
    pub fn new(config: &Config) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.effective_timeout())
            .build()?;

        Ok(Self {
            client,
            base_url: parse_base_url(config.effective_api_url())?,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn collection_url(&self, collection: Collection) -> Result<Url> {
        self.join(&format!("{}/", collection.as_str()))
    }

    fn record_url(&self, collection: Collection, id: RecordId) -> Result<Url> {
        self.join(&format!("{}/{}/", collection.as_str(), id))
    }

    fn join(&self, path: &str) -> Result<Url> {
        self.base_url
            .join(path)
            .map_err(|e| NotelyError::Config(format!("Invalid URL path '{}': {}", path, e)))
    }
}

/// Parse the API root, making sure it ends in `/` so joins stay below it.
fn parse_base_url(raw: &str) -> Result<Url> {
    let mut url = Url::parse(raw.trim())
        .map_err(|e| NotelyError::Config(format!("Invalid API URL '{}': {}", raw, e)))?;
    if url.cannot_be_a_base() {
        return Err(NotelyError::Config(format!("API URL '{}' cannot be a base", raw)));
    }
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    Ok(url)
}

/// Turn a non-2xx response into an error, keeping the body as the message.
async fn ensure_success(resp: Response) -> Result<Response> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    let body = resp.text().await.unwrap_or_default();
    Err(NotelyError::Api {
        status: status.as_u16(),
        message: body,
    })
}

/// Decode a JSON body, reporting shape mismatches as `Decode` errors.
async fn read_json(resp: Response) -> Result<Value> {
    let body = resp.bytes().await?;
    Ok(serde_json::from_slice(&body)?)
}

fn record_not_found(err: NotelyError, collection: Collection, id: RecordId) -> NotelyError {
    match err {
        NotelyError::Api { status: 404, .. } => NotelyError::NotFound { collection, id },
        other => other,
    }
}

#[async_trait]
impl Remote for HttpRemote {
    async fn list(&self, collection: Collection) -> Result<Vec<Value>> {
        let url = self.collection_url(collection)?;
        let resp = self.client.get(url).send().await?;
        let resp = ensure_success(resp).await?;
        Ok(serde_json::from_value(read_json(resp).await?)?)
    }

    async fn create(&self, collection: Collection, fields: Value) -> Result<Value> {
        let url = self.collection_url(collection)?;
        let resp = self.client.post(url).json(&fields).send().await?;
        let resp = ensure_success(resp).await?;
        read_json(resp).await
    }

    async fn update(&self, collection: Collection, id: RecordId, fields: Value) -> Result<Value> {
        let url = self.record_url(collection, id)?;
        let resp = self.client.patch(url).json(&fields).send().await?;
        let resp = ensure_success(resp)
            .await
            .map_err(|e| record_not_found(e, collection, id))?;
        read_json(resp).await
    }

    async fn delete(&self, collection: Collection, id: RecordId) -> Result<()> {
        let url = self.record_url(collection, id)?;
        let resp = self.client.delete(url).send().await?;
        ensure_success(resp)
            .await
            .map_err(|e| record_not_found(e, collection, id))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    /// Serve one canned response and hand back the raw request text.
    async fn serve_once(status: &'static str, body: &'static str) -> (String, tokio::task::JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let handle = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut request = Vec::new();
            let mut buf = [0u8; 4096];
            loop {
                let n = socket.read(&mut buf).await.unwrap();
                if n == 0 {
                    break;
                }
                request.extend_from_slice(&buf[..n]);
                if request_complete(&request) {
                    break;
                }
            }

            let response = format!(
                "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                status,
                body.len(),
                body
            );
            socket.write_all(response.as_bytes()).await.unwrap();
            socket.shutdown().await.ok();
            String::from_utf8_lossy(&request).into_owned()
        });

        (format!("http://{}/api", addr), handle)
    }

    fn request_complete(request: &[u8]) -> bool {
        let text = String::from_utf8_lossy(request);
        let Some(header_end) = text.find("\r\n\r\n") else {
            return false;
        };
        let content_length = text[..header_end]
            .lines()
            .find_map(|line| {
                let (name, value) = line.split_once(':')?;
                name.eq_ignore_ascii_case("content-length")
                    .then(|| value.trim().parse::<usize>().ok())
                    .flatten()
            })
            .unwrap_or(0);
        request.len() >= header_end + 4 + content_length
    }

    fn remote_for(url: &str) -> HttpRemote {
        let config = Config {
            api_url: Some(url.to_string()),
            ..Config::default()
        };
        HttpRemote::new(&config).unwrap()
    }

    #[test]
    fn test_base_url_gets_trailing_slash() {
        let remote = remote_for("http://127.0.0.1:8181/api");
        assert_eq!(remote.base_url().as_str(), "http://127.0.0.1:8181/api/");
        assert_eq!(
            remote.collection_url(Collection::Notes).unwrap().as_str(),
            "http://127.0.0.1:8181/api/notes/"
        );
        assert_eq!(
            remote.record_url(Collection::Quotes, 12).unwrap().as_str(),
            "http://127.0.0.1:8181/api/quotes/12/"
        );
    }

    #[test]
    fn test_invalid_base_url() {
        let config = Config {
            api_url: Some("not a url".to_string()),
            ..Config::default()
        };
        assert!(matches!(HttpRemote::new(&config), Err(NotelyError::Config(_))));
    }

    #[tokio::test]
    async fn test_list_decodes_array() {
        let (url, server) = serve_once(
            "200 OK",
            r#"[{"id":1,"title":"A","section":"todo","position":0,"completed":false}]"#,
        )
        .await;
        let remote = remote_for(&url);

        let records = remote.list(Collection::Notes).await.unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0]["title"], "A");

        let request = server.await.unwrap();
        assert!(request.starts_with("GET /api/notes/ HTTP/1.1"));
    }

    #[tokio::test]
    async fn test_update_sends_patch_body() {
        let (url, server) = serve_once("200 OK", r#"{"id":4,"title":"A","position":2}"#).await;
        let remote = remote_for(&url);

        let record = remote
            .update(Collection::Notes, 4, serde_json::json!({"position": 2}))
            .await
            .unwrap();
        assert_eq!(record["position"], 2);

        let request = server.await.unwrap();
        assert!(request.starts_with("PATCH /api/notes/4/ HTTP/1.1"));
        assert!(request.ends_with(r#"{"position":2}"#));
    }

    #[tokio::test]
    async fn test_server_error_is_retryable_api_error() {
        let (url, server) = serve_once("500 Internal Server Error", r#"{"detail":"boom"}"#).await;
        let remote = remote_for(&url);

        let err = remote.list(Collection::Quotes).await.unwrap_err();
        match &err {
            NotelyError::Api { status, message } => {
                assert_eq!(*status, 500);
                assert!(message.contains("boom"));
            }
            other => panic!("unexpected error: {:?}", other),
        }
        assert!(err.is_retryable());
        server.await.unwrap();
    }

    #[tokio::test]
    async fn test_delete_missing_record_is_not_found() {
        let (url, server) = serve_once("404 Not Found", r#"{"detail":"Not found."}"#).await;
        let remote = remote_for(&url);

        let err = remote.delete(Collection::Notes, 9).await.unwrap_err();
        assert!(matches!(
            err,
            NotelyError::NotFound {
                collection: Collection::Notes,
                id: 9
            }
        ));

        let request = server.await.unwrap();
        assert!(request.starts_with("DELETE /api/notes/9/ HTTP/1.1"));
    }

    #[tokio::test]
    async fn test_connection_refused_is_network_error() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let remote = remote_for(&format!("http://{}/api/", addr));
        let err = remote.list(Collection::Notes).await.unwrap_err();
        assert!(matches!(err, NotelyError::Network(_)));
        assert!(err.is_retryable());
    }
}
