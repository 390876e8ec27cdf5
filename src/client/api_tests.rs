//! Tests for the client request pipeline.

#[cfg(test)]
mod tests {
    use crate::client::api::{CorticalClient, BULK_TEXT_PATH, IMAGE_PATH, RETINAS_PATH, TEXT_PATH};
    use crate::client::models::ApiResponse;
    use crate::client::params::Params;
    use crate::client::transport::{HttpRequest, HttpResponse, Method, Transport};
    use crate::config::{ClientConfig, ClientOptions};
    use crate::error::{CorticalError, ErrorKind, Result};
    use async_trait::async_trait;
    use serde_json::json;
    use std::collections::VecDeque;
    use std::sync::{Arc, Mutex};

    /// Replays canned responses and records every request it sees.
    #[derive(Clone, Default)]
    struct MockTransport {
        requests: Arc<Mutex<Vec<HttpRequest>>>,
        responses: Arc<Mutex<VecDeque<HttpResponse>>>,
    }

    impl MockTransport {
        fn respond(self, status: u16, body: impl Into<Vec<u8>>) -> Self {
            self.responses.lock().unwrap().push_back(HttpResponse {
                status,
                body: body.into(),
            });
            self
        }

        fn respond_json(self, value: serde_json::Value) -> Self {
            self.respond(200, serde_json::to_vec(&value).unwrap())
        }

        fn last_request(&self) -> HttpRequest {
            self.requests.lock().unwrap().last().cloned().unwrap()
        }
    }

    #[async_trait]
    impl Transport for MockTransport {
        async fn send(&self, request: HttpRequest) -> Result<HttpResponse> {
            self.requests.lock().unwrap().push(request);
            Ok(self
                .responses
                .lock()
                .unwrap()
                .pop_front()
                .expect("no canned response left"))
        }
    }

    fn create_test_client(transport: &MockTransport) -> CorticalClient {
        let config = ClientConfig::from_options(
            ClientOptions::default()
                .key("test-key")
                .url("http://mock/rest/"),
        );
        CorticalClient::with_transport(config, transport.clone())
    }

    #[tokio::test]
    async fn test_request_headers() {
        let transport = MockTransport::default().respond_json(json!([]));
        let client = create_test_client(&transport);

        client.get(RETINAS_PATH, Params::new()).await.unwrap();

        let request = transport.last_request();
        assert_eq!(request.method, Method::Get);
        assert_eq!(request.url.as_str(), "http://mock/rest/retinas");
        assert_eq!(request.header("Accept"), Some("application/json"));
        assert_eq!(request.header("Content-type"), Some("application/json"));
        assert_eq!(request.header("api-key"), Some("test-key"));
        assert_eq!(request.header("api-client"), Some(crate::config::DEFAULT_CLIENT));
        assert!(request.body.is_none());
    }

    #[tokio::test]
    async fn test_no_api_key_header_without_key() {
        let transport = MockTransport::default().respond_json(json!([]));
        let client = CorticalClient::with_transport(ClientConfig::default(), transport.clone());

        client.get(RETINAS_PATH, Params::new()).await.unwrap();

        assert_eq!(transport.last_request().header("api-key"), None);
    }

    #[tokio::test]
    async fn test_retina_injected_by_default() {
        let transport = MockTransport::default().respond_json(json!([{ "positions": [1] }]));
        let client = create_test_client(&transport);

        client.post(TEXT_PATH, "test", Params::new()).await.unwrap();

        let request = transport.last_request();
        assert_eq!(request.query_param("retina_name"), Some("en_associative"));
    }

    #[tokio::test]
    async fn test_retina_not_overridden() {
        let transport = MockTransport::default().respond_json(json!([{ "positions": [1] }]));
        let client = create_test_client(&transport);

        client
            .post(TEXT_PATH, "test", Params::retina("en_synonymous"))
            .await
            .unwrap();

        let request = transport.last_request();
        assert_eq!(request.query_param("retina_name"), Some("en_synonymous"));
        assert_eq!(request.query.len(), 1);
    }

    #[tokio::test]
    async fn test_retinas_listing_not_filtered() {
        let transport = MockTransport::default()
            .respond_json(json!([]))
            .respond_json(json!([]));
        let client = create_test_client(&transport);

        client.get(RETINAS_PATH, Params::new()).await.unwrap();
        assert_eq!(transport.last_request().query_param("retina_name"), None);

        client.get_retinas(Some("de_associative")).await.unwrap();
        assert_eq!(
            transport.last_request().query_param("retina_name"),
            Some("de_associative")
        );
    }

    #[tokio::test]
    async fn test_extra_params_forwarded() {
        let transport = MockTransport::default().respond_json(json!([]));
        let client = create_test_client(&transport);

        let params = Params::new().with("start_index", 0).with("max_results", 10);
        client.get("terms", params).await.unwrap();

        let request = transport.last_request();
        assert_eq!(request.query_param("start_index"), Some("0"));
        assert_eq!(request.query_param("max_results"), Some("10"));
        assert_eq!(request.query_param("retina_name"), Some("en_associative"));
    }

    #[tokio::test]
    async fn test_post_serializes_body_as_json() {
        let transport = MockTransport::default().respond_json(json!([{ "positions": [3] }]));
        let client = create_test_client(&transport);

        client.post(TEXT_PATH, "hello world", Params::new()).await.unwrap();

        let request = transport.last_request();
        assert_eq!(request.method, Method::Post);
        assert_eq!(request.body.as_deref(), Some(&b"\"hello world\""[..]));
    }

    #[tokio::test]
    async fn test_get_fingerprint_takes_first_element() {
        let transport = MockTransport::default()
            .respond_json(json!([{ "positions": [2, 4, 8] }, { "positions": [1] }]));
        let client = create_test_client(&transport);

        let fingerprint = client.get_fingerprint("test", Params::new()).await.unwrap();

        assert_eq!(fingerprint, vec![2, 4, 8]);
        assert_eq!(transport.last_request().url.as_str(), "http://mock/rest/text");
    }

    #[tokio::test]
    async fn test_get_fingerprint_empty_result() {
        let transport = MockTransport::default().respond_json(json!([]));
        let client = create_test_client(&transport);

        let err = client.get_fingerprint("test", Params::new()).await.unwrap_err();

        assert_eq!(err.kind(), ErrorKind::EmptyResult);
        assert!(matches!(err, CorticalError::EmptyResult { path } if path == TEXT_PATH));
    }

    #[tokio::test]
    async fn test_get_fingerprints_index_aligned() {
        let transport = MockTransport::default().respond_json(json!([
            { "positions": [1, 2] },
            { "positions": [7, 9, 11] }
        ]));
        let client = create_test_client(&transport);

        let fingerprints = client
            .get_fingerprints(&["test", "car"], Params::new())
            .await
            .unwrap();

        assert_eq!(fingerprints, vec![vec![1, 2], vec![7, 9, 11]]);

        let request = transport.last_request();
        assert_eq!(request.url.as_str(), "http://mock/rest/text/bulk");
        assert_eq!(request.header("Accept"), Some("application/json"));
        let body: serde_json::Value =
            serde_json::from_slice(request.body.as_deref().unwrap()).unwrap();
        assert_eq!(body, json!([{ "text": "test" }, { "text": "car" }]));
    }

    #[tokio::test]
    async fn test_image_request_returns_raw_bytes() {
        // Valid JSON on purpose: image bodies must never be parsed.
        let transport = MockTransport::default().respond(200, b"[1,2]".to_vec());
        let client = create_test_client(&transport);

        let response = client
            .post(IMAGE_PATH, &json!({ "term": "jaguar" }), Params::new())
            .await
            .unwrap();

        assert_eq!(response, ApiResponse::Image(b"[1,2]".to_vec()));
        assert_eq!(transport.last_request().header("Accept"), Some("image/png"));
    }

    #[tokio::test]
    async fn test_image_bulk_is_json() {
        let transport = MockTransport::default().respond_json(json!([]));
        let client = create_test_client(&transport);

        let response = client
            .post("image/bulk", &json!([]), Params::new())
            .await
            .unwrap();

        assert_eq!(response, ApiResponse::Json(json!([])));
        assert_eq!(
            transport.last_request().header("Accept"),
            Some("application/json")
        );
    }

    #[tokio::test]
    async fn test_get_image() {
        let transport = MockTransport::default().respond(200, vec![0x89, b'P', b'N', b'G']);
        let client = create_test_client(&transport);

        let image = client.get_image("jaguar", Params::new()).await.unwrap();
        assert_eq!(image, vec![0x89, b'P', b'N', b'G']);

        let body: serde_json::Value =
            serde_json::from_slice(transport.last_request().body.as_deref().unwrap()).unwrap();
        assert_eq!(body, json!({ "term": "jaguar" }));
    }

    #[tokio::test]
    async fn test_non_json_body_falls_back_to_text() {
        let transport = MockTransport::default().respond(200, b"not json".to_vec());
        let client = create_test_client(&transport);

        let response = client.get("terms", Params::new()).await.unwrap();

        assert_eq!(response, ApiResponse::Text("not json".to_string()));
    }

    #[tokio::test]
    async fn test_typed_helper_rejects_text_fallback() {
        let transport = MockTransport::default().respond(200, b"not json".to_vec());
        let client = create_test_client(&transport);

        let err = client.get_fingerprint("test", Params::new()).await.unwrap_err();

        assert_eq!(err.kind(), ErrorKind::UnexpectedResponse);
    }

    #[tokio::test]
    async fn test_non_200_status_is_error() {
        let transport = MockTransport::default().respond(401, b"Unauthorized".to_vec());
        let client = create_test_client(&transport);

        let err = client.get(RETINAS_PATH, Params::new()).await.unwrap_err();

        assert_eq!(err.to_string(), "Error 401: Unauthorized");
        assert_eq!(err.status(), Some(401));
    }

    #[tokio::test]
    async fn test_2xx_other_than_200_is_error() {
        let transport = MockTransport::default()
            .respond(201, br#"[{"positions":[1,2]}]"#.to_vec())
            .respond(204, Vec::new());
        let client = create_test_client(&transport);

        let err = client.get_fingerprint("test", Params::new()).await.unwrap_err();
        assert!(matches!(err, CorticalError::HttpStatus { status: 201, .. }));
        assert_eq!(err.to_string(), r#"Error 201: [{"positions":[1,2]}]"#);

        let err = client.get(RETINAS_PATH, Params::new()).await.unwrap_err();
        assert_eq!(err.status(), Some(204));
        assert_eq!(err.to_string(), "Error 204: ");
    }

    /// Fails every send the way a refused connection does.
    struct FailingTransport;

    #[async_trait]
    impl Transport for FailingTransport {
        async fn send(&self, request: HttpRequest) -> Result<HttpResponse> {
            let io = std::io::Error::new(std::io::ErrorKind::ConnectionRefused, "refused");
            Err(CorticalError::transport_with_source(request.url.as_str(), io))
        }
    }

    #[tokio::test]
    async fn test_transport_error_propagates() {
        let config = ClientConfig::from_options(ClientOptions::default().url("http://mock/rest/"));
        let client = CorticalClient::with_transport(config, FailingTransport);

        let err = client.get_fingerprint("test", Params::new()).await.unwrap_err();

        assert_eq!(err.kind(), ErrorKind::Transport);
        assert!(matches!(
            &err,
            CorticalError::Transport { url, .. } if url == "http://mock/rest/text"
        ));

        let source = std::error::Error::source(&err).unwrap();
        let io = source.downcast_ref::<std::io::Error>().unwrap();
        assert_eq!(io.kind(), std::io::ErrorKind::ConnectionRefused);
    }

    #[tokio::test]
    async fn test_bulk_failure_fails_whole_call() {
        let transport = MockTransport::default().respond(400, b"bad item".to_vec());
        let client = create_test_client(&transport);

        let err = client
            .get_fingerprints(&["ok", ""], Params::new())
            .await
            .unwrap_err();

        assert_eq!(err.to_string(), "Error 400: bad item");
        assert_eq!(
            transport.last_request().url.as_str(),
            format!("http://mock/rest/{}", BULK_TEXT_PATH)
        );
    }

    #[tokio::test]
    async fn test_invalid_url_never_reaches_transport() {
        let transport = MockTransport::default();
        let config = ClientConfig::from_options(ClientOptions::default().url(""));
        let client = CorticalClient::with_transport(config, transport.clone());

        let err = client.get("foo", Params::new()).await.unwrap_err();

        assert_eq!(err.to_string(), "Invalid URI \"foo\"");
        assert_eq!(err.kind(), ErrorKind::InvalidUrl);
        assert!(transport.requests.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_caller_params_untouched() {
        let transport = MockTransport::default().respond_json(json!([{ "positions": [1] }]));
        let client = create_test_client(&transport);

        let params = Params::new().with("sparsity", 0.02);
        client
            .get_fingerprint("test", params.clone())
            .await
            .unwrap();

        assert!(!params.contains_key("retina_name"));
    }
}

/// End-to-end tests against an in-process mock of the Cortical.io API.
#[cfg(test)]
mod mock_api_tests {
    use crate::client::api::{CorticalClient, RETINAS_PATH};
    use crate::client::models::ApiResponse;
    use crate::client::params::Params;
    use crate::client::transport::ReqwestTransport;
    use crate::config::{ClientConfig, ClientOptions};
    use crate::error::ErrorKind;
    use axum::{
        body::Bytes,
        extract::Query,
        http::{header, HeaderMap, StatusCode},
        response::{IntoResponse, Response},
        routing::{get, post},
        Json, Router,
    };
    use serde::Deserialize;
    use serde_json::json;
    use std::collections::HashMap;
    use tokio::net::TcpListener;

    const PNG: &[u8] = &[0x89, b'P', b'N', b'G', 0x0d, 0x0a, 0x1a, 0x0a];

    #[derive(Deserialize)]
    struct TextBody {
        text: String,
    }

    fn authorized(headers: &HeaderMap) -> bool {
        headers.get("api-key").map(|v| v == "valid-key").unwrap_or(false)
    }

    fn unauthorized() -> Response {
        (StatusCode::UNAUTHORIZED, "Unauthorized").into_response()
    }

    // Deterministic per (text, retina).
    fn positions(text: &str, retina: &str) -> Vec<u32> {
        let salt = retina.len() as u32 * 7;
        text.bytes()
            .enumerate()
            .map(|(i, b)| (b as u32 * 31 + i as u32 + salt) % 16384)
            .collect()
    }

    fn retina_of(query: &HashMap<String, String>) -> String {
        query.get("retina_name").cloned().unwrap_or_default()
    }

    async fn retinas(headers: HeaderMap, Query(query): Query<HashMap<String, String>>) -> Response {
        if !authorized(&headers) {
            return unauthorized();
        }

        let all = vec![
            json!({ "retinaName": "en_associative", "numberOfRows": 128 }),
            json!({ "retinaName": "en_synonymous", "numberOfRows": 128 }),
        ];
        let selected: Vec<_> = match query.get("retina_name") {
            Some(name) => all
                .into_iter()
                .filter(|r| r["retinaName"] == name.as_str())
                .collect(),
            None => all,
        };

        Json(selected).into_response()
    }

    async fn text(
        headers: HeaderMap,
        Query(query): Query<HashMap<String, String>>,
        body: Bytes,
    ) -> Response {
        if !authorized(&headers) {
            return unauthorized();
        }

        let Ok(input) = serde_json::from_slice::<String>(&body) else {
            return (StatusCode::BAD_REQUEST, "Body must be a JSON string").into_response();
        };

        Json(json!([{ "positions": positions(&input, &retina_of(&query)) }])).into_response()
    }

    async fn bulk(
        headers: HeaderMap,
        Query(query): Query<HashMap<String, String>>,
        Json(items): Json<Vec<TextBody>>,
    ) -> Response {
        if !authorized(&headers) {
            return unauthorized();
        }

        let retina = retina_of(&query);
        let out: Vec<_> = items
            .iter()
            .map(|item| json!({ "positions": positions(&item.text, &retina) }))
            .collect();

        Json(out).into_response()
    }

    async fn image(headers: HeaderMap) -> Response {
        if !authorized(&headers) {
            return unauthorized();
        }
        if headers.get(header::ACCEPT).map(|v| v != "image/png").unwrap_or(true) {
            return (StatusCode::NOT_ACCEPTABLE, "Expected image/png").into_response();
        }

        ([(header::CONTENT_TYPE, "image/png")], PNG.to_vec()).into_response()
    }

    async fn plain() -> &'static str {
        "plain text, not json"
    }

    async fn spawn_mock_api() -> String {
        let app = Router::new()
            .route("/rest/retinas", get(retinas))
            .route("/rest/text", post(text))
            .route("/rest/text/bulk", post(bulk))
            .route("/rest/image", post(image))
            .route("/rest/plain", get(plain));

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        format!("http://{}/rest/", addr)
    }

    async fn create_client(key: Option<&str>) -> CorticalClient {
        let mut options = ClientOptions::default().url(spawn_mock_api().await);
        if let Some(key) = key {
            options = options.key(key);
        }

        // Loopback traffic must not go through an ambient HTTP proxy.
        let http = reqwest::Client::builder().no_proxy().build().unwrap();
        CorticalClient::with_transport(
            ClientConfig::from_options(options),
            ReqwestTransport::from_client(http),
        )
    }

    #[tokio::test]
    async fn test_rejects_without_key() {
        let client = create_client(None).await;

        let err = client.get(RETINAS_PATH, Params::new()).await.unwrap_err();

        assert!(err.to_string().contains("Error 401"));
        assert_eq!(err.kind(), ErrorKind::HttpStatus);
    }

    #[tokio::test]
    async fn test_get_all_retinas() {
        let client = create_client(Some("valid-key")).await;

        let response = client.get(RETINAS_PATH, Params::new()).await.unwrap();
        let list = response.as_json().and_then(|v| v.as_array()).unwrap();

        assert!(list.len() > 1);
    }

    #[tokio::test]
    async fn test_get_specific_retina() {
        let client = create_client(Some("valid-key")).await;

        let retinas = client.get_retinas(Some("en_associative")).await.unwrap();

        assert_eq!(retinas.len(), 1);
        assert_eq!(retinas[0].retina_name, "en_associative");
        assert_eq!(retinas[0].number_of_rows, Some(128));
    }

    #[tokio::test]
    async fn test_fingerprint_for_text() {
        let client = create_client(Some("valid-key")).await;

        let fingerprint = client.get_fingerprint("test", Params::new()).await.unwrap();

        assert!(fingerprint.len() > 1);
        assert_eq!(fingerprint, positions("test", "en_associative"));
    }

    #[tokio::test]
    async fn test_fingerprint_differs_across_retinas() {
        let client = create_client(Some("valid-key")).await;

        let first = client
            .get_fingerprint("test", Params::retina("en_associative"))
            .await
            .unwrap();
        let second = client
            .get_fingerprint("test", Params::retina("en_synonymous"))
            .await
            .unwrap();
        let again = client
            .get_fingerprint("test", Params::retina("en_associative"))
            .await
            .unwrap();

        assert_ne!(first, second);
        assert_eq!(first, again);
    }

    #[tokio::test]
    async fn test_fingerprints_for_texts() {
        let client = create_client(Some("valid-key")).await;

        let fingerprints = client
            .get_fingerprints(&["test", "car"], Params::new())
            .await
            .unwrap();

        assert_eq!(fingerprints.len(), 2);
        assert_eq!(fingerprints[0], positions("test", "en_associative"));
        assert_eq!(fingerprints[1], positions("car", "en_associative"));
    }

    #[tokio::test]
    async fn test_image_for_term() {
        let client = create_client(Some("valid-key")).await;

        let response = client
            .post("image", &json!({ "term": "jaguar" }), Params::new())
            .await
            .unwrap();

        assert_eq!(response, ApiResponse::Image(PNG.to_vec()));
    }

    #[tokio::test]
    async fn test_plain_body_resolves_as_text() {
        let client = create_client(Some("valid-key")).await;

        let response = client.get("plain", Params::new()).await.unwrap();

        assert_eq!(
            response,
            ApiResponse::Text("plain text, not json".to_string())
        );
    }

    #[tokio::test]
    async fn test_unknown_path_is_http_error() {
        let client = create_client(Some("valid-key")).await;

        let err = client.get("missing", Params::new()).await.unwrap_err();

        assert_eq!(err.status(), Some(404));
    }
}
