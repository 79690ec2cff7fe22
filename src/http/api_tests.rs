//! Tests for `ApiClient`.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use serde_json::Value;

use super::{ApiClient, EndpointKind, HttpError, RequestConfig};
use crate::config::Credentials;
use crate::error::ApiError;
use crate::events::{Event, EventKind};
use crate::message::{AuthRequestParams, SendMessageParams};
use crate::retry::RetryPolicy;
use crate::status::MessageStatus;
use crate::test_fixtures::{RecordingSleeper, ScriptedClient, json_response, status_body};
use crate::time::InstantSleeper;

fn credentials() -> Credentials {
    Credentials::new("auth-key", "secret-key").unwrap()
}

fn client(http: ScriptedClient) -> ApiClient<ScriptedClient, InstantSleeper> {
    ApiClient::with_transport(http, InstantSleeper, credentials())
        .with_retry_policy(RetryPolicy::for_tests())
}

fn header<'a>(req: &'a super::HttpRequest, name: &str) -> Option<&'a str> {
    req.headers.get(name).and_then(|v| v.to_str().ok())
}

mod headers {
    use super::*;

    #[tokio::test]
    async fn message_requests_send_secret_key() {
        let api = client(ScriptedClient::always(200, r#"{"message_id":"m1","success":true}"#));

        let params = SendMessageParams::to_recipient("+15551234567", "hi", "Sender");
        api.send_message(&params).await.unwrap();

        let req = api.http_client().last_request();
        assert_eq!(req.method, http::Method::POST);
        assert_eq!(header(&req, "authorization"), Some("auth-key"));
        assert_eq!(header(&req, "loop-secret-key"), Some("secret-key"));
        assert_eq!(header(&req, "loop-auth-secret-key"), None);
        assert_eq!(header(&req, "content-type"), Some("application/json"));
    }

    #[tokio::test]
    async fn auth_requests_send_auth_secret_key() {
        let creds = credentials().with_auth_secret_key("auth-secret").unwrap();
        let api = ApiClient::with_transport(
            ScriptedClient::always(
                200,
                r#"{"request_id":"r1","imessage_link":"imessage://x","success":true}"#,
            ),
            InstantSleeper,
            creds,
        );

        let response = api.initiate_auth(&AuthRequestParams::default()).await.unwrap();

        assert_eq!(response.request_id, "r1");
        let req = api.http_client().last_request();
        assert_eq!(header(&req, "authorization"), Some("auth-key"));
        assert_eq!(header(&req, "loop-auth-secret-key"), Some("auth-secret"));
        assert_eq!(header(&req, "loop-secret-key"), None);
        assert_eq!(req.url.path(), "/api/v1/auth/initiate/");
    }

    #[tokio::test]
    async fn auth_request_without_auth_secret_fails_before_io() {
        let api = client(ScriptedClient::always(200, "{}"));

        let err = api
            .initiate_auth(&AuthRequestParams::default())
            .await
            .unwrap_err();

        assert_eq!(err.code(), 400);
        assert_eq!(api.http_client().calls(), 0);
    }

    #[tokio::test]
    async fn credential_headers_are_marked_sensitive() {
        let api = client(ScriptedClient::always(200, &status_body("m1", "sent")));

        api.check_status("m1").await.unwrap();

        let req = api.http_client().last_request();
        assert!(req.headers.get("authorization").unwrap().is_sensitive());
        assert!(req.headers.get("loop-secret-key").unwrap().is_sensitive());
    }
}

mod urls {
    use super::*;

    #[tokio::test]
    async fn status_path_includes_encoded_id() {
        let api = client(ScriptedClient::always(200, &status_body("a b", "sent")));

        let status = api.check_status("a b").await.unwrap();

        assert_eq!(status.status, MessageStatus::Sent);
        let req = api.http_client().last_request();
        assert_eq!(req.method, http::Method::GET);
        assert_eq!(
            req.url.as_str(),
            "https://server.loopmessage.com/api/v1/message/status/a%20b/"
        );
    }

    #[tokio::test]
    async fn blank_status_id_is_rejected() {
        let api = client(ScriptedClient::always(200, "{}"));

        assert_eq!(api.check_status(" ").await.unwrap_err().code(), 400);
        assert_eq!(api.http_client().calls(), 0);
    }

    #[tokio::test]
    async fn base_url_override_is_used() {
        let creds = credentials().with_base_url("http://localhost:8080").unwrap();
        let api = ApiClient::with_transport(
            ScriptedClient::always(200, r#"{"message_id":"m1","success":true}"#),
            InstantSleeper,
            creds,
        );

        let params = SendMessageParams::to_recipient("+15551234567", "hi", "Sender");
        api.send_message(&params).await.unwrap();

        assert_eq!(
            api.http_client().last_request().url.as_str(),
            "http://localhost:8080/api/v1/message/send/"
        );
    }
}

mod base_url_prefix {
    use super::*;

    fn mounted_client(http: ScriptedClient) -> ApiClient<ScriptedClient, InstantSleeper> {
        let creds = credentials()
            .with_base_url("https://proxy.example.com/loop")
            .unwrap();
        ApiClient::with_transport(http, InstantSleeper, creds)
    }

    #[tokio::test]
    async fn send_keeps_base_path() {
        let api = mounted_client(ScriptedClient::always(200, r#"{"message_id":"m1","success":true}"#));

        let params = SendMessageParams::to_recipient("+15551234567", "hi", "Sender");
        api.send_message(&params).await.unwrap();

        assert_eq!(
            api.http_client().last_request().url.as_str(),
            "https://proxy.example.com/loop/api/v1/message/send/"
        );
    }

    #[tokio::test]
    async fn status_keeps_base_path() {
        let api = mounted_client(ScriptedClient::always(200, &status_body("m1", "sent")));

        api.check_status("m1").await.unwrap();

        assert_eq!(
            api.http_client().last_request().url.as_str(),
            "https://proxy.example.com/loop/api/v1/message/status/m1/"
        );
    }

    #[tokio::test]
    async fn leading_slash_in_custom_path_stays_under_base() {
        let api = mounted_client(ScriptedClient::always(200, "{}"));

        let _: Value = api
            .get(EndpointKind::Status, "/custom/", &RequestConfig::default())
            .await
            .unwrap();

        assert_eq!(
            api.http_client().last_request().url.as_str(),
            "https://proxy.example.com/loop/custom/"
        );
    }
}

mod classification {
    use super::*;

    #[tokio::test]
    async fn unauthorized_is_not_retried() {
        let api = client(ScriptedClient::always(401, r#"{"message":"bad key"}"#));

        let err = api.check_status("m1").await.unwrap_err();

        assert_eq!(err.code(), 401);
        assert_eq!(err.message(), "Authentication failed");
        assert_eq!(api.http_client().calls(), 1);
    }

    #[tokio::test]
    async fn server_errors_are_retried_until_success() {
        let api = client(ScriptedClient::new(vec![
            Ok(json_response(503, "")),
            Err(HttpError::Timeout),
            Ok(json_response(200, &status_body("m1", "scheduled"))),
        ]));

        let status = api.check_status("m1").await.unwrap();

        assert_eq!(status.status, MessageStatus::Scheduled);
        assert_eq!(api.http_client().calls(), 3);
    }

    #[tokio::test]
    async fn transport_failures_surface_as_request_failed() {
        let api = client(ScriptedClient::new(vec![Err(HttpError::Timeout)]))
            .with_retry_policy(RetryPolicy::no_retry());

        let err = api.check_status("m1").await.unwrap_err();

        assert_eq!(err, ApiError::request_failed("request timed out"));
    }

    #[tokio::test]
    async fn undecodable_success_body_is_invalid_response() {
        let api = client(ScriptedClient::always(200, "not json"))
            .with_retry_policy(RetryPolicy::no_retry());

        let err = api.check_status("m1").await.unwrap_err();

        assert_eq!(err.code(), 500);
        assert_eq!(err.message(), "Invalid response");
    }
}

mod request_config {
    use super::*;

    #[tokio::test]
    async fn retry_false_makes_one_attempt() {
        let api = client(ScriptedClient::always(500, ""));

        let err = api
            .get::<Value>(EndpointKind::Status, "/api/v1/message/status/m1/", &RequestConfig::without_retry())
            .await
            .unwrap_err();

        assert_eq!(err.code(), 500);
        assert_eq!(api.http_client().calls(), 1);
    }

    #[tokio::test]
    async fn default_config_uses_client_policy() {
        let api = client(ScriptedClient::always(500, ""));

        let _ = api
            .get::<Value>(EndpointKind::Status, "/x/", &RequestConfig::default())
            .await;

        assert_eq!(api.http_client().calls(), 4);
    }

    #[tokio::test]
    async fn per_call_overrides_replace_policy_fields() {
        let sleeper = Arc::new(RecordingSleeper::default());
        let api = ApiClient::with_transport(
            ScriptedClient::always(429, ""),
            Arc::clone(&sleeper),
            credentials(),
        );
        let config = RequestConfig::default()
            .with_max_retries(2)
            .with_base_delay(Duration::from_millis(10));

        let err = api
            .post::<_, Value>(EndpointKind::Message, "/api/v1/message/send/", &serde_json::json!({}), &config)
            .await
            .unwrap_err();

        assert_eq!(err.code(), 429);
        assert_eq!(api.http_client().calls(), 3);
        assert_eq!(
            sleeper.delays(),
            vec![Duration::from_millis(10), Duration::from_millis(20)]
        );
    }

    #[tokio::test]
    async fn non_retryable_override_stops_on_rate_limit() {
        let api = client(ScriptedClient::always(429, ""));
        let config = RequestConfig::default().with_non_retryable([429]);

        let _ = api.get::<Value>(EndpointKind::Status, "/x/", &config).await;

        assert_eq!(api.http_client().calls(), 1);
    }
}

mod events {
    use super::*;

    #[tokio::test]
    async fn each_retry_is_published() {
        let api = client(ScriptedClient::new(vec![
            Ok(json_response(500, "")),
            Ok(json_response(502, "")),
            Ok(json_response(200, &status_body("m1", "sent"))),
        ]));
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        api.events().subscribe(EventKind::Retry, move |event| {
            if let Event::Retry(retry) = event {
                sink.lock().unwrap().push((retry.endpoint, retry.path.clone(), retry.retry.attempt));
            }
        });

        api.check_status("m1").await.unwrap();

        assert_eq!(
            *seen.lock().unwrap(),
            vec![
                (EndpointKind::Status, "/api/v1/message/status/m1/".to_string(), 1),
                (EndpointKind::Status, "/api/v1/message/status/m1/".to_string(), 2),
            ]
        );
    }
}
