//! WhatsApp gateway REST API client.

mod client;
mod error;
mod receiver;
mod types;

pub use client::WaClient;
pub use error::WaError;
pub use receiver::MessageReceiver;
pub use types::*;

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn create_test_client(mock_server: &MockServer) -> WaClient {
        WaClient::new(mock_server.uri(), "bot-account").unwrap()
    }

    #[tokio::test]
    async fn test_health_check_success() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/v1/health"))
            .respond_with(ResponseTemplate::new(200))
            .mount(&mock_server)
            .await;

        let client = create_test_client(&mock_server).await;
        assert!(client.health_check().await);
    }

    #[tokio::test]
    async fn test_health_check_failure() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/v1/health"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&mock_server)
            .await;

        let client = create_test_client(&mock_server).await;
        assert!(!client.health_check().await);
    }

    #[tokio::test]
    async fn test_receive_messages() {
        let mock_server = MockServer::start().await;

        let messages = serde_json::json!([
            {
                "envelope": {
                    "source": "5511999990000",
                    "sourceName": "Test User",
                    "timestamp": 1677652288000i64,
                    "dataMessage": {
                        "message": "Hello bot!",
                        "timestamp": 1677652288000i64,
                        "groupInfo": null
                    }
                },
                "account": "bot-account"
            }
        ]);

        Mock::given(method("GET"))
            .and(path("/v1/receive/bot-account"))
            .respond_with(ResponseTemplate::new(200).set_body_json(&messages))
            .mount(&mock_server)
            .await;

        let client = create_test_client(&mock_server).await;
        let result = client.receive().await;

        assert!(result.is_ok());
        let msgs = result.unwrap();
        assert_eq!(msgs.len(), 1);
        assert_eq!(msgs[0].envelope.source, "5511999990000");
    }

    #[tokio::test]
    async fn test_send_message_returns_id() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v2/send"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "id": "msg-42"
            })))
            .mount(&mock_server)
            .await;

        let client = create_test_client(&mock_server).await;
        let result = client.send("5511999990000", "Hello!").await;

        assert_eq!(result.unwrap(), Some("msg-42".into()));
    }

    #[tokio::test]
    async fn test_send_message_failure() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v2/send"))
            .respond_with(ResponseTemplate::new(400).set_body_string("Invalid recipient"))
            .mount(&mock_server)
            .await;

        let client = create_test_client(&mock_server).await;
        let result = client.send("5511999990000", "Hello!").await;

        assert!(matches!(result, Err(WaError::SendFailed(_))));
    }

    #[tokio::test]
    async fn test_delete_message() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1/delete"))
            .respond_with(ResponseTemplate::new(200))
            .mount(&mock_server)
            .await;

        let client = create_test_client(&mock_server).await;
        assert!(client.delete_message("g-123", "msg-42").await.is_ok());
    }

    #[tokio::test]
    async fn test_is_member() {
        let mock_server = MockServer::start().await;

        let groups = serde_json::json!([
            { "id": "g-1", "name": "Estudo", "members": ["5511999990000", "5511888880000"] },
            { "id": "g-2", "name": "Trabalho", "members": ["5511777770000"] }
        ]);

        Mock::given(method("GET"))
            .and(path("/v1/groups/bot-account"))
            .respond_with(ResponseTemplate::new(200).set_body_json(&groups))
            .mount(&mock_server)
            .await;

        let client = create_test_client(&mock_server).await;
        assert!(client.is_member("5511999990000", "Estudo").await.unwrap());
        assert!(!client.is_member("5511999990000", "Trabalho").await.unwrap());
        assert!(!client.is_member("5511999990000", "Inexistente").await.unwrap());
    }

    #[tokio::test]
    async fn test_download_attachment() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/v1/attachments/bot-account/att-1"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(b"audio-bytes".to_vec()))
            .mount(&mock_server)
            .await;

        let client = create_test_client(&mock_server).await;
        let bytes = client.download_attachment("att-1").await.unwrap();
        assert_eq!(bytes, b"audio-bytes");
    }
}
