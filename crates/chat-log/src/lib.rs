//! In-memory chat history for summaries and digests.
//!
//! Keeps a bounded, TTL-expiring window of recent messages per chat.
//! Nothing here is persisted; history is rebuilt from live traffic.

mod store;
mod types;

pub use store::ChatLog;
pub use types::*;

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_logged_message_render_line() {
        let msg = LoggedMessage::new("5511999990000", Some("Alice".into()), "bom dia");
        let line = msg.render_line();
        assert!(line.contains("Alice: bom dia"));
    }

    #[test]
    fn test_render_line_falls_back_to_sender_id() {
        let msg = LoggedMessage::new("5511999990000", None, "oi");
        assert!(msg.render_line().contains("5511999990000: oi"));
    }

    #[test]
    fn test_history_push_and_transcript() {
        let mut history = ChatHistory::new("g-1");
        history.push(LoggedMessage::new("a", Some("Alice".into()), "primeira"));
        history.push(LoggedMessage::new("b", Some("Bob".into()), "segunda"));

        assert_eq!(history.messages.len(), 2);
        let transcript = history.transcript();
        assert!(transcript.contains("Alice: primeira"));
        assert!(transcript.contains("Bob: segunda"));
    }

    #[test]
    fn test_history_trim_keeps_most_recent() {
        let mut history = ChatHistory::new("g-1");
        for i in 1..=10 {
            history.push(LoggedMessage::new("a", None, format!("msg {}", i)));
        }

        history.trim(4);

        assert_eq!(history.messages.len(), 4);
        assert_eq!(history.messages[0].text, "msg 7");
        assert_eq!(history.messages[3].text, "msg 10");
    }

    #[tokio::test]
    async fn test_log_record_and_get() {
        let log = ChatLog::new(100, Duration::from_secs(3600));

        log.record("g-1", LoggedMessage::new("a", None, "oi")).await;

        let history = log.get("g-1").await.unwrap();
        assert_eq!(history.messages.len(), 1);
        assert_eq!(history.messages[0].text, "oi");
    }

    #[tokio::test]
    async fn test_log_recent_returns_tail() {
        let log = ChatLog::new(100, Duration::from_secs(3600));

        for i in 1..=6 {
            log.record("g-1", LoggedMessage::new("a", None, format!("msg {}", i)))
                .await;
        }

        let recent = log.recent("g-1", 3).await;
        assert_eq!(recent.len(), 3);
        assert_eq!(recent[0].text, "msg 4");
        assert_eq!(recent[2].text, "msg 6");
    }

    #[tokio::test]
    async fn test_log_recent_empty_chat() {
        let log = ChatLog::new(100, Duration::from_secs(3600));
        assert!(log.recent("nope", 10).await.is_empty());
    }

    #[tokio::test]
    async fn test_log_clear() {
        let log = ChatLog::new(100, Duration::from_secs(3600));

        log.record("g-1", LoggedMessage::new("a", None, "oi")).await;
        assert!(log.clear("g-1").await);
        assert!(log.get("g-1").await.is_none());
        assert!(!log.clear("g-1").await);
    }

    #[tokio::test]
    async fn test_log_trims_per_chat() {
        let log = ChatLog::new(3, Duration::from_secs(3600));

        for i in 1..=5 {
            log.record("g-1", LoggedMessage::new("a", None, format!("msg {}", i)))
                .await;
        }

        let history = log.get("g-1").await.unwrap();
        assert_eq!(history.messages.len(), 3);
        assert_eq!(history.messages[0].text, "msg 3");
    }

    #[tokio::test]
    async fn test_log_ttl_expiration() {
        let log = ChatLog::new(100, Duration::from_millis(50));

        log.record("g-1", LoggedMessage::new("a", None, "oi")).await;
        assert!(log.get("g-1").await.is_some());

        tokio::time::sleep(Duration::from_millis(100)).await;

        assert!(log.get("g-1").await.is_none());
    }

    #[tokio::test]
    async fn test_log_ttl_refresh_on_activity() {
        let log = ChatLog::new(100, Duration::from_millis(100));

        log.record("g-1", LoggedMessage::new("a", None, "oi")).await;

        tokio::time::sleep(Duration::from_millis(60)).await;
        log.record("g-1", LoggedMessage::new("a", None, "ainda aqui"))
            .await;

        tokio::time::sleep(Duration::from_millis(60)).await;

        assert!(log.get("g-1").await.is_some());
    }

    #[tokio::test]
    async fn test_log_chat_count() {
        let log = ChatLog::new(100, Duration::from_secs(3600));

        log.record("g-1", LoggedMessage::new("a", None, "oi")).await;
        log.record("g-2", LoggedMessage::new("b", None, "olá")).await;

        assert_eq!(log.chat_count().await, 2);
        assert_eq!(log.message_count("g-1").await, 1);
        assert_eq!(log.message_count("g-3").await, 0);
    }
}
