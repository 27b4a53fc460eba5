//! News command - fetches headlines from a configured RSS feed.

use crate::commands::{ids, CommandHandler};
use crate::error::AppResult;
use async_trait::async_trait;
use std::time::Duration;
use tracing::{info, instrument};
use wa_client::BotMessage;

const MAX_HEADLINES: usize = 10;

pub struct NewsHandler {
    client: reqwest::Client,
    feed_url: String,
}

impl NewsHandler {
    pub fn new(feed_url: String) -> AppResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(15))
            .build()?;

        Ok(Self { client, feed_url })
    }

    /// Pull item titles out of an RSS document. The first `<title>` is the
    /// channel's own and is skipped.
    fn extract_titles(body: &str) -> Vec<String> {
        body.split("<title>")
            .skip(2)
            .filter_map(|chunk| chunk.split("</title>").next())
            .map(|title| {
                title
                    .trim()
                    .trim_start_matches("<![CDATA[")
                    .trim_end_matches("]]>")
                    .trim()
                    .to_string()
            })
            .filter(|title| !title.is_empty())
            .collect()
    }
}

#[async_trait]
impl CommandHandler for NewsHandler {
    fn id(&self) -> &'static str {
        ids::NEWS
    }

    #[instrument(skip(self, _message, args))]
    async fn execute(&self, _message: &BotMessage, args: &str) -> AppResult<String> {
        let body = self
            .client
            .get(&self.feed_url)
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;

        let filter = args.trim().to_lowercase();
        let headlines: Vec<String> = Self::extract_titles(&body)
            .into_iter()
            .filter(|t| filter.is_empty() || t.to_lowercase().contains(&filter))
            .take(MAX_HEADLINES)
            .collect();

        info!("Fetched {} headlines (filter: {:?})", headlines.len(), filter);

        if headlines.is_empty() {
            return Ok(if filter.is_empty() {
                "Nenhuma notícia encontrada agora.".into()
            } else {
                format!("Nenhuma notícia sobre \"{}\" agora.", args.trim())
            });
        }

        let mut reply = String::from("📰 Últimas notícias:\n");
        for headline in headlines {
            reply.push_str("\n• ");
            reply.push_str(&headline);
        }

        Ok(reply)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_titles_skips_channel_title() {
        let body = r#"<rss><channel>
            <title>Feed do Canal</title>
            <item><title>Primeira manchete</title></item>
            <item><title><![CDATA[Segunda manchete]]></title></item>
        </channel></rss>"#;

        let titles = NewsHandler::extract_titles(body);
        assert_eq!(titles, vec!["Primeira manchete", "Segunda manchete"]);
    }

    #[test]
    fn test_extract_titles_empty_feed() {
        assert!(NewsHandler::extract_titles("<rss></rss>").is_empty());
    }
}
