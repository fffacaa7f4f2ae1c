// src/notifications/telegram_notifier.rs
use crate::config::BotConfig;
use crate::errors::{BotError, Result};
use crate::trading::events::ReportingEvent;
use crate::trading::trades::TradeIntent;
use log::{error, info, warn};
use reqwest::Client;
use serde_json::json;
use std::time::Duration;

const TELEGRAM_API: &str = "https://api.telegram.org";

pub struct TelegramNotifier {
    client: Client,
    bot_token: Option<String>,
    chat_id: Option<String>,
    enabled: bool,
}

impl TelegramNotifier {
    pub fn from_config(config: &BotConfig) -> Self {
        let enabled = config.telegram_enabled();
        if enabled {
            info!("📱 Telegram notifier initialized");
        } else {
            warn!("📱 Telegram notifier disabled - missing TELEGRAM_TOKEN or TELEGRAM_CHAT_ID");
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .unwrap_or_else(|_| Client::new());

        Self {
            client,
            bot_token: config.telegram_token.clone(),
            chat_id: config.telegram_chat_id.clone(),
            enabled,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Posts an HTML message. A disabled notifier succeeds without sending.
    pub async fn send_message(&self, text: &str) -> Result<()> {
        let (Some(bot_token), Some(chat_id)) = (self.bot_token.as_ref(), self.chat_id.as_ref())
        else {
            return Ok(());
        };

        let url = format!("{}/bot{}/sendMessage", TELEGRAM_API, bot_token);
        let payload = json!({
            "chat_id": chat_id,
            "text": text,
            "parse_mode": "HTML",
            "disable_web_page_preview": true
        });

        let response = self.client.post(&url).json(&payload).send().await?;

        if response.status().is_success() {
            Ok(())
        } else {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_else(|_| "Unknown error".to_string());
            error!("📱 Failed to send Telegram notification ({}): {}", status, error_text);
            Err(BotError::Notifier(format!("{}: {}", status, error_text)))
        }
    }

    pub async fn send_signal(
        &self,
        intent: &TradeIntent,
        instrument_name: &str,
        active_trades: usize,
    ) -> Result<()> {
        self.send_message(&intent.describe(instrument_name, active_trades)).await?;
        info!(
            "📱 Telegram signal sent for {} {} @ {}",
            intent.direction, intent.symbol, intent.entry_price
        );
        Ok(())
    }

    pub async fn send_report(&self, report: &ReportingEvent) -> Result<()> {
        self.send_message(&report.summary).await
    }
}
