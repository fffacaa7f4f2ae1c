// src/trading/report.rs
// Human-readable summaries sent to the notification channel.

use crate::config::BotConfig;
use crate::trading::ledger::{Ledger, StatsSummary, StatsWindow};
use crate::trading::trades::Trade;
use chrono::{DateTime, Utc};

const RULE: &str = "━━━━━━━━━━━━━━━━━━━━━━━━━";

fn window_block(summary: &StatsSummary, label: &str) -> String {
    format!(
        "📊 <b>{}</b>\n   W:{} L:{} | WR: {:.1}%\n   Profit: {:.2}$ ({} trades)\n   Streak: {} | MaxW:{} MaxL:{}",
        label,
        summary.wins,
        summary.losses,
        summary.win_rate,
        summary.profit,
        summary.total,
        summary.streak_label(),
        summary.max_win_streak,
        summary.max_loss_streak
    )
}

fn instrument_line(
    ledger: &Ledger,
    config: &BotConfig,
    symbol: &str,
    now: DateTime<Utc>,
) -> String {
    let (name, expiry) = config
        .instrument(symbol)
        .map(|i| (i.name.as_str(), i.expiry_minutes))
        .unwrap_or((symbol, 0));
    let summary = ledger.window(StatsWindow::Month, now, Some(symbol));
    if summary.total == 0 {
        return format!("   {}: no trades", name);
    }
    format!(
        "   {} ({}min):\n      WR:{:.1}% | {}t | {:+.2}$\n      Streak:{} MaxW:{} MaxL:{}",
        name,
        expiry,
        summary.win_rate,
        summary.total,
        summary.profit,
        summary.streak_label(),
        summary.max_win_streak,
        summary.max_loss_streak
    )
}

/// Full report: today, this week, this month, all time, then a monthly
/// breakdown per configured instrument.
pub fn render_summary(ledger: &Ledger, config: &BotConfig, now: DateTime<Utc>) -> String {
    let windows = [
        (StatsWindow::Today, "TODAY"),
        (StatsWindow::Week, "THIS WEEK"),
        (StatsWindow::Month, "THIS MONTH"),
        (StatsWindow::AllTime, "TOTAL"),
    ];

    let mut msg = format!("{}\n🎯 <b>LIQUIDITY ZONE BOT</b>\n{}\n\n", RULE, RULE);
    for (window, label) in windows {
        msg.push_str(&window_block(&ledger.window(window, now, None), label));
        msg.push_str("\n\n");
    }
    msg.push_str("📌 <b>BY INSTRUMENT (month)</b>\n");
    for symbol in config.instruments.keys() {
        msg.push_str(&instrument_line(ledger, config, symbol, now));
        msg.push('\n');
    }
    msg.push_str(&format!("\n💰 Stake: {}$\n{}", config.stake, RULE));
    msg
}

/// One-line WIN/LOSS notice with today's running figures.
pub fn render_settlement(trade: &Trade, instrument_name: &str, today: &StatsSummary) -> String {
    let (emoji, outcome) = if trade.is_win { ("✅", "WIN") } else { ("❌", "LOSS") };
    format!(
        "{} <b>{} {:+.2}$</b>\n{} | {} | {}min\nStreak: {} | WR: {:.1}%\nDay profit: {:.2}$ ({} trades)",
        emoji,
        outcome,
        trade.profit,
        instrument_name,
        trade.direction,
        trade.expiry_minutes,
        today.streak_label(),
        today.win_rate,
        today.profit,
        today.total
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::trading::trades::{IntentId, TradeIntent};
    use crate::types::Direction;
    use chrono::TimeZone;

    fn settled_trade(time: i64, profit: f64) -> Trade {
        let intent = TradeIntent {
            intent_id: IntentId(1),
            symbol: "R_10".to_string(),
            direction: Direction::Down,
            entry_price: 10.0,
            pattern: "Shooting Star".to_string(),
            stake: 1.0,
            expiry_minutes: 30,
            signal_time: time,
        };
        let mut trade = Trade::pending(&intent);
        trade.open("1");
        trade.settle(9.0, profit, time + 1800);
        trade
    }

    #[test]
    fn test_summary_lists_every_window_and_instrument() {
        let now = Utc.with_ymd_and_hms(2024, 5, 15, 12, 0, 0).unwrap();
        let mut ledger = Ledger::new(95.0);
        ledger.record(settled_trade(now.timestamp() - 60, 0.95));

        let text = render_summary(&ledger, &BotConfig::default(), now);
        for label in ["TODAY", "THIS WEEK", "THIS MONTH", "TOTAL"] {
            assert!(text.contains(label), "missing {}", label);
        }
        assert!(text.contains("Volatility 10 (30min)"));
        assert!(text.contains("Volatility 25: no trades"));
        assert!(text.contains("Streak: 1W"));
    }

    #[test]
    fn test_settlement_line() {
        let trade = settled_trade(0, -1.0);
        let today = StatsSummary {
            losses: 1,
            total: 1,
            streak: -1,
            max_loss_streak: 1,
            profit: -1.0,
            ..StatsSummary::default()
        };
        let text = render_settlement(&trade, "Volatility 10", &today);
        assert!(text.starts_with("❌ <b>LOSS -1.00$</b>"));
        assert!(text.contains("PUT"));
        assert!(text.contains("Streak: 1L"));
    }
}
