//! Markdown rendering of per-pair alert blocks and the outbound digest.

use crate::models::observation::Observation;
use crate::rules::change::percent_change;

pub const DIGEST_HEADER: &str = "**Exchange rate alert**";
pub const DIGEST_FOOTER: &str = "Piggy bank: consistency beats guessing the bottom.";
pub const NO_REASON_PLACEHOLDER: &str = "no explicit reason — forced/always-notify mode";
pub const CHANGE_NOT_AVAILABLE: &str = "N/A";

const GENERIC_MARKER: &str = "💱";

/// Marker shown next to a pair, keyed by its base currency.
pub fn pair_marker(base: &str) -> &'static str {
    match base {
        "USD" => "🇺🇸",
        "EUR" => "🇪🇺",
        "GBP" => "🇬🇧",
        "JPY" => "🇯🇵",
        "CAD" => "🇨🇦",
        "AUD" => "🇦🇺",
        "CHF" => "🇨🇭",
        "CNY" => "🇨🇳",
        "ARS" => "🇦🇷",
        "BTC" => "₿",
        _ => GENERIC_MARKER,
    }
}

/// Arrow plus signed percentage, or `N/A` without a previous value.
pub fn format_change(change: Option<f64>) -> String {
    match change {
        Some(chg) => {
            let arrow = if chg > 0.0 {
                "⬆️"
            } else if chg < 0.0 {
                "⬇️"
            } else {
                "➡️"
            };
            format!("{} {:+.2}%", arrow, chg)
        }
        None => CHANGE_NOT_AVAILABLE.to_string(),
    }
}

pub fn compose_block(
    observation: &Observation,
    previous_bid: Option<f64>,
    reasons: &[String],
) -> String {
    let change = percent_change(observation.bid, previous_bid);

    let reasons_txt = if reasons.is_empty() {
        format!("- {}", NO_REASON_PLACEHOLDER)
    } else {
        reasons
            .iter()
            .map(|r| format!("- {}", r))
            .collect::<Vec<_>>()
            .join("\n")
    };

    format!(
        "**{} {}**\n\
         - Bid: **{:.4}**\n\
         - Change vs previous: **{}**\n\
         - Timestamp (UTC): `{}`\n\
         - Source: {}\n\
         \n\
         Reasons:\n\
         {}",
        pair_marker(observation.base_currency()),
        observation.pair_label(),
        observation.bid,
        format_change(change),
        observation.timestamp_iso,
        observation.source,
        reasons_txt
    )
}

/// Wrap one or more blocks, in the given order, into a single message.
pub fn compose_digest(blocks: &[String]) -> String {
    format!("{}\n\n{}\n\n{}", DIGEST_HEADER, blocks.join("\n\n"), DIGEST_FOOTER)
}
