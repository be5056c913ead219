//! Chat-markdown rendering of leaderboards and token cards

use super::{TimeFrame, TokenData};
use num_format::{Locale, ToFormattedString};

pub fn format_volume(num: f64) -> String {
    if num >= 1_000_000_000.0 {
        format!("${:.2}B", num / 1_000_000_000.0)
    } else if num >= 1_000_000.0 {
        format!("${:.2}M", num / 1_000_000.0)
    } else if num >= 1_000.0 {
        format!("${:.2}K", num / 1_000.0)
    } else {
        format!("${:.2}", num)
    }
}

pub fn format_price(price: f64) -> String {
    if price == 0.0 {
        return "$0.00".to_string();
    }
    if price < 0.000_000_01 {
        return format!("${:.2e}", price);
    }
    if price < 0.0001 {
        let fixed = format!("{:.10}", price);
        return format!("${}", fixed.trim_end_matches('0').trim_end_matches('.'));
    }
    if price < 1.0 {
        return format!("${:.6}", price);
    }
    if price < 1000.0 {
        return format!("${:.2}", price);
    }
    format!("${}", group_thousands(price))
}

/// `12345.678` -> `12,345.68`, dropping trailing fraction zeros
fn group_thousands(value: f64) -> String {
    let fixed = format!("{:.2}", value);
    let (whole, fraction) = fixed.split_once('.').unwrap_or((fixed.as_str(), ""));
    let grouped = whole
        .parse::<u64>()
        .map(|n| n.to_formatted_string(&Locale::en))
        .unwrap_or_else(|_| whole.to_string());

    let fraction = fraction.trim_end_matches('0');
    if fraction.is_empty() {
        grouped
    } else {
        format!("{}.{}", grouped, fraction)
    }
}

pub fn format_price_change(change: f64) -> String {
    let (sign, emoji) = if change >= 0.0 { ("+", "🟢") } else { ("", "🔴") };
    format!("{} {}{:.2}%", emoji, sign, change)
}

/// Ranked list of up to `count` tokens
pub fn format_leaderboard(tokens: &[TokenData], time_frame: TimeFrame, count: usize) -> String {
    if tokens.is_empty() {
        return "❌ No trending tokens found on Base chain.".to_string();
    }

    let shown = &tokens[..tokens.len().min(count)];
    let header = format!(
        "🔥 **Top {} Trending Tokens on Base Chain ({})**\n\n",
        shown.len(),
        time_frame.label()
    );

    let rows: Vec<String> = shown
        .iter()
        .enumerate()
        .map(|(index, token)| {
            format!(
                "**{}. ${}**\n   💵 {} | 📊 {} | {}",
                index + 1,
                token.symbol,
                format_price(token.price_usd),
                format_volume(token.volume_24h),
                format_price_change(time_frame.change_for(token))
            )
        })
        .collect();

    header + &rows.join("\n\n")
}

/// Card text for one token, sent alongside a ticker attachment
pub fn format_single_token(token: &TokenData, rank: usize, time_frame: TimeFrame) -> String {
    let mut card = format!(
        "**#{} ${}** · {}\n💵 {}\n📊 24h Vol: {}\n📈 {}: {}",
        rank,
        token.symbol,
        token.name,
        format_price(token.price_usd),
        format_volume(token.volume_24h),
        time_frame.label(),
        format_price_change(time_frame.change_for(token))
    );
    if let Some(address) = &token.contract_address {
        card.push_str(&format!("\n`{}`", address));
    }
    card
}
