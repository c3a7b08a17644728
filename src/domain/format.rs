//! Display helpers for addresses, amounts and dates

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use super::Transaction;

/// `0x1234...abcd` style shortening. Short values are returned unchanged.
pub fn format_address(value: &str) -> String {
    let value = value.trim();
    if value.chars().count() <= 10 {
        return value.to_string();
    }
    let start: String = value.chars().take(6).collect();
    let end: String = value
        .chars()
        .rev()
        .take(4)
        .collect::<String>()
        .chars()
        .rev()
        .collect();
    format!("{}...{}", start, end)
}

pub fn format_amount(amount: Decimal, symbol: &str, decimals: u32) -> String {
    let precision = decimals as usize;
    format!("{:.*} {}", precision, amount.round_dp(decimals), symbol)
}

/// Amount prefixed with `+` for incoming and `-` for outgoing transfers
pub fn format_signed_amount(tx: &Transaction, native_symbol: &str, decimals: u32) -> String {
    let prefix = match tx.direction {
        super::Direction::In => "+",
        super::Direction::Out => "-",
    };
    format!(
        "{}{}",
        prefix,
        format_amount(tx.amount, tx.token_or(native_symbol), decimals)
    )
}

/// Signed change, always carrying an explicit sign
pub fn format_change(amount: Decimal, symbol: &str, decimals: u32) -> String {
    if amount >= Decimal::ZERO {
        format!("+{}", format_amount(amount, symbol, decimals))
    } else {
        format_amount(amount, symbol, decimals)
    }
}

/// `$1,234.56`; `N/A` when no value is known
pub fn format_usd(value: Option<Decimal>) -> String {
    let Some(value) = value else {
        return "N/A".to_string();
    };
    let rounded = value.round_dp(2);
    let sign = if rounded.is_sign_negative() && !rounded.is_zero() {
        "-"
    } else {
        ""
    };
    let text = format!("{:.2}", rounded.abs());
    let (int_part, frac_part) = text.split_once('.').unwrap_or((text.as_str(), "00"));
    format!("{}${}.{}", sign, group_thousands(int_part), frac_part)
}

pub fn format_percent(value: Decimal) -> String {
    let rounded = value.round_dp(2);
    if rounded >= Decimal::ZERO {
        format!("+{:.2}%", rounded)
    } else {
        format!("{:.2}%", rounded)
    }
}

pub fn format_date(ts: DateTime<Utc>) -> String {
    ts.format("%b %d, %Y %H:%M").to_string()
}

fn group_thousands(digits: &str) -> String {
    let len = digits.len();
    let mut out = String::with_capacity(len + len / 3);
    for (idx, ch) in digits.chars().enumerate() {
        if idx > 0 && (len - idx) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}
