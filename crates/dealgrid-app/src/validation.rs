// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use time::Date;
use time::macros::format_description;

pub const DATE_LAYOUT: &str = "YYYY-MM-DD";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationError {
    InvalidMoney,
    NegativeMoney,
    InvalidDate,
    InvalidInt,
    InvalidStage,
    EmptyText,
    ReadOnly,
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidMoney => f.write_str("invalid money value"),
            Self::NegativeMoney => f.write_str("negative money value"),
            Self::InvalidDate => write!(f, "invalid date value; use {DATE_LAYOUT}"),
            Self::InvalidInt => f.write_str("invalid integer value"),
            Self::InvalidStage => f.write_str("unknown stage"),
            Self::EmptyText => f.write_str("value cannot be empty"),
            Self::ReadOnly => f.write_str("column is not editable"),
        }
    }
}

impl std::error::Error for ValidationError {}

pub type ValidationResult<T> = std::result::Result<T, ValidationError>;

/// Parses whole dollars. Accepts an optional `$` prefix and thousands separators.
pub fn parse_money(input: &str) -> ValidationResult<i64> {
    let clean = input.trim().replace(',', "");
    if clean.starts_with('-') {
        return Err(ValidationError::NegativeMoney);
    }
    let clean = clean.strip_prefix('$').unwrap_or(&clean);
    if clean.is_empty() || !clean.bytes().all(|byte| byte.is_ascii_digit()) {
        return Err(ValidationError::InvalidMoney);
    }
    clean
        .parse::<i64>()
        .map_err(|_| ValidationError::InvalidMoney)
}

pub fn format_money(dollars: i64) -> String {
    let (sign, dollars) = normalize_sign(dollars);
    format!("{sign}${}", comma_format(dollars))
}

/// Compact form for the summary bar: `$415k`, `$1.2M`.
pub fn format_compact_money(dollars: f64) -> String {
    let sign = if dollars < 0.0 { "-" } else { "" };
    let dollars = dollars.abs();
    if dollars < 1000.0 {
        return format!("{sign}${dollars:.0}");
    }

    let (value, suffix) = if dollars < 1_000_000.0 {
        (dollars / 1000.0, "k")
    } else if dollars < 1_000_000_000.0 {
        (dollars / 1_000_000.0, "M")
    } else {
        (dollars / 1_000_000_000.0, "B")
    };

    let rounded = (value * 10.0).round() / 10.0;
    if rounded.fract().abs() < f64::EPSILON {
        format!("{sign}${rounded:.0}{suffix}")
    } else {
        format!("{sign}${rounded:.1}{suffix}")
    }
}

pub fn parse_required_date(input: &str) -> ValidationResult<Date> {
    parse_date(input.trim())
}

pub fn parse_optional_date(input: &str) -> ValidationResult<Option<Date>> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    parse_date(trimmed).map(Some)
}

pub fn format_date(value: Option<Date>) -> String {
    value.map(|date| date.to_string()).unwrap_or_default()
}

pub fn parse_count(input: &str) -> ValidationResult<u32> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Ok(0);
    }
    trimmed
        .parse::<u32>()
        .map_err(|_| ValidationError::InvalidInt)
}

pub fn parse_required_text(input: &str) -> ValidationResult<String> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::EmptyText);
    }
    Ok(trimmed.to_owned())
}

/// Splits a comma-separated list, dropping blanks.
pub fn parse_name_list(input: &str) -> Vec<String> {
    input
        .split(',')
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(str::to_owned)
        .collect()
}

fn parse_date(input: &str) -> ValidationResult<Date> {
    Date::parse(input, &format_description!("[year]-[month]-[day]"))
        .map_err(|_| ValidationError::InvalidDate)
}

fn comma_format(value: i64) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    let mut chars = digits.chars().collect::<Vec<_>>();
    let mut count = 0usize;
    while let Some(ch) = chars.pop() {
        if count == 3 {
            out.push(',');
            count = 0;
        }
        out.push(ch);
        count += 1;
    }
    out.chars().rev().collect()
}

fn normalize_sign(value: i64) -> (&'static str, i64) {
    if value >= 0 {
        return ("", value);
    }
    if value == i64::MIN {
        ("-", i64::MAX)
    } else {
        ("-", -value)
    }
}
