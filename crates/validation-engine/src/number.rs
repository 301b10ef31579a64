//! `number` 规则
//!
//! 分支按顺序判定，命中第一个失败分支即返回对应消息。整数类型与数字串边界比较时
//! 逐位比较任意长度的数字，避免超出 f64 精度后误判。

use crate::error::{Result, ValidationError};
use crate::evaluator::Outcome;
use crate::message::Message;
use crate::models::{NumberType, NumericText, ValidationOptions, parse_number};
use regex::Regex;
use std::cmp::Ordering;
use std::sync::LazyLock;

static INTEGER_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[0-9]+$").unwrap());
static FLOAT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9]*(\.[0-9]+)?$").unwrap());

/// 已求值的参数
struct Resolved {
    number_type: NumberType,
    min: Option<NumericText>,
    max: Option<NumericText>,
    decimals: Option<u32>,
    money_decimals: Option<u32>,
}

impl Resolved {
    fn from_options(options: &ValidationOptions) -> Result<Self> {
        let resolved = Self {
            number_type: options.number_type,
            min: options.min.as_ref().map(|v| v.resolve()),
            max: options.max.as_ref().map(|v| v.resolve()),
            decimals: options.decimals.as_ref().map(|v| v.resolve()),
            money_decimals: options.format_money.as_ref().map(|v| v.resolve()),
        };

        for (name, bound) in [("min", &resolved.min), ("max", &resolved.max)] {
            if let Some(bound) = bound {
                if !is_numeric_text(bound.as_str()) {
                    return Err(ValidationError::invalid_options(
                        "number",
                        format!("{} 不是有效数字: '{}'", name, bound.as_str()),
                    ));
                }
            }
        }

        Ok(resolved)
    }

    fn cmp(&self, a: &str, b: &str) -> Ordering {
        compare_numeric(a, b, self.number_type)
    }

    fn display(&self, bound: &NumericText) -> String {
        add_comma(bound.as_str(), self.money_decimals)
    }
}

pub(crate) fn validate_number(value: &str, options: &ValidationOptions) -> Result<Outcome> {
    if options.allow_empty && value.is_empty() {
        return Ok(Outcome::Pass);
    }

    let opts = Resolved::from_options(options)?;

    let shape = match opts.number_type {
        NumberType::Integer => &*INTEGER_RE,
        NumberType::Float => &*FLOAT_RE,
    };
    if !shape.is_match(value) || !is_numeric_text(value) {
        return Ok(Outcome::FailWith(Message::new("Should be a valid number.")));
    }

    if opts.number_type == NumberType::Float {
        if let Some(decimals) = opts.decimals.filter(|d| *d > 0) {
            if !has_decimal_places_within(value, decimals) {
                return Ok(Outcome::FailWith(
                    Message::new("Up to {{decimal_count}} decimal places are allowed.")
                        .with_arg("decimal_count", decimals.to_string()),
                ));
            }
        }
    }

    let outcome = match (&opts.min, &opts.max) {
        (Some(min), Some(max)) if opts.cmp(min.as_str(), max.as_str()) == Ordering::Equal => {
            if opts.cmp(value, min.as_str()) != Ordering::Equal {
                Outcome::FailWith(
                    Message::new("Should be {{value}}").with_arg("value", opts.display(min)),
                )
            } else {
                Outcome::Pass
            }
        }
        (Some(min), Some(max)) => {
            if opts.cmp(value, min.as_str()) == Ordering::Less
                || opts.cmp(value, max.as_str()) == Ordering::Greater
            {
                Outcome::FailWith(
                    Message::new("Should be between {{min_value}} and {{max_value}}")
                        .with_arg("min_value", opts.display(min))
                        .with_arg("max_value", opts.display(max)),
                )
            } else {
                Outcome::Pass
            }
        }
        (Some(min), None) if opts.cmp(value, min.as_str()) == Ordering::Less => {
            Outcome::FailWith(
                Message::new("Should be more than {{min_value}}")
                    .with_arg("min_value", opts.display(min)),
            )
        }
        (None, Some(max)) if opts.cmp(value, max.as_str()) == Ordering::Greater => {
            Outcome::FailWith(
                Message::new("Should be less than {{max_value}}")
                    .with_arg("max_value", opts.display(max)),
            )
        }
        _ => Outcome::Pass,
    };

    Ok(outcome)
}

/// `^\d+(\.\d{0,decimals})?$`
fn has_decimal_places_within(value: &str, decimals: u32) -> bool {
    let (int_part, frac_part) = match value.split_once('.') {
        Some((int_part, frac_part)) => (int_part, Some(frac_part)),
        None => (value, None),
    };

    !int_part.is_empty()
        && int_part.bytes().all(|b| b.is_ascii_digit())
        && frac_part.is_none_or(|f| {
            f.len() <= decimals as usize && f.bytes().all(|b| b.is_ascii_digit())
        })
}

/// 纯数字串不经过 f64 解析，长度不受 f64 范围限制；其余文本需解析为有限数
pub(crate) fn is_numeric_text(text: &str) -> bool {
    INTEGER_RE.is_match(text) || parse_number(text).is_some()
}

/// 数值比较：整数类型且两侧都是纯数字串时逐位比较，否则按 f64 比较
pub fn compare_numeric(a: &str, b: &str, number_type: NumberType) -> Ordering {
    if number_type == NumberType::Integer {
        if let Some(ordering) = compare_big_unsigned(a, b) {
            return ordering;
        }
    }

    match (parse_number(a), parse_number(b)) {
        (Some(x), Some(y)) => x.partial_cmp(&y).unwrap_or(Ordering::Equal),
        _ => Ordering::Equal,
    }
}

/// 任意长度无符号整数串比较，任一侧不是纯数字时返回 None
pub fn compare_big_unsigned(a: &str, b: &str) -> Option<Ordering> {
    let is_digits = |s: &str| !s.is_empty() && s.bytes().all(|c| c.is_ascii_digit());
    if !is_digits(a) || !is_digits(b) {
        return None;
    }

    let a = a.trim_start_matches('0');
    let b = b.trim_start_matches('0');

    Some(a.len().cmp(&b.len()).then_with(|| a.cmp(b)))
}

/// 数字千分位格式化，给定小数位数时先按位数截断
pub fn add_comma(raw: &str, decimals: Option<u32>) -> String {
    let mut number = raw.replace(',', "");
    if number.is_empty() {
        number = "0".to_string();
    }

    if let Some(decimals) = decimals {
        if let Ok(n) = number.parse::<f64>() {
            number = format!("{:.*}", decimals as usize, n);
        }
    }

    let (sign, unsigned) = match number.strip_prefix(['-', '+']) {
        Some(rest) => (&number[..1], rest),
        None => ("", number.as_str()),
    };
    let (int_part, frac_part) = match unsigned.split_once('.') {
        Some((int_part, frac_part)) => (int_part, Some(frac_part)),
        None => (unsigned, None),
    };

    if int_part.len() < 4 || !int_part.bytes().all(|b| b.is_ascii_digit()) {
        return number;
    }

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    match frac_part {
        Some(frac) => format!("{}{}.{}", sign, grouped, frac),
        None => format!("{}{}", sign, grouped),
    }
}
