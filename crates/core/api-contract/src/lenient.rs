//! 宽松字段转换：数字或数字字符串。

use serde::de::Error;
use serde::{Deserialize, Deserializer};

#[derive(Deserialize)]
#[serde(untagged)]
enum NumberOrText {
    Number(f64),
    Text(String),
}

#[derive(Deserialize)]
#[serde(untagged)]
enum TextOrNumber {
    Text(String),
    Integer(i64),
    Number(f64),
}

fn parse_finite<E: Error>(text: &str) -> Result<f64, E> {
    match text.trim().parse::<f64>() {
        Ok(value) if value.is_finite() => Ok(value),
        _ => Err(E::custom(format!("invalid number: {text:?}"))),
    }
}

/// 必填数值。
pub fn number<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    match NumberOrText::deserialize(deserializer)? {
        NumberOrText::Number(value) => Ok(value),
        NumberOrText::Text(text) => parse_finite(&text),
    }
}

/// 可选数值；`null`、缺省与空字符串都视为未提供。
pub fn optional_number<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<NumberOrText>::deserialize(deserializer)? {
        None => Ok(None),
        Some(NumberOrText::Number(value)) => Ok(Some(value)),
        Some(NumberOrText::Text(text)) if text.trim().is_empty() => Ok(None),
        Some(NumberOrText::Text(text)) => parse_finite(&text).map(Some),
    }
}

/// 字符串；IMEI 之类的纯数字标识可能以数字发送。
pub fn string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match TextOrNumber::deserialize(deserializer)? {
        TextOrNumber::Text(text) => Ok(text),
        TextOrNumber::Integer(value) => Ok(value.to_string()),
        TextOrNumber::Number(value) => Ok(value.to_string()),
    }
}
