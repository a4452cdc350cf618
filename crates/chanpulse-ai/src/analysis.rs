//! Structured post analysis parsed from model output.

use regex::Regex;
use serde::{Deserialize, Deserializer};

use crate::error::AiError;

/// Fields the structured-analysis prompt asks the model to return.
///
/// Field names match the JSON keys the prompt dictates. Models are sloppy
/// about scalar types (lengths arrive as numbers or strings), so every field
/// tolerates any scalar and normalizes to a string.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PostAnalysis {
    #[serde(default, deserialize_with = "scalar_to_string")]
    pub tema: String,
    #[serde(default, deserialize_with = "scalar_to_string")]
    pub format: String,
    #[serde(default, deserialize_with = "scalar_to_string")]
    pub length: String,
    #[serde(default, deserialize_with = "scalar_to_string")]
    pub style: String,
    #[serde(default, deserialize_with = "scalar_to_string")]
    pub cta: String,
    #[serde(default, deserialize_with = "scalar_to_string")]
    pub zagolovok_5_slov: String,
    #[serde(default, deserialize_with = "scalar_to_string")]
    pub zagolovok_len: String,
    #[serde(default, deserialize_with = "scalar_to_string")]
    pub fact: String,
    #[serde(default, deserialize_with = "scalar_to_string")]
    pub benefit: String,
    #[serde(default, deserialize_with = "scalar_to_string")]
    pub comment_call: String,
    #[serde(default, deserialize_with = "scalar_to_string")]
    pub insight: String,
    #[serde(default, deserialize_with = "scalar_to_string")]
    pub filter: String,
}

fn scalar_to_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(match value {
        serde_json::Value::String(s) => s,
        serde_json::Value::Null => String::new(),
        other => other.to_string(),
    })
}

/// Parse a [`PostAnalysis`] out of a model reply.
///
/// Accepts either a ```` ```json ```` fenced block or a raw JSON body.
///
/// # Errors
///
/// Returns [`AiError::AnalysisParse`] when neither form yields a valid
/// object.
pub fn extract_json(content: &str) -> Result<PostAnalysis, AiError> {
    let fence = Regex::new(r"(?s)```json\s*(\{.*?\})\s*```").expect("static regex is valid");
    let candidate = fence
        .captures(content)
        .and_then(|c| c.get(1))
        .map_or(content.trim(), |m| m.as_str());

    serde_json::from_str(candidate)
        .map_err(|e| AiError::AnalysisParse(format!("{e}: {candidate:.120}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    const BODY: &str = r#"{
        "tema": "корма",
        "format": "текст",
        "length": 320,
        "style": "экспертный",
        "cta": "нет",
        "zagolovok_5_slov": "Пять слов о кормах",
        "zagolovok_len": 18,
        "fact": "да",
        "benefit": "да",
        "comment_call": "нет",
        "insight": "короткий вывод",
        "filter": "Профессиональное"
    }"#;

    #[test]
    fn extracts_from_fenced_block() {
        let content = format!("Вот анализ:\n```json\n{BODY}\n```\nГотово.");
        let analysis = extract_json(&content).unwrap();
        assert_eq!(analysis.tema, "корма");
        assert_eq!(analysis.filter, "Профессиональное");
    }

    #[test]
    fn extracts_from_raw_body() {
        let analysis = extract_json(BODY).unwrap();
        assert_eq!(analysis.style, "экспертный");
    }

    #[test]
    fn numbers_are_normalized_to_strings() {
        let analysis = extract_json(BODY).unwrap();
        assert_eq!(analysis.length, "320");
        assert_eq!(analysis.zagolovok_len, "18");
    }

    #[test]
    fn missing_fields_default_to_empty() {
        let analysis = extract_json(r#"{"tema": "x"}"#).unwrap();
        assert_eq!(analysis.tema, "x");
        assert_eq!(analysis.insight, "");
    }

    #[test]
    fn garbage_is_a_parse_error() {
        let result = extract_json("модель отвлеклась и ответила прозой");
        assert!(matches!(result, Err(AiError::AnalysisParse(_))));
    }

    #[test]
    fn fenced_block_wins_over_surrounding_prose() {
        let content = format!("not json {{\n```json\n{BODY}\n```");
        assert!(extract_json(&content).is_ok());
    }
}
