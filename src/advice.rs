//! Client for the AI advisory text service.
//!
//! Turns the summary figures of an estimation into a short Chinese loading
//! recommendation via the Gemini `generateContent` endpoint. Upstream
//! failures never propagate: a missing key, a transport error and an empty
//! completion each map to a fixed notice, so the caller always receives
//! displayable text.

use std::time::Duration;

use reqwest::StatusCode;
use serde::{Deserialize, Serialize};

use crate::config::AdviceConfig;
use crate::model::LoadSummary;

/// Notice shown when no API key is configured.
pub const NOT_CONFIGURED_NOTICE: &str = "AI服务不可用：缺少API密钥。";
/// Notice shown when the upstream request fails.
pub const UNAVAILABLE_NOTICE: &str = "暂时无法获取AI建议。";
/// Notice shown when the service answers without usable text.
pub const EMPTY_COMPLETION_NOTICE: &str = "未生成建议。";

fn user_agent() -> String {
    let version = env!("CARGO_PKG_VERSION");
    let os = std::env::consts::OS;
    let arch = std::env::consts::ARCH;
    format!("stowplan/{version} ({os}; {arch})")
}

#[derive(Debug, Serialize)]
struct GenerateRequest {
    contents: Vec<RequestContent>,
}

#[derive(Debug, Serialize)]
struct RequestContent {
    parts: Vec<RequestPart>,
}

#[derive(Debug, Serialize)]
struct RequestPart {
    text: String,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    #[serde(default)]
    text: Option<String>,
}

/// Fetches a loading recommendation for the given summary.
///
/// Always returns displayable text; the degraded cases hand back one of the
/// notice constants instead of an error.
pub async fn fetch_packing_advice(config: &AdviceConfig, summary: &LoadSummary) -> String {
    let Some(api_key) = config.api_key() else {
        println!("ℹ️ Advice request skipped: no API key configured.");
        return NOT_CONFIGURED_NOTICE.to_string();
    };

    match request_advice(config, api_key, summary).await {
        Ok(Some(text)) => text,
        Ok(None) => EMPTY_COMPLETION_NOTICE.to_string(),
        Err(err) => {
            eprintln!("⚠️ Advice request failed: {err}");
            UNAVAILABLE_NOTICE.to_string()
        }
    }
}

async fn request_advice(
    config: &AdviceConfig,
    api_key: &str,
    summary: &LoadSummary,
) -> Result<Option<String>, Box<dyn std::error::Error + Send + Sync>> {
    let client = reqwest::Client::builder()
        .timeout(http_timeout())
        .user_agent(user_agent())
        .build()?;

    let request = GenerateRequest {
        contents: vec![RequestContent {
            parts: vec![RequestPart {
                text: build_prompt(summary),
            }],
        }],
    };

    let response = client
        .post(config.generate_content_endpoint())
        .header("x-goog-api-key", api_key)
        .json(&request)
        .send()
        .await?;

    let status = response.status();
    if status == StatusCode::TOO_MANY_REQUESTS {
        return Err("text-generation quota exhausted (429 Too Many Requests)".into());
    }
    if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
        return Err(format!("text-generation service rejected the API key ({status})").into());
    }

    let response = response.error_for_status()?;
    let payload: GenerateResponse = response.json().await?;
    Ok(extract_advice_text(&payload))
}

/// First non-empty text part across the candidates, trimmed.
fn extract_advice_text(payload: &GenerateResponse) -> Option<String> {
    payload
        .candidates
        .iter()
        .filter_map(|candidate| candidate.content.as_ref())
        .flat_map(|content| content.parts.iter())
        .filter_map(|part| part.text.as_deref())
        .map(str::trim)
        .find(|text| !text.is_empty())
        .map(str::to_owned)
}

/// The analysis prompt with the eight summary figures embedded.
fn build_prompt(summary: &LoadSummary) -> String {
    format!(
        "我正在使用 {name} 运输货物。\n\
         计算结果如下：\n\
         - 总装载件数: {count} 件\n\
         - 货物总重: {weight:.2} kg (限重: {max_weight} kg)\n\
         - 总体积: {volume:.2} m3 (限积: {max_volume} m3)\n\
         - 重量利用率: {weight_util:.1}%\n\
         - 空间利用率: {volume_util:.1}%\n\
         \n\
         请为物流经理提供简明扼要的专业分析（中文）：\n\
         1. 当前装载方案是否高效？\n\
         2. 是否存在安全隐患（例如重量接近100%）？\n\
         3. 针对剩余空间，有什么具体的加固建议（如垫料、绑扎带）？\n\
         \n\
         请保持在150字以内，使用要点格式回答。",
        name = summary.container_name,
        count = summary.total_count,
        weight = summary.total_weight,
        max_weight = summary.max_weight,
        volume = summary.total_volume,
        max_volume = summary.max_volume,
        weight_util = summary.weight_utilization_percent,
        volume_util = summary.volume_utilization_percent,
    )
}

fn http_timeout() -> Duration {
    const DEFAULT_TIMEOUT_SECS: u64 = 30;
    match std::env::var("STOWPLAN_HTTP_TIMEOUT_SECS") {
        Ok(value) => {
            let trimmed = value.trim();
            if trimmed.is_empty() {
                Duration::from_secs(DEFAULT_TIMEOUT_SECS)
            } else if let Ok(parsed) = trimmed.parse::<u64>() {
                if parsed == 0 {
                    Duration::from_secs(DEFAULT_TIMEOUT_SECS)
                } else {
                    Duration::from_secs(parsed)
                }
            } else {
                eprintln!(
                    "⚠️ Could not parse STOWPLAN_HTTP_TIMEOUT_SECS ('{}'). Using default timeout {}s.",
                    trimmed, DEFAULT_TIMEOUT_SECS
                );
                Duration::from_secs(DEFAULT_TIMEOUT_SECS)
            }
        }
        Err(std::env::VarError::NotPresent) => Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        Err(err) => {
            eprintln!(
                "⚠️ Access to STOWPLAN_HTTP_TIMEOUT_SECS failed: {err}. Using default timeout {}s.",
                DEFAULT_TIMEOUT_SECS
            );
            Duration::from_secs(DEFAULT_TIMEOUT_SECS)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_summary() -> LoadSummary {
        LoadSummary {
            container_name: "40尺高柜 (40HQ)".to_string(),
            total_count: 63,
            total_weight: 18_900.0,
            max_weight: 26_000.0,
            total_volume: 60.48,
            max_volume: 76.1,
            weight_utilization_percent: 72.69,
            volume_utilization_percent: 79.47,
        }
    }

    #[test]
    fn prompt_embeds_all_summary_figures() {
        let prompt = build_prompt(&sample_summary());

        assert!(prompt.contains("40尺高柜 (40HQ)"));
        assert!(prompt.contains("63 件"));
        assert!(prompt.contains("18900.00 kg"));
        assert!(prompt.contains("限重: 26000 kg"));
        assert!(prompt.contains("60.48 m3"));
        assert!(prompt.contains("限积: 76.1 m3"));
        assert!(prompt.contains("72.7%"));
        assert!(prompt.contains("79.5%"));
    }

    #[test]
    fn extraction_returns_the_first_non_empty_part() {
        let payload: GenerateResponse = serde_json::from_str(
            r#"{
                "candidates": [
                    {"content": {"parts": [{"text": "   "}, {"text": " 建议：加强绑扎。 "}]}}
                ]
            }"#,
        )
        .unwrap();

        assert_eq!(
            extract_advice_text(&payload).as_deref(),
            Some("建议：加强绑扎。")
        );
    }

    #[test]
    fn extraction_handles_missing_pieces() {
        let empty: GenerateResponse = serde_json::from_str("{}").unwrap();
        assert_eq!(extract_advice_text(&empty), None);

        let no_candidates: GenerateResponse =
            serde_json::from_str(r#"{"candidates": []}"#).unwrap();
        assert_eq!(extract_advice_text(&no_candidates), None);

        let no_text: GenerateResponse =
            serde_json::from_str(r#"{"candidates": [{"content": {"parts": [{}]}}]}"#).unwrap();
        assert_eq!(extract_advice_text(&no_text), None);
    }

    #[test]
    fn user_agent_identifies_the_service() {
        assert!(user_agent().starts_with("stowplan/"));
    }
}
