//! 정비 자문 (Gemini)
//!
//! 설비명과 고장원인으로 짧은 전문가 자문을 받는다. 호출자는 실패를
//! 신경 쓰지 않는다. 어떤 오류든 사람이 읽을 수 있는 대체 문구가 된다.

use crate::config::Config;
use crate::error::{ReportError, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

pub const GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta/models";

/// 응답에 글이 없을 때
pub const EMPTY_ADVICE: &str = "현재 분석 정보를 생성할 수 없습니다.";
/// 호출 자체가 실패했을 때
pub const ADVICE_FAILURE: &str =
    "AI 통찰력을 생성하는 중 오류가 발생했습니다. 연결 상태를 확인하세요.";

const TEMPERATURE: f32 = 0.6;
const TOP_P: f32 = 0.9;

#[async_trait]
pub trait AdviceService: Send + Sync {
    /// 항상 표시 가능한 문자열을 돌려준다
    async fn advise(&self, equipment: &str, cause: &str) -> String;
}

pub fn build_advice_prompt(equipment: &str, cause: &str) -> String {
    format!(
        r#"당신은 20년 경력의 베테랑 산업 유지보수 엔지니어입니다. 다음 고장 사례에 대해 전문가 수준의 분석과 '단계별 해결 가이드'를 작성하세요.

[분석 대상]
설비명: {equipment}
보고된 원인: {cause}

[작성 가이드라인]
1. '원인 분석'과 '권고 조치' 두 섹션으로 나누어 작성하세요.
2. 권고 조치는 1, 2, 3 단계별로 구체적인 행동(Action)을 제시하세요.
3. 답변은 반드시 한국어로 작성하며 총 300자 이내로 간결하면서도 전문적으로 작성하세요.
4. 현장 엔지니어가 즉시 참고할 수 있는 실질적인 팁을 포함하세요."#
    )
}

// ============================================
// Gemini REST 요청/응답
// ============================================

#[derive(Serialize)]
struct GeminiRequest {
    contents: Vec<Content>,
    #[serde(rename = "generationConfig")]
    generation_config: GenerationConfig,
}

#[derive(Serialize)]
struct Content {
    parts: Vec<Part>,
}

#[derive(Serialize)]
struct Part {
    text: String,
}

#[derive(Serialize)]
struct GenerationConfig {
    temperature: f32,
    #[serde(rename = "topP")]
    top_p: f32,
}

#[derive(Deserialize, Default)]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<ResponseContent>,
}

#[derive(Deserialize)]
struct ResponseContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Deserialize)]
struct ResponsePart {
    #[serde(default)]
    text: String,
}

/// 첫 후보의 텍스트 파트를 이어 붙인다 (비어 있으면 None)
fn extract_answer(response: &GeminiResponse) -> Option<String> {
    let content = response.candidates.first()?.content.as_ref()?;
    let text: String = content.parts.iter().map(|part| part.text.as_str()).collect();
    let text = text.trim();
    if text.is_empty() {
        None
    } else {
        Some(text.to_string())
    }
}

// ============================================
// 구현
// ============================================

pub struct GeminiAdvisor {
    client: Client,
    api_key: String,
    model: String,
    api_base: String,
}

impl GeminiAdvisor {
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            api_key: api_key.into(),
            model: model.into(),
            api_base: GEMINI_API_BASE.to_string(),
        }
    }

    /// 다른 엔드포인트 (프록시 등)
    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into();
        self
    }

    fn endpoint(&self) -> String {
        format!("{}/{}:generateContent", self.api_base.trim_end_matches('/'), self.model)
    }

    async fn request_advice(&self, equipment: &str, cause: &str) -> Result<Option<String>> {
        let request = GeminiRequest {
            contents: vec![Content {
                parts: vec![Part {
                    text: build_advice_prompt(equipment, cause),
                }],
            }],
            generation_config: GenerationConfig {
                temperature: TEMPERATURE,
                top_p: TOP_P,
            },
        };

        let response = self
            .client
            .post(self.endpoint())
            .query(&[("key", self.api_key.as_str())])
            .json(&request)
            .send()
            .await
            .map_err(|e| ReportError::ApiCall(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ReportError::ApiCall(format!("HTTP {}: {}", status, body)));
        }

        let payload: GeminiResponse = response
            .json()
            .await
            .map_err(|e| ReportError::ApiCall(e.to_string()))?;
        Ok(extract_answer(&payload))
    }
}

#[async_trait]
impl AdviceService for GeminiAdvisor {
    async fn advise(&self, equipment: &str, cause: &str) -> String {
        match self.request_advice(equipment, cause).await {
            Ok(Some(text)) => text,
            Ok(None) => EMPTY_ADVICE.to_string(),
            Err(e) => {
                tracing::warn!(equipment, "Gemini API 오류: {}", e);
                ADVICE_FAILURE.to_string()
            }
        }
    }
}

/// API 키가 없을 때 쓰는 자문기 (네트워크 없음)
pub struct OfflineAdvisor;

#[async_trait]
impl AdviceService for OfflineAdvisor {
    async fn advise(&self, _equipment: &str, _cause: &str) -> String {
        tracing::debug!("API 키가 없어 자문을 생략합니다");
        ADVICE_FAILURE.to_string()
    }
}

/// 설정에 키가 있으면 Gemini, 없으면 오프라인
pub fn advisor_from_config(config: &Config) -> Box<dyn AdviceService> {
    match config.api_key() {
        Some(key) => Box::new(GeminiAdvisor::new(key, config.model.clone())),
        None => Box::new(OfflineAdvisor),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompt_mentions_inputs() {
        let prompt = build_advice_prompt("메인 펌프", "베어링 마모");
        assert!(prompt.contains("설비명: 메인 펌프"));
        assert!(prompt.contains("보고된 원인: 베어링 마모"));
        assert!(prompt.contains("300자"));
    }

    #[test]
    fn test_request_shape() {
        let request = GeminiRequest {
            contents: vec![Content {
                parts: vec![Part { text: "hi".into() }],
            }],
            generation_config: GenerationConfig {
                temperature: TEMPERATURE,
                top_p: TOP_P,
            },
        };
        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["contents"][0]["parts"][0]["text"], "hi");
        assert!(value["generationConfig"]["topP"].is_number());
    }

    #[test]
    fn test_extract_answer() {
        let payload: GeminiResponse = serde_json::from_str(
            r#"{"candidates":[{"content":{"parts":[{"text":"원인 분석: "},{"text":"윤활 부족"}]}}]}"#,
        )
        .unwrap();
        assert_eq!(extract_answer(&payload).as_deref(), Some("원인 분석: 윤활 부족"));

        let empty: GeminiResponse = serde_json::from_str(r#"{"candidates":[]}"#).unwrap();
        assert_eq!(extract_answer(&empty), None);

        let blank: GeminiResponse =
            serde_json::from_str(r#"{"candidates":[{"content":{"parts":[{"text":"  "}]}}]}"#).unwrap();
        assert_eq!(extract_answer(&blank), None);
    }

    #[test]
    fn test_endpoint() {
        let advisor = GeminiAdvisor::new("k", "gemini-3-flash-preview").with_api_base("http://localhost:8080/");
        assert_eq!(
            advisor.endpoint(),
            "http://localhost:8080/gemini-3-flash-preview:generateContent"
        );
    }

    #[tokio::test]
    async fn test_transport_failure_becomes_fallback() {
        // 포트 9 (discard) 는 보통 닫혀 있어 즉시 연결 거부된다
        let advisor = GeminiAdvisor::new("k", "m").with_api_base("http://127.0.0.1:9");
        assert_eq!(advisor.advise("펌프", "누유").await, ADVICE_FAILURE);
    }

    #[tokio::test]
    async fn test_offline_advisor() {
        assert_eq!(OfflineAdvisor.advise("펌프", "누유").await, ADVICE_FAILURE);
    }
}
