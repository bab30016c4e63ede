//! 폰트 바이트 취득
//!
//! 캐시는 이 트레이트만 알고 있으므로 테스트에서는 네트워크 없이
//! 가짜 구현을 끼워 넣을 수 있다.

use crate::error::{ReportError, Result};
use async_trait::async_trait;
use reqwest::Client;

/// 소스 하나에 대한 실패 (복제 가능해야 공유 future 결과로 쓸 수 있다)
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum FetchFailure {
    #[error("HTTP {status}: {url}")]
    Status { url: String, status: u16 },

    #[error("요청 실패: {0}")]
    Request(String),

    #[error("폰트 형식이 아닙니다: {0}")]
    NotAFont(String),
}

/// 폰트 소스 접근 계층
#[async_trait]
pub trait AssetFetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> std::result::Result<Vec<u8>, FetchFailure>;
}

/// reqwest 기반 HTTP 취득기
#[derive(Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new() -> Result<Self> {
        let client = Client::builder()
            .user_agent(concat!("npk-sop/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| ReportError::Config(format!("HTTP 클라이언트 생성 실패: {}", e)))?;
        Ok(Self { client })
    }
}

#[async_trait]
impl AssetFetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> std::result::Result<Vec<u8>, FetchFailure> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| FetchFailure::Request(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchFailure::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| FetchFailure::Request(e.to_string()))?;
        Ok(bytes.to_vec())
    }
}

/// TrueType / OpenType / 컬렉션 시그니처
pub fn looks_like_font(bytes: &[u8]) -> bool {
    matches!(
        bytes.get(..4),
        Some([0x00, 0x01, 0x00, 0x00]) | Some(b"OTTO") | Some(b"true") | Some(b"ttcf")
    )
}
