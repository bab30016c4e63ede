//! 한글 폰트 캐시
//!
//! 프로세스 수명 동안 폰트를 한 번만 받아 둔다. 받는 중에 들어온 호출은
//! 같은 작업의 결과를 기다리고, 실패는 캐시하지 않으므로 다음 호출이
//! 처음부터 다시 시도한다.

pub mod fetcher;

pub use fetcher::{looks_like_font, AssetFetcher, FetchFailure, HttpFetcher};

use crate::config::Config;
use crate::error::{ReportError, Result};
use futures::future::{BoxFuture, FutureExt, Shared};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;

/// NanumGothic Regular 미러 (앞에서부터 시도)
pub const FONT_SOURCES: &[&str] = &[
    "https://raw.githubusercontent.com/google/fonts/main/ofl/nanumgothic/NanumGothic-Regular.ttf",
    "https://cdn.jsdelivr.net/gh/googlefonts/nanumgothic@main/fonts/NanumGothic-Regular.ttf",
    "https://github.com/googlefonts/nanumgothic/raw/main/fonts/NanumGothic-Regular.ttf",
];

pub const DEFAULT_SOURCE_TIMEOUT: Duration = Duration::from_millis(4000);

/// 받아 둔 폰트
#[derive(Debug, Clone)]
pub struct GlyphAsset {
    bytes: Arc<Vec<u8>>,
    source: String,
}

impl GlyphAsset {
    pub fn new(bytes: Vec<u8>, source: impl Into<String>) -> Self {
        Self {
            bytes: Arc::new(bytes),
            source: source.into(),
        }
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// 성공한 소스 URL
    pub fn source(&self) -> &str {
        &self.source
    }
}

type Resolution = std::result::Result<GlyphAsset, String>;
type PendingResolution = Shared<BoxFuture<'static, Resolution>>;

enum Slot {
    Empty,
    Resolving(PendingResolution),
    Ready(GlyphAsset),
}

pub struct FontCache {
    fetcher: Arc<dyn AssetFetcher>,
    sources: Arc<Vec<String>>,
    source_timeout: Duration,
    slot: Mutex<Slot>,
}

impl FontCache {
    pub fn new(fetcher: Arc<dyn AssetFetcher>, sources: Vec<String>, source_timeout: Duration) -> Self {
        Self {
            fetcher,
            sources: Arc::new(sources),
            source_timeout,
            slot: Mutex::new(Slot::Empty),
        }
    }

    /// 설정의 소스 목록과 제한 시간으로 HTTP 캐시를 만든다
    pub fn from_config(config: &Config) -> Result<Self> {
        let fetcher = Arc::new(HttpFetcher::new()?);
        Ok(Self::new(fetcher, config.font_sources.clone(), config.font_timeout()))
    }

    /// 폰트를 돌려준다
    ///
    /// - 이미 받아 두었으면 즉시 반환
    /// - 받는 중이면 그 작업에 합류
    /// - 모든 소스가 실패하면 `AssetUnavailable`
    pub async fn get(&self) -> Result<GlyphAsset> {
        let pending = {
            let mut slot = self.slot.lock().await;
            let joined = match &*slot {
                Slot::Ready(asset) => return Ok(asset.clone()),
                Slot::Resolving(pending) => Some(pending.clone()),
                Slot::Empty => None,
            };
            match joined {
                Some(pending) => {
                    tracing::debug!("진행 중인 폰트 다운로드에 합류");
                    pending
                }
                None => {
                    let pending = resolve(
                        Arc::clone(&self.fetcher),
                        Arc::clone(&self.sources),
                        self.source_timeout,
                    )
                    .boxed()
                    .shared();
                    *slot = Slot::Resolving(pending.clone());
                    pending
                }
            }
        };

        let outcome = pending.clone().await;

        let mut slot = self.slot.lock().await;
        let still_current = matches!(&*slot, Slot::Resolving(current) if current.ptr_eq(&pending));
        if still_current {
            *slot = match &outcome {
                Ok(asset) => Slot::Ready(asset.clone()),
                Err(_) => Slot::Empty,
            };
        }

        outcome.map_err(ReportError::AssetUnavailable)
    }

    pub async fn is_ready(&self) -> bool {
        matches!(&*self.slot.lock().await, Slot::Ready(_))
    }
}

async fn resolve(
    fetcher: Arc<dyn AssetFetcher>,
    sources: Arc<Vec<String>>,
    source_timeout: Duration,
) -> Resolution {
    let mut failures = Vec::new();

    for url in sources.iter() {
        let failure = match tokio::time::timeout(source_timeout, fetcher.fetch(url)).await {
            Ok(Ok(bytes)) if looks_like_font(&bytes) => {
                tracing::info!(source = %url, size = bytes.len(), "폰트 로드 완료");
                return Ok(GlyphAsset::new(bytes, url.clone()));
            }
            Ok(Ok(_)) => FetchFailure::NotAFont(url.clone()).to_string(),
            Ok(Err(e)) => e.to_string(),
            Err(_) => format!("시간 초과 ({}ms): {}", source_timeout.as_millis(), url),
        };
        tracing::warn!(source = %url, reason = %failure, "폰트 소스 실패, 다음 소스 시도");
        failures.push(failure);
    }

    if failures.is_empty() {
        Err("설정된 폰트 소스가 없습니다".into())
    } else {
        Err(failures.join("; "))
    }
}
