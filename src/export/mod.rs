pub mod excel;
pub mod pdf;

use crate::error::Result;
use std::path::{Path, PathBuf};

/// 완성된 출력물 (파일명 + 전체 바이트)
///
/// 바이트가 모두 만들어진 뒤에만 디스크에 쓰므로 실패한 작업은
/// 파일을 남기지 않는다.
#[derive(Debug, Clone, PartialEq)]
pub struct OutputFile {
    pub filename: String,
    pub bytes: Vec<u8>,
}

impl OutputFile {
    pub fn new(filename: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            filename: filename.into(),
            bytes,
        }
    }

    /// `output` 이 디렉터리(또는 확장자 없는 경로)면 그 안에 기본 파일명으로,
    /// 아니면 그 경로 그대로 저장한다.
    pub fn save_to(&self, output: &Path) -> Result<PathBuf> {
        let path = output_path_for(output, &self.filename);
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        std::fs::write(&path, &self.bytes)?;
        tracing::info!(path = %path.display(), size = self.bytes.len(), "파일 저장");
        Ok(path)
    }
}

fn output_path_for(output: &Path, filename: &str) -> PathBuf {
    if output.is_dir() || output.extension().is_none() {
        output.join(filename)
    } else {
        output.to_path_buf()
    }
}

/// 파일명에 쓸 수 없는 문자를 '_' 로 바꾼다
pub fn sanitize_file_component(text: &str) -> String {
    text.trim()
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect()
}
