use thiserror::Error;

#[derive(Error, Debug)]
pub enum ReportError {
    #[error("설정 오류: {0}")]
    Config(String),

    #[error("파일을 찾을 수 없습니다: {0}")]
    FileNotFound(String),

    /// 스프레드시트 컨테이너로 읽을 수 없는 입력 (가져오기 1회에 한해 치명적)
    #[error("엑셀 파일을 읽을 수 없습니다: {0}")]
    Parse(String),

    /// 모든 폰트 소스 실패 (렌더링 1회에 한해 치명적)
    #[error("폰트 로드 실패. 네트워크를 확인하세요: {0}")]
    AssetUnavailable(String),

    /// 첨부 이미지 하나의 실패. 로그만 남기고 해당 이미지를 생략한다
    #[error("이미지 삽입 실패: {0}")]
    ImageInsert(String),

    #[error("PDF 생성 에러: {0}")]
    Render(String),

    /// 자문 API 호출 실패 (자문 서비스 내부에서 대체 문구로 바뀐다)
    #[error("API 호출 에러: {0}")]
    ApiCall(String),

    #[error("보고서를 찾을 수 없습니다: {0}")]
    ReportNotFound(String),

    #[error("JSON 해석 오류: {0}")]
    JsonParse(#[from] serde_json::Error),

    #[error("IO 오류: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Common(#[from] npk_sop_common::Error),
}

pub type Result<T> = std::result::Result<T, ReportError>;
