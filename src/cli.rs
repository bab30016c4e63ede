use crate::error::{ReportError, Result};
use crate::store::{Direction, SortKey, Tab};
use base64::Engine;
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use clap::{Args, Parser, Subcommand};
use npk_sop_common::locale::iso_date;
use npk_sop_common::{Attachment, Department};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "npk-sop")]
#[command(about = "설비 정비 보고서 관리 도구 (엑셀 가져오기/내보내기, PDF 보고서)", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// 상세 로그 출력
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// 저장소 파일 (기본: 설정값 또는 ~/.config/npk-sop/reports.json)
    #[arg(long, global = true)]
    pub store: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// 엑셀 일괄 업로드 양식으로 보고서를 가져온다
    Import {
        /// 엑셀 파일
        #[arg(required = true)]
        file: PathBuf,
    },

    /// 정비이력을 엑셀로 내보낸다
    Export {
        /// 출력 파일/디렉터리
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// 내보낼 목록
        #[arg(long, value_enum, default_value = "history")]
        tab: Tab,
    },

    /// 일괄 업로드 양식을 만든다
    Template {
        /// 출력 파일/디렉터리
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// 선택한 보고서를 PDF 하나로 출력한다
    Pdf {
        /// 보고서 ID (여러 개면 일괄 출력)
        #[arg(required = true, num_args = 1..)]
        ids: Vec<String>,

        /// 출력 파일/디렉터리
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// 보고서를 등록한다
    Add {
        #[command(flatten)]
        fields: FormArgs,

        /// AI 자문을 요청하지 않음
        #[arg(long)]
        no_advice: bool,
    },

    /// 보고서를 수정한다 (지정한 항목만 바뀜)
    Edit {
        /// 보고서 ID
        #[arg(required = true)]
        id: String,

        #[command(flatten)]
        fields: FormArgs,

        /// AI 자문을 다시 요청하지 않고 기존 자문 유지
        #[arg(long)]
        no_advice: bool,
    },

    /// 보고서 목록
    List {
        #[arg(long, value_enum, default_value = "reports")]
        tab: Tab,

        /// 설비명/통지번호 검색
        #[arg(short, long)]
        search: Option<String>,

        /// 작업부서 (고정/회전/계기/전기/영선/공무/기술)
        #[arg(long, value_parser = parse_department)]
        dept: Option<Department>,

        /// 발생날짜 시작 (YYYY-MM-DD)
        #[arg(long)]
        from: Option<String>,

        /// 발생날짜 끝 (YYYY-MM-DD)
        #[arg(long)]
        to: Option<String>,

        /// 정렬 기준
        #[arg(long, value_enum)]
        sort: Option<SortKey>,

        /// 정렬 방향
        #[arg(long, value_enum, default_value = "desc")]
        direction: Direction,

        /// 보관 레코드를 설비별로 묶어 표시
        #[arg(long)]
        by_equipment: bool,
    },

    /// 완료/진행중 상태를 전환한다
    Toggle {
        #[arg(required = true)]
        id: String,
    },

    /// 보고서를 보관하거나 (--restore) 보관 해제한다
    Archive {
        #[arg(required = true, num_args = 1..)]
        ids: Vec<String>,

        /// 보관 해제
        #[arg(long)]
        restore: bool,
    },

    /// 보고서를 영구 삭제한다
    Remove {
        #[arg(required = true)]
        id: String,
    },

    /// 대시보드 집계
    Stats,

    /// 설정 표시/편집
    Config {
        /// API 키 설정
        #[arg(long)]
        set_api_key: Option<String>,

        /// 설정 표시
        #[arg(long)]
        show: bool,
    },
}

/// 등록/수정 폼 항목
#[derive(Args, Debug, Default, Clone)]
pub struct FormArgs {
    /// 통지번호
    #[arg(short = 'n', long)]
    pub notification_no: Option<String>,

    /// 설비명칭
    #[arg(short, long)]
    pub equipment: Option<String>,

    /// 작업부서
    #[arg(short, long, value_parser = parse_department)]
    pub dept: Option<Department>,

    /// 고장발생경위
    #[arg(short = 'c', long)]
    pub content: Option<String>,

    /// 발생날짜 (YYYY-MM-DD, 등록 시 생략하면 오늘)
    #[arg(long, value_parser = parse_date)]
    pub date: Option<String>,

    /// 발생시간 (HH:MM, 등록 시 생략하면 현재 시각)
    #[arg(long, value_parser = parse_time)]
    pub time: Option<String>,

    /// 고장원인
    #[arg(long)]
    pub cause: Option<String>,

    /// 조치사항
    #[arg(short, long)]
    pub action: Option<String>,

    /// 조치 완료 여부
    #[arg(long)]
    pub completed: Option<bool>,

    /// 첨부 파일 (여러 번 지정 가능)
    #[arg(long = "attach")]
    pub attachments: Vec<PathBuf>,
}

impl FormArgs {
    /// 신규 등록용: 비어 있는 발생날짜/시간을 `now` 로 채운다
    pub fn with_timestamp_defaults(mut self, now: NaiveDateTime) -> Self {
        self.date.get_or_insert_with(|| iso_date(now.date()));
        self.time.get_or_insert_with(|| now.format("%H:%M").to_string());
        self
    }
}

/// YYYY-MM-DD 만 받는다
pub fn parse_date(value: &str) -> std::result::Result<String, String> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d")
        .map(iso_date)
        .map_err(|_| format!("날짜 형식이 아닙니다: {} (YYYY-MM-DD)", value))
}

/// HH:MM (24시간) 만 받는다
pub fn parse_time(value: &str) -> std::result::Result<String, String> {
    NaiveTime::parse_from_str(value.trim(), "%H:%M")
        .map(|time| time.format("%H:%M").to_string())
        .map_err(|_| format!("시간 형식이 아닙니다: {} (HH:MM)", value))
}

pub fn parse_department(value: &str) -> std::result::Result<Department, String> {
    Department::from_label(value).ok_or_else(|| {
        let labels: Vec<&str> = Department::ALL.iter().map(|d| d.label()).collect();
        format!("알 수 없는 부서: {} (가능: {})", value, labels.join(", "))
    })
}

/// 파일을 data URI 첨부로 읽는다
pub fn load_attachment(path: &Path) -> Result<Attachment> {
    if !path.exists() {
        return Err(ReportError::FileNotFound(path.display().to_string()));
    }
    let bytes = std::fs::read(path)?;
    let mime_type = mime_type_for(path);
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default();

    Ok(Attachment {
        name,
        data: format!(
            "data:{};base64,{}",
            mime_type,
            base64::engine::general_purpose::STANDARD.encode(&bytes)
        ),
        mime_type,
    })
}

fn mime_type_for(path: &Path) -> String {
    if let Ok(format) = ::image::ImageFormat::from_path(path) {
        return format.to_mime_type().to_string();
    }
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_lowercase)
        .unwrap_or_default();
    match extension.as_str() {
        "pdf" => "application/pdf",
        "txt" => "text/plain",
        "xlsx" => "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
        _ => "application/octet-stream",
    }
    .to_string()
}
