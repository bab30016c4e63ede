//! 정비 보고서 레코드 타입 정의
//!
//! 모든 컴포넌트가 읽고 쓰는 정규 레코드:
//! - MaintenanceReport: 정규 레코드 (저장소/렌더러/내보내기)
//! - ReportDraft: 엑셀 가져오기의 출력 (식별자·보관·첨부 제외)
//! - ReportForm: 입력 폼 제출 값

use serde::{Deserialize, Serialize};
use std::fmt;

/// 작업부서 (고정 목록)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Department {
    Stationary,
    Rotating,
    Instrument,
    Electrical,
    Building,
    #[default]
    General,
    Technical,
}

impl Department {
    pub const ALL: [Department; 7] = [
        Department::Stationary,
        Department::Rotating,
        Department::Instrument,
        Department::Electrical,
        Department::Building,
        Department::General,
        Department::Technical,
    ];

    /// 화면/시트에 표시되는 부서명
    pub fn label(&self) -> &'static str {
        match self {
            Department::Stationary => "고정",
            Department::Rotating => "회전",
            Department::Instrument => "계기",
            Department::Electrical => "전기",
            Department::Building => "영선",
            Department::General => "공무",
            Department::Technical => "기술",
        }
    }

    /// 부서명과 정확히 일치할 때만 Some
    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|d| d.label() == label.trim())
    }

    /// 인식할 수 없는 값은 기본 부서(공무)로 정규화
    pub fn from_label_or_default(label: &str) -> Self {
        Self::from_label(label).unwrap_or_default()
    }
}

impl fmt::Display for Department {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl From<String> for Department {
    fn from(value: String) -> Self {
        Self::from_label_or_default(&value)
    }
}

impl From<Department> for String {
    fn from(value: Department) -> Self {
        value.label().to_string()
    }
}

/// 첨부 파일
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Attachment {
    pub name: String,

    /// MIME 타입 (예: "image/jpeg")
    #[serde(rename = "type")]
    pub mime_type: String,

    /// data URI 또는 순수 Base64 문자열
    pub data: String,
}

impl Attachment {
    /// "image/" 접두사를 가진 첨부만 이미지로 취급
    pub fn is_image(&self) -> bool {
        self.mime_type.starts_with("image/")
    }

    /// "data:image/jpeg;base64,..." 형식이면 콤마 뒤 Base64 부분만 반환
    pub fn base64_payload(&self) -> &str {
        if self.data.starts_with("data:") {
            self.data.split_once(',').map(|(_, payload)| payload).unwrap_or("")
        } else {
            &self.data
        }
    }
}

/// 정비 보고서 (정규 레코드)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MaintenanceReport {
    /// 내부 식별자 (생성 시 한 번만 부여)
    pub id: String,

    /// 통지번호 (사용자 입력, 고유하지 않음)
    #[serde(default)]
    pub notification_no: String,

    #[serde(default)]
    pub equipment_name: String,

    #[serde(default)]
    pub work_dept: Department,

    /// 고장발생경위
    #[serde(default)]
    pub work_content: String,

    /// YYYY-MM-DD
    #[serde(default)]
    pub fail_date: String,

    /// HH:MM
    #[serde(default)]
    pub fail_time: String,

    #[serde(default)]
    pub cause: String,

    #[serde(default)]
    pub action: String,

    /// 등록일시 (ko-KR 형식, 생성 후 변경 없음)
    #[serde(default)]
    pub created_at: String,

    /// AI 기술권고
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ai_insights: Option<String>,

    #[serde(default)]
    pub is_completed: bool,

    #[serde(default)]
    pub is_archived: bool,

    #[serde(default)]
    pub attachments: Vec<Attachment>,
}

impl MaintenanceReport {
    /// 문서에 그릴 이미지 첨부만 (순서 유지)
    pub fn image_attachments(&self) -> impl Iterator<Item = &Attachment> {
        self.attachments.iter().filter(|a| a.is_image())
    }

    /// 비어 있지 않은 권고문
    pub fn advisory(&self) -> Option<&str> {
        self.ai_insights
            .as_deref()
            .filter(|text| !text.trim().is_empty())
    }

    /// 정렬/표시용 "날짜 시간"
    pub fn date_time(&self) -> String {
        format!("{} {}", self.fail_date, self.fail_time)
    }
}

/// 엑셀 한 행에서 만든 부분 레코드
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportDraft {
    pub notification_no: String,
    pub work_dept: Department,
    pub equipment_name: String,
    pub fail_date: String,
    pub fail_time: String,
    pub work_content: String,
    pub cause: String,
    pub action: String,
    pub is_completed: bool,
    pub created_at: String,
}

impl ReportDraft {
    /// 저장 시점에 식별자를 붙여 정규 레코드로 완성
    pub fn into_report(self, id: String) -> MaintenanceReport {
        MaintenanceReport {
            id,
            notification_no: self.notification_no,
            equipment_name: self.equipment_name,
            work_dept: self.work_dept,
            work_content: self.work_content,
            fail_date: self.fail_date,
            fail_time: self.fail_time,
            cause: self.cause,
            action: self.action,
            created_at: self.created_at,
            ai_insights: None,
            is_completed: self.is_completed,
            is_archived: false,
            attachments: Vec::new(),
        }
    }
}

/// 입력 폼 값 (신규 등록/수정 공통)
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReportForm {
    pub notification_no: String,
    pub equipment_name: String,
    pub work_dept: Department,
    pub work_content: String,
    pub fail_date: String,
    pub fail_time: String,
    pub cause: String,
    pub action: String,
    pub is_completed: bool,
    pub attachments: Vec<Attachment>,
}

/// 수정 화면의 초기값
impl From<&MaintenanceReport> for ReportForm {
    fn from(report: &MaintenanceReport) -> Self {
        Self {
            notification_no: report.notification_no.clone(),
            equipment_name: report.equipment_name.clone(),
            work_dept: report.work_dept,
            work_content: report.work_content.clone(),
            fail_date: report.fail_date.clone(),
            fail_time: report.fail_time.clone(),
            cause: report.cause.clone(),
            action: report.action.clone(),
            is_completed: report.is_completed,
            attachments: report.attachments.clone(),
        }
    }
}

/// 대시보드 집계
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub total_reports: usize,
    /// 진행중 (미완료) 건수
    pub in_progress: usize,
    pub ai_analyzed: usize,
}

impl DashboardStats {
    pub fn collect(reports: &[MaintenanceReport]) -> Self {
        Self {
            total_reports: reports.len(),
            in_progress: reports.iter().filter(|r| !r.is_completed).count(),
            ai_analyzed: reports.iter().filter(|r| r.advisory().is_some()).count(),
        }
    }
}
