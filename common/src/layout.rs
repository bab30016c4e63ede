//! 레이아웃 설정 모듈
//!
//! mm 기준 보고서 템플릿 정의 (Source of Truth)
//! 엑셀 시트의 열 정의도 여기서 관리한다

// ============================================
// mm 기준 페이지 (Source of Truth)
// ============================================

/// A4 크기（mm）
pub const A4_WIDTH_MM: f32 = 210.0;
pub const A4_HEIGHT_MM: f32 = 297.0;

/// 여백（mm）
pub const MARGIN_MM: f32 = 20.0;

/// 콘텐츠 폭: 210 - 20*2 = 170mm
pub const CONTENT_WIDTH_MM: f32 = A4_WIDTH_MM - MARGIN_MM * 2.0;

/// 상단 배너
pub const HEADER_HEIGHT_MM: f32 = 35.0;
pub const HEADER_TITLE_BASELINE_MM: f32 = 22.0;
pub const HEADER_TITLE_SIZE_PT: f32 = 20.0;
pub const REPORT_TITLE: &str = "설비 정비 완료 보고서";

/// 배너 아래 표 시작까지의 간격
pub const HEADER_GAP_MM: f32 = 10.0;

/// 속성 표
pub const LABEL_WIDTH_MM: f32 = 40.0;
pub const VALUE_WIDTH_MM: f32 = CONTENT_WIDTH_MM - LABEL_WIDTH_MM; // 130mm
pub const VALUE_WRAP_WIDTH_MM: f32 = VALUE_WIDTH_MM - 10.0;
pub const MIN_ROW_HEIGHT_MM: f32 = 10.0;
pub const ROW_LINE_HEIGHT_MM: f32 = 6.0;
pub const ROW_PADDING_MM: f32 = 4.0;
pub const LABEL_SIZE_PT: f32 = 9.0;
pub const VALUE_SIZE_PT: f32 = 10.0;

/// 전문가 자문 박스
pub const ADVISORY_TITLE: &str = "전문가 기술 자문 (AI 분석)";
pub const ADVISORY_WRAP_WIDTH_MM: f32 = CONTENT_WIDTH_MM - 10.0;
pub const ADVISORY_LINE_HEIGHT_MM: f32 = 5.0;
pub const ADVISORY_PADDING_MM: f32 = 15.0;
pub const ADVISORY_GAP_MM: f32 = 10.0;
pub const ADVISORY_TITLE_SIZE_PT: f32 = 10.0;
pub const ADVISORY_TEXT_SIZE_PT: f32 = 9.0;

/// 사진 그리드 (2열 고정)
pub const PHOTO_SECTION_TITLE: &str = "현장 사진 첨부";
pub const PHOTO_TITLE_SIZE_PT: f32 = 11.0;
pub const PHOTO_TITLE_HEIGHT_MM: f32 = 5.0;
pub const PHOTO_COLUMNS: usize = 2;
pub const PHOTO_GAP_MM: f32 = 10.0;
pub const PHOTO_WIDTH_MM: f32 = CONTENT_WIDTH_MM / 2.0 - 5.0; // 80mm
pub const PHOTO_HEIGHT_MM: f32 = 60.0;

/// 바닥 여백: 이 선을 넘는 블록은 다음 페이지로
pub const BOTTOM_LIMIT_MM: f32 = A4_HEIGHT_MM - 20.0;
/// 계속 페이지의 시작 위치
pub const CONTINUATION_TOP_MM: f32 = 20.0;

/// 푸터
pub const FOOTER_BASELINE_MM: f32 = A4_HEIGHT_MM - 15.0;
pub const FOOTER_SIZE_PT: f32 = 8.0;
pub const SYSTEM_LABEL: &str = "NPK SOP System";

// ============================================
// 변환 계수
// ============================================

/// mm → pt (1mm = 72/25.4 pt)
pub const MM_TO_PT: f32 = 72.0 / 25.4;

#[inline]
pub fn mm_to_pt(mm: f32) -> f32 {
    mm * MM_TO_PT
}

#[inline]
pub fn pt_to_mm(pt: f32) -> f32 {
    pt / MM_TO_PT
}

// ============================================
// 페이지 지오메트리
// ============================================

/// 페이지 나눔 계산에 쓰는 세로 기준선 (위에서부터 mm)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageGeometry {
    pub page_width_mm: f32,
    pub page_height_mm: f32,
    /// 계속 페이지의 첫 블록 위치
    pub continuation_top_mm: f32,
    /// 블록 하단이 넘으면 안 되는 선
    pub bottom_limit_mm: f32,
}

impl PageGeometry {
    pub fn a4() -> Self {
        Self {
            page_width_mm: A4_WIDTH_MM,
            page_height_mm: A4_HEIGHT_MM,
            continuation_top_mm: CONTINUATION_TOP_MM,
            bottom_limit_mm: BOTTOM_LIMIT_MM,
        }
    }

    /// 빈 계속 페이지에서 쓸 수 있는 높이
    pub fn usable_height_mm(&self) -> f32 {
        self.bottom_limit_mm - self.continuation_top_mm
    }

    /// 위에서부터의 mm를 PDF 좌표(아래에서부터)로 변환
    pub fn to_pdf_y(&self, top_mm: f32) -> f32 {
        self.page_height_mm - top_mm
    }
}

impl Default for PageGeometry {
    fn default() -> Self {
        Self::a4()
    }
}

// ============================================
// 엑셀 열 정의
// ============================================

pub const COL_SEQUENCE: &str = "순번";
pub const COL_NOTIFICATION_NO: &str = "통지번호";
pub const COL_WORK_DEPT: &str = "작업부서";
pub const COL_EQUIPMENT: &str = "설비명칭";
pub const COL_FAIL_DATE: &str = "발생날짜";
pub const COL_FAIL_TIME: &str = "발생시간";
pub const COL_WORK_CONTENT: &str = "고장발생경위";
pub const COL_CAUSE: &str = "고장원인";
pub const COL_ACTION: &str = "조치사항";
pub const COL_STATUS: &str = "조치상태";
pub const COL_CREATED_AT: &str = "등록일시";

/// 시트 열 (라벨, 너비(문자 수), 양식 예시 값)
#[derive(Debug, Clone, Copy)]
pub struct SheetColumn {
    pub label: &'static str,
    pub width: f64,
    pub example: &'static str,
}

/// 내보내기 시트 열 순서
pub const SHEET_COLUMNS: &[&str] = &[
    COL_SEQUENCE,
    COL_NOTIFICATION_NO,
    COL_WORK_DEPT,
    COL_EQUIPMENT,
    COL_FAIL_DATE,
    COL_FAIL_TIME,
    COL_WORK_CONTENT,
    COL_CAUSE,
    COL_ACTION,
    COL_STATUS,
    COL_CREATED_AT,
];

/// 일괄 업로드 양식 열
pub const TEMPLATE_COLUMNS: &[SheetColumn] = &[
    SheetColumn { label: COL_NOTIFICATION_NO, width: 15.0, example: "예: N-2024-001" },
    SheetColumn { label: COL_WORK_DEPT, width: 15.0, example: "공무" },
    SheetColumn { label: COL_EQUIPMENT, width: 30.0, example: "예: 메인 펌프 P-101" },
    SheetColumn { label: COL_FAIL_DATE, width: 15.0, example: "20240510" },
    SheetColumn { label: COL_FAIL_TIME, width: 10.0, example: "14:30" },
    SheetColumn { label: COL_WORK_CONTENT, width: 50.0, example: "운전 중 이상 소음 및 진동 발생" },
    SheetColumn { label: COL_CAUSE, width: 40.0, example: "베어링 하우징 마모" },
    SheetColumn { label: COL_ACTION, width: 40.0, example: "베어링 교체 및 구리스 주입" },
    SheetColumn { label: COL_STATUS, width: 15.0, example: "완료" },
];
