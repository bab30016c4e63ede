//! PDF 레이아웃 코어 (글꼴·드로잉 없이 계산만)
//!
//! 레코드를 블록 목록으로 바꾸고, 블록 목록을 페이지로 접는다.
//! 실제 그리기는 CLI 쪽 printpdf 백엔드가 이 계획을 따라 수행한다.

use crate::layout::*;
use crate::locale::status_label;
use crate::types::MaintenanceReport;

// ============================================
// 글자 폭 / 줄바꿈
// ============================================

/// 글자 하나의 대략적인 advance 폭 (em 단위)
///
/// 한글·CJK·전각 문자는 1em, 라틴 문자는 비례폭으로 본다.
pub fn char_advance_em(c: char) -> f32 {
    match c {
        '\u{1100}'..='\u{11FF}'
        | '\u{2E80}'..='\u{A4CF}'
        | '\u{AC00}'..='\u{D7A3}'
        | '\u{F900}'..='\u{FAFF}'
        | '\u{FE30}'..='\u{FE4F}'
        | '\u{FF00}'..='\u{FF60}'
        | '\u{FFE0}'..='\u{FFE6}' => 1.0,
        ' ' => 0.3,
        'i' | 'j' | 'l' | '.' | ',' | ':' | ';' | '\'' | '!' | '|' => 0.3,
        'm' | 'w' | 'M' | 'W' | '@' => 0.85,
        c if c.is_ascii_uppercase() => 0.65,
        c if c.is_ascii() => 0.55,
        _ => 1.0,
    }
}

/// 문자열 폭 (mm)
pub fn text_width_mm(text: &str, size_pt: f32) -> f32 {
    let em: f32 = text.chars().map(char_advance_em).sum();
    pt_to_mm(em * size_pt)
}

/// 주어진 폭에 맞춰 줄바꿈한다. 글자를 버리지 않는다.
///
/// 단어 단위로 채우고, 한 단어가 폭보다 길면 글자 단위로 끊는다.
/// 원문의 줄바꿈은 그대로 유지한다.
pub fn wrap_text(text: &str, max_width_mm: f32, size_pt: f32) -> Vec<String> {
    let mut lines = Vec::new();

    for paragraph in text.split('\n') {
        let paragraph = paragraph.trim_end_matches('\r');
        let mut current = String::new();

        for word in paragraph.split(' ') {
            let candidate = if current.is_empty() {
                word.to_string()
            } else {
                format!("{} {}", current, word)
            };

            if text_width_mm(&candidate, size_pt) <= max_width_mm {
                current = candidate;
                continue;
            }

            if !current.is_empty() {
                lines.push(std::mem::take(&mut current));
            }

            // 단어 자체가 폭을 넘으면 글자 단위로 자른다
            for c in word.chars() {
                current.push(c);
                if text_width_mm(&current, size_pt) > max_width_mm && current.chars().count() > 1 {
                    current.pop();
                    lines.push(std::mem::take(&mut current));
                    current.push(c);
                }
            }
        }

        lines.push(current);
    }

    lines
}

// ============================================
// 블록
// ============================================

/// 속성 표의 한 행
#[derive(Debug, Clone, PartialEq)]
pub struct AttributeRow {
    pub label: &'static str,
    pub lines: Vec<String>,
}

impl AttributeRow {
    /// 최소 높이와 줄 수에 따른 높이 중 큰 값. 글자를 자르지 않고 행이 늘어난다.
    pub fn height_mm(&self) -> f32 {
        row_height_mm(self.lines.len())
    }
}

pub fn row_height_mm(line_count: usize) -> f32 {
    MIN_ROW_HEIGHT_MM.max(line_count as f32 * ROW_LINE_HEIGHT_MM + ROW_PADDING_MM)
}

pub fn advisory_height_mm(line_count: usize) -> f32 {
    line_count as f32 * ADVISORY_LINE_HEIGHT_MM + ADVISORY_PADDING_MM
}

/// 표에 들어갈 (라벨, 값) 목록. 빈 값은 "-"
pub fn attribute_pairs(report: &MaintenanceReport) -> Vec<(&'static str, String)> {
    let pairs = [
        ("통지번호", report.notification_no.clone()),
        ("작업부서", report.work_dept.label().to_string()),
        ("설비명칭", report.equipment_name.clone()),
        ("정비일시", report.date_time().trim().to_string()),
        ("고장발생경위", report.work_content.clone()),
        ("고장원인", report.cause.clone()),
        ("조치사항", report.action.clone()),
        ("조치상태", status_label(report.is_completed).to_string()),
    ];

    pairs
        .into_iter()
        .map(|(label, value)| {
            if value.trim().is_empty() {
                (label, "-".to_string())
            } else {
                (label, value)
            }
        })
        .collect()
}

/// 페이지에 배치되는 단위
#[derive(Debug, Clone, PartialEq)]
pub enum BlockKind {
    /// 레코드 첫 페이지의 배너
    Header,
    Attribute(AttributeRow),
    Advisory { lines: Vec<String> },
    PhotoHeading,
    /// 그리드 한 줄: 이미지 목록에서 start 부터 count 개 (최대 2)
    PhotoRow { start: usize, count: usize },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Block {
    pub kind: BlockKind,
    pub height_mm: f32,
    /// 같은 페이지에서 앞 블록과의 간격
    pub gap_before_mm: f32,
    /// 이 블록과 같은 페이지에 있어야 하는 다음 내용의 높이
    pub keep_with_next_mm: f32,
}

impl Block {
    fn new(kind: BlockKind, height_mm: f32) -> Self {
        Self {
            kind,
            height_mm,
            gap_before_mm: 0.0,
            keep_with_next_mm: 0.0,
        }
    }

    fn gap_before(mut self, gap_mm: f32) -> Self {
        self.gap_before_mm = gap_mm;
        self
    }

    fn keep_with_next(mut self, height_mm: f32) -> Self {
        self.keep_with_next_mm = height_mm;
        self
    }
}

/// 레코드 하나의 블록 목록 (위에서 아래 순서)
///
/// `image_count` 는 실제로 디코딩에 성공한 이미지 수.
pub fn record_blocks(report: &MaintenanceReport, image_count: usize) -> Vec<Block> {
    let mut blocks = vec![Block::new(BlockKind::Header, HEADER_HEIGHT_MM)];

    for (index, (label, value)) in attribute_pairs(report).into_iter().enumerate() {
        let row = AttributeRow {
            label,
            lines: wrap_text(&value, VALUE_WRAP_WIDTH_MM, VALUE_SIZE_PT),
        };
        let height = row.height_mm();
        let gap = if index == 0 { HEADER_GAP_MM } else { 0.0 };
        blocks.push(Block::new(BlockKind::Attribute(row), height).gap_before(gap));
    }

    if let Some(advisory) = report.advisory() {
        let lines = wrap_text(advisory, ADVISORY_WRAP_WIDTH_MM, ADVISORY_TEXT_SIZE_PT);
        let height = advisory_height_mm(lines.len());
        blocks.push(Block::new(BlockKind::Advisory { lines }, height).gap_before(ADVISORY_GAP_MM));
    }

    if image_count > 0 {
        blocks.push(
            Block::new(BlockKind::PhotoHeading, PHOTO_TITLE_HEIGHT_MM)
                .gap_before(PHOTO_GAP_MM)
                .keep_with_next(PHOTO_HEIGHT_MM),
        );

        let mut start = 0;
        while start < image_count {
            let count = PHOTO_COLUMNS.min(image_count - start);
            let gap = if start == 0 { 0.0 } else { PHOTO_GAP_MM };
            blocks.push(Block::new(BlockKind::PhotoRow { start, count }, PHOTO_HEIGHT_MM).gap_before(gap));
            start += count;
        }
    }

    blocks
}

// ============================================
// 페이지 나눔 (순수 함수)
// ============================================

/// 블록 하나를 놓은 결과
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Advance {
    /// 블록 상단 위치 (새 페이지라면 새 페이지 기준)
    pub top_mm: f32,
    /// 다음 블록이 시작할 수 있는 위치
    pub next_offset_mm: f32,
    /// 이 블록 앞에서 새 페이지를 시작해야 하는지
    pub page_break: bool,
}

/// 현재 세로 위치와 블록 높이로 배치 위치를 계산한다.
///
/// 블록은 절대 나뉘지 않는다. 바닥 여백을 넘으면 새 페이지로 옮기되,
/// 이미 빈 페이지라면 그대로 둔다 (한 페이지보다 큰 블록).
pub fn advance(offset_mm: f32, page_is_empty: bool, block: &Block, geometry: &PageGeometry) -> Advance {
    let top = if page_is_empty { offset_mm } else { offset_mm + block.gap_before_mm };
    let needed = block.height_mm + block.keep_with_next_mm;

    if !page_is_empty && top + needed > geometry.bottom_limit_mm {
        let top = geometry.continuation_top_mm;
        return Advance {
            top_mm: top,
            next_offset_mm: top + block.height_mm,
            page_break: true,
        };
    }

    Advance {
        top_mm: top,
        next_offset_mm: top + block.height_mm,
        page_break: false,
    }
}

/// 배치된 블록
#[derive(Debug, Clone, PartialEq)]
pub struct PlacedBlock {
    pub kind: BlockKind,
    pub top_mm: f32,
    pub height_mm: f32,
}

/// 레코드 하나의 블록을 페이지 목록으로 접는다 (첫 페이지는 0mm 에서 시작)
pub fn paginate(blocks: Vec<Block>, geometry: &PageGeometry) -> Vec<Vec<PlacedBlock>> {
    let initial: (Vec<Vec<PlacedBlock>>, f32) = (vec![Vec::new()], 0.0);

    let (pages, _) = blocks.into_iter().fold(initial, |(mut pages, offset), block| {
        let page_is_empty = pages.last().map_or(true, |page| page.is_empty());
        let step = advance(offset, page_is_empty, &block, geometry);
        if step.page_break {
            pages.push(Vec::new());
        }
        if let Some(page) = pages.last_mut() {
            page.push(PlacedBlock {
                kind: block.kind,
                top_mm: step.top_mm,
                height_mm: block.height_mm,
            });
        }
        (pages, step.next_offset_mm)
    });

    pages
}

// ============================================
// 문서 계획
// ============================================

/// 푸터 페이지 표시
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageMarker {
    /// 레코드 안에서의 페이지 (1부터)
    pub record_page: usize,
    pub record_pages: usize,
    /// 문서 전체에서의 페이지 (1부터)
    pub document_page: usize,
    pub document_pages: usize,
}

impl PageMarker {
    pub fn footer_text(&self) -> String {
        format!(
            "Page {} of {} ({}/{}) | {}",
            self.record_page, self.record_pages, self.document_page, self.document_pages, SYSTEM_LABEL
        )
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PagePlan {
    /// 입력 목록에서의 레코드 위치
    pub record_index: usize,
    pub marker: PageMarker,
    pub blocks: Vec<PlacedBlock>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct DocumentPlan {
    pub pages: Vec<PagePlan>,
}

impl DocumentPlan {
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// 각 레코드가 시작하는 문서 페이지 번호 (1부터)
    pub fn record_start_pages(&self) -> Vec<usize> {
        self.pages
            .iter()
            .filter(|page| page.marker.record_page == 1)
            .map(|page| page.marker.document_page)
            .collect()
    }
}

/// 레코드 목록을 문서 계획으로 만든다.
///
/// `image_counts[i]` 는 i 번째 레코드에서 그릴 이미지 수.
/// 각 레코드는 항상 새 페이지에서 시작한다.
pub fn plan_document(reports: &[MaintenanceReport], image_counts: &[usize], geometry: &PageGeometry) -> DocumentPlan {
    let per_record: Vec<Vec<Vec<PlacedBlock>>> = reports
        .iter()
        .enumerate()
        .map(|(index, report)| {
            let images = image_counts.get(index).copied().unwrap_or(0);
            paginate(record_blocks(report, images), geometry)
        })
        .collect();

    let document_pages: usize = per_record.iter().map(Vec::len).sum();
    let mut pages = Vec::with_capacity(document_pages);

    for (record_index, record_pages) in per_record.into_iter().enumerate() {
        let count = record_pages.len();
        for (page_index, blocks) in record_pages.into_iter().enumerate() {
            pages.push(PagePlan {
                record_index,
                marker: PageMarker {
                    record_page: page_index + 1,
                    record_pages: count,
                    document_page: pages.len() + 1,
                    document_pages,
                },
                blocks,
            });
        }
    }

    DocumentPlan { pages }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn report() -> MaintenanceReport {
        MaintenanceReport {
            id: "REP-1".into(),
            notification_no: "N-2024-001".into(),
            equipment_name: "메인 펌프 P-101".into(),
            fail_date: "2024-05-10".into(),
            fail_time: "14:30".into(),
            work_content: "운전 중 이상 소음".into(),
            cause: "베어링 마모".into(),
            action: "베어링 교체".into(),
            ..Default::default()
        }
    }

    fn attribute_heights(page: &[PlacedBlock]) -> Vec<(&'static str, f32)> {
        page.iter()
            .filter_map(|b| match &b.kind {
                BlockKind::Attribute(row) => Some((row.label, b.height_mm)),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_wrap_keeps_every_character() {
        let text = "베어링 하우징 마모로 인한 이상 진동이 지속적으로 발생하여 운전을 중지하고 점검을 실시함. \
                    Bearing housing wear caused continuous vibration.";
        let lines = wrap_text(text, 40.0, 10.0);
        assert!(lines.len() > 1);
        for line in &lines {
            assert!(text_width_mm(line, 10.0) <= 40.0 + 0.01, "{}", line);
        }
        let rejoined: String = lines.join(" ");
        let strip = |s: &str| s.chars().filter(|c| !c.is_whitespace()).collect::<String>();
        assert_eq!(strip(&rejoined), strip(text));
    }

    #[test]
    fn test_wrap_breaks_long_word() {
        let word = "A".repeat(200);
        let lines = wrap_text(&word, 30.0, 10.0);
        assert!(lines.len() > 1);
        assert_eq!(lines.concat(), word);
    }

    #[test]
    fn test_wrap_keeps_explicit_newlines() {
        let lines = wrap_text("1. 점검\n2. 교체\n3. 시운전", 120.0, 9.0);
        assert_eq!(lines, vec!["1. 점검", "2. 교체", "3. 시운전"]);
    }

    #[test]
    fn test_row_height_grows_with_lines() {
        assert_eq!(row_height_mm(1), MIN_ROW_HEIGHT_MM);
        assert_eq!(row_height_mm(3), 22.0);
    }

    #[test]
    fn test_three_line_description_row_is_taller() {
        // 폭 120mm, 10pt 한글은 한 줄에 약 33자
        let mut r = report();
        r.work_content = "가".repeat(80);
        let blocks = record_blocks(&r, 0);
        let row = blocks
            .iter()
            .find_map(|b| match &b.kind {
                BlockKind::Attribute(row) if row.label == "고장발생경위" => Some((row.clone(), b.height_mm)),
                _ => None,
            })
            .unwrap();
        assert_eq!(row.0.lines.len(), 3);
        assert!(row.1 > MIN_ROW_HEIGHT_MM);
        assert_eq!(row.0.lines.concat(), r.work_content);
    }

    #[test]
    fn test_blank_values_render_as_dash() {
        let pairs = attribute_pairs(&MaintenanceReport::default());
        assert_eq!(pairs[0], ("통지번호", "-".to_string()));
        assert_eq!(pairs[1], ("작업부서", "공무".to_string()));
        assert_eq!(pairs[3], ("정비일시", "-".to_string()));
        assert_eq!(pairs[7], ("조치상태", "진행중".to_string()));
    }

    #[test]
    fn test_advance_pure() {
        let geometry = PageGeometry::a4();
        let block = Block::new(BlockKind::PhotoHeading, 30.0).gap_before(10.0);

        let fits = advance(200.0, false, &block, &geometry);
        assert!(!fits.page_break);
        assert_eq!(fits.top_mm, 210.0);
        assert_eq!(fits.next_offset_mm, 240.0);

        let breaks = advance(250.0, false, &block, &geometry);
        assert!(breaks.page_break);
        assert_eq!(breaks.top_mm, CONTINUATION_TOP_MM);
        assert_eq!(breaks.next_offset_mm, CONTINUATION_TOP_MM + 30.0);
    }

    #[test]
    fn test_oversized_block_on_empty_page_does_not_loop() {
        let geometry = PageGeometry::a4();
        let block = Block::new(BlockKind::Advisory { lines: vec![] }, 400.0);
        let step = advance(CONTINUATION_TOP_MM, true, &block, &geometry);
        assert!(!step.page_break);
    }

    #[test]
    fn test_header_only_on_first_page() {
        let mut r = report();
        // 표가 한 페이지를 넘도록 긴 조치사항
        r.action = "점검 및 교체 작업 ".repeat(150);
        let pages = paginate(record_blocks(&r, 0), &PageGeometry::a4());
        assert!(pages.len() >= 2);

        let headers: Vec<usize> = pages
            .iter()
            .enumerate()
            .filter(|(_, page)| page.iter().any(|b| b.kind == BlockKind::Header))
            .map(|(i, _)| i)
            .collect();
        assert_eq!(headers, vec![0]);
        assert_eq!(pages[1][0].top_mm, CONTINUATION_TOP_MM);
    }

    #[test]
    fn test_rows_never_cross_bottom_limit() {
        let mut r = report();
        r.work_content = "진동 ".repeat(120);
        r.cause = "마모 ".repeat(120);
        r.action = "교체 ".repeat(120);
        r.ai_insights = Some("권고 ".repeat(200));
        let geometry = PageGeometry::a4();
        for page in paginate(record_blocks(&r, 5), &geometry) {
            for block in page {
                if block.height_mm <= geometry.usable_height_mm() {
                    assert!(block.top_mm + block.height_mm <= geometry.bottom_limit_mm + 0.001);
                }
            }
        }
    }

    #[test]
    fn test_photo_grid_two_columns() {
        let blocks = record_blocks(&report(), 5);
        let rows: Vec<(usize, usize)> = blocks
            .iter()
            .filter_map(|b| match b.kind {
                BlockKind::PhotoRow { start, count } => Some((start, count)),
                _ => None,
            })
            .collect();
        assert_eq!(rows, vec![(0, 2), (2, 2), (4, 1)]);
    }

    #[test]
    fn test_no_photo_section_without_images() {
        let blocks = record_blocks(&report(), 0);
        assert!(!blocks.iter().any(|b| b.kind == BlockKind::PhotoHeading));
    }

    #[test]
    fn test_photo_heading_kept_with_first_row() {
        let mut r = report();
        r.ai_insights = Some("권고 ".repeat(420));
        let pages = paginate(record_blocks(&r, 2), &PageGeometry::a4());
        for page in &pages {
            if let Some(pos) = page.iter().position(|b| b.kind == BlockKind::PhotoHeading) {
                assert!(matches!(page.get(pos + 1).map(|b| &b.kind), Some(BlockKind::PhotoRow { .. })));
            }
        }
    }

    #[test]
    fn test_advisory_only_when_present() {
        let mut r = report();
        assert!(!record_blocks(&r, 0).iter().any(|b| matches!(b.kind, BlockKind::Advisory { .. })));

        r.ai_insights = Some("1단계: 진동 측정\n2단계: 베어링 교체".into());
        let blocks = record_blocks(&r, 0);
        let advisory = blocks.iter().find(|b| matches!(b.kind, BlockKind::Advisory { .. })).unwrap();
        assert_eq!(advisory.height_mm, advisory_height_mm(2));
    }

    #[test]
    fn test_batch_plan_starts_each_record_on_fresh_page() {
        let mut long = report();
        long.work_content = "이상 진동 ".repeat(200);
        let reports = vec![report(), long, report()];
        let plan = plan_document(&reports, &[0, 0, 2], &PageGeometry::a4());

        let starts = plan.record_start_pages();
        assert_eq!(starts.len(), 3);
        assert_eq!(starts[0], 1);

        for page in &plan.pages {
            let first_page = page.marker.record_page == 1;
            let has_header = page.blocks.iter().any(|b| b.kind == BlockKind::Header);
            assert_eq!(first_page, has_header);
        }

        let numbers: Vec<usize> = plan.pages.iter().map(|p| p.marker.document_page).collect();
        assert!(numbers.windows(2).all(|w| w[1] == w[0] + 1));
        assert_eq!(*numbers.last().unwrap(), plan.page_count());
        assert!(plan.pages.iter().all(|p| p.marker.document_pages == plan.page_count()));
    }

    #[test]
    fn test_footer_text() {
        let marker = PageMarker { record_page: 1, record_pages: 2, document_page: 3, document_pages: 5 };
        assert_eq!(marker.footer_text(), "Page 1 of 2 (3/5) | NPK SOP System");
    }
}
