//! 목록 조회 (탭·검색·부서·기간 필터와 정렬)

use npk_sop_common::{Department, MaintenanceReport};
use std::cmp::Ordering;
use std::collections::BTreeMap;

/// 설비명이 비어 있는 보관 레코드의 그룹 이름
pub const UNNAMED_EQUIPMENT: &str = "미지정";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum Tab {
    /// 보관되지 않은 레코드
    #[default]
    Reports,
    /// 전체
    History,
    /// 보관된 레코드
    Archive,
}

impl Tab {
    pub fn includes(&self, report: &MaintenanceReport) -> bool {
        match self {
            Tab::Reports => !report.is_archived,
            Tab::History => true,
            Tab::Archive => report.is_archived,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum SortKey {
    /// 저장 순서
    Index,
    NotificationNo,
    WorkDept,
    EquipmentName,
    /// "날짜 시간" 문자열
    DateTime,
    WorkContent,
    IsCompleted,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum Direction {
    Asc,
    #[default]
    Desc,
}

#[derive(Debug, Clone, Default)]
pub struct ReportQuery {
    pub tab: Tab,
    /// 설비명·통지번호 부분 일치 (대소문자 무시)
    pub search: Option<String>,
    /// None 이면 전체 부서
    pub department: Option<Department>,
    /// 발생날짜 하한 (YYYY-MM-DD, 포함)
    pub start_date: Option<String>,
    /// 발생날짜 상한 (YYYY-MM-DD, 포함)
    pub end_date: Option<String>,
    pub sort: Option<(SortKey, Direction)>,
}

impl ReportQuery {
    pub fn matches(&self, report: &MaintenanceReport) -> bool {
        if !self.tab.includes(report) {
            return false;
        }

        if let Some(term) = self.search.as_deref().map(str::to_lowercase) {
            let hit = report.equipment_name.to_lowercase().contains(&term)
                || report.notification_no.to_lowercase().contains(&term);
            if !hit {
                return false;
            }
        }

        if let Some(department) = self.department {
            if report.work_dept != department {
                return false;
            }
        }

        // ISO 날짜 문자열은 사전순 비교가 곧 날짜 비교
        let after_start = self
            .start_date
            .as_deref()
            .map_or(true, |start| report.fail_date.as_str() >= start);
        let before_end = self
            .end_date
            .as_deref()
            .map_or(true, |end| report.fail_date.as_str() <= end);

        after_start && before_end
    }

    /// 필터 후 정렬한 결과 (정렬 키가 같으면 저장 순서 유지)
    pub fn apply<'a>(&self, reports: &'a [MaintenanceReport]) -> Vec<&'a MaintenanceReport> {
        let mut rows: Vec<(usize, &MaintenanceReport)> = reports
            .iter()
            .enumerate()
            .filter(|(_, report)| self.matches(report))
            .collect();

        if let Some((key, direction)) = self.sort {
            rows.sort_by(|(ia, a), (ib, b)| {
                let ordering = compare(key, (*ia, a), (*ib, b));
                match direction {
                    Direction::Asc => ordering,
                    Direction::Desc => ordering.reverse(),
                }
            });
        }

        rows.into_iter().map(|(_, report)| report).collect()
    }
}

fn compare(key: SortKey, a: (usize, &MaintenanceReport), b: (usize, &MaintenanceReport)) -> Ordering {
    let (index_a, a) = a;
    let (index_b, b) = b;
    match key {
        SortKey::Index => index_a.cmp(&index_b),
        SortKey::NotificationNo => a.notification_no.cmp(&b.notification_no),
        SortKey::WorkDept => a.work_dept.label().cmp(b.work_dept.label()),
        SortKey::EquipmentName => a.equipment_name.cmp(&b.equipment_name),
        SortKey::DateTime => a.date_time().cmp(&b.date_time()),
        SortKey::WorkContent => a.work_content.cmp(&b.work_content),
        SortKey::IsCompleted => a.is_completed.cmp(&b.is_completed),
    }
}

/// 목록 표시 번호: 내림차순이면 건수부터 1까지, 아니면 1부터
pub fn display_numbers(count: usize, direction: Option<Direction>) -> Vec<usize> {
    match direction {
        Some(Direction::Desc) => (1..=count).rev().collect(),
        _ => (1..=count).collect(),
    }
}

/// 보관 레코드를 설비명별로 묶는다 (설비명 순)
pub fn archived_by_equipment(reports: &[MaintenanceReport]) -> BTreeMap<String, Vec<&MaintenanceReport>> {
    let mut groups: BTreeMap<String, Vec<&MaintenanceReport>> = BTreeMap::new();
    for report in reports.iter().filter(|r| r.is_archived) {
        let name = if report.equipment_name.trim().is_empty() {
            UNNAMED_EQUIPMENT.to_string()
        } else {
            report.equipment_name.clone()
        };
        groups.entry(name).or_default().push(report);
    }
    groups
}
