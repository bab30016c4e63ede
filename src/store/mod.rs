//! 정비 레코드 저장소
//!
//! JSON 파일 하나에 전체 목록을 저장한다. 시작할 때 통째로 읽고,
//! 변경이 있을 때마다 통째로 다시 쓴다 (임시 파일 후 교체). 새 레코드는 항상 맨 앞에 들어간다.

pub mod query;

pub use query::{archived_by_equipment, display_numbers, Direction, ReportQuery, SortKey, Tab};

use crate::error::{ReportError, Result};
use chrono::NaiveDateTime;
use npk_sop_common::locale::format_created_at;
use npk_sop_common::{DashboardStats, MaintenanceReport, ReportDraft, ReportForm};
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

#[derive(Debug)]
pub struct ReportStore {
    path: PathBuf,
    reports: Vec<MaintenanceReport>,
}

impl ReportStore {
    /// 저장소 파일을 읽는다
    ///
    /// 파일이 없으면 빈 저장소, 읽을 수 없으면 경고를 남기고 빈 저장소.
    pub fn open(path: &Path) -> Self {
        let reports = if path.exists() {
            match Self::read_file(path) {
                Ok(reports) => reports,
                Err(e) => {
                    tracing::warn!(path = %path.display(), "저장소를 읽을 수 없어 빈 목록으로 시작합니다: {}", e);
                    Vec::new()
                }
            }
        } else {
            Vec::new()
        };

        tracing::debug!(path = %path.display(), count = reports.len(), "저장소 로드");
        Self {
            path: path.to_path_buf(),
            reports,
        }
    }

    fn read_file(path: &Path) -> Result<Vec<MaintenanceReport>> {
        let reader = BufReader::new(File::open(path)?);
        Ok(serde_json::from_reader(reader)?)
    }

    /// 임시 파일에 전부 쓴 뒤 이름을 바꿔 교체한다 (중간에 끊겨도 기존 파일 유지)
    fn persist(&self, reports: &[MaintenanceReport]) -> Result<()> {
        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        std::fs::create_dir_all(&dir)?;

        let mut staged = NamedTempFile::new_in(&dir)?;
        {
            let mut writer = BufWriter::new(staged.as_file_mut());
            serde_json::to_writer_pretty(&mut writer, reports)?;
            writer.flush()?;
        }
        staged.as_file().sync_all()?;
        staged.persist(&self.path).map_err(|e| ReportError::Io(e.error))?;
        Ok(())
    }

    /// 저장에 성공한 경우에만 메모리의 목록을 바꾼다
    fn commit(&mut self, reports: Vec<MaintenanceReport>) -> Result<()> {
        self.persist(&reports)?;
        self.reports = reports;
        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// 저장 순서 (최신이 앞)
    pub fn reports(&self) -> &[MaintenanceReport] {
        &self.reports
    }

    pub fn len(&self) -> usize {
        self.reports.len()
    }

    pub fn is_empty(&self) -> bool {
        self.reports.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&MaintenanceReport> {
        self.reports.iter().find(|r| r.id == id)
    }

    /// 선택한 레코드를 저장 순서대로 복사해 돌려준다 (없는 id 는 무시)
    pub fn select(&self, ids: &[String]) -> Vec<MaintenanceReport> {
        self.reports
            .iter()
            .filter(|r| ids.iter().any(|id| *id == r.id))
            .cloned()
            .collect()
    }

    pub fn stats(&self) -> DashboardStats {
        DashboardStats::collect(&self.reports)
    }

    fn position(&self, id: &str) -> Result<usize> {
        self.reports
            .iter()
            .position(|r| r.id == id)
            .ok_or_else(|| ReportError::ReportNotFound(id.to_string()))
    }

    /// 이미 쓰인 id 면 접미사를 붙여 겹치지 않게 한다
    ///
    /// `pending` 은 아직 저장되지 않았지만 같은 변경에서 함께 들어갈 레코드.
    fn unique_id(&self, base: String, pending: &[MaintenanceReport]) -> String {
        let taken = |id: &str| self.get(id).is_some() || pending.iter().any(|r| r.id == id);
        if !taken(&base) {
            return base;
        }
        (1..)
            .map(|n| format!("{}-{}", base, n))
            .find(|candidate| !taken(candidate))
            .unwrap_or(base)
    }

    /// 신규 등록 (맨 앞에 추가)
    pub fn submit(
        &mut self,
        form: ReportForm,
        advice: Option<String>,
        now: NaiveDateTime,
    ) -> Result<MaintenanceReport> {
        let id = self.unique_id(format!("REP-{}", now.and_utc().timestamp_millis()), &[]);
        let report = report_from_form(form, id, format_created_at(now.date()), advice, false);

        let mut next = Vec::with_capacity(self.reports.len() + 1);
        next.push(report.clone());
        next.extend(self.reports.iter().cloned());
        self.commit(next)?;
        tracing::info!(id = %report.id, "보고서 등록");
        Ok(report)
    }

    /// 수정: id, 등록일시, 보관 여부는 유지하고 나머지는 폼 값으로 바꾼다
    pub fn replace(&mut self, id: &str, form: ReportForm, advice: Option<String>) -> Result<MaintenanceReport> {
        let index = self.position(id)?;
        let existing = &self.reports[index];
        let report = report_from_form(
            form,
            existing.id.clone(),
            existing.created_at.clone(),
            advice,
            existing.is_archived,
        );

        let mut next = self.reports.clone();
        next[index] = report.clone();
        self.commit(next)?;
        tracing::info!(id = %report.id, "보고서 수정");
        Ok(report)
    }

    /// 가져온 초안을 파일 순서 그대로 맨 앞에 넣는다
    pub fn insert_imported(&mut self, drafts: Vec<ReportDraft>, now: NaiveDateTime) -> Result<usize> {
        let stamp = now.and_utc().timestamp_millis();
        let mut imported: Vec<MaintenanceReport> = Vec::with_capacity(drafts.len());
        for (index, draft) in drafts.into_iter().enumerate() {
            let id = self.unique_id(format!("REP-{}-{}", stamp, index), &imported);
            imported.push(draft.into_report(id));
        }
        let count = imported.len();

        let mut next = imported;
        next.extend(self.reports.iter().cloned());
        self.commit(next)?;
        tracing::info!(count, "가져온 보고서 저장");
        Ok(count)
    }

    /// 완료 상태 전환. 바뀐 값을 돌려준다
    pub fn toggle_completed(&mut self, id: &str) -> Result<bool> {
        let index = self.position(id)?;
        let mut next = self.reports.clone();
        next[index].is_completed = !next[index].is_completed;
        let completed = next[index].is_completed;
        self.commit(next)?;
        Ok(completed)
    }

    /// 보관 상태 전환. 바뀐 값을 돌려준다
    pub fn toggle_archived(&mut self, id: &str) -> Result<bool> {
        let index = self.position(id)?;
        let mut next = self.reports.clone();
        next[index].is_archived = !next[index].is_archived;
        let archived = next[index].is_archived;
        self.commit(next)?;
        Ok(archived)
    }

    /// 여러 건의 보관 상태를 한 번에 지정. 대상이 된 건수를 돌려준다
    pub fn set_archived(&mut self, ids: &[String], archived: bool) -> Result<usize> {
        let mut next = self.reports.clone();
        let mut count = 0;
        for report in next.iter_mut().filter(|r| ids.contains(&r.id)) {
            report.is_archived = archived;
            count += 1;
        }
        self.commit(next)?;
        Ok(count)
    }

    pub fn remove(&mut self, id: &str) -> Result<MaintenanceReport> {
        let index = self.position(id)?;
        let mut next = self.reports.clone();
        let removed = next.remove(index);
        self.commit(next)?;
        tracing::info!(id = %removed.id, "보고서 삭제");
        Ok(removed)
    }
}

fn report_from_form(
    form: ReportForm,
    id: String,
    created_at: String,
    advice: Option<String>,
    is_archived: bool,
) -> MaintenanceReport {
    MaintenanceReport {
        id,
        notification_no: form.notification_no,
        equipment_name: form.equipment_name,
        work_dept: form.work_dept,
        work_content: form.work_content,
        fail_date: form.fail_date,
        fail_time: form.fail_time,
        cause: form.cause,
        action: form.action,
        created_at,
        ai_insights: advice,
        is_completed: form.is_completed,
        is_archived,
        attachments: form.attachments,
    }
}
