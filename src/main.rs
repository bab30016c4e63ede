use anyhow::Context;
use chrono::Local;
use clap::Parser;
use npk_sop::{advice, cli, config, error, export, font, importer, logging, store};
use npk_sop_common::locale::status_label;
use npk_sop_common::ReportForm;
use cli::{Cli, Commands, FormArgs};
use config::Config;
use std::path::PathBuf;
use store::{ReportQuery, ReportStore};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    let config = Config::load().context("설정 파일을 읽을 수 없습니다")?;
    let store_path = match &cli.store {
        Some(path) => path.clone(),
        None => config.store_path()?,
    };
    let output_dir = config.output_dir.clone().unwrap_or_else(|| PathBuf::from("."));

    match cli.command {
        Commands::Import { file } => {
            println!("📥 엑셀 가져오기: {}", file.display());
            let drafts = importer::parse_reports_file(&file)?;
            let mut store = ReportStore::open(&store_path);
            let count = store.insert_imported(drafts, Local::now().naive_local())?;
            println!("✔ {}건 업로드 완료", count);
        }

        Commands::Export { output, tab } => {
            let store = ReportStore::open(&store_path);
            let query = ReportQuery { tab, ..Default::default() };
            let reports: Vec<_> = query.apply(store.reports()).into_iter().cloned().collect();

            let file = export::excel::export_reports(&reports, Local::now().date_naive())?;
            let path = file.save_to(&output.unwrap_or(output_dir))?;
            println!("✔ 엑셀 출력 ({}건): {}", reports.len(), path.display());
        }

        Commands::Template { output } => {
            let file = export::excel::download_template()?;
            let path = file.save_to(&output.unwrap_or(output_dir))?;
            println!("✔ 양식 출력: {}", path.display());
        }

        Commands::Pdf { ids, output } => {
            let store = ReportStore::open(&store_path);
            let reports = store.select(&ids);
            if reports.len() < ids.len() {
                let missing: Vec<&String> = ids.iter().filter(|id| store.get(id).is_none()).collect();
                eprintln!("⚠ 찾을 수 없는 ID: {:?}", missing);
            }

            println!("- 폰트 준비 및 PDF 생성 중... ({}건)", reports.len());
            let fonts = font::FontCache::from_config(&config)?;
            let file = export::pdf::render_reports(&reports, &fonts).await?;
            let path = file.save_to(&output.unwrap_or(output_dir))?;
            println!("✔ PDF 출력: {}", path.display());
        }

        Commands::Add { fields, no_advice } => {
            let mut store = ReportStore::open(&store_path);
            let fields = fields.with_timestamp_defaults(Local::now().naive_local());
            let form = apply_fields(ReportForm::default(), fields)?;
            let insights = if no_advice {
                None
            } else {
                println!("- AI 자문 요청 중...");
                let advisor = advice::advisor_from_config(&config);
                Some(advisor.advise(&form.equipment_name, &form.cause).await)
            };

            let report = store.submit(form, insights, Local::now().naive_local())?;
            println!("✔ 등록: {}", report.id);
            if let Some(text) = report.advisory() {
                println!("\n{}", text);
            }
        }

        Commands::Edit { id, fields, no_advice } => {
            let mut store = ReportStore::open(&store_path);
            let existing = store
                .get(&id)
                .cloned()
                .ok_or_else(|| error::ReportError::ReportNotFound(id.clone()))?;
            let form = apply_fields(ReportForm::from(&existing), fields)?;

            let insights = if no_advice {
                existing.ai_insights.clone()
            } else {
                println!("- AI 자문 요청 중...");
                let advisor = advice::advisor_from_config(&config);
                Some(advisor.advise(&form.equipment_name, &form.cause).await)
            };

            let report = store.replace(&id, form, insights)?;
            println!("✔ 수정: {}", report.id);
        }

        Commands::List { tab, search, dept, from, to, sort, direction, by_equipment } => {
            let store = ReportStore::open(&store_path);

            if by_equipment {
                for (equipment, reports) in store::archived_by_equipment(store.reports()) {
                    println!("■ {} ({}건)", equipment, reports.len());
                    for report in reports {
                        println!("    {}  {}  {}", report.id, report.notification_no, report.date_time());
                    }
                }
                return Ok(());
            }

            let query = ReportQuery {
                tab,
                search,
                department: dept,
                start_date: from,
                end_date: to,
                sort: sort.map(|key| (key, direction)),
            };
            let rows = query.apply(store.reports());
            let numbers = store::display_numbers(rows.len(), query.sort.map(|(_, d)| d));

            for (number, report) in numbers.iter().zip(rows.iter()) {
                println!(
                    "{:>4}  {}  {}  {}  {}  {}  {}",
                    number,
                    report.id,
                    report.notification_no,
                    report.work_dept,
                    report.equipment_name,
                    report.date_time(),
                    status_label(report.is_completed)
                );
            }
            println!("총 {}건", rows.len());
        }

        Commands::Toggle { id } => {
            let mut store = ReportStore::open(&store_path);
            let completed = store.toggle_completed(&id)?;
            println!("✔ {}: {}", id, status_label(completed));
        }

        Commands::Archive { ids, restore } => {
            let mut store = ReportStore::open(&store_path);
            let count = store.set_archived(&ids, !restore)?;
            let action = if restore { "보관 해제" } else { "보관" };
            println!("✔ {}건 {}", count, action);
        }

        Commands::Remove { id } => {
            let mut store = ReportStore::open(&store_path);
            let removed = store.remove(&id)?;
            println!("✔ 삭제: [{}] {}", removed.notification_no, removed.id);
        }

        Commands::Stats => {
            let stats = ReportStore::open(&store_path).stats();
            println!("총 작업 내역: {}건", stats.total_reports);
            println!("현재 작업 중: {}건", stats.in_progress);
            println!("AI 분석 제공: {}건", stats.ai_analyzed);
        }

        Commands::Config { set_api_key, show } => {
            let mut config = config;

            if let Some(key) = set_api_key {
                config.set_api_key(key)?;
                println!("✔ API 키를 설정했습니다");
            }

            if show {
                println!("설정:");
                println!("  모델: {}", config.model);
                println!("  저장소: {}", store_path.display());
                println!("  폰트 제한 시간: {}ms", config.font_timeout_ms);
                for source in &config.font_sources {
                    println!("  폰트 소스: {}", source);
                }
                println!("  API 키: {}", if config.api_key().is_some() { "설정됨" } else { "미설정" });
            }
        }
    }

    Ok(())
}

/// 지정된 항목만 폼에 덮어쓴다
fn apply_fields(mut form: ReportForm, fields: FormArgs) -> error::Result<ReportForm> {
    if let Some(value) = fields.notification_no {
        form.notification_no = value;
    }
    if let Some(value) = fields.equipment {
        form.equipment_name = value;
    }
    if let Some(value) = fields.dept {
        form.work_dept = value;
    }
    if let Some(value) = fields.content {
        form.work_content = value;
    }
    if let Some(value) = fields.date {
        form.fail_date = value;
    }
    if let Some(value) = fields.time {
        form.fail_time = value;
    }
    if let Some(value) = fields.cause {
        form.cause = value;
    }
    if let Some(value) = fields.action {
        form.action = value;
    }
    if let Some(value) = fields.completed {
        form.is_completed = value;
    }
    for path in &fields.attachments {
        form.attachments.push(cli::load_attachment(path)?);
    }
    Ok(form)
}
