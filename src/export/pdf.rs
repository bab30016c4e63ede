//! PDF 생성 (printpdf 백엔드)
//!
//! 배치 계산은 공통 라이브러리의 pdf_core 가 하고, 여기서는 그 계획대로
//! 그리기만 한다. 폰트를 먼저 확보하고, 실패하면 아무것도 만들지 않는다.

use super::{sanitize_file_component, OutputFile};
use crate::error::{ReportError, Result};
use crate::font::{FontCache, GlyphAsset};
use ::image::{imageops::FilterType, DynamicImage, RgbImage};
use base64::Engine;
use chrono::{Local, NaiveDate, NaiveDateTime};
use npk_sop_common::export::pdf_core::{plan_document, text_width_mm, BlockKind, PagePlan, PlacedBlock};
use npk_sop_common::layout::*;
use npk_sop_common::locale::{format_print_timestamp, iso_date};
use npk_sop_common::{Attachment, MaintenanceReport};
use printpdf::path::PaintMode;
use printpdf::*;
use std::io::Cursor;

/// 사진 한 변의 최대 픽셀 수 (80mm 칸에 약 300dpi)
const MAX_PHOTO_EDGE_PX: u32 = 1000;
const PHOTO_DPI: f32 = 300.0;

// ============================================
// 색상
// ============================================

fn rgb(r: u8, g: u8, b: u8) -> Color {
    Color::Rgb(Rgb::new(r as f32 / 255.0, g as f32 / 255.0, b as f32 / 255.0, None))
}

fn banner_fill() -> Color {
    rgb(31, 41, 55)
}

fn white() -> Color {
    rgb(255, 255, 255)
}

// ============================================
// 파일명
// ============================================

/// 1건: 정비보고서_{통지번호}.pdf, 여러 건: 정비보고서_일괄다운로드_{날짜}.pdf
pub fn pdf_filename(reports: &[MaintenanceReport], today: NaiveDate) -> String {
    match reports {
        [single] => {
            let number = sanitize_file_component(&single.notification_no);
            let stem = if number.is_empty() {
                sanitize_file_component(&single.id)
            } else {
                number
            };
            format!("정비보고서_{}.pdf", stem)
        }
        _ => format!("정비보고서_일괄다운로드_{}.pdf", iso_date(today)),
    }
}

// ============================================
// 첨부 이미지
// ============================================

/// 첨부 하나를 RGB 픽셀로 디코딩 (투명 영역은 흰 바탕에 합성)
pub fn decode_photo(attachment: &Attachment) -> Result<RgbImage> {
    let bytes = base64::engine::general_purpose::STANDARD
        .decode(attachment.base64_payload().trim())
        .map_err(|e| ReportError::ImageInsert(format!("{}: {}", attachment.name, e)))?;

    let decoded = ::image::load_from_memory(&bytes)
        .map_err(|e| ReportError::ImageInsert(format!("{}: {}", attachment.name, e)))?;

    let bounded = if decoded.width() > MAX_PHOTO_EDGE_PX || decoded.height() > MAX_PHOTO_EDGE_PX {
        decoded.resize(MAX_PHOTO_EDGE_PX, MAX_PHOTO_EDGE_PX, FilterType::Triangle)
    } else {
        decoded
    };

    Ok(flatten_on_white(&bounded))
}

fn flatten_on_white(image: &DynamicImage) -> RgbImage {
    let rgba = image.to_rgba8();
    let (width, height) = rgba.dimensions();
    let mut rgb_image = RgbImage::new(width, height);
    for (x, y, pixel) in rgba.enumerate_pixels() {
        let [r, g, b, a] = pixel.0;
        let alpha = a as f32 / 255.0;
        let blend = |channel: u8| (channel as f32 * alpha + 255.0 * (1.0 - alpha)) as u8;
        rgb_image.put_pixel(x, y, ::image::Rgb([blend(r), blend(g), blend(b)]));
    }
    rgb_image
}

/// 레코드의 이미지 첨부를 순서대로 디코딩한다. 실패한 첨부는 로그만 남기고 뺀다.
pub fn decode_photos(report: &MaintenanceReport) -> Vec<RgbImage> {
    report
        .image_attachments()
        .filter_map(|attachment| match decode_photo(attachment) {
            Ok(pixels) => Some(pixels),
            Err(e) => {
                tracing::warn!(
                    report = %report.id,
                    attachment = %attachment.name,
                    "{}", e
                );
                None
            }
        })
        .collect()
}

// ============================================
// 렌더링
// ============================================

/// 레코드 목록을 PDF 하나로 렌더링 (현재 시각 기준)
pub async fn render_reports(reports: &[MaintenanceReport], fonts: &FontCache) -> Result<OutputFile> {
    render_reports_at(reports, fonts, Local::now().naive_local()).await
}

pub async fn render_reports_at(
    reports: &[MaintenanceReport],
    fonts: &FontCache,
    printed_at: NaiveDateTime,
) -> Result<OutputFile> {
    if reports.is_empty() {
        return Err(ReportError::Render("선택된 보고서가 없습니다".into()));
    }

    let font = fonts.get().await?;
    render_with_font(reports, &font, printed_at)
}

/// 확보한 폰트로 렌더링한다 (네트워크 없음)
pub fn render_with_font(
    reports: &[MaintenanceReport],
    font: &GlyphAsset,
    printed_at: NaiveDateTime,
) -> Result<OutputFile> {
    if reports.is_empty() {
        return Err(ReportError::Render("선택된 보고서가 없습니다".into()));
    }

    let photos: Vec<Vec<RgbImage>> = reports.iter().map(decode_photos).collect();
    let image_counts: Vec<usize> = photos.iter().map(Vec::len).collect();
    let geometry = PageGeometry::a4();
    let plan = plan_document(reports, &image_counts, &geometry);

    let filename = pdf_filename(reports, printed_at.date());
    let (doc, first_page, first_layer) = PdfDocument::new(
        filename.trim_end_matches(".pdf"),
        Mm(geometry.page_width_mm),
        Mm(geometry.page_height_mm),
        "Layer 1",
    );

    let font_ref = doc
        .add_external_font(Cursor::new(font.bytes().to_vec()))
        .map_err(|e| ReportError::Render(format!("폰트 추가 에러: {:?}", e)))?;

    let painter = Painter {
        font: &font_ref,
        geometry: &geometry,
        timestamp: format_print_timestamp(printed_at),
    };

    for (index, page) in plan.pages.iter().enumerate() {
        let layer = if index == 0 {
            doc.get_page(first_page).get_layer(first_layer)
        } else {
            let (page_index, layer_index) = doc.add_page(
                Mm(geometry.page_width_mm),
                Mm(geometry.page_height_mm),
                "Layer 1",
            );
            doc.get_page(page_index).get_layer(layer_index)
        };

        let record_photos = photos.get(page.record_index).map(Vec::as_slice).unwrap_or(&[]);
        painter.draw_page(&layer, page, record_photos);
    }

    let bytes = doc
        .save_to_bytes()
        .map_err(|e| ReportError::Render(format!("PDF 저장 에러: {:?}", e)))?;

    tracing::info!(
        records = reports.len(),
        pages = plan.page_count(),
        size = bytes.len(),
        "PDF 생성 완료"
    );
    Ok(OutputFile::new(filename, bytes))
}

struct Painter<'a> {
    font: &'a IndirectFontRef,
    geometry: &'a PageGeometry,
    timestamp: String,
}

impl Painter<'_> {
    fn draw_page(&self, layer: &PdfLayerReference, page: &PagePlan, photos: &[RgbImage]) {
        for block in &page.blocks {
            match &block.kind {
                BlockKind::Header => self.draw_header(layer, block),
                BlockKind::Attribute(row) => self.draw_attribute(layer, block, row.label, &row.lines),
                BlockKind::Advisory { lines } => self.draw_advisory(layer, block, lines),
                BlockKind::PhotoHeading => {
                    layer.set_fill_color(banner_fill());
                    self.text(layer, PHOTO_SECTION_TITLE, PHOTO_TITLE_SIZE_PT, MARGIN_MM, block.top_mm + 4.0);
                }
                BlockKind::PhotoRow { start, count } => {
                    let row = photos.iter().skip(*start).take(*count);
                    for (column, pixels) in row.enumerate() {
                        let x = MARGIN_MM + column as f32 * (PHOTO_WIDTH_MM + PHOTO_GAP_MM);
                        self.draw_photo(layer, pixels, x, block.top_mm);
                    }
                }
            }
        }
        self.draw_footer(layer, page);
    }

    fn draw_header(&self, layer: &PdfLayerReference, block: &PlacedBlock) {
        layer.set_fill_color(banner_fill());
        self.rect(layer, 0.0, block.top_mm, self.geometry.page_width_mm, block.height_mm, PaintMode::Fill);

        layer.set_fill_color(white());
        let width = text_width_mm(REPORT_TITLE, HEADER_TITLE_SIZE_PT);
        let x = (self.geometry.page_width_mm - width) / 2.0;
        self.text(layer, REPORT_TITLE, HEADER_TITLE_SIZE_PT, x, block.top_mm + HEADER_TITLE_BASELINE_MM);
    }

    fn draw_attribute(&self, layer: &PdfLayerReference, block: &PlacedBlock, label: &str, lines: &[String]) {
        let top = block.top_mm;
        let height = block.height_mm;

        layer.set_fill_color(rgb(245, 247, 250));
        self.rect(layer, MARGIN_MM, top, LABEL_WIDTH_MM, height, PaintMode::Fill);

        layer.set_outline_color(rgb(200, 200, 200));
        layer.set_outline_thickness(mm_to_pt(0.2));
        self.rect(layer, MARGIN_MM, top, CONTENT_WIDTH_MM, height, PaintMode::Stroke);
        self.vertical_line(layer, MARGIN_MM + LABEL_WIDTH_MM, top, top + height);

        layer.set_fill_color(rgb(80, 80, 80));
        let label_baseline = top + height / 2.0 + pt_to_mm(LABEL_SIZE_PT) * 0.35;
        self.text(layer, label, LABEL_SIZE_PT, MARGIN_MM + 5.0, label_baseline);

        layer.set_fill_color(rgb(20, 20, 20));
        for (index, line) in lines.iter().enumerate() {
            let baseline = top + 6.0 + index as f32 * ROW_LINE_HEIGHT_MM;
            self.text(layer, line, VALUE_SIZE_PT, MARGIN_MM + LABEL_WIDTH_MM + 5.0, baseline);
        }
    }

    fn draw_advisory(&self, layer: &PdfLayerReference, block: &PlacedBlock, lines: &[String]) {
        let top = block.top_mm;

        layer.set_fill_color(rgb(249, 250, 255));
        layer.set_outline_color(rgb(99, 102, 241));
        layer.set_outline_thickness(mm_to_pt(0.2));
        self.rect(layer, MARGIN_MM, top, CONTENT_WIDTH_MM, block.height_mm, PaintMode::FillStroke);

        layer.set_fill_color(rgb(79, 70, 229));
        self.text(layer, ADVISORY_TITLE, ADVISORY_TITLE_SIZE_PT, MARGIN_MM + 5.0, top + 7.0);

        layer.set_fill_color(rgb(60, 60, 60));
        for (index, line) in lines.iter().enumerate() {
            let baseline = top + 14.0 + index as f32 * ADVISORY_LINE_HEIGHT_MM;
            self.text(layer, line, ADVISORY_TEXT_SIZE_PT, MARGIN_MM + 5.0, baseline);
        }
    }

    fn draw_photo(&self, layer: &PdfLayerReference, pixels: &RgbImage, x: f32, top: f32) {
        let (width_px, height_px) = pixels.dimensions();
        if width_px == 0 || height_px == 0 {
            return;
        }

        let image = Image::from(ImageXObject {
            width: Px(width_px as usize),
            height: Px(height_px as usize),
            color_space: ColorSpace::Rgb,
            bits_per_component: ColorBits::Bit8,
            interpolate: true,
            image_data: pixels.as_raw().clone(),
            image_filter: None,
            clipping_bbox: None,
            smask: None,
        });

        // 300dpi 기준 자연 크기를 칸 크기로 늘린다
        let natural_width_mm = width_px as f32 / PHOTO_DPI * 25.4;
        let natural_height_mm = height_px as f32 / PHOTO_DPI * 25.4;

        image.add_to_layer(
            layer.clone(),
            ImageTransform {
                translate_x: Some(Mm(x)),
                translate_y: Some(Mm(self.geometry.to_pdf_y(top + PHOTO_HEIGHT_MM))),
                scale_x: Some(PHOTO_WIDTH_MM / natural_width_mm),
                scale_y: Some(PHOTO_HEIGHT_MM / natural_height_mm),
                dpi: Some(PHOTO_DPI),
                ..Default::default()
            },
        );

        layer.set_outline_color(rgb(230, 230, 230));
        layer.set_outline_thickness(mm_to_pt(0.2));
        self.rect(layer, x, top, PHOTO_WIDTH_MM, PHOTO_HEIGHT_MM, PaintMode::Stroke);
    }

    fn draw_footer(&self, layer: &PdfLayerReference, page: &PagePlan) {
        layer.set_fill_color(rgb(180, 180, 180));
        let stamp = format!("출력 일시: {}", self.timestamp);
        self.text(layer, &stamp, FOOTER_SIZE_PT, MARGIN_MM, FOOTER_BASELINE_MM);

        let marker = page.marker.footer_text();
        let x = self.geometry.page_width_mm - MARGIN_MM - text_width_mm(&marker, FOOTER_SIZE_PT);
        self.text(layer, &marker, FOOTER_SIZE_PT, x, FOOTER_BASELINE_MM);
    }

    /// baseline_mm 은 페이지 위에서부터의 거리
    fn text(&self, layer: &PdfLayerReference, text: &str, size_pt: f32, x_mm: f32, baseline_mm: f32) {
        if text.is_empty() {
            return;
        }
        layer.use_text(text, size_pt, Mm(x_mm), Mm(self.geometry.to_pdf_y(baseline_mm)), self.font);
    }

    fn rect(&self, layer: &PdfLayerReference, x: f32, top: f32, width: f32, height: f32, mode: PaintMode) {
        let rect = Rect::new(
            Mm(x),
            Mm(self.geometry.to_pdf_y(top + height)),
            Mm(x + width),
            Mm(self.geometry.to_pdf_y(top)),
        )
        .with_mode(mode);
        layer.add_rect(rect);
    }

    fn vertical_line(&self, layer: &PdfLayerReference, x: f32, top: f32, bottom: f32) {
        let line = Line {
            points: vec![
                (Point::new(Mm(x), Mm(self.geometry.to_pdf_y(top))), false),
                (Point::new(Mm(x), Mm(self.geometry.to_pdf_y(bottom))), false),
            ],
            is_closed: false,
        };
        layer.add_line(line);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ::image::{ImageFormat, Rgba, RgbaImage};

    fn report(no: &str) -> MaintenanceReport {
        MaintenanceReport {
            id: format!("REP-{}", no),
            notification_no: no.to_string(),
            ..Default::default()
        }
    }

    fn png_attachment(name: &str) -> Attachment {
        let mut pixels = RgbaImage::new(4, 3);
        pixels.put_pixel(0, 0, Rgba([255, 0, 0, 128]));
        let mut bytes = Vec::new();
        DynamicImage::ImageRgba8(pixels)
            .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
            .unwrap();
        Attachment {
            name: name.to_string(),
            mime_type: "image/png".to_string(),
            data: format!(
                "data:image/png;base64,{}",
                base64::engine::general_purpose::STANDARD.encode(&bytes)
            ),
        }
    }

    #[test]
    fn test_single_filename_uses_notification_no() {
        let today = NaiveDate::from_ymd_opt(2024, 5, 10).unwrap();
        assert_eq!(pdf_filename(&[report("10023")], today), "정비보고서_10023.pdf");
        assert_eq!(pdf_filename(&[report("A/B")], today), "정비보고서_A_B.pdf");
        assert_eq!(pdf_filename(&[report("")], today), "정비보고서_REP-.pdf");
    }

    #[test]
    fn test_batch_filename_uses_date() {
        let today = NaiveDate::from_ymd_opt(2024, 5, 10).unwrap();
        let reports = vec![report("1"), report("2")];
        assert_eq!(pdf_filename(&reports, today), "정비보고서_일괄다운로드_2024-05-10.pdf");
    }

    #[test]
    fn test_decode_photo_flattens_alpha() {
        let pixels = decode_photo(&png_attachment("a.png")).unwrap();
        assert_eq!(pixels.dimensions(), (4, 3));
        // 반투명 빨강 → 흰 바탕과 합성
        let [r, g, _] = pixels.get_pixel(0, 0).0;
        assert!(r >= 254);
        assert!(g > 100 && g < 160);
    }

    #[test]
    fn test_broken_photos_are_skipped() {
        let mut record = report("1");
        record.attachments = vec![
            png_attachment("ok-1.png"),
            Attachment {
                name: "broken.jpg".into(),
                mime_type: "image/jpeg".into(),
                data: "data:image/jpeg;base64,not-base64!!".into(),
            },
            Attachment {
                name: "manual.pdf".into(),
                mime_type: "application/pdf".into(),
                data: "JVBERi0=".into(),
            },
            png_attachment("ok-2.png"),
        ];

        assert_eq!(decode_photos(&record).len(), 2);
    }

    #[test]
    fn test_decode_error_is_image_insert() {
        let attachment = Attachment {
            name: "garbage.png".into(),
            mime_type: "image/png".into(),
            data: base64::engine::general_purpose::STANDARD.encode(b"not an image"),
        };
        assert!(matches!(decode_photo(&attachment), Err(ReportError::ImageInsert(_))));
    }

    #[test]
    fn test_empty_selection_is_render_error() {
        let font = GlyphAsset::new(vec![0, 1, 0, 0], "mem://font");
        let at = NaiveDate::from_ymd_opt(2024, 5, 10).unwrap().and_hms_opt(9, 0, 0).unwrap();
        assert!(matches!(render_with_font(&[], &font, at), Err(ReportError::Render(_))));
    }
}
