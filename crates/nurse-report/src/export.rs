//! PDF 导出
//!
//! 输入是已经渲染好的 [`ReportView`]，不会重新请求病例。仅屏幕可见的节点在排版阶段
//! 已被排除。任何生成失败都映射为 `ExportFailed`，报告本身仍可在屏幕上查看。

use printpdf::{BuiltinFont, Color, IndirectFontRef, Mm, PdfDocument, Rgb};
use regex::Regex;
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use nurse_core::{Result, TriageError};

use crate::layout::{layout_report, PageGeometry, PageLayout};
use crate::view::{Emphasis, ReportView};

pub const DEFAULT_FILE_PREFIX: &str = "Relatorio_Medico";

/// 导出选项
#[derive(Debug, Clone)]
pub struct ExportOptions {
    pub file_prefix: String,
    pub geometry: PageGeometry,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            file_prefix: DEFAULT_FILE_PREFIX.to_string(),
            geometry: PageGeometry::a4(),
        }
    }
}

/// 导出结果
#[derive(Debug, Clone)]
pub struct ExportedReport {
    /// 不含扩展名
    pub file_name: String,
    pub bytes: Vec<u8>,
    pub page_count: usize,
}

impl ExportedReport {
    pub fn file_name_with_extension(&self) -> String {
        format!("{}.pdf", self.file_name)
    }

    /// 写入目录，返回文件路径
    pub fn save_in(&self, dir: &Path) -> Result<PathBuf> {
        std::fs::create_dir_all(dir).map_err(|e| TriageError::ExportFailed {
            reason: format!("Cannot create {}: {}", dir.display(), e),
        })?;

        let path = dir.join(self.file_name_with_extension());
        std::fs::write(&path, &self.bytes).map_err(|e| TriageError::ExportFailed {
            reason: format!("Cannot write {}: {}", path.display(), e),
        })?;

        tracing::info!("Saved report to {}", path.display());
        Ok(path)
    }
}

fn separator_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"[^\p{L}\p{N}-]+").expect("file name pattern is valid"))
}

/// 由患者姓名生成导出文件名（不含扩展名）
///
/// 连续的空白或标点折叠为一个下划线，例如 "Ana   Oliveira-Reis" 得到
/// `Relatorio_Medico_Ana_Oliveira-Reis`。
pub fn export_file_name(prefix: &str, patient_name: &str) -> String {
    let collapsed = separator_pattern().replace_all(patient_name.trim(), "_");
    let collapsed = collapsed.trim_matches('_');
    if collapsed.is_empty() {
        prefix.to_string()
    } else {
        format!("{}_{}", prefix, collapsed)
    }
}

/// 把报告导出为 PDF
pub fn export_report(
    view: &ReportView,
    file_name_hint: &str,
    options: &ExportOptions,
) -> Result<ExportedReport> {
    let pages = layout_report(view, &options.geometry).map_err(|e| match e {
        TriageError::ExportFailed { .. } => e,
        other => TriageError::ExportFailed {
            reason: other.to_string(),
        },
    })?;

    let bytes = write_pdf(&view.title, &pages, &options.geometry)?;
    let file_name = export_file_name(&options.file_prefix, file_name_hint);

    tracing::info!(
        "Exported report for case {} ({} page(s), {} bytes)",
        view.case_id,
        pages.len(),
        bytes.len()
    );
    Ok(ExportedReport {
        file_name,
        bytes,
        page_count: pages.len(),
    })
}

fn export_error(context: &str, e: impl std::fmt::Display) -> TriageError {
    TriageError::ExportFailed {
        reason: format!("{}: {}", context, e),
    }
}

/// 内置字体只能可靠编码 Latin-1 字符
///
/// 常见排版符号折叠为 ASCII 近似，其余字符替换为 `?`，避免在 PDF 中变成乱码或被丢弃。
pub fn pdf_text(text: &str) -> String {
    text.chars()
        .map(|c| match c {
            '\u{2022}' | '\u{2013}' | '\u{2014}' | '\u{2212}' => '-',
            '\u{2018}' | '\u{2019}' => '\'',
            '\u{201C}' | '\u{201D}' => '"',
            '\n' | '\t' => ' ',
            ' '..='~' | '\u{A0}'..='\u{FF}' => c,
            _ => '?',
        })
        .collect()
}

fn emphasis_color(emphasis: Emphasis) -> Color {
    match emphasis {
        Emphasis::Strong => Color::Rgb(Rgb::new(0.75, 0.1, 0.1, None)),
        Emphasis::Moderate => Color::Rgb(Rgb::new(0.8, 0.5, 0.0, None)),
        Emphasis::Neutral => Color::Rgb(Rgb::new(0.0, 0.0, 0.0, None)),
    }
}

fn write_pdf(title: &str, pages: &[PageLayout], geometry: &PageGeometry) -> Result<Vec<u8>> {
    let width = Mm(geometry.width_mm);
    let height = Mm(geometry.height_mm);
    let (doc, first_page, first_layer) = PdfDocument::new(title, width, height, "Layer 1");

    let font: IndirectFontRef = doc
        .add_builtin_font(BuiltinFont::Helvetica)
        .map_err(|e| export_error("PDF font error", e))?;
    let bold: IndirectFontRef = doc
        .add_builtin_font(BuiltinFont::HelveticaBold)
        .map_err(|e| export_error("PDF font error", e))?;

    for (index, page) in pages.iter().enumerate() {
        let (page_index, layer_index) = if index == 0 {
            (first_page, first_layer)
        } else {
            doc.add_page(width, height, format!("Layer {}", index + 1))
        };
        let layer = doc.get_page(page_index).get_layer(layer_index);

        for line in &page.lines {
            layer.set_fill_color(emphasis_color(line.emphasis));
            let face = if line.bold { &bold } else { &font };
            layer.use_text(pdf_text(&line.text), line.size_pt, Mm(line.x_mm), Mm(line.y_mm), face);
        }
    }

    let mut buf = BufWriter::new(Vec::new());
    doc.save(&mut buf)
        .map_err(|e| export_error("PDF save error", e))?;
    buf.into_inner()
        .map_err(|e| export_error("PDF buffer error", e))
}
