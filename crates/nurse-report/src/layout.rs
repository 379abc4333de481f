//! 页面排版
//!
//! 固定版式：纵向单文档、固定纸张尺寸、四边等宽页边距。超出一页的内容分页，
//! 不裁剪也不缩放。排版只处理打印介质可见的内容块。

use nurse_core::{Result, TriageError};
use serde::{Deserialize, Serialize};

use crate::view::{Block, Emphasis, Medium, ReportView};

/// 1 pt = 0.3528 mm
pub const PT_TO_MM: f32 = 0.3528;

/// Helvetica 平均字宽（相对字号）
const AVG_CHAR_WIDTH: f32 = 0.55;
const LINE_SPACING: f32 = 1.35;

const HEADING_SIZE: f32 = 13.0;
const BODY_SIZE: f32 = 10.0;
const BADGE_SIZE: f32 = 11.0;
const FOOTER_SIZE: f32 = 8.0;
const ITEM_INDENT_MM: f32 = 4.0;
const HEADING_GAP_MM: f32 = 4.0;

/// 纸张几何参数（毫米）
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PageGeometry {
    pub width_mm: f32,
    pub height_mm: f32,
    pub margin_mm: f32,
}

impl PageGeometry {
    /// A4 纵向，10mm 页边距
    pub fn a4() -> Self {
        Self {
            width_mm: 210.0,
            height_mm: 297.0,
            margin_mm: 10.0,
        }
    }

    pub fn printable_width(&self) -> f32 {
        self.width_mm - 2.0 * self.margin_mm
    }

    pub fn printable_height(&self) -> f32 {
        self.height_mm - 2.0 * self.margin_mm
    }

    pub fn validate(&self) -> Result<()> {
        if self.width_mm <= 0.0 || self.height_mm <= 0.0 {
            return Err(TriageError::Config("Page size must be positive".to_string()));
        }
        if self.margin_mm < 0.0 {
            return Err(TriageError::Config("Page margin cannot be negative".to_string()));
        }
        if self.printable_width() <= 0.0 || self.printable_height() <= 0.0 {
            return Err(TriageError::Config(
                "Page margins leave no printable area".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for PageGeometry {
    fn default() -> Self {
        Self::a4()
    }
}

/// 已定位的一行文本，坐标以页面左下角为原点
#[derive(Debug, Clone, PartialEq)]
pub struct PlacedLine {
    pub text: String,
    pub x_mm: f32,
    pub y_mm: f32,
    pub size_pt: f32,
    pub bold: bool,
    pub emphasis: Emphasis,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PageLayout {
    pub lines: Vec<PlacedLine>,
}

struct StyledLine {
    text: String,
    indent_mm: f32,
    size_pt: f32,
    bold: bool,
    emphasis: Emphasis,
    gap_before_mm: f32,
}

/// 对报告进行排版分页
pub fn layout_report(view: &ReportView, geometry: &PageGeometry) -> Result<Vec<PageLayout>> {
    geometry.validate()?;

    let top = geometry.height_mm - geometry.margin_mm;
    let bottom = geometry.margin_mm;

    let mut pages = vec![PageLayout::default()];
    let mut cursor = top;

    for line in styled_lines(view, geometry) {
        let line_height = line.size_pt * PT_TO_MM * LINE_SPACING;
        if line_height > geometry.printable_height() {
            return Err(TriageError::ExportFailed {
                reason: "Page is too short to hold a single line".to_string(),
            });
        }

        let page_is_empty = pages.last().map_or(true, |p| p.lines.is_empty());
        let gap = if page_is_empty { 0.0 } else { line.gap_before_mm };

        if cursor - gap - line_height < bottom {
            pages.push(PageLayout::default());
            cursor = top;
        } else {
            cursor -= gap;
        }

        // 基线位于行框顶部下方一个字号处
        let baseline = cursor - line.size_pt * PT_TO_MM;
        if let Some(page) = pages.last_mut() {
            page.lines.push(PlacedLine {
                text: line.text,
                x_mm: geometry.margin_mm + line.indent_mm,
                y_mm: baseline,
                size_pt: line.size_pt,
                bold: line.bold,
                emphasis: line.emphasis,
            });
        }
        cursor -= line_height;
    }

    tracing::debug!("Laid out report {} on {} page(s)", view.case_id, pages.len());
    Ok(pages)
}

fn styled_lines(view: &ReportView, geometry: &PageGeometry) -> Vec<StyledLine> {
    let mut lines = Vec::new();
    let width = geometry.printable_width();

    let mut push = |text: &str, indent_mm: f32, size_pt: f32, bold: bool, emphasis: Emphasis, gap: f32| {
        let max_chars = max_chars_for(width - indent_mm, size_pt);
        for (i, wrapped) in wrap_text(text, max_chars).into_iter().enumerate() {
            lines.push(StyledLine {
                text: wrapped,
                indent_mm,
                size_pt,
                bold,
                emphasis,
                gap_before_mm: if i == 0 { gap } else { 0.0 },
            });
        }
    };

    for block in view.visible_blocks(Medium::Print) {
        match block {
            Block::Heading(text) => {
                push(text, 0.0, HEADING_SIZE, true, Emphasis::Neutral, HEADING_GAP_MM)
            }
            Block::Field { label, value } => push(
                &format!("{}: {}", label, value),
                0.0,
                BODY_SIZE,
                false,
                Emphasis::Neutral,
                0.0,
            ),
            Block::Text(text) => push(text, 0.0, BODY_SIZE, false, Emphasis::Neutral, 0.0),
            Block::Badge { label, emphasis } => push(label, 0.0, BADGE_SIZE, true, *emphasis, 1.0),
            Block::Item { text, tag } => {
                let text = match tag {
                    Some(tag) => format!("- {} ({})", text, tag),
                    None => format!("- {}", text),
                };
                push(&text, ITEM_INDENT_MM, BODY_SIZE, false, Emphasis::Neutral, 0.0)
            }
            Block::Note(text) => push(text, 0.0, FOOTER_SIZE, false, Emphasis::Neutral, HEADING_GAP_MM),
            Block::Action(label) => push(label, 0.0, FOOTER_SIZE, false, Emphasis::Neutral, 0.0),
        }
    }

    lines
}

/// 给定宽度和字号下一行最多容纳的字符数
pub fn max_chars_for(width_mm: f32, size_pt: f32) -> usize {
    let char_width = size_pt * PT_TO_MM * AVG_CHAR_WIDTH;
    ((width_mm / char_width).floor() as usize).max(1)
}

/// 按单词换行，超长单词强制断开；保留原文中的换行
pub fn wrap_text(text: &str, max_chars: usize) -> Vec<String> {
    let max_chars = max_chars.max(1);
    let mut lines = Vec::new();

    for paragraph in text.lines() {
        let mut current = String::new();
        let mut current_len = 0;

        for word in paragraph.split_whitespace() {
            let mut word: Vec<char> = word.chars().collect();

            while word.len() > max_chars {
                if current_len > 0 {
                    lines.push(std::mem::take(&mut current));
                    current_len = 0;
                }
                let rest = word.split_off(max_chars);
                lines.push(word.into_iter().collect());
                word = rest;
            }

            if current_len > 0 && current_len + 1 + word.len() > max_chars {
                lines.push(std::mem::take(&mut current));
                current_len = 0;
            }
            if current_len > 0 {
                current.push(' ');
                current_len += 1;
            }
            current_len += word.len();
            current.extend(word);
        }

        if current_len > 0 || paragraph.trim().is_empty() {
            lines.push(current);
        }
    }

    if lines.is_empty() {
        lines.push(String::new());
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::view::{ReportNode, SectionRole, Visibility};

    fn long_view(paragraphs: usize) -> ReportView {
        let mut node = ReportNode::new(SectionRole::Justification)
            .block(Block::Heading("Justification".to_string()));
        for i in 0..paragraphs {
            node = node.block(Block::Text(format!(
                "Paragraph {} describing the clinical reasoning in enough words to wrap across the printable width of the page.",
                i
            )));
        }
        ReportView {
            case_id: 1,
            patient_name: "Ana".to_string(),
            title: "Triage Report #1".to_string(),
            nodes: vec![
                ReportNode::new(SectionRole::Chrome)
                    .with_visibility(Visibility::ScreenOnly)
                    .block(Block::Action("Export PDF".to_string())),
                node,
            ],
        }
    }

    #[test]
    fn test_wrap_text_respects_width() {
        let lines = wrap_text("uma frase com algumas palavras curtas", 10);
        assert!(lines.iter().all(|l| l.chars().count() <= 10));
        assert_eq!(lines.join(" "), "uma frase com algumas palavras curtas");

        let broken = wrap_text("Eletrocardiograma", 5);
        assert_eq!(broken, vec!["Eletr", "ocard", "iogra", "ma"]);

        assert_eq!(wrap_text("linha 1\nlinha 2", 80), vec!["linha 1", "linha 2"]);
        assert_eq!(wrap_text("", 80), vec![""]);
    }

    #[test]
    fn test_long_report_paginates_within_margins() {
        let geometry = PageGeometry::a4();
        let pages = layout_report(&long_view(120), &geometry).unwrap();
        assert!(pages.len() > 1);

        for page in &pages {
            assert!(!page.lines.is_empty());
            for line in &page.lines {
                assert!(line.y_mm >= geometry.margin_mm);
                assert!(line.y_mm <= geometry.height_mm - geometry.margin_mm);
                assert!(line.x_mm >= geometry.margin_mm);
            }
        }
    }

    #[test]
    fn test_short_report_fits_one_page() {
        let pages = layout_report(&long_view(2), &PageGeometry::a4()).unwrap();
        assert_eq!(pages.len(), 1);
        assert!(pages[0].lines.iter().all(|l| l.text != "Export PDF"));
    }

    #[test]
    fn test_geometry_validation() {
        assert!(PageGeometry::a4().validate().is_ok());
        let no_area = PageGeometry {
            margin_mm: 105.0,
            ..PageGeometry::a4()
        };
        assert!(no_area.validate().is_err());
    }
}
