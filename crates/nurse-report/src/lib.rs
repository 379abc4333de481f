//! # Nurse Assist 报告模块
//!
//! 临床报告的渲染与导出：
//! - 从病例和 AI 分析结果生成报告视图树
//! - 终端文本渲染与 PDF 导出共用同一棵树
//! - A4 纵向固定版式，长报告自动分页

pub mod export;
pub mod layout;
pub mod render;
pub mod view;

pub use export::{export_file_name, export_report, ExportOptions, ExportedReport};
pub use layout::{layout_report, PageGeometry};
pub use render::{render_report, render_text, RenderOptions};
pub use view::{Block, Emphasis, Medium, ReportNode, ReportView, SectionRole, Visibility};
