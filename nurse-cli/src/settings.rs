//! 配置到报告选项的映射

use chrono::NaiveDate;
use nurse_admin::config::ReportConfig;
use nurse_report::{ExportOptions, PageGeometry, RenderOptions};

pub fn render_options(report: &ReportConfig, today: NaiveDate) -> RenderOptions {
    RenderOptions {
        date_format: report.date_format.clone(),
        app_name: report.app_name.clone(),
        today,
    }
}

pub fn export_options(report: &ReportConfig) -> ExportOptions {
    ExportOptions {
        file_prefix: report.file_prefix.clone(),
        geometry: PageGeometry {
            width_mm: report.page_width_mm,
            height_mm: report.page_height_mm,
            margin_mm: report.margin_mm,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_map_to_a4() {
        let report = ReportConfig::default();
        let options = export_options(&report);
        assert_eq!(options.geometry, PageGeometry::a4());
        assert_eq!(options.file_prefix, "Relatorio_Medico");

        let today = NaiveDate::from_ymd_opt(2025, 11, 5).unwrap();
        let render = render_options(&report, today);
        assert_eq!(render.date_format, "%d/%m/%Y");
        assert_eq!(render.today, today);
    }
}
