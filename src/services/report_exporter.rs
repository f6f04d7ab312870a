use std::{fs, path::PathBuf};
use crate::errors::ReportError;
use crate::models::ProjectRecord;
use crate::pdf::{Align, TextDocument};

/// Writes the one-page project summary into the project's artifact directory.
#[derive(Clone)]
pub struct ReportExporter {
    projects_dir: PathBuf,
    currency_label: String,
    file_name: String,
}

impl ReportExporter {
    pub fn new(projects_dir: impl Into<PathBuf>, currency_label: impl Into<String>, file_name: impl Into<String>) -> Self {
        Self {
            projects_dir: projects_dir.into(),
            currency_label: currency_label.into(),
            file_name: file_name.into(),
        }
    }

    pub fn report_path(&self, project_name: &str) -> PathBuf {
        self.projects_dir.join(project_name).join(&self.file_name)
    }

    /// Text rows of the report, title first.
    pub fn report_lines(&self, project: &ProjectRecord) -> Vec<String> {
        let mut lines = vec![
            format!("Project Report: {}", project.client),
            String::new(),
            format!("Project Name: {}", project.name),
            format!("Contract Value: {}", format_money(&self.currency_label, project.contract_value)),
            format!("Location: {}", project.location),
            format!("Start Date: {}", project.start_date),
            format!("End Date: {}", project.end_date),
            "Progress: ".to_string(),
        ];
        lines.extend(
            project
                .progress
                .iter()
                .map(|(element, percent)| format!("{}: {}%", element, percent)),
        );
        lines
    }

    pub fn render(&self, project: &ProjectRecord) -> Vec<u8> {
        let mut document = TextDocument::new();
        for (index, line) in self.report_lines(project).into_iter().enumerate() {
            if line.is_empty() {
                document.blank();
                continue;
            }
            let align = if index == 0 { Align::Center } else { Align::Left };
            document.line(line, align);
        }
        document.render()
    }

    /// Renders and writes the report, returning where it was written.
    pub fn export(&self, project: &ProjectRecord) -> Result<PathBuf, ReportError> {
        let path = self.report_path(&project.name);
        let io_error = |source: std::io::Error| ReportError::Io {
            path: path.clone(),
            source,
        };

        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir).map_err(io_error)?;
        }
        fs::write(&path, self.render(project)).map_err(io_error)?;

        tracing::info!("Exported report for {} to {}", project.name, path.display());
        Ok(path)
    }
}

/// Fixed-point amount with a currency label, e.g. `RM 150000.00`.
pub fn format_money(currency_label: &str, amount: f64) -> String {
    format!("{} {:.2}", currency_label, amount)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::NewProject;
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    fn project() -> ProjectRecord {
        let mut record = ProjectRecord::new(NewProject {
            name: "Tower A".into(),
            client: "AcmeCo".into(),
            contract_value: 150000.0,
            location: "KL".into(),
            start_date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            end_date: NaiveDate::from_ymd_opt(2024, 12, 31).unwrap(),
        });
        record.progress.set("Piling".into(), 100.0);
        record.progress.set("Roofing".into(), 12.5);
        record
    }

    #[test]
    fn test_report_lines() {
        let exporter = ReportExporter::new("projects", "RM", "project_report.pdf");
        assert_eq!(
            exporter.report_lines(&project()),
            vec![
                "Project Report: AcmeCo",
                "",
                "Project Name: Tower A",
                "Contract Value: RM 150000.00",
                "Location: KL",
                "Start Date: 2024-01-01",
                "End Date: 2024-12-31",
                "Progress: ",
                "Piling: 100%",
                "Roofing: 12.5%",
            ]
        );
    }

    #[test]
    fn test_format_money() {
        assert_eq!(format_money("RM", 0.0), "RM 0.00");
        assert_eq!(format_money("RM", 1234.5), "RM 1234.50");
        assert_eq!(format_money("USD", 99.99), "USD 99.99");
    }

    #[test]
    fn test_export_writes_into_project_directory() {
        let dir = TempDir::new().unwrap();
        let exporter = ReportExporter::new(dir.path(), "RM", "project_report.pdf");

        let path = exporter.export(&project()).unwrap();

        assert_eq!(path, dir.path().join("Tower A").join("project_report.pdf"));
        let bytes = fs::read(&path).unwrap();
        assert!(bytes.starts_with(b"%PDF-"));
        let text = String::from_utf8_lossy(&bytes);
        assert!(text.contains("(Project Name: Tower A) Tj"));
        assert!(text.contains("(Roofing: 12.5%) Tj"));
    }

    #[test]
    fn test_render_leaves_spacer_row_after_title() {
        let exporter = ReportExporter::new("projects", "RM", "project_report.pdf");
        let bytes = exporter.render(&project());
        let text = String::from_utf8_lossy(&bytes);

        // Title on row 0, "Project Name" on row 2; row 1 draws nothing
        let rows: Vec<&str> = text.lines().filter(|line| line.ends_with(" Tj")).collect();
        assert_eq!(rows.len(), 9);
        assert!(rows[0].ends_with("(Project Report: AcmeCo) Tj"));
        assert!(rows[1].ends_with("(Project Name: Tower A) Tj"));
        let y = |row: &str| -> f32 { row.split_whitespace().nth(5).unwrap().parse().unwrap() };
        let gap = y(rows[0]) - y(rows[1]);
        assert!((gap - 2.0 * 28.35).abs() < 0.05, "gap {}", gap);
    }
}
