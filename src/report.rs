use chrono::{DateTime, Local};
use std::fs;
use std::path::Path;

use crate::db::{BackfilledValue, WEATHER_DATE_FORMAT};

const REPORT_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.6f";

/// Plain-text summary of one backfill run
#[derive(Debug, Clone)]
pub struct BackfillReport {
    pub title: String,
    pub started_at: DateTime<Local>,
    pub entries: Vec<BackfilledValue>,
    pub finished_at: DateTime<Local>,
}

impl BackfillReport {
    /// Render the report:
    ///
    /// ```text
    /// Irradiance
    /// Start (ET): 2020-02-02 11:00:00.000000
    /// 7,2020-02-02 10:00:00,200.1
    /// End (ET): 2020-02-02 11:00:01.000000
    /// ```
    pub fn render(&self) -> String {
        let mut out = String::new();
        out.push_str(&self.title);
        out.push('\n');
        out.push_str(&format!(
            "Start (ET): {}\n",
            self.started_at.format(REPORT_TIME_FORMAT)
        ));
        // Values use the shortest form that parses back to the stored f64, not
        // a fixed 12 significant digits; long fractions print in full.
        for entry in &self.entries {
            out.push_str(&format!(
                "{},{},{}\n",
                entry.id,
                entry.date.format(WEATHER_DATE_FORMAT),
                entry.value
            ));
        }
        out.push_str(&format!(
            "End (ET): {}\n",
            self.finished_at.format(REPORT_TIME_FORMAT)
        ));
        out
    }

    /// Write the report, replacing any existing file at `path`
    pub fn write_to(&self, path: impl AsRef<Path>) -> std::io::Result<()> {
        fs::write(path, self.render())
    }
}
