//! Noise report storage operations

use rusqlite::{params, Connection, Row};
use tracing::instrument;
use uuid::Uuid;

use super::parse::{format_datetime, parse_datetime, parse_uuid, OptionalExt};
use crate::error::Result;
use crate::models::{NoiseReport, NoiseReportDetails};

const REPORT_DETAILS: &str = "SELECT n.id, n.user_id, n.space_id, n.description, n.timestamp, u.email, s.name
     FROM noise_reports n
     INNER JOIN users u ON u.id = n.user_id
     INNER JOIN study_spaces s ON s.id = n.space_id";

pub struct NoiseReportStore<'a> {
    conn: &'a Connection,
}

impl<'a> NoiseReportStore<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    #[instrument(skip(self, report), fields(report_id = %report.id, space_id = %report.space_id))]
    pub fn create(&self, report: &NoiseReport) -> Result<()> {
        self.conn.execute(
            "INSERT INTO noise_reports (id, user_id, space_id, description, timestamp)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                report.id.to_string(),
                report.user_id.to_string(),
                report.space_id.to_string(),
                report.description,
                format_datetime(&report.timestamp),
            ],
        )?;
        Ok(())
    }

    #[instrument(skip(self))]
    pub fn find_details(&self, id: Uuid) -> Result<Option<NoiseReportDetails>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{REPORT_DETAILS} WHERE n.id = ?1"))?;

        let report = stmt
            .query_row(params![id.to_string()], map_details)
            .optional()?;

        Ok(report)
    }

    /// All reports, newest first
    pub fn list_details(&self) -> Result<Vec<NoiseReportDetails>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{REPORT_DETAILS} ORDER BY n.timestamp DESC"))?;

        let reports = stmt
            .query_map([], map_details)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(reports)
    }

    /// Reports filed against one space, newest first
    #[instrument(skip(self))]
    pub fn list_details_for_space(&self, space_id: Uuid) -> Result<Vec<NoiseReportDetails>> {
        let mut stmt = self.conn.prepare(&format!(
            "{REPORT_DETAILS} WHERE n.space_id = ?1 ORDER BY n.timestamp DESC"
        ))?;

        let reports = stmt
            .query_map(params![space_id.to_string()], map_details)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(reports)
    }
}

fn map_details(row: &Row<'_>) -> rusqlite::Result<NoiseReportDetails> {
    Ok(NoiseReportDetails {
        report: NoiseReport {
            id: parse_uuid(&row.get::<_, String>(0)?)?,
            user_id: parse_uuid(&row.get::<_, String>(1)?)?,
            space_id: parse_uuid(&row.get::<_, String>(2)?)?,
            description: row.get(3)?,
            timestamp: parse_datetime(&row.get::<_, String>(4)?)?,
        },
        user_email: row.get(5)?,
        space_name: row.get(6)?,
    })
}
