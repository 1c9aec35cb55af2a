//! Study space storage operations

use rusqlite::{params, Connection, Row};
use tracing::instrument;
use uuid::Uuid;

use super::parse::{parse_space_type, parse_uuid, OptionalExt};
use crate::error::Result;
use crate::models::StudySpace;

pub struct SpaceStore<'a> {
    conn: &'a Connection,
}

impl<'a> SpaceStore<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    /// Insert a space
    #[instrument(skip(self, space), fields(name = %space.name))]
    pub fn create(&self, space: &StudySpace) -> Result<()> {
        self.conn.execute(
            "INSERT INTO study_spaces (id, name, location, capacity, type) VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                space.id.to_string(),
                space.name,
                space.location,
                space.capacity,
                space.space_type.as_str(),
            ],
        )?;
        Ok(())
    }

    #[instrument(skip(self))]
    pub fn find_by_id(&self, id: Uuid) -> Result<Option<StudySpace>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, name, location, capacity, type FROM study_spaces WHERE id = ?1",
        )?;

        let space = stmt
            .query_row(params![id.to_string()], map_space)
            .optional()?;

        Ok(space)
    }

    /// All spaces in insertion order
    pub fn list(&self) -> Result<Vec<StudySpace>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, name, location, capacity, type FROM study_spaces ORDER BY rowid",
        )?;

        let spaces = stmt
            .query_map([], map_space)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(spaces)
    }

    pub fn count(&self) -> Result<u64> {
        let count: i64 =
            self.conn
                .query_row("SELECT COUNT(*) FROM study_spaces", [], |row| row.get(0))?;
        Ok(count as u64)
    }
}

fn map_space(row: &Row<'_>) -> rusqlite::Result<StudySpace> {
    Ok(StudySpace {
        id: parse_uuid(&row.get::<_, String>(0)?)?,
        name: row.get(1)?,
        location: row.get(2)?,
        capacity: row.get(3)?,
        space_type: parse_space_type(&row.get::<_, String>(4)?)?,
    })
}
