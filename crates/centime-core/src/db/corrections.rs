//! Correction store operations
//!
//! A correction maps a normalized transaction label to a user-confirmed
//! category. Last write wins; corrections are only deleted on explicit
//! user request, never automatically.

use rusqlite::{params, OptionalExtension};

use super::{parse_datetime, Database};
use crate::error::{Error, Result};
use crate::models::Correction;

/// Normalize a label into a correction lookup key
///
/// Trim, uppercase, and collapse internal whitespace so that minor
/// formatting differences between statements still hit the same key.
pub fn normalize_label(label: &str) -> String {
    label
        .trim()
        .to_uppercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

impl Database {
    /// Insert or overwrite the correction for a label
    ///
    /// Returns the row id of the stored correction.
    pub fn upsert_correction(&self, label: &str, category: &str, confidence: f64) -> Result<i64> {
        let key = normalize_label(label);
        if key.is_empty() {
            return Err(Error::InvalidData(
                "Cannot store a correction for a blank label".to_string(),
            ));
        }

        let conn = self.conn()?;
        conn.execute(
            r#"
            INSERT INTO corrections (label_key, category, confidence)
            VALUES (?, ?, ?)
            ON CONFLICT(label_key) DO UPDATE SET
                category = excluded.category,
                confidence = excluded.confidence,
                updated_at = CURRENT_TIMESTAMP
            "#,
            params![key, category, confidence],
        )?;

        let id: i64 = conn.query_row(
            "SELECT id FROM corrections WHERE label_key = ?",
            params![key],
            |row| row.get(0),
        )?;
        Ok(id)
    }

    /// Find the correction for a label, if any
    pub fn get_correction(&self, label: &str) -> Result<Option<Correction>> {
        let key = normalize_label(label);
        if key.is_empty() {
            return Ok(None);
        }

        let conn = self.conn()?;
        conn.query_row(
            r#"
            SELECT id, label_key, category, confidence, created_at, updated_at
            FROM corrections
            WHERE label_key = ?
            "#,
            params![key],
            |row| {
                let created_at: String = row.get(4)?;
                let updated_at: String = row.get(5)?;
                Ok(Correction {
                    id: row.get(0)?,
                    label_key: row.get(1)?,
                    category: row.get(2)?,
                    confidence: row.get(3)?,
                    created_at: parse_datetime(&created_at),
                    updated_at: parse_datetime(&updated_at),
                })
            },
        )
        .optional()
        .map_err(|e| e.into())
    }

    /// List stored corrections, most recently updated first
    pub fn list_corrections(&self, limit: i64) -> Result<Vec<Correction>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT id, label_key, category, confidence, created_at, updated_at
            FROM corrections
            ORDER BY updated_at DESC, id DESC
            LIMIT ?
            "#,
        )?;

        let rows = stmt.query_map(params![limit], |row| {
            let created_at: String = row.get(4)?;
            let updated_at: String = row.get(5)?;
            Ok(Correction {
                id: row.get(0)?,
                label_key: row.get(1)?,
                category: row.get(2)?,
                confidence: row.get(3)?,
                created_at: parse_datetime(&created_at),
                updated_at: parse_datetime(&updated_at),
            })
        })?;

        let mut corrections = Vec::new();
        for row in rows {
            corrections.push(row?);
        }
        Ok(corrections)
    }

    /// Delete a correction (explicit user action only)
    pub fn delete_correction(&self, id: i64) -> Result<()> {
        let conn = self.conn()?;
        let affected = conn.execute("DELETE FROM corrections WHERE id = ?", params![id])?;
        if affected == 0 {
            return Err(Error::NotFound(format!("Correction {} not found", id)));
        }
        Ok(())
    }
}
