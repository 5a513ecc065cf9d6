use std::path::Path;

use rusqlite::Connection;

use crate::error::Result;
use crate::report::Report;

pub fn connect(path: &Path) -> Result<Connection> {
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        std::fs::create_dir_all(dir)?;
    }
    let conn = Connection::open(path)?;
    conn.execute_batch("PRAGMA journal_mode=WAL;")?;
    Ok(conn)
}

pub fn init_schema(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS reports (
            id         INTEGER PRIMARY KEY,
            query      TEXT NOT NULL,
            origin     TEXT NOT NULL,
            body       TEXT NOT NULL,
            created_at TEXT NOT NULL DEFAULT (datetime('now'))
        );
        CREATE INDEX IF NOT EXISTS idx_reports_query ON reports(query);
        ",
    )?;
    Ok(())
}

// ── Writing ──

pub fn save_reports(conn: &Connection, reports: &[Report]) -> Result<usize> {
    let tx = conn.unchecked_transaction()?;
    let mut count = 0;
    {
        let mut stmt = tx.prepare("INSERT INTO reports (query, origin, body) VALUES (?1, ?2, ?3)")?;
        for report in reports {
            let body = serde_json::to_string(report)?;
            count += stmt.execute(rusqlite::params![report.query(), report.origin().as_str(), body])?;
        }
    }
    tx.commit()?;
    Ok(count)
}

pub fn replace_body(conn: &Connection, id: i64, report: &Report) -> Result<()> {
    let body = serde_json::to_string(report)?;
    conn.execute(
        "UPDATE reports SET query = ?1, origin = ?2, body = ?3 WHERE id = ?4",
        rusqlite::params![report.query(), report.origin().as_str(), body, id],
    )?;
    Ok(())
}

// ── Reading ──

pub struct ReportSummary {
    pub id: i64,
    pub query: String,
    pub origin: String,
    pub created_at: String,
}

pub fn fetch_summaries(conn: &Connection, limit: usize) -> Result<Vec<ReportSummary>> {
    let mut stmt = conn.prepare("SELECT id, query, origin, created_at FROM reports ORDER BY id DESC LIMIT ?1")?;
    let rows = stmt
        .query_map([limit as i64], |row| {
            Ok(ReportSummary {
                id: row.get(0)?,
                query: row.get(1)?,
                origin: row.get(2)?,
                created_at: row.get(3)?,
            })
        })?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(rows)
}

/// Raw stored bodies; callers decide how to read them.
pub struct StoredReport {
    pub id: i64,
    pub body: String,
}

pub fn fetch_bodies(conn: &Connection) -> Result<Vec<StoredReport>> {
    let mut stmt = conn.prepare("SELECT id, body FROM reports ORDER BY id")?;
    let rows = stmt
        .query_map([], |row| {
            Ok(StoredReport {
                id: row.get(0)?,
                body: row.get(1)?,
            })
        })?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::{Origin, ReportBuilder};

    fn memory() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        init_schema(&conn).unwrap();
        conn
    }

    #[test]
    fn save_and_list() {
        let conn = memory();
        let a = ReportBuilder::new("first", Origin::Analysis).build();
        let b = ReportBuilder::new("second", Origin::Fallback).build();
        assert_eq!(save_reports(&conn, &[a, b]).unwrap(), 2);

        let rows = fetch_summaries(&conn, 10).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].query, "second");
        assert_eq!(rows[0].origin, "fallback");
        assert!(!rows[1].created_at.is_empty());

        assert_eq!(fetch_summaries(&conn, 1).unwrap().len(), 1);
    }

    #[test]
    fn bodies_round_trip_through_json() {
        let conn = memory();
        let mut b = ReportBuilder::new("q", Origin::Analysis);
        b.add_source("https://a.example", 80, "press", 2);
        let report = b.build();
        save_reports(&conn, std::slice::from_ref(&report)).unwrap();

        let stored = fetch_bodies(&conn).unwrap();
        let back: Report = serde_json::from_str(&stored[0].body).unwrap();
        assert_eq!(back, report);
    }

    #[test]
    fn replace_updates_row() {
        let conn = memory();
        save_reports(&conn, &[ReportBuilder::new("old", Origin::Analysis).build()]).unwrap();
        let id = fetch_bodies(&conn).unwrap()[0].id;
        replace_body(&conn, id, &ReportBuilder::new("new", Origin::Imported).build()).unwrap();

        let rows = fetch_summaries(&conn, 10).unwrap();
        assert_eq!(rows[0].query, "new");
        assert_eq!(rows[0].origin, "imported");
    }

    #[test]
    fn connect_creates_parent_dir() {
        let dir = std::env::temp_dir().join(format!("research_report_db_{}", std::process::id()));
        let path = dir.join("nested").join("reports.sqlite");
        let conn = connect(&path).unwrap();
        init_schema(&conn).unwrap();
        assert!(path.exists());
        drop(conn);
        let _ = std::fs::remove_dir_all(&dir);
    }
}
