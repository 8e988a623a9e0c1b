//! SQLite-backed learning store.

use chrono::{DateTime, Datelike, Duration, SecondsFormat, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row, TransactionBehavior};
use std::collections::HashSet;
use std::path::Path;
use std::sync::{Mutex, MutexGuard};
use uuid::Uuid;

use super::{CatalogStore, PlanStore, ProgressStore, ProgressTransaction, SettingsStore};
use crate::config::PlanOrdering;
use crate::error::{LexisError, LexisResult};
use crate::types::{
    CandidateOrder, DailyPlan, Difficulty, LexicalItem, NewLexicalItem, PlanProgress, Progress,
    Sense, SenseCandidate, SenseSummary,
};

const SENSE_COLUMNS: &str = "s.id, s.item_id, s.part_of_speech, s.definition, \
     s.example_sentence, s.example_translation, s.unit, s.difficulty";

const SUMMARY_COLUMNS: &str = "s.id, s.item_id, i.lemma, s.part_of_speech, s.definition, s.unit";

const PROGRESS_COLUMNS: &str = "learner_id, sense_id, stage, memory_half_life, review_count, \
     last_recall_success, optimal_interval, last_reviewed_at, next_review_at, \
     review_history, recall_history";

/// Deterministic per-seed shuffle of sense ids (Knuth multiplicative hash).
const SHUFFLE_KEY: &str = "((s.id * 2654435761 + :seed) % 4294967296)";

/// SQLite store for catalog, progress, plans, and settings.
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    /// Open (or create) a database file.
    pub fn new(path: impl AsRef<Path>) -> LexisResult<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let conn = Connection::open(path)
            .map_err(|e| LexisError::connection(format!("{}: {}", path.display(), e)))?;
        let store = Self {
            conn: Mutex::new(conn),
        };
        store.init_schema()?;
        Ok(store)
    }

    /// Create an in-memory store (for testing).
    pub fn in_memory() -> LexisResult<Self> {
        let conn = Connection::open_in_memory()?;
        let store = Self {
            conn: Mutex::new(conn),
        };
        store.init_schema()?;
        Ok(store)
    }

    fn lock(&self) -> LexisResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| LexisError::database(e.to_string()))
    }

    fn init_schema(&self) -> LexisResult<()> {
        let conn = self.lock()?;
        conn.execute_batch(
            r#"
            PRAGMA foreign_keys = ON;

            CREATE TABLE IF NOT EXISTS lexical_items (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                lemma TEXT NOT NULL,
                source TEXT,
                difficulty REAL
            );

            CREATE INDEX IF NOT EXISTS idx_items_source ON lexical_items(source);

            CREATE TABLE IF NOT EXISTS senses (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                item_id INTEGER NOT NULL REFERENCES lexical_items(id),
                part_of_speech TEXT NOT NULL DEFAULT '',
                definition TEXT NOT NULL,
                example_sentence TEXT NOT NULL DEFAULT '',
                example_translation TEXT,
                unit TEXT,
                difficulty REAL
            );

            CREATE INDEX IF NOT EXISTS idx_senses_item ON senses(item_id);

            CREATE TABLE IF NOT EXISTS progress (
                learner_id TEXT NOT NULL,
                sense_id INTEGER NOT NULL REFERENCES senses(id),
                stage INTEGER NOT NULL DEFAULT 0 CHECK (stage >= 0),
                memory_half_life REAL NOT NULL,
                review_count INTEGER NOT NULL DEFAULT 0,
                last_recall_success INTEGER NOT NULL DEFAULT 0,
                optimal_interval REAL NOT NULL DEFAULT 0,
                last_reviewed_at TEXT,
                next_review_at TEXT,
                review_history TEXT NOT NULL DEFAULT '[]',
                recall_history TEXT NOT NULL DEFAULT '[]',
                PRIMARY KEY (learner_id, sense_id)
            );

            CREATE INDEX IF NOT EXISTS idx_progress_due ON progress(learner_id, next_review_at);

            CREATE TABLE IF NOT EXISTS daily_plans (
                id TEXT PRIMARY KEY,
                learner_id TEXT NOT NULL,
                created_at TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_plans_learner ON daily_plans(learner_id, created_at);

            CREATE TABLE IF NOT EXISTS daily_plan_items (
                plan_id TEXT NOT NULL REFERENCES daily_plans(id),
                sense_id INTEGER NOT NULL REFERENCES senses(id),
                PRIMARY KEY (plan_id, sense_id)
            );

            CREATE TABLE IF NOT EXISTS settings (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL,
                updated_at TEXT NOT NULL
            );
        "#,
        )?;
        Ok(())
    }
}

/// Fixed-width UTC timestamp so text order matches time order.
fn format_ts(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Micros, true)
}

/// [`format_ts`] for values persisted from callers; rejects years outside 0000-9999.
fn storable_ts(at: DateTime<Utc>) -> LexisResult<String> {
    if !(0..=9999).contains(&at.year()) {
        return Err(LexisError::schedule_out_of_range(format!(
            "{} cannot be stored",
            at
        )));
    }
    Ok(format_ts(at))
}

fn parse_ts(raw: &str) -> LexisResult<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| LexisError::timestamp(format!("'{}': {}", raw, e)))
}

fn parse_uuid(raw: &str) -> LexisResult<Uuid> {
    Uuid::parse_str(raw).map_err(|e| LexisError::parse(e.to_string()))
}

fn row_to_sense(row: &Row<'_>) -> rusqlite::Result<Sense> {
    Ok(Sense {
        id: row.get(0)?,
        item_id: row.get(1)?,
        part_of_speech: row.get(2)?,
        definition: row.get(3)?,
        example_sentence: row.get(4)?,
        example_translation: row.get(5)?,
        unit: row.get(6)?,
        difficulty: row.get(7)?,
    })
}

fn row_to_candidate(row: &Row<'_>) -> rusqlite::Result<SenseCandidate> {
    Ok(SenseCandidate {
        sense: row_to_sense(row)?,
        lemma: row.get(8)?,
    })
}

fn row_to_summary(row: &Row<'_>) -> rusqlite::Result<SenseSummary> {
    Ok(SenseSummary {
        sense_id: row.get(0)?,
        item_id: row.get(1)?,
        lemma: row.get(2)?,
        part_of_speech: row.get(3)?,
        definition: row.get(4)?,
        unit: row.get(5)?,
    })
}

fn row_to_progress(row: &Row<'_>) -> LexisResult<Progress> {
    let learner_id: String = row.get(0)?;
    let last_reviewed_at: Option<String> = row.get(7)?;
    let next_review_at: Option<String> = row.get(8)?;
    let review_history: String = row.get(9)?;
    let recall_history: String = row.get(10)?;

    Ok(Progress {
        learner_id: parse_uuid(&learner_id)?,
        sense_id: row.get(1)?,
        stage: row.get(2)?,
        memory_half_life: row.get(3)?,
        review_count: row.get(4)?,
        last_recall_success: row.get::<_, i32>(5)? != 0,
        optimal_interval: row.get(6)?,
        last_reviewed_at: last_reviewed_at.as_deref().map(parse_ts).transpose()?,
        next_review_at: next_review_at.as_deref().map(parse_ts).transpose()?,
        review_history: serde_json::from_str(&review_history)?,
        recall_history: serde_json::from_str(&recall_history)?,
    })
}

fn load_progress(conn: &Connection, learner_id: Uuid, sense_id: i64) -> LexisResult<Option<Progress>> {
    let sql = format!(
        "SELECT {} FROM progress WHERE learner_id = ?1 AND sense_id = ?2",
        PROGRESS_COLUMNS
    );
    conn.query_row(&sql, params![learner_id.to_string(), sense_id], |row| {
        Ok(row_to_progress(row))
    })
    .optional()?
    .transpose()
}

fn write_progress(conn: &Connection, progress: &Progress) -> LexisResult<()> {
    let sql = format!(
        "INSERT OR REPLACE INTO progress ({}) \
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
        PROGRESS_COLUMNS
    );
    conn.execute(
        &sql,
        params![
            progress.learner_id.to_string(),
            progress.sense_id,
            progress.stage,
            progress.memory_half_life,
            progress.review_count,
            progress.last_recall_success as i32,
            progress.optimal_interval,
            progress.last_reviewed_at.map(storable_ts).transpose()?,
            progress.next_review_at.map(storable_ts).transpose()?,
            serde_json::to_string(&progress.review_history)?,
            serde_json::to_string(&progress.recall_history)?,
        ],
    )?;
    Ok(())
}

fn load_difficulty(conn: &Connection, sense_id: i64) -> LexisResult<Option<Difficulty>> {
    let difficulty = conn
        .query_row(
            "SELECT s.difficulty, i.difficulty FROM senses s \
             JOIN lexical_items i ON i.id = s.item_id WHERE s.id = ?1",
            params![sense_id],
            |row| {
                Ok(Difficulty {
                    sense: row.get(0)?,
                    item: row.get(1)?,
                })
            },
        )
        .optional()?;
    Ok(difficulty)
}

fn sense_exists(conn: &Connection, sense_id: i64) -> LexisResult<bool> {
    let found = conn
        .query_row("SELECT 1 FROM senses WHERE id = ?1", params![sense_id], |_| Ok(()))
        .optional()?;
    Ok(found.is_some())
}

/// Transactional handle handed to [`ProgressStore::in_transaction`] callers.
struct SqliteProgressTransaction<'a> {
    tx: &'a rusqlite::Transaction<'a>,
}

impl ProgressTransaction for SqliteProgressTransaction<'_> {
    fn sense_difficulty(&mut self, sense_id: i64) -> LexisResult<Option<Difficulty>> {
        load_difficulty(self.tx, sense_id)
    }

    fn progress(&mut self, learner_id: Uuid, sense_id: i64) -> LexisResult<Option<Progress>> {
        load_progress(self.tx, learner_id, sense_id)
    }

    fn upsert_progress(&mut self, progress: &Progress) -> LexisResult<()> {
        write_progress(self.tx, progress)
    }
}

impl CatalogStore for SqliteStore {
    fn insert_lexical_item(&self, item: &NewLexicalItem) -> LexisResult<(LexicalItem, Vec<Sense>)> {
        let mut conn = self.lock()?;
        let tx = conn.transaction()?;

        tx.execute(
            "INSERT INTO lexical_items (lemma, source, difficulty) VALUES (?1, ?2, ?3)",
            params![item.lemma, item.source, item.difficulty],
        )?;
        let item_id = tx.last_insert_rowid();

        let mut senses = Vec::with_capacity(item.senses.len());
        for sense in &item.senses {
            tx.execute(
                "INSERT INTO senses (item_id, part_of_speech, definition, example_sentence, \
                 example_translation, unit, difficulty) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                params![
                    item_id,
                    sense.part_of_speech,
                    sense.definition,
                    sense.example_sentence,
                    sense.example_translation,
                    sense.unit,
                    sense.difficulty,
                ],
            )?;
            senses.push(Sense {
                id: tx.last_insert_rowid(),
                item_id,
                part_of_speech: sense.part_of_speech.clone(),
                definition: sense.definition.clone(),
                example_sentence: sense.example_sentence.clone(),
                example_translation: sense.example_translation.clone(),
                unit: sense.unit.clone(),
                difficulty: sense.difficulty,
            });
        }
        tx.commit()?;

        Ok((
            LexicalItem {
                id: item_id,
                lemma: item.lemma.clone(),
                source: item.source.clone(),
                difficulty: item.difficulty,
            },
            senses,
        ))
    }

    fn sense(&self, sense_id: i64) -> LexisResult<Option<Sense>> {
        let conn = self.lock()?;
        let sql = format!("SELECT {} FROM senses s WHERE s.id = ?1", SENSE_COLUMNS);
        Ok(conn
            .query_row(&sql, params![sense_id], row_to_sense)
            .optional()?)
    }

    fn sense_with_lemma(&self, sense_id: i64) -> LexisResult<Option<SenseCandidate>> {
        let conn = self.lock()?;
        let sql = format!(
            "SELECT {}, i.lemma FROM senses s JOIN lexical_items i ON i.id = s.item_id \
             WHERE s.id = ?1",
            SENSE_COLUMNS
        );
        Ok(conn
            .query_row(&sql, params![sense_id], row_to_candidate)
            .optional()?)
    }

    fn senses_of_item(&self, item_id: i64) -> LexisResult<Vec<Sense>> {
        let conn = self.lock()?;
        let sql = format!(
            "SELECT {} FROM senses s WHERE s.item_id = ?1 ORDER BY s.id",
            SENSE_COLUMNS
        );
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt.query_map(params![item_id], row_to_sense)?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    fn sources(&self) -> LexisResult<Vec<String>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(
            "SELECT DISTINCT source FROM lexical_items \
             WHERE source IS NOT NULL AND source != '' ORDER BY source",
        )?;
        let rows = stmt.query_map([], |row| row.get(0))?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    fn senses_for_selection(
        &self,
        source: Option<&str>,
        order: CandidateOrder,
        count: u32,
    ) -> LexisResult<Vec<SenseSummary>> {
        let conn = self.lock()?;
        let order_by = match order {
            CandidateOrder::Sequential => "s.id ASC",
            CandidateOrder::Random => "RANDOM()",
        };
        let sql = format!(
            "SELECT {} FROM senses s JOIN lexical_items i ON i.id = s.item_id \
             WHERE (?1 IS NULL OR i.source = ?1) ORDER BY {} LIMIT ?2",
            SUMMARY_COLUMNS, order_by
        );
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt.query_map(params![source, count], row_to_summary)?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    fn senses_by_source(&self, source: &str) -> LexisResult<Vec<SenseSummary>> {
        let conn = self.lock()?;
        let sql = format!(
            "SELECT {} FROM senses s JOIN lexical_items i ON i.id = s.item_id \
             WHERE i.source = ?1 ORDER BY s.unit ASC NULLS FIRST, i.lemma ASC, s.id ASC",
            SUMMARY_COLUMNS
        );
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt.query_map(params![source], row_to_summary)?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    fn backfill_difficulty(&self, default: f64) -> LexisResult<u64> {
        let mut conn = self.lock()?;
        let tx = conn.transaction()?;
        let items = tx.execute(
            "UPDATE lexical_items SET difficulty = ?1 WHERE difficulty IS NULL",
            params![default],
        )?;
        let senses = tx.execute(
            "UPDATE senses SET difficulty = ?1 WHERE difficulty IS NULL",
            params![default],
        )?;
        tx.commit()?;
        Ok((items + senses) as u64)
    }
}

impl ProgressStore for SqliteStore {
    fn progress(&self, learner_id: Uuid, sense_id: i64) -> LexisResult<Option<Progress>> {
        let conn = self.lock()?;
        load_progress(&conn, learner_id, sense_id)
    }

    fn in_transaction(
        &self,
        work: &mut dyn FnMut(&mut dyn ProgressTransaction) -> LexisResult<()>,
    ) -> LexisResult<()> {
        let mut conn = self.lock()?;
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
        {
            let mut handle = SqliteProgressTransaction { tx: &tx };
            work(&mut handle)?;
        }
        // Dropping `tx` without commit rolls back.
        tx.commit()?;
        Ok(())
    }

    fn due_candidate(
        &self,
        learner_id: Uuid,
        source: Option<&str>,
        now: DateTime<Utc>,
        seed: u32,
    ) -> LexisResult<Option<SenseCandidate>> {
        let conn = self.lock()?;
        let sql = format!(
            "SELECT {}, i.lemma FROM senses s \
             JOIN lexical_items i ON i.id = s.item_id \
             LEFT JOIN progress p ON p.sense_id = s.id AND p.learner_id = :learner \
             WHERE (p.sense_id IS NULL OR p.next_review_at <= :now) \
               AND (:source IS NULL OR i.source = :source) \
             ORDER BY p.next_review_at ASC NULLS LAST, {} \
             LIMIT 1",
            SENSE_COLUMNS, SHUFFLE_KEY
        );
        Ok(conn
            .query_row(
                &sql,
                rusqlite::named_params! {
                    ":learner": learner_id.to_string(),
                    ":now": format_ts(now),
                    ":source": source,
                    ":seed": seed,
                },
                row_to_candidate,
            )
            .optional()?)
    }

    fn learned_count(&self, learner_id: Uuid) -> LexisResult<u64> {
        let conn = self.lock()?;
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM progress WHERE learner_id = ?1",
            params![learner_id.to_string()],
            |row| row.get(0),
        )?;
        Ok(count as u64)
    }
}

impl PlanStore for SqliteStore {
    fn create_plan(
        &self,
        learner_id: Uuid,
        sense_ids: &[i64],
        created_at: DateTime<Utc>,
    ) -> LexisResult<DailyPlan> {
        let mut conn = self.lock()?;
        let tx = conn.transaction()?;

        let mut seen = HashSet::new();
        let mut unique = Vec::with_capacity(sense_ids.len());
        for &id in sense_ids {
            if seen.insert(id) {
                if !sense_exists(&tx, id)? {
                    return Err(LexisError::sense_not_found(id));
                }
                unique.push(id);
            }
        }

        let plan_id = Uuid::new_v4();
        tx.execute(
            "INSERT INTO daily_plans (id, learner_id, created_at) VALUES (?1, ?2, ?3)",
            params![plan_id.to_string(), learner_id.to_string(), format_ts(created_at)],
        )?;
        {
            let mut stmt =
                tx.prepare("INSERT INTO daily_plan_items (plan_id, sense_id) VALUES (?1, ?2)")?;
            for id in &unique {
                stmt.execute(params![plan_id.to_string(), id])?;
            }
        }
        tx.commit()?;

        Ok(DailyPlan {
            id: plan_id,
            learner_id,
            created_at,
            sense_ids: unique,
        })
    }

    fn todays_plan(&self, learner_id: Uuid, day_start: DateTime<Utc>) -> LexisResult<Option<Uuid>> {
        let conn = self.lock()?;
        let id: Option<String> = conn
            .query_row(
                "SELECT id FROM daily_plans \
                 WHERE learner_id = ?1 AND created_at >= ?2 AND created_at < ?3 \
                 ORDER BY created_at DESC, rowid DESC LIMIT 1",
                params![
                    learner_id.to_string(),
                    format_ts(day_start),
                    format_ts(day_start + Duration::days(1)),
                ],
                |row| row.get(0),
            )
            .optional()?;
        id.as_deref().map(parse_uuid).transpose()
    }

    fn plan_progress(&self, plan_id: Uuid, day_start: DateTime<Utc>) -> LexisResult<PlanProgress> {
        let conn = self.lock()?;
        let (total, completed): (u32, u32) = conn.query_row(
            "SELECT COUNT(*), COUNT(CASE WHEN p.last_reviewed_at >= ?2 THEN 1 END) \
             FROM daily_plan_items dpi \
             JOIN daily_plans dp ON dp.id = dpi.plan_id \
             LEFT JOIN progress p ON p.sense_id = dpi.sense_id AND p.learner_id = dp.learner_id \
             WHERE dpi.plan_id = ?1",
            params![plan_id.to_string(), format_ts(day_start)],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )?;
        Ok(PlanProgress { total, completed })
    }

    fn plan_candidate(
        &self,
        plan_id: Uuid,
        day_start: DateTime<Utc>,
        ordering: PlanOrdering,
        seed: u32,
    ) -> LexisResult<Option<SenseCandidate>> {
        let conn = self.lock()?;
        let order_by = match ordering {
            PlanOrdering::DueAware => format!("p.next_review_at ASC NULLS LAST, {}", SHUFFLE_KEY),
            PlanOrdering::Sequential => "s.id ASC".to_string(),
        };
        let sql = format!(
            "SELECT {}, i.lemma FROM daily_plan_items dpi \
             JOIN daily_plans dp ON dp.id = dpi.plan_id \
             JOIN senses s ON s.id = dpi.sense_id \
             JOIN lexical_items i ON i.id = s.item_id \
             LEFT JOIN progress p ON p.sense_id = s.id AND p.learner_id = dp.learner_id \
             WHERE dpi.plan_id = :plan \
               AND (p.sense_id IS NULL OR p.last_reviewed_at IS NULL OR p.last_reviewed_at < :day_start) \
             ORDER BY {} \
             LIMIT 1",
            SENSE_COLUMNS, order_by
        );
        let mut stmt = conn.prepare(&sql)?;
        let plan = plan_id.to_string();
        let day = format_ts(day_start);
        let candidate = match ordering {
            PlanOrdering::DueAware => stmt
                .query_row(
                    rusqlite::named_params! { ":plan": plan, ":day_start": day, ":seed": seed },
                    row_to_candidate,
                )
                .optional()?,
            PlanOrdering::Sequential => stmt
                .query_row(
                    rusqlite::named_params! { ":plan": plan, ":day_start": day },
                    row_to_candidate,
                )
                .optional()?,
        };
        Ok(candidate)
    }
}

impl SettingsStore for SqliteStore {
    fn get_setting(&self, key: &str) -> LexisResult<Option<String>> {
        let conn = self.lock()?;
        Ok(conn
            .query_row(
                "SELECT value FROM settings WHERE key = ?1",
                params![key],
                |row| row.get(0),
            )
            .optional()?)
    }

    fn set_setting(&self, key: &str, value: &str) -> LexisResult<()> {
        let conn = self.lock()?;
        conn.execute(
            "INSERT OR REPLACE INTO settings (key, value, updated_at) VALUES (?1, ?2, ?3)",
            params![key, value, format_ts(Utc::now())],
        )?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use crate::types::{NewSense, RecallHistoryEntry, ReviewHistoryEntry};
    use chrono::TimeZone;

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 10, 9, 0, 0).unwrap()
    }

    fn seed_item(store: &SqliteStore, lemma: &str, source: &str, senses: usize) -> Vec<i64> {
        let mut item = NewLexicalItem::new(lemma).with_source(source);
        for n in 0..senses {
            item = item.with_sense(
                NewSense::new(format!("{} definition {}", lemma, n), format!("A {} here.", lemma))
                    .with_part_of_speech("n."),
            );
        }
        let (_, senses) = store.insert_lexical_item(&item).unwrap();
        senses.into_iter().map(|s| s.id).collect()
    }

    fn reviewed(learner: Uuid, sense_id: i64, at: DateTime<Utc>, next: DateTime<Utc>) -> Progress {
        let mut p = Progress::new(learner, sense_id);
        p.review_count = 1;
        p.last_reviewed_at = Some(at);
        p.next_review_at = Some(next);
        p
    }

    fn upsert(store: &SqliteStore, progress: Progress) {
        store
            .in_transaction(&mut |tx| tx.upsert_progress(&progress))
            .unwrap();
    }

    #[test]
    fn test_insert_and_read_catalog() {
        let store = SqliteStore::in_memory().unwrap();
        let item = NewLexicalItem::new("run")
            .with_source("cet4")
            .with_difficulty(0.7)
            .with_sense(
                NewSense::new("to move fast", "She runs every day.")
                    .with_part_of_speech("v.")
                    .with_translation("她每天跑步。")
                    .with_unit("Unit 1"),
            )
            .with_sense(NewSense::new("a period of running", "A long run."));
        let (created, senses) = store.insert_lexical_item(&item).unwrap();
        assert_eq!(senses.len(), 2);

        let sense = store.sense(senses[0].id).unwrap().unwrap();
        assert_eq!(sense.item_id, created.id);
        assert_eq!(sense.example_translation.as_deref(), Some("她每天跑步。"));
        assert_eq!(sense.unit.as_deref(), Some("Unit 1"));

        let all = store.senses_of_item(created.id).unwrap();
        assert_eq!(all.len(), 2);
        assert!(store.sense(9999).unwrap().is_none());
    }

    #[test]
    fn test_progress_round_trip() {
        let store = SqliteStore::in_memory().unwrap();
        let ids = seed_item(&store, "apple", "cet4", 1);
        let learner = Uuid::new_v4();

        let mut p = reviewed(learner, ids[0], t0(), t0() + Duration::hours(4));
        p.stage = 2;
        p.memory_half_life = 12.5;
        p.last_recall_success = true;
        p.review_history.push(ReviewHistoryEntry {
            reviewed_at: t0(),
            stage: 1,
        });
        p.recall_history.push(RecallHistoryEntry {
            reviewed_at: t0(),
            success: true,
        });
        upsert(&store, p.clone());

        let loaded = store.progress(learner, ids[0]).unwrap().unwrap();
        assert_eq!(loaded, p);
        assert!(store.progress(Uuid::new_v4(), ids[0]).unwrap().is_none());
    }

    #[test]
    fn test_failed_transaction_rolls_back() {
        let store = SqliteStore::in_memory().unwrap();
        let ids = seed_item(&store, "apple", "cet4", 1);
        let learner = Uuid::new_v4();

        let progress = reviewed(learner, ids[0], t0(), t0());
        let result = store.in_transaction(&mut |tx| {
            tx.upsert_progress(&progress)?;
            Err(LexisError::database("simulated failure"))
        });
        assert!(result.is_err());
        assert!(store.progress(learner, ids[0]).unwrap().is_none());
    }

    #[test]
    fn test_sense_difficulty_in_transaction() {
        let store = SqliteStore::in_memory().unwrap();
        let (_, senses) = store
            .insert_lexical_item(
                &NewLexicalItem::new("x")
                    .with_difficulty(0.3)
                    .with_sense(NewSense::new("d", "x").with_difficulty(0.9)),
            )
            .unwrap();
        let mut found = None;
        store
            .in_transaction(&mut |tx| {
                found = tx.sense_difficulty(senses[0].id)?;
                assert!(tx.sense_difficulty(12345)?.is_none());
                Ok(())
            })
            .unwrap();
        assert_eq!(
            found,
            Some(Difficulty {
                sense: Some(0.9),
                item: Some(0.3)
            })
        );
    }

    #[test]
    fn test_due_candidate_prefers_overdue_then_new() {
        let store = SqliteStore::in_memory().unwrap();
        let a = seed_item(&store, "alpha", "cet4", 1)[0];
        let b = seed_item(&store, "beta", "cet4", 1)[0];
        let c = seed_item(&store, "gamma", "cet4", 1)[0];
        let learner = Uuid::new_v4();
        let now = t0();

        // a: not yet due, b: overdue, c: never reviewed
        upsert(&store, reviewed(learner, a, now, now + Duration::hours(2)));
        upsert(&store, reviewed(learner, b, now - Duration::hours(8), now - Duration::hours(1)));

        let first = store.due_candidate(learner, None, now, 7).unwrap().unwrap();
        assert_eq!(first.sense.id, b);
        assert_eq!(first.lemma, "beta");

        upsert(&store, reviewed(learner, b, now, now + Duration::hours(4)));
        let next = store.due_candidate(learner, None, now, 7).unwrap().unwrap();
        assert_eq!(next.sense.id, c);

        upsert(&store, reviewed(learner, c, now, now + Duration::hours(4)));
        assert!(store.due_candidate(learner, None, now, 7).unwrap().is_none());
    }

    #[test]
    fn test_due_candidate_source_filter() {
        let store = SqliteStore::in_memory().unwrap();
        seed_item(&store, "alpha", "cet4", 1);
        let b = seed_item(&store, "beta", "ielts", 1)[0];
        let learner = Uuid::new_v4();

        let found = store
            .due_candidate(learner, Some("ielts"), t0(), 1)
            .unwrap()
            .unwrap();
        assert_eq!(found.sense.id, b);
        assert!(store
            .due_candidate(learner, Some("toefl"), t0(), 1)
            .unwrap()
            .is_none());
    }

    #[test]
    fn test_due_candidate_is_stable_for_a_seed() {
        let store = SqliteStore::in_memory().unwrap();
        for n in 0..10 {
            seed_item(&store, &format!("w{}", n), "cet4", 1);
        }
        let learner = Uuid::new_v4();
        let first = store.due_candidate(learner, None, t0(), 42).unwrap();
        let second = store.due_candidate(learner, None, t0(), 42).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_create_plan_dedups_and_rejects_unknown() {
        let store = SqliteStore::in_memory().unwrap();
        let ids = seed_item(&store, "apple", "cet4", 2);
        let learner = Uuid::new_v4();

        let plan = store
            .create_plan(learner, &[ids[0], ids[1], ids[0]], t0())
            .unwrap();
        assert_eq!(plan.sense_ids, vec![ids[0], ids[1]]);

        let err = store.create_plan(learner, &[ids[0], 777], t0()).unwrap_err();
        assert_eq!(err.code(), ErrorCode::SenseNotFound);
        // the failed plan left nothing behind
        let latest = store.todays_plan(learner, t0() - Duration::hours(9)).unwrap();
        assert_eq!(latest, Some(plan.id));
    }

    #[test]
    fn test_todays_plan_is_latest_of_day() {
        let store = SqliteStore::in_memory().unwrap();
        let ids = seed_item(&store, "apple", "cet4", 1);
        let learner = Uuid::new_v4();
        let day_start = Utc.with_ymd_and_hms(2024, 5, 10, 0, 0, 0).unwrap();

        store
            .create_plan(learner, &ids, day_start - Duration::hours(1))
            .unwrap();
        assert!(store.todays_plan(learner, day_start).unwrap().is_none());

        let morning = store.create_plan(learner, &ids, t0()).unwrap();
        assert_eq!(store.todays_plan(learner, day_start).unwrap(), Some(morning.id));
        let evening = store
            .create_plan(learner, &ids, t0() + Duration::hours(10))
            .unwrap();
        assert_eq!(store.todays_plan(learner, day_start).unwrap(), Some(evening.id));
        assert!(store.todays_plan(Uuid::new_v4(), day_start).unwrap().is_none());
    }

    #[test]
    fn test_plan_progress_and_candidate() {
        let store = SqliteStore::in_memory().unwrap();
        let ids = seed_item(&store, "apple", "cet4", 3);
        let learner = Uuid::new_v4();
        let day_start = Utc.with_ymd_and_hms(2024, 5, 10, 0, 0, 0).unwrap();
        let plan = store.create_plan(learner, &ids, t0()).unwrap();

        let progress = store.plan_progress(plan.id, day_start).unwrap();
        assert_eq!(progress, PlanProgress { total: 3, completed: 0 });

        let first = store
            .plan_candidate(plan.id, day_start, PlanOrdering::Sequential, 0)
            .unwrap()
            .unwrap();
        assert_eq!(first.sense.id, ids[0]);

        // reviewed yesterday does not count; reviewed today does
        upsert(
            &store,
            reviewed(learner, ids[0], day_start - Duration::hours(2), t0()),
        );
        upsert(&store, reviewed(learner, ids[1], t0(), t0() + Duration::days(1)));
        let progress = store.plan_progress(plan.id, day_start).unwrap();
        assert_eq!(progress.completed, 1);

        let next = store
            .plan_candidate(plan.id, day_start, PlanOrdering::DueAware, 3)
            .unwrap()
            .unwrap();
        // ids[0] has a due date, ids[2] has none: due first
        assert_eq!(next.sense.id, ids[0]);

        upsert(&store, reviewed(learner, ids[0], t0(), t0() + Duration::days(1)));
        upsert(&store, reviewed(learner, ids[2], t0(), t0() + Duration::days(1)));
        assert!(store
            .plan_candidate(plan.id, day_start, PlanOrdering::DueAware, 3)
            .unwrap()
            .is_none());
        assert!(store.plan_progress(plan.id, day_start).unwrap().is_complete());
    }

    #[test]
    fn test_settings() {
        let store = SqliteStore::in_memory().unwrap();
        assert!(store.get_setting("srs_algorithm").unwrap().is_none());
        store.set_setting("srs_algorithm", "legacy").unwrap();
        store.set_setting("srs_algorithm", "sspmmc").unwrap();
        assert_eq!(
            store.get_setting("srs_algorithm").unwrap().as_deref(),
            Some("sspmmc")
        );
    }

    #[test]
    fn test_catalog_queries() {
        let store = SqliteStore::in_memory().unwrap();
        seed_item(&store, "b", "ielts", 1);
        seed_item(&store, "a", "cet4", 2);
        store
            .insert_lexical_item(&NewLexicalItem::new("loose").with_sense(NewSense::new("d", "")))
            .unwrap();

        assert_eq!(store.sources().unwrap(), vec!["cet4", "ielts"]);

        let picked = store
            .senses_for_selection(Some("cet4"), CandidateOrder::Sequential, 10)
            .unwrap();
        assert_eq!(picked.len(), 2);
        assert!(picked[0].sense_id < picked[1].sense_id);
        assert_eq!(
            store
                .senses_for_selection(None, CandidateOrder::Random, 2)
                .unwrap()
                .len(),
            2
        );
        assert_eq!(store.senses_by_source("ielts").unwrap().len(), 1);
    }

    #[test]
    fn test_senses_by_source_orders_by_unit_then_lemma() {
        let store = SqliteStore::in_memory().unwrap();
        for (lemma, unit) in [("zebra", "Unit 1"), ("apple", "Unit 2"), ("mango", "Unit 1")] {
            store
                .insert_lexical_item(
                    &NewLexicalItem::new(lemma)
                        .with_source("book")
                        .with_sense(NewSense::new("d", "").with_unit(unit)),
                )
                .unwrap();
        }

        let lemmas: Vec<String> = store
            .senses_by_source("book")
            .unwrap()
            .into_iter()
            .map(|s| s.lemma)
            .collect();
        assert_eq!(lemmas, vec!["mango", "zebra", "apple"]);
    }

    #[test]
    fn test_backfill_difficulty() {
        let store = SqliteStore::in_memory().unwrap();
        let (_, senses) = store
            .insert_lexical_item(
                &NewLexicalItem::new("x")
                    .with_sense(NewSense::new("d1", "x"))
                    .with_sense(NewSense::new("d2", "x").with_difficulty(0.2)),
            )
            .unwrap();
        assert_eq!(store.backfill_difficulty(0.5).unwrap(), 2);
        assert_eq!(store.sense(senses[0].id).unwrap().unwrap().difficulty, Some(0.5));
        assert_eq!(store.sense(senses[1].id).unwrap().unwrap().difficulty, Some(0.2));
        assert_eq!(store.backfill_difficulty(0.5).unwrap(), 0);
    }

    #[test]
    fn test_file_backed_store_persists() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("lexis.db");
        {
            let store = SqliteStore::new(&path).unwrap();
            store.set_setting("srs_algorithm", "legacy").unwrap();
        }
        let reopened = SqliteStore::new(&path).unwrap();
        assert_eq!(
            reopened.get_setting("srs_algorithm").unwrap().as_deref(),
            Some("legacy")
        );
    }

    #[test]
    fn test_timestamps_sort_lexically() {
        let a = format_ts(t0());
        let b = format_ts(t0() + Duration::microseconds(1));
        let c = format_ts(t0() + Duration::days(400));
        assert!(a < b && b < c);
        assert_eq!(parse_ts(&a).unwrap(), t0());

        let far = Utc.with_ymd_and_hms(9999, 12, 31, 23, 59, 59).unwrap();
        let d = storable_ts(far).unwrap();
        assert!(c < d);
        assert_eq!(parse_ts(&d).unwrap(), far);
    }

    #[test]
    fn test_unstorable_timestamp_rejected() {
        let store = SqliteStore::in_memory().unwrap();
        let sense = seed_item(&store, "far", "cet4", 1)[0];
        let learner = Uuid::new_v4();
        let beyond = Utc.with_ymd_and_hms(9999, 12, 31, 0, 0, 0).unwrap() + Duration::days(2);

        let err = store
            .in_transaction(&mut |tx| tx.upsert_progress(&reviewed(learner, sense, t0(), beyond)))
            .unwrap_err();
        assert_eq!(err.code(), ErrorCode::SchedOutOfRange);
        assert!(store.progress(learner, sense).unwrap().is_none());
    }
}
