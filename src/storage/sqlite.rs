//! SQLite storage backend for annotated edges

use super::traits::{
    ClimbNames, EdgeInput, EdgeStore, OpenStore, StorageError, StorageResult, StoredEdge,
    UpsertSummary,
};
use crate::catalog::{ClimbPosition, HoldId};
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

/// How long a statement waits on a locked database before failing
pub const DEFAULT_BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// How a batch treats entries that carry no `edge_index`
#[derive(Debug, Clone, Copy)]
enum Numbering {
    /// Store them unassigned
    AsGiven,
    /// Continue after the largest ordinal stored for the position
    AfterStored,
}

/// SQLite-backed edge store
///
/// One table, `edges`, with a unique index on the natural key
/// `(graph_index, start_node, end_node)`. Thread-safe via internal mutex on
/// the connection.
pub struct SqliteEdgeStore {
    conn: Mutex<Connection>,
}

impl SqliteEdgeStore {
    fn from_connection(conn: Connection) -> StorageResult<Self> {
        conn.busy_timeout(DEFAULT_BUSY_TIMEOUT)?;
        let store = Self {
            conn: Mutex::new(conn),
        };
        store.ensure_schema()?;
        Ok(store)
    }

    /// Replace the busy timeout applied to every statement
    pub fn with_busy_timeout(self, timeout: Duration) -> StorageResult<Self> {
        self.lock()?.busy_timeout(timeout)?;
        Ok(self)
    }

    fn lock(&self) -> StorageResult<MutexGuard<'_, Connection>> {
        self.conn.lock().map_err(|_| StorageError::LockPoisoned)
    }

    /// Initialize the database schema
    ///
    /// 1. Create the base table, compatible with databases written before
    ///    `edge_index` existed
    /// 2. Add `edge_index` where missing
    /// 3. Collapse duplicate natural keys and enforce uniqueness
    fn init_schema(conn: &Connection) -> StorageResult<()> {
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS edges (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                start_node INTEGER NOT NULL,
                end_node INTEGER NOT NULL,
                name TEXT,
                graph_index INTEGER NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_edges_graph_index
                ON edges(graph_index);

            PRAGMA journal_mode = WAL;
            "#,
        )?;

        Self::migrate_add_edge_index(conn)?;
        Self::migrate_unique_natural_key(conn)?;

        Ok(())
    }

    /// Migration: add the nullable `edge_index` column
    ///
    /// SQLite has no ADD COLUMN IF NOT EXISTS, so check table_info first.
    fn migrate_add_edge_index(conn: &Connection) -> StorageResult<()> {
        let has_edge_index: bool = conn.query_row(
            "SELECT COUNT(*) > 0 FROM pragma_table_info('edges') WHERE name = 'edge_index'",
            [],
            |row| row.get(0),
        )?;

        if !has_edge_index {
            conn.execute("ALTER TABLE edges ADD COLUMN edge_index INTEGER", [])?;
            tracing::info!("added edge_index column to edges table");
        }

        Ok(())
    }

    /// Migration: unique index on `(graph_index, start_node, end_node)`
    ///
    /// Older databases could hold duplicate rows for one key. The row with
    /// the lowest id survives.
    fn migrate_unique_natural_key(conn: &Connection) -> StorageResult<()> {
        let has_unique: bool = conn.query_row(
            "SELECT COUNT(*) > 0 FROM sqlite_master
             WHERE type = 'index' AND name = 'idx_edges_natural_key'",
            [],
            |row| row.get(0),
        )?;

        if has_unique {
            return Ok(());
        }

        let tx = conn.unchecked_transaction()?;
        let removed = tx.execute(
            "DELETE FROM edges WHERE id NOT IN (
                SELECT MIN(id) FROM edges GROUP BY graph_index, start_node, end_node
            )",
            [],
        )?;
        tx.execute(
            "CREATE UNIQUE INDEX idx_edges_natural_key
                ON edges(graph_index, start_node, end_node)",
            [],
        )?;
        tx.commit()?;

        if removed > 0 {
            tracing::warn!(removed, "collapsed duplicate edge rows while adding unique key");
        }
        Ok(())
    }

    /// Write one batch inside a single transaction
    fn write_batch(
        &self,
        position: ClimbPosition,
        edges: &[EdgeInput],
        names: &dyn ClimbNames,
        numbering: Numbering,
    ) -> StorageResult<UpsertSummary> {
        if edges.is_empty() {
            return Ok(UpsertSummary::default());
        }

        let name = names
            .climb_name(position)
            .ok_or(StorageError::UnknownPosition(position))?;

        let mut conn = self.lock()?;
        let tx = conn.transaction()?;

        let mut next_index: i64 = match numbering {
            Numbering::AsGiven => 0,
            Numbering::AfterStored => tx.query_row(
                "SELECT COALESCE(MAX(edge_index) + 1, 0) FROM edges WHERE graph_index = ?1",
                params![position.as_i64()],
                |row| row.get(0),
            )?,
        };

        let mut summary = UpsertSummary::default();
        {
            let mut exists = tx.prepare(
                "SELECT 1 FROM edges WHERE graph_index = ?1 AND start_node = ?2 AND end_node = ?3",
            )?;
            let mut write = tx.prepare(
                r#"
                INSERT INTO edges (start_node, end_node, name, graph_index, edge_index)
                VALUES (?1, ?2, ?3, ?4, ?5)
                ON CONFLICT(graph_index, start_node, end_node) DO UPDATE SET
                    edge_index = excluded.edge_index
                "#,
            )?;

            for edge in edges {
                let index = match (numbering, edge.index) {
                    (Numbering::AsGiven, index) => index,
                    (Numbering::AfterStored, Some(given)) => {
                        next_index = next_index.max(given + 1);
                        Some(given)
                    }
                    (Numbering::AfterStored, None) => {
                        next_index += 1;
                        Some(next_index - 1)
                    }
                };

                let existed = exists
                    .query_row(params![position.as_i64(), edge.start, edge.end], |_| Ok(()))
                    .optional()?
                    .is_some();

                write.execute(params![edge.start, edge.end, name, position.as_i64(), index])?;

                if existed {
                    summary.updated += 1;
                } else {
                    summary.inserted += 1;
                }
            }
        }
        tx.commit()?;

        tracing::debug!(
            %position,
            inserted = summary.inserted,
            updated = summary.updated,
            "upserted edge batch"
        );
        Ok(summary)
    }
}

impl OpenStore for SqliteEdgeStore {
    fn open(path: impl AsRef<Path>) -> StorageResult<Self> {
        // Ensure parent directory exists
        if let Some(parent) = path.as_ref().parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        Self::from_connection(Connection::open(path)?)
    }

    fn open_in_memory() -> StorageResult<Self> {
        Self::from_connection(Connection::open_in_memory()?)
    }
}

impl EdgeStore for SqliteEdgeStore {
    fn ensure_schema(&self) -> StorageResult<()> {
        let conn = self.lock()?;
        Self::init_schema(&conn)
    }

    fn upsert(
        &self,
        position: ClimbPosition,
        edges: &[EdgeInput],
        names: &dyn ClimbNames,
    ) -> StorageResult<UpsertSummary> {
        self.write_batch(position, edges, names, Numbering::AsGiven)
    }

    fn upsert_in_drawing_order(
        &self,
        position: ClimbPosition,
        edges: &[EdgeInput],
        names: &dyn ClimbNames,
    ) -> StorageResult<UpsertSummary> {
        self.write_batch(position, edges, names, Numbering::AfterStored)
    }

    fn get_edges(&self, position: ClimbPosition) -> StorageResult<Vec<StoredEdge>> {
        let conn = self.lock()?;

        let mut stmt = conn.prepare(
            "SELECT start_node, end_node, edge_index FROM edges
             WHERE graph_index = ?1
             ORDER BY edge_index IS NULL, edge_index, id",
        )?;

        let edges = stmt
            .query_map(params![position.as_i64()], |row| {
                Ok(StoredEdge {
                    start: row.get(0)?,
                    end: row.get(1)?,
                    edge_index: row.get(2)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(edges)
    }

    fn get_all(&self) -> StorageResult<Vec<(HoldId, HoldId)>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare("SELECT start_node, end_node FROM edges ORDER BY graph_index, id")?;
        let pairs = stmt
            .query_map([], |row| Ok((row.get(0)?, row.get(1)?)))?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(pairs)
    }

    fn delete_all(&self, position: ClimbPosition) -> StorageResult<usize> {
        let conn = self.lock()?;
        let rows = conn.execute(
            "DELETE FROM edges WHERE graph_index = ?1",
            params![position.as_i64()],
        )?;
        tracing::debug!(%position, rows, "deleted edges");
        Ok(rows)
    }

    fn max_position(&self) -> StorageResult<Option<i64>> {
        let conn = self.lock()?;
        let max: Option<i64> = conn.query_row("SELECT MAX(graph_index) FROM edges", [], |row| row.get(0))?;
        Ok(max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Names(Vec<&'static str>);

    impl ClimbNames for Names {
        fn climb_name(&self, position: ClimbPosition) -> Option<String> {
            self.0.get(position.index()).map(|s| s.to_string())
        }
    }

    fn names() -> Names {
        Names(vec!["Alpha", "Bravo", "Charlie"])
    }

    fn pos(index: usize) -> ClimbPosition {
        ClimbPosition::new(index)
    }

    fn create_test_store() -> SqliteEdgeStore {
        SqliteEdgeStore::open_in_memory().unwrap()
    }

    fn row_count(store: &SqliteEdgeStore) -> i64 {
        store
            .lock()
            .unwrap()
            .query_row("SELECT COUNT(*) FROM edges", [], |row| row.get(0))
            .unwrap()
    }

    fn stored_name(store: &SqliteEdgeStore, position: i64, start: i64, end: i64) -> Option<String> {
        store
            .lock()
            .unwrap()
            .query_row(
                "SELECT name FROM edges WHERE graph_index = ?1 AND start_node = ?2 AND end_node = ?3",
                params![position, start, end],
                |row| row.get(0),
            )
            .unwrap()
    }

    #[test]
    fn ensure_schema_is_idempotent() {
        let store = create_test_store();
        store.ensure_schema().unwrap();
        store.ensure_schema().unwrap();
        assert_eq!(row_count(&store), 0);
    }

    #[test]
    fn round_trip_single_edge() {
        let store = create_test_store();
        store
            .upsert(pos(1), &[EdgeInput::new(1, 2).with_index(0)], &names())
            .unwrap();

        let edges = store.get_edges(pos(1)).unwrap();
        assert_eq!(
            edges,
            vec![StoredEdge {
                start: 1,
                end: 2,
                edge_index: Some(0)
            }]
        );
        assert_eq!(stored_name(&store, 1, 1, 2).as_deref(), Some("Bravo"));
    }

    #[test]
    fn upsert_twice_is_idempotent() {
        let store = create_test_store();
        let batch = [EdgeInput::new(1, 2).with_index(0), EdgeInput::new(2, 3).with_index(1)];

        let first = store.upsert(pos(0), &batch, &names()).unwrap();
        let second = store.upsert(pos(0), &batch, &names()).unwrap();

        assert_eq!(first, UpsertSummary { inserted: 2, updated: 0 });
        assert_eq!(second, UpsertSummary { inserted: 0, updated: 2 });
        assert_eq!(row_count(&store), 2);
        assert_eq!(store.get_edges(pos(0)).unwrap().len(), 2);
    }

    #[test]
    fn duplicate_key_within_one_batch_keeps_one_row() {
        let store = create_test_store();
        let batch = [EdgeInput::new(4, 5).with_index(0), EdgeInput::new(4, 5).with_index(3)];

        store.upsert(pos(0), &batch, &names()).unwrap();

        let edges = store.get_edges(pos(0)).unwrap();
        assert_eq!(edges.len(), 1);
        assert_eq!(edges[0].edge_index, Some(3));
    }

    #[test]
    fn update_changes_only_edge_index() {
        let store = create_test_store();
        store
            .upsert(pos(0), &[EdgeInput::new(7, 8).with_index(0)], &names())
            .unwrap();

        // Different name source for the second call: the stored name must not follow it
        let renamed = Names(vec!["Renamed"]);
        store
            .upsert(pos(0), &[EdgeInput::new(7, 8).with_index(4)], &renamed)
            .unwrap();

        let edges = store.get_edges(pos(0)).unwrap();
        assert_eq!(edges[0].edge_index, Some(4));
        assert_eq!(stored_name(&store, 0, 7, 8).as_deref(), Some("Alpha"));
    }

    #[test]
    fn same_pair_in_other_direction_is_a_separate_edge() {
        let store = create_test_store();
        store
            .upsert(pos(0), &[EdgeInput::new(1, 2), EdgeInput::new(2, 1)], &names())
            .unwrap();
        assert_eq!(store.get_edges(pos(0)).unwrap().len(), 2);
    }

    #[test]
    fn unknown_position_fails_without_writing() {
        let store = create_test_store();
        let short = Names(vec!["Only"]);

        let err = store
            .upsert(pos(2), &[EdgeInput::new(1, 2)], &short)
            .unwrap_err();

        assert!(matches!(err, StorageError::UnknownPosition(p) if p.index() == 2));
        assert_eq!(row_count(&store), 0);
    }

    #[test]
    fn empty_batch_needs_no_name() {
        let store = create_test_store();
        let summary = store.upsert(pos(9), &[], &Names(vec![])).unwrap();
        assert_eq!(summary, UpsertSummary::default());
    }

    #[test]
    fn get_edges_orders_by_edge_index_then_insertion() {
        let store = create_test_store();
        store
            .upsert(
                pos(0),
                &[
                    EdgeInput::new(30, 31),
                    EdgeInput::new(20, 21).with_index(2),
                    EdgeInput::new(10, 11).with_index(0),
                    EdgeInput::new(40, 41),
                    EdgeInput::new(15, 16).with_index(1),
                ],
                &names(),
            )
            .unwrap();

        let order: Vec<(HoldId, Option<i64>)> = store
            .get_edges(pos(0))
            .unwrap()
            .into_iter()
            .map(|e| (e.start, e.edge_index))
            .collect();

        assert_eq!(
            order,
            vec![(10, Some(0)), (15, Some(1)), (20, Some(2)), (30, None), (40, None)]
        );
    }

    #[test]
    fn delete_all_is_scoped_to_one_position() {
        let store = create_test_store();
        store
            .upsert(pos(0), &[EdgeInput::new(1, 2), EdgeInput::new(2, 3)], &names())
            .unwrap();
        store.upsert(pos(1), &[EdgeInput::new(1, 2)], &names()).unwrap();

        let removed = store.delete_all(pos(0)).unwrap();

        assert_eq!(removed, 2);
        assert!(store.get_edges(pos(0)).unwrap().is_empty());
        assert_eq!(store.get_edges(pos(1)).unwrap().len(), 1);
    }

    #[test]
    fn delete_all_on_empty_position_removes_nothing() {
        let store = create_test_store();
        assert_eq!(store.delete_all(pos(2)).unwrap(), 0);
    }

    #[test]
    fn get_all_spans_positions() {
        let store = create_test_store();
        store.upsert(pos(1), &[EdgeInput::new(5, 6)], &names()).unwrap();
        store.upsert(pos(0), &[EdgeInput::new(1, 2)], &names()).unwrap();

        assert_eq!(store.get_all().unwrap(), vec![(1, 2), (5, 6)]);
    }

    #[test]
    fn max_position_tracks_stored_rows() {
        let store = create_test_store();
        assert_eq!(store.max_position().unwrap(), None);

        store.upsert(pos(2), &[EdgeInput::new(1, 2)], &names()).unwrap();
        store.upsert(pos(0), &[EdgeInput::new(1, 2)], &names()).unwrap();
        assert_eq!(store.max_position().unwrap(), Some(2));

        store.delete_all(pos(2)).unwrap();
        assert_eq!(store.max_position().unwrap(), Some(0));
    }

    #[test]
    fn failing_entry_rolls_back_the_whole_batch() {
        let store = create_test_store();
        store
            .lock()
            .unwrap()
            .execute_batch(
                "CREATE TRIGGER reject_hold_13 BEFORE INSERT ON edges
                 WHEN NEW.start_node = 13
                 BEGIN SELECT RAISE(ABORT, 'hold 13 rejected'); END;",
            )
            .unwrap();

        let batch = [EdgeInput::new(1, 2), EdgeInput::new(2, 3), EdgeInput::new(13, 14)];
        let err = store.upsert(pos(0), &batch, &names()).unwrap_err();
        assert!(matches!(err, StorageError::Database(_)));
        assert_eq!(row_count(&store), 0);

        // Updates earlier in a failed batch are undone too
        store
            .upsert(pos(0), &[EdgeInput::new(1, 2).with_index(0)], &names())
            .unwrap();
        let batch = [EdgeInput::new(1, 2).with_index(5), EdgeInput::new(13, 14)];
        assert!(store.upsert(pos(0), &batch, &names()).is_err());
        assert_eq!(row_count(&store), 1);
        assert_eq!(store.get_edges(pos(0)).unwrap()[0].edge_index, Some(0));
    }

    #[test]
    fn drawing_order_continues_after_stored_ordinals() {
        let store = create_test_store();
        store
            .upsert_in_drawing_order(pos(0), &[EdgeInput::new(1, 2), EdgeInput::new(2, 3)], &names())
            .unwrap();
        store
            .upsert_in_drawing_order(pos(0), &[EdgeInput::new(3, 1)], &names())
            .unwrap();
        // Other positions number independently
        store
            .upsert_in_drawing_order(pos(1), &[EdgeInput::new(7, 8)], &names())
            .unwrap();

        let order: Vec<(HoldId, HoldId, Option<i64>)> = store
            .get_edges(pos(0))
            .unwrap()
            .into_iter()
            .map(Into::into)
            .collect();
        assert_eq!(order, vec![(1, 2, Some(0)), (2, 3, Some(1)), (3, 1, Some(2))]);
        assert_eq!(store.get_edges(pos(1)).unwrap()[0].edge_index, Some(0));
    }

    #[test]
    fn drawing_order_skips_past_explicit_indices() {
        let store = create_test_store();
        store
            .upsert_in_drawing_order(
                pos(0),
                &[EdgeInput::new(1, 2), EdgeInput::new(2, 3).with_index(9), EdgeInput::new(3, 4)],
                &names(),
            )
            .unwrap();

        let indices: Vec<Option<i64>> = store
            .get_edges(pos(0))
            .unwrap()
            .into_iter()
            .map(|e| e.edge_index)
            .collect();
        assert_eq!(indices, vec![Some(0), Some(9), Some(10)]);
    }

    #[test]
    fn plain_upsert_leaves_missing_indices_unassigned() {
        let store = create_test_store();
        store
            .upsert(pos(0), &[EdgeInput::new(1, 2).with_index(4)], &names())
            .unwrap();
        store.upsert(pos(0), &[EdgeInput::new(2, 3)], &names()).unwrap();

        assert_eq!(store.get_edges(pos(0)).unwrap()[1].edge_index, None);
    }

    #[test]
    fn stored_edge_serializes_as_triple() {
        let edge = StoredEdge {
            start: 5,
            end: 9,
            edge_index: None,
        };
        assert_eq!(serde_json::to_string(&edge).unwrap(), "[5,9,null]");
    }
}
