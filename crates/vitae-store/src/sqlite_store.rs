//! SQLite-backed implementation of the EntityStore trait.
//!
//! Persistent storage for profiles that must survive the process. Uses
//! WAL mode and secondary indexes on entity type, lowercase label, and
//! edge endpoints/type, so every indexed operation is a single indexed
//! SQL query. Writes are serialized through the connection mutex;
//! index maintenance happens inside the same statement or transaction
//! as the primary write.

#![cfg(feature = "sqlite")]

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, Row};
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::{Arc, Mutex};
use vitae_core::error::Result;
use vitae_core::types::{
    clamp_unit, Entity, EntityId, EntityMetadata, EntitySource, EntityType, RelationId,
    RelationMetadata, RelationProperties, RelationType, Relationship,
};
use vitae_core::{EntityStore, StoreStats, VitaeError};

/// SQLite-backed entity store.
pub struct SqliteStore {
    conn: Arc<Mutex<Connection>>,
}

fn sql_err(e: rusqlite::Error) -> VitaeError {
    VitaeError::Storage(e.to_string())
}

impl SqliteStore {
    /// Create a new in-memory SQLite store (used mainly by tests).
    pub fn new_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().map_err(sql_err)?;
        Self::init_with_connection(conn)
    }

    /// Create or open a file-backed store.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let conn = Connection::open(path).map_err(sql_err)?;
        Self::init_with_connection(conn)
    }

    fn init_with_connection(conn: Connection) -> Result<Self> {
        conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA synchronous=NORMAL;")
            .map_err(sql_err)?;

        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS nodes (
                id TEXT PRIMARY KEY,
                entity_type TEXT NOT NULL,
                label TEXT NOT NULL,
                label_lower TEXT NOT NULL,
                description TEXT,
                properties TEXT NOT NULL DEFAULT '{}',
                created_at TEXT NOT NULL,
                source TEXT NOT NULL,
                confidence REAL NOT NULL,
                frequency INTEGER NOT NULL DEFAULT 1
            );

            CREATE TABLE IF NOT EXISTS edges (
                id TEXT PRIMARY KEY,
                source_id TEXT NOT NULL,
                target_id TEXT NOT NULL,
                relation_type TEXT NOT NULL,
                weight REAL NOT NULL,
                context TEXT,
                inferred INTEGER NOT NULL,
                confidence REAL NOT NULL,
                updated_at TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_nodes_type ON nodes(entity_type);
            CREATE INDEX IF NOT EXISTS idx_nodes_label_lower ON nodes(label_lower);
            CREATE INDEX IF NOT EXISTS idx_edges_source ON edges(source_id);
            CREATE INDEX IF NOT EXISTS idx_edges_target ON edges(target_id);
            CREATE INDEX IF NOT EXISTS idx_edges_type ON edges(relation_type);
            "#,
        )
        .map_err(sql_err)?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    fn row_to_entity(row: &Row<'_>) -> rusqlite::Result<Entity> {
        let id_str: String = row.get(0)?;
        let type_str: String = row.get(1)?;
        let props_str: String = row.get(5)?;
        let created_str: String = row.get(6)?;
        let source_str: String = row.get(7)?;

        let properties: BTreeMap<String, serde_json::Value> =
            serde_json::from_str(&props_str).unwrap_or_default();

        Ok(Entity {
            id: EntityId::parse(&id_str).unwrap_or_default(),
            entity_type: EntityType::parse(&type_str).unwrap_or(EntityType::Skill),
            label: row.get(2)?,
            description: row.get(4)?,
            properties,
            metadata: EntityMetadata {
                created_at: parse_timestamp(&created_str),
                source: EntitySource::parse(&source_str).unwrap_or(EntitySource::Inferred),
                confidence: row.get(8)?,
                frequency: row.get(9)?,
            },
        })
    }

    fn row_to_relation(row: &Row<'_>) -> rusqlite::Result<Relationship> {
        let id_str: String = row.get(0)?;
        let source_str: String = row.get(1)?;
        let target_str: String = row.get(2)?;
        let type_str: String = row.get(3)?;
        let updated_str: String = row.get(8)?;

        Ok(Relationship {
            id: RelationId::parse(&id_str).unwrap_or_default(),
            source: EntityId::parse(&source_str).unwrap_or_default(),
            target: EntityId::parse(&target_str).unwrap_or_default(),
            relation_type: RelationType::parse(&type_str).unwrap_or(RelationType::RelatedTo),
            properties: RelationProperties {
                weight: row.get(4)?,
                context: row.get(5)?,
            },
            metadata: RelationMetadata {
                inferred: row.get::<_, i64>(6)? != 0,
                confidence: row.get(7)?,
                updated_at: parse_timestamp(&updated_str),
            },
        })
    }

    fn query_nodes(&self, sql: &str, args: &[&dyn rusqlite::ToSql]) -> Result<Vec<Entity>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(sql).map_err(sql_err)?;
        let rows = stmt
            .query_map(args, Self::row_to_entity)
            .map_err(sql_err)?
            .collect::<rusqlite::Result<Vec<_>>>()
            .map_err(sql_err)?;
        Ok(rows)
    }

    fn query_edges(&self, sql: &str, args: &[&dyn rusqlite::ToSql]) -> Result<Vec<Relationship>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(sql).map_err(sql_err)?;
        let rows = stmt
            .query_map(args, Self::row_to_relation)
            .map_err(sql_err)?
            .collect::<rusqlite::Result<Vec<_>>>()
            .map_err(sql_err)?;
        Ok(rows)
    }

    fn node_exists(conn: &Connection, id: &EntityId) -> Result<bool> {
        let count: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM nodes WHERE id = ?1",
                params![id.to_string()],
                |row| row.get(0),
            )
            .map_err(sql_err)?;
        Ok(count > 0)
    }
}

fn parse_timestamp(s: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|_| Utc::now())
}

const NODE_COLUMNS: &str =
    "id, entity_type, label, label_lower, description, properties, created_at, source, confidence, frequency";
const EDGE_COLUMNS: &str =
    "id, source_id, target_id, relation_type, weight, context, inferred, confidence, updated_at";

impl EntityStore for SqliteStore {
    fn upsert_node(&mut self, mut entity: Entity) -> Result<Entity> {
        if entity.label.trim().is_empty() {
            return Err(VitaeError::empty_label());
        }
        entity.metadata.confidence = clamp_unit(entity.metadata.confidence);
        entity.metadata.frequency = entity.metadata.frequency.max(1);

        let properties = serde_json::to_string(&entity.properties)?;
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "INSERT OR REPLACE INTO nodes (id, entity_type, label, label_lower, description, properties, created_at, source, confidence, frequency)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
            params![
                entity.id.to_string(),
                entity.entity_type.as_str(),
                entity.label,
                entity.label.to_lowercase(),
                entity.description,
                properties,
                entity.metadata.created_at.to_rfc3339(),
                entity.metadata.source.as_str(),
                entity.metadata.confidence,
                entity.metadata.frequency,
            ],
        )
        .map_err(sql_err)?;

        Ok(entity)
    }

    fn get_node(&self, id: &EntityId) -> Result<Option<Entity>> {
        let nodes = self.query_nodes(
            &format!("SELECT {NODE_COLUMNS} FROM nodes WHERE id = ?1"),
            &[&id.to_string()],
        )?;
        Ok(nodes.into_iter().next())
    }

    fn nodes_by_type(&self, entity_type: EntityType) -> Result<Vec<Entity>> {
        self.query_nodes(
            &format!("SELECT {NODE_COLUMNS} FROM nodes WHERE entity_type = ?1"),
            &[&entity_type.as_str()],
        )
    }

    fn search_label(&self, query: &str) -> Result<Vec<Entity>> {
        let pattern = format!("%{}%", query.to_lowercase());
        self.query_nodes(
            &format!("SELECT {NODE_COLUMNS} FROM nodes WHERE label_lower LIKE ?1"),
            &[&pattern],
        )
    }

    fn delete_node(&mut self, id: &EntityId) -> Result<bool> {
        let mut conn = self.conn.lock().unwrap();
        let tx = conn.transaction().map_err(sql_err)?;
        // Cascade to incident edges in the same transaction.
        tx.execute(
            "DELETE FROM edges WHERE source_id = ?1 OR target_id = ?1",
            params![id.to_string()],
        )
        .map_err(sql_err)?;
        let deleted = tx
            .execute("DELETE FROM nodes WHERE id = ?1", params![id.to_string()])
            .map_err(sql_err)?;
        tx.commit().map_err(sql_err)?;
        Ok(deleted > 0)
    }

    fn upsert_edge(&mut self, mut relation: Relationship) -> Result<Relationship> {
        relation.properties.weight = clamp_unit(relation.properties.weight);
        relation.metadata.confidence = clamp_unit(relation.metadata.confidence);

        let conn = self.conn.lock().unwrap();
        if !Self::node_exists(&conn, &relation.source)? {
            return Err(VitaeError::missing_endpoint(
                relation.id.to_string(),
                relation.source.to_string(),
            ));
        }
        if !Self::node_exists(&conn, &relation.target)? {
            return Err(VitaeError::missing_endpoint(
                relation.id.to_string(),
                relation.target.to_string(),
            ));
        }

        conn.execute(
            "INSERT OR REPLACE INTO edges (id, source_id, target_id, relation_type, weight, context, inferred, confidence, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
            params![
                relation.id.to_string(),
                relation.source.to_string(),
                relation.target.to_string(),
                relation.relation_type.as_str(),
                relation.properties.weight,
                relation.properties.context,
                relation.metadata.inferred as i64,
                relation.metadata.confidence,
                relation.metadata.updated_at.to_rfc3339(),
            ],
        )
        .map_err(sql_err)?;

        Ok(relation)
    }

    fn get_edge(&self, id: &RelationId) -> Result<Option<Relationship>> {
        let edges = self.query_edges(
            &format!("SELECT {EDGE_COLUMNS} FROM edges WHERE id = ?1"),
            &[&id.to_string()],
        )?;
        Ok(edges.into_iter().next())
    }

    fn edges_from(&self, source: &EntityId) -> Result<Vec<Relationship>> {
        self.query_edges(
            &format!("SELECT {EDGE_COLUMNS} FROM edges WHERE source_id = ?1"),
            &[&source.to_string()],
        )
    }

    fn edges_to(&self, target: &EntityId) -> Result<Vec<Relationship>> {
        self.query_edges(
            &format!("SELECT {EDGE_COLUMNS} FROM edges WHERE target_id = ?1"),
            &[&target.to_string()],
        )
    }

    fn edges_by_type(&self, relation_type: RelationType) -> Result<Vec<Relationship>> {
        self.query_edges(
            &format!("SELECT {EDGE_COLUMNS} FROM edges WHERE relation_type = ?1"),
            &[&relation_type.as_str()],
        )
    }

    fn delete_edge(&mut self, id: &RelationId) -> Result<bool> {
        let conn = self.conn.lock().unwrap();
        let deleted = conn
            .execute("DELETE FROM edges WHERE id = ?1", params![id.to_string()])
            .map_err(sql_err)?;
        Ok(deleted > 0)
    }

    fn all_nodes(&self) -> Result<Vec<Entity>> {
        self.query_nodes(&format!("SELECT {NODE_COLUMNS} FROM nodes"), &[])
    }

    fn all_edges(&self) -> Result<Vec<Relationship>> {
        self.query_edges(&format!("SELECT {EDGE_COLUMNS} FROM edges"), &[])
    }

    fn statistics(&self) -> Result<StoreStats> {
        let conn = self.conn.lock().unwrap();
        let node_count: usize = conn
            .query_row("SELECT COUNT(*) FROM nodes", [], |row| row.get(0))
            .map_err(sql_err)?;
        let edge_count: usize = conn
            .query_row("SELECT COUNT(*) FROM edges", [], |row| row.get(0))
            .map_err(sql_err)?;
        Ok(StoreStats {
            node_count,
            edge_count,
        })
    }

    fn clear(&mut self) -> Result<()> {
        let mut conn = self.conn.lock().unwrap();
        let tx = conn.transaction().map_err(sql_err)?;
        tx.execute("DELETE FROM edges", []).map_err(sql_err)?;
        tx.execute("DELETE FROM nodes", []).map_err(sql_err)?;
        tx.commit().map_err(sql_err)?;
        Ok(())
    }
}
