use std::path::Path;

use anyhow::{Context, Result};
use rusqlite::{params, OptionalExtension, Transaction};

use crate::domain::entities::entity::{Entity, EntityId, ID_FIELD};
use crate::domain::entities::schema::EntityKind;
use crate::infra::sqlite::schema::open_connection;
use crate::usecase::ports::repo::Fields;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InsertOutcome {
    Inserted(EntityId),
    Duplicate(EntityId),
}

fn int_id(id: &EntityId) -> Option<i64> {
    match id {
        EntityId::Int(value) => Some(*value),
        EntityId::Text(_) => None,
    }
}

fn decode_body(kind: EntityKind, body: &str) -> Result<Entity> {
    let value: serde_json::Value = serde_json::from_str(body)
        .with_context(|| format!("failed to decode stored {} body", kind.slug()))?;
    Ok(kind.schema().entity_from_json(&value))
}

fn next_int_id(tx: &Transaction<'_>, kind: EntityKind) -> Result<i64> {
    tx.query_row(
        "SELECT COALESCE(MAX(int_id), 0) + 1 FROM entity WHERE kind = ?1",
        params![kind.slug()],
        |row| row.get(0),
    )
    .context("failed to compute next entity id")
}

fn entity_exists(tx: &Transaction<'_>, kind: EntityKind, id: &EntityId) -> Result<bool> {
    let found = tx
        .query_row(
            "SELECT 1 FROM entity WHERE kind = ?1 AND entity_key = ?2",
            params![kind.slug(), id.key()],
            |_| Ok(()),
        )
        .optional()
        .context("failed to look up entity")?;
    Ok(found.is_some())
}

/// Inserts inside an open transaction, assigning the next integer id when
/// `fields` carries none.
fn insert_in_tx(tx: &Transaction<'_>, kind: EntityKind, mut fields: Fields) -> Result<InsertOutcome> {
    let id = match fields.get(ID_FIELD).and_then(EntityId::from_value) {
        Some(id) => id,
        None => EntityId::Int(next_int_id(tx, kind)?),
    };

    if entity_exists(tx, kind, &id)? {
        return Ok(InsertOutcome::Duplicate(id));
    }

    fields.insert(ID_FIELD.to_string(), id.to_value());
    let body = Entity::from_fields(fields).to_json().to_string();
    tx.execute(
        "INSERT INTO entity(kind, entity_key, int_id, body) VALUES (?1, ?2, ?3, ?4)",
        params![kind.slug(), id.key(), int_id(&id), body],
    )
    .with_context(|| format!("failed to insert {} #{id}", kind.slug()))?;

    Ok(InsertOutcome::Inserted(id))
}

pub fn list_entities(db_path: &Path, kind: EntityKind) -> Result<Vec<Entity>> {
    let conn = open_connection(db_path)?;
    let mut stmt = conn
        .prepare(
            "SELECT body
             FROM entity
             WHERE kind = ?1
             ORDER BY seq ASC",
        )
        .context("failed to prepare entity list query")?;

    let bodies = stmt
        .query_map(params![kind.slug()], |row| row.get::<_, String>(0))
        .context("failed to query entities")?
        .collect::<rusqlite::Result<Vec<_>>>()
        .context("failed to collect entities")?;

    bodies.iter().map(|body| decode_body(kind, body)).collect()
}

pub fn get_entity(db_path: &Path, kind: EntityKind, id: &EntityId) -> Result<Option<Entity>> {
    let conn = open_connection(db_path)?;
    let body = conn
        .query_row(
            "SELECT body FROM entity WHERE kind = ?1 AND entity_key = ?2",
            params![kind.slug(), id.key()],
            |row| row.get::<_, String>(0),
        )
        .optional()
        .with_context(|| format!("failed to load {} #{id}", kind.slug()))?;

    body.map(|body| decode_body(kind, &body)).transpose()
}

pub fn insert_entity(db_path: &Path, kind: EntityKind, fields: Fields) -> Result<InsertOutcome> {
    let mut conn = open_connection(db_path)?;
    let tx = conn
        .transaction()
        .context("failed to start entity insert transaction")?;
    let outcome = insert_in_tx(&tx, kind, fields)?;
    tx.commit().context("failed to commit entity insert")?;
    Ok(outcome)
}

/// All-or-nothing bulk insert used by imports.
pub fn insert_entities(db_path: &Path, kind: EntityKind, rows: Vec<Fields>) -> Result<Vec<EntityId>> {
    let mut conn = open_connection(db_path)?;
    let tx = conn
        .transaction()
        .context("failed to start bulk insert transaction")?;

    let mut ids = Vec::with_capacity(rows.len());
    for (row_idx, fields) in rows.into_iter().enumerate() {
        match insert_in_tx(&tx, kind, fields)? {
            InsertOutcome::Inserted(id) => ids.push(id),
            InsertOutcome::Duplicate(id) => {
                anyhow::bail!("row {}: {} #{id} already exists", row_idx + 1, kind.slug())
            }
        }
    }

    tx.commit().context("failed to commit bulk insert")?;
    Ok(ids)
}

/// Merges `fields` over the stored record. Returns `false` when the entity
/// does not exist. The id is never changed.
pub fn update_entity(db_path: &Path, kind: EntityKind, id: &EntityId, fields: Fields) -> Result<bool> {
    let mut conn = open_connection(db_path)?;
    let tx = conn
        .transaction()
        .context("failed to start entity update transaction")?;

    let body = tx
        .query_row(
            "SELECT body FROM entity WHERE kind = ?1 AND entity_key = ?2",
            params![kind.slug(), id.key()],
            |row| row.get::<_, String>(0),
        )
        .optional()
        .with_context(|| format!("failed to load {} #{id}", kind.slug()))?;
    let Some(body) = body else {
        return Ok(false);
    };

    let mut entity = decode_body(kind, &body)?;
    for (name, value) in fields {
        if name != ID_FIELD {
            entity.set(&name, value);
        }
    }
    entity.set(ID_FIELD, id.to_value());

    tx.execute(
        "UPDATE entity
         SET body = ?1, updated_at = CURRENT_TIMESTAMP
         WHERE kind = ?2 AND entity_key = ?3",
        params![entity.to_json().to_string(), kind.slug(), id.key()],
    )
    .with_context(|| format!("failed to update {} #{id}", kind.slug()))?;

    tx.commit().context("failed to commit entity update")?;
    Ok(true)
}

pub fn delete_entities(db_path: &Path, kind: EntityKind, ids: &[EntityId]) -> Result<usize> {
    let mut conn = open_connection(db_path)?;
    let tx = conn
        .transaction()
        .context("failed to start delete transaction")?;

    let mut removed = 0;
    {
        let mut delete_stmt = tx
            .prepare("DELETE FROM entity WHERE kind = ?1 AND entity_key = ?2")
            .context("failed to prepare entity delete")?;
        for id in ids {
            removed += delete_stmt
                .execute(params![kind.slug(), id.key()])
                .with_context(|| format!("failed to delete {} #{id}", kind.slug()))?;
        }
    }

    tx.commit().context("failed to commit delete transaction")?;
    Ok(removed)
}
