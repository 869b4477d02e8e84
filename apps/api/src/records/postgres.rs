use anyhow::{Context, Result};
use async_trait::async_trait;
use serde_json::Value;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use tracing::{debug, info};

use crate::models::records::{Collection, RawRecord};
use crate::records::RecordStore;

/// Record store backed by the `postings` and `profiles` tables.
#[derive(Clone)]
pub struct PgRecordStore {
    pool: PgPool,
}

impl PgRecordStore {
    /// Creates the connection pool and wraps it in a store.
    pub async fn connect(database_url: &str) -> Result<Self> {
        info!("Connecting to PostgreSQL...");

        let pool = PgPoolOptions::new()
            .max_connections(10)
            .connect(database_url)
            .await
            .context("Failed to connect to PostgreSQL")?;

        info!("PostgreSQL connection pool established");
        Ok(Self { pool })
    }
}

#[async_trait]
impl RecordStore for PgRecordStore {
    async fn insert(&self, collection: Collection, record: RawRecord) -> Result<()> {
        let fields = collection.fields();
        let sql = insert_statement(collection);

        let mut query = sqlx::query(&sql);
        for field in fields {
            let text = record
                .get(*field)
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string();
            query = query.bind(text);
        }
        query.execute(&self.pool).await?;

        info!("Inserted record into {}", collection.table());
        Ok(())
    }

    async fn fetch_all(&self, collection: Collection) -> Result<Vec<RawRecord>> {
        // Table names come from a closed enum, never from request input.
        let sql = format!(
            "SELECT to_jsonb(r) FROM {} r ORDER BY r.created_at, r.id",
            collection.table()
        );
        let rows: Vec<Value> = sqlx::query_scalar(&sql).fetch_all(&self.pool).await?;

        debug!("Fetched {} rows from {}", rows.len(), collection.table());
        Ok(rows
            .into_iter()
            .filter_map(|row| match row {
                Value::Object(map) => Some(map),
                _ => None,
            })
            .collect())
    }
}

fn insert_statement(collection: Collection) -> String {
    let fields = collection.fields();
    let placeholders: Vec<String> = (1..=fields.len()).map(|i| format!("${i}")).collect();
    format!(
        "INSERT INTO {} ({}) VALUES ({})",
        collection.table(),
        fields.join(", "),
        placeholders.join(", ")
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_statement_for_postings() {
        assert_eq!(
            insert_statement(Collection::Postings),
            "INSERT INTO postings (title, company, location, about, description, \
             responsibilities, qualifications, preferred) VALUES ($1, $2, $3, $4, $5, $6, $7, $8)"
        );
    }

    #[test]
    fn test_insert_statement_for_profiles_has_one_placeholder_per_field() {
        let sql = insert_statement(Collection::Profiles);
        assert!(sql.starts_with("INSERT INTO profiles (name, profile,"));
        assert!(sql.ends_with("($1, $2, $3, $4, $5, $6, $7)"));
    }
}
