//! PostgreSQL document store
//!
//! Each collection is a table `(id TEXT PRIMARY KEY, seq BIGSERIAL, doc JSONB)`
//! (see `migrations/0001_collections.sql`). Field names are always bound as
//! parameters; only collection names are spliced into SQL, and only after
//! they are checked against [`COLLECTIONS`].

use async_trait::async_trait;
use serde_json::Value;
use sqlx::{PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use super::{
    text_index_fields, Document, DocumentStore, FieldUpdate, Filter, Stage, StoreError,
    COLLECTIONS, ID_FIELD,
};

/// SQLSTATE for unique_violation
const UNIQUE_VIOLATION: &str = "23505";

/// Document store backed by JSONB tables
#[derive(Debug, Clone)]
pub struct PgDocumentStore {
    pool: PgPool,
}

impl PgDocumentStore {
    /// Create a new PgDocumentStore with a database pool
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Resolve a collection name to its table, rejecting anything unknown.
fn table(collection: &str) -> Result<&'static str, StoreError> {
    COLLECTIONS
        .iter()
        .copied()
        .find(|c| *c == collection)
        .ok_or_else(|| StoreError::UnknownCollection(collection.to_string()))
}

fn push_filter(qb: &mut QueryBuilder<'_, Postgres>, filter: &Filter) {
    match filter {
        Filter::All => {
            qb.push("TRUE");
        }
        Filter::Eq(field, value) => {
            qb.push("doc -> ");
            qb.push_bind(field.clone());
            qb.push(" = ");
            qb.push_bind(value.clone());
        }
        Filter::ContainsCaseInsensitive(field, text) => {
            qb.push("strpos(lower(doc ->> ");
            qb.push_bind(field.clone());
            qb.push("), lower(");
            qb.push_bind(text.clone());
            qb.push(")) > 0");
        }
    }
}

/// Append one pipeline stage as a CTE named `s{index}` reading from `s{index - 1}`.
///
/// Every CTE carries an `ord` column so document order survives between stages.
fn push_stage(
    qb: &mut QueryBuilder<'_, Postgres>,
    index: usize,
    stage: &Stage,
) -> Result<(), StoreError> {
    let prev = format!("s{}", index - 1);
    qb.push(format!(", s{index} AS ("));

    match stage {
        Stage::Group { key, average, output } => {
            qb.push(
                "SELECT row_number() OVER (ORDER BY g.k #>> '{}' COLLATE \"C\" NULLS FIRST) AS ord, \
                 jsonb_build_object('_id', g.k, ",
            );
            qb.push_bind(output.clone());
            qb.push("::text, g.a) AS doc FROM (SELECT doc -> ");
            qb.push_bind(key.clone());
            qb.push(" AS k, AVG(CASE WHEN jsonb_typeof(doc -> ");
            qb.push_bind(average.clone());
            qb.push(") = 'number' THEN (doc ->> ");
            qb.push_bind(average.clone());
            qb.push(format!(")::float8 END) AS a FROM {prev} GROUP BY k) g"));
        }
        Stage::Sort { field, descending } => {
            qb.push("SELECT row_number() OVER (ORDER BY doc -> ");
            qb.push_bind(field.clone());
            if *descending {
                qb.push(" DESC NULLS LAST");
            } else {
                qb.push(" ASC NULLS FIRST");
            }
            qb.push(format!(", ord) AS ord, doc FROM {prev}"));
        }
        Stage::Limit(n) => {
            let limit = i64::try_from(*n)
                .map_err(|_| StoreError::InvalidQuery(format!("limit {n} out of range")))?;
            qb.push(format!("SELECT ord, doc FROM {prev} ORDER BY ord LIMIT "));
            qb.push_bind(limit);
        }
        Stage::Lookup {
            from,
            local_field,
            foreign_field,
            as_field,
        } => {
            let from = table(from)?;
            qb.push("SELECT p.ord, p.doc || jsonb_build_object(");
            qb.push_bind(as_field.clone());
            qb.push(format!(
                "::text, COALESCE((SELECT jsonb_agg(f.doc ORDER BY f.seq) FROM {from} f WHERE f.doc -> "
            ));
            qb.push_bind(foreign_field.clone());
            qb.push(" = p.doc -> ");
            qb.push_bind(local_field.clone());
            qb.push(format!("), '[]'::jsonb)) AS doc FROM {prev} p"));
        }
    }

    qb.push(")");
    Ok(())
}

fn map_insert_error(err: sqlx::Error, id: &str) -> StoreError {
    match &err {
        sqlx::Error::Database(db) if db.code().as_deref() == Some(UNIQUE_VIOLATION) => {
            StoreError::DuplicateKey(id.to_string())
        }
        _ => StoreError::Connectivity(err),
    }
}

#[async_trait]
impl DocumentStore for PgDocumentStore {
    async fn insert(&self, collection: &str, mut document: Document) -> Result<String, StoreError> {
        let table = table(collection)?;
        let object = document
            .as_object_mut()
            .ok_or_else(|| StoreError::InvalidDocument("document must be a JSON object".to_string()))?;

        let id = match object.get(ID_FIELD) {
            Some(Value::String(id)) => id.clone(),
            None | Some(Value::Null) => Uuid::new_v4().to_string(),
            Some(other) => {
                return Err(StoreError::InvalidDocument(format!(
                    "{ID_FIELD} must be a string, got {other}"
                )))
            }
        };
        object.insert(ID_FIELD.to_string(), Value::String(id.clone()));

        sqlx::query(&format!("INSERT INTO {table} (id, doc) VALUES ($1, $2)"))
            .bind(&id)
            .bind(&document)
            .execute(&self.pool)
            .await
            .map_err(|e| map_insert_error(e, &id))?;

        tracing::debug!(collection, id = %id, "Document inserted");
        Ok(id)
    }

    async fn replace_one(
        &self,
        collection: &str,
        filter: &Filter,
        document: Document,
    ) -> Result<u64, StoreError> {
        let table = table(collection)?;
        if !document.is_object() {
            return Err(StoreError::InvalidDocument(
                "document must be a JSON object".to_string(),
            ));
        }

        // The stored `_id` always wins over whatever the replacement carries
        let mut qb = QueryBuilder::<Postgres>::new(format!(
            "WITH target AS (SELECT id FROM {table} WHERE "
        ));
        push_filter(&mut qb, filter);
        qb.push(format!(
            " ORDER BY seq LIMIT 1) UPDATE {table} AS t SET doc = jsonb_set("
        ));
        qb.push_bind(document.clone());
        qb.push(", '{_id}', to_jsonb(t.id)) FROM target WHERE t.id = target.id AND t.doc IS DISTINCT FROM jsonb_set(");
        qb.push_bind(document);
        qb.push(", '{_id}', to_jsonb(t.id))");

        let modified = qb.build().execute(&self.pool).await?.rows_affected();
        tracing::debug!(collection, modified, "Document replace");
        Ok(modified)
    }

    async fn update_one(
        &self,
        collection: &str,
        filter: &Filter,
        update: &FieldUpdate,
    ) -> Result<u64, StoreError> {
        let table = table(collection)?;
        if update.field == ID_FIELD {
            return Err(StoreError::InvalidQuery(format!("{ID_FIELD} is immutable")));
        }

        let mut qb = QueryBuilder::<Postgres>::new(format!(
            "WITH target AS (SELECT id FROM {table} WHERE "
        ));
        push_filter(&mut qb, filter);
        qb.push(format!(
            " ORDER BY seq LIMIT 1) UPDATE {table} AS t SET doc = jsonb_set(t.doc, ARRAY["
        ));
        qb.push_bind(update.field.clone());
        qb.push("], ");
        qb.push_bind(update.value.clone());
        qb.push(") FROM target WHERE t.id = target.id AND t.doc -> ");
        qb.push_bind(update.field.clone());
        qb.push(" IS DISTINCT FROM ");
        qb.push_bind(update.value.clone());

        let modified = qb.build().execute(&self.pool).await?.rows_affected();
        tracing::debug!(collection, field = %update.field, modified, "Document field update");
        Ok(modified)
    }

    async fn delete_one(&self, collection: &str, filter: &Filter) -> Result<u64, StoreError> {
        let table = table(collection)?;
        let mut qb = QueryBuilder::<Postgres>::new(format!(
            "DELETE FROM {table} WHERE id IN (SELECT id FROM {table} WHERE "
        ));
        push_filter(&mut qb, filter);
        qb.push(" ORDER BY seq LIMIT 1)");

        Ok(qb.build().execute(&self.pool).await?.rows_affected())
    }

    async fn delete_many(&self, collection: &str, filter: &Filter) -> Result<u64, StoreError> {
        let table = table(collection)?;
        let mut qb = QueryBuilder::<Postgres>::new(format!("DELETE FROM {table} WHERE "));
        push_filter(&mut qb, filter);

        Ok(qb.build().execute(&self.pool).await?.rows_affected())
    }

    async fn find(&self, collection: &str, filter: &Filter) -> Result<Vec<Document>, StoreError> {
        let table = table(collection)?;
        let mut qb = QueryBuilder::<Postgres>::new(format!("SELECT doc FROM {table} WHERE "));
        push_filter(&mut qb, filter);
        qb.push(" ORDER BY seq");

        let documents = qb
            .build_query_scalar::<Value>()
            .fetch_all(&self.pool)
            .await?;
        Ok(documents)
    }

    async fn aggregate(
        &self,
        collection: &str,
        pipeline: &[Stage],
    ) -> Result<Vec<Document>, StoreError> {
        let table = table(collection)?;
        let mut qb = QueryBuilder::<Postgres>::new(format!(
            "WITH s0 AS (SELECT row_number() OVER (ORDER BY seq) AS ord, doc FROM {table})"
        ));
        for (i, stage) in pipeline.iter().enumerate() {
            push_stage(&mut qb, i + 1, stage)?;
        }
        qb.push(format!(" SELECT doc FROM s{} ORDER BY ord", pipeline.len()));

        let documents = qb
            .build_query_scalar::<Value>()
            .fetch_all(&self.pool)
            .await?;
        tracing::debug!(collection, stages = pipeline.len(), rows = documents.len(), "Aggregation executed");
        Ok(documents)
    }

    async fn text_search(
        &self,
        collection: &str,
        query: &str,
    ) -> Result<Vec<Document>, StoreError> {
        let table = table(collection)?;
        let fields = text_index_fields(collection);
        if fields.is_empty() {
            return Err(StoreError::InvalidQuery(format!(
                "collection {collection} has no text index"
            )));
        }

        // plainto_tsquery joins terms with AND; swap to OR so any term matches
        let mut qb = QueryBuilder::<Postgres>::new(
            "SELECT d.doc FROM (SELECT doc, seq, to_tsvector('simple', concat_ws(' '",
        );
        for field in fields {
            qb.push(", doc ->> ");
            qb.push_bind(*field);
        }
        qb.push(format!(
            ")) AS v FROM {table}) d, (SELECT replace(plainto_tsquery('simple', "
        ));
        qb.push_bind(query.to_string());
        qb.push(
            ")::text, '&', '|')::tsquery AS q) t WHERE d.v @@ t.q ORDER BY ts_rank(d.v, t.q) DESC, d.seq",
        );

        let documents = qb
            .build_query_scalar::<Value>()
            .fetch_all(&self.pool)
            .await?;
        Ok(documents)
    }
}
