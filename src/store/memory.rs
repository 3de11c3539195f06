//! In-process document store
//!
//! Keeps every collection as a vector of JSON documents behind one lock.
//! Each trait operation takes the lock once, so single operations are atomic
//! the same way they are in a real store.

use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap};

use async_trait::async_trait;
use serde_json::{Map, Value};
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{text_index_fields, Document, DocumentStore, FieldUpdate, Filter, Stage, StoreError, ID_FIELD};

type Collections = HashMap<String, Vec<Document>>;

/// Document store living in process memory. Collections are created on
/// first use.
#[derive(Debug, Default)]
pub struct MemoryDocumentStore {
    collections: RwLock<Collections>,
}

impl MemoryDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl DocumentStore for MemoryDocumentStore {
    async fn insert(&self, collection: &str, mut document: Document) -> Result<String, StoreError> {
        let object = as_object_mut(&mut document)?;
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

        let mut collections = self.collections.write().await;
        let documents = collections.entry(collection.to_string()).or_default();
        if documents.iter().any(|d| d.get(ID_FIELD) == document.get(ID_FIELD)) {
            return Err(StoreError::DuplicateKey(id));
        }
        documents.push(document);

        Ok(id)
    }

    async fn replace_one(
        &self,
        collection: &str,
        filter: &Filter,
        mut document: Document,
    ) -> Result<u64, StoreError> {
        as_object_mut(&mut document)?;

        let mut collections = self.collections.write().await;
        let Some(existing) = collections
            .get_mut(collection)
            .and_then(|docs| docs.iter_mut().find(|d| filter.matches(d)))
        else {
            return Ok(0);
        };

        let id = existing.get(ID_FIELD).cloned().unwrap_or(Value::Null);
        as_object_mut(&mut document)?.insert(ID_FIELD.to_string(), id);

        if *existing == document {
            return Ok(0);
        }
        *existing = document;
        Ok(1)
    }

    async fn update_one(
        &self,
        collection: &str,
        filter: &Filter,
        update: &FieldUpdate,
    ) -> Result<u64, StoreError> {
        if update.field == ID_FIELD {
            return Err(StoreError::InvalidQuery(format!("{ID_FIELD} is immutable")));
        }

        let mut collections = self.collections.write().await;
        let Some(existing) = collections
            .get_mut(collection)
            .and_then(|docs| docs.iter_mut().find(|d| filter.matches(d)))
        else {
            return Ok(0);
        };

        let object = as_object_mut(existing)?;
        if object.get(&update.field) == Some(&update.value) {
            return Ok(0);
        }
        object.insert(update.field.clone(), update.value.clone());
        Ok(1)
    }

    async fn delete_one(&self, collection: &str, filter: &Filter) -> Result<u64, StoreError> {
        let mut collections = self.collections.write().await;
        let Some(documents) = collections.get_mut(collection) else {
            return Ok(0);
        };

        match documents.iter().position(|d| filter.matches(d)) {
            Some(index) => {
                documents.remove(index);
                Ok(1)
            }
            None => Ok(0),
        }
    }

    async fn delete_many(&self, collection: &str, filter: &Filter) -> Result<u64, StoreError> {
        let mut collections = self.collections.write().await;
        let Some(documents) = collections.get_mut(collection) else {
            return Ok(0);
        };

        let before = documents.len();
        documents.retain(|d| !filter.matches(d));
        Ok((before - documents.len()) as u64)
    }

    async fn find(&self, collection: &str, filter: &Filter) -> Result<Vec<Document>, StoreError> {
        let collections = self.collections.read().await;
        Ok(collections
            .get(collection)
            .map(|docs| docs.iter().filter(|d| filter.matches(d)).cloned().collect())
            .unwrap_or_default())
    }

    async fn aggregate(
        &self,
        collection: &str,
        pipeline: &[Stage],
    ) -> Result<Vec<Document>, StoreError> {
        let collections = self.collections.read().await;
        let mut documents = collections.get(collection).cloned().unwrap_or_default();

        for stage in pipeline {
            documents = run_stage(&collections, documents, stage);
        }

        Ok(documents)
    }

    async fn text_search(
        &self,
        collection: &str,
        query: &str,
    ) -> Result<Vec<Document>, StoreError> {
        let fields = text_index_fields(collection);
        if fields.is_empty() {
            return Err(StoreError::InvalidQuery(format!(
                "collection {collection} has no text index"
            )));
        }

        let terms = tokenize(query);
        if terms.is_empty() {
            return Ok(Vec::new());
        }

        let collections = self.collections.read().await;
        let mut scored: Vec<(usize, Document)> = collections
            .get(collection)
            .map(|docs| {
                docs.iter()
                    .filter_map(|doc| {
                        let indexed: Vec<String> = fields
                            .iter()
                            .filter_map(|f| doc.get(*f).and_then(Value::as_str))
                            .flat_map(tokenize)
                            .collect();
                        let score = terms.iter().filter(|t| indexed.contains(*t)).count();
                        (score > 0).then(|| (score, doc.clone()))
                    })
                    .collect()
            })
            .unwrap_or_default();

        scored.sort_by(|a, b| b.0.cmp(&a.0));
        Ok(scored.into_iter().map(|(_, doc)| doc).collect())
    }
}

fn as_object_mut(document: &mut Document) -> Result<&mut Map<String, Value>, StoreError> {
    document
        .as_object_mut()
        .ok_or_else(|| StoreError::InvalidDocument("document must be a JSON object".to_string()))
}

/// Lower-cased words, split on anything that is not alphanumeric
fn tokenize(text: &str) -> Vec<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .map(str::to_lowercase)
        .collect()
}

fn run_stage(collections: &Collections, mut documents: Vec<Document>, stage: &Stage) -> Vec<Document> {
    match stage {
        Stage::Group { key, average, output } => {
            // Ordered by group key so emission order is deterministic
            let mut groups: BTreeMap<GroupKey, (Value, f64, u64)> = BTreeMap::new();
            for doc in &documents {
                let key_value = doc.get(key).cloned().unwrap_or(Value::Null);
                let entry = groups
                    .entry(GroupKey::of(&key_value))
                    .or_insert_with(|| (key_value, 0.0, 0));
                if let Some(n) = doc.get(average).and_then(Value::as_f64) {
                    entry.1 += n;
                    entry.2 += 1;
                }
            }

            groups
                .into_values()
                .map(|(key_value, sum, count)| {
                    let avg = if count == 0 {
                        Value::Null
                    } else {
                        serde_json::Number::from_f64(sum / count as f64)
                            .map(Value::Number)
                            .unwrap_or(Value::Null)
                    };
                    let mut object = Map::new();
                    object.insert(ID_FIELD.to_string(), key_value);
                    object.insert(output.clone(), avg);
                    Value::Object(object)
                })
                .collect()
        }
        Stage::Sort { field, descending } => {
            documents.sort_by(|a, b| {
                let ordering = compare_values(a.get(field), b.get(field));
                if *descending {
                    ordering.reverse()
                } else {
                    ordering
                }
            });
            documents
        }
        Stage::Limit(n) => {
            documents.truncate(*n);
            documents
        }
        Stage::Lookup {
            from,
            local_field,
            foreign_field,
            as_field,
        } => {
            let foreign = collections.get(from);
            for doc in &mut documents {
                let joined: Vec<Document> = match (doc.get(local_field), foreign) {
                    (Some(local), Some(foreign)) => foreign
                        .iter()
                        .filter(|f| f.get(foreign_field) == Some(local))
                        .cloned()
                        .collect(),
                    _ => Vec::new(),
                };
                if let Some(object) = doc.as_object_mut() {
                    object.insert(as_field.clone(), Value::Array(joined));
                }
            }
            documents
        }
    }
}

/// Ordering key for group emission: null keys first, then by text form.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
enum GroupKey {
    Null,
    Text(String),
}

impl GroupKey {
    fn of(value: &Value) -> Self {
        match value {
            Value::Null => GroupKey::Null,
            Value::String(s) => GroupKey::Text(s.clone()),
            other => GroupKey::Text(other.to_string()),
        }
    }
}

/// Same type order as JSONB: null < string < number < bool < array < object.
/// Missing fields compare as null.
fn compare_values(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    fn rank(value: Option<&Value>) -> u8 {
        match value {
            None | Some(Value::Null) => 0,
            Some(Value::String(_)) => 1,
            Some(Value::Number(_)) => 2,
            Some(Value::Bool(_)) => 3,
            Some(Value::Array(_)) => 4,
            Some(Value::Object(_)) => 5,
        }
    }

    match (a, b) {
        (Some(Value::Number(x)), Some(Value::Number(y))) => x
            .as_f64()
            .partial_cmp(&y.as_f64())
            .unwrap_or(Ordering::Equal),
        (Some(Value::String(x)), Some(Value::String(y))) => x.cmp(y),
        (Some(Value::Bool(x)), Some(Value::Bool(y))) => x.cmp(y),
        _ => rank(a).cmp(&rank(b)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_insert_assigns_id() {
        let store = MemoryDocumentStore::new();

        let id = store.insert("venues", json!({ "name": "A" })).await.unwrap();
        let docs = store.find("venues", &Filter::by_id(&id)).await.unwrap();

        assert_eq!(docs.len(), 1);
        assert_eq!(docs[0]["_id"], json!(id));
    }

    #[tokio::test]
    async fn test_insert_rejects_duplicate_id_and_non_objects() {
        let store = MemoryDocumentStore::new();
        store.insert("venues", json!({ "_id": "x" })).await.unwrap();

        let dup = store.insert("venues", json!({ "_id": "x" })).await;
        assert!(matches!(dup, Err(StoreError::DuplicateKey(_))));

        let bad = store.insert("venues", json!([1, 2])).await;
        assert!(matches!(bad, Err(StoreError::InvalidDocument(_))));
    }

    #[tokio::test]
    async fn test_replace_counts_only_real_modifications() {
        let store = MemoryDocumentStore::new();
        let id = store.insert("venues", json!({ "name": "A" })).await.unwrap();

        let same = store
            .replace_one("venues", &Filter::by_id(&id), json!({ "name": "A" }))
            .await
            .unwrap();
        assert_eq!(same, 0);

        let changed = store
            .replace_one("venues", &Filter::by_id(&id), json!({ "name": "B" }))
            .await
            .unwrap();
        assert_eq!(changed, 1);

        let missing = store
            .replace_one("venues", &Filter::by_id("nope"), json!({ "name": "B" }))
            .await
            .unwrap();
        assert_eq!(missing, 0);

        let docs = store.find("venues", &Filter::by_id(&id)).await.unwrap();
        assert_eq!(docs[0]["name"], json!("B"));
    }

    #[tokio::test]
    async fn test_update_one_sets_field() {
        let store = MemoryDocumentStore::new();
        let id = store.insert("venues", json!({ "cuisine": 1 })).await.unwrap();
        let filter = Filter::by_id(&id);

        assert_eq!(store.update_one("venues", &filter, &FieldUpdate::set("cuisine", 3)).await.unwrap(), 1);
        assert_eq!(store.update_one("venues", &filter, &FieldUpdate::set("cuisine", 3)).await.unwrap(), 0);
        assert!(store
            .update_one("venues", &filter, &FieldUpdate::set("_id", "other"))
            .await
            .is_err());
    }

    #[tokio::test]
    async fn test_delete_one_and_many() {
        let store = MemoryDocumentStore::new();
        for stars in [1, 2, 3] {
            store.insert("ratings", json!({ "venue_id": "v", "stars": stars })).await.unwrap();
        }
        store.insert("ratings", json!({ "venue_id": "w", "stars": 5 })).await.unwrap();

        assert_eq!(store.delete_one("ratings", &Filter::eq("venue_id", "v")).await.unwrap(), 1);
        assert_eq!(store.delete_many("ratings", &Filter::eq("venue_id", "v")).await.unwrap(), 2);
        assert_eq!(store.delete_many("ratings", &Filter::eq("venue_id", "v")).await.unwrap(), 0);
        assert_eq!(store.delete_many("unknown", &Filter::All).await.unwrap(), 0);
        assert_eq!(store.find("ratings", &Filter::All).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_group_sort_limit_lookup() {
        let store = MemoryDocumentStore::new();
        store.insert("venues", json!({ "_id": "a", "name": "A" })).await.unwrap();
        store.insert("venues", json!({ "_id": "b", "name": "B" })).await.unwrap();
        for (venue, stars) in [("a", 2), ("b", 5), ("a", 4), ("b", 4)] {
            store.insert("ratings", json!({ "venue_id": venue, "stars": stars })).await.unwrap();
        }

        let pipeline = vec![
            Stage::group_average("venue_id", "stars", "average"),
            Stage::sort_descending("average"),
            Stage::Limit(1),
            Stage::lookup("venues", "_id", "_id", "venue"),
            Stage::lookup("ratings", "_id", "venue_id", "ratings"),
        ];
        let out = store.aggregate("ratings", &pipeline).await.unwrap();

        assert_eq!(out.len(), 1);
        assert_eq!(out[0]["_id"], json!("b"));
        assert_eq!(out[0]["average"].as_f64(), Some(4.5));
        assert_eq!(out[0]["venue"][0]["name"], json!("B"));
        assert_eq!(out[0]["ratings"].as_array().map(Vec::len), Some(2));
    }

    #[tokio::test]
    async fn test_equal_averages_keep_group_key_order() {
        let store = MemoryDocumentStore::new();
        for venue in ["c", "a", "b"] {
            store.insert("ratings", json!({ "venue_id": venue, "stars": 4 })).await.unwrap();
        }

        let out = store
            .aggregate(
                "ratings",
                &[
                    Stage::group_average("venue_id", "stars", "average"),
                    Stage::sort_descending("average"),
                ],
            )
            .await
            .unwrap();

        let ids: Vec<_> = out.iter().map(|d| d["_id"].as_str().unwrap()).collect();
        assert_eq!(ids, vec!["a", "b", "c"]);
    }

    #[tokio::test]
    async fn test_text_search_matches_any_term() {
        let store = MemoryDocumentStore::new();
        store.insert("venues", json!({ "name": "Cantina Roma" })).await.unwrap();
        store.insert("venues", json!({ "name": "Roma Sushi Bar" })).await.unwrap();
        store.insert("venues", json!({ "name": "Romano" })).await.unwrap();

        let out = store.text_search("venues", "sushi roma").await.unwrap();
        assert_eq!(out.len(), 2);
        assert_eq!(out[0]["name"], json!("Roma Sushi Bar"));

        assert!(store.text_search("venues", "  ").await.unwrap().is_empty());
        assert!(store.text_search("ratings", "roma").await.is_err());
    }

    #[test]
    fn test_tokenize() {
        assert_eq!(tokenize("Pizza-Bar, São Paulo"), vec!["pizza", "bar", "são", "paulo"]);
    }
}
