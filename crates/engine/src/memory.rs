//! In-memory document store: the reference binding of the store boundary.
//!
//! Interprets every stage the builders emit, so the generator and the
//! catalog are fully executable in tests and the dev server without an
//! external database. Not built for large datasets.

use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::sync::RwLock;

use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use serde_json::Value;

use stocklens_core::{Document, DynamicSource, FilterOption, SortDirection};
use stocklens_pipeline::{Accumulator, Condition, Expr, GroupKey, Pipeline, SortKey, Stage};

use crate::store::{DocumentStore, StoreError};

#[derive(Debug, Default)]
pub struct InMemoryStore {
    collections: RwLock<BTreeMap<String, Vec<Document>>>,
    queries: AtomicU64,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append documents to a collection; non-object values are dropped.
    pub fn seed(&self, collection: &str, docs: Vec<Value>) {
        let mut guard = self.collections.write().expect("collection lock poisoned");
        let entry = guard.entry(collection.to_string()).or_default();
        for doc in docs {
            if let Value::Object(map) = doc {
                entry.push(map);
            }
        }
    }

    /// Number of aggregate executions, for asserting query behavior.
    pub fn query_count(&self) -> u64 {
        self.queries.load(AtomicOrdering::Relaxed)
    }

    fn collection(&self, name: &str) -> Vec<Document> {
        self.collections
            .read()
            .expect("collection lock poisoned")
            .get(name)
            .cloned()
            .unwrap_or_default()
    }

    fn run(&self, mut docs: Vec<Document>, pipeline: &Pipeline) -> Vec<Document> {
        for stage in pipeline {
            docs = self.apply(docs, stage);
        }
        docs
    }

    fn apply(&self, docs: Vec<Document>, stage: &Stage) -> Vec<Document> {
        match stage {
            Stage::Match(cond) => docs
                .into_iter()
                .filter(|d| eval_condition(d, cond))
                .collect(),
            Stage::NormalizeDate { field } => docs
                .into_iter()
                .map(|mut d| {
                    if let Some(Value::String(s)) = get_path(&d, field).cloned() {
                        if let Some(dt) = parse_date_loose(&s) {
                            d.insert(field.clone(), Value::String(canonical(dt)));
                        }
                    }
                    d
                })
                .collect(),
            Stage::Group {
                key,
                key_field,
                fields,
            } => group(docs, key, key_field, fields),
            Stage::Project(exprs) => docs
                .into_iter()
                .map(|d| {
                    exprs
                        .iter()
                        .map(|(name, expr)| (name.clone(), eval_expr(&d, expr)))
                        .collect()
                })
                .collect(),
            Stage::Sort(keys) => sort_docs(docs, keys),
            Stage::Skip(n) => docs.into_iter().skip(*n as usize).collect(),
            Stage::Limit(n) => docs.into_iter().take(*n as usize).collect(),
            Stage::Count { field } => {
                let mut doc = Document::new();
                doc.insert(field.clone(), Value::from(docs.len() as u64));
                vec![doc]
            }
            Stage::Lookup {
                from,
                local_field,
                foreign_field,
                as_field,
                filter,
            } => {
                let foreign = self.collection(from);
                docs.into_iter()
                    .map(|mut d| {
                        let local = get_path(&d, local_field).cloned().unwrap_or(Value::Null);
                        let joined: Vec<Value> = foreign
                            .iter()
                            .filter(|f| {
                                get_path(f, foreign_field) == Some(&local)
                                    && filter.as_ref().is_none_or(|c| eval_condition(f, c))
                            })
                            .map(|f| Value::Object(f.clone()))
                            .collect();
                        d.insert(as_field.clone(), Value::Array(joined));
                        d
                    })
                    .collect()
            }
            Stage::Facet(branches) => {
                let mut doc = Document::new();
                for (name, branch) in branches {
                    let rows = self
                        .run(docs.clone(), branch)
                        .into_iter()
                        .map(Value::Object)
                        .collect();
                    doc.insert(name.clone(), Value::Array(rows));
                }
                vec![doc]
            }
        }
    }
}

#[async_trait]
impl DocumentStore for InMemoryStore {
    async fn aggregate(
        &self,
        collection: &str,
        pipeline: &Pipeline,
    ) -> Result<Vec<Document>, StoreError> {
        self.queries.fetch_add(1, AtomicOrdering::Relaxed);
        Ok(self.run(self.collection(collection), pipeline))
    }

    async fn fetch_options(&self, source: &DynamicSource) -> Result<Vec<FilterOption>, StoreError> {
        let docs = self.collection(&source.collection);
        let mut seen = HashMap::new();
        let mut options = Vec::new();
        for doc in &docs {
            let value = match get_path(doc, &source.value_field).and_then(Value::as_str) {
                Some(v) => v.to_string(),
                None => continue,
            };
            if seen.insert(value.clone(), ()).is_some() {
                continue;
            }
            let label = get_path(doc, &source.label_field)
                .and_then(Value::as_str)
                .unwrap_or(&value)
                .to_string();
            options.push(FilterOption::new(value, label));
        }
        options.sort_by(|a, b| a.label.cmp(&b.label).then_with(|| a.value.cmp(&b.value)));
        Ok(options)
    }
}

// -------------------------
// Stage evaluation
// -------------------------

fn group(
    docs: Vec<Document>,
    key: &GroupKey,
    key_field: &str,
    fields: &[(String, Accumulator)],
) -> Vec<Document> {
    struct GroupState {
        key: Value,
        accs: Vec<AccState>,
    }

    let mut order: Vec<String> = Vec::new();
    let mut groups: HashMap<String, GroupState> = HashMap::new();

    for doc in &docs {
        let key_value = match key {
            GroupKey::Null => Value::Null,
            GroupKey::Field(f) => get_path(doc, f).cloned().unwrap_or(Value::Null),
            GroupKey::DateBucket { field, granularity } => {
                match get_path(doc, field)
                    .and_then(Value::as_str)
                    .and_then(parse_date_loose)
                {
                    Some(dt) => Value::String(dt.format(granularity.format_str()).to_string()),
                    None => Value::Null,
                }
            }
        };
        let map_key = key_value.to_string();
        let state = groups.entry(map_key.clone()).or_insert_with(|| {
            order.push(map_key);
            GroupState {
                key: key_value,
                accs: fields.iter().map(|(_, acc)| AccState::new(acc)).collect(),
            }
        });
        for (acc_state, (_, acc)) in state.accs.iter_mut().zip(fields) {
            acc_state.update(doc, acc);
        }
    }

    order
        .into_iter()
        .filter_map(|k| groups.remove(&k))
        .map(|state| {
            let mut out = Document::new();
            out.insert(key_field.to_string(), state.key);
            for (acc_state, (name, _)) in state.accs.into_iter().zip(fields) {
                out.insert(name.clone(), acc_state.finish());
            }
            out
        })
        .collect()
}

enum AccState {
    Count(u64),
    Sum(f64),
    Avg { sum: f64, n: u64 },
    Min(Option<Value>),
    Max(Option<Value>),
    First(Option<Value>),
}

impl AccState {
    fn new(acc: &Accumulator) -> Self {
        match acc {
            Accumulator::Count => AccState::Count(0),
            Accumulator::Sum(_) => AccState::Sum(0.0),
            Accumulator::Avg(_) => AccState::Avg { sum: 0.0, n: 0 },
            Accumulator::Min(_) => AccState::Min(None),
            Accumulator::Max(_) => AccState::Max(None),
            Accumulator::First(_) => AccState::First(None),
        }
    }

    fn update(&mut self, doc: &Document, acc: &Accumulator) {
        match (self, acc) {
            (AccState::Count(n), Accumulator::Count) => *n += 1,
            (AccState::Sum(total), Accumulator::Sum(expr)) => {
                if let Some(v) = eval_expr(doc, expr).as_f64() {
                    *total += v;
                }
            }
            (AccState::Avg { sum, n }, Accumulator::Avg(expr)) => {
                if let Some(v) = eval_expr(doc, expr).as_f64() {
                    *sum += v;
                    *n += 1;
                }
            }
            (AccState::Min(current), Accumulator::Min(expr)) => {
                let v = eval_expr(doc, expr);
                if !v.is_null()
                    && current
                        .as_ref()
                        .is_none_or(|c| compare_values(&v, c) == Ordering::Less)
                {
                    *current = Some(v);
                }
            }
            (AccState::Max(current), Accumulator::Max(expr)) => {
                let v = eval_expr(doc, expr);
                if !v.is_null()
                    && current
                        .as_ref()
                        .is_none_or(|c| compare_values(&v, c) == Ordering::Greater)
                {
                    *current = Some(v);
                }
            }
            (AccState::First(current), Accumulator::First(expr)) => {
                if current.is_none() {
                    *current = Some(eval_expr(doc, expr));
                }
            }
            // States are constructed from the same accumulator list.
            _ => unreachable!("accumulator state mismatch"),
        }
    }

    fn finish(self) -> Value {
        match self {
            AccState::Count(n) => Value::from(n),
            AccState::Sum(total) => number(total),
            AccState::Avg { sum, n } => {
                if n == 0 {
                    Value::Null
                } else {
                    number(sum / n as f64)
                }
            }
            AccState::Min(v) | AccState::Max(v) | AccState::First(v) => v.unwrap_or(Value::Null),
        }
    }
}

fn sort_docs(mut docs: Vec<Document>, keys: &[SortKey]) -> Vec<Document> {
    docs.sort_by(|a, b| {
        for key in keys {
            let av = get_path(a, &key.field).unwrap_or(&Value::Null);
            let bv = get_path(b, &key.field).unwrap_or(&Value::Null);
            let ord = compare_values(av, bv);
            let ord = match key.direction {
                SortDirection::Asc => ord,
                SortDirection::Desc => ord.reverse(),
            };
            if ord != Ordering::Equal {
                return ord;
            }
        }
        Ordering::Equal
    });
    docs
}

pub(crate) fn eval_condition(doc: &Document, cond: &Condition) -> bool {
    match cond {
        Condition::All(conds) => conds.iter().all(|c| eval_condition(doc, c)),
        Condition::Any(conds) => conds.iter().any(|c| eval_condition(doc, c)),
        Condition::Eq(field, v) => {
            get_path(doc, field).is_some_and(|actual| compare_values(actual, v) == Ordering::Equal)
        }
        Condition::In(field, values) => get_path(doc, field).is_some_and(|actual| {
            values
                .iter()
                .any(|v| compare_values(actual, v) == Ordering::Equal)
        }),
        Condition::Gt(field, v) => cmp_field(doc, field, v, &[Ordering::Greater]),
        Condition::Gte(field, v) => cmp_field(doc, field, v, &[Ordering::Greater, Ordering::Equal]),
        Condition::Lt(field, v) => cmp_field(doc, field, v, &[Ordering::Less]),
        Condition::Lte(field, v) => cmp_field(doc, field, v, &[Ordering::Less, Ordering::Equal]),
        Condition::Between { field, start, end } => {
            cmp_field(doc, field, start, &[Ordering::Greater, Ordering::Equal])
                && cmp_field(doc, field, end, &[Ordering::Less, Ordering::Equal])
        }
        Condition::Contains { field, needle } => get_path(doc, field)
            .and_then(Value::as_str)
            .is_some_and(|s| s.to_lowercase().contains(&needle.to_lowercase())),
        Condition::FieldLte(left, right) => cmp_fields(doc, left, right)
            .is_some_and(|o| matches!(o, Ordering::Less | Ordering::Equal)),
        Condition::FieldGte(left, right) => cmp_fields(doc, left, right)
            .is_some_and(|o| matches!(o, Ordering::Greater | Ordering::Equal)),
        Condition::IsEmpty(field) => match get_path(doc, field) {
            None | Some(Value::Null) => true,
            Some(Value::Array(a)) => a.is_empty(),
            Some(_) => false,
        },
    }
}

fn cmp_field(doc: &Document, field: &str, bound: &Value, accept: &[Ordering]) -> bool {
    get_path(doc, field).is_some_and(|actual| accept.contains(&compare_values(actual, bound)))
}

fn cmp_fields(doc: &Document, left: &str, right: &str) -> Option<Ordering> {
    let l = get_path(doc, left)?;
    let r = get_path(doc, right)?;
    Some(compare_values(l, r))
}

pub(crate) fn eval_expr(doc: &Document, expr: &Expr) -> Value {
    match expr {
        Expr::Field(path) => get_path(doc, path).cloned().unwrap_or(Value::Null),
        Expr::Literal(v) => v.clone(),
        Expr::Multiply(a, b) => match (eval_expr(doc, a).as_f64(), eval_expr(doc, b).as_f64()) {
            (Some(x), Some(y)) => number(x * y),
            _ => Value::Null,
        },
        Expr::Divide(a, b) => match (eval_expr(doc, a).as_f64(), eval_expr(doc, b).as_f64()) {
            (Some(x), Some(y)) if y != 0.0 => number(x / y),
            _ => Value::Null,
        },
    }
}

/// Dotted-path field access.
pub(crate) fn get_path<'a>(doc: &'a Document, path: &str) -> Option<&'a Value> {
    let mut parts = path.split('.');
    let mut current = doc.get(parts.next()?)?;
    for part in parts {
        current = current.as_object()?.get(part)?;
    }
    Some(current)
}

/// Total order over JSON values: null < bool < number < string < composite.
/// Date-looking strings compare as instants, so mixed storage formats
/// (plain dates vs RFC 3339) still range-filter correctly.
pub(crate) fn compare_values(a: &Value, b: &Value) -> Ordering {
    fn rank(v: &Value) -> u8 {
        match v {
            Value::Null => 0,
            Value::Bool(_) => 1,
            Value::Number(_) => 2,
            Value::String(_) => 3,
            Value::Array(_) => 4,
            Value::Object(_) => 5,
        }
    }

    match (a, b) {
        (Value::Number(x), Value::Number(y)) => x
            .as_f64()
            .partial_cmp(&y.as_f64())
            .unwrap_or(Ordering::Equal),
        (Value::String(x), Value::String(y)) => {
            match (parse_date_loose(x), parse_date_loose(y)) {
                (Some(dx), Some(dy)) => dx.cmp(&dy),
                _ => x.cmp(y),
            }
        }
        (Value::Bool(x), Value::Bool(y)) => x.cmp(y),
        _ => rank(a).cmp(&rank(b)).then_with(|| {
            // Same composite rank: fall back to serialized form.
            a.to_string().cmp(&b.to_string())
        }),
    }
}

/// Accepts RFC 3339, plain dates, and `YYYY-MM-DD HH:MM:SS` (treated UTC).
pub(crate) fn parse_date_loose(s: &str) -> Option<DateTime<Utc>> {
    let s = s.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(d) = chrono::NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return Some(DateTime::from_naive_utc_and_offset(
            d.and_hms_opt(0, 0, 0)?,
            Utc,
        ));
    }
    if let Ok(dt) = chrono::NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S") {
        return Some(DateTime::from_naive_utc_and_offset(dt, Utc));
    }
    None
}

fn canonical(dt: DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::Secs, true)
}

fn number(v: f64) -> Value {
    serde_json::Number::from_f64(v)
        .map(Value::Number)
        .unwrap_or(Value::Null)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use stocklens_pipeline::Granularity;

    fn doc(v: Value) -> Document {
        serde_json::from_value(v).unwrap()
    }

    fn store_with(collection: &str, docs: Vec<Value>) -> InMemoryStore {
        let store = InMemoryStore::new();
        store.seed(collection, docs);
        store
    }

    #[tokio::test]
    async fn match_and_count() {
        let store = store_with(
            "items",
            vec![json!({"qty": 5}), json!({"qty": 0}), json!({"qty": 12})],
        );
        let pipeline = vec![
            Stage::Match(Condition::Gt("qty".to_string(), 0.into())),
            Stage::Count {
                field: "total".to_string(),
            },
        ];
        let out = store.aggregate("items", &pipeline).await.unwrap();
        assert_eq!(out[0]["total"], json!(2));
    }

    #[tokio::test]
    async fn count_on_empty_input_emits_zero_document() {
        let store = InMemoryStore::new();
        let pipeline = vec![Stage::Count {
            field: "total".to_string(),
        }];
        let out = store.aggregate("missing", &pipeline).await.unwrap();
        assert_eq!(out.len(), 1);
        assert_eq!(out[0]["total"], json!(0));
    }

    #[tokio::test]
    async fn normalize_date_rewrites_string_storage() {
        let store = store_with(
            "orders",
            vec![
                json!({"id": "a", "ordered_at": "2026-08-10"}),
                json!({"id": "b", "ordered_at": "2026-08-10T09:30:00+02:00"}),
            ],
        );
        let pipeline = vec![
            Stage::NormalizeDate {
                field: "ordered_at".to_string(),
            },
            Stage::Match(Condition::Between {
                field: "ordered_at".to_string(),
                start: json!("2026-08-01T00:00:00Z"),
                end: json!("2026-08-31T23:59:59Z"),
            }),
        ];
        let out = store.aggregate("orders", &pipeline).await.unwrap();
        assert_eq!(out.len(), 2);
        assert_eq!(out[0]["ordered_at"], json!("2026-08-10T00:00:00Z"));
        assert_eq!(out[1]["ordered_at"], json!("2026-08-10T07:30:00Z"));
    }

    #[tokio::test]
    async fn group_by_field_preserves_encounter_order_and_sums() {
        let store = store_with(
            "lines",
            vec![
                json!({"cat": "b", "qty": 2}),
                json!({"cat": "a", "qty": 3}),
                json!({"cat": "b", "qty": 4}),
            ],
        );
        let pipeline = vec![Stage::Group {
            key: GroupKey::Field("cat".to_string()),
            key_field: "cat".to_string(),
            fields: vec![
                ("units".to_string(), Accumulator::Sum(Expr::field("qty"))),
                ("n".to_string(), Accumulator::Count),
            ],
        }];
        let out = store.aggregate("lines", &pipeline).await.unwrap();
        assert_eq!(out.len(), 2);
        assert_eq!(out[0]["cat"], json!("b"));
        assert_eq!(out[0]["units"], json!(6.0));
        assert_eq!(out[1]["n"], json!(1));
    }

    #[tokio::test]
    async fn date_bucket_groups_by_month() {
        let store = store_with(
            "orders",
            vec![
                json!({"ordered_at": "2026-01-15", "total": 10.0}),
                json!({"ordered_at": "2026-01-20", "total": 5.0}),
                json!({"ordered_at": "2026-02-01", "total": 7.0}),
            ],
        );
        let pipeline = vec![
            Stage::Group {
                key: GroupKey::DateBucket {
                    field: "ordered_at".to_string(),
                    granularity: Granularity::Month,
                },
                key_field: "period".to_string(),
                fields: vec![(
                    "revenue".to_string(),
                    Accumulator::Sum(Expr::field("total")),
                )],
            },
            Stage::Sort(vec![SortKey::asc("period")]),
        ];
        let out = store.aggregate("orders", &pipeline).await.unwrap();
        assert_eq!(out[0]["period"], json!("2026-01"));
        assert_eq!(out[0]["revenue"], json!(15.0));
        assert_eq!(out[1]["period"], json!("2026-02"));
    }

    #[tokio::test]
    async fn sort_is_stable_across_equal_keys() {
        let store = store_with(
            "rows",
            vec![
                json!({"v": 1, "id": "z"}),
                json!({"v": 1, "id": "a"}),
                json!({"v": 2, "id": "m"}),
            ],
        );
        let pipeline = vec![Stage::Sort(vec![SortKey::desc("v"), SortKey::asc("id")])];
        let out = store.aggregate("rows", &pipeline).await.unwrap();
        assert_eq!(out[0]["id"], json!("m"));
        assert_eq!(out[1]["id"], json!("a"));
        assert_eq!(out[2]["id"], json!("z"));
    }

    #[tokio::test]
    async fn lookup_joins_and_respects_filter() {
        let store = InMemoryStore::new();
        store.seed("items", vec![json!({"pid": "p1"}), json!({"pid": "p2"})]);
        store.seed(
            "sales",
            vec![
                json!({"pid": "p1", "at": "2026-08-01"}),
                json!({"pid": "p1", "at": "2026-01-01"}),
            ],
        );
        let pipeline = vec![
            Stage::Lookup {
                from: "sales".to_string(),
                local_field: "pid".to_string(),
                foreign_field: "pid".to_string(),
                as_field: "recent".to_string(),
                filter: Some(Condition::Gte("at".to_string(), json!("2026-06-01"))),
            },
            Stage::Match(Condition::IsEmpty("recent".to_string())),
        ];
        let out = store.aggregate("items", &pipeline).await.unwrap();
        assert_eq!(out.len(), 1);
        assert_eq!(out[0]["pid"], json!("p2"));
    }

    #[tokio::test]
    async fn facet_runs_branches_over_same_input() {
        let store = store_with(
            "stock",
            vec![json!({"qty": 0}), json!({"qty": 5}), json!({"qty": 100})],
        );
        let pipeline = vec![Stage::Facet(vec![
            (
                "empty".to_string(),
                vec![
                    Stage::Match(Condition::Lte("qty".to_string(), 0.into())),
                    Stage::Count {
                        field: "count".to_string(),
                    },
                ],
            ),
            (
                "high".to_string(),
                vec![
                    Stage::Match(Condition::Gte("qty".to_string(), 100.into())),
                    Stage::Count {
                        field: "count".to_string(),
                    },
                ],
            ),
        ])];
        let out = store.aggregate("stock", &pipeline).await.unwrap();
        assert_eq!(out.len(), 1);
        assert_eq!(out[0]["empty"], json!([{"count": 1}]));
        assert_eq!(out[0]["high"], json!([{"count": 1}]));
    }

    #[tokio::test]
    async fn field_to_field_comparison() {
        let d = doc(json!({"qty": 3, "reorder": 5}));
        assert!(eval_condition(
            &d,
            &Condition::FieldLte("qty".to_string(), "reorder".to_string())
        ));
        assert!(!eval_condition(
            &d,
            &Condition::FieldGte("qty".to_string(), "reorder".to_string())
        ));
    }

    #[tokio::test]
    async fn contains_is_case_insensitive() {
        let d = doc(json!({"name": "Acme Wholesale"}));
        assert!(eval_condition(
            &d,
            &Condition::Contains {
                field: "name".to_string(),
                needle: "wholesale".to_string(),
            }
        ));
    }

    #[tokio::test]
    async fn fetch_options_dedupes_and_sorts_by_label() {
        let store = store_with(
            "warehouses",
            vec![
                json!({"id": "w2", "name": "West"}),
                json!({"id": "w1", "name": "East"}),
                json!({"id": "w2", "name": "West"}),
            ],
        );
        let options = store
            .fetch_options(&DynamicSource::new("warehouses", "id", "name"))
            .await
            .unwrap();
        assert_eq!(options.len(), 2);
        assert_eq!(options[0].value, "w1");
        assert_eq!(options[1].value, "w2");
    }

    #[test]
    fn mixed_date_formats_compare_as_instants() {
        let a = json!("2026-08-26");
        let b = json!("2026-08-26T10:00:00Z");
        assert_eq!(compare_values(&a, &b), Ordering::Less);
        let c = json!("2026-08-25T23:00:00Z");
        assert_eq!(compare_values(&a, &c), Ordering::Greater);
    }
}
