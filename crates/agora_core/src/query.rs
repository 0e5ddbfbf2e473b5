use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};
use serde::{Deserialize, Serialize};

use crate::{AgoraError, AgoraResult};

/// A single comparison value inside filters and cursors.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ScalarValue {
    Bool(bool),
    Integer(i64),
    Real(f64),
    Text(String),
}

impl From<&str> for ScalarValue {
    fn from(value: &str) -> Self {
        ScalarValue::Text(value.to_string())
    }
}

impl From<String> for ScalarValue {
    fn from(value: String) -> Self {
        ScalarValue::Text(value)
    }
}

impl From<i64> for ScalarValue {
    fn from(value: i64) -> Self {
        ScalarValue::Integer(value)
    }
}

impl From<f64> for ScalarValue {
    fn from(value: f64) -> Self {
        ScalarValue::Real(value)
    }
}

impl From<bool> for ScalarValue {
    fn from(value: bool) -> Self {
        ScalarValue::Bool(value)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CompareOp {
    Eq,
    Ne,
    Gt,
    Gte,
    Lt,
    Lte,
    Like,
}

/// One `field op value` predicate of a `where` clause.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Filter {
    pub field: String,
    pub op: CompareOp,
    pub value: ScalarValue,
}

impl Filter {
    pub fn new(field: impl Into<String>, op: CompareOp, value: impl Into<ScalarValue>) -> Self {
        Self {
            field: field.into(),
            op,
            value: value.into(),
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

impl SortOrder {
    pub fn reversed(self) -> Self {
        match self {
            SortOrder::Asc => SortOrder::Desc,
            SortOrder::Desc => SortOrder::Asc,
        }
    }
}

/// A pagination boundary: the sort-field values of a known row, in sort-field
/// order. `(updated_at, id)` cursors carry two pairs, but any length works —
/// ties are broken left to right.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Cursor(pub Vec<(String, ScalarValue)>);

impl Cursor {
    pub fn new(pairs: Vec<(String, ScalarValue)>) -> Self {
        Self(pairs)
    }

    pub fn fields(&self) -> Vec<String> {
        self.0.iter().map(|(field, _)| field.clone()).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Opaque string form for transport outside the library boundary.
    pub fn encode(&self) -> AgoraResult<String> {
        let payload =
            serde_json::to_vec(&self.0).map_err(|err| AgoraError::storage(err.to_string()))?;
        Ok(URL_SAFE_NO_PAD.encode(payload))
    }

    pub fn decode(cursor: &str) -> AgoraResult<Self> {
        let decoded = URL_SAFE_NO_PAD
            .decode(cursor.as_bytes())
            .map_err(|_| AgoraError::invalid("invalid cursor"))?;
        let pairs: Vec<(String, ScalarValue)> =
            serde_json::from_slice(&decoded).map_err(|_| AgoraError::invalid("invalid cursor"))?;
        Ok(Self(pairs))
    }
}

/// The default sort used when a query names none: newest first, ids breaking
/// ties. Every resource table carries both columns.
pub const DEFAULT_SORT: [&str; 2] = ["updated_at", "id"];

/// Abstract list request shared by every resource: filters, free-text search,
/// sort, keyset boundaries, and relation expansion.
///
/// One sort direction applies to all `sort_by` fields; per-field directions
/// are not supported. At most one of `limit` / `limit_to_last` may be set.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ApiQuery {
    pub where_filters: Vec<Filter>,
    pub search: Option<String>,
    pub sort_by: Vec<String>,
    pub order: SortOrder,
    pub limit: Option<u64>,
    pub limit_to_last: Option<u64>,
    pub start_at: Option<Cursor>,
    pub start_after: Option<Cursor>,
    pub end_at: Option<Cursor>,
    pub end_before: Option<Cursor>,
    pub expand: Vec<String>,
}

impl Default for ApiQuery {
    fn default() -> Self {
        Self {
            where_filters: Vec::new(),
            search: None,
            sort_by: Vec::new(),
            order: SortOrder::Desc,
            limit: Some(10),
            limit_to_last: None,
            start_at: None,
            start_after: None,
            end_at: None,
            end_before: None,
            expand: vec!["*".to_string()],
        }
    }
}

impl ApiQuery {
    /// A list-all query with the given page size, newest first.
    pub fn with_limit(limit: u64) -> Self {
        Self {
            limit: Some(limit),
            ..Self::default()
        }
    }

    /// Sort fields actually in effect: explicit `sort_by`, else the fields of
    /// the first present cursor, else `(updated_at, id)`.
    pub fn effective_sort(&self) -> Vec<String> {
        if !self.sort_by.is_empty() {
            return self.sort_by.clone();
        }
        for cursor in [&self.start_at, &self.start_after, &self.end_at, &self.end_before]
            .into_iter()
            .flatten()
        {
            if !cursor.is_empty() {
                return cursor.fields();
            }
        }
        DEFAULT_SORT.iter().map(|field| field.to_string()).collect()
    }

    pub fn expands(&self, relation: &str) -> bool {
        self.expand
            .iter()
            .any(|entry| entry == "*" || entry == relation)
    }
}

/// Expansion selector for `get`: `All` computes every nested relation
/// projection (the expensive default), `Only` restricts to the named ones.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum Expand {
    All,
    Only(Vec<String>),
}

impl Default for Expand {
    fn default() -> Self {
        Expand::All
    }
}

impl Expand {
    pub fn includes(&self, relation: &str) -> bool {
        match self {
            Expand::All => true,
            Expand::Only(list) => list.iter().any(|entry| entry == "*" || entry == relation),
        }
    }

    pub fn none() -> Self {
        Expand::Only(Vec::new())
    }
}
