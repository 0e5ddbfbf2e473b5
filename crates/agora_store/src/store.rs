use std::path::Path;
use std::time::Duration;

use sea_orm::sea_query::{
    Alias, Condition, Expr, ExprTrait, Func, MysqlQueryBuilder, PostgresQueryBuilder, Query,
    QueryStatementWriter, SqliteQueryBuilder, Value as SeaValue,
};
use sea_orm::{
    ConnectOptions, ConnectionTrait, Database, DatabaseBackend, DatabaseConnection,
    DatabaseTransaction, QueryResult, Statement, TransactionTrait,
};
use sea_orm_migration::MigratorTrait;
use sea_orm_migration::prelude::Iden;

use agora_core::{AgoraError, AgoraResult, ApiQuery};

use crate::db::{Junction, JunctionKind};
use crate::migration::Migrator;
use crate::{AgoraConfig, DatabaseConfig};

const DEFAULT_PAGE_SIZE: u64 = 10;

/// Shared entry point to the SQL schema. Cheap to clone; all resource APIs
/// are implemented on this type, one file per resource under `resources/`.
#[derive(Clone)]
pub struct AgoraStore {
    pub(crate) conn: DatabaseConnection,
    pub(crate) backend: DatabaseBackend,
    pub(crate) default_page_size: u64,
}

impl AgoraStore {
    pub async fn connect(config: &AgoraConfig, base_dir: &Path) -> AgoraResult<Self> {
        let url = build_connection_url(config, base_dir)?;
        let mut options = ConnectOptions::new(url);
        if let Some(pool) = &config.pool {
            if let Some(max) = pool.max_connections {
                options.max_connections(max);
            }
            if let Some(min) = pool.min_connections {
                options.min_connections(min);
            }
            if let Some(timeout_ms) = pool.connect_timeout_ms {
                options.connect_timeout(Duration::from_millis(timeout_ms));
            }
            if let Some(timeout_ms) = pool.acquire_timeout_ms {
                options.acquire_timeout(Duration::from_millis(timeout_ms));
            }
            if let Some(timeout_ms) = pool.idle_timeout_ms {
                options.idle_timeout(Duration::from_millis(timeout_ms));
            }
        }
        let conn = Database::connect(options).await.map_err(AgoraError::from)?;
        let backend = conn.get_database_backend();
        let store = Self {
            conn,
            backend,
            default_page_size: config.default_page_size.unwrap_or(DEFAULT_PAGE_SIZE),
        };
        Migrator::up(&store.conn, None)
            .await
            .map_err(AgoraError::from)?;
        Ok(store)
    }

    pub fn backend(&self) -> DatabaseBackend {
        self.backend
    }

    /// A query limited to the configured page size, for callers that page
    /// from the top without building their own [`ApiQuery`].
    pub fn default_query(&self) -> ApiQuery {
        ApiQuery::with_limit(self.default_page_size)
    }

    pub(crate) async fn begin(&self) -> AgoraResult<DatabaseTransaction> {
        self.conn.begin().await.map_err(AgoraError::from)
    }

    /// Rows a junction table holds for one owner, matched by id or handle.
    /// Used by operational checks; upserts must keep this stable across
    /// identical rewrites.
    pub async fn count_junction_rows(&self, kind: JunctionKind, owner: &str) -> AgoraResult<u64> {
        let select = Query::select()
            .expr_as(Func::count(Expr::col(Junction::Id)), Alias::new("cnt"))
            .from(kind.table())
            .cond_where(
                Condition::any()
                    .add(Expr::col(Junction::EntityId).eq(owner))
                    .add(Expr::col(Junction::EntityHandle).eq(owner)),
            )
            .to_owned();
        let Some(row) = query_one(&self.conn, &select).await? else {
            return Ok(0);
        };
        let count: i64 = row.try_get("", "cnt")?;
        Ok(Ord::max(count, 0) as u64)
    }
}

/// `id = needle OR handle = needle`; every lookup accepts either form.
pub(crate) fn id_or_handle_cond<T>(id_col: T, handle_col: T, needle: &str) -> Condition
where
    T: Iden + 'static,
{
    Condition::any()
        .add(Expr::col(id_col).eq(needle))
        .add(Expr::col(handle_col).eq(needle))
}

/// Resolve an id-or-handle to the stored `(id, handle)` pair, if the row
/// exists. Cascades need both sides even when the caller passed only one.
pub(crate) async fn fetch_identity<C, T>(
    conn: &C,
    table: T,
    id_col: T,
    handle_col: T,
    needle: &str,
) -> AgoraResult<Option<(String, String)>>
where
    C: ConnectionTrait,
    T: Iden + Copy + 'static,
{
    let select = Query::select()
        .column(id_col)
        .column(handle_col)
        .from(table)
        .cond_where(id_or_handle_cond(id_col, handle_col, needle))
        .limit(1)
        .to_owned();
    let Some(row) = query_one(conn, &select).await? else {
        return Ok(None);
    };
    let id = read_string(&row, &col_name(id_col)).unwrap_or_default();
    let handle = read_string(&row, &col_name(handle_col)).unwrap_or_default();
    Ok(Some((id, handle)))
}

pub(crate) async fn delete_base_row<C, T>(
    conn: &C,
    table: T,
    id_col: T,
    handle_col: T,
    id: &str,
    handle: &str,
) -> AgoraResult<()>
where
    C: ConnectionTrait,
    T: Iden + Copy + 'static,
{
    let delete = Query::delete()
        .from_table(table)
        .cond_where(
            Condition::any()
                .add(Expr::col(id_col).eq(id))
                .add(Expr::col(handle_col).eq(handle)),
        )
        .to_owned();
    exec(conn, &delete).await
}

pub(crate) fn opt_text(value: Option<&str>) -> SeaValue {
    SeaValue::String(value.map(|v| v.to_string()))
}

pub(crate) fn col_name(column: impl Iden) -> String {
    column.to_string()
}

pub(crate) fn read_string(row: &QueryResult, name: &str) -> Option<String> {
    if let Ok(value) = row.try_get::<String>("", name) {
        return Some(value);
    }
    if let Ok(value) = row.try_get::<Option<String>>("", name) {
        return value;
    }
    None
}

pub(crate) fn read_bool(row: &QueryResult, name: &str) -> Option<bool> {
    if let Ok(value) = row.try_get::<bool>("", name) {
        return Some(value);
    }
    if let Ok(value) = row.try_get::<i64>("", name) {
        return Some(value != 0);
    }
    if let Ok(value) = row.try_get::<Option<bool>>("", name) {
        return value;
    }
    None
}

pub(crate) fn read_i64(row: &QueryResult, name: &str) -> Option<i64> {
    if let Ok(value) = row.try_get::<i64>("", name) {
        return Some(value);
    }
    if let Ok(value) = row.try_get::<i32>("", name) {
        return Some(i64::from(value));
    }
    if let Ok(value) = row.try_get::<i16>("", name) {
        return Some(i64::from(value));
    }
    if let Ok(value) = row.try_get::<Option<i64>>("", name) {
        return value;
    }
    None
}

pub(crate) fn read_f64(row: &QueryResult, name: &str) -> Option<f64> {
    if let Ok(value) = row.try_get::<f64>("", name) {
        return Some(value);
    }
    if let Ok(value) = row.try_get::<i64>("", name) {
        return Some(value as f64);
    }
    if let Ok(value) = row.try_get::<Option<f64>>("", name) {
        return value;
    }
    None
}

/// JSON columns are stored as text; aggregated projections may surface as a
/// native json type on some backends, so both shapes are accepted.
pub(crate) fn read_json(row: &QueryResult, name: &str) -> Option<serde_json::Value> {
    if let Ok(raw) = row.try_get::<String>("", name) {
        return serde_json::from_str(&raw).ok();
    }
    if let Ok(value) = row.try_get::<serde_json::Value>("", name) {
        return Some(value);
    }
    if let Ok(raw) = row.try_get::<Option<String>>("", name) {
        return raw.and_then(|raw| serde_json::from_str(&raw).ok());
    }
    None
}

pub(crate) fn build_stmt<S: QueryStatementWriter>(
    backend: DatabaseBackend,
    stmt: &S,
) -> (String, sea_orm::sea_query::Values) {
    match backend {
        DatabaseBackend::Sqlite => stmt.build(SqliteQueryBuilder),
        DatabaseBackend::Postgres => stmt.build(PostgresQueryBuilder),
        DatabaseBackend::MySql => stmt.build(MysqlQueryBuilder),
        _ => stmt.build(SqliteQueryBuilder),
    }
}

pub(crate) async fn exec<C, S>(conn: &C, stmt: &S) -> AgoraResult<()>
where
    C: ConnectionTrait,
    S: QueryStatementWriter,
{
    let backend = conn.get_database_backend();
    let (sql, values) = build_stmt(backend, stmt);
    if let Err(err) = conn
        .execute_raw(Statement::from_sql_and_values(backend, sql, values))
        .await
    {
        log::warn!("agora statement failed: {err}");
        return Err(err.into());
    }
    Ok(())
}

pub(crate) async fn query_all<C, S>(conn: &C, stmt: &S) -> AgoraResult<Vec<QueryResult>>
where
    C: ConnectionTrait,
    S: QueryStatementWriter,
{
    let backend = conn.get_database_backend();
    let (sql, values) = build_stmt(backend, stmt);
    let rows = conn
        .query_all_raw(Statement::from_sql_and_values(backend, sql, values))
        .await?;
    Ok(rows)
}

pub(crate) async fn query_one<C, S>(conn: &C, stmt: &S) -> AgoraResult<Option<QueryResult>>
where
    C: ConnectionTrait,
    S: QueryStatementWriter,
{
    let backend = conn.get_database_backend();
    let (sql, values) = build_stmt(backend, stmt);
    let row = conn
        .query_one_raw(Statement::from_sql_and_values(backend, sql, values))
        .await?;
    Ok(row)
}

fn build_connection_url(config: &AgoraConfig, base_dir: &Path) -> AgoraResult<String> {
    match &config.database {
        DatabaseConfig::Sqlite { .. } => {
            let path = config.sqlite_path(base_dir)?;
            Ok(format!("sqlite://{}?mode=rwc", path.display()))
        }
        DatabaseConfig::Postgres { url } => Ok(url.clone()),
        DatabaseConfig::Mysql { url } => Ok(url.clone()),
    }
}
