//! Translates an [`ApiQuery`] into sea-query predicates, ORDER BY columns,
//! and LIMIT, including the n-key keyset predicates that drive cursor
//! pagination. Field names coming from callers are checked against a
//! per-resource allowlist; unknown fields are dropped, never interpolated.

use log::debug;
use sea_orm::sea_query::{
    Alias, Condition, Expr, ExprTrait, Iden, IntoIden, Order, Query, SelectStatement, SimpleExpr,
    SubQueryOper, SubQueryStatement, Value as SeaValue,
};

use agora_core::query::{ApiQuery, CompareOp, Cursor, ScalarValue, SortOrder};
use agora_core::{AgoraError, AgoraResult};

use crate::db::{Junction, JunctionKind};
use crate::search::normalize;

pub(crate) fn scalar_to_sea(value: &ScalarValue) -> SeaValue {
    match value {
        ScalarValue::Bool(value) => SeaValue::Bool(Some(*value)),
        ScalarValue::Integer(value) => SeaValue::BigInt(Some(*value)),
        ScalarValue::Real(value) => SeaValue::Double(Some(*value)),
        ScalarValue::Text(value) => SeaValue::String(Some(value.clone())),
    }
}

/// Which side of the window a cursor bounds: `From` for
/// `start_at`/`start_after`, `To` for `end_at`/`end_before`.
#[derive(Clone, Copy, Debug)]
pub(crate) enum Bound {
    From,
    To,
}

fn boundary_expr(
    col: Expr,
    value: &ScalarValue,
    bound: Bound,
    order: SortOrder,
    inclusive: bool,
) -> SimpleExpr {
    let value = scalar_to_sea(value);
    match (bound, order) {
        (Bound::From, SortOrder::Asc) | (Bound::To, SortOrder::Desc) => {
            if inclusive {
                col.gte(value)
            } else {
                col.gt(value)
            }
        }
        (Bound::From, SortOrder::Desc) | (Bound::To, SortOrder::Asc) => {
            if inclusive {
                col.lte(value)
            } else {
                col.lt(value)
            }
        }
    }
}

/// Lexicographic tuple comparison against a boundary row, expressed as a
/// disjunction of conjunctions:
///
/// ```text
/// (f1 > a1) OR (f1 = a1 AND f2 > a2) OR ... OR (f1 = a1 AND ... AND fn > an)
/// ```
///
/// `inclusive` relaxes only the final conjunct to `>=`; the earlier disjuncts
/// stay strict. Descending order inverts every comparator, as does bounding
/// from the `To` side.
pub(crate) fn boundary_condition<T>(
    table: T,
    pairs: &[(String, ScalarValue)],
    bound: Bound,
    inclusive: bool,
    order: SortOrder,
) -> Condition
where
    T: Iden + Copy + 'static,
{
    let mut disjunction = Condition::any();
    for depth in 0..pairs.len() {
        let mut conjunction = Condition::all();
        for (field, value) in pairs.iter().take(depth) {
            conjunction = conjunction
                .add(Expr::col((table, Alias::new(field.as_str()))).eq(scalar_to_sea(value)));
        }
        let (field, value) = &pairs[depth];
        let last = depth + 1 == pairs.len();
        conjunction = conjunction.add(boundary_expr(
            Expr::col((table, Alias::new(field.as_str()))),
            value,
            bound,
            order,
            inclusive && last,
        ));
        disjunction = disjunction.add(conjunction);
    }
    disjunction
}

pub(crate) fn exists_expr(sub: SelectStatement) -> SimpleExpr {
    SimpleExpr::SubQuery(
        Some(SubQueryOper::Exists),
        Box::new(SubQueryStatement::SelectStatement(sub)),
    )
}

fn compare_expr<T>(table: T, field: &str, op: CompareOp, value: &ScalarValue) -> Option<SimpleExpr>
where
    T: Iden + Copy + 'static,
{
    let col = Expr::col((table, Alias::new(field)));
    let expr = match op {
        CompareOp::Eq => col.eq(scalar_to_sea(value)),
        CompareOp::Ne => col.ne(scalar_to_sea(value)),
        CompareOp::Gt => col.gt(scalar_to_sea(value)),
        CompareOp::Gte => col.gte(scalar_to_sea(value)),
        CompareOp::Lt => col.lt(scalar_to_sea(value)),
        CompareOp::Lte => col.lte(scalar_to_sea(value)),
        CompareOp::Like => match value {
            // The caller's text is the LIKE pattern, wildcards included.
            ScalarValue::Text(pattern) => col.like(pattern.as_str()),
            _ => return None,
        },
    };
    Some(expr)
}

/// Free-text search: the row matches when any whitespace-separated token of
/// the needle appears as a substring of any of its search-term rows. The
/// sub-select correlates on the outer row's id and handle and scopes to the
/// table's context, since handles are only unique per table. It must be
/// embedded in a query whose FROM is `table`.
fn search_condition<T>(table: T, raw: &str) -> Option<SimpleExpr>
where
    T: Iden + Copy + 'static,
{
    let tokens: Vec<String> = raw
        .split_whitespace()
        .map(normalize)
        .filter(|token| !token.is_empty())
        .collect();
    if tokens.is_empty() {
        return None;
    }
    let mut token_match = Condition::any();
    for token in &tokens {
        token_match = token_match.add(Expr::col(Junction::Value).like(format!("%{token}%")));
    }
    let terms = JunctionKind::SearchTerms.table();
    let owner_match = Condition::any()
        .add(Expr::col((terms.clone(), Junction::EntityId)).equals((table, Alias::new("id"))))
        .add(
            Expr::col((terms.clone(), Junction::EntityHandle)).equals((table, Alias::new("handle"))),
        );
    let context_match =
        Expr::col((terms.clone(), Junction::Context)).eq(table.into_iden().to_string());
    let sub = Query::select()
        .expr(Expr::val(1))
        .from(terms)
        .cond_where(
            Condition::all()
                .add(owner_match)
                .add(context_match)
                .add(token_match),
        )
        .to_owned();
    Some(exists_expr(sub))
}

/// `where` filters plus the search clause as one conjunction. Unknown fields
/// are logged and skipped so a stale caller cannot break a list into an
/// error.
fn filter_conditions<T>(table: T, allowed: &[&str], query: &ApiQuery) -> Condition
where
    T: Iden + Copy + 'static,
{
    let mut cond = Condition::all();
    for filter in &query.where_filters {
        if !allowed.contains(&filter.field.as_str()) {
            debug!("dropping filter on unknown field {}", filter.field);
            continue;
        }
        match compare_expr(table, &filter.field, filter.op, &filter.value) {
            Some(expr) => cond = cond.add(expr),
            None => debug!("dropping like filter with non-text value on {}", filter.field),
        }
    }
    if let Some(search) = query.search.as_deref() {
        if let Some(expr) = search_condition(table, search) {
            cond = cond.add(expr);
        }
    }
    cond
}

fn cursor_pairs(cursor: &Cursor, allowed: &[&str]) -> Vec<(String, ScalarValue)> {
    cursor
        .0
        .iter()
        .filter(|(field, _)| {
            let known = allowed.contains(&field.as_str());
            if !known {
                debug!("dropping cursor field {field}");
            }
            known
        })
        .cloned()
        .collect()
}

/// Applies the whole [`ApiQuery`] to a list select: conditions, cursor
/// boundaries, ORDER BY, and LIMIT. Returns whether the caller must reverse
/// the fetched rows, which is the case for `limit_to_last`: the statement
/// scans in inverted order so the database keeps the *last* N rows of the
/// window, and only an in-memory reversal restores the requested order.
pub(crate) fn apply_query<T>(
    select: &mut SelectStatement,
    table: T,
    allowed: &[&str],
    query: &ApiQuery,
) -> AgoraResult<bool>
where
    T: Iden + Copy + 'static,
{
    if query.limit.is_some() && query.limit_to_last.is_some() {
        return Err(AgoraError::invalid(
            "limit and limit_to_last are mutually exclusive",
        ));
    }
    let mut cond = filter_conditions(table, allowed, query);
    let boundaries: [(&Option<Cursor>, Bound, bool); 4] = [
        (&query.start_at, Bound::From, true),
        (&query.start_after, Bound::From, false),
        (&query.end_at, Bound::To, true),
        (&query.end_before, Bound::To, false),
    ];
    for (cursor, bound, inclusive) in boundaries {
        if let Some(cursor) = cursor {
            let pairs = cursor_pairs(cursor, allowed);
            if pairs.is_empty() {
                continue;
            }
            cond = cond.add(boundary_condition(table, &pairs, bound, inclusive, query.order));
        }
    }
    if !cond.is_empty() {
        select.cond_where(cond);
    }
    let mut sort_fields: Vec<String> = query
        .effective_sort()
        .into_iter()
        .filter(|field| {
            let known = allowed.contains(&field.as_str());
            if !known {
                debug!("dropping sort field {field}");
            }
            known
        })
        .collect();
    if sort_fields.is_empty() {
        sort_fields = agora_core::query::DEFAULT_SORT
            .iter()
            .map(|field| ToString::to_string(field))
            .collect();
    }
    let reverse = query.limit_to_last.is_some();
    let effective_order = if reverse {
        query.order.reversed()
    } else {
        query.order
    };
    for field in &sort_fields {
        let order = match effective_order {
            SortOrder::Asc => Order::Asc,
            SortOrder::Desc => Order::Desc,
        };
        select.order_by((table, Alias::new(field.as_str())), order);
    }
    if let Some(last) = query.limit_to_last {
        select.limit(last);
    } else if let Some(limit) = query.limit {
        select.limit(limit);
    }
    Ok(reverse)
}

/// Count variant: only filters and search apply. Cursors, order, and limits
/// describe a page, not the matching set.
pub(crate) fn apply_count_query<T>(
    select: &mut SelectStatement,
    table: T,
    allowed: &[&str],
    query: &ApiQuery,
) where
    T: Iden + Copy + 'static,
{
    let cond = filter_conditions(table, allowed, query);
    if !cond.is_empty() {
        select.cond_where(cond);
    }
}

#[cfg(test)]
mod tests {
    use sea_orm::sea_query::SqliteQueryBuilder;

    use agora_core::query::{CompareOp, Cursor, Filter};

    use super::*;
    use crate::db::Products;

    const ALLOWED: [&str; 5] = ["id", "handle", "updated_at", "price", "qty"];

    fn render(cond: Condition) -> String {
        Query::select()
            .column(Products::Id)
            .from(Products::Table)
            .cond_where(cond)
            .to_string(SqliteQueryBuilder)
    }

    #[test]
    fn two_key_boundary_is_a_disjunction_of_conjunctions() {
        let pairs = vec![
            ("updated_at".to_string(), ScalarValue::Text("t9".into())),
            ("id".to_string(), ScalarValue::Text("prod_b".into())),
        ];
        let sql = render(boundary_condition(
            Products::Table,
            &pairs,
            Bound::From,
            false,
            SortOrder::Asc,
        ));
        assert!(sql.contains(r#""products"."updated_at" > 't9'"#));
        assert!(sql.contains(r#""products"."updated_at" = 't9'"#));
        assert!(sql.contains(r#""products"."id" > 'prod_b'"#));
        assert!(sql.contains(" OR "));
    }

    #[test]
    fn inclusive_relaxes_only_the_final_conjunct() {
        let pairs = vec![
            ("updated_at".to_string(), ScalarValue::Text("t9".into())),
            ("price".to_string(), ScalarValue::Real(4.5)),
            ("id".to_string(), ScalarValue::Text("prod_b".into())),
        ];
        let sql = render(boundary_condition(
            Products::Table,
            &pairs,
            Bound::From,
            true,
            SortOrder::Asc,
        ));
        assert!(sql.contains(r#""products"."updated_at" > 't9'"#));
        assert!(sql.contains(r#""products"."price" > 4.5"#));
        assert!(sql.contains(r#""products"."id" >= 'prod_b'"#));
        assert!(!sql.contains(r#""products"."updated_at" >= "#));
        assert!(!sql.contains(r#""products"."price" >= "#));

        let to = render(boundary_condition(
            Products::Table,
            &pairs,
            Bound::To,
            true,
            SortOrder::Asc,
        ));
        assert!(to.contains(r#""products"."updated_at" < 't9'"#));
        assert!(to.contains(r#""products"."id" <= 'prod_b'"#));
        assert!(!to.contains(r#""products"."price" <= "#));
    }

    #[test]
    fn descending_order_inverts_comparators() {
        let pairs = vec![("updated_at".to_string(), ScalarValue::Text("t9".into()))];
        let from = render(boundary_condition(
            Products::Table,
            &pairs,
            Bound::From,
            false,
            SortOrder::Desc,
        ));
        assert!(from.contains(r#""products"."updated_at" < 't9'"#));
        let to = render(boundary_condition(
            Products::Table,
            &pairs,
            Bound::To,
            false,
            SortOrder::Desc,
        ));
        assert!(to.contains(r#""products"."updated_at" > 't9'"#));
    }

    #[test]
    fn combining_limit_and_limit_to_last_is_rejected() {
        let mut select = Query::select()
            .column(Products::Id)
            .from(Products::Table)
            .to_owned();
        let query = ApiQuery {
            limit: Some(5),
            limit_to_last: Some(5),
            ..ApiQuery::default()
        };
        let err = apply_query(&mut select, Products::Table, &ALLOWED, &query).unwrap_err();
        assert!(matches!(err, AgoraError::Validation { .. }));
    }

    #[test]
    fn limit_to_last_reverses_scan_order_and_reports_it() {
        let mut select = Query::select()
            .column(Products::Id)
            .from(Products::Table)
            .to_owned();
        let query = ApiQuery {
            limit: None,
            limit_to_last: Some(2),
            ..ApiQuery::default()
        };
        let reverse =
            apply_query(&mut select, Products::Table, &ALLOWED, &query).expect("apply");
        assert!(reverse);
        let sql = select.to_string(SqliteQueryBuilder);
        // Natural order is desc, so the backward scan is ascending.
        assert!(sql.contains(r#"ORDER BY "products"."updated_at" ASC, "products"."id" ASC"#));
        assert!(sql.ends_with("LIMIT 2"));
    }

    #[test]
    fn filters_and_search_compose_and_unknown_fields_drop_out() {
        let mut select = Query::select()
            .column(Products::Id)
            .from(Products::Table)
            .to_owned();
        let query = ApiQuery {
            where_filters: vec![
                Filter::new("price", CompareOp::Gte, 10.0),
                Filter::new("no_such_field", CompareOp::Eq, 1i64),
            ],
            search: Some("Blue SHOES".to_string()),
            ..ApiQuery::default()
        };
        let reverse =
            apply_query(&mut select, Products::Table, &ALLOWED, &query).expect("apply");
        assert!(!reverse);
        let sql = select.to_string(SqliteQueryBuilder);
        assert!(sql.contains(r#""products"."price" >= 10"#));
        assert!(!sql.contains("no_such_field"));
        assert!(sql.contains("EXISTS"));
        assert!(sql.contains("entity_to_search_terms"));
        assert!(sql.contains("'%blue%'"));
        assert!(sql.contains("'%shoes%'"));
        assert!(sql.contains(r#""entity_id" = "products"."id""#));
        assert!(sql.contains(r#""context" = 'products'"#));
        assert!(sql.ends_with("LIMIT 10"));
    }

    #[test]
    fn cursor_fields_feed_the_boundary_and_the_sort() {
        let mut select = Query::select()
            .column(Products::Id)
            .from(Products::Table)
            .to_owned();
        let query = ApiQuery {
            start_after: Some(Cursor::new(vec![
                ("updated_at".into(), "t5".into()),
                ("id".into(), "prod_c".into()),
            ])),
            ..ApiQuery::default()
        };
        apply_query(&mut select, Products::Table, &ALLOWED, &query).expect("apply");
        let sql = select.to_string(SqliteQueryBuilder);
        assert!(sql.contains(r#""products"."updated_at" < 't5'"#));
        assert!(sql.contains(r#""products"."id" < 'prod_c'"#));
        assert!(sql.contains(r#"ORDER BY "products"."updated_at" DESC, "products"."id" DESC"#));
    }
}
