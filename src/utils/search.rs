use sea_orm::sea_query::{Expr, Func, SimpleExpr};
use sea_orm::{ColumnTrait, Condition};

/// Case-insensitive substring match. Only ASCII letters are folded, matching SQLite's
/// `lower()`; non-ASCII text matches by exact case there.
pub fn contains_ci<C: ColumnTrait>(column: C, needle: &str) -> SimpleExpr {
    Expr::expr(Func::lower(Expr::col(column.as_column_ref()))).like(
        sea_orm::sea_query::LikeExpr::new(like_pattern(needle)).escape('\\'),
    )
}

fn like_pattern(needle: &str) -> String {
    format!("%{}%", escape_like(&needle.to_ascii_lowercase()))
}

/// OR of `contains_ci` over the given columns, `None` for a blank needle
pub fn any_contains_ci<C: ColumnTrait>(columns: &[C], needle: Option<&str>) -> Option<Condition> {
    let needle = needle.map(str::trim).filter(|s| !s.is_empty())?;
    let condition = columns
        .iter()
        .fold(Condition::any(), |cond, col| cond.add(contains_ci(*col, needle)));
    Some(condition)
}

fn escape_like(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}
