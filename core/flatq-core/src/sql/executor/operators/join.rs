//! Join Operator: hash-based INNER / LEFT / RIGHT equi-join
//!
//! Both inputs are materialized first. The side whose rows drive the output
//! order is probed; the other side is indexed by its join-key value.

use crate::error::{FlatqError, FlatqResult};
use crate::sql::executor::drain;
use crate::sql::executor::operators::{Batch, PhysicalOperator};
use crate::sql::planner::{JoinCondition, JoinType};
use crate::storage::{Row, Value};
use ahash::AHashMap;
use smallvec::SmallVec;

/// Everything the join needs besides the two row sets.
#[derive(Debug, Clone)]
pub struct JoinContext {
    pub main_table: String,
    pub join_table: String,
    pub condition: JoinCondition,
    /// Fields to carry into each output row
    pub fields: Vec<String>,
    /// `SELECT *`: carry every field of both sides
    pub wildcard: bool,
}

/// Join 연산자: build는 인덱스 쪽, probe는 출력 순서를 결정하는 쪽
pub struct JoinOperator {
    left: Box<dyn PhysicalOperator>,
    right: Box<dyn PhysicalOperator>,
    join_type: JoinType,
    context: JoinContext,
    /// Materialized result
    result: Option<Batch>,
    done: bool,
}

impl JoinOperator {
    pub fn new(
        left: Box<dyn PhysicalOperator>,
        right: Box<dyn PhysicalOperator>,
        join_type: JoinType,
        context: JoinContext,
    ) -> Self {
        Self {
            left,
            right,
            join_type,
            context,
            result: None,
            done: false,
        }
    }

    fn materialize(&mut self) -> FlatqResult<()> {
        let main = drain(self.left.as_mut())?;
        let joined = drain(self.right.as_mut())?;
        let rows = join_rows(self.join_type, &main, &joined, &self.context)?;
        self.result = (!rows.is_empty()).then_some(rows);
        Ok(())
    }
}

impl PhysicalOperator for JoinOperator {
    fn next(&mut self) -> FlatqResult<Option<Batch>> {
        if self.done {
            return Ok(None);
        }
        self.materialize()?;
        self.done = true;
        Ok(self.result.take())
    }

    fn reset(&mut self) -> FlatqResult<()> {
        self.result = None;
        self.done = false;
        self.left.reset()?;
        self.right.reset()
    }
}

/// Dispatch on join type.
pub fn join_rows(
    join_type: JoinType,
    main: &[Row],
    joined: &[Row],
    ctx: &JoinContext,
) -> FlatqResult<Vec<Row>> {
    match join_type {
        JoinType::Inner => inner_join(main, joined, ctx),
        JoinType::Left => left_join(main, joined, ctx),
        JoinType::Right => right_join(main, joined, ctx),
    }
}

/// One output row per matching (main, joined) pair; unmatched rows vanish.
pub fn inner_join(main: &[Row], joined: &[Row], ctx: &JoinContext) -> FlatqResult<Vec<Row>> {
    let index = build_index(joined, &ctx.condition.right, &ctx.join_table)?;
    let shape = join_shape(joined);
    let mut out = Vec::new();
    for main_row in main {
        let key = require_field(main_row, &ctx.condition.left, Some(&ctx.main_table))?;
        for &idx in probe(&index, key) {
            out.push(build_result_row(main_row, Some(&joined[idx]), ctx, &shape, false));
        }
    }
    Ok(out)
}

/// Every main row at least once; join fields are NULL when nothing matches.
pub fn left_join(main: &[Row], joined: &[Row], ctx: &JoinContext) -> FlatqResult<Vec<Row>> {
    let index = build_index(joined, &ctx.condition.right, &ctx.join_table)?;
    let shape = join_shape(joined);
    let mut out = Vec::with_capacity(main.len());
    for main_row in main {
        let key = require_field(main_row, &ctx.condition.left, Some(&ctx.main_table))?;
        let matches = probe(&index, key);
        if matches.is_empty() {
            out.push(build_result_row(main_row, None, ctx, &shape, true));
        } else {
            for &idx in matches {
                out.push(build_result_row(main_row, Some(&joined[idx]), ctx, &shape, true));
            }
        }
    }
    Ok(out)
}

/// Every joined row at least once. Unmatched joined rows pair with an
/// all-NULL main row shaped like the first main row.
pub fn right_join(main: &[Row], joined: &[Row], ctx: &JoinContext) -> FlatqResult<Vec<Row>> {
    let index = build_index(main, &ctx.condition.left, &ctx.main_table)?;
    let shape = join_shape(joined);
    let null_main: Row = main
        .first()
        .map(|row| row.field_names().map(|name| (name, Value::Null)).collect())
        .unwrap_or_default();

    let mut out = Vec::with_capacity(joined.len());
    for join_row in joined {
        let key = require_field(join_row, &ctx.condition.right, Some(&ctx.join_table))?;
        let matches = probe(&index, key);
        if matches.is_empty() {
            out.push(build_result_row(&null_main, Some(join_row), ctx, &shape, true));
        } else {
            for &idx in matches {
                out.push(build_result_row(&main[idx], Some(join_row), ctx, &shape, true));
            }
        }
    }
    Ok(out)
}

/// Look up a field by exact key, falling back to the other qualified/bare form.
pub fn resolve_field<'a>(row: &'a Row, name: &str, default_table: Option<&str>) -> Option<&'a Value> {
    row.resolve(name, default_table)
}

/// [`resolve_field`], with a miss reported as `InvalidField`.
pub fn require_field<'a>(
    row: &'a Row,
    name: &str,
    default_table: Option<&str>,
) -> FlatqResult<&'a Value> {
    resolve_field(row, name, default_table).ok_or_else(|| FlatqError::InvalidField(name.to_string()))
}

/// Shape one output row.
///
/// With `include_main`, every main field is written as `main.field` first.
/// Selected fields follow: a field qualified with the main table comes from
/// the main row, one qualified with the join table from the joined row, and
/// an unqualified field from the main row when it has it, else the joined row.
///
/// A field is written only when one side has it. The missing side of an
/// unmatched LEFT row counts as having every column of `join_shape`, as NULL.
/// Anything else stays absent so a later WHERE reports it as invalid.
pub fn build_result_row(
    main_row: &Row,
    join_row: Option<&Row>,
    ctx: &JoinContext,
    join_shape: &[String],
    include_main: bool,
) -> Row {
    let mut out = Row::with_capacity(main_row.len() + ctx.fields.len());

    if include_main || ctx.wildcard {
        for (name, value) in main_row.iter() {
            out.insert(format!("{}.{}", ctx.main_table, name), value.clone());
        }
    }
    if ctx.wildcard {
        for name in join_shape {
            let value = join_row
                .and_then(|row| row.get(name))
                .cloned()
                .unwrap_or(Value::Null);
            out.insert(format!("{}.{}", ctx.join_table, name), value);
        }
    }

    let main_table = Some(ctx.main_table.as_str());
    let join_table = Some(ctx.join_table.as_str());
    for field in &ctx.fields {
        let from_main = || resolve_field(main_row, field, main_table).cloned();
        let from_join = || match join_row {
            Some(row) => resolve_field(row, field, join_table).cloned(),
            None => null_if_in_shape(join_shape, field, &ctx.join_table),
        };
        let value = match field.split_once('.') {
            Some((table, _)) if table == ctx.main_table => from_main(),
            Some((table, _)) if table == ctx.join_table => from_join(),
            Some(_) => None,
            None => from_main().or_else(from_join),
        };
        if let Some(value) = value {
            out.insert(field.as_str(), value);
        }
    }
    out
}

/// NULL for a column the joined table has, by bare or `table.`-qualified name.
fn null_if_in_shape(join_shape: &[String], field: &str, join_table: &str) -> Option<Value> {
    let bare = match field.split_once('.') {
        Some((table, bare)) if table == join_table => bare,
        Some(_) => return None,
        None => field,
    };
    join_shape
        .iter()
        .any(|name| name == bare)
        .then_some(Value::Null)
}

type JoinIndex<'a> = AHashMap<&'a Value, SmallVec<[usize; 4]>>;

/// Index rows by key value. NULL keys are left out so they never match.
fn build_index<'a>(rows: &'a [Row], key_field: &str, table: &str) -> FlatqResult<JoinIndex<'a>> {
    let mut index: JoinIndex<'a> = AHashMap::with_capacity(rows.len());
    for (idx, row) in rows.iter().enumerate() {
        let key = require_field(row, key_field, Some(table))?;
        if !key.is_null() {
            index.entry(key).or_default().push(idx);
        }
    }
    Ok(index)
}

fn probe<'i>(index: &'i JoinIndex<'_>, key: &Value) -> &'i [usize] {
    if key.is_null() {
        return &[];
    }
    index.get(key).map(|m| m.as_slice()).unwrap_or(&[])
}

fn join_shape(joined: &[Row]) -> Vec<String> {
    joined
        .first()
        .map(|row| row.field_names().map(str::to_string).collect())
        .unwrap_or_default()
}
