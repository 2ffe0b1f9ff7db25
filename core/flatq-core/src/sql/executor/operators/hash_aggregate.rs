//! HashAggregate Operator: GROUP BY and aggregate functions

use crate::error::FlatqResult;
use crate::sql::executor::coerce::as_number;
use crate::sql::executor::operators::{Batch, PhysicalOperator};
use crate::sql::planner::{AggregateFunction, AggregateSpec};
use crate::storage::{Row, Value};
use indexmap::IndexMap;

/// Composite group identity: exact value match, no coercion.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct GroupKey(pub Vec<Value>);

/// Running numeric stats for one aggregate argument.
#[derive(Debug, Clone, Default)]
struct FieldStats {
    sum: f64,
    min: Option<f64>,
    max: Option<f64>,
    seen: usize,
}

impl FieldStats {
    fn fold(&mut self, n: f64) {
        self.sum += n;
        self.min = Some(self.min.map_or(n, |m| m.min(n)));
        self.max = Some(self.max.map_or(n, |m| m.max(n)));
        self.seen += 1;
    }
}

/// Per-group accumulator: row count plus one stats slot per aggregate.
#[derive(Debug, Clone)]
struct Accumulator {
    count: usize,
    stats: Vec<FieldStats>,
}

impl Accumulator {
    fn new(width: usize) -> Self {
        Self {
            count: 0,
            stats: vec![FieldStats::default(); width],
        }
    }

    fn update(&mut self, row: &Row, aggregates: &[AggregateSpec], default_table: Option<&str>) {
        self.count += 1;
        for (spec, stats) in aggregates.iter().zip(self.stats.iter_mut()) {
            let Some(field) = spec.field() else { continue };
            // non-numeric values contribute nothing
            if let Some(n) = row.resolve(field, default_table).and_then(as_number) {
                stats.fold(n);
            }
        }
    }

    fn finish(&self, spec: &AggregateSpec, stats: &FieldStats) -> Value {
        match spec.function {
            AggregateFunction::Count => Value::Number(self.count as f64),
            AggregateFunction::Sum => Value::Number(stats.sum),
            AggregateFunction::Avg if stats.seen == 0 || self.count == 0 => Value::Null,
            AggregateFunction::Avg => Value::Number(stats.sum / self.count as f64),
            AggregateFunction::Min => stats.min.into(),
            AggregateFunction::Max => stats.max.into(),
        }
    }

    fn write_into(&self, out: &mut Row, aggregates: &[AggregateSpec]) {
        for (spec, stats) in aggregates.iter().zip(&self.stats) {
            out.insert(spec.label.as_str(), self.finish(spec, stats));
        }
    }
}

/// Hash Aggregate 연산자 (GROUP BY): IndexMap 기반 집계, 그룹은 처음 등장한 순서
pub struct HashAggregateOperator {
    input: Box<dyn PhysicalOperator>,
    /// Fields to group by; empty means one global group
    group_by: Vec<String>,
    aggregates: Vec<AggregateSpec>,
    default_table: Option<String>,
    /// Whether result has been produced
    done: bool,
}

impl HashAggregateOperator {
    pub fn new(
        input: Box<dyn PhysicalOperator>,
        group_by: Vec<String>,
        aggregates: Vec<AggregateSpec>,
        default_table: Option<String>,
    ) -> Self {
        Self {
            input,
            group_by,
            aggregates,
            default_table,
            done: false,
        }
    }

    fn aggregate_all(&mut self) -> FlatqResult<Batch> {
        let default_table = self.default_table.as_deref();
        if self.group_by.is_empty() {
            let mut acc = Accumulator::new(self.aggregates.len());
            while let Some(batch) = self.input.next()? {
                for row in &batch {
                    acc.update(row, &self.aggregates, default_table);
                }
            }
            let mut out = Row::with_capacity(self.aggregates.len());
            acc.write_into(&mut out, &self.aggregates);
            return Ok(vec![out]);
        }

        let mut groups = new_group_map();
        while let Some(batch) = self.input.next()? {
            for row in &batch {
                fold_grouped(&mut groups, row, &self.group_by, &self.aggregates, default_table);
            }
        }
        Ok(emit_groups(groups, &self.group_by, &self.aggregates))
    }
}

impl PhysicalOperator for HashAggregateOperator {
    fn next(&mut self) -> FlatqResult<Option<Batch>> {
        if self.done {
            return Ok(None);
        }
        self.done = true;
        let rows = self.aggregate_all()?;
        Ok((!rows.is_empty()).then_some(rows))
    }

    fn reset(&mut self) -> FlatqResult<()> {
        self.done = false;
        self.input.reset()
    }
}

type GroupMap = IndexMap<GroupKey, Accumulator, ahash::RandomState>;

fn new_group_map() -> GroupMap {
    IndexMap::with_hasher(ahash::RandomState::new())
}

fn fold_grouped(
    groups: &mut GroupMap,
    row: &Row,
    group_by: &[String],
    aggregates: &[AggregateSpec],
    default_table: Option<&str>,
) {
    let key = GroupKey(
        group_by
            .iter()
            .map(|field| row.resolve(field, default_table).cloned().unwrap_or(Value::Null))
            .collect(),
    );
    groups
        .entry(key)
        .or_insert_with(|| Accumulator::new(aggregates.len()))
        .update(row, aggregates, default_table);
}

fn emit_groups(groups: GroupMap, group_by: &[String], aggregates: &[AggregateSpec]) -> Vec<Row> {
    groups
        .into_iter()
        .map(|(GroupKey(values), acc)| {
            let mut out = Row::with_capacity(group_by.len() + aggregates.len());
            for (field, value) in group_by.iter().zip(values) {
                out.insert(field.as_str(), value);
            }
            acc.write_into(&mut out, aggregates);
            out
        })
        .collect()
}

/// One row per distinct group key, in first-seen order.
pub fn aggregate_grouped(
    rows: &[Row],
    group_by: &[String],
    aggregates: &[AggregateSpec],
    default_table: Option<&str>,
) -> Vec<Row> {
    let mut groups = new_group_map();
    for row in rows {
        fold_grouped(&mut groups, row, group_by, aggregates, default_table);
    }
    emit_groups(groups, group_by, aggregates)
}
