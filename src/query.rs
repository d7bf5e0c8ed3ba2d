//! Typed row queries for the REST data services.
//!
//! Callers describe what they want (table, columns, `field op value` filters, limit);
//! only `RowQuery::to_params` knows the PostgREST query-string syntax.

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Op {
  /// Exact equality.
  Eq,
  /// Membership in a set of values.
  In,
  /// Case-insensitive pattern match (`*` is the wildcard).
  ILike,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Value {
  Text(String),
  Int(i64),
  List(Vec<Value>),
}

impl From<&str> for Value {
  fn from(s: &str) -> Self { Value::Text(s.to_string()) }
}
impl From<String> for Value {
  fn from(s: String) -> Self { Value::Text(s) }
}
impl From<i64> for Value {
  fn from(n: i64) -> Self { Value::Int(n) }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Filter {
  pub field: String,
  pub op: Op,
  pub value: Value,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RowQuery {
  pub table: String,
  pub select: Vec<String>,
  pub filters: Vec<Filter>,
  pub limit: Option<usize>,
}

impl RowQuery {
  pub fn table(name: &str) -> Self {
    Self { table: name.to_string(), select: Vec::new(), filters: Vec::new(), limit: None }
  }

  pub fn select(mut self, columns: &[&str]) -> Self {
    self.select = columns.iter().map(|c| c.to_string()).collect();
    self
  }

  pub fn eq(self, field: &str, value: impl Into<Value>) -> Self {
    self.filter(field, Op::Eq, value.into())
  }

  pub fn any_of<V: Into<Value>>(self, field: &str, values: impl IntoIterator<Item = V>) -> Self {
    let list = values.into_iter().map(Into::into).collect();
    self.filter(field, Op::In, Value::List(list))
  }

  pub fn ilike(self, field: &str, pattern: &str) -> Self {
    self.filter(field, Op::ILike, Value::Text(pattern.to_string()))
  }

  pub fn limit(mut self, n: usize) -> Self {
    self.limit = Some(n);
    self
  }

  fn filter(mut self, field: &str, op: Op, value: Value) -> Self {
    self.filters.push(Filter { field: field.to_string(), op, value });
    self
  }

  /// Render as PostgREST query parameters (`field=op.value`, `select=`, `limit=`).
  pub fn to_params(&self) -> Vec<(String, String)> {
    let mut params = Vec::with_capacity(self.filters.len() + 2);
    for f in &self.filters {
      let rendered = match f.op {
        Op::Eq => format!("eq.{}", render_scalar(&f.value)),
        Op::ILike => format!("ilike.{}", render_scalar(&f.value)),
        Op::In => format!("in.({})", render_list(&f.value)),
      };
      params.push((f.field.clone(), rendered));
    }
    params.push(("select".to_string(), if self.select.is_empty() { "*".to_string() } else { self.select.join(",") }));
    if let Some(n) = self.limit {
      params.push(("limit".to_string(), n.to_string()));
    }
    params
  }
}

fn render_scalar(v: &Value) -> String {
  match v {
    Value::Text(s) => s.clone(),
    Value::Int(n) => n.to_string(),
    Value::List(items) => items.iter().map(render_scalar).collect::<Vec<_>>().join(","),
  }
}

// Text members are double-quoted so names containing commas or spaces stay intact.
fn render_list(v: &Value) -> String {
  match v {
    Value::List(items) => items
      .iter()
      .map(|item| match item {
        Value::Text(s) => format!("\"{}\"", s.replace('"', "\\\"")),
        other => render_scalar(other),
      })
      .collect::<Vec<_>>()
      .join(","),
    other => render_scalar(other),
  }
}
