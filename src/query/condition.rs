use std::fmt::{self, Display};

use crate::{
    common::error::Result,
    core::types::Value,
    db::table::tuple::Tuple,
};

/// A boolean predicate over a single tuple.
///
/// Evaluation is read-only and has no side effects. Conditions are
/// immutable values; [`ConditionExt`] combines them into new trees.
pub trait Condition: Display {
    fn evaluate(&self, row: &Tuple) -> Result<bool>;
}

impl<C: Condition + ?Sized> Condition for &C {
    fn evaluate(&self, row: &Tuple) -> Result<bool> {
        (**self).evaluate(row)
    }
}

impl<C: Condition + ?Sized> Condition for Box<C> {
    fn evaluate(&self, row: &Tuple) -> Result<bool> {
        (**self).evaluate(row)
    }
}

/// Combinators available on every condition.
///
/// # Example
///
/// ```
/// use heap_db::{ConditionExt, Equals};
///
/// let cond = Equals::new("dept_name", "Physics").or(Equals::new("salary", 60000)).not();
/// assert_eq!(cond.to_string(), "NOT (dept_name = 'Physics' OR salary = 60000)");
/// ```
pub trait ConditionExt: Condition + Sized {
    fn and<R: Condition>(self, right: R) -> And<Self, R> {
        And { left: self, right }
    }

    fn or<R: Condition>(self, right: R) -> Or<Self, R> {
        Or { left: self, right }
    }

    #[allow(clippy::should_implement_trait)]
    fn not(self) -> Not<Self> {
        Not { inner: self }
    }

    fn boxed<'a>(self) -> Box<dyn Condition + 'a>
    where
        Self: 'a,
    {
        Box::new(self)
    }
}

impl<C: Condition> ConditionExt for C {}

/// `column = value`. Null equals null.
#[derive(Debug, Clone, PartialEq)]
pub struct Equals {
    column: String,
    value: Value,
}

impl Equals {
    pub fn new(column: &str, value: impl Into<Value>) -> Self {
        Self {
            column: column.to_owned(),
            value: value.into(),
        }
    }
}

impl Condition for Equals {
    fn evaluate(&self, row: &Tuple) -> Result<bool> {
        Ok(row.get_by_name(&self.column)? == &self.value)
    }
}

impl Display for Equals {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.value {
            Value::Text(text) => write!(f, "{} = '{}'", self.column, text),
            other => write!(f, "{} = {}", self.column, other),
        }
    }
}

/// Short-circuiting conjunction: `right` is skipped when `left` is false.
#[derive(Debug, Clone)]
pub struct And<L, R> {
    left: L,
    right: R,
}

impl<L: Condition, R: Condition> Condition for And<L, R> {
    fn evaluate(&self, row: &Tuple) -> Result<bool> {
        if !self.left.evaluate(row)? {
            return Ok(false);
        }
        self.right.evaluate(row)
    }
}

impl<L: Display, R: Display> Display for And<L, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({} AND {})", self.left, self.right)
    }
}

/// Short-circuiting disjunction: `right` is skipped when `left` is true.
#[derive(Debug, Clone)]
pub struct Or<L, R> {
    left: L,
    right: R,
}

impl<L: Condition, R: Condition> Condition for Or<L, R> {
    fn evaluate(&self, row: &Tuple) -> Result<bool> {
        if self.left.evaluate(row)? {
            return Ok(true);
        }
        self.right.evaluate(row)
    }
}

impl<L: Display, R: Display> Display for Or<L, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({} OR {})", self.left, self.right)
    }
}

#[derive(Debug, Clone)]
pub struct Not<C> {
    inner: C,
}

impl<C: Condition> Condition for Not<C> {
    fn evaluate(&self, row: &Tuple) -> Result<bool> {
        Ok(!self.inner.evaluate(row)?)
    }
}

impl<C: Display> Display for Not<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NOT {}", self.inner)
    }
}

/// Matches every row.
#[derive(Debug, Clone, Copy, Default)]
pub struct AlwaysTrue;

impl Condition for AlwaysTrue {
    fn evaluate(&self, _row: &Tuple) -> Result<bool> {
        Ok(true)
    }
}

impl Display for AlwaysTrue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TRUE")
    }
}

/// A user-defined leaf backed by a closure, with a label for display.
///
/// ```
/// use heap_db::{Condition, Predicate, Schema, Tuple};
///
/// let mut schema = Schema::new();
/// schema.add_int("salary")?;
/// let schema = schema.into_ref();
/// let row = Tuple::new(&schema, vec![90000.into()])?;
///
/// let rich = Predicate::new("salary > 80000", |t: &Tuple| Ok(t.get_int(0)? > 80000));
/// assert!(rich.evaluate(&row)?);
/// # Ok::<(), heap_db::DatabaseError>(())
/// ```
pub struct Predicate<F> {
    label: String,
    func: F,
}

impl<F> Predicate<F>
where
    F: Fn(&Tuple) -> Result<bool>,
{
    pub fn new(label: &str, func: F) -> Self {
        Self {
            label: label.to_owned(),
            func,
        }
    }
}

impl<F> Condition for Predicate<F>
where
    F: Fn(&Tuple) -> Result<bool>,
{
    fn evaluate(&self, row: &Tuple) -> Result<bool> {
        (self.func)(row)
    }
}

impl<F> Display for Predicate<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label)
    }
}

impl<F> fmt::Debug for Predicate<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Predicate")
            .field("label", &self.label)
            .finish_non_exhaustive()
    }
}
