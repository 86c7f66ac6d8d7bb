//! Filter predicates whose operands may be captured from the caller's scope.
//!
//! A captured operand is a closure. It is evaluated when the query executes,
//! not when the predicate is built. Evaluating every captured operand and
//! binding the results as parameters is called *funcletization*. It happens on
//! every execution, so a query that is built once and executed many times
//! always sees the current value of whatever it captured.

use sea_orm::{ColumnTrait, Condition, Value, sea_query::SimpleExpr};
use std::fmt;
use std::rc::Rc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Comparison {
    Eq,
    Ne,
    Lt,
    Lte,
    Gt,
    Gte,
}

impl Comparison {
    fn apply<C: ColumnTrait>(self, column: C, value: Value) -> SimpleExpr {
        match self {
            Self::Eq => column.eq(value),
            Self::Ne => column.ne(value),
            Self::Lt => column.lt(value),
            Self::Lte => column.lte(value),
            Self::Gt => column.gt(value),
            Self::Gte => column.gte(value),
        }
    }
}

/// Right-hand side of a comparison
#[derive(Clone)]
pub enum Operand<'a> {
    /// Literal known when the predicate is built
    Constant(Value),
    /// Closure evaluated on every execution
    Captured(Rc<dyn Fn() -> Value + 'a>),
}

impl<'a> Operand<'a> {
    pub fn constant(value: impl Into<Value>) -> Self {
        Self::Constant(value.into())
    }

    /// Capture a value by closure. The closure may borrow locals, fields or
    /// call accessor chains.
    pub fn captured<F, V>(f: F) -> Self
    where
        F: Fn() -> V + 'a,
        V: Into<Value>,
    {
        Self::Captured(Rc::new(move || f().into()))
    }

    #[must_use]
    pub fn is_captured(&self) -> bool {
        matches!(self, Self::Captured(_))
    }

    /// Current value of the operand
    #[must_use]
    pub fn evaluate(&self) -> Value {
        match self {
            Self::Constant(value) => value.clone(),
            Self::Captured(f) => f(),
        }
    }
}

impl fmt::Debug for Operand<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Constant(value) => f.debug_tuple("Constant").field(value).finish(),
            Self::Captured(_) => f.write_str("Captured(..)"),
        }
    }
}

#[derive(Debug, Clone)]
pub enum Predicate<'a, C> {
    Compare {
        column: C,
        comparison: Comparison,
        operand: Operand<'a>,
    },
    All(Vec<Predicate<'a, C>>),
    Any(Vec<Predicate<'a, C>>),
    Negate(Box<Predicate<'a, C>>),
}

impl<'a, C: ColumnTrait> Predicate<'a, C> {
    pub fn compare(column: C, comparison: Comparison, operand: Operand<'a>) -> Self {
        Self::Compare {
            column,
            comparison,
            operand,
        }
    }

    pub fn eq(column: C, operand: Operand<'a>) -> Self {
        Self::compare(column, Comparison::Eq, operand)
    }

    pub fn ne(column: C, operand: Operand<'a>) -> Self {
        Self::compare(column, Comparison::Ne, operand)
    }

    pub fn lt(column: C, operand: Operand<'a>) -> Self {
        Self::compare(column, Comparison::Lt, operand)
    }

    pub fn lte(column: C, operand: Operand<'a>) -> Self {
        Self::compare(column, Comparison::Lte, operand)
    }

    pub fn gt(column: C, operand: Operand<'a>) -> Self {
        Self::compare(column, Comparison::Gt, operand)
    }

    pub fn gte(column: C, operand: Operand<'a>) -> Self {
        Self::compare(column, Comparison::Gte, operand)
    }

    #[must_use]
    pub fn and(self, other: Self) -> Self {
        match self {
            Self::All(mut children) => {
                children.push(other);
                Self::All(children)
            }
            first => Self::All(vec![first, other]),
        }
    }

    #[must_use]
    pub fn or(self, other: Self) -> Self {
        match self {
            Self::Any(mut children) => {
                children.push(other);
                Self::Any(children)
            }
            first => Self::Any(vec![first, other]),
        }
    }

    #[must_use]
    pub fn negate(self) -> Self {
        Self::Negate(Box::new(self))
    }

    /// Number of captured operands in this predicate tree
    #[must_use]
    pub fn captured_count(&self) -> usize {
        match self {
            Self::Compare { operand, .. } => usize::from(operand.is_captured()),
            Self::All(children) | Self::Any(children) => {
                children.iter().map(Self::captured_count).sum()
            }
            Self::Negate(inner) => inner.captured_count(),
        }
    }

    /// Evaluate captured operands and translate to a concrete condition.
    ///
    /// Each captured value is appended to `parameters` in tree order.
    pub fn funcletize(&self, parameters: &mut Vec<Value>) -> Condition {
        match self {
            Self::Compare {
                column,
                comparison,
                operand,
            } => {
                let value = operand.evaluate();
                if operand.is_captured() {
                    parameters.push(value.clone());
                }
                Condition::all().add(comparison.apply(*column, value))
            }
            Self::All(children) => children
                .iter()
                .fold(Condition::all(), |cond, child| cond.add(child.funcletize(parameters))),
            Self::Any(children) => children
                .iter()
                .fold(Condition::any(), |cond, child| cond.add(child.funcletize(parameters))),
            Self::Negate(inner) => inner.funcletize(parameters).not(),
        }
    }
}

/// A predicate set after funcletization: a concrete condition plus the values
/// that were extracted from captured operands.
#[derive(Debug, Clone)]
pub struct Funcletized {
    pub condition: Condition,
    pub parameters: Vec<Value>,
}
