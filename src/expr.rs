//! Minimal bound-expression model.
//!
//! Binding only manufactures one expression shape itself (the implicit
//! delete-marker equality conjunct), so the model is deliberately small:
//! slot references with stable ids, literals, and equality.

use std::fmt::{self, Display, Formatter};

use arrow_schema::DataType;

use crate::context::SlotId;

/// A reference to one output column of a bound operator.
///
/// Slot ids are allocated once at scan construction and stay stable for the
/// lifetime of the plan; downstream rules identify columns by id, not name.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct SlotRef {
    id: SlotId,
    qualifier: Vec<String>,
    name: String,
    data_type: DataType,
    hidden: bool,
}

impl SlotRef {
    pub fn new(
        id: SlotId,
        qualifier: Vec<String>,
        name: impl Into<String>,
        data_type: DataType,
        hidden: bool,
    ) -> Self {
        Self {
            id,
            qualifier,
            name: name.into(),
            data_type,
            hidden,
        }
    }

    pub fn id(&self) -> SlotId {
        self.id
    }

    pub fn qualifier(&self) -> &[String] {
        &self.qualifier
    }

    /// Same slot with a different qualifier, e.g. after aliasing through a
    /// view name. The id is preserved.
    pub fn with_qualifier(&self, qualifier: Vec<String>) -> Self {
        Self {
            qualifier,
            ..self.clone()
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn data_type(&self) -> &DataType {
        &self.data_type
    }

    pub fn is_hidden(&self) -> bool {
        self.hidden
    }
}

impl Display for SlotRef {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        for part in &self.qualifier {
            write!(f, "{}.", part)?;
        }
        write!(f, "{}#{}", self.name, self.id)
    }
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Literal {
    TinyInt(i8),
    BigInt(i64),
    Utf8(String),
    Boolean(bool),
}

impl Literal {
    /// Sentinel value the delete-marker column holds for live rows.
    pub fn not_deleted() -> Self {
        Literal::TinyInt(0)
    }
}

impl Display for Literal {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Literal::TinyInt(v) => write!(f, "{}", v),
            Literal::BigInt(v) => write!(f, "{}", v),
            Literal::Utf8(v) => write!(f, "'{}'", v),
            Literal::Boolean(v) => write!(f, "{}", v),
        }
    }
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Expr {
    Slot(SlotRef),
    Literal(Literal),
    Eq(Box<Expr>, Box<Expr>),
}

impl Expr {
    pub fn eq(left: Expr, right: Expr) -> Self {
        Expr::Eq(Box::new(left), Box::new(right))
    }
}

impl Display for Expr {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Slot(slot) => write!(f, "{}", slot),
            Expr::Literal(lit) => write!(f, "{}", lit),
            Expr::Eq(left, right) => write!(f, "({} = {})", left, right),
        }
    }
}
