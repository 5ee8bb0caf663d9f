use std::fmt;

use serde::{Deserialize, Serialize};

use crate::types::{
    error::{DatabaseError, Result},
    value::{Field, Type},
};

/// An in-memory row. Tuples carry no layout information; a
/// [`TupleDesc`](crate::storage::schema::TupleDesc) interprets them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tuple {
    fields: Vec<Field>,
}

impl Tuple {
    pub fn new(fields: Vec<Field>) -> Self {
        Self { fields }
    }

    pub fn size(&self) -> usize {
        self.fields.len()
    }

    pub fn field_type(&self, index: usize) -> Result<Type> {
        self.get_field(index).map(Field::field_type)
    }

    pub fn get_field(&self, index: usize) -> Result<&Field> {
        self.fields
            .get(index)
            .ok_or(DatabaseError::FieldIndexOutOfBounds {
                index,
                size: self.fields.len(),
            })
    }

    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    pub fn into_fields(self) -> Vec<Field> {
        self.fields
    }
}

impl From<Vec<Field>> for Tuple {
    fn from(fields: Vec<Field>) -> Self {
        Self::new(fields)
    }
}

impl fmt::Display for Tuple {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(")?;
        for (i, field) in self.fields.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            match field {
                Field::Char(s) => write!(f, "'{}'", s)?,
                other => write!(f, "{}", other)?,
            }
        }
        write!(f, ")")
    }
}
