use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::types::{
    CHAR_SIZE, DOUBLE_SIZE, INT_SIZE,
    error::{DatabaseError, Result},
};

/// Field type tag. Every type has a constant serialized width.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Type {
    Int,
    Double,
    Char,
}

impl Type {
    /// Serialized width in bytes.
    pub fn size(&self) -> usize {
        match self {
            Type::Int => INT_SIZE,
            Type::Double => DOUBLE_SIZE,
            Type::Char => CHAR_SIZE,
        }
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Type::Int => write!(f, "INT"),
            Type::Double => write!(f, "DOUBLE"),
            Type::Char => write!(f, "CHAR"),
        }
    }
}

impl FromStr for Type {
    type Err = DatabaseError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_uppercase().as_str() {
            "INT" | "INTEGER" => Ok(Type::Int),
            "DOUBLE" | "REAL" => Ok(Type::Double),
            "CHAR" | "TEXT" => Ok(Type::Char),
            _ => Err(DatabaseError::InvalidValue {
                value: s.to_string(),
                field_type: "type".to_string(),
            }),
        }
    }
}

/// A single field value of a tuple.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Field {
    Int(i32),
    Double(f64),
    Char(String),
}

impl Field {
    pub fn field_type(&self) -> Type {
        match self {
            Field::Int(_) => Type::Int,
            Field::Double(_) => Type::Double,
            Field::Char(_) => Type::Char,
        }
    }

    /// Parses `text` as a value of `field_type`.
    pub fn parse(field_type: Type, text: &str) -> Result<Self> {
        let invalid = || DatabaseError::InvalidValue {
            value: text.to_string(),
            field_type: field_type.to_string(),
        };
        match field_type {
            Type::Int => text.parse().map(Field::Int).map_err(|_| invalid()),
            Type::Double => text.parse().map(Field::Double).map_err(|_| invalid()),
            Type::Char => Ok(Field::Char(text.to_string())),
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Field::Int(i) => write!(f, "{}", i),
            Field::Double(d) => write!(f, "{}", d),
            Field::Char(s) => write!(f, "{}", s),
        }
    }
}

impl From<i32> for Field {
    fn from(value: i32) -> Self {
        Field::Int(value)
    }
}

impl From<f64> for Field {
    fn from(value: f64) -> Self {
        Field::Double(value)
    }
}

impl From<&str> for Field {
    fn from(value: &str) -> Self {
        Field::Char(value.to_string())
    }
}

impl From<String> for Field {
    fn from(value: String) -> Self {
        Field::Char(value)
    }
}
