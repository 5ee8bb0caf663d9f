use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::types::{
    CHAR_SIZE, DOUBLE_SIZE, INT_SIZE,
    error::{DatabaseError, Result},
    tuple::Tuple,
    value::{Field, Type},
};

/// Ordered list of typed, uniquely named fields defining the fixed-width
/// binary layout of a tuple. Immutable once built.
///
/// Only the types and names are serialized; offsets and the name index are
/// rebuilt through [`TupleDesc::new`] when deserializing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "TupleDescRepr", into = "TupleDescRepr")]
pub struct TupleDesc {
    types: Vec<Type>,
    names: Vec<String>,
    offsets: Vec<usize>,
    length: usize,
    name_to_index: HashMap<String, usize>,
}

#[derive(Serialize, Deserialize)]
struct TupleDescRepr {
    types: Vec<Type>,
    names: Vec<String>,
}

impl TryFrom<TupleDescRepr> for TupleDesc {
    type Error = DatabaseError;

    fn try_from(repr: TupleDescRepr) -> Result<Self> {
        TupleDesc::new(repr.types, repr.names)
    }
}

impl From<TupleDesc> for TupleDescRepr {
    fn from(td: TupleDesc) -> Self {
        Self {
            types: td.types,
            names: td.names,
        }
    }
}

impl TupleDesc {
    pub fn new(types: Vec<Type>, names: Vec<String>) -> Result<Self> {
        if types.len() != names.len() {
            return Err(DatabaseError::FieldCountMismatch {
                types: types.len(),
                names: names.len(),
            });
        }

        let mut seen = HashSet::new();
        for name in &names {
            if !seen.insert(name.as_str()) {
                return Err(DatabaseError::DuplicateField { name: name.clone() });
            }
        }

        let mut offsets = Vec::with_capacity(types.len());
        let mut name_to_index = HashMap::with_capacity(names.len());
        let mut offset = 0;
        for (i, field_type) in types.iter().enumerate() {
            offsets.push(offset);
            offset += field_type.size();
            name_to_index.insert(names[i].clone(), i);
        }

        Ok(Self {
            types,
            names,
            offsets,
            length: offset,
            name_to_index,
        })
    }

    /// Builds a schema from `(type, name)` pairs.
    pub fn from_fields<I, S>(fields: I) -> Result<Self>
    where
        I: IntoIterator<Item = (Type, S)>,
        S: Into<String>,
    {
        let (types, names): (Vec<Type>, Vec<String>) = fields
            .into_iter()
            .map(|(field_type, name)| (field_type, name.into()))
            .unzip();
        Self::new(types, names)
    }

    /// Concatenates `td1`'s fields followed by `td2`'s.
    pub fn merge(td1: &TupleDesc, td2: &TupleDesc) -> Result<Self> {
        let types = td1.types.iter().chain(&td2.types).copied().collect();
        let names = td1.names.iter().chain(&td2.names).cloned().collect();
        Self::new(types, names)
    }

    /// Number of fields.
    pub fn size(&self) -> usize {
        self.types.len()
    }

    /// Total serialized width in bytes.
    pub fn length(&self) -> usize {
        self.length
    }

    pub fn types(&self) -> &[Type] {
        &self.types
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn field_type(&self, index: usize) -> Result<Type> {
        self.types
            .get(index)
            .copied()
            .ok_or_else(|| self.out_of_bounds(index))
    }

    pub fn field_name(&self, index: usize) -> Result<&str> {
        self.names
            .get(index)
            .map(String::as_str)
            .ok_or_else(|| self.out_of_bounds(index))
    }

    pub fn offset_of(&self, index: usize) -> Result<usize> {
        self.offsets
            .get(index)
            .copied()
            .ok_or_else(|| self.out_of_bounds(index))
    }

    pub fn index_of(&self, name: &str) -> Result<usize> {
        self.name_to_index
            .get(name)
            .copied()
            .ok_or_else(|| DatabaseError::FieldNotFound {
                name: name.to_string(),
            })
    }

    /// Same field count and matching type tags in order.
    pub fn compatible(&self, tuple: &Tuple) -> bool {
        tuple.size() == self.size()
            && tuple
                .fields()
                .iter()
                .zip(&self.types)
                .all(|(field, field_type)| field.field_type() == *field_type)
    }

    /// Writes exactly `length()` bytes at the start of `buf`.
    pub fn serialize(&self, buf: &mut [u8], tuple: &Tuple) -> Result<()> {
        if !self.compatible(tuple) {
            return Err(DatabaseError::IncompatibleTuple {
                details: format!("tuple {} does not match schema {}", tuple, self),
            });
        }
        self.check_buffer(buf.len())?;

        for (field, &offset) in tuple.fields().iter().zip(&self.offsets) {
            match field {
                Field::Int(v) => {
                    buf[offset..offset + INT_SIZE].copy_from_slice(&v.to_le_bytes())
                }
                Field::Double(v) => {
                    buf[offset..offset + DOUBLE_SIZE].copy_from_slice(&v.to_le_bytes())
                }
                Field::Char(s) => {
                    let bytes = s.as_bytes();
                    let n = bytes.len().min(CHAR_SIZE);
                    let slot = &mut buf[offset..offset + CHAR_SIZE];
                    slot[..n].copy_from_slice(&bytes[..n]);
                    slot[n..].fill(0);
                }
            }
        }
        Ok(())
    }

    /// Reads one tuple from the first `length()` bytes of `buf`.
    pub fn deserialize(&self, buf: &[u8]) -> Result<Tuple> {
        self.check_buffer(buf.len())?;

        let mut fields = Vec::with_capacity(self.size());
        for (field_type, &offset) in self.types.iter().zip(&self.offsets) {
            let bytes = &buf[offset..offset + field_type.size()];
            let field = match field_type {
                Type::Int => Field::Int(i32::from_le_bytes(
                    bytes.try_into().map_err(|_| self.bad_width(*field_type))?,
                )),
                Type::Double => Field::Double(f64::from_le_bytes(
                    bytes.try_into().map_err(|_| self.bad_width(*field_type))?,
                )),
                Type::Char => {
                    let len = bytes.iter().position(|&b| b == 0).unwrap_or(bytes.len());
                    Field::Char(String::from_utf8_lossy(&bytes[..len]).into_owned())
                }
            };
            fields.push(field);
        }
        Ok(Tuple::new(fields))
    }

    fn check_buffer(&self, actual: usize) -> Result<()> {
        if actual < self.length {
            return Err(DatabaseError::BufferTooSmall {
                expected: self.length,
                actual,
            });
        }
        Ok(())
    }

    fn out_of_bounds(&self, index: usize) -> DatabaseError {
        DatabaseError::FieldIndexOutOfBounds {
            index,
            size: self.size(),
        }
    }

    fn bad_width(&self, field_type: Type) -> DatabaseError {
        DatabaseError::Internal(format!("unexpected width for {} field", field_type))
    }
}

impl std::fmt::Display for TupleDesc {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "(")?;
        for (i, (name, field_type)) in self.names.iter().zip(&self.types).enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{} {}", name, field_type)?;
        }
        write!(f, ")")
    }
}
