//! Database-agnostic property value types for label signatures
//!
//! Element type declarations attach one of these types to every property. The
//! resolver never inspects backing data, so these types only need to be
//! comparable: two declarations of the same property agree iff their types are
//! equal, nullability included.
//!
//! # Supported Types
//!
//! - `INTEGER` - Whole numbers (aliases: `int`, `long`, `bigint`)
//! - `FLOAT` - Decimal numbers (aliases: `double`, `decimal`)
//! - `STRING` - Text (aliases: `text`, `varchar`)
//! - `BOOLEAN` - True/False (alias: `bool`)
//! - `DATE` - Calendar dates
//! - `DATETIME` - Timestamps (alias: `timestamp`)
//! - `UUID` - UUIDs
//!
//! A trailing `?` marks the type nullable: `STRING?`.
//!
//! # Example
//!
//! ```yaml
//! statement: element_type
//! name: Person
//! properties:
//!   name: STRING
//!   age: integer?
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Base value type of a property, without nullability
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum BaseType {
    /// Whole numbers
    Integer,

    /// Decimal numbers
    Float,

    /// Text
    String,

    /// True/False
    Boolean,

    /// Calendar dates
    Date,

    /// Timestamps
    DateTime,

    /// UUIDs
    Uuid,
}

impl BaseType {
    pub fn as_str(&self) -> &'static str {
        match self {
            BaseType::Integer => "INTEGER",
            BaseType::Float => "FLOAT",
            BaseType::String => "STRING",
            BaseType::Boolean => "BOOLEAN",
            BaseType::Date => "DATE",
            BaseType::DateTime => "DATETIME",
            BaseType::Uuid => "UUID",
        }
    }
}

impl FromStr for BaseType {
    type Err = String;

    /// Case-insensitive, accepts the aliases listed in the module docs
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "integer" | "int" | "long" | "bigint" => Ok(BaseType::Integer),
            "float" | "double" | "decimal" => Ok(BaseType::Float),
            "string" | "text" | "varchar" => Ok(BaseType::String),
            "boolean" | "bool" => Ok(BaseType::Boolean),
            "date" => Ok(BaseType::Date),
            "datetime" | "timestamp" => Ok(BaseType::DateTime),
            "uuid" => Ok(BaseType::Uuid),
            _ => Err(format!(
                "Unknown property type: '{}'. Supported: integer, float, string, boolean, date, datetime, uuid",
                s
            )),
        }
    }
}

/// Declared type of a single property
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PropertyType {
    base: BaseType,
    nullable: bool,
}

impl PropertyType {
    pub fn new(base: BaseType) -> Self {
        PropertyType {
            base,
            nullable: false,
        }
    }

    pub fn nullable(base: BaseType) -> Self {
        PropertyType {
            base,
            nullable: true,
        }
    }

    pub fn base(&self) -> BaseType {
        self.base
    }

    pub fn is_nullable(&self) -> bool {
        self.nullable
    }
}

impl FromStr for PropertyType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        match trimmed.strip_suffix('?') {
            Some(base) => Ok(PropertyType::nullable(base.parse()?)),
            None => Ok(PropertyType::new(trimmed.parse()?)),
        }
    }
}

impl TryFrom<String> for PropertyType {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<PropertyType> for String {
    fn from(value: PropertyType) -> Self {
        value.to_string()
    }
}

impl fmt::Display for PropertyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.base.as_str())?;
        if self.nullable {
            f.write_str("?")?;
        }
        Ok(())
    }
}
