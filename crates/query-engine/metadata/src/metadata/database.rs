//! Schema information for a single resource: its fields, its primary key and
//! the relations that can be drilled down into.

use std::collections::BTreeMap;

use enum_iterator::Sequence;
use indexmap::IndexMap;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// The declared types a field may have.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Sequence,
    Serialize,
    Deserialize,
    JsonSchema,
)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    Integer,
    Float,
    Text,
    Boolean,
    Timestamp,
}

impl FieldType {
    /// Textual fields are compared and looked up as strings.
    pub fn is_textual(self) -> bool {
        matches!(self, FieldType::Text)
    }
}

impl std::fmt::Display for FieldType {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        let name = match self {
            FieldType::Integer => "integer",
            FieldType::Float => "float",
            FieldType::Text => "text",
            FieldType::Boolean => "boolean",
            FieldType::Timestamp => "timestamp",
        };
        write!(f, "{name}")
    }
}

/// Information about a single field of a resource.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct FieldDescriptor {
    /// The column name, which is also the name clients use.
    pub name: String,
    pub r#type: FieldType,
    #[serde(default)]
    pub primary_key: bool,
}

impl FieldDescriptor {
    pub fn new(name: impl Into<String>, r#type: FieldType) -> Self {
        FieldDescriptor {
            name: name.into(),
            r#type,
            primary_key: false,
        }
    }

    pub fn primary_key(name: impl Into<String>, r#type: FieldType) -> Self {
        FieldDescriptor {
            name: name.into(),
            r#type,
            primary_key: true,
        }
    }
}

/// A relation to another table, reachable with a single left join:
///
/// > LEFT OUTER JOIN "<table>" ON "<table>"."<references>" = "<resource table>"."<foreign_key>"
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Relation {
    /// The related table.
    pub table: String,
    /// The column of the related table the foreign key points at.
    pub references: String,
    /// The column of the resource table holding the foreign key.
    pub foreign_key: String,
    /// Prefix of the projected related fields, as in `author.name`.
    pub alias: String,
}

impl Relation {
    /// The relation we assume when only a related table name is known:
    /// `authors` is joined on `authors.id = author_id` and projected as `author.<field>`.
    pub fn conventional(table: &str) -> Relation {
        let alias = table.strip_suffix('s').unwrap_or(table).to_string();
        Relation {
            table: table.to_string(),
            references: "id".to_string(),
            foreign_key: format!("{alias}_id"),
            alias,
        }
    }
}

/// Errors raised while building a resource schema.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaError {
    #[error("resource '{0}' does not declare a primary key")]
    NoPrimaryKey(String),
    #[error("resource '{resource}' declares more than one primary key: '{first}' and '{second}'")]
    MultiplePrimaryKeys {
        resource: String,
        first: String,
        second: String,
    },
    #[error("resource '{resource}' declares the field '{field}' more than once")]
    DuplicateField { resource: String, field: String },
    #[error("lookup field '{field}' is not a field of resource '{resource}'")]
    UnknownLookupField { resource: String, field: String },
}

/// The schema of a resource. It is built once when the resource is registered and
/// never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceSchema {
    name: String,
    table: String,
    fields: IndexMap<String, FieldDescriptor>,
    primary_key: String,
    lookup_field: String,
    relations: BTreeMap<String, Relation>,
}

impl ResourceSchema {
    /// Build a schema from ordered field descriptors. Exactly one field must be the primary key.
    /// The lookup field used by item endpoints defaults to the primary key.
    pub fn new(
        name: impl Into<String>,
        table: impl Into<String>,
        descriptors: Vec<FieldDescriptor>,
        lookup_field: Option<String>,
        relations: BTreeMap<String, Relation>,
    ) -> Result<ResourceSchema, SchemaError> {
        let name = name.into();
        let mut fields = IndexMap::with_capacity(descriptors.len());
        let mut primary_key: Option<String> = None;

        for descriptor in descriptors {
            if descriptor.primary_key {
                if let Some(first) = &primary_key {
                    return Err(SchemaError::MultiplePrimaryKeys {
                        resource: name,
                        first: first.clone(),
                        second: descriptor.name,
                    });
                }
                primary_key = Some(descriptor.name.clone());
            }
            if fields.contains_key(&descriptor.name) {
                return Err(SchemaError::DuplicateField {
                    resource: name,
                    field: descriptor.name,
                });
            }
            fields.insert(descriptor.name.clone(), descriptor);
        }

        let primary_key = primary_key.ok_or_else(|| SchemaError::NoPrimaryKey(name.clone()))?;
        let lookup_field = lookup_field.unwrap_or_else(|| primary_key.clone());
        if !fields.contains_key(&lookup_field) {
            return Err(SchemaError::UnknownLookupField {
                resource: name,
                field: lookup_field,
            });
        }

        Ok(ResourceSchema {
            name,
            table: table.into(),
            fields,
            primary_key,
            lookup_field,
            relations,
        })
    }

    /// The name the resource is exposed under.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The table backing the resource.
    pub fn table(&self) -> &str {
        &self.table
    }

    /// Does the resource have a field with this exact name?
    pub fn exists(&self, field: &str) -> bool {
        self.fields.contains_key(field)
    }

    pub fn primary_key(&self) -> &str {
        &self.primary_key
    }

    /// The field item endpoints look rows up by.
    pub fn lookup_field(&self) -> &str {
        &self.lookup_field
    }

    /// Unknown fields are not textual.
    pub fn is_textual(&self, field: &str) -> bool {
        self.field_type(field).is_some_and(FieldType::is_textual)
    }

    pub fn field_type(&self, field: &str) -> Option<FieldType> {
        self.fields.get(field).map(|descriptor| descriptor.r#type)
    }

    /// The field descriptors, in declaration order.
    pub fn fields(&self) -> impl Iterator<Item = &FieldDescriptor> {
        self.fields.values()
    }

    /// Find a relation either by its name (`authors`) or by its alias (`author`).
    pub fn relation(&self, name_or_alias: &str) -> Option<&Relation> {
        self.relations.get(name_or_alias).or_else(|| {
            self.relations
                .values()
                .find(|relation| relation.alias == name_or_alias)
        })
    }
}
