//! Convert a parsed configuration into the runtime configuration.

use query_engine_metadata::metadata::{self, Relation, ResourceSchema};

use crate::configuration::Configuration;
use crate::environment::Environment;
use crate::error::MakeRuntimeConfigurationError;
use crate::values::{ConnectionUri, Secret};
use crate::version1::{ParsedConfiguration, RelationConfiguration, ResourceConfiguration};

/// Resolve secrets from the environment and build the schema of every resource.
///
/// Relation defaults are filled in here, once. Request handling only looks relations up.
pub fn make_runtime_configuration(
    parsed_config: ParsedConfiguration,
    environment: impl Environment,
) -> Result<Configuration, MakeRuntimeConfigurationError> {
    let connection_uri = match parsed_config.connection_uri {
        ConnectionUri(Secret::Plain(uri)) => Ok(uri),
        ConnectionUri(Secret::FromEnvironment { variable }) => {
            environment.read(&variable).map_err(|error| {
                MakeRuntimeConfigurationError::MissingEnvironmentVariable {
                    attribute: "connectionUri".to_string(),
                    message: error.to_string(),
                }
            })
        }
    }?;

    let mut metadata = metadata::Metadata::empty();
    for (name, resource) in parsed_config.resources {
        let schema = make_resource_schema(name, resource)?;
        tracing::debug!(
            resource = schema.name(),
            table = schema.table(),
            "registered resource"
        );
        metadata.register(schema);
    }

    Ok(Configuration {
        metadata,
        pool_settings: parsed_config.pool_settings,
        connection_uri,
    })
}

fn make_resource_schema(
    name: String,
    resource: ResourceConfiguration,
) -> Result<ResourceSchema, MakeRuntimeConfigurationError> {
    let relations = resource
        .relations
        .into_iter()
        .map(|(relation_name, relation)| {
            let relation = make_relation(&relation_name, relation);
            (relation_name, relation)
        })
        .collect();
    let table = resource.table.unwrap_or_else(|| name.clone());
    Ok(ResourceSchema::new(
        name,
        table,
        resource.fields,
        resource.lookup_field,
        relations,
    )?)
}

fn make_relation(name: &str, relation: RelationConfiguration) -> Relation {
    let conventional = Relation::conventional(name);
    let alias = relation.alias.unwrap_or(conventional.alias);
    Relation {
        table: relation.table.unwrap_or(conventional.table),
        references: relation.references.unwrap_or(conventional.references),
        foreign_key: relation
            .foreign_key
            .unwrap_or_else(|| format!("{alias}_id")),
        alias,
    }
}
