//! Configuration for the server.

use query_engine_metadata::metadata;

use crate::values::PoolSettings;

/// The 'Configuration' type collects all the information necessary to serve queries at runtime.
///
/// 'ParsedConfiguration' is the serialized format on disk. Values of this type are produced
/// from a 'ParsedConfiguration' using 'make_runtime_configuration', which resolves secrets and
/// builds the schema of every resource once.
#[derive(Debug)]
pub struct Configuration {
    pub metadata: metadata::Metadata,
    pub pool_settings: PoolSettings,
    pub connection_uri: String,
}
