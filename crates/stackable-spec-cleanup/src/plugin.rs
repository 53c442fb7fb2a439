//! Validation of plugin specs against the JSON schema a plugin declares.
//!
//! Plugins describe themselves once, when they are registered. If the
//! description contains a spec schema, it is compiled at that point, so an
//! invalid schema prevents the plugin from being used at all. Every spec handed
//! to the plugin afterwards is validated against the compiled schema before it
//! enters the merge pipeline.

use std::fmt;

use jsonschema::JSONSchema;
use serde_json::{Map, Value};
use snafu::{ResultExt, Snafu};

type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, Snafu)]
pub enum Error {
    #[snafu(display("failed to parse spec schema as JSON"))]
    ParseSchema { source: serde_json::Error },

    #[snafu(display("spec schema is not a valid JSON schema: {message}"))]
    InvalidSchema { message: String },

    #[snafu(display("spec failed validation against schema: {}", messages.join(", ")))]
    SpecValidation { messages: Vec<String> },

    #[snafu(display("can't use plugin {name:?} due to invalid schema"))]
    InvalidPluginSchema {
        #[snafu(source(from(Error, Box::new)))]
        source: Box<Error>,
        name: String,
    },

    #[snafu(display("failed to instantiate plugin"))]
    InstantiatePlugin {
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

/// A compiled JSON schema for plugin specs.
pub struct SpecSchema {
    schema: JSONSchema,
}

impl SpecSchema {
    /// Compiles the JSON schema contained in `schema`.
    pub fn compile(schema: &[u8]) -> Result<Self> {
        let schema: Value = serde_json::from_slice(schema).context(ParseSchemaSnafu)?;
        Self::compile_value(&schema)
    }

    pub fn compile_value(schema: &Value) -> Result<Self> {
        let schema = JSONSchema::compile(schema).map_err(|error| Error::InvalidSchema {
            message: error.to_string(),
        })?;

        Ok(Self { schema })
    }

    /// Checks that `spec` conforms to the schema.
    ///
    /// All violations are collected, each prefixed with the JSON pointer of
    /// the offending value.
    pub fn validate(&self, spec: &Map<String, Value>) -> Result<()> {
        let spec = Value::Object(spec.clone());

        if let Err(errors) = self.schema.validate(&spec) {
            let messages = errors
                .map(|error| {
                    let path = error.instance_path.to_string();
                    match path.as_str() {
                        "" => format!("(root): {error}"),
                        path => format!("{path}: {error}"),
                    }
                })
                .collect::<Vec<_>>();

            return SpecValidationSnafu { messages }.fail();
        }

        Ok(())
    }
}

impl fmt::Debug for SpecSchema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SpecSchema").finish_non_exhaustive()
    }
}

/// Validates `spec` against `schema`, accepting everything if there is no schema.
pub fn validate_spec(schema: Option<&SpecSchema>, spec: &Map<String, Value>) -> Result<()> {
    match schema {
        Some(schema) => schema.validate(spec),
        None => Ok(()),
    }
}

/// What a plugin declares about itself when it is registered.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PluginDescription {
    pub name: String,

    /// A JSON schema all specs for this plugin must conform to.
    pub spec_schema: Option<Vec<u8>>,
}

/// A resource handler provided by a third party.
pub trait Plugin {
    fn describe(&self) -> PluginDescription;
}

/// A plugin together with its compiled spec schema.
#[derive(Debug)]
pub struct PluginContainer<P> {
    plugin: P,
    schema: Option<SpecSchema>,
}

impl<P: Plugin> PluginContainer<P> {
    /// Compiles the spec schema declared by `plugin`, if any.
    pub fn new(plugin: P) -> Result<Self> {
        let description = plugin.describe();
        let schema = description
            .spec_schema
            .as_deref()
            .map(SpecSchema::compile)
            .transpose()
            .context(InvalidPluginSchemaSnafu {
                name: &description.name,
            })?;

        tracing::debug!(
            plugin.name = %description.name,
            has_schema = schema.is_some(),
            "registered plugin"
        );

        Ok(Self { plugin, schema })
    }

    /// Like [`PluginContainer::new`], but constructs the plugin first.
    pub fn try_new<F, E>(new_plugin: F) -> Result<Self>
    where
        F: FnOnce() -> std::result::Result<P, E>,
        E: std::error::Error + Send + Sync + 'static,
    {
        let plugin = new_plugin().boxed().context(InstantiatePluginSnafu)?;

        Self::new(plugin)
    }

    pub fn plugin(&self) -> &P {
        &self.plugin
    }

    pub fn schema(&self) -> Option<&SpecSchema> {
        self.schema.as_ref()
    }

    pub fn validate_spec(&self, spec: &Map<String, Value>) -> Result<()> {
        validate_spec(self.schema.as_ref(), spec)
    }
}
