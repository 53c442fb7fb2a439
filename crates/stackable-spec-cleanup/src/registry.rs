//! The mapping from resource kinds to their [`MergeStrategy`].
//!
//! A [`Registry`] is built once by the process entry point and handed to the
//! reconciler. It is never modified afterwards, so it can be shared freely
//! between reconciliation workers (for example behind an [`Arc`](std::sync::Arc)).
//!
//! Kinds without a merge strategy are not an error: [`Registry::lookup`] and
//! [`Registry::merge`] return [`None`] for them, and the caller decides on a
//! fallback.

use std::collections::HashMap;

use kube::core::DynamicObject;
use snafu::{OptionExt, ResultExt, Snafu};
use tracing::instrument;

use crate::{
    cleanup::{
        self, MergeStrategy,
        known_types::{self, KnownTypes},
    },
    config::RegistryOptions,
    kind::GroupKind,
};

#[derive(Debug, Snafu)]
pub enum Error {
    #[snafu(display("failed to construct known types"))]
    KnownTypes { source: known_types::Error },

    #[snafu(display(
        "{kind} is bound by both the {existing:?} and the {duplicate:?} known types"
    ))]
    DuplicateKind {
        kind: GroupKind,
        existing: &'static str,
        duplicate: &'static str,
    },

    #[snafu(display("object {name:?} does not specify an apiVersion and kind"))]
    MissingTypeMeta { name: Option<String> },

    #[snafu(display("failed to merge {kind} {name:?}"))]
    Merge {
        source: cleanup::Error,
        kind: GroupKind,
        name: Option<String>,
    },
}

/// Immutable lookup table from [`GroupKind`] to [`MergeStrategy`].
#[derive(Clone, Debug)]
pub struct Registry {
    strategies: HashMap<GroupKind, MergeStrategy>,
}

impl Registry {
    pub fn builder() -> RegistryBuilder {
        RegistryBuilder::default()
    }

    /// Builds the registry with all known types enabled in `options`.
    pub fn new(options: &RegistryOptions) -> Result<Self, Error> {
        let mut builder =
            Self::builder().with_known_types(known_types::main().context(KnownTypesSnafu)?);

        if options.disable_service_catalog {
            tracing::info!("service catalog merge strategies are disabled");
        } else {
            builder = builder
                .with_known_types(known_types::service_catalog().context(KnownTypesSnafu)?);
        }

        builder.build()
    }

    pub fn lookup(&self, kind: &GroupKind) -> Option<&MergeStrategy> {
        self.strategies.get(kind)
    }

    /// Merges `desired` with `actual` using the strategy for the kind of
    /// `desired`.
    ///
    /// Returns `Ok(None)` if no strategy is registered for that kind.
    #[instrument(skip_all, fields(name = desired.metadata.name.as_deref()))]
    pub fn merge(
        &self,
        desired: &DynamicObject,
        actual: &DynamicObject,
    ) -> Result<Option<DynamicObject>, Error> {
        let types = desired.types.as_ref().context(MissingTypeMetaSnafu {
            name: desired.metadata.name.clone(),
        })?;
        let kind = GroupKind::from_type_meta(types);

        let Some(strategy) = self.lookup(&kind) else {
            tracing::debug!(%kind, "no merge strategy registered for kind");
            return Ok(None);
        };

        strategy
            .merge(desired, actual)
            .map(Some)
            .with_context(|_| MergeSnafu {
                kind,
                name: desired.metadata.name.clone(),
            })
    }

    /// Iterates over all kinds that have a merge strategy, in no particular
    /// order.
    pub fn kinds(&self) -> impl Iterator<Item = &GroupKind> {
        self.strategies.keys()
    }

    pub fn len(&self) -> usize {
        self.strategies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.strategies.is_empty()
    }
}

/// Collects [`KnownTypes`] into a [`Registry`].
#[derive(Debug, Default)]
pub struct RegistryBuilder {
    known_types: Vec<KnownTypes>,
}

impl RegistryBuilder {
    pub fn with_known_types(mut self, known_types: KnownTypes) -> Self {
        self.known_types.push(known_types);
        self
    }

    /// Fails if two sets of known types bind the same kind.
    pub fn build(self) -> Result<Registry, Error> {
        let mut strategies = HashMap::new();
        let mut owners = HashMap::new();

        for known_types in self.known_types {
            let set = known_types.name();
            for strategy in known_types {
                let kind = strategy.kind().clone();
                if let Some(existing) = owners.insert(kind.clone(), set) {
                    return DuplicateKindSnafu {
                        kind,
                        existing,
                        duplicate: set,
                    }
                    .fail();
                }
                strategies.insert(kind, strategy);
            }
        }

        let registry = Registry { strategies };
        let mut kinds = registry.kinds().map(ToString::to_string).collect::<Vec<_>>();
        kinds.sort();
        tracing::info!(?kinds, "built merge strategy registry");

        Ok(registry)
    }
}
