//! Per-kind merge strategies.
//!
//! A merge strategy combines the *desired* object (as rendered from a bundle
//! or template) with the *actual* object currently stored in the cluster and
//! produces the object which should be submitted to the Kubernetes API.
//! Each strategy decides which fields are owned by the desired state, which
//! fields are assigned by the cluster and have to be carried over from the
//! actual object, and which fields must never change once set.
//!
//! Strategies never mutate their inputs and either return a complete object
//! or an error.

use std::sync::Arc;

use kube::core::DynamicObject;
use snafu::Snafu;
use tracing::instrument;

use crate::{
    kind::GroupKind,
    scheme::{ConvertError, Scheme},
};

mod deployment;
pub mod known_types;
mod secret;
mod service;
mod service_binding;
mod service_instance;

/// Which of the objects passing through a merge strategy failed to convert.
#[derive(Clone, Copy, Debug, PartialEq, Eq, strum::Display)]
#[strum(serialize_all = "lowercase")]
pub enum ObjectRole {
    Desired,
    Actual,
    Merged,
}

#[derive(Debug, Snafu)]
pub enum Error {
    #[snafu(display("failed to convert the {role} object"))]
    Convert {
        source: ConvertError,
        role: ObjectRole,
    },

    #[snafu(display("{field} has changed when it should be immutable"))]
    ImmutableFieldChanged { field: String },
}

/// The signature shared by all merge strategies.
///
/// Arguments are the scheme of the kind, the desired object and the actual
/// object.
pub type CleanupFn = fn(&Scheme, &DynamicObject, &DynamicObject) -> Result<DynamicObject, Error>;

/// A merge strategy bound to the resource kind and scheme it operates on.
#[derive(Clone, Debug)]
pub struct MergeStrategy {
    kind: GroupKind,
    scheme: Arc<Scheme>,
    cleanup: CleanupFn,
}

impl MergeStrategy {
    /// Creates a strategy for the resource `K`, converting through `scheme`.
    pub fn new<K>(scheme: Arc<Scheme>, cleanup: CleanupFn) -> Self
    where
        K: kube::Resource<DynamicType = ()>,
    {
        Self {
            kind: GroupKind::of::<K>(),
            scheme,
            cleanup,
        }
    }

    pub fn kind(&self) -> &GroupKind {
        &self.kind
    }

    /// Computes the object to submit from the `desired` and `actual` objects.
    #[instrument(
        name = "merge_object",
        skip_all,
        fields(kind = %self.kind, name = desired.metadata.name.as_deref())
    )]
    pub fn merge(
        &self,
        desired: &DynamicObject,
        actual: &DynamicObject,
    ) -> Result<DynamicObject, Error> {
        let merged = (self.cleanup)(&self.scheme, desired, actual)?;
        tracing::debug!("merged desired object with actual object");
        Ok(merged)
    }
}

#[cfg(test)]
pub(crate) fn object_from_yaml(yaml: &str) -> DynamicObject {
    serde_yaml::from_str(yaml).expect("test YAML is valid")
}
