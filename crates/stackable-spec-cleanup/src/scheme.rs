//! Type registration scopes and conversion between [`DynamicObject`]s and
//! strongly typed resources.
//!
//! A [`Scheme`] covers exactly one apiVersion (for example `apps/v1`). Only
//! resources registered in a scheme can be converted through it, which keeps
//! every API group isolated from all others: registering a resource of a
//! different apiVersion is rejected at startup instead of silently widening
//! the scope.

use std::collections::BTreeSet;

use kube::core::{DynamicObject, dynamic::ParseDynamicObjectError};
use serde::{Serialize, de::DeserializeOwned};
use snafu::{OptionExt, ResultExt, Snafu, ensure};

use crate::kind::GroupKind;

#[derive(Debug, Snafu)]
pub enum RegisterError {
    #[snafu(display(
        "cannot register {kind} (apiVersion {api_version:?}) in the scheme for {scheme_api_version:?}"
    ))]
    ForeignKind {
        kind: GroupKind,
        api_version: String,
        scheme_api_version: String,
    },

    #[snafu(display("{kind} is already registered in the scheme for {api_version:?}"))]
    AlreadyRegistered { kind: GroupKind, api_version: String },
}

#[derive(Debug, Snafu)]
pub enum ConvertError {
    #[snafu(display("{kind} is not registered in the scheme for {api_version:?}"))]
    UnregisteredKind { kind: GroupKind, api_version: String },

    #[snafu(display("object {name:?} does not specify an apiVersion and kind"))]
    MissingTypeMeta { name: Option<String> },

    #[snafu(display(
        "expected object of apiVersion {expected_api_version:?} and kind {expected_kind:?}, got apiVersion {api_version:?} and kind {kind:?}"
    ))]
    KindMismatch {
        api_version: String,
        kind: String,
        expected_api_version: String,
        expected_kind: String,
    },

    #[snafu(display(
        "failed to parse dynamic object as apiVersion {target_api_version:?} and kind {target_kind:?}"
    ))]
    Parse {
        source: ParseDynamicObjectError,
        target_api_version: String,
        target_kind: String,
    },

    #[snafu(display("failed to convert {kind} into a dynamic object"))]
    Serialize {
        source: serde_json::Error,
        kind: GroupKind,
    },
}

/// The set of resource kinds that can be converted for one apiVersion.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Scheme {
    api_version: String,
    kinds: BTreeSet<String>,
}

impl Scheme {
    pub fn new(api_version: impl Into<String>) -> Self {
        Self {
            api_version: api_version.into(),
            kinds: BTreeSet::new(),
        }
    }

    pub fn api_version(&self) -> &str {
        &self.api_version
    }

    /// Registers the resource `K`, which must share the apiVersion of this
    /// scheme.
    pub fn register<K>(&mut self) -> Result<(), RegisterError>
    where
        K: kube::Resource<DynamicType = ()>,
    {
        let api_version = K::api_version(&());
        ensure!(api_version == self.api_version, ForeignKindSnafu {
            kind: GroupKind::of::<K>(),
            api_version,
            scheme_api_version: &self.api_version,
        });

        let kind = K::kind(&()).into_owned();
        ensure!(!self.kinds.contains(&kind), AlreadyRegisteredSnafu {
            kind: GroupKind::of::<K>(),
            api_version: &self.api_version,
        });

        tracing::trace!(%kind, api_version = %self.api_version, "registered kind in scheme");
        self.kinds.insert(kind);
        Ok(())
    }

    pub fn is_registered<K>(&self) -> bool
    where
        K: kube::Resource<DynamicType = ()>,
    {
        K::api_version(&()) == self.api_version && self.kinds.contains(&*K::kind(&()))
    }

    /// Converts a [`DynamicObject`] into the typed resource `K`.
    ///
    /// The object has to declare the apiVersion and kind of `K`, and its
    /// content has to match the shape of `K`.
    pub fn convert<K>(&self, object: &DynamicObject) -> Result<K, ConvertError>
    where
        K: kube::Resource<DynamicType = ()> + DeserializeOwned,
    {
        self.ensure_registered::<K>()?;

        let types = object.types.as_ref().context(MissingTypeMetaSnafu {
            name: object.metadata.name.clone(),
        })?;
        let expected_api_version = K::api_version(&());
        let expected_kind = K::kind(&());
        ensure!(
            types.api_version == expected_api_version && types.kind == expected_kind,
            KindMismatchSnafu {
                api_version: &types.api_version,
                kind: &types.kind,
                expected_api_version: &*expected_api_version,
                expected_kind: &*expected_kind,
            }
        );

        object.to_owned().try_parse().with_context(|_| ParseSnafu {
            target_api_version: &*expected_api_version,
            target_kind: &*expected_kind,
        })
    }

    /// Converts the typed resource `K` back into a [`DynamicObject`].
    pub fn to_dynamic<K>(&self, object: &K) -> Result<DynamicObject, ConvertError>
    where
        K: kube::Resource<DynamicType = ()> + Serialize,
    {
        self.ensure_registered::<K>()?;

        serde_json::to_value(object)
            .and_then(serde_json::from_value::<DynamicObject>)
            .context(SerializeSnafu {
                kind: GroupKind::of::<K>(),
            })
    }

    fn ensure_registered<K>(&self) -> Result<(), ConvertError>
    where
        K: kube::Resource<DynamicType = ()>,
    {
        ensure!(self.is_registered::<K>(), UnregisteredKindSnafu {
            kind: GroupKind::of::<K>(),
            api_version: &self.api_version,
        });
        Ok(())
    }
}
