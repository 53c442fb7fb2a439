use std::fmt;

use kube::core::TypeMeta;

/// Identifies a kind of Kubernetes object independent of its API version.
///
/// The core API group is represented by an empty `group`, e.g. `Service` is
/// `GroupKind { group: "", kind: "Service" }`.
#[derive(Clone, Debug, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub struct GroupKind {
    pub group: String,
    pub kind: String,
}

impl GroupKind {
    pub fn new(group: impl Into<String>, kind: impl Into<String>) -> Self {
        Self {
            group: group.into(),
            kind: kind.into(),
        }
    }

    /// Returns the [`GroupKind`] of the statically typed resource `K`.
    pub fn of<K>() -> Self
    where
        K: kube::Resource<DynamicType = ()>,
    {
        Self::new(K::group(&()), K::kind(&()))
    }

    /// Extracts the [`GroupKind`] from the `apiVersion` and `kind` of an object.
    ///
    /// `apiVersion` is either `<group>/<version>` or just `<version>` for the
    /// core group.
    pub fn from_type_meta(types: &TypeMeta) -> Self {
        let group = types
            .api_version
            .split_once('/')
            .map_or("", |(group, _version)| group);

        Self::new(group, types.kind.as_str())
    }
}

impl fmt::Display for GroupKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.group.as_str() {
            "" => f.write_str(&self.kind),
            group => write!(f, "{kind}.{group}", kind = self.kind),
        }
    }
}
