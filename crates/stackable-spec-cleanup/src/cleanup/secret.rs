use std::collections::BTreeMap;

use k8s_openapi::{ByteString, api::core::v1::Secret};
use kube::core::DynamicObject;
use snafu::ResultExt;

use super::{ConvertSnafu, Error, ObjectRole};
use crate::scheme::Scheme;

/// Folds `stringData` into `data`, so that `data` is the only representation
/// of the secret content that gets submitted.
///
/// Entries from `stringData` override entries with the same key in `data`.
pub(super) fn cleanup(
    scheme: &Scheme,
    desired: &DynamicObject,
    _actual: &DynamicObject,
) -> Result<DynamicObject, Error> {
    let mut secret: Secret = scheme.convert(desired).context(ConvertSnafu {
        role: ObjectRole::Desired,
    })?;

    if let Some(string_data) = secret
        .string_data
        .take_if(|string_data| !string_data.is_empty())
    {
        secret
            .data
            .get_or_insert_with(BTreeMap::new)
            .extend(
                string_data
                    .into_iter()
                    .map(|(key, value)| (key, ByteString(value.into_bytes()))),
            );
    }

    scheme.to_dynamic(&secret).context(ConvertSnafu {
        role: ObjectRole::Merged,
    })
}
