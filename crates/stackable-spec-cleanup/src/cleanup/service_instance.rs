use kube::core::DynamicObject;
use snafu::{ResultExt, ensure};

use super::{ConvertSnafu, Error, ImmutableFieldChangedSnafu, ObjectRole};
use crate::{crd::service_catalog::ServiceInstance, scheme::Scheme};

/// Rejects changes of the class and plan, and keeps everything the Service
/// Catalog resolved or assigned.
///
/// Class and plan references are carried over as long as the external names
/// they were resolved from did not change. Finalizers, the external ID and the
/// user attribution are always taken from the actual object. The update
/// request counter is only taken over if the desired object does not bump it.
pub(super) fn cleanup(
    scheme: &Scheme,
    desired: &DynamicObject,
    actual: &DynamicObject,
) -> Result<DynamicObject, Error> {
    let mut instance: ServiceInstance = scheme.convert(desired).context(ConvertSnafu {
        role: ObjectRole::Desired,
    })?;
    let actual: ServiceInstance = scheme.convert(actual).context(ConvertSnafu {
        role: ObjectRole::Actual,
    })?;

    ensure_unchanged(
        "clusterServiceClassName",
        instance.spec.cluster_service_class_name.as_deref(),
        actual.spec.cluster_service_class_name.as_deref(),
    )?;
    ensure_unchanged(
        "clusterServicePlanName",
        instance.spec.cluster_service_plan_name.as_deref(),
        actual.spec.cluster_service_plan_name.as_deref(),
    )?;

    if same_name(
        instance.spec.cluster_service_class_external_name.as_deref(),
        actual.spec.cluster_service_class_external_name.as_deref(),
    ) {
        instance.spec.cluster_service_class_ref = actual.spec.cluster_service_class_ref;
        instance.spec.cluster_service_class_name = actual.spec.cluster_service_class_name;
    }

    if same_name(
        instance.spec.cluster_service_plan_external_name.as_deref(),
        actual.spec.cluster_service_plan_external_name.as_deref(),
    ) {
        instance.spec.cluster_service_plan_ref = actual.spec.cluster_service_plan_ref;
        instance.spec.cluster_service_plan_name = actual.spec.cluster_service_plan_name;
    }

    instance.metadata.finalizers = actual.metadata.finalizers;
    instance.spec.external_id = actual.spec.external_id;
    if actual.spec.user_info.is_some() {
        instance.spec.user_info = actual.spec.user_info;
    }

    if instance.spec.update_requests == 0 {
        instance.spec.update_requests = actual.spec.update_requests;
    }

    scheme.to_dynamic(&instance).context(ConvertSnafu {
        role: ObjectRole::Merged,
    })
}

/// An unset desired value never counts as a change.
fn ensure_unchanged(field: &str, desired: Option<&str>, actual: Option<&str>) -> Result<(), Error> {
    let desired = desired.unwrap_or_default();
    let changed = !desired.is_empty() && desired != actual.unwrap_or_default();
    if changed {
        tracing::warn!(
            field,
            desired,
            actual,
            "rejecting change of immutable field"
        );
    }

    ensure!(!changed, ImmutableFieldChangedSnafu { field });
    Ok(())
}

/// Compares external names, treating an unset name like an empty one.
fn same_name(desired: Option<&str>, actual: Option<&str>) -> bool {
    desired.unwrap_or_default() == actual.unwrap_or_default()
}
