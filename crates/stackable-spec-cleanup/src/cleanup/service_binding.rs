use kube::core::DynamicObject;
use snafu::ResultExt;

use super::{ConvertSnafu, Error, ObjectRole};
use crate::{crd::service_catalog::ServiceBinding, scheme::Scheme};

/// Keeps the external ID, the user attribution and the status assigned by the
/// Service Catalog.
pub(super) fn cleanup(
    scheme: &Scheme,
    desired: &DynamicObject,
    actual: &DynamicObject,
) -> Result<DynamicObject, Error> {
    let mut binding: ServiceBinding = scheme.convert(desired).context(ConvertSnafu {
        role: ObjectRole::Desired,
    })?;
    let actual: ServiceBinding = scheme.convert(actual).context(ConvertSnafu {
        role: ObjectRole::Actual,
    })?;

    binding.spec.external_id = actual.spec.external_id;
    if actual.spec.user_info.is_some() {
        binding.spec.user_info = actual.spec.user_info;
    }
    binding.status = actual.status;

    scheme.to_dynamic(&binding).context(ConvertSnafu {
        role: ObjectRole::Merged,
    })
}

#[cfg(test)]
mod tests {
    use indoc::indoc;

    use super::*;
    use crate::{
        cleanup::object_from_yaml,
        crd::service_catalog::{API_VERSION, UserInfo},
    };

    fn scheme() -> Scheme {
        let mut scheme = Scheme::new(API_VERSION);
        scheme
            .register::<ServiceBinding>()
            .expect("ServiceBinding is a servicecatalog.k8s.io/v1beta1 kind");
        scheme
    }

    fn merge(desired: &DynamicObject, actual: &DynamicObject) -> ServiceBinding {
        cleanup(&scheme(), desired, actual)
            .expect("merge succeeds")
            .try_parse()
            .expect("merged object is a ServiceBinding")
    }

    fn desired() -> DynamicObject {
        object_from_yaml(indoc! {"
            apiVersion: servicecatalog.k8s.io/v1beta1
            kind: ServiceBinding
            metadata:
              name: credentials
              namespace: default
            spec:
              instanceRef:
                name: database
              secretName: database-credentials
              externalID: chosen-by-the-caller
              userInfo:
                username: mallory
        "})
    }

    #[test]
    fn keeps_cluster_assigned_fields() {
        let actual = object_from_yaml(indoc! {"
            apiVersion: servicecatalog.k8s.io/v1beta1
            kind: ServiceBinding
            metadata:
              name: credentials
              namespace: default
            spec:
              instanceRef:
                name: database
              externalID: 8e3c2a4e-5d3b-4b0e-9f55-9f0d0f3b6c21
              userInfo:
                username: alice
                uid: 1c9e1d38
                groups:
                - system:authenticated
            status:
              asyncOpInProgress: true
              reconciledGeneration: 3
              conditions:
              - type: Ready
                status: 'False'
                reason: InjectingCredentials
                message: Injecting credentials
        "});

        let binding = merge(&desired(), &actual);

        assert_eq!(binding.spec.external_id, "8e3c2a4e-5d3b-4b0e-9f55-9f0d0f3b6c21");
        assert_eq!(
            binding.spec.user_info,
            Some(UserInfo {
                username: "alice".to_owned(),
                uid: "1c9e1d38".to_owned(),
                groups: vec!["system:authenticated".to_owned()],
                ..Default::default()
            })
        );
        assert_eq!(binding.spec.secret_name.as_deref(), Some("database-credentials"));

        let status = binding.status.expect("status is taken from the actual object");
        assert!(status.async_op_in_progress);
        assert_eq!(status.reconciled_generation, 3);
        assert_eq!(status.conditions.len(), 1);
    }

    #[test]
    fn keeps_desired_user_info_without_actual_one() {
        let actual = object_from_yaml(indoc! {"
            apiVersion: servicecatalog.k8s.io/v1beta1
            kind: ServiceBinding
            metadata:
              name: credentials
              namespace: default
            spec:
              instanceRef:
                name: database
              externalID: 8e3c2a4e-5d3b-4b0e-9f55-9f0d0f3b6c21
        "});

        let binding = merge(&desired(), &actual);

        assert_eq!(
            binding.spec.user_info.map(|user_info| user_info.username),
            Some("mallory".to_owned())
        );
        assert_eq!(binding.status, None);
    }

    #[test]
    fn keeps_secret_transforms_and_unknown_fields() {
        let desired = object_from_yaml(indoc! {"
            apiVersion: servicecatalog.k8s.io/v1beta1
            kind: ServiceBinding
            metadata:
              name: credentials
              namespace: default
            spec:
              instanceRef:
                name: database
              secretTransforms:
              - renameKey:
                  from: a
                  to: b
              - removeKey:
                  key: c
              fancyNewField: enabled
        "});
        let actual = object_from_yaml(indoc! {"
            apiVersion: servicecatalog.k8s.io/v1beta1
            kind: ServiceBinding
            metadata:
              name: credentials
              namespace: default
            spec:
              instanceRef:
                name: database
              externalID: 8e3c2a4e-5d3b-4b0e-9f55-9f0d0f3b6c21
            status:
              lastConditionState: Ready
              brandNewCounter: 7
        "});

        let merged = cleanup(&scheme(), &desired, &actual).expect("merge succeeds");

        let spec = &merged.data["spec"];
        assert_eq!(spec["secretTransforms"][0]["renameKey"]["from"], "a");
        assert_eq!(spec["secretTransforms"][0]["renameKey"]["to"], "b");
        assert_eq!(spec["secretTransforms"][1]["removeKey"]["key"], "c");
        assert_eq!(spec["fancyNewField"], "enabled");

        let status = &merged.data["status"];
        assert_eq!(status["lastConditionState"], "Ready");
        assert_eq!(status["brandNewCounter"], 7);
    }

    #[test]
    fn malformed_actual_object_is_reported() {
        let actual = object_from_yaml(indoc! {"
            apiVersion: servicecatalog.k8s.io/v1beta1
            kind: ServiceBinding
            metadata:
              name: credentials
              namespace: default
            spec:
              instanceRef: database
        "});

        let error = cleanup(&scheme(), &desired(), &actual)
            .expect_err("instanceRef must be an object");

        assert!(
            matches!(error, Error::Convert {
                role: ObjectRole::Actual,
                ..
            }),
            "{error}"
        );
    }
}
