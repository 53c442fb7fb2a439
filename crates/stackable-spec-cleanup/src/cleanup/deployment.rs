use k8s_openapi::api::apps::v1::Deployment;
use kube::core::DynamicObject;
use snafu::ResultExt;

use super::{ConvertSnafu, Error, ObjectRole};
use crate::scheme::Scheme;

/// Deployments are owned entirely by the desired state.
///
/// The only adjustment mirrors `serviceAccountName` into the deprecated
/// `serviceAccount` field of the pod template, which older components still
/// read. The actual object is never looked at.
pub(super) fn cleanup(
    scheme: &Scheme,
    desired: &DynamicObject,
    _actual: &DynamicObject,
) -> Result<DynamicObject, Error> {
    let mut deployment: Deployment = scheme.convert(desired).context(ConvertSnafu {
        role: ObjectRole::Desired,
    })?;

    if let Some(pod_spec) = deployment
        .spec
        .as_mut()
        .and_then(|spec| spec.template.spec.as_mut())
    {
        pod_spec.service_account.clone_from(&pod_spec.service_account_name);
    }

    scheme.to_dynamic(&deployment).context(ConvertSnafu {
        role: ObjectRole::Merged,
    })
}

#[cfg(test)]
mod tests {
    use indoc::indoc;

    use super::*;
    use crate::cleanup::object_from_yaml;

    fn scheme() -> Scheme {
        let mut scheme = Scheme::new("apps/v1");
        scheme
            .register::<Deployment>()
            .expect("Deployment is an apps/v1 kind");
        scheme
    }

    fn desired() -> DynamicObject {
        object_from_yaml(indoc! {"
            apiVersion: apps/v1
            kind: Deployment
            metadata:
              name: web
              namespace: default
            spec:
              replicas: 2
              selector:
                matchLabels:
                  app: web
              template:
                metadata:
                  labels:
                    app: web
                spec:
                  serviceAccountName: web-sa
                  containers:
                  - name: web
                    image: nginx:1.27
        "})
    }

    fn service_account(object: DynamicObject) -> Option<String> {
        let deployment: Deployment = object.try_parse().expect("merged object is a Deployment");
        deployment
            .spec
            .and_then(|spec| spec.template.spec)
            .and_then(|pod_spec| pod_spec.service_account)
    }

    #[test]
    fn copies_service_account_name_to_deprecated_field() {
        let merged = cleanup(&scheme(), &desired(), &desired()).expect("merge succeeds");

        assert_eq!(service_account(merged), Some("web-sa".to_owned()));
    }

    #[test]
    fn result_does_not_depend_on_actual() {
        let scheme = scheme();
        let actual = object_from_yaml(indoc! {"
            apiVersion: apps/v1
            kind: Deployment
            metadata:
              name: web
              namespace: default
              uid: 0b1d7e6c-6c39-4f0b-a4b4-3c0ad6d1fa0e
              resourceVersion: '4711'
            spec:
              replicas: 7
              selector:
                matchLabels:
                  app: web
              template:
                spec:
                  serviceAccountName: other-sa
                  containers:
                  - name: web
                    image: nginx:1.25
            status:
              replicas: 7
        "});

        let with_actual = cleanup(&scheme, &desired(), &actual).expect("merge succeeds");
        let with_itself = cleanup(&scheme, &desired(), &desired()).expect("merge succeeds");

        assert_eq!(
            serde_json::to_value(with_actual).expect("merged object must serialize"),
            serde_json::to_value(with_itself).expect("merged object must serialize")
        );
    }

    #[test]
    fn actual_is_not_converted() {
        // A malformed actual object must not matter, as it is never read.
        let actual = object_from_yaml(indoc! {"
            apiVersion: apps/v1
            kind: Deployment
            metadata:
              name: web
            spec:
              replicas: many
        "});

        cleanup(&scheme(), &desired(), &actual).expect("merge succeeds");
    }

    #[test]
    fn deployment_without_template_spec() {
        let desired = object_from_yaml(indoc! {"
            apiVersion: apps/v1
            kind: Deployment
            metadata:
              name: web
        "});

        let merged = cleanup(&scheme(), &desired, &desired).expect("merge succeeds");

        assert_eq!(service_account(merged), None);
    }
}
