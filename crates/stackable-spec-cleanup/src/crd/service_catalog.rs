//! Typed `servicecatalog.k8s.io/v1beta1` resources.
//!
//! The spec and status of [`ServiceInstance`]s and [`ServiceBinding`]s keep
//! fields they do not model in an `extra` map, so that objects round-trip
//! through a merge without losing anything the API server knows about. The
//! Service Catalog API server owns the authoritative schema, so no CRD is ever
//! generated from these types.

use std::collections::BTreeMap;

use k8s_openapi::{ByteString, apimachinery::pkg::apis::meta::v1::Time};
use kube::CustomResource;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

pub const GROUP: &str = "servicecatalog.k8s.io";
pub const API_VERSION: &str = "servicecatalog.k8s.io/v1beta1";

/// A provisioned instance of a service class and plan offered by a broker.
#[derive(Clone, CustomResource, Debug, Default, Deserialize, JsonSchema, PartialEq, Serialize)]
#[kube(
    group = "servicecatalog.k8s.io",
    version = "v1beta1",
    kind = "ServiceInstance",
    namespaced,
    status = "ServiceInstanceStatus",
    derive = "PartialEq"
)]
#[serde(rename_all = "camelCase")]
pub struct ServiceInstanceSpec {
    /// The human-readable name of the ClusterServiceClass, as exposed by the broker.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cluster_service_class_external_name: Option<String>,

    /// The human-readable name of the ClusterServicePlan, as exposed by the broker.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cluster_service_plan_external_name: Option<String>,

    #[serde(
        default,
        rename = "clusterServiceClassExternalID",
        skip_serializing_if = "Option::is_none"
    )]
    pub cluster_service_class_external_id: Option<String>,

    #[serde(
        default,
        rename = "clusterServicePlanExternalID",
        skip_serializing_if = "Option::is_none"
    )]
    pub cluster_service_plan_external_id: Option<String>,

    /// The Kubernetes name of the ClusterServiceClass. Immutable once set.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cluster_service_class_name: Option<String>,

    /// The Kubernetes name of the ClusterServicePlan. Immutable once set.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cluster_service_plan_name: Option<String>,

    /// Resolved by the Service Catalog controller.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cluster_service_class_ref: Option<ClusterObjectReference>,

    /// Resolved by the Service Catalog controller.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cluster_service_plan_ref: Option<ClusterObjectReference>,

    /// The human-readable name of the namespaced ServiceClass.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service_class_external_name: Option<String>,

    /// The human-readable name of the namespaced ServicePlan.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service_plan_external_name: Option<String>,

    #[serde(
        default,
        rename = "serviceClassExternalID",
        skip_serializing_if = "Option::is_none"
    )]
    pub service_class_external_id: Option<String>,

    #[serde(
        default,
        rename = "servicePlanExternalID",
        skip_serializing_if = "Option::is_none"
    )]
    pub service_plan_external_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service_class_name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service_plan_name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service_class_ref: Option<LocalObjectReference>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service_plan_ref: Option<LocalObjectReference>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parameters: Option<serde_json::Value>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub parameters_from: Vec<ParametersFromSource>,

    /// The identity of the instance towards the broker, generated by the
    /// Service Catalog.
    #[serde(default, rename = "externalID")]
    pub external_id: String,

    /// The user that last changed the spec. Set by the Service Catalog API server.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_info: Option<UserInfo>,

    /// Bumping this forces the controller to send an update request to the
    /// broker.
    #[serde(default)]
    pub update_requests: i64,

    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

#[derive(Clone, Debug, Default, Deserialize, JsonSchema, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceInstanceStatus {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub conditions: Vec<ServiceCatalogCondition>,

    #[serde(default)]
    pub async_op_in_progress: bool,

    #[serde(default)]
    pub orphan_mitigation_in_progress: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_operation: Option<String>,

    #[serde(
        default,
        rename = "dashboardURL",
        skip_serializing_if = "Option::is_none"
    )]
    pub dashboard_url: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_operation: Option<String>,

    #[serde(default)]
    pub reconciled_generation: i64,

    #[serde(default)]
    pub observed_generation: i64,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub operation_start_time: Option<Time>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub in_progress_properties: Option<ServiceInstancePropertiesState>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub external_properties: Option<ServiceInstancePropertiesState>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provision_status: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deprovision_status: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_provision_parameters: Option<serde_json::Value>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_condition_state: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_specified_class_name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_specified_plan_name: Option<String>,

    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

#[derive(Clone, Debug, Default, Deserialize, JsonSchema, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceInstancePropertiesState {
    #[serde(default)]
    pub cluster_service_plan_external_name: String,

    #[serde(default, rename = "clusterServicePlanExternalID")]
    pub cluster_service_plan_external_id: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parameters: Option<serde_json::Value>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parameter_checksum: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_info: Option<UserInfo>,
}

/// A request to make the credentials of a [`ServiceInstance`] available in a
/// Secret.
#[derive(Clone, CustomResource, Debug, Default, Deserialize, JsonSchema, PartialEq, Serialize)]
#[kube(
    group = "servicecatalog.k8s.io",
    version = "v1beta1",
    kind = "ServiceBinding",
    namespaced,
    status = "ServiceBindingStatus",
    derive = "PartialEq"
)]
#[serde(rename_all = "camelCase")]
pub struct ServiceBindingSpec {
    /// The ServiceInstance (in the same namespace) to bind to.
    pub instance_ref: LocalObjectReference,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parameters: Option<serde_json::Value>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub parameters_from: Vec<ParametersFromSource>,

    /// Name of the Secret the credentials are written to. Defaults to the name
    /// of the binding.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secret_name: Option<String>,

    /// Applied in order to the credentials before they are written to the
    /// Secret.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub secret_transforms: Vec<SecretTransform>,

    /// The identity of the binding towards the broker, generated by the
    /// Service Catalog.
    #[serde(default, rename = "externalID")]
    pub external_id: String,

    /// The user that last changed the spec. Set by the Service Catalog API server.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_info: Option<UserInfo>,

    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

#[derive(Clone, Debug, Default, Deserialize, JsonSchema, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceBindingStatus {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub conditions: Vec<ServiceCatalogCondition>,

    #[serde(default)]
    pub async_op_in_progress: bool,

    #[serde(default)]
    pub orphan_mitigation_in_progress: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_operation: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_operation: Option<String>,

    #[serde(default)]
    pub reconciled_generation: i64,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub operation_start_time: Option<Time>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub in_progress_properties: Option<ServiceBindingPropertiesState>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub external_properties: Option<ServiceBindingPropertiesState>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unbind_status: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_condition_state: Option<String>,

    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

#[derive(Clone, Debug, Default, Deserialize, JsonSchema, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceBindingPropertiesState {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parameters: Option<serde_json::Value>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parameter_checksum: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_info: Option<UserInfo>,
}

/// The user that made a request, as seen by the Service Catalog API server.
#[derive(Clone, Debug, Default, Deserialize, JsonSchema, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserInfo {
    #[serde(default)]
    pub username: String,

    #[serde(default)]
    pub uid: String,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub groups: Vec<String>,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub extra: BTreeMap<String, Vec<String>>,
}

/// A reference to a cluster-scoped object.
#[derive(Clone, Debug, Default, Deserialize, JsonSchema, PartialEq, Eq, Serialize)]
pub struct ClusterObjectReference {
    pub name: String,
}

/// A reference to an object in the same namespace.
#[derive(Clone, Debug, Default, Deserialize, JsonSchema, PartialEq, Eq, Serialize)]
pub struct LocalObjectReference {
    pub name: String,
}

#[derive(Clone, Debug, Default, Deserialize, JsonSchema, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ParametersFromSource {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secret_key_ref: Option<SecretKeyReference>,
}

#[derive(Clone, Debug, Default, Deserialize, JsonSchema, PartialEq, Eq, Serialize)]
pub struct SecretKeyReference {
    pub name: String,
    pub key: String,
}

/// A single modification of the credentials of a [`ServiceBinding`]. Exactly
/// one of the fields is set.
#[derive(Clone, Debug, Default, Deserialize, JsonSchema, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SecretTransform {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rename_key: Option<RenameKeyTransform>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub add_key: Option<AddKeyTransform>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub add_keys_from: Option<AddKeysFromTransform>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remove_key: Option<RemoveKeyTransform>,
}

#[derive(Clone, Debug, Default, Deserialize, JsonSchema, PartialEq, Eq, Serialize)]
pub struct RenameKeyTransform {
    pub from: String,
    pub to: String,
}

#[derive(Clone, Debug, Default, Deserialize, JsonSchema, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AddKeyTransform {
    pub key: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<ByteString>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub string_value: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub json_path_expression: Option<String>,
}

#[derive(Clone, Debug, Default, Deserialize, JsonSchema, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AddKeysFromTransform {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secret_ref: Option<NamespacedObjectReference>,
}

#[derive(Clone, Debug, Default, Deserialize, JsonSchema, PartialEq, Eq, Serialize)]
pub struct RemoveKeyTransform {
    pub key: String,
}

/// A reference to an object in a possibly different namespace.
#[derive(Clone, Debug, Default, Deserialize, JsonSchema, PartialEq, Eq, Serialize)]
pub struct NamespacedObjectReference {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,

    pub name: String,
}

#[derive(Clone, Debug, Deserialize, JsonSchema, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceCatalogCondition {
    #[serde(rename = "type")]
    pub type_: String,

    /// One of `True`, `False` or `Unknown`.
    pub status: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_transition_time: Option<Time>,

    #[serde(default)]
    pub reason: String,

    #[serde(default)]
    pub message: String,
}

#[cfg(test)]
mod tests {
    use indoc::indoc;
    use kube::Resource;

    use super::*;

    #[test]
    fn api_version_and_group() {
        assert_eq!(ServiceInstance::api_version(&()), API_VERSION);
        assert_eq!(ServiceBinding::group(&()), GROUP);
    }

    #[test]
    fn deserialize_service_instance() {
        let instance: ServiceInstance = serde_yaml::from_str(indoc! {"
            apiVersion: servicecatalog.k8s.io/v1beta1
            kind: ServiceInstance
            metadata:
              name: database
              finalizers:
              - kubernetes-incubator/service-catalog
            spec:
              clusterServiceClassExternalName: postgres
              clusterServicePlanExternalName: small
              clusterServiceClassRef:
                name: 4f6e6cf6-ffdd-425f-a2c7-3c9258ad2468
              externalID: 6d3b4b5a-1c1e-4c6e-9a44-4f3c1e3b2a1d
              updateRequests: 2
              userInfo:
                username: alice
                groups:
                - system:authenticated
            status:
              asyncOpInProgress: false
              reconciledGeneration: 1
              dashboardURL: https://dashboard.example.com
        "})
        .expect("test YAML is valid");

        assert_eq!(
            instance.spec.cluster_service_class_ref,
            Some(ClusterObjectReference {
                name: "4f6e6cf6-ffdd-425f-a2c7-3c9258ad2468".to_owned()
            })
        );
        assert_eq!(instance.spec.external_id, "6d3b4b5a-1c1e-4c6e-9a44-4f3c1e3b2a1d");
        assert_eq!(instance.spec.update_requests, 2);
        assert_eq!(
            instance.spec.user_info.map(|user_info| user_info.username),
            Some("alice".to_owned())
        );
        assert_eq!(
            instance.status.and_then(|status| status.dashboard_url),
            Some("https://dashboard.example.com".to_owned())
        );
    }

    #[test]
    fn serialize_uses_broker_field_names() {
        let binding = ServiceBinding::new("credentials", ServiceBindingSpec {
            instance_ref: LocalObjectReference {
                name: "database".to_owned(),
            },
            external_id: "b1".to_owned(),
            ..Default::default()
        });

        let value = serde_json::to_value(&binding).expect("ServiceBinding must serialize");

        assert_eq!(value["apiVersion"], API_VERSION);
        assert_eq!(value["kind"], "ServiceBinding");
        assert_eq!(value["spec"]["externalID"], "b1");
        assert_eq!(value["spec"]["instanceRef"]["name"], "database");
    }

    #[test]
    fn unmodelled_fields_round_trip() {
        let binding: ServiceBinding = serde_yaml::from_str(indoc! {"
            apiVersion: servicecatalog.k8s.io/v1beta1
            kind: ServiceBinding
            metadata:
              name: credentials
            spec:
              instanceRef:
                name: database
              secretTransforms:
              - addKey:
                  key: port
                  stringValue: '5432'
              fancyNewField: [1, 2]
            status:
              lastConditionState: Ready
              brandNewCounter: 7
        "})
        .expect("test YAML is valid");

        assert_eq!(binding.spec.secret_transforms.len(), 1);
        assert_eq!(
            binding.spec.extra.get("fancyNewField"),
            Some(&serde_json::json!([1, 2]))
        );

        let value = serde_json::to_value(&binding).expect("ServiceBinding must serialize");
        assert_eq!(value["spec"]["secretTransforms"][0]["addKey"]["stringValue"], "5432");
        assert_eq!(value["spec"]["fancyNewField"], serde_json::json!([1, 2]));
        assert_eq!(value["status"]["lastConditionState"], "Ready");
        assert_eq!(value["status"]["brandNewCounter"], 7);
    }
}
