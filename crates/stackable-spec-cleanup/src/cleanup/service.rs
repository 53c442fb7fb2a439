use k8s_openapi::api::core::v1::{Service, ServicePort, ServiceSpec};
use kube::core::DynamicObject;
use snafu::ResultExt;

use super::{ConvertSnafu, Error, ObjectRole};
use crate::scheme::Scheme;

/// Services take the desired spec, but keep everything the cluster assigned.
///
/// The cluster IP(s) and the whole status are always taken from the actual
/// object. Node ports are carried over positionally, see [`merge_node_ports`].
pub(super) fn cleanup(
    scheme: &Scheme,
    desired: &DynamicObject,
    actual: &DynamicObject,
) -> Result<DynamicObject, Error> {
    let mut service: Service = scheme.convert(desired).context(ConvertSnafu {
        role: ObjectRole::Desired,
    })?;
    let actual: Service = scheme.convert(actual).context(ConvertSnafu {
        role: ObjectRole::Actual,
    })?;

    service.status = actual.status;

    let actual_spec = actual.spec.unwrap_or_default();
    let spec = service.spec.get_or_insert_with(ServiceSpec::default);
    spec.cluster_ip = actual_spec.cluster_ip;
    spec.cluster_ips = actual_spec.cluster_ips;

    merge_node_ports(
        spec.ports.as_deref_mut().unwrap_or_default(),
        actual_spec.ports.as_deref().unwrap_or_default(),
    );

    scheme.to_dynamic(&service).context(ConvertSnafu {
        role: ObjectRole::Merged,
    })
}

/// Keeps the node ports allocated by the cluster.
///
/// Ports are paired by position, and only if both sides have the same number
/// of ports. A desired port without a node port receives the allocated one if
/// it is otherwise identical to the actual port. Ports that differ in any other
/// way keep an empty node port, so that the cluster allocates a new one.
fn merge_node_ports(ports: &mut [ServicePort], actual_ports: &[ServicePort]) {
    if ports.len() != actual_ports.len() {
        return;
    }

    for (port, actual_port) in ports.iter_mut().zip(actual_ports) {
        if port.node_port.unwrap_or_default() != 0 {
            continue;
        }

        let candidate = ServicePort {
            node_port: actual_port.node_port,
            ..port.clone()
        };
        if &candidate == actual_port {
            port.node_port = actual_port.node_port;
        }
    }
}
