//! The fixed sets of resource kinds this crate knows how to merge.
//!
//! Every set registers its kinds in dedicated [`Scheme`]s, one per apiVersion.
//! A registration failure means the set can not be used at all and is
//! reported as an [`Error`] to the caller building the
//! [`Registry`](crate::registry::Registry).

use std::sync::Arc;

use k8s_openapi::api::{
    apps::v1::Deployment,
    core::v1::{Secret, Service},
};
use snafu::{ResultExt, Snafu};

use super::{MergeStrategy, deployment, secret, service, service_binding, service_instance};
use crate::{
    crd::service_catalog::{self, ServiceBinding, ServiceInstance},
    kind::GroupKind,
    scheme::{RegisterError, Scheme},
};

#[derive(Debug, Snafu)]
pub enum Error {
    #[snafu(display("failed to register the {set:?} known types"))]
    Register {
        source: RegisterError,
        set: &'static str,
    },
}

/// A named set of merge strategies.
#[derive(Clone, Debug)]
pub struct KnownTypes {
    name: &'static str,
    strategies: Vec<MergeStrategy>,
}

impl KnownTypes {
    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn kinds(&self) -> impl Iterator<Item = &GroupKind> {
        self.strategies.iter().map(MergeStrategy::kind)
    }

    pub fn strategies(&self) -> &[MergeStrategy] {
        &self.strategies
    }
}

impl IntoIterator for KnownTypes {
    type IntoIter = std::vec::IntoIter<MergeStrategy>;
    type Item = MergeStrategy;

    fn into_iter(self) -> Self::IntoIter {
        self.strategies.into_iter()
    }
}

/// Kubernetes built-in resources: Deployments, Services and Secrets.
pub fn main() -> Result<KnownTypes, Error> {
    const SET: &str = "main";

    let mut apps_v1 = Scheme::new("apps/v1");
    apps_v1
        .register::<Deployment>()
        .context(RegisterSnafu { set: SET })?;

    let mut core_v1 = Scheme::new("v1");
    core_v1
        .register::<Service>()
        .context(RegisterSnafu { set: SET })?;
    core_v1
        .register::<Secret>()
        .context(RegisterSnafu { set: SET })?;

    let apps_v1 = Arc::new(apps_v1);
    let core_v1 = Arc::new(core_v1);

    Ok(KnownTypes {
        name: SET,
        strategies: vec![
            MergeStrategy::new::<Deployment>(apps_v1, deployment::cleanup),
            MergeStrategy::new::<Service>(core_v1.clone(), service::cleanup),
            MergeStrategy::new::<Secret>(core_v1, secret::cleanup),
        ],
    })
}

/// Service Catalog resources: ServiceBindings and ServiceInstances.
pub fn service_catalog() -> Result<KnownTypes, Error> {
    const SET: &str = "service catalog";

    let mut scheme = Scheme::new(service_catalog::API_VERSION);
    scheme
        .register::<ServiceBinding>()
        .context(RegisterSnafu { set: SET })?;
    scheme
        .register::<ServiceInstance>()
        .context(RegisterSnafu { set: SET })?;

    let scheme = Arc::new(scheme);

    Ok(KnownTypes {
        name: SET,
        strategies: vec![
            MergeStrategy::new::<ServiceBinding>(scheme.clone(), service_binding::cleanup),
            MergeStrategy::new::<ServiceInstance>(scheme, service_instance::cleanup),
        ],
    })
}
