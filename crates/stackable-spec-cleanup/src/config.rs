use clap::Args;

/// Options controlling which merge strategies the
/// [`Registry`](crate::registry::Registry) is built with.
///
/// Meant to be flattened into the CLI of the operator embedding this crate.
#[derive(Clone, Debug, Default, PartialEq, Eq, Args)]
#[command(next_help_heading = "Spec Cleanup Options")]
pub struct RegistryOptions {
    /// Don't merge Service Catalog resources (ServiceInstances and ServiceBindings).
    ///
    /// Objects of these kinds are then treated like any other kind without a
    /// merge strategy. Useful for clusters which don't serve the
    /// servicecatalog.k8s.io API group.
    #[arg(long, env)]
    pub disable_service_catalog: bool,
}
