//! Reconciliation-time merging of desired and actual Kubernetes objects.
//!
//! Given the *desired* object (as rendered from a bundle or template) and the
//! *actual* object currently observed in the cluster, this crate computes the
//! object which should be submitted to the Kubernetes API, or rejects the
//! update. Simply submitting the desired object would erase fields assigned by
//! the cluster (cluster IPs, node ports, status, finalizers, external IDs) and
//! would silently allow changing fields which are immutable once set.
//!
//! - [`registry::Registry`] maps resource kinds to their
//!   [`cleanup::MergeStrategy`]. It is built once at startup, see
//!   [`config::RegistryOptions`].
//! - [`scheme::Scheme`] converts between [`kube::core::DynamicObject`]s and
//!   typed resources.
//! - [`plugin`] validates plugin specs against the JSON schema a plugin
//!   declares, before they are turned into desired objects.
//!
//! Nothing in this crate performs I/O, and everything except building a
//! [`registry::Registry`] is safe to call concurrently.

pub mod cleanup;
pub mod config;
pub mod crd;
pub mod kind;
pub mod logging;
pub mod plugin;
pub mod registry;
pub mod scheme;

// External re-exports
pub use k8s_openapi;
pub use kube;
