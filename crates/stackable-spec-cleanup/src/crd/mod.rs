//! Resource types which are not part of [`k8s_openapi`], but which have merge
//! strategies in this crate.

pub mod service_catalog;
