// src/pki/mod.rs
mod ca;
mod operations;
mod types;
pub mod verification;

pub use ca::{assemble_chain, generate_intermediate_ca, generate_root_ca};
pub use operations::{EndpointReconciler, EndpointReport, MountState};
pub use types::{
    GenerateOptions, IntermediateOptions, MountConfig, MountOptions, PkiConfig, RootOptions, Ttl,
    UrlConfig, VaultEndpointSpec,
};
pub(crate) use types::body;
