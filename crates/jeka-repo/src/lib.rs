//! Repository collaborators: where module versions, descriptors and artifact
//! files come from.
//!
//! The resolver only talks to the [`RepositoryClient`] trait. This crate
//! provides an in-memory implementation, a Maven-layout directory on disk,
//! a remote HTTP Maven repository backed by a download cache, and a chain
//! querying several of them in order.

pub mod auth;
pub mod cache;
pub mod checksum;
pub mod client;
pub mod descriptor;
pub mod download;
pub mod file;
pub mod layout;
pub mod memory;
pub mod metadata;
pub mod pom;
pub mod remote;

pub use client::{RepositoryChain, RepositoryClient};
pub use descriptor::{DescriptorDependency, ModuleDescriptor};
pub use file::FileRepository;
pub use layout::RepositorySpec;
pub use memory::MemoryRepository;
pub use remote::RemoteRepository;
