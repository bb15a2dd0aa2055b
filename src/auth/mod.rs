//! Identity layer: the provider seam the guard checks against, the cloud
//! auth backend client, and the in-memory session store.

pub mod cloud;
pub mod provider;
pub mod session;
