//! Response bodies of both hosts, shared by the integration tests.

pub mod bitbucket;
pub mod gitlab;
