pub mod bitbucket_provider;
pub mod cli;
pub mod coordinator;
pub mod deprecator;
pub mod error;
pub mod fixtures;
pub mod gitlab_provider;
pub mod group;
pub mod models;
pub mod porter;
pub mod provider;
pub mod rest;

#[cfg(test)]
mod mocks;
