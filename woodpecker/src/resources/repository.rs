//! Repository resource
//!
//! Creating a repository activates an existing forge repository in
//! Woodpecker and then applies the configured settings; deleting it
//! deactivates it again.

use super::{key, RemoteResource};
use crate::api::{Client, Repo};
use crate::error::Result;
use async_trait::async_trait;
use tfplug::{DynamicValue, FieldSpec, FieldTable, Patch, ValueKind};

pub const VISIBILITY: &[&str] = &["public", "private", "internal"];

static FIELDS: [FieldSpec; 16] = [
    FieldSpec::key("owner", ValueKind::String)
        .describe("User or organization responsible for repository"),
    FieldSpec::key("name", ValueKind::String).describe("Repository name"),
    FieldSpec::optional("timeout", ValueKind::Int64).describe(
        "After this timeout (in minutes) a pipeline has to finish or will be treated as timed out.",
    ),
    FieldSpec::optional("visibility", ValueKind::String)
        .one_of(VISIBILITY)
        .describe("Public, Private, or Internal"),
    FieldSpec::optional("is_trusted", ValueKind::Bool)
        .wire("trusted")
        .describe("If true, pipeline containers get access to escalated capabilities like mounting volumes."),
    FieldSpec::optional("is_gated", ValueKind::Bool)
        .wire("gated")
        .describe("When true, every pipeline needs to be approved before being executed."),
    FieldSpec::optional("allow_pull", ValueKind::Bool)
        .wire("allow_pr")
        .describe("If true, pipelines can run on pull requests."),
    FieldSpec::optional("config", ValueKind::String)
        .wire("config_file")
        .describe("Path to the pipeline config file or folder."),
    FieldSpec::computed("id", ValueKind::Int64).describe("Repository ID"),
    FieldSpec::computed("full_name", ValueKind::String).describe("*owner*/*name*"),
    FieldSpec::computed("avatar", ValueKind::String)
        .wire("avatar_url")
        .describe("Repository avatar URL"),
    FieldSpec::computed("link", ValueKind::String)
        .wire("link_url")
        .describe("Link to repository"),
    FieldSpec::computed("kind", ValueKind::String)
        .wire("scm")
        .describe("Kind of repository (e.g. git)"),
    FieldSpec::computed("clone", ValueKind::String)
        .wire("clone_url")
        .describe("URL to clone repository"),
    FieldSpec::computed("branch", ValueKind::String)
        .wire("default_branch")
        .describe("Default branch name"),
    FieldSpec::computed("is_private", ValueKind::Bool)
        .wire("private")
        .describe("Whether the repository is private on the forge"),
];

pub const REPOSITORY_FIELDS: FieldTable = FieldTable::new(&FIELDS);

#[derive(Debug, Default)]
pub struct RepositoryResource;

#[async_trait]
impl RemoteResource for RepositoryResource {
    const TYPE_NAME: &'static str = "woodpecker_repository";
    const NOUN: &'static str = "repository";
    const DESCRIPTION: &'static str = "Activates a repository in Woodpecker and manages its settings.";
    const FIELDS: FieldTable = REPOSITORY_FIELDS;
    const IMPORT_ID: &'static [&'static str] = &["owner", "name"];

    type Remote = Repo;

    async fn create(&self, client: &Client, planned: &DynamicValue, patch: Patch) -> Result<Repo> {
        let owner = key(planned, "owner")?;
        let name = key(planned, "name")?;
        let repos = client.repos();

        // must exist on the forge before it can be activated
        repos.get(&owner, &name).await?;
        repos.activate(&owner, &name).await?;
        if !patch.is_empty() {
            repos.update(&owner, &name, &patch).await?;
        }
        Ok(repos.get(&owner, &name).await?)
    }

    async fn read(&self, client: &Client, state: &DynamicValue) -> Result<Repo> {
        let owner = key(state, "owner")?;
        let name = key(state, "name")?;
        Ok(client.repos().get(&owner, &name).await?)
    }

    async fn update(&self, client: &Client, state: &DynamicValue, patch: Patch) -> Result<Repo> {
        let owner = key(state, "owner")?;
        let name = key(state, "name")?;
        Ok(client.repos().update(&owner, &name, &patch).await?)
    }

    async fn delete(&self, client: &Client, state: &DynamicValue) -> Result<()> {
        let owner = key(state, "owner")?;
        let name = key(state, "name")?;
        Ok(client.repos().delete(&owner, &name).await?)
    }
}
