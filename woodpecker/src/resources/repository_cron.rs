//! Repository cron resource
//!
//! The remote addresses crons by a numeric id it assigns, while users (and
//! import ids) name them. Read, update and delete use the id from state;
//! import and the lookup data source fall back to scanning the listing.

use super::{key, remote_id, RemoteResource};
use crate::api::{Client, Cron};
use crate::error::Result;
use async_trait::async_trait;
use tfplug::{Dynamic, DynamicValue, FieldSpec, FieldTable, Patch, ValueKind};

static FIELDS: [FieldSpec; 10] = [
    FieldSpec::key("repo_owner", ValueKind::String)
        .path_only()
        .describe("User or organization responsible for repository"),
    FieldSpec::key("repo_name", ValueKind::String)
        .path_only()
        .describe("Repository name"),
    FieldSpec::key("name", ValueKind::String).describe("Cron Name"),
    FieldSpec::required("schedule", ValueKind::String).describe("Schedule (based on UTC)"),
    FieldSpec::optional("branch", ValueKind::String)
        .describe("Branch to run on, defaults to the repository default branch"),
    FieldSpec::computed("id", ValueKind::Int64),
    FieldSpec::computed("repo_id", ValueKind::Int64),
    FieldSpec::computed("creator_id", ValueKind::Int64),
    FieldSpec::computed("next_exec", ValueKind::Int64).describe("Next execution (unix time)"),
    FieldSpec::computed("created", ValueKind::Int64)
        .wire("created_at")
        .describe("Creation time (unix time)"),
];

pub const REPOSITORY_CRON_FIELDS: FieldTable = FieldTable::new(&FIELDS);

#[derive(Debug, Default)]
pub struct RepositoryCronResource;

#[async_trait]
impl RemoteResource for RepositoryCronResource {
    const TYPE_NAME: &'static str = "woodpecker_repository_cron";
    const NOUN: &'static str = "repository cron";
    const DESCRIPTION: &'static str = "Provides a repository cron job.";
    const FIELDS: FieldTable = REPOSITORY_CRON_FIELDS;
    const IMPORT_ID: &'static [&'static str] = &["repo_owner", "repo_name", "name"];

    type Remote = Cron;

    async fn create(&self, client: &Client, planned: &DynamicValue, patch: Patch) -> Result<Cron> {
        let owner = key(planned, "repo_owner")?;
        let repo = key(planned, "repo_name")?;
        let body = patch.with_key(planned, "name");
        Ok(client.crons().create(&owner, &repo, &body).await?)
    }

    /// By id when state has one, otherwise by name.
    async fn read(&self, client: &Client, state: &DynamicValue) -> Result<Cron> {
        let owner = key(state, "repo_owner")?;
        let repo = key(state, "repo_name")?;
        match state.field::<i64>("id")?.as_option() {
            Some(id) => Ok(client.crons().get(&owner, &repo, *id).await?),
            None => {
                let name = key(state, "name")?;
                Ok(client.crons().find_by_name(&owner, &repo, &name).await?)
            }
        }
    }

    async fn update(&self, client: &Client, state: &DynamicValue, patch: Patch) -> Result<Cron> {
        let owner = key(state, "repo_owner")?;
        let repo = key(state, "repo_name")?;
        let id = remote_id(state)?;
        let body = patch.with_key(state, "name");
        Ok(client.crons().update(&owner, &repo, id, &body).await?)
    }

    async fn delete(&self, client: &Client, state: &DynamicValue) -> Result<()> {
        let owner = key(state, "repo_owner")?;
        let repo = key(state, "repo_name")?;
        let id = remote_id(state)?;
        Ok(client.crons().delete(&owner, &repo, id).await?)
    }

    async fn import(&self, client: &Client, parts: Vec<String>) -> Result<DynamicValue> {
        let [owner, repo, name]: [String; 3] = parts
            .try_into()
            .map_err(|_| tfplug::TfplugError::ImportFailed("expected three parts".to_string()))?;
        let cron = client.crons().find_by_name(&owner, &repo, &name).await?;

        let mut state = DynamicValue::object();
        state.set("repo_owner", Dynamic::String(owner));
        state.set("repo_name", Dynamic::String(repo));
        state.set("name", Dynamic::String(name));
        state.set("id", Dynamic::Number(cron.id as f64));
        Ok(state)
    }
}
