//! Remote parameter store composition and failure handling.

use anyhow::{Result, bail, ensure};
use config_lineage::{
    DirectoryParameterStore, EnvironmentSnapshot, FeatureFlags, LineageError, LoadStatus,
    ProviderKind, Resolver, ResolverSettings, RetryPolicy,
};
use rstest::{fixture, rstest};
use test_helpers::project::Project;

#[fixture]
fn project() -> Result<Project> {
    let project = Project::new()?;
    project.write("appsettings.json", r#"{ "Db": { "ConnectionString": "fileval" } }"#)?;
    project.write(
        "parameters/eu-west-1.json",
        r#"{
            "/shop/prod/Db/ConnectionString": "remoteval",
            "/shop/prod/ApiIntegration/ApiKey": "remotekey",
            "/shop/test/ApiIntegration/ApiKey": "otherstage"
        }"#,
    )?;
    Ok(project)
}

fn settings(project: &Project, optional: bool) -> ResolverSettings {
    let mut settings = ResolverSettings {
        settings_dir: project.root().to_owned(),
        ..ResolverSettings::default()
    };
    settings.remote_store.optional = optional;
    settings.remote_store.retry = RetryPolicy::no_retry();
    settings
}

fn remote_env(region: &str) -> EnvironmentSnapshot {
    EnvironmentSnapshot::new()
        .with_var("REMOTE_PARAMETER_STORE_ENABLED", "true")
        .with_var("REMOTE_PARAMETER_STORE_APPLICATION", "shop")
        .with_var("REMOTE_PARAMETER_STORE_STAGE", "prod")
        .with_var("REMOTE_PARAMETER_STORE_REGION", region)
}

fn build(project: &Project, env: &EnvironmentSnapshot, optional: bool) -> Result<Resolver, LineageError> {
    let settings = settings(project, optional);
    let flags = FeatureFlags::from_environment(env, &settings.remote_store)?;
    Resolver::builder(settings)
        .parameter_store(DirectoryParameterStore::new(project.path("parameters")))
        .build(env, flags, &[])
}

#[rstest]
fn remote_parameters_override_files(project: Result<Project>) -> Result<()> {
    let project = project?;
    let resolver = build(&project, &remote_env("eu-west-1"), false)?;
    let connection = resolver.resolve_str("Db:ConnectionString")?;
    ensure!(connection.value() == Some("remoteval"));
    ensure!(connection.winner() == Some(ProviderKind::RemoteParameterStore));
    let api_key = resolver.resolve_str("ApiIntegration:ApiKey")?;
    ensure!(api_key.value() == Some("remotekey"), "stage prefix must scope the fetch");
    Ok(())
}

#[rstest]
fn environment_still_beats_remote_parameters(project: Result<Project>) -> Result<()> {
    let project = project?;
    let env = remote_env("eu-west-1").with_var("ApiIntegration__ApiKey", "envkey");
    let resolver = build(&project, &env, false)?;
    let api_key = resolver.resolve_str("ApiIntegration:ApiKey")?;
    ensure!(api_key.value() == Some("envkey"));
    ensure!(api_key.winner() == Some(ProviderKind::Environment));
    Ok(())
}

#[rstest]
fn unpublished_region_fails_the_build(project: Result<Project>) -> Result<()> {
    let project = project?;
    match build(&project, &remote_env("ap-south-1"), false) {
        Err(LineageError::SourceLoad { kind, origin, .. }) => {
            ensure!(kind == ProviderKind::RemoteParameterStore);
            ensure!(origin.contains("/shop/prod"), "origin should name the prefix: {origin}");
            Ok(())
        }
        Err(other) => bail!("unexpected error: {other}"),
        Ok(_) => bail!("a required store failure must abort the build"),
    }
}

#[rstest]
fn optional_store_failure_is_recovered(project: Result<Project>) -> Result<()> {
    let project = project?;
    let resolver = build(&project, &remote_env("ap-south-1"), true)?;
    let statuses: Vec<_> = resolver
        .chain()
        .entries()
        .iter()
        .filter(|entry| entry.kind() == ProviderKind::RemoteParameterStore)
        .map(|entry| entry.status().clone())
        .collect();
    ensure!(
        matches!(statuses.as_slice(), [LoadStatus::Skipped { .. }]),
        "{statuses:?}"
    );
    let connection = resolver.resolve_str("Db:ConnectionString")?;
    ensure!(connection.winner() == Some(ProviderKind::JsonFile));
    Ok(())
}

#[rstest]
fn disabled_store_is_not_in_the_chain(project: Result<Project>) -> Result<()> {
    let project = project?;
    let env = remote_env("eu-west-1").with_var("REMOTE_PARAMETER_STORE_ENABLED", "false");
    let resolver = build(&project, &env, false)?;
    ensure!(
        resolver
            .chain()
            .entries()
            .iter()
            .all(|entry| entry.kind() != ProviderKind::RemoteParameterStore)
    );
    let api_key = resolver.resolve_str("ApiIntegration:ApiKey")?;
    ensure!(api_key.value().is_none() && api_key.winner().is_none());
    Ok(())
}

#[rstest]
fn missing_stage_is_rejected_before_fetching(project: Result<Project>) -> Result<()> {
    let project = project?;
    let env = remote_env("eu-west-1").with_var("REMOTE_PARAMETER_STORE_STAGE", "");
    match build(&project, &env, true) {
        Err(LineageError::MissingSetting { variable, .. }) => {
            ensure!(variable == "REMOTE_PARAMETER_STORE_STAGE");
            Ok(())
        }
        Err(other) => bail!("unexpected error: {other}"),
        Ok(_) => bail!("an unset path segment must be rejected"),
    }
}
