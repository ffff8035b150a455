//! `grant` subcommand.

use std::path::Path;

use accesspoint_console::{
    Backend, ConsoleConfig, GrantController, GrantEvent, GroupCatalog, TagEvent,
};
use miette::{IntoDiagnostic, Result, WrapErr};
use tracing::info;

use crate::render;

/// Values given on the command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GrantForm {
    pub username: String,
    pub pub_key: String,
    pub groups: Vec<String>,
    pub ips: Vec<String>,
    pub sudo: bool,
}

/// Read a public key file, dropping the trailing newline.
pub async fn read_pub_key(path: &Path) -> Result<String> {
    let key = tokio::fs::read_to_string(path)
        .await
        .into_diagnostic()
        .wrap_err_with(|| format!("failed to read public key from {}", path.display()))?;
    Ok(key.trim().to_string())
}

/// Fill the grant form from `form` and submit it.
///
/// With a groups directory every group must exist there. Without one the
/// groups are offered as their own candidates and the backend decides.
pub async fn run<B: Backend>(
    backend: B,
    config: ConsoleConfig,
    form: GrantForm,
    groups_dir: Option<&Path>,
) -> Result<()> {
    let catalog = match groups_dir {
        Some(dir) => GroupCatalog::load_dir(dir)
            .await
            .map_err(|e| miette::miette!("failed to load groups: {}", e))?,
        None => GroupCatalog::new(form.groups.iter().map(|g| g.trim().to_string())),
    };

    let mut grant = GrantController::new(backend, config, &catalog);
    fill(&mut grant, &form).await?;

    info!(
        username = %form.username,
        groups = grant.groups().tags().len(),
        ips = grant.ips().tags().len(),
        "granting access"
    );
    grant.handle(GrantEvent::Submit).await;
    render::finish(grant.view())
}

async fn fill<B: Backend>(grant: &mut GrantController<B>, form: &GrantForm) -> Result<()> {
    grant.handle(GrantEvent::Username(form.username.clone())).await;
    grant.handle(GrantEvent::PubKey(form.pub_key.clone())).await;
    grant.handle(GrantEvent::AddToSudoers(form.sudo)).await;

    grant.handle(GrantEvent::Groups(TagEvent::Focus)).await;
    for group in &form.groups {
        let group = group.trim();
        if group.is_empty() || grant.groups().contains(group) {
            continue;
        }
        grant
            .handle(GrantEvent::Groups(TagEvent::Input(group.to_string())))
            .await;
        if !grant.groups().visible_suggestions().iter().any(|s| s == group) {
            miette::bail!("unknown group: {}", group);
        }
        grant
            .handle(GrantEvent::Groups(TagEvent::PickSuggestion(group.to_string())))
            .await;
    }
    grant.handle(GrantEvent::Groups(TagEvent::Blur)).await;

    for ip in &form.ips {
        grant.handle(GrantEvent::Ips(TagEvent::Input(ip.clone()))).await;
        grant.handle(GrantEvent::Ips(TagEvent::Enter)).await;
    }
    Ok(())
}
