//! `lookup` and `revoke` subcommands.

use accesspoint_console::{Backend, ConsoleConfig, RevokeController, RevokeEvent};
use miette::Result;
use tracing::info;

use crate::render;

/// Which servers to remove access from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection {
    /// Every server shown after filtering.
    All,
    /// These IPs; each must be one of the user's servers.
    Ips(Vec<String>),
}

/// Print the servers `username` can reach.
pub async fn lookup<B: Backend>(backend: B, config: ConsoleConfig, username: &str) -> Result<()> {
    let mut revoke = RevokeController::new(backend, config);
    revoke.handle(RevokeEvent::Username(username.to_string())).await;
    revoke.handle(RevokeEvent::FindServers).await;

    if let Some(selection) = revoke.selection() {
        for row in selection.rows() {
            println!("{}", row.ip);
        }
    }
    render::finish(revoke.view())
}

/// Look the user up, check the requested servers and submit the removal.
pub async fn run<B: Backend>(
    backend: B,
    config: ConsoleConfig,
    username: &str,
    filter: Option<&str>,
    selection: Selection,
) -> Result<()> {
    let mut revoke = RevokeController::new(backend, config);
    revoke.handle(RevokeEvent::Username(username.to_string())).await;
    revoke.handle(RevokeEvent::FindServers).await;

    if revoke.selection().is_none() {
        // Lookup failed or the user has no servers.
        return render::finish(revoke.view());
    }

    if let Some(filter) = filter {
        revoke.handle(RevokeEvent::Filter(filter.to_string())).await;
    }

    match selection {
        Selection::All if filter.is_none() => {
            revoke.handle(RevokeEvent::SelectAll(true)).await;
        }
        Selection::All => {
            let visible: Vec<String> = revoke
                .selection()
                .map(|s| s.visible_rows().map(|r| r.ip.clone()).collect())
                .unwrap_or_default();
            for ip in visible {
                revoke.handle(RevokeEvent::Check { ip, checked: true }).await;
            }
        }
        Selection::Ips(ips) => {
            for ip in ips {
                let listed = revoke
                    .selection()
                    .is_some_and(|s| s.visible_rows().any(|r| r.ip == ip));
                if !listed {
                    miette::bail!("{} is not among the listed servers of {}", ip, username);
                }
                revoke.handle(RevokeEvent::Check { ip, checked: true }).await;
            }
        }
    }

    if let Some(selection) = revoke.selection() {
        println!("{}", render::selection(selection));
        info!(
            username,
            servers = selection.checked_ips().len(),
            "removing access"
        );
    }

    revoke.handle(RevokeEvent::Submit).await;
    render::finish(revoke.view())
}
