//! 终端输出

use std::fmt::Write;

use console_auth_core::{NavigationMenu, Principal};
use console_router::NavigationOutcome;

use crate::app::RouteRow;
use crate::registry::Screen;

pub fn principal(principal: &Principal) -> String {
    let routes = if principal.is_highest_privilege() {
        "(all routes)".to_string()
    } else if principal.allowed_routes.is_empty() {
        "(none)".to_string()
    } else {
        principal
            .allowed_routes
            .iter()
            .map(|p| p.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    };

    format!(
        "identity: {}\nname:     {}\nrole:     {}\nroutes:   {}",
        principal.identity, principal.display_name, principal.role, routes
    )
}

pub fn menu(menu: &NavigationMenu<'_>) -> String {
    match menu {
        NavigationMenu::Unavailable => "No navigation is available for this account.".to_string(),
        NavigationMenu::Entries(entries) => {
            let width = entries.iter().map(|d| d.label.len()).max().unwrap_or(0);
            let mut out = String::new();
            for descriptor in entries {
                let _ = writeln!(out, "{:width$}  {}", descriptor.label, descriptor.path);
            }
            out.trim_end().to_string()
        }
    }
}

pub fn outcome(outcome: &NavigationOutcome<Screen>) -> String {
    match outcome {
        NavigationOutcome::Pending { path } => format!("{}: session is still loading", path),
        NavigationOutcome::Rendered { path, screen } => format!("{} → {}", path, screen),
        NavigationOutcome::RedirectedToLogin { from } => {
            format!("{}: sign in required, redirected to the login page", from)
        }
        NavigationOutcome::Redirected {
            from,
            to,
            screen: Some(screen),
        } => format!("{}: not permitted, redirected to {} → {}", from, to, screen),
        NavigationOutcome::Redirected {
            from,
            to,
            screen: None,
        } => format!(
            "{}: not permitted, and {} is not accessible either. Ask an administrator for access.",
            from, to
        ),
        NavigationOutcome::NotFound { path } => format!("{}: no such page", path),
        NavigationOutcome::InvalidPath { raw, reason } => format!("{:?}: {}", raw, reason),
    }
}

pub fn routes(rows: &[RouteRow<'_>]) -> String {
    let width = rows
        .iter()
        .map(|r| r.descriptor.path.as_str().len())
        .max()
        .unwrap_or(0);

    let mut out = String::new();
    for row in rows {
        let marker = if row.descriptor.requires_highest_privilege {
            " [super_admin]"
        } else {
            ""
        };
        let _ = writeln!(
            out,
            "{:width$}  {:8}  {}{}",
            row.descriptor.path.as_str(),
            row.access,
            row.descriptor.label,
            marker
        );
    }
    out.trim_end().to_string()
}
