//! One-shot notification commands: list, unread, read, read-all, delete, open.

use std::fmt::Write as _;
use std::future::Future;

use chrono::Utc;
use owo_colors::OwoColorize;
use serde::Serialize;
use tabled::Tabled;

use shakwa_core::{
    CoreError, Locale, Notification, NotificationCenter, NotificationClient, NotificationId,
};

use crate::cli::{GlobalOpts, IdArgs, ListArgs};
use crate::config::Resolved;
use crate::error::CliError;
use crate::output;

/// Page scanned by `open` when looking up a notification's link.
const OPEN_SCAN_LIMIT: u32 = 100;

// ── Table rows ──────────────────────────────────────────────────────

#[derive(Tabled)]
struct NotificationRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "")]
    unread: &'static str,
    #[tabled(rename = "Title")]
    title: String,
    #[tabled(rename = "Age")]
    age: String,
    #[tabled(rename = "Link")]
    link: String,
}

fn to_row(n: &Notification, locale: Locale) -> NotificationRow {
    NotificationRow {
        id: n.id.to_string(),
        unread: if n.is_read { "" } else { "●" },
        title: n.title(locale).to_owned(),
        age: n.age(Utc::now(), locale),
        link: n.action_url.clone().unwrap_or_default(),
    }
}

#[derive(Serialize)]
struct UnreadSummary {
    unread_count: u64,
}

#[derive(Serialize)]
struct Ack<'a> {
    id: Option<&'a str>,
    action: &'static str,
}

// ── Handlers ────────────────────────────────────────────────────────

pub async fn list(args: ListArgs, resolved: &Resolved, global: &GlobalOpts) -> Result<(), CliError> {
    let limit = args.limit.unwrap_or(resolved.notifier.page_size);
    let page = run(resolved, |client| async move {
        Ok::<_, CoreError>(client.list_notifications(args.skip, limit).await?)
    })
    .await?;

    let mut items: Vec<Notification> = page
        .notifications
        .into_iter()
        .map(Notification::from)
        .collect();
    if args.unread {
        items.retain(|n| !n.is_read);
    }

    let locale = resolved.notifier.locale;
    output::emit(
        global,
        &items,
        |ns| output::table(ns.iter().map(|n| to_row(n, locale))),
        |ns| ns.iter().map(|n| n.id.to_string()).collect::<Vec<_>>().join("\n"),
    )
}

pub async fn unread(resolved: &Resolved, global: &GlobalOpts) -> Result<(), CliError> {
    let unread_count = run(resolved, |client| async move {
        Ok::<_, CoreError>(client.unread_count().await?)
    })
    .await?;
    let summary = UnreadSummary { unread_count };

    let color = output::should_color(&global.color);
    output::emit(
        global,
        &summary,
        |s| {
            let label = format!("{} unread", s.unread_count);
            if color && s.unread_count > 0 {
                label.bold().to_string()
            } else {
                label
            }
        },
        |s| s.unread_count.to_string(),
    )
}

pub async fn read(args: IdArgs, resolved: &Resolved, global: &GlobalOpts) -> Result<(), CliError> {
    let id = args.id;
    run(resolved, |client| {
        let id = id.clone();
        async move { Ok::<_, CoreError>(client.mark_read(&id).await?) }
    })
    .await
    .map_err(|e| not_found_as(e, &id))?;

    acknowledge(Some(&id), "read", global)
}

pub async fn read_all(resolved: &Resolved, global: &GlobalOpts) -> Result<(), CliError> {
    run(resolved, |client| async move {
        Ok::<_, CoreError>(client.mark_all_read().await?)
    })
    .await?;
    acknowledge(None, "read-all", global)
}

pub async fn delete(args: IdArgs, resolved: &Resolved, global: &GlobalOpts) -> Result<(), CliError> {
    let id = args.id;
    run(resolved, |client| {
        let id = id.clone();
        async move { Ok::<_, CoreError>(client.delete_notification(&id).await?) }
    })
    .await
    .map_err(|e| not_found_as(e, &id))?;

    acknowledge(Some(&id), "deleted", global)
}

/// Print the absolute link of a notification and mark it read if needed.
pub async fn open(args: IdArgs, resolved: &Resolved, global: &GlobalOpts) -> Result<(), CliError> {
    let wanted = NotificationId::new(args.id);
    let target = wanted.clone();

    let found = run(resolved, |client| async move {
        let page = client.list_notifications(0, OPEN_SCAN_LIMIT).await?;
        let Some(entry) = page
            .notifications
            .into_iter()
            .map(Notification::from)
            .find(|n| n.id == target)
        else {
            return Ok(None);
        };
        if entry.marks_read_on_open() {
            client.mark_read(entry.id.as_str()).await?;
        }
        Ok::<_, CoreError>(Some(entry))
    })
    .await?;

    let entry = found.ok_or_else(|| CliError::NotFound {
        identifier: wanted.to_string(),
    })?;
    let link = entry.action_url.as_deref().ok_or_else(|| CliError::NoLink {
        identifier: wanted.to_string(),
    })?;

    let absolute = resolved
        .notifier
        .origin
        .join(link)
        .map_or_else(|_| link.to_owned(), |u| u.to_string());
    output::line(&absolute, global.quiet);
    Ok(())
}

// ── Helpers ─────────────────────────────────────────────────────────

async fn run<F, Fut, T>(resolved: &Resolved, f: F) -> Result<T, CliError>
where
    F: FnOnce(NotificationClient) -> Fut,
    Fut: Future<Output = Result<T, CoreError>>,
{
    NotificationCenter::oneshot(&resolved.notifier, resolved.session.clone(), f)
        .await
        .map_err(|e| CliError::from_core(e, &resolved.profile))
}

fn not_found_as(err: CliError, id: &str) -> CliError {
    match err {
        CliError::NotFound { .. } => CliError::NotFound {
            identifier: id.to_owned(),
        },
        other => other,
    }
}

fn acknowledge(
    id: Option<&str>,
    action: &'static str,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let ack = Ack { id, action };
    output::emit(
        global,
        &ack,
        |a| {
            let mut line = String::from("✓ ");
            match a.id {
                Some(id) => {
                    let _ = write!(line, "{id} {}", a.action);
                }
                None => line.push_str("all notifications marked read"),
            }
            line
        },
        |a| a.id.unwrap_or(a.action).to_owned(),
    )
}
