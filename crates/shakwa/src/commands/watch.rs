//! `shakwa watch`: mount a notification center and print toasts until Ctrl-C.

use std::io::{self, Write};
use std::sync::Arc;

use owo_colors::OwoColorize;
use tracing::debug;

use shakwa_core::{
    ConnectionState, LocaleHandle, NotificationCenter, NotificationSnapshot, TextDirection,
    Toast, ToastSink, TracingToastSink,
};

use crate::cli::{GlobalOpts, WatchArgs};
use crate::config::Resolved;
use crate::error::CliError;
use crate::output;

// Unicode isolates keep Arabic text right-to-left inside a left-to-right terminal line.
const RLI: char = '\u{2067}';
const PDI: char = '\u{2069}';

/// Writes toasts to stderr as they arrive.
pub struct TerminalToasts {
    color: bool,
}

impl TerminalToasts {
    pub fn new(color: bool) -> Self {
        Self { color }
    }

    pub fn render(&self, toast: &Toast) -> String {
        let (title, message) = match toast.direction {
            TextDirection::Rtl => (
                format!("{RLI}{}{PDI}", toast.title),
                format!("{RLI}{}{PDI}", toast.message),
            ),
            TextDirection::Ltr => (toast.title.clone(), toast.message.clone()),
        };

        let bell = "●";
        if self.color {
            format!("{} {}\n  {}", bell.yellow(), title.bold(), message.dimmed())
        } else {
            format!("{bell} {title}\n  {message}")
        }
    }
}

impl ToastSink for TerminalToasts {
    fn show(&self, toast: Toast) {
        let mut stderr = io::stderr().lock();
        let _ = writeln!(stderr, "{}", self.render(&toast));
    }
}

pub async fn handle(
    args: WatchArgs,
    resolved: Resolved,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let color = output::should_color(&global.color);
    let locale = LocaleHandle::new(resolved.notifier.locale);
    // Quiet mode keeps toasts in the log stream only.
    let toasts: Arc<dyn ToastSink> = if global.quiet {
        Arc::new(TracingToastSink)
    } else {
        Arc::new(TerminalToasts::new(color))
    };

    let center = NotificationCenter::mount(
        &resolved.notifier,
        resolved.session,
        locale.subscribe(),
        toasts,
    )
    .map_err(|e| CliError::from_core(e, &resolved.profile))?;

    let store = center.store().clone();
    let loaded = store.loaded();
    tokio::pin!(loaded);
    let mut summary_pending = !args.no_summary;

    let mut state = center.connection_state();
    loop {
        tokio::select! {
            res = tokio::signal::ctrl_c() => {
                if let Err(e) = res {
                    debug!(error = %e, "ctrl-c handler failed");
                }
                break;
            }
            snapshot = &mut loaded, if summary_pending => {
                summary_pending = false;
                status(&summary_line(&snapshot), color, global.quiet);
            }
            changed = state.changed() => {
                // The push task drops its sender once it stops reconnecting.
                let current = (changed.is_ok() && state.has_changed().is_ok())
                    .then(|| *state.borrow());
                if let Some(line) = state_line(current) {
                    status(line, color, global.quiet);
                }
                if current.is_none() {
                    break;
                }
            }
        }
    }

    center.unmount().await;
    Ok(())
}

/// Status line for a connection change. `None` means the push task is gone.
fn state_line(state: Option<ConnectionState>) -> Option<&'static str> {
    match state {
        Some(ConnectionState::Connected) => Some("connected"),
        Some(ConnectionState::Connecting) => None,
        Some(ConnectionState::Disconnected) => Some("disconnected, retrying"),
        None => Some("push connection stopped"),
    }
}

fn summary_line(snapshot: &NotificationSnapshot) -> String {
    format!(
        "{} unread ({} of {} loaded)",
        snapshot.unread_count,
        snapshot.held_unread(),
        snapshot.notifications.len()
    )
}

fn status(text: &str, color: bool, quiet: bool) {
    if quiet {
        return;
    }
    let mut stderr = io::stderr().lock();
    if color {
        let _ = writeln!(stderr, "{}", text.dimmed());
    } else {
        let _ = writeln!(stderr, "{text}");
    }
}
