//! Terminal notifier: mutation outcomes as colored lines on stderr.

use std::io::{self, IsTerminal, Write};

use owo_colors::OwoColorize;

use crease_core::{Notification, Notifier, Variant};

pub struct ConsoleNotifier {
    quiet: bool,
    color: bool,
}

impl ConsoleNotifier {
    pub fn new(quiet: bool) -> Self {
        Self {
            quiet,
            color: io::stderr().is_terminal() && std::env::var_os("NO_COLOR").is_none(),
        }
    }

    fn line(&self, n: &Notification) -> String {
        let mark = match n.variant {
            Variant::Success => "✓",
            Variant::Error => "✗",
            Variant::Info => "•",
        };
        let head = if self.color {
            match n.variant {
                Variant::Success => format!("{} {}", mark.green(), n.title.bold()),
                Variant::Error => format!("{} {}", mark.red(), n.title.bold()),
                Variant::Info => format!("{} {}", mark.cyan(), n.title),
            }
        } else {
            format!("{mark} {}", n.title)
        };
        match n.description {
            Some(ref desc) => format!("{head}: {desc}"),
            None => head,
        }
    }
}

impl Notifier for ConsoleNotifier {
    fn notify(&self, notification: Notification) {
        if self.quiet && notification.variant != Variant::Error {
            return;
        }
        let mut stderr = io::stderr().lock();
        let _ = writeln!(stderr, "{}", self.line(&notification));
    }
}
