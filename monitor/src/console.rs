//! Operator console for a running monitor.
//!
//! Answers `status`, `settings` and `help` from the live service: the latest
//! published snapshot and the current cooldown state. Reads never touch the
//! history or the gate.

use std::sync::Arc;

use alerts::{AnalysisSnapshot, messages};
use tokio::sync::{mpsc, watch};
use tracing::{debug, info};

use crate::scheduler::{MonitorService, timestamp};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ConsoleCommand {
    Status,
    Settings,
    Help,
}

impl ConsoleCommand {
    /// Accepts the bare word or the slash form (`status`, `/status`).
    pub fn parse(line: &str) -> Option<Self> {
        match line.trim().trim_start_matches('/').to_ascii_lowercase().as_str() {
            "status" => Some(Self::Status),
            "settings" => Some(Self::Settings),
            "help" => Some(Self::Help),
            _ => None,
        }
    }
}

const HELP: &str = "Commands:\n  status    latest analysis\n  settings  configuration and cooldown state\n  help      this text";

pub struct Console {
    service: Arc<MonitorService>,
    latest: watch::Receiver<Option<AnalysisSnapshot>>,
}

impl Console {
    pub fn new(service: Arc<MonitorService>) -> Self {
        let latest = service.subscribe();
        Self { service, latest }
    }

    /// Reply for one input line. Blank lines get no reply.
    pub fn respond(&self, line: &str) -> Option<String> {
        if line.trim().is_empty() {
            return None;
        }

        let Some(cmd) = ConsoleCommand::parse(line) else {
            return Some(format!("unknown command {:?}, try `help`", line.trim()));
        };

        let reply = match cmd {
            ConsoleCommand::Status => self.status(),
            ConsoleCommand::Settings => self.settings(),
            ConsoleCommand::Help => HELP.to_string(),
        };
        Some(reply)
    }

    fn status(&self) -> String {
        let cfg = self.service.config();
        match self.latest.borrow().as_ref() {
            Some(snapshot) => {
                messages::status_update(&cfg.asset, snapshot, timestamp(self.service.now_ms()))
            }
            None => format!("No {} price observed yet.", cfg.asset),
        }
    }

    fn settings(&self) -> String {
        messages::settings_summary(
            self.service.monitor().thresholds(),
            self.service.config().update_interval,
            &self.service.alert_status(),
        )
    }

    /// Serves lines until the sender side closes.
    pub async fn run(self, mut lines: mpsc::Receiver<String>) {
        info!("console ready, type `help` for commands");

        while let Some(line) = lines.recv().await {
            debug!(line = %line.trim(), "console command");
            if let Some(reply) = self.respond(&line) {
                println!("{reply}");
            }
        }
    }
}

/// Forwards stdin lines from a detached thread. Blocking reads stay off the runtime.
pub fn stdin_lines() -> mpsc::Receiver<String> {
    let (tx, rx) = mpsc::channel(16);

    std::thread::spawn(move || {
        for line in std::io::stdin().lines() {
            let Ok(line) = line else { break };
            if tx.blocking_send(line).is_err() {
                break;
            }
        }
    });

    rx
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_commands() {
        assert_eq!(ConsoleCommand::parse("status"), Some(ConsoleCommand::Status));
        assert_eq!(ConsoleCommand::parse(" /Settings \n"), Some(ConsoleCommand::Settings));
        assert_eq!(ConsoleCommand::parse("help"), Some(ConsoleCommand::Help));
        assert_eq!(ConsoleCommand::parse("buy"), None);
    }
}
