use std::collections::VecDeque;
use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::api::{ApiError, MessageSource};
use crate::models::{MessagePage, Timestamp};
use crate::services::chat::{self, SendResult};
use crate::services::export::export_to_markdown;
use crate::services::notifications;
use crate::services::{ClientSettings, FetchTicket, TranscriptSession};
use crate::ui::chat_view::{draw, intro_banner, DrawOptions};

/// Input from the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppMsg {
    SendMessage(String),
    ScrollToTop,
    Retry,
    Reload,
    Export(PathBuf),
    Quit,
    Unknown(String),
}

/// Completions of background work.
#[derive(Debug)]
pub enum AppCmd {
    PageLoaded {
        ticket: FetchTicket,
        result: Result<MessagePage, ApiError>,
    },
    SendFinished(SendResult),
}

pub fn parse_command(line: &str) -> Option<AppMsg> {
    let line = line.trim();
    if line.is_empty() {
        return None;
    }
    if !line.starts_with('/') {
        return Some(AppMsg::SendMessage(line.to_string()));
    }

    let (cmd, arg) = match line.split_once(char::is_whitespace) {
        Some((cmd, arg)) => (cmd, arg.trim()),
        None => (line, ""),
    };
    let msg = match cmd {
        "/top" | "/up" => AppMsg::ScrollToTop,
        "/retry" => AppMsg::Retry,
        "/reload" => AppMsg::Reload,
        "/export" if !arg.is_empty() => AppMsg::Export(PathBuf::from(arg)),
        "/quit" | "/exit" => AppMsg::Quit,
        _ => AppMsg::Unknown(line.to_string()),
    };
    Some(msg)
}

pub struct App {
    session: TranscriptSession,
    source: Arc<dyn MessageSource>,
    cmd_tx: mpsc::Sender<AppCmd>,
    draw_opts: DrawOptions,
    poll_every: Duration,
    // Messages waiting for /retry, oldest first
    drafts: VecDeque<String>,
    alert: Option<String>,
    intro_seen: bool,
    sending: bool,
}

impl App {
    pub fn new(
        source: Arc<dyn MessageSource>,
        settings: &ClientSettings,
        cmd_tx: mpsc::Sender<AppCmd>,
    ) -> Self {
        Self {
            session: TranscriptSession::new(),
            source,
            cmd_tx,
            draw_opts: DrawOptions {
                width: usize::from(settings.bubble_width),
                show_avatars: settings.show_avatars,
            },
            poll_every: Duration::from_secs(settings.poll_secs.max(1)),
            drafts: VecDeque::new(),
            alert: None,
            intro_seen: false,
            sending: false,
        }
    }

    pub async fn run(mut self, mut cmd_rx: mpsc::Receiver<AppCmd>) -> Result<()> {
        let cancel = CancellationToken::new();
        let (notes_tx, mut notes_rx) = mpsc::channel::<Vec<String>>(16);
        let poller = notifications::spawn_poller(
            self.source.clone(),
            self.poll_every,
            notes_tx,
            cancel.clone(),
        );

        let mut lines = BufReader::new(tokio::io::stdin()).lines();

        let outcome = self.session.fetch_batch(self.source.as_ref(), None).await;
        tracing::debug!(count = outcome.count, "Initial page loaded");
        self.redraw()?;

        loop {
            tokio::select! {
                line = lines.next_line() => {
                    let Some(line) = line.context("Failed to read input")? else {
                        break;
                    };
                    let Some(msg) = parse_command(&line) else {
                        continue;
                    };
                    if msg == AppMsg::Quit {
                        break;
                    }
                    self.update(msg);
                }
                Some(cmd) = cmd_rx.recv() => self.update_cmd(cmd),
                Some(notes) = notes_rx.recv() => self.on_notifications(notes),
            }
            self.redraw()?;
        }

        cancel.cancel();
        if let Err(e) = poller.await {
            tracing::warn!("Notification poller ended abnormally: {}", e);
        }
        Ok(())
    }

    pub fn update(&mut self, msg: AppMsg) {
        match msg {
            AppMsg::SendMessage(text) => self.send(text),
            AppMsg::ScrollToTop => {
                if let Some(ticket) = self.session.on_top_reached(Instant::now()) {
                    self.spawn_fetch(ticket);
                }
            }
            AppMsg::Retry => match self.drafts.pop_front() {
                Some(text) => self.send(text),
                None => self.alert = Some("Nothing to resend.".to_string()),
            },
            AppMsg::Reload => {
                self.session.reset();
                self.request_page(None);
            }
            AppMsg::Export(path) => {
                self.alert = Some(match self.export(&path) {
                    Ok(()) => format!("Transcript written to {}", path.display()),
                    Err(e) => format!("Export failed: {:#}", e),
                });
            }
            AppMsg::Unknown(line) => {
                self.alert = Some(format!("Unknown command: {}", line));
            }
            AppMsg::Quit => {}
        }
    }

    pub fn update_cmd(&mut self, cmd: AppCmd) {
        match cmd {
            AppCmd::PageLoaded { ticket, result } => {
                let outcome = self.session.complete_fetch(ticket, result);
                tracing::debug!(count = outcome.count, "Page applied");
            }
            AppCmd::SendFinished(SendResult::Delivered) => {
                self.sending = false;
                self.request_page(None);
            }
            AppCmd::SendFinished(SendResult::Failed { draft, error }) => {
                self.sending = false;
                self.alert = Some(format!(
                    "Could not send your message ({}). Type /retry to resend it.",
                    error
                ));
                self.drafts.push_front(draft);
            }
        }
    }

    fn send(&mut self, input: String) {
        let Some(text) = chat::prepare_outgoing(&input) else {
            return;
        };
        if self.sending {
            self.alert = Some(
                "Still sending the previous message. Type /retry to send this one.".to_string(),
            );
            self.drafts.push_back(text);
            return;
        }
        self.sending = true;

        let source = self.source.clone();
        let tx = self.cmd_tx.clone();
        tokio::spawn(async move {
            let result = chat::deliver(source.as_ref(), text).await;
            let _ = tx.send(AppCmd::SendFinished(result)).await;
        });
    }

    /// Show a polled batch, then refresh the newest page.
    fn on_notifications(&mut self, notes: Vec<String>) {
        self.session.push_notifications(notes, Timestamp::now());
        self.request_page(None);
    }

    fn request_page(&mut self, before: Option<Timestamp>) {
        if let Some(ticket) = self.session.begin_fetch(before) {
            self.spawn_fetch(ticket);
        }
    }

    fn spawn_fetch(&self, ticket: FetchTicket) {
        let source = self.source.clone();
        let tx = self.cmd_tx.clone();
        tokio::spawn(async move {
            let result = source.fetch_page(ticket.before()).await;
            let _ = tx.send(AppCmd::PageLoaded { ticket, result }).await;
        });
    }

    fn export(&self, path: &std::path::Path) -> Result<()> {
        let markdown = export_to_markdown(self.session.displayed(), self.session.login_at());
        std::fs::write(path, markdown)
            .with_context(|| format!("Failed to write {}", path.display()))
    }

    fn redraw(&mut self) -> Result<()> {
        let mut frame = String::from("\x1b[2J\x1b[H");
        if !self.intro_seen {
            frame.push_str(&intro_banner());
            frame.push('\n');
            self.intro_seen = true;
        }
        frame.push_str(&draw(&self.session.view(), &self.draw_opts));
        if let Some(alert) = self.alert.take() {
            frame.push_str(&format!("\n! {}\n", alert));
        }
        frame.push_str("\n> ");

        let mut stdout = std::io::stdout().lock();
        stdout.write_all(frame.as_bytes())?;
        stdout.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Role;
    use crate::services::testing::{clock, msg, page, ScriptedSource};
    use crate::services::unlock::UnlockState;

    fn app_with(source: Arc<ScriptedSource>) -> (App, mpsc::Receiver<AppCmd>) {
        let (tx, rx) = mpsc::channel(8);
        let app = App::new(source, &ClientSettings::default(), tx);
        (app, rx)
    }

    #[test]
    fn test_parse_command() {
        assert_eq!(parse_command("   "), None);
        assert_eq!(
            parse_command(" hello "),
            Some(AppMsg::SendMessage("hello".to_string()))
        );
        assert_eq!(parse_command("/top"), Some(AppMsg::ScrollToTop));
        assert_eq!(
            parse_command("/export  out.md"),
            Some(AppMsg::Export(PathBuf::from("out.md")))
        );
        assert_eq!(
            parse_command("/export"),
            Some(AppMsg::Unknown("/export".to_string()))
        );
        assert_eq!(parse_command("/quit"), Some(AppMsg::Quit));
    }

    #[tokio::test]
    async fn test_pages_flow_back_through_the_loop() {
        let source = Arc::new(ScriptedSource::new());
        source.push_page(Ok(page(vec![msg(Role::User, "10:00"), msg(Role::Bot, "10:01")], None)));
        source.push_page(Ok(page(vec![msg(Role::User, "09:00")], None)));
        let (mut app, mut rx) = app_with(source.clone());

        app.request_page(None);
        let cmd = rx.recv().await.unwrap();
        app.update_cmd(cmd);
        assert_eq!(app.session.displayed().len(), 2);

        app.update(AppMsg::ScrollToTop);
        tokio::time::sleep(Duration::from_millis(460)).await;
        app.update(AppMsg::ScrollToTop);
        assert_eq!(app.session.unlock_state(), UnlockState::Unlocked);

        let cmd = rx.recv().await.unwrap();
        app.update_cmd(cmd);
        let shown: Vec<Timestamp> = app.session.displayed().iter().map(|m| m.timestamp).collect();
        assert_eq!(shown, vec![clock("09:00"), clock("10:00"), clock("10:01")]);
    }

    #[tokio::test]
    async fn test_failed_send_keeps_draft_for_retry() {
        let source = Arc::new(ScriptedSource::failing_sends());
        let (mut app, mut rx) = app_with(source);

        app.update(AppMsg::SendMessage("hello?".to_string()));
        let cmd = rx.recv().await.unwrap();
        app.update_cmd(cmd);
        assert_eq!(app.drafts, VecDeque::from(["hello?".to_string()]));
        assert!(app.alert.as_deref().unwrap().contains("/retry"));
        assert!(!app.sending);
    }

    #[tokio::test]
    async fn test_send_while_busy_keeps_every_draft() {
        let source = Arc::new(ScriptedSource::failing_sends());
        let (mut app, mut rx) = app_with(source);

        app.update(AppMsg::SendMessage("first".to_string()));
        app.update(AppMsg::SendMessage("second".to_string()));
        assert!(app.alert.take().unwrap().contains("Still sending"));

        let cmd = rx.recv().await.unwrap();
        app.update_cmd(cmd);
        assert_eq!(
            app.drafts,
            VecDeque::from(["first".to_string(), "second".to_string()])
        );

        app.update(AppMsg::Retry);
        assert!(app.sending);
        assert_eq!(app.drafts, VecDeque::from(["second".to_string()]));
    }

    #[tokio::test]
    async fn test_notification_batch_shows_and_refreshes_once() {
        let source = Arc::new(ScriptedSource::new());
        let (mut app, mut rx) = app_with(source.clone());

        app.on_notifications(vec!["Quiz graded".to_string()]);
        app.on_notifications(vec!["Essay due tomorrow".to_string()]);
        let texts: Vec<&str> = app.session.displayed().iter().map(|m| m.text.as_str()).collect();
        assert_eq!(texts, vec!["Quiz graded", "Essay due tomorrow"]);

        let cmd = rx.recv().await.unwrap();
        app.update_cmd(cmd);
        assert_eq!(source.request_count(), 1);
        assert!(rx.try_recv().is_err());
        assert_eq!(app.session.displayed().len(), 2);
    }

    #[tokio::test]
    async fn test_delivered_send_refreshes_newest_page() {
        let source = Arc::new(ScriptedSource::new());
        source.push_page(Ok(page(vec![msg(Role::User, "10:00"), msg(Role::Bot, "10:01")], None)));
        let (mut app, mut rx) = app_with(source.clone());

        app.update(AppMsg::SendMessage("hi".to_string()));
        let cmd = rx.recv().await.unwrap();
        app.update_cmd(cmd);
        let cmd = rx.recv().await.unwrap();
        app.update_cmd(cmd);

        assert_eq!(*source.sent.lock().unwrap(), vec!["hi".to_string()]);
        assert_eq!(app.session.displayed().len(), 2);
        assert_eq!(source.request_count(), 1);
    }

    #[test]
    fn test_export_writes_markdown() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("transcript.md");
        let (tx, _rx) = mpsc::channel(1);
        let mut app = App::new(
            Arc::new(ScriptedSource::new()),
            &ClientSettings::default(),
            tx,
        );
        app.session.push_notifications(vec!["Essay due".to_string()], clock("12:00"));

        app.update(AppMsg::Export(path.clone()));
        let written = std::fs::read_to_string(&path).unwrap();
        assert!(written.contains("Essay due"));
        assert!(app.alert.as_deref().unwrap().starts_with("Transcript written"));
    }
}
