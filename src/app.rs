use std::time::{Duration, Instant};

use anyhow::Result;
use crossterm::event::{Event as TermEvent, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use ratatui::{backend::Backend, Terminal};
use tokio::sync::mpsc;
use tracing::warn;

use crate::bridge::Bridge;
use crate::machine::{Effect, Event, Machine, Phase};
use crate::menu;
use crate::resolver;
use crate::state::SyncedStore;
use crate::tweet::Tweet;
use crate::ui;

const TOAST_TTL: Duration = Duration::from_secs(4);
const TICK: Duration = Duration::from_millis(100);

const SPINNER: [&str; 10] = ["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];

/// Completions delivered back to the event loop from spawned work.
#[derive(Debug)]
pub enum AppEvent {
    BridgeResolved(Option<Tweet>),
}

#[derive(Debug)]
struct Toast {
    text: String,
    shown_at: Instant,
}

/// One widget instance: owns the synchronized store, the render state
/// machine, and the widget side of the bridge. Everything runs on the
/// event loop; the only suspend point is the bridge request, which runs
/// as a spawned task and reports back over the app event channel.
pub struct App {
    store: SyncedStore,
    machine: Machine,
    bridge: Bridge,
    toast: Option<Toast>,
    toast_rx: mpsc::UnboundedReceiver<String>,
    events_tx: mpsc::UnboundedSender<AppEvent>,
    events_rx: mpsc::UnboundedReceiver<AppEvent>,
    tick: u64,
    should_quit: bool,
}

impl App {
    pub fn new(store: SyncedStore, bridge: Bridge, toast_rx: mpsc::UnboundedReceiver<String>) -> Self {
        let machine = Machine::new(store.tweet().is_some());
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        Self {
            store,
            machine,
            bridge,
            toast: None,
            toast_rx,
            events_tx,
            events_rx,
            tick: 0,
            should_quit: false,
        }
    }

    pub async fn run<B: Backend>(mut self, terminal: &mut Terminal<B>) -> Result<()> {
        let mut input_rx = spawn_input_thread();
        let mut ticker = tokio::time::interval(TICK);

        while !self.should_quit {
            terminal.draw(|frame| ui::draw(frame, &self))?;

            tokio::select! {
                Some(event) = input_rx.recv() => {
                    if let TermEvent::Key(key) = event {
                        self.handle_key(key);
                    }
                }
                Some(event) = self.events_rx.recv() => self.handle_app_event(event),
                Some(text) = self.toast_rx.recv() => self.show_toast(text),
                _ = ticker.tick() => {
                    self.tick = self.tick.wrapping_add(1);
                    self.expire_toast();
                }
            }
        }

        self.bridge.close();
        Ok(())
    }

    pub fn phase(&self) -> Phase {
        self.machine.phase()
    }

    pub fn pending_input(&self) -> &str {
        self.store.pending_input()
    }

    pub fn tweet(&self) -> Option<&Tweet> {
        self.store.tweet()
    }

    pub fn toast_text(&self) -> Option<&str> {
        self.toast.as_ref().map(|t| t.text.as_str())
    }

    pub fn spinner_frame(&self) -> &'static str {
        SPINNER[(self.tick as usize) % SPINNER.len()]
    }

    fn handle_key(&mut self, key: KeyEvent) {
        if key.kind != KeyEventKind::Press {
            return;
        }
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            self.should_quit = true;
            return;
        }

        match self.machine.phase() {
            Phase::Input => match key.code {
                KeyCode::Esc => self.should_quit = true,
                KeyCode::Enter => self.embed(),
                KeyCode::Backspace => {
                    let mut text = self.store.pending_input().to_string();
                    text.pop();
                    self.set_pending_input(text);
                }
                KeyCode::Char(c) => {
                    let mut text = self.store.pending_input().to_string();
                    text.push(c);
                    self.set_pending_input(text);
                }
                _ => {}
            },
            // The embed trigger is gone while a request is outstanding, so
            // nothing here can start a second one.
            Phase::Awaiting => {
                if matches!(key.code, KeyCode::Esc | KeyCode::Char('q')) {
                    self.should_quit = true;
                }
            }
            Phase::Display => match key.code {
                KeyCode::Esc | KeyCode::Char('q') => self.should_quit = true,
                KeyCode::Char(c) => {
                    if let Some(action) = menu::action_for_key(c) {
                        let effect = self.machine.apply(Event::Menu(action));
                        self.apply_effect(effect);
                    }
                }
                _ => {}
            },
        }
    }

    fn handle_app_event(&mut self, event: AppEvent) {
        match event {
            AppEvent::BridgeResolved(payload) => {
                let effect = self.machine.apply(Event::BridgeResolved(payload));
                self.apply_effect(effect);
            }
        }
    }

    /// The embed action: resolve whatever is in the input field and let the
    /// machine decide whether a fetch starts.
    fn embed(&mut self) {
        let verdict = resolver::resolve(self.store.pending_input());
        let effect = self.machine.apply(Event::Embed(verdict));
        self.apply_effect(effect);
    }

    fn apply_effect(&mut self, effect: Effect) {
        match effect {
            Effect::None => {}
            Effect::Toast(text) => self.show_toast(text.to_string()),
            Effect::StoreTweet(tweet) => {
                if let Err(err) = self.store.set_tweet(Some(tweet)) {
                    warn!(error = %err, "failed to persist tweet slot");
                }
            }
            Effect::ClearTweet => {
                if let Err(err) = self.store.set_tweet(None) {
                    warn!(error = %err, "failed to persist tweet slot");
                }
            }
            Effect::BeginFetch(id) => {
                let bridge = self.bridge.clone();
                let events_tx = self.events_tx.clone();
                tokio::spawn(async move {
                    let payload = match bridge.request_tweet(&id).await {
                        Ok(payload) => payload,
                        Err(err) => {
                            warn!(%id, error = %err, "bridge request failed");
                            None
                        }
                    };
                    let _ = events_tx.send(AppEvent::BridgeResolved(payload));
                });
            }
        }
    }

    fn set_pending_input(&mut self, text: String) {
        if let Err(err) = self.store.set_pending_input(text) {
            warn!(error = %err, "failed to persist input slot");
        }
    }

    fn show_toast(&mut self, text: String) {
        self.toast = Some(Toast {
            text,
            shown_at: Instant::now(),
        });
    }

    fn expire_toast(&mut self) {
        if let Some(toast) = &self.toast {
            if toast.shown_at.elapsed() >= TOAST_TTL {
                self.toast = None;
            }
        }
    }
}

/// Terminal input runs on its own thread; crossterm's blocking read would
/// otherwise starve the async loop.
fn spawn_input_thread() -> mpsc::UnboundedReceiver<TermEvent> {
    let (tx, rx) = mpsc::unbounded_channel();
    std::thread::spawn(move || {
        while let Ok(event) = crossterm::event::read() {
            if tx.send(event).is_err() {
                break;
            }
        }
    });
    rx
}
