use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyEventKind};
use ratatui::Frame;
use ratatui::layout::Rect;
use serde_json::Value;
use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::time::{Duration, Instant};

use crate::tui::{App, Command, Renderer, Subscription, Theme};

/// The runtime manages app state, event routing, and command execution.
pub struct Runtime<A: App> {
    /// Current app state
    state: A::State,

    /// Active theme
    theme: Theme,

    /// Keyboard subscriptions
    key_subscriptions: HashMap<KeyCode, A::Msg>,

    /// Event bus for pub/sub
    event_bus: HashMap<String, Vec<Box<dyn Fn(Value) -> Option<A::Msg> + Send>>>,

    /// Timer subscriptions: (interval, last_tick, msg)
    timers: Vec<(Duration, Instant, A::Msg)>,

    /// Pending async commands
    pending_async: Vec<Pin<Box<dyn Future<Output = A::Msg> + Send>>>,

    /// Pending publish events not yet drained by the shell
    pending_publishes: Vec<(String, Value)>,
}

impl<A: App> Runtime<A> {
    pub fn new(theme: Theme) -> Self {
        let (state, init_command) = A::init();

        let mut runtime = Self {
            state,
            theme,
            key_subscriptions: HashMap::new(),
            event_bus: HashMap::new(),
            timers: Vec::new(),
            pending_async: Vec::new(),
            pending_publishes: Vec::new(),
        };

        runtime.update_subscriptions();
        runtime.execute_command(init_command).ok();

        runtime
    }

    /// Take pending publish events (drained each frame by the shell)
    pub fn take_publishes(&mut self) -> Vec<(String, Value)> {
        std::mem::take(&mut self.pending_publishes)
    }

    /// Keyboard bindings for the help line
    pub fn key_bindings(&self) -> Vec<(KeyCode, String)> {
        A::subscriptions(&self.state)
            .into_iter()
            .filter_map(|sub| match sub {
                Subscription::Keyboard { key, description, .. } => Some((key, description)),
                _ => None,
            })
            .collect()
    }

    /// The app's title (static string)
    pub fn title(&self) -> &'static str {
        A::title()
    }

    /// The app's status line (optional, dynamic)
    pub fn status_line(&self) -> Option<ratatui::text::Line<'static>> {
        A::status(&self.state, &self.theme)
    }

    /// Render the app's view into the given area
    pub fn render(&mut self, frame: &mut Frame, area: Rect) {
        let element = A::view(&mut self.state, &self.theme);
        Renderer::render(frame, &self.theme, &element, area);
    }

    /// Poll timer subscriptions and fire those that are ready
    pub fn poll_timers(&mut self) -> Result<()> {
        let now = Instant::now();
        let mut messages = Vec::new();

        for (interval, last_tick, msg) in &mut self.timers {
            if now.duration_since(*last_tick) >= *interval {
                messages.push(msg.clone());
                *last_tick = now;
            }
        }

        for msg in messages {
            let command = A::update(&mut self.state, msg);
            self.execute_command(command)?;
        }

        Ok(())
    }

    /// Poll pending async commands and process completed ones.
    ///
    /// Futures are polled with a noop waker; readiness is picked up on the
    /// next frame rather than via wakeups, which is fine at 60 FPS.
    pub async fn poll_async(&mut self) -> Result<()> {
        use std::task::{Context, Poll};

        let waker = futures::task::noop_waker();
        let mut cx = Context::from_waker(&waker);

        let mut completed = Vec::new();

        for (i, future) in self.pending_async.iter_mut().enumerate() {
            if let Poll::Ready(msg) = future.as_mut().poll(&mut cx) {
                completed.push((i, msg));
            }
        }

        // Remove completed futures in reverse order to keep indices valid
        completed.sort_by(|a, b| b.0.cmp(&a.0));
        for (i, msg) in completed {
            self.pending_async.remove(i);
            let command = A::update(&mut self.state, msg);
            self.execute_command(command)?;
        }

        Ok(())
    }

    /// Register subscriptions from the app's current state
    fn update_subscriptions(&mut self) {
        self.key_subscriptions.clear();
        self.event_bus.clear();
        self.timers.clear();

        for sub in A::subscriptions(&self.state) {
            match sub {
                Subscription::Keyboard { key, msg, description: _ } => {
                    self.key_subscriptions.insert(key, msg);
                }
                Subscription::Subscribe { topic, handler } => {
                    self.event_bus.entry(topic).or_default().push(handler);
                }
                Subscription::Timer { interval, msg } => {
                    self.timers.push((interval, Instant::now(), msg));
                }
            }
        }
    }

    /// Handle a keyboard event. Returns false when the app wants to quit.
    pub fn handle_key(&mut self, key_event: KeyEvent) -> Result<bool> {
        if key_event.kind != KeyEventKind::Press {
            return Ok(true);
        }

        if let Some(msg) = self.key_subscriptions.get(&key_event.code).cloned() {
            let command = A::update(&mut self.state, msg);
            return self.execute_command(command);
        }

        Ok(true)
    }

    /// Deliver a published event to this app's topic handlers
    pub fn handle_publish(&mut self, topic: &str, data: Value) -> Result<()> {
        // Collect messages first to avoid borrowing the bus during update
        let messages: Vec<A::Msg> = if let Some(handlers) = self.event_bus.get(topic) {
            handlers
                .iter()
                .filter_map(|handler| handler(data.clone()))
                .collect()
        } else {
            Vec::new()
        };

        for msg in messages {
            let command = A::update(&mut self.state, msg);
            self.execute_command(command)?;
        }
        Ok(())
    }

    /// Execute a command. Returns false when the app wants to quit.
    fn execute_command(&mut self, command: Command<A::Msg>) -> Result<bool> {
        match command {
            Command::None => Ok(true),

            Command::Batch(commands) => {
                for cmd in commands {
                    if !self.execute_command(cmd)? {
                        return Ok(false);
                    }
                }
                Ok(true)
            }

            Command::Quit => Ok(false),

            Command::Publish { topic, data } => {
                // Deliver locally first, then leave for the shell to drain
                self.handle_publish(&topic, data.clone())?;
                self.pending_publishes.push((topic, data));
                Ok(true)
            }

            Command::Perform(future) => {
                self.pending_async.push(future);
                Ok(true)
            }
        }
    }
}
