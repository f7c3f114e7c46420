use crossterm::event::KeyCode;
use serde_json::Value;
use std::time::Duration;

/// Inputs an app wants to receive, declared from subscriptions().
pub enum Subscription<Msg> {
    /// A specific keyboard key; description feeds the help line
    Keyboard {
        key: KeyCode,
        msg: Msg,
        description: String,
    },

    /// Periodic timer events
    Timer { interval: Duration, msg: Msg },

    /// Events published on a topic of the event bus
    Subscribe {
        topic: String,
        handler: Box<dyn Fn(Value) -> Option<Msg> + Send>,
    },
}

impl<Msg> Subscription<Msg> {
    pub fn keyboard(key: KeyCode, description: impl Into<String>, msg: Msg) -> Self {
        Subscription::Keyboard {
            key,
            msg,
            description: description.into(),
        }
    }

    pub fn timer(interval: Duration, msg: Msg) -> Self {
        Subscription::Timer { interval, msg }
    }

    pub fn subscribe<F>(topic: impl Into<String>, handler: F) -> Self
    where
        F: Fn(Value) -> Option<Msg> + Send + 'static,
    {
        Subscription::Subscribe {
            topic: topic.into(),
            handler: Box::new(handler),
        }
    }
}
