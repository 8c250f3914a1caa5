//! Scripted in-memory transport for driving the feed manager

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use tokio::sync::mpsc;
use tokio::time::Instant;
use trade_tape::ws::{WsConnection, WsConnector, WsError, WsMessage};

/// One step of a scripted session
#[derive(Debug, Clone)]
pub enum Step {
    Frame(WsMessage),
    Fail(WsError),
    Close,
}

/// What the next `connect` call does
#[derive(Debug, Clone)]
pub enum Script {
    Refuse(WsError),
    /// Connects, but every send fails
    BrokenPipe,
    Session(Vec<Step>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    Connect,
    Send(String),
    Closed,
}

/// Plays back scripts in order; once they run out, `connect` never completes
#[derive(Clone)]
pub struct ScriptedConnector {
    scripts: Arc<Mutex<VecDeque<Script>>>,
    events: mpsc::UnboundedSender<(Instant, Event)>,
}

impl ScriptedConnector {
    pub fn new(scripts: Vec<Script>) -> (Self, mpsc::UnboundedReceiver<(Instant, Event)>) {
        let (events, rx) = mpsc::unbounded_channel();
        let connector = Self {
            scripts: Arc::new(Mutex::new(scripts.into())),
            events,
        };
        (connector, rx)
    }

    fn record(&self, event: Event) {
        let _ = self.events.send((Instant::now(), event));
    }
}

#[async_trait]
impl WsConnector for ScriptedConnector {
    type Connection = ScriptedConnection;

    async fn connect(&self) -> Result<ScriptedConnection, WsError> {
        self.record(Event::Connect);
        let next = self.scripts.lock().unwrap().pop_front();
        match next {
            Some(Script::Refuse(e)) => Err(e),
            Some(Script::BrokenPipe) => Ok(ScriptedConnection {
                steps: VecDeque::new(),
                broken: true,
                events: self.events.clone(),
            }),
            Some(Script::Session(steps)) => Ok(ScriptedConnection {
                steps: steps.into(),
                broken: false,
                events: self.events.clone(),
            }),
            None => std::future::pending().await,
        }
    }
}

pub struct ScriptedConnection {
    steps: VecDeque<Step>,
    broken: bool,
    events: mpsc::UnboundedSender<(Instant, Event)>,
}

#[async_trait]
impl WsConnection for ScriptedConnection {
    async fn send_text(&mut self, text: String) -> Result<(), WsError> {
        if self.broken {
            return Err(WsError::SendFailed("broken pipe".to_string()));
        }
        let _ = self.events.send((Instant::now(), Event::Send(text)));
        Ok(())
    }

    async fn next_message(&mut self) -> Result<Option<WsMessage>, WsError> {
        match self.steps.pop_front() {
            Some(Step::Frame(message)) => Ok(Some(message)),
            Some(Step::Fail(e)) => Err(e),
            Some(Step::Close) => Ok(None),
            None => Err(WsError::StreamEnded),
        }
    }

    async fn close(&mut self) {
        let _ = self.events.send((Instant::now(), Event::Closed));
    }
}

pub fn subscribe_request(coin: &str) -> String {
    format!(
        r#"{{"method":"subscribe","subscription":{{"type":"trades","coin":"{}"}}}}"#,
        coin
    )
}

/// A `trades` payload with one entry per `(coin, px)`
pub fn trades_payload(trades: &[(&str, &str)]) -> String {
    let entries: Vec<String> = trades
        .iter()
        .map(|(coin, px)| {
            format!(
                r#"{{"coin":"{}","side":"B","time":1700000000000,"px":"{}","sz":"1","tid":1}}"#,
                coin, px
            )
        })
        .collect();
    format!(r#"{{"channel":"trades","data":[{}]}}"#, entries.join(","))
}

pub fn text(payload: impl Into<String>) -> Step {
    Step::Frame(WsMessage::Text(payload.into()))
}
