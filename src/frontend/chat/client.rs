/**
 * Chat Client Driver
 *
 * Executes the commands produced by `ChatSession` against a real
 * `ChatTransport`. The connect step is bounded by the session's connect
 * timeout. A timeout or a refused connection is reported to the session,
 * which reopens the name prompt.
 */
use super::session::{ChatCommand, ChatPhase, ChatSession, MemoryNameStore, NameStore};
use super::transport::{ChatClientError, ChatTransport};
use crate::shared::chat::ServerEvent;
use crate::shared::config::AppConfig;
use std::collections::VecDeque;

/// Realtime chat client
pub struct ChatClient<S: NameStore = MemoryNameStore> {
    session: ChatSession<S>,
    transport: Option<ChatTransport>,
}

impl<S: NameStore> ChatClient<S> {
    pub fn new(session: ChatSession<S>) -> Self {
        Self {
            session,
            transport: None,
        }
    }

    /// Build a client for the endpoint matching the embedding context
    ///
    /// # Errors
    ///
    /// `MissingEndpoint` if neither the embedded nor the standalone chat
    /// URL is configured.
    pub fn from_config(store: S, config: &AppConfig, embedded: bool) -> Result<Self, ChatClientError> {
        let endpoint = config
            .chat_endpoint(embedded)
            .ok_or(ChatClientError::MissingEndpoint)?;
        Ok(Self::new(ChatSession::new(
            store,
            endpoint,
            embedded,
            config.connect_timeout,
        )))
    }

    pub fn session(&self) -> &ChatSession<S> {
        &self.session
    }

    pub fn is_connected(&self) -> bool {
        self.transport.is_some()
    }

    /// Initial load
    pub async fn start(&mut self) -> Result<(), ChatClientError> {
        let commands = self.session.start();
        self.execute(commands).await
    }

    pub async fn submit_name(&mut self, name: &str) -> Result<(), ChatClientError> {
        let commands = self.session.submit_name(name);
        self.execute(commands).await
    }

    pub async fn change_name(&mut self) -> Result<(), ChatClientError> {
        let commands = self.session.change_name();
        self.execute(commands).await
    }

    pub async fn send_message(&mut self, text: &str) -> Result<(), ChatClientError> {
        let commands = self.session.send_message(text)?;
        self.execute(commands).await
    }

    /// Reconnect after the transport was lost
    pub async fn reconnect(&mut self) -> Result<(), ChatClientError> {
        let commands = self.session.reconnect();
        self.execute(commands).await
    }

    pub async fn disconnect(&mut self) -> Result<(), ChatClientError> {
        let commands = self.session.disconnect();
        self.execute(commands).await
    }

    /// Wait for the next server event and feed it to the session
    ///
    /// Returns `None` when the connection closes; the session is then
    /// `Disconnected` and a later `reconnect` starts a fresh session.
    pub async fn next_event(&mut self) -> Option<ServerEvent> {
        let transport = self.transport.as_mut()?;
        match transport.next_event().await {
            Some(event) => {
                self.session.on_server_event(event.clone());
                Some(event)
            }
            None => {
                tracing::info!("[Chat] Connection closed");
                self.transport = None;
                self.session.on_closed();
                None
            }
        }
    }

    /// Read events until the session is `Active`
    ///
    /// Gives up when the connection closes or no welcome arrives within the
    /// connect timeout.
    pub async fn wait_until_joined(&mut self) -> bool {
        let timeout = self.session.connect_timeout();
        let joined = tokio::time::timeout(timeout, async {
            while self.session.phase() == ChatPhase::AwaitingJoin {
                if self.next_event().await.is_none() {
                    return false;
                }
            }
            self.session.phase() == ChatPhase::Active
        })
        .await;
        joined.unwrap_or_else(|_| {
            tracing::warn!("[Chat] No welcome from the server after {:?}", timeout);
            false
        })
    }

    async fn execute(&mut self, commands: Vec<ChatCommand>) -> Result<(), ChatClientError> {
        let mut queue: VecDeque<ChatCommand> = commands.into();
        let mut failure = None;
        while let Some(command) = queue.pop_front() {
            match command {
                ChatCommand::PromptForName => {
                    tracing::debug!("[Chat] Waiting for a display name");
                }
                // the connect future below is bounded by the same timeout
                ChatCommand::StartConnectTimer { .. } => {}
                ChatCommand::Connect { endpoint, attempt } => {
                    let timeout = self.session.connect_timeout();
                    let connected =
                        tokio::time::timeout(timeout, ChatTransport::connect(&endpoint)).await;
                    let (error, followups) = match connected {
                        Ok(Ok(transport)) => {
                            self.transport = Some(transport);
                            queue.extend(self.session.on_connected());
                            continue;
                        }
                        Ok(Err(e)) => {
                            let followups = self.session.on_connect_failed(attempt, &e.to_string());
                            (e, followups)
                        }
                        Err(_) => (
                            ChatClientError::ConnectTimeout { endpoint, timeout },
                            self.session.on_connect_timeout(attempt),
                        ),
                    };
                    // the rest of the queue belonged to the abandoned attempt
                    queue.clear();
                    queue.extend(followups);
                    failure = Some(error);
                }
                ChatCommand::Send(event) => {
                    let transport = self.transport.as_mut().ok_or(ChatClientError::NotConnected)?;
                    transport.send(&event).await?;
                }
                ChatCommand::Disconnect => {
                    if let Some(transport) = self.transport.take() {
                        transport.close().await;
                    }
                }
            }
        }
        failure.map_or(Ok(()), Err)
    }
}
