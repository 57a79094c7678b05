//! Chat server end-to-end tests over real WebSocket connections

mod common;

use futures_util::{SinkExt, StreamExt};
use pretty_assertions::assert_eq;
use std::net::SocketAddr;
use std::time::Duration;
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};
use twshell::backend::chat::ChatHub;
use twshell::backend::server::{create_chat_app, create_shell_app, ServerConfig, ServiceEntry, ServiceRole};
use twshell::frontend::chat::{ChatClient, ChatPhase, ChatSession, MemoryNameStore};
use twshell::shared::{ClientEvent, ServerEvent};

type Socket = WebSocketStream<MaybeTlsStream<TcpStream>>;

const WAIT: Duration = Duration::from_secs(5);

async fn start_server() -> (SocketAddr, ChatHub) {
    let hub = ChatHub::new();
    let addr = common::spawn_app(create_chat_app(hub.clone())).await;
    (addr, hub)
}

async fn open(addr: SocketAddr) -> Socket {
    let (socket, _) = connect_async(format!("ws://{}/ws", addr)).await.unwrap();
    socket
}

async fn send(socket: &mut Socket, event: ClientEvent) {
    socket.send(Message::text(event.to_frame())).await.unwrap();
}

async fn recv(socket: &mut Socket) -> ServerEvent {
    loop {
        let frame = tokio::time::timeout(WAIT, socket.next())
            .await
            .expect("timed out waiting for a frame")
            .unwrap()
            .unwrap();
        if let Message::Text(text) = frame {
            return ServerEvent::parse(&text).unwrap();
        }
    }
}

async fn join(socket: &mut Socket, name: &str) {
    send(socket, ClientEvent::Join(name.to_string())).await;
    assert_eq!(recv(socket).await, ServerEvent::System(format!("Bienvenido, {}", name)));
}

#[tokio::test]
async fn test_join_notifies_others_and_welcomes_joiner() {
    let (addr, _hub) = start_server().await;
    let mut ana = open(addr).await;
    join(&mut ana, "ana").await;

    let mut luis = open(addr).await;
    join(&mut luis, "luis").await;

    assert_eq!(recv(&mut ana).await, ServerEvent::System("luis se ha unido al chat".to_string()));
}

#[tokio::test]
async fn test_message_broadcast_includes_sender() {
    let (addr, _hub) = start_server().await;
    let mut ana = open(addr).await;
    join(&mut ana, "ana").await;
    let mut luis = open(addr).await;
    join(&mut luis, "luis").await;
    recv(&mut ana).await;

    send(&mut ana, ClientEvent::Message("hola".to_string())).await;

    for socket in [&mut ana, &mut luis] {
        match recv(socket).await {
            ServerEvent::Message(message) => {
                assert_eq!(message.user, "ana");
                assert_eq!(message.text, "hola");
                assert!(message.time.ends_with('Z'));
            }
            other => panic!("expected message, got {:?}", other),
        }
    }
}

#[tokio::test]
async fn test_empty_name_gets_placeholder() {
    let (addr, _hub) = start_server().await;
    let mut socket = open(addr).await;
    send(&mut socket, ClientEvent::Join("   ".to_string())).await;

    let ServerEvent::System(welcome) = recv(&mut socket).await else {
        panic!("expected welcome notice");
    };
    let name = welcome.strip_prefix("Bienvenido, ").unwrap();
    assert!(name.starts_with("user-"));
    assert_eq!(name.len(), "user-".len() + 4);
}

#[tokio::test]
async fn test_malformed_frames_are_ignored() {
    let (addr, _hub) = start_server().await;
    let mut socket = open(addr).await;
    socket.send(Message::text("not json")).await.unwrap();
    socket
        .send(Message::text(r#"{"event":"dance","data":1}"#))
        .await
        .unwrap();
    socket
        .send(Message::text(r#"{"event":"join","data":42}"#))
        .await
        .unwrap();

    assert_eq!(recv(&mut socket).await, ServerEvent::System("Bienvenido, 42".to_string()));
}

#[tokio::test]
async fn test_departure_is_announced() {
    let (addr, hub) = start_server().await;
    let mut ana = open(addr).await;
    join(&mut ana, "ana").await;
    let mut luis = open(addr).await;
    join(&mut luis, "luis").await;
    recv(&mut ana).await;

    luis.close(None).await.unwrap();
    assert_eq!(recv(&mut ana).await, ServerEvent::System("luis salió del chat".to_string()));

    tokio::time::timeout(WAIT, async {
        while hub.session_count() != 1 {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await
    .unwrap();
}

#[tokio::test]
async fn test_client_joins_with_stored_name() {
    let (addr, _hub) = start_server().await;
    let session = ChatSession::new(
        MemoryNameStore::with_name("ana"),
        format!("ws://{}/ws", addr),
        false,
        Duration::from_secs(2),
    );
    let mut client = ChatClient::new(session);

    client.start().await.unwrap();
    assert!(client.is_connected());
    assert!(tokio::time::timeout(WAIT, client.wait_until_joined()).await.unwrap());
    assert_eq!(client.session().joined_name(), Some("ana"));

    client.send_message("hola a todos").await.unwrap();
    let event = tokio::time::timeout(WAIT, client.next_event()).await.unwrap();
    match event {
        Some(ServerEvent::Message(message)) => assert_eq!(message.text, "hola a todos"),
        other => panic!("expected message, got {:?}", other),
    }
}

#[tokio::test]
async fn test_client_rename_while_connected() {
    let (addr, hub) = start_server().await;
    let session = ChatSession::new(
        MemoryNameStore::new(),
        format!("ws://{}/ws", addr),
        false,
        Duration::from_secs(2),
    );
    let mut client = ChatClient::new(session);

    client.start().await.unwrap();
    assert!(client.session().is_prompt_open());
    client.submit_name("ana").await.unwrap();
    assert!(tokio::time::timeout(WAIT, client.wait_until_joined()).await.unwrap());

    client.change_name().await.unwrap();
    client.submit_name("ana maría").await.unwrap();
    assert!(tokio::time::timeout(WAIT, client.wait_until_joined()).await.unwrap());
    assert_eq!(client.session().joined_name(), Some("ana maría"));
    assert_eq!(hub.joined_count(), 1);
}

#[tokio::test]
async fn test_client_connect_failure_reopens_prompt() {
    let addr = common::closed_addr().await;
    let session = ChatSession::new(
        MemoryNameStore::with_name("ana"),
        format!("ws://{}/ws", addr),
        false,
        Duration::from_millis(500),
    );
    let mut client = ChatClient::new(session);

    assert!(client.start().await.is_err());
    assert!(!client.is_connected());
    assert_eq!(client.session().phase(), ChatPhase::Disconnected);
    assert!(client.session().is_prompt_open());
}

#[tokio::test]
async fn test_health_reports_sessions() {
    let (addr, _hub) = start_server().await;
    let _socket = open(addr).await;

    let body: serde_json::Value = reqwest::get(format!("http://{}/health", addr))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["service"], "tw-chat");
}

async fn start_shell(chat_upstream: &str) -> SocketAddr {
    let config = ServerConfig::for_role(ServiceRole::Shell).with_services(vec![ServiceEntry::new(
        "chat",
        "Chat",
        "chat",
        "Sistema de chat en tiempo real",
        chat_upstream,
    )]);
    common::spawn_app(create_shell_app(&config).unwrap()).await
}

#[tokio::test]
async fn test_chat_through_shell_passthrough() {
    let (chat_addr, hub) = start_server().await;
    let shell_addr = start_shell(&format!("http://{}", chat_addr)).await;

    let (mut embedded, _) = connect_async(format!("ws://{}/chat/ws", shell_addr)).await.unwrap();
    join(&mut embedded, "ana").await;

    let mut direct = open(chat_addr).await;
    join(&mut direct, "luis").await;
    assert_eq!(recv(&mut embedded).await, ServerEvent::System("luis se ha unido al chat".to_string()));

    send(&mut direct, ClientEvent::Message("hola".to_string())).await;
    match recv(&mut embedded).await {
        ServerEvent::Message(message) => {
            assert_eq!(message.user, "luis");
            assert_eq!(message.text, "hola");
        }
        other => panic!("expected message, got {:?}", other),
    }

    embedded.close(None).await.unwrap();
    assert_eq!(recv(&mut direct).await, ServerEvent::System("ana salió del chat".to_string()));
    assert_eq!(hub.joined_count(), 1);
}

#[tokio::test]
async fn test_shell_passthrough_still_serves_chat_page() {
    let (chat_addr, _hub) = start_server().await;
    let shell_addr = start_shell(&format!("http://{}", chat_addr)).await;

    let response = reqwest::get(format!("http://{}/chat/", shell_addr)).await.unwrap();
    assert_eq!(response.status(), 200);
    assert!(response.text().await.unwrap().contains("tw_username"));
}

#[tokio::test]
async fn test_shell_tunnel_to_unreachable_chat_fails_handshake() {
    let closed = common::closed_addr().await;
    let shell_addr = start_shell(&format!("http://{}", closed)).await;

    assert!(connect_async(format!("ws://{}/chat/ws", shell_addr)).await.is_err());
}

#[tokio::test]
async fn test_client_joins_through_shell() {
    let (chat_addr, _hub) = start_server().await;
    let shell_addr = start_shell(&format!("http://{}", chat_addr)).await;
    let session = ChatSession::new(
        MemoryNameStore::new(),
        format!("ws://{}/chat/ws", shell_addr),
        true,
        Duration::from_secs(2),
    );
    let mut client = ChatClient::new(session);

    client.start().await.unwrap();
    client.submit_name("ana").await.unwrap();
    assert!(tokio::time::timeout(WAIT, client.wait_until_joined()).await.unwrap());
    assert_eq!(client.session().joined_name(), Some("ana"));
}

#[tokio::test]
async fn test_wait_until_joined_gives_up_without_welcome() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let (stream, _) = listener.accept().await.unwrap();
        let mut socket = tokio_tungstenite::accept_async(stream).await.unwrap();
        while socket.next().await.is_some() {}
    });

    let session = ChatSession::new(
        MemoryNameStore::with_name("ana"),
        format!("ws://{}/ws", addr),
        false,
        Duration::from_millis(300),
    );
    let mut client = ChatClient::new(session);
    client.start().await.unwrap();

    assert!(!tokio::time::timeout(WAIT, client.wait_until_joined()).await.unwrap());
    assert_eq!(client.session().phase(), ChatPhase::AwaitingJoin);
}
