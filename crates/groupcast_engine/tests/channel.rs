use std::sync::{Arc, Mutex};
use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use groupcast_engine::{
    decode_event, socket_url, ChannelError, ChannelEvent, ChannelSettings, EngineEvent,
    EventSink, RealtimeChannel, SocketIoChannel, WireChat,
};
use pretty_assertions::assert_eq;
use serde_json::json;
use tokio::net::{TcpListener, TcpStream};
use tokio_tungstenite::tungstenite::handshake::server::{ErrorResponse, Request, Response};
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::WebSocketStream;
use url::Url;

const HANDSHAKE: &str =
    r#"0{"sid":"eio-1","upgrades":[],"pingInterval":25000,"pingTimeout":20000,"maxPayload":1000000}"#;

#[derive(Default)]
struct TestSink {
    events: Mutex<Vec<EngineEvent>>,
}

impl TestSink {
    fn take(&self) -> Vec<EngineEvent> {
        self.events.lock().unwrap().drain(..).collect()
    }
}

impl EventSink for TestSink {
    fn emit(&self, event: EngineEvent) {
        self.events.lock().unwrap().push(event);
    }
}

async fn accept(
    listener: &TcpListener,
    seen_uri: Arc<Mutex<Option<String>>>,
) -> WebSocketStream<TcpStream> {
    let (stream, _) = listener.accept().await.unwrap();
    let record_uri = move |req: &Request, resp: Response| -> Result<Response, ErrorResponse> {
        *seen_uri.lock().unwrap() = Some(req.uri().to_string());
        Ok(resp)
    };
    tokio_tungstenite::accept_hdr_async(stream, record_uri)
    .await
    .unwrap()
}

async fn next_text(ws: &mut WebSocketStream<TcpStream>) -> String {
    while let Some(frame) = ws.next().await {
        if let Message::Text(text) = frame.unwrap() {
            return text;
        }
    }
    panic!("client went away");
}

async fn send(ws: &mut WebSocketStream<TcpStream>, text: &str) {
    ws.send(Message::Text(text.to_string())).await.unwrap();
}

async fn local_listener() -> (TcpListener, Url) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let url = Url::parse(&format!("http://{}", listener.local_addr().unwrap())).unwrap();
    (listener, url)
}

#[tokio::test]
async fn channel_handshakes_and_forwards_pushes() {
    let (listener, base) = local_listener().await;
    let seen_uri = Arc::new(Mutex::new(None));

    let server_uri = seen_uri.clone();
    let server = tokio::spawn(async move {
        let mut ws = accept(&listener, server_uri).await;
        let mut replies = Vec::new();
        send(&mut ws, HANDSHAKE).await;
        replies.push(next_text(&mut ws).await);
        send(&mut ws, r#"40{"sid":"sio-1"}"#).await;
        send(&mut ws, "2").await;
        replies.push(next_text(&mut ws).await);
        send(&mut ws, r#"42["qr",{"to":"sess-1","qr":"2@abc"}]"#).await;
        send(
            &mut ws,
            r#"42["chats",[{"id":"g1","subject":"Team A"},{"id":42,"subject":null}]]"#,
        )
        .await;
        send(&mut ws, r#"42["chats",null]"#).await;
        send(&mut ws, r#"42["typing",{}]"#).await;
        ws.close(None).await.unwrap();
        replies
    });

    let channel = SocketIoChannel::new(base, ChannelSettings::default());
    let sink = TestSink::default();
    channel.run("sess-1", &sink).await.expect("orderly close");

    let replies = server.await.unwrap();
    assert_eq!(replies, vec!["40".to_string(), "3".to_string()]);

    let uri = seen_uri.lock().unwrap().clone().unwrap();
    assert!(uri.starts_with("/socket.io/?"));
    assert!(uri.contains("EIO=4"));
    assert!(uri.contains("transport=websocket"));
    assert!(uri.contains("authId=sess-1"));

    let events = sink.take();
    assert_eq!(events.len(), 4);
    assert_eq!(events[0], EngineEvent::Channel(ChannelEvent::Connected));
    assert_eq!(
        events[1],
        EngineEvent::Channel(ChannelEvent::Qr {
            to: "sess-1".to_string(),
            qr: "2@abc".to_string()
        })
    );
    match &events[2] {
        EngineEvent::Channel(ChannelEvent::Chats(Some(chats))) => {
            let ids: Vec<_> = chats.iter().map(|c| (c.id.as_str(), c.subject.as_str())).collect();
            assert_eq!(ids, vec![("g1", "Team A"), ("42", "")]);
        }
        other => panic!("unexpected event {other:?}"),
    }
    assert_eq!(events[3], EngineEvent::Channel(ChannelEvent::Chats(None)));
}

#[tokio::test]
async fn connect_error_is_reported_as_refused() {
    let (listener, base) = local_listener().await;
    let server = tokio::spawn(async move {
        let mut ws = accept(&listener, Arc::new(Mutex::new(None))).await;
        send(&mut ws, HANDSHAKE).await;
        let _ = next_text(&mut ws).await;
        send(&mut ws, r#"44{"message":"Not authorized"}"#).await;
        // Hold the socket until the client drops it.
        let _ = ws.next().await;
    });

    let channel = SocketIoChannel::new(base, ChannelSettings::default());
    let sink = TestSink::default();
    let err = channel.run("sess-1", &sink).await.unwrap_err();
    assert_eq!(err, ChannelError::Refused("Not authorized".to_string()));
    assert!(sink.take().is_empty());
    drop(channel);
    let _ = tokio::time::timeout(Duration::from_secs(2), server).await;
}

#[tokio::test]
async fn silent_server_hits_connect_timeout() {
    // Accepts TCP via the backlog but never answers the upgrade.
    let (_listener, base) = local_listener().await;
    let channel = SocketIoChannel::new(
        base,
        ChannelSettings {
            connect_timeout: Duration::from_millis(200),
        },
    );
    let sink = TestSink::default();
    assert_eq!(
        channel.run("sess-1", &sink).await.unwrap_err(),
        ChannelError::Timeout
    );
}

#[test]
fn socket_url_maps_scheme_and_keeps_base_path() {
    let base = Url::parse("https://api.example.com/backend/").unwrap();
    let url = socket_url(&base, "abc-123").unwrap();
    assert_eq!(
        url.as_str(),
        "wss://api.example.com/backend/socket.io/?EIO=4&transport=websocket&authId=abc-123"
    );

    let plain = Url::parse("http://localhost:3000").unwrap();
    assert_eq!(
        socket_url(&plain, "x").unwrap().as_str(),
        "ws://localhost:3000/socket.io/?EIO=4&transport=websocket&authId=x"
    );
}

#[test]
fn qr_push_must_be_an_addressed_object() {
    assert_eq!(
        decode_event("qr", vec![json!({"to": "s", "qr": "2@x"})]),
        Some(ChannelEvent::Qr {
            to: "s".to_string(),
            qr: "2@x".to_string()
        })
    );
    assert_eq!(decode_event("qr", vec![json!("2@x")]), None);
    assert_eq!(decode_event("qr", vec![]), None);
}

#[test]
fn chats_push_keeps_unknown_fields_and_null_marker() {
    let event = decode_event(
        "chats",
        vec![json!([{"id": "g1", "subject": "Team A", "participants": 12}])],
    );
    let mut expected = WireChat::new("g1", "Team A");
    expected.extra.insert("participants".to_string(), json!(12));
    assert_eq!(event, Some(ChannelEvent::Chats(Some(vec![expected]))));

    assert_eq!(decode_event("chats", vec![]), Some(ChannelEvent::Chats(None)));
    assert_eq!(
        decode_event("chats", vec![serde_json::Value::Null]),
        Some(ChannelEvent::Chats(None))
    );
    assert_eq!(decode_event("chats", vec![json!({"not": "a list"})]), None);
    assert_eq!(decode_event("presence", vec![json!({})]), None);
}
