mod support;

use futures_util::{SinkExt, StreamExt};
use serde_json::{Value, json};
use std::time::Duration;
use tokio::net::TcpStream;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async, tungstenite::Message};

type Socket = WebSocketStream<MaybeTlsStream<TcpStream>>;

fn unique_name() -> String {
    let id = uuid::Uuid::new_v4().simple().to_string();
    format!("p{}", &id[..12])
}

async fn connect() -> Socket {
    let base_url = support::ensure_server();
    let ws_url = format!("{}/ws", base_url.replacen("http://", "ws://", 1));
    let (socket, _) = connect_async(ws_url)
        .await
        .expect("websocket handshake should succeed");
    socket
}

async fn send(socket: &mut Socket, value: Value) {
    socket
        .send(Message::text(value.to_string()))
        .await
        .expect("send should succeed");
}

// Next text frame as JSON, skipping control frames.
async fn next_json(socket: &mut Socket) -> Value {
    loop {
        let msg = tokio::time::timeout(Duration::from_secs(5), socket.next())
            .await
            .expect("server should answer in time")
            .expect("stream should stay open")
            .expect("frame should be valid");
        if msg.is_text() {
            let text = msg.to_text().expect("text frame");
            return serde_json::from_str(text).expect("server sends JSON");
        }
        if msg.is_close() {
            panic!("server closed the session");
        }
    }
}

async fn join(socket: &mut Socket, name: &str) -> u64 {
    send(socket, json!({ "type": "Join", "data": { "name": name } })).await;
    let update = next_json(socket).await;
    assert_eq!(update["type"], "Update");
    update["data"]["events"][0]["data"]["entity_id"]
        .as_u64()
        .expect("first update should carry EnterGame")
}

#[tokio::test]
async fn when_client_joins_then_first_update_enters_game_and_lists_itself() {
    let mut socket = connect().await;
    let name = unique_name();

    send(&mut socket, json!({ "type": "Join", "data": { "name": name } })).await;
    let update = next_json(&mut socket).await;

    assert_eq!(update["type"], "Update");
    let data = &update["data"];
    assert_eq!(data["events"][0]["type"], "EnterGame");
    let entity_id = data["events"][0]["data"]["entity_id"]
        .as_u64()
        .expect("entity id");
    let own = data["entities"]
        .as_array()
        .expect("entities array")
        .iter()
        .find(|e| e["id"].as_u64() == Some(entity_id))
        .expect("own record should be broadcast");
    assert_eq!(own["name"], name.as_str());
    assert_eq!(own["radius"], 0.5);
    assert_eq!(own["kind"], "player_gunner");
    assert_eq!(own["collider"], "circle");
    assert!(data["tick"].as_u64().expect("tick") >= 1);
}

#[tokio::test]
async fn when_move_sent_then_later_update_shows_velocity() {
    let mut socket = connect().await;
    let entity_id = join(&mut socket, &unique_name()).await;

    send(
        &mut socket,
        json!({
            "type": "Input",
            "data": { "events": [ { "type": "Move", "data": { "direction": { "x": 0.0, "y": 2.0 } } } ] }
        }),
    )
    .await;

    for _ in 0..40 {
        let update = next_json(&mut socket).await;
        let moving = update["data"]["entities"]
            .as_array()
            .expect("entities array")
            .iter()
            .any(|e| e["id"].as_u64() == Some(entity_id) && e["velocity"]["y"] == 1.0);
        if moving {
            return;
        }
    }
    panic!("velocity never reflected the move input");
}

#[tokio::test]
async fn when_name_already_connected_then_second_join_gets_error() {
    let name = unique_name();
    let mut first = connect().await;
    join(&mut first, &name).await;

    let mut second = connect().await;
    send(&mut second, json!({ "type": "Join", "data": { "name": name } })).await;
    let reply = next_json(&mut second).await;

    assert_eq!(reply["type"], "Error");
    assert_eq!(reply["data"]["message"], "name taken");
}

#[tokio::test]
async fn when_status_polled_then_tick_and_sessions_are_reported() {
    let base_url = support::ensure_server();
    let mut socket = connect().await;
    join(&mut socket, &unique_name()).await;

    let status: Value = reqwest::get(format!("{base_url}/status"))
        .await
        .expect("request should succeed")
        .json()
        .await
        .expect("status should be JSON");

    assert!(status["tick"].as_u64().expect("tick") >= 1);
    assert!(status["sessions"].as_u64().expect("sessions") >= 1);
}
