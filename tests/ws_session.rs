mod support;

use futures_util::SinkExt;
use support::{join, next_update, own_position, send_input, send_text};
use tokio_tungstenite::tungstenite::Message;

// Read updates until `pred` holds for this player's position, bounded by `max_updates`.
async fn wait_for_position(
    client: &mut support::Client,
    id: &str,
    max_updates: usize,
    pred: impl Fn((f64, f64)) -> bool,
) -> (serde_json::Value, (f64, f64)) {
    for _ in 0..max_updates {
        let update = next_update(client).await;
        if let Some(pos) = own_position(&update, id) {
            if pred(pos) {
                return (update, pos);
            }
        }
    }
    panic!("position condition not met within {max_updates} updates");
}

#[tokio::test]
async fn test_init_precedes_updates_and_first_update_contains_new_player() {
    let (mut client, id) = join().await;

    assert!(!id.is_empty());
    let update = next_update(&mut client).await;

    assert!(update["timestamp"].as_u64().is_some());
    assert_eq!(own_position(&update, &id), Some((300.0, 300.0)));
    let me = &update["players"][id.as_str()];
    assert!(me["color"].as_str().is_some_and(|c| c.starts_with("hsl(")));
    assert!(me["score"].as_u64().is_some());
    let coins = update["coins"].as_array().expect("coins list");
    assert_eq!(coins.len(), 5);
    assert!(coins.iter().all(|c| c["id"].is_string()));
}

#[tokio::test]
async fn test_held_right_input_moves_player_five_units_per_tick() {
    let (mut client, id) = join().await;

    send_input(&mut client, false, true, false, false).await;
    let (_, (x, y)) = wait_for_position(&mut client, &id, 60, |(x, _)| x > 300.0).await;
    let next = next_update(&mut client).await;

    assert_eq!(own_position(&next, &id), Some((x + 5.0, y)));
    assert_eq!(y, 300.0);
}

#[tokio::test]
async fn test_malformed_messages_are_dropped_and_connection_stays_open() {
    let (mut client, id) = join().await;

    send_text(&mut client, "not json").await;
    send_text(&mut client, r#"{"type":"input","inputs":{"left":"yes"}}"#).await;
    send_text(&mut client, r#"{"type":"input"}"#).await;
    client
        .send(Message::binary(vec![0xff, 0x00, 0x13]))
        .await
        .expect("send should succeed");
    send_input(&mut client, false, false, false, true).await;

    let (_, (x, y)) = wait_for_position(&mut client, &id, 60, |(_, y)| y > 300.0).await;

    assert_eq!(x, 300.0);
    assert!(y > 300.0);
}

#[tokio::test]
async fn test_binary_json_input_is_accepted() {
    let (mut client, id) = join().await;
    let input = br#"{"type":"input","inputs":{"left":true,"right":false,"up":false,"down":false}}"#;

    client
        .send(Message::binary(input.to_vec()))
        .await
        .expect("send should succeed");

    let (_, (x, _)) = wait_for_position(&mut client, &id, 60, |(x, _)| x < 300.0).await;
    assert!(x < 300.0);
}

#[tokio::test]
async fn test_disconnected_player_disappears_from_other_clients_updates() {
    let (mut leaver, leaver_id) = join().await;
    let (mut watcher, _watcher_id) = join().await;

    // Wait until the watcher has seen the leaver at least once.
    let mut seen = false;
    for _ in 0..60 {
        let update = next_update(&mut watcher).await;
        if own_position(&update, &leaver_id).is_some() {
            seen = true;
            break;
        }
    }
    assert!(seen, "watcher never saw the other player");

    leaver.close(None).await.expect("close should succeed");

    let mut gone = false;
    for _ in 0..120 {
        let update = next_update(&mut watcher).await;
        if own_position(&update, &leaver_id).is_none() {
            gone = true;
            break;
        }
    }
    assert!(gone, "disconnected player still present in updates");
}
