// End-to-end exercise of the link task against a real local WebSocket
// server standing in for the robot.

use std::time::Duration;

use futures_util::StreamExt;
use tokio::net::TcpListener;
use tokio::time::timeout;
use tokio_tungstenite::accept_async;
use tokio_tungstenite::tungstenite::Message;

use rover_link::{CONTROL_PORT, LinkHandle, LinkState};
use rover_types::ControlState;

const WAIT: Duration = Duration::from_secs(5);

async fn next_json(
    server: &mut tokio_tungstenite::WebSocketStream<tokio::net::TcpStream>,
) -> serde_json::Value {
    loop {
        let message = timeout(WAIT, server.next())
            .await
            .expect("timed out waiting for a frame")
            .expect("server stream ended")
            .expect("server read failed");
        if let Message::Text(text) = message {
            return serde_json::from_str(&text).expect("frame is not valid JSON");
        }
    }
}

async fn wait_for_state(handle: &LinkHandle, wanted: LinkState) {
    let mut watch = handle.state_watch();
    timeout(WAIT, async {
        while *watch.borrow_and_update() != wanted {
            watch.changed().await.expect("link task gone");
        }
    })
    .await
    .unwrap_or_else(|_| panic!("link never reached {wanted:?}"));
}

#[tokio::test]
async fn connect_transmit_disconnect_roundtrip() {
    let listener = TcpListener::bind(("127.0.0.1", CONTROL_PORT))
        .await
        .expect("control port busy");

    let handle = LinkHandle::spawn();
    handle.set_endpoint("127.0.0.1");
    handle.connect();

    let (stream, _) = timeout(WAIT, listener.accept())
        .await
        .expect("no connection attempt")
        .expect("accept failed");
    let mut server = accept_async(stream).await.expect("handshake failed");
    wait_for_state(&handle, LinkState::Open).await;

    // The first frame on open is the all-neutral default state.
    let first = next_json(&mut server).await;
    assert_eq!(first["throttle"], 0.0);
    assert_eq!(first["steer"], 0.0);
    assert_eq!(first["rx"], 0.0);
    assert_eq!(first["ry"], 0.0);
    assert_eq!(first["button_x"], false);
    assert_eq!(first["button_y"], false);
    assert_eq!(first["toggle_mode"], false);

    // A transmitted snapshot arrives with its values intact.
    let state = ControlState {
        throttle: 1.0,
        steer: -0.5,
        button_x: true,
        ..ControlState::default()
    };
    handle.transmit(state);
    let frame = next_json(&mut server).await;
    assert_eq!(frame["throttle"], 1.0);
    assert_eq!(frame["steer"], -0.5);
    assert_eq!(frame["button_x"], true);

    // Disconnect closes the socket from our side.
    handle.disconnect();
    wait_for_state(&handle, LinkState::Disconnected).await;
    let saw_close = timeout(WAIT, async {
        loop {
            match server.next().await {
                Some(Ok(Message::Close(_))) | None => break,
                Some(Ok(_)) => {}
                Some(Err(_)) => break,
            }
        }
    })
    .await;
    assert!(saw_close.is_ok(), "server never observed the close");

    // Snapshots sent while disconnected are dropped silently.
    handle.transmit(ControlState::default());
    assert_eq!(handle.state(), LinkState::Disconnected);

    handle.shutdown();
}
