use std::time::Duration;

use tokio::net::UdpSocket;

use common::{Codec, DeviceType, Message, WireFormat};
use device::discovery::ResponderService;

async fn recv_with_timeout(socket: &UdpSocket, buf: &mut [u8]) -> usize {
    let recv = socket.recv_from(buf);
    tokio::select! {
        result = recv => result.unwrap().0,
        _ = tokio::time::sleep(Duration::from_secs(2)) => {
            panic!("timeout waiting for a response");
        }
    }
}

async fn spawn_responder(device_type: DeviceType, format: WireFormat) -> std::net::SocketAddr {
    let service = ResponderService::bind("127.0.0.1:0", device_type, format)
        .await
        .unwrap()
        .without_jitter();
    let addr = service.local_addr().unwrap();
    tokio::spawn(async move { service.run().await });
    addr
}

#[tokio::test]
async fn answers_a_text_request_with_its_type() {
    let responder = spawn_responder(DeviceType::Cam, WireFormat::Text).await;

    let client = UdpSocket::bind("127.0.0.1:0").await.unwrap();
    client.send_to(b"DISCOVER", responder).await.unwrap();

    let mut buf = vec![0u8; 128];
    let len = recv_with_timeout(&client, &mut buf).await;
    assert_eq!(&buf[..len], b"RESPONSE CAM");
}

#[tokio::test]
async fn answers_a_binary_request_with_its_ordinal() {
    let responder = spawn_responder(DeviceType::MotionSensor, WireFormat::Binary).await;
    let codec = Codec::new(WireFormat::Binary);

    let client = UdpSocket::bind("127.0.0.1:0").await.unwrap();
    client
        .send_to(&codec.encode_request(), responder)
        .await
        .unwrap();

    let mut buf = vec![0u8; 128];
    let len = recv_with_timeout(&client, &mut buf).await;
    match codec.decode(&buf[..len]).unwrap() {
        Message::Response(resp) => assert_eq!(resp.device_type, DeviceType::MotionSensor),
        other => panic!("expected a response, got {:?}", other),
    }
}

#[tokio::test]
async fn noise_is_ignored_and_the_next_request_still_answered() {
    let responder = spawn_responder(DeviceType::Router, WireFormat::Text).await;

    let client = UdpSocket::bind("127.0.0.1:0").await.unwrap();
    client.send_to(&[0xde, 0xad], responder).await.unwrap();
    client.send_to(b"RESPONSE HUB", responder).await.unwrap();
    client.send_to(b"DISCOVER", responder).await.unwrap();

    let mut buf = vec![0u8; 128];
    let len = recv_with_timeout(&client, &mut buf).await;
    assert_eq!(&buf[..len], b"RESPONSE ROUTER");
}
