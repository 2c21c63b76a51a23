// End-to-end tests for the transfer worker, driven over the controller link
// exactly the way the control channel drives it.

use std::net::Ipv4Addr;
use std::sync::Arc;
use std::time::Duration;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::sync::Mutex;

use crate::constants::MSG_TRANSFER_FAIL;
use crate::core_transfer::envelope::{CommandCode, CommandFrame};
use crate::core_transfer::worker::TransferWorker;
use crate::ipc::{self, ControllerLink};
use crate::session::FtpSession;

fn spawn_worker() -> (Arc<Mutex<FtpSession>>, ControllerLink) {
    let session = Arc::new(Mutex::new(FtpSession::new(
        Ipv4Addr::LOCALHOST,
        Duration::from_secs(2),
    )));
    let (controller, worker_link) = ipc::link();
    TransferWorker::new(Arc::clone(&session), worker_link).spawn();
    (session, controller)
}

fn parse_pasv_content(content: &str) -> (Ipv4Addr, u16) {
    let inner = content
        .strip_prefix("Entering PASV mode (")
        .and_then(|s| s.strip_suffix(')'))
        .expect("canonical PASV reply");
    let fields: Vec<u16> = inner.split(',').map(|p| p.parse().unwrap()).collect();
    assert_eq!(fields.len(), 6);
    (
        Ipv4Addr::new(
            fields[0] as u8,
            fields[1] as u8,
            fields[2] as u8,
            fields[3] as u8,
        ),
        fields[4] * 256 + fields[5],
    )
}

/// PASV standby, then a client dial, then try-connect.
async fn open_data_connection(controller: &mut ControllerLink) -> TcpStream {
    let reply = controller
        .request(CommandFrame::request(CommandCode::PasvStandbyReq))
        .await
        .unwrap();
    assert!(reply.status, "pasv standby failed: {}", reply.content);
    let (ip, port) = parse_pasv_content(&reply.content);

    let client = TcpStream::connect((ip, port)).await.unwrap();

    let reply = controller
        .request(CommandFrame::request(CommandCode::TryConnectReq))
        .await
        .unwrap();
    assert!(reply.status, "try-connect failed: {}", reply.content);
    client
}

#[tokio::test]
async fn pasv_standby_advertises_the_listener() {
    let (session, mut controller) = spawn_worker();

    let reply = controller
        .request(CommandFrame::request(CommandCode::PasvStandbyReq))
        .await
        .unwrap();
    assert_eq!(reply.code().unwrap(), CommandCode::PasvStandbyRes);
    assert!(reply.status);

    let (ip, port) = parse_pasv_content(&reply.content);
    assert_eq!(ip, Ipv4Addr::LOCALHOST);
    assert_eq!(Some(port), session.lock().await.conn.listen_port());
}

#[tokio::test]
async fn port_standby_records_the_peer_endpoint() {
    let (session, mut controller) = spawn_worker();

    let reply = controller
        .request(CommandFrame::request_with(
            CommandCode::PortStandbyReq,
            "192,168,1,10,200,10\r\n",
        ))
        .await
        .unwrap();
    assert_eq!(reply.code().unwrap(), CommandCode::PortStandbyRes);
    assert!(reply.status);
    assert_eq!(reply.content, "PORT SUCCESS");

    let session = session.lock().await;
    assert_eq!(
        session.conn.peer_socket_addr().to_string(),
        "192.168.1.10:2760"
    );
}

#[tokio::test]
async fn port_standby_rejects_malformed_arguments() {
    let (_session, mut controller) = spawn_worker();

    let reply = controller
        .request(CommandFrame::request_with(
            CommandCode::PortStandbyReq,
            "not,a,port,argument",
        ))
        .await
        .unwrap();
    assert!(!reply.status);
    assert!(!reply.content.is_empty());
}

#[tokio::test]
async fn try_connect_is_idempotent_once_connected() {
    let (session, mut controller) = spawn_worker();
    let _client = open_data_connection(&mut controller).await;

    let reply = controller
        .request(CommandFrame::request(CommandCode::TryConnectReq))
        .await
        .unwrap();
    assert!(reply.status);
    assert!(session.lock().await.conn.data_stream.is_some());
}

#[tokio::test]
async fn try_connect_without_standby_fails_cleanly() {
    let (session, mut controller) = spawn_worker();

    let reply = controller
        .request(CommandFrame::request(CommandCode::TryConnectReq))
        .await
        .unwrap();
    assert_eq!(reply.code().unwrap(), CommandCode::TryConnectRes);
    assert!(!reply.status);
    assert!(session.lock().await.conn.data_stream.is_none());
}

#[tokio::test]
async fn download_streams_the_whole_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("payload.bin");
    let payload: Vec<u8> = (0..10_000u32).map(|i| (i % 251) as u8).collect();
    std::fs::write(&path, &payload).unwrap();

    let (session, mut controller) = spawn_worker();
    let mut client = open_data_connection(&mut controller).await;

    let reader = tokio::spawn(async move {
        let mut received = Vec::new();
        client.read_to_end(&mut received).await.unwrap();
        received
    });

    let reply = controller
        .request(CommandFrame::request_with(
            CommandCode::FileDownloadReq,
            path.to_str().unwrap(),
        ))
        .await
        .unwrap();
    assert_eq!(reply.code().unwrap(), CommandCode::FileDownloadRes);
    assert!(reply.status);
    assert_eq!(reply.content, "Transfer complete. Total 10000 bytes.");

    assert_eq!(reader.await.unwrap(), payload);
    // the data socket is released on completion
    assert!(session.lock().await.conn.data_stream.is_none());
}

#[tokio::test]
async fn download_of_a_missing_file_fails_without_a_connection() {
    let (session, mut controller) = spawn_worker();

    let reply = controller
        .request(CommandFrame::request_with(
            CommandCode::FileDownloadReq,
            "/no/such/file/anywhere",
        ))
        .await
        .unwrap();
    assert!(!reply.status);
    assert_eq!(reply.content, MSG_TRANSFER_FAIL);
    assert!(session.lock().await.conn.data_stream.is_none());
}

#[tokio::test]
async fn upload_appends_what_the_client_sends() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("incoming.bin");
    let payload: Vec<u8> = (0..5_000u32).map(|i| (i % 241) as u8).collect();

    let (session, mut controller) = spawn_worker();
    let mut client = open_data_connection(&mut controller).await;

    let body = payload.clone();
    let writer = tokio::spawn(async move {
        client.write_all(&body).await.unwrap();
        client.shutdown().await.unwrap();
        // keep the socket alive until the worker has drained it
        let mut sink = Vec::new();
        let _ = client.read_to_end(&mut sink).await;
    });

    let reply = controller
        .request(CommandFrame::request_with(
            CommandCode::FileUploadReq,
            path.to_str().unwrap(),
        ))
        .await
        .unwrap();
    assert_eq!(reply.code().unwrap(), CommandCode::FileUploadRes);
    assert!(reply.status);
    assert_eq!(reply.content, "Transfer complete. Total 5000 bytes.");

    writer.await.unwrap();
    assert_eq!(std::fs::read(&path).unwrap(), payload);
    assert!(session.lock().await.conn.data_stream.is_none());
}

#[tokio::test]
async fn abort_stops_a_stalled_download() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("large.bin");
    // large enough that the kernel socket buffers cannot swallow it while
    // the client refuses to read
    std::fs::write(&path, vec![0u8; 32 * 1024 * 1024]).unwrap();

    let (session, mut controller) = spawn_worker();
    let _client = open_data_connection(&mut controller).await;

    controller
        .notify(CommandFrame::request_with(
            CommandCode::FileDownloadReq,
            path.to_str().unwrap(),
        ))
        .await
        .unwrap();

    // let the transfer wedge against the full socket buffers, then abort
    tokio::time::sleep(Duration::from_millis(300)).await;
    session.lock().await.request_abort();

    let reply = tokio::time::timeout(Duration::from_secs(2), controller.recv())
        .await
        .expect("abort must end the transfer within a poll interval")
        .unwrap();
    assert_eq!(reply.code().unwrap(), CommandCode::FileDownloadRes);
    assert!(!reply.status);
    assert_eq!(reply.content, MSG_TRANSFER_FAIL);

    let session = session.lock().await;
    // observed aborts are consumed so the next transfer starts clean
    assert!(!session.abort_pending());
    assert!(session.conn.data_stream.is_none());
}

#[tokio::test]
async fn abort_request_flags_the_next_transfer() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("payload.bin");
    std::fs::write(&path, b"0123456789").unwrap();

    let (session, mut controller) = spawn_worker();
    let _client = open_data_connection(&mut controller).await;

    // one-way abort while idle: no response, but the flag sticks
    controller
        .notify(CommandFrame::request(CommandCode::AbortReq))
        .await
        .unwrap();

    let reply = controller
        .request(CommandFrame::request_with(
            CommandCode::FileDownloadReq,
            path.to_str().unwrap(),
        ))
        .await
        .unwrap();
    assert!(!reply.status);
    assert_eq!(reply.content, MSG_TRANSFER_FAIL);
    assert!(!session.lock().await.abort_pending());
}

#[tokio::test]
async fn send_command_relays_to_the_client() {
    let (_session, mut controller) = spawn_worker();
    let mut client = open_data_connection(&mut controller).await;

    let reply = controller
        .request(CommandFrame::request_with(
            CommandCode::SendCommandReq,
            "hello over the data channel",
        ))
        .await
        .unwrap();
    assert_eq!(reply.code().unwrap(), CommandCode::SendCommandRes);
    assert!(reply.status);
    assert_eq!(reply.content, "Executing command.");

    // the client sees the request frame verbatim, in its wire form
    let mut buf = vec![0u8; 512];
    let n = client.read(&mut buf).await.unwrap();
    let relayed = CommandFrame::decode(&buf[..n]).unwrap();
    assert_eq!(relayed.code().unwrap(), CommandCode::SendCommandReq);
    assert_eq!(relayed.content, "hello over the data channel");
}

#[tokio::test]
async fn send_command_without_a_connection_reports_absence() {
    let (_session, mut controller) = spawn_worker();

    let reply = controller
        .request(CommandFrame::request_with(
            CommandCode::SendCommandReq,
            "nobody listening",
        ))
        .await
        .unwrap();
    assert!(!reply.status);
    assert!(reply.content.is_empty());
}
