use std::collections::HashMap;
use std::net::{IpAddr, Ipv4Addr, SocketAddr, SocketAddrV4};
use std::sync::Arc;
use std::time::Duration;

use log::{debug, info};
use thiserror::Error;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;

use crate::core_transfer::addr;

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("failed to bind passive listener: {0}")]
    Bind(#[source] std::io::Error),
    #[error("no passive listener or peer endpoint armed")]
    NotArmed,
    #[error("accept on passive listener failed: {0}")]
    Accept(#[source] std::io::Error),
    #[error("connect to peer failed: {0}")]
    Connect(#[source] std::io::Error),
    #[error("data connection attempt timed out")]
    Timeout,
}

/// How the data connection gets established for the next transfer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionMode {
    /// Server listens, client connects (PASV).
    Passive,
    /// Client listens, server connects (PORT).
    Active,
}

/// Per-connection network state shared between the control and data paths.
///
/// `listener` is only set while a passive standby is armed; an armed active
/// endpoint and an armed listener are mutually exclusive. `data_stream` is
/// `None` whenever no data connection is open.
#[derive(Debug)]
pub struct Connection {
    pub data_stream: Option<Arc<Mutex<TcpStream>>>,
    pub listener: Option<TcpListener>,
    pub peer_ip: u32,
    pub peer_port: u16,
    pub local_ip: Ipv4Addr,
    pub timeout: Duration,
    pub alive: bool,
    mode: Option<ConnectionMode>,
}

impl Connection {
    pub fn new(local_ip: Ipv4Addr, timeout: Duration) -> Self {
        Self {
            data_stream: None,
            listener: None,
            peer_ip: 0,
            peer_port: 0,
            local_ip,
            timeout,
            alive: true,
            mode: None,
        }
    }

    /// Arms the connection for `mode`. Passive binds an ephemeral listener on
    /// the local address; active only records that the stored peer endpoint
    /// will be dialed. Arming either mode disarms the other.
    pub async fn create(&mut self, mode: ConnectionMode) -> Result<(), SessionError> {
        match mode {
            ConnectionMode::Passive => {
                let listener = TcpListener::bind((IpAddr::V4(self.local_ip), 0))
                    .await
                    .map_err(SessionError::Bind)?;
                debug!(
                    "passive listener bound on {}",
                    listener.local_addr().map_err(SessionError::Bind)?
                );
                self.listener = Some(listener);
            }
            ConnectionMode::Active => {
                self.listener = None;
            }
        }
        self.mode = Some(mode);
        Ok(())
    }

    /// Establishes the data connection for whichever mode is armed: accept
    /// for passive, connect for active. A connection that is already open is
    /// left untouched, so repeated calls are harmless.
    pub async fn contact(&mut self) -> Result<(), SessionError> {
        if self.data_stream.is_some() {
            return Ok(());
        }

        match self.mode.take() {
            Some(ConnectionMode::Passive) => {
                let listener = self.listener.take().ok_or(SessionError::NotArmed)?;
                let accepted = tokio::time::timeout(self.timeout, listener.accept())
                    .await
                    .map_err(|_| SessionError::Timeout)?
                    .map_err(SessionError::Accept)?;
                let (stream, peer) = accepted;
                if let SocketAddr::V4(peer) = peer {
                    self.peer_ip = addr::pack_octets(peer.ip().octets());
                    self.peer_port = peer.port();
                }
                info!("data connection accepted from {}", peer);
                self.data_stream = Some(Arc::new(Mutex::new(stream)));
            }
            Some(ConnectionMode::Active) => {
                let target = self.peer_socket_addr();
                let stream = tokio::time::timeout(self.timeout, TcpStream::connect(target))
                    .await
                    .map_err(|_| SessionError::Timeout)?
                    .map_err(SessionError::Connect)?;
                info!("data connection established to {}", target);
                self.data_stream = Some(Arc::new(Mutex::new(stream)));
            }
            None => return Err(SessionError::NotArmed),
        }
        Ok(())
    }

    /// The peer endpoint recorded by PORT negotiation, as a socket address.
    pub fn peer_socket_addr(&self) -> SocketAddrV4 {
        let o = addr::unpack_octets(self.peer_ip);
        SocketAddrV4::new(Ipv4Addr::new(o[0], o[1], o[2], o[3]), self.peer_port)
    }

    /// Port of the armed passive listener, if one is armed.
    pub fn listen_port(&self) -> Option<u16> {
        self.listener
            .as_ref()
            .and_then(|l| l.local_addr().ok())
            .map(|a| a.port())
    }

    /// Removes and returns the data stream; dropping the returned handle
    /// closes the socket once the streaming engines release their clone.
    pub fn take_data_stream(&mut self) -> Option<Arc<Mutex<TcpStream>>> {
        self.data_stream.take()
    }
}

/// One FTP client session: the shared connection state plus the cooperative
/// abort signal observed by in-flight transfers.
#[derive(Debug)]
pub struct FtpSession {
    pub conn: Connection,
    abort: CancellationToken,
}

impl FtpSession {
    pub fn new(local_ip: Ipv4Addr, timeout: Duration) -> Self {
        Self {
            conn: Connection::new(local_ip, timeout),
            abort: CancellationToken::new(),
        }
    }

    /// The current abort token. Streaming engines clone it once per transfer
    /// and check it between chunks.
    pub fn abort_token(&self) -> CancellationToken {
        self.abort.clone()
    }

    /// Requests that the transfer in flight (or the next one started) stops.
    pub fn request_abort(&self) {
        self.abort.cancel();
    }

    /// Consumes an observed abort so a later transfer is not falsely
    /// aborted. Returns whether an abort was pending.
    pub fn take_abort(&mut self) -> bool {
        if self.abort.is_cancelled() {
            self.abort = CancellationToken::new();
            true
        } else {
            false
        }
    }

    pub fn abort_pending(&self) -> bool {
        self.abort.is_cancelled()
    }
}

/// Registry of live sessions keyed by control-connection peer address. The
/// watchdog walks it; the server inserts on accept and removes on hangup.
pub struct SessionManager {
    sessions: HashMap<SocketAddr, Arc<Mutex<FtpSession>>>,
}

impl SessionManager {
    pub fn new() -> Self {
        Self {
            sessions: HashMap::new(),
        }
    }

    pub fn insert(&mut self, peer: SocketAddr, session: Arc<Mutex<FtpSession>>) {
        self.sessions.insert(peer, session);
    }

    pub fn remove(&mut self, peer: &SocketAddr) {
        self.sessions.remove(peer);
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&SocketAddr, &Arc<Mutex<FtpSession>>)> {
        self.sessions.iter()
    }

    pub fn retain<F>(&mut self, keep: F)
    where
        F: FnMut(&SocketAddr, &mut Arc<Mutex<FtpSession>>) -> bool,
    {
        self.sessions.retain(keep);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_session() -> FtpSession {
        FtpSession::new(Ipv4Addr::LOCALHOST, Duration::from_secs(1))
    }

    #[test]
    fn abort_is_consumed_once_observed() {
        let mut session = test_session();
        assert!(!session.take_abort());

        session.request_abort();
        assert!(session.abort_pending());
        assert!(session.take_abort());

        // the next transfer starts clean
        assert!(!session.abort_pending());
        assert!(!session.take_abort());
    }

    #[test]
    fn peer_endpoint_survives_packing() {
        let mut session = test_session();
        session.conn.peer_ip = addr::pack_octets([192, 168, 1, 10]);
        session.conn.peer_port = 2760;
        assert_eq!(
            session.conn.peer_socket_addr(),
            SocketAddrV4::new(Ipv4Addr::new(192, 168, 1, 10), 2760)
        );
    }

    #[tokio::test]
    async fn contact_without_standby_is_an_error() {
        let mut session = test_session();
        assert!(matches!(
            session.conn.contact().await,
            Err(SessionError::NotArmed)
        ));
    }

    #[tokio::test]
    async fn passive_create_arms_a_listener() {
        let mut session = test_session();
        session.conn.create(ConnectionMode::Passive).await.unwrap();
        let port = session.conn.listen_port().unwrap();
        assert_ne!(port, 0);

        // arming active mode afterwards disarms the listener
        session.conn.create(ConnectionMode::Active).await.unwrap();
        assert!(session.conn.listen_port().is_none());
    }

    #[tokio::test]
    async fn passive_contact_accepts_and_records_peer() {
        let mut session = test_session();
        session.conn.create(ConnectionMode::Passive).await.unwrap();
        let port = session.conn.listen_port().unwrap();

        let dial = tokio::spawn(async move {
            TcpStream::connect((Ipv4Addr::LOCALHOST, port)).await.unwrap()
        });
        session.conn.contact().await.unwrap();
        let client = dial.await.unwrap();

        assert!(session.conn.data_stream.is_some());
        assert!(session.conn.listener.is_none());
        assert_eq!(
            addr::unpack_octets(session.conn.peer_ip),
            [127, 0, 0, 1]
        );
        assert_eq!(session.conn.peer_port, client.local_addr().unwrap().port());

        // a second contact on a connected session is a no-op
        session.conn.contact().await.unwrap();
        assert!(session.conn.data_stream.is_some());
    }

    #[tokio::test]
    async fn active_contact_dials_the_recorded_peer() {
        let listener = TcpListener::bind((Ipv4Addr::LOCALHOST, 0)).await.unwrap();
        let port = listener.local_addr().unwrap().port();

        let mut session = test_session();
        session.conn.peer_ip = addr::pack_octets([127, 0, 0, 1]);
        session.conn.peer_port = port;
        session.conn.create(ConnectionMode::Active).await.unwrap();

        let accept = tokio::spawn(async move { listener.accept().await.unwrap() });
        session.conn.contact().await.unwrap();
        accept.await.unwrap();
        assert!(session.conn.data_stream.is_some());
    }
}
