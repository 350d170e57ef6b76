//! # Contexto de Sockets
//! src/server/socket.rs
//!
//! Dueño del socket de escucha y de la única conexión en curso.
//!
//! - El socket de escucha es **no bloqueante**: `accept_next` vuelve de
//!   inmediato con [`Accepted::WouldBlock`] si no hay nadie esperando, para
//!   que el loop pueda revisar el flag de apagado.
//! - La conexión aceptada es **bloqueante con timeout**: lecturas y escrituras
//!   esperan como máximo `recv_timeout` / `send_timeout`.

use crate::config::Config;
use crate::error::SetupError;
use socket2::{Domain, Protocol, Socket, Type};
use std::io::{self, Read, Write};
use std::net::{Shutdown, SocketAddr, TcpStream};
use std::time::Duration;
use tracing::{debug, error, info, warn};

/// Resultado de un intento de accept
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Accepted {
    /// Hay una conexión activa; `peer` es la dirección remota
    Connection(SocketAddr),
    /// No hay conexión lista (o hubo un error transitorio): reintentar
    WouldBlock,
}

/// La conexión que se está atendiendo
struct Connection {
    stream: TcpStream,
    peer: SocketAddr,
}

/// Socket de escucha + conexión actual
pub struct SocketContext {
    listener: Option<Socket>,
    local_addr: SocketAddr,
    current: Option<Connection>,
    recv_timeout: Duration,
    send_timeout: Duration,
}

impl SocketContext {
    /// Crea el socket de escucha en todas las interfaces
    ///
    /// Si algún paso falla, el socket a medio configurar se cierra al salir de
    /// esta función.
    pub fn initialize(config: &Config) -> Result<Self, SetupError> {
        let address = config.address();

        let socket = Socket::new(Domain::IPV4, Type::STREAM, Some(Protocol::TCP)).map_err(|e| {
            error!(error = %e, "Failed to create socket");
            SetupError::Socket(e)
        })?;

        socket.set_reuse_address(true).map_err(|e| {
            error!(error = %e, "Failed to set socket option SO_REUSEADDR");
            SetupError::Configure { option: "SO_REUSEADDR", source: e }
        })?;

        socket.bind(&address.into()).map_err(|e| {
            error!(port = config.port, error = %e, "Failed to bind socket");
            SetupError::Bind { port: config.port, source: e }
        })?;

        socket.set_read_timeout(Some(config.listen_timeout())).map_err(|e| {
            error!(error = %e, "Failed to set socket receive timeout");
            SetupError::Configure { option: "SO_RCVTIMEO", source: e }
        })?;

        socket.set_nonblocking(true).map_err(|e| {
            error!(error = %e, "Failed to set socket to non-blocking");
            SetupError::Configure { option: "O_NONBLOCK", source: e }
        })?;

        socket.listen(config.backlog).map_err(|e| {
            error!(error = %e, "Failed to listen on socket");
            SetupError::Listen(e)
        })?;

        let local_addr = socket
            .local_addr()
            .ok()
            .and_then(|addr| addr.as_socket())
            .unwrap_or(address);

        info!(port = local_addr.port(), "Listening on port {}", local_addr.port());

        Ok(Self {
            listener: Some(socket),
            local_addr,
            current: None,
            recv_timeout: config.recv_timeout(),
            send_timeout: config.send_timeout(),
        })
    }

    /// Dirección real del socket de escucha (útil con puerto 0)
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Acepta la siguiente conexión sin bloquear
    ///
    /// Nunca falla: los errores del sistema se loguean y se reportan como
    /// `WouldBlock` para que el loop reintente.
    pub fn accept_next(&mut self) -> Accepted {
        let Some(listener) = self.listener.as_ref() else {
            warn!("accept_next called after teardown");
            return Accepted::WouldBlock;
        };

        let (socket, addr) = match listener.accept() {
            Ok(pair) => pair,
            Err(e) if is_transient(&e) => return Accepted::WouldBlock,
            Err(e) => {
                warn!(error = %e, code = ?e.raw_os_error(), "Failed to accept connection");
                return Accepted::WouldBlock;
            }
        };

        if let Err(e) = self.configure_connection(&socket) {
            warn!(error = %e, "Failed to configure accepted connection");
            return Accepted::WouldBlock;
        }

        let peer = addr.as_socket().unwrap_or(self.local_addr);

        // Una conexión anterior sin cerrar no debería existir; se cierra igual
        self.close_current();
        self.current = Some(Connection {
            stream: socket.into(),
            peer,
        });

        debug!(%peer, "Accepted connection from {}", peer);
        Accepted::Connection(peer)
    }

    fn configure_connection(&self, socket: &Socket) -> io::Result<()> {
        // En algunas plataformas el socket aceptado hereda O_NONBLOCK
        socket.set_nonblocking(false)?;
        socket.set_read_timeout(Some(self.recv_timeout))?;
        socket.set_write_timeout(Some(self.send_timeout))?;
        Ok(())
    }

    /// Dirección remota de la conexión actual
    pub fn peer_addr(&self) -> Option<SocketAddr> {
        self.current.as_ref().map(|conn| conn.peer)
    }

    /// Cierra la conexión que se acaba de atender
    pub fn close_current(&mut self) {
        if let Some(conn) = self.current.take() {
            let _ = conn.stream.shutdown(Shutdown::Both);
            debug!(peer = %conn.peer, "Closed connection from {}", conn.peer);
        }
    }

    /// Escribe todo el buffer en la conexión actual
    pub fn send(&mut self, bytes: &[u8]) -> io::Result<usize> {
        let conn = self.current.as_mut().ok_or_else(not_connected)?;

        let result = conn
            .stream
            .write_all(bytes)
            .and_then(|_| conn.stream.flush());

        match result {
            Ok(()) => Ok(bytes.len()),
            Err(e) => {
                error!(peer = %conn.peer, error = %e, "Failed to send data");
                Err(e)
            }
        }
    }

    /// Lee lo que haya disponible en la conexión actual (bloquea hasta el timeout)
    pub fn receive(&mut self, buffer: &mut [u8]) -> io::Result<usize> {
        let conn = self.current.as_mut().ok_or_else(not_connected)?;

        conn.stream.read(buffer).map_err(|e| {
            error!(peer = %conn.peer, error = %e, "Failed to receive data");
            e
        })
    }

    /// Cierra el socket de escucha (y la conexión, si quedó alguna)
    ///
    /// Idempotente: solo la primera llamada cierra algo y retorna `true`.
    pub fn teardown(&mut self) -> bool {
        self.close_current();

        match self.listener.take() {
            Some(listener) => {
                // shutdown sobre un socket en listen puede fallar con ENOTCONN
                let _ = listener.shutdown(Shutdown::Both);
                drop(listener);
                info!(port = self.local_addr.port(), "Listening socket closed");
                true
            }
            None => false,
        }
    }

    pub fn is_listening(&self) -> bool {
        self.listener.is_some()
    }
}

impl Drop for SocketContext {
    fn drop(&mut self) {
        self.teardown();
    }
}

fn is_transient(e: &io::Error) -> bool {
    matches!(
        e.kind(),
        io::ErrorKind::WouldBlock | io::ErrorKind::TimedOut | io::ErrorKind::Interrupted
    )
}

fn not_connected() -> io::Error {
    io::Error::new(io::ErrorKind::NotConnected, "no active connection")
}
