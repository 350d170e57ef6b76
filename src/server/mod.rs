//! # Módulo del Servidor HTTP
//! src/server/mod.rs
//!
//! Este módulo implementa el servidor TCP que:
//! 1. Escucha en un puerto (socket no bloqueante)
//! 2. Acepta una conexión a la vez
//! 3. Lee el request, lo despacha por el router y aplica CORS
//! 4. Envía la respuesta y cierra la conexión
//!
//! El loop corre hasta que alguien baja el [`RunningFlag`].

pub mod shutdown;
pub mod socket;
pub mod tcp;

// Re-exportar para facilitar el uso
pub use shutdown::RunningFlag;
pub use socket::{Accepted, SocketContext};
pub use tcp::{Server, READ_CHUNK_SIZE};
