//! # Cancelación Cooperativa
//! src/server/shutdown.rs
//!
//! El loop de despacho revisa este flag entre iteraciones. Código externo
//! (un handler de señales, un test) solo puede bajarlo; el teardown lo hace
//! el propio loop al salir.
//!
//! ```text
//! Idle ──start──► Running ──stop──► Stopped
//!   └────────────stop──────────────────┘
//! ```
//!
//! Un `stop` anterior a `start` no se pierde: `start` solo pasa de `Idle` a
//! `Running`, y el loop sale sin atender nada.

use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;

const IDLE: u8 = 0;
const RUNNING: u8 = 1;
const STOPPED: u8 = 2;

/// Flag compartido que mantiene vivo el loop del servidor
#[derive(Debug, Clone, Default)]
pub struct RunningFlag {
    inner: Arc<AtomicU8>,
}

impl RunningFlag {
    /// Crea un flag que todavía no arrancó
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_running(&self) -> bool {
        self.inner.load(Ordering::SeqCst) == RUNNING
    }

    /// `true` si alguien pidió el apagado (antes o después de arrancar)
    pub fn is_stopped(&self) -> bool {
        self.inner.load(Ordering::SeqCst) == STOPPED
    }

    /// Pide al loop que termine después de la iteración en curso
    pub fn stop(&self) {
        self.inner.store(STOPPED, Ordering::SeqCst);
    }

    /// Pasa a `Running` solo desde `Idle`; retorna `false` si ya se pidió el
    /// apagado o si ya estaba corriendo
    pub(crate) fn start(&self) -> bool {
        self.inner
            .compare_exchange(IDLE, RUNNING, Ordering::SeqCst, Ordering::SeqCst)
            .is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_starts_idle() {
        let flag = RunningFlag::new();
        assert!(!flag.is_running());
        assert!(!flag.is_stopped());
    }

    #[test]
    fn test_clones_share_state() {
        let flag = RunningFlag::new();
        let remote = flag.clone();

        assert!(flag.start());
        assert!(remote.is_running());

        remote.stop();
        assert!(!flag.is_running());
        assert!(flag.is_stopped());

        // Bajarlo de nuevo no tiene efecto adicional
        remote.stop();
        assert!(!flag.is_running());
    }

    #[test]
    fn test_stop_before_start_is_kept() {
        let flag = RunningFlag::new();
        flag.clone().stop();

        assert!(!flag.start());
        assert!(!flag.is_running());
        assert!(flag.is_stopped());
    }

    #[test]
    fn test_start_twice() {
        let flag = RunningFlag::new();
        assert!(flag.start());
        assert!(!flag.start());
        assert!(flag.is_running());
    }
}
