use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use tokio::sync::{Semaphore, TryAcquireError};

use crate::error::FalseDbError;

/// Caps how many connections are checked out at once.
///
/// deadpool only shrinks its own limit while idle objects exist, so the
/// max-open setting is enforced here instead. Lowering the cap while permits
/// are out records a debt that returning permits pay off.
#[derive(Debug, Clone)]
pub(crate) struct OpenGate(Arc<GateInner>);

#[derive(Debug)]
struct GateInner {
    permits: Semaphore,
    debt: Mutex<usize>,
    waiting: AtomicUsize,
}

impl OpenGate {
    pub(crate) fn new(size: usize) -> Self {
        Self(Arc::new(GateInner {
            permits: Semaphore::new(size),
            debt: Mutex::new(0),
            waiting: AtomicUsize::new(0),
        }))
    }

    /// Take a slot, waiting for one if the cap is reached.
    ///
    /// # Errors
    /// `FalseDbError::Closed` once the gate is closed, including while waiting.
    pub(crate) async fn acquire(&self) -> Result<OpenPermit, FalseDbError> {
        let permit = match self.0.permits.try_acquire() {
            Ok(permit) => permit,
            Err(TryAcquireError::Closed) => return Err(FalseDbError::Closed),
            Err(TryAcquireError::NoPermits) => {
                let _waiting = Waiting::new(&self.0.waiting);
                self.0
                    .permits
                    .acquire()
                    .await
                    .map_err(|_| FalseDbError::Closed)?
            }
        };
        // released by hand so a lowered cap can keep it
        permit.forget();
        Ok(OpenPermit { gate: self.clone() })
    }

    /// Move the cap from `from` to `to` slots.
    pub(crate) fn resize(&self, from: usize, to: usize) {
        let mut debt = self.0.debt.lock().unwrap_or_else(PoisonError::into_inner);
        if to > from {
            let grow = to - from;
            let paid = grow.min(*debt);
            *debt -= paid;
            self.0.permits.add_permits(grow - paid);
        } else if to < from {
            let shrink = from - to;
            let forgotten = self.0.permits.forget_permits(shrink);
            *debt += shrink - forgotten;
        }
    }

    /// Callers currently blocked in [`OpenGate::acquire`].
    pub(crate) fn waiting(&self) -> usize {
        self.0.waiting.load(Ordering::Relaxed)
    }

    pub(crate) fn close(&self) {
        self.0.permits.close();
    }

    fn release(&self) {
        let mut debt = self.0.debt.lock().unwrap_or_else(PoisonError::into_inner);
        if *debt > 0 {
            *debt -= 1;
        } else {
            self.0.permits.add_permits(1);
        }
    }
}

/// One checked-out slot; returned on drop.
#[derive(Debug)]
pub(crate) struct OpenPermit {
    gate: OpenGate,
}

impl Drop for OpenPermit {
    fn drop(&mut self) {
        self.gate.release();
    }
}

struct Waiting<'a>(&'a AtomicUsize);

impl<'a> Waiting<'a> {
    fn new(counter: &'a AtomicUsize) -> Self {
        counter.fetch_add(1, Ordering::Relaxed);
        Self(counter)
    }
}

impl Drop for Waiting<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::Relaxed);
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    async fn blocks(gate: &OpenGate) -> bool {
        tokio::time::timeout(Duration::from_millis(20), gate.acquire())
            .await
            .is_err()
    }

    #[tokio::test]
    async fn full_gate_blocks_until_a_permit_returns() {
        let gate = OpenGate::new(1);
        let held = gate.acquire().await.unwrap();
        assert!(blocks(&gate).await);
        assert_eq!(gate.waiting(), 0);
        drop(held);
        assert!(gate.acquire().await.is_ok());
    }

    #[tokio::test]
    async fn shrinking_while_busy_is_paid_back_on_release() {
        let gate = OpenGate::new(3);
        let a = gate.acquire().await.unwrap();
        let b = gate.acquire().await.unwrap();
        gate.resize(3, 1);
        assert!(blocks(&gate).await);

        // first return pays the debt; the second frees the one slot
        drop(a);
        assert!(blocks(&gate).await);
        drop(b);
        let _c = gate.acquire().await.unwrap();
        assert!(blocks(&gate).await);
    }

    #[tokio::test]
    async fn growing_settles_debt_first() {
        let gate = OpenGate::new(2);
        let a = gate.acquire().await.unwrap();
        let _b = gate.acquire().await.unwrap();
        gate.resize(2, 0);
        gate.resize(0, 3);
        let _c = gate.acquire().await.unwrap();
        assert!(blocks(&gate).await);
        drop(a);
        assert!(gate.acquire().await.is_ok());
    }

    #[tokio::test]
    async fn close_wakes_waiters_with_closed() {
        let gate = OpenGate::new(1);
        let _held = gate.acquire().await.unwrap();
        let waiter = {
            let gate = gate.clone();
            tokio::spawn(async move { gate.acquire().await.map(drop) })
        };
        tokio::time::sleep(Duration::from_millis(10)).await;
        assert_eq!(gate.waiting(), 1);
        gate.close();
        assert_eq!(waiter.await.unwrap(), Err(FalseDbError::Closed));
    }
}
