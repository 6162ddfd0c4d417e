//! Single-writer, single-reader "latest value" cells.
//!
//! Producers (audio decoding, hand tracking) publish whenever they have a new
//! value; the frame loop reads without ever blocking. If the producer happens
//! to hold the lock, or nothing new was published, the reader keeps the value
//! it saw last.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, TryLockError};

struct Shared<T> {
    /// Value and the version it was published under.
    value: Mutex<(T, u64)>,
    /// Copy of the latest version, so a reader can skip the lock when nothing
    /// changed.
    version: AtomicU64,
}

/// Writing half of a published cell.
pub struct Publisher<T> {
    shared: Arc<Shared<T>>,
}

/// Reading half of a published cell. Caches the last value seen.
pub struct Subscriber<T> {
    shared: Arc<Shared<T>>,
    cached: T,
    seen: u64,
}

/// Create a cell holding `initial`.
pub fn publish_cell<T: Clone>(initial: T) -> (Publisher<T>, Subscriber<T>) {
    let shared = Arc::new(Shared {
        value: Mutex::new((initial.clone(), 0)),
        version: AtomicU64::new(0),
    });
    (
        Publisher {
            shared: Arc::clone(&shared),
        },
        Subscriber {
            shared,
            cached: initial,
            seen: 0,
        },
    )
}

impl<T> Publisher<T> {
    pub fn publish(&self, value: T) {
        let mut guard = match self.shared.value.lock() {
            Ok(g) => g,
            Err(poisoned) => poisoned.into_inner(),
        };
        let version = guard.1.wrapping_add(1);
        *guard = (value, version);
        self.shared.version.store(version, Ordering::Release);
    }

    /// True once the reading half has been dropped.
    pub fn is_orphaned(&self) -> bool {
        Arc::strong_count(&self.shared) < 2
    }
}

impl<T: Clone> Subscriber<T> {
    /// Latest value and whether it was published since the previous call.
    pub fn latest(&mut self) -> (&T, bool) {
        let version = self.shared.version.load(Ordering::Acquire);
        if version == self.seen {
            return (&self.cached, false);
        }
        let (value, version) = match self.shared.value.try_lock() {
            Ok(g) => g.clone(),
            Err(TryLockError::Poisoned(p)) => p.into_inner().clone(),
            Err(TryLockError::WouldBlock) => return (&self.cached, false),
        };
        if version == self.seen {
            return (&self.cached, false);
        }
        self.cached = value;
        self.seen = version;
        (&self.cached, true)
    }

    /// Latest value, ignoring freshness.
    pub fn get(&mut self) -> T {
        self.latest().0.clone()
    }

    /// Last value returned, without checking for a new one.
    pub fn cached(&self) -> &T {
        &self.cached
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn reader_sees_initial_then_published_values() {
        let (tx, mut rx) = publish_cell(1.0f32);
        assert_eq!(rx.latest(), (&1.0, false));
        tx.publish(0.25);
        assert_eq!(rx.latest(), (&0.25, true));
        assert_eq!(rx.latest(), (&0.25, false));
    }

    #[test]
    fn reader_keeps_cached_value_while_writer_holds_lock() {
        let (tx, mut rx) = publish_cell(3u32);
        tx.publish(4);
        let guard = tx.shared.value.lock().unwrap();
        assert_eq!(rx.latest(), (&3, false));
        drop(guard);
        assert_eq!(rx.latest(), (&4, true));
    }

    #[test]
    fn publishes_across_threads() {
        let (tx, mut rx) = publish_cell(0usize);
        let handle = thread::spawn(move || {
            for i in 1..=100 {
                tx.publish(i);
            }
        });
        handle.join().unwrap();
        assert_eq!(rx.get(), 100);
    }

    #[test]
    fn each_published_value_is_fresh_at_most_once() {
        let (tx, mut rx) = publish_cell(0u32);
        let writer = thread::spawn(move || {
            for i in 1..=20_000 {
                tx.publish(i);
            }
        });
        let mut last_fresh = 0;
        while !writer.is_finished() {
            let (&v, fresh) = rx.latest();
            if fresh {
                assert!(v > last_fresh, "{v} reported fresh twice");
                last_fresh = v;
            }
        }
        writer.join().unwrap();
        let (&v, fresh) = rx.latest();
        if fresh {
            assert!(v > last_fresh);
        }
        assert_eq!(v, 20_000);
        assert_eq!(rx.latest(), (&20_000, false));
    }

    #[test]
    fn orphaned_after_reader_dropped() {
        let (tx, rx) = publish_cell(());
        assert!(!tx.is_orphaned());
        drop(rx);
        assert!(tx.is_orphaned());
    }
}
