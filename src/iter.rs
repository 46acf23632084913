use crate::cancel::CancelToken;
use crossbeam_channel::{select, Sender};
use std::convert::Infallible;

/// Early-exit signal returned from iteration callbacks.
///
/// `Halt::Break` stops a traversal gracefully: `ShardMap::for_each` and
/// `ShardMap::for_each_locked` report success when they see it. `Halt::Err`
/// carries a callback error that is propagated unchanged.
///
/// Any `E` converts into `Halt<E>`, so `?` works inside callbacks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Halt<E = Infallible> {
    /// Stop iterating. Not an error.
    Break,
    /// Stop iterating and surface `E` to the caller.
    Err(E),
}

impl<E> From<E> for Halt<E> {
    fn from(err: E) -> Self {
        Halt::Err(err)
    }
}

/// Result type of an iteration callback.
pub type IterResult<E = Infallible> = Result<(), Halt<E>>;

/// Map a traversal outcome to the caller-facing result: Break is success.
pub(crate) fn finish<E>(result: Result<(), Halt<E>>) -> Result<(), E> {
    match result {
        Ok(()) | Err(Halt::Break) => Ok(()),
        Err(Halt::Err(err)) => Err(err),
    }
}

/// A key/value pair produced by channel iteration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Kv<K, V> {
    /// The entry's key.
    pub key: K,
    /// The entry's value at the time it was read.
    pub value: V,
}

/// Build the callback a channel producer hands to a traversal.
///
/// The token is checked before every send so an already-fired token yields
/// nothing. While the channel is full the producer waits on both the send and
/// the token. A dropped receiver also stops the traversal.
pub(crate) fn sender<'a, K, V>(
    tx: &'a Sender<Kv<K, V>>,
    cancel: &'a CancelToken,
) -> impl FnMut(&K, &V) -> IterResult + 'a
where
    K: Clone,
    V: Clone,
{
    move |key: &K, value: &V| -> IterResult {
        if cancel.is_cancelled() {
            return Err(Halt::Break);
        }
        let kv = Kv {
            key: key.clone(),
            value: value.clone(),
        };
        select! {
            send(tx, kv) -> res => res.map_err(|_| Halt::Break),
            recv(cancel.done()) -> _ => Err(Halt::Break),
        }
    }
}
