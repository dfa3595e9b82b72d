//! In-process process group: one endpoint per rank, wired with channels.
//!
//! Every endpoint owns an unbounded mailbox and holds a sender to every
//! mailbox in the group (its own included, so `P = 1` works unchanged).
//! Sends never block; receives match on `(source, tag)` and park anything
//! else in a pending queue until a matching receive is posted.
//!
//! Collectives are built from point-to-point messages, root-centric and
//! linear: the root talks to every other rank in rank order.
//!
//! ```text
//!   rank 0            rank 1            rank 2
//!   ┌──────┐          ┌──────┐          ┌──────┐
//!   │inbox │◄─────────┤      ├─────────►│inbox │
//!   │      ├─────────►│inbox │◄─────────┤      │
//!   └──────┘          └──────┘          └──────┘
//!        ▲                 ▲                 ▲
//!        └──────── abort (watch) ────────────┘
//! ```

use crate::error::EnvError;
use crate::group::ProcessGroup;
use crate::types::{Envelope, Rank, Tag};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::Arc;
use tokio::sync::{mpsc, watch, Mutex};

/// Builder for an in-process group of `size` ranks.
pub struct LocalGroup {
    endpoints: Vec<LocalEndpoint>,
    abort: GroupAbort,
}

impl LocalGroup {
    /// Creates a fully connected group of `size` endpoints.
    pub fn new(size: usize) -> Self {
        let (abort_tx, abort_rx) = watch::channel(None::<String>);
        let abort_tx = Arc::new(abort_tx);

        let mut senders = Vec::with_capacity(size);
        let mut receivers = Vec::with_capacity(size);
        for _ in 0..size {
            let (tx, rx) = mpsc::unbounded_channel::<Envelope>();
            senders.push(tx);
            receivers.push(rx);
        }

        let endpoints = receivers
            .into_iter()
            .enumerate()
            .map(|(index, rx)| LocalEndpoint {
                rank: Rank::from_index(index),
                size,
                peers: senders.clone(),
                inbox: Mutex::new(Inbox {
                    rx,
                    pending: VecDeque::new(),
                }),
                abort_tx: Arc::clone(&abort_tx),
                abort_rx: abort_rx.clone(),
            })
            .collect();

        Self {
            endpoints,
            abort: GroupAbort { tx: abort_tx },
        }
    }

    /// Returns the number of ranks.
    pub fn size(&self) -> usize {
        self.endpoints.len()
    }

    /// Returns a handle able to abort the group from outside any rank.
    pub fn abort_handle(&self) -> GroupAbort {
        self.abort.clone()
    }

    /// Consumes the builder, yielding the endpoints in rank order.
    pub fn into_endpoints(self) -> Vec<LocalEndpoint> {
        self.endpoints
    }
}

/// Aborts a local group from outside (e.g. when a rank task panics).
#[derive(Clone)]
pub struct GroupAbort {
    tx: Arc<watch::Sender<Option<String>>>,
}

impl GroupAbort {
    /// Aborts the group; the first reason wins.
    pub fn abort(&self, reason: &str) {
        self.tx.send_if_modified(|current| {
            if current.is_none() {
                *current = Some(reason.to_string());
                true
            } else {
                false
            }
        });
    }

    /// Returns the abort reason, if the group was aborted.
    pub fn reason(&self) -> Option<String> {
        self.tx.borrow().clone()
    }
}

struct Inbox {
    rx: mpsc::UnboundedReceiver<Envelope>,
    pending: VecDeque<Envelope>,
}

/// One rank's view of a [`LocalGroup`].
pub struct LocalEndpoint {
    rank: Rank,
    size: usize,
    peers: Vec<mpsc::UnboundedSender<Envelope>>,
    inbox: Mutex<Inbox>,
    abort_tx: Arc<watch::Sender<Option<String>>>,
    abort_rx: watch::Receiver<Option<String>>,
}

impl LocalEndpoint {
    fn check_rank(&self, rank: Rank) -> Result<(), EnvError> {
        if rank.index() < self.size {
            Ok(())
        } else {
            Err(EnvError::InvalidRank {
                rank,
                size: self.size,
            })
        }
    }

    fn check_aborted(&self) -> Result<(), EnvError> {
        match self.abort_rx.borrow().as_ref() {
            Some(reason) => Err(EnvError::aborted(reason.clone())),
            None => Ok(()),
        }
    }

    fn post(&self, dest: Rank, tag: Tag, payload: Vec<u8>) -> Result<(), EnvError> {
        self.check_aborted()?;
        self.check_rank(dest)?;
        self.peers[dest.index()]
            .send(Envelope::new(self.rank, tag, payload))
            .map_err(|_| EnvError::Disconnected { peer: dest })
    }

    async fn recv_matching(&self, source: Rank, tag: Tag) -> Result<Envelope, EnvError> {
        self.check_rank(source)?;

        let mut guard = self.inbox.lock().await;
        let Inbox { rx, pending } = &mut *guard;

        if let Some(pos) = pending.iter().position(|e| e.matches(source, tag)) {
            if let Some(envelope) = pending.remove(pos) {
                return Ok(envelope);
            }
        }

        let mut abort_rx = self.abort_rx.clone();
        loop {
            let aborted = abort_rx.borrow_and_update().clone();
            if let Some(reason) = aborted {
                return Err(EnvError::aborted(reason));
            }

            let message = tokio::select! {
                message = rx.recv() => message,
                changed = abort_rx.changed() => {
                    if changed.is_err() {
                        return Err(EnvError::aborted("abort channel closed"));
                    }
                    continue;
                }
            };

            match message {
                Some(envelope) if envelope.matches(source, tag) => return Ok(envelope),
                Some(envelope) => pending.push_back(envelope),
                None => return Err(EnvError::Disconnected { peer: source }),
            }
        }
    }

    async fn recv_into(&self, source: Rank, tag: Tag, recv: &mut [u8]) -> Result<(), EnvError> {
        let envelope = self.recv_matching(source, tag).await?;
        copy_exact(tag, &envelope.payload, recv)
    }

    async fn all_reduce_bool(
        &self,
        local: bool,
        combine: fn(bool, bool) -> bool,
    ) -> Result<bool, EnvError> {
        let root = Rank::COORDINATOR;
        let mut word = [0u64];

        if self.rank == root {
            let mut acc = local;
            for index in 1..self.size {
                let mut flag = [0u8];
                self.recv_into(Rank::from_index(index), Tag::ALL_REDUCE, &mut flag)
                    .await?;
                acc = combine(acc, flag[0] != 0);
            }
            word[0] = acc as u64;
        } else {
            self.post(root, Tag::ALL_REDUCE, vec![local as u8])?;
        }

        self.broadcast(root, &mut word).await?;
        Ok(word[0] != 0)
    }
}

fn copy_exact(tag: Tag, payload: &[u8], recv: &mut [u8]) -> Result<(), EnvError> {
    if payload.len() != recv.len() {
        return Err(EnvError::CountMismatch {
            tag,
            expected: recv.len(),
            actual: payload.len(),
        });
    }
    recv.copy_from_slice(payload);
    Ok(())
}

fn encode_words(values: &[u64]) -> Vec<u8> {
    values.iter().flat_map(|v| v.to_le_bytes()).collect()
}

fn decode_words(bytes: &[u8], values: &mut [u64]) {
    for (value, chunk) in values.iter_mut().zip(bytes.chunks_exact(8)) {
        let mut word = [0u8; 8];
        word.copy_from_slice(chunk);
        *value = u64::from_le_bytes(word);
    }
}

#[async_trait]
impl ProcessGroup for LocalEndpoint {
    fn rank(&self) -> Rank {
        self.rank
    }

    fn size(&self) -> usize {
        self.size
    }

    async fn send_recv(
        &self,
        send: &[u8],
        dest: Rank,
        send_tag: Tag,
        recv: &mut [u8],
        source: Rank,
        recv_tag: Tag,
    ) -> Result<(), EnvError> {
        self.post(dest, send_tag, send.to_vec())?;
        self.recv_into(source, recv_tag, recv).await
    }

    async fn scatter(
        &self,
        root: Rank,
        parts: Option<(&[u8], &[usize])>,
        recv: &mut [u8],
    ) -> Result<(), EnvError> {
        self.check_rank(root)?;

        if self.rank != root {
            return self.recv_into(root, Tag::SCATTER, recv).await;
        }

        let (buf, counts) = parts.ok_or(EnvError::CountMismatch {
            tag: Tag::SCATTER,
            expected: recv.len(),
            actual: 0,
        })?;
        if counts.len() != self.size {
            return Err(EnvError::CountMismatch {
                tag: Tag::SCATTER,
                expected: self.size,
                actual: counts.len(),
            });
        }
        let total: usize = counts.iter().sum();
        if total != buf.len() {
            return Err(EnvError::CountMismatch {
                tag: Tag::SCATTER,
                expected: buf.len(),
                actual: total,
            });
        }

        let mut offset = 0;
        for (index, &count) in counts.iter().enumerate() {
            let part = &buf[offset..offset + count];
            offset += count;

            let dest = Rank::from_index(index);
            if dest == root {
                copy_exact(Tag::SCATTER, part, recv)?;
            } else {
                self.post(dest, Tag::SCATTER, part.to_vec())?;
            }
        }
        Ok(())
    }

    async fn broadcast(&self, root: Rank, values: &mut [u64]) -> Result<(), EnvError> {
        self.check_rank(root)?;

        if self.rank == root {
            let payload = encode_words(values);
            for index in (0..self.size).filter(|&i| i != root.index()) {
                self.post(Rank::from_index(index), Tag::BROADCAST, payload.clone())?;
            }
            return Ok(());
        }

        let envelope = self.recv_matching(root, Tag::BROADCAST).await?;
        if envelope.size() != values.len() * 8 {
            return Err(EnvError::CountMismatch {
                tag: Tag::BROADCAST,
                expected: values.len() * 8,
                actual: envelope.size(),
            });
        }
        decode_words(&envelope.payload, values);
        Ok(())
    }

    async fn reduce_sum(&self, root: Rank, local: u64) -> Result<Option<u64>, EnvError> {
        self.check_rank(root)?;

        if self.rank != root {
            self.post(root, Tag::REDUCE, local.to_le_bytes().to_vec())?;
            return Ok(None);
        }

        let mut total = local;
        for index in (0..self.size).filter(|&i| i != root.index()) {
            let mut word = [0u8; 8];
            self.recv_into(Rank::from_index(index), Tag::REDUCE, &mut word)
                .await?;
            total += u64::from_le_bytes(word);
        }
        Ok(Some(total))
    }

    async fn all_reduce_or(&self, local: bool) -> Result<bool, EnvError> {
        self.all_reduce_bool(local, |a, b| a || b).await
    }

    async fn all_reduce_and(&self, local: bool) -> Result<bool, EnvError> {
        self.all_reduce_bool(local, |a, b| a && b).await
    }

    fn abort(&self, reason: &str) {
        GroupAbort {
            tx: Arc::clone(&self.abort_tx),
        }
        .abort(reason);
    }
}
