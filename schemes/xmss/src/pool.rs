//! Lookahead pool of fast signers derived from one base seed.
//!
//! Tree `i` of the pool uses the seed
//!
//! ```text
//! s = SHA2-256(lower_hex(base_seed) || decimal(i + 1))
//! seed = s || s[0..16]
//! ```
//!
//! A background producer thread builds trees in increasing index order and
//! hands them over through a channel, so a consumer usually finds the next
//! tree ready. The producer takes a permit before building each tree and
//! the consumer returns it when the tree is handed out, so the number of
//! built trees not yet handed out never exceeds the capacity.

use crate::descriptor::AddrFormat;
use crate::error::{Result, XmssError};
use crate::fast::XmssFast;
use crate::hash::HashFunction;
use crate::hashing::sha2_256;
use crate::params::{XmssParams, SEED_SIZE};
use crossbeam_channel::{bounded, Receiver, Sender, TryRecvError};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use tracing::{debug, trace, warn};
use zeroize::Zeroizing;

/// Pool construction parameters.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PoolConfig {
    /// Height of every tree
    pub height: u8,
    /// Index of the first tree handed out
    pub start_index: u64,
    /// Built trees kept ahead of the consumer; 0 disables the producer
    pub capacity: usize,
    /// Hash family of every tree
    pub hash_function: HashFunction,
}

impl Default for PoolConfig {
    fn default() -> Self {
        PoolConfig {
            height: 10,
            start_index: 0,
            capacity: 3,
            hash_function: HashFunction::Shake128,
        }
    }
}

impl PoolConfig {
    /// Sets the tree height.
    pub fn with_height(mut self, height: u8) -> Self {
        self.height = height;
        self
    }

    /// Sets the index of the first tree.
    pub fn with_start_index(mut self, start_index: u64) -> Self {
        self.start_index = start_index;
        self
    }

    /// Sets the lookahead capacity.
    pub fn with_capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity;
        self
    }

    /// Sets the hash family.
    pub fn with_hash_function(mut self, hash_function: HashFunction) -> Self {
        self.hash_function = hash_function;
        self
    }
}

fn tree_seed(base_seed: &[u8], index: u64) -> Zeroizing<[u8; SEED_SIZE]> {
    let mut material = Zeroizing::new(hex::encode(base_seed));
    material.push_str(&(index + 1).to_string());
    let digest = Zeroizing::new(sha2_256(material.as_bytes()));

    let mut seed = Zeroizing::new([0u8; SEED_SIZE]);
    seed[..32].copy_from_slice(&digest[..]);
    seed[32..].copy_from_slice(&digest[..16]);
    seed
}

fn build_tree(base_seed: &[u8], config: &PoolConfig, index: u64) -> Result<XmssFast> {
    let seed = tree_seed(base_seed, index);
    XmssFast::new(
        &seed[..],
        config.height,
        config.hash_function,
        AddrFormat::Sha256_2x,
    )
}

type Produced = (u64, Result<XmssFast>);

/// Pool of precomputed XMSS trees.
pub struct XmssPool {
    base_seed: Zeroizing<Vec<u8>>,
    config: PoolConfig,
    cursor: u64,
    receiver: Option<Receiver<Produced>>,
    permits: Option<Sender<()>>,
    ready: Option<Produced>,
    lookahead: Arc<AtomicUsize>,
    stop: Arc<AtomicBool>,
}

impl XmssPool {
    /// Creates a pool and starts its producer.
    ///
    /// # Errors
    ///
    /// `InvalidParameter` for an unsupported height.
    pub fn new(base_seed: &[u8], config: PoolConfig) -> Result<Self> {
        XmssParams::new(config.height)?;

        let base_seed = Zeroizing::new(base_seed.to_vec());
        let stop = Arc::new(AtomicBool::new(false));
        let lookahead = Arc::new(AtomicUsize::new(0));
        let (receiver, permits) = if config.capacity == 0 {
            (None, None)
        } else {
            let (sender, receiver) = bounded(config.capacity);
            let (permit_sender, permit_receiver) = bounded(config.capacity);
            for _ in 0..config.capacity {
                if permit_sender.try_send(()).is_err() {
                    break;
                }
            }
            let producer = Producer {
                base_seed: base_seed.clone(),
                config,
                sender,
                permits: permit_receiver,
                lookahead: Arc::clone(&lookahead),
                stop: Arc::clone(&stop),
            };
            match thread::Builder::new()
                .name("xmss-pool-producer".into())
                .spawn(move || producer.run())
            {
                Ok(_) => (Some(receiver), Some(permit_sender)),
                Err(err) => {
                    warn!(error = %err, "xmss pool producer failed to start, building on demand");
                    (None, None)
                }
            }
        };

        debug!(
            height = config.height,
            start_index = config.start_index,
            capacity = config.capacity,
            "xmss pool created"
        );
        Ok(XmssPool {
            base_seed,
            config,
            cursor: config.start_index,
            receiver,
            permits,
            ready: None,
            lookahead,
            stop,
        })
    }

    /// Builds tree `index` of a pool directly, without a producer.
    ///
    /// Matches the tree a pool over `base_seed` with the height and hash
    /// family of `config` hands out at that index.
    pub fn tree_at(base_seed: &[u8], config: &PoolConfig, index: u64) -> Result<XmssFast> {
        build_tree(base_seed, config, index)
    }

    /// Pool parameters.
    pub fn config(&self) -> &PoolConfig {
        &self.config
    }

    /// Index of the next tree to be handed out.
    pub fn current_index(&self) -> u64 {
        self.cursor
    }

    /// Trees the producer has built that are not handed out yet.
    ///
    /// Never exceeds the configured capacity.
    pub fn lookahead(&self) -> usize {
        self.lookahead.load(Ordering::Acquire)
    }

    /// Whether a built tree is ready to be taken without waiting.
    pub fn is_available(&mut self) -> bool {
        if self.ready.is_some() {
            return true;
        }
        let Some(receiver) = &self.receiver else {
            return false;
        };
        match receiver.try_recv() {
            Ok(item) => {
                self.ready = Some(item);
                true
            }
            Err(TryRecvError::Empty) => false,
            Err(TryRecvError::Disconnected) => {
                self.producer_stopped();
                false
            }
        }
    }

    /// Takes the next tree, waiting for the producer if needed.
    ///
    /// Builds the tree in the calling thread when there is no producer.
    pub fn next_tree(&mut self) -> Result<XmssFast> {
        if let Some(item) = self.ready.take() {
            return self.take_produced(item);
        }
        let received = match &self.receiver {
            Some(receiver) => receiver.recv().ok(),
            None => None,
        };
        match received {
            Some(item) => self.take_produced(item),
            None => {
                if self.receiver.is_some() {
                    self.producer_stopped();
                }
                let item = (self.cursor, build_tree(&self.base_seed, &self.config, self.cursor));
                self.hand_over(item)
            }
        }
    }

    /// Takes the next tree if one is ready.
    ///
    /// # Errors
    ///
    /// `PoolEmpty` when the producer has not finished the next tree, and
    /// always for a pool without producer.
    pub fn try_next_tree(&mut self) -> Result<XmssFast> {
        if self.receiver.is_none() && self.ready.is_none() {
            return Err(XmssError::PoolEmpty);
        }
        if self.is_available() {
            return self.next_tree();
        }
        Err(XmssError::PoolEmpty)
    }

    fn take_produced(&mut self, item: Produced) -> Result<XmssFast> {
        self.lookahead.fetch_sub(1, Ordering::AcqRel);
        if let Some(permits) = &self.permits {
            // Fails only once the producer is gone
            let _ = permits.try_send(());
        }
        self.hand_over(item)
    }

    fn hand_over(&mut self, (index, tree): Produced) -> Result<XmssFast> {
        debug_assert_eq!(index, self.cursor);
        self.cursor += 1;
        let tree = tree?;
        debug!(index, "xmss pool tree handed over");
        Ok(tree)
    }

    fn producer_stopped(&mut self) {
        warn!(index = self.cursor, "xmss pool producer stopped, building on demand");
        self.receiver = None;
        self.permits = None;
    }
}

impl Drop for XmssPool {
    fn drop(&mut self) {
        self.stop.store(true, Ordering::Relaxed);
        // Unblocks a producer waiting for a permit or in send
        self.permits = None;
        self.receiver = None;
    }
}

struct Producer {
    base_seed: Zeroizing<Vec<u8>>,
    config: PoolConfig,
    sender: Sender<Produced>,
    permits: Receiver<()>,
    lookahead: Arc<AtomicUsize>,
    stop: Arc<AtomicBool>,
}

impl Producer {
    fn run(self) {
        let mut index = self.config.start_index;
        // Blocks while `capacity` built trees wait for the consumer
        while self.permits.recv().is_ok() {
            if self.stop.load(Ordering::Relaxed) {
                break;
            }
            let tree = build_tree(&self.base_seed, &self.config, index);
            self.lookahead.fetch_add(1, Ordering::AcqRel);
            trace!(index, "xmss pool tree built");
            if self.sender.send((index, tree)).is_err() {
                break;
            }
            index += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::signer::XmssSigner;

    const BASE_SEED: [u8; SEED_SIZE] = [0u8; SEED_SIZE];

    #[test]
    fn test_tree_seed_derivation() {
        let seed = tree_seed(&[0xAB, 0x01], 0);
        let expected = sha2_256(b"ab011");
        assert_eq!(&seed[..32], &expected);
        assert_eq!(&seed[32..], &expected[..16]);
    }

    #[test]
    fn test_synchronous_pool_matches_direct_build() {
        let config = PoolConfig::default().with_height(4).with_capacity(0);
        let mut pool = XmssPool::new(&BASE_SEED, config).unwrap();
        assert!(!pool.is_available());
        assert_eq!(pool.try_next_tree().err(), Some(XmssError::PoolEmpty));

        for i in 0..3 {
            assert_eq!(pool.current_index(), i);
            let tree = pool.next_tree().unwrap();
            let direct = XmssPool::tree_at(&BASE_SEED, &config, i).unwrap();
            assert_eq!(tree.public_key(), direct.public_key());
        }
    }

    #[test]
    fn test_producer_pool_order() {
        let config = PoolConfig::default()
            .with_height(4)
            .with_capacity(2)
            .with_start_index(5);
        let mut pool = XmssPool::new(&BASE_SEED, config).unwrap();

        let mut seen = Vec::new();
        for i in 5..9 {
            assert_eq!(pool.current_index(), i);
            let tree = pool.next_tree().unwrap();
            seen.push(tree.public_key());
            let direct = XmssPool::tree_at(&BASE_SEED, &config, i).unwrap();
            assert_eq!(tree.public_key(), direct.public_key());
        }
        seen.dedup();
        assert_eq!(seen.len(), 4);
    }

    #[test]
    fn test_stashed_tree_counts_against_capacity() {
        let config = PoolConfig::default().with_height(4).with_capacity(1);
        let mut pool = XmssPool::new(&BASE_SEED, config).unwrap();

        while !pool.is_available() {
            thread::sleep(std::time::Duration::from_millis(5));
        }
        thread::sleep(std::time::Duration::from_millis(300));
        assert_eq!(pool.lookahead(), 1);
        assert_eq!(pool.current_index(), 0);

        pool.next_tree().unwrap();
        assert!(pool.lookahead() <= 1);
    }

    #[test]
    fn test_invalid_height() {
        let config = PoolConfig::default().with_height(7);
        assert!(matches!(
            XmssPool::new(&BASE_SEED, config),
            Err(XmssError::InvalidParameter { .. })
        ));
    }

    #[test]
    fn test_default_config() {
        let config = PoolConfig::default();
        assert_eq!(config.height, 10);
        assert_eq!(config.start_index, 0);
        assert_eq!(config.capacity, 3);
        assert_eq!(config.hash_function, HashFunction::Shake128);
    }
}
