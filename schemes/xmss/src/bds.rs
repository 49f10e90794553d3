//! BDS tree traversal for the fast signer.
//!
//! Keeps the authentication path of the next leaf ready so that a
//! signature costs (H - K) / 2 leaf computations on average instead of a
//! full tree rebuild. The algorithm is the one described by Buchmann,
//! Dahmen and Szydlo in "Post Quantum Cryptography" (Springer, 2009).
//!
//! # State
//!
//! - `auth`: the current authentication path (H nodes)
//! - `keep`: left nodes needed to form future parents (H / 2 nodes)
//! - `treehash`: one incremental treehash instance per level below H - K,
//!   sharing a single stack
//! - `retain`: right nodes of the top K levels, computed once at setup

use crate::hash::HashFunction;
use crate::params::{XmssParams, BDS_K, N};
use crate::tree::hash_children;
use crate::wots::derive_leaf;
use zeroize::Zeroize;

/// Key material needed to compute leaves and parents.
#[derive(Clone, Copy)]
struct LeafSource<'a> {
    hash_fn: HashFunction,
    sk_seed: &'a [u8; N],
    pub_seed: &'a [u8; N],
}

impl LeafSource<'_> {
    #[inline]
    fn leaf(&self, index: u32) -> [u8; N] {
        derive_leaf(self.hash_fn, self.sk_seed, self.pub_seed, index)
    }

    #[inline]
    fn parent(&self, left: &[u8; N], right: &[u8; N], height: u32, index: u32) -> [u8; N] {
        hash_children(self.hash_fn, left, right, self.pub_seed, height, index)
    }
}

#[derive(Clone, Copy, Debug)]
struct StackNode {
    level: u32,
    node: [u8; N],
}

/// Incremental treehash instance for one level of the tree.
#[derive(Clone, Debug)]
struct TreeHashInstance {
    height: u32,
    next_index: u32,
    stack_usage: usize,
    completed: bool,
    node: [u8; N],
}

/// Traversal state of a fast signer.
#[derive(Clone, Debug)]
pub struct BdsState {
    height: u32,
    updates_per_round: usize,
    stack: Vec<StackNode>,
    auth: Vec<[u8; N]>,
    keep: Vec<[u8; N]>,
    treehash: Vec<TreeHashInstance>,
    retain: Vec<[u8; N]>,
}

impl Drop for BdsState {
    fn drop(&mut self) {
        self.auth.zeroize();
        self.keep.zeroize();
        self.retain.zeroize();
        for inst in &mut self.treehash {
            inst.node.zeroize();
        }
        for entry in &mut self.stack {
            entry.node.zeroize();
        }
    }
}

/// Position of the retained nodes of `level` inside the retain buffer.
#[inline]
fn retain_offset(height: u32, level: u32) -> usize {
    ((1u32 << (height - 1 - level)) + level - height) as usize
}

impl BdsState {
    /// Builds the whole tree once, filling the traversal state for leaf 0.
    ///
    /// Returns the state together with the tree root.
    pub fn setup(
        hash_fn: HashFunction,
        sk_seed: &[u8; N],
        pub_seed: &[u8; N],
        params: XmssParams,
    ) -> (Self, [u8; N]) {
        let src = LeafSource {
            hash_fn,
            sk_seed,
            pub_seed,
        };
        let h = u32::from(params.height());
        let bound = h - BDS_K;

        let mut state = BdsState {
            height: h,
            updates_per_round: params.updates_per_round(),
            stack: Vec::with_capacity(h as usize + 1),
            auth: vec![[0u8; N]; h as usize],
            keep: vec![[0u8; N]; (h >> 1) as usize],
            treehash: (0..bound)
                .map(|level| TreeHashInstance {
                    height: level,
                    next_index: 0,
                    stack_usage: 0,
                    completed: true,
                    node: [0u8; N],
                })
                .collect(),
            retain: vec![[0u8; N]; params.retain_count()],
        };

        let mut stack: Vec<StackNode> = Vec::with_capacity(h as usize + 1);
        for idx in 0..(1u32 << h) {
            stack.push(StackNode {
                level: 0,
                node: src.leaf(idx),
            });

            while stack.len() > 1 && stack[stack.len() - 1].level == stack[stack.len() - 2].level {
                let (Some(right), Some(left)) = (stack.pop(), stack.pop()) else {
                    break;
                };
                let level = right.level;
                // The right node of a pair sits at an odd position
                let pos = idx >> level;
                if pos == 1 {
                    state.auth[level as usize] = right.node;
                } else if level < bound && pos == 3 {
                    state.treehash[level as usize].node = right.node;
                } else if level >= bound {
                    let slot = retain_offset(h, level) + ((pos - 3) >> 1) as usize;
                    state.retain[slot] = right.node;
                }

                stack.push(StackNode {
                    level: level + 1,
                    node: src.parent(&left.node, &right.node, level, idx >> (level + 1)),
                });
            }
        }

        let root = stack.pop().map(|top| top.node).unwrap_or([0u8; N]);
        (state, root)
    }

    /// Authentication path of the leaf the state is positioned at.
    #[inline]
    pub fn auth_path(&self) -> &[[u8; N]] {
        &self.auth
    }

    /// Moves the state from `leaf_index` to `leaf_index + 1`.
    ///
    /// Must not be called for the last leaf of the tree.
    pub fn advance(
        &mut self,
        hash_fn: HashFunction,
        sk_seed: &[u8; N],
        pub_seed: &[u8; N],
        leaf_index: u32,
    ) {
        let src = LeafSource {
            hash_fn,
            sk_seed,
            pub_seed,
        };
        self.round(&src, leaf_index);
        self.treehash_updates(&src, self.updates_per_round);
    }

    /// Computes the authentication path of `leaf_index + 1` from the one of
    /// `leaf_index`, using precomputed treehash and retained nodes.
    fn round(&mut self, src: &LeafSource<'_>, leaf_index: u32) {
        let h = self.height;
        let bound = h - BDS_K;

        // Height of the first left node on the path
        let tau = (0..h).find(|&i| (leaf_index >> i) & 1 == 0).unwrap_or(h);
        if tau >= h {
            return;
        }

        let children = if tau > 0 {
            Some((
                self.auth[tau as usize - 1],
                self.keep[(tau as usize - 1) >> 1],
            ))
        } else {
            None
        };

        if tau < h - 1 && (leaf_index >> (tau + 1)) & 1 == 0 {
            self.keep[tau as usize >> 1] = self.auth[tau as usize];
        }

        match children {
            None => {
                self.auth[0] = src.leaf(leaf_index);
            }
            Some((left, right)) => {
                self.auth[tau as usize] = src.parent(&left, &right, tau - 1, leaf_index >> tau);

                for i in 0..tau {
                    self.auth[i as usize] = if i < bound {
                        self.treehash[i as usize].node
                    } else {
                        let row = (((leaf_index >> i) - 1) >> 1) as usize;
                        self.retain[retain_offset(h, i) + row]
                    };
                }

                for i in 0..tau.min(bound) {
                    let start = u64::from(leaf_index) + 1 + 3 * (1u64 << i);
                    if start < 1u64 << h {
                        let inst = &mut self.treehash[i as usize];
                        inst.height = i;
                        inst.next_index = start as u32;
                        inst.completed = false;
                        inst.stack_usage = 0;
                    }
                }
            }
        }
    }

    /// Lowest level among the stack entries owned by an instance.
    fn min_height_on_stack(&self, stack_usage: usize) -> u32 {
        let start = self.stack.len().saturating_sub(stack_usage);
        self.stack[start..]
            .iter()
            .map(|entry| entry.level)
            .min()
            .unwrap_or(self.height)
    }

    /// Spends up to `updates` leaf computations on the instances that need
    /// them most (lowest pending level first).
    fn treehash_updates(&mut self, src: &LeafSource<'_>, updates: usize) {
        for _ in 0..updates {
            let mut l_min = self.height;
            let mut selected = None;

            for (i, inst) in self.treehash.iter().enumerate() {
                let low = if inst.completed {
                    self.height
                } else if inst.stack_usage == 0 {
                    i as u32
                } else {
                    self.min_height_on_stack(inst.stack_usage)
                };
                if low < l_min {
                    selected = Some(i);
                    l_min = low;
                }
            }

            match selected {
                Some(level) => self.treehash_update(src, level),
                None => break,
            }
        }
    }

    /// Adds one leaf to a treehash instance, merging with its stack nodes.
    fn treehash_update(&mut self, src: &LeafSource<'_>, level: usize) {
        let next_index = self.treehash[level].next_index;
        let target = self.treehash[level].height;
        let mut usage = self.treehash[level].stack_usage;

        let mut node = src.leaf(next_index);
        let mut node_height = 0;
        while usage > 0 && self.stack.last().map(|top| top.level) == Some(node_height) {
            let Some(top) = self.stack.pop() else {
                break;
            };
            node = src.parent(&top.node, &node, node_height, next_index >> (node_height + 1));
            node_height += 1;
            usage -= 1;
        }

        let inst = &mut self.treehash[level];
        inst.stack_usage = usage;
        if node_height == target {
            inst.node = node;
            inst.completed = true;
        } else {
            self.stack.push(StackNode {
                level: node_height,
                node,
            });
            inst.stack_usage += 1;
            inst.next_index += 1;
        }
    }
}
