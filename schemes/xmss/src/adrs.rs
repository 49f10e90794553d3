//! Hash address (ADRS) used for domain separation in XMSS.
//!
//! Every keyed hash call takes a 32-byte address made of eight big-endian
//! 32-bit words, so that no two hash evaluations in a tree share inputs.
//!
//! # Structure
//!
//! ```text
//! Word 0: Layer address (always 0)
//! Word 1-2: Tree address (always 0)
//! Word 3: Type (OTS, L-tree, hash tree)
//! Word 4: OTS address | L-tree address | padding
//! Word 5: Chain address | tree height
//! Word 6: Hash address | tree index
//! Word 7: Key and mask
//! ```

/// Address types for XMSS.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u32)]
pub enum AddressType {
    /// WOTS+ chain hashing
    Ots = 0,
    /// L-tree compression of a WOTS+ public key
    LTree = 1,
    /// Internal Merkle tree node
    HashTree = 2,
}

/// Hash address (32 bytes).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct HashAddress {
    words: [u32; 8],
}

impl HashAddress {
    /// Creates a zeroed address of the given type.
    pub fn new(addr_type: AddressType) -> Self {
        let mut adrs = HashAddress::default();
        adrs.set_type(addr_type);
        adrs
    }

    /// Sets the address type and clears the type-specific words.
    #[inline]
    pub fn set_type(&mut self, addr_type: AddressType) {
        self.words[3] = addr_type as u32;
        self.words[4..8].fill(0);
    }

    /// Gets the address type word.
    #[inline]
    pub fn addr_type(&self) -> u32 {
        self.words[3]
    }

    /// Sets the OTS key pair index (word 4).
    #[inline]
    pub fn set_ots(&mut self, index: u32) {
        self.words[4] = index;
    }

    /// Sets the L-tree index (word 4).
    #[inline]
    pub fn set_ltree(&mut self, index: u32) {
        self.words[4] = index;
    }

    /// Sets the chain index (word 5).
    #[inline]
    pub fn set_chain(&mut self, chain: u32) {
        self.words[5] = chain;
    }

    /// Sets the tree height (word 5).
    #[inline]
    pub fn set_tree_height(&mut self, height: u32) {
        self.words[5] = height;
    }

    /// Sets the position within a chain (word 6).
    #[inline]
    pub fn set_hash(&mut self, hash: u32) {
        self.words[6] = hash;
    }

    /// Sets the node index at the current tree height (word 6).
    #[inline]
    pub fn set_tree_index(&mut self, index: u32) {
        self.words[6] = index;
    }

    /// Selects the key (0) or one of the bitmasks (1, 2).
    #[inline]
    pub fn set_key_and_mask(&mut self, key_and_mask: u32) {
        self.words[7] = key_and_mask;
    }

    /// Serializes the address to its 32-byte big-endian form.
    pub fn to_bytes(&self) -> [u8; 32] {
        let mut bytes = [0u8; 32];
        for (chunk, word) in bytes.chunks_exact_mut(4).zip(self.words.iter()) {
            chunk.copy_from_slice(&word.to_be_bytes());
        }
        bytes
    }
}
