use serde::{Deserialize, Serialize};

use crate::hash::Hash;

/// A transaction in the tangle.
///
/// Each transaction approves up to two earlier transactions: the trunk and the branch.
/// A branch equal to the trunk is a single-parent reference.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    hash: Hash,
    trunk: Hash,
    branch: Hash,
    bundle: Hash,
    current_index: u64,
    last_index: u64,
    timestamp: u64,
}

impl Transaction {
    pub fn builder(trunk: Hash) -> TransactionBuilder { TransactionBuilder::new(trunk) }

    /// Create a transaction with an explicitly assigned hash rather than one derived from its content.
    pub fn with_hash(hash: Hash, trunk: Hash, branch: Hash, is_tail: bool) -> Self {
        Self { bundle: hash.clone(), hash, trunk, branch, current_index: if is_tail { 0 } else { 1 }, last_index: 1, timestamp: 0 }
    }

    pub fn hash(&self) -> &Hash { &self.hash }

    pub fn trunk_hash(&self) -> &Hash { &self.trunk }

    pub fn branch_hash(&self) -> &Hash { &self.branch }

    pub fn bundle_hash(&self) -> &Hash { &self.bundle }

    pub fn current_index(&self) -> u64 { self.current_index }

    pub fn last_index(&self) -> u64 { self.last_index }

    pub fn timestamp(&self) -> u64 { self.timestamp }

    /// A tail is the first transaction of its bundle.
    pub fn is_tail(&self) -> bool { self.current_index == 0 }

    /// The trunk, followed by the branch if it differs from the trunk.
    pub fn approvee_hashes(&self) -> Vec<&Hash> {
        if self.trunk == self.branch {
            vec![&self.trunk]
        } else {
            vec![&self.trunk, &self.branch]
        }
    }
}

impl std::fmt::Display for Transaction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Transaction({:#} trunk {:#} branch {:#}", self.hash, self.trunk, self.branch)?;
        if self.is_tail() {
            write!(f, " tail")?;
        }
        write!(f, ")")
    }
}

#[derive(Debug, Clone)]
pub struct TransactionBuilder {
    trunk: Hash,
    branch: Option<Hash>,
    bundle: Hash,
    current_index: u64,
    last_index: u64,
    timestamp: u64,
}

impl TransactionBuilder {
    pub fn new(trunk: Hash) -> Self { Self { trunk, branch: None, bundle: Hash::default(), current_index: 0, last_index: 0, timestamp: 0 } }

    pub fn branch(mut self, branch: Hash) -> Self {
        self.branch = Some(branch);
        self
    }

    pub fn bundle(mut self, bundle: Hash) -> Self {
        self.bundle = bundle;
        self
    }

    /// Position of the transaction inside its bundle and the index of the bundle's last transaction.
    pub fn index(mut self, current_index: u64, last_index: u64) -> Self {
        self.current_index = current_index;
        self.last_index = last_index.max(current_index);
        self
    }

    pub fn timestamp(mut self, timestamp: u64) -> Self {
        self.timestamp = timestamp;
        self
    }

    /// Build the transaction, deriving its hash from the content.
    pub fn build(self) -> Transaction {
        let branch = self.branch.unwrap_or_else(|| self.trunk.clone());
        let hash = Hash::digest([
            self.trunk.as_bytes(),
            branch.as_bytes(),
            self.bundle.as_bytes(),
            self.current_index.to_le_bytes().as_slice(),
            self.last_index.to_le_bytes().as_slice(),
            self.timestamp.to_le_bytes().as_slice(),
        ]);

        Transaction {
            hash,
            trunk: self.trunk,
            branch,
            bundle: self.bundle,
            current_index: self.current_index,
            last_index: self.last_index,
            timestamp: self.timestamp,
        }
    }
}
