//! # Conjunto de Pertinência
//!
//! Marca, por posição no corpus, quais instâncias acionaram ao menos uma
//! restrição durante a varredura. O treinador usa o conjunto para aplicar o termo
//! de perda das restrições apenas a essas instâncias.

use bitvec::prelude::*;
use serde::{Deserialize, Serialize};

/// Conjunto de bits sobre as posições `[0, capacity)`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MembershipSet {
    bits: BitVec<u64, Lsb0>,
}

impl MembershipSet {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            bits: bitvec![u64, Lsb0; 0; capacity],
        }
    }

    pub fn capacity(&self) -> usize {
        self.bits.len()
    }

    /// Marca a posição `ii`; posições fora da capacidade são ignoradas.
    pub fn insert(&mut self, ii: usize) {
        if ii < self.bits.len() {
            self.bits.set(ii, true);
        }
    }

    pub fn contains(&self, ii: usize) -> bool {
        self.bits.get(ii).map(|bit| *bit).unwrap_or(false)
    }

    /// Quantidade de posições marcadas.
    pub fn count(&self) -> usize {
        self.bits.count_ones()
    }

    pub fn is_empty(&self) -> bool {
        self.bits.not_any()
    }

    /// Posições marcadas em ordem crescente.
    pub fn iter(&self) -> impl Iterator<Item = usize> + '_ {
        self.bits.iter_ones()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_and_contains_across_words() {
        let mut set = MembershipSet::with_capacity(130);
        set.insert(0);
        set.insert(64);
        set.insert(129);

        assert!(set.contains(64));
        assert!(!set.contains(63));
        assert_eq!(set.count(), 3);
        assert_eq!(set.iter().collect::<Vec<_>>(), vec![0, 64, 129]);
    }

    #[test]
    fn test_out_of_range_ignored() {
        let mut set = MembershipSet::with_capacity(2);
        set.insert(2);
        assert!(set.is_empty());
        assert!(!set.contains(2));
    }

    #[test]
    fn test_empty_capacity() {
        let set = MembershipSet::with_capacity(0);
        assert!(set.is_empty());
        assert_eq!(set.iter().count(), 0);
    }
}
