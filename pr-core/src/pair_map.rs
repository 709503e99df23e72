//! # Mapa Esparso de Pares de Inteiros
//!
//! Mapa de dois níveis `(chave1, chave2) → valor`. Ocupa muito menos memória que
//! uma matriz densa quando poucos pares existem, por exemplo co-ocorrências
//! (feature, label) num vocabulário grande.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PairMap<V> {
    backing: HashMap<usize, HashMap<usize, V>>,
}

impl<V> Default for PairMap<V> {
    fn default() -> Self {
        Self {
            backing: HashMap::new(),
        }
    }
}

impl<V> PairMap<V> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insere o valor, devolvendo o anterior se existia.
    pub fn insert(&mut self, key1: usize, key2: usize, value: V) -> Option<V> {
        self.backing.entry(key1).or_default().insert(key2, value)
    }

    pub fn get(&self, key1: usize, key2: usize) -> Option<&V> {
        self.backing.get(&key1).and_then(|inner| inner.get(&key2))
    }

    pub fn get_mut(&mut self, key1: usize, key2: usize) -> Option<&mut V> {
        self.backing.get_mut(&key1).and_then(|inner| inner.get_mut(&key2))
    }

    /// Pares `(chave2, valor)` associados a `key1`; vazio se não houver nenhum.
    pub fn curry(&self, key1: usize) -> impl Iterator<Item = (usize, &V)> + '_ {
        self.backing
            .get(&key1)
            .into_iter()
            .flat_map(|inner| inner.iter().map(|(k, v)| (*k, v)))
    }

    /// Chaves de primeiro nível, em ordem crescente.
    pub fn keys1(&self) -> Vec<usize> {
        let mut keys: Vec<usize> = self.backing.keys().copied().collect();
        keys.sort_unstable();
        keys
    }

    /// Chaves de segundo nível sob `key1`, em ordem crescente.
    pub fn keys2(&self, key1: usize) -> Vec<usize> {
        let mut keys: Vec<usize> = self.curry(key1).map(|(k, _)| k).collect();
        keys.sort_unstable();
        keys
    }

    /// Total de pares armazenados.
    pub fn len(&self) -> usize {
        self.backing.values().map(HashMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<V: Default> PairMap<V> {
    pub fn entry_or_default(&mut self, key1: usize, key2: usize) -> &mut V {
        self.backing.entry(key1).or_default().entry(key2).or_default()
    }
}
