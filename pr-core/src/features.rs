//! # Vetores de Features Esparsos e Alfabeto
//!
//! O motor de restrições trabalha com **índices** inteiros de features, não com
//! nomes. Este módulo fornece:
//!
//! - [`FeatureVector`]: pares `(índice, valor)` de uma instância, na ordem em que
//!   foram inseridos. A ordem importa: as somas de contagem e expectativa são
//!   feitas nessa ordem, o que torna os resultados reprodutíveis entre execuções.
//! - [`Alphabet`]: mapeamento bidirecional nome ↔ índice. É um objeto explícito,
//!   passado a quem precisa, e não um registro global do processo; dois
//!   experimentos concorrentes usam alfabetos independentes.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Vetor de features esparso de uma instância.
///
/// Apenas as features ativas são armazenadas. Para um vocabulário de milhares de
/// palavras, um documento típico ativa algumas dezenas.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FeatureVector {
    indices: Vec<usize>,
    values: Vec<f64>,
}

impl FeatureVector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Vetor binário: cada índice recebe valor 1.0.
    pub fn from_indices(indices: impl IntoIterator<Item = usize>) -> Self {
        let indices: Vec<usize> = indices.into_iter().collect();
        let values = vec![1.0; indices.len()];
        Self { indices, values }
    }

    pub fn from_pairs(pairs: impl IntoIterator<Item = (usize, f64)>) -> Self {
        let (indices, values) = pairs.into_iter().unzip();
        Self { indices, values }
    }

    pub fn push(&mut self, index: usize, value: f64) {
        self.indices.push(index);
        self.values.push(value);
    }

    /// Número de posições ocupadas (features ativas).
    pub fn num_locations(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    pub fn index_at(&self, loc: usize) -> usize {
        self.indices[loc]
    }

    pub fn value_at(&self, loc: usize) -> f64 {
        self.values[loc]
    }

    /// Itera sobre os pares `(índice, valor)` na ordem de inserção.
    pub fn iter(&self) -> impl Iterator<Item = (usize, f64)> + '_ {
        self.indices.iter().copied().zip(self.values.iter().copied())
    }

    /// Produto escalar com um vetor denso de pesos.
    ///
    /// $$ \text{score} = \sum_i w_{idx_i} \cdot v_i $$
    ///
    /// Índices fora do vetor de pesos contribuem com zero.
    pub fn dot(&self, weights: &[f64]) -> f64 {
        self.iter()
            .map(|(i, v)| v * weights.get(i).copied().unwrap_or(0.0))
            .sum()
    }
}

/// Mapeamento nome ↔ índice de features (ou de labels).
///
/// # Ciclo de vida
/// Índices são atribuídos sequencialmente a partir de zero. Após [`Alphabet::freeze`],
/// nomes desconhecidos deixam de ser adicionados. [`Alphabet::reset`] descarta todos
/// os nomes: **todo índice entregue antes do reset perde o significado**, e vetores
/// construídos com ele precisam ser reconstruídos.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Alphabet {
    entries: Vec<String>,
    index: HashMap<String, usize>,
    frozen: bool,
}

impl Alphabet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Devolve o índice de `name`, criando-o se necessário.
    ///
    /// Com o alfabeto congelado, nomes novos resultam em `None`.
    pub fn lookup_or_insert(&mut self, name: &str) -> Option<usize> {
        if let Some(&idx) = self.index.get(name) {
            return Some(idx);
        }
        if self.frozen {
            return None;
        }
        let idx = self.entries.len();
        self.entries.push(name.to_string());
        self.index.insert(name.to_string(), idx);
        Some(idx)
    }

    pub fn lookup_index(&self, name: &str) -> Option<usize> {
        self.index.get(name).copied()
    }

    pub fn lookup_object(&self, idx: usize) -> Option<&str> {
        self.entries.get(idx).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn freeze(&mut self) {
        self.frozen = true;
    }

    pub fn is_frozen(&self) -> bool {
        self.frozen
    }

    /// Esvazia o alfabeto e o descongela.
    pub fn reset(&mut self) {
        self.entries.clear();
        self.index.clear();
        self.frozen = false;
    }

    /// Converte features nomeadas em um [`FeatureVector`].
    ///
    /// A ordem de entrada é preservada. Nomes rejeitados por um alfabeto
    /// congelado são ignorados.
    pub fn vectorize<'a>(
        &mut self,
        named: impl IntoIterator<Item = (&'a str, f64)>,
    ) -> FeatureVector {
        let mut fv = FeatureVector::new();
        for (name, value) in named {
            if let Some(idx) = self.lookup_or_insert(name) {
                fv.push(idx, value);
            }
        }
        fv
    }
}
