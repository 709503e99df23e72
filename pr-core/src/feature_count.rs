//! # Contagem de Features no Corpus
//!
//! Estatísticas simples por feature, úteis para escolher quais features restringir:
//! - **contagem**: soma dos valores da feature em todo o corpus;
//! - **frequência de documento**: em quantas instâncias ela aparece.
//!
//! Há dois modos de entrada. Vetores esparsos somam o valor de cada par. Sequências
//! de tokens (índices repetidos permitidos) somam 1 por ocorrência, mas contam cada
//! documento uma única vez na frequência.

use std::collections::HashSet;

use tracing::info;

use crate::corpus::InstanceList;
use crate::features::Alphabet;

#[derive(Debug, Clone, Default)]
pub struct FeatureCounts {
    counts: Vec<f64>,
    document_frequencies: Vec<usize>,
}

impl FeatureCounts {
    /// Conta as features `[0, num_features)` de `data`.
    ///
    /// Índices fora do intervalo são ignorados.
    pub fn count(data: &InstanceList, num_features: usize) -> Self {
        let mut result = Self {
            counts: vec![0.0; num_features],
            document_frequencies: vec![0; num_features],
        };
        if data.is_empty() {
            info!("Lista de instâncias vazia");
            return result;
        }

        for instance in data {
            for (fi, value) in instance.features.iter() {
                if fi < num_features {
                    result.counts[fi] += value;
                    result.document_frequencies[fi] += 1;
                }
            }
        }
        result
    }

    /// Conta sequências de tokens, uma por documento.
    ///
    /// Cada ocorrência soma 1 à contagem; a frequência de documento sobe no máximo
    /// uma vez por sequência. Índices fora de `[0, num_features)` são ignorados.
    pub fn count_sequences(sequences: &[Vec<usize>], num_features: usize) -> Self {
        let mut result = Self {
            counts: vec![0.0; num_features],
            document_frequencies: vec![0; num_features],
        };
        if sequences.is_empty() {
            info!("Lista de sequências vazia");
            return result;
        }

        let mut seen = HashSet::new();
        for tokens in sequences {
            seen.clear();
            for &fi in tokens.iter().filter(|&&fi| fi < num_features) {
                result.counts[fi] += 1.0;
                if seen.insert(fi) {
                    result.document_frequencies[fi] += 1;
                }
            }
        }
        result
    }

    pub fn counts(&self) -> &[f64] {
        &self.counts
    }

    pub fn document_frequencies(&self) -> &[usize] {
        &self.document_frequencies
    }

    /// Linhas `nome\tcontagem\tfrequência`, uma por feature, na ordem dos índices.
    ///
    /// Features sem nome no alfabeto aparecem pelo índice.
    pub fn report(&self, alphabet: &Alphabet) -> Vec<String> {
        self.counts
            .iter()
            .zip(&self.document_frequencies)
            .enumerate()
            .map(|(fi, (count, df))| {
                let name = alphabet
                    .lookup_object(fi)
                    .map(str::to_string)
                    .unwrap_or_else(|| fi.to_string());
                format!("{name}\t{}\t{df}", format_count(*count))
            })
            .collect()
    }
}

/// No máximo 6 casas decimais, sem zeros à direita.
fn format_count(value: f64) -> String {
    let text = format!("{value:.6}");
    let text = text.trim_end_matches('0').trim_end_matches('.');
    text.to_string()
}
