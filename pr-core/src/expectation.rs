//! # Acumulação de Expectativas do Modelo
//!
//! Segunda fase do protocolo, executada no laço interno do treino. Dada a
//! distribuição de labels que o classificador prevê para uma instância e um peso
//! externo, soma a massa de probabilidade nas expectativas das features restritas:
//!
//! $$ E_{f,l} \mathrel{+}= w \cdot p(l \mid x) \cdot v_f $$
//!
//! onde $v_f = 1$ em modo contagem e $v_f$ é o valor da feature em modo valor.
//!
//! Toda validação acontece antes de qualquer escrita: uma chamada que falha deixa
//! as expectativas exatamente como estavam.

use std::collections::HashMap;

use rayon::prelude::*;
use tracing::debug;

use crate::cache::InstanceCache;
use crate::config::ConstraintConfig;
use crate::error::{ConstraintError, Result};
use crate::features::FeatureVector;
use crate::registry::{ConstraintRegistry, ExpectationState};

/// Acumula a distribuição `dist` de uma instância nas expectativas do registro.
///
/// O cache é sempre reconstruído para `input`; nenhum conteúdo de uma instância
/// anterior é reaproveitado.
///
/// # Erros
/// - [`ConstraintError::UninitializedExpectation`] se o registro nunca foi zerado
///   (estado `Stale`), mesmo que a instância não acione restrição alguma, ou se
///   alguma feature acionada foi registrada depois do último reset.
/// - [`ConstraintError::DimensionMismatch`] se `dist` não tem
///   `registry.num_labels()` posições.
pub fn accumulate(
    cache: &mut InstanceCache,
    input: &FeatureVector,
    dist: &[f64],
    weight: f64,
    registry: &mut ConstraintRegistry,
    config: &ConstraintConfig,
) -> Result<()> {
    ensure_not_stale(registry)?;
    check_distribution(dist, registry.num_labels())?;
    cache.preprocess(input, registry, config);
    ensure_initialized(cache.indices(), registry)?;

    for (fi, value) in cache.entries() {
        let expectation = registry
            .get_mut(fi)?
            .expectation_mut()
            .ok_or(ConstraintError::UninitializedExpectation(Some(fi)))?;
        for (li, e) in expectation.iter_mut().enumerate() {
            let p = weight * dist[li];
            *e += match value {
                Some(v) => p * v,
                None => p,
            };
        }
    }

    registry.mark_accumulated();
    Ok(())
}

/// Uma atualização de expectativa: instância, distribuição prevista e peso.
#[derive(Debug, Clone, Copy)]
pub struct ExpectationUpdate<'a> {
    pub input: &'a FeatureVector,
    pub distribution: &'a [f64],
    pub weight: f64,
}

/// Versão paralela de [`accumulate`] para um lote de instâncias.
///
/// Cada thread do Rayon usa seu próprio cache e um acumulador parcial
/// `feature → vetor por label`. Os parciais são somados e só então aplicados ao
/// registro, em ordem crescente de feature, por uma única thread. Nenhuma
/// expectativa é escrita por duas threads.
///
/// A ordem das somas entre parciais depende do escalonamento, então o resultado
/// coincide com a versão sequencial apenas dentro da tolerância de ponto flutuante.
pub fn accumulate_parallel(
    batch: &[ExpectationUpdate<'_>],
    registry: &mut ConstraintRegistry,
    config: &ConstraintConfig,
) -> Result<()> {
    ensure_not_stale(registry)?;
    let num_labels = registry.num_labels();
    for update in batch {
        check_distribution(update.distribution, num_labels)?;
    }
    if batch.is_empty() {
        return Ok(());
    }

    let shared: &ConstraintRegistry = registry;
    let partial = batch
        .par_iter()
        .fold(
            || (InstanceCache::new(), HashMap::new()),
            |(mut cache, mut acc), update| {
                cache.preprocess(update.input, shared, config);
                add_to_partial(&cache, update, num_labels, &mut acc);
                (cache, acc)
            },
        )
        .map(|(_, acc)| acc)
        .reduce(HashMap::new, merge_partials);

    let mut features: Vec<usize> = partial.keys().copied().collect();
    features.sort_unstable();
    ensure_initialized(&features, registry)?;

    for fi in &features {
        let expectation = registry
            .get_mut(*fi)?
            .expectation_mut()
            .ok_or(ConstraintError::UninitializedExpectation(Some(*fi)))?;
        if let Some(sums) = partial.get(fi) {
            for (e, s) in expectation.iter_mut().zip(sums) {
                *e += s;
            }
        }
    }

    debug!(
        batch = batch.len(),
        features = features.len(),
        "Acumulação paralela concluída"
    );
    registry.mark_accumulated();
    Ok(())
}

fn add_to_partial(
    cache: &InstanceCache,
    update: &ExpectationUpdate<'_>,
    num_labels: usize,
    acc: &mut HashMap<usize, Vec<f64>>,
) {
    for (fi, value) in cache.entries() {
        let sums = acc.entry(fi).or_insert_with(|| vec![0.0; num_labels]);
        for (li, s) in sums.iter_mut().enumerate() {
            let p = update.weight * update.distribution[li];
            *s += match value {
                Some(v) => p * v,
                None => p,
            };
        }
    }
}

fn merge_partials(
    mut left: HashMap<usize, Vec<f64>>,
    right: HashMap<usize, Vec<f64>>,
) -> HashMap<usize, Vec<f64>> {
    for (fi, sums) in right {
        match left.get_mut(&fi) {
            Some(existing) => {
                for (e, s) in existing.iter_mut().zip(&sums) {
                    *e += s;
                }
            }
            None => {
                left.insert(fi, sums);
            }
        }
    }
    left
}

fn check_distribution(dist: &[f64], num_labels: usize) -> Result<()> {
    if dist.len() != num_labels {
        return Err(ConstraintError::DimensionMismatch {
            expected: num_labels,
            actual: dist.len(),
        });
    }
    Ok(())
}

fn ensure_initialized(features: &[usize], registry: &ConstraintRegistry) -> Result<()> {
    for &fi in features {
        if registry.get(fi)?.expectation().is_none() {
            return Err(ConstraintError::UninitializedExpectation(Some(fi)));
        }
    }
    Ok(())
}

fn ensure_not_stale(registry: &ConstraintRegistry) -> Result<()> {
    if registry.state() == ExpectationState::Stale {
        return Err(ConstraintError::UninitializedExpectation(None));
    }
    Ok(())
}
