//! # Cache de Features Restritas por Instância
//!
//! O laço interno do treino chama a acumulação de expectativas uma vez por
//! instância e por evento de atualização. Varrer o vetor de features inteiro a cada
//! chamada seria desperdício quando só um punhado de features é restrito: o cache
//! guarda apenas as features restritas encontradas na última instância.

use crate::config::ConstraintConfig;
use crate::features::FeatureVector;
use crate::registry::ConstraintRegistry;

/// Features restritas da instância processada mais recentemente.
///
/// Os índices ficam na ordem do vetor de entrada, seguidos da feature padrão
/// (quando registrada). Os valores só são guardados em modo valor.
#[derive(Debug, Clone, Default)]
pub struct InstanceCache {
    indices: Vec<usize>,
    values: Vec<f64>,
}

impl InstanceCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reconstrói o cache para `input`.
    ///
    /// É a única operação que altera o cache. Chamá-la duas vezes seguidas com a
    /// mesma instância e o mesmo registro produz o mesmo conteúdo.
    pub fn preprocess(
        &mut self,
        input: &FeatureVector,
        registry: &ConstraintRegistry,
        config: &ConstraintConfig,
    ) {
        self.indices.clear();
        self.values.clear();

        for (fi, value) in input.iter() {
            if registry.has(fi) {
                self.indices.push(fi);
                if config.use_values {
                    self.values.push(value);
                }
            }
        }

        // Feature padrão, para regularização da marginal de labels
        let default_fi = config.default_feature();
        if registry.has(default_fi) {
            self.indices.push(default_fi);
            if config.use_values {
                self.values.push(1.0);
            }
        }
    }

    pub fn indices(&self) -> &[usize] {
        &self.indices
    }

    /// Vazio em modo contagem.
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// Pares `(feature, valor)`; o valor é `None` em modo contagem.
    pub fn entries(&self) -> impl Iterator<Item = (usize, Option<f64>)> + '_ {
        self.indices
            .iter()
            .enumerate()
            .map(move |(i, &fi)| (fi, self.values.get(i).copied()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry_with(features: &[usize]) -> ConstraintRegistry {
        let mut registry = ConstraintRegistry::new(2);
        for &fi in features {
            registry.add(fi, vec![0.5, 0.5], 1.0).unwrap();
        }
        registry
    }

    #[test]
    fn test_keeps_only_constrained_features_in_order() {
        let config = ConstraintConfig::new(10, 2, false);
        let registry = registry_with(&[7, 2]);
        let mut cache = InstanceCache::new();

        cache.preprocess(&FeatureVector::from_indices([1, 7, 3, 2]), &registry, &config);

        assert_eq!(cache.indices(), &[7, 2]);
        assert!(cache.values().is_empty());
        assert_eq!(cache.entries().collect::<Vec<_>>(), vec![(7, None), (2, None)]);
    }

    #[test]
    fn test_value_mode_caches_values_and_default() {
        let config = ConstraintConfig::new(10, 2, true);
        let registry = registry_with(&[4, 10]);
        let mut cache = InstanceCache::new();

        cache.preprocess(&FeatureVector::from_pairs([(4, 0.25), (5, 9.0)]), &registry, &config);

        assert_eq!(cache.indices(), &[4, 10]);
        assert_eq!(cache.values(), &[0.25, 1.0]);
    }

    #[test]
    fn test_rebuild_clears_previous_instance() {
        let config = ConstraintConfig::new(10, 2, false);
        let registry = registry_with(&[1, 2]);
        let mut cache = InstanceCache::new();

        cache.preprocess(&FeatureVector::from_indices([1, 2]), &registry, &config);
        cache.preprocess(&FeatureVector::from_indices([2]), &registry, &config);

        assert_eq!(cache.indices(), &[2]);
    }

    #[test]
    fn test_idempotent() {
        let config = ConstraintConfig::new(5, 2, true);
        let registry = registry_with(&[0, 3, 5]);
        let input = FeatureVector::from_pairs([(3, 2.0), (0, 0.5)]);

        let mut once = InstanceCache::new();
        once.preprocess(&input, &registry, &config);
        let mut twice = InstanceCache::new();
        twice.preprocess(&input, &registry, &config);
        twice.preprocess(&input, &registry, &config);

        assert_eq!(once.indices(), twice.indices());
        assert_eq!(once.values(), twice.values());
    }

    #[test]
    fn test_empty_input_still_caches_default() {
        let config = ConstraintConfig::new(3, 2, false);
        let registry = registry_with(&[3]);
        let mut cache = InstanceCache::new();

        cache.preprocess(&FeatureVector::new(), &registry, &config);

        assert_eq!(cache.indices(), &[3]);
    }
}
