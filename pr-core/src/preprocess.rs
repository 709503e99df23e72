//! # Varredura do Corpus
//!
//! Primeira fase do protocolo: uma passada sobre a coleção de instâncias que
//! estabelece as contagens empíricas das features restritas.
//!
//! Para cada instância (na ordem do corpus) e cada par `(feature, valor)` (na
//! ordem do vetor), se a feature está registrada:
//! - modo contagem: `count += w`
//! - modo valor: `count += w * valor`
//!
//! onde `w` é o peso da instância. Em seguida, se a feature padrão está
//! registrada, ela recebe `w` em **toda** instância, tenha ela features reais ou não.
//!
//! A ordem fixa de iteração torna as somas de ponto flutuante reprodutíveis.

use tracing::{debug, info};

use crate::config::ConstraintConfig;
use crate::corpus::InstanceList;
use crate::membership::MembershipSet;
use crate::registry::ConstraintRegistry;

/// Acumula as contagens empíricas e devolve as instâncias que acionaram restrições.
///
/// As contagens crescem a cada chamada; zerá-las é responsabilidade de quem cria
/// um registro novo. Um corpus vazio não altera nada e devolve um conjunto vazio.
pub fn scan_corpus(
    data: &InstanceList,
    registry: &mut ConstraintRegistry,
    config: &ConstraintConfig,
) -> MembershipSet {
    let mut membership = MembershipSet::with_capacity(data.len());
    if data.is_empty() {
        info!("Corpus vazio: nenhuma contagem atualizada");
        return membership;
    }

    let default_fi = config.default_feature();
    let has_default = registry.has(default_fi);
    let mut hits = 0usize;

    for (ii, instance, weight) in data.weighted() {
        for (fi, value) in instance.features.iter() {
            if let Ok(record) = registry.get_mut(fi) {
                let amount = if config.use_values { weight * value } else { weight };
                record.add_count(amount);
                membership.insert(ii);
                hits += 1;
            }
        }

        // Feature padrão, para regularização da marginal de labels
        if has_default {
            if let Ok(record) = registry.get_mut(default_fi) {
                record.add_count(weight);
            }
            membership.insert(ii);
        }
    }

    debug!(
        instances = data.len(),
        constrained_instances = membership.count(),
        feature_hits = hits,
        "Varredura do corpus concluída"
    );
    membership
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::corpus::Instance;
    use crate::features::FeatureVector;

    fn corpus(vectors: Vec<(FeatureVector, f64)>) -> InstanceList {
        let mut list = InstanceList::new();
        for (i, (fv, w)) in vectors.into_iter().enumerate() {
            list.push_weighted(Instance::new(fv, None, format!("i{i}")), w);
        }
        list
    }

    #[test]
    fn test_count_mode_sums_instance_weights() {
        let config = ConstraintConfig::new(3, 2, false);
        let mut registry = ConstraintRegistry::new(2);
        registry.add(1, vec![0.2, 0.8], 1.0).unwrap();

        let data = corpus(vec![
            (FeatureVector::from_indices([0, 1]), 1.0),
            (FeatureVector::from_indices([2]), 2.0),
            (FeatureVector::from_pairs([(1, 5.0)]), 0.5),
        ]);
        let membership = scan_corpus(&data, &mut registry, &config);

        assert!((registry.get(1).unwrap().count() - 1.5).abs() < 1e-12);
        assert_eq!(membership.iter().collect::<Vec<_>>(), vec![0, 2]);
    }

    #[test]
    fn test_value_mode_weights_by_value() {
        let config = ConstraintConfig::new(3, 2, true);
        let mut registry = ConstraintRegistry::new(2);
        registry.add(1, vec![0.5, 0.5], 1.0).unwrap();

        let data = corpus(vec![
            (FeatureVector::from_pairs([(1, 3.0)]), 2.0),
            (FeatureVector::from_pairs([(0, 1.0), (1, 0.5)]), 1.0),
        ]);
        scan_corpus(&data, &mut registry, &config);

        assert!((registry.get(1).unwrap().count() - 6.5).abs() < 1e-12);
    }

    #[test]
    fn test_default_feature_fires_on_every_instance() {
        let config = ConstraintConfig::new(3, 2, false);
        let mut registry = ConstraintRegistry::new(2);
        registry.add(config.default_feature(), vec![0.5, 0.5], 1.0).unwrap();

        let data = corpus(vec![
            (FeatureVector::new(), 1.0),
            (FeatureVector::from_indices([2]), 3.0),
        ]);
        let membership = scan_corpus(&data, &mut registry, &config);

        assert!((registry.get(3).unwrap().count() - 4.0).abs() < 1e-12);
        // A própria instância é marcada, não a seguinte
        assert_eq!(membership.iter().collect::<Vec<_>>(), vec![0, 1]);
    }

    #[test]
    fn test_counts_accumulate_across_scans() {
        let config = ConstraintConfig::new(2, 2, false);
        let mut registry = ConstraintRegistry::new(2);
        registry.add(0, vec![0.5, 0.5], 1.0).unwrap();

        let data = corpus(vec![(FeatureVector::from_indices([0]), 1.0)]);
        scan_corpus(&data, &mut registry, &config);
        scan_corpus(&data, &mut registry, &config);

        assert_eq!(registry.get(0).unwrap().count(), 2.0);
    }

    #[test]
    fn test_empty_corpus_is_noop() {
        let config = ConstraintConfig::new(2, 2, false);
        let mut registry = ConstraintRegistry::new(2);
        registry.add(2, vec![0.5, 0.5], 1.0).unwrap();

        let membership = scan_corpus(&InstanceList::new(), &mut registry, &config);

        assert!(membership.is_empty());
        assert_eq!(membership.capacity(), 0);
        assert_eq!(registry.get(2).unwrap().count(), 0.0);
    }
}
