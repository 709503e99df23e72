//! # Estimação de Alvos a partir de Dados Rotulados
//!
//! Quando há algumas instâncias rotuladas, o alvo de cada feature restrita pode
//! ser estimado como a distribuição condicional empírica dos labels:
//!
//! $$ \hat{p}(l \mid f) = \frac{\sum_{x \ni f,\ y(x) = l} w_x v_f}{\sum_{x \ni f} w_x v_f} $$
//!
//! A feature padrão recebe a marginal empírica de labels $\hat{p}(l)$, ponderada
//! apenas pelo peso das instâncias.

use std::collections::{BTreeMap, BTreeSet};

use tracing::debug;

use crate::config::ConstraintConfig;
use crate::corpus::InstanceList;
use crate::pair_map::PairMap;

/// Estima alvos para `features` usando as instâncias rotuladas de `data`.
///
/// Instâncias sem label são ignoradas. Features que nunca co-ocorrem com um label
/// não recebem alvo e ficam fora do resultado. Em modo contagem cada ocorrência
/// vale o peso da instância; em modo valor, peso × valor.
pub fn targets_from_data(
    data: &InstanceList,
    features: &BTreeSet<usize>,
    config: &ConstraintConfig,
) -> BTreeMap<usize, Vec<f64>> {
    let default_fi = config.default_feature();
    let mut joint: PairMap<f64> = PairMap::new();

    for (_, instance, weight) in data.weighted() {
        let Some(label) = instance.label else {
            continue;
        };
        if label >= config.num_labels {
            continue;
        }
        for (fi, value) in instance.features.iter() {
            if features.contains(&fi) {
                let amount = if config.use_values { weight * value } else { weight };
                *joint.entry_or_default(fi, label) += amount;
            }
        }
        if features.contains(&default_fi) {
            *joint.entry_or_default(default_fi, label) += weight;
        }
    }

    let mut targets = BTreeMap::new();
    for &fi in features {
        let mut target = vec![0.0; config.num_labels];
        for (li, &mass) in joint.curry(fi) {
            target[li] = mass;
        }
        let total: f64 = target.iter().sum();
        if total <= 0.0 {
            debug!(feature = fi, "Feature sem ocorrências rotuladas; alvo omitido");
            continue;
        }
        for t in &mut target {
            *t /= total;
        }
        targets.insert(fi, target);
    }
    targets
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::corpus::Instance;
    use crate::features::FeatureVector;

    fn labeled(entries: Vec<(Vec<usize>, Option<usize>, f64)>) -> InstanceList {
        let mut list = InstanceList::new();
        for (i, (features, label, w)) in entries.into_iter().enumerate() {
            list.push_weighted(Instance::new(FeatureVector::from_indices(features), label, format!("i{i}")), w);
        }
        list
    }

    #[test]
    fn test_conditional_label_distribution() {
        let config = ConstraintConfig::new(4, 2, false);
        let data = labeled(vec![
            (vec![0, 1], Some(0), 1.0),
            (vec![0], Some(1), 3.0),
            (vec![1], None, 5.0),
        ]);
        let features = BTreeSet::from([0, 1]);

        let targets = targets_from_data(&data, &features, &config);

        assert_eq!(targets[&0], vec![0.25, 0.75]);
        assert_eq!(targets[&1], vec![1.0, 0.0]);
    }

    #[test]
    fn test_default_feature_gets_label_prior() {
        let config = ConstraintConfig::new(4, 2, false);
        let data = labeled(vec![
            (vec![], Some(0), 1.0),
            (vec![2], Some(1), 1.0),
            (vec![3], Some(1), 2.0),
        ]);
        let features = BTreeSet::from([config.default_feature()]);

        let targets = targets_from_data(&data, &features, &config);

        assert_eq!(targets[&4], vec![0.25, 0.75]);
    }

    #[test]
    fn test_unseen_feature_omitted() {
        let config = ConstraintConfig::new(4, 2, false);
        let data = labeled(vec![(vec![0], Some(0), 1.0), (vec![1], None, 1.0)]);
        let features = BTreeSet::from([0, 1, 2]);

        let targets = targets_from_data(&data, &features, &config);

        assert_eq!(targets.keys().copied().collect::<Vec<_>>(), vec![0]);
    }
}
