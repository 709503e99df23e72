//! Cenários completos pela API pública: varredura, reset e acumulação.

use std::collections::BTreeSet;

use pr_core::corpus::build_demo_corpus;
use pr_core::targets::targets_from_data;
use pr_core::{
    Alphabet, ConstraintConfig, ConstraintError, ExpectationUpdate, FeatureLabelConstraints,
    FeatureVector, Instance, InstanceList,
};

fn two_instance_corpus() -> InstanceList {
    let mut data = InstanceList::new();
    data.push_weighted(Instance::new(FeatureVector::from_indices([1]), None, "i0"), 1.0);
    data.push_weighted(Instance::new(FeatureVector::from_indices([0, 2]), None, "i1"), 2.0);
    data
}

#[test]
fn test_end_to_end_scenario() {
    let config = ConstraintConfig::new(3, 2, false);
    let mut constraints = FeatureLabelConstraints::l2(config).unwrap();
    constraints.add_constraint(1, vec![0.2, 0.8], 1.0).unwrap();

    let data = two_instance_corpus();
    let membership = constraints.scan_corpus(&data);

    assert_eq!(constraints.get(1).unwrap().count(), 1.0);
    assert_eq!(membership.iter().collect::<Vec<_>>(), vec![0]);

    constraints.reset_expectations();
    let instance0 = &data.get(0).unwrap().features;
    constraints.increment_expectations(instance0, &[0.3, 0.7], 1.0).unwrap();

    assert_eq!(constraints.get(1).unwrap().expectation(), Some(&[0.3, 0.7][..]));
}

#[test]
fn test_mismatch_scenario_leaves_expectations_unchanged() {
    let config = ConstraintConfig::new(3, 2, false);
    let mut constraints = FeatureLabelConstraints::l2(config).unwrap();
    constraints.add_constraint(1, vec![0.2, 0.8], 1.0).unwrap();
    constraints.add_constraint(3, vec![0.5, 0.5], 1.0).unwrap();
    constraints.reset_expectations();

    let input = FeatureVector::from_indices([1]);
    constraints.increment_expectations(&input, &[0.3, 0.7], 1.0).unwrap();
    let before: Vec<Vec<f64>> = constraints
        .registry()
        .iter()
        .map(|(_, r)| r.expectation().unwrap().to_vec())
        .collect();

    let err = constraints
        .increment_expectations(&input, &[0.2, 0.3, 0.5], 1.0)
        .unwrap_err();
    assert!(matches!(
        err,
        ConstraintError::DimensionMismatch { expected: 2, actual: 3 }
    ));

    let after: Vec<Vec<f64>> = constraints
        .registry()
        .iter()
        .map(|(_, r)| r.expectation().unwrap().to_vec())
        .collect();
    assert_eq!(before, after);
}

#[test]
fn test_count_equals_weight_sum_plus_default() {
    let config = ConstraintConfig::new(3, 2, false);
    let mut constraints = FeatureLabelConstraints::l2(config).unwrap();
    constraints.add_constraint(0, vec![0.5, 0.5], 1.0).unwrap();
    constraints.add_constraint(3, vec![0.5, 0.5], 1.0).unwrap();

    let mut data = two_instance_corpus();
    data.push_weighted(Instance::new(FeatureVector::new(), None, "i2"), 4.0);
    let membership = constraints.scan_corpus(&data);

    assert_eq!(constraints.get(0).unwrap().count(), 2.0);
    assert_eq!(constraints.get(3).unwrap().count(), 7.0);
    assert_eq!(membership.count(), 3);
}

#[test]
fn test_demo_corpus_training_iterations() {
    let mut features = Alphabet::new();
    let mut labels = Alphabet::new();
    let data = build_demo_corpus(&mut features, &mut labels);
    features.freeze();

    let config = ConstraintConfig::new(features.len(), labels.len(), false);
    let seeds: BTreeSet<usize> = ["ótimo", "fraco"]
        .iter()
        .filter_map(|w| features.lookup_index(w))
        .chain([config.default_feature()])
        .collect();
    let targets = targets_from_data(&data, &seeds, &config);
    assert_eq!(targets.len(), 3);

    let mut constraints = FeatureLabelConstraints::kl(config).unwrap();
    for (fi, target) in targets {
        constraints.add_constraint(fi, target, 1.0).unwrap();
    }
    let membership = constraints.scan_corpus(&data);
    // A feature padrão aciona todas as instâncias
    assert_eq!(membership.count(), data.len());

    let uniform = vec![0.5; config.num_labels];
    for _ in 0..2 {
        constraints.reset_expectations();
        let batch: Vec<ExpectationUpdate<'_>> = membership
            .iter()
            .filter_map(|ii| data.get(ii))
            .map(|inst| ExpectationUpdate {
                input: &inst.features,
                distribution: &uniform,
                weight: 1.0,
            })
            .collect();
        constraints.increment_expectations_parallel(&batch).unwrap();

        // Com distribuição uniforme, a expectativa total iguala a contagem
        for (_, record) in constraints.registry().iter() {
            let total: f64 = record.expectation().unwrap().iter().sum();
            assert!((total - record.count()).abs() < 1e-9);
        }
    }
}
