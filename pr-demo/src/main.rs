//! Demonstração do ciclo de treino com restrições de expectativa.
//!
//! Um classificador log-linear mínimo é ajustado ao corpus de brinquedo usando
//! apenas restrições sobre algumas palavras-semente e sobre a marginal de labels.
//! A cada iteração o laço faz exatamente o que um treinador PR faz com o motor:
//! zera as expectativas, acumula as distribuições previstas e compara com os alvos.
//!
//! Uso: `pr-demo [settings.json]`

use std::collections::BTreeSet;
use std::error::Error;

use pr_core::corpus::build_demo_corpus;
use pr_core::feature_count::FeatureCounts;
use pr_core::targets::targets_from_data;
use pr_core::{
    Alphabet, ConstraintConfig, ConstraintKind, ConstraintRecord, FeatureLabelConstraints,
    FeatureVector, MembershipSet,
};
use serde::Deserialize;
use tracing::{error, info, warn};

/// Parâmetros da demonstração, lidos de um JSON opcional.
#[derive(Debug, Deserialize)]
#[serde(default)]
struct DemoSettings {
    iterations: usize,
    learning_rate: f64,
    constraint_weight: f64,
    use_values: bool,
    kind: ConstraintKind,
    seed_words: Vec<String>,
    /// Restringe também a feature padrão (marginal de labels).
    label_regularization: bool,
}

impl Default for DemoSettings {
    fn default() -> Self {
        Self {
            iterations: 20,
            learning_rate: 1.0,
            constraint_weight: 1.0,
            use_values: false,
            kind: ConstraintKind::L2,
            seed_words: vec!["ótimo".into(), "linda".into(), "fraco".into(), "chato".into()],
            label_regularization: true,
        }
    }
}

/// Modelo log-linear: um vetor de pesos por label, com a feature padrão como viés.
struct LogLinear {
    weights: Vec<Vec<f64>>,
    bias_index: usize,
}

impl LogLinear {
    fn new(num_labels: usize, num_features: usize) -> Self {
        Self {
            weights: vec![vec![0.0; num_features + 1]; num_labels],
            bias_index: num_features,
        }
    }

    fn distribution(&self, fv: &FeatureVector) -> Vec<f64> {
        let scores: Vec<f64> = self
            .weights
            .iter()
            .map(|w| fv.dot(w) + w[self.bias_index])
            .collect();
        let max = scores.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
        let exps: Vec<f64> = scores.iter().map(|s| (s - max).exp()).collect();
        let sum: f64 = exps.iter().sum();
        exps.iter().map(|e| e / sum).collect()
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    if let Err(e) = run() {
        error!("Falha na demonstração: {e}");
        std::process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn Error>> {
    let settings = match std::env::args().nth(1) {
        Some(path) => serde_json::from_str(&std::fs::read_to_string(path)?)?,
        None => DemoSettings::default(),
    };
    info!(?settings, "Configuração carregada");

    let mut features = Alphabet::new();
    let mut labels = Alphabet::new();
    let data = build_demo_corpus(&mut features, &mut labels);
    features.freeze();

    let config = ConstraintConfig::new(features.len(), labels.len(), settings.use_values);
    config.validate()?;

    for line in FeatureCounts::count(&data, config.num_features).report(&features) {
        info!("{line}");
    }

    let mut seeds = BTreeSet::new();
    for word in &settings.seed_words {
        match features.lookup_index(word) {
            Some(fi) => {
                seeds.insert(fi);
            }
            None => warn!(word = word.as_str(), "Palavra-semente fora do vocabulário"),
        }
    }
    if settings.label_regularization {
        seeds.insert(config.default_feature());
    }

    let mut constraints = FeatureLabelConstraints::new(config, settings.kind)?;
    for (fi, target) in targets_from_data(&data, &seeds, &config) {
        constraints.add_constraint(fi, target, settings.constraint_weight)?;
    }
    info!(constraints = constraints.registry().len(), "Restrições registradas");

    let membership = constraints.scan_corpus(&data);
    info!(
        constrained = membership.count(),
        total = data.len(),
        "Instâncias com restrições acionadas"
    );

    let mut model = LogLinear::new(config.num_labels, config.num_features);
    for iteration in 0..settings.iterations {
        let violation = train_iteration(&mut constraints, &mut model, &data, &membership, &settings)?;
        if iteration % 5 == 0 || iteration + 1 == settings.iterations {
            info!(iteration, violation = %format!("{violation:.6}"), "Iteração concluída");
        }
    }

    for (fi, record) in constraints.registry().iter() {
        let name = features.lookup_object(fi).unwrap_or("<padrão>");
        let Some(normalized) = normalized_expectation(record) else {
            info!(feature = name, target = ?record.target(), "Restrição final sem ocorrências");
            continue;
        };
        let normalized: Vec<String> = normalized.iter().map(|e| format!("{e:.3}")).collect();
        info!(
            feature = name,
            target = ?record.target(),
            expectation = ?normalized,
            "Restrição final"
        );
    }

    for (ii, instance) in data.iter().enumerate() {
        if instance.label.is_none() {
            let dist = model.distribution(&instance.features);
            let best = dist
                .iter()
                .enumerate()
                .max_by(|a, b| a.1.total_cmp(b.1))
                .map(|(li, _)| li)
                .unwrap_or(0);
            info!(
                instance = ii,
                predicted = labels.lookup_object(best).unwrap_or("?"),
                "Predição em documento não rotulado"
            );
        }
    }
    Ok(())
}

/// Expectativa dividida pela contagem; `None` se a feature nunca ocorreu no corpus.
fn normalized_expectation(record: &ConstraintRecord) -> Option<Vec<f64>> {
    if record.count() <= 0.0 {
        return None;
    }
    let expectation = record.expectation()?;
    Some(expectation.iter().map(|e| e / record.count()).collect())
}

/// Uma iteração: reset, acumulação sobre as instâncias restritas e passo de gradiente.
///
/// Devolve a violação quadrática ponderada antes do passo.
fn train_iteration(
    constraints: &mut FeatureLabelConstraints,
    model: &mut LogLinear,
    data: &pr_core::InstanceList,
    membership: &MembershipSet,
    settings: &DemoSettings,
) -> pr_core::Result<f64> {
    constraints.reset_expectations();
    for ii in membership.iter() {
        if let Some(instance) = data.get(ii) {
            let dist = model.distribution(&instance.features);
            constraints.increment_expectations(&instance.features, &dist, data.instance_weight(ii))?;
        }
    }

    let mut violation = 0.0;
    for (fi, record) in constraints.registry().iter() {
        if record.count() <= 0.0 {
            continue;
        }
        let expectation = record.expectation().unwrap_or(&[]);
        for (li, (target, e)) in record.target().iter().zip(expectation).enumerate() {
            let diff = target - e / record.count();
            violation += record.weight() * diff * diff;
            model.weights[li][fi] += settings.learning_rate * record.weight() * diff;
        }
    }
    Ok(violation)
}
