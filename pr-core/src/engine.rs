//! # Conjunto de Restrições Feature-Label
//!
//! Fachada que o treinador externo usa: junta configuração, registro e cache de
//! instância e expõe o protocolo completo na ordem em que ele acontece.
//!
//! ```text
//! add_constraint (construção)
//!   └─ scan_corpus (uma vez por época ou globalmente)
//!        └─ por iteração de otimização:
//!             reset_expectations
//!             └─ por instância: increment_expectations
//! ```

use std::collections::BTreeSet;

use crate::cache::InstanceCache;
use crate::config::ConstraintConfig;
use crate::constraint::{ConstraintKind, ConstraintRecord};
use crate::corpus::InstanceList;
use crate::error::{ConstraintError, Result};
use crate::expectation::{self, ExpectationUpdate};
use crate::features::FeatureVector;
use crate::membership::MembershipSet;
use crate::preprocess;
use crate::registry::{ConstraintRegistry, ExpectationState};

/// Restrições de expectativa sobre pares (feature de entrada, label).
///
/// Um conjunto por modelo treinado. Não há sincronização interna: o conjunto
/// supõe um único escritor por vez. Para paralelizar sobre instâncias use
/// [`FeatureLabelConstraints::increment_expectations_parallel`].
///
/// # Exemplo
/// ```rust
/// use pr_core::{ConstraintConfig, FeatureLabelConstraints, FeatureVector, Instance, InstanceList};
///
/// let config = ConstraintConfig::new(3, 2, false);
/// let mut constraints = FeatureLabelConstraints::l2(config).unwrap();
/// constraints.add_constraint(1, vec![0.2, 0.8], 1.0).unwrap();
///
/// let mut data = InstanceList::new();
/// data.push_weighted(Instance::new(FeatureVector::from_indices([1]), None, "a"), 1.0);
/// data.push_weighted(Instance::new(FeatureVector::from_indices([0]), None, "b"), 2.0);
///
/// let membership = constraints.scan_corpus(&data);
/// assert_eq!(membership.iter().collect::<Vec<_>>(), vec![0]);
///
/// constraints.reset_expectations();
/// let first = &data.get(0).unwrap().features;
/// constraints.increment_expectations(first, &[0.3, 0.7], 1.0).unwrap();
/// assert_eq!(constraints.get(1).unwrap().expectation(), Some(&[0.3, 0.7][..]));
/// ```
#[derive(Debug, Clone)]
pub struct FeatureLabelConstraints {
    config: ConstraintConfig,
    registry: ConstraintRegistry,
    cache: InstanceCache,
}

impl FeatureLabelConstraints {
    pub fn new(config: ConstraintConfig, kind: ConstraintKind) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            registry: ConstraintRegistry::with_kind(config.num_labels, kind),
            cache: InstanceCache::new(),
        })
    }

    pub fn l2(config: ConstraintConfig) -> Result<Self> {
        Self::new(config, ConstraintKind::L2)
    }

    pub fn kl(config: ConstraintConfig) -> Result<Self> {
        Self::new(config, ConstraintKind::KullbackLeibler)
    }

    pub fn config(&self) -> &ConstraintConfig {
        &self.config
    }

    pub fn kind(&self) -> ConstraintKind {
        self.registry.kind()
    }

    pub fn registry(&self) -> &ConstraintRegistry {
        &self.registry
    }

    pub fn state(&self) -> ExpectationState {
        self.registry.state()
    }

    /// Registra uma restrição. `fi == num_features` restringe a feature padrão.
    pub fn add_constraint(&mut self, fi: usize, target: Vec<f64>, weight: f64) -> Result<()> {
        self.check_feature(fi)?;
        self.registry.add(fi, target, weight)
    }

    /// Substitui explicitamente uma restrição existente (ou cria uma nova).
    pub fn replace_constraint(
        &mut self,
        fi: usize,
        target: Vec<f64>,
        weight: f64,
    ) -> Result<Option<ConstraintRecord>> {
        self.check_feature(fi)?;
        self.registry.replace(fi, target, weight)
    }

    pub fn has(&self, fi: usize) -> bool {
        self.registry.has(fi)
    }

    pub fn get(&self, fi: usize) -> Result<&ConstraintRecord> {
        self.registry.get(fi)
    }

    pub fn all_feature_indices(&self) -> BTreeSet<usize> {
        self.registry.all_feature_indices()
    }

    pub fn reset_expectations(&mut self) {
        self.registry.reset_expectations();
    }

    pub fn scan_corpus(&mut self, data: &InstanceList) -> MembershipSet {
        preprocess::scan_corpus(data, &mut self.registry, &self.config)
    }

    pub fn preprocess_instance(&mut self, input: &FeatureVector) {
        self.cache.preprocess(input, &self.registry, &self.config);
    }

    /// Features restritas da última instância processada.
    pub fn cached_features(&self) -> &InstanceCache {
        &self.cache
    }

    pub fn increment_expectations(
        &mut self,
        input: &FeatureVector,
        dist: &[f64],
        weight: f64,
    ) -> Result<()> {
        expectation::accumulate(
            &mut self.cache,
            input,
            dist,
            weight,
            &mut self.registry,
            &self.config,
        )
    }

    pub fn increment_expectations_parallel(&mut self, batch: &[ExpectationUpdate<'_>]) -> Result<()> {
        expectation::accumulate_parallel(batch, &mut self.registry, &self.config)
    }

    fn check_feature(&self, fi: usize) -> Result<()> {
        let max = self.config.default_feature();
        if fi > max {
            return Err(ConstraintError::FeatureOutOfRange { feature: fi, max });
        }
        Ok(())
    }
}
