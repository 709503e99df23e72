//! # Registro de uma Restrição
//!
//! Cada feature restrita carrega quatro estatísticas:
//!
//! | Campo | Significado | Mutação |
//! |-------|-------------|---------|
//! | `count` | Contagem empírica ponderada da feature no corpus | Cresce a cada varredura do corpus |
//! | `weight` | Peso externo da restrição (força da penalidade) | Nunca |
//! | `target` | Expectativa alvo por label | Nunca |
//! | `expectation` | Expectativa do modelo por label | Zerada a cada iteração, depois acumulada |

use serde::{Deserialize, Serialize};

use crate::error::{ConstraintError, Result};

/// Família da restrição, escolhida ao construir o conjunto de restrições.
///
/// O tipo decide quais alvos são aceitos. A penalidade em si (quadrática ou
/// divergência KL) é calculada pelo treinador externo.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConstraintKind {
    /// Penalidade quadrática; qualquer alvo finito é aceito.
    #[default]
    L2,
    /// Divergência KL; o alvo precisa ser uma distribuição de probabilidade.
    KullbackLeibler,
}

impl ConstraintKind {
    const SUM_TOLERANCE: f64 = 1e-6;

    /// Valida `target` para a feature `fi` e constrói o registro.
    pub fn build(
        self,
        fi: usize,
        target: Vec<f64>,
        weight: f64,
        num_labels: usize,
    ) -> Result<ConstraintRecord> {
        if target.len() != num_labels {
            return Err(ConstraintError::DimensionMismatch {
                expected: num_labels,
                actual: target.len(),
            });
        }
        if let Some(reason) = self.reject_reason(&target) {
            return Err(ConstraintError::InvalidTarget { feature: fi, reason });
        }
        Ok(ConstraintRecord::new(self, target, weight))
    }

    fn reject_reason(self, target: &[f64]) -> Option<String> {
        if target.iter().any(|t| !t.is_finite()) {
            return Some("alvo contém valores não finitos".to_string());
        }
        match self {
            ConstraintKind::L2 => None,
            ConstraintKind::KullbackLeibler => {
                if target.iter().any(|&t| t < 0.0) {
                    return Some("alvo KL contém probabilidade negativa".to_string());
                }
                let sum: f64 = target.iter().sum();
                if (sum - 1.0).abs() > Self::SUM_TOLERANCE {
                    return Some(format!("alvo KL soma {sum}, esperado 1"));
                }
                None
            }
        }
    }
}

/// Estatísticas de uma feature restrita.
///
/// O alvo é fixado na construção. A expectativa começa ausente e só existe
/// depois do primeiro `reset_expectations` do registro.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConstraintRecord {
    kind: ConstraintKind,
    count: f64,
    weight: f64,
    target: Vec<f64>,
    expectation: Option<Vec<f64>>,
}

impl ConstraintRecord {
    fn new(kind: ConstraintKind, target: Vec<f64>, weight: f64) -> Self {
        Self {
            kind,
            count: 0.0,
            weight,
            target,
            expectation: None,
        }
    }

    pub fn kind(&self) -> ConstraintKind {
        self.kind
    }

    pub fn count(&self) -> f64 {
        self.count
    }

    pub fn weight(&self) -> f64 {
        self.weight
    }

    pub fn target(&self) -> &[f64] {
        &self.target
    }

    /// `None` até o primeiro reset de expectativas.
    pub fn expectation(&self) -> Option<&[f64]> {
        self.expectation.as_deref()
    }

    pub(crate) fn add_count(&mut self, amount: f64) {
        self.count += amount;
    }

    pub(crate) fn zero_expectation(&mut self, num_labels: usize) {
        self.expectation = Some(vec![0.0; num_labels]);
    }

    pub(crate) fn expectation_mut(&mut self) -> Option<&mut [f64]> {
        self.expectation.as_deref_mut()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_record_has_no_expectation() {
        let record = ConstraintKind::L2.build(1, vec![0.2, 0.8], 1.0, 2).unwrap();
        assert_eq!(record.count(), 0.0);
        assert_eq!(record.weight(), 1.0);
        assert_eq!(record.target(), &[0.2, 0.8]);
        assert!(record.expectation().is_none());
    }

    #[test]
    fn test_target_length_checked() {
        let err = ConstraintKind::L2.build(0, vec![1.0], 1.0, 2).unwrap_err();
        assert!(matches!(
            err,
            ConstraintError::DimensionMismatch { expected: 2, actual: 1 }
        ));
    }

    #[test]
    fn test_l2_accepts_unnormalized_target() {
        assert!(ConstraintKind::L2.build(0, vec![3.0, -1.0], 1.0, 2).is_ok());
    }

    #[test]
    fn test_kl_requires_distribution() {
        let err = ConstraintKind::KullbackLeibler
            .build(5, vec![0.5, 0.6], 1.0, 2)
            .unwrap_err();
        assert!(matches!(err, ConstraintError::InvalidTarget { feature: 5, .. }));

        let err = ConstraintKind::KullbackLeibler
            .build(5, vec![1.5, -0.5], 1.0, 2)
            .unwrap_err();
        assert!(matches!(err, ConstraintError::InvalidTarget { .. }));

        assert!(ConstraintKind::KullbackLeibler.build(5, vec![0.25, 0.75], 1.0, 2).is_ok());
    }

    #[test]
    fn test_non_finite_target_rejected() {
        let err = ConstraintKind::L2.build(0, vec![f64::NAN, 0.0], 1.0, 2).unwrap_err();
        assert!(matches!(err, ConstraintError::InvalidTarget { .. }));
    }

    #[test]
    fn test_zero_expectation_keeps_statistics() {
        let mut record = ConstraintKind::L2.build(0, vec![0.5, 0.5], 2.0, 2).unwrap();
        record.add_count(3.0);
        record.zero_expectation(2);

        assert_eq!(record.expectation(), Some(&[0.0, 0.0][..]));
        assert_eq!(record.count(), 3.0);
        assert_eq!(record.weight(), 2.0);
    }
}
