//! # Registro de Restrições
//!
//! Mapa `índice da feature → ConstraintRecord`. O registro é o **único dono** dos
//! seus registros: nenhum outro componente guarda referências a eles entre
//! chamadas, e dois registros nunca compartilham estado.
//!
//! ## Ciclo das expectativas
//!
//! ```text
//! Stale ──reset──▶ Zeroed ──accumulate──▶ Accumulated ──reset──▶ Zeroed ...
//! ```
//!
//! O ciclo se repete uma vez por iteração de otimização e não tem estado final.

use std::collections::{BTreeSet, HashMap};

use serde::{Deserialize, Serialize};

use crate::constraint::{ConstraintKind, ConstraintRecord};
use crate::error::{ConstraintError, Result};

/// Estado das expectativas do ponto de vista do registro.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExpectationState {
    /// Nenhum reset desde a criação.
    Stale,
    /// Reset feito, nenhuma acumulação ainda.
    Zeroed,
    /// Pelo menos uma acumulação desde o último reset.
    Accumulated,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConstraintRegistry {
    num_labels: usize,
    kind: ConstraintKind,
    constraints: HashMap<usize, ConstraintRecord>,
    state: ExpectationState,
}

impl ConstraintRegistry {
    /// Registro de restrições L2.
    pub fn new(num_labels: usize) -> Self {
        Self::with_kind(num_labels, ConstraintKind::L2)
    }

    pub fn with_kind(num_labels: usize, kind: ConstraintKind) -> Self {
        Self {
            num_labels,
            kind,
            constraints: HashMap::new(),
            state: ExpectationState::Stale,
        }
    }

    pub fn num_labels(&self) -> usize {
        self.num_labels
    }

    pub fn kind(&self) -> ConstraintKind {
        self.kind
    }

    pub fn state(&self) -> ExpectationState {
        self.state
    }

    /// Registra uma restrição nova para a feature `fi`.
    ///
    /// # Erros
    /// - [`ConstraintError::DuplicateConstraint`] se `fi` já está registrada.
    /// - [`ConstraintError::DimensionMismatch`] se `target` não tem `num_labels` posições.
    /// - [`ConstraintError::InvalidTarget`] se o tipo da restrição rejeita o alvo.
    pub fn add(&mut self, fi: usize, target: Vec<f64>, weight: f64) -> Result<()> {
        if self.constraints.contains_key(&fi) {
            return Err(ConstraintError::DuplicateConstraint(fi));
        }
        let record = self.kind.build(fi, target, weight, self.num_labels)?;
        self.constraints.insert(fi, record);
        Ok(())
    }

    /// Substitui explicitamente a restrição de `fi`, devolvendo a anterior.
    ///
    /// A contagem empírica da restrição anterior não é herdada.
    pub fn replace(
        &mut self,
        fi: usize,
        target: Vec<f64>,
        weight: f64,
    ) -> Result<Option<ConstraintRecord>> {
        let record = self.kind.build(fi, target, weight, self.num_labels)?;
        Ok(self.constraints.insert(fi, record))
    }

    /// Teste de pertinência em O(1) esperado.
    pub fn has(&self, fi: usize) -> bool {
        self.constraints.contains_key(&fi)
    }

    pub fn get(&self, fi: usize) -> Result<&ConstraintRecord> {
        self.constraints.get(&fi).ok_or(ConstraintError::NotFound(fi))
    }

    pub(crate) fn get_mut(&mut self, fi: usize) -> Result<&mut ConstraintRecord> {
        self.constraints
            .get_mut(&fi)
            .ok_or(ConstraintError::NotFound(fi))
    }

    /// Substitui a expectativa de todos os registros por um vetor zerado.
    ///
    /// Alvo, peso e contagem não são alterados.
    pub fn reset_expectations(&mut self) {
        let num_labels = self.num_labels;
        for record in self.constraints.values_mut() {
            record.zero_expectation(num_labels);
        }
        self.state = ExpectationState::Zeroed;
    }

    pub(crate) fn mark_accumulated(&mut self) {
        self.state = ExpectationState::Accumulated;
    }

    /// Cópia das chaves atuais, em ordem crescente.
    pub fn all_feature_indices(&self) -> BTreeSet<usize> {
        self.constraints.keys().copied().collect()
    }

    pub fn len(&self) -> usize {
        self.constraints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.constraints.is_empty()
    }

    /// Itera sobre as restrições em ordem crescente de feature.
    pub fn iter(&self) -> impl Iterator<Item = (usize, &ConstraintRecord)> + '_ {
        let mut records: Vec<(usize, &ConstraintRecord)> =
            self.constraints.iter().map(|(fi, r)| (*fi, r)).collect();
        records.sort_unstable_by_key(|(fi, _)| *fi);
        records.into_iter()
    }
}
