//! # Erros do motor de restrições
//!
//! Todas as falhas deste crate são erros de uso (configuração inconsistente ou
//! chamada fora de ordem pelo treinador). Elas são sempre devolvidas ao chamador,
//! nunca corrigidas silenciosamente: mascarar um erro aqui corromperia as
//! estatísticas de treino sem aviso.

use thiserror::Error;

/// Erro de uso do motor de restrições.
#[derive(Debug, Error)]
pub enum ConstraintError {
    /// Um vetor (alvo ou distribuição de labels) não tem `num_labels` posições.
    #[error("dimensão incompatível: esperado {expected} labels, recebido {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    /// A feature já possui uma restrição registrada.
    #[error("restrição já registrada para a feature {0}")]
    DuplicateConstraint(usize),

    /// Nenhuma restrição registrada para a feature.
    #[error("nenhuma restrição registrada para a feature {0}")]
    NotFound(usize),

    /// Acumulação antes de `reset_expectations` na iteração corrente.
    ///
    /// `None` quando o registro inteiro nunca foi zerado; `Some(fi)` quando só a
    /// feature `fi` (registrada depois do reset) está sem expectativa.
    #[error("expectativa não inicializada{}; chame reset_expectations antes", feature_suffix(.0))]
    UninitializedExpectation(Option<usize>),

    /// Índice acima da feature padrão (`num_features`).
    #[error("feature {feature} fora do intervalo [0, {max}]")]
    FeatureOutOfRange { feature: usize, max: usize },

    /// Alvo rejeitado pelo tipo de restrição.
    #[error("alvo inválido para a feature {feature}: {reason}")]
    InvalidTarget { feature: usize, reason: String },

    #[error("configuração inválida: {0}")]
    InvalidConfig(String),

    #[error("erro ao ler JSON: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, ConstraintError>;

fn feature_suffix(feature: &Option<usize>) -> String {
    feature.map(|fi| format!(" (feature {fi})")).unwrap_or_default()
}
