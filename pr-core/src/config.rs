//! # Configuração do conjunto de restrições
//!
//! Três parâmetros definem o espaço em que as restrições vivem:
//! - `num_features`: quantidade de features reais de entrada. O índice
//!   `num_features` em si é reservado para a **feature padrão**.
//! - `num_labels`: quantidade de labels (classes) do classificador.
//! - `use_values`: se `true`, contagens e expectativas são ponderadas pelo valor
//!   da feature; se `false`, cada ocorrência conta como indicador binário.

use serde::{Deserialize, Serialize};

use crate::error::{ConstraintError, Result};

/// Parâmetros de construção de um conjunto de restrições.
///
/// # Exemplo
/// ```rust
/// use pr_core::ConstraintConfig;
///
/// let config = ConstraintConfig::from_json_str(
///     r#"{ "num_features": 3, "num_labels": 2 }"#
/// ).unwrap();
///
/// assert_eq!(config.default_feature(), 3);
/// assert!(!config.use_values);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConstraintConfig {
    pub num_features: usize,
    pub num_labels: usize,
    #[serde(default)]
    pub use_values: bool,
}

impl ConstraintConfig {
    pub fn new(num_features: usize, num_labels: usize, use_values: bool) -> Self {
        Self {
            num_features,
            num_labels,
            use_values,
        }
    }

    /// Lê e valida a configuração a partir de um documento JSON.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Rejeita configurações sem labels.
    pub fn validate(&self) -> Result<()> {
        if self.num_labels == 0 {
            return Err(ConstraintError::InvalidConfig(
                "num_labels deve ser maior que zero".to_string(),
            ));
        }
        Ok(())
    }

    /// Índice da feature sintética usada para regularizar a marginal de labels.
    pub fn default_feature(&self) -> usize {
        self.num_features
    }
}
