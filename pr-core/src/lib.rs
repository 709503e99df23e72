//! # pr-core — Restrições de Expectativa para Posterior Regularization
//!
//! Este crate implementa o motor de acumulação de restrições usado no treino de um
//! classificador de Entropia Máxima com **Posterior Regularization** (PR): cada
//! feature de entrada restrita carrega uma expectativa alvo sobre os labels e uma
//! expectativa acumulada do modelo, comparadas pelo treinador externo.
//!
//! ## Protocolo em duas fases
//!
//! 1.  **Varredura do corpus** ([`preprocess`]): uma passada sobre as instâncias
//!     estabelece as contagens empíricas e devolve o [`MembershipSet`] das
//!     instâncias que acionaram alguma restrição.
//! 2.  **Laço interno** ([`cache`], [`expectation`]): para cada instância, o cache
//!     guarda as features restritas presentes e a acumulação soma a distribuição de
//!     labels prevista nas expectativas, sem revarrer o vetor de features completo.
//!
//! A **feature padrão** (índice `num_features`) é sintética e está presente em
//! toda instância; restringi-la regulariza a marginal de labels.
//!
//! ## Exemplo de Uso
//!
//! ```rust
//! use pr_core::{ConstraintConfig, FeatureLabelConstraints, FeatureVector};
//!
//! let config = ConstraintConfig::new(3, 2, false);
//! let mut constraints = FeatureLabelConstraints::l2(config).unwrap();
//! constraints.add_constraint(config.default_feature(), vec![0.5, 0.5], 1.0).unwrap();
//!
//! constraints.reset_expectations();
//! constraints.increment_expectations(&FeatureVector::new(), &[0.25, 0.75], 2.0).unwrap();
//!
//! let record = constraints.get(3).unwrap();
//! assert_eq!(record.expectation(), Some(&[0.5, 1.5][..]));
//! ```
//!
//! ## Módulos Principais
//!
//! - [`engine`]: fachada com o protocolo completo.
//! - [`registry`]: dono dos registros de restrição.
//! - [`features`] e [`corpus`]: vetores esparsos, alfabeto e instâncias ponderadas.
//! - [`targets`] e [`feature_count`]: apoio para escolher features e alvos.

pub mod cache;
pub mod config;
pub mod constraint;
pub mod corpus;
pub mod engine;
pub mod error;
pub mod expectation;
pub mod feature_count;
pub mod features;
pub mod membership;
pub mod pair_map;
pub mod preprocess;
pub mod registry;
pub mod targets;

pub use cache::InstanceCache;
pub use config::ConstraintConfig;
pub use constraint::{ConstraintKind, ConstraintRecord};
pub use corpus::{Instance, InstanceList};
pub use engine::FeatureLabelConstraints;
pub use error::{ConstraintError, Result};
pub use expectation::ExpectationUpdate;
pub use features::{Alphabet, FeatureVector};
pub use membership::MembershipSet;
pub use registry::{ConstraintRegistry, ExpectationState};
