//! # Corpus de Instâncias Ponderadas
//!
//! Uma [`InstanceList`] é a coleção que o treinador percorre: cada [`Instance`]
//! carrega um vetor de features esparso e, opcionalmente, o label observado.
//! O peso de cada instância vem da política de ponderação da lista (1.0 por
//! padrão, sobrescrito instância a instância).
//!
//! O módulo também traz um pequeno corpus de brinquedo, já tokenizado, de
//! opiniões sobre filmes em Português Brasileiro. Ele alimenta o binário de
//! demonstração e os testes.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::features::{Alphabet, FeatureVector};

/// Uma instância de treino.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Instance {
    pub features: FeatureVector,
    /// Label observado, quando a instância é rotulada.
    pub label: Option<usize>,
    pub name: String,
}

impl Instance {
    pub fn new(features: FeatureVector, label: Option<usize>, name: impl Into<String>) -> Self {
        Self {
            features,
            label,
            name: name.into(),
        }
    }
}

/// Coleção ordenada de instâncias com pesos.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InstanceList {
    instances: Vec<Instance>,
    /// Pesos explícitos por posição; ausentes valem 1.0.
    weights: HashMap<usize, f64>,
}

impl InstanceList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, instance: Instance) {
        self.instances.push(instance);
    }

    pub fn push_weighted(&mut self, instance: Instance, weight: f64) {
        let ii = self.instances.len();
        self.instances.push(instance);
        self.weights.insert(ii, weight);
    }

    pub fn len(&self) -> usize {
        self.instances.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instances.is_empty()
    }

    pub fn get(&self, ii: usize) -> Option<&Instance> {
        self.instances.get(ii)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Instance> {
        self.instances.iter()
    }

    pub fn instance_weight(&self, ii: usize) -> f64 {
        self.weights.get(&ii).copied().unwrap_or(1.0)
    }

    pub fn set_instance_weight(&mut self, ii: usize, weight: f64) {
        self.weights.insert(ii, weight);
    }

    /// Itera sobre `(posição, instância, peso)` na ordem do corpus.
    pub fn weighted(&self) -> impl Iterator<Item = (usize, &Instance, f64)> + '_ {
        self.instances
            .iter()
            .enumerate()
            .map(move |(ii, inst)| (ii, inst, self.instance_weight(ii)))
    }
}

impl<'a> IntoIterator for &'a InstanceList {
    type Item = &'a Instance;
    type IntoIter = std::slice::Iter<'a, Instance>;

    fn into_iter(self) -> Self::IntoIter {
        self.instances.iter()
    }
}

/// Um documento do corpus de brinquedo.
pub struct DemoDocument {
    /// Palavras do documento (bag-of-words, já normalizadas).
    pub words: &'static [&'static str],
    /// `None` marca documentos não rotulados.
    pub label: Option<&'static str>,
}

/// Labels do corpus de brinquedo, na ordem dos índices.
pub const DEMO_LABELS: [&str; 2] = ["negativo", "positivo"];

/// Retorna o corpus de brinquedo.
pub fn demo_documents() -> Vec<DemoDocument> {
    vec![
        DemoDocument {
            words: &["filme", "ótimo", "atuação", "excelente"],
            label: Some("positivo"),
        },
        DemoDocument {
            words: &["roteiro", "fraco", "filme", "chato"],
            label: Some("negativo"),
        },
        DemoDocument {
            words: &["trilha", "sonora", "linda", "ótimo"],
            label: Some("positivo"),
        },
        DemoDocument {
            words: &["péssimo", "roteiro", "atuação", "fraco"],
            label: Some("negativo"),
        },
        DemoDocument {
            words: &["excelente", "direção", "fotografia", "linda"],
            label: Some("positivo"),
        },
        DemoDocument {
            words: &["chato", "longo", "péssimo"],
            label: Some("negativo"),
        },
        DemoDocument {
            words: &["filme", "longo", "mas", "ótimo"],
            label: None,
        },
        DemoDocument {
            words: &["direção", "fraco", "roteiro"],
            label: None,
        },
        DemoDocument {
            words: &["atuação", "linda", "emocionante"],
            label: None,
        },
        DemoDocument {
            words: &["trilha", "chato"],
            label: None,
        },
    ]
}

/// Constrói a [`InstanceList`] do corpus de brinquedo.
///
/// As palavras são registradas em `features` e os labels em `labels`
/// (primeiro os de [`DEMO_LABELS`], para que os índices sejam estáveis).
pub fn build_demo_corpus(features: &mut Alphabet, labels: &mut Alphabet) -> InstanceList {
    for label in DEMO_LABELS {
        labels.lookup_or_insert(label);
    }

    let mut list = InstanceList::new();
    for (i, doc) in demo_documents().iter().enumerate() {
        let fv = features.vectorize(doc.words.iter().map(|w| (*w, 1.0)));
        let label = doc.label.and_then(|l| labels.lookup_index(l));
        list.push(Instance::new(fv, label, format!("doc-{i}")));
    }
    list
}
