/*!
 * Model routing.
 *
 * Picks the model (and the fallbacks to try after it) for a conversion from
 * an ordered routing table. The first route matching both the conversion
 * type and the source complexity wins; when none matches the provider's
 * configured model is used on its own.
 */

use crate::app_config::ModelRoute;
use crate::conversion::{Complexity, ConversionType};

/// Models to try for one file, in order
#[derive(Debug, Clone, PartialEq)]
pub struct ModelChoice {
    pub model: String,
    pub fallbacks: Vec<String>,
    pub complexity: Complexity,
}

impl ModelChoice {
    /// The primary model followed by the fallbacks, without duplicates
    pub fn candidates(&self) -> Vec<&str> {
        let mut out: Vec<&str> = Vec::with_capacity(1 + self.fallbacks.len());
        for model in std::iter::once(&self.model).chain(self.fallbacks.iter()) {
            let model = model.trim();
            if !model.is_empty() && !out.contains(&model) {
                out.push(model);
            }
        }
        out
    }
}

/// Lookup table from conversion and complexity to models
#[derive(Debug, Clone)]
pub struct ModelSelector {
    default_model: String,
    routes: Vec<ModelRoute>,
}

impl ModelSelector {
    pub fn new(default_model: impl Into<String>, routes: Vec<ModelRoute>) -> Self {
        Self {
            default_model: default_model.into(),
            routes,
        }
    }

    /// Always pick `model`, with no fallbacks
    pub fn single(model: impl Into<String>) -> Self {
        Self::new(model, Vec::new())
    }

    pub fn default_model(&self) -> &str {
        &self.default_model
    }

    pub fn select(&self, conversion_type: ConversionType, complexity: Complexity) -> ModelChoice {
        match self.routes.iter().find(|r| r.matches(conversion_type, complexity)) {
            Some(route) => ModelChoice {
                model: route.model.clone(),
                fallbacks: route.fallbacks.clone(),
                complexity,
            },
            None => ModelChoice {
                model: self.default_model.clone(),
                fallbacks: Vec::new(),
                complexity,
            },
        }
    }

    /// Select for a source file, classifying it by length
    pub fn select_for_source(&self, conversion_type: ConversionType, source: &str) -> ModelChoice {
        self.select(conversion_type, Complexity::from_source(source))
    }
}
