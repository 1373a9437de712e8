//! Call-shape negotiation table
//!
//! Given a [`Signature`] and the optional components the caller can offer,
//! [`negotiation_plan`] lists the call shapes to try, in order. Every plan
//! carries both the model and the tools, either positionally or by keyword,
//! so no attempt ever builds an orchestrator without them.
//!
//! 1. One all-keyword plan, using the first declared alias of each component.
//! 2. Positional orderings `(model, tools, prompt)`, `(tools, model, prompt)`,
//!    `(model, tools)`, `(tools, model)`, `(model,)`, `(tools,)`. Each one is
//!    tried with every declared flag alias first, then bare.

use std::fmt;

use super::signature::{ArgumentKind, Signature};

pub const MODEL_ALIASES: &[&str] = &["llm", "model"];
pub const TOOLS_ALIASES: &[&str] = &["tools", "toolkit"];
pub const PROMPT_ALIASES: &[&str] = &["prompt", "system_prompt"];
pub const MEMORY_ALIASES: &[&str] = &["memory"];
pub const FLAG_ALIASES: &[&str] = &["debug", "verbose"];

const POSITIONAL_ORDERINGS: &[&[ArgumentKind]] = &[
    &[ArgumentKind::Model, ArgumentKind::Tools, ArgumentKind::Prompt],
    &[ArgumentKind::Tools, ArgumentKind::Model, ArgumentKind::Prompt],
    &[ArgumentKind::Model, ArgumentKind::Tools],
    &[ArgumentKind::Tools, ArgumentKind::Model],
    &[ArgumentKind::Model],
    &[ArgumentKind::Tools],
];

/// Which optional components the caller has values for
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Offer {
    pub prompt: bool,
    pub memory: bool,
}

/// Whether a plan came from the keyword mapping or a positional ordering
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlanOrigin {
    Keyword,
    Positional,
}

/// One call shape to attempt, described by kinds rather than values
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallPlan {
    pub origin: PlanOrigin,
    pub positional: Vec<ArgumentKind>,
    pub keyword: Vec<(String, ArgumentKind)>,
}

impl CallPlan {
    pub fn includes(&self, kind: ArgumentKind) -> bool {
        self.positional.contains(&kind) || self.keyword.iter().any(|(_, k)| *k == kind)
    }
}

impl fmt::Display for CallPlan {
    /// `(model, tools, debug=flag)`
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self
            .positional
            .iter()
            .map(|k| k.to_string())
            .chain(self.keyword.iter().map(|(n, k)| format!("{}={}", n, k)))
            .collect();
        write!(f, "({})", parts.join(", "))
    }
}

/// Ordered list of call shapes to try against `signature`
pub fn negotiation_plan(signature: &Signature, offer: Offer) -> Vec<CallPlan> {
    let model_alias = signature.first_declared(MODEL_ALIASES);
    let tools_alias = signature.first_declared(TOOLS_ALIASES);
    let flag_aliases = signature.all_declared(FLAG_ALIASES);
    let model_keyword = keyword_alias(signature, MODEL_ALIASES);
    let tools_keyword = keyword_alias(signature, TOOLS_ALIASES);

    let mut plans = Vec::new();

    if let (Some(model), Some(tools)) = (model_alias, tools_alias) {
        let mut keyword = vec![
            (model.to_string(), ArgumentKind::Model),
            (tools.to_string(), ArgumentKind::Tools),
        ];
        if offer.prompt
            && let Some(alias) = signature.first_declared(PROMPT_ALIASES)
        {
            keyword.push((alias.to_string(), ArgumentKind::Prompt));
        }
        if offer.memory
            && let Some(alias) = signature.first_declared(MEMORY_ALIASES)
        {
            keyword.push((alias.to_string(), ArgumentKind::Memory));
        }
        if let Some(flag) = flag_aliases.first() {
            keyword.push((flag.to_string(), ArgumentKind::Flag));
        }
        plans.push(CallPlan {
            origin: PlanOrigin::Keyword,
            positional: Vec::new(),
            keyword,
        });
    }

    for ordering in POSITIONAL_ORDERINGS {
        if ordering.contains(&ArgumentKind::Prompt) && !offer.prompt {
            continue;
        }

        // A lone model or tools needs the other half supplied by keyword
        let mut base_keyword = Vec::new();
        if !ordering.contains(&ArgumentKind::Model) {
            let Some(alias) = model_keyword else { continue };
            base_keyword.push((alias.to_string(), ArgumentKind::Model));
        }
        if !ordering.contains(&ArgumentKind::Tools) {
            let Some(alias) = tools_keyword else { continue };
            base_keyword.push((alias.to_string(), ArgumentKind::Tools));
        }

        for flag in &flag_aliases {
            let mut keyword = base_keyword.clone();
            keyword.push((flag.to_string(), ArgumentKind::Flag));
            plans.push(CallPlan {
                origin: PlanOrigin::Positional,
                positional: ordering.to_vec(),
                keyword,
            });
        }
        plans.push(CallPlan {
            origin: PlanOrigin::Positional,
            positional: ordering.to_vec(),
            keyword: base_keyword,
        });
    }

    plans
}

/// First declared alias that can actually be passed by keyword
fn keyword_alias<'a>(signature: &Signature, aliases: &[&'a str]) -> Option<&'a str> {
    aliases.iter().copied().find(|alias| {
        signature
            .parameter(alias)
            .is_some_and(|p| p.accepts_keyword())
    })
}
