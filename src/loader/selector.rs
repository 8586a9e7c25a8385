//! Choosing between in-process and isolated loading

use super::ModuleLoader;
use crate::types::{LoadStrategy, ModuleKind};

/// Why a strategy was chosen
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecisionReason {
    /// Isolation forced by configuration; no probe was made
    Forced,
    /// The probe reported an ES module
    DeclaredModule,
    /// The probe itself failed to load
    ProbeFailed(String),
    /// The probe reported a CommonJS module
    CommonJs,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Decision {
    pub strategy: LoadStrategy,
    pub reason: DecisionReason,
}

impl Decision {
    fn isolated(reason: DecisionReason) -> Self {
        Self { strategy: LoadStrategy::Isolated, reason }
    }
}

/// Decides per module whether the timed load runs in-process or isolated.
///
/// Unless isolation is forced, the decision costs one throwaway in-process
/// load (the probe). The loader discards its cache state and the probe is
/// never timed, but the probe does execute the module's top-level code once
/// more per run.
#[derive(Debug, Clone, Copy, Default)]
pub struct IsolationSelector {
    force_isolated: bool,
}

impl IsolationSelector {
    pub fn new(force_isolated: bool) -> Self {
        Self { force_isolated }
    }

    pub fn is_forced(&self) -> bool {
        self.force_isolated
    }

    pub async fn decide<L: ModuleLoader + ?Sized>(&self, loader: &mut L, path: &str) -> Decision {
        if self.force_isolated {
            return Decision::isolated(DecisionReason::Forced);
        }

        match loader.probe(path).await {
            Ok(ModuleKind::Module) => Decision::isolated(DecisionReason::DeclaredModule),
            Ok(ModuleKind::CommonJs) => Decision {
                strategy: LoadStrategy::InProcess,
                reason: DecisionReason::CommonJs,
            },
            Err(e) => Decision::isolated(DecisionReason::ProbeFailed(e.to_string())),
        }
    }
}
