//! Execution engine - drives remote calls for planned decisions

use crate::context::{ConfirmCallback, ProgressCallback, Provider};
use crate::error::{Error, Result};
use crate::planner::{PlanDecision, plan};
use crate::resource::{Resource, ResourceExt};
use crate::types::{ApplyResult, Deletion, ExecuteOptions, ExecuteSummary};
use rayon::prelude::*;
use std::collections::BTreeSet;
use std::marker::PhantomData;

/// Result of reconciling one resource instance
#[derive(Debug, Clone)]
pub struct Outcome<R: Resource> {
    /// What the planner decided
    pub decision: PlanDecision<R::Attribute>,
    /// What actually happened
    pub result: ApplyResult,
    /// Observed state after execution, `None` when the object is gone
    pub state: Option<R>,
}

/// Issues create/read/update/delete calls against a [`Provider`]
///
/// The executor holds no state between calls beyond the provider
/// reference and the dry-run flag; every call works only on the
/// observed/desired pair it is given.
pub struct Executor<'a, R: Resource, P: Provider<R> + ?Sized> {
    provider: &'a P,
    dry_run: bool,
    _resource: PhantomData<fn() -> R>,
}

impl<'a, R: Resource, P: Provider<R> + ?Sized> Executor<'a, R, P> {
    /// Create an executor over a provider
    pub fn new(provider: &'a P) -> Self {
        Self {
            provider,
            dry_run: false,
            _resource: PhantomData,
        }
    }

    /// Plan only; never issue mutating calls
    pub fn dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Create a remote object from the full desired state
    pub fn create(&self, desired: &R) -> Result<R> {
        log::debug!("creating {} '{}'", R::RESOURCE_TYPE, desired.id());
        let created = self.provider.create(desired)?;
        Ok(created.normalize())
    }

    /// Read a remote object, `None` when it does not exist
    pub fn read(&self, id: &str) -> Result<Option<R>> {
        log::debug!("reading {} '{}'", R::RESOURCE_TYPE, id);
        match self.provider.read(id) {
            Ok(found) => Ok(found.map(Resource::normalize)),
            Err(e) if e.is_not_found() => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Build state for an existing remote object from its id alone
    pub fn import(&self, id: &str) -> Result<R> {
        self.read(id)?.ok_or_else(|| Error::NotFound {
            resource_type: R::RESOURCE_TYPE,
            id: id.to_string(),
        })
    }

    /// Apply in-place changes; the id is never touched
    pub fn update(&self, observed: &R, desired: &R, changed: &BTreeSet<R::Attribute>) -> Result<R> {
        debug_assert!(
            changed.iter().all(|a| !R::change_kind(*a).forces_replace()),
            "update called with replace-only attributes"
        );
        log::debug!(
            "updating {} '{}': {:?}",
            R::RESOURCE_TYPE,
            observed.id(),
            changed
        );
        let changed: Vec<R::Attribute> = changed.iter().copied().collect();
        let updated = self.provider.update(observed, desired, &changed)?;
        Ok(updated.normalize())
    }

    /// Delete a remote object; an already absent object counts as deleted
    pub fn delete(&self, id: &str) -> Result<Deletion> {
        log::debug!("deleting {} '{}'", R::RESOURCE_TYPE, id);
        match self.provider.delete(id) {
            Ok(deletion) => Ok(deletion),
            Err(e) if e.is_not_found() => Ok(Deletion::AlreadyAbsent),
            Err(e) => Err(e),
        }
    }

    /// Destroy `observed`, then create `desired`
    ///
    /// Create is only attempted after delete succeeded. If create then
    /// fails the old object is already gone, which is reported as
    /// [`Error::ReplaceFailure`] instead of an ordinary remote error.
    pub fn replace(&self, observed: &R, desired: &R) -> Result<R> {
        let deletion = self.delete(observed.id())?;
        if deletion == Deletion::AlreadyAbsent {
            log::warn!(
                "{} '{}' was already gone before replace",
                R::RESOURCE_TYPE,
                observed.id()
            );
        }

        self.create(desired).map_err(|source| {
            log::error!(
                "{} '{}' deleted but '{}' could not be created",
                R::RESOURCE_TYPE,
                observed.id(),
                desired.id()
            );
            Error::ReplaceFailure {
                resource_type: R::RESOURCE_TYPE,
                id: observed.id().to_string(),
                source: Box::new(source),
            }
        })
    }

    /// Validate, normalize, plan and execute one instance
    ///
    /// `observed` is the last known remote state, `desired` the declared
    /// state; `None` means absent on that side.
    pub fn reconcile(&self, observed: Option<&R>, desired: Option<&R>) -> Result<Outcome<R>> {
        let desired = desired.map(|d| prepare(d.clone())).transpose()?;
        let decision = plan(observed, desired.as_ref());
        self.execute_plan(observed, desired, decision)
    }

    /// Execute an already computed decision
    ///
    /// `desired` must have been prepared (validated and normalized).
    pub(crate) fn execute_plan(
        &self,
        observed: Option<&R>,
        desired: Option<R>,
        decision: PlanDecision<R::Attribute>,
    ) -> Result<Outcome<R>> {
        if !decision.has_changes() {
            return Ok(Outcome {
                decision,
                result: ApplyResult::NoChange,
                state: observed.cloned(),
            });
        }

        if self.dry_run {
            return Ok(Outcome {
                decision,
                result: ApplyResult::Skipped {
                    reason: "Dry run".into(),
                },
                state: observed.cloned(),
            });
        }

        let (result, state) = match (observed, desired) {
            (None, None) => (ApplyResult::NoChange, None),
            (None, Some(desired)) => (ApplyResult::Created, Some(self.create(&desired)?)),
            (Some(observed), None) => {
                self.delete(observed.id())?;
                (ApplyResult::Removed, None)
            }
            (Some(observed), Some(desired)) => match &decision {
                PlanDecision::UpdateInPlace(changed) => (
                    ApplyResult::Modified,
                    Some(self.update(observed, &desired, changed)?),
                ),
                PlanDecision::Replace(_) => (
                    ApplyResult::Replaced,
                    Some(self.replace(observed, &desired)?),
                ),
                _ => (ApplyResult::NoChange, Some(observed.clone())),
            },
        };

        log::info!("{}: {}", decision, result_label(&result));
        Ok(Outcome {
            decision,
            result,
            state,
        })
    }
}

/// Validate then normalize, wrapping failures with the resource identity
pub fn prepare<R: Resource>(desired: R) -> Result<R> {
    let id = desired.id().to_string();
    desired.prepare().map_err(|source| Error::Validation {
        resource_type: R::RESOURCE_TYPE,
        id,
        source,
    })
}

fn result_label(result: &ApplyResult) -> &'static str {
    match result {
        ApplyResult::NoChange => "no change",
        ApplyResult::Created => "created",
        ApplyResult::Modified => "modified",
        ApplyResult::Replaced => "replaced",
        ApplyResult::Removed => "removed",
        ApplyResult::Failed { .. } => "failed",
        ApplyResult::Skipped { .. } => "skipped",
    }
}

/// One managed instance handed to the batch executor
#[derive(Debug, Clone)]
pub struct Reconciliation<R> {
    /// Host-side address of the instance (stable across renames)
    pub address: String,
    /// Last known remote state
    pub observed: Option<R>,
    /// Declared state
    pub desired: Option<R>,
}

/// Per-instance result of a batch execution
#[derive(Debug)]
pub struct Applied<R: Resource> {
    pub address: String,
    pub outcome: Result<Outcome<R>>,
}

impl<R: Resource> Applied<R> {
    /// Apply result, mapping errors to `Failed`
    pub fn result(&self) -> ApplyResult {
        match &self.outcome {
            Ok(outcome) => outcome.result.clone(),
            Err(e) => ApplyResult::Failed {
                error: e.to_string(),
            },
        }
    }
}

/// Result of a batch execution
#[derive(Debug)]
pub struct ExecuteReport<R: Resource> {
    pub summary: ExecuteSummary,
    pub applied: Vec<Applied<R>>,
}

struct Planned<R: Resource> {
    item: Reconciliation<R>,
    prepared: Result<(Option<R>, PlanDecision<R::Attribute>)>,
}

/// Execute a batch of independent instances with the given options and callbacks
///
/// # Arguments
/// * `items` - Instances to reconcile; each is planned independently
/// * `provider` - Remote API client shared by all instances
/// * `opts` - Execution options (dry_run, jobs)
/// * `progress` - Progress callback
/// * `confirm` - Confirmation callback, asked once when anything would change
///
/// # Returns
/// Per-instance outcomes in input order, plus a summary
pub fn execute<R, P, Pr, C>(
    items: Vec<Reconciliation<R>>,
    provider: &P,
    opts: ExecuteOptions,
    progress: &mut Pr,
    confirm: &mut C,
) -> anyhow::Result<ExecuteReport<R>>
where
    R: Resource,
    P: Provider<R> + ?Sized,
    Pr: ProgressCallback,
    C: ConfirmCallback,
{
    // Validation and planning are pure; failures never reach the provider
    let planned: Vec<Planned<R>> = items
        .into_iter()
        .map(|item| {
            let prepared = item
                .desired
                .clone()
                .map(prepare)
                .transpose()
                .map(|desired| {
                    let decision = plan(item.observed.as_ref(), desired.as_ref());
                    (desired, decision)
                });
            Planned { item, prepared }
        })
        .collect();

    let changes: Vec<(String, String)> = planned
        .iter()
        .filter_map(|p| match &p.prepared {
            Ok((_, decision)) if decision.has_changes() => {
                Some((p.item.address.clone(), decision.to_string()))
            }
            _ => None,
        })
        .collect();

    let proceed = if changes.is_empty() || opts.dry_run {
        true
    } else {
        confirm.confirm(&changes)?
    };

    let executor = Executor::new(provider).dry_run(opts.dry_run);
    let run = |p: Planned<R>| -> Applied<R> {
        let Planned { item, prepared } = p;
        let outcome = prepared.and_then(|(desired, decision)| {
            if !proceed && decision.has_changes() {
                return Ok(Outcome {
                    decision,
                    result: ApplyResult::Skipped {
                        reason: "Not confirmed".into(),
                    },
                    state: item.observed.clone(),
                });
            }
            executor.execute_plan(item.observed.as_ref(), desired, decision)
        });
        Applied {
            address: item.address,
            outcome,
        }
    };

    // Invalid instances report `Failed`, so they count alongside the changes
    let reported = planned
        .iter()
        .filter(|p| p.prepared.as_ref().is_err())
        .count()
        + changes.len();
    progress.on_batch_start(reported);

    let applied: Vec<Applied<R>> = if opts.jobs <= 1 || planned.len() <= 1 {
        planned.into_iter().map(run).collect()
    } else {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(opts.jobs)
            .build()
            .map_err(|e| anyhow::anyhow!("Failed to create thread pool: {}", e))?;
        pool.install(|| planned.into_par_iter().map(run).collect())
    };

    // The progress callback is not thread-safe, so report after the pool is done
    let mut summary = ExecuteSummary::default();
    for a in &applied {
        let result = a.result();
        progress.on_resource_complete(&a.address, &result);
        summary.add_result(&result);
    }
    progress.on_batch_complete();

    Ok(ExecuteReport { summary, applied })
}

/// Simple execution without callbacks
///
/// For basic use cases where you don't need progress or confirmation.
pub fn execute_simple<R, P>(
    items: Vec<Reconciliation<R>>,
    provider: &P,
    opts: ExecuteOptions,
) -> anyhow::Result<ExecuteReport<R>>
where
    R: Resource,
    P: Provider<R> + ?Sized,
{
    use crate::context::{AutoConfirm, NoProgress};

    execute(items, provider, opts, &mut NoProgress, &mut AutoConfirm)
}
