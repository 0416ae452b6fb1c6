//! Timed press scheduling
//!
//! A press is planned up front: every key goes down at once, in request order,
//! and each key has its own release offset. Offsets live in an ordered map, so
//! two keys asking for the same offset are spread one millisecond apart in the
//! order they were requested.

use super::injector::Injector;
use super::keys::{KeyNameResolver, ScanCode};
use super::pacer::{Pacer, Wait};
use crate::commands::tokenizer::parse_millis;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

/// Down order and release offsets (ms) for one press command
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct PressPlan {
    pub downs: Vec<ScanCode>,
    pub ups: BTreeMap<u64, ScanCode>,
}

impl PressPlan {
    pub fn is_empty(&self) -> bool {
        self.downs.is_empty()
    }
}

/// Build a plan from `(key, duration)` pairs, skipping unresolved keys and
/// zero durations
///
/// A pair whose release offset would run past `u64::MAX` is dropped.
pub fn plan_pairs(pairs: impl IntoIterator<Item = (ScanCode, u64)>) -> PressPlan {
    let mut plan = PressPlan::default();

    for (code, millis) in pairs {
        if code.is_none() || millis == 0 {
            continue;
        }

        let Some(offset) = free_offset(&plan.ups, millis) else {
            warn!(code = code.0, millis, "no free release offset, skipping key");
            continue;
        };

        plan.downs.push(code);
        plan.ups.insert(offset, code);
    }

    plan
}

fn free_offset(ups: &BTreeMap<u64, ScanCode>, millis: u64) -> Option<u64> {
    let mut offset = millis;
    while ups.contains_key(&offset) {
        offset = offset.checked_add(1)?;
    }
    Some(offset)
}

/// Plan `press` arguments: `key ms key ms ...`, a missing trailing duration
/// takes `default_ms`
pub fn plan_press(keys: &KeyNameResolver, args: &[String], default_ms: u64) -> PressPlan {
    let pairs = args.chunks(2).map(|pair| {
        let code = keys.resolve(&pair[0]);
        let millis = pair.get(1).map_or(default_ms, |t| parse_millis(t));
        (code, millis)
    });
    plan_pairs(pairs)
}

/// Executes key commands against an injector in real (or virtual) time
pub struct PressScheduler {
    keys: Arc<KeyNameResolver>,
    injector: Injector,
    pacer: Arc<dyn Pacer>,
    default_ms: u64,
}

impl PressScheduler {
    pub fn new(
        keys: Arc<KeyNameResolver>,
        injector: Injector,
        pacer: Arc<dyn Pacer>,
        default_ms: u64,
    ) -> Self {
        Self {
            keys,
            injector,
            pacer,
            default_ms,
        }
    }

    pub fn pacer(&self) -> &Arc<dyn Pacer> {
        &self.pacer
    }

    /// `press key ms ...`
    pub fn press(&mut self, args: &[String]) {
        let plan = plan_press(&self.keys, args, self.default_ms);
        self.run(plan);
    }

    /// `tapkey key ...`, every key held for the default duration
    pub fn tap_key(&mut self, args: &[String]) {
        let default_ms = self.default_ms;
        let plan = plan_pairs(args.iter().map(|t| (self.keys.resolve(t), default_ms)));
        self.run(plan);
    }

    /// `holdkey key ...`
    pub fn hold_key(&mut self, args: &[String]) {
        for token in args {
            let code = self.keys.resolve(token);
            self.injector.down(code);
        }
    }

    /// `releasekey key ...`
    pub fn release_key(&mut self, args: &[String]) {
        for token in args {
            let code = self.keys.resolve(token);
            self.injector.up(code);
        }
    }

    fn run(&mut self, plan: PressPlan) {
        if plan.is_empty() {
            return;
        }

        let start = self.pacer.now();
        for &code in &plan.downs {
            self.injector.down(code);
        }

        // Once cancelled, keep releasing but stop waiting
        let mut cancelled = false;
        for (&offset, &code) in &plan.ups {
            if !cancelled {
                let target = Duration::from_millis(offset);
                let elapsed = self.pacer.now().saturating_sub(start);
                if target > elapsed && self.pacer.wait(target - elapsed) == Wait::Cancelled {
                    warn!("press cancelled, releasing remaining keys");
                    cancelled = true;
                }
            }
            debug!(code = code.0, offset, "release");
            self.injector.up(code);
        }
    }
}
