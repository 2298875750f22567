//! The process-wide random number generator behind [`Matrix::randn`](crate::Matrix::randn).
//!
//! The generator is created on first use and shared by every matrix, regardless of backend. It
//! is never reseeded implicitly, so consecutive calls produce independent samples.
//!
//! If the `DENSEMAT_SEED` environment variable holds an unsigned integer, the generator is seeded
//! with it and sample sequences are reproducible across runs. Otherwise (or if the value is
//! invalid) it is seeded from operating system entropy.

use std::{
    env::{self, VarError},
    sync::{Mutex, MutexGuard, OnceLock, PoisonError},
};

use rand::{rngs::StdRng, Rng, SeedableRng};
use rand_distr::StandardNormal;

const SEED_VAR: &str = "DENSEMAT_SEED";

static RNG: OnceLock<Mutex<StdRng>> = OnceLock::new();

fn seed_from_env() -> Option<u64> {
    match env::var(SEED_VAR).as_deref() {
        Ok(value) => match value.trim().parse() {
            Ok(seed) => Some(seed),
            Err(e) => {
                log::warn!(
                    "invalid value set for `{SEED_VAR}` variable: '{value}' ({e}); using entropy"
                );
                None
            }
        },
        Err(VarError::NotPresent) => None,
        Err(VarError::NotUnicode(s)) => {
            log::warn!(
                "invalid value set for `{SEED_VAR}` variable: {}; using entropy",
                s.to_string_lossy()
            );
            None
        }
    }
}

fn rng() -> MutexGuard<'static, StdRng> {
    let rng = RNG.get_or_init(|| {
        let rng = match seed_from_env() {
            Some(seed) => {
                log::debug!("seeding normal generator with {SEED_VAR}={seed}");
                StdRng::seed_from_u64(seed)
            }
            None => {
                log::debug!("seeding normal generator from entropy");
                StdRng::from_entropy()
            }
        };
        Mutex::new(rng)
    });
    // The generator state is valid even if a thread panicked while holding the lock.
    rng.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Reseeds the process-wide generator, making subsequent samples reproducible.
pub fn reseed(seed: u64) {
    log::debug!("reseeding normal generator with {seed}");
    *rng() = StdRng::seed_from_u64(seed);
}

/// Overwrites `buf` with independent samples of the standard normal distribution.
pub(crate) fn fill_standard_normal(buf: &mut [f64]) {
    if buf.is_empty() {
        return;
    }
    let mut rng = rng();
    for x in buf {
        *x = rng.sample(StandardNormal);
    }
}
