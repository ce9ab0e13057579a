//! Log-spaced frequency sweep over any [`ResponseModel`].
//!
//! Frequencies are independent: each one is solved in isolation and written
//! into its own preallocated slot. A failure at one frequency is recorded in
//! that slot and the sweep moves on.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use nalgebra::DMatrix;
use num_complex::Complex64;
use rayon::prelude::*;
use tracing::{debug, info_span, warn};
use tw_core::{Frequency, hz, log_space};
use uom::si::frequency::hertz;

use crate::error::{SolverError, SolverResult};
use crate::response::{PointResponse, ResponseModel};

/// Sweep range and execution settings.
#[derive(Debug, Clone, PartialEq)]
pub struct SweepConfig {
    pub min_freq: Frequency,
    pub max_freq: Frequency,
    pub num_steps: usize,
    /// Worker threads; 1 runs on the calling thread.
    pub parallelism: usize,
}

impl Default for SweepConfig {
    fn default() -> Self {
        Self {
            min_freq: hz(1.0e3),
            max_freq: hz(1.0e7),
            num_steps: 100,
            parallelism: 1,
        }
    }
}

impl SweepConfig {
    pub fn validate(&self) -> SolverResult<()> {
        let (lo, hi) = (self.min_freq.get::<hertz>(), self.max_freq.get::<hertz>());
        if !(lo > 0.0 && hi.is_finite() && hi >= lo) {
            return Err(SolverError::Config {
                what: format!("frequency range {lo}..{hi} Hz must be positive and ascending"),
            });
        }
        if self.num_steps == 0 {
            return Err(SolverError::Config {
                what: "sweep needs at least one step".to_string(),
            });
        }
        if self.parallelism == 0 {
            return Err(SolverError::Config {
                what: "parallelism must be at least 1".to_string(),
            });
        }
        Ok(())
    }

    /// The swept frequencies (Hz); both endpoints are exact.
    pub fn frequencies(&self) -> SolverResult<Vec<f64>> {
        self.validate()?;
        Ok(log_space(
            self.min_freq.get::<hertz>(),
            self.max_freq.get::<hertz>(),
            self.num_steps,
        )?)
    }
}

/// Result of one frequency.
#[derive(Debug, Clone, PartialEq)]
pub enum SampleOutcome {
    Solved(PointResponse),
    Failed { reason: String },
    /// Not evaluated because the sweep was cancelled first.
    Skipped,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FrequencySample {
    pub freq_hz: f64,
    pub outcome: SampleOutcome,
}

impl FrequencySample {
    pub fn response(&self) -> Option<&PointResponse> {
        match &self.outcome {
            SampleOutcome::Solved(r) => Some(r),
            _ => None,
        }
    }
}

/// All samples of a sweep, in ascending frequency order.
#[derive(Debug, Clone, PartialEq)]
pub struct FreqResponse {
    pub model: &'static str,
    pub num_turns: usize,
    pub samples: Vec<FrequencySample>,
    pub cancelled: bool,
}

impl FreqResponse {
    pub fn frequencies(&self) -> Vec<f64> {
        self.samples.iter().map(|s| s.freq_hz).collect()
    }

    /// Driving-point impedance per frequency; `None` where the sample did not solve.
    pub fn impedances(&self) -> Vec<Option<Complex64>> {
        self.samples
            .iter()
            .map(|s| s.response().map(|r| r.impedance))
            .collect()
    }

    /// Gain in dB, rows = turns, columns = frequencies. Columns of unsolved
    /// samples are NaN; see [`FreqResponse::failures`].
    pub fn db_matrix(&self) -> DMatrix<f64> {
        let mut db = DMatrix::from_element(self.num_turns, self.samples.len(), f64::NAN);
        for (col, s) in self.samples.iter().enumerate() {
            if let Some(r) = s.response() {
                for (row, v) in r.gains_db().into_iter().enumerate() {
                    db[(row, col)] = v;
                }
            }
        }
        db
    }

    /// `(index, frequency, reason)` of every failed sample.
    pub fn failures(&self) -> Vec<(usize, f64, &str)> {
        self.samples
            .iter()
            .enumerate()
            .filter_map(|(i, s)| match &s.outcome {
                SampleOutcome::Failed { reason } => Some((i, s.freq_hz, reason.as_str())),
                _ => None,
            })
            .collect()
    }

    pub fn solved_count(&self) -> usize {
        self.samples.iter().filter(|s| s.response().is_some()).count()
    }
}

/// A configured sweep with optional progress reporting and cancellation.
pub struct Sweep<'p> {
    config: SweepConfig,
    progress: Option<&'p (dyn Fn(u32) + Sync)>,
    cancel: Option<&'p AtomicBool>,
}

impl<'p> Sweep<'p> {
    pub fn new(config: SweepConfig) -> SolverResult<Self> {
        config.validate()?;
        Ok(Self {
            config,
            progress: None,
            cancel: None,
        })
    }

    /// Called with the integer percent done after every frequency.
    pub fn with_progress(mut self, progress: &'p (dyn Fn(u32) + Sync)) -> Self {
        self.progress = Some(progress);
        self
    }

    /// Once the flag is set no new frequency is started.
    pub fn with_cancel(mut self, cancel: &'p AtomicBool) -> Self {
        self.cancel = Some(cancel);
        self
    }

    pub fn config(&self) -> &SweepConfig {
        &self.config
    }

    pub fn run(&self, model: &dyn ResponseModel) -> SolverResult<FreqResponse> {
        let freqs = self.config.frequencies()?;
        let total = freqs.len();
        let _span = info_span!("sweep", model = model.name(), steps = total).entered();

        let mut slots: Vec<FrequencySample> = freqs
            .iter()
            .map(|&freq_hz| FrequencySample {
                freq_hz,
                outcome: SampleOutcome::Skipped,
            })
            .collect();
        let done = AtomicUsize::new(0);

        let evaluate = |slot: &mut FrequencySample| {
            if self.cancel.is_some_and(|c| c.load(Ordering::Relaxed)) {
                return;
            }
            slot.outcome = match model.response_at(hz(slot.freq_hz)) {
                Ok(r) => SampleOutcome::Solved(r),
                Err(e) => {
                    warn!(freq_hz = slot.freq_hz, error = %e, "frequency failed");
                    SampleOutcome::Failed {
                        reason: e.to_string(),
                    }
                }
            };
            let finished = done.fetch_add(1, Ordering::Relaxed) + 1;
            if let Some(progress) = self.progress {
                progress((finished * 100 / total) as u32);
            }
        };

        if self.config.parallelism == 1 {
            slots.iter_mut().for_each(evaluate);
        } else {
            let pool = rayon::ThreadPoolBuilder::new()
                .num_threads(self.config.parallelism)
                .build()
                .map_err(|e| SolverError::Config {
                    what: format!("thread pool: {e}"),
                })?;
            pool.install(|| slots.par_iter_mut().for_each(evaluate));
        }

        let cancelled = self.cancel.is_some_and(|c| c.load(Ordering::Relaxed));
        let result = FreqResponse {
            model: model.name(),
            num_turns: model.num_turns(),
            samples: slots,
            cancelled,
        };
        debug!(
            solved = result.solved_count(),
            failed = result.failures().len(),
            cancelled,
            "sweep finished"
        );
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;
    use tw_core::{Tolerances, nearly_equal};

    /// Fails above a cutoff, otherwise returns `Z = f`.
    struct Fake {
        fail_above: f64,
    }

    impl ResponseModel for Fake {
        fn name(&self) -> &'static str {
            "fake"
        }

        fn num_turns(&self) -> usize {
            2
        }

        fn response_at(&self, freq: Frequency) -> SolverResult<PointResponse> {
            let f = freq.get::<hertz>();
            if f > self.fail_above {
                return Err(SolverError::Singular {
                    what: "fake".to_string(),
                });
            }
            Ok(PointResponse {
                impedance: Complex64::new(f, 0.0),
                terminal_impedance: Complex64::new(f, 0.0),
                gains: vec![Complex64::new(1.0, 0.0), Complex64::new(0.1, 0.0)],
            })
        }
    }

    fn config(steps: usize, parallelism: usize) -> SweepConfig {
        SweepConfig {
            min_freq: hz(10.0),
            max_freq: hz(1.0e5),
            num_steps: steps,
            parallelism,
        }
    }

    #[test]
    fn samples_are_log_spaced_with_exact_endpoints() {
        let model = Fake {
            fail_above: f64::INFINITY,
        };
        let r = Sweep::new(config(5, 1)).unwrap().run(&model).unwrap();
        let f = r.frequencies();
        assert_eq!(f.len(), 5);
        assert_eq!(f[0], 10.0);
        assert_eq!(f[4], 1.0e5);
        for w in f.windows(2) {
            assert!(nearly_equal(w[1] / w[0], 10.0, Tolerances::default()));
        }
        assert_eq!(r.solved_count(), 5);
    }

    #[test]
    fn failures_are_recorded_and_sweep_continues() {
        let model = Fake { fail_above: 2.0e3 };
        let r = Sweep::new(config(5, 1)).unwrap().run(&model).unwrap();
        let failed: Vec<usize> = r.failures().iter().map(|(i, _, _)| *i).collect();
        assert_eq!(failed, vec![3, 4]);
        assert!(r.impedances()[2].is_some());
        assert_eq!(r.impedances()[3], None);

        let db = r.db_matrix();
        assert_eq!(db.shape(), (2, 5));
        assert_eq!(db[(0, 0)], 0.0);
        assert!((db[(1, 0)] + 20.0).abs() < 1e-12);
        assert!(db[(0, 4)].is_nan());
    }

    #[test]
    fn parallel_matches_sequential() {
        let model = Fake { fail_above: 5.0e4 };
        let seq = Sweep::new(config(17, 1)).unwrap().run(&model).unwrap();
        let par = Sweep::new(config(17, 4)).unwrap().run(&model).unwrap();
        assert_eq!(seq, par);
    }

    #[test]
    fn progress_reaches_one_hundred() {
        let model = Fake {
            fail_above: f64::INFINITY,
        };
        let seen = Mutex::new(Vec::new());
        let cb = |p: u32| seen.lock().unwrap().push(p);
        Sweep::new(config(4, 1))
            .unwrap()
            .with_progress(&cb)
            .run(&model)
            .unwrap();
        assert_eq!(*seen.lock().unwrap(), vec![25, 50, 75, 100]);
    }

    #[test]
    fn cancelled_sweep_skips_everything() {
        let model = Fake {
            fail_above: f64::INFINITY,
        };
        let cancel = AtomicBool::new(true);
        let r = Sweep::new(config(3, 2))
            .unwrap()
            .with_cancel(&cancel)
            .run(&model)
            .unwrap();
        assert!(r.cancelled);
        assert_eq!(r.solved_count(), 0);
        assert!(r.samples.iter().all(|s| s.outcome == SampleOutcome::Skipped));
    }

    #[test]
    fn invalid_configs_rejected() {
        assert!(Sweep::new(config(0, 1)).is_err());
        assert!(Sweep::new(config(3, 0)).is_err());
        let backwards = SweepConfig {
            min_freq: hz(100.0),
            max_freq: hz(10.0),
            ..config(3, 1)
        };
        assert!(Sweep::new(backwards).is_err());
    }
}
