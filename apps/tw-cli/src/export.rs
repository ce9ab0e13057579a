//! CSV and JSON renderings of a sweep result.

use serde::Serialize;
use tw_solver::{FreqResponse, SampleOutcome};

/// One row per frequency; unsolved samples leave the numeric columns empty.
pub fn to_csv(result: &FreqResponse) -> String {
    let mut csv = String::from("freq_hz,status,z_re_ohm,z_im_ohm,z_abs_ohm");
    for t in 0..result.num_turns {
        csv.push_str(&format!(",turn_{}_db", t + 1));
    }
    csv.push('\n');

    for sample in &result.samples {
        csv.push_str(&format!("{}", sample.freq_hz));
        match &sample.outcome {
            SampleOutcome::Solved(r) => {
                csv.push_str(&format!(
                    ",ok,{},{},{}",
                    r.impedance.re,
                    r.impedance.im,
                    r.impedance.norm()
                ));
                for db in r.gains_db() {
                    csv.push_str(&format!(",{db}"));
                }
            }
            SampleOutcome::Failed { .. } | SampleOutcome::Skipped => {
                let status = if matches!(sample.outcome, SampleOutcome::Skipped) {
                    "skipped"
                } else {
                    "failed"
                };
                csv.push_str(&format!(",{status},,,"));
                csv.push_str(&",".repeat(result.num_turns));
            }
        }
        csv.push('\n');
    }
    csv
}

#[derive(Debug, Serialize)]
pub struct SweepExport<'a> {
    pub project: &'a str,
    pub model: &'a str,
    pub num_turns: usize,
    pub cancelled: bool,
    pub samples: Vec<SampleExport<'a>>,
}

#[derive(Debug, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SampleExport<'a> {
    Ok {
        freq_hz: f64,
        z_re_ohm: f64,
        z_im_ohm: f64,
        gains_db: Vec<f64>,
    },
    Failed {
        freq_hz: f64,
        reason: &'a str,
    },
    Skipped {
        freq_hz: f64,
    },
}

impl<'a> SweepExport<'a> {
    pub fn new(project: &'a str, result: &'a FreqResponse) -> Self {
        let samples = result
            .samples
            .iter()
            .map(|s| match &s.outcome {
                SampleOutcome::Solved(r) => SampleExport::Ok {
                    freq_hz: s.freq_hz,
                    z_re_ohm: r.impedance.re,
                    z_im_ohm: r.impedance.im,
                    gains_db: r.gains_db(),
                },
                SampleOutcome::Failed { reason } => SampleExport::Failed {
                    freq_hz: s.freq_hz,
                    reason,
                },
                SampleOutcome::Skipped => SampleExport::Skipped { freq_hz: s.freq_hz },
            })
            .collect();
        Self {
            project,
            model: result.model,
            num_turns: result.num_turns,
            cancelled: result.cancelled,
            samples,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use num_complex::Complex64;
    use tw_solver::{FrequencySample, PointResponse};

    fn result() -> FreqResponse {
        FreqResponse {
            model: "mtl",
            num_turns: 2,
            samples: vec![
                FrequencySample {
                    freq_hz: 100.0,
                    outcome: SampleOutcome::Solved(PointResponse {
                        impedance: Complex64::new(3.0, 4.0),
                        terminal_impedance: Complex64::new(3.0, 4.0),
                        gains: vec![Complex64::new(1.0, 0.0), Complex64::new(0.1, 0.0)],
                    }),
                },
                FrequencySample {
                    freq_hz: 1000.0,
                    outcome: SampleOutcome::Failed {
                        reason: "singular".to_string(),
                    },
                },
            ],
            cancelled: false,
        }
    }

    #[test]
    fn csv_keeps_column_count_for_failures() {
        let csv = to_csv(&result());
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(
            lines[0],
            "freq_hz,status,z_re_ohm,z_im_ohm,z_abs_ohm,turn_1_db,turn_2_db"
        );
        assert!(lines[1].starts_with("100,ok,3,4,5,0,"));
        assert_eq!(lines[2], "1000,failed,,,,,");
        for line in &lines {
            assert_eq!(line.matches(',').count(), 6);
        }
    }

    #[test]
    fn json_tags_each_sample() {
        let r = result();
        let json = serde_json::to_value(SweepExport::new("demo", &r)).unwrap();
        assert_eq!(json["model"], "mtl");
        assert_eq!(json["samples"][0]["status"], "ok");
        assert_eq!(json["samples"][1]["status"], "failed");
        assert_eq!(json["samples"][1]["reason"], "singular");
    }
}
