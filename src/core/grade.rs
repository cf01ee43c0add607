use crate::domain::model::{GradeAverage, MissingScorePolicy, Period, PeriodScores, Score};
use crate::utils::error::{ClientError, Result};

/// Parses a score the way a browser `parseFloat` reads form input: leading
/// whitespace is skipped and the longest decimal prefix wins, so `"80abc"`
/// reads as 80. Anything without a numeric prefix is `Missing`.
pub fn parse_score(raw: &str) -> Score {
    match parse_float_prefix(raw) {
        Some(v) if !v.is_nan() => Score::Value(v),
        _ => Score::Missing,
    }
}

fn parse_float_prefix(raw: &str) -> Option<f64> {
    let s = raw.trim_start();
    let bytes = s.as_bytes();
    let mut end = 0;

    let negative = match bytes.first() {
        Some(b'-') => {
            end = 1;
            true
        }
        Some(b'+') => {
            end = 1;
            false
        }
        _ => false,
    };

    if s[end..].starts_with("Infinity") {
        return Some(if negative {
            f64::NEG_INFINITY
        } else {
            f64::INFINITY
        });
    }

    let count_digits = |from: usize| bytes[from..].iter().take_while(|b| b.is_ascii_digit()).count();

    let int_digits = count_digits(end);
    end += int_digits;

    let mut frac_digits = 0;
    if bytes.get(end) == Some(&b'.') {
        frac_digits = count_digits(end + 1);
        if int_digits > 0 || frac_digits > 0 {
            end += 1 + frac_digits;
        }
    }

    if int_digits == 0 && frac_digits == 0 {
        return None;
    }

    // 指數部分必須有數字才算數，例如 "1e" 只取 "1"
    if matches!(bytes.get(end), Some(b'e') | Some(b'E')) {
        let mut exp_end = end + 1;
        if matches!(bytes.get(exp_end), Some(b'+') | Some(b'-')) {
            exp_end += 1;
        }
        let exp_digits = count_digits(exp_end);
        if exp_digits > 0 {
            end = exp_end + exp_digits;
        }
    }

    s[..end].parse::<f64>().ok()
}

impl Score {
    /// Reads a score from a loosely-typed JSON value. Numbers are taken as
    /// is, strings go through [`parse_score`], everything else is missing.
    pub fn from_value(value: &serde_json::Value) -> Self {
        match value {
            serde_json::Value::Number(n) => n.as_f64().map(Score::Value).unwrap_or(Score::Missing),
            serde_json::Value::String(s) => parse_score(s),
            _ => Score::Missing,
        }
    }
}

impl PeriodScores {
    pub fn new(prelim: Score, midterm: Score, finals: Score) -> Self {
        Self {
            prelim,
            midterm,
            finals,
        }
    }

    pub fn parse(prelim: &str, midterm: &str, finals: &str) -> Self {
        Self::new(parse_score(prelim), parse_score(midterm), parse_score(finals))
    }

    pub fn get(&self, period: Period) -> Score {
        match period {
            Period::Prelim => self.prelim,
            Period::Midterm => self.midterm,
            Period::Final => self.finals,
        }
    }

    pub fn missing(&self) -> Vec<Period> {
        Period::ALL
            .into_iter()
            .filter(|p| self.get(*p).is_missing())
            .collect()
    }

    pub fn average(&self, policy: MissingScorePolicy) -> GradeAverage {
        let missing = self.missing();
        let present: Vec<f64> = Period::ALL
            .into_iter()
            .filter_map(|p| self.get(p).value())
            .collect();
        let sum: f64 = present.iter().sum();

        let (value, counted) = match policy {
            MissingScorePolicy::CountAsZero => (Some(sum / Period::ALL.len() as f64), Period::ALL.len()),
            MissingScorePolicy::Exclude if present.is_empty() => (None, 0),
            MissingScorePolicy::Exclude => (Some(sum / present.len() as f64), present.len()),
        };

        GradeAverage {
            value,
            counted,
            missing,
        }
    }

    /// Strict variant: every period must carry a score.
    pub fn validate(&self) -> Result<[f64; 3]> {
        match (self.prelim, self.midterm, self.finals) {
            (Score::Value(p), Score::Value(m), Score::Value(f)) => Ok([p, m, f]),
            _ => {
                let names: Vec<&str> = self.missing().iter().map(Period::label).collect();
                Err(ClientError::ValidationError {
                    message: format!("missing or non-numeric score for {}", names.join(", ")),
                })
            }
        }
    }
}

/// `(prelim + midterm + final) / 3`, with unparseable inputs counting as zero.
pub fn average(prelim: &str, midterm: &str, finals: &str) -> f64 {
    PeriodScores::parse(prelim, midterm, finals)
        .average(MissingScorePolicy::CountAsZero)
        .value
        .unwrap_or(0.0)
}

pub fn round_2_decimals(x: f64) -> f64 {
    (x * 100.0).round() / 100.0
}
