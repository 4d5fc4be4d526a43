use std::{
    fmt, fs, io,
    path::{Path, PathBuf},
    str::FromStr,
};

use serde::{Deserialize, Serialize};

/// Learning hyper-parameters.
///
/// On disk the parameters use a plain line-oriented format: one value per
/// line in the order `episodes`, `max_steps`, `learning_rate`,
/// `discount_factor`, `epsilon`. Anything after the fifth line is ignored.
///
/// # Example
///
/// ```
/// use rltetris_agent::params::AgentParams;
///
/// let params: AgentParams = "50\n2000\n0.001\n0.9\n0.1\n".parse().unwrap();
/// assert_eq!(params.episodes, 50);
/// assert_eq!(params.to_string().parse::<AgentParams>().unwrap(), params);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AgentParams {
    pub episodes: u32,
    pub max_steps: u32,
    pub learning_rate: f64,
    pub discount_factor: f64,
    /// Probability of choosing a random action.
    pub epsilon: f64,
}

impl Default for AgentParams {
    fn default() -> Self {
        Self {
            episodes: 10,
            max_steps: 10_000,
            learning_rate: 0.001,
            discount_factor: 0.9,
            epsilon: 0.1,
        }
    }
}

#[derive(Debug, derive_more::Display, derive_more::Error)]
pub enum AgentParamsError {
    #[display("failed to access {}: {source}", path.display())]
    Io { path: PathBuf, source: io::Error },
    #[display("missing value for {name} on line {line}")]
    Missing { name: &'static str, line: usize },
    #[display("invalid value for {name}: {value:?}")]
    Invalid { name: &'static str, value: String },
    #[display("{name} out of range: {value}")]
    OutOfRange { name: &'static str, value: f64 },
}

impl AgentParams {
    pub fn from_file<P>(path: P) -> Result<Self, AgentParamsError>
    where
        P: AsRef<Path>,
    {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| AgentParamsError::Io {
            path: path.to_owned(),
            source,
        })?;
        text.parse()
    }

    pub fn save<P>(&self, path: P) -> Result<(), AgentParamsError>
    where
        P: AsRef<Path>,
    {
        let path = path.as_ref();
        fs::write(path, self.to_string()).map_err(|source| AgentParamsError::Io {
            path: path.to_owned(),
            source,
        })
    }

    /// Checks that rates and probabilities are finite and in range.
    pub fn validate(&self) -> Result<(), AgentParamsError> {
        let checks = [
            ("learning_rate", self.learning_rate, self.learning_rate > 0.0),
            (
                "discount_factor",
                self.discount_factor,
                (0.0..=1.0).contains(&self.discount_factor),
            ),
            ("epsilon", self.epsilon, (0.0..=1.0).contains(&self.epsilon)),
        ];
        for (name, value, ok) in checks {
            if !ok || !value.is_finite() {
                return Err(AgentParamsError::OutOfRange { name, value });
            }
        }
        Ok(())
    }
}

impl FromStr for AgentParams {
    type Err = AgentParamsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut lines = s.lines().map(str::trim);
        let mut line_no = 0;
        let mut next = |name: &'static str| {
            line_no += 1;
            let line = line_no;
            lines
                .next()
                .filter(|value| !value.is_empty())
                .ok_or(AgentParamsError::Missing { name, line })
        };

        let episodes = parse_value("episodes", next("episodes")?)?;
        let max_steps = parse_value("max_steps", next("max_steps")?)?;
        let learning_rate = parse_value("learning_rate", next("learning_rate")?)?;
        let discount_factor = parse_value("discount_factor", next("discount_factor")?)?;
        let epsilon = parse_value("epsilon", next("epsilon")?)?;

        let params = Self {
            episodes,
            max_steps,
            learning_rate,
            discount_factor,
            epsilon,
        };
        params.validate()?;
        Ok(params)
    }
}

fn parse_value<T>(name: &'static str, value: &str) -> Result<T, AgentParamsError>
where
    T: FromStr,
{
    value.parse().map_err(|_| AgentParamsError::Invalid {
        name,
        value: value.to_owned(),
    })
}

impl fmt::Display for AgentParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.episodes)?;
        writeln!(f, "{}", self.max_steps)?;
        writeln!(f, "{}", self.learning_rate)?;
        writeln!(f, "{}", self.discount_factor)?;
        writeln!(f, "{}", self.epsilon)
    }
}

#[cfg(test)]
mod tests {
    use std::{env, process};

    use super::*;

    #[test]
    fn test_parse_line_format() {
        let params: AgentParams = "100\n5000\n0.01\n0.95\n0.2".parse().unwrap();
        assert_eq!(
            params,
            AgentParams {
                episodes: 100,
                max_steps: 5000,
                learning_rate: 0.01,
                discount_factor: 0.95,
                epsilon: 0.2,
            }
        );
    }

    #[test]
    fn test_parse_trims_and_ignores_trailing_lines() {
        let params: AgentParams = " 3 \r\n10\n0.5\n1\n0\nextra\n".parse().unwrap();
        assert_eq!(params.episodes, 3);
        assert!((params.discount_factor - 1.0).abs() < f64::EPSILON);
        assert!(params.epsilon.abs() < f64::EPSILON);
    }

    #[test]
    fn test_missing_value() {
        let err = "1\n2\n0.1\n".parse::<AgentParams>().unwrap_err();
        assert!(matches!(
            err,
            AgentParamsError::Missing {
                name: "discount_factor",
                line: 4
            }
        ));

        let err = "1\n\n0.1\n0.9\n0.1".parse::<AgentParams>().unwrap_err();
        assert!(matches!(
            err,
            AgentParamsError::Missing {
                name: "max_steps",
                line: 2
            }
        ));
    }

    #[test]
    fn test_invalid_value() {
        let err = "ten\n2\n0.1\n0.9\n0.1".parse::<AgentParams>().unwrap_err();
        assert_eq!(err.to_string(), "invalid value for episodes: \"ten\"");

        let err = "1\n-2\n0.1\n0.9\n0.1".parse::<AgentParams>().unwrap_err();
        assert!(matches!(
            err,
            AgentParamsError::Invalid {
                name: "max_steps",
                ..
            }
        ));
    }

    #[test]
    fn test_out_of_range() {
        let err = "1\n2\n0.1\n0.9\n1.5".parse::<AgentParams>().unwrap_err();
        assert!(matches!(
            err,
            AgentParamsError::OutOfRange {
                name: "epsilon",
                ..
            }
        ));

        let err = "1\n2\n0\n0.9\n0.5".parse::<AgentParams>().unwrap_err();
        assert!(matches!(
            err,
            AgentParamsError::OutOfRange {
                name: "learning_rate",
                ..
            }
        ));

        let err = "1\n2\nNaN\n0.9\n0.5".parse::<AgentParams>().unwrap_err();
        assert!(matches!(err, AgentParamsError::OutOfRange { .. }));
    }

    #[test]
    fn test_display_round_trip() {
        let params = AgentParams::default();
        assert!(params.validate().is_ok());
        assert_eq!(params.to_string().parse::<AgentParams>().unwrap(), params);
    }

    #[test]
    fn test_json_serialization() {
        let params = AgentParams::default();
        let json = serde_json::to_string(&params).unwrap();
        assert!(json.contains("\"discount_factor\":0.9"));
        let back: AgentParams = serde_json::from_str(&json).unwrap();
        assert_eq!(back, params);
    }

    #[test]
    fn test_save_and_load_file() {
        let path = env::temp_dir().join(format!("rltetris-params-{}.rl", process::id()));
        let params = AgentParams {
            episodes: 7,
            ..AgentParams::default()
        };
        params.save(&path).unwrap();
        let loaded = AgentParams::from_file(&path).unwrap();
        std::fs::remove_file(&path).unwrap();
        assert_eq!(loaded, params);
    }

    #[test]
    fn test_missing_file() {
        let path = env::temp_dir().join("rltetris-params-does-not-exist.rl");
        let err = AgentParams::from_file(&path).unwrap_err();
        assert!(matches!(err, AgentParamsError::Io { .. }));
        assert!(err.to_string().starts_with("failed to access"));
    }
}
