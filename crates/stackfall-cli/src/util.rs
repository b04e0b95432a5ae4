use std::{fs::File, io::BufReader, path::Path, time::Duration};

use anyhow::Context;
use serde::de::DeserializeOwned;
use stackfall_engine::{Metric, SessionConfig};

pub(crate) fn read_json_file<T, P>(path: P) -> anyhow::Result<T>
where
    T: DeserializeOwned,
    P: AsRef<Path>,
{
    let path = path.as_ref();
    let file =
        File::open(path).with_context(|| format!("Failed to open file: {}", path.display()))?;
    let reader = BufReader::new(file);
    serde_json::from_reader(reader)
        .with_context(|| format!("Failed to parse JSON from {}", path.display()))
}

/// Reads the session configuration file, or the defaults when no path is given.
pub(crate) fn load_session_config(path: Option<&Path>) -> anyhow::Result<SessionConfig> {
    match path {
        Some(path) => read_json_file(path),
        None => Ok(SessionConfig::default()),
    }
}

/// Formats a duration as `m:ss.mmm`.
pub(crate) fn format_duration(duration: Duration) -> String {
    let millis = duration.as_millis();
    let minutes = millis / 60_000;
    let seconds = (millis / 1000) % 60;
    let millis = millis % 1000;
    format!("{minutes}:{seconds:02}.{millis:03}")
}

pub(crate) fn format_metric(metric: Metric) -> String {
    match metric {
        Metric::Score(score) => format!("{score} pts"),
        Metric::Lines(lines) => format!("{lines} lines"),
        Metric::TimeMillis(millis) => format_duration(Duration::from_millis(millis)),
    }
}

#[cfg(test)]
mod tests {
    use stackfall_engine::GameMode;

    use super::*;

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(Duration::from_millis(83_250)), "1:23.250");
        assert_eq!(format_duration(Duration::ZERO), "0:00.000");
        assert_eq!(format_metric(Metric::Lines(40)), "40 lines");
        assert_eq!(format_metric(Metric::TimeMillis(5_007)), "0:05.007");
    }

    #[test]
    fn test_read_json_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{"mode": "sprint", "fps": 30}"#).unwrap();
        let config: SessionConfig = read_json_file(&path).unwrap();
        assert_eq!(config.fps, 30);

        std::fs::write(&path, "{not json").unwrap();
        let err = read_json_file::<SessionConfig, _>(&path).unwrap_err();
        assert!(err.to_string().contains("Failed to parse JSON"));
        assert!(read_json_file::<SessionConfig, _>(dir.path().join("missing.json")).is_err());
    }

    #[test]
    fn test_load_session_config() {
        assert_eq!(load_session_config(None).unwrap(), SessionConfig::default());

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{"mode": "battle", "fps": 30}"#).unwrap();
        let config = load_session_config(Some(&path)).unwrap();
        assert_eq!(config.mode, GameMode::Battle);
        assert_eq!(config.fps, 30);
        assert!(load_session_config(Some(&dir.path().join("missing.json"))).is_err());
    }
}
