//! Session host (default binary).
//!
//! Runs one card-match session in real time behind the controller adapter.
//! Logical time advances by the wall-clock milliseconds elapsed between frames;
//! adapter commands are applied between frames.

use std::thread;
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

use anyhow::{bail, Context, Result};
use tracing::info;
use tracing_subscriber::EnvFilter;

use card_match::adapter::{Adapter, SessionDriver};
use card_match::core::{ConfigError, Session, SessionConfig};
use card_match::types::Difficulty;

const DEFAULT_FRAME_MS: u64 = 50;

/// Host settings read from `CARD_MATCH_DIFFICULTY`, `CARD_MATCH_SEED` and `CARD_MATCH_FRAME_MS`
#[derive(Debug, Clone, PartialEq, Eq)]
struct HostConfig {
    difficulty: Difficulty,
    seed: u64,
    frame: Duration,
}

impl HostConfig {
    fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let difficulty = match lookup("CARD_MATCH_DIFFICULTY") {
            Some(name) => Difficulty::from_str(&name)
                .ok_or(ConfigError::UnknownDifficulty(name))?,
            None => Difficulty::default(),
        };

        let seed = match lookup("CARD_MATCH_SEED") {
            Some(s) => s
                .trim()
                .parse()
                .with_context(|| format!("CARD_MATCH_SEED is not a number: {}", s))?,
            None => clock_seed(),
        };

        let frame_ms = match lookup("CARD_MATCH_FRAME_MS") {
            Some(s) => s
                .trim()
                .parse::<u64>()
                .with_context(|| format!("CARD_MATCH_FRAME_MS is not a number: {}", s))?,
            None => DEFAULT_FRAME_MS,
        };

        Ok(Self {
            difficulty,
            seed,
            frame: Duration::from_millis(frame_ms.max(1)),
        })
    }
}

fn clock_seed() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_nanos() as u64
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("card_match=info".parse()?))
        .init();

    let host = HostConfig::from_env()?;

    let Some(mut adapter) = Adapter::start_from_env()? else {
        bail!("controller adapter is disabled; nothing can drive the session");
    };

    let session = Session::new(
        SessionConfig::reference()
            .with_difficulty(host.difficulty)
            .with_seed(host.seed),
    )?;
    info!(
        addr = %adapter.local_addr(),
        difficulty = %host.difficulty,
        seed = host.seed,
        "session host ready"
    );

    run(SessionDriver::new(session), &mut adapter, host.frame)
}

fn run(mut driver: SessionDriver, adapter: &mut Adapter, frame: Duration) -> Result<()> {
    let mut last = Instant::now();

    loop {
        while let Some(inbound) = adapter.try_recv() {
            for msg in driver.handle(inbound) {
                adapter.send(msg);
            }
        }

        // Carry sub-millisecond remainders into the next frame.
        let elapsed_ms = last.elapsed().as_millis().min(u32::MAX as u128) as u32;
        if elapsed_ms > 0 {
            last += Duration::from_millis(elapsed_ms as u64);
            if let Some(msg) = driver.advance(elapsed_ms) {
                adapter.send(msg);
            }
        }

        thread::sleep(frame);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lookup<'a>(pairs: &'a [(&'a str, &'a str)]) -> impl Fn(&str) -> Option<String> + 'a {
        move |key: &str| {
            pairs
                .iter()
                .find(|(k, _)| *k == key)
                .map(|(_, v)| v.to_string())
        }
    }

    #[test]
    fn test_host_config_defaults() {
        let config = HostConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config.difficulty, Difficulty::Easy);
        assert_eq!(config.frame, Duration::from_millis(DEFAULT_FRAME_MS));
    }

    #[test]
    fn test_host_config_values() {
        let config = HostConfig::from_lookup(lookup(&[
            ("CARD_MATCH_DIFFICULTY", "Hard"),
            ("CARD_MATCH_SEED", " 99 "),
            ("CARD_MATCH_FRAME_MS", "0"),
        ]))
        .unwrap();
        assert_eq!(config.difficulty, Difficulty::Hard);
        assert_eq!(config.seed, 99);
        assert_eq!(config.frame, Duration::from_millis(1));
    }

    #[test]
    fn test_host_config_rejects_unknown_difficulty() {
        let err = HostConfig::from_lookup(lookup(&[("CARD_MATCH_DIFFICULTY", "expert")]))
            .unwrap_err();
        assert_eq!(
            err.downcast_ref::<ConfigError>(),
            Some(&ConfigError::UnknownDifficulty("expert".to_string()))
        );
    }

    #[test]
    fn test_host_config_rejects_bad_seed() {
        assert!(HostConfig::from_lookup(lookup(&[("CARD_MATCH_SEED", "abc")])).is_err());
    }
}
