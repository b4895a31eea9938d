//! Server configuration and environment overrides.

use std::time::Duration;

use fadeline_engine::GameConfig;

use crate::ServerError;

/// Default listen address.
pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1:9090";

/// Full server configuration: where to listen and which game to host.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub bind_addr: String,
    pub game: GameConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        ServerConfig {
            bind_addr: DEFAULT_BIND_ADDR.to_string(),
            game: GameConfig::default(),
        }
    }
}

impl ServerConfig {
    /// Builds a configuration from the environment:
    ///
    /// - `FADELINE_ADDR`: listen address
    /// - `FADELINE_GRID_SIDE`: 4 or 5; side 4 carries its default turn timer
    /// - `FADELINE_TURN_TIMEOUT_MS`: per-turn window in milliseconds, 0 disables
    /// - `FADELINE_CHAIN_TIMEOUTS`: `true` re-arms the timer after an expiry
    ///
    /// Unset variables keep their defaults. A variable that is set but
    /// unparsable fails startup rather than silently hosting the wrong
    /// game.
    pub fn from_env() -> Result<Self, ServerError> {
        let bind_addr =
            std::env::var("FADELINE_ADDR").unwrap_or_else(|_| DEFAULT_BIND_ADDR.to_string());
        let side = parse_env("FADELINE_GRID_SIDE")?;
        let timeout_ms = parse_env("FADELINE_TURN_TIMEOUT_MS")?;
        let chain = parse_env("FADELINE_CHAIN_TIMEOUTS")?;

        Ok(ServerConfig {
            bind_addr,
            game: game_from(side, timeout_ms, chain)?,
        })
    }
}

/// Resolves the hosted game from the optional overrides. The side picks
/// the deployment baseline (side 4 brings its stock 4 second timer), the
/// timeout override is applied on top of it.
fn game_from(
    side: Option<usize>,
    timeout_ms: Option<u64>,
    chain: Option<bool>,
) -> Result<GameConfig, ServerError> {
    let mut game = match side {
        Some(4) => GameConfig::grid_four(),
        None | Some(5) => GameConfig::grid_five(),
        Some(other) => {
            return Err(ServerError::Config(format!(
                "unsupported grid side {other} (must be 4 or 5)"
            )));
        }
    };
    if let Some(ms) = timeout_ms {
        game.turn_timeout = (ms > 0).then_some(Duration::from_millis(ms));
    }
    if let Some(chain) = chain {
        game.chain_timeouts = chain;
    }
    game.validated().map_err(ServerError::Config)
}

fn parse_env<T>(name: &str) -> Result<Option<T>, ServerError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match std::env::var(name) {
        Ok(raw) => raw
            .parse()
            .map(Some)
            .map_err(|e| ServerError::Config(format!("{name}={raw}: {e}"))),
        Err(_) => Ok(None),
    }
}
