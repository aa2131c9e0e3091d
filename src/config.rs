use crate::{Error, ErrorKind};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// File name of the decryption executable shipped in the asset directory
pub const DEFAULT_TOOL_NAME: &str = "SII_Decrypt.exe";

/// The games whose profiles can be located
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Game {
    AmericanTruckSimulator,
    EuroTruckSimulator2,
}

impl Game {
    /// The game's title, which is also its directory under the documents folder
    pub fn title(&self) -> &'static str {
        match self {
            Game::AmericanTruckSimulator => "American Truck Simulator",
            Game::EuroTruckSimulator2 => "Euro Truck Simulator 2",
        }
    }

    /// The short name accepted by [FromStr]
    pub fn abbreviation(&self) -> &'static str {
        match self {
            Game::AmericanTruckSimulator => "ats",
            Game::EuroTruckSimulator2 => "ets2",
        }
    }
}

impl fmt::Display for Game {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.title())
    }
}

/// A game name that was not recognized
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownGame(String);

impl fmt::Display for UnknownGame {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "unknown game: {} (expected ats or ets2)", self.0)
    }
}

impl std::error::Error for UnknownGame {}

impl FromStr for Game {
    type Err = UnknownGame;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("ats") || s == Game::AmericanTruckSimulator.title() {
            Ok(Game::AmericanTruckSimulator)
        } else if s.eq_ignore_ascii_case("ets2") || s == Game::EuroTruckSimulator2.title() {
            Ok(Game::EuroTruckSimulator2)
        } else {
            Err(UnknownGame(s.to_string()))
        }
    }
}

/// Paths the library needs from its environment, supplied up front so that
/// nothing reads ambient process state mid operation.
///
/// ```
/// use siikit::{Config, Game};
/// use std::path::Path;
///
/// let config = Config::new("/opt/app/assets", "/home/me");
/// assert_eq!(config.tool_path(), Path::new("/opt/app/assets/SII_Decrypt.exe"));
/// assert_eq!(
///     config.profiles_dir(Game::EuroTruckSimulator2),
///     Path::new("/home/me/Documents/Euro Truck Simulator 2/profiles")
/// );
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    asset_dir: PathBuf,
    home_dir: PathBuf,
    tool_name: String,
}

impl Config {
    pub fn new(asset_dir: impl Into<PathBuf>, home_dir: impl Into<PathBuf>) -> Self {
        Config {
            asset_dir: asset_dir.into(),
            home_dir: home_dir.into(),
            tool_name: String::from(DEFAULT_TOOL_NAME),
        }
    }

    /// Resolve the home directory of the current user
    pub fn from_env(asset_dir: impl Into<PathBuf>) -> Result<Self, Error> {
        let home = dirs::home_dir().ok_or_else(|| Error::new(ErrorKind::HomeDirUnavailable))?;
        Ok(Config::new(asset_dir, home))
    }

    /// Use a differently named decryption executable
    pub fn with_tool_name(mut self, tool_name: impl Into<String>) -> Self {
        self.tool_name = tool_name.into();
        self
    }

    pub fn asset_dir(&self) -> &Path {
        &self.asset_dir
    }

    pub fn home_dir(&self) -> &Path {
        &self.home_dir
    }

    pub fn tool_path(&self) -> PathBuf {
        self.asset_dir.join(&self.tool_name)
    }

    pub fn documents_dir(&self) -> PathBuf {
        self.home_dir.join("Documents")
    }

    pub fn profiles_dir(&self, game: Game) -> PathBuf {
        self.documents_dir().join(game.title()).join("profiles")
    }
}
