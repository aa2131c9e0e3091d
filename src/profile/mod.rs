//! Locate game profiles and load their `profile.sii`.
//!
//! Each profile lives in a directory named after the hex encoding of its
//! display name. Directories whose names do not decode are skipped rather
//! than failing the whole listing, while failures to decrypt or parse a
//! requested profile are reported to the caller.

#[cfg(feature = "derive")]
mod record;

#[cfg(feature = "derive")]
pub use self::record::{ProfileDocument, UserProfile};

use crate::config::{Config, Game};
use crate::decrypt::{Decryptor, PlaintextTransform};
use crate::hex_name::decode_hex_name;
use crate::text::SiiDocument;
use crate::{Error, ErrorKind};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Name of the file holding a profile's summary
pub const PROFILE_FILE: &str = "profile.sii";

/// One profile directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfilePath {
    hex_name: String,
    name: Option<String>,
    path: PathBuf,
}

impl ProfilePath {
    /// Describe the directory at `path`, decoding its name when possible
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let hex_name = path
            .file_name()
            .map(|x| x.to_string_lossy().into_owned())
            .unwrap_or_default();
        let name = decode_hex_name(&hex_name).ok();
        ProfilePath {
            hex_name,
            name,
            path,
        }
    }

    /// The raw directory name
    pub fn hex_name(&self) -> &str {
        &self.hex_name
    }

    /// The decoded display name, absent when the directory name isn't
    /// even length hex
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn data_path(&self) -> PathBuf {
        self.path.join(PROFILE_FILE)
    }
}

/// List the profile directories under `dir`, sorted by directory name.
///
/// Entries that aren't directories or whose names don't decode are skipped.
pub fn scan_profiles<P: AsRef<Path>>(dir: P) -> Result<Vec<ProfilePath>, Error> {
    let dir = dir.as_ref();
    if !dir.is_dir() {
        return Err(Error::new(ErrorKind::ProfilesNotFound {
            path: dir.to_path_buf(),
        }));
    }

    let mut profiles = Vec::new();
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();
        if !path.is_dir() {
            continue;
        }

        let profile = ProfilePath::new(path);
        if profile.name().is_none() {
            debug!(dir = %profile.hex_name(), "skipping directory without a hex name");
            continue;
        }

        profiles.push(profile);
    }

    profiles.sort_by(|a, b| a.hex_name.cmp(&b.hex_name));
    Ok(profiles)
}

/// Enumerates and loads the profiles of a game
#[derive(Debug)]
pub struct Profiles<T> {
    config: Config,
    decryptor: Decryptor<T>,
}

impl<T> Profiles<T>
where
    T: PlaintextTransform,
{
    pub fn new(config: Config, decryptor: Decryptor<T>) -> Self {
        Profiles { config, decryptor }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// List the game's profiles without touching their data
    pub fn scan(&self, game: Game) -> Result<Vec<ProfilePath>, Error> {
        scan_profiles(self.config.profiles_dir(game))
    }

    /// Decrypt the profile's data in place when needed and parse it
    pub fn load(&self, profile: &ProfilePath) -> Result<SiiDocument, Error> {
        self.decryptor.open_document(profile.data_path())
    }

    /// Decrypt the profile's data in place when needed and read its record
    #[cfg(feature = "derive")]
    pub fn load_profile(&self, profile: &ProfilePath) -> Result<ProfileDocument, Error> {
        self.decryptor.open_as(profile.data_path())
    }

    /// List the game's profiles and load each one. A profile that fails to
    /// load is paired with its error instead of aborting the listing.
    pub fn scan_loaded(
        &self,
        game: Game,
    ) -> Result<Vec<(ProfilePath, Result<SiiDocument, Error>)>, Error> {
        let profiles = self.scan(game)?;
        Ok(profiles
            .into_iter()
            .map(|profile| {
                let doc = self.load(&profile);
                (profile, doc)
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn profile_path_decodes_name() {
        let profile = ProfilePath::new(Path::new("profiles").join("4A6F686E"));
        assert_eq!(profile.hex_name(), "4A6F686E");
        assert_eq!(profile.name(), Some("John"));
        assert_eq!(
            profile.data_path(),
            Path::new("profiles").join("4A6F686E").join(PROFILE_FILE)
        );
    }

    #[test]
    fn profile_path_without_hex_name() {
        let profile = ProfilePath::new(Path::new("profiles").join("backup"));
        assert_eq!(profile.name(), None);
    }

    #[test]
    fn scan_missing_dir() {
        let dir = tempfile::tempdir().unwrap();
        let err = scan_profiles(dir.path().join("nope")).unwrap_err();
        assert!(matches!(err.kind(), ErrorKind::ProfilesNotFound { .. }));
    }
}
