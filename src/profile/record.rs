use serde::Deserialize;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// The typed contents of a `profile.sii`
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct ProfileDocument {
    #[serde(default)]
    pub user_profile: Vec<UserProfile>,
}

impl ProfileDocument {
    /// The document's first, and in practice only, profile record
    pub fn profile(&self) -> Option<&UserProfile> {
        self.user_profile.first()
    }
}

/// A player's profile summary. Fields missing from the file take their
/// default value.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct UserProfile {
    #[serde(rename = "_name")]
    pub id: String,
    pub face: u32,
    pub brand: String,
    pub map_path: String,
    pub logo: String,
    pub company_name: String,
    pub male: bool,
    pub cached_experience: u64,

    /// Kilometers
    pub cached_distance: u64,
    pub customization: u64,
    pub active_mods: Vec<String>,

    /// Seconds since the unix epoch
    pub creation_time: u64,

    /// Seconds since the unix epoch
    pub save_time: u64,
    pub version: u32,
    pub online_user_name: String,
    pub profile_name: String,
}

impl UserProfile {
    pub fn active_mod_count(&self) -> usize {
        self.active_mods.len()
    }

    /// The current truck brand as shown to players, eg: `scania_r` becomes
    /// `SCANIA R`
    pub fn truck_display_name(&self) -> String {
        self.brand.replace('_', " ").to_uppercase()
    }

    pub fn created_at(&self) -> SystemTime {
        UNIX_EPOCH + Duration::from_secs(self.creation_time)
    }

    pub fn saved_at(&self) -> SystemTime {
        UNIX_EPOCH + Duration::from_secs(self.save_time)
    }
}
