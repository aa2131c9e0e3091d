//! Utility to list a game's profiles along with a summary of each.
//!
//! `profiles <ats|ets2> [--assets <dir>]`

use siikit::{profile::Profiles, Config, Decryptor, Game};
use std::{env, error, path::PathBuf, time::UNIX_EPOCH};
use tracing_subscriber::EnvFilter;

fn main() -> Result<(), Box<dyn error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let mut game = None;
    let mut assets = PathBuf::from(".");
    let mut args = env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--assets" => assets = args.next().map(PathBuf::from).ok_or("--assets needs a value")?,
            _ => game = Some(arg.parse::<Game>()?),
        }
    }

    let game = game.ok_or("usage: profiles <ats|ets2> [--assets <dir>]")?;
    let config = Config::from_env(assets)?;
    let decryptor = Decryptor::from_config(&config);
    let profiles = Profiles::new(config, decryptor);

    for profile in profiles.scan(game)? {
        println!("{}", profile.name().unwrap_or_default());
        println!("  hex name:   {}", profile.hex_name());
        println!("  path:       {}", profile.path().display());

        let record = match profiles.load_profile(&profile) {
            Ok(doc) => doc,
            Err(e) => {
                tracing::warn!(profile = %profile.hex_name(), error = %e, "unable to load profile");
                continue;
            }
        };

        let Some(user) = record.profile() else {
            continue;
        };

        let saved = user
            .saved_at()
            .duration_since(UNIX_EPOCH)
            .map(|x| x.as_secs())
            .unwrap_or_default();
        println!("  company:    {}", user.company_name);
        println!("  truck:      {}", user.truck_display_name());
        println!("  experience: {}", user.cached_experience);
        println!("  distance:   {} km", user.cached_distance);
        println!("  mods:       {}", user.active_mod_count());
        println!("  saved:      {}", saved);
    }

    Ok(())
}
