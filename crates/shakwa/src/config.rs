//! CLI-side config resolution: profile + credential chain + flag overrides.
//!
//! Core receives a finished `NotifierConfig` and `Session`; it never sees
//! the TOML types or the command line.

use std::time::Duration;

use secrecy::SecretString;
use shakwa_config::{Config, Defaults, parse_origin, profile_to_notifier_config, resolve_token};
use shakwa_core::{Locale, NotifierConfig, Session, TlsVerification};

use crate::cli::{GlobalOpts, LocaleArg};
use crate::error::CliError;

pub use shakwa_config::{config_path, load_config, save_config};

impl From<LocaleArg> for Locale {
    fn from(arg: LocaleArg) -> Self {
        match arg {
            LocaleArg::Ar => Locale::Ar,
            LocaleArg::En => Locale::En,
        }
    }
}

/// Everything a command needs to talk to the platform.
#[derive(Debug)]
pub struct Resolved {
    pub profile: String,
    pub notifier: NotifierConfig,
    pub session: Session,
}

pub fn active_profile_name(global: &GlobalOpts, cfg: &Config) -> String {
    cfg.active_profile_name(global.profile.as_deref())
}

/// Resolve the runtime config from the config file and global flags.
///
/// Flags win over the profile; the token comes from `--token` /
/// `SHAKWA_TOKEN` or, failing that, the profile's credential chain.
pub fn resolve(global: &GlobalOpts) -> Result<Resolved, CliError> {
    let cfg = load_config()?;
    let profile_name = active_profile_name(global, &cfg);

    let (mut notifier, token) = if let Some(profile) = cfg.profiles.get(&profile_name) {
        let mut notifier = profile_to_notifier_config(profile, &cfg.defaults)?;
        if let Some(ref origin) = global.origin {
            notifier.origin = parse_origin(origin)?;
        }
        let token = match flag_token(global) {
            Some(token) => token,
            None => resolve_token(profile, &profile_name).map_err(|_| CliError::NoCredentials {
                profile: profile_name.clone(),
            })?,
        };
        (notifier, token)
    } else {
        if global.profile.is_some() {
            return Err(CliError::ProfileNotFound {
                name: profile_name,
                available: available(&cfg),
            });
        }
        let origin = global.origin.as_deref().ok_or_else(|| CliError::NoConfig {
            path: config_path().display().to_string(),
        })?;
        let notifier = flags_only_config(parse_origin(origin)?, &cfg.defaults);
        let token = flag_token(global).ok_or_else(|| CliError::NoCredentials {
            profile: profile_name.clone(),
        })?;
        (notifier, token)
    };

    apply_overrides(&mut notifier, global);

    Ok(Resolved {
        profile: profile_name,
        notifier,
        session: Session::with_token(token),
    })
}

fn flag_token(global: &GlobalOpts) -> Option<SecretString> {
    global
        .token
        .as_deref()
        .filter(|t| !t.trim().is_empty())
        .map(|t| SecretString::from(t.to_owned()))
}

fn flags_only_config(origin: url::Url, defaults: &Defaults) -> NotifierConfig {
    let mut notifier = NotifierConfig::new(origin);
    notifier.locale = defaults.locale;
    notifier.timeout = Duration::from_secs(defaults.timeout);
    if defaults.insecure {
        notifier.tls = TlsVerification::DangerAcceptInvalid;
    }
    notifier
}

fn apply_overrides(notifier: &mut NotifierConfig, global: &GlobalOpts) {
    if let Some(locale) = global.locale {
        notifier.locale = locale.into();
    }
    if global.insecure {
        notifier.tls = TlsVerification::DangerAcceptInvalid;
    }
    if let Some(secs) = global.timeout {
        notifier.timeout = Duration::from_secs(secs);
    }
}

fn available(cfg: &Config) -> String {
    let names = cfg.profile_names();
    if names.is_empty() {
        "(none)".into()
    } else {
        names.join(", ")
    }
}
