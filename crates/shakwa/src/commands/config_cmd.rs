//! Config subcommand handlers.

use std::fmt::Write as _;

use shakwa_config::{Config, Profile, load_config, parse_origin, store_token};

use crate::cli::{ConfigArgs, ConfigCommand, GlobalOpts, InitArgs, SetTokenArgs};
use crate::config::{self, config_path};
use crate::error::CliError;
use crate::output;

// ── Helpers ─────────────────────────────────────────────────────────

const MASK: &str = "****";

/// Replace plaintext tokens so `config show` never prints them.
fn redact(mut cfg: Config) -> Config {
    for profile in cfg.profiles.values_mut() {
        if profile.token.is_some() {
            profile.token = Some(MASK.into());
        }
    }
    cfg
}

/// Render config as TOML-like text, profiles in name order.
fn format_config(cfg: &Config) -> String {
    let mut out = String::new();

    if let Some(ref default) = cfg.default_profile {
        let _ = writeln!(out, "default_profile = \"{default}\"");
    }
    let _ = writeln!(out);
    let _ = writeln!(out, "[defaults]");
    let _ = writeln!(out, "output = \"{}\"", cfg.defaults.output);
    let _ = writeln!(out, "color = \"{}\"", cfg.defaults.color);
    let _ = writeln!(out, "locale = \"{}\"", cfg.defaults.locale);
    let _ = writeln!(out, "insecure = {}", cfg.defaults.insecure);
    let _ = writeln!(out, "timeout = {}", cfg.defaults.timeout);

    for name in cfg.profile_names() {
        let p = &cfg.profiles[&name];
        let _ = writeln!(out);
        let _ = writeln!(out, "[profiles.{name}]");
        let _ = writeln!(out, "origin = \"{}\"", p.origin);
        if let Some(ref api) = p.api_path {
            let _ = writeln!(out, "api_path = \"{api}\"");
        }
        if let Some(ref push) = p.push_path {
            let _ = writeln!(out, "push_path = \"{push}\"");
        }
        if let Some(locale) = p.locale {
            let _ = writeln!(out, "locale = \"{locale}\"");
        }
        if let Some(size) = p.page_size {
            let _ = writeln!(out, "page_size = {size}");
        }
        if let Some(delay) = p.reconnect_delay_ms {
            let _ = writeln!(out, "reconnect_delay_ms = {delay}");
        }
        if let Some(ref token) = p.token {
            let _ = writeln!(out, "token = \"{token}\"");
        }
        if let Some(ref env) = p.token_env {
            let _ = writeln!(out, "token_env = \"{env}\"");
        }
        if let Some(ref ca) = p.ca_cert {
            let _ = writeln!(out, "ca_cert = \"{}\"", ca.display());
        }
        if let Some(insecure) = p.insecure {
            let _ = writeln!(out, "insecure = {insecure}");
        }
        if let Some(timeout) = p.timeout {
            let _ = writeln!(out, "timeout = {timeout}");
        }
    }

    out
}

fn profile_not_found(name: String, cfg: &Config) -> CliError {
    let available = cfg.profile_names();
    CliError::ProfileNotFound {
        name,
        available: if available.is_empty() {
            "(none)".into()
        } else {
            available.join(", ")
        },
    }
}

fn prompt_err(e: impl std::fmt::Display) -> CliError {
    CliError::Validation {
        field: "interactive".into(),
        reason: format!("prompt failed: {e}"),
    }
}

// ── Handler ─────────────────────────────────────────────────────────

pub fn handle(args: ConfigArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        ConfigCommand::Init(init) => handle_init(init, global),

        ConfigCommand::Show => {
            let cfg = redact(load_config()?);
            output::emit(global, &cfg, format_config, |_| {
                config_path().display().to_string()
            })
        }

        ConfigCommand::Profiles => {
            let cfg = load_config()?;
            if cfg.profiles.is_empty() {
                eprintln!("No profiles configured. Run: shakwa config init --origin <URL>");
                return Ok(());
            }
            let active = config::active_profile_name(global, &cfg);
            for name in cfg.profile_names() {
                let marker = if name == active { " *" } else { "" };
                println!("{name}{marker}");
            }
            Ok(())
        }

        ConfigCommand::Use { name } => {
            let mut cfg = load_config()?;
            if !cfg.profiles.contains_key(&name) {
                return Err(profile_not_found(name, &cfg));
            }
            cfg.default_profile = Some(name.clone());
            config::save_config(&cfg)?;
            eprintln!("✓ Default profile set to '{name}'");
            Ok(())
        }

        ConfigCommand::SetToken(set) => handle_set_token(&set, global),

        ConfigCommand::Path => {
            println!("{}", config_path().display());
            Ok(())
        }
    }
}

fn handle_init(init: InitArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let mut cfg = load_config()?;
    let name = init
        .name
        .or_else(|| global.profile.clone())
        .unwrap_or_else(|| "default".into());

    if cfg.profiles.contains_key(&name) && !init.force {
        return Err(CliError::Validation {
            field: "profile".into(),
            reason: format!("profile '{name}' already exists (use --force to replace it)"),
        });
    }

    let origin = parse_origin(&init.origin)?;
    let profile = Profile {
        origin: origin.as_str().trim_end_matches('/').to_owned(),
        api_path: init.api_path,
        push_path: init.push_path,
        token_env: init.token_env,
        ..Profile::default()
    };

    let first = cfg.profiles.is_empty();
    cfg.profiles.insert(name.clone(), profile);
    if first || !cfg.profiles.contains_key(cfg.default_profile.as_deref().unwrap_or_default()) {
        cfg.default_profile = Some(name.clone());
    }

    let path = config::save_config(&cfg)?;
    eprintln!("✓ Profile '{name}' written to {}", path.display());
    eprintln!("  Store a token with: shakwa -p {name} config set-token");
    Ok(())
}

fn handle_set_token(set: &SetTokenArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let mut cfg = load_config()?;
    let name = config::active_profile_name(global, &cfg);
    if !cfg.profiles.contains_key(&name) {
        return Err(profile_not_found(name, &cfg));
    }

    let token = rpassword::prompt_password("Bearer token: ").map_err(prompt_err)?;
    let token = token.trim();
    if token.is_empty() {
        return Err(CliError::Validation {
            field: "token".into(),
            reason: "token cannot be empty".into(),
        });
    }

    if set.plaintext {
        if let Some(profile) = cfg.profiles.get_mut(&name) {
            profile.token = Some(token.to_owned());
        }
        let path = config::save_config(&cfg)?;
        eprintln!("✓ Token saved to {} (plaintext)", path.display());
    } else {
        store_token(&name, token)?;
        eprintln!("✓ Token for '{name}' stored in system keyring");
    }
    Ok(())
}
