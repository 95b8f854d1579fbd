//! Subcommand implementations.

use std::collections::HashSet;
use std::sync::Arc;

use encantia_common::{EncantiaError, Result, UserId};
use encantia_config::EncantiaConfig;
use encantia_presence::{
    render_text, Clock, Identity, MemoryStore, MonotonicClock, PresenceRuntime, PresenceSettings,
    PresenceStore, PresenceView, ProfileRow, SupabaseStore, SupabaseStoreConfig,
};
use tracing::{info, warn};

/// Store selected for this run.
enum Backend {
    Supabase(Arc<SupabaseStore>),
    Memory(Arc<MemoryStore>),
}

impl Backend {
    fn from_config(
        config: &EncantiaConfig,
        memory: bool,
        access_token: Option<String>,
    ) -> Result<Self> {
        if memory {
            info!("Using in-memory presence store");
            return Ok(Self::Memory(Arc::new(MemoryStore::new())));
        }

        let supabase = &config.supabase;
        let base_url = supabase.base_url().ok_or_else(|| {
            EncantiaError::Other(
                "Supabase is not configured: set supabase.url or supabase.project_ref, or pass --memory"
                    .into(),
            )
        })?;
        let store = SupabaseStore::new(SupabaseStoreConfig {
            base_url,
            anon_key: supabase.anon_key.clone(),
            access_token,
            presence_table: supabase.presence_table.clone(),
            profiles_table: supabase.profiles_table.clone(),
            request_timeout: supabase.request_timeout_duration(),
        })?;
        Ok(Self::Supabase(Arc::new(store)))
    }

    fn store(&self) -> Arc<dyn PresenceStore> {
        match self {
            Self::Supabase(store) => store.clone(),
            Self::Memory(store) => store.clone(),
        }
    }

    /// Profiles to list: the profiles table plus `extra`, or just `extra`
    /// when the table is unavailable.
    async fn profiles(&self, extra: &[UserId]) -> Vec<ProfileRow> {
        let mut profiles = match self {
            Self::Supabase(store) => match store.list_profiles().await {
                Ok(profiles) => profiles,
                Err(e) => {
                    warn!(error = %e, "Could not list profiles, showing requested users only");
                    Vec::new()
                }
            },
            Self::Memory(_) => Vec::new(),
        };

        let known: HashSet<UserId> = profiles.iter().map(|p| p.user_id.clone()).collect();
        profiles.extend(
            extra
                .iter()
                .filter(|id| !known.contains(*id))
                .map(|id| ProfileRow::new(id.clone())),
        );
        profiles
    }
}

pub fn settings(config: &EncantiaConfig) -> PresenceSettings {
    let presence = &config.presence;
    PresenceSettings {
        heartbeat_interval: presence.heartbeat_duration(),
        liveness_threshold: presence.threshold_duration(),
        poll_interval: presence.poll_duration(),
        mark_offline_on_stop: presence.mark_offline_on_stop,
    }
}

/// Heartbeat timestamps: wall clock at startup, then monotonic, so a
/// stepped system clock cannot move `last_seen_at` backwards.
fn clock() -> Arc<dyn Clock> {
    Arc::new(MonotonicClock::new())
}

fn identity(
    user_id: Option<String>,
    access_token: Option<String>,
    name: Option<String>,
    memory: bool,
) -> Result<Identity> {
    match (user_id, access_token) {
        (Some(user_id), Some(token)) => {
            let name = name.unwrap_or_else(|| user_id.clone());
            Ok(Identity::from_supabase_auth(user_id, name, token))
        }
        (Some(user_id), None) => Ok(Identity {
            display_name: name.unwrap_or_else(|| user_id.clone()),
            user_id: UserId::new(user_id),
            access_token: None,
        }),
        (None, _) if memory => Ok(Identity::generate(name.as_deref().unwrap_or("guest"))),
        (None, _) => Err(EncantiaError::Other(
            "--user-id is required unless --memory is set".into(),
        )),
    }
}

pub async fn online(
    config: &EncantiaConfig,
    memory: bool,
    user_id: Option<String>,
    access_token: Option<String>,
    name: Option<String>,
    watch: Vec<String>,
) -> Result<()> {
    let identity = identity(user_id, access_token, name, memory)?;
    let backend = Backend::from_config(config, memory, identity.access_token.clone())?;
    let mut runtime =
        PresenceRuntime::init(backend.store(), clock(), settings(config))?;

    if config.presence.enabled {
        runtime.sign_in(identity.user_id.clone()).await?;
    } else {
        info!("Presence publishing disabled in config, watching only");
    }

    let mut extra: Vec<UserId> = watch.into_iter().map(UserId::new).collect();
    extra.push(identity.user_id.clone());
    let mut profiles = backend.profiles(&extra).await;
    for profile in &mut profiles {
        if profile.user_id == identity.user_id && profile.name.is_none() {
            profile.name = Some(identity.display_name.clone());
        }
    }
    let view = PresenceView::new(profiles);

    if let Err(e) = runtime.watch(view.user_ids().into_iter().collect()).await {
        warn!(error = %e, "First presence poll failed, waiting for the next one");
    }

    let rx = runtime.subscribe();
    tokio::select! {
        _ = view.bind(rx, |rows| println!("{}", render_text(&rows))) => {}
        signal = tokio::signal::ctrl_c() => {
            if let Err(e) = signal {
                warn!(error = %e, "Failed to listen for Ctrl-C");
            }
        }
    }

    runtime.shutdown().await;
    Ok(())
}

pub async fn status(config: &EncantiaConfig, memory: bool, user_ids: Vec<String>) -> Result<()> {
    let backend = Backend::from_config(config, memory, None)?;
    let requested: Vec<UserId> = user_ids.into_iter().map(UserId::new).collect();

    let profiles = if requested.is_empty() {
        backend.profiles(&[]).await
    } else {
        let wanted: HashSet<&UserId> = requested.iter().collect();
        backend
            .profiles(&requested)
            .await
            .into_iter()
            .filter(|p| wanted.contains(&p.user_id))
            .collect()
    };
    let view = PresenceView::new(profiles);

    let mut runtime =
        PresenceRuntime::init(backend.store(), clock(), settings(config))?;
    let snapshot = runtime.watch(view.user_ids().into_iter().collect()).await?;
    runtime.shutdown().await;

    print!("{}", render_text(&view.render(&snapshot)));
    Ok(())
}

pub fn show_config(config: &EncantiaConfig) {
    println!("{}", encantia_config::config_to_json(config));
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    #[test]
    fn settings_follow_config() {
        let mut config = EncantiaConfig::default();
        config.presence.heartbeat_interval = 7;
        config.presence.liveness_threshold = 20;
        config.presence.mark_offline_on_stop = false;

        let settings = settings(&config);
        assert_eq!(settings.heartbeat_interval, Duration::from_secs(7));
        assert_eq!(settings.liveness_threshold, Duration::from_secs(20));
        assert!(!settings.mark_offline_on_stop);
        assert!(settings.validate().is_ok());
    }

    #[tokio::test(start_paused = true)]
    async fn clock_starts_at_wall_time_and_never_goes_back() {
        let before = chrono::Utc::now();
        let clock = clock();
        let first = clock.now();
        assert!(first >= before);
        assert!(first - before < chrono::Duration::seconds(5));

        tokio::time::advance(Duration::from_secs(30)).await;
        assert_eq!(clock.now() - first, chrono::Duration::seconds(30));
    }

    #[test]
    fn identity_requires_user_outside_memory_mode() {
        assert!(identity(None, None, None, false).is_err());
        let generated = identity(None, None, Some("Ana".into()), true).unwrap();
        assert_eq!(generated.display_name, "Ana");

        let signed_in = identity(Some("u-1".into()), Some("jwt".into()), None, false).unwrap();
        assert!(signed_in.is_authenticated());
        assert_eq!(signed_in.display_name, "u-1");
    }

    #[test]
    fn supabase_backend_needs_a_url() {
        let config = EncantiaConfig::default();
        assert!(Backend::from_config(&config, false, None).is_err());
        assert!(matches!(
            Backend::from_config(&config, true, None),
            Ok(Backend::Memory(_))
        ));
    }

    #[tokio::test]
    async fn memory_profiles_cover_requested_users() {
        let backend = Backend::Memory(Arc::new(MemoryStore::new()));
        let ids = vec![UserId::new("a"), UserId::new("b")];
        let profiles = backend.profiles(&ids).await;
        let got: Vec<&str> = profiles.iter().map(|p| p.user_id.as_str()).collect();
        assert_eq!(got, vec!["a", "b"]);
    }
}
